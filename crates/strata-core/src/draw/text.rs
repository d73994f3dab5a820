//! Text styling and size estimation.
//!
//! # Overview
//!
//! Exported types:
//! - [`TextStyle`]: Font size, weight, slant, and color for a piece of text
//! - [`HAlign`] / [`VAlign`]: How a text block hangs off its anchor point
//!
//! The layout engine needs label extents before any font is loaded, so text
//! size is ESTIMATED arithmetically rather than shaped: width scales with the
//! longest line's character count, height with the line count. The estimate is
//! deliberately generous so collision checks stay conservative; exact glyph
//! metrics are a backend concern.

use serde::{Deserialize, Serialize};

use crate::{color::Color, geometry::Size};

/// Average glyph advance as a fraction of the font size.
const GLYPH_WIDTH_RATIO: f64 = 0.6;

/// Line height as a fraction of the font size.
const LINE_HEIGHT_RATIO: f64 = 1.2;

/// Horizontal alignment of a text block relative to its anchor point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HAlign {
    /// Anchor is the left edge of the text.
    Left,
    /// Anchor is the horizontal center (default).
    #[default]
    Center,
    /// Anchor is the right edge of the text.
    Right,
}

/// Vertical alignment of a text block relative to its anchor point.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VAlign {
    /// Anchor is the top edge of the text.
    Top,
    /// Anchor is the vertical center (default).
    #[default]
    Middle,
    /// Anchor is the bottom edge of the text.
    Bottom,
}

/// Visual styling for a piece of text.
///
/// Font sizes are diagram units, the same space all other geometry lives in,
/// so label extents can be compared against box extents directly.
///
/// # Examples
///
/// ```
/// use strata_core::draw::TextStyle;
///
/// let style = TextStyle::new(0.14).bold();
/// let size = style.estimate_size("ACCEPT");
/// assert!(size.width() > 0.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    font_size: f64,
    #[serde(default)]
    bold: bool,
    #[serde(default)]
    italic: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
}

impl TextStyle {
    /// Creates a plain style with the given font size in diagram units.
    pub fn new(font_size: f64) -> Self {
        Self {
            font_size,
            bold: false,
            italic: false,
            color: None,
        }
    }

    /// Returns this style with bold weight.
    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Returns this style with italic slant.
    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Returns this style with the given CSS color string.
    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    /// Returns the font size in diagram units.
    pub fn font_size(&self) -> f64 {
        self.font_size
    }

    /// Returns `true` if the text is bold.
    pub fn is_bold(&self) -> bool {
        self.bold
    }

    /// Returns `true` if the text is italic.
    pub fn is_italic(&self) -> bool {
        self.italic
    }

    /// Returns the raw color string, if one was set.
    pub fn color_str(&self) -> Option<&str> {
        self.color.as_deref()
    }

    /// Parses the color string, falling back to black when none is set.
    pub fn resolve_color(&self) -> Result<Color, String> {
        match &self.color {
            Some(s) => Color::new(s),
            None => Ok(Color::default()),
        }
    }

    /// Estimates the rendered extent of `content` in diagram units.
    ///
    /// Multi-line text is split on `\n`; the width comes from the longest
    /// line. An empty string has zero extent.
    pub fn estimate_size(&self, content: &str) -> Size {
        if content.is_empty() {
            return Size::new(0.0, 0.0);
        }
        let mut line_count = 0usize;
        let mut longest = 0usize;
        for line in content.split('\n') {
            line_count += 1;
            longest = longest.max(line.chars().count());
        }
        Size::new(
            longest as f64 * self.font_size * GLYPH_WIDTH_RATIO,
            line_count as f64 * self.font_size * LINE_HEIGHT_RATIO,
        )
    }

    /// Returns the distance between consecutive baselines in diagram units.
    pub fn line_height(&self) -> f64 {
        self.font_size * LINE_HEIGHT_RATIO
    }
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::new(0.12)
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;

    use super::*;

    #[test]
    fn test_estimate_single_line() {
        let style = TextStyle::new(0.2);
        let size = style.estimate_size("abcde");
        // 5 glyphs * 0.2 * 0.6 = 0.6 wide, one line 0.2 * 1.2 = 0.24 tall
        assert_approx_eq!(f64, size.width(), 0.6);
        assert_approx_eq!(f64, size.height(), 0.24);
    }

    #[test]
    fn test_estimate_multi_line_uses_longest() {
        let style = TextStyle::new(0.2);
        let size = style.estimate_size("ab\nlonger line\nxy");
        let expected_width = 11.0 * 0.2 * 0.6;
        assert_approx_eq!(f64, size.width(), expected_width);
        assert_approx_eq!(f64, size.height(), 3.0 * 0.2 * 1.2);
    }

    #[test]
    fn test_estimate_empty_is_zero() {
        let style = TextStyle::new(0.2);
        assert!(style.estimate_size("").is_empty());
    }

    #[test]
    fn test_estimate_counts_chars_not_bytes() {
        let style = TextStyle::new(0.2);
        let ascii = style.estimate_size("aaaa");
        let accented = style.estimate_size("ВВВВ");
        assert_approx_eq!(f64, ascii.width(), accented.width());
    }

    #[test]
    fn test_style_builders() {
        let style = TextStyle::new(0.15).bold().italic().with_color("#333333");
        assert!(style.is_bold());
        assert!(style.is_italic());
        assert_eq!(style.color_str(), Some("#333333"));
        assert_approx_eq!(f64, style.font_size(), 0.15);
    }

    #[test]
    fn test_resolve_color_defaults_to_black() {
        let style = TextStyle::new(0.1);
        let color = style.resolve_color().unwrap();
        assert_eq!(color.to_string(), "black");
    }

    #[test]
    fn test_resolve_color_rejects_garbage() {
        let style = TextStyle::new(0.1).with_color("not-a-color");
        assert!(style.resolve_color().is_err());
    }
}
