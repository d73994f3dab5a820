//! Stroke and line-style definitions.
//!
//! # Overview
//!
//! Exported types:
//! - [`StrokeDefinition`]: Stroke properties for borders and connector lines
//!   (color, width, pattern)
//! - [`StrokeStyle`]: Enum defining line patterns (solid, dashed, dotted)
//! - [`apply_stroke!`](crate::apply_stroke!): Macro for applying stroke
//!   attributes to SVG elements
//!
//! Stroke widths are device pixels, not diagram units: a border stays the
//! same visual weight regardless of how the canvas is scaled, and strokes
//! never participate in layout arithmetic.

use std::str::FromStr;

use crate::color::Color;

/// Defines the visual style of a stroke, including dash patterns.
///
/// # SVG Mapping
///
/// Each variant maps to a specific SVG `stroke-dasharray` value:
/// - `Solid`: No dasharray attribute
/// - `Dashed`: "5,5"
/// - `Dotted`: "2,3"
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StrokeStyle {
    /// Solid continuous line (default)
    #[default]
    Solid,
    /// Dashed line with equal dash and gap lengths (5px dash, 5px gap)
    Dashed,
    /// Dotted line with small dots (2px dot, 3px gap)
    Dotted,
}

impl FromStr for StrokeStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "solid" => Ok(Self::Solid),
            "dashed" => Ok(Self::Dashed),
            "dotted" => Ok(Self::Dotted),
            _ => Err(format!(
                "invalid stroke style `{s}`, valid values: solid, dashed, dotted"
            )),
        }
    }
}

impl StrokeStyle {
    /// Returns the SVG dasharray value for this style, or None for solid lines
    pub fn to_svg_value(&self) -> Option<String> {
        match self {
            Self::Solid => None,
            Self::Dashed => Some("5,5".to_string()),
            Self::Dotted => Some("2,3".to_string()),
        }
    }
}

/// A stroke definition for rendering lines and borders.
///
/// # Examples
///
/// ```
/// use strata_core::draw::StrokeDefinition;
/// use strata_core::color::Color;
///
/// // Simple solid stroke
/// let stroke = StrokeDefinition::solid(Color::new("black").unwrap(), 2.0);
///
/// // Dashed stroke for flow-indicator connectors
/// let dashed = StrokeDefinition::dashed(Color::new("gray").unwrap(), 1.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeDefinition {
    color: Color,
    width: f32,
    style: StrokeStyle,
}

impl StrokeDefinition {
    /// Creates a new solid stroke with the given color and width.
    pub fn new(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            style: StrokeStyle::Solid,
        }
    }

    /// Creates a solid stroke (convenience constructor).
    pub fn solid(color: Color, width: f32) -> Self {
        Self::new(color, width)
    }

    /// Creates a dashed stroke (convenience constructor).
    pub fn dashed(color: Color, width: f32) -> Self {
        let mut stroke = Self::new(color, width);
        stroke.set_style(StrokeStyle::Dashed);
        stroke
    }

    /// Creates a dotted stroke (convenience constructor).
    pub fn dotted(color: Color, width: f32) -> Self {
        let mut stroke = Self::new(color, width);
        stroke.set_style(StrokeStyle::Dotted);
        stroke
    }

    /// Returns the stroke color.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Returns the stroke width in device pixels.
    pub fn width(&self) -> f32 {
        self.width
    }

    /// Returns the stroke style.
    pub fn style(&self) -> StrokeStyle {
        self.style
    }

    /// Sets the stroke color.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    /// Sets the stroke width.
    pub fn set_width(&mut self, width: f32) {
        self.width = width;
    }

    /// Sets the stroke style.
    pub fn set_style(&mut self, style: StrokeStyle) {
        self.style = style;
    }
}

impl Default for StrokeDefinition {
    fn default() -> Self {
        Self {
            color: Color::default(),
            width: 1.5,
            style: StrokeStyle::default(),
        }
    }
}

/// Apply all stroke attributes to an SVG element.
///
/// This macro applies the complete stroke definition including color, opacity,
/// width, and dash pattern (if not solid) to any SVG element.
///
/// # Examples
///
/// ```
/// use strata_core::draw::StrokeDefinition;
/// use strata_core::color::Color;
/// use svg::node::element as svg_element;
///
/// let stroke = StrokeDefinition::solid(Color::new("black").unwrap(), 2.0);
/// let rect = svg_element::Rectangle::new()
///     .set("x", 0)
///     .set("y", 0)
///     .set("width", 100)
///     .set("height", 50);
///
/// let rect = strata_core::apply_stroke!(rect, &stroke);
/// ```
#[macro_export]
macro_rules! apply_stroke {
    ($element:expr, $stroke:expr) => {{
        let mut elem = $element
            .set("stroke", $stroke.color().to_string())
            .set("stroke-opacity", $stroke.color().alpha())
            .set("stroke-width", $stroke.width());

        if let Some(dasharray) = $stroke.style().to_svg_value() {
            elem = elem.set("stroke-dasharray", dasharray);
        }

        elem
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_default() {
        let stroke = StrokeDefinition::default();
        assert_eq!(stroke.width(), 1.5);
        assert_eq!(stroke.color().to_string(), "black");
        assert_eq!(stroke.style(), StrokeStyle::Solid);
    }

    #[test]
    fn test_stroke_constructors() {
        let color = Color::new("red").unwrap();

        let solid = StrokeDefinition::solid(color, 2.0);
        assert_eq!(solid.width(), 2.0);
        assert_eq!(solid.style(), StrokeStyle::Solid);

        let dashed = StrokeDefinition::dashed(color, 1.5);
        assert_eq!(dashed.style(), StrokeStyle::Dashed);

        let dotted = StrokeDefinition::dotted(color, 1.0);
        assert_eq!(dotted.style(), StrokeStyle::Dotted);
    }

    #[test]
    fn test_stroke_setters() {
        let mut stroke = StrokeDefinition::default();

        stroke.set_color(Color::new("green").unwrap());
        stroke.set_width(2.5);
        stroke.set_style(StrokeStyle::Dashed);

        assert_eq!(stroke.color().to_string(), "green");
        assert_eq!(stroke.width(), 2.5);
        assert_eq!(stroke.style(), StrokeStyle::Dashed);
    }

    #[test]
    fn test_stroke_style_dasharray() {
        assert_eq!(StrokeStyle::Solid.to_svg_value(), None);
        assert_eq!(StrokeStyle::Dashed.to_svg_value(), Some("5,5".to_string()));
        assert_eq!(StrokeStyle::Dotted.to_svg_value(), Some("2,3".to_string()));
    }

    #[test]
    fn test_stroke_style_from_str() {
        assert_eq!(StrokeStyle::from_str("solid").unwrap(), StrokeStyle::Solid);
        assert_eq!(
            StrokeStyle::from_str("dashed").unwrap(),
            StrokeStyle::Dashed
        );
        assert_eq!(
            StrokeStyle::from_str("dotted").unwrap(),
            StrokeStyle::Dotted
        );

        let result = StrokeStyle::from_str("zigzag");
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("invalid stroke style"));
    }
}
