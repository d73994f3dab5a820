//! Configuration types for Strata diagram rendering.
//!
//! This module provides configuration structures that control how diagrams
//! are laid out and rendered. All types implement [`serde::Deserialize`] for
//! flexible loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining layout and render settings.
//! - [`LayoutConfig`] - Margins, gaps, and label-placement knobs for the layout engine.
//! - [`RenderConfig`] - Scale, background, and encoder settings for backends.
//!
//! # Example
//!
//! ```
//! # use strata::config::AppConfig;
//! // Use default configuration
//! let config = AppConfig::default();
//! assert!(config.render().background_color().is_ok());
//! ```

use serde::Deserialize;

use strata_core::color::Color;

/// Top-level configuration combining layout and render settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Render configuration section.
    #[serde(default)]
    render: RenderConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified layout and render configurations.
    pub fn new(layout: LayoutConfig, render: RenderConfig) -> Self {
        Self { layout, render }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the render configuration.
    pub fn render(&self) -> &RenderConfig {
        &self.render
    }
}

/// Margins, gaps, and label-placement knobs for the layout engine.
///
/// All distances are diagram units. The layout engine validates the fields it
/// depends on (positive gaps and margins) before placing anything, so a bad
/// value fails with the field named rather than producing a broken diagram.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Horizontal margin between the canvas edge and layer bands.
    margin: f64,
    /// Margin above the first layer (or the title block).
    top_margin: f64,
    /// Margin below the last layer (or the terminator).
    bottom_margin: f64,
    /// Vertical gap between consecutive layers. Must be positive.
    layer_gap: f64,
    /// Vertical gap between the title block and the first layer.
    title_gap: f64,
    /// Clearance between a side panel and the layer band next to it.
    panel_clearance: f64,
    /// Width of the strip reserved for flow indicators.
    indicator_strip_width: f64,
    /// Length of the short arrows joining output tabs to their band.
    margin_arrow_length: f64,
    /// Perpendicular distance from a connector to its label.
    label_offset: f64,
    /// How much further out each label relocation attempt moves.
    label_retry_step: f64,
    /// Label relocation attempts before giving up.
    label_max_retries: usize,
    /// Font size for connector labels, in diagram units.
    label_font_size: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            margin: 1.0,
            top_margin: 0.7,
            bottom_margin: 0.5,
            layer_gap: 0.8,
            title_gap: 0.4,
            panel_clearance: 0.3,
            indicator_strip_width: 1.4,
            margin_arrow_length: 0.25,
            label_offset: 0.18,
            label_retry_step: 0.22,
            label_max_retries: 6,
            label_font_size: 0.125,
        }
    }
}

impl LayoutConfig {
    /// Returns the horizontal margin.
    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// Returns the top margin.
    pub fn top_margin(&self) -> f64 {
        self.top_margin
    }

    /// Returns the bottom margin.
    pub fn bottom_margin(&self) -> f64 {
        self.bottom_margin
    }

    /// Returns the vertical gap between consecutive layers.
    pub fn layer_gap(&self) -> f64 {
        self.layer_gap
    }

    /// Returns the gap between the title block and the first layer.
    pub fn title_gap(&self) -> f64 {
        self.title_gap
    }

    /// Returns the clearance between a side panel and the layer band.
    pub fn panel_clearance(&self) -> f64 {
        self.panel_clearance
    }

    /// Returns the width reserved for flow indicators.
    pub fn indicator_strip_width(&self) -> f64 {
        self.indicator_strip_width
    }

    /// Returns the length of output-tab arrows.
    pub fn margin_arrow_length(&self) -> f64 {
        self.margin_arrow_length
    }

    /// Returns the perpendicular connector-label offset.
    pub fn label_offset(&self) -> f64 {
        self.label_offset
    }

    /// Returns the step added to the offset on each relocation attempt.
    pub fn label_retry_step(&self) -> f64 {
        self.label_retry_step
    }

    /// Returns the label relocation attempt budget.
    pub fn label_max_retries(&self) -> usize {
        self.label_max_retries
    }

    /// Returns the connector-label font size in diagram units.
    pub fn label_font_size(&self) -> f64 {
        self.label_font_size
    }

    /// Overrides the horizontal margin.
    pub fn set_margin(&mut self, margin: f64) {
        self.margin = margin;
    }

    /// Overrides the layer gap.
    pub fn set_layer_gap(&mut self, gap: f64) {
        self.layer_gap = gap;
    }

    /// Overrides the label retry budget.
    pub fn set_label_max_retries(&mut self, retries: usize) {
        self.label_max_retries = retries;
    }
}

/// Scale, background, and encoder settings for rendering backends.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Device pixels per diagram unit.
    pixels_per_unit: f64,
    /// Background color string, or `None` for a transparent canvas.
    background: Option<String>,
    /// JPEG encoder quality, 1..=100.
    jpeg_quality: u8,
    /// Font stack the SVG backend names for all text.
    font_family: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            pixels_per_unit: 100.0,
            background: Some("white".to_string()),
            jpeg_quality: 90,
            font_family: "Helvetica, Arial, sans-serif".to_string(),
        }
    }
}

impl RenderConfig {
    /// Returns the number of device pixels per diagram unit.
    pub fn pixels_per_unit(&self) -> f64 {
        self.pixels_per_unit
    }

    /// Returns the parsed background [`Color`], or `None` if the canvas is
    /// transparent.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed
    /// into a valid [`Color`].
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }

    /// Returns the JPEG encoder quality.
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// Returns the font stack for SVG text.
    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    /// Overrides the background color string. `None` makes the canvas
    /// transparent.
    pub fn set_background(&mut self, background: Option<String>) {
        self.background = background;
    }

    /// Overrides the device scale.
    pub fn set_pixels_per_unit(&mut self, pixels_per_unit: f64) {
        self.pixels_per_unit = pixels_per_unit;
    }
}
