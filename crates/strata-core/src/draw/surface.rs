//! The drawing surface contract.
//!
//! # Overview
//!
//! Exported types:
//! - [`Surface`]: The trait a rendering backend implements
//! - [`ShapeStyle`]: Fill + stroke for rectangles and circles
//! - [`ArrowOptions`]: Stroke + head flag for connector lines
//!
//! The layout engine and the scene never talk to a concrete backend. They
//! paint through this four-call contract, and a backend (SVG, or a test
//! recorder) decides what the calls become. All coordinates passed in are
//! diagram coordinates (y-up); any device-space flipping happens behind the
//! trait.

use crate::{
    color::Color,
    draw::{HAlign, StrokeDefinition, TextStyle, VAlign},
    geometry::{Circle, Point, Rect},
};

/// Fill and border styling for a closed shape.
///
/// A shape with `fill: None` draws only its border. Whether a shape is
/// opaque for layout purposes is decided before painting; by the time a
/// `ShapeStyle` reaches a backend it is purely visual.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeStyle {
    /// Interior color, or `None` for an unfilled outline.
    pub fill: Option<Color>,
    /// Border stroke.
    pub stroke: StrokeDefinition,
}

impl ShapeStyle {
    /// Creates a filled shape with a default border.
    pub fn filled(fill: Color) -> Self {
        Self {
            fill: Some(fill),
            stroke: StrokeDefinition::default(),
        }
    }

    /// Creates a border-only shape.
    pub fn outline(stroke: StrokeDefinition) -> Self {
        Self { fill: None, stroke }
    }

    /// Returns this style with the given stroke.
    pub fn with_stroke(mut self, stroke: StrokeDefinition) -> Self {
        self.stroke = stroke;
        self
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            fill: None,
            stroke: StrokeDefinition::default(),
        }
    }
}

/// Styling for a connector line.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowOptions {
    /// Line stroke (color, width, dash pattern).
    pub stroke: StrokeDefinition,
    /// Whether to draw an arrowhead at the destination.
    pub head: bool,
}

impl ArrowOptions {
    /// Creates arrow options with a head and the given stroke.
    pub fn new(stroke: StrokeDefinition) -> Self {
        Self { stroke, head: true }
    }

    /// Creates a headless line with the given stroke.
    pub fn line(stroke: StrokeDefinition) -> Self {
        Self {
            stroke,
            head: false,
        }
    }
}

impl Default for ArrowOptions {
    fn default() -> Self {
        Self {
            stroke: StrokeDefinition::default(),
            head: true,
        }
    }
}

/// The contract between placed geometry and a rendering backend.
///
/// Implementations collect drawing calls; they never fail. Errors surface
/// later, when the backend's output is serialized or encoded.
pub trait Surface {
    /// Draws an axis-aligned rectangle.
    fn draw_rect(&mut self, rect: Rect, style: &ShapeStyle);

    /// Draws a circle.
    fn draw_circle(&mut self, circle: Circle, style: &ShapeStyle);

    /// Draws a straight connector from `from` to `to`, with an optional head
    /// at `to`.
    fn draw_arrow(&mut self, from: Point, to: Point, options: &ArrowOptions);

    /// Draws a text block hung off `anchor` according to the alignments.
    ///
    /// Multi-line content (embedded `\n`) is laid out top line first, stepping
    /// downward by the style's line height.
    fn draw_text(
        &mut self,
        anchor: Point,
        content: &str,
        style: &TextStyle,
        h_align: HAlign,
        v_align: VAlign,
    );
}
