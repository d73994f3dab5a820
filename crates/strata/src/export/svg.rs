//! SVG drawing backend.
//!
//! # Overview
//!
//! Exported types:
//! - [`SvgSurface`]: A [`Surface`] backend that accumulates `svg` crate nodes
//!
//! The surface collects one element per drawing call, in paint order, and
//! [`SvgSurface::finish`] assembles them into a complete `svg::Document`:
//! viewBox and pixel dimensions, an optional background rectangle, arrowhead
//! marker definitions for every stroke color seen, then the content nodes.
//!
//! # Coordinate Mapping
//!
//! Scene geometry is y-up with the origin at the lower left; SVG is y-down
//! from the top left. Positions flip on the way in
//! (`device_y = (canvas_height - y) * pixels_per_unit`) and lengths scale by
//! `pixels_per_unit`. Stroke widths are already device pixels and pass through
//! unscaled, so borders keep the same visual weight at any canvas scale.

use std::collections::BTreeMap;

use svg::{node::element as svg_element, node::Text as SvgText, Document};

use strata_core::{
    apply_stroke,
    color::Color,
    draw::{ArrowOptions, HAlign, ShapeStyle, Surface, TextStyle, VAlign},
    geometry::{Circle, Point, Rect, Size},
    spec::SpecError,
};

use crate::config::RenderConfig;

/// A boxed SVG node ready to be added to the document.
type SvgNode = Box<dyn svg::Node>;

/// SVG rendering backend.
///
/// Create one per document, paint a scene onto it, then call
/// [`SvgSurface::finish`] to take the assembled document.
#[derive(Debug)]
pub struct SvgSurface {
    canvas: Size,
    pixels_per_unit: f64,
    font_family: String,
    background: Option<Color>,
    nodes: Vec<SvgNode>,
    markers: BTreeMap<String, Color>,
}

impl SvgSurface {
    /// Creates an empty surface for a canvas of the given size.
    ///
    /// # Errors
    ///
    /// Fails when the configured background color string does not parse or
    /// the device scale is not a positive finite number.
    pub fn new(canvas: Size, config: &RenderConfig) -> Result<Self, SpecError> {
        let scale = config.pixels_per_unit();
        if !(scale > 0.0 && scale.is_finite()) {
            return Err(SpecError::NonPositive {
                field: "render.pixels_per_unit".to_string(),
                value: scale,
            });
        }
        let background =
            config
                .background_color()
                .map_err(|message| SpecError::InvalidColor {
                    field: "render.background".to_string(),
                    message,
                })?;
        Ok(Self {
            canvas,
            pixels_per_unit: scale,
            font_family: config.font_family().to_string(),
            background,
            nodes: Vec::new(),
            markers: BTreeMap::new(),
        })
    }

    /// Assembles the collected nodes into a complete SVG document.
    pub fn finish(self) -> Document {
        let width = self.canvas.width() * self.pixels_per_unit;
        let height = self.canvas.height() * self.pixels_per_unit;

        let mut document = Document::new()
            .set("viewBox", format!("0 0 {width} {height}"))
            .set("width", width)
            .set("height", height);

        if let Some(background) = self.background {
            document = document.add(
                svg_element::Rectangle::new()
                    .set("x", 0)
                    .set("y", 0)
                    .set("width", width)
                    .set("height", height)
                    .set("fill", background.to_string())
                    .set("fill-opacity", background.alpha()),
            );
        }

        if !self.markers.is_empty() {
            document = document.add(marker_definitions(&self.markers));
        }

        for node in self.nodes {
            document = document.add(node);
        }

        document
    }

    fn device_x(&self, x: f64) -> f64 {
        x * self.pixels_per_unit
    }

    fn device_y(&self, y: f64) -> f64 {
        (self.canvas.height() - y) * self.pixels_per_unit
    }

    fn device_len(&self, len: f64) -> f64 {
        len * self.pixels_per_unit
    }

    /// Registers an arrowhead marker for `color` and returns its reference.
    fn marker_reference(&mut self, color: Color) -> String {
        let id = format!("arrow-{}", color.to_id_safe_string());
        self.markers.entry(id.clone()).or_insert(color);
        format!("url(#{id})")
    }
}

impl Surface for SvgSurface {
    fn draw_rect(&mut self, rect: Rect, style: &ShapeStyle) {
        let element = svg_element::Rectangle::new()
            .set("x", self.device_x(rect.min_x()))
            .set("y", self.device_y(rect.max_y()))
            .set("width", self.device_len(rect.width()))
            .set("height", self.device_len(rect.height()))
            .set("fill", "none");
        let mut element = apply_stroke!(element, &style.stroke);
        if let Some(fill) = &style.fill {
            element = element
                .set("fill", fill.to_string())
                .set("fill-opacity", fill.alpha());
        }
        self.nodes.push(Box::new(element));
    }

    fn draw_circle(&mut self, circle: Circle, style: &ShapeStyle) {
        let element = svg_element::Circle::new()
            .set("cx", self.device_x(circle.center().x()))
            .set("cy", self.device_y(circle.center().y()))
            .set("r", self.device_len(circle.radius()))
            .set("fill", "none");
        let mut element = apply_stroke!(element, &style.stroke);
        if let Some(fill) = &style.fill {
            element = element
                .set("fill", fill.to_string())
                .set("fill-opacity", fill.alpha());
        }
        self.nodes.push(Box::new(element));
    }

    fn draw_arrow(&mut self, from: Point, to: Point, options: &ArrowOptions) {
        let path_data = format!(
            "M {} {} L {} {}",
            self.device_x(from.x()),
            self.device_y(from.y()),
            self.device_x(to.x()),
            self.device_y(to.y())
        );
        let path = svg_element::Path::new()
            .set("d", path_data)
            .set("fill", "none");
        let mut path = apply_stroke!(path, &options.stroke);
        if options.head {
            let marker = self.marker_reference(options.stroke.color());
            path = path.set("marker-end", marker);
        }
        self.nodes.push(Box::new(path));
    }

    fn draw_text(
        &mut self,
        anchor: Point,
        content: &str,
        style: &TextStyle,
        h_align: HAlign,
        v_align: VAlign,
    ) {
        if content.is_empty() {
            return;
        }

        let lines: Vec<&str> = content.split('\n').collect();
        let line_height = self.device_len(style.line_height());
        let total_height = line_height * lines.len() as f64;
        let anchor_y = self.device_y(anchor.y());

        // Device y of the block's top edge. The anchor's meaning flips with
        // the axis: a y-up "top" alignment pins the block below the anchor in
        // device space.
        let block_top = match v_align {
            VAlign::Top => anchor_y,
            VAlign::Middle => anchor_y - total_height / 2.0,
            VAlign::Bottom => anchor_y - total_height,
        };

        let x = self.device_x(anchor.x());
        let text_anchor = match h_align {
            HAlign::Left => "start",
            HAlign::Center => "middle",
            HAlign::Right => "end",
        };
        let color = style.resolve_color().unwrap_or_default();

        // Each tspan steps down by one line height, so the text element's y
        // sits half a line above the block: the first tspan's central
        // baseline then lands at block_top + line_height / 2.
        let mut element = svg_element::Text::new("")
            .set("x", x)
            .set("y", block_top - line_height / 2.0)
            .set("text-anchor", text_anchor)
            .set("dominant-baseline", "central")
            .set("font-family", self.font_family.as_str())
            .set("font-size", self.device_len(style.font_size()))
            .set("fill", color.to_string())
            .set("fill-opacity", color.alpha());
        if style.is_bold() {
            element = element.set("font-weight", "bold");
        }
        if style.is_italic() {
            element = element.set("font-style", "italic");
        }

        for line in lines {
            let tspan = svg_element::TSpan::new("")
                .set("x", x)
                .set("dy", line_height)
                .add(SvgText::new(line));
            element = element.add(tspan);
        }

        self.nodes.push(Box::new(element));
    }
}

/// Builds arrowhead markers for every stroke color used by headed arrows.
fn marker_definitions(markers: &BTreeMap<String, Color>) -> svg_element::Definitions {
    let mut defs = svg_element::Definitions::new();
    for (id, color) in markers {
        let head = svg_element::Path::new()
            .set("d", "M 0 0 L 10 5 L 0 10 z")
            .set("fill", color.to_string());
        let marker = svg_element::Marker::new()
            .set("id", id.as_str())
            .set("viewBox", "0 0 10 10")
            .set("refX", 9)
            .set("refY", 5)
            .set("markerWidth", 6)
            .set("markerHeight", 6)
            .set("orient", "auto")
            .add(head);
        defs = defs.add(marker);
    }
    defs
}

#[cfg(test)]
mod tests {
    use strata_core::draw::StrokeDefinition;

    use super::*;

    fn surface(width: f64, height: f64) -> SvgSurface {
        SvgSurface::new(Size::new(width, height), &RenderConfig::default()).unwrap()
    }

    #[test]
    fn test_document_dimensions_and_background() {
        let rendered = surface(6.0, 4.0).finish().to_string();
        // 6x4 diagram units at the default 100 px/unit
        assert!(rendered.contains("width=\"600\""));
        assert!(rendered.contains("height=\"400\""));
        assert!(rendered.contains("viewBox=\"0 0 600 400\""));
        assert!(rendered.contains("fill=\"white\""));
    }

    #[test]
    fn test_transparent_background_draws_no_rect() {
        let mut config = RenderConfig::default();
        config.set_background(None);
        let svg = SvgSurface::new(Size::new(6.0, 4.0), &config).unwrap();
        let rendered = svg.finish().to_string();
        assert!(!rendered.contains("<rect"));
    }

    #[test]
    fn test_invalid_background_is_rejected() {
        let mut config = RenderConfig::default();
        config.set_background(Some("not-a-color".to_string()));
        let err = SvgSurface::new(Size::new(6.0, 4.0), &config).unwrap_err();
        match err {
            SpecError::InvalidColor { field, .. } => assert_eq!(field, "render.background"),
            other => panic!("expected InvalidColor, got {other:?}"),
        }
    }

    #[test]
    fn test_non_positive_scale_is_rejected() {
        let mut config = RenderConfig::default();
        config.set_pixels_per_unit(0.0);
        let err = SvgSurface::new(Size::new(6.0, 4.0), &config).unwrap_err();
        match err {
            SpecError::NonPositive { field, .. } => assert_eq!(field, "render.pixels_per_unit"),
            other => panic!("expected NonPositive, got {other:?}"),
        }
    }

    #[test]
    fn test_rect_flips_y_axis() {
        let mut svg = surface(6.0, 4.0);
        svg.draw_rect(Rect::new(0.5, 1.0, 2.0, 1.0), &ShapeStyle::default());
        let rendered = svg.finish().to_string();
        // min_x 0.5 -> 50; max_y 2.0 -> (4 - 2) * 100 = 200 from the top
        assert!(rendered.contains("x=\"50\""));
        assert!(rendered.contains("y=\"200\""));
        assert!(rendered.contains("width=\"200\""));
        assert!(rendered.contains("height=\"100\""));
    }

    #[test]
    fn test_outline_shape_has_no_fill() {
        let mut svg = surface(6.0, 4.0);
        svg.draw_rect(Rect::new(1.0, 1.0, 2.0, 1.0), &ShapeStyle::default());
        let rendered = svg.finish().to_string();
        assert!(rendered.contains("fill=\"none\""));
    }

    #[test]
    fn test_circle_position_and_radius() {
        let mut svg = surface(6.0, 4.0);
        svg.draw_circle(
            Circle::new(Point::new(3.0, 1.0), 0.5),
            &ShapeStyle::default(),
        );
        let rendered = svg.finish().to_string();
        assert!(rendered.contains("cx=\"300\""));
        assert!(rendered.contains("cy=\"300\""));
        assert!(rendered.contains("r=\"50\""));
    }

    #[test]
    fn test_headed_arrows_share_one_marker_per_color() {
        let mut svg = surface(6.0, 4.0);
        let options = ArrowOptions::default();
        svg.draw_arrow(Point::new(1.0, 3.0), Point::new(1.0, 2.0), &options);
        svg.draw_arrow(Point::new(2.0, 3.0), Point::new(2.0, 2.0), &options);
        let rendered = svg.finish().to_string();
        assert_eq!(rendered.matches("<marker").count(), 1);
        assert_eq!(
            rendered.matches("marker-end=\"url(#arrow-black)\"").count(),
            2
        );
        // first arrow drops from diagram y 3 to y 2: device 100 down to 200
        assert!(rendered.contains("d=\"M 100 100 L 100 200\""));
    }

    #[test]
    fn test_headless_line_has_no_marker() {
        let mut svg = surface(6.0, 4.0);
        svg.draw_arrow(
            Point::new(1.0, 3.0),
            Point::new(1.0, 2.0),
            &ArrowOptions::line(StrokeDefinition::default()),
        );
        let rendered = svg.finish().to_string();
        assert!(!rendered.contains("marker-end"));
        assert!(!rendered.contains("<defs"));
    }

    #[test]
    fn test_dashed_stroke_emits_dasharray() {
        let mut svg = surface(6.0, 4.0);
        let options = ArrowOptions::line(StrokeDefinition::dashed(Color::default(), 1.5));
        svg.draw_arrow(Point::new(1.0, 3.0), Point::new(1.0, 2.0), &options);
        let rendered = svg.finish().to_string();
        assert!(rendered.contains("stroke-dasharray=\"5,5\""));
    }

    #[test]
    fn test_text_block_centers_on_anchor() {
        let mut svg = surface(6.0, 4.0);
        svg.draw_text(
            Point::new(3.0, 2.0),
            "AB\nCD",
            &TextStyle::new(0.25),
            HAlign::Center,
            VAlign::Middle,
        );
        let rendered = svg.finish().to_string();
        // line height 0.25 * 1.2 = 0.3 units = 30 px, block 60 px tall,
        // anchor at device y 200, so block top 170 and text y 170 - 15 = 155
        assert!(rendered.contains("y=\"155\""));
        assert_eq!(rendered.matches("<tspan").count(), 2);
        assert!(rendered.contains("dy=\"30\""));
        assert!(rendered.contains("text-anchor=\"middle\""));
        assert!(rendered.contains("font-size=\"25\""));
    }

    #[test]
    fn test_top_aligned_text_hangs_below_anchor() {
        let mut svg = surface(6.0, 4.0);
        svg.draw_text(
            Point::new(1.0, 3.0),
            "TITLE",
            &TextStyle::new(0.25),
            HAlign::Left,
            VAlign::Top,
        );
        let rendered = svg.finish().to_string();
        // anchor device y 100 is the block top; text y sits half a line above
        assert!(rendered.contains("y=\"85\""));
        assert!(rendered.contains("text-anchor=\"start\""));
    }

    #[test]
    fn test_bold_italic_text_attributes() {
        let mut svg = surface(6.0, 4.0);
        svg.draw_text(
            Point::new(1.0, 1.0),
            "label",
            &TextStyle::new(0.2).bold().italic(),
            HAlign::Center,
            VAlign::Middle,
        );
        let rendered = svg.finish().to_string();
        assert!(rendered.contains("font-weight=\"bold\""));
        assert!(rendered.contains("font-style=\"italic\""));
    }

    #[test]
    fn test_empty_text_draws_nothing() {
        let mut svg = surface(6.0, 4.0);
        svg.draw_text(
            Point::new(1.0, 1.0),
            "",
            &TextStyle::default(),
            HAlign::Center,
            VAlign::Middle,
        );
        let rendered = svg.finish().to_string();
        assert!(!rendered.contains("<text"));
    }
}
