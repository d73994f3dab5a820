//! The placement result: resolved geometry ready to paint.
//!
//! # Overview
//!
//! A [`Scene`] is what the layout engine produces: flat lists of placed
//! primitives, each carrying its final rectangle (or segment, or circle) and
//! a fully resolved style. Nothing in a scene refers back to the description
//! it came from except through [`BoxRef`] addresses, which the connector
//! router and the overlap sweep use to identify boxes.
//!
//! Painting goes through the [`Surface`] contract and follows a fixed
//! z-order: band backdrops, then panels, then content boxes, then circles,
//! then arrows, with text always on top. [`RenderLayer`]'s variant order IS
//! the z-order, bottom to top.

use strata_core::{
    draw::{ArrowOptions, HAlign, ShapeStyle, Surface, TextStyle, VAlign},
    geometry::{Circle, Point, Rect, Size},
    spec::BoxRef,
};

/// Defines the painting order for placed boxes.
///
/// Boxes are painted from bottom to top in the order defined by variant
/// declaration. The `Ord` derive uses declaration order, so the first variant
/// paints first (bottom), and the last variant paints last (top).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderLayer {
    /// Band rectangles framing whole layers - paints first
    Band,
    /// Side panel backdrops
    Panel,
    /// Content boxes: children, branches, panel items, indicators, outputs
    Content,
}

impl RenderLayer {
    /// Returns a human-readable name for this layer.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Band => "band",
            Self::Panel => "panel",
            Self::Content => "content",
        }
    }
}

/// A rectangle with resolved position and style.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedBox {
    reference: BoxRef,
    container: Option<BoxRef>,
    rect: Rect,
    style: ShapeStyle,
    opaque: bool,
    layer: RenderLayer,
}

impl PlacedBox {
    /// Creates a placed box.
    pub fn new(
        reference: BoxRef,
        rect: Rect,
        style: ShapeStyle,
        opaque: bool,
        layer: RenderLayer,
    ) -> Self {
        Self {
            reference,
            container: None,
            rect,
            style,
            opaque,
            layer,
        }
    }

    /// Returns this box recorded as content of `container`.
    ///
    /// A container and its content are exempt from the mutual overlap check;
    /// a band is SUPPOSED to sit under its children.
    pub fn inside(mut self, container: BoxRef) -> Self {
        self.container = Some(container);
        self
    }

    /// Returns the address of this box.
    pub fn reference(&self) -> BoxRef {
        self.reference
    }

    /// Returns the address of the box containing this one, if any.
    pub fn container(&self) -> Option<BoxRef> {
        self.container
    }

    /// Returns the placed rectangle.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Returns the resolved style.
    pub fn style(&self) -> &ShapeStyle {
        &self.style
    }

    /// Returns `true` if this box participates in the no-overlap guarantee.
    pub fn is_opaque(&self) -> bool {
        self.opaque
    }

    /// Returns the painting layer.
    pub fn layer(&self) -> RenderLayer {
        self.layer
    }

    /// Returns `true` if `self` and `other` form a container/content pair.
    pub fn is_related_to(&self, other: &PlacedBox) -> bool {
        self.container == Some(other.reference) || other.container == Some(self.reference)
    }
}

/// A circle with resolved position and style.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedCircle {
    reference: BoxRef,
    circle: Circle,
    style: ShapeStyle,
    opaque: bool,
}

impl PlacedCircle {
    /// Creates a placed circle.
    pub fn new(reference: BoxRef, circle: Circle, style: ShapeStyle, opaque: bool) -> Self {
        Self {
            reference,
            circle,
            style,
            opaque,
        }
    }

    /// Returns the address of this circle.
    pub fn reference(&self) -> BoxRef {
        self.reference
    }

    /// Returns the placed circle.
    pub fn circle(&self) -> Circle {
        self.circle
    }

    /// Returns the resolved style.
    pub fn style(&self) -> &ShapeStyle {
        &self.style
    }

    /// Returns `true` if this circle participates in the no-overlap guarantee
    /// (by its bounding rectangle).
    pub fn is_opaque(&self) -> bool {
        self.opaque
    }
}

/// A routed connector segment.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedArrow {
    from: Point,
    to: Point,
    options: ArrowOptions,
}

impl PlacedArrow {
    /// Creates a placed arrow.
    pub fn new(from: Point, to: Point, options: ArrowOptions) -> Self {
        Self { from, to, options }
    }

    /// Returns the segment start.
    pub fn from(&self) -> Point {
        self.from
    }

    /// Returns the segment end (where the head goes, if any).
    pub fn to(&self) -> Point {
        self.to
    }

    /// Returns the arrow styling.
    pub fn options(&self) -> &ArrowOptions {
        &self.options
    }
}

/// A text block with resolved anchor and estimated extent.
///
/// The extent rectangle is what collision avoidance used; backends lay the
/// glyphs out themselves from the anchor and alignments.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLabel {
    text: String,
    anchor: Point,
    style: TextStyle,
    h_align: HAlign,
    v_align: VAlign,
    extent: Rect,
}

impl PlacedLabel {
    /// Creates a centered label at `anchor`.
    pub fn centered(text: impl Into<String>, anchor: Point, style: TextStyle) -> Self {
        let text = text.into();
        let size = style.estimate_size(&text);
        Self {
            text,
            anchor,
            style,
            h_align: HAlign::Center,
            v_align: VAlign::Middle,
            extent: Rect::new_from_center(anchor, size),
        }
    }

    /// Creates a label with explicit alignments; the extent follows the
    /// anchor and alignments.
    pub fn aligned(
        text: impl Into<String>,
        anchor: Point,
        style: TextStyle,
        h_align: HAlign,
        v_align: VAlign,
    ) -> Self {
        let text = text.into();
        let size = style.estimate_size(&text);
        let min_x = match h_align {
            HAlign::Left => anchor.x(),
            HAlign::Center => anchor.x() - size.width() / 2.0,
            HAlign::Right => anchor.x() - size.width(),
        };
        let min_y = match v_align {
            VAlign::Top => anchor.y() - size.height(),
            VAlign::Middle => anchor.y() - size.height() / 2.0,
            VAlign::Bottom => anchor.y(),
        };
        Self {
            text,
            anchor,
            style,
            h_align,
            v_align,
            extent: Rect::new(min_x, min_y, size.width(), size.height()),
        }
    }

    /// Returns the label text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the anchor point.
    pub fn anchor(&self) -> Point {
        self.anchor
    }

    /// Returns the text style.
    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    /// Returns the horizontal alignment.
    pub fn h_align(&self) -> HAlign {
        self.h_align
    }

    /// Returns the vertical alignment.
    pub fn v_align(&self) -> VAlign {
        self.v_align
    }

    /// Returns the estimated extent used for collision checks.
    pub fn extent(&self) -> Rect {
        self.extent
    }
}

/// The complete placement result for one diagram.
///
/// Scenes are immutable once the engine returns them; rendering the same
/// scene twice paints the same calls in the same order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    canvas: Size,
    boxes: Vec<PlacedBox>,
    circles: Vec<PlacedCircle>,
    arrows: Vec<PlacedArrow>,
    labels: Vec<PlacedLabel>,
}

impl Scene {
    /// Creates an empty scene on a canvas of the given size.
    pub fn new(canvas: Size) -> Self {
        Self {
            canvas,
            ..Self::default()
        }
    }

    /// Returns the canvas size.
    pub fn canvas_size(&self) -> Size {
        self.canvas
    }

    /// Returns all placed boxes, in placement order.
    pub fn boxes(&self) -> &[PlacedBox] {
        &self.boxes
    }

    /// Returns all placed circles.
    pub fn circles(&self) -> &[PlacedCircle] {
        &self.circles
    }

    /// Returns all routed arrows.
    pub fn arrows(&self) -> &[PlacedArrow] {
        &self.arrows
    }

    /// Returns all placed labels.
    pub fn labels(&self) -> &[PlacedLabel] {
        &self.labels
    }

    /// Looks up a placed box by address.
    pub fn find_box(&self, reference: BoxRef) -> Option<&PlacedBox> {
        self.boxes.iter().find(|b| b.reference() == reference)
    }

    pub(crate) fn push_box(&mut self, placed: PlacedBox) {
        self.boxes.push(placed);
    }

    pub(crate) fn push_circle(&mut self, placed: PlacedCircle) {
        self.circles.push(placed);
    }

    pub(crate) fn push_arrow(&mut self, placed: PlacedArrow) {
        self.arrows.push(placed);
    }

    pub(crate) fn push_label(&mut self, placed: PlacedLabel) {
        self.labels.push(placed);
    }

    /// Paints the scene through the drawing contract.
    ///
    /// Boxes are painted in [`RenderLayer`] order (stable within a layer),
    /// then circles, then arrows, then labels. Painting never fails; backends
    /// report their problems when their output is finished.
    pub fn paint(&self, surface: &mut dyn Surface) {
        let mut ordered: Vec<&PlacedBox> = self.boxes.iter().collect();
        ordered.sort_by_key(|b| b.layer());

        for placed in ordered {
            surface.draw_rect(placed.rect(), placed.style());
        }
        for placed in &self.circles {
            surface.draw_circle(placed.circle(), placed.style());
        }
        for placed in &self.arrows {
            surface.draw_arrow(placed.from(), placed.to(), placed.options());
        }
        for placed in &self.labels {
            surface.draw_text(
                placed.anchor(),
                placed.text(),
                placed.style(),
                placed.h_align(),
                placed.v_align(),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use strata_core::geometry::Point;

    use super::*;

    /// Surface that records the order of draw calls.
    #[derive(Debug, Default)]
    struct RecordingSurface {
        calls: Vec<String>,
    }

    impl Surface for RecordingSurface {
        fn draw_rect(&mut self, rect: Rect, _style: &ShapeStyle) {
            self.calls.push(format!("rect@{}", rect.min_x()));
        }

        fn draw_circle(&mut self, _circle: Circle, _style: &ShapeStyle) {
            self.calls.push("circle".to_string());
        }

        fn draw_arrow(&mut self, _from: Point, _to: Point, _options: &ArrowOptions) {
            self.calls.push("arrow".to_string());
        }

        fn draw_text(
            &mut self,
            _anchor: Point,
            content: &str,
            _style: &TextStyle,
            _h_align: HAlign,
            _v_align: VAlign,
        ) {
            self.calls.push(format!("text:{content}"));
        }
    }

    fn content_box(reference: BoxRef, x: f64) -> PlacedBox {
        PlacedBox::new(
            reference,
            Rect::new(x, 0.0, 1.0, 1.0),
            ShapeStyle::default(),
            true,
            RenderLayer::Content,
        )
    }

    #[test]
    fn test_paint_orders_bands_under_content() {
        let mut scene = Scene::new(Size::new(10.0, 10.0));
        // Content pushed before its band; the sort must still put the band first
        scene.push_box(content_box(BoxRef::Child { layer: 0, index: 0 }, 2.0));
        scene.push_box(PlacedBox::new(
            BoxRef::Layer(0),
            Rect::new(1.0, 0.0, 8.0, 2.0),
            ShapeStyle::default(),
            true,
            RenderLayer::Band,
        ));
        scene.push_label(PlacedLabel::centered(
            "on top",
            Point::new(5.0, 5.0),
            TextStyle::default(),
        ));
        scene.push_arrow(PlacedArrow::new(
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            ArrowOptions::default(),
        ));

        let mut surface = RecordingSurface::default();
        scene.paint(&mut surface);

        assert_eq!(
            surface.calls,
            vec!["rect@1", "rect@2", "arrow", "text:on top"]
        );
    }

    #[test]
    fn test_find_box_by_reference() {
        let mut scene = Scene::new(Size::new(10.0, 10.0));
        scene.push_box(content_box(BoxRef::Child { layer: 1, index: 2 }, 3.0));

        let found = scene.find_box(BoxRef::Child { layer: 1, index: 2 });
        assert!(found.is_some());
        assert!(scene.find_box(BoxRef::Layer(0)).is_none());
    }

    #[test]
    fn test_container_content_related() {
        let band = PlacedBox::new(
            BoxRef::Layer(0),
            Rect::new(0.0, 0.0, 10.0, 2.0),
            ShapeStyle::default(),
            true,
            RenderLayer::Band,
        );
        let child =
            content_box(BoxRef::Child { layer: 0, index: 0 }, 1.0).inside(BoxRef::Layer(0));
        let stranger = content_box(BoxRef::Child { layer: 1, index: 0 }, 5.0);

        assert!(band.is_related_to(&child));
        assert!(child.is_related_to(&band));
        assert!(!band.is_related_to(&stranger));
        // Siblings are NOT related; they must not overlap each other
        let sibling =
            content_box(BoxRef::Child { layer: 0, index: 1 }, 4.0).inside(BoxRef::Layer(0));
        assert!(!child.is_related_to(&sibling));
    }

    #[test]
    fn test_label_extent_alignments() {
        let style = TextStyle::new(0.2);
        let anchor = Point::new(5.0, 5.0);

        let centered = PlacedLabel::centered("abcd", anchor, style.clone());
        assert_approx_eq!(f64, centered.extent().center().x(), 5.0);
        assert_approx_eq!(f64, centered.extent().center().y(), 5.0);

        let left =
            PlacedLabel::aligned("abcd", anchor, style.clone(), HAlign::Left, VAlign::Middle);
        assert_approx_eq!(f64, left.extent().min_x(), 5.0);

        let below = PlacedLabel::aligned("abcd", anchor, style, HAlign::Center, VAlign::Top);
        assert_approx_eq!(f64, below.extent().max_y(), 5.0);
    }
}
