//! Connector routing.
//!
//! # Overview
//!
//! After placement the scene has boxes but no arrows. Routing adds the
//! four connector families in a fixed order:
//!
//! 1. Auto-flow arrows between consecutive layers, and from the last layer
//!    to the terminator.
//! 2. Branch connectors from a band (or its child nearest the branch) to
//!    each branch box.
//! 3. Margin connectors: the short arrow joining each output tab to its
//!    band, and the dashed chain running down the flow indicators.
//! 4. Explicit connectors between any two referenced boxes.
//!
//! A connector label sits at the connector midpoint, pushed off the line
//! by the configured offset. When that position collides with an opaque
//! box or an earlier label, the label slides further out in fixed steps;
//! exhausting the attempt budget is a [`LayoutError::LabelPlacement`],
//! never a silent overlap.

use log::debug;

use strata_core::{
    color::Color,
    draw::{ArrowOptions, StrokeDefinition, TextStyle},
    geometry::{Circle, Point, Rect, Side},
    spec::{BoxRef, DiagramSpec, LayerSpec},
};

use crate::{
    config::LayoutConfig,
    error::LayoutError,
    layout::{LayerFrame, penetrates},
    scene::{PlacedArrow, PlacedLabel, Scene},
};

const EPSILON: f64 = 1e-9;

/// Stroke width for connector arrows, in device pixels.
const ARROW_WIDTH: f32 = 1.5;

/// Routes every connector of `spec` into `scene`.
pub(crate) fn route(
    spec: &DiagramSpec,
    config: &LayoutConfig,
    frames: &[LayerFrame],
    scene: &mut Scene,
) -> Result<(), LayoutError> {
    let mut router = Router {
        spec,
        config,
        frames,
        obstacles: collect_obstacles(scene),
        claims: Vec::new(),
    };
    router.route_flow(scene);
    router.route_branches(scene)?;
    router.route_margins(scene);
    router.route_explicit(scene)
}

/// Rectangles connector labels must not cover.
fn collect_obstacles(scene: &Scene) -> Vec<Rect> {
    let mut obstacles = Vec::new();
    for placed in scene.boxes() {
        if placed.is_opaque() {
            obstacles.push(placed.rect());
        }
    }
    for placed in scene.circles() {
        if placed.is_opaque() {
            obstacles.push(placed.circle().bounding_rect());
        }
    }
    obstacles
}

struct Router<'a> {
    spec: &'a DiagramSpec,
    config: &'a LayoutConfig,
    frames: &'a [LayerFrame],
    obstacles: Vec<Rect>,
    claims: Vec<Rect>,
}

impl Router<'_> {
    /// Vertical arrows down the main flow, one per consecutive layer pair,
    /// plus the arrow into the terminator.
    fn route_flow(&self, scene: &mut Scene) {
        if !self.spec.flow.auto {
            return;
        }
        for k in 1..self.frames.len() {
            let from = self.frames[k - 1].flow_box().bottom_center();
            let to = self.frames[k].flow_box().top_center();
            scene.push_arrow(PlacedArrow::new(
                from,
                to,
                ArrowOptions::new(self.flow_stroke()),
            ));
        }
        if self.spec.terminator.is_some() {
            let Some(circle) = terminator_circle(scene) else {
                return;
            };
            let Some(last) = self.frames.last() else {
                return;
            };
            let top = Point::new(
                circle.center().x(),
                circle.center().y() + circle.radius(),
            );
            scene.push_arrow(PlacedArrow::new(
                last.flow_box().bottom_center(),
                top,
                ArrowOptions::new(self.flow_stroke()),
            ));
        }
    }

    fn flow_stroke(&self) -> StrokeDefinition {
        if self.spec.flow.dashed {
            StrokeDefinition::dashed(Color::default(), ARROW_WIDTH)
        } else {
            StrokeDefinition::default()
        }
    }

    /// Horizontal connectors from each band out to its branch boxes.
    fn route_branches(&mut self, scene: &mut Scene) -> Result<(), LayoutError> {
        let spec = self.spec;
        let frames = self.frames;
        for (k, (layer, frame)) in spec.layers.iter().zip(frames).enumerate() {
            for (j, branch) in layer.branches.iter().enumerate() {
                let reference = BoxRef::Branch { layer: k, index: j };
                let Some(target) = scene.find_box(reference).map(|b| b.rect()) else {
                    continue;
                };
                let source = branch_source(layer, k, branch.side, frame, scene);
                let from = source.anchor(branch.side, 0.5);
                let to = target.anchor(branch.side.opposite(), 0.5);
                scene.push_arrow(PlacedArrow::new(
                    from,
                    to,
                    ArrowOptions::new(StrokeDefinition::default()),
                ));
                if let Some(text) = &branch.connector_label {
                    let connector = format!("branch connector to {reference}");
                    self.place_label(scene, connector, text, from, to)?;
                }
            }
        }
        Ok(())
    }

    /// Output-tab arrows and the dashed indicator chain.
    fn route_margins(&self, scene: &mut Scene) {
        for (k, layer) in self.spec.layers.iter().enumerate() {
            if layer.output.is_none() {
                continue;
            }
            let Some(tab) = scene.find_box(BoxRef::Output(k)).map(|b| b.rect()) else {
                continue;
            };
            let from = Point::new(self.frames[k].band().max_x(), tab.center().y());
            scene.push_arrow(PlacedArrow::new(
                from,
                tab.left_center(),
                ArrowOptions::new(StrokeDefinition::default()),
            ));
        }

        let mut previous: Option<Rect> = None;
        for k in 0..self.spec.indicators.len() {
            let Some(rect) = scene.find_box(BoxRef::Indicator(k)).map(|b| b.rect()) else {
                continue;
            };
            if let Some(above) = previous {
                scene.push_arrow(PlacedArrow::new(
                    above.bottom_center(),
                    rect.top_center(),
                    ArrowOptions::new(StrokeDefinition::dashed(Color::default(), ARROW_WIDTH)),
                ));
            }
            previous = Some(rect);
        }
    }

    /// Connectors the description names box to box.
    fn route_explicit(&mut self, scene: &mut Scene) -> Result<(), LayoutError> {
        let spec = self.spec;
        for (i, connector) in spec.connectors.iter().enumerate() {
            let Some(from_shape) = self.endpoint(connector.from, scene) else {
                continue;
            };
            let Some(to_shape) = self.endpoint(connector.to, scene) else {
                continue;
            };
            let from = from_shape.anchor_toward(to_shape.center());
            let to = to_shape.anchor_toward(from_shape.center());
            let stroke = if connector.dashed {
                StrokeDefinition::dashed(Color::default(), ARROW_WIDTH)
            } else {
                StrokeDefinition::default()
            };
            scene.push_arrow(PlacedArrow::new(from, to, ArrowOptions::new(stroke)));
            if let Some(text) = &connector.label {
                let name = format!(
                    "connector {i} from {} to {}",
                    connector.from, connector.to
                );
                self.place_label(scene, name, text, from, to)?;
            }
        }
        Ok(())
    }

    /// Resolves a reference to the placed shape a connector attaches to.
    fn endpoint(&self, reference: BoxRef, scene: &Scene) -> Option<Endpoint> {
        match reference {
            BoxRef::Terminator => terminator_circle(scene).map(Endpoint::Circle),
            // The band span stands in for a layer even when no frame is
            // drawn for it.
            BoxRef::Layer(k) => self.frames.get(k).map(|frame| Endpoint::Box(frame.band())),
            other => scene.find_box(other).map(|b| Endpoint::Box(b.rect())),
        }
    }

    /// Places a connector label at the midpoint, sliding outward along the
    /// connector normal until it collides with nothing.
    fn place_label(
        &mut self,
        scene: &mut Scene,
        connector: String,
        text: &str,
        from: Point,
        to: Point,
    ) -> Result<(), LayoutError> {
        let style = TextStyle::new(self.config.label_font_size()).bold();
        let size = style.estimate_size(text);
        let mid = from.midpoint(to);
        let (nx, ny) = label_normal(from, to);
        // Offset measures line-to-near-edge, so push the center out by half
        // the label extent along the normal as well.
        let half = (nx.abs() * size.width() + ny.abs() * size.height()) / 2.0;
        let canvas = Rect::new(
            0.0,
            0.0,
            scene.canvas_size().width(),
            scene.canvas_size().height(),
        );

        let budget = self.config.label_max_retries();
        for attempt in 0..=budget {
            let distance =
                self.config.label_offset() + attempt as f64 * self.config.label_retry_step() + half;
            let center = Point::new(mid.x() + nx * distance, mid.y() + ny * distance);
            let extent = Rect::new_from_center(center, size);
            if self.is_free(&extent, &canvas) {
                debug!(connector = connector.as_str(), attempt = attempt; "placed connector label");
                self.claims.push(extent);
                scene.push_label(PlacedLabel::centered(text, center, style.clone()));
                return Ok(());
            }
        }
        Err(LayoutError::LabelPlacement {
            connector,
            label: text.to_string(),
            attempts: budget + 1,
        })
    }

    fn is_free(&self, extent: &Rect, canvas: &Rect) -> bool {
        canvas.contains(extent)
            && !self.obstacles.iter().any(|rect| penetrates(rect, extent))
            && !self.claims.iter().any(|rect| penetrates(rect, extent))
    }
}

/// The box a branch connector leaves from: the child nearest the branch
/// side, or the band span when the layer has no children.
fn branch_source(
    layer: &LayerSpec,
    k: usize,
    side: Side,
    frame: &LayerFrame,
    scene: &Scene,
) -> Rect {
    let n = layer.children.len();
    if n == 0 {
        return frame.band();
    }
    let index = if side == Side::Right { n - 1 } else { 0 };
    scene
        .find_box(BoxRef::Child { layer: k, index })
        .map(|b| b.rect())
        .unwrap_or_else(|| frame.band())
}

fn terminator_circle(scene: &Scene) -> Option<Circle> {
    scene
        .circles()
        .iter()
        .find(|placed| placed.reference() == BoxRef::Terminator)
        .map(|placed| placed.circle())
}

/// A connector endpoint shape.
enum Endpoint {
    Box(Rect),
    Circle(Circle),
}

impl Endpoint {
    fn center(&self) -> Point {
        match self {
            Endpoint::Box(rect) => rect.center(),
            Endpoint::Circle(circle) => circle.center(),
        }
    }

    fn anchor_toward(&self, target: Point) -> Point {
        match self {
            Endpoint::Box(rect) => rect_anchor(*rect, target),
            Endpoint::Circle(circle) => circle_anchor(*circle, target),
        }
    }
}

/// Side-midpoint anchor on the side of `rect` facing `toward`, picked by
/// the dominant axis between the centers.
fn rect_anchor(rect: Rect, toward: Point) -> Point {
    let center = rect.center();
    let dx = toward.x() - center.x();
    let dy = toward.y() - center.y();
    if dx.abs() > dy.abs() {
        if dx >= 0.0 {
            rect.right_center()
        } else {
            rect.left_center()
        }
    } else if dy >= 0.0 {
        rect.top_center()
    } else {
        rect.bottom_center()
    }
}

/// The point on the circle boundary facing `toward`.
fn circle_anchor(circle: Circle, toward: Point) -> Point {
    let center = circle.center();
    let dx = toward.x() - center.x();
    let dy = toward.y() - center.y();
    let len = (dx * dx + dy * dy).sqrt();
    if len <= EPSILON {
        return Point::new(center.x(), center.y() + circle.radius());
    }
    Point::new(
        center.x() + dx / len * circle.radius(),
        center.y() + dy / len * circle.radius(),
    )
}

/// Unit normal labels are pushed along: the left-hand normal of the
/// connector direction, flipped so it points up (or right, for vertical
/// connectors).
fn label_normal(from: Point, to: Point) -> (f64, f64) {
    let dx = to.x() - from.x();
    let dy = to.y() - from.y();
    let len = (dx * dx + dy * dy).sqrt();
    if len <= EPSILON {
        return (0.0, 1.0);
    }
    let (nx, ny) = (-dy / len, dx / len);
    if ny < -EPSILON || (ny.abs() <= EPSILON && nx < 0.0) {
        (-nx, -ny)
    } else {
        (nx, ny)
    }
}
