//! The placement engine.
//!
//! # Overview
//!
//! [`layout`] turns a validated [`DiagramSpec`] into a [`Scene`] of
//! positioned boxes, circles, arrows, and labels. Placement runs as a fixed
//! sequence of passes:
//!
//! 1. Validation: the description itself, then the layout configuration.
//! 2. Margin reservation: side panels, the flow-indicator strip, and output
//!    tabs each claim a full-height column before any layer is placed.
//! 3. Top-down stacking: layer `k + 1` starts one gap below layer `k`;
//!    running past the bottom margin is an error, not a squeeze.
//! 4. Child distribution: `n` children split their band into `n` equal
//!    slots and sit at the slot centers.
//! 5. Branch placement, fail-fast against everything placed so far.
//! 6. Side panels and flow indicators inside their reserved strips.
//! 7. Output tabs in the right margin.
//! 8. The heading, last, inside the allowance reserved for it in pass 2.
//! 9. Canvas containment and a pairwise overlap sweep over every opaque
//!    box, then connector routing.
//!
//! The same description with the same configuration always produces the
//! same scene; there is no randomness and no iterative refinement.

use log::{debug, info};

use strata_core::{
    draw::{HAlign, ShapeStyle, TextStyle, VAlign},
    geometry::{Circle, Point, Rect, Side, Size},
    spec::{BoxRef, BoxSpec, DiagramSpec, FillSpec, SpecError, TitleSpec},
};

use crate::{
    config::LayoutConfig,
    error::{LayoutError, StrataError},
    router,
    scene::{PlacedBox, PlacedCircle, PlacedLabel, RenderLayer, Scene},
};

/// Slack for comparisons between computed edges. Children sized exactly to
/// their slot share edges by construction and must not trip the sweep over
/// rounding.
const EPSILON: f64 = 1e-9;

/// Inset between a band's top edge and its title text.
const BAND_TITLE_INSET: f64 = 0.06;

/// Inset between a panel's border and its title and items.
const PANEL_INSET: f64 = 0.15;

/// Gap between the terminator circle and its caption.
const CAPTION_GAP: f64 = 0.1;

/// Gap between the heading line and its subtitle.
const SUBTITLE_GAP: f64 = 0.06;

/// Subtitle font size as a fraction of the heading font size.
const SUBTITLE_RATIO: f64 = 0.6;

/// Lays out a diagram description into a scene.
///
/// # Errors
///
/// Returns [`StrataError::Spec`] for description or configuration problems
/// detected before placement, and [`StrataError::Layout`] when the geometry
/// does not fit: a layer stack running past the bottom margin, a box
/// leaving the canvas, two opaque boxes overlapping, or a connector label
/// that found no free position.
pub fn layout(spec: &DiagramSpec, config: &LayoutConfig) -> Result<Scene, StrataError> {
    spec.validate()?;
    validate_config(config)?;
    Placer::prepare(spec, config)?.place()
}

/// Per-layer geometry carried from placement into routing.
pub(crate) struct LayerFrame {
    band: Rect,
    single_child: Option<Rect>,
}

impl LayerFrame {
    /// The full band span, whether or not a band frame is drawn.
    pub(crate) fn band(&self) -> Rect {
        self.band
    }

    /// The box auto-flow arrows attach to: the lone child when the layer
    /// has exactly one, otherwise the band span itself.
    pub(crate) fn flow_box(&self) -> Rect {
        self.single_child.unwrap_or(self.band)
    }
}

/// A full-height column reserved in a margin.
#[derive(Debug, Clone, Copy)]
struct Strip {
    left: f64,
    right: f64,
    name: &'static str,
}

impl Strip {
    fn center_x(&self) -> f64 {
        (self.left + self.right) / 2.0
    }

    /// True when `rect` penetrates the column by more than rounding slack.
    fn intrudes(&self, rect: &Rect) -> bool {
        rect.max_x() - self.left > EPSILON && self.right - rect.min_x() > EPSILON
    }
}

struct Placer<'a> {
    spec: &'a DiagramSpec,
    config: &'a LayoutConfig,
    band_left: f64,
    band_right: f64,
    stack_top: f64,
    indicator_center: Option<f64>,
    strips: Vec<Strip>,
}

impl<'a> Placer<'a> {
    /// Reserves margin strips and validates the geometry that depends on
    /// them, before anything is placed.
    fn prepare(spec: &'a DiagramSpec, config: &'a LayoutConfig) -> Result<Self, StrataError> {
        let canvas = &spec.canvas;
        let margin = config.margin();
        let has_indicators = !spec.indicators.is_empty();

        if has_indicators && spec.panel_on(Side::Left).is_some() {
            return Err(SpecError::LeftStripConflict.into());
        }

        let mut strips = Vec::new();
        let mut indicator_center = None;

        let mut left_reserved = 0.0;
        if let Some(panel) = spec.panel_on(Side::Left) {
            left_reserved = panel.width + config.panel_clearance();
            strips.push(Strip {
                left: margin,
                right: margin + left_reserved,
                name: "left panel",
            });
        } else if has_indicators {
            left_reserved = config.indicator_strip_width();
            let strip = Strip {
                left: margin,
                right: margin + left_reserved,
                name: "flow indicator",
            };
            indicator_center = Some(strip.center_x());
            strips.push(strip);
        }

        let mut right_reserved = 0.0;
        if let Some(panel) = spec.panel_on(Side::Right) {
            right_reserved = panel.width + config.panel_clearance();
            strips.push(Strip {
                left: canvas.width - margin - right_reserved,
                right: canvas.width - margin,
                name: "right panel",
            });
        }
        // Output tabs take the innermost part of the right margin, between
        // the band edge and any panel.
        let output_width = spec
            .layers
            .iter()
            .filter_map(|layer| layer.output.as_ref())
            .map(|output| output.size.width())
            .fold(0.0, f64::max);
        if output_width > 0.0 {
            right_reserved += config.margin_arrow_length() + output_width;
        }

        let band_left = margin + left_reserved;
        let band_right = canvas.width - margin - right_reserved;
        let band_width = band_right - band_left;
        if band_width <= 0.0 {
            return Err(SpecError::NonPositive {
                field: "layer band width (canvas.width minus margins and reserved strips)"
                    .to_string(),
                value: band_width,
            }
            .into());
        }

        // Slot widths depend on the reserved band, so the check lives here
        // rather than in DiagramSpec::validate.
        for (k, layer) in spec.layers.iter().enumerate() {
            let n = layer.children.len();
            if n == 0 {
                continue;
            }
            let slot = band_width / n as f64;
            for (i, child) in layer.children.iter().enumerate() {
                if child.size.width() > slot + EPSILON {
                    return Err(SpecError::ChildTooWide {
                        layer: k,
                        child: i,
                        width: child.size.width(),
                        slot,
                    }
                    .into());
                }
            }
        }
        for (k, indicator) in spec.indicators.iter().enumerate() {
            let strip = config.indicator_strip_width();
            if indicator.size.width() > strip + EPSILON {
                return Err(SpecError::IndicatorTooWide {
                    indicator: k,
                    width: indicator.size.width(),
                    strip,
                }
                .into());
            }
        }

        let title_allowance = spec
            .title
            .as_ref()
            .map(|title| title_block_height(title) + config.title_gap())
            .unwrap_or(0.0);
        let stack_top = canvas.height - config.top_margin() - title_allowance;
        debug!(
            band_left = band_left,
            band_right = band_right,
            stack_top = stack_top;
            "reserved margins"
        );

        Ok(Self {
            spec,
            config,
            band_left,
            band_right,
            stack_top,
            indicator_center,
            strips,
        })
    }

    fn place(&self) -> Result<Scene, StrataError> {
        let canvas = Size::new(self.spec.canvas.width, self.spec.canvas.height);
        let mut scene = Scene::new(canvas);

        let frames = self.place_layers(&mut scene)?;
        self.place_branches(&mut scene, &frames)?;
        self.place_panels(&mut scene, &frames)?;
        self.place_indicators(&mut scene, &frames)?;
        self.place_outputs(&mut scene, &frames)?;
        let last_bottom = frames
            .last()
            .map(|frame| frame.band.min_y())
            .unwrap_or(self.stack_top);
        self.place_terminator(&mut scene, last_bottom)?;
        self.place_title(&mut scene);

        self.check_containment(&scene)?;
        self.sweep_overlaps(&scene)?;
        router::route(self.spec, self.config, &frames, &mut scene)?;

        info!(
            boxes = scene.boxes().len(),
            arrows = scene.arrows().len(),
            labels = scene.labels().len();
            "layout complete"
        );
        Ok(scene)
    }

    fn band_width(&self) -> f64 {
        self.band_right - self.band_left
    }

    /// Stacks layers top-down, placing band frames, children, and
    /// annotations as it goes.
    fn place_layers(&self, scene: &mut Scene) -> Result<Vec<LayerFrame>, StrataError> {
        let mut frames = Vec::with_capacity(self.spec.layers.len());
        let limit = self.config.bottom_margin();
        let mut top = self.stack_top;

        for (k, layer) in self.spec.layers.iter().enumerate() {
            let bottom = top - layer.height;
            if bottom < limit - EPSILON {
                return Err(LayoutError::StackOverflow {
                    layer: k,
                    bottom,
                    limit,
                }
                .into());
            }
            let band = Rect::new(self.band_left, bottom, self.band_width(), layer.height);
            debug!(layer = k, top = top, bottom = bottom; "stacked layer");

            if let Some(fill) = &layer.band {
                let style = resolve_style(fill, &format!("layers[{k}].band"))?;
                scene.push_box(PlacedBox::new(
                    BoxRef::Layer(k),
                    band,
                    style,
                    fill.is_opaque(),
                    RenderLayer::Band,
                ));
            }
            if let Some(title) = &layer.title {
                let size = title.style.estimate_size(&title.text);
                let anchor = Point::new(
                    band.center().x() + title.dx,
                    band.max_y() - BAND_TITLE_INSET - size.height() / 2.0 + title.dy,
                );
                scene.push_label(PlacedLabel::centered(
                    title.text.as_str(),
                    anchor,
                    title.style.clone(),
                ));
            }

            let n = layer.children.len();
            let mut single_child = None;
            if n > 0 {
                let slot = band.width() / n as f64;
                for (i, child) in layer.children.iter().enumerate() {
                    let center =
                        Point::new(band.min_x() + (i as f64 + 0.5) * slot, band.center().y());
                    let rect = Rect::new_from_center(center, child.size);
                    let style = resolve_style(
                        &child.style,
                        &format!("layers[{k}].children[{i}].style"),
                    )?;
                    scene.push_box(
                        PlacedBox::new(
                            BoxRef::Child { layer: k, index: i },
                            rect,
                            style,
                            child.style.is_opaque(),
                            RenderLayer::Content,
                        )
                        .inside(BoxRef::Layer(k)),
                    );
                    push_box_label(scene, rect, child);
                    if n == 1 {
                        single_child = Some(rect);
                    }
                }
            }

            for note in &layer.annotations {
                let anchor = Point::new(band.center().x() + note.dx, band.center().y() + note.dy);
                scene.push_label(PlacedLabel::centered(
                    note.text.as_str(),
                    anchor,
                    note.style.clone(),
                ));
            }

            frames.push(LayerFrame { band, single_child });
            top = bottom - self.config.layer_gap();
        }

        Ok(frames)
    }

    /// Hangs branch boxes off band sides, checking each against everything
    /// placed so far before committing it.
    fn place_branches(&self, scene: &mut Scene, frames: &[LayerFrame]) -> Result<(), StrataError> {
        for (k, (layer, frame)) in self.spec.layers.iter().zip(frames).enumerate() {
            for (j, branch) in layer.branches.iter().enumerate() {
                let reference = BoxRef::Branch { layer: k, index: j };
                let spec = &branch.box_spec;
                // Validation rejects top/bottom sides.
                let center_x = if branch.side == Side::Right {
                    frame.band.max_x() + branch.offset + spec.size.width() / 2.0
                } else {
                    frame.band.min_x() - branch.offset - spec.size.width() / 2.0
                };
                let rect = Rect::new_from_center(
                    Point::new(center_x, frame.band.center().y()),
                    spec.size,
                );

                self.check_in_canvas(reference, &rect)?;
                for strip in &self.strips {
                    if strip.intrudes(&rect) {
                        return Err(LayoutError::MarginIntrusion {
                            reference,
                            strip: strip.name,
                        }
                        .into());
                    }
                }
                if spec.style.is_opaque() {
                    for placed in scene.boxes() {
                        if placed.is_opaque() && penetrates(&rect, &placed.rect()) {
                            return Err(LayoutError::Overlap {
                                first: reference,
                                second: placed.reference(),
                            }
                            .into());
                        }
                    }
                }

                let style = resolve_style(
                    &spec.style,
                    &format!("layers[{k}].branches[{j}].box.style"),
                )?;
                debug!(layer = k, branch = j, x = center_x; "placed branch");
                scene.push_box(PlacedBox::new(
                    reference,
                    rect,
                    style,
                    spec.style.is_opaque(),
                    RenderLayer::Content,
                ));
                push_box_label(scene, rect, spec);
            }
        }
        Ok(())
    }

    /// Places side panels spanning the stacked layers vertically, with
    /// their titles and evenly distributed items.
    fn place_panels(&self, scene: &mut Scene, frames: &[LayerFrame]) -> Result<(), StrataError> {
        if self.spec.panels.is_empty() {
            return Ok(());
        }
        let stack_bottom = frames
            .last()
            .map(|frame| frame.band.min_y())
            .unwrap_or(self.config.bottom_margin());

        for (idx, panel) in self.spec.panels.iter().enumerate() {
            let reference = BoxRef::Panel(panel.side);
            let field = format!("panels[{idx}]");
            let x = match panel.side {
                Side::Left => self.config.margin(),
                _ => self.spec.canvas.width - self.config.margin() - panel.width,
            };
            let rect = Rect::new(x, stack_bottom, panel.width, self.stack_top - stack_bottom);
            let style = resolve_style(&panel.style, &format!("{field}.style"))?;
            scene.push_box(PlacedBox::new(
                reference,
                rect,
                style,
                panel.style.is_opaque(),
                RenderLayer::Panel,
            ));

            let mut items_top = rect.max_y() - PANEL_INSET;
            if let Some(title) = &panel.title {
                let size = title.style.estimate_size(&title.text);
                let anchor = Point::new(
                    rect.center().x() + title.dx,
                    items_top - size.height() / 2.0 + title.dy,
                );
                scene.push_label(PlacedLabel::centered(
                    title.text.as_str(),
                    anchor,
                    title.style.clone(),
                ));
                items_top -= size.height() + PANEL_INSET;
            }

            let n = panel.items.len();
            if n > 0 {
                let slot = (items_top - rect.min_y() - PANEL_INSET) / n as f64;
                for (i, item) in panel.items.iter().enumerate() {
                    let center =
                        Point::new(rect.center().x(), items_top - (i as f64 + 0.5) * slot);
                    let item_rect = Rect::new_from_center(center, item.size);
                    let item_style =
                        resolve_style(&item.style, &format!("{field}.items[{i}].style"))?;
                    scene.push_box(
                        PlacedBox::new(
                            BoxRef::PanelItem {
                                side: panel.side,
                                index: i,
                            },
                            item_rect,
                            item_style,
                            item.style.is_opaque(),
                            RenderLayer::Content,
                        )
                        .inside(reference),
                    );
                    push_box_label(scene, item_rect, item);
                }
            }
            debug!(side = panel.side.name(), items = n; "placed panel");
        }
        Ok(())
    }

    /// Places numbered flow markers in the left strip, one per layer.
    fn place_indicators(
        &self,
        scene: &mut Scene,
        frames: &[LayerFrame],
    ) -> Result<(), StrataError> {
        let Some(center_x) = self.indicator_center else {
            return Ok(());
        };
        for (k, indicator) in self.spec.indicators.iter().enumerate() {
            // Validation caps indicators at the layer count.
            let center = Point::new(center_x, frames[k].band.center().y());
            let rect = Rect::new_from_center(center, indicator.size);
            let style = resolve_style(&indicator.style, &format!("indicators[{k}].style"))?;
            scene.push_box(PlacedBox::new(
                BoxRef::Indicator(k),
                rect,
                style,
                indicator.style.is_opaque(),
                RenderLayer::Content,
            ));
            let label = &indicator.label;
            let anchor = center.translate(label.dx, label.dy);
            scene.push_label(PlacedLabel::centered(
                label.text.as_str(),
                anchor,
                label.style.clone(),
            ));
        }
        Ok(())
    }

    /// Places output tabs in the right margin at their layer's vertical
    /// center.
    fn place_outputs(&self, scene: &mut Scene, frames: &[LayerFrame]) -> Result<(), StrataError> {
        for (k, (layer, frame)) in self.spec.layers.iter().zip(frames).enumerate() {
            let Some(output) = &layer.output else {
                continue;
            };
            let left = self.band_right + self.config.margin_arrow_length();
            let rect = Rect::new(
                left,
                frame.band.center().y() - output.size.height() / 2.0,
                output.size.width(),
                output.size.height(),
            );
            let style = resolve_style(&output.style, &format!("layers[{k}].output.style"))?;
            scene.push_box(PlacedBox::new(
                BoxRef::Output(k),
                rect,
                style,
                output.style.is_opaque(),
                RenderLayer::Content,
            ));
            let label = &output.label;
            scene.push_label(PlacedLabel::centered(
                label.text.as_str(),
                rect.center().translate(label.dx, label.dy),
                label.style.clone(),
            ));
        }
        Ok(())
    }

    /// Places the terminator circle one gap below the last layer, with its
    /// caption beneath it.
    fn place_terminator(&self, scene: &mut Scene, last_bottom: f64) -> Result<(), StrataError> {
        let Some(term) = &self.spec.terminator else {
            return Ok(());
        };
        let center = Point::new(
            (self.band_left + self.band_right) / 2.0,
            last_bottom - self.config.layer_gap() - term.radius,
        );

        let mut bottom_extent = center.y() - term.radius;
        if let Some(caption) = &term.caption {
            let size = caption.style.estimate_size(&caption.text);
            bottom_extent -= CAPTION_GAP + size.height();
        }
        let limit = self.config.bottom_margin();
        if bottom_extent < limit - EPSILON {
            return Err(LayoutError::TerminatorOverflow {
                bottom: bottom_extent,
                limit,
            }
            .into());
        }

        let style = resolve_style(&term.style, "terminator.style")?;
        scene.push_circle(PlacedCircle::new(
            BoxRef::Terminator,
            Circle::new(center, term.radius),
            style,
            term.style.is_opaque(),
        ));
        if let Some(text) = &term.label {
            scene.push_label(PlacedLabel::centered(
                text.as_str(),
                center,
                TextStyle::default().bold(),
            ));
        }
        if let Some(caption) = &term.caption {
            let anchor = Point::new(
                center.x() + caption.dx,
                center.y() - term.radius - CAPTION_GAP + caption.dy,
            );
            scene.push_label(PlacedLabel::aligned(
                caption.text.as_str(),
                anchor,
                caption.style.clone(),
                HAlign::Center,
                VAlign::Top,
            ));
        }
        Ok(())
    }

    /// Places the heading inside the allowance reserved during preparation.
    fn place_title(&self, scene: &mut Scene) {
        let Some(title) = &self.spec.title else {
            return;
        };
        let center_x = (self.band_left + self.band_right) / 2.0;
        let top = self.spec.canvas.height - self.config.top_margin();
        let style = TextStyle::new(title.font_size).bold();
        let size = style.estimate_size(&title.text);
        scene.push_label(PlacedLabel::aligned(
            title.text.as_str(),
            Point::new(center_x, top),
            style,
            HAlign::Center,
            VAlign::Top,
        ));
        if let Some(subtitle) = &title.subtitle {
            let anchor = Point::new(center_x, top - size.height() - SUBTITLE_GAP);
            scene.push_label(PlacedLabel::aligned(
                subtitle.as_str(),
                anchor,
                TextStyle::new(title.font_size * SUBTITLE_RATIO).italic(),
                HAlign::Center,
                VAlign::Top,
            ));
        }
    }

    fn check_in_canvas(&self, reference: BoxRef, rect: &Rect) -> Result<(), LayoutError> {
        let canvas = &self.spec.canvas;
        if rect.min_x() < -EPSILON
            || rect.min_y() < -EPSILON
            || rect.max_x() > canvas.width + EPSILON
            || rect.max_y() > canvas.height + EPSILON
        {
            Err(LayoutError::OutsideCanvas { reference })
        } else {
            Ok(())
        }
    }

    /// Every placed box and circle must lie inside the canvas.
    fn check_containment(&self, scene: &Scene) -> Result<(), StrataError> {
        for placed in scene.boxes() {
            self.check_in_canvas(placed.reference(), &placed.rect())?;
        }
        for placed in scene.circles() {
            self.check_in_canvas(placed.reference(), &placed.circle().bounding_rect())?;
        }
        Ok(())
    }

    /// Pairwise sweep over every opaque box and circle. Containers are
    /// exempt from colliding with their own content, nothing else is.
    fn sweep_overlaps(&self, scene: &Scene) -> Result<(), StrataError> {
        let mut opaque: Vec<(BoxRef, Option<BoxRef>, Rect)> = Vec::new();
        for placed in scene.boxes() {
            if placed.is_opaque() {
                opaque.push((placed.reference(), placed.container(), placed.rect()));
            }
        }
        for placed in scene.circles() {
            if placed.is_opaque() {
                opaque.push((placed.reference(), None, placed.circle().bounding_rect()));
            }
        }

        for i in 0..opaque.len() {
            for j in (i + 1)..opaque.len() {
                let (first, container_a, rect_a) = &opaque[i];
                let (second, container_b, rect_b) = &opaque[j];
                if *container_a == Some(*second) || *container_b == Some(*first) {
                    continue;
                }
                if penetrates(rect_a, rect_b) {
                    return Err(LayoutError::Overlap {
                        first: *first,
                        second: *second,
                    }
                    .into());
                }
            }
        }
        Ok(())
    }
}

/// True when the rectangles share interior area beyond rounding slack.
pub(crate) fn penetrates(a: &Rect, b: &Rect) -> bool {
    let dx = a.max_x().min(b.max_x()) - a.min_x().max(b.min_x());
    let dy = a.max_y().min(b.max_y()) - a.min_y().max(b.min_y());
    dx > EPSILON && dy > EPSILON
}

/// Height of the heading block: the title line plus an optional subtitle.
fn title_block_height(title: &TitleSpec) -> f64 {
    let mut height = TextStyle::new(title.font_size)
        .estimate_size(&title.text)
        .height();
    if let Some(subtitle) = &title.subtitle {
        height += SUBTITLE_GAP
            + TextStyle::new(title.font_size * SUBTITLE_RATIO)
                .estimate_size(subtitle)
                .height();
    }
    height
}

fn resolve_style(fill: &FillSpec, field: &str) -> Result<ShapeStyle, StrataError> {
    fill.resolve().map_err(|message| {
        StrataError::from(SpecError::InvalidColor {
            field: field.to_string(),
            message,
        })
    })
}

fn push_box_label(scene: &mut Scene, rect: Rect, spec: &BoxSpec) {
    if let Some(label) = &spec.label {
        let anchor = rect.center().translate(label.dx, label.dy);
        scene.push_label(PlacedLabel::centered(
            label.text.as_str(),
            anchor,
            label.style.clone(),
        ));
    }
}

fn validate_config(config: &LayoutConfig) -> Result<(), SpecError> {
    require_non_negative("layout.margin", config.margin())?;
    require_non_negative("layout.top_margin", config.top_margin())?;
    require_non_negative("layout.bottom_margin", config.bottom_margin())?;
    require_positive("layout.layer_gap", config.layer_gap())?;
    require_non_negative("layout.title_gap", config.title_gap())?;
    require_non_negative("layout.panel_clearance", config.panel_clearance())?;
    require_positive("layout.indicator_strip_width", config.indicator_strip_width())?;
    require_positive("layout.margin_arrow_length", config.margin_arrow_length())?;
    require_positive("layout.label_offset", config.label_offset())?;
    require_positive("layout.label_retry_step", config.label_retry_step())?;
    require_positive("layout.label_font_size", config.label_font_size())
}

fn require_positive(field: &str, value: f64) -> Result<(), SpecError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SpecError::NonPositive {
            field: field.to_string(),
            value,
        })
    }
}

fn require_non_negative(field: &str, value: f64) -> Result<(), SpecError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SpecError::Negative {
            field: field.to_string(),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use strata_core::spec::{
        BranchSpec, CanvasSpec, FillSpec as Fill, FlowIndicatorSpec, LayerSpec, OutputSpec,
        SidePanelSpec, TerminatorSpec,
    };

    use super::*;

    fn banded_layer(height: f64) -> LayerSpec {
        LayerSpec::new(height).with_band(Fill::filled("#F0F0F0"))
    }

    fn child(width: f64, height: f64) -> BoxSpec {
        BoxSpec::new(width, height).with_style(Fill::filled("white").with_border("black"))
    }

    #[test]
    fn test_stacking_positions() {
        // stack_top = 11.2 - 0.7 = 10.5; each step is 1.8 + 0.8 = 2.6 down.
        let mut spec = DiagramSpec::new(CanvasSpec::new(12.0, 11.2));
        for _ in 0..4 {
            spec = spec.with_layer(banded_layer(1.8));
        }
        let scene = layout(&spec, &LayoutConfig::default()).unwrap();

        let layer0 = scene.find_box(BoxRef::Layer(0)).unwrap().rect();
        assert_approx_eq!(f64, layer0.max_y(), 10.5, epsilon = 1e-9);
        let layer1 = scene.find_box(BoxRef::Layer(1)).unwrap().rect();
        assert_approx_eq!(f64, layer1.max_y(), 7.9, epsilon = 1e-9);
        let layer3 = scene.find_box(BoxRef::Layer(3)).unwrap().rect();
        assert_approx_eq!(f64, layer3.min_y(), 0.9, epsilon = 1e-9);
    }

    #[test]
    fn test_five_children_at_slot_centers() {
        // Band spans 1.5..12.5, so slots are 11 / 5 = 2.2 wide.
        let layer = banded_layer(1.8).with_children(vec![child(1.8, 0.6); 5]);
        let spec = DiagramSpec::new(CanvasSpec::new(14.0, 6.0)).with_layer(layer);
        let mut config = LayoutConfig::default();
        config.set_margin(1.5);

        let scene = layout(&spec, &config).unwrap();
        for i in 0..5 {
            let rect = scene
                .find_box(BoxRef::Child { layer: 0, index: i })
                .unwrap()
                .rect();
            let expected = 1.5 + (i as f64 + 0.5) * 2.2;
            assert_approx_eq!(f64, rect.center().x(), expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_children_vertically_centered_in_band() {
        let layer = banded_layer(2.0).with_child(child(1.0, 0.8));
        let spec = DiagramSpec::new(CanvasSpec::new(8.0, 5.0)).with_layer(layer);
        let scene = layout(&spec, &LayoutConfig::default()).unwrap();

        let band = scene.find_box(BoxRef::Layer(0)).unwrap().rect();
        let rect = scene
            .find_box(BoxRef::Child { layer: 0, index: 0 })
            .unwrap()
            .rect();
        assert_approx_eq!(f64, rect.center().y(), band.center().y(), epsilon = 1e-9);
    }

    #[test]
    fn test_child_wider_than_slot_fails_before_placement() {
        let layer = banded_layer(1.8).with_children(vec![child(2.4, 0.6); 5]);
        let spec = DiagramSpec::new(CanvasSpec::new(14.0, 6.0)).with_layer(layer);
        let mut config = LayoutConfig::default();
        config.set_margin(1.5);

        let err = layout(&spec, &config).unwrap_err();
        assert!(matches!(
            err,
            StrataError::Spec(SpecError::ChildTooWide {
                layer: 0,
                child: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_children_sized_exactly_to_slot_touch_without_error() {
        // 4 slots of (14 - 3) / 4 = 2.75; children the same width share edges.
        let layer = banded_layer(1.8).with_children(vec![child(2.75, 0.6); 4]);
        let spec = DiagramSpec::new(CanvasSpec::new(14.0, 6.0)).with_layer(layer);
        let mut config = LayoutConfig::default();
        config.set_margin(1.5);

        assert!(layout(&spec, &config).is_ok());
    }

    #[test]
    fn test_stack_overflow_names_layer() {
        let mut spec = DiagramSpec::new(CanvasSpec::new(10.0, 5.0));
        for _ in 0..3 {
            spec = spec.with_layer(banded_layer(1.8));
        }
        let err = layout(&spec, &LayoutConfig::default()).unwrap_err();
        match err {
            StrataError::Layout(LayoutError::StackOverflow { layer, bottom, .. }) => {
                assert_eq!(layer, 1);
                assert!(bottom < 0.5);
            }
            other => panic!("expected stack overflow, got {other:?}"),
        }
    }

    #[test]
    fn test_overlapping_branches_fail_fast() {
        let layer = banded_layer(1.2)
            .with_branch(BranchSpec::new(Side::Right, 0.2, child(1.4, 0.8)))
            .with_branch(BranchSpec::new(Side::Right, 0.4, child(1.4, 0.8)));
        let spec = DiagramSpec::new(CanvasSpec::new(14.0, 5.0)).with_layer(layer);
        let mut config = LayoutConfig::default();
        config.set_margin(2.5);

        let err = layout(&spec, &config).unwrap_err();
        assert!(matches!(
            err,
            StrataError::Layout(LayoutError::Overlap {
                first: BoxRef::Branch { layer: 0, index: 1 },
                second: BoxRef::Branch { layer: 0, index: 0 },
            })
        ));
    }

    #[test]
    fn test_branch_outside_canvas_fails_fast() {
        let layer =
            banded_layer(1.2).with_branch(BranchSpec::new(Side::Right, 1.5, child(2.0, 0.8)));
        let spec = DiagramSpec::new(CanvasSpec::new(10.0, 5.0)).with_layer(layer);

        let err = layout(&spec, &LayoutConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            StrataError::Layout(LayoutError::OutsideCanvas {
                reference: BoxRef::Branch { layer: 0, index: 0 },
            })
        ));
    }

    #[test]
    fn test_branch_in_panel_strip_is_rejected() {
        let layer =
            banded_layer(1.2).with_branch(BranchSpec::new(Side::Right, 0.3, child(1.6, 0.8)));
        let spec = DiagramSpec::new(CanvasSpec::new(12.0, 5.0))
            .with_layer(layer)
            .with_panel(SidePanelSpec::new(Side::Right, 2.0));

        let err = layout(&spec, &LayoutConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            StrataError::Layout(LayoutError::MarginIntrusion {
                strip: "right panel",
                ..
            })
        ));
    }

    #[test]
    fn test_panel_spans_stack_and_contains_items() {
        let panel = SidePanelSpec::new(Side::Right, 2.4)
            .with_title(strata_core::spec::LabelSpec::new("METRICS"))
            .with_item(child(1.8, 0.5))
            .with_item(child(1.8, 0.5))
            .with_item(child(1.8, 0.5));
        let spec = DiagramSpec::new(CanvasSpec::new(14.0, 8.0))
            .with_layer(banded_layer(2.0))
            .with_layer(banded_layer(2.0))
            .with_panel(panel);

        let scene = layout(&spec, &LayoutConfig::default()).unwrap();
        let panel_rect = scene.find_box(BoxRef::Panel(Side::Right)).unwrap().rect();
        let first = scene.find_box(BoxRef::Layer(0)).unwrap().rect();
        let last = scene.find_box(BoxRef::Layer(1)).unwrap().rect();
        assert_approx_eq!(f64, panel_rect.max_y(), first.max_y(), epsilon = 1e-9);
        assert_approx_eq!(f64, panel_rect.min_y(), last.min_y(), epsilon = 1e-9);

        for i in 0..3 {
            let item = scene
                .find_box(BoxRef::PanelItem {
                    side: Side::Right,
                    index: i,
                })
                .unwrap()
                .rect();
            assert!(panel_rect.contains(&item));
        }
    }

    #[test]
    fn test_indicators_track_layer_centers() {
        let spec = DiagramSpec::new(CanvasSpec::new(12.0, 8.0))
            .with_layer(banded_layer(1.6))
            .with_layer(banded_layer(1.6))
            .with_indicator(FlowIndicatorSpec::new("1"))
            .with_indicator(FlowIndicatorSpec::new("2"));
        let config = LayoutConfig::default();

        let scene = layout(&spec, &config).unwrap();
        for k in 0..2 {
            let indicator = scene.find_box(BoxRef::Indicator(k)).unwrap().rect();
            let band = scene.find_box(BoxRef::Layer(k)).unwrap().rect();
            assert_approx_eq!(
                f64,
                indicator.center().y(),
                band.center().y(),
                epsilon = 1e-9
            );
            assert_approx_eq!(
                f64,
                indicator.center().x(),
                config.margin() + config.indicator_strip_width() / 2.0,
                epsilon = 1e-9
            );
        }
    }

    #[test]
    fn test_output_tab_sits_in_right_margin() {
        let layer = banded_layer(1.6).with_output(OutputSpec::new("OUTPUT", 1.2, 0.5));
        let spec = DiagramSpec::new(CanvasSpec::new(10.0, 5.0)).with_layer(layer);
        let config = LayoutConfig::default();

        let scene = layout(&spec, &config).unwrap();
        let band = scene.find_box(BoxRef::Layer(0)).unwrap().rect();
        let tab = scene.find_box(BoxRef::Output(0)).unwrap().rect();
        assert_approx_eq!(
            f64,
            tab.min_x(),
            band.max_x() + config.margin_arrow_length(),
            epsilon = 1e-9
        );
        assert_approx_eq!(f64, tab.max_x(), 10.0 - config.margin(), epsilon = 1e-9);
        assert_approx_eq!(f64, tab.center().y(), band.center().y(), epsilon = 1e-9);
    }

    #[test]
    fn test_title_allowance_pushes_stack_down() {
        let with_title = DiagramSpec::new(CanvasSpec::new(10.0, 10.0))
            .with_title(strata_core::spec::TitleSpec::new("SYSTEM"))
            .with_layer(banded_layer(1.5));
        let without_title =
            DiagramSpec::new(CanvasSpec::new(10.0, 10.0)).with_layer(banded_layer(1.5));
        let config = LayoutConfig::default();

        let titled = layout(&with_title, &config).unwrap();
        let plain = layout(&without_title, &config).unwrap();
        let titled_top = titled.find_box(BoxRef::Layer(0)).unwrap().rect().max_y();
        let plain_top = plain.find_box(BoxRef::Layer(0)).unwrap().rect().max_y();
        // Title line is 0.25 * 1.2 = 0.3 tall plus the 0.4 title gap.
        assert_approx_eq!(f64, plain_top - titled_top, 0.7, epsilon = 1e-9);
    }

    #[test]
    fn test_tall_children_in_adjacent_layers_collide() {
        let tall = LayerSpec::new(1.0).with_child(child(2.0, 2.0));
        let spec = DiagramSpec::new(CanvasSpec::new(10.0, 10.0))
            .with_layer(tall.clone())
            .with_layer(tall);
        let mut config = LayoutConfig::default();
        config.set_layer_gap(0.2);

        let err = layout(&spec, &config).unwrap_err();
        assert!(matches!(
            err,
            StrataError::Layout(LayoutError::Overlap {
                first: BoxRef::Child { layer: 0, index: 0 },
                second: BoxRef::Child { layer: 1, index: 0 },
            })
        ));
    }

    #[test]
    fn test_terminator_hangs_below_last_layer() {
        let spec = DiagramSpec::new(CanvasSpec::new(10.0, 6.0))
            .with_layer(banded_layer(1.5))
            .with_terminator(TerminatorSpec::new(0.3).with_label("OK"));
        let config = LayoutConfig::default();

        let scene = layout(&spec, &config).unwrap();
        let band = scene.find_box(BoxRef::Layer(0)).unwrap().rect();
        let circle = scene.circles()[0].circle();
        assert_approx_eq!(
            f64,
            circle.center().y(),
            band.min_y() - config.layer_gap() - 0.3,
            epsilon = 1e-9
        );
        assert_approx_eq!(f64, circle.center().x(), band.center().x(), epsilon = 1e-9);
    }

    #[test]
    fn test_terminator_below_margin_fails() {
        let spec = DiagramSpec::new(CanvasSpec::new(10.0, 3.2))
            .with_layer(banded_layer(1.5))
            .with_terminator(TerminatorSpec::new(0.4));

        let err = layout(&spec, &LayoutConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            StrataError::Layout(LayoutError::TerminatorOverflow { .. })
        ));
    }

    #[test]
    fn test_indicators_conflict_with_left_panel() {
        let spec = DiagramSpec::new(CanvasSpec::new(12.0, 6.0))
            .with_layer(banded_layer(1.5))
            .with_panel(SidePanelSpec::new(Side::Left, 2.0))
            .with_indicator(FlowIndicatorSpec::new("1"));

        let err = layout(&spec, &LayoutConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            StrataError::Spec(SpecError::LeftStripConflict)
        ));
    }

    #[test]
    fn test_indicator_wider_than_strip_is_rejected() {
        let spec = DiagramSpec::new(CanvasSpec::new(12.0, 6.0))
            .with_layer(banded_layer(1.5))
            .with_indicator(FlowIndicatorSpec::new("1").with_size(2.0, 0.6));

        let err = layout(&spec, &LayoutConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            StrataError::Spec(SpecError::IndicatorTooWide { indicator: 0, .. })
        ));
    }

    #[test]
    fn test_zero_layer_gap_is_a_config_error() {
        let spec = DiagramSpec::new(CanvasSpec::new(10.0, 6.0)).with_layer(banded_layer(1.5));
        let mut config = LayoutConfig::default();
        config.set_layer_gap(0.0);

        let err = layout(&spec, &config).unwrap_err();
        match err {
            StrataError::Spec(SpecError::NonPositive { field, .. }) => {
                assert_eq!(field, "layout.layer_gap");
            }
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_layout_is_deterministic() {
        let layer = banded_layer(1.8)
            .with_children(vec![child(1.4, 0.6); 3])
            .with_branch(BranchSpec::new(Side::Right, 0.3, child(1.2, 0.8)));
        let spec = DiagramSpec::new(CanvasSpec::new(14.0, 6.0))
            .with_layer(layer)
            .with_layer(banded_layer(1.2));
        let mut config = LayoutConfig::default();
        config.set_margin(2.0);

        let first = layout(&spec, &config).unwrap();
        let second = layout(&spec, &config).unwrap();
        assert_eq!(first.boxes().len(), second.boxes().len());
        for (a, b) in first.boxes().iter().zip(second.boxes()) {
            assert_eq!(a.reference(), b.reference());
            assert_eq!(a.rect(), b.rect());
        }
    }
}
