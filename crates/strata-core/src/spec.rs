//! Declarative diagram descriptions.
//!
//! # Overview
//!
//! This module defines WHAT a diagram contains, decoupled from where anything
//! ends up. A [`DiagramSpec`] is a tree of plain value types: a canvas, a
//! stack of layers with equally-spaced children, optional branches hung off
//! the sides, side panels, flow indicators, a heading, and a terminator
//! marker. The layout engine consumes a validated spec and assigns geometry;
//! nothing here has a position.
//!
//! All types round-trip through serde so diagrams can be written as JSON.
//! Colors are carried as CSS strings and parsed during validation, which
//! reports every bad field before any placement is attempted.
//!
//! # Validation
//!
//! [`DiagramSpec::validate`] performs the construction-time checks: positive
//! finite extents, parseable colors, resolvable connector references,
//! branch and panel sides that make sense. Violations are [`SpecError`]s
//! naming the offending field and value.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    color::Color,
    draw::{ShapeStyle, StrokeDefinition, TextStyle},
    geometry::{Side, Size},
};

/// A configuration error detected before placement.
///
/// Every variant names the field it complains about, so a failing diagram
/// description can be fixed without guessing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpecError {
    /// An extent or scalar that must be positive is not.
    #[error("field `{field}` must be positive and finite, got {value}")]
    NonPositive { field: String, value: f64 },

    /// A value that must be non-negative is negative (or not finite).
    #[error("field `{field}` must be non-negative and finite, got {value}")]
    Negative { field: String, value: f64 },

    /// A value that may have either sign but must be finite.
    #[error("field `{field}` must be finite, got {value}")]
    NotFinite { field: String, value: f64 },

    /// A color string the color crate cannot parse.
    #[error("field `{field}`: {message}")]
    InvalidColor { field: String, message: String },

    /// A branch or panel hung off a side it cannot go on.
    #[error("field `{field}`: side `{side}` is not allowed here, use left or right")]
    InvalidSide { field: String, side: String },

    /// Two side panels claim the same margin strip.
    #[error("two side panels declared on the {side} side")]
    DuplicatePanelSide { side: String },

    /// More flow indicators than layers to attach them to.
    #[error("{indicators} flow indicators declared but only {layers} layers exist")]
    TooManyIndicators { indicators: usize, layers: usize },

    /// A connector endpoint that does not exist in the description.
    #[error("connector {connector} references {reference}, which does not exist")]
    DanglingConnector { connector: usize, reference: BoxRef },

    /// A child box wider than the slot the layer gives it.
    #[error(
        "layer {layer} child {child} is {width} wide but its slot is only {slot} wide"
    )]
    ChildTooWide {
        layer: usize,
        child: usize,
        width: f64,
        slot: f64,
    },

    /// A flow indicator wider than the strip reserved for the chain.
    #[error(
        "flow indicator {indicator} is {width} wide but the indicator strip is only {strip} wide"
    )]
    IndicatorTooWide {
        indicator: usize,
        width: f64,
        strip: f64,
    },

    /// Flow indicators and a left panel cannot share the left margin.
    #[error("flow indicators and a left side panel both claim the left margin strip")]
    LeftStripConflict,
}

fn check_positive(field: impl Into<String>, value: f64) -> Result<(), SpecError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SpecError::NonPositive {
            field: field.into(),
            value,
        })
    }
}

fn check_non_negative(field: impl Into<String>, value: f64) -> Result<(), SpecError> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(SpecError::Negative {
            field: field.into(),
            value,
        })
    }
}

fn check_finite(field: impl Into<String>, value: f64) -> Result<(), SpecError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(SpecError::NotFinite {
            field: field.into(),
            value,
        })
    }
}

fn check_color(field: impl Into<String>, value: &str) -> Result<(), SpecError> {
    Color::new(value).map(|_| ()).map_err(|message| {
        SpecError::InvalidColor {
            field: field.into(),
            message,
        }
    })
}

/// The drawing area, in diagram units.
///
/// All geometry the engine produces falls within `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSpec {
    pub width: f64,
    pub height: f64,
}

impl CanvasSpec {
    /// Creates a canvas with the given extents.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn validate(&self) -> Result<(), SpecError> {
        check_positive("canvas.width", self.width)?;
        check_positive("canvas.height", self.height)
    }
}

/// Fill and border styling, carried as CSS color strings.
///
/// A box with `fill: Some(..)` is OPAQUE: it hides what is under it, so the
/// layout engine includes it in the no-overlap guarantee. A `fill: None` box
/// draws only its border and may sit on top of a band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FillSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border: Option<String>,
    #[serde(default = "FillSpec::default_border_width")]
    pub border_width: f32,
    #[serde(default)]
    pub dashed: bool,
}

impl Default for FillSpec {
    fn default() -> Self {
        Self {
            fill: None,
            border: None,
            border_width: Self::default_border_width(),
            dashed: false,
        }
    }
}

impl FillSpec {
    fn default_border_width() -> f32 {
        1.5
    }

    /// Creates a filled style with the given CSS fill color.
    pub fn filled(fill: &str) -> Self {
        Self {
            fill: Some(fill.to_string()),
            ..Self::default()
        }
    }

    /// Creates a border-only style with the given CSS border color.
    pub fn outline(border: &str) -> Self {
        Self {
            border: Some(border.to_string()),
            ..Self::default()
        }
    }

    /// Returns this style with the given border color.
    pub fn with_border(mut self, border: &str) -> Self {
        self.border = Some(border.to_string());
        self
    }

    /// Returns this style with the given border width in device pixels.
    pub fn with_border_width(mut self, width: f32) -> Self {
        self.border_width = width;
        self
    }

    /// Returns this style with a dashed border.
    pub fn with_dashed(mut self) -> Self {
        self.dashed = true;
        self
    }

    /// Returns `true` if this style has an interior fill.
    pub fn is_opaque(&self) -> bool {
        self.fill.is_some()
    }

    /// Parses the color strings into a paintable style.
    ///
    /// Validation has already checked the strings, so resolution after a
    /// successful [`DiagramSpec::validate`] cannot fail.
    pub fn resolve(&self) -> Result<ShapeStyle, String> {
        let fill = match &self.fill {
            Some(s) => Some(Color::new(s)?),
            None => None,
        };
        let border = match &self.border {
            Some(s) => Color::new(s)?,
            None => Color::default(),
        };
        let stroke = if self.dashed {
            StrokeDefinition::dashed(border, self.border_width)
        } else {
            StrokeDefinition::new(border, self.border_width)
        };
        Ok(ShapeStyle { fill, stroke })
    }

    fn validate(&self, field: &str) -> Result<(), SpecError> {
        if let Some(fill) = &self.fill {
            check_color(format!("{field}.fill"), fill)?;
        }
        if let Some(border) = &self.border {
            check_color(format!("{field}.border"), border)?;
        }
        check_positive(format!("{field}.border_width"), self.border_width as f64)
    }
}

/// A piece of text with styling and an offset relative to its owner.
///
/// `dx`/`dy` displace the label from its default anchor (the owning box's
/// center, or the band center for annotations), in diagram units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelSpec {
    pub text: String,
    #[serde(default)]
    pub style: TextStyle,
    #[serde(default)]
    pub dx: f64,
    #[serde(default)]
    pub dy: f64,
}

impl LabelSpec {
    /// Creates a label with default styling and no offset.
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            style: TextStyle::default(),
            dx: 0.0,
            dy: 0.0,
        }
    }

    /// Returns this label with the given text style.
    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    /// Returns this label displaced by the given offsets.
    pub fn with_offset(mut self, dx: f64, dy: f64) -> Self {
        self.dx = dx;
        self.dy = dy;
        self
    }

    fn validate(&self, field: &str) -> Result<(), SpecError> {
        check_positive(format!("{field}.style.font_size"), self.style.font_size())?;
        if let Some(color) = self.style.color_str() {
            check_color(format!("{field}.style.color"), color)?;
        }
        check_finite(format!("{field}.dx"), self.dx)?;
        check_finite(format!("{field}.dy"), self.dy)
    }
}

/// A box before placement: extent and styling, position assigned later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSpec {
    pub size: Size,
    #[serde(default)]
    pub style: FillSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<LabelSpec>,
}

impl BoxSpec {
    /// Creates an unstyled, unlabeled box of the given extent.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width, height),
            style: FillSpec::default(),
            label: None,
        }
    }

    /// Returns this box with the given style.
    pub fn with_style(mut self, style: FillSpec) -> Self {
        self.style = style;
        self
    }

    /// Returns this box with the given label.
    pub fn with_label(mut self, label: LabelSpec) -> Self {
        self.label = Some(label);
        self
    }

    /// Returns this box with a default-styled label.
    pub fn with_text(self, text: &str) -> Self {
        self.with_label(LabelSpec::new(text))
    }

    fn validate(&self, field: &str) -> Result<(), SpecError> {
        check_positive(format!("{field}.size.width"), self.size.width())?;
        check_positive(format!("{field}.size.height"), self.size.height())?;
        self.style.validate(&format!("{field}.style"))?;
        if let Some(label) = &self.label {
            label.validate(&format!("{field}.label"))?;
        }
        Ok(())
    }
}

/// A box hung off the left or right side of a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchSpec {
    /// Which side of the layer the branch goes on. Only `left` and `right`
    /// make sense; `top`/`bottom` are validation errors.
    pub side: Side,
    /// Horizontal clearance between the layer edge and the branch box.
    pub offset: f64,
    /// The branch box itself.
    #[serde(rename = "box")]
    pub box_spec: BoxSpec,
    /// Short text (YES, NO, VALID...) drawn at the branch connector midpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connector_label: Option<String>,
}

impl BranchSpec {
    /// Creates a branch on the given side with the given clearance.
    pub fn new(side: Side, offset: f64, box_spec: BoxSpec) -> Self {
        Self {
            side,
            offset,
            box_spec,
            connector_label: None,
        }
    }

    /// Returns this branch with a label on its connector.
    pub fn with_connector_label(mut self, label: &str) -> Self {
        self.connector_label = Some(label.to_string());
        self
    }

    fn validate(&self, field: &str) -> Result<(), SpecError> {
        if matches!(self.side, Side::Top | Side::Bottom) {
            return Err(SpecError::InvalidSide {
                field: format!("{field}.side"),
                side: self.side.name().to_string(),
            });
        }
        check_non_negative(format!("{field}.offset"), self.offset)?;
        self.box_spec.validate(&format!("{field}.box"))
    }
}

/// A small tab in the right margin, joined to its layer by a short arrow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub label: LabelSpec,
    pub size: Size,
    #[serde(default)]
    pub style: FillSpec,
}

impl OutputSpec {
    /// Creates an output tab with the given label text and extent.
    pub fn new(text: &str, width: f64, height: f64) -> Self {
        Self {
            label: LabelSpec::new(text),
            size: Size::new(width, height),
            style: FillSpec::default(),
        }
    }

    /// Returns this output tab with the given style.
    pub fn with_style(mut self, style: FillSpec) -> Self {
        self.style = style;
        self
    }

    fn validate(&self, field: &str) -> Result<(), SpecError> {
        check_positive(format!("{field}.size.width"), self.size.width())?;
        check_positive(format!("{field}.size.height"), self.size.height())?;
        self.label.validate(&format!("{field}.label"))?;
        self.style.validate(&format!("{field}.style"))
    }
}

/// One horizontal stratum of the diagram.
///
/// A layer always has a height; everything else is optional. An architecture
/// band carries a frame, a title, and several children; a flowchart step is a
/// frameless layer with a single child.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Band height in diagram units.
    pub height: f64,
    /// Full-width band rectangle framing the layer, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub band: Option<FillSpec>,
    /// Label drawn near the top of the band.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<LabelSpec>,
    /// Boxes distributed equally across the band.
    #[serde(default)]
    pub children: Vec<BoxSpec>,
    /// Boxes hung off the sides.
    #[serde(default)]
    pub branches: Vec<BranchSpec>,
    /// Free text drawn at offsets from the band center; never opaque.
    #[serde(default)]
    pub annotations: Vec<LabelSpec>,
    /// Output tab in the right margin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputSpec>,
}

impl LayerSpec {
    /// Creates an empty layer of the given height.
    pub fn new(height: f64) -> Self {
        Self {
            height,
            band: None,
            title: None,
            children: Vec::new(),
            branches: Vec::new(),
            annotations: Vec::new(),
            output: None,
        }
    }

    /// Returns this layer with a band frame.
    pub fn with_band(mut self, band: FillSpec) -> Self {
        self.band = Some(band);
        self
    }

    /// Returns this layer with a title label.
    pub fn with_title(mut self, title: LabelSpec) -> Self {
        self.title = Some(title);
        self
    }

    /// Returns this layer with the given children.
    pub fn with_children(mut self, children: Vec<BoxSpec>) -> Self {
        self.children = children;
        self
    }

    /// Returns this layer with one more child.
    pub fn with_child(mut self, child: BoxSpec) -> Self {
        self.children.push(child);
        self
    }

    /// Returns this layer with one more branch.
    pub fn with_branch(mut self, branch: BranchSpec) -> Self {
        self.branches.push(branch);
        self
    }

    /// Returns this layer with one more annotation.
    pub fn with_annotation(mut self, annotation: LabelSpec) -> Self {
        self.annotations.push(annotation);
        self
    }

    /// Returns this layer with an output tab.
    pub fn with_output(mut self, output: OutputSpec) -> Self {
        self.output = Some(output);
        self
    }

    fn validate(&self, index: usize) -> Result<(), SpecError> {
        let field = format!("layers[{index}]");
        check_positive(format!("{field}.height"), self.height)?;
        if let Some(band) = &self.band {
            band.validate(&format!("{field}.band"))?;
        }
        if let Some(title) = &self.title {
            title.validate(&format!("{field}.title"))?;
        }
        for (i, child) in self.children.iter().enumerate() {
            child.validate(&format!("{field}.children[{i}]"))?;
        }
        for (i, branch) in self.branches.iter().enumerate() {
            branch.validate(&format!("{field}.branches[{i}]"))?;
        }
        for (i, annotation) in self.annotations.iter().enumerate() {
            annotation.validate(&format!("{field}.annotations[{i}]"))?;
        }
        if let Some(output) = &self.output {
            output.validate(&format!("{field}.output"))?;
        }
        Ok(())
    }
}

/// A tall panel in a reserved side margin.
///
/// The panel spans the full vertical extent of the layer stack; its items are
/// distributed top-to-bottom inside it with even spacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SidePanelSpec {
    /// Which margin the panel reserves. Only `left` and `right` are valid.
    pub side: Side,
    /// Panel width in diagram units.
    pub width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<LabelSpec>,
    #[serde(default)]
    pub items: Vec<BoxSpec>,
    #[serde(default)]
    pub style: FillSpec,
}

impl SidePanelSpec {
    /// Creates an empty panel on the given side.
    pub fn new(side: Side, width: f64) -> Self {
        Self {
            side,
            width,
            title: None,
            items: Vec::new(),
            style: FillSpec::default(),
        }
    }

    /// Returns this panel with a title.
    pub fn with_title(mut self, title: LabelSpec) -> Self {
        self.title = Some(title);
        self
    }

    /// Returns this panel with one more item.
    pub fn with_item(mut self, item: BoxSpec) -> Self {
        self.items.push(item);
        self
    }

    /// Returns this panel with the given style.
    pub fn with_style(mut self, style: FillSpec) -> Self {
        self.style = style;
        self
    }

    fn validate(&self, index: usize) -> Result<(), SpecError> {
        let field = format!("panels[{index}]");
        if matches!(self.side, Side::Top | Side::Bottom) {
            return Err(SpecError::InvalidSide {
                field: format!("{field}.side"),
                side: self.side.name().to_string(),
            });
        }
        check_positive(format!("{field}.width"), self.width)?;
        if let Some(title) = &self.title {
            title.validate(&format!("{field}.title"))?;
        }
        for (i, item) in self.items.iter().enumerate() {
            item.validate(&format!("{field}.items[{i}]"))?;
        }
        self.style.validate(&format!("{field}.style"))
    }
}

/// A numbered step marker in the reserved left margin.
///
/// Indicator `k` sits at layer `k`'s vertical center; consecutive indicators
/// are chained by short dashed arrows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowIndicatorSpec {
    pub label: LabelSpec,
    #[serde(default = "FlowIndicatorSpec::default_size")]
    pub size: Size,
    #[serde(default)]
    pub style: FillSpec,
}

impl FlowIndicatorSpec {
    fn default_size() -> Size {
        Size::new(0.8, 0.6)
    }

    /// Creates an indicator with the given label text.
    pub fn new(text: &str) -> Self {
        Self {
            label: LabelSpec::new(text),
            size: Self::default_size(),
            style: FillSpec::default(),
        }
    }

    /// Returns this indicator with the given label.
    pub fn with_label(mut self, label: LabelSpec) -> Self {
        self.label = label;
        self
    }

    /// Returns this indicator with the given marker size.
    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.size = Size::new(width, height);
        self
    }

    /// Returns this indicator with the given style.
    pub fn with_style(mut self, style: FillSpec) -> Self {
        self.style = style;
        self
    }

    fn validate(&self, index: usize) -> Result<(), SpecError> {
        self.label.validate(&format!("indicators[{index}].label"))?;
        check_positive(format!("indicators[{index}].size.width"), self.size.width())?;
        check_positive(
            format!("indicators[{index}].size.height"),
            self.size.height(),
        )?;
        self.style.validate(&format!("indicators[{index}].style"))
    }
}

/// The diagram heading, drawn above the first layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleSpec {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default = "TitleSpec::default_font_size")]
    pub font_size: f64,
}

impl TitleSpec {
    fn default_font_size() -> f64 {
        0.25
    }

    /// Creates a heading with the given text.
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            subtitle: None,
            font_size: Self::default_font_size(),
        }
    }

    /// Returns this heading with a subtitle line beneath it.
    pub fn with_subtitle(mut self, subtitle: &str) -> Self {
        self.subtitle = Some(subtitle.to_string());
        self
    }

    fn validate(&self) -> Result<(), SpecError> {
        check_positive("title.font_size", self.font_size)
    }
}

/// A terminal circle drawn under the last layer, with an optional caption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerminatorSpec {
    pub radius: f64,
    /// Short text inside the circle (OK, END...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Caption drawn beneath the circle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<LabelSpec>,
    #[serde(default)]
    pub style: FillSpec,
}

impl TerminatorSpec {
    /// Creates a terminator circle of the given radius.
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            label: None,
            caption: None,
            style: FillSpec::default(),
        }
    }

    /// Returns this terminator with text inside the circle.
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// Returns this terminator with a caption beneath it.
    pub fn with_caption(mut self, caption: LabelSpec) -> Self {
        self.caption = Some(caption);
        self
    }

    /// Returns this terminator with the given style.
    pub fn with_style(mut self, style: FillSpec) -> Self {
        self.style = style;
        self
    }

    fn validate(&self) -> Result<(), SpecError> {
        check_positive("terminator.radius", self.radius)?;
        if let Some(caption) = &self.caption {
            caption.validate("terminator.caption")?;
        }
        self.style.validate("terminator.style")
    }
}

/// Stable address of a box the layout engine will place.
///
/// Connectors reference boxes by address rather than by position, so a
/// description can be written before anything has coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxRef {
    /// The band rectangle of layer `k`.
    Layer(usize),
    /// Child `index` of layer `layer`.
    Child { layer: usize, index: usize },
    /// Branch `index` of layer `layer`.
    Branch { layer: usize, index: usize },
    /// The panel on the given side.
    Panel(Side),
    /// Item `index` of the panel on the given side.
    PanelItem { side: Side, index: usize },
    /// Flow indicator `k`.
    Indicator(usize),
    /// Output tab of layer `k`.
    Output(usize),
    /// The terminator circle.
    Terminator,
}

impl fmt::Display for BoxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Layer(k) => write!(f, "layer {k}"),
            Self::Child { layer, index } => write!(f, "layer {layer} child {index}"),
            Self::Branch { layer, index } => write!(f, "layer {layer} branch {index}"),
            Self::Panel(side) => write!(f, "{} panel", side.name()),
            Self::PanelItem { side, index } => {
                write!(f, "{} panel item {index}", side.name())
            }
            Self::Indicator(k) => write!(f, "flow indicator {k}"),
            Self::Output(k) => write!(f, "layer {k} output"),
            Self::Terminator => write!(f, "terminator"),
        }
    }
}

/// An extra connector between two placed boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorSpec {
    pub from: BoxRef,
    pub to: BoxRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub dashed: bool,
}

impl ConnectorSpec {
    /// Creates a plain connector between two boxes.
    pub fn new(from: BoxRef, to: BoxRef) -> Self {
        Self {
            from,
            to,
            label: None,
            dashed: false,
        }
    }

    /// Returns this connector with a midpoint label.
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    /// Returns this connector drawn dashed.
    pub fn with_dashed(mut self) -> Self {
        self.dashed = true;
        self
    }
}

/// How the implied layer-to-layer flow arrows are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowStyle {
    /// Draw one vertical arrow between each consecutive layer pair.
    #[serde(default = "FlowStyle::default_auto")]
    pub auto: bool,
    /// Draw the implied arrows dashed.
    #[serde(default)]
    pub dashed: bool,
}

impl FlowStyle {
    fn default_auto() -> bool {
        true
    }
}

impl Default for FlowStyle {
    fn default() -> Self {
        Self {
            auto: true,
            dashed: false,
        }
    }
}

/// A complete diagram description.
///
/// # Examples
///
/// ```
/// use strata_core::spec::{BoxSpec, CanvasSpec, DiagramSpec, LayerSpec};
///
/// let spec = DiagramSpec::new(CanvasSpec::new(16.0, 10.0))
///     .with_layer(LayerSpec::new(1.8).with_child(BoxSpec::new(2.0, 0.6).with_text("Input")))
///     .with_layer(LayerSpec::new(1.8).with_child(BoxSpec::new(2.0, 0.6).with_text("Output")));
/// assert!(spec.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramSpec {
    pub canvas: CanvasSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<TitleSpec>,
    #[serde(default)]
    pub layers: Vec<LayerSpec>,
    #[serde(default)]
    pub panels: Vec<SidePanelSpec>,
    #[serde(default)]
    pub indicators: Vec<FlowIndicatorSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminator: Option<TerminatorSpec>,
    #[serde(default)]
    pub connectors: Vec<ConnectorSpec>,
    #[serde(default)]
    pub flow: FlowStyle,
}

impl DiagramSpec {
    /// Creates an empty diagram on the given canvas.
    pub fn new(canvas: CanvasSpec) -> Self {
        Self {
            canvas,
            title: None,
            layers: Vec::new(),
            panels: Vec::new(),
            indicators: Vec::new(),
            terminator: None,
            connectors: Vec::new(),
            flow: FlowStyle::default(),
        }
    }

    /// Returns this diagram with a heading.
    pub fn with_title(mut self, title: TitleSpec) -> Self {
        self.title = Some(title);
        self
    }

    /// Returns this diagram with one more layer.
    pub fn with_layer(mut self, layer: LayerSpec) -> Self {
        self.layers.push(layer);
        self
    }

    /// Returns this diagram with one more side panel.
    pub fn with_panel(mut self, panel: SidePanelSpec) -> Self {
        self.panels.push(panel);
        self
    }

    /// Returns this diagram with one more flow indicator.
    pub fn with_indicator(mut self, indicator: FlowIndicatorSpec) -> Self {
        self.indicators.push(indicator);
        self
    }

    /// Returns this diagram with a terminator circle.
    pub fn with_terminator(mut self, terminator: TerminatorSpec) -> Self {
        self.terminator = Some(terminator);
        self
    }

    /// Returns this diagram with one more explicit connector.
    pub fn with_connector(mut self, connector: ConnectorSpec) -> Self {
        self.connectors.push(connector);
        self
    }

    /// Returns this diagram with the given flow style.
    pub fn with_flow(mut self, flow: FlowStyle) -> Self {
        self.flow = flow;
        self
    }

    /// Returns the panel on the given side, if one is declared.
    pub fn panel_on(&self, side: Side) -> Option<&SidePanelSpec> {
        self.panels.iter().find(|p| p.side == side)
    }

    /// Returns `true` if `reference` addresses a box this description has.
    pub fn resolves(&self, reference: &BoxRef) -> bool {
        match *reference {
            BoxRef::Layer(k) => k < self.layers.len(),
            BoxRef::Child { layer, index } => self
                .layers
                .get(layer)
                .is_some_and(|l| index < l.children.len()),
            BoxRef::Branch { layer, index } => self
                .layers
                .get(layer)
                .is_some_and(|l| index < l.branches.len()),
            BoxRef::Panel(side) => self.panel_on(side).is_some(),
            BoxRef::PanelItem { side, index } => {
                self.panel_on(side).is_some_and(|p| index < p.items.len())
            }
            BoxRef::Indicator(k) => k < self.indicators.len(),
            BoxRef::Output(k) => self.layers.get(k).is_some_and(|l| l.output.is_some()),
            BoxRef::Terminator => self.terminator.is_some(),
        }
    }

    /// Performs the construction-time checks.
    ///
    /// Called by the layout engine before any placement; callers building
    /// descriptions programmatically can also call it directly for early
    /// feedback.
    pub fn validate(&self) -> Result<(), SpecError> {
        self.canvas.validate()?;
        if let Some(title) = &self.title {
            title.validate()?;
        }
        for (i, layer) in self.layers.iter().enumerate() {
            layer.validate(i)?;
        }
        for (i, panel) in self.panels.iter().enumerate() {
            panel.validate(i)?;
            if self.panels[..i].iter().any(|p| p.side == panel.side) {
                return Err(SpecError::DuplicatePanelSide {
                    side: panel.side.name().to_string(),
                });
            }
        }
        for (i, indicator) in self.indicators.iter().enumerate() {
            indicator.validate(i)?;
        }
        if self.indicators.len() > self.layers.len() {
            return Err(SpecError::TooManyIndicators {
                indicators: self.indicators.len(),
                layers: self.layers.len(),
            });
        }
        if let Some(terminator) = &self.terminator {
            terminator.validate()?;
        }
        for (i, connector) in self.connectors.iter().enumerate() {
            for reference in [&connector.from, &connector.to] {
                if !self.resolves(reference) {
                    return Err(SpecError::DanglingConnector {
                        connector: i,
                        reference: *reference,
                    });
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_spec() -> DiagramSpec {
        DiagramSpec::new(CanvasSpec::new(16.0, 10.0))
            .with_layer(LayerSpec::new(1.8).with_child(BoxSpec::new(2.0, 0.6).with_text("A")))
    }

    #[test]
    fn test_minimal_spec_validates() {
        assert!(minimal_spec().validate().is_ok());
    }

    #[test]
    fn test_zero_canvas_rejected() {
        let spec = DiagramSpec::new(CanvasSpec::new(0.0, 10.0));
        let err = spec.validate().unwrap_err();
        assert!(matches!(err, SpecError::NonPositive { ref field, .. } if field == "canvas.width"));
    }

    #[test]
    fn test_nan_canvas_rejected() {
        let spec = DiagramSpec::new(CanvasSpec::new(16.0, f64::NAN));
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_bad_fill_color_names_field() {
        let mut spec = minimal_spec();
        spec.layers[0].children[0].style = FillSpec::filled("definitely-not-a-color");
        let err = spec.validate().unwrap_err();
        match err {
            SpecError::InvalidColor { field, .. } => {
                assert_eq!(field, "layers[0].children[0].style.fill");
            }
            other => panic!("expected InvalidColor, got {other:?}"),
        }
    }

    #[test]
    fn test_branch_on_top_rejected() {
        let mut spec = minimal_spec();
        spec.layers[0].branches.push(BranchSpec::new(
            Side::Top,
            0.5,
            BoxSpec::new(1.0, 0.5),
        ));
        let err = spec.validate().unwrap_err();
        assert!(matches!(err, SpecError::InvalidSide { .. }));
    }

    #[test]
    fn test_negative_branch_offset_rejected() {
        let mut spec = minimal_spec();
        spec.layers[0].branches.push(BranchSpec::new(
            Side::Right,
            -0.5,
            BoxSpec::new(1.0, 0.5),
        ));
        let err = spec.validate().unwrap_err();
        assert!(matches!(err, SpecError::Negative { ref field, .. }
            if field == "layers[0].branches[0].offset"));
    }

    #[test]
    fn test_duplicate_panel_side_rejected() {
        let spec = minimal_spec()
            .with_panel(SidePanelSpec::new(Side::Right, 2.0))
            .with_panel(SidePanelSpec::new(Side::Right, 1.5));
        let err = spec.validate().unwrap_err();
        assert!(matches!(err, SpecError::DuplicatePanelSide { .. }));
    }

    #[test]
    fn test_more_indicators_than_layers_rejected() {
        let spec = minimal_spec()
            .with_indicator(FlowIndicatorSpec::new("1"))
            .with_indicator(FlowIndicatorSpec::new("2"));
        let err = spec.validate().unwrap_err();
        assert!(matches!(
            err,
            SpecError::TooManyIndicators {
                indicators: 2,
                layers: 1
            }
        ));
    }

    #[test]
    fn test_dangling_connector_rejected() {
        let spec = minimal_spec().with_connector(ConnectorSpec::new(
            BoxRef::Child { layer: 0, index: 0 },
            BoxRef::Child { layer: 5, index: 0 },
        ));
        let err = spec.validate().unwrap_err();
        match err {
            SpecError::DanglingConnector {
                connector,
                reference,
            } => {
                assert_eq!(connector, 0);
                assert_eq!(reference, BoxRef::Child { layer: 5, index: 0 });
            }
            other => panic!("expected DanglingConnector, got {other:?}"),
        }
    }

    #[test]
    fn test_connector_to_output_resolves() {
        let mut spec = minimal_spec();
        spec.layers[0].output = Some(OutputSpec::new("LOG", 1.2, 0.5));
        let spec = spec.with_connector(ConnectorSpec::new(BoxRef::Layer(0), BoxRef::Output(0)));
        assert!(spec.validate().is_ok());
    }

    #[test]
    fn test_box_ref_display() {
        assert_eq!(
            BoxRef::Child { layer: 2, index: 3 }.to_string(),
            "layer 2 child 3"
        );
        assert_eq!(BoxRef::Panel(Side::Right).to_string(), "right panel");
        assert_eq!(BoxRef::Indicator(1).to_string(), "flow indicator 1");
    }

    #[test]
    fn test_fill_spec_resolve() {
        let style = FillSpec::filled("#E8F4FD")
            .with_border("#1976D2")
            .with_border_width(2.0)
            .resolve()
            .unwrap();
        assert!(style.fill.is_some());
        assert_eq!(style.stroke.width(), 2.0);
    }

    #[test]
    fn test_opaque_means_filled() {
        assert!(FillSpec::filled("white").is_opaque());
        assert!(!FillSpec::outline("black").is_opaque());
    }

    #[test]
    fn test_spec_json_round_trip() {
        let spec = minimal_spec()
            .with_title(TitleSpec::new("System").with_subtitle("Overview"))
            .with_panel(
                SidePanelSpec::new(Side::Right, 2.0).with_item(BoxSpec::new(1.6, 0.8)),
            )
            .with_indicator(FlowIndicatorSpec::new("1"))
            .with_terminator(TerminatorSpec::new(0.3).with_label("OK"));

        let json = serde_json::to_string(&spec).unwrap();
        let back: DiagramSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }

    #[test]
    fn test_spec_json_minimal_input() {
        // A hand-written description relies on the serde defaults
        let json = r#"{
            "canvas": { "width": 16.0, "height": 20.0 },
            "layers": [
                { "height": 0.8, "children": [ { "size": { "width": 3.0, "height": 0.8 } } ] }
            ]
        }"#;
        let spec: DiagramSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.layers.len(), 1);
        assert!(spec.flow.auto);
        assert!(spec.validate().is_ok());
    }
}
