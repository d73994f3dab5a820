//! Built-in diagram descriptions.
//!
//! Each template returns the description together with the configuration it
//! was designed for. The architecture diagram works with the default layout;
//! the pipeline flowchart hangs detail boxes off both sides of the flow, so
//! it widens the horizontal margin to make room for them.

use strata::config::{AppConfig, LayoutConfig, RenderConfig};
use strata::draw::TextStyle;
use strata::geometry::Side;
use strata::spec::{
    BoxSpec, BranchSpec, CanvasSpec, DiagramSpec, FillSpec, FlowIndicatorSpec, LabelSpec,
    LayerSpec, OutputSpec, SidePanelSpec, TerminatorSpec, TitleSpec,
};

const LIGHT_GRAY: &str = "#E8E8E8";
const MEDIUM_GRAY: &str = "#C0C0C0";
const DARK_GRAY: &str = "#404040";

const DECISION_BLUE: &str = "#E8F4FD";
const PROCESS_GREEN: &str = "#F0F8E8";
const DATA_YELLOW: &str = "#FFF8E1";
const ERROR_RED: &str = "#FFEBEE";

fn band_title(text: &str) -> LabelSpec {
    LabelSpec::new(text).with_style(TextStyle::new(0.16).bold())
}

fn labeled(text: &str, width: f64, height: f64, fill: &str) -> BoxSpec {
    BoxSpec::new(width, height)
        .with_style(FillSpec::filled(fill).with_border_width(1.0))
        .with_label(LabelSpec::new(text).with_style(TextStyle::new(0.14).bold()))
}

fn plain(text: &str, width: f64, height: f64, fill: &str) -> BoxSpec {
    BoxSpec::new(width, height)
        .with_style(FillSpec::filled(fill).with_border_width(1.0))
        .with_text(text)
}

/// The five-layer expense categorization architecture, banded with a
/// metrics panel, numbered flow markers, and per-layer output tabs.
pub(crate) fn architecture() -> (DiagramSpec, AppConfig) {
    let spec = DiagramSpec::new(CanvasSpec::new(18.0, 14.0))
        .with_title(
            TitleSpec::new("INTELLIGENT SMS-BASED EXPENSE CATEGORIZATION SYSTEM")
                .with_subtitle("Four-Layer Hybrid AI Architecture"),
        )
        .with_layer(
            LayerSpec::new(1.6)
                .with_band(FillSpec::filled(LIGHT_GRAY))
                .with_title(band_title("SMS NOTIFICATION INPUT"))
                .with_children(vec![
                    plain("HDFC Bank", 1.8, 0.6, "white"),
                    plain("AXIS Bank", 1.8, 0.6, "white"),
                    plain("PAYTM", 1.8, 0.6, "white"),
                    plain("ICICI Bank", 1.8, 0.6, "white"),
                    plain("SBI Card", 1.8, 0.6, "white"),
                ])
                .with_output(OutputSpec::new("Raw SMS\nData", 1.2, 0.5).with_style(
                    FillSpec::filled(MEDIUM_GRAY).with_border_width(1.0),
                )),
        )
        .with_layer(
            LayerSpec::new(1.6)
                .with_band(FillSpec::filled("white"))
                .with_title(band_title("AUTHENTIC SENDER VALIDATION"))
                .with_children(vec![
                    labeled("ACCEPT", 2.4, 0.5, MEDIUM_GRAY),
                    labeled("VALIDATE", 2.4, 0.5, MEDIUM_GRAY),
                    labeled("REJECT", 2.4, 0.5, MEDIUM_GRAY),
                ])
                .with_output(OutputSpec::new("Validated\nSMS", 1.2, 0.5).with_style(
                    FillSpec::filled(MEDIUM_GRAY).with_border_width(1.0),
                )),
        )
        .with_layer(
            LayerSpec::new(1.6)
                .with_band(FillSpec::filled(LIGHT_GRAY))
                .with_title(band_title("THREE-LAYER HYBRID CATEGORIZATION"))
                .with_children(vec![
                    plain("Indian DB\n150+ Merchants", 2.4, 0.8, "white"),
                    plain("Foursquare\nAPI Fallback", 2.4, 0.8, "white"),
                    plain("Keywords\nScoring", 2.4, 0.8, "white"),
                ])
                .with_output(OutputSpec::new("Categorized\nExpense", 1.2, 0.5).with_style(
                    FillSpec::filled(MEDIUM_GRAY).with_border_width(1.0),
                )),
        )
        .with_layer(
            LayerSpec::new(1.6)
                .with_band(FillSpec::filled("white"))
                .with_title(band_title("SMART LEARNING SYSTEM"))
                .with_annotation(
                    LabelSpec::new("User Feedback Learning | Similarity > 0.7")
                        .with_style(TextStyle::new(0.11))
                        .with_offset(0.0, 0.45),
                )
                .with_children(vec![
                    plain("Amount Patterns", 1.8, 0.6, LIGHT_GRAY),
                    plain("Time Patterns", 1.8, 0.6, LIGHT_GRAY),
                    plain("Merchant Patterns", 1.8, 0.6, LIGHT_GRAY),
                    plain("User Corrections", 1.8, 0.6, LIGHT_GRAY),
                ])
                .with_output(OutputSpec::new("Learning\nData", 1.2, 0.5).with_style(
                    FillSpec::filled(MEDIUM_GRAY).with_border_width(1.0),
                )),
        )
        .with_layer(
            LayerSpec::new(1.6)
                .with_band(FillSpec::filled(LIGHT_GRAY))
                .with_title(band_title("FLUTTER MOBILE APPLICATION"))
                .with_annotation(
                    LabelSpec::new("Local Processing | 12ms per SMS | <50MB Memory")
                        .with_style(TextStyle::new(0.11))
                        .with_offset(0.0, 0.45),
                )
                .with_children(vec![
                    plain("SMS Scanner\nPermissions", 2.4, 0.6, "white"),
                    plain("Expense Storage\nFirebase Sync", 2.4, 0.6, "white"),
                    plain("UI Display\nUser Interface", 2.4, 0.6, "white"),
                ]),
        )
        .with_panel(
            SidePanelSpec::new(Side::Right, 2.0)
                .with_style(FillSpec::filled(LIGHT_GRAY))
                .with_title(
                    LabelSpec::new("PERFORMANCE METRICS")
                        .with_style(TextStyle::new(0.13).bold()),
                )
                .with_item(plain("94.2%\nAccuracy", 1.8, 1.0, "white"))
                .with_item(plain("89.7%\nClassify", 1.8, 1.0, "white"))
                .with_item(plain("87%\nEffort", 1.8, 1.0, "white"))
                .with_item(plain("4.6/5.0\nSatisfy", 1.8, 1.0, "white")),
        )
        .with_indicator(marker("1"))
        .with_indicator(marker("2"))
        .with_indicator(marker("3"))
        .with_indicator(marker("4"));

    (spec, AppConfig::default())
}

fn marker(number: &str) -> FlowIndicatorSpec {
    FlowIndicatorSpec::new(number)
        .with_label(
            LabelSpec::new(number).with_style(TextStyle::new(0.2).bold().with_color("white")),
        )
        .with_size(1.0, 0.8)
        .with_style(FillSpec::filled(DARK_GRAY).with_border_width(1.0))
}

/// The eleven-step SMS processing flowchart, with decision branches hanging
/// off both sides and a terminator circle at the bottom.
pub(crate) fn pipeline() -> (DiagramSpec, AppConfig) {
    let spec = DiagramSpec::new(CanvasSpec::new(16.0, 24.0))
        .with_title(
            TitleSpec::new("SMS PROCESSING PIPELINE")
                .with_subtitle("Intelligent Expense Detection and Categorization Flow"),
        )
        .with_layer(step("SMS MESSAGE\nRECEIVED", 4.0, 1.0, DATA_YELLOW))
        .with_layer(
            step("SMS PERMISSION\nGRANTED?", 4.0, 0.8, DECISION_BLUE).with_branch(
                BranchSpec::new(
                    Side::Right,
                    0.4,
                    detail("PERMISSION DENIED\nEXIT", 1.2, ERROR_RED),
                )
                .with_connector_label("NO"),
            ),
        )
        .with_layer(step("FETCH LAST 50 SMS\n(LAST 7 DAYS)", 4.0, 0.8, PROCESS_GREEN))
        .with_layer(
            step("AUTHENTIC SENDER\nVALIDATION", 5.0, 0.8, DECISION_BLUE)
                .with_branch(
                    BranchSpec::new(
                        Side::Left,
                        0.4,
                        detail("ACCEPT\nBank and wallet codes", 1.6, PROCESS_GREEN),
                    )
                    .with_connector_label("VALID"),
                )
                .with_branch(
                    BranchSpec::new(
                        Side::Right,
                        0.4,
                        detail("REJECT\nPhone numbers, fraud SMS", 1.6, ERROR_RED),
                    )
                    .with_connector_label("INVALID"),
                ),
        )
        .with_layer(
            step("CONTAINS EXPENSE\nKEYWORDS?", 5.0, 0.8, DECISION_BLUE)
                .with_branch(BranchSpec::new(
                    Side::Left,
                    0.4,
                    detail("EXPENSE KEYWORDS\ndebited, spent, charged", 1.6, DATA_YELLOW),
                ))
                .with_branch(
                    BranchSpec::new(
                        Side::Right,
                        0.4,
                        detail("NO KEYWORDS\nSKIP SMS", 0.8, ERROR_RED),
                    )
                    .with_connector_label("NO"),
                ),
        )
        .with_layer(step("EXTRACT AMOUNT\nUSING REGEX", 4.0, 0.8, PROCESS_GREEN))
        .with_layer(
            step("DUPLICATE EXPENSE\nCHECK", 5.0, 0.8, DECISION_BLUE).with_branch(
                BranchSpec::new(
                    Side::Right,
                    0.4,
                    detail("DUPLICATE FOUND\nSKIP SMS", 0.8, ERROR_RED),
                )
                .with_connector_label("YES"),
            ),
        )
        .with_layer(
            LayerSpec::new(1.8)
                .with_band(FillSpec::filled(PROCESS_GREEN))
                .with_title(
                    LabelSpec::new("THREE-LAYER HYBRID CATEGORIZATION")
                        .with_style(TextStyle::new(0.15).bold()),
                )
                .with_children(vec![
                    plain("Indian DB", 2.0, 0.6, DATA_YELLOW),
                    plain("Foursquare API", 2.0, 0.6, DATA_YELLOW),
                    plain("Keywords", 2.0, 0.6, DATA_YELLOW),
                ]),
        )
        .with_layer(
            step("SMART LEARNING\nSUGGESTION", 5.0, 0.8, DECISION_BLUE)
                .with_branch(
                    BranchSpec::new(
                        Side::Left,
                        0.4,
                        detail("AUTO-CATEGORIZE\nSimilarity > 0.7", 1.6, PROCESS_GREEN),
                    )
                    .with_connector_label("HIGH"),
                )
                .with_branch(
                    BranchSpec::new(
                        Side::Right,
                        0.4,
                        detail("PROMPT USER\nLow confidence", 1.6, DECISION_BLUE),
                    )
                    .with_connector_label("LOW"),
                ),
        )
        .with_layer(step(
            "GENERATE SMART TITLE\nCategory: Method HH:MM",
            4.0,
            0.8,
            PROCESS_GREEN,
        ))
        .with_layer(step("SAVE TO FIREBASE\nWITH METADATA", 4.0, 0.8, DATA_YELLOW))
        .with_terminator(
            TerminatorSpec::new(0.3)
                .with_label("OK")
                .with_caption(
                    LabelSpec::new("EXPENSE ADDED").with_style(TextStyle::new(0.14).bold()),
                )
                .with_style(FillSpec::filled(PROCESS_GREEN)),
        );

    // Detail boxes sit in the horizontal margin, 3.5 wide plus a 0.4
    // offset, so the default 1.0 margin cannot hold them.
    let mut layout = LayoutConfig::default();
    layout.set_margin(4.2);

    (spec, AppConfig::new(layout, RenderConfig::default()))
}

fn step(text: &str, width: f64, height: f64, fill: &str) -> LayerSpec {
    LayerSpec::new(1.0).with_child(
        BoxSpec::new(width, height)
            .with_style(FillSpec::filled(fill).with_border_width(2.0))
            .with_label(LabelSpec::new(text).with_style(TextStyle::new(0.14).bold())),
    )
}

fn detail(text: &str, height: f64, fill: &str) -> BoxSpec {
    BoxSpec::new(3.5, height)
        .with_style(FillSpec::filled(fill).with_border_width(1.0))
        .with_text(text)
}
