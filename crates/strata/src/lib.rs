//! Strata - A layout engine and renderer for layered block-and-arrow diagrams
//!
//! This library turns a declarative diagram description into placed geometry
//! and renders it to SVG, PNG, or JPEG. Placement is deterministic and
//! fail-fast: the same description and configuration always produce the same
//! scene, and anything that cannot be placed without an overlap is reported
//! as an error instead of a degraded picture.
//!
//! # Examples
//!
//! ```rust,no_run
//! use strata::DiagramBuilder;
//! use strata::spec::{BoxSpec, CanvasSpec, DiagramSpec, LayerSpec};
//!
//! let spec = DiagramSpec::new(CanvasSpec::new(10.0, 8.0))
//!     .with_layer(LayerSpec::new(1.5).with_child(BoxSpec::new(2.0, 1.0).with_text("INPUT")))
//!     .with_layer(LayerSpec::new(1.5).with_child(BoxSpec::new(2.0, 1.0).with_text("PROCESS")));
//!
//! let builder = DiagramBuilder::default();
//! let scene = builder.layout(&spec).expect("layout failed");
//! let svg = builder.render_svg(&scene).expect("render failed");
//! println!("{svg}");
//! ```

pub mod config;
pub mod export;
pub mod scene;

mod error;
mod layout;
mod router;

pub use strata_core::{color, draw, geometry, spec};

pub use error::{LayoutError, StrataError};

use std::{fs, path::Path};

use log::info;

use config::AppConfig;
use export::{ImageFormat, RasterOptions, SvgSurface};
use scene::Scene;
use spec::DiagramSpec;

/// Builder for placing and rendering diagrams.
///
/// Holds the layout and render configuration; one builder can process any
/// number of diagrams.
///
/// # Examples
///
/// ```rust,no_run
/// use strata::{config::AppConfig, DiagramBuilder};
///
/// // With custom config
/// let config = AppConfig::default();
/// let builder = DiagramBuilder::new(config);
///
/// // Or use the defaults
/// let builder = DiagramBuilder::default();
/// ```
#[derive(Default)]
pub struct DiagramBuilder {
    config: AppConfig,
}

impl DiagramBuilder {
    /// Creates a builder with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Validates a diagram description and places every box, connector, and
    /// label.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the description or config is
    /// invalid, and a layout error when something cannot be placed without
    /// overflowing or overlapping.
    pub fn layout(&self, spec: &DiagramSpec) -> Result<Scene, StrataError> {
        layout::layout(spec, self.config.layout())
    }

    /// Renders a placed scene to SVG text.
    pub fn render_svg(&self, scene: &Scene) -> Result<String, StrataError> {
        let mut surface = SvgSurface::new(scene.canvas_size(), self.config.render())?;
        scene.paint(&mut surface);
        let document = surface.finish();
        info!("SVG document assembled");
        Ok(document.to_string())
    }

    /// Renders a placed scene to encoded bytes in the given format.
    pub fn render(&self, scene: &Scene, format: ImageFormat) -> Result<Vec<u8>, StrataError> {
        let svg = self.render_svg(scene)?;
        let bytes = match format {
            ImageFormat::Svg => svg.into_bytes(),
            ImageFormat::Png => export::svg_to_png(&svg, &self.raster_options()?)?,
            ImageFormat::Jpeg => export::svg_to_jpeg(&svg, &self.raster_options()?)?,
        };
        Ok(bytes)
    }

    /// Places a diagram and writes the rendered image to `path`.
    ///
    /// The encoding comes from `format`, or is inferred from the path
    /// extension when `format` is `None`. Nothing is written unless the
    /// whole pipeline succeeds.
    pub fn export(
        &self,
        spec: &DiagramSpec,
        path: &Path,
        format: Option<ImageFormat>,
    ) -> Result<(), StrataError> {
        let format = format
            .or_else(|| ImageFormat::from_path(path))
            .ok_or_else(|| {
                StrataError::Export(
                    format!(
                        "cannot infer an image format from `{}`, pass one explicitly",
                        path.display()
                    )
                    .into(),
                )
            })?;
        let scene = self.layout(spec)?;
        let bytes = self.render(&scene, format)?;
        fs::write(path, bytes)?;
        info!(path:? = path, format = format.name(); "diagram exported");
        Ok(())
    }

    /// Returns the configuration this builder operates with.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    fn raster_options(&self) -> Result<RasterOptions, StrataError> {
        let render = self.config.render();
        let background = render.background_color().map_err(|message| {
            StrataError::Spec(spec::SpecError::InvalidColor {
                field: "render.background".to_string(),
                message,
            })
        })?;
        Ok(RasterOptions {
            scale: 1.0,
            background,
            jpeg_quality: render.jpeg_quality(),
        })
    }
}
