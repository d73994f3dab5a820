//! CLI logic for the Strata diagram tool.
//!
//! This module contains the core CLI logic for the Strata diagram tool.

mod args;
mod config;
mod templates;

pub use args::{Args, Command};

use std::{fs, io, path::Path};

use log::info;

use strata::{DiagramBuilder, StrataError, config::AppConfig, spec::DiagramSpec};

/// Run the Strata CLI application
///
/// This function resolves the selected diagram description, lays it out, and
/// exports the rendered image to the output file.
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `StrataError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Description validation errors
/// - Layout errors
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), StrataError> {
    info!(output_path = args.output; "Processing diagram");

    let (spec, app_config) = select_diagram(args)?;

    // Process diagram using DiagramBuilder API
    let builder = DiagramBuilder::new(app_config);
    builder.export(&spec, Path::new(&args.output), args.format)?;

    info!(output_file = args.output; "Diagram exported successfully");

    Ok(())
}

/// Resolves the subcommand to a description and the configuration to render
/// it with.
///
/// Template subcommands carry their own layout configuration so the built-in
/// diagrams render without a config file; an explicit `--config` still
/// overrides it. The `render` subcommand goes through the regular
/// configuration search.
fn select_diagram(args: &Args) -> Result<(DiagramSpec, AppConfig), StrataError> {
    match &args.command {
        Command::Architecture => override_config(args, templates::architecture()),
        Command::Pipeline => override_config(args, templates::pipeline()),
        Command::Render { file } => {
            info!(input_path = file; "Reading diagram description");
            let source = fs::read_to_string(file)?;
            let spec: DiagramSpec = serde_json::from_str(&source).map_err(|err| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("invalid diagram description in {file}: {err}"),
                )
            })?;
            Ok((spec, config::load_config(args.config.as_ref())?))
        }
    }
}

fn override_config(
    args: &Args,
    (spec, template_config): (DiagramSpec, AppConfig),
) -> Result<(DiagramSpec, AppConfig), StrataError> {
    match args.config.as_ref() {
        Some(path) => Ok((spec, config::load_config_file(path)?)),
        None => Ok((spec, template_config)),
    }
}
