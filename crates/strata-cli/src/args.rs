//! Command-line argument definitions for the Strata CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. A subcommand selects the diagram to render; shared flags
//! control the output path, image format, configuration file selection, and
//! logging verbosity.

use clap::{Parser, Subcommand};

use strata::export::ImageFormat;

/// Command-line arguments for the Strata diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Diagram to render
    #[command(subcommand)]
    pub command: Command,

    /// Path to the output image file
    #[arg(short, long, default_value = "diagram.png", global = true)]
    pub output: String,

    /// Output format (png, jpeg, svg); inferred from the output extension
    /// when omitted
    #[arg(long, global = true)]
    pub format: Option<ImageFormat>,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
}

/// The diagram a single invocation renders.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render the built-in system architecture diagram
    Architecture,
    /// Render the built-in processing pipeline flowchart
    Pipeline,
    /// Render a diagram description from a JSON file
    Render {
        /// Path to the diagram description file
        file: String,
    },
}
