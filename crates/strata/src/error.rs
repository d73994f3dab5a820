//! Error types for Strata operations.
//!
//! This module provides the main error type [`StrataError`] which wraps the
//! error conditions that can occur while validating, placing, and exporting a
//! diagram, and [`LayoutError`] for the placement failures the engine refuses
//! to paper over.

use std::io;

use thiserror::Error;

use strata_core::spec::{BoxRef, SpecError};

/// A placement failure.
///
/// Layout either succeeds with zero overlapping opaque boxes or fails with
/// one of these; there is no silent degradation. Every variant names the
/// geometry it is complaining about.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    /// The layer stack ran past the bottom margin.
    #[error(
        "layout overflow: layer {layer} bottom edge {bottom:.3} falls below the bottom margin at {limit:.3}"
    )]
    StackOverflow {
        layer: usize,
        bottom: f64,
        limit: f64,
    },

    /// The terminator circle or its caption ran past the bottom margin.
    #[error(
        "layout overflow: terminator bottom edge {bottom:.3} falls below the bottom margin at {limit:.3}"
    )]
    TerminatorOverflow { bottom: f64, limit: f64 },

    /// A placed box extends outside the canvas.
    #[error("layout overflow: {reference} extends outside the canvas")]
    OutsideCanvas { reference: BoxRef },

    /// Two opaque boxes intersect.
    #[error("layout overflow: {first} overlaps {second}")]
    Overlap { first: BoxRef, second: BoxRef },

    /// Layer content entered a strip reserved for panels or indicators.
    #[error("layout overflow: {reference} intrudes into the reserved {strip} strip")]
    MarginIntrusion {
        reference: BoxRef,
        strip: &'static str,
    },

    /// A connector label found no collision-free position within the retry
    /// budget.
    #[error(
        "label `{label}` on {connector} could not be placed after {attempts} attempts"
    )]
    LabelPlacement {
        connector: String,
        label: String,
        attempts: usize,
    },
}

/// The main error type for Strata operations.
#[derive(Debug, Error)]
pub enum StrataError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("configuration error: {0}")]
    Spec(#[from] SpecError),

    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("export error: {0}")]
    Export(Box<dyn std::error::Error + Send + Sync>),
}

impl From<crate::export::RasterError> for StrataError {
    fn from(error: crate::export::RasterError) -> Self {
        Self::Export(Box::new(error))
    }
}
