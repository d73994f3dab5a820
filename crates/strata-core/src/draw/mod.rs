//! Visual definitions for diagram elements.
//!
//! This module collects the styling types shared by the layout engine and
//! rendering backends:
//!
//! - [`StrokeDefinition`] / [`StrokeStyle`]: line and border strokes
//! - [`TextStyle`] with arithmetic size estimation, [`HAlign`] / [`VAlign`]
//! - [`Surface`], [`ShapeStyle`], [`ArrowOptions`]: the drawing contract

mod stroke;
mod surface;
mod text;

pub use stroke::{StrokeDefinition, StrokeStyle};
pub use surface::{ArrowOptions, ShapeStyle, Surface};
pub use text::{HAlign, TextStyle, VAlign};
