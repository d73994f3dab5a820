//! Strata Core Types and Definitions
//!
//! This crate provides the foundational types for the Strata diagram
//! renderer. It includes:
//!
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Draw**: Strokes, text styling, and the drawing surface contract
//!   ([`draw`] module)
//! - **Spec**: Declarative diagram descriptions ([`spec`] module)

pub mod color;
pub mod draw;
pub mod geometry;
pub mod spec;
