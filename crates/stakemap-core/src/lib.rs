//! Core types, geometry, and error definitions for the stakemap engine.
//!
//! This crate provides the foundational types shared by the layout and
//! viewport crates:
//! - Entity types (weighted input, positioned output)
//! - World-space geometry (layout bounds, rectangles)
//! - Viewport state
//! - Error types

pub mod errors;
pub mod geometry;
pub mod types;

pub use errors::*;
pub use geometry::*;
pub use types::*;

/// Re-exported so downstream crates agree on the vector type.
pub use glam::DVec2;
