//! Layout computation for weighted entities.
//!
//! This crate turns a list of weighted entities into non-overlapping,
//! variably sized circular markers on a bounded world plane.
//!
//! # Architecture
//!
//! 1. **Sizing**: [`EntitySizer`] maps each weight to a bounded diameter
//!    through a sublinear curve
//! 2. **Seeding**: [`PlacementSeeder`] places entities on a deterministic
//!    spiral around the plane center
//! 3. **Relaxation**: [`relax`] runs a fixed number of damped repulsion
//!    iterations, projecting out overlaps and clamping to the plane
//!
//! [`compute_layout`] composes the three. It is pure: the same entities,
//! bounds and parameters always give the same positions.
//!
//! # Example
//!
//! ```
//! use stakemap_core::{LayoutBounds, WeightedEntity};
//! use stakemap_layout::{compute_layout, LayoutParams};
//!
//! let entities = vec![
//!     WeightedEntity::new("0xabc", 1.0),
//!     WeightedEntity::new("0xdef", 250.0),
//! ];
//! let layout = compute_layout(&entities, LayoutBounds::new(1000.0, 1000.0), &LayoutParams::default());
//!
//! for marker in &layout {
//!     println!("{}: {:?} (size {})", marker.id, marker.position, marker.size);
//! }
//! ```
//!
//! Relaxation blocks for `O(iterations * N^2)`. Callers with hundreds of
//! entities should run it off the interaction thread, or drive a
//! [`Relaxation`] in chunks and check a cancellation flag between them.

mod compute;
mod grid;
mod params;
mod placement;
mod relax;
mod sizer;

pub use compute::{auto_bounds, compute_auto_layout, compute_layout, compute_layout_from, Layout};
pub use params::{LayoutParams, RelaxParams, SeedOrder, SeedParams, SizeCurve, SizingParams};
pub use placement::{spiral_point, PlacementSeeder, SeedInput, GOLDEN_ANGLE};
pub use relax::{count_overlaps, relax, RelaxOutcome, Relaxation};
pub use sizer::EntitySizer;
