//! Pan/zoom viewport over a stakemap layout.
//!
//! [`ViewportController`] is the single owner of the viewport's scale and
//! offset. Pointer, wheel and button events from the rendering layer go
//! through its operations in arrival order; the renderer reads the resulting
//! [`ViewportState`](stakemap_core::ViewportState) each frame.
//!
//! ```
//! use stakemap_core::DVec2;
//! use stakemap_viewport::{ViewportConfig, ViewportController};
//!
//! let mut view = ViewportController::new(ViewportConfig::default(), DVec2::new(800.0, 600.0));
//! let cursor = DVec2::new(120.0, 80.0);
//! let under_cursor = view.screen_to_world(cursor);
//!
//! view.zoom_at(cursor, 2.0);
//! assert!((view.world_to_screen(under_cursor) - cursor).length() < 1e-9);
//! ```

mod config;
mod controller;
mod fit;

pub use config::ViewportConfig;
pub use controller::{Gesture, Interaction, ViewportController, ZoomDirection};
pub use fit::{entity_bounds, fit_state};
