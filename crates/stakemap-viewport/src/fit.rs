//! Fit-to-bounds computation.

use glam::DVec2;
use stakemap_core::{PositionedEntity, Rect, ViewportState};

use crate::config::ViewportConfig;

/// Bounding box over all marker circles, or `None` for an empty set.
pub fn entity_bounds(entities: &[PositionedEntity]) -> Option<Rect> {
    entities
        .iter()
        .map(PositionedEntity::bounding_rect)
        .reduce(|acc, r| acc.union(&r))
}

/// Viewport state that shows every marker, centered.
///
/// `scale = clamp(min(vw / bw, vh / bh) * margin_factor)`. Degenerate boxes
/// are widened to `min_fit_extent` first. Returns `None` for an empty set.
pub fn fit_state(
    entities: &[PositionedEntity],
    viewport_size: DVec2,
    margin_factor: f64,
    config: &ViewportConfig,
) -> Option<ViewportState> {
    let bbox = entity_bounds(entities)?.with_min_extent(config.min_fit_extent.max(f64::EPSILON));
    let margin_factor = if margin_factor.is_finite() && margin_factor > 0.0 {
        margin_factor
    } else {
        config.fit_margin
    };
    let naive = (viewport_size.x / bbox.width).min(viewport_size.y / bbox.height) * margin_factor;
    let scale = config.clamp_scale(naive);
    let offset = viewport_size / 2.0 - bbox.center() * scale;
    Some(ViewportState::new(scale, offset, viewport_size))
}
