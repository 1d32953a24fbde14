//! Viewport controller and pointer state machine.

use glam::DVec2;
use stakemap_core::{EntityId, PositionedEntity, Rect, ViewportState};
use tracing::{debug, trace};

use crate::config::ViewportConfig;
use crate::fit::fit_state;

/// Pointer interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Interaction {
    #[default]
    Idle,
    Dragging {
        /// Pointer position minus offset at press time
        anchor: DVec2,
        /// Pointer position at press time
        origin: DVec2,
        /// Whether the pointer left the click threshold
        moved: bool,
    },
}

/// What a pointer release amounted to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Press and release within the click threshold
    Click { screen: DVec2 },
    /// The press turned into a pan
    Pan,
    /// Release without a preceding press
    None,
}

/// Largest wheel zoom exponent; keeps `exp` finite and non-zero.
const MAX_WHEEL_EXPONENT: f64 = 700.0;

/// Direction of a button-driven zoom step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

/// Single owner of viewport scale and offset.
///
/// All mutations go through these methods and must be applied in event
/// arrival order; pan and zoom both read and then write the same
/// scale/offset pair.
#[derive(Debug, Clone)]
pub struct ViewportController {
    config: ViewportConfig,
    state: ViewportState,
    interaction: Interaction,
    /// Set when a pan ends so the click that follows it is ignored
    suppress_click: bool,
    hovered: Option<EntityId>,
    selected: Option<EntityId>,
}

impl Default for ViewportController {
    fn default() -> Self {
        Self::new(ViewportConfig::default(), DVec2::new(800.0, 600.0))
    }
}

impl ViewportController {
    /// Create a controller at the default scale with zero offset.
    pub fn new(config: ViewportConfig, viewport_size: DVec2) -> Self {
        let scale = config.clamp_scale(config.default_scale);
        Self {
            state: ViewportState::new(scale, DVec2::ZERO, sanitize_size(viewport_size)),
            config,
            interaction: Interaction::Idle,
            suppress_click: false,
            hovered: None,
            selected: None,
        }
    }

    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Replace the configuration, re-clamping the current scale.
    pub fn set_config(&mut self, config: ViewportConfig) {
        self.config = config;
        let clamped = self.config.clamp_scale(self.state.scale);
        if clamped != self.state.scale {
            let center = self.state.viewport_center();
            self.apply_scale_at(center, clamped);
        }
    }

    pub fn state(&self) -> &ViewportState {
        &self.state
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.interaction, Interaction::Dragging { .. })
    }

    pub fn hovered(&self) -> Option<&EntityId> {
        self.hovered.as_ref()
    }

    pub fn selected(&self) -> Option<&EntityId> {
        self.selected.as_ref()
    }

    pub fn world_to_screen(&self, world: DVec2) -> DVec2 {
        self.state.world_to_screen(world)
    }

    pub fn screen_to_world(&self, screen: DVec2) -> DVec2 {
        self.state.screen_to_world(screen)
    }

    /// World-space rectangle currently visible.
    pub fn visible_world_rect(&self) -> Rect {
        self.state.visible_world_rect()
    }

    /// Resize the visible window. Scale and offset are kept.
    pub fn set_viewport_size(&mut self, size: DVec2) {
        self.state.viewport_size = sanitize_size(size);
    }

    /// Translate the view by a screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let delta = DVec2::new(dx, dy);
        if delta.is_finite() {
            self.set_offset(self.state.offset + delta);
        }
    }

    /// Zoom by `factor`, keeping the world point under `screen_point` fixed.
    ///
    /// The resulting scale is clamped, so an overflowing factor lands on
    /// `max_scale`. NaN and non-positive factors are ignored.
    pub fn zoom_at(&mut self, screen_point: DVec2, factor: f64) {
        if factor.is_nan() || factor <= 0.0 || !screen_point.is_finite() {
            return;
        }
        let scale = self.config.clamp_scale(self.state.scale * factor);
        self.apply_scale_at(screen_point, scale);
    }

    /// Button-driven zoom anchored at the viewport center.
    pub fn zoom_step(&mut self, direction: ZoomDirection) {
        let factor = match direction {
            ZoomDirection::In => self.config.zoom_step,
            ZoomDirection::Out => 1.0 / self.config.zoom_step,
        };
        let center = self.state.viewport_center();
        self.zoom_at(center, factor);
    }

    /// Wheel zoom at the cursor; negative `delta_y` zooms in.
    pub fn wheel(&mut self, screen_point: DVec2, delta_y: f64) {
        if delta_y.is_nan() {
            return;
        }
        let exponent = (-delta_y * self.config.wheel_sensitivity)
            .clamp(-MAX_WHEEL_EXPONENT, MAX_WHEEL_EXPONENT);
        self.zoom_at(screen_point, exponent.exp());
    }

    /// Show every marker, centered, in a viewport of `viewport_size`, using
    /// the configured fit margin.
    pub fn fit_to_bounds(&mut self, entities: &[PositionedEntity], viewport_size: DVec2) {
        let margin = self.config.fit_margin;
        self.fit_to_bounds_with_margin(entities, viewport_size, margin);
    }

    /// Show every marker, centered, filling at most `margin_factor` of the
    /// viewport along the tighter axis.
    ///
    /// An empty set resets to the default scale and zero offset.
    pub fn fit_to_bounds_with_margin(
        &mut self,
        entities: &[PositionedEntity],
        viewport_size: DVec2,
        margin_factor: f64,
    ) {
        self.set_viewport_size(viewport_size);
        match fit_state(entities, self.state.viewport_size, margin_factor, &self.config) {
            Some(state) => {
                debug!(entities = entities.len(), scale = state.scale, "fit to bounds");
                self.state.scale = state.scale;
                self.set_offset(state.offset);
            }
            None => self.reset(),
        }
    }

    /// Return to the default scale with zero offset and cancel any drag.
    pub fn reset(&mut self) {
        self.state.scale = self.config.clamp_scale(self.config.default_scale);
        self.state.offset = DVec2::ZERO;
        self.interaction = Interaction::Idle;
        debug!(scale = self.state.scale, "viewport reset");
    }

    /// `Idle -> Dragging`.
    pub fn pointer_down(&mut self, screen: DVec2) {
        if !screen.is_finite() {
            return;
        }
        self.suppress_click = false;
        self.hovered = None;
        self.interaction = Interaction::Dragging {
            anchor: screen - self.state.offset,
            origin: screen,
            moved: false,
        };
    }

    /// While dragging, the offset tracks the pointer exactly.
    pub fn pointer_move(&mut self, screen: DVec2) {
        if !screen.is_finite() {
            return;
        }
        if let Interaction::Dragging {
            anchor,
            origin,
            moved,
        } = &mut self.interaction
        {
            self.state.offset = screen - *anchor;
            if screen.distance(*origin) > self.config.click_threshold {
                *moved = true;
            }
        }
    }

    /// `Dragging -> Idle`, reporting whether the press was a click or a pan.
    pub fn pointer_up(&mut self, screen: DVec2) -> Gesture {
        self.pointer_move(screen);
        match std::mem::take(&mut self.interaction) {
            Interaction::Dragging { moved: true, .. } => {
                self.suppress_click = true;
                Gesture::Pan
            }
            Interaction::Dragging { moved: false, .. } => Gesture::Click { screen },
            Interaction::Idle => Gesture::None,
        }
    }

    /// Pointer left the surface: cancel the drag.
    pub fn pointer_leave(&mut self) {
        if let Interaction::Dragging { moved: true, .. } = self.interaction {
            self.suppress_click = true;
        }
        self.interaction = Interaction::Idle;
        self.hovered = None;
    }

    /// Markers whose bounding box touches the visible area.
    pub fn visible_entities<'a>(
        &self,
        entities: &'a [PositionedEntity],
    ) -> impl Iterator<Item = &'a PositionedEntity> + 'a {
        let visible = self.visible_world_rect();
        entities
            .iter()
            .filter(move |e| visible.intersects(&e.bounding_rect()))
    }

    /// Topmost marker under a screen point. Later entities draw on top.
    pub fn hit_test<'a>(
        &self,
        entities: &'a [PositionedEntity],
        screen: DVec2,
    ) -> Option<&'a PositionedEntity> {
        let world = self.screen_to_world(screen);
        entities.iter().rev().find(|e| e.contains(world))
    }

    /// Update the hovered marker. Nothing is hovered during a drag.
    pub fn hover_at(&mut self, entities: &[PositionedEntity], screen: DVec2) -> Option<&EntityId> {
        self.hovered = if self.is_dragging() {
            None
        } else {
            self.hit_test(entities, screen).map(|e| e.id.clone())
        };
        self.hovered.as_ref()
    }

    /// Handle a click: select the marker under the point, or clear the
    /// selection on empty space.
    ///
    /// Suppressed (returns `None`, selection unchanged) while a drag has
    /// moved beyond the click threshold, and for the first click after such
    /// a drag ends.
    pub fn select_at(&mut self, entities: &[PositionedEntity], screen: DVec2) -> Option<&EntityId> {
        if let Interaction::Dragging { moved: true, .. } = self.interaction {
            trace!("click suppressed during pan");
            return None;
        }
        if std::mem::take(&mut self.suppress_click) {
            trace!("click suppressed after pan");
            return None;
        }
        self.selected = self.hit_test(entities, screen).map(|e| e.id.clone());
        self.selected.as_ref()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    fn apply_scale_at(&mut self, screen_point: DVec2, scale: f64) {
        let world = self.state.screen_to_world(screen_point);
        self.state.scale = scale;
        self.set_offset(screen_point - world * scale);
        trace!(scale, "zoom");
    }

    /// Move the offset outside of pointer tracking. A drag in progress keeps
    /// following the pointer from the new offset.
    fn set_offset(&mut self, offset: DVec2) {
        if let Interaction::Dragging { anchor, .. } = &mut self.interaction {
            *anchor -= offset - self.state.offset;
        }
        self.state.offset = offset;
    }
}

fn sanitize_size(size: DVec2) -> DVec2 {
    let fix = |v: f64| if v.is_finite() && v > 0.0 { v } else { 1.0 };
    DVec2::new(fix(size.x), fix(size.y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(id: &str, x: f64, y: f64, size: f64) -> PositionedEntity {
        PositionedEntity {
            id: id.into(),
            weight: 1.0,
            size,
            position: DVec2::new(x, y),
        }
    }

    fn controller() -> ViewportController {
        ViewportController::new(ViewportConfig::default(), DVec2::new(800.0, 600.0))
    }

    #[test]
    fn test_initial_state() {
        let view = controller();
        assert_eq!(view.state().scale, 1.0);
        assert_eq!(view.state().offset, DVec2::ZERO);
        assert_eq!(view.interaction(), Interaction::Idle);
    }

    #[test]
    fn test_zoom_anchor() {
        let mut view = controller();
        view.pan(37.0, -12.0);
        let cursor = DVec2::new(250.0, 410.0);
        let world = view.screen_to_world(cursor);

        view.zoom_at(cursor, 3.0);
        assert!((view.state().scale - 3.0).abs() < 1e-12);
        assert!((view.world_to_screen(world) - cursor).length() < 1e-9);

        view.zoom_at(cursor, 0.25);
        assert!((view.world_to_screen(world) - cursor).length() < 1e-9);
    }

    #[test]
    fn test_zoom_clamped_and_anchored() {
        let mut view = controller();
        let cursor = DVec2::new(100.0, 100.0);
        let world = view.screen_to_world(cursor);
        view.zoom_at(cursor, 1e6);
        assert_eq!(view.state().scale, view.config().max_scale);
        assert!((view.world_to_screen(world) - cursor).length() < 1e-9);

        view.zoom_at(cursor, 1e-9);
        assert_eq!(view.state().scale, view.config().min_scale);
    }

    #[test]
    fn test_bad_zoom_factors_ignored() {
        let mut view = controller();
        let before = *view.state();
        view.zoom_at(DVec2::new(10.0, 10.0), f64::NAN);
        view.zoom_at(DVec2::new(10.0, 10.0), 0.0);
        view.zoom_at(DVec2::new(10.0, 10.0), -2.0);
        view.pan(f64::INFINITY, 0.0);
        assert_eq!(*view.state(), before);
    }

    #[test]
    fn test_zoom_step_anchors_center() {
        let mut view = controller();
        let center_world = view.screen_to_world(DVec2::new(400.0, 300.0));
        view.zoom_step(ZoomDirection::In);
        assert!((view.state().scale - 1.25).abs() < 1e-12);
        assert!((view.world_to_screen(center_world) - DVec2::new(400.0, 300.0)).length() < 1e-9);
        view.zoom_step(ZoomDirection::Out);
        assert!((view.state().scale - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_wheel_direction() {
        let mut view = controller();
        view.wheel(DVec2::new(10.0, 10.0), -100.0);
        assert!(view.state().scale > 1.0);
        view.reset();
        view.wheel(DVec2::new(10.0, 10.0), 100.0);
        assert!(view.state().scale < 1.0);
    }

    #[test]
    fn test_huge_wheel_delta_clamps() {
        let mut view = controller();
        view.wheel(DVec2::new(10.0, 10.0), -1e6);
        assert_eq!(view.state().scale, view.config().max_scale);
        view.wheel(DVec2::new(10.0, 10.0), 1e6);
        assert_eq!(view.state().scale, view.config().min_scale);
        view.zoom_at(DVec2::new(10.0, 10.0), f64::INFINITY);
        assert_eq!(view.state().scale, view.config().max_scale);
    }

    #[test]
    fn test_zoom_during_drag_keeps_anchor() {
        let mut view = controller();
        view.pointer_down(DVec2::new(100.0, 100.0));
        view.pointer_move(DVec2::new(120.0, 100.0));

        let cursor = DVec2::new(120.0, 100.0);
        let world = view.screen_to_world(cursor);
        view.wheel(cursor, -200.0);
        view.pointer_move(cursor);
        assert!((view.world_to_screen(world) - cursor).length() < 1e-9);

        // The grabbed point keeps following the pointer after the zoom.
        view.pointer_move(DVec2::new(150.0, 130.0));
        assert!((view.world_to_screen(world) - DVec2::new(150.0, 130.0)).length() < 1e-9);
    }

    #[test]
    fn test_pan_during_drag() {
        let mut view = controller();
        view.pointer_down(DVec2::new(0.0, 0.0));
        view.pan(25.0, -5.0);
        view.pointer_move(DVec2::new(10.0, 0.0));
        assert_eq!(view.state().offset, DVec2::new(35.0, -5.0));
    }

    #[test]
    fn test_visible_entities() {
        let view = controller();
        let markers = [
            marker("inside", 400.0, 300.0, 20.0),
            marker("edge", -5.0, 300.0, 20.0),
            marker("outside", 2000.0, 300.0, 20.0),
        ];
        let ids: Vec<&str> = view.visible_entities(&markers).map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["inside", "edge"]);
    }

    #[test]
    fn test_drag_tracks_cursor() {
        let mut view = controller();
        view.pan(10.0, 20.0);
        view.pointer_down(DVec2::new(100.0, 100.0));
        assert!(view.is_dragging());

        view.pointer_move(DVec2::new(150.0, 80.0));
        assert_eq!(view.state().offset, DVec2::new(60.0, 0.0));

        let gesture = view.pointer_up(DVec2::new(160.0, 90.0));
        assert_eq!(gesture, Gesture::Pan);
        assert_eq!(view.state().offset, DVec2::new(70.0, 10.0));
        assert!(!view.is_dragging());

        // Moves while idle do nothing.
        view.pointer_move(DVec2::new(0.0, 0.0));
        assert_eq!(view.state().offset, DVec2::new(70.0, 10.0));
    }

    #[test]
    fn test_click_within_threshold() {
        let mut view = controller();
        let markers = [marker("a", 100.0, 100.0, 40.0)];
        view.pointer_down(DVec2::new(100.0, 100.0));
        view.pointer_move(DVec2::new(102.0, 101.0));
        let gesture = view.pointer_up(DVec2::new(102.0, 101.0));
        assert_eq!(gesture, Gesture::Click { screen: DVec2::new(102.0, 101.0) });

        // Pan of (2, 1) still lands on the marker.
        assert_eq!(view.select_at(&markers, DVec2::new(102.0, 101.0)), Some(&EntityId::from("a")));
    }

    #[test]
    fn test_click_suppressed_after_pan() {
        let mut view = controller();
        let markers = [marker("a", 100.0, 100.0, 400.0)];
        view.pointer_down(DVec2::new(100.0, 100.0));
        view.pointer_move(DVec2::new(140.0, 100.0));
        assert!(view.select_at(&markers, DVec2::new(140.0, 100.0)).is_none());

        view.pointer_up(DVec2::new(140.0, 100.0));
        assert!(view.select_at(&markers, DVec2::new(140.0, 100.0)).is_none());
        assert!(view.selected().is_none());

        // Only the click right after the pan is swallowed.
        assert!(view.select_at(&markers, DVec2::new(140.0, 100.0)).is_some());
    }

    #[test]
    fn test_pointer_leave_cancels_drag() {
        let mut view = controller();
        view.pointer_down(DVec2::new(0.0, 0.0));
        view.pointer_move(DVec2::new(50.0, 0.0));
        view.pointer_leave();
        assert_eq!(view.interaction(), Interaction::Idle);
        assert_eq!(view.pointer_up(DVec2::new(60.0, 0.0)), Gesture::None);
        assert_eq!(view.state().offset, DVec2::new(50.0, 0.0));
    }

    #[test]
    fn test_hit_test_topmost() {
        let mut view = controller();
        view.zoom_at(DVec2::ZERO, 2.0);
        let markers = [marker("below", 50.0, 50.0, 60.0), marker("above", 60.0, 50.0, 60.0)];
        let hit = view.hit_test(&markers, DVec2::new(110.0, 100.0)).unwrap();
        assert_eq!(hit.id.as_str(), "above");
        assert!(view.hit_test(&markers, DVec2::new(700.0, 500.0)).is_none());

        assert_eq!(view.hover_at(&markers, DVec2::new(44.0, 100.0)), Some(&EntityId::from("below")));
        view.pointer_down(DVec2::new(40.0, 100.0));
        assert!(view.hover_at(&markers, DVec2::new(40.0, 100.0)).is_none());
    }

    #[test]
    fn test_fit_to_bounds() {
        let mut view = controller();
        let markers = [marker("a", -100.0, 0.0, 20.0), marker("b", 100.0, 200.0, 20.0)];
        view.fit_to_bounds(&markers, DVec2::new(1000.0, 500.0));

        // bbox 220 x 220; height limits: 500 / 220 * 0.9
        let expected = 500.0 / 220.0 * 0.9;
        assert!((view.state().scale - expected).abs() < 1e-9);
        let center = view.world_to_screen(DVec2::new(0.0, 100.0));
        assert!((center - DVec2::new(500.0, 250.0)).length() < 1e-9);
    }

    #[test]
    fn test_fit_with_explicit_margin() {
        let mut view = controller();
        let markers = [marker("a", 0.0, 0.0, 100.0)];
        view.fit_to_bounds_with_margin(&markers, DVec2::new(400.0, 400.0), 0.5);
        assert!((view.state().scale - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_empty_resets() {
        let mut view = controller();
        view.zoom_at(DVec2::new(5.0, 5.0), 3.0);
        view.pan(40.0, 40.0);
        view.fit_to_bounds(&[], DVec2::new(800.0, 600.0));
        assert_eq!(view.state().scale, view.config().default_scale);
        assert_eq!(view.state().offset, DVec2::ZERO);
    }

    #[test]
    fn test_set_config_reclamps_scale() {
        let mut view = controller();
        view.zoom_at(DVec2::new(400.0, 300.0), 4.0);
        view.set_config(ViewportConfig::default().with_scale_range(0.1, 2.0));
        assert_eq!(view.state().scale, 2.0);
    }

    #[test]
    fn test_viewport_size_sanitized() {
        let mut view = controller();
        view.set_viewport_size(DVec2::new(f64::NAN, -5.0));
        assert_eq!(view.state().viewport_size, DVec2::new(1.0, 1.0));
    }
}
