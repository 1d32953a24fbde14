use proptest::prelude::*;
use stakemap_core::{DVec2, PositionedEntity};
use stakemap_viewport::{entity_bounds, ViewportConfig, ViewportController};

fn controller() -> ViewportController {
    ViewportController::new(ViewportConfig::default(), DVec2::new(1024.0, 768.0))
}

fn point() -> impl Strategy<Value = DVec2> {
    (-2000.0f64..2000.0, -2000.0f64..2000.0).prop_map(|(x, y)| DVec2::new(x, y))
}

fn markers() -> impl Strategy<Value = Vec<PositionedEntity>> {
    prop::collection::vec((point(), 1.0f64..200.0), 1..20).prop_map(|items| {
        items
            .into_iter()
            .enumerate()
            .map(|(i, (position, size))| PositionedEntity {
                id: format!("m{i}").into(),
                weight: 1.0,
                size,
                position,
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn zoom_keeps_cursor_anchored(
        pan in point(),
        cursor in point(),
        factors in prop::collection::vec(0.1f64..10.0, 1..6),
    ) {
        let mut view = controller();
        view.pan(pan.x, pan.y);
        let world = view.screen_to_world(cursor);
        for factor in factors {
            view.zoom_at(cursor, factor);
            let config = view.config();
            prop_assert!(view.state().scale >= config.min_scale && view.state().scale <= config.max_scale);
            let drift = (view.world_to_screen(world) - cursor).length();
            prop_assert!(drift < 1e-6 * (1.0 + cursor.length()));
        }
    }

    #[test]
    fn pans_compose(a in point(), b in point()) {
        let mut stepwise = controller();
        stepwise.pan(a.x, a.y);
        stepwise.pan(b.x, b.y);

        let mut once = controller();
        once.pan(a.x + b.x, a.y + b.y);

        prop_assert!((stepwise.state().offset - once.state().offset).length() < 1e-9);
    }

    #[test]
    fn fit_shows_every_marker(entities in markers()) {
        let mut view = controller();
        let viewport = DVec2::new(1024.0, 768.0);
        view.fit_to_bounds(&entities, viewport);

        let visible = view.visible_world_rect();
        let bbox = match entity_bounds(&entities) {
            Some(bbox) => bbox,
            None => return Ok(()),
        };
        let config = view.config().clone();
        if view.state().scale < config.max_scale && view.state().scale > config.min_scale {
            prop_assert!(visible.contains_rect(&bbox, 1e-6));
            // Content fills the fit margin along one axis.
            let screen_size = bbox.size() * view.state().scale;
            let fill = (screen_size.x / viewport.x).max(screen_size.y / viewport.y);
            prop_assert!((fill - config.fit_margin).abs() < 1e-6);
        }
        let center = view.world_to_screen(bbox.center());
        prop_assert!((center - viewport / 2.0).length() < 1e-6);
    }
}
