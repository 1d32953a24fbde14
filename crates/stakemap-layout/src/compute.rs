//! Layout orchestration: sizing, seeding, relaxation.

use glam::DVec2;
use rustc_hash::{FxHashMap, FxHashSet};
use stakemap_core::{EntityId, LayoutBounds, PositionedEntity, WeightedEntity};
use tracing::{debug, warn};

use crate::params::{LayoutParams, SeedOrder};
use crate::placement::{PlacementSeeder, SeedInput};
use crate::relax::relax;
use crate::sizer::EntitySizer;

/// A computed layout together with the plane it was computed on.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Layout {
    pub bounds: LayoutBounds,
    pub entities: Vec<PositionedEntity>,
}

/// An input entity after sanitizing and sizing.
struct SizedEntity<'a> {
    id: &'a EntityId,
    weight: f64,
    size: f64,
}

/// Compute positions for `entities` on `bounds`.
///
/// Pure and idempotent: identical `(entities, bounds, params)` always yield
/// identical output. Output follows input order. An entity whose id already
/// appeared earlier in the list is dropped.
pub fn compute_layout<P>(
    entities: &[WeightedEntity<P>],
    bounds: LayoutBounds,
    params: &LayoutParams,
) -> Vec<PositionedEntity> {
    run_pipeline(entities, bounds, params, None)
}

/// Like [`compute_layout`], but entities present in `previous` start from
/// their prior position instead of a fresh spiral slot.
///
/// Keeps persistent markers visually stable across data updates. New
/// entities are seeded as usual.
pub fn compute_layout_from<P>(
    entities: &[WeightedEntity<P>],
    bounds: LayoutBounds,
    params: &LayoutParams,
    previous: &[PositionedEntity],
) -> Vec<PositionedEntity> {
    let previous: FxHashMap<&EntityId, DVec2> =
        previous.iter().map(|e| (&e.id, e.position)).collect();
    run_pipeline(entities, bounds, params, Some(&previous))
}

/// Compute a layout on bounds grown to keep marker coverage at or below
/// `params.max_density`, never smaller than `minimum`.
pub fn compute_auto_layout<P>(
    entities: &[WeightedEntity<P>],
    minimum: LayoutBounds,
    params: &LayoutParams,
) -> Layout {
    let bounds = auto_bounds(entities, minimum, params);
    Layout {
        bounds,
        entities: compute_layout(entities, bounds, params),
    }
}

/// Bounds that keep marker coverage at or below `params.max_density`.
///
/// Coverage counts each marker's footprint, its diameter widened by
/// `2 * margin_factor` to the spacing relaxation enforces.
pub fn auto_bounds<P>(
    entities: &[WeightedEntity<P>],
    minimum: LayoutBounds,
    params: &LayoutParams,
) -> LayoutBounds {
    let sizer = EntitySizer::new(params.sizing.clone());
    let spread = (2.0 * params.relax.margin_factor).max(1.0);
    let sizes: Vec<f64> = entities
        .iter()
        .map(|e| sizer.size(e.weight) * spread)
        .collect();
    LayoutBounds::for_sizes(&sizes, params.max_density, minimum)
}

fn run_pipeline<P>(
    entities: &[WeightedEntity<P>],
    bounds: LayoutBounds,
    params: &LayoutParams,
    previous: Option<&FxHashMap<&EntityId, DVec2>>,
) -> Vec<PositionedEntity> {
    let bounds = bounds.sanitized();
    let sized = size_entities(entities, &EntitySizer::new(params.sizing.clone()));
    if sized.is_empty() {
        return Vec::new();
    }

    let order = priority_order(&sized, params.seed.order);
    let inputs: Vec<SeedInput<'_>> = order
        .iter()
        .map(|&i| SeedInput {
            id: sized[i].id,
            size: sized[i].size,
        })
        .collect();

    let seeder = PlacementSeeder::new(params.seed.clone());
    let positions = match previous {
        Some(previous) => seeder.seed_with_previous(&inputs, bounds, previous),
        None => seeder.seed(&inputs, bounds),
    };

    let seeded: Vec<PositionedEntity> = order
        .iter()
        .zip(positions)
        .map(|(&i, position)| PositionedEntity {
            id: sized[i].id.clone(),
            weight: sized[i].weight,
            size: sized[i].size,
            position,
        })
        .collect();

    debug!(
        entities = seeded.len(),
        width = bounds.width,
        height = bounds.height,
        iterations = params.relax.iterations,
        grid = seeded.len() > params.relax.grid_threshold,
        warm_start = previous.is_some(),
        "computing layout"
    );

    let relaxed = relax(seeded, bounds, params.relax.iterations, &params.relax);

    // Back to input order.
    let mut out: Vec<Option<PositionedEntity>> = vec![None; sized.len()];
    for (&i, entity) in order.iter().zip(relaxed) {
        out[i] = Some(entity);
    }
    out.into_iter().flatten().collect()
}

fn size_entities<'a, P>(entities: &'a [WeightedEntity<P>], sizer: &EntitySizer) -> Vec<SizedEntity<'a>> {
    let mut seen: FxHashSet<&EntityId> = FxHashSet::default();
    let mut sized = Vec::with_capacity(entities.len());
    for e in entities {
        if !seen.insert(&e.id) {
            warn!(id = %e.id, "duplicate entity id dropped from layout");
            continue;
        }
        let weight = e.sanitized_weight();
        sized.push(SizedEntity {
            id: &e.id,
            weight,
            size: sizer.size(weight),
        });
    }
    sized
}

/// Indices into `sized`, highest seeding priority first.
fn priority_order(sized: &[SizedEntity<'_>], order: SeedOrder) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..sized.len()).collect();
    if order == SeedOrder::WeightDescending {
        // Stable sort keeps input order among equal weights.
        indices.sort_by(|&a, &b| sized[b].weight.total_cmp(&sized[a].weight));
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::relax::count_overlaps;

    fn weighted(weights: &[f64]) -> Vec<WeightedEntity> {
        weights
            .iter()
            .enumerate()
            .map(|(i, &w)| WeightedEntity::new(format!("0x{i:04x}"), w))
            .collect()
    }

    #[test]
    fn test_empty_input() {
        let entities: Vec<WeightedEntity> = Vec::new();
        assert!(compute_layout(&entities, LayoutBounds::default(), &LayoutParams::default()).is_empty());
    }

    #[test]
    fn test_three_entity_scenario() {
        let entities = weighted(&[1.0, 100.0, 10_000.0]);
        let bounds = LayoutBounds::new(1000.0, 1000.0);
        let params = LayoutParams::default().with_iterations(50);
        let out = compute_layout(&entities, bounds, &params);

        assert_eq!(out.len(), 3);
        assert!(out[0].size < out[1].size && out[1].size < out[2].size);
        assert_eq!(count_overlaps(&out, params.relax.margin_factor, 1e-6), 0);
        for e in &out {
            assert!(bounds.contains_marker(e.position, e.size, 1e-9));
        }
    }

    fn scattered(n: usize) -> Vec<WeightedEntity> {
        (0..n)
            .map(|i| WeightedEntity::new(format!("0x{i:04x}"), ((i * 7919) % 100_000) as f64))
            .collect()
    }

    fn assert_settled(layout: &Layout, params: &LayoutParams) {
        assert_eq!(count_overlaps(&layout.entities, params.relax.margin_factor, 1e-6), 0);
        for e in &layout.entities {
            assert!(layout.bounds.contains_marker(e.position, e.size, 1e-9), "{} escaped", e.id);
        }
    }

    #[test]
    fn test_auto_layout_hundreds_without_overlap() {
        let params = LayoutParams::default();
        let layout = compute_auto_layout(&scattered(150), LayoutBounds::default(), &params);
        assert_eq!(layout.entities.len(), 150);
        assert_settled(&layout, &params);
    }

    #[test]
    fn test_auto_layout_grid_path_without_overlap() {
        let mut params = LayoutParams::default();
        params.relax.grid_threshold = 64;
        for n in [300, 600] {
            let layout = compute_auto_layout(&scattered(n), LayoutBounds::default(), &params);
            assert_eq!(layout.entities.len(), n);
            assert_settled(&layout, &params);
        }
    }

    #[test]
    fn test_auto_bounds_counts_spacing() {
        let entities = scattered(200);
        let params = LayoutParams::default();
        let bounds = auto_bounds(&entities, LayoutBounds::new(1.0, 1.0), &params);
        let sizer = EntitySizer::new(params.sizing.clone());
        let footprint: f64 = entities
            .iter()
            .map(|e| {
                let r = sizer.size(e.weight) * params.relax.margin_factor;
                std::f64::consts::PI * r * r
            })
            .sum();
        assert!(footprint / bounds.area() <= params.max_density + 1e-9);
    }

    #[test]
    fn test_output_follows_input_order() {
        let entities = weighted(&[5.0, 500.0, 50.0, 5000.0]);
        let params = LayoutParams::default().with_seed_order(SeedOrder::WeightDescending);
        let out = compute_layout(&entities, LayoutBounds::default(), &params);
        let ids: Vec<_> = out.iter().map(|e| e.id.clone()).collect();
        let expected: Vec<_> = entities.iter().map(|e| e.id.clone()).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_priority_order() {
        let ids: Vec<EntityId> = (0..4).map(|i| EntityId(format!("{i}"))).collect();
        let sized: Vec<SizedEntity<'_>> = [3.0, 9.0, 3.0, 1.0]
            .iter()
            .zip(&ids)
            .map(|(&weight, id)| SizedEntity { id, weight, size: 10.0 })
            .collect();
        assert_eq!(priority_order(&sized, SeedOrder::AsGiven), vec![0, 1, 2, 3]);
        assert_eq!(priority_order(&sized, SeedOrder::WeightDescending), vec![1, 0, 2, 3]);
    }

    #[test]
    fn test_duplicates_and_bad_weights() {
        let entities = vec![
            WeightedEntity::new("a", f64::NAN),
            WeightedEntity::new("b", -4.0),
            WeightedEntity::new("a", 900.0),
        ];
        let out = compute_layout(&entities, LayoutBounds::default(), &LayoutParams::default());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].id, EntityId::from("a"));
        assert_eq!(out[0].weight, 0.0);
        assert_eq!(out[1].weight, 0.0);
        assert_eq!(out[0].size, out[1].size);
    }

    #[test]
    fn test_deterministic() {
        let entities = weighted(&[3.0, 1.0, 4.0, 1.0, 5.0, 9.0, 2.0, 6.0, 5.0, 3.0]);
        let params = LayoutParams::default();
        let a = compute_layout(&entities, LayoutBounds::default(), &params);
        let b = compute_layout(&entities, LayoutBounds::default(), &params);
        assert_eq!(a, b);
    }

    #[test]
    fn test_warm_start_keeps_stable_positions() {
        let params = LayoutParams::default().with_iterations(0);
        let bounds = LayoutBounds::new(800.0, 800.0);
        let first = compute_layout(&weighted(&[10.0, 20.0]), bounds, &params);

        // A lone newcomer far from the old markers leaves them untouched.
        let mut previous = first.clone();
        previous[0].position = DVec2::new(100.0, 100.0);
        previous[1].position = DVec2::new(700.0, 700.0);
        let next = compute_layout_from(&weighted(&[10.0, 20.0]), bounds, &params, &previous);
        assert_eq!(next[0].position, DVec2::new(100.0, 100.0));
        assert_eq!(next[1].position, DVec2::new(700.0, 700.0));
    }

    #[test]
    fn test_auto_layout_grows_bounds() {
        let entities = weighted(&vec![1_000_000.0; 120]);
        let minimum = LayoutBounds::new(200.0, 200.0);
        let params = LayoutParams::default().with_iterations(20);
        let layout = compute_auto_layout(&entities, minimum, &params);

        assert!(layout.bounds.width > minimum.width);
        assert_eq!(layout.entities.len(), 120);
        for e in &layout.entities {
            assert!(layout.bounds.contains_marker(e.position, e.size, 1e-9));
        }
    }
}
