//! Deterministic initial placement.
//!
//! Entities are placed on a sunflower (Vogel) spiral around the bounds
//! center: slot `k` sits at radius `spacing * sqrt(k)` and angle
//! `k * GOLDEN_ANGLE`. The spiral fills a disc at near-uniform density, so
//! the relaxation starts from a spread-out, asymmetric configuration with no
//! stacked points.

use glam::DVec2;
use rustc_hash::FxHashMap;
use stakemap_core::{EntityId, LayoutBounds};

use crate::params::SeedParams;

/// `pi * (3 - sqrt(5))`
pub const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

/// Spacing below which the spiral would collapse onto the center.
const MIN_SPACING: f64 = 1.0;

/// An entity ready for seeding, in priority order.
#[derive(Debug, Clone, Copy)]
pub struct SeedInput<'a> {
    pub id: &'a EntityId,
    pub size: f64,
}

/// Assigns initial positions without randomness.
#[derive(Debug, Clone, Default)]
pub struct PlacementSeeder {
    params: SeedParams,
}

impl PlacementSeeder {
    pub fn new(params: SeedParams) -> Self {
        Self { params }
    }

    /// Distance unit of the spiral for a set of marker sizes.
    pub fn spacing(&self, sizes: impl Iterator<Item = f64>) -> f64 {
        let (sum, count) = sizes.fold((0.0, 0usize), |(s, c), size| (s + size, c + 1));
        if count == 0 {
            return MIN_SPACING;
        }
        (sum / count as f64 * self.params.spacing_factor).max(MIN_SPACING)
    }

    /// Seed positions for entities already in priority order.
    ///
    /// The first entity lands on the bounds center; the rest follow the
    /// spiral outward. Every marker is clamped inside `bounds`.
    pub fn seed(&self, entities: &[SeedInput<'_>], bounds: LayoutBounds) -> Vec<DVec2> {
        let spacing = self.spacing(entities.iter().map(|e| e.size));
        let center = bounds.center();
        entities
            .iter()
            .enumerate()
            .map(|(slot, e)| bounds.clamp_marker(spiral_point(center, spacing, slot), e.size))
            .collect()
    }

    /// Seed positions, reusing prior positions for entities that have one.
    ///
    /// Entities without a prior position take the spiral slot matching
    /// their priority index, so the result stays deterministic.
    pub fn seed_with_previous(
        &self,
        entities: &[SeedInput<'_>],
        bounds: LayoutBounds,
        previous: &FxHashMap<&EntityId, DVec2>,
    ) -> Vec<DVec2> {
        let spacing = self.spacing(entities.iter().map(|e| e.size));
        let center = bounds.center();
        entities
            .iter()
            .enumerate()
            .map(|(slot, e)| {
                let p = previous
                    .get(e.id)
                    .copied()
                    .filter(|p| p.is_finite())
                    .unwrap_or_else(|| spiral_point(center, spacing, slot));
                bounds.clamp_marker(p, e.size)
            })
            .collect()
    }
}

/// Position of spiral slot `k`.
pub fn spiral_point(center: DVec2, spacing: f64, k: usize) -> DVec2 {
    let k = k as f64;
    let radius = spacing * k.sqrt();
    let angle = k * GOLDEN_ANGLE;
    center + DVec2::new(angle.cos(), angle.sin()) * radius
}
