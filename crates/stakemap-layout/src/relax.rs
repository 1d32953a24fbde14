//! Force-based overlap relaxation.
//!
//! Each iteration:
//! 1. Accumulate inverse-square repulsion between every pair of markers,
//!    scaled by the pair's summed sizes.
//! 2. Add a linear pull toward the bounds center for markers outside the
//!    core disc, the disc that holds every marker's footprint.
//! 3. `velocity = (velocity + force) * damping`, capped at `max_speed`, and
//!    integrate.
//! 4. Project overlapping pairs apart along their center line.
//! 5. Clamp every marker inside the bounds.
//!
//! The iteration count is fixed and there is no early exit, so the cost is
//! always `O(iterations * N^2)`. That quadratic term is the main scaling
//! limit; above `grid_threshold` entities a uniform grid restricts both
//! repulsion and collision checks to nearby pairs while keeping the same
//! force law. Results are deterministic: no randomness is used, and every
//! summation runs in a fixed order.
//!
//! Only phase 1 reads positions without writing them, so with the
//! `parallel` feature it runs on rayon. Each entity still sums its own
//! forces in the same order, so results match the sequential build bit for
//! bit.

use glam::DVec2;
use stakemap_core::{LayoutBounds, PositionedEntity};
use tracing::trace;

use crate::grid::SpatialGrid;
use crate::placement::GOLDEN_ANGLE;
use crate::params::RelaxParams;

/// Fewest sweeps the final overlap settle may take before giving up.
const MIN_SETTLE_SWEEPS: usize = 16;

/// Settle sweeps allowed per entity.
const SETTLE_SWEEPS_PER_ENTITY: usize = 4;

/// Packing fraction assumed when sizing the core disc.
const CORE_PACKING: f64 = 0.6;

/// Result of a cancellable run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelaxOutcome {
    /// All requested iterations ran
    Completed,
    /// The cancellation predicate fired between chunks
    Cancelled { completed: usize },
}

/// Iteration state of one relaxation.
///
/// A relaxation can be advanced in chunks. Callers that need to stay
/// responsive run a few iterations at a time and check a cancellation flag
/// in between.
#[derive(Debug, Clone)]
pub struct Relaxation {
    entities: Vec<PositionedEntity>,
    velocities: Vec<DVec2>,
    forces: Vec<DVec2>,
    bounds: LayoutBounds,
    params: RelaxParams,
    center: DVec2,
    /// Repulsion range when bucketing, `None` for all-pairs
    cutoff: Option<f64>,
    /// Largest required separation between any two markers
    max_separation: f64,
    /// Radius around the center inside which centering does not pull
    core_radius: f64,
    completed: usize,
}

impl Relaxation {
    /// Start a relaxation from seeded entities.
    pub fn new(seeded: Vec<PositionedEntity>, bounds: LayoutBounds, params: RelaxParams) -> Self {
        let bounds = bounds.sanitized();
        let mut entities = seeded;
        for e in &mut entities {
            if !e.position.is_finite() {
                e.position = bounds.center();
            }
            e.position = bounds.clamp_marker(e.position, e.size);
        }

        let max_size = entities.iter().map(|e| e.size).fold(0.0_f64, f64::max);
        let max_separation = 2.0 * max_size * params.margin_factor;
        let footprint: f64 = entities
            .iter()
            .map(|e| {
                let r = e.size * params.margin_factor;
                std::f64::consts::PI * r * r
            })
            .sum();
        let core_radius = (footprint / (std::f64::consts::PI * CORE_PACKING)).sqrt();
        let cutoff = (entities.len() > params.grid_threshold)
            .then(|| params.repulsion_cutoff.unwrap_or(4.0 * max_size).max(f64::EPSILON));

        let n = entities.len();
        Self {
            entities,
            velocities: vec![DVec2::ZERO; n],
            forces: vec![DVec2::ZERO; n],
            center: bounds.center(),
            bounds,
            params,
            cutoff,
            max_separation,
            core_radius,
            completed: 0,
        }
    }

    /// Number of iterations run so far.
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Whether spatial bucketing is active.
    pub fn uses_grid(&self) -> bool {
        self.cutoff.is_some()
    }

    /// Current (unsettled) positions.
    pub fn entities(&self) -> &[PositionedEntity] {
        &self.entities
    }

    /// Advance up to `iterations` iterations. Returns how many ran.
    pub fn run(&mut self, iterations: usize) -> usize {
        for _ in 0..iterations {
            self.step();
        }
        trace!(
            ran = iterations,
            completed = self.completed,
            "relaxation chunk"
        );
        iterations
    }

    /// Run `total` iterations in chunks of `chunk`, checking
    /// `is_cancelled` before each chunk.
    pub fn run_cancellable(
        &mut self,
        total: usize,
        chunk: usize,
        mut is_cancelled: impl FnMut() -> bool,
    ) -> RelaxOutcome {
        let chunk = chunk.max(1);
        let mut done = 0;
        while done < total {
            if is_cancelled() {
                return RelaxOutcome::Cancelled { completed: done };
            }
            done += self.run(chunk.min(total - done));
        }
        RelaxOutcome::Completed
    }

    /// One relaxation iteration.
    pub fn step(&mut self) {
        if self.entities.is_empty() {
            self.completed += 1;
            return;
        }

        self.accumulate_repulsion();

        let damping = self.params.damping;
        for i in 0..self.entities.len() {
            let e = &mut self.entities[i];
            let to_center = self.center - e.position;
            let distance = to_center.length();
            let pull = if distance > self.core_radius {
                to_center * (self.params.centering * (1.0 - self.core_radius / distance))
            } else {
                DVec2::ZERO
            };
            let force = self.forces[i] + pull;
            let v = ((self.velocities[i] + force) * damping).clamp_length_max(self.params.max_speed);
            self.velocities[i] = if v.is_finite() { v } else { DVec2::ZERO };
            e.position += self.velocities[i];
        }

        for _ in 0..self.params.collision_passes {
            self.resolve_overlaps();
        }
        self.clamp_to_bounds();
        self.completed += 1;
    }

    /// Settle remaining overlaps and return the final entities.
    ///
    /// Sweeps until one moves nothing, up to a cap that grows with the
    /// entity count.
    pub fn finish(mut self) -> Vec<PositionedEntity> {
        self.clamp_to_bounds();
        let max_sweeps = MIN_SETTLE_SWEEPS.max(SETTLE_SWEEPS_PER_ENTITY * self.entities.len());
        for _ in 0..max_sweeps {
            let moved = self.resolve_overlaps();
            self.clamp_to_bounds();
            if !moved {
                break;
            }
        }
        self.entities
    }

    fn accumulate_repulsion(&mut self) {
        let positions: Vec<DVec2> = self.entities.iter().map(|e| e.position).collect();
        let sizes: Vec<f64> = self.entities.iter().map(|e| e.size).collect();
        let grid = self
            .cutoff
            .map(|cutoff| SpatialGrid::build(&positions, self.bounds, cutoff));
        let ctx = RepulsionContext {
            positions: &positions,
            sizes: &sizes,
            grid: grid.as_ref(),
            cutoff: self.cutoff,
            repulsion: self.params.repulsion,
            min_distance: self.params.min_distance,
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            (0..positions.len())
                .into_par_iter()
                .map(|j| ctx.force_on(j))
                .collect_into_vec(&mut self.forces);
        }
        #[cfg(not(feature = "parallel"))]
        {
            self.forces.clear();
            self.forces.extend((0..positions.len()).map(|j| ctx.force_on(j)));
        }
    }

    /// One Gauss-Seidel sweep over overlapping pairs. Returns whether any
    /// pair was moved.
    fn resolve_overlaps(&mut self) -> bool {
        let n = self.entities.len();
        let margin = self.params.margin_factor;
        let min_distance = self.params.min_distance;
        let mut moved = false;

        let mut separate = |entities: &mut [PositionedEntity], j: usize, k: usize| {
            let required = (entities[j].size + entities[k].size) * margin;
            let delta = entities[j].position - entities[k].position;
            let distance = delta.length();
            // Tolerance keeps floating-point residue from counting as overlap.
            if distance + 1e-9 >= required {
                return;
            }
            let dir = if distance < min_distance {
                nudge_direction(j, k)
            } else {
                delta / distance
            };
            let push = dir * ((required - distance) / 2.0);
            entities[j].position += push;
            entities[k].position -= push;
            moved = true;
        };

        if self.cutoff.is_some() {
            let positions: Vec<DVec2> = self.entities.iter().map(|e| e.position).collect();
            let grid = SpatialGrid::build(&positions, self.bounds, self.max_separation);
            for j in 0..n {
                for k in grid.neighbors(positions[j]) {
                    if k > j {
                        separate(&mut self.entities, j, k);
                    }
                }
            }
        } else {
            for j in 0..n {
                for k in (j + 1)..n {
                    separate(&mut self.entities, j, k);
                }
            }
        }
        moved
    }

    fn clamp_to_bounds(&mut self) {
        for e in &mut self.entities {
            e.position = self.bounds.clamp_marker(e.position, e.size);
        }
    }
}

/// Read-only view of one iteration's positions for force accumulation.
struct RepulsionContext<'a> {
    positions: &'a [DVec2],
    sizes: &'a [f64],
    grid: Option<&'a SpatialGrid>,
    cutoff: Option<f64>,
    repulsion: f64,
    min_distance: f64,
}

impl RepulsionContext<'_> {
    fn force_on(&self, j: usize) -> DVec2 {
        match (self.grid, self.cutoff) {
            (Some(grid), Some(cutoff)) => grid
                .neighbors(self.positions[j])
                .filter(|&k| k != j)
                .filter(|&k| self.positions[j].distance_squared(self.positions[k]) <= cutoff * cutoff)
                .map(|k| self.pair_force(j, k))
                .fold(DVec2::ZERO, |acc, f| acc + f),
            _ => (0..self.positions.len())
                .filter(|&k| k != j)
                .map(|k| self.pair_force(j, k))
                .fold(DVec2::ZERO, |acc, f| acc + f),
        }
    }

    /// Force on `j` pushing it away from `k`.
    fn pair_force(&self, j: usize, k: usize) -> DVec2 {
        let delta = self.positions[j] - self.positions[k];
        let distance = delta.length();
        let (dir, distance) = if distance < self.min_distance {
            (nudge_direction(j, k), self.min_distance)
        } else {
            (delta / distance, distance)
        };
        dir * (self.repulsion * (self.sizes[j] + self.sizes[k]) / (distance * distance))
    }
}

/// Fixed unit direction separating coincident entities `j` and `k`.
///
/// Antisymmetric: `nudge_direction(j, k) == -nudge_direction(k, j)`.
fn nudge_direction(j: usize, k: usize) -> DVec2 {
    let (lo, hi) = if j < k { (j, k) } else { (k, j) };
    let angle = GOLDEN_ANGLE * (lo as f64 + 1.0) + 0.5 * hi as f64;
    let dir = DVec2::new(angle.cos(), angle.sin());
    if j == lo {
        dir
    } else {
        -dir
    }
}

/// Relax seeded entities for a fixed number of iterations.
pub fn relax(
    seeded: Vec<PositionedEntity>,
    bounds: LayoutBounds,
    iterations: usize,
    params: &RelaxParams,
) -> Vec<PositionedEntity> {
    let n = seeded.len();
    let mut relaxation = Relaxation::new(seeded, bounds, params.clone());
    let _span = tracing::debug_span!(
        "relax",
        entities = n,
        iterations,
        grid = relaxation.uses_grid()
    )
    .entered();
    relaxation.run(iterations);
    relaxation.finish()
}

/// Count pairs closer than the required separation minus `epsilon`.
pub fn count_overlaps(entities: &[PositionedEntity], margin_factor: f64, epsilon: f64) -> usize {
    let mut overlaps = 0;
    for (j, a) in entities.iter().enumerate() {
        for b in &entities[j + 1..] {
            let required = (a.size + b.size) * margin_factor;
            if a.position.distance(b.position) < required - epsilon {
                overlaps += 1;
            }
        }
    }
    overlaps
}
