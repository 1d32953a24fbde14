//! Layout configuration.

use stakemap_core::{
    ensure_finite, ensure_non_negative, ensure_positive, ensure_range, ConfigError,
};

/// Sublinear growth curve mapping weight to marker growth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SizeCurve {
    /// `log2(max(weight, 1))`
    #[default]
    Log2,
    /// `sqrt(weight)`
    Sqrt,
}

impl SizeCurve {
    /// Evaluate the curve for a sanitized (finite, non-negative) weight.
    pub fn apply(self, weight: f64) -> f64 {
        match self {
            SizeCurve::Log2 => weight.max(1.0).log2(),
            SizeCurve::Sqrt => weight.sqrt(),
        }
    }
}

/// Marker sizing parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SizingParams {
    /// Smallest marker diameter
    pub min_size: f64,
    /// Largest marker diameter
    pub max_size: f64,
    /// Diameter before any weight-driven growth
    pub base_size: f64,
    /// Multiplier applied to the curve value
    pub growth: f64,
    pub curve: SizeCurve,
}

impl Default for SizingParams {
    fn default() -> Self {
        Self {
            min_size: 16.0,
            max_size: 160.0,
            base_size: 16.0,
            growth: 10.0,
            curve: SizeCurve::Log2,
        }
    }
}

impl SizingParams {
    pub fn with_range(mut self, min_size: f64, max_size: f64) -> Self {
        self.min_size = min_size;
        self.max_size = max_size;
        self
    }

    pub fn with_curve(mut self, curve: SizeCurve) -> Self {
        self.curve = curve;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_non_negative("min_size", self.min_size)?;
        ensure_positive("max_size", self.max_size)?;
        ensure_finite("base_size", self.base_size)?;
        ensure_non_negative("growth", self.growth)?;
        ensure_range("size", self.min_size, self.max_size)
    }
}

/// Order in which entities claim seed slots, center first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SeedOrder {
    /// Trust the caller's ordering
    #[default]
    AsGiven,
    /// Heaviest entity first; ties keep their input order
    WeightDescending,
}

/// Placement seeding parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SeedParams {
    /// Spiral step as a fraction of the average marker size
    pub spacing_factor: f64,
    pub order: SeedOrder,
}

impl Default for SeedParams {
    fn default() -> Self {
        Self {
            spacing_factor: 0.8,
            order: SeedOrder::AsGiven,
        }
    }
}

impl SeedParams {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("spacing_factor", self.spacing_factor)?;
        Ok(())
    }
}

/// Relaxation solver parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RelaxParams {
    /// Fixed number of iterations; there is no early exit
    pub iterations: usize,
    /// Per-iteration velocity decay, strictly between 0 and 1
    pub damping: f64,
    /// Repulsion constant (force = repulsion * (size_j + size_k) / d^2)
    pub repulsion: f64,
    /// Pull toward the bounds center per unit of distance
    pub centering: f64,
    /// Required separation as a multiple of the summed diameters
    pub margin_factor: f64,
    /// Upper bound on per-iteration displacement
    pub max_speed: f64,
    /// Overlap correction sweeps per iteration
    pub collision_passes: usize,
    /// Distance floor guarding the inverse-square law
    pub min_distance: f64,
    /// Entity count above which spatial bucketing is used
    pub grid_threshold: usize,
    /// Repulsion range when bucketing; defaults to four max marker sizes
    pub repulsion_cutoff: Option<f64>,
}

impl Default for RelaxParams {
    fn default() -> Self {
        Self {
            iterations: 120,
            damping: 0.4,
            repulsion: 400.0,
            centering: 0.02,
            margin_factor: 0.55,
            max_speed: 48.0,
            collision_passes: 2,
            min_distance: 0.01,
            grid_threshold: 256,
            repulsion_cutoff: None,
        }
    }
}

impl RelaxParams {
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_margin_factor(mut self, margin_factor: f64) -> Self {
        self.margin_factor = margin_factor;
        self
    }

    pub fn with_grid_threshold(mut self, grid_threshold: usize) -> Self {
        self.grid_threshold = grid_threshold;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_finite("damping", self.damping)?;
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(ConfigError::DampingOutOfRange {
                value: self.damping,
            });
        }
        ensure_non_negative("repulsion", self.repulsion)?;
        ensure_non_negative("centering", self.centering)?;
        ensure_non_negative("margin_factor", self.margin_factor)?;
        ensure_positive("max_speed", self.max_speed)?;
        ensure_positive("min_distance", self.min_distance)?;
        if let Some(cutoff) = self.repulsion_cutoff {
            ensure_positive("repulsion_cutoff", cutoff)?;
        }
        Ok(())
    }
}

/// Complete configuration for [`compute_layout`](crate::compute_layout).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutParams {
    pub sizing: SizingParams,
    pub seed: SeedParams,
    pub relax: RelaxParams,
    /// Highest marker coverage tolerated by automatic bounds
    pub max_density: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            sizing: SizingParams::default(),
            seed: SeedParams::default(),
            relax: RelaxParams::default(),
            max_density: 0.45,
        }
    }
}

impl LayoutParams {
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.relax.iterations = iterations;
        self
    }

    pub fn with_sizing(mut self, sizing: SizingParams) -> Self {
        self.sizing = sizing;
        self
    }

    pub fn with_seed_order(mut self, order: SeedOrder) -> Self {
        self.seed.order = order;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sizing.validate()?;
        self.seed.validate()?;
        self.relax.validate()?;
        ensure_positive("max_density", self.max_density)?;
        Ok(())
    }
}
