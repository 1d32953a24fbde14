//! Weight to marker size mapping.

use stakemap_core::sanitize_weight;

use crate::params::SizingParams;

/// Maps an entity weight to a bounded marker diameter.
///
/// `size = clamp(base_size + growth * curve(weight), min_size, max_size)`.
/// The curve is sublinear so a single outlier cannot crowd out the rest of
/// the plane. Total over all `f64` inputs: negative and NaN weights are
/// treated as zero, `+inf` sizes like the largest finite weight.
#[derive(Debug, Clone, Default)]
pub struct EntitySizer {
    params: SizingParams,
}

impl EntitySizer {
    pub fn new(params: SizingParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SizingParams {
        &self.params
    }

    /// Marker diameter for a weight.
    pub fn size(&self, weight: f64) -> f64 {
        let p = &self.params;
        let raw = p.base_size + p.growth * p.curve.apply(sanitize_weight(weight));
        let raw = if raw.is_nan() { p.min_size } else { raw };
        // Not `f64::clamp`: an unvalidated inverted range must not panic.
        raw.max(p.min_size).min(p.max_size)
    }
}
