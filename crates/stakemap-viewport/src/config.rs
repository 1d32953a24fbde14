//! Viewport configuration.

use stakemap_core::{ensure_non_negative, ensure_positive, ensure_range, ConfigError};

/// Limits and step sizes for pan/zoom interaction.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ViewportConfig {
    /// Smallest allowed scale
    pub min_scale: f64,
    /// Largest allowed scale
    pub max_scale: f64,
    /// Scale restored by `reset` and used for empty fits
    pub default_scale: f64,
    /// Multiplicative step of button-driven zoom
    pub zoom_step: f64,
    /// Fraction of the viewport a fitted layout may fill
    pub fit_margin: f64,
    /// Minimum world extent substituted for degenerate bounding boxes
    pub min_fit_extent: f64,
    /// Pointer travel in pixels beyond which a press becomes a pan
    pub click_threshold: f64,
    /// Wheel delta to zoom exponent conversion
    pub wheel_sensitivity: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.05,
            max_scale: 8.0,
            default_scale: 1.0,
            zoom_step: 1.25,
            fit_margin: 0.9,
            min_fit_extent: 1.0,
            click_threshold: 4.0,
            wheel_sensitivity: 0.0015,
        }
    }
}

impl ViewportConfig {
    pub fn with_scale_range(mut self, min_scale: f64, max_scale: f64) -> Self {
        self.min_scale = min_scale;
        self.max_scale = max_scale;
        self
    }

    pub fn with_fit_margin(mut self, fit_margin: f64) -> Self {
        self.fit_margin = fit_margin;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("min_scale", self.min_scale)?;
        ensure_positive("max_scale", self.max_scale)?;
        ensure_range("scale", self.min_scale, self.max_scale)?;
        ensure_positive("default_scale", self.default_scale)?;
        ensure_positive("zoom_step", self.zoom_step)?;
        if self.zoom_step <= 1.0 {
            return Err(ConfigError::ZoomStepTooSmall {
                value: self.zoom_step,
            });
        }
        ensure_positive("fit_margin", self.fit_margin)?;
        ensure_positive("min_fit_extent", self.min_fit_extent)?;
        ensure_non_negative("click_threshold", self.click_threshold)?;
        ensure_non_negative("wheel_sensitivity", self.wheel_sensitivity)?;
        Ok(())
    }

    /// Clamp a scale into `[min_scale, max_scale]`.
    pub fn clamp_scale(&self, scale: f64) -> f64 {
        // Not `f64::clamp`: an unvalidated inverted range must not panic.
        scale.max(self.min_scale).min(self.max_scale)
    }
}
