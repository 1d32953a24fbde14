//! Error types for the stakemap engine.
//!
//! Layout and viewport operations never fail on entity input; malformed
//! values are sanitized instead. Errors only arise from invalid
//! configuration handed in by a caller.

use thiserror::Error;

/// Errors from validating layout or viewport configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Parameter '{name}' must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("Parameter '{name}' must be positive, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    #[error("Parameter '{name}' must be non-negative, got {value}")]
    Negative { name: &'static str, value: f64 },

    #[error("Invalid range for '{name}': min {min} exceeds max {max}")]
    InvertedRange {
        name: &'static str,
        min: f64,
        max: f64,
    },

    #[error("Damping factor must lie in (0, 1), got {value}")]
    DampingOutOfRange { value: f64 },

    #[error("Zoom step must be greater than 1, got {value}")]
    ZoomStepTooSmall { value: f64 },
}

/// Check that a parameter is finite.
pub fn ensure_finite(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { name, value })
    }
}

/// Check that a parameter is finite and strictly positive.
pub fn ensure_positive(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    ensure_finite(name, value)?;
    if value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NotPositive { name, value })
    }
}

/// Check that a parameter is finite and not negative.
pub fn ensure_non_negative(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    ensure_finite(name, value)?;
    if value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::Negative { name, value })
    }
}

/// Check that `min <= max`.
pub fn ensure_range(name: &'static str, min: f64, max: f64) -> Result<(), ConfigError> {
    if min <= max {
        Ok(())
    } else {
        Err(ConfigError::InvertedRange { name, min, max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checks() {
        assert!(ensure_positive("x", 1.0).is_ok());
        assert_eq!(
            ensure_positive("x", 0.0),
            Err(ConfigError::NotPositive { name: "x", value: 0.0 })
        );
        assert!(matches!(
            ensure_non_negative("x", f64::NAN),
            Err(ConfigError::NonFinite { .. })
        ));
        assert!(ensure_range("size", 2.0, 1.0).is_err());
    }

    #[test]
    fn test_error_messages() {
        let err = ConfigError::DampingOutOfRange { value: 1.5 };
        assert_eq!(err.to_string(), "Damping factor must lie in (0, 1), got 1.5");
    }
}
