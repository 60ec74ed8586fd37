//! Preset validation against the unit registry.
//!
//! Checks that a preset names a registered unit, that every option and
//! parameter name belongs to that unit, and that every value is finite and
//! inside the range its descriptor declares.
//!
//! # Example
//!
//! ```rust
//! use ugenkit_config::{Preset, validate_preset};
//! use ugenkit_registry::UnitRegistry;
//!
//! let registry = UnitRegistry::new();
//! let preset = Preset::new("Dark", "lpf").with_param("frequency", 400.0);
//! validate_preset(&preset, &registry).expect("preset should be valid");
//! ```

use thiserror::Error;
use ugenkit_registry::{ParamSpec, UnitRegistry};

use crate::Preset;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Unknown unit identifier.
    #[error("unknown unit: {0}")]
    UnknownUnit(String),

    /// Unknown per-call parameter name.
    #[error("unknown parameter '{param}' for unit '{unit}'")]
    UnknownParameter {
        /// Unit identifier.
        unit: String,
        /// Name of the unrecognized parameter.
        param: String,
    },

    /// Unknown construction option name.
    #[error("unknown option '{option}' for unit '{unit}'")]
    UnknownOption {
        /// Unit identifier.
        unit: String,
        /// Name of the unrecognized option.
        option: String,
    },

    /// Value not finite or outside the descriptor range.
    #[error("'{name}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the option or parameter.
        name: String,
        /// The rejected value.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// Sample rate or block size unusable.
    #[error("invalid {name}: {reason}")]
    InvalidSetting {
        /// Setting name.
        name: &'static str,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Malformed `key=value` assignment.
    #[error("invalid format for '{input}': {reason}")]
    InvalidFormat {
        /// The text that failed to parse.
        input: String,
        /// Description of the format error.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

fn check_range(spec: &ParamSpec, value: f64) -> ValidationResult<()> {
    if spec.contains(value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange {
            name: spec.name.to_string(),
            value,
            min: spec.min,
            max: spec.max,
        })
    }
}

/// Validate a preset's unit, settings, options and parameters.
///
/// Every problem is collected; a single problem is returned as itself,
/// several as [`ValidationError::Multiple`].
pub fn validate_preset(preset: &Preset, registry: &UnitRegistry) -> ValidationResult<()> {
    let descriptor = registry
        .get(&preset.unit)
        .ok_or_else(|| ValidationError::UnknownUnit(preset.unit.clone()))?;
    let mut errors = Vec::new();

    if preset.sample_rate == 0 {
        errors.push(ValidationError::InvalidSetting {
            name: "sample_rate",
            reason: "must be positive",
        });
    }
    if preset.block_size == 0 {
        errors.push(ValidationError::InvalidSetting {
            name: "block_size",
            reason: "must be positive",
        });
    }

    for (name, &value) in &preset.options {
        match descriptor.option_index(name) {
            Some(index) => {
                if let Err(e) = check_range(&descriptor.options[index], value) {
                    errors.push(e);
                }
            }
            None => errors.push(ValidationError::UnknownOption {
                unit: preset.unit.clone(),
                option: name.clone(),
            }),
        }
    }

    for (name, &value) in &preset.params {
        match descriptor.param_index(name) {
            Some(index) => {
                if let Err(e) = check_range(&descriptor.params[index], value) {
                    errors.push(e);
                }
            }
            None => errors.push(ValidationError::UnknownParameter {
                unit: preset.unit.clone(),
                param: name.clone(),
            }),
        }
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

/// Parse a `key=value` assignment with a numeric value.
///
/// # Example
///
/// ```rust
/// use ugenkit_config::parse_assignment;
///
/// assert_eq!(parse_assignment("decay_time=2.5").unwrap(), ("decay_time".to_string(), 2.5));
/// assert!(parse_assignment("decay_time").is_err());
/// ```
pub fn parse_assignment(input: &str) -> ValidationResult<(String, f64)> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        input: input.to_string(),
        reason: reason.to_string(),
    };
    let (key, value) = input
        .split_once('=')
        .ok_or_else(|| invalid("expected key=value"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(invalid("empty key"));
    }
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| invalid("value is not a number"))?;
    Ok((key.to_string(), value))
}
