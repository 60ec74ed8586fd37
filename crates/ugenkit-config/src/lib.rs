//! Configuration and preset management for ugenkit processors.
//!
//! This crate provides the preset layer for the ugenkit DSP units: loading
//! and saving presets as TOML, validating them against the unit registry,
//! and building ready-to-run units from them.
//!
//! # Features
//!
//! - **Preset System**: Load and save unit presets from TOML files
//! - **Validation**: Check unit identifiers, names and value ranges
//! - **Factory Presets**: Built-in presets for every unit category
//! - **Overrides**: Parse `key=value` assignments from command lines
//!
//! # Example
//!
//! ```rust,no_run
//! use ugenkit_config::{Preset, get_factory_preset};
//! use ugenkit_registry::UnitRegistry;
//!
//! let registry = UnitRegistry::new();
//!
//! // Load a preset from file
//! let preset = Preset::load("my_room.toml").unwrap();
//! preset.validate(&registry).unwrap();
//!
//! // Create a preset programmatically
//! let preset = Preset::new("Dark Hall", "gverb")
//!     .with_description("Long and dark")
//!     .with_option("room_size", 80.0)
//!     .with_param("decay_time", 6.0)
//!     .with_param("damping", 0.8);
//! preset.save("dark_hall.toml").unwrap();
//!
//! // Start from a factory preset
//! let hall = get_factory_preset("large-hall").unwrap();
//! let (unit, params) = hall.build(&registry, 44100).unwrap();
//! ```

mod error;
mod preset;

/// Preset validation.
pub mod validation;

/// Factory presets bundled with the library.
pub mod factory_presets;

pub use error::ConfigError;
pub use factory_presets::{
    FACTORY_PRESET_NAMES, factory_preset_names, factory_presets, get_factory_preset,
    is_factory_preset,
};
pub use preset::Preset;
pub use validation::{ValidationError, ValidationResult, parse_assignment, validate_preset};

/// Re-export commonly used types from ugenkit-registry
pub use ugenkit_registry::{ParamSpec, Unit, UnitCategory, UnitDescriptor, UnitRegistry};
