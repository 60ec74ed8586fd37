//! Unit registry and factory for ugenkit processors.
//!
//! This crate provides a centralized registry for discovering and
//! instantiating processors by identifier. Every descriptor carries the
//! construction options and per-call parameters of its unit, with defaults
//! and ranges, for building presets, command lines and user interfaces.
//!
//! # Features
//!
//! - **Unit Discovery**: List all available units with metadata
//! - **Factory Pattern**: Create units by identifier at runtime
//! - **Category System**: Units organized by type (control, filter, reverb)
//! - **Positional Parameters**: Drive any [`Unit`] with a `&[f64]`
//!
//! # Example
//!
//! ```rust
//! use ugenkit_core::Processor;
//! use ugenkit_registry::{UnitCategory, UnitRegistry};
//!
//! let registry = UnitRegistry::new();
//!
//! for unit in registry.all_units() {
//!     println!("{}: {}", unit.name, unit.description);
//! }
//!
//! let mut gverb = registry
//!     .create("gverb", 48000, 64, &[("room_size", 20.0)])
//!     .unwrap();
//! let params = registry.get("gverb").unwrap().default_params();
//! let input = [0.0f32; 64];
//! let mut output = [0.0f32; 64];
//! gverb.process_mono(&input, &mut output, &params).unwrap();
//!
//! for unit in registry.units_in_category(UnitCategory::Filter) {
//!     println!("Filter: {}", unit.id);
//! }
//! ```
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible. Disable the default `std` feature:
//!
//! ```toml
//! [dependencies]
//! ugenkit-registry = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

mod unit;

pub use unit::Unit;

use ugenkit_core::{BiquadFilter, ChannelLayout, ControlSmoother, Error, FilterResponse};
use ugenkit_effects::{FdnConfig, Reverb, ReverbKind};

/// Category of unit for organization and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitCategory {
    /// Control-signal smoothers (ramp, lag)
    Control,
    /// Second-order filters (lowpass, highpass, bandpass, bandreject)
    Filter,
    /// Reverberators (comb/allpass, feedback delay network)
    Reverb,
}

impl UnitCategory {
    /// All categories in listing order.
    pub const ALL: [Self; 3] = [Self::Control, Self::Filter, Self::Reverb];

    /// Returns a human-readable name for the category.
    pub const fn name(&self) -> &'static str {
        match self {
            UnitCategory::Control => "Control",
            UnitCategory::Filter => "Filter",
            UnitCategory::Reverb => "Reverb",
        }
    }

    /// Returns a description of the category.
    pub const fn description(&self) -> &'static str {
        match self {
            UnitCategory::Control => "Smoothers that turn stepped control values into glides",
            UnitCategory::Filter => "Lowpass, highpass, bandpass and bandreject biquads",
            UnitCategory::Reverb => "Comb/allpass and feedback delay network reverberators",
        }
    }
}

/// A named numeric argument with its default and accepted range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    /// Identifier (lowercase, underscores).
    pub name: &'static str,
    /// One-line description including the unit of measure.
    pub description: &'static str,
    /// Value used when none is given.
    pub default: f64,
    /// Smallest accepted value.
    pub min: f64,
    /// Largest accepted value.
    pub max: f64,
}

impl ParamSpec {
    const fn new(
        name: &'static str,
        description: &'static str,
        default: f64,
        min: f64,
        max: f64,
    ) -> Self {
        Self {
            name,
            description,
            default,
            min,
            max,
        }
    }

    /// Whether `value` is finite and inside `[min, max]`.
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && (self.min..=self.max).contains(&value)
    }
}

/// Describes a unit in the registry.
#[derive(Debug, Clone)]
pub struct UnitDescriptor {
    /// Unique identifier for the unit (lowercase, no spaces).
    pub id: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Brief description of the unit.
    pub description: &'static str,
    /// Category for organization.
    pub category: UnitCategory,
    /// Accepted channel counts.
    pub layout: ChannelLayout,
    /// Construction-time options, by name.
    pub options: &'static [ParamSpec],
    /// Per-call parameters, in positional order.
    pub params: &'static [ParamSpec],
}

impl UnitDescriptor {
    /// Position of the parameter called `name`.
    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }

    /// Position of the option called `name`.
    pub fn option_index(&self, name: &str) -> Option<usize> {
        self.options.iter().position(|p| p.name == name)
    }

    /// Default value of every parameter, in positional order.
    pub fn default_params(&self) -> Vec<f64> {
        self.params.iter().map(|p| p.default).collect()
    }
}

const GLIDE_TIME: &[ParamSpec] = &[ParamSpec::new(
    "glide_time",
    "Time to reach a new value, in seconds",
    0.1,
    0.0,
    60.0,
)];

const LAG_TIME: &[ParamSpec] = &[ParamSpec::new(
    "lag_time",
    "Time to cover 99.9% of a step, in seconds",
    0.1,
    0.0,
    60.0,
)];

const FREQUENCY: ParamSpec = ParamSpec::new("frequency", "Cutoff or centre, in Hz", 1000.0, 1.0, 48000.0);

const CUTOFF: &[ParamSpec] = &[FREQUENCY];

const BAND: &[ParamSpec] = &[
    FREQUENCY,
    ParamSpec::new("bandwidth", "Bandwidth as a fraction of the centre frequency", 1.0, 0.001, 10.0),
];

const COMB_ALLPASS: &[ParamSpec] = &[
    ParamSpec::new("mix", "Wet/dry balance, 0 = dry, 1 = wet", 0.33, 0.0, 1.0),
    ParamSpec::new("room", "Room size, sets comb feedback", 0.5, 0.0, 1.0),
    ParamSpec::new("damp", "High-frequency damping in the combs", 0.5, 0.0, 1.0),
];

const FDN_OPTIONS: &[ParamSpec] = &[
    ParamSpec::new("room_size", "Room size in metres; sets line lengths", 10.0, 1.0, 300.0),
    ParamSpec::new("decay_time", "Initial 60 dB decay time, in seconds", 3.0, 0.01, 100.0),
    ParamSpec::new("damping", "Initial feedback damping", 0.5, 0.0, 1.0),
    ParamSpec::new("spread", "Left/right diffuser detuning", 15.0, 0.0, 100.0),
    ParamSpec::new("max_room_size", "Largest room size in metres", 300.0, 3.0, 1000.0),
];

const FDN_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("room_size", "Room size in metres; moves the early reflections", 10.0, 1.0, 300.0),
    ParamSpec::new("decay_time", "60 dB decay time, in seconds", 3.0, 0.01, 100.0),
    ParamSpec::new("damping", "High-frequency damping in the feedback lines", 0.5, 0.0, 1.0),
    ParamSpec::new("input_bandwidth", "Input low-pass, 1 = unfiltered", 0.5, 0.0, 1.0),
    ParamSpec::new("dry_level", "Direct signal level", 1.0, 0.0, 1.0),
    ParamSpec::new("early_level", "Early reflection level", 0.7, 0.0, 1.0),
    ParamSpec::new("tail_level", "Late tail level", 0.5, 0.0, 1.0),
];

/// Factory function type: sample rate, block size, options in descriptor order.
type UnitFactory = fn(u32, usize, &[f64]) -> Result<Unit, Error>;

/// Internal entry in the registry.
struct RegistryEntry {
    descriptor: UnitDescriptor,
    factory: UnitFactory,
}

fn filter(response: FilterResponse, sample_rate: u32, block_size: usize) -> Result<Unit, Error> {
    BiquadFilter::new(response, sample_rate, block_size).map(Unit::from)
}

fn reverb(kind: ReverbKind, sample_rate: u32, config: FdnConfig) -> Result<Unit, Error> {
    Reverb::new(kind, sample_rate, config).map(Unit::from)
}

/// Registry of all available units.
///
/// The registry provides a centralized way to discover and instantiate
/// processors by identifier. All built-in units are registered on creation.
pub struct UnitRegistry {
    entries: Vec<RegistryEntry>,
}

impl Default for UnitRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl UnitRegistry {
    /// Create a new registry with all built-in units registered.
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::with_capacity(9),
        };
        registry.register_builtin_units();
        registry
    }

    /// Register all built-in units.
    fn register_builtin_units(&mut self) {
        // Control
        self.register(
            UnitDescriptor {
                id: "ramp",
                name: "Ramp",
                description: "Piecewise-linear glide toward each new control value",
                category: UnitCategory::Control,
                layout: ChannelLayout::Mono,
                options: &[],
                params: GLIDE_TIME,
            },
            |sr, block, _| ControlSmoother::from_id("ramp", sr, block).map(Unit::from),
        );
        self.register(
            UnitDescriptor {
                id: "lag",
                name: "Lag",
                description: "One-pole exponential approach with a 60 dB lag time",
                category: UnitCategory::Control,
                layout: ChannelLayout::Mono,
                options: &[],
                params: LAG_TIME,
            },
            |sr, block, _| ControlSmoother::from_id("lag", sr, block).map(Unit::from),
        );

        // Filters
        self.register(
            UnitDescriptor {
                id: "lpf",
                name: "Lowpass",
                description: "Second-order Butterworth lowpass",
                category: UnitCategory::Filter,
                layout: ChannelLayout::Mono,
                options: &[],
                params: CUTOFF,
            },
            |sr, block, _| filter(FilterResponse::LowPass, sr, block),
        );
        self.register(
            UnitDescriptor {
                id: "hpf",
                name: "Highpass",
                description: "Second-order Butterworth highpass",
                category: UnitCategory::Filter,
                layout: ChannelLayout::Mono,
                options: &[],
                params: CUTOFF,
            },
            |sr, block, _| filter(FilterResponse::HighPass, sr, block),
        );
        self.register(
            UnitDescriptor {
                id: "bpf",
                name: "Bandpass",
                description: "Second-order bandpass with unity gain at the centre",
                category: UnitCategory::Filter,
                layout: ChannelLayout::Mono,
                options: &[],
                params: BAND,
            },
            |sr, block, _| filter(FilterResponse::BandPass, sr, block),
        );
        self.register(
            UnitDescriptor {
                id: "brf",
                name: "Bandreject",
                description: "Second-order notch at the centre frequency",
                category: UnitCategory::Filter,
                layout: ChannelLayout::Mono,
                options: &[],
                params: BAND,
            },
            |sr, block, _| filter(FilterResponse::BandReject, sr, block),
        );

        // Reverbs
        self.register(
            UnitDescriptor {
                id: "freeverb",
                name: "FreeVerb",
                description: "Eight damped combs into four allpasses, mono",
                category: UnitCategory::Reverb,
                layout: ChannelLayout::Mono,
                options: &[],
                params: COMB_ALLPASS,
            },
            |sr, _, _| reverb(ReverbKind::FreeVerb, sr, FdnConfig::default()),
        );
        self.register(
            UnitDescriptor {
                id: "freeverb2",
                name: "FreeVerb2",
                description: "Eight damped combs into four allpasses, stereo",
                category: UnitCategory::Reverb,
                layout: ChannelLayout::Stereo,
                options: &[],
                params: COMB_ALLPASS,
            },
            |sr, _, _| reverb(ReverbKind::FreeVerb2, sr, FdnConfig::default()),
        );
        self.register(
            UnitDescriptor {
                id: "gverb",
                name: "GVerb",
                description: "Four-line feedback delay network with early reflections",
                category: UnitCategory::Reverb,
                layout: ChannelLayout::MonoOrStereo,
                options: FDN_OPTIONS,
                params: FDN_PARAMS,
            },
            |sr, _, o| {
                let config = FdnConfig {
                    room_size: o[0],
                    decay_time: o[1],
                    damping: o[2],
                    spread: o[3],
                    max_room_size: o[4],
                };
                reverb(ReverbKind::GVerb, sr, config)
            },
        );
    }

    /// Register a unit with its factory function.
    fn register(&mut self, descriptor: UnitDescriptor, factory: UnitFactory) {
        self.entries.push(RegistryEntry {
            descriptor,
            factory,
        });
    }

    /// Get all registered unit descriptors.
    pub fn all_units(&self) -> Vec<&UnitDescriptor> {
        self.entries.iter().map(|e| &e.descriptor).collect()
    }

    /// Get units in a specific category.
    pub fn units_in_category(&self, category: UnitCategory) -> Vec<&UnitDescriptor> {
        self.entries
            .iter()
            .filter(|e| e.descriptor.category == category)
            .map(|e| &e.descriptor)
            .collect()
    }

    /// Get a unit descriptor by identifier.
    pub fn get(&self, id: &str) -> Option<&UnitDescriptor> {
        self.entries
            .iter()
            .find(|e| e.descriptor.id == id)
            .map(|e| &e.descriptor)
    }

    /// Create a unit by identifier.
    ///
    /// `options` are `(name, value)` pairs; options not named keep their
    /// defaults.
    ///
    /// # Errors
    ///
    /// Configuration errors: [`Error::UnknownVariant`] for an unregistered
    /// identifier, [`Error::UnknownOption`] for an option the unit does not
    /// take, [`Error::InvalidConfig`] for a zero sample rate or block size or
    /// an option value outside its range.
    pub fn create(
        &self,
        id: &str,
        sample_rate: u32,
        block_size: usize,
        options: &[(&str, f64)],
    ) -> Result<Unit, Error> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.descriptor.id == id)
            .ok_or_else(|| Error::UnknownVariant(id.into()))?;
        if sample_rate == 0 {
            return Err(Error::invalid_config("sample_rate", "must be positive"));
        }
        if block_size == 0 {
            return Err(Error::invalid_config("block_size", "must be positive"));
        }

        let specs = entry.descriptor.options;
        let mut values: Vec<f64> = specs.iter().map(|s| s.default).collect();
        for &(name, value) in options {
            let index = entry
                .descriptor
                .option_index(name)
                .ok_or_else(|| Error::UnknownOption(name.into()))?;
            if !specs[index].contains(value) {
                return Err(Error::invalid_config(specs[index].name, "outside the accepted range"));
            }
            values[index] = value;
        }
        (entry.factory)(sample_rate, block_size, &values)
    }

    /// Returns the number of registered units.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no units are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ugenkit_core::{ErrorKind, Processor};

    #[test]
    fn test_registry_creation() {
        let registry = UnitRegistry::new();
        assert_eq!(registry.len(), 9);
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_get_unit() {
        let registry = UnitRegistry::new();

        let gverb = registry.get("gverb").unwrap();
        assert_eq!(gverb.name, "GVerb");
        assert_eq!(gverb.category, UnitCategory::Reverb);
        assert_eq!(gverb.layout, ChannelLayout::MonoOrStereo);
        assert_eq!(gverb.params.len(), 7);
        assert_eq!(gverb.options.len(), 5);
        assert_eq!(gverb.param_index("tail_level"), Some(6));

        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn test_units_by_category() {
        let registry = UnitRegistry::new();
        assert_eq!(registry.units_in_category(UnitCategory::Control).len(), 2);
        assert_eq!(registry.units_in_category(UnitCategory::Filter).len(), 4);
        assert_eq!(registry.units_in_category(UnitCategory::Reverb).len(), 3);
    }

    #[test]
    fn test_category_names() {
        assert_eq!(UnitCategory::Control.name(), "Control");
        assert_eq!(UnitCategory::Reverb.name(), "Reverb");
    }

    #[test]
    fn test_defaults_inside_ranges() {
        let registry = UnitRegistry::new();
        for unit in registry.all_units() {
            for spec in unit.options.iter().chain(unit.params) {
                assert!(spec.contains(spec.default), "{}.{}", unit.id, spec.name);
            }
        }
    }

    #[test]
    fn test_all_units_can_be_created() {
        let registry = UnitRegistry::new();

        for descriptor in registry.all_units() {
            let mut unit = registry.create(descriptor.id, 48000, 64, &[]).unwrap();
            assert_eq!(unit.id(), descriptor.id);
            assert_eq!(unit.param_count(), descriptor.params.len());
            assert_eq!(unit.layout(), descriptor.layout);

            let channels = descriptor.layout.max_channels();
            let input = [0.5f32; 64];
            let mut left = [0.0f32; 64];
            let mut right = [0.0f32; 64];
            let inputs: [&[f32]; 2] = [&input, &input];
            let result = if channels == 1 {
                unit.process(&inputs[..1], &mut [&mut left[..]], &descriptor.default_params())
            } else {
                unit.process(&inputs, &mut [&mut left[..], &mut right[..]], &descriptor.default_params())
            };
            result.unwrap();
            assert!(
                left.iter().all(|y| y.is_finite()),
                "Unit {} produced non-finite output",
                descriptor.id
            );
        }
    }

    #[test]
    fn test_create_errors() {
        let registry = UnitRegistry::new();

        let err = registry.create("plate", 48000, 64, &[]).unwrap_err();
        assert_eq!(err, Error::UnknownVariant("plate".into()));

        let err = registry.create("gverb", 48000, 64, &[("size", 1.0)]).unwrap_err();
        assert_eq!(err, Error::UnknownOption("size".into()));

        let err = registry.create("lpf", 0, 64, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err = registry.create("lag", 48000, 0, &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);

        let err = registry
            .create("gverb", 48000, 64, &[("decay_time", f64::NAN)])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { name: "decay_time", .. }));

        let err = registry
            .create("gverb", 48000, 64, &[("damping", 1.5)])
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { name: "damping", .. }));
    }

    #[test]
    fn test_options_reach_the_reverb() {
        let registry = UnitRegistry::new();
        let unit = registry
            .create("gverb", 48000, 64, &[("room_size", 20.0)])
            .unwrap();
        match unit {
            Unit::Reverb(Reverb::Fdn(fdn)) => {
                assert_eq!(fdn.config().room_size, 20.0);
                assert_eq!(fdn.config().max_room_size, 300.0);
            }
            other => panic!("unexpected unit {}", other.id()),
        }
    }
}
