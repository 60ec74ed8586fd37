//! Preset file format and operations.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};
use ugenkit_registry::{Unit, UnitDescriptor, UnitRegistry};

use crate::error::ConfigError;
use crate::validation::{ValidationError, validate_preset};

/// A unit with its construction options and per-call parameters.
///
/// Options and parameters not listed keep their registry defaults.
///
/// # TOML Format
///
/// ```toml
/// name = "Small Room"
/// description = "Short, bright early reflections"
/// unit = "gverb"
/// sample_rate = 48000
/// block_size = 64
///
/// [options]
/// room_size = 12.0
///
/// [params]
/// decay_time = 1.2
/// early_level = 0.9
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Preset {
    /// Name of the preset.
    pub name: String,

    /// Optional description of the preset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Registry identifier of the unit.
    pub unit: String,

    /// Sample rate hint (defaults to 48000).
    /// Input files override it at processing time.
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Control block size (defaults to 64).
    #[serde(default = "default_block_size")]
    pub block_size: usize,

    /// Construction-time options by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, f64>,

    /// Per-call parameters by name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, f64>,
}

fn default_sample_rate() -> u32 {
    48000
}

fn default_block_size() -> usize {
    64
}

impl Preset {
    /// Create a preset for `unit` with every value at its default.
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            unit: unit.into(),
            sample_rate: default_sample_rate(),
            block_size: default_block_size(),
            options: BTreeMap::new(),
            params: BTreeMap::new(),
        }
    }

    /// Create a preset with a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the sample rate hint.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Set the control block size.
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Set a construction option.
    pub fn with_option(mut self, name: impl Into<String>, value: f64) -> Self {
        self.options.insert(name.into(), value);
        self
    }

    /// Set a per-call parameter.
    pub fn with_param(mut self, name: impl Into<String>, value: f64) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    /// Load a preset from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let preset: Preset = toml::from_str(&content)?;
        debug!(path = %path.display(), name = %preset.name, "loaded preset");
        Ok(preset)
    }

    /// Load a preset from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the preset to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        info!(path = %path.display(), name = %self.name, "saved preset");
        Ok(())
    }

    /// Convert the preset to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check unit, option and parameter names and ranges against `registry`.
    pub fn validate(&self, registry: &UnitRegistry) -> Result<(), ValidationError> {
        validate_preset(self, registry)
    }

    /// Parameter values in the positional order of `descriptor`, with
    /// defaults for those not set.
    pub fn param_values(&self, descriptor: &UnitDescriptor) -> Vec<f64> {
        descriptor
            .params
            .iter()
            .map(|spec| self.params.get(spec.name).copied().unwrap_or(spec.default))
            .collect()
    }

    /// Validate, then build the unit at `sample_rate`.
    ///
    /// Returns the unit with its positional parameters.
    pub fn build(
        &self,
        registry: &UnitRegistry,
        sample_rate: u32,
    ) -> Result<(Unit, Vec<f64>), ConfigError> {
        self.validate(registry)?;
        let descriptor = registry
            .get(&self.unit)
            .ok_or_else(|| ValidationError::UnknownUnit(self.unit.clone()))?;
        let options: Vec<(&str, f64)> = self
            .options
            .iter()
            .map(|(name, &value)| (name.as_str(), value))
            .collect();
        let unit = registry.create(&self.unit, sample_rate, self.block_size, &options)?;
        debug!(unit = %self.unit, sample_rate, block_size = self.block_size, "built unit from preset");
        Ok((unit, self.param_values(descriptor)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ugenkit_core::Processor;

    #[test]
    fn test_preset_new() {
        let preset = Preset::new("Test Preset", "lpf");
        assert_eq!(preset.name, "Test Preset");
        assert_eq!(preset.unit, "lpf");
        assert!(preset.description.is_none());
        assert_eq!(preset.sample_rate, 48000);
        assert_eq!(preset.block_size, 64);
        assert!(preset.params.is_empty());
    }

    #[test]
    fn test_preset_builder() {
        let preset = Preset::new("My Preset", "gverb")
            .with_description("A test preset")
            .with_sample_rate(44100)
            .with_block_size(32)
            .with_option("room_size", 30.0)
            .with_param("decay_time", 5.0);

        assert_eq!(preset.description, Some("A test preset".to_string()));
        assert_eq!(preset.sample_rate, 44100);
        assert_eq!(preset.block_size, 32);
        assert_eq!(preset.options.get("room_size"), Some(&30.0));
        assert_eq!(preset.params.get("decay_time"), Some(&5.0));
    }

    #[test]
    fn test_toml_round_trip() {
        let preset = Preset::new("Round Trip", "bpf")
            .with_description("Roundtrip test")
            .with_param("frequency", 1200.0)
            .with_param("bandwidth", 0.5);

        let toml_str = preset.to_toml().unwrap();
        assert!(toml_str.contains("[params]"));
        assert!(!toml_str.contains("[options]"));
        assert_eq!(Preset::from_toml(&toml_str).unwrap(), preset);
    }

    #[test]
    fn test_defaults_from_minimal_toml() {
        let preset = Preset::from_toml("name = \"Bare\"\nunit = \"lag\"\n").unwrap();
        assert_eq!(preset.sample_rate, 48000);
        assert_eq!(preset.block_size, 64);
        assert!(preset.options.is_empty());
    }

    #[test]
    fn test_missing_unit_is_parse_error() {
        assert!(matches!(
            Preset::from_toml("name = \"No Unit\"\n"),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_param_values_fill_defaults() {
        let registry = UnitRegistry::new();
        let descriptor = registry.get("freeverb").unwrap();
        let preset = Preset::new("Wet", "freeverb").with_param("mix", 0.9);
        assert_eq!(preset.param_values(descriptor), vec![0.9, 0.5, 0.5]);
    }

    #[test]
    fn test_build_creates_working_unit() {
        let registry = UnitRegistry::new();
        let preset = Preset::new("Hall", "gverb")
            .with_option("room_size", 50.0)
            .with_param("dry_level", 0.0);
        let (mut unit, params) = preset.build(&registry, 44100).unwrap();
        assert_eq!(params.len(), 7);
        assert_eq!(params[4], 0.0);

        let mut impulse = [0.0f32; 256];
        impulse[0] = 1.0;
        let mut out = [0.0f32; 256];
        unit.process_mono(&impulse, &mut out, &params).unwrap();
        assert!(out.iter().all(|y| y.is_finite()));
        assert!(out.iter().any(|&y| y != 0.0));
    }

    #[test]
    fn test_build_rejects_invalid_preset() {
        let registry = UnitRegistry::new();
        let preset = Preset::new("Bad", "lpf").with_param("frequency", -5.0);
        assert!(matches!(
            preset.build(&registry, 48000),
            Err(ConfigError::Validation(ValidationError::OutOfRange { .. }))
        ));
    }
}
