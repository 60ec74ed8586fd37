//! Factory presets bundled with the ugenkit library.
//!
//! These presets are always available without external files. They cover
//! every unit category and serve as starting points for user presets.

use crate::Preset;

/// Array of factory preset names for external access.
pub static FACTORY_PRESET_NAMES: &[&str] = &[
    "init",
    "smooth-control",
    "warm-lowpass",
    "vocal-band",
    "small-room",
    "large-hall",
    "plate-stereo",
    "cathedral",
];

/// TOML content for factory presets.
///
/// These are embedded at compile time and always available.
static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("init", INIT_PRESET),
    ("smooth-control", SMOOTH_CONTROL_PRESET),
    ("warm-lowpass", WARM_LOWPASS_PRESET),
    ("vocal-band", VOCAL_BAND_PRESET),
    ("small-room", SMALL_ROOM_PRESET),
    ("large-hall", LARGE_HALL_PRESET),
    ("plate-stereo", PLATE_STEREO_PRESET),
    ("cathedral", CATHEDRAL_PRESET),
];

/// Initialization preset - a lowpass wide open.
const INIT_PRESET: &str = r#"
name = "Init"
description = "Lowpass at 20 kHz - effectively a clean signal path"
unit = "lpf"
sample_rate = 48000
block_size = 64

[params]
frequency = 20000.0
"#;

/// Smooth control - lag for stepped automation.
const SMOOTH_CONTROL_PRESET: &str = r#"
name = "Smooth Control"
description = "Exponential lag that turns stepped automation into 50 ms glides"
unit = "lag"
sample_rate = 48000
block_size = 1

[params]
lag_time = 0.05
"#;

/// Warm lowpass - gentle top-end rolloff.
const WARM_LOWPASS_PRESET: &str = r#"
name = "Warm Lowpass"
description = "Butterworth lowpass at 3.2 kHz for a darker tone"
unit = "lpf"
sample_rate = 48000
block_size = 64

[params]
frequency = 3200.0
"#;

/// Vocal band - isolates the presence region.
const VOCAL_BAND_PRESET: &str = r#"
name = "Vocal Band"
description = "Bandpass around 1.5 kHz, about an octave wide"
unit = "bpf"
sample_rate = 48000
block_size = 64

[params]
frequency = 1500.0
bandwidth = 0.7
"#;

/// Small room - short decay, prominent early reflections.
const SMALL_ROOM_PRESET: &str = r#"
name = "Small Room"
description = "Short, bright room with strong early reflections"
unit = "gverb"
sample_rate = 48000
block_size = 64

[options]
room_size = 12.0
max_room_size = 50.0

[params]
room_size = 12.0
decay_time = 1.2
damping = 0.3
input_bandwidth = 0.8
dry_level = 1.0
early_level = 0.9
tail_level = 0.4
"#;

/// Large hall - long, dark tail.
const LARGE_HALL_PRESET: &str = r#"
name = "Large Hall"
description = "Concert hall with a long, warm tail"
unit = "gverb"
sample_rate = 48000
block_size = 64

[options]
room_size = 60.0
decay_time = 4.0

[params]
room_size = 60.0
decay_time = 4.0
damping = 0.6
input_bandwidth = 0.6
dry_level = 0.8
early_level = 0.5
tail_level = 0.6
"#;

/// Plate stereo - dense comb/allpass in stereo.
const PLATE_STEREO_PRESET: &str = r#"
name = "Plate Stereo"
description = "Dense, bright stereo plate"
unit = "freeverb2"
sample_rate = 48000
block_size = 64

[params]
mix = 0.4
room = 0.7
damp = 0.2
"#;

/// Cathedral - huge space, tail dominant.
const CATHEDRAL_PRESET: &str = r#"
name = "Cathedral"
description = "Huge stone space with a very long, dark tail"
unit = "gverb"
sample_rate = 48000
block_size = 64

[options]
room_size = 200.0
decay_time = 12.0
damping = 0.7
spread = 30.0

[params]
room_size = 200.0
decay_time = 12.0
damping = 0.7
input_bandwidth = 0.4
dry_level = 0.6
early_level = 0.3
tail_level = 0.8
"#;

/// Get all factory presets.
///
/// Returns a vector of all built-in presets, parsed from embedded TOML.
pub fn factory_presets() -> Vec<Preset> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| Preset::from_toml(toml).ok())
        .collect()
}

/// Get a factory preset by name.
///
/// Matches the preset identifier (e.g., "small-room") or display name
/// (e.g., "Small Room"), case-insensitively.
pub fn get_factory_preset(name: &str) -> Option<Preset> {
    let name_lower = name.to_lowercase();

    FACTORY_PRESETS_TOML
        .iter()
        .find(|(id, _)| *id == name_lower)
        .and_then(|(_, toml)| Preset::from_toml(toml).ok())
        .or_else(|| {
            factory_presets()
                .into_iter()
                .find(|p| p.name.to_lowercase() == name_lower)
        })
}

/// Get the list of factory preset identifiers.
pub fn factory_preset_names() -> &'static [&'static str] {
    FACTORY_PRESET_NAMES
}

/// Check if a name refers to a factory preset.
pub fn is_factory_preset(name: &str) -> bool {
    get_factory_preset(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ugenkit_registry::UnitRegistry;

    #[test]
    fn test_factory_presets_load() {
        let presets = factory_presets();
        assert_eq!(presets.len(), FACTORY_PRESET_NAMES.len());

        let names: Vec<_> = presets.iter().map(|p| p.name.as_str()).collect();
        assert!(names.contains(&"Init"));
        assert!(names.contains(&"Small Room"));
        assert!(names.contains(&"Cathedral"));
    }

    #[test]
    fn test_get_factory_preset() {
        let preset = get_factory_preset("large-hall").expect("large-hall should exist");
        assert_eq!(preset.name, "Large Hall");

        let preset = get_factory_preset("Plate Stereo").expect("Plate Stereo should exist");
        assert_eq!(preset.unit, "freeverb2");

        let preset = get_factory_preset("VOCAL-BAND").expect("VOCAL-BAND should exist");
        assert_eq!(preset.name, "Vocal Band");

        assert!(get_factory_preset("nonexistent").is_none());
        assert!(is_factory_preset("cathedral"));
        assert!(!is_factory_preset("spring"));
    }

    #[test]
    fn test_names_match_table() {
        let ids: Vec<&str> = FACTORY_PRESETS_TOML.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, factory_preset_names());
    }

    #[test]
    fn test_all_factory_presets_valid() {
        let registry = UnitRegistry::new();
        for (name, toml) in FACTORY_PRESETS_TOML {
            let result = Preset::from_toml(toml);
            assert!(result.is_ok(), "factory preset '{}' should parse: {:?}", name, result);

            let preset = result.unwrap();
            assert!(preset.description.is_some(), "preset '{}' should have a description", name);
            assert!(
                preset.validate(&registry).is_ok(),
                "preset '{}' should validate: {:?}",
                name,
                preset.validate(&registry)
            );
        }
    }

    #[test]
    fn test_every_category_covered() {
        let units: Vec<String> = factory_presets().into_iter().map(|p| p.unit).collect();
        for unit in ["lag", "lpf", "bpf", "freeverb2", "gverb"] {
            assert!(units.iter().any(|u| u == unit), "no preset uses {unit}");
        }
    }
}
