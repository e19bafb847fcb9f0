//! Fixture preset documents.

use std::path::PathBuf;

use serde_json::{json, Value};

/// Preset documents checked in under `fixtures/`.
pub struct PresetFixtures;

impl PresetFixtures {
    /// Get the path to the fixtures directory.
    pub fn dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures")
    }

    /// A fully populated preset with active routings, a custom wavetable,
    /// a noise sample and blocks the library does not model.
    pub fn wobble_bass() -> PathBuf {
        Self::dir().join("wobble_bass.json")
    }

    /// An older document that carries its name only in `data`, omits most
    /// module blocks and stores some values as strings and booleans.
    pub fn legacy_data_only() -> PathBuf {
        Self::dir().join("legacy_data_only.json")
    }

    /// A small document with unmodeled content at every nesting level.
    pub fn with_unknown_keys() -> Value {
        json!({
            "metadata": {
                "presetName": "Unknowns",
                "presetAuthor": "",
                "presetDescription": "",
                "hash": "c0ffee"
            },
            "data": {
                "Oscillator1": {
                    "plainParams": {"kParamEnable": 1.0, "kParamNewThing": 4.0},
                    "WTOsc1": {
                        "relativePathToWT": "S2 Tables/Digital/Vox.wav",
                        "numChannels": 1,
                        "numFrames": 2048,
                        "sampleRate": 44100,
                        "flex": {"mode": 2},
                        "wtExtra": true,
                        "plainParams": "default"
                    },
                    "SpectralOsc1": {"plainParams": {"kParamFilter": 0.3}}
                },
                "Arp0": {"plainParams": {"kParamRate": 0.25}},
                "clipData": [1, 2, 3]
            },
            "pluginState": {"window": [800, 600]}
        })
    }
}
