//! End-to-End Round-Trip Tests for serum-preset
//!
//! Tests verify:
//! - Edits survive save -> reload
//! - Unmodeled document content is written back unchanged
//! - Older, partial documents load with defaults
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p serum-preset-tests --test e2e_round_trip
//! ```

use pretty_assertions::assert_eq;
use serde_json::json;

use serum_preset::{canonical_document_hash, Module, Preset, PresetError};
use serum_preset_tests::harness::{assert_data_equal_except, read_document};
use serum_preset_tests::{PresetFixtures, TestHarness};

// ============================================================================
// New Presets
// ============================================================================

/// Setting one oscillator value on a fresh preset survives save and reload.
#[test]
fn test_new_preset_level_round_trip() {
    let harness = TestHarness::new();
    let template_enable = Preset::new()
        .unwrap()
        .param("Oscillator0.enable")
        .unwrap()
        .number();

    let mut preset = Preset::new().unwrap();
    preset.set("Oscillator0.level", 0.8).unwrap();
    let reloaded = harness.save_and_reload(&preset, "level.json");

    assert_eq!(
        reloaded.param("Oscillator0.level").unwrap().number(),
        Some(0.8)
    );
    assert_eq!(
        reloaded.param("Oscillator0.enable").unwrap().number(),
        template_enable
    );
    assert_eq!(reloaded.to_document(), preset.to_document());
}

/// A fresh preset writes every module block, all defaults compacted.
#[test]
fn test_new_preset_file_layout() {
    let harness = TestHarness::new();
    let path = harness.file("fresh.json");
    Preset::new().unwrap().save(&path).unwrap();

    let doc = read_document(&path);
    for i in 0..3 {
        let osc = &doc["data"][format!("Oscillator{}", i)];
        assert_eq!(osc["plainParams"], json!("default"));
        assert_eq!(osc[format!("WTOsc{}", i)]["numFrames"], json!(18432));
        for placeholder in ["GranularOsc", "MultiSampleOsc", "SampleOsc", "SpectralOsc"] {
            assert_eq!(
                osc[format!("{}{}", placeholder, i)],
                json!({"plainParams": "default"})
            );
        }
    }
    assert!(doc["data"]["Oscillator3"]["NoiseOsc3"]
        .get("relativePathToNoiseSample")
        .is_none());
    assert_eq!(doc["data"]["VoiceFilter1"], json!({"plainParams": "default"}));
    assert_eq!(doc["data"]["ModSlot63"], json!({"plainParams": "default"}));
}

/// Building a preset from a template file clears the template's routings.
#[test]
fn test_preset_from_template_file() {
    let harness = TestHarness::new();
    let template = harness.copy_in(&PresetFixtures::wobble_bass());

    let preset = Preset::from_template(&template).unwrap();
    assert_eq!(preset.name, "");
    assert_eq!(preset.mod_matrix.active_count(), 0);
    assert!(preset.oscillators[0].enabled());

    let saved = harness.file("from_template.json");
    preset.save(&saved).unwrap();
    let doc = read_document(&saved);
    assert_eq!(doc["metadata"]["presetName"], json!(""));
    assert_eq!(doc["data"]["ModSlot0"], json!({"plainParams": "default"}));
    assert_eq!(doc["editorState"]["lastTab"], json!("MATRIX"));
}

// ============================================================================
// Real Documents
// ============================================================================

/// The fixture loads into the typed view.
#[test]
fn test_load_wobble_bass() {
    let preset = Preset::load(PresetFixtures::wobble_bass()).unwrap();

    assert_eq!(preset.name, "Wobble Bass");
    assert_eq!(preset.author, "Studio");
    assert_eq!(preset.description, "LFO on the filter");

    let osc = &preset.oscillators[0];
    assert!(osc.enabled());
    assert_eq!(osc.params().number("level"), Some(0.75));
    assert_eq!(osc.params().number("octave"), Some(-1.0));
    assert_eq!(osc.params().number("unison"), Some(3.0));
    assert_eq!(osc.wt_osc.params().text("warp_mode"), Some("kSync"));
    assert_eq!(osc.wt_osc.wavetable.relative_path, "S2 Tables/Analog/Basic Saw.wav");
    assert_eq!(osc.wt_osc.wavetable.num_frames, 524288);

    let noise = &preset.noise.noise_osc.sample;
    assert_eq!(noise.relative_path, "S2 Noises/Analog/Vinyl.wav");
    assert_eq!((noise.num_channels, noise.sample_rate), (2, 48000));

    assert_eq!(preset.sub.sub_osc.params().text("shape"), Some("kSquare"));
    assert_eq!(preset.filters[0].params().text("type"), Some("L24"));
    assert!(!preset.filters[1].enabled());
    assert_eq!(preset.mod_matrix.active_count(), 2);
}

/// Loading and saving without edits reproduces the document.
#[test]
fn test_unedited_round_trip_is_identical() {
    let harness = TestHarness::new();
    let source = PresetFixtures::wobble_bass();
    let original = read_document(&source);

    let preset = Preset::load(&source).unwrap();
    let saved = harness.file("wobble_copy.json");
    preset.save(&saved).unwrap();
    let written = read_document(&saved);

    assert_eq!(written, original);
    assert_eq!(
        canonical_document_hash(&written),
        canonical_document_hash(&original)
    );
    assert_eq!(preset.document_hash(), canonical_document_hash(&original));
}

/// One edit changes one key; every other block is untouched.
#[test]
fn test_single_edit_touches_single_key() {
    let harness = TestHarness::new();
    let original = read_document(&PresetFixtures::wobble_bass());

    let mut preset = Preset::load(PresetFixtures::wobble_bass()).unwrap();
    preset.set("Oscillator0.level", 0.5).unwrap();
    let saved = harness.file("edited.json");
    preset.save(&saved).unwrap();
    let written = read_document(&saved);

    assert_data_equal_except(&written, &original, &["Oscillator0"]);
    assert_eq!(written["metadata"], original["metadata"]);
    assert_eq!(written["editorState"], original["editorState"]);

    let mut expected = original["data"]["Oscillator0"].clone();
    expected["plainParams"]["kParamVolume"] = json!(0.5);
    assert_eq!(written["data"]["Oscillator0"], expected);
}

/// Resetting every value of a module writes the sentinel again.
#[test]
fn test_reset_module_writes_sentinel() {
    let harness = TestHarness::new();
    let mut preset = Preset::load(PresetFixtures::wobble_bass()).unwrap();
    preset.sub.params_mut().reset();
    preset.sub.sub_osc.params_mut().reset();

    let path = harness.file("reset.json");
    preset.save(&path).unwrap();
    let doc = read_document(&path);
    assert_eq!(
        doc["data"]["Oscillator4"],
        json!({"SubOsc4": {"plainParams": "default"}, "plainParams": "default"})
    );
}

/// Unknown plainParams keys survive even when declared keys return to default.
#[test]
fn test_unknown_param_keys_survive_reset() {
    let mut preset = Preset::load(PresetFixtures::wobble_bass()).unwrap();
    preset.filters[0].params_mut().reset();

    let doc = preset.to_document();
    assert_eq!(
        doc["data"]["VoiceFilter0"]["plainParams"],
        json!({"kParamFutureMorph": 0.5})
    );
}

/// Clearing the noise sample path drops the key from the block.
#[test]
fn test_clearing_noise_sample_removes_key() {
    let mut preset = Preset::load(PresetFixtures::wobble_bass()).unwrap();
    preset.noise.noise_osc.sample.relative_path.clear();

    let doc = preset.to_document();
    let noise = doc["data"]["Oscillator3"]["NoiseOsc3"].as_object().unwrap();
    assert!(!noise.contains_key("relativePathToNoiseSample"));
    assert_eq!(noise["numChannels"], json!(2));
}

// ============================================================================
// Unmodeled and Partial Content
// ============================================================================

/// Unknown keys at every level pass through a save.
#[test]
fn test_unknown_keys_preserved_on_disk() {
    let harness = TestHarness::new();
    let original = PresetFixtures::with_unknown_keys();
    let path = harness.write_document("unknowns.json", &original);

    let mut preset = Preset::load(&path).unwrap();
    preset.set("Oscillator1.level", 0.3).unwrap();
    let reloaded_path = harness.file("unknowns_saved.json");
    preset.save(&reloaded_path).unwrap();
    let doc = read_document(&reloaded_path);

    assert_eq!(doc["pluginState"], original["pluginState"]);
    assert_eq!(doc["metadata"]["hash"], json!("c0ffee"));
    assert_eq!(doc["data"]["Arp0"], original["data"]["Arp0"]);
    assert_eq!(doc["data"]["clipData"], json!([1, 2, 3]));

    let osc = &doc["data"]["Oscillator1"];
    assert_eq!(
        osc["plainParams"],
        json!({"kParamEnable": 1.0, "kParamNewThing": 4.0, "kParamVolume": 0.3})
    );
    assert_eq!(osc["WTOsc1"]["wtExtra"], json!(true));
    assert_eq!(osc["WTOsc1"]["flex"], json!({"mode": 2}));
    assert_eq!(osc["SpectralOsc1"], json!({"plainParams": {"kParamFilter": 0.3}}));
    assert_eq!(osc["GranularOsc1"], json!({"plainParams": "default"}));
}

/// A partial document loads with defaults and coerces loose value types.
#[test]
fn test_legacy_document_loads_with_defaults() {
    let harness = TestHarness::new();
    let preset = Preset::load(PresetFixtures::legacy_data_only()).unwrap();

    assert_eq!(preset.name, "Old Pluck");
    assert_eq!(preset.author, "Archive");
    assert_eq!(preset.oscillators[0].params().number("level"), Some(0.5));
    assert!(preset.filters[1].enabled());
    assert_eq!(preset.filters[1].params().text("type"), Some("Combs"));
    assert!(!preset.oscillators[2].enabled());
    assert_eq!(preset.mod_matrix.active_count(), 1);

    let path = harness.file("legacy_saved.json");
    preset.save(&path).unwrap();
    let doc = read_document(&path);
    assert_eq!(doc["metadata"]["presetName"], json!("Old Pluck"));
    assert_eq!(doc["metadata"]["version"], json!(0.9));
    assert_eq!(
        doc["data"]["Oscillator0"]["plainParams"],
        json!({"kParamEnable": 1.0, "kParamVolume": 0.5})
    );
    assert_eq!(
        doc["data"]["VoiceFilter1"]["plainParams"]["kParamEnable"],
        json!(1.0)
    );
    assert!(doc["data"]["Oscillator2"]["WTOsc2"].is_object());
    assert_eq!(doc["data"]["ModSlot5"]["source"], json!([2, 0]));
}

/// Malformed and missing files fail with typed errors.
#[test]
fn test_bad_files_fail_cleanly() {
    let harness = TestHarness::new();

    let garbage = harness.file("garbage.json");
    std::fs::write(&garbage, "{\"data\": [").unwrap();
    let err = Preset::load(&garbage).unwrap_err();
    assert!(matches!(err, PresetError::MalformedDocument(_)));

    let err = Preset::load(harness.file("missing.json")).unwrap_err();
    assert!(matches!(err, PresetError::Io { .. }));

    let err = Preset::new()
        .unwrap()
        .save(harness.file("no_such_dir/out.json"))
        .unwrap_err();
    assert_eq!(err.code(), "P007");
}
