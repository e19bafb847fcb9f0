//! Noise oscillator (Oscillator3) and its NoiseOsc3 detail block.

use serde_json::Value;
use tracing::warn;

use super::{
    base_child, base_object, plain_params, read_f64, read_string, read_u32, write_field, Module,
    ParamSet, PLAIN_PARAMS_KEY,
};
use crate::error::PresetResult;
use crate::param::ParamSpec;

/// Fixed slot of the noise oscillator.
pub const NOISE_INDEX: u32 = 3;

static NOISE_OSCILLATOR_PARAMS: [ParamSpec; 3] = [
    ParamSpec::number("enable", 0, "kParamEnable", 0.0),
    ParamSpec::number("level", 1, "kParamVolume", 0.0),
    ParamSpec::number("pan", 2, "kParamPan", 0.0),
];

static NOISE_OSC_PARAMS: [ParamSpec; 5] = [
    ParamSpec::number("pitch", 0, "kParamColor", 0.0),
    ParamSpec::number("fine", 1, "kParamFine", 0.0),
    ParamSpec::number("start", 2, "kParamInitialPhase", 0.0),
    ParamSpec::number("rand", 3, "kParamRandomPhase", 0.0),
    ParamSpec::number("one_shot", 4, "kParamOneShot", 0.0),
];

const SAMPLE_PATH_KEY: &str = "relativePathToNoiseSample";

/// Noise sample reference stored next to the NoiseOsc parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseSampleInfo {
    /// Path relative to the Serum noises folder; empty when no sample is set.
    pub relative_path: String,
    /// Non-finite values are never written; the block keeps its previous
    /// factor (or 1.0) instead.
    pub detune_factor: f64,
    pub num_channels: u32,
    pub num_frames: u32,
    pub sample_rate: u32,
}

impl Default for NoiseSampleInfo {
    fn default() -> Self {
        Self {
            relative_path: String::new(),
            detune_factor: 1.0,
            num_channels: 1,
            num_frames: 0,
            sample_rate: 44100,
        }
    }
}

impl NoiseSampleInfo {
    fn from_block(block: &Value) -> Self {
        let default = Self::default();
        Self {
            relative_path: read_string(block, SAMPLE_PATH_KEY, ""),
            detune_factor: read_f64(block, "detuneFactor", default.detune_factor),
            num_channels: read_u32(block, "numChannels", default.num_channels),
            num_frames: read_u32(block, "numFrames", default.num_frames),
            sample_rate: read_u32(block, "sampleRate", default.sample_rate),
        }
    }
}

/// Noise detail block (`NoiseOsc3`).
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseOsc {
    params: ParamSet,
    pub sample: NoiseSampleInfo,
}

impl NoiseOsc {
    pub const MODULE_TYPE: &'static str = "NoiseOsc";
    pub const BLOCK_KEY: &'static str = "NoiseOsc3";

    pub fn new() -> Self {
        Self {
            params: ParamSet::new(Self::MODULE_TYPE, NOISE_INDEX, &NOISE_OSC_PARAMS),
            sample: NoiseSampleInfo::default(),
        }
    }
}

impl Default for NoiseOsc {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for NoiseOsc {
    fn params(&self) -> &ParamSet {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }

    fn load(&mut self, block: &Value) -> PresetResult<()> {
        self.params.expand(plain_params(block))?;
        self.sample = NoiseSampleInfo::from_block(block);
        Ok(())
    }

    fn to_value(&self, base: Option<&Value>) -> Value {
        let mut map = base_object(base);
        let sample = &self.sample;
        let loaded = NoiseSampleInfo::from_block(base.unwrap_or(&Value::Null));
        let detune = if sample.detune_factor.is_finite() {
            sample.detune_factor
        } else {
            warn!(
                detune_factor = %sample.detune_factor,
                "non-finite noise detune factor not written"
            );
            loaded.detune_factor
        };
        write_field(&mut map, "detuneFactor", &loaded.detune_factor, &detune);
        write_field(&mut map, "numChannels", &loaded.num_channels, &sample.num_channels);
        write_field(&mut map, "numFrames", &loaded.num_frames, &sample.num_frames);
        write_field(&mut map, "sampleRate", &loaded.sample_rate, &sample.sample_rate);
        map.insert(
            PLAIN_PARAMS_KEY.to_string(),
            self.params
                .merge_plain_params(base_child(base, PLAIN_PARAMS_KEY)),
        );
        if sample.relative_path.is_empty() {
            map.retain(|key, _| key != SAMPLE_PATH_KEY);
        } else {
            write_field(
                &mut map,
                SAMPLE_PATH_KEY,
                &loaded.relative_path,
                &sample.relative_path,
            );
        }
        Value::Object(map)
    }
}

/// The noise oscillator (Oscillator3).
///
/// Routed as module type "Oscillator" with index 3.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseOscillator {
    params: ParamSet,
    pub noise_osc: NoiseOsc,
}

impl NoiseOscillator {
    pub const MODULE_TYPE: &'static str = "Oscillator";

    pub fn new() -> Self {
        Self {
            params: ParamSet::new(Self::MODULE_TYPE, NOISE_INDEX, &NOISE_OSCILLATOR_PARAMS),
            noise_osc: NoiseOsc::new(),
        }
    }

    pub fn index(&self) -> u32 {
        NOISE_INDEX
    }
}

impl Default for NoiseOscillator {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for NoiseOscillator {
    fn params(&self) -> &ParamSet {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }

    fn child(&self, name: &str) -> Option<&dyn Module> {
        match name {
            "noise_osc" | NoiseOsc::BLOCK_KEY => Some(&self.noise_osc),
            _ => None,
        }
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut dyn Module> {
        match name {
            "noise_osc" | NoiseOsc::BLOCK_KEY => Some(&mut self.noise_osc),
            _ => None,
        }
    }

    fn load(&mut self, block: &Value) -> PresetResult<()> {
        self.params.expand(plain_params(block))?;
        self.noise_osc
            .load(block.get(NoiseOsc::BLOCK_KEY).unwrap_or(&Value::Null))
    }

    fn to_value(&self, base: Option<&Value>) -> Value {
        let mut map = base_object(base);
        map.insert(
            NoiseOsc::BLOCK_KEY.to_string(),
            self.noise_osc
                .to_value(base_child(base, NoiseOsc::BLOCK_KEY)),
        );
        map.insert(
            PLAIN_PARAMS_KEY.to_string(),
            self.params
                .merge_plain_params(base_child(base, PLAIN_PARAMS_KEY)),
        );
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_fresh_noise_value_omits_sample_path() {
        let noise = NoiseOscillator::new();
        assert_eq!(
            noise.to_value(None),
            json!({
                "NoiseOsc3": {
                    "detuneFactor": 1.0,
                    "numChannels": 1,
                    "numFrames": 0,
                    "sampleRate": 44100,
                    "plainParams": "default"
                },
                "plainParams": "default"
            })
        );
    }

    #[test]
    fn test_sample_path_present_only_when_set() {
        let mut noise = NoiseOscillator::new();
        noise.noise_osc.sample.relative_path = "S2 Noises/Analog/Hiss.wav".to_string();
        let value = noise.to_value(None);
        assert_eq!(
            value["NoiseOsc3"]["relativePathToNoiseSample"],
            json!("S2 Noises/Analog/Hiss.wav")
        );

        noise.noise_osc.sample.relative_path.clear();
        let cleared = noise.to_value(Some(&value));
        assert!(cleared["NoiseOsc3"]
            .get("relativePathToNoiseSample")
            .is_none());
    }

    #[test]
    fn test_load_noise_block() {
        let block = json!({
            "NoiseOsc3": {
                "relativePathToNoiseSample": "S2 Noises/Vinyl.wav",
                "detuneFactor": 0.5,
                "numChannels": 2,
                "numFrames": 96000,
                "sampleRate": 48000,
                "plainParams": {"kParamColor": 0.3, "kParamOneShot": 1.0}
            },
            "plainParams": {"kParamEnable": 1.0, "kParamVolume": 0.3}
        });
        let mut noise = NoiseOscillator::new();
        noise.load(&block).unwrap();

        assert!(noise.enabled());
        assert_eq!(noise.params().number("level"), Some(0.3));
        assert_eq!(noise.noise_osc.params().number("pitch"), Some(0.3));
        assert_eq!(noise.noise_osc.params().number("one_shot"), Some(1.0));
        assert_eq!(noise.noise_osc.sample.detune_factor, 0.5);
        assert_eq!(noise.to_value(Some(&block)), block);
    }

    #[test]
    fn test_noise_metadata_shapes_survive_save() {
        let block = json!({
            "NoiseOsc3": {
                "relativePathToNoiseSample": "S2 Noises/Vinyl.wav",
                "detuneFactor": "0.5",
                "numChannels": 2.0,
                "numFrames": 96000.0,
                "sampleRate": 48000.0,
                "plainParams": "default"
            },
            "plainParams": "default"
        });
        let mut noise = NoiseOscillator::new();
        noise.load(&block).unwrap();
        assert_eq!(noise.noise_osc.sample.detune_factor, 0.5);
        assert_eq!(noise.noise_osc.sample.num_frames, 96000);
        assert_eq!(noise.to_value(Some(&block)), block);

        noise.noise_osc.sample.sample_rate = 44100;
        let edited = noise.to_value(Some(&block));
        assert_eq!(edited["NoiseOsc3"]["sampleRate"], json!(44100));
        assert_eq!(edited["NoiseOsc3"]["detuneFactor"], json!("0.5"));
    }

    #[test]
    fn test_non_finite_detune_is_not_written() {
        let mut noise = NoiseOscillator::new();
        noise.noise_osc.sample.detune_factor = f64::NAN;
        let fresh = noise.to_value(None);
        assert_eq!(fresh["NoiseOsc3"]["detuneFactor"], json!(1.0));

        let base = json!({"NoiseOsc3": {"detuneFactor": 0.75, "plainParams": "default"}});
        noise.noise_osc.sample.detune_factor = f64::INFINITY;
        let saved = noise.to_value(Some(&base));
        assert_eq!(saved["NoiseOsc3"]["detuneFactor"], json!(0.75));
    }

    #[test]
    fn test_noise_routes_as_oscillator() {
        let noise = NoiseOscillator::new();
        let target = noise.params().get("level").unwrap().target().unwrap();
        assert_eq!(target.module_type(), "Oscillator");
        assert_eq!(target.module_index(), 3);
    }
}
