//! Wavetable oscillators (Oscillator0..2) and their WTOsc detail blocks.

use serde_json::Value;

use super::{
    base_child, base_object, check_index, default_block, plain_params, read_string, read_u32,
    write_field, Module, ParamSet, PLAIN_PARAMS_KEY,
};
use crate::error::PresetResult;
use crate::param::ParamSpec;

/// Valid indices of the wavetable oscillators.
pub const OSCILLATOR_INDICES: &[u32] = &[0, 1, 2];

/// Oscillator-mode blocks this crate does not model. They must exist next
/// to the WTOsc block even when unused.
const PLACEHOLDER_BLOCKS: [&str; 4] = ["GranularOsc", "MultiSampleOsc", "SampleOsc", "SpectralOsc"];

static OSCILLATOR_PARAMS: [ParamSpec; 10] = [
    ParamSpec::number("enable", 0, "kParamEnable", 0.0),
    ParamSpec::number("level", 1, "kParamVolume", 0.0),
    ParamSpec::number("pan", 2, "kParamPan", 0.0),
    ParamSpec::number("octave", 3, "kParamOctave", 0.0),
    ParamSpec::number("pitch", 4, "kParamPitch", 0.0),
    ParamSpec::number("fine", 5, "kParamFine", 0.0),
    ParamSpec::number("coarse", 6, "kParamCoarsePit", 0.0),
    ParamSpec::number("detune", 26, "kParamDetune", 0.0),
    ParamSpec::number("detune_width", 27, "kParamDetuneWid", 0.0),
    ParamSpec::number("unison", 28, "kParamUnison", 1.0),
];

static WT_OSC_PARAMS: [ParamSpec; 8] = [
    ParamSpec::number("warp", 0, "kParamWarp", 0.0),
    ParamSpec::text("warp_mode", "kParamWarpMenu", "kNone"),
    ParamSpec::number("warp2", 3, "kParamWarp2", 0.0),
    ParamSpec::text("warp2_mode", "kParamWarpMenu2", "kNone"),
    // TODO: confirm the automation id of kParamWarpVar2 against a routed preset.
    ParamSpec::number("warp2_var", 5, "kParamWarpVar2", 0.0),
    ParamSpec::number("wt_pos", 6, "kParamTablePos", 0.0),
    ParamSpec::number("phase", 8, "kParamInitialPhase", 0.0),
    ParamSpec::number("rand_phase", 9, "kParamRandomPhase", 0.0),
];

/// Wavetable file reference stored next to a WTOsc's parameters.
///
/// Counts also load from integer-valued floats. Entries that cannot be read
/// show the default here but are written back untouched unless edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavetableInfo {
    /// Path relative to the Serum tables folder.
    pub relative_path: String,
    pub num_channels: u32,
    pub num_frames: u32,
    pub sample_rate: u32,
}

impl Default for WavetableInfo {
    fn default() -> Self {
        Self {
            relative_path: "S2 Tables/Default Shapes.wav".to_string(),
            num_channels: 1,
            num_frames: 18432,
            sample_rate: 44100,
        }
    }
}

impl WavetableInfo {
    fn from_block(block: &Value) -> Self {
        let default = Self::default();
        Self {
            relative_path: read_string(block, "relativePathToWT", &default.relative_path),
            num_channels: read_u32(block, "numChannels", default.num_channels),
            num_frames: read_u32(block, "numFrames", default.num_frames),
            sample_rate: read_u32(block, "sampleRate", default.sample_rate),
        }
    }
}

/// Wavetable detail block (`WTOsc{n}`) of a wavetable oscillator.
#[derive(Debug, Clone, PartialEq)]
pub struct WtOsc {
    params: ParamSet,
    pub wavetable: WavetableInfo,
}

impl WtOsc {
    pub const MODULE_TYPE: &'static str = "WTOsc";

    pub fn new(index: u32) -> PresetResult<Self> {
        check_index(Self::MODULE_TYPE, index, OSCILLATOR_INDICES)?;
        Ok(Self::at(index))
    }

    fn at(index: u32) -> Self {
        Self {
            params: ParamSet::new(Self::MODULE_TYPE, index, &WT_OSC_PARAMS),
            wavetable: WavetableInfo::default(),
        }
    }

    /// On-disk key of this block inside its oscillator (e.g., "WTOsc0").
    pub fn block_key(&self) -> String {
        format!("{}{}", Self::MODULE_TYPE, self.params.index())
    }
}

impl Module for WtOsc {
    fn params(&self) -> &ParamSet {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }

    fn load(&mut self, block: &Value) -> PresetResult<()> {
        self.params.expand(plain_params(block))?;
        self.wavetable = WavetableInfo::from_block(block);
        Ok(())
    }

    fn to_value(&self, base: Option<&Value>) -> Value {
        let mut map = base_object(base);
        let info = &self.wavetable;
        let loaded = WavetableInfo::from_block(base.unwrap_or(&Value::Null));
        write_field(
            &mut map,
            "relativePathToWT",
            &loaded.relative_path,
            &info.relative_path,
        );
        write_field(&mut map, "numChannels", &loaded.num_channels, &info.num_channels);
        write_field(&mut map, "numFrames", &loaded.num_frames, &info.num_frames);
        write_field(&mut map, "sampleRate", &loaded.sample_rate, &info.sample_rate);
        map.entry("flex")
            .or_insert_with(|| Value::Object(Default::default()));
        map.insert(
            PLAIN_PARAMS_KEY.to_string(),
            self.params
                .merge_plain_params(base_child(base, PLAIN_PARAMS_KEY)),
        );
        Value::Object(map)
    }
}

/// A wavetable oscillator (Oscillator0, Oscillator1 or Oscillator2).
#[derive(Debug, Clone, PartialEq)]
pub struct Oscillator {
    params: ParamSet,
    pub wt_osc: WtOsc,
}

impl Oscillator {
    pub const MODULE_TYPE: &'static str = "Oscillator";

    /// Creates an oscillator at all defaults.
    ///
    /// Fails with [`PresetError::InvalidIndex`](crate::PresetError::InvalidIndex)
    /// unless `index` is 0, 1 or 2.
    pub fn new(index: u32) -> PresetResult<Self> {
        check_index(Self::MODULE_TYPE, index, OSCILLATOR_INDICES)?;
        Ok(Self::at(index))
    }

    /// Builds an oscillator for an index already known to be valid.
    pub(crate) fn at(index: u32) -> Self {
        debug_assert!(OSCILLATOR_INDICES.contains(&index));
        Self {
            params: ParamSet::new(Self::MODULE_TYPE, index, &OSCILLATOR_PARAMS),
            wt_osc: WtOsc::at(index),
        }
    }

    pub fn index(&self) -> u32 {
        self.params.index()
    }
}

impl Module for Oscillator {
    fn params(&self) -> &ParamSet {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }

    fn child(&self, name: &str) -> Option<&dyn Module> {
        if name == "wt_osc" || name == self.wt_osc.block_key() {
            Some(&self.wt_osc)
        } else {
            None
        }
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut dyn Module> {
        if name == "wt_osc" || name == self.wt_osc.block_key() {
            Some(&mut self.wt_osc)
        } else {
            None
        }
    }

    fn load(&mut self, block: &Value) -> PresetResult<()> {
        self.params.expand(plain_params(block))?;
        let wt_block = block
            .get(self.wt_osc.block_key())
            .unwrap_or(&Value::Null);
        self.wt_osc.load(wt_block)
    }

    fn to_value(&self, base: Option<&Value>) -> Value {
        let mut map = base_object(base);
        let index = self.index();
        for prefix in PLACEHOLDER_BLOCKS {
            map.entry(format!("{}{}", prefix, index))
                .or_insert_with(default_block);
        }
        let wt_key = self.wt_osc.block_key();
        let wt_value = self.wt_osc.to_value(base_child(base, &wt_key));
        map.insert(wt_key, wt_value);
        map.insert(
            PLAIN_PARAMS_KEY.to_string(),
            self.params
                .merge_plain_params(base_child(base, PLAIN_PARAMS_KEY)),
        );
        Value::Object(map)
    }
}
