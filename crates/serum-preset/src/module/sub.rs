//! Sub oscillator (Oscillator4) and its SubOsc4 shape block.

use serde_json::Value;

use super::{base_child, base_object, plain_params, Module, ParamSet, PLAIN_PARAMS_KEY};
use crate::error::PresetResult;
use crate::param::ParamSpec;

/// Fixed slot of the sub oscillator.
pub const SUB_INDEX: u32 = 4;

static SUB_OSCILLATOR_PARAMS: [ParamSpec; 5] = [
    ParamSpec::number("enable", 0, "kParamEnable", 0.0),
    ParamSpec::number("level", 1, "kParamVolume", 0.0),
    ParamSpec::number("pan", 2, "kParamPan", 0.0),
    ParamSpec::number("octave", 3, "kParamOctave", 0.0),
    ParamSpec::number("coarse", 6, "kParamCoarsePit", 0.0),
];

static SUB_OSC_PARAMS: [ParamSpec; 2] = [
    ParamSpec::number("phase", 2, "kParamInitialPhase", 0.0),
    ParamSpec::text("shape", "kParamShape", "kSine"),
];

/// Sub waveform block (`SubOsc4`).
#[derive(Debug, Clone, PartialEq)]
pub struct SubOsc {
    params: ParamSet,
}

impl SubOsc {
    pub const MODULE_TYPE: &'static str = "SubOsc";
    pub const BLOCK_KEY: &'static str = "SubOsc4";

    pub fn new() -> Self {
        Self {
            params: ParamSet::new(Self::MODULE_TYPE, SUB_INDEX, &SUB_OSC_PARAMS),
        }
    }
}

impl Default for SubOsc {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for SubOsc {
    fn params(&self) -> &ParamSet {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }

    fn load(&mut self, block: &Value) -> PresetResult<()> {
        self.params.expand(plain_params(block))
    }

    fn to_value(&self, base: Option<&Value>) -> Value {
        let mut map = base_object(base);
        map.insert(
            PLAIN_PARAMS_KEY.to_string(),
            self.params
                .merge_plain_params(base_child(base, PLAIN_PARAMS_KEY)),
        );
        Value::Object(map)
    }
}

/// The sub oscillator (Oscillator4).
///
/// Routed as module type "Oscillator" with index 4.
#[derive(Debug, Clone, PartialEq)]
pub struct SubOscillator {
    params: ParamSet,
    pub sub_osc: SubOsc,
}

impl SubOscillator {
    pub const MODULE_TYPE: &'static str = "Oscillator";

    pub fn new() -> Self {
        Self {
            params: ParamSet::new(Self::MODULE_TYPE, SUB_INDEX, &SUB_OSCILLATOR_PARAMS),
            sub_osc: SubOsc::new(),
        }
    }

    pub fn index(&self) -> u32 {
        SUB_INDEX
    }
}

impl Default for SubOscillator {
    fn default() -> Self {
        Self::new()
    }
}

impl Module for SubOscillator {
    fn params(&self) -> &ParamSet {
        &self.params
    }

    fn params_mut(&mut self) -> &mut ParamSet {
        &mut self.params
    }

    fn child(&self, name: &str) -> Option<&dyn Module> {
        match name {
            "sub_osc" | SubOsc::BLOCK_KEY => Some(&self.sub_osc),
            _ => None,
        }
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut dyn Module> {
        match name {
            "sub_osc" | SubOsc::BLOCK_KEY => Some(&mut self.sub_osc),
            _ => None,
        }
    }

    fn load(&mut self, block: &Value) -> PresetResult<()> {
        self.params.expand(plain_params(block))?;
        self.sub_osc
            .load(block.get(SubOsc::BLOCK_KEY).unwrap_or(&Value::Null))
    }

    fn to_value(&self, base: Option<&Value>) -> Value {
        let mut map = base_object(base);
        map.insert(
            SubOsc::BLOCK_KEY.to_string(),
            self.sub_osc.to_value(base_child(base, SubOsc::BLOCK_KEY)),
        );
        map.insert(
            PLAIN_PARAMS_KEY.to_string(),
            self.params
                .merge_plain_params(base_child(base, PLAIN_PARAMS_KEY)),
        );
        Value::Object(map)
    }
}
