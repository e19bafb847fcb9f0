//! Voice filters (VoiceFilter0, VoiceFilter1).

use serde_json::Value;

use super::{base_child, base_object, check_index, plain_params, Module, ParamSet, PLAIN_PARAMS_KEY};
use crate::error::PresetResult;
use crate::param::ParamSpec;

/// Valid indices of the voice filters.
pub const FILTER_INDICES: &[u32] = &[0, 1];

static VOICE_FILTER_PARAMS: [ParamSpec; 10] = [
    ParamSpec::number("enable", 0, "kParamEnable", 0.0),
    ParamSpec::number("wet", 1, "kParamWet", 100.0),
    ParamSpec::number("cutoff", 3, "kParamFreq", 0.0),
    ParamSpec::number("resonance", 4, "kParamReso", 0.0),
    ParamSpec::number("drive", 5, "kParamDrive", 0.0),
    ParamSpec::number("var", 6, "kParamVar", 0.0),
    ParamSpec::number("pan", 7, "kParamStereo", 0.0),
    ParamSpec::number("level", 8, "kParamLevelOut", 1.0),
    ParamSpec::number("key_track", 9, "kParamKeyTrack", 0.0),
    ParamSpec::text("type", "kParamType", "kNone"),
];

/// A voice filter.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceFilter {
    params: ParamSet,
}

impl VoiceFilter {
    pub const MODULE_TYPE: &'static str = "VoiceFilter";

    /// Creates a filter at all defaults.
    ///
    /// Fails with [`PresetError::InvalidIndex`](crate::PresetError::InvalidIndex)
    /// unless `index` is 0 or 1.
    pub fn new(index: u32) -> PresetResult<Self> {
        check_index(Self::MODULE_TYPE, index, FILTER_INDICES)?;
        Ok(Self::at(index))
    }

    /// Builds a filter for an index already known to be valid.
    pub(crate) fn at(index: u32) -> Self {
        debug_assert!(FILTER_INDICES.contains(&index));
        Self {
            params: ParamSet::new(Self::MODULE_TYPE, index, &VOICE_FILTER_PARAMS),
        }
    }

    pub fn index(&self) -> u32 {
        self.params.index()
    }
}

impl Module for VoiceFilter {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PresetError;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_filter_index_two_is_rejected() {
        let err = VoiceFilter::new(2).unwrap_err();
        assert_eq!(err.code(), "P001");
        assert!(matches!(err, PresetError::InvalidIndex { index: 2, .. }));
    }

    #[test]
    fn test_filter_defaults() {
        let filter = VoiceFilter::new(1).unwrap();
        assert_eq!(filter.params().number("wet"), Some(100.0));
        assert_eq!(filter.params().number("level"), Some(1.0));
        assert_eq!(filter.params().text("type"), Some("kNone"));
        assert!(!filter.enabled());
        assert_eq!(filter.to_value(None), json!({"plainParams": "default"}));
    }

    #[test]
    fn test_filter_cutoff_routes_by_key() {
        let mut filter = VoiceFilter::new(0).unwrap();
        filter.params_mut().set("cutoff", 0.1).unwrap();
        let target = filter.params().get("cutoff").unwrap().target().unwrap();
        assert_eq!(target.module_type(), "VoiceFilter");
        assert_eq!(target.param_key(), "kParamFreq");
        assert_eq!(target.param_id(), 3);
    }

    #[test]
    fn test_filter_type_and_values() {
        let mut filter = VoiceFilter::new(0).unwrap();
        filter.params_mut().set("enable", 1.0).unwrap();
        filter.params_mut().set("type", "Combs").unwrap();
        filter.params_mut().set("cutoff", 0.1).unwrap();
        assert_eq!(
            filter.to_value(None),
            json!({"plainParams": {
                "kParamEnable": 1.0,
                "kParamFreq": 0.1,
                "kParamType": "Combs"
            }})
        );
    }
}
