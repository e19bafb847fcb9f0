//! Modules: named groups of parameters plus nested sub-modules.
//!
//! [`ParamSet`] carries the parameter table of one module instance and owns
//! the compaction rules shared by every module kind. Concrete module kinds
//! implement [`Module`] and add their own nested blocks and file metadata.

mod filter;
mod noise;
mod oscillator;
mod sub;

pub use filter::VoiceFilter;
pub use noise::{NoiseOsc, NoiseOscillator, NoiseSampleInfo};
pub use oscillator::{Oscillator, WavetableInfo, WtOsc};
pub use sub::{SubOsc, SubOscillator};

use serde_json::{Map, Value};

use crate::error::{PresetError, PresetResult};
use crate::param::{as_number, ModuleId, Param, ParamMut, ParamSpec, ParamValue};

/// Sentinel written in place of a parameter mapping when every parameter
/// is at its default.
pub const DEFAULT_SENTINEL: &str = "default";

/// Key of the parameter mapping inside every module block.
pub const PLAIN_PARAMS_KEY: &str = "plainParams";

/// Parameter values of one module instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSet {
    id: ModuleId,
    specs: &'static [ParamSpec],
    values: Vec<ParamValue>,
}

impl ParamSet {
    /// Creates a parameter set with every value at its default.
    pub fn new(module_type: &'static str, index: u32, specs: &'static [ParamSpec]) -> Self {
        debug_assert!(
            specs
                .iter()
                .enumerate()
                .all(|(i, s)| specs[..i].iter().all(|o| o.key != s.key && o.name != s.name)),
            "duplicate parameter in {} table",
            module_type
        );
        Self {
            id: ModuleId { module_type, index },
            specs,
            values: specs.iter().map(ParamSpec::default_value).collect(),
        }
    }

    pub fn id(&self) -> ModuleId {
        self.id
    }

    pub fn module_type(&self) -> &'static str {
        self.id.module_type
    }

    pub fn index(&self) -> u32 {
        self.id.index
    }

    /// Declared parameters, in declaration order.
    pub fn specs(&self) -> &'static [ParamSpec] {
        self.specs
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.specs.iter().position(|s| s.name == name)
    }

    /// Looks up a parameter by friendly name.
    pub fn get(&self, name: &str) -> Option<Param<'_>> {
        let i = self.position(name)?;
        Some(Param::new(&self.specs[i], &self.values[i], self.id))
    }

    /// Looks up a parameter by friendly name for mutation.
    pub fn get_mut(&mut self, name: &str) -> Option<ParamMut<'_>> {
        let i = self.position(name)?;
        Some(ParamMut::new(&self.specs[i], &mut self.values[i], self.id))
    }

    /// Looks up a parameter by its on-disk key.
    pub fn get_by_key(&self, key: &str) -> Option<Param<'_>> {
        let i = self.specs.iter().position(|s| s.key == key)?;
        Some(Param::new(&self.specs[i], &self.values[i], self.id))
    }

    /// Current value of a numeric parameter.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|p| p.number())
    }

    /// Current value of a text parameter.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|p| p.text())
    }

    /// Assigns a parameter by friendly name.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> PresetResult<()> {
        let id = self.id;
        let mut param = self
            .get_mut(name)
            .ok_or_else(|| PresetError::unknown_parameter(format!("{}.{}", id, name)))?;
        param.set(value)
    }

    pub fn iter(&self) -> impl Iterator<Item = Param<'_>> + '_ {
        self.specs
            .iter()
            .zip(&self.values)
            .map(move |(spec, value)| Param::new(spec, value, self.id))
    }

    /// Restores every parameter to its default.
    pub fn reset(&mut self) {
        for (value, spec) in self.values.iter_mut().zip(self.specs) {
            *value = spec.default_value();
        }
    }

    /// Returns true if every parameter is at its default.
    pub fn is_default(&self) -> bool {
        self.iter().all(|p| p.is_default())
    }

    /// Serializes the parameters to their compact on-disk form.
    ///
    /// Only parameters that differ from their default are emitted, in
    /// declaration order. An all-default set yields the `"default"`
    /// sentinel, never an empty mapping.
    pub fn compact(&self) -> Value {
        self.merge_plain_params(None)
    }

    /// Compacts the parameters on top of a previously loaded `plainParams`
    /// value.
    ///
    /// Keys in `base` that this module does not declare are kept in place.
    /// Declared keys are overwritten when the value differs from its
    /// default and removed otherwise.
    pub fn merge_plain_params(&self, base: Option<&Value>) -> Value {
        let mut map = base
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        map.retain(|key, _| {
            self.iter()
                .find(|p| p.key() == key.as_str())
                .map_or(true, |p| !p.is_default())
        });
        for param in self.iter().filter(|p| !p.is_default()) {
            map.insert(param.key().to_string(), param.value().to_json());
        }

        if map.is_empty() {
            Value::String(DEFAULT_SENTINEL.to_string())
        } else {
            Value::Object(map)
        }
    }

    /// Loads parameter values from a `plainParams` value.
    ///
    /// Every parameter is first reset to its default. The sentinel, a
    /// missing or non-object payload leaves all defaults in place; keys
    /// the module does not declare are ignored.
    pub fn expand(&mut self, payload: &Value) -> PresetResult<()> {
        self.reset();
        let Some(map) = payload.as_object() else {
            return Ok(());
        };
        for (spec, value) in self.specs.iter().zip(self.values.iter_mut()) {
            if let Some(raw) = map.get(spec.key) {
                *value = spec.coerce(raw)?;
            }
        }
        Ok(())
    }
}

/// A module kind that can be loaded from and saved to its document block.
pub trait Module {
    /// The module's own parameters.
    fn params(&self) -> &ParamSet;

    fn params_mut(&mut self) -> &mut ParamSet;

    /// A nested module, by friendly name or on-disk key.
    fn child(&self, name: &str) -> Option<&dyn Module> {
        let _ = name;
        None
    }

    fn child_mut(&mut self, name: &str) -> Option<&mut dyn Module> {
        let _ = name;
        None
    }

    /// Replaces the module's state with the content of its document block.
    ///
    /// Missing keys and nested blocks load as defaults.
    fn load(&mut self, block: &Value) -> PresetResult<()>;

    /// Serializes the module on top of its previously loaded block.
    ///
    /// Keys of `base` the module does not own are passed through.
    fn to_value(&self, base: Option<&Value>) -> Value;

    /// Returns true if the module's `enable` parameter is on.
    fn enabled(&self) -> bool {
        self.params().number("enable") == Some(1.0)
    }
}

/// Resolves a dotted parameter path (e.g., `"wt_osc.warp"`) inside a module.
pub fn resolve<'a>(module: &'a dyn Module, segments: &[&str]) -> Option<Param<'a>> {
    match segments {
        [name] => module.params().get(name),
        [child, rest @ ..] => resolve(module.child(child)?, rest),
        [] => None,
    }
}

/// Mutable counterpart of [`resolve`].
pub fn resolve_mut<'a>(module: &'a mut dyn Module, segments: &[&str]) -> Option<ParamMut<'a>> {
    match segments {
        [name] => module.params_mut().get_mut(name),
        [child, rest @ ..] => resolve_mut(module.child_mut(child)?, rest),
        [] => None,
    }
}

/// Returns the `plainParams` value of a block, or `Null` if absent.
pub(crate) fn plain_params(block: &Value) -> &Value {
    block.get(PLAIN_PARAMS_KEY).unwrap_or(&Value::Null)
}

/// Returns a copy of the base block's object, or an empty object.
pub(crate) fn base_object(base: Option<&Value>) -> Map<String, Value> {
    base.and_then(Value::as_object).cloned().unwrap_or_default()
}

/// A nested block of `base`, if present.
pub(crate) fn base_child<'a>(base: Option<&'a Value>, key: &str) -> Option<&'a Value> {
    base.and_then(|b| b.get(key))
}

/// Rejects indices outside a fixed-slot module's valid range.
pub(crate) fn check_index(
    module: &'static str,
    index: u32,
    valid: &'static [u32],
) -> PresetResult<()> {
    if valid.contains(&index) {
        Ok(())
    } else {
        Err(PresetError::InvalidIndex {
            module,
            index,
            valid,
        })
    }
}

/// Reads a JSON value as a `u32`, accepting integer-valued floats.
pub(crate) fn as_u32(value: &Value) -> Option<u32> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n).ok();
    }
    value
        .as_f64()
        .filter(|f| f.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(f))
        .map(|f| f as u32)
}

pub(crate) fn read_u32(block: &Value, key: &str, default: u32) -> u32 {
    block.get(key).and_then(as_u32).unwrap_or(default)
}

pub(crate) fn read_f64(block: &Value, key: &str, default: f64) -> f64 {
    block.get(key).and_then(as_number).unwrap_or(default)
}

pub(crate) fn read_string(block: &Value, key: &str, default: &str) -> String {
    block
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

/// Writes a metadata field back into its block.
///
/// `loaded` is what the existing entry read as. While `current` still equals
/// it, the entry is left exactly as it appeared on disk, whatever its JSON
/// shape. Edited or missing entries are written from `current`.
pub(crate) fn write_field<T>(map: &mut Map<String, Value>, key: &str, loaded: &T, current: &T)
where
    T: PartialEq + Clone + Into<Value>,
{
    if loaded == current && map.contains_key(key) {
        return;
    }
    map.insert(key.to_string(), current.clone().into());
}

/// The always-default block used for unmodeled oscillator modes.
pub(crate) fn default_block() -> Value {
    let mut map = Map::new();
    map.insert(
        PLAIN_PARAMS_KEY.to_string(),
        Value::String(DEFAULT_SENTINEL.to_string()),
    );
    Value::Object(map)
}
