//! Parameter (field) types.
//!
//! A parameter is one named, defaulted scalar inside a module. Its static
//! description ([`ParamSpec`]) is part of the module type; only the current
//! [`ParamValue`] lives in the module instance. Handles ([`Param`],
//! [`ParamMut`]) pair the two with the owning module's identity, which is
//! fixed when the handle is created.

use std::fmt;

use serde_json::Value;

use crate::error::{json_type_name, PresetError, PresetResult};
use crate::modulation::ModTarget;

/// The native type and default of a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    /// Float-valued and automatable; `id` is the module-local automation id.
    Number { id: u32, default: f64 },
    /// String-valued menu selection; never a modulation destination.
    Text { default: &'static str },
}

/// Static description of one parameter of a module type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSpec {
    /// Friendly name used in paths (e.g., "level").
    pub name: &'static str,
    /// Exact on-disk key inside `plainParams` (e.g., "kParamVolume").
    pub key: &'static str,
    /// Native type and default.
    pub kind: ParamKind,
}

impl ParamSpec {
    /// Declares a numeric parameter.
    pub const fn number(name: &'static str, id: u32, key: &'static str, default: f64) -> Self {
        Self {
            name,
            key,
            kind: ParamKind::Number { id, default },
        }
    }

    /// Declares a text parameter.
    pub const fn text(name: &'static str, key: &'static str, default: &'static str) -> Self {
        Self {
            name,
            key,
            kind: ParamKind::Text { default },
        }
    }

    /// Returns true for numeric parameters.
    pub fn is_numeric(&self) -> bool {
        matches!(self.kind, ParamKind::Number { .. })
    }

    /// Returns the automation id of a numeric parameter.
    pub fn numeric_id(&self) -> Option<u32> {
        match self.kind {
            ParamKind::Number { id, .. } => Some(id),
            ParamKind::Text { .. } => None,
        }
    }

    /// Returns the default value.
    pub fn default_value(&self) -> ParamValue {
        match self.kind {
            ParamKind::Number { default, .. } => ParamValue::Number(default),
            ParamKind::Text { default } => ParamValue::Text(default.to_string()),
        }
    }

    /// Coerces a JSON value to this parameter's native type.
    ///
    /// Numeric parameters accept numbers, booleans (as 1.0/0.0) and strings
    /// holding a finite number. Text parameters accept strings, numbers and
    /// booleans. Null, arrays and objects are rejected.
    pub fn coerce(&self, value: &Value) -> PresetResult<ParamValue> {
        let coerced = match self.kind {
            ParamKind::Number { .. } => as_number(value).map(ParamValue::Number),
            ParamKind::Text { .. } => match value {
                Value::String(s) => Some(ParamValue::Text(s.clone())),
                Value::Number(n) => Some(ParamValue::Text(n.to_string())),
                Value::Bool(b) => Some(ParamValue::Text(b.to_string())),
                _ => None,
            },
        };

        coerced.ok_or_else(|| PresetError::TypeCoercion {
            key: self.key.to_string(),
            expected: if self.is_numeric() { "number" } else { "text" },
            found: json_type_name(value),
        })
    }
}

/// Reads a JSON value as a float: numbers, booleans (1/0) and finite numeric
/// strings.
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Coerces a value stored under `key` to a float, failing like a numeric
/// parameter would.
pub(crate) fn coerce_number(key: &str, value: &Value) -> PresetResult<f64> {
    as_number(value).ok_or_else(|| PresetError::TypeCoercion {
        key: key.to_string(),
        expected: "number",
        found: json_type_name(value),
    })
}

/// Current value of a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl ParamValue {
    /// Returns the value as a float, if numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            ParamValue::Text(_) => None,
        }
    }

    /// Returns the value as a string slice, if text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Number(_) => None,
            ParamValue::Text(s) => Some(s),
        }
    }

    /// Converts to the on-disk JSON form.
    pub fn to_json(&self) -> Value {
        match self {
            ParamValue::Number(n) => Value::from(*n),
            ParamValue::Text(s) => Value::String(s.clone()),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(n) => write!(f, "{}", n),
            ParamValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Identity of a module instance: its type string and slot index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ModuleId {
    /// Module type as used for modulation routing (e.g., "Oscillator").
    pub module_type: &'static str,
    /// 0-based index among modules of the same type.
    pub index: u32,
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.module_type, self.index)
    }
}

/// Read-only handle to a parameter, bound to its owning module.
#[derive(Debug, Clone, Copy)]
pub struct Param<'a> {
    spec: &'static ParamSpec,
    value: &'a ParamValue,
    owner: ModuleId,
}

impl<'a> Param<'a> {
    pub(crate) fn new(spec: &'static ParamSpec, value: &'a ParamValue, owner: ModuleId) -> Self {
        Self { spec, value, owner }
    }

    pub fn spec(&self) -> &'static ParamSpec {
        self.spec
    }

    pub fn name(&self) -> &'static str {
        self.spec.name
    }

    pub fn key(&self) -> &'static str {
        self.spec.key
    }

    pub fn numeric_id(&self) -> Option<u32> {
        self.spec.numeric_id()
    }

    pub fn value(&self) -> &'a ParamValue {
        self.value
    }

    pub fn default_value(&self) -> ParamValue {
        self.spec.default_value()
    }

    /// Current value as a float; `None` for text parameters.
    pub fn number(&self) -> Option<f64> {
        self.value.as_f64()
    }

    /// Current value as text; `None` for numeric parameters.
    pub fn text(&self) -> Option<&'a str> {
        self.value.as_str()
    }

    pub fn is_default(&self) -> bool {
        *self.value == self.spec.default_value()
    }

    /// The module this handle was created from.
    pub fn owner(&self) -> ModuleId {
        self.owner
    }

    /// Resolves this parameter as a modulation destination.
    ///
    /// Fails with [`PresetError::InvalidDestination`] for text parameters.
    pub fn target(&self) -> PresetResult<ModTarget> {
        let id = self.spec.numeric_id().ok_or_else(|| {
            PresetError::invalid_destination(format!(
                "text parameter '{}' on {} cannot be modulated",
                self.spec.key, self.owner
            ))
        })?;
        Ok(ModTarget::new(
            self.owner.module_type,
            self.owner.index,
            self.spec.key,
            id,
        ))
    }
}

/// Mutable handle to a parameter, bound to its owning module.
#[derive(Debug)]
pub struct ParamMut<'a> {
    spec: &'static ParamSpec,
    value: &'a mut ParamValue,
    owner: ModuleId,
}

impl<'a> ParamMut<'a> {
    pub(crate) fn new(
        spec: &'static ParamSpec,
        value: &'a mut ParamValue,
        owner: ModuleId,
    ) -> Self {
        Self { spec, value, owner }
    }

    /// Reborrows as a read-only handle.
    pub fn as_param(&self) -> Param<'_> {
        Param::new(self.spec, self.value, self.owner)
    }

    pub fn key(&self) -> &'static str {
        self.spec.key
    }

    pub fn value(&self) -> &ParamValue {
        self.value
    }

    pub fn number(&self) -> Option<f64> {
        self.value.as_f64()
    }

    /// Assigns a new value, coercing it to the parameter's native type.
    ///
    /// On failure the current value is left unchanged.
    pub fn set(&mut self, value: impl Into<Value>) -> PresetResult<()> {
        *self.value = self.spec.coerce(&value.into())?;
        Ok(())
    }

    /// Restores the default value.
    pub fn reset(&mut self) {
        *self.value = self.spec.default_value();
    }

    pub fn target(&self) -> PresetResult<ModTarget> {
        self.as_param().target()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    static LEVEL: ParamSpec = ParamSpec::number("level", 1, "kParamVolume", 0.0);
    static SHAPE: ParamSpec = ParamSpec::text("shape", "kParamShape", "kSine");

    const OWNER: ModuleId = ModuleId {
        module_type: "Oscillator",
        index: 0,
    };

    #[test]
    fn test_number_coercion() {
        assert_eq!(LEVEL.coerce(&json!(0.8)).unwrap(), ParamValue::Number(0.8));
        assert_eq!(LEVEL.coerce(&json!(2)).unwrap(), ParamValue::Number(2.0));
        assert_eq!(LEVEL.coerce(&json!(true)).unwrap(), ParamValue::Number(1.0));
        assert_eq!(
            LEVEL.coerce(&json!(" 0.25 ")).unwrap(),
            ParamValue::Number(0.25)
        );
    }

    #[test]
    fn test_number_coercion_rejects() {
        for bad in [json!(null), json!([1.0]), json!({"v": 1}), json!("loud"), json!("NaN")] {
            let err = LEVEL.coerce(&bad).unwrap_err();
            assert!(matches!(err, PresetError::TypeCoercion { expected: "number", .. }));
        }
    }

    #[test]
    fn test_coerce_number_names_key() {
        assert_eq!(coerce_number("kParamAmount", &json!("50")).unwrap(), 50.0);
        let err = coerce_number("kParamAmount", &json!({"v": 1})).unwrap_err();
        assert!(matches!(
            err,
            PresetError::TypeCoercion { ref key, found: "object", .. } if key == "kParamAmount"
        ));
    }

    #[test]
    fn test_text_coercion() {
        assert_eq!(
            SHAPE.coerce(&json!("kSaw")).unwrap(),
            ParamValue::Text("kSaw".to_string())
        );
        assert_eq!(
            SHAPE.coerce(&json!(3)).unwrap(),
            ParamValue::Text("3".to_string())
        );
        assert!(SHAPE.coerce(&json!(["kSaw"])).is_err());
    }

    #[test]
    fn test_spec_accessors() {
        assert!(LEVEL.is_numeric());
        assert_eq!(LEVEL.numeric_id(), Some(1));
        assert_eq!(SHAPE.numeric_id(), None);
        assert_eq!(SHAPE.default_value(), ParamValue::Text("kSine".to_string()));
    }

    #[test]
    fn test_param_mut_set_keeps_value_on_error() {
        let mut value = LEVEL.default_value();
        let mut handle = ParamMut::new(&LEVEL, &mut value, OWNER);
        handle.set(0.5).unwrap();
        assert!(handle.set(json!([1])).is_err());
        assert_eq!(handle.number(), Some(0.5));
        handle.reset();
        assert!(handle.as_param().is_default());
    }

    #[test]
    fn test_param_target() {
        let value = ParamValue::Number(0.3);
        let target = Param::new(&LEVEL, &value, OWNER).target().unwrap();
        assert_eq!(target.module_type(), "Oscillator");
        assert_eq!(target.module_index(), 0);
        assert_eq!(target.param_key(), "kParamVolume");
        assert_eq!(target.param_id(), 1);

        let text = SHAPE.default_value();
        let err = Param::new(&SHAPE, &text, OWNER).target().unwrap_err();
        assert!(matches!(err, PresetError::InvalidDestination { .. }));
    }

    #[test]
    fn test_value_to_json_keeps_floats() {
        assert_eq!(ParamValue::Number(1.0).to_json().to_string(), "1.0");
        assert_eq!(ParamValue::Text("H18".into()).to_json(), json!("H18"));
    }
}
