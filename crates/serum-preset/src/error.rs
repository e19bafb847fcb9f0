//! Error types for preset loading, editing and saving.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for preset operations.
pub type PresetResult<T> = Result<T, PresetError>;

/// Top-level error type for preset operations.
///
/// Missing or unknown document keys are not errors: loading recovers them
/// by falling back to defaults. Only the cases below are surfaced.
#[derive(Debug, Error)]
pub enum PresetError {
    /// A fixed-slot module was constructed with an index outside its range.
    #[error("invalid {module} index {index}, expected one of {valid:?}")]
    InvalidIndex {
        /// Module kind being constructed.
        module: &'static str,
        /// The rejected index.
        index: u32,
        /// Indices this module kind accepts.
        valid: &'static [u32],
    },

    /// A value could not be coerced to the parameter's native type.
    #[error("cannot assign {found} to {expected} parameter '{key}'")]
    TypeCoercion {
        /// On-disk key of the parameter.
        key: String,
        /// Native type of the parameter ("number" or "text").
        expected: &'static str,
        /// JSON type of the rejected value.
        found: &'static str,
    },

    /// A modulation destination is not a numeric, bound parameter.
    #[error("invalid modulation destination: {reason}")]
    InvalidDestination {
        /// Why the destination was rejected.
        reason: String,
    },

    /// A modulation source is the empty (0, 0) source.
    #[error("invalid modulation source {mod_source}")]
    InvalidSource {
        /// The rejected source.
        mod_source: crate::modulation::ModSource,
    },

    /// A modulation source name did not match any known source.
    #[error("unknown modulation source '{name}'")]
    UnknownSource {
        /// The name as given by the caller.
        name: String,
    },

    /// Every modulation slot is already in use.
    #[error("no free modulation slots available (max {capacity})")]
    NoFreeSlot {
        /// Total slot count of the matrix.
        capacity: usize,
    },

    /// The document is not valid JSON, or its root is not an object.
    #[error("malformed preset document: {0}")]
    MalformedDocument(#[from] serde_json::Error),

    /// A parameter path did not resolve to a declared parameter.
    #[error("unknown parameter path '{path}'")]
    UnknownParameter {
        /// The path as given by the caller.
        path: String,
    },

    /// Reading or writing a preset file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File being read or written.
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PresetError {
    /// Returns a stable short code for programmatic matching (e.g., "P001").
    pub fn code(&self) -> &'static str {
        match self {
            PresetError::InvalidIndex { .. } => "P001",
            PresetError::TypeCoercion { .. } => "P002",
            PresetError::InvalidDestination { .. } => "P003",
            PresetError::NoFreeSlot { .. } => "P004",
            PresetError::MalformedDocument(_) => "P005",
            PresetError::UnknownParameter { .. } => "P006",
            PresetError::Io { .. } => "P007",
            PresetError::InvalidSource { .. } => "P008",
            PresetError::UnknownSource { .. } => "P009",
        }
    }

    pub(crate) fn invalid_destination(reason: impl Into<String>) -> Self {
        PresetError::InvalidDestination {
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown_parameter(path: impl Into<String>) -> Self {
        PresetError::UnknownParameter { path: path.into() }
    }
}

/// Names the JSON type of a value for error messages.
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = PresetError::NoFreeSlot { capacity: 64 };
        assert_eq!(err.code(), "P004");
        assert_eq!(
            PresetError::unknown_parameter("Oscillator9.level").code(),
            "P006"
        );
    }

    #[test]
    fn test_error_display() {
        let err = PresetError::InvalidIndex {
            module: "VoiceFilter",
            index: 2,
            valid: &[0, 1],
        };
        assert_eq!(
            err.to_string(),
            "invalid VoiceFilter index 2, expected one of [0, 1]"
        );

        let err = PresetError::TypeCoercion {
            key: "kParamVolume".to_string(),
            expected: "number",
            found: "array",
        };
        assert_eq!(
            err.to_string(),
            "cannot assign array to number parameter 'kParamVolume'"
        );

        let err = PresetError::UnknownSource {
            name: "velocity".to_string(),
        };
        assert_eq!(err.to_string(), "unknown modulation source 'velocity'");
        assert_eq!(err.code(), "P009");
    }

    #[test]
    fn test_malformed_document_from_serde() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: PresetError = parse_err.into();
        assert!(matches!(err, PresetError::MalformedDocument(_)));
        assert!(err.to_string().starts_with("malformed preset document"));
    }

    #[test]
    fn test_json_type_name() {
        assert_eq!(json_type_name(&serde_json::json!(null)), "null");
        assert_eq!(json_type_name(&serde_json::json!([1, 2])), "array");
        assert_eq!(json_type_name(&serde_json::json!({"a": 1})), "object");
    }
}
