//! The preset document root.
//!
//! A [`Preset`] owns the typed view of a document (metadata, the five
//! oscillators, the two voice filters and the modulation matrix) plus the
//! document it was loaded from. Saving starts from that retained document
//! and overwrites only the keys the typed view owns, so content this crate
//! does not model survives a load/save round trip.


use std::fmt;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use crate::error::{json_type_name, PresetError, PresetResult};
use crate::hash::canonical_document_hash;
use crate::modulation::{ModMatrix, ModRoute, ModSlot, ModTarget, MOD_SLOT_COUNT};
use crate::module::{
    resolve, resolve_mut, Module, NoiseOscillator, Oscillator, SubOscillator, VoiceFilter,
};
use crate::param::{Param, ParamMut};

/// The bundled all-off template used by [`Preset::new`].
const OFF_TEMPLATE: &str = include_str!("../../templates/off.json");

const METADATA_KEY: &str = "metadata";
const DATA_KEY: &str = "data";

const NAME_KEY: &str = "presetName";
const AUTHOR_KEY: &str = "presetAuthor";
const DESCRIPTION_KEY: &str = "presetDescription";

/// Keys of the modeled module blocks under `data`, in document order.
pub const MODULE_KEYS: [&str; 7] = [
    "Oscillator0",
    "Oscillator1",
    "Oscillator2",
    "Oscillator3",
    "Oscillator4",
    "VoiceFilter0",
    "VoiceFilter1",
];

/// A Serum 2 preset.
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    pub name: String,
    pub author: String,
    pub description: String,
    /// Wavetable oscillators A, B and C (Oscillator0..2).
    pub oscillators: [Oscillator; 3],
    /// Noise oscillator (Oscillator3).
    pub noise: NoiseOscillator,
    /// Sub oscillator (Oscillator4).
    pub sub: SubOscillator,
    /// Voice filters (VoiceFilter0, VoiceFilter1).
    pub filters: [VoiceFilter; 2],
    pub mod_matrix: ModMatrix,
    fallback: Map<String, Value>,
}

impl Preset {
    /// Creates an empty preset from the bundled all-off template.
    ///
    /// The name, author and description are cleared and every modulation
    /// slot is inactive. All structurally required blocks of the format are
    /// present in the template, so the result saves to a loadable document
    /// without further setup.
    ///
    /// # Example
    /// ```
    /// use serum_preset::{Module, Preset};
    ///
    /// let preset = Preset::new().unwrap();
    /// assert!(preset.name.is_empty());
    /// assert_eq!(preset.mod_matrix.active_count(), 0);
    /// assert!(!preset.filters[0].enabled());
    /// ```
    pub fn new() -> PresetResult<Self> {
        let mut preset = Self::from_json(OFF_TEMPLATE)?;
        preset.reset_to_template();
        Ok(preset)
    }

    /// Creates an empty preset from a caller-supplied template file.
    ///
    /// Behaves like [`Preset::new`], with the template read from `path`.
    pub fn from_template(path: impl AsRef<Path>) -> PresetResult<Self> {
        let mut preset = Self::load(path)?;
        preset.reset_to_template();
        Ok(preset)
    }

    /// Loads a preset file.
    ///
    /// # Arguments
    /// * `path` - Path to a `.json` preset document
    ///
    /// # Errors
    /// * [`PresetError::Io`] if the file cannot be read
    /// * [`PresetError::MalformedDocument`] if it is not a JSON object
    /// * [`PresetError::TypeCoercion`] if a modeled parameter holds a value
    ///   of the wrong type
    pub fn load(path: impl AsRef<Path>) -> PresetResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| PresetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let preset = Self::from_json(&text)?;
        debug!(
            path = %path.display(),
            bytes = text.len(),
            active_routings = preset.mod_matrix.active_count(),
            "loaded preset"
        );
        Ok(preset)
    }

    /// Parses a preset from JSON text.
    pub fn from_json(text: &str) -> PresetResult<Self> {
        let document: Map<String, Value> = serde_json::from_str(text)?;
        Self::from_document(document)
    }

    /// Builds a preset from a parsed document.
    ///
    /// Missing sections, module blocks and slots load as defaults. The
    /// whole document is retained and used as the base of every save.
    pub fn from_document(document: Map<String, Value>) -> PresetResult<Self> {
        let mut preset = Self::blank();

        let metadata = document.get(METADATA_KEY).and_then(Value::as_object);
        let data = document.get(DATA_KEY).and_then(Value::as_object);

        // metadata wins over data when both carry a name field
        let read_name = |key: &str| {
            metadata
                .and_then(|m| m.get(key))
                .and_then(Value::as_str)
                .or_else(|| data.and_then(|d| d.get(key)).and_then(Value::as_str))
                .unwrap_or_default()
                .to_string()
        };
        preset.name = read_name(NAME_KEY);
        preset.author = read_name(AUTHOR_KEY);
        preset.description = read_name(DESCRIPTION_KEY);

        for key in MODULE_KEYS {
            let block = data.and_then(|d| d.get(key)).unwrap_or(&Value::Null);
            if let Some(module) = preset.module_mut(key) {
                module.load(block)?;
                trace!(module = key, enabled = module.enabled(), "expanded module");
            }
        }
        if let Some(data) = data {
            preset.mod_matrix.load(data)?;
        }

        preset.fallback = document;
        Ok(preset)
    }

    /// A preset with every module at its defaults and no retained document.
    fn blank() -> Self {
        Self {
            name: String::new(),
            author: String::new(),
            description: String::new(),
            oscillators: [Oscillator::at(0), Oscillator::at(1), Oscillator::at(2)],
            noise: NoiseOscillator::new(),
            sub: SubOscillator::new(),
            filters: [VoiceFilter::at(0), VoiceFilter::at(1)],
            mod_matrix: ModMatrix::new(),
            fallback: Map::new(),
        }
    }

    fn reset_to_template(&mut self) {
        self.name.clear();
        self.author.clear();
        self.description.clear();
        self.mod_matrix.clear();
    }

    /// The document this preset was loaded from.
    ///
    /// Modeled keys in it reflect load time, not later edits; use
    /// [`Preset::to_document`] for the current state.
    pub fn fallback(&self) -> &Map<String, Value> {
        &self.fallback
    }

    /// Looks up a modeled module by its `data` key (e.g., "VoiceFilter1").
    pub fn module(&self, key: &str) -> Option<&dyn Module> {
        let module: &dyn Module = match key {
            "Oscillator0" => &self.oscillators[0],
            "Oscillator1" => &self.oscillators[1],
            "Oscillator2" => &self.oscillators[2],
            "Oscillator3" => &self.noise,
            "Oscillator4" => &self.sub,
            "VoiceFilter0" => &self.filters[0],
            "VoiceFilter1" => &self.filters[1],
            _ => return None,
        };
        Some(module)
    }

    pub fn module_mut(&mut self, key: &str) -> Option<&mut dyn Module> {
        let module: &mut dyn Module = match key {
            "Oscillator0" => &mut self.oscillators[0],
            "Oscillator1" => &mut self.oscillators[1],
            "Oscillator2" => &mut self.oscillators[2],
            "Oscillator3" => &mut self.noise,
            "Oscillator4" => &mut self.sub,
            "VoiceFilter0" => &mut self.filters[0],
            "VoiceFilter1" => &mut self.filters[1],
            _ => return None,
        };
        Some(module)
    }

    /// Modeled modules with their `data` keys, in document order.
    pub fn modules(&self) -> impl Iterator<Item = (&'static str, &dyn Module)> + '_ {
        MODULE_KEYS
            .into_iter()
            .filter_map(move |key| self.module(key).map(|module| (key, module)))
    }

    /// Resolves a dotted parameter path.
    ///
    /// The first segment is a module key, the last a parameter name, and
    /// any segments in between name nested blocks by friendly name or
    /// on-disk key: `"Oscillator0.level"`, `"Oscillator1.wt_osc.warp"`,
    /// `"Oscillator1.WTOsc1.warp"`.
    ///
    /// # Errors
    /// * [`PresetError::UnknownParameter`] if the path does not resolve
    pub fn param(&self, path: &str) -> PresetResult<Param<'_>> {
        let (head, rest) = split_path(path)?;
        self.module(head)
            .and_then(|module| resolve(module, &rest))
            .ok_or_else(|| PresetError::unknown_parameter(path))
    }

    /// Mutable counterpart of [`Preset::param`].
    pub fn param_mut(&mut self, path: &str) -> PresetResult<ParamMut<'_>> {
        let (head, rest) = split_path(path)?;
        self.module_mut(head)
            .and_then(|module| resolve_mut(module, &rest))
            .ok_or_else(|| PresetError::unknown_parameter(path))
    }

    /// Assigns a parameter by path, coercing to its native type.
    ///
    /// # Example
    /// ```
    /// use serum_preset::Preset;
    ///
    /// let mut preset = Preset::new().unwrap();
    /// preset.set("Oscillator0.level", 0.8).unwrap();
    /// preset.set("VoiceFilter0.type", "Combs").unwrap();
    /// assert_eq!(preset.param("Oscillator0.level").unwrap().number(), Some(0.8));
    /// assert!(preset.set("VoiceFilter0.type", vec![1, 2]).is_err());
    /// ```
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> PresetResult<()> {
        self.param_mut(path)?.set(value)
    }

    /// Resolves a path to a modulation destination.
    ///
    /// # Errors
    /// * [`PresetError::UnknownParameter`] if the path does not resolve
    /// * [`PresetError::InvalidDestination`] for text parameters
    pub fn target(&self, path: &str) -> PresetResult<ModTarget> {
        self.param(path)?.target()
    }

    /// Claims the first inactive modulation slot for a route.
    pub fn add_modulation(&mut self, route: ModRoute) -> PresetResult<&ModSlot> {
        self.mod_matrix.add(route)
    }

    /// Serializes the preset on top of the retained document.
    ///
    /// Name fields are written to both `metadata` and `data`. Every modeled
    /// module and all 64 slots are written under `data`; other keys keep
    /// their loaded values and positions.
    pub fn to_document(&self) -> Value {
        let mut document = self.fallback.clone();

        let mut metadata = take_section(&mut document, METADATA_KEY);
        self.write_names(&mut metadata);
        document.insert(METADATA_KEY.to_string(), Value::Object(metadata));

        let mut data = take_section(&mut document, DATA_KEY);
        self.write_names(&mut data);
        for (key, module) in self.modules() {
            let block = module.to_value(data.get(key));
            data.insert(key.to_string(), block);
        }
        self.mod_matrix.write_into(&mut data);
        document.insert(DATA_KEY.to_string(), Value::Object(data));

        Value::Object(document)
    }

    fn write_names(&self, section: &mut Map<String, Value>) {
        section.insert(NAME_KEY.to_string(), Value::from(self.name.as_str()));
        section.insert(AUTHOR_KEY.to_string(), Value::from(self.author.as_str()));
        section.insert(
            DESCRIPTION_KEY.to_string(),
            Value::from(self.description.as_str()),
        );
    }

    /// Serializes the preset as indented JSON.
    pub fn to_json_pretty(&self) -> PresetResult<String> {
        Ok(serde_json::to_string_pretty(&self.to_document())?)
    }

    /// Writes the preset to a file, replacing any existing content.
    ///
    /// The write is not atomic.
    pub fn save(&self, path: impl AsRef<Path>) -> PresetResult<()> {
        let path = path.as_ref();
        let json = self.to_json_pretty()?;
        fs::write(path, &json).map_err(|source| PresetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(
            path = %path.display(),
            bytes = json.len(),
            active_routings = self.mod_matrix.active_count(),
            "saved preset"
        );
        Ok(())
    }

    /// Canonical BLAKE3 hash of [`Preset::to_document`].
    ///
    /// Equal for two presets that would save to the same document up to key
    /// order and whitespace.
    pub fn document_hash(&self) -> String {
        canonical_document_hash(&self.to_document())
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.name.is_empty() {
            "(untitled)"
        } else {
            self.name.as_str()
        };
        writeln!(f, "Preset: {}", name)?;
        if !self.author.is_empty() {
            writeln!(f, "Author: {}", self.author)?;
        }
        for (key, module) in self.modules() {
            let state = if module.enabled() { "on" } else { "off" };
            writeln!(f, "  {}: {}", key, state)?;
        }
        write!(
            f,
            "  Modulation: {}/{} slots active",
            self.mod_matrix.active_count(),
            MOD_SLOT_COUNT
        )
    }
}

/// Splits `"Module.child.param"` into the module key and the rest.
fn split_path(path: &str) -> PresetResult<(&str, Vec<&str>)> {
    let (head, rest) = path
        .split_once('.')
        .ok_or_else(|| PresetError::unknown_parameter(path))?;
    Ok((head, rest.split('.').collect()))
}

/// Detaches a top-level section, replacing a non-object value with `{}`.
///
/// The key keeps its position once the section is inserted back.
fn take_section(document: &mut Map<String, Value>, key: &str) -> Map<String, Value> {
    match document.get_mut(key).map(Value::take) {
        Some(Value::Object(section)) => section,
        Some(other) => {
            warn!(
                section = key,
                found = json_type_name(&other),
                "replacing non-object preset section"
            );
            Map::new()
        }
        None => Map::new(),
    }
}
