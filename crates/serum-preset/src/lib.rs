//! Serum 2 Preset Accessor Library
//!
//! This crate provides a typed, round-trip-preserving view over Serum 2 preset
//! documents. Presets are JSON documents with a `metadata` section and a
//! `data` section holding oscillator, filter and modulation-slot blocks.
//!
//! # Overview
//!
//! - **Parameters** are named, typed, defaulted values addressed by friendly
//!   names (`level`, `cutoff`) instead of on-disk keys (`kParamVolume`,
//!   `kParamFreq`)
//! - **Modules** group parameters and serialize them compactly: only values
//!   that differ from their default are written, and an all-default module
//!   writes the `"default"` sentinel
//! - **The modulation matrix** routes sources such as LFOs and macros to
//!   numeric parameters through 64 fixed slots
//! - **Everything the model does not own** is retained from the loaded
//!   document and written back unchanged
//!
//! # Example
//!
//! ```
//! use serum_preset::{ModRoute, ModSource, Preset};
//!
//! let mut preset = Preset::new().unwrap();
//! preset.name = "Wobble".to_string();
//! preset.set("Oscillator0.enable", 1.0).unwrap();
//! preset.set("VoiceFilter0.cutoff", 0.1).unwrap();
//!
//! let cutoff = preset.target("VoiceFilter0.cutoff").unwrap();
//! let slot = preset
//!     .add_modulation(ModRoute::new(ModSource::LFO1, cutoff).bipolar(true))
//!     .unwrap();
//! assert_eq!(slot.key(), "ModSlot0");
//!
//! let document = preset.to_document();
//! assert_eq!(document["data"]["ModSlot0"]["source"], serde_json::json!([6, 0]));
//! ```
//!
//! # Modules
//!
//! - [`error`]: Error type and result alias
//! - [`param`]: Parameter declarations, values and handles
//! - [`module`]: Module trait, parameter sets and the concrete module kinds
//! - [`modulation`]: Modulation sources, slots and the matrix
//! - [`preset`]: The preset document root
//! - [`hash`]: Canonical document hashing

pub mod error;
pub mod hash;
pub mod modulation;
pub mod module;
pub mod param;
pub mod preset;

// Re-export commonly used types at the crate root
pub use error::{PresetError, PresetResult};
pub use hash::{canonical_document_hash, canonicalize_json};
pub use modulation::{
    ModMatrix, ModRoute, ModSlot, ModSource, ModTarget, DEFAULT_MOD_AMOUNT, MOD_SLOT_COUNT,
};
pub use module::{
    Module, NoiseOsc, NoiseOscillator, NoiseSampleInfo, Oscillator, ParamSet, SubOsc,
    SubOscillator, VoiceFilter, WavetableInfo, WtOsc, DEFAULT_SENTINEL,
};
pub use param::{ModuleId, Param, ParamKind, ParamMut, ParamSpec, ParamValue};
pub use preset::Preset;
