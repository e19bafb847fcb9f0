//! Modulation source identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PresetError;

/// A modulation source, stored on disk as `[type_id, aux_index]`.
///
/// `(0, 0)` is the empty source of an unused slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModSource(u32, u32);

impl ModSource {
    /// The empty source of an inactive slot.
    pub const NONE: ModSource = ModSource(0, 0);

    pub const MOD_WHEEL: ModSource = ModSource(1, 0);

    pub const ENV1: ModSource = ModSource(2, 0);
    pub const ENV2: ModSource = ModSource(3, 0);
    pub const ENV3: ModSource = ModSource(4, 0);
    pub const ENV4: ModSource = ModSource(5, 0);

    pub const LFO1: ModSource = ModSource(6, 0);
    pub const LFO2: ModSource = ModSource(7, 0);
    pub const LFO3: ModSource = ModSource(8, 0);
    pub const LFO4: ModSource = ModSource(9, 0);
    pub const LFO5: ModSource = ModSource(10, 0);
    pub const LFO6: ModSource = ModSource(11, 0);
    pub const LFO7: ModSource = ModSource(12, 0);
    pub const LFO8: ModSource = ModSource(13, 0);
    pub const LFO9: ModSource = ModSource(14, 0);
    pub const LFO10: ModSource = ModSource(15, 0);

    pub const MACRO1: ModSource = ModSource(16, 0);
    pub const MACRO2: ModSource = ModSource(16, 1);
    pub const MACRO3: ModSource = ModSource(16, 2);
    pub const MACRO4: ModSource = ModSource(16, 3);
    pub const MACRO5: ModSource = ModSource(16, 4);
    pub const MACRO6: ModSource = ModSource(16, 5);
    pub const MACRO7: ModSource = ModSource(16, 6);
    pub const MACRO8: ModSource = ModSource(16, 7);

    /// Creates a source from its raw identifier pair.
    pub const fn new(type_id: u32, aux_index: u32) -> Self {
        ModSource(type_id, aux_index)
    }

    /// Envelope `n` (1-4).
    pub fn env(n: u32) -> Option<Self> {
        (1..=4).contains(&n).then(|| ModSource(1 + n, 0))
    }

    /// LFO `n` (1-10).
    pub fn lfo(n: u32) -> Option<Self> {
        (1..=10).contains(&n).then(|| ModSource(5 + n, 0))
    }

    /// Macro knob `n` (1-8).
    pub fn macro_knob(n: u32) -> Option<Self> {
        (1..=8).contains(&n).then(|| ModSource(16, n - 1))
    }

    pub fn type_id(&self) -> u32 {
        self.0
    }

    pub fn aux_index(&self) -> u32 {
        self.1
    }

    pub fn is_none(&self) -> bool {
        *self == Self::NONE
    }

    /// Friendly name of a known source (e.g., "lfo3").
    pub fn name(&self) -> Option<String> {
        match (self.0, self.1) {
            (1, 0) => Some("mod_wheel".to_string()),
            (t @ 2..=5, 0) => Some(format!("env{}", t - 1)),
            (t @ 6..=15, 0) => Some(format!("lfo{}", t - 5)),
            (16, a @ 0..=7) => Some(format!("macro{}", a + 1)),
            _ => None,
        }
    }
}

impl fmt::Display for ModSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "[{}, {}]", self.0, self.1),
        }
    }
}

impl FromStr for ModSource {
    type Err = PresetError;

    /// Parses "mod_wheel", "envN", "lfoN" or "macroN" (case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "mod_wheel" || lower == "modwheel" {
            return Ok(Self::MOD_WHEEL);
        }

        let families: [(&str, fn(u32) -> Option<Self>); 3] = [
            ("env", Self::env),
            ("lfo", Self::lfo),
            ("macro", Self::macro_knob),
        ];
        let parsed = families.into_iter().find_map(|(prefix, ctor)| {
            let n = lower.strip_prefix(prefix)?.parse::<u32>().ok()?;
            ctor(n)
        });

        parsed.ok_or_else(|| PresetError::UnknownSource {
            name: s.to_string(),
        })
    }
}
