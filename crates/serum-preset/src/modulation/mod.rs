//! Modulation matrix.
//!
//! The matrix is a fixed table of [`MOD_SLOT_COUNT`] routing slots, stored
//! on disk as `ModSlot0`..`ModSlot63` under the preset's `data` section.
//! A routing destination is captured once, when the route is added, from
//! the identity of the parameter it was created from.

mod source;

pub use source::ModSource;

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::warn;

use crate::error::{PresetError, PresetResult};
use crate::module::{as_u32, plain_params, DEFAULT_SENTINEL, PLAIN_PARAMS_KEY};
use crate::param::coerce_number;

/// Number of slots in the modulation matrix.
pub const MOD_SLOT_COUNT: usize = 64;

/// Amount used by [`ModRoute::new`] when none is given.
pub const DEFAULT_MOD_AMOUNT: f64 = 50.0;

const AMOUNT_KEY: &str = "kParamAmount";
const BIPOLAR_KEY: &str = "kParamBipolar";

/// A resolved modulation destination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModTarget {
    module_type: String,
    module_index: u32,
    param_key: String,
    param_id: u32,
}

impl ModTarget {
    /// Creates a destination from raw identity fields.
    ///
    /// Prefer [`Param::target`](crate::Param::target), which reads these
    /// off a parameter handle.
    pub fn new(
        module_type: impl Into<String>,
        module_index: u32,
        param_key: impl Into<String>,
        param_id: u32,
    ) -> Self {
        Self {
            module_type: module_type.into(),
            module_index,
            param_key: param_key.into(),
            param_id,
        }
    }

    pub fn module_type(&self) -> &str {
        &self.module_type
    }

    pub fn module_index(&self) -> u32 {
        self.module_index
    }

    pub fn param_key(&self) -> &str {
        &self.param_key
    }

    pub fn param_id(&self) -> u32 {
        self.param_id
    }
}

/// A routing request: source, destination, amount and polarity.
#[derive(Debug, Clone, PartialEq)]
pub struct ModRoute {
    source: ModSource,
    target: ModTarget,
    amount: f64,
    bipolar: bool,
}

impl ModRoute {
    /// Creates a unipolar route with the default amount of 50.0.
    pub fn new(source: ModSource, target: ModTarget) -> Self {
        Self {
            source,
            target,
            amount: DEFAULT_MOD_AMOUNT,
            bipolar: false,
        }
    }

    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = amount;
        self
    }

    pub fn bipolar(mut self, bipolar: bool) -> Self {
        self.bipolar = bipolar;
        self
    }
}

/// Routing identity of an active slot as stored on disk.
///
/// Ids and source components also load from integer-valued floats.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RoutingRecord {
    #[serde(deserialize_with = "source_pair")]
    source: ModSource,
    #[serde(rename = "destModuleTypeString")]
    module_type: String,
    #[serde(rename = "destModuleID", deserialize_with = "routing_index")]
    module_index: u32,
    #[serde(rename = "destModuleParamName")]
    param_key: String,
    #[serde(rename = "destModuleParamID", deserialize_with = "routing_index")]
    param_id: u32,
}

fn routing_index<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    as_u32(&value)
        .ok_or_else(|| de::Error::custom(format!("expected an index, found {}", value)))
}

fn source_pair<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ModSource, D::Error> {
    let value = Value::deserialize(deserializer)?;
    if let Some([type_id, aux_index]) = value.as_array().map(Vec::as_slice) {
        if let (Some(type_id), Some(aux_index)) = (as_u32(type_id), as_u32(aux_index)) {
            return Ok(ModSource::new(type_id, aux_index));
        }
    }
    Err(de::Error::custom(format!(
        "expected a [type, index] source, found {}",
        value
    )))
}

/// One slot of the modulation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct ModSlot {
    index: usize,
    pub source: ModSource,
    pub target: Option<ModTarget>,
    pub amount: f64,
    pub bipolar: bool,
}

impl ModSlot {
    fn empty(index: usize) -> Self {
        Self {
            index,
            source: ModSource::NONE,
            target: None,
            amount: 0.0,
            bipolar: false,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// On-disk key of this slot (e.g., "ModSlot7").
    pub fn key(&self) -> String {
        format!("ModSlot{}", self.index)
    }

    /// A slot is active when it has a source and a destination module type.
    pub fn is_active(&self) -> bool {
        !self.source.is_none()
            && self
                .target
                .as_ref()
                .is_some_and(|t| !t.module_type.is_empty())
    }

    /// Returns the slot to its inactive state.
    pub fn clear(&mut self) {
        *self = Self::empty(self.index);
    }

    /// Serializes the slot.
    ///
    /// Inactive slots are `{"plainParams": "default"}`. Active slots always
    /// carry their routing identity; `kParamAmount` is emitted only when
    /// nonzero and `kParamBipolar` only when set.
    pub fn to_value(&self) -> Value {
        let target = match &self.target {
            Some(target) if self.is_active() => target,
            _ => return json!({ PLAIN_PARAMS_KEY: DEFAULT_SENTINEL }),
        };

        let mut params = Map::new();
        if self.amount != 0.0 {
            params.insert(AMOUNT_KEY.to_string(), Value::from(self.amount));
        }
        if self.bipolar {
            params.insert(BIPOLAR_KEY.to_string(), Value::from(1.0));
        }
        let plain = if params.is_empty() {
            Value::from(DEFAULT_SENTINEL)
        } else {
            Value::Object(params)
        };

        json!({
            "source": [self.source.type_id(), self.source.aux_index()],
            "destModuleTypeString": target.module_type,
            "destModuleID": target.module_index,
            "destModuleParamName": target.param_key,
            "destModuleParamID": target.param_id,
            PLAIN_PARAMS_KEY: plain,
        })
    }

    /// Replaces the slot's state with the content of its document block.
    ///
    /// A block whose routing identity cannot be read loads as an inactive
    /// slot. `kParamAmount` and `kParamBipolar` coerce like numeric
    /// parameters and fail with [`PresetError::TypeCoercion`] otherwise.
    pub fn load(&mut self, block: &Value) -> PresetResult<()> {
        self.clear();
        let record = match block {
            Value::Object(_) => RoutingRecord::deserialize(block).unwrap_or_else(|err| {
                warn!(
                    slot = self.index,
                    error = %err,
                    "unreadable modulation routing, slot left inactive"
                );
                RoutingRecord::default()
            }),
            _ => RoutingRecord::default(),
        };

        let plain = plain_params(block);
        self.source = record.source;
        if !record.module_type.is_empty() {
            self.target = Some(ModTarget {
                module_type: record.module_type,
                module_index: record.module_index,
                param_key: record.param_key,
                param_id: record.param_id,
            });
        }
        if let Some(amount) = plain.get(AMOUNT_KEY) {
            self.amount = coerce_number(AMOUNT_KEY, amount)?;
        }
        if let Some(bipolar) = plain.get(BIPOLAR_KEY) {
            self.bipolar = coerce_number(BIPOLAR_KEY, bipolar)? == 1.0;
        }
        Ok(())
    }
}

/// The fixed 64-slot modulation matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct ModMatrix {
    slots: Vec<ModSlot>,
}

impl ModMatrix {
    /// Creates a matrix with every slot inactive.
    pub fn new() -> Self {
        Self {
            slots: (0..MOD_SLOT_COUNT).map(ModSlot::empty).collect(),
        }
    }

    /// Claims the first inactive slot for a route.
    ///
    /// Fails with [`PresetError::NoFreeSlot`] when all slots are active,
    /// [`PresetError::InvalidSource`] for the empty source and
    /// [`PresetError::InvalidDestination`] for an unbound destination.
    pub fn add(&mut self, route: ModRoute) -> PresetResult<&ModSlot> {
        if route.source.is_none() {
            return Err(PresetError::InvalidSource {
                mod_source: route.source,
            });
        }
        if route.target.module_type.is_empty() || route.target.param_key.is_empty() {
            return Err(PresetError::invalid_destination(
                "destination is not bound to a module parameter",
            ));
        }

        let slot = self
            .slots
            .iter_mut()
            .find(|slot| !slot.is_active())
            .ok_or(PresetError::NoFreeSlot {
                capacity: MOD_SLOT_COUNT,
            })?;

        slot.source = route.source;
        slot.target = Some(route.target);
        slot.amount = route.amount;
        slot.bipolar = route.bipolar;
        Ok(slot)
    }

    /// Resets every slot to inactive, discarding existing routings.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(ModSlot::clear);
    }

    pub fn slot(&self, index: usize) -> Option<&ModSlot> {
        self.slots.get(index)
    }

    pub fn slot_mut(&mut self, index: usize) -> Option<&mut ModSlot> {
        self.slots.get_mut(index)
    }

    pub fn slots(&self) -> &[ModSlot] {
        &self.slots
    }

    pub fn active_slots(&self) -> impl Iterator<Item = &ModSlot> {
        self.slots.iter().filter(|slot| slot.is_active())
    }

    pub fn active_count(&self) -> usize {
        self.active_slots().count()
    }

    /// Loads every `ModSlotN` block present in a `data` section.
    ///
    /// Slots without a block are left inactive.
    pub fn load(&mut self, data: &Map<String, Value>) -> PresetResult<()> {
        for slot in &mut self.slots {
            match data.get(&slot.key()) {
                Some(block) => slot.load(block)?,
                None => slot.clear(),
            }
        }
        Ok(())
    }

    /// Writes every slot into a `data` section, overwriting existing keys.
    pub fn write_into(&self, data: &mut Map<String, Value>) {
        for slot in &self.slots {
            data.insert(slot.key(), slot.to_value());
        }
    }
}

impl Default for ModMatrix {
    fn default() -> Self {
        Self::new()
    }
}
