//! Sparse DMX frame built from the logical fixture axes.

use crate::{
    config::{Axis, Config},
    constants::DMX_MAX_VALUE,
    utils::safe_cast::{channel_to_slot, i32_to_dmx},
    Error, Result,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Zero-indexed wire slot to value mapping for one dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DmxFrame {
    slots: BTreeMap<u16, u8>,
}

impl DmxFrame {
    /// Create an empty frame
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a 0-indexed slot; a later write to the same slot wins
    pub fn set(&mut self, slot: u16, value: u8) {
        self.slots.insert(slot, value);
    }

    /// Value held by a 0-indexed slot
    #[must_use]
    pub fn get(&self, slot: u16) -> Option<u8> {
        self.slots.get(&slot).copied()
    }

    /// Number of slots carried
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether there is nothing to send
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slots in ascending order
    pub fn iter(&self) -> impl Iterator<Item = (u16, u8)> + '_ {
        self.slots.iter().map(|(&slot, &value)| (slot, value))
    }

    /// JSON object keyed by the decimal slot number
    #[must_use]
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .iter()
            .map(|(slot, value)| (slot.to_string(), Value::from(value)))
            .collect();
        Value::Object(map)
    }

    /// Serialized batch body, e.g. `{"0":200,"1":130}`
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the frame is empty or encodes to
    /// something other than a JSON object.
    pub fn to_json_body(&self) -> Result<String> {
        if self.is_empty() {
            return Err(Error::Serialization("refusing to encode an empty DMX frame".to_string()));
        }
        let body = serde_json::to_string(&self.to_json())?;
        if body.is_empty() || body == "null" || body == "{}" {
            return Err(Error::Serialization(format!("invalid DMX payload generated: {body:?}")));
        }
        Ok(body)
    }
}

/// Value an axis carries this frame, or `None` when the axis is disabled
#[must_use]
pub fn axis_value(axis: Axis, pan_value: i32, tilt_value: i32, config: &Config) -> Option<i32> {
    if !config.is_enabled(axis) {
        return None;
    }
    match axis {
        Axis::Pan => Some(pan_value),
        Axis::Tilt => Some(tilt_value),
        _ => config.fixed_value(axis),
    }
}

/// Build the sparse frame for the enabled axes
///
/// Channels are 1-indexed in the configuration and 0-indexed on the wire.
/// Values are clamped into 0..=255 so a misconfigured range cannot
/// overflow a slot. An empty frame means there is nothing to send.
#[must_use]
pub fn build_frame(pan_value: i32, tilt_value: i32, config: &Config) -> DmxFrame {
    let mut frame = DmxFrame::new();
    for axis in Axis::ALL {
        let Some(value) = axis_value(axis, pan_value, tilt_value, config) else {
            continue;
        };
        let Some(slot) = channel_to_slot(config.channel(axis)) else {
            continue;
        };
        if let Ok(value) = i32_to_dmx(value.clamp(0, DMX_MAX_VALUE)) {
            frame.set(slot, value);
        }
    }
    frame
}
