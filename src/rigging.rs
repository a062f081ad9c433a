//! Rigging transform from normalized head motion to fixture device units.
//!
//! Each motion axis goes through dead-zone removal, the rigging gain
//! (`sensitivity * scale / gear * limit`), the offset mapping
//! `offset + movement * 127` and finally the configured bounds. Input
//! outside [-1, 1] is accepted; the clamp keeps the output in range.

use crate::{
    config::{Config, Rigging},
    constants::DMX_HALF_RANGE,
    utils::safe_cast::f64_to_i32_clamp,
};

/// Suppress `value` inside the dead zone and rescale the remainder to [-1, 1]
#[must_use]
pub fn apply_dead_zone(value: f64, dead_zone: f64) -> f64 {
    if value.abs() < dead_zone {
        return 0.0;
    }
    let sign = if value > 0.0 { 1.0 } else { -1.0 };
    sign * (value.abs() - dead_zone) / (1.0 - dead_zone)
}

/// Map one normalized axis value through its rigging
#[must_use]
pub fn map_axis(value: f64, rigging: &Rigging) -> i32 {
    let movement = apply_dead_zone(value, rigging.dead_zone) * rigging.gain();
    let device = movement.mul_add(DMX_HALF_RANGE, f64::from(rigging.offset));
    f64_to_i32_clamp(device, rigging.min, rigging.max)
}

/// Map a smoothed pose to `(pan, tilt)` device values
#[must_use]
pub fn map(pan: f64, tilt: f64, config: &Config) -> (i32, i32) {
    (
        map_axis(pan, &config.pan_rigging()),
        map_axis(tilt, &config.tilt_rigging()),
    )
}
