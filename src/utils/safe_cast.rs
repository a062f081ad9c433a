//! Float-to-integer conversions that never overflow or panic

use crate::{Error, Result};

/// Truncate toward zero and clamp into `[min, max]`
///
/// Non-finite input maps to `min`. Truncation before clamping gives the
/// same result as clamping first because the bounds are integers.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Clamping ensures safe truncation
pub fn f64_to_i32_clamp(value: f64, min: i32, max: i32) -> i32 {
    let (min, max) = if min <= max { (min, max) } else { (max, min) };

    if !value.is_finite() {
        return min;
    }

    let clamped = value.clamp(f64::from(min), f64::from(max));
    (clamped as i32).clamp(min, max)
}

/// Convert a device value into a DMX slot byte
///
/// # Errors
///
/// Returns an error if the value is outside 0..=255
pub fn i32_to_dmx(value: i32) -> Result<u8> {
    u8::try_from(value).map_err(|_| Error::InvalidInput(format!("DMX value {value} outside 0..=255")))
}

/// Convert a 1-indexed external channel into a 0-indexed wire slot
///
/// Returns `None` for channel 0, which marks a disabled axis.
#[must_use]
pub const fn channel_to_slot(channel: u16) -> Option<u16> {
    channel.checked_sub(1)
}
