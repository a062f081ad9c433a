//! Constants used throughout the application

use std::time::Duration;

/// Number of smoothed samples kept per axis for gesture classification
pub const GESTURE_HISTORY_SIZE: usize = 30;

/// Minimum history length before any gesture is classified
pub const GESTURE_MIN_SAMPLES: usize = 10;

/// Frames during which classification is suppressed after a new gesture
pub const GESTURE_COOLDOWN_FRAMES: u32 = 30;

/// Frame-to-frame change below which a step has no direction
pub const DIRECTION_THRESHOLD: f64 = 0.05;

/// Largest single step required to call a reversal pattern an oscillation
pub const OSCILLATION_STEP_THRESHOLD: f64 = 0.1;

/// Direction reversals required for nodding or shaking
pub const MIN_DIRECTION_REVERSALS: u32 = 2;

/// Mean offset beyond which a sustained look is reported
pub const SUSTAINED_OFFSET_THRESHOLD: f64 = 0.3;

/// Trailing window averaged for sustained looks
pub const SUSTAINED_WINDOW: usize = 10;

/// Device units covered by a normalized half-swing (-1..0 or 0..1)
pub const DMX_HALF_RANGE: f64 = 127.0;

/// Largest value a DMX slot can carry
pub const DMX_MAX_VALUE: i32 = 255;

/// Highest addressable channel in one universe (1-indexed)
pub const DMX_MAX_CHANNEL: u16 = 512;

/// Lower bound applied to gear ratios so the rigging never divides by zero
pub const MIN_GEAR: f64 = 0.1;

/// Upper bound applied to dead zones so the rescale never divides by zero
pub const MAX_DEAD_ZONE: f64 = 0.99;

/// Upper bound applied to the smoothing factor
pub const MAX_SMOOTHING: f64 = 0.99;

/// Timeout for a single HTTP batch request
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(1);

/// Interval between checks of the external configuration store
pub const CONFIG_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Configuration file used when none is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "face-tracker-config.json";
