//! Signal filtering for smoothing raw pose samples.
//!
//! Head pose estimates jitter from frame to frame; a fixture driven
//! directly by them shakes. Filters here turn the raw normalized samples
//! into a damped trajectory before rigging.

/// Velocity-limited two-stage smoother
pub mod velocity;

pub use velocity::{advance, SmoothedState, VelocityFilter};

/// Trait for all pose filters
pub trait PoseFilter: Send + Sync {
    /// Apply filter to input values
    fn apply(&mut self, pan: f64, tilt: f64) -> (f64, f64);

    /// Reset filter state
    fn reset(&mut self);

    /// Get filter name
    fn name(&self) -> &str;
}
