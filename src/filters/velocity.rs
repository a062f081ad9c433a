use super::PoseFilter;
use crate::config::Config;

/// Advance one axis by a single frame
///
/// The velocity is damped toward the error, clamped to `max_velocity` and
/// integrated; the result is then blended toward `target` a second time
/// with the same factor. Returns `(new_current, new_velocity)`.
#[must_use]
pub fn advance(current: f64, target: f64, velocity: f64, smoothing: f64, max_velocity: f64) -> (f64, f64) {
    let error = target - current;

    // min/max rather than clamp: a negative or NaN limit must not panic
    let velocity = velocity
        .mul_add(smoothing, error * (1.0 - smoothing))
        .min(max_velocity)
        .max(-max_velocity);

    let moved = current + velocity;
    let current = moved.mul_add(smoothing, target * (1.0 - smoothing));

    (current, velocity)
}

/// Trajectory memory of the smoother
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SmoothedState {
    /// Smoothed normalized pan
    pub pan: f64,
    /// Smoothed normalized tilt
    pub tilt: f64,
    /// Pan velocity in normalized units per frame
    pub pan_velocity: f64,
    /// Tilt velocity in normalized units per frame
    pub tilt_velocity: f64,
}

/// Velocity-limited smoother starting from the centered position
#[derive(Debug, Clone)]
pub struct VelocityFilter {
    smoothing: f64,
    max_velocity: f64,
    state: SmoothedState,
}

impl VelocityFilter {
    /// Create a new velocity-limited smoother
    ///
    /// `max_velocity` is in normalized units per frame.
    ///
    /// # Panics
    ///
    /// Panics if smoothing is not in the range [0, 1) or `max_velocity` is negative
    #[must_use]
    pub fn new(smoothing: f64, max_velocity: f64) -> Self {
        assert!((0.0..1.0).contains(&smoothing), "Smoothing must be in [0, 1)");
        assert!(max_velocity >= 0.0, "Max velocity must be non-negative");
        Self {
            smoothing,
            max_velocity,
            state: SmoothedState::default(),
        }
    }

    /// Create a smoother using the parameters of `config`
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let mut filter = Self::new(0.0, 0.0);
        filter.configure(config);
        filter
    }

    /// Adopt the parameters of a new configuration snapshot, keeping the trajectory
    pub fn configure(&mut self, config: &Config) {
        self.smoothing = config.smoothing_factor;
        self.max_velocity = config.normalized_max_velocity();
    }

    /// Current trajectory state
    #[must_use]
    pub const fn state(&self) -> SmoothedState {
        self.state
    }
}

impl PoseFilter for VelocityFilter {
    fn apply(&mut self, pan: f64, tilt: f64) -> (f64, f64) {
        let (pan, pan_velocity) =
            advance(self.state.pan, pan, self.state.pan_velocity, self.smoothing, self.max_velocity);
        let (tilt, tilt_velocity) =
            advance(self.state.tilt, tilt, self.state.tilt_velocity, self.smoothing, self.max_velocity);

        self.state = SmoothedState {
            pan,
            tilt,
            pan_velocity,
            tilt_velocity,
        };

        (pan, tilt)
    }

    fn reset(&mut self) {
        self.state = SmoothedState::default();
    }

    fn name(&self) -> &str {
        "VelocityFilter"
    }
}
