//! Per-frame processing: smoothing, gesture detection, rigging and dispatch.

use crate::{
    config::Config,
    filters::{PoseFilter, SmoothedState, VelocityFilter},
    gesture::{Gesture, GestureDetector},
    output::{DispatchOutcome, OutputDispatcher},
    pose::PoseSample,
    rigging, Error, Result,
};
use log::{debug, info};
use std::time::Instant;

/// What happened to one pose sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    /// Pan in device units
    pub pan_value: i32,
    /// Tilt in device units
    pub tilt_value: i32,
    /// Smoother state after this frame
    pub smoothed: SmoothedState,
    /// Gesture newly recognized on this frame
    pub gesture: Option<Gesture>,
    /// Outcome of the output stage
    pub dispatch: DispatchOutcome,
}

/// Single-owner state of the control loop
///
/// Within a frame the smoother is updated first, the gesture detector then
/// sees the smoothed pose, and only then are device values computed and
/// dispatched.
#[derive(Debug)]
pub struct Pipeline {
    filter: VelocityFilter,
    gestures: GestureDetector,
    dispatcher: OutputDispatcher,
}

impl Pipeline {
    /// Create a pipeline for `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the output transports cannot be created.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_dispatcher(config, OutputDispatcher::new()?))
    }

    /// Create a pipeline around an existing dispatcher
    #[must_use]
    pub fn with_dispatcher(config: &Config, dispatcher: OutputDispatcher) -> Self {
        Self {
            filter: VelocityFilter::from_config(config),
            gestures: GestureDetector::new(),
            dispatcher,
        }
    }

    /// Process one pose sample under the `config` snapshot
    ///
    /// # Errors
    ///
    /// Rejects a sample with non-finite components without touching any
    /// state. Transport failures are reported in the [`FrameReport`], not as
    /// errors.
    pub fn process(&mut self, sample: PoseSample, config: &Config, now: Instant) -> Result<FrameReport> {
        if !sample.is_finite() {
            return Err(Error::InvalidInput(format!("non-finite pose sample {sample}")));
        }

        self.filter.configure(config);
        let (pan, tilt) = self.filter.apply(sample.pan, sample.tilt);

        let gesture = self.gestures.observe(pan, tilt);
        if let Some(gesture) = gesture {
            info!("Gesture detected: {gesture}");
        }

        let (pan_value, tilt_value) = rigging::map(pan, tilt, config);
        let dispatch = self.dispatcher.tick(now, pan_value, tilt_value, config);
        if dispatch.attempted() {
            debug!("pan={pan:.3} tilt={tilt:.3} -> {pan_value}/{tilt_value} {dispatch:?}");
        }

        Ok(FrameReport {
            pan_value,
            tilt_value,
            smoothed: self.filter.state(),
            gesture,
            dispatch,
        })
    }

    /// Smoother state carried into the next frame
    #[must_use]
    pub const fn state(&self) -> SmoothedState {
        self.filter.state()
    }

    /// Gesture detector with its sample window
    pub const fn gestures(&self) -> &GestureDetector {
        &self.gestures
    }

    /// Forget the trajectory and gesture history
    pub fn reset(&mut self) {
        self.filter.reset();
        self.gestures.reset();
        self.dispatcher.reset();
    }
}
