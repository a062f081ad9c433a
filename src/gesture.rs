//! Gesture classification over a sliding window of smoothed head motion.
//!
//! Oscillations (nodding, shaking) are recognized by counting direction
//! reversals of frame-to-frame steps; sustained looks by the mean of the
//! most recent samples. A newly recognized gesture starts a cooldown
//! during which classification is skipped entirely.

use crate::constants::{
    DIRECTION_THRESHOLD, GESTURE_COOLDOWN_FRAMES, GESTURE_HISTORY_SIZE, GESTURE_MIN_SAMPLES,
    MIN_DIRECTION_REVERSALS, OSCILLATION_STEP_THRESHOLD, SUSTAINED_OFFSET_THRESHOLD, SUSTAINED_WINDOW,
};
use std::collections::VecDeque;
use std::fmt;

/// Recognized head gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gesture {
    /// Vertical oscillation
    Nodding,
    /// Horizontal oscillation
    Shaking,
    /// Sustained negative tilt
    LookingUp,
    /// Sustained positive tilt
    LookingDown,
    /// Sustained negative pan
    LookingLeft,
    /// Sustained positive pan
    LookingRight,
}

impl Gesture {
    /// Upper-case label used in logs and by consumers of the label stream
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Nodding => "NODDING",
            Self::Shaking => "SHAKING",
            Self::LookingUp => "LOOKING_UP",
            Self::LookingDown => "LOOKING_DOWN",
            Self::LookingLeft => "LOOKING_LEFT",
            Self::LookingRight => "LOOKING_RIGHT",
        }
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Direction reversal summary of one axis
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Oscillation {
    /// Number of sign changes between consecutive directed steps
    pub reversals: u32,
    /// Largest absolute frame-to-frame step
    pub max_step: f64,
}

impl Oscillation {
    /// Whether the pattern counts as a nod or shake
    #[must_use]
    pub fn is_oscillating(&self) -> bool {
        self.reversals >= MIN_DIRECTION_REVERSALS && self.max_step > OSCILLATION_STEP_THRESHOLD
    }
}

/// Stateful gesture detector
#[derive(Debug, Clone)]
pub struct GestureDetector {
    pan_history: VecDeque<f64>,
    tilt_history: VecDeque<f64>,
    cooldown: u32,
    last_gesture: Option<Gesture>,
}

impl Default for GestureDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureDetector {
    /// Create a new gesture detector with empty history
    #[must_use]
    pub fn new() -> Self {
        Self {
            pan_history: VecDeque::with_capacity(GESTURE_HISTORY_SIZE + 1),
            tilt_history: VecDeque::with_capacity(GESTURE_HISTORY_SIZE + 1),
            cooldown: 0,
            last_gesture: None,
        }
    }

    /// Record a smoothed sample and return a newly recognized gesture
    ///
    /// The cooldown is decremented first; classification only runs once it
    /// reaches zero. A classification is reported only when it differs from
    /// the last reported gesture, and only then is the cooldown re-armed.
    pub fn observe(&mut self, pan: f64, tilt: f64) -> Option<Gesture> {
        self.pan_history.push_back(pan);
        self.tilt_history.push_back(tilt);
        if self.pan_history.len() > GESTURE_HISTORY_SIZE {
            self.pan_history.pop_front();
        }
        if self.tilt_history.len() > GESTURE_HISTORY_SIZE {
            self.tilt_history.pop_front();
        }

        if self.cooldown > 0 {
            self.cooldown -= 1;
        }
        if self.cooldown > 0 || self.pan_history.len() < GESTURE_MIN_SAMPLES {
            return None;
        }

        let gesture = self.classify()?;
        if self.last_gesture == Some(gesture) {
            return None;
        }

        self.last_gesture = Some(gesture);
        self.cooldown = GESTURE_COOLDOWN_FRAMES;
        Some(gesture)
    }

    /// Classify the current history without touching cooldown state
    #[must_use]
    pub fn classify(&self) -> Option<Gesture> {
        if self.pan_history.len() < GESTURE_MIN_SAMPLES || self.tilt_history.len() < GESTURE_MIN_SAMPLES {
            return None;
        }

        if Self::oscillation(&self.tilt_history).is_oscillating() {
            return Some(Gesture::Nodding);
        }
        if Self::oscillation(&self.pan_history).is_oscillating() {
            return Some(Gesture::Shaking);
        }

        let tilt = Self::recent_mean(&self.tilt_history);
        if tilt < -SUSTAINED_OFFSET_THRESHOLD {
            return Some(Gesture::LookingUp);
        }
        if tilt > SUSTAINED_OFFSET_THRESHOLD {
            return Some(Gesture::LookingDown);
        }

        let pan = Self::recent_mean(&self.pan_history);
        if pan < -SUSTAINED_OFFSET_THRESHOLD {
            return Some(Gesture::LookingLeft);
        }
        if pan > SUSTAINED_OFFSET_THRESHOLD {
            return Some(Gesture::LookingRight);
        }

        None
    }

    /// Remaining cooldown frames
    #[must_use]
    pub const fn cooldown(&self) -> u32 {
        self.cooldown
    }

    /// Last gesture reported by [`observe`](Self::observe)
    #[must_use]
    pub const fn last_gesture(&self) -> Option<Gesture> {
        self.last_gesture
    }

    /// Number of samples currently held per axis
    #[must_use]
    pub fn len(&self) -> usize {
        self.pan_history.len()
    }

    /// Whether no samples have been recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pan_history.is_empty()
    }

    /// Reset the detector
    pub fn reset(&mut self) {
        self.pan_history.clear();
        self.tilt_history.clear();
        self.cooldown = 0;
        self.last_gesture = None;
    }

    /// Count direction reversals over the whole window
    ///
    /// Steps smaller than the direction threshold carry no direction; they
    /// neither count as a reversal nor reset the last seen direction.
    fn oscillation(data: &VecDeque<f64>) -> Oscillation {
        let mut result = Oscillation::default();
        let mut last_direction = 0i8;

        for (previous, current) in data.iter().zip(data.iter().skip(1)) {
            let step = current - previous;
            let direction = if step > DIRECTION_THRESHOLD {
                1
            } else if step < -DIRECTION_THRESHOLD {
                -1
            } else {
                0
            };

            if direction != 0 {
                if last_direction != 0 && direction != last_direction {
                    result.reversals += 1;
                }
                last_direction = direction;
            }

            result.max_step = result.max_step.max(step.abs());
        }

        result
    }

    /// Mean of the trailing window
    #[allow(clippy::cast_precision_loss)] // window is tiny
    fn recent_mean(data: &VecDeque<f64>) -> f64 {
        let window = SUSTAINED_WINDOW.min(data.len());
        data.iter().rev().take(window).sum::<f64>() / window as f64
    }
}
