//! Operator commands that replace the configuration snapshot between frames.
//!
//! Control surfaces never write into the live [`Config`]. They push a
//! [`ConfigCommand`] through a [`CommandSender`]; the control loop drains the
//! queue once per frame and swaps in the snapshot returned by
//! [`Config::apply`].

use crate::config::{Axis, Config};
use crate::constants::{DMX_MAX_CHANNEL, DMX_MAX_VALUE, MAX_DEAD_ZONE, MAX_SMOOTHING, MIN_GEAR};
use log::debug;
use std::sync::mpsc::{self, Receiver, Sender};

/// A single configuration change
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigCommand {
    /// Assign a 1-indexed channel (0 disables the axis)
    SetChannel(Axis, u16),
    /// Set the lower device bound of an axis
    SetMin(Axis, i32),
    /// Set the upper device bound of an axis
    SetMax(Axis, i32),
    /// Set the fixed level of an optional axis
    SetValue(Axis, i32),
    /// Rigging scale of a motion axis
    SetScale(Axis, f64),
    /// Dead zone of a motion axis
    SetDeadZone(Axis, f64),
    /// Travel limit of a motion axis
    SetLimit(Axis, f64),
    /// Gear ratio of a motion axis
    SetGear(Axis, f64),
    /// Sensitivity of a motion axis
    SetSensitivity(Axis, f64),
    /// Center offset of a motion axis
    SetOffset(Axis, i32),
    /// Outbound updates per second
    SetUpdateRate(u32),
    /// Smoothing factor
    SetSmoothing(f64),
    /// Maximum velocity in device units
    SetMaxVelocity(f64),
    /// Switch between OSC (true) and HTTP (false)
    SetUseOsc(bool),
    /// OSC receiver port
    SetOscPort(u16),
}

impl Config {
    /// Return a new snapshot with `command` applied and invariants enforced
    ///
    /// Commands that target an axis without the named parameter (for
    /// example a gear ratio on the iris) leave the snapshot unchanged.
    #[must_use]
    pub fn apply(&self, command: &ConfigCommand) -> Self {
        let mut next = self.clone();
        match *command {
            ConfigCommand::SetChannel(axis, channel) => next.set_channel(axis, channel.min(DMX_MAX_CHANNEL)),
            ConfigCommand::SetMin(axis, value) => next.set_min(axis, value),
            ConfigCommand::SetMax(axis, value) => next.set_max(axis, value),
            ConfigCommand::SetValue(axis, value) => {
                let value = value.clamp(0, DMX_MAX_VALUE);
                match axis {
                    Axis::Iris => next.iris_value = value,
                    Axis::Zoom => next.zoom_value = value,
                    Axis::Focus => next.focus_value = value,
                    Axis::Pan | Axis::Tilt => {}
                }
            }
            ConfigCommand::SetScale(axis, scale) if scale.is_finite() => {
                set_motion(&mut next.pan_scale, &mut next.tilt_scale, axis, scale.max(0.0));
            }
            ConfigCommand::SetDeadZone(axis, dead_zone) if dead_zone.is_finite() => set_motion(
                &mut next.pan_dead_zone,
                &mut next.tilt_dead_zone,
                axis,
                dead_zone.clamp(0.0, MAX_DEAD_ZONE),
            ),
            ConfigCommand::SetLimit(axis, limit) if limit.is_finite() => {
                set_motion(&mut next.pan_limit, &mut next.tilt_limit, axis, limit.clamp(0.0, 1.0));
            }
            ConfigCommand::SetGear(axis, gear) if gear.is_finite() => {
                set_motion(&mut next.pan_gear, &mut next.tilt_gear, axis, gear.max(MIN_GEAR));
            }
            ConfigCommand::SetSensitivity(axis, sensitivity) if sensitivity.is_finite() => set_motion(
                &mut next.pan_sensitivity,
                &mut next.tilt_sensitivity,
                axis,
                sensitivity.max(0.0),
            ),
            ConfigCommand::SetOffset(axis, offset) => {
                let offset = offset.clamp(0, DMX_MAX_VALUE);
                match axis {
                    Axis::Pan => next.pan_offset = offset,
                    Axis::Tilt => next.tilt_offset = offset,
                    _ => {}
                }
            }
            ConfigCommand::SetUpdateRate(rate) => next.update_rate = rate.max(1),
            ConfigCommand::SetSmoothing(smoothing) if smoothing.is_finite() => {
                next.smoothing_factor = smoothing.clamp(0.0, MAX_SMOOTHING);
            }
            ConfigCommand::SetMaxVelocity(velocity) if velocity.is_finite() => {
                next.max_velocity = velocity.max(0.0);
            }
            ConfigCommand::SetUseOsc(use_osc) => next.use_osc = use_osc,
            ConfigCommand::SetOscPort(port) => next.osc_port = port,
            _ => debug!("Ignoring non-finite command {:?}", command),
        }
        next
    }
}

fn set_motion(pan: &mut f64, tilt: &mut f64, axis: Axis, value: f64) {
    match axis {
        Axis::Pan => *pan = value,
        Axis::Tilt => *tilt = value,
        _ => {}
    }
}

/// Producer half of the command queue, cloneable across threads
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: Sender<ConfigCommand>,
}

impl CommandSender {
    /// Queue a command; returns false once the control loop has stopped
    pub fn send(&self, command: ConfigCommand) -> bool {
        self.tx.send(command).is_ok()
    }
}

/// Consumer half of the command queue, owned by the control loop
#[derive(Debug)]
pub struct CommandQueue {
    rx: Receiver<ConfigCommand>,
}

impl CommandQueue {
    /// Create a connected sender/queue pair
    #[must_use]
    pub fn channel() -> (CommandSender, Self) {
        let (tx, rx) = mpsc::channel();
        (CommandSender { tx }, Self { rx })
    }

    /// Apply every pending command to `config` in arrival order
    ///
    /// Returns the resulting snapshot and the number of commands applied.
    #[must_use]
    pub fn drain(&self, config: &Config) -> (Config, usize) {
        let mut next = config.clone();
        let mut applied = 0;
        while let Ok(command) = self.rx.try_recv() {
            next = next.apply(&command);
            applied += 1;
        }
        (next, applied)
    }
}
