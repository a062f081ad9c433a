//! Configuration snapshot for the tracker pipeline.
//!
//! The on-disk schema is a flat JSON object with camelCase keys shared with
//! other tools (the web control surface writes the same file), so keys this
//! crate does not understand are carried through load/save untouched.

use crate::constants::{DMX_MAX_CHANNEL, DMX_MAX_VALUE, MAX_DEAD_ZONE, MAX_SMOOTHING, MIN_GEAR};
use crate::{Error, Result};
use log::info;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;

/// Logical fixture axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    /// Horizontal rotation
    Pan,
    /// Vertical rotation
    Tilt,
    /// Beam aperture
    Iris,
    /// Beam angle
    Zoom,
    /// Lens focus
    Focus,
}

impl Axis {
    /// Every axis in wire order
    pub const ALL: [Self; 5] = [Self::Pan, Self::Tilt, Self::Iris, Self::Zoom, Self::Focus];

    /// Axes that carry a fixed level instead of tracked motion
    pub const OPTIONAL: [Self; 3] = [Self::Iris, Self::Zoom, Self::Focus];

    /// Lowercase axis name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Pan => "pan",
            Self::Tilt => "tilt",
            Self::Iris => "iris",
            Self::Zoom => "zoom",
            Self::Focus => "focus",
        }
    }

    /// Whether the axis is driven by head motion
    #[must_use]
    pub const fn is_motion(self) -> bool {
        matches!(self, Self::Pan | Self::Tilt)
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Mechanical calibration of one motion axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rigging {
    /// Input magnitude below which movement is suppressed
    pub dead_zone: f64,
    /// Installation scale factor
    pub scale: f64,
    /// Fraction of the travel that may be used
    pub limit: f64,
    /// Divisor slowing the actuator relative to the input
    pub gear: f64,
    /// Operator sensitivity multiplier
    pub sensitivity: f64,
    /// Device value at the center position
    pub offset: i32,
    /// Lowest device value the fixture may receive
    pub min: i32,
    /// Highest device value the fixture may receive
    pub max: i32,
}

impl Rigging {
    /// Combined multiplier applied after dead-zone removal
    #[must_use]
    pub fn gain(&self) -> f64 {
        self.sensitivity * self.scale / self.gear * self.limit
    }
}

/// Complete set of tunable parameters
///
/// A value of this type is treated as an immutable snapshot: the pipeline
/// reads it and replacements arrive whole, either from the file watcher or
/// from [`Config::apply`](crate::command::ConfigCommand).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Batch endpoint receiving HTTP frames
    pub dmx_api_url: String,

    /// Send OSC datagrams instead of HTTP batches
    #[serde(rename = "useOSC")]
    pub use_osc: bool,

    /// OSC receiver host
    pub osc_host: String,

    /// OSC receiver port
    pub osc_port: u16,

    /// OSC address of the pan axis
    pub osc_pan_path: String,
    /// OSC address of the tilt axis
    pub osc_tilt_path: String,
    /// OSC address of the iris axis
    pub osc_iris_path: String,
    /// OSC address of the zoom axis
    pub osc_zoom_path: String,
    /// OSC address of the focus axis
    pub osc_focus_path: String,

    /// 1-indexed DMX channel of the pan axis (0 disables the axis)
    pub pan_channel: u16,
    /// 1-indexed DMX channel of the tilt axis
    pub tilt_channel: u16,
    /// 1-indexed DMX channel of the iris axis
    pub iris_channel: u16,
    /// 1-indexed DMX channel of the zoom axis
    pub zoom_channel: u16,
    /// 1-indexed DMX channel of the focus axis
    pub focus_channel: u16,

    /// Lowest pan value in device units
    pub pan_min: i32,
    /// Highest pan value in device units
    pub pan_max: i32,
    /// Lowest tilt value in device units
    pub tilt_min: i32,
    /// Highest tilt value in device units
    pub tilt_max: i32,
    /// Lowest iris level
    pub iris_min: i32,
    /// Highest iris level
    pub iris_max: i32,
    /// Lowest zoom level
    pub zoom_min: i32,
    /// Highest zoom level
    pub zoom_max: i32,
    /// Lowest focus level
    pub focus_min: i32,
    /// Highest focus level
    pub focus_max: i32,

    /// Pan installation scale factor
    pub pan_scale: f64,
    /// Tilt installation scale factor
    pub tilt_scale: f64,
    /// Pan input magnitude suppressed as noise, in [0, 1)
    pub pan_dead_zone: f64,
    /// Tilt input magnitude suppressed as noise, in [0, 1)
    pub tilt_dead_zone: f64,
    /// Usable fraction of the pan travel, in [0, 1]
    pub pan_limit: f64,
    /// Usable fraction of the tilt travel, in [0, 1]
    pub tilt_limit: f64,
    /// Pan gear divisor, at least 0.1
    pub pan_gear: f64,
    /// Tilt gear divisor, at least 0.1
    pub tilt_gear: f64,
    /// Pan operator sensitivity
    pub pan_sensitivity: f64,
    /// Tilt operator sensitivity
    pub tilt_sensitivity: f64,

    /// Pan center position in device units
    pub pan_offset: i32,
    /// Tilt center position in device units
    pub tilt_offset: i32,

    /// Fixed iris level sent while the axis is enabled
    pub iris_value: i32,
    /// Fixed zoom level sent while the axis is enabled
    pub zoom_value: i32,
    /// Fixed focus level sent while the axis is enabled
    pub focus_value: i32,

    /// Outbound updates per second
    pub update_rate: u32,

    /// Damping in [0, 1), higher is smoother
    pub smoothing_factor: f64,

    /// Maximum per-frame change in device units
    pub max_velocity: f64,

    /// Keys owned by other tools sharing the file
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dmx_api_url: "http://localhost:3030/api/dmx/batch".to_string(),
            use_osc: false,
            osc_host: "127.0.0.1".to_string(),
            osc_port: 9000,
            osc_pan_path: "/dmx/pan".to_string(),
            osc_tilt_path: "/dmx/tilt".to_string(),
            osc_iris_path: "/dmx/iris".to_string(),
            osc_zoom_path: "/dmx/zoom".to_string(),
            osc_focus_path: "/dmx/focus".to_string(),
            pan_channel: 1,
            tilt_channel: 2,
            iris_channel: 0,
            zoom_channel: 0,
            focus_channel: 0,
            pan_min: 0,
            pan_max: 255,
            tilt_min: 0,
            tilt_max: 255,
            iris_min: 0,
            iris_max: 255,
            zoom_min: 0,
            zoom_max: 255,
            focus_min: 0,
            focus_max: 255,
            pan_scale: 1.0,
            tilt_scale: 1.0,
            pan_dead_zone: 0.0,
            tilt_dead_zone: 0.0,
            pan_limit: 1.0,
            tilt_limit: 1.0,
            pan_gear: 1.0,
            tilt_gear: 1.0,
            pan_sensitivity: 1.0,
            tilt_sensitivity: 1.0,
            pan_offset: 128,
            tilt_offset: 128,
            iris_value: 128,
            zoom_value: 128,
            focus_value: 128,
            update_rate: 20,
            smoothing_factor: 0.85,
            max_velocity: 5.0,
            extra: Map::new(),
        }
    }
}

impl Config {
    /// Parse a configuration from JSON text
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if the text is not a JSON object of the
    /// expected shape.
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Parse a configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns [`Error::Yaml`] on malformed YAML.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse text in the format implied by `path`
    pub fn parse_for_path<P: AsRef<Path>>(path: P, content: &str) -> Result<Self> {
        if is_yaml(path.as_ref()) {
            Self::from_yaml_str(content)
        } else {
            Self::from_json_str(content)
        }
    }

    /// Load configuration from a JSON (or `.yaml`/`.yml`) file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be read, or a parse error
    /// for its format.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse_for_path(path, &content)
    }

    /// Save configuration to a JSON (or `.yaml`/`.yml`) file
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file cannot be written.
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = if is_yaml(path.as_ref()) {
            serde_yaml::to_string(self)?
        } else {
            serde_json::to_string_pretty(self)?
        };
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load a configuration, writing defaults when the file does not exist
    ///
    /// # Errors
    ///
    /// Fails like [`Config::from_file`] for an existing file, or with
    /// [`Error::Io`] if the defaults cannot be written.
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("Config file {} not found, creating it with defaults", path.display());
            let config = Self::default();
            config.to_file(path)?;
            return Ok(config);
        }
        Self::from_file(path)
    }

    /// 1-indexed channel of `axis` (0 = disabled)
    #[must_use]
    pub const fn channel(&self, axis: Axis) -> u16 {
        match axis {
            Axis::Pan => self.pan_channel,
            Axis::Tilt => self.tilt_channel,
            Axis::Iris => self.iris_channel,
            Axis::Zoom => self.zoom_channel,
            Axis::Focus => self.focus_channel,
        }
    }

    /// Whether `axis` has a channel assigned
    #[must_use]
    pub const fn is_enabled(&self, axis: Axis) -> bool {
        self.channel(axis) > 0
    }

    /// Device-unit bounds of `axis` as `(min, max)`
    #[must_use]
    pub const fn range(&self, axis: Axis) -> (i32, i32) {
        match axis {
            Axis::Pan => (self.pan_min, self.pan_max),
            Axis::Tilt => (self.tilt_min, self.tilt_max),
            Axis::Iris => (self.iris_min, self.iris_max),
            Axis::Zoom => (self.zoom_min, self.zoom_max),
            Axis::Focus => (self.focus_min, self.focus_max),
        }
    }

    /// OSC address path of `axis`
    #[must_use]
    pub fn osc_path(&self, axis: Axis) -> &str {
        match axis {
            Axis::Pan => &self.osc_pan_path,
            Axis::Tilt => &self.osc_tilt_path,
            Axis::Iris => &self.osc_iris_path,
            Axis::Zoom => &self.osc_zoom_path,
            Axis::Focus => &self.osc_focus_path,
        }
    }

    /// Fixed level of an optional axis, clamped to its bounds
    ///
    /// Motion axes have no fixed level and return `None`.
    #[must_use]
    pub fn fixed_value(&self, axis: Axis) -> Option<i32> {
        if axis.is_motion() {
            return None;
        }
        let value = match axis {
            Axis::Iris => self.iris_value,
            Axis::Zoom => self.zoom_value,
            _ => self.focus_value,
        };
        let (min, max) = self.range(axis);
        Some(value.max(min).min(max))
    }

    /// Rigging of a motion axis, `None` for the optional axes
    #[must_use]
    pub const fn rigging(&self, axis: Axis) -> Option<Rigging> {
        match axis {
            Axis::Pan => Some(self.pan_rigging()),
            Axis::Tilt => Some(self.tilt_rigging()),
            Axis::Iris | Axis::Zoom | Axis::Focus => None,
        }
    }

    /// Rigging of the pan axis
    #[must_use]
    pub const fn pan_rigging(&self) -> Rigging {
        Rigging {
            dead_zone: self.pan_dead_zone,
            scale: self.pan_scale,
            limit: self.pan_limit,
            gear: self.pan_gear,
            sensitivity: self.pan_sensitivity,
            offset: self.pan_offset,
            min: self.pan_min,
            max: self.pan_max,
        }
    }

    /// Rigging of the tilt axis
    #[must_use]
    pub const fn tilt_rigging(&self) -> Rigging {
        Rigging {
            dead_zone: self.tilt_dead_zone,
            scale: self.tilt_scale,
            limit: self.tilt_limit,
            gear: self.tilt_gear,
            sensitivity: self.tilt_sensitivity,
            offset: self.tilt_offset,
            min: self.tilt_min,
            max: self.tilt_max,
        }
    }

    /// Velocity limit in normalized units per frame
    #[must_use]
    pub fn normalized_max_velocity(&self) -> f64 {
        self.max_velocity / crate::constants::DMX_HALF_RANGE
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.update_rate == 0 {
            return Err(Error::ConfigError("Update rate must be greater than 0".to_string()));
        }
        if !(0.0..1.0).contains(&self.smoothing_factor) {
            return Err(Error::ConfigError(
                "Smoothing factor must be in [0.0, 1.0)".to_string(),
            ));
        }
        if !self.max_velocity.is_finite() || self.max_velocity < 0.0 {
            return Err(Error::ConfigError(
                "Max velocity must be a non-negative number".to_string(),
            ));
        }

        for (axis, rigging) in [(Axis::Pan, self.pan_rigging()), (Axis::Tilt, self.tilt_rigging())] {
            if !(0.0..1.0).contains(&rigging.dead_zone) {
                return Err(Error::ConfigError(format!("{axis} dead zone must be in [0.0, 1.0)")));
            }
            if !(0.0..=1.0).contains(&rigging.limit) {
                return Err(Error::ConfigError(format!("{axis} limit must be in [0.0, 1.0]")));
            }
            if !rigging.gear.is_finite() || rigging.gear < MIN_GEAR {
                return Err(Error::ConfigError(format!("{axis} gear must be at least {MIN_GEAR}")));
            }
            if !rigging.scale.is_finite() || !rigging.sensitivity.is_finite() {
                return Err(Error::ConfigError(format!(
                    "{axis} scale and sensitivity must be finite"
                )));
            }
        }

        for axis in Axis::ALL {
            let (min, max) = self.range(axis);
            if min >= max {
                return Err(Error::ConfigError(format!(
                    "{axis} min ({min}) must be less than max ({max})"
                )));
            }
            if self.channel(axis) > DMX_MAX_CHANNEL {
                return Err(Error::ConfigError(format!(
                    "{axis} channel {} exceeds {DMX_MAX_CHANNEL}",
                    self.channel(axis)
                )));
            }
        }

        if self.use_osc && self.osc_host.is_empty() {
            return Err(Error::ConfigError("OSC host must not be empty".to_string()));
        }
        if !self.use_osc && self.dmx_api_url.is_empty() {
            return Err(Error::ConfigError("DMX API URL must not be empty".to_string()));
        }

        Ok(())
    }

    /// Copy with every invariant forced into range
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let mut config = self.clone();
        config.update_rate = config.update_rate.max(1);
        config.smoothing_factor = finite_or(config.smoothing_factor, 0.0).clamp(0.0, MAX_SMOOTHING);
        config.max_velocity = finite_or(config.max_velocity, 0.0).max(0.0);

        config.pan_dead_zone = finite_or(config.pan_dead_zone, 0.0).clamp(0.0, MAX_DEAD_ZONE);
        config.tilt_dead_zone = finite_or(config.tilt_dead_zone, 0.0).clamp(0.0, MAX_DEAD_ZONE);
        config.pan_limit = finite_or(config.pan_limit, 1.0).clamp(0.0, 1.0);
        config.tilt_limit = finite_or(config.tilt_limit, 1.0).clamp(0.0, 1.0);
        config.pan_gear = finite_or(config.pan_gear, 1.0).max(MIN_GEAR);
        config.tilt_gear = finite_or(config.tilt_gear, 1.0).max(MIN_GEAR);
        config.pan_scale = finite_or(config.pan_scale, 1.0);
        config.tilt_scale = finite_or(config.tilt_scale, 1.0);
        config.pan_sensitivity = finite_or(config.pan_sensitivity, 1.0);
        config.tilt_sensitivity = finite_or(config.tilt_sensitivity, 1.0);

        for axis in Axis::ALL {
            let channel = config.channel(axis).min(DMX_MAX_CHANNEL);
            config.set_channel(axis, channel);
            let (min, max) = config.range(axis);
            config.set_min(axis, min);
            config.set_max(axis, max.max(config.range(axis).0 + 1));
        }

        config
    }

    pub(crate) fn set_channel(&mut self, axis: Axis, channel: u16) {
        match axis {
            Axis::Pan => self.pan_channel = channel,
            Axis::Tilt => self.tilt_channel = channel,
            Axis::Iris => self.iris_channel = channel,
            Axis::Zoom => self.zoom_channel = channel,
            Axis::Focus => self.focus_channel = channel,
        }
    }

    fn range_mut(&mut self, axis: Axis) -> (&mut i32, &mut i32) {
        match axis {
            Axis::Pan => (&mut self.pan_min, &mut self.pan_max),
            Axis::Tilt => (&mut self.tilt_min, &mut self.tilt_max),
            Axis::Iris => (&mut self.iris_min, &mut self.iris_max),
            Axis::Zoom => (&mut self.zoom_min, &mut self.zoom_max),
            Axis::Focus => (&mut self.focus_min, &mut self.focus_max),
        }
    }

    /// Set the lower bound, pushing the upper bound up to keep `min < max`
    pub(crate) fn set_min(&mut self, axis: Axis, value: i32) {
        let (min, max) = self.range_mut(axis);
        *min = value.clamp(0, DMX_MAX_VALUE - 1);
        if *min >= *max {
            *max = (*min + 1).min(DMX_MAX_VALUE);
        }
    }

    /// Set the upper bound, pulling the lower bound down to keep `min < max`
    pub(crate) fn set_max(&mut self, axis: Axis, value: i32) {
        let (min, max) = self.range_mut(axis);
        *max = value.clamp(1, DMX_MAX_VALUE);
        if *max <= *min {
            *min = (*max - 1).max(0);
        }
    }
}

fn finite_or(value: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_schema() {
        let config = Config::default();
        assert_eq!(config.pan_channel, 1);
        assert_eq!(config.tilt_channel, 2);
        assert_eq!(config.iris_channel, 0);
        assert_eq!(config.update_rate, 20);
        assert_eq!(config.smoothing_factor, 0.85);
        assert_eq!(config.max_velocity, 5.0);
        assert_eq!((config.pan_offset, config.tilt_offset), (128, 128));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = Config::from_json_str(r#"{"useOSC": true, "oscPort": 7700, "panChannel": 5}"#).unwrap();
        assert!(config.use_osc);
        assert_eq!(config.osc_port, 7700);
        assert_eq!(config.pan_channel, 5);
        assert_eq!(config.tilt_channel, 2);
        assert_eq!(config.osc_pan_path, "/dmx/pan");
    }

    #[test]
    fn test_serialized_keys_are_camel_case() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert!(json.get("useOSC").is_some());
        assert!(json.get("dmxApiUrl").is_some());
        assert!(json.get("panDeadZone").is_some());
        assert!(json.get("smoothingFactor").is_some());
        assert!(json.get("use_osc").is_none());
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let config =
            Config::from_json_str(r#"{"brightness": 1.5, "showPreview": false, "tiltGear": 2.0}"#).unwrap();
        assert_eq!(config.tilt_gear, 2.0);
        assert_eq!(config.extra.get("brightness"), Some(&Value::from(1.5)));

        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["showPreview"], Value::Bool(false));
    }

    #[test]
    fn test_optional_axes_carry_fixed_levels() {
        let config = Config { zoom_value: 300, ..Config::default() };
        for axis in Axis::OPTIONAL {
            assert!(!axis.is_motion());
            assert!(config.fixed_value(axis).is_some());
            assert!(config.rigging(axis).is_none());
        }
        assert_eq!(config.fixed_value(Axis::Zoom), Some(255));
        assert_eq!(config.fixed_value(Axis::Pan), None);
        assert!(Axis::Tilt.is_motion());
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(Config::from_json_str("{\"panChannel\": ").is_err());
        assert!(Config::from_json_str(r#"{"panChannel": "one"}"#).is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config { update_rate: 0, ..Config::default() };
        assert!(config.validate().is_err());

        let config = Config { pan_gear: 0.0, ..Config::default() };
        assert!(config.validate().is_err());

        let config = Config { tilt_dead_zone: 1.0, ..Config::default() };
        assert!(config.validate().is_err());

        let config = Config { pan_min: 200, pan_max: 100, ..Config::default() };
        assert!(config.validate().is_err());

        let config = Config { smoothing_factor: 1.0, ..Config::default() };
        assert!(config.validate().is_err());

        let config = Config { focus_channel: 513, ..Config::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_sanitized_repairs_invariants() {
        let config = Config {
            update_rate: 0,
            pan_gear: 0.0,
            tilt_dead_zone: 1.0,
            pan_limit: 3.0,
            smoothing_factor: f64::NAN,
            pan_min: 200,
            pan_max: 100,
            tilt_min: 255,
            tilt_max: 255,
            ..Config::default()
        }
        .sanitized();

        assert_eq!(config.update_rate, 1);
        assert_eq!(config.pan_gear, MIN_GEAR);
        assert_eq!(config.tilt_dead_zone, MAX_DEAD_ZONE);
        assert_eq!(config.pan_limit, 1.0);
        assert_eq!(config.smoothing_factor, 0.0);
        assert_eq!(config.range(Axis::Pan), (200, 201));
        assert_eq!(config.range(Axis::Tilt), (254, 255));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_fixed_value_clamped_to_range() {
        let config = Config { iris_value: 250, iris_max: 200, ..Config::default() };
        assert_eq!(config.fixed_value(Axis::Iris), Some(200));
        assert_eq!(config.fixed_value(Axis::Zoom), Some(128));
        assert_eq!(config.fixed_value(Axis::Pan), None);
    }

    #[test]
    fn test_normalized_max_velocity() {
        let config = Config { max_velocity: 127.0, ..Config::default() };
        assert!((config.normalized_max_velocity() - 1.0).abs() < 1e-12);
    }
}
