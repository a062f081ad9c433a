//! Head-tracked control of motorized lighting fixtures over DMX.
//!
//! This library turns a stream of normalized head orientation samples into
//! pan/tilt commands for a moving light:
//! - velocity-limited smoothing of the raw pose
//! - a rigging transform (dead zone, gear, scale, limit, offset) into device units
//! - sliding-window gesture recognition (nodding, shaking, looking away)
//! - rate-limited output over OSC/UDP or as a JSON batch over HTTP
//!
//! The processing pipeline for each frame is:
//! 1. Smooth the pose sample
//! 2. Feed the smoothed pose to the gesture detector
//! 3. Map the smoothed pose to device values
//! 4. Dispatch the values if the update interval has elapsed
//!
//! # Examples
//!
//! ## Mapping a Pose
//!
//! ```
//! use dmx_head_tracker::{config::Config, rigging};
//!
//! let config = Config::default();
//! assert_eq!(rigging::map(1.0, 0.0, &config), (255, 128));
//! assert_eq!(rigging::map(-1.0, 0.0, &config), (1, 128));
//! ```
//!
//! ## Using the Smoother
//!
//! ```
//! use dmx_head_tracker::filters::{PoseFilter, VelocityFilter};
//!
//! let mut filter = VelocityFilter::new(0.85, 5.0 / 127.0);
//! let (pan, tilt) = filter.apply(0.5, -0.2);
//! assert!(pan > 0.0 && pan < 0.5);
//! assert!(tilt < 0.0 && tilt > -0.2);
//!
//! filter.reset();
//! ```
//!
//! ## Building a DMX Frame
//!
//! ```
//! use dmx_head_tracker::{config::Config, dmx::build_frame};
//!
//! let frame = build_frame(200, 130, &Config::default());
//! assert_eq!(frame.to_json_body()?, r#"{"0":200,"1":130}"#);
//! # Ok::<(), dmx_head_tracker::Error>(())
//! ```
//!
//! ## Complete Pipeline Example
//!
//! ```no_run
//! use dmx_head_tracker::{config::Config, pipeline::Pipeline, pose::PoseSample};
//! use std::time::Instant;
//!
//! # fn main() -> dmx_head_tracker::Result<()> {
//! let config = Config::from_file("face-tracker-config.json")?;
//! let mut pipeline = Pipeline::new(&config)?;
//!
//! let report = pipeline.process(PoseSample::new(0.2, -0.1), &config, Instant::now())?;
//! println!("pan={} tilt={} {:?}", report.pan_value, report.tilt_value, report.dispatch);
//! if let Some(gesture) = report.gesture {
//!     println!("gesture: {gesture}");
//! }
//! # Ok(())
//! # }
//! ```

/// Pose samples and their sources
pub mod pose;

/// Signal filtering for smoothing pose samples
pub mod filters;

/// Rigging transform into device units
pub mod rigging;

/// Gesture recognition over recent pose history
pub mod gesture;

/// DMX frame construction
pub mod dmx;

/// OSC message encoding and UDP transport
pub mod osc;

/// HTTP batch transport
pub mod http;

/// Rate-limited output dispatch
pub mod output;

/// Per-frame processing pipeline
pub mod pipeline;

/// Utility functions for casting and hashing
pub mod utils;

/// Error types and result handling
pub mod error;

/// Main application module
pub mod app;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

/// Configuration change commands
pub mod command;

/// Configuration hot reload
pub mod reload;

pub use error::{Error, Result};
