//! Head pose samples and the sources that supply them.
//!
//! Face detection and pose estimation happen upstream; this crate only
//! consumes the normalized `(pan, tilt)` pair produced per video frame.

use crate::{Error, Result};
use std::fmt;
use std::io::BufRead;

/// Normalized head orientation, nominally in [-1, 1] on both axes
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PoseSample {
    /// Horizontal rotation, negative is left
    pub pan: f64,
    /// Vertical rotation, negative is up
    pub tilt: f64,
}

impl PoseSample {
    /// Sample from normalized pan and tilt
    #[must_use]
    pub const fn new(pan: f64, tilt: f64) -> Self {
        Self { pan, tilt }
    }

    /// Whether both components are finite numbers
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.pan.is_finite() && self.tilt.is_finite()
    }
}

impl fmt::Display for PoseSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pan={:.3} tilt={:.3}", self.pan, self.tilt)
    }
}

impl std::str::FromStr for PoseSample {
    type Err = Error;

    /// Parse `pan tilt` or `pan,tilt`
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty());

        let (Some(pan), Some(tilt), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(Error::InvalidInput(format!("expected 'pan tilt', got {s:?}")));
        };

        let pan: f64 = pan
            .parse()
            .map_err(|e| Error::InvalidInput(format!("invalid pan {pan:?}: {e}")))?;
        let tilt: f64 = tilt
            .parse()
            .map_err(|e| Error::InvalidInput(format!("invalid tilt {tilt:?}: {e}")))?;

        let sample = Self::new(pan, tilt);
        if !sample.is_finite() {
            return Err(Error::InvalidInput(format!("non-finite pose {s:?}")));
        }
        Ok(sample)
    }
}

/// Producer of one pose observation per frame
pub trait PoseSource {
    /// Next frame's observation
    ///
    /// `Ok(None)` means no face was found this frame.
    ///
    /// # Errors
    ///
    /// [`Error::InputClosed`] signals that the upstream detector is gone and
    /// the control loop should shut down. Other errors concern a single
    /// frame and may be skipped.
    fn next_sample(&mut self) -> Result<Option<PoseSample>>;
}

/// Reads newline-delimited samples from any buffered reader
///
/// Each line is `pan tilt` or `pan,tilt`. An empty line or `-` is a frame
/// without a face. Lines starting with `#` are ignored.
#[derive(Debug)]
pub struct LinePoseSource<R> {
    reader: R,
    line: String,
    line_number: usize,
}

impl<R: BufRead> LinePoseSource<R> {
    /// Read samples line by line from `reader`
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_number: 0,
        }
    }

    /// Number of lines consumed so far
    pub const fn line_number(&self) -> usize {
        self.line_number
    }
}

impl<R: BufRead> PoseSource for LinePoseSource<R> {
    fn next_sample(&mut self) -> Result<Option<PoseSample>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Err(Error::InputClosed(format!(
                    "pose input ended after {} lines",
                    self.line_number
                )));
            }
            self.line_number += 1;

            let line = self.line.trim();
            if line.starts_with('#') {
                continue;
            }
            if line.is_empty() || line == "-" {
                return Ok(None);
            }
            return line
                .parse()
                .map(Some)
                .map_err(|e| Error::InvalidInput(format!("line {}: {e}", self.line_number)));
        }
    }
}

impl<S: PoseSource + ?Sized> PoseSource for Box<S> {
    fn next_sample(&mut self) -> Result<Option<PoseSample>> {
        (**self).next_sample()
    }
}
