//! Rate-limited dispatch of device values over OSC or HTTP.

use crate::{
    config::{Axis, Config},
    dmx::{self, DmxFrame},
    http::HttpBatchClient,
    osc::{OscMessage, OscSender},
    Result,
};
use log::{debug, warn};
use std::time::{Duration, Instant};

/// Result of one dispatcher tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Update interval has not elapsed yet
    Skipped,
    /// Values delivered (or nothing to deliver)
    Sent,
    /// Delivery attempted and failed; retried on the next interval
    Failed,
}

impl DispatchOutcome {
    /// Whether a send was attempted this tick
    #[must_use]
    pub const fn attempted(self) -> bool {
        !matches!(self, Self::Skipped)
    }
}

/// Minimum spacing between dispatches for `update_rate` Hz
#[must_use]
pub fn send_interval(update_rate: u32) -> Duration {
    Duration::from_millis(u64::from(1000 / update_rate.max(1)))
}

/// Whether enough time has passed since `last_sent_at` to send again
#[must_use]
pub fn should_send(now: Instant, last_sent_at: Option<Instant>, update_rate: u32) -> bool {
    last_sent_at.map_or(true, |last| {
        now.saturating_duration_since(last) >= send_interval(update_rate)
    })
}

/// Sends pan/tilt device values to the fixture at the configured rate
#[derive(Debug)]
pub struct OutputDispatcher {
    osc: OscSender,
    http: HttpBatchClient,
    last_sent_at: Option<Instant>,
}

impl OutputDispatcher {
    /// Create a dispatcher that sends on its first tick
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(HttpBatchClient::new()?))
    }

    /// Create a dispatcher around an existing HTTP client
    #[must_use]
    pub const fn with_client(http: HttpBatchClient) -> Self {
        Self {
            osc: OscSender::new(),
            http,
            last_sent_at: None,
        }
    }

    /// Time of the last attempted send
    #[must_use]
    pub const fn last_sent_at(&self) -> Option<Instant> {
        self.last_sent_at
    }

    /// Send `pan_value`/`tilt_value` if the update interval has elapsed
    ///
    /// The send time is recorded whether or not delivery succeeds, so a
    /// failing endpoint is retried at the normal update cadence.
    pub fn tick(&mut self, now: Instant, pan_value: i32, tilt_value: i32, config: &Config) -> DispatchOutcome {
        if !should_send(now, self.last_sent_at, config.update_rate) {
            return DispatchOutcome::Skipped;
        }

        debug!(
            "Dispatch pan={pan_value} tilt={tilt_value} via {}",
            if config.use_osc { "OSC" } else { "HTTP" }
        );
        let delivered = if config.use_osc {
            self.send_osc(pan_value, tilt_value, config)
        } else {
            self.send_http(pan_value, tilt_value, config)
        };
        self.last_sent_at = Some(now);

        if delivered {
            DispatchOutcome::Sent
        } else {
            DispatchOutcome::Failed
        }
    }

    /// Reset the rate limiter so the next tick sends immediately
    pub fn reset(&mut self) {
        self.last_sent_at = None;
    }

    fn send_osc(&mut self, pan_value: i32, tilt_value: i32, config: &Config) -> bool {
        // OSC addresses by path, so pan and tilt go out even without a channel
        let pan_ok = self.send_axis(Axis::Pan, pan_value, config);
        let tilt_ok = self.send_axis(Axis::Tilt, tilt_value, config);

        // optional axis failures are logged but do not fail the tick
        for axis in Axis::OPTIONAL {
            if let Some(value) = dmx::axis_value(axis, pan_value, tilt_value, config) {
                self.send_axis(axis, value, config);
            }
        }

        pan_ok && tilt_ok
    }

    fn send_axis(&mut self, axis: Axis, value: i32, config: &Config) -> bool {
        let message = OscMessage::new(config.osc_path(axis), normalize(value));
        match self.osc.send(&config.osc_host, config.osc_port, &message) {
            Ok(()) => true,
            Err(e) => {
                warn!("OSC {axis} send failed: {e}");
                false
            }
        }
    }

    fn send_http(&self, pan_value: i32, tilt_value: i32, config: &Config) -> bool {
        let frame: DmxFrame = dmx::build_frame(pan_value, tilt_value, config);
        if frame.is_empty() {
            debug!("No DMX channels enabled, nothing to send");
            return true;
        }
        match self.http.post_frame(&config.dmx_api_url, &frame) {
            Ok(()) => true,
            Err(e) => {
                warn!("DMX batch to {} failed: {e}", config.dmx_api_url);
                false
            }
        }
    }
}

/// Device value scaled to the OSC float range [0, 1]
fn normalize(value: i32) -> f32 {
    (f64::from(value.clamp(0, crate::constants::DMX_MAX_VALUE)) / 255.0) as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::osc;
    use std::net::UdpSocket;

    fn silent_config() -> Config {
        // no channels: HTTP path succeeds without touching the network
        Config {
            pan_channel: 0,
            tilt_channel: 0,
            ..Config::default()
        }
    }

    #[test]
    fn test_send_interval() {
        assert_eq!(send_interval(20), Duration::from_millis(50));
        assert_eq!(send_interval(1), Duration::from_millis(1000));
        assert_eq!(send_interval(0), Duration::from_millis(1000));
        assert_eq!(send_interval(3), Duration::from_millis(333));
    }

    #[test]
    fn test_rate_limit_at_20hz() {
        let config = silent_config();
        let mut dispatcher = OutputDispatcher::new().unwrap();
        let start = Instant::now();

        assert_eq!(dispatcher.tick(start, 128, 128, &config), DispatchOutcome::Sent);
        assert_eq!(
            dispatcher.tick(start + Duration::from_millis(30), 128, 128, &config),
            DispatchOutcome::Skipped
        );
        assert_eq!(
            dispatcher.tick(start + Duration::from_millis(60), 128, 128, &config),
            DispatchOutcome::Sent
        );
        assert_eq!(dispatcher.last_sent_at(), Some(start + Duration::from_millis(60)));
    }

    #[test]
    fn test_should_send_boundary() {
        let start = Instant::now();
        assert!(should_send(start, None, 20));
        assert!(!should_send(start + Duration::from_millis(49), Some(start), 20));
        assert!(should_send(start + Duration::from_millis(50), Some(start), 20));
    }

    #[test]
    fn test_failed_send_still_advances_timer() {
        let config = Config {
            dmx_api_url: "http://127.0.0.1:9/unreachable".to_string(),
            ..Config::default()
        };
        let http = HttpBatchClient::with_timeout(Duration::from_millis(200)).unwrap();
        let mut dispatcher = OutputDispatcher::with_client(http);
        let start = Instant::now();

        assert_eq!(dispatcher.tick(start, 128, 128, &config), DispatchOutcome::Failed);
        assert_eq!(dispatcher.last_sent_at(), Some(start));
        assert_eq!(
            dispatcher.tick(start + Duration::from_millis(10), 128, 128, &config),
            DispatchOutcome::Skipped
        );
    }

    #[test]
    fn test_osc_sends_normalized_values_per_axis() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        receiver.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let config = Config {
            use_osc: true,
            osc_port: receiver.local_addr().unwrap().port(),
            iris_channel: 3,
            iris_value: 51,
            ..Config::default()
        };

        let mut dispatcher = OutputDispatcher::new().unwrap();
        assert_eq!(dispatcher.tick(Instant::now(), 255, 0, &config), DispatchOutcome::Sent);

        let mut received = Vec::new();
        let mut buf = [0u8; 64];
        for _ in 0..3 {
            let (len, _) = receiver.recv_from(&mut buf).unwrap();
            received.push(osc::decode(&buf[..len]).unwrap());
        }
        assert_eq!(received[0], OscMessage::new("/dmx/pan", 1.0));
        assert_eq!(received[1], OscMessage::new("/dmx/tilt", 0.0));
        assert_eq!(received[2], OscMessage::new("/dmx/iris", 0.2));
    }

    #[test]
    fn test_outcome_attempted() {
        assert!(!DispatchOutcome::Skipped.attempted());
        assert!(DispatchOutcome::Sent.attempted());
        assert!(DispatchOutcome::Failed.attempted());
    }
}
