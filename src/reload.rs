//! Polling hot reload of the configuration file.

use crate::{config::Config, constants::CONFIG_POLL_INTERVAL, utils::content_hash, Result};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Watches a config file and yields a fresh snapshot when its content changes
#[derive(Debug)]
pub struct ConfigWatcher {
    path: PathBuf,
    interval: Duration,
    last_check: Option<Instant>,
    last_hash: Option<u64>,
}

impl ConfigWatcher {
    /// Watch `path`, checking at most every 500 ms
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self::with_interval(path, CONFIG_POLL_INTERVAL)
    }

    /// Watch `path` with a custom poll interval
    pub fn with_interval<P: AsRef<Path>>(path: P, interval: Duration) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            interval,
            last_check: None,
            last_hash: None,
        }
    }

    /// Treat `content` as already loaded so it does not trigger a reload
    pub fn mark_loaded(&mut self, content: &str) {
        self.last_hash = Some(content_hash(content));
    }

    /// Record the current file content as loaded, if it is readable
    pub fn prime(&mut self) {
        if let Ok(content) = std::fs::read_to_string(&self.path) {
            self.mark_loaded(&content);
        }
    }

    /// Check the file if the poll interval has elapsed
    ///
    /// Returns the new snapshot when the content changed and parsed into a
    /// valid configuration. Broken content is logged once and remembered, so
    /// it is not parsed again until the file changes. A missing file is
    /// ignored.
    pub fn poll(&mut self, now: Instant) -> Option<Config> {
        if let Some(last) = self.last_check {
            if now.saturating_duration_since(last) < self.interval {
                return None;
            }
        }
        self.last_check = Some(now);

        let content = std::fs::read_to_string(&self.path).ok()?;
        let hash = content_hash(&content);
        if self.last_hash == Some(hash) {
            return None;
        }
        self.last_hash = Some(hash);

        match self.parse(&content) {
            Ok(config) => {
                info!("Config reloaded from {}", self.path.display());
                Some(config)
            }
            Err(e) => {
                warn!("Ignoring config change in {}: {e}", self.path.display());
                None
            }
        }
    }

    fn parse(&self, content: &str) -> Result<Config> {
        let config = Config::parse_for_path(&self.path, content)?;
        config.validate()?;
        Ok(config)
    }
}
