//! Main application module: the frame-paced tracking loop.

use crate::{
    command::{CommandQueue, CommandSender},
    config::Config,
    error::{Error, Result},
    output::DispatchOutcome,
    pipeline::Pipeline,
    pose::{PoseSample, PoseSource},
    reload::ConfigWatcher,
};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Path of the shared configuration file
    pub config_path: PathBuf,
    /// Write the configuration back on shutdown
    pub persist_on_exit: bool,
    /// Force OSC (`true`) or HTTP (`false`) regardless of the file
    pub protocol_override: Option<bool>,
    /// Force an update rate regardless of the file
    pub rate_override: Option<u32>,
}

impl AppConfig {
    /// Settings for `config_path` with persistence on and no overrides
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            persist_on_exit: true,
            protocol_override: None,
            rate_override: None,
        }
    }

    /// Apply the command-line overrides to a loaded snapshot
    #[must_use]
    pub fn apply_overrides(&self, mut config: Config) -> Config {
        if let Some(use_osc) = self.protocol_override {
            config.use_osc = use_osc;
        }
        if let Some(rate) = self.rate_override {
            config.update_rate = rate.max(1);
        }
        config
    }
}

/// Counters collected over one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Samples processed by the pipeline
    pub frames: u64,
    /// Frames without a detected face
    pub empty_frames: u64,
    /// Samples rejected as malformed
    pub rejected: u64,
    /// Successful dispatches
    pub sent: u64,
    /// Failed dispatches
    pub failed: u64,
    /// Gestures recognized
    pub gestures: u64,
    /// Configuration replacements from the file or the command queue
    pub reloads: u64,
}

/// Tracking application wiring a pose source to the output pipeline
///
/// Two snapshots are kept: `stored` mirrors the file plus runtime commands
/// and is what gets persisted, `config` is `stored` with the command-line
/// overrides applied and is what the pipeline reads.
pub struct TrackerApp {
    settings: AppConfig,
    stored: Config,
    config: Config,
    /// The file could not be parsed at startup and must not be overwritten
    store_unreadable: bool,
    pipeline: Pipeline,
    watcher: ConfigWatcher,
    commands: CommandQueue,
    command_tx: CommandSender,
    source: Box<dyn PoseSource>,
    stop: Arc<AtomicBool>,
    stats: RunStats,
}

impl TrackerApp {
    /// Create a new tracking application
    ///
    /// Loads the configuration from `settings.config_path`, creating it with
    /// defaults if absent. An unparseable file falls back to defaults and is
    /// left untouched on exit until it parses again. An out-of-range one is
    /// repaired. Both cases are logged.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or created, or the output
    /// transports cannot be set up.
    pub fn new(settings: AppConfig, source: Box<dyn PoseSource>) -> Result<Self> {
        info!("Initializing DMX head tracker");

        let (stored, store_unreadable) = load_startup_config(&settings)?;
        let config = settings.apply_overrides(stored.clone());
        info!(
            "Output: {} at {} Hz",
            if config.use_osc {
                format!("OSC {}:{}", config.osc_host, config.osc_port)
            } else {
                format!("HTTP {}", config.dmx_api_url)
            },
            config.update_rate
        );

        let pipeline = Pipeline::new(&config)?;
        let mut watcher = ConfigWatcher::new(&settings.config_path);
        watcher.prime();
        let (command_tx, commands) = CommandQueue::channel();

        Ok(Self {
            settings,
            stored,
            config,
            store_unreadable,
            pipeline,
            watcher,
            commands,
            command_tx,
            source,
            stop: Arc::new(AtomicBool::new(false)),
            stats: RunStats::default(),
        })
    }

    /// Configuration the pipeline is running with
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Configuration that is written back on exit, without command-line overrides
    pub const fn stored_config(&self) -> &Config {
        &self.stored
    }

    /// Counters so far
    pub const fn stats(&self) -> RunStats {
        self.stats
    }

    /// Handle for submitting configuration changes from another thread
    pub fn command_sender(&self) -> CommandSender {
        self.command_tx.clone()
    }

    /// Flag that stops the loop before the next frame when set
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Run the main application loop
    ///
    /// Returns when the pose source closes, fails, or the stop flag is set.
    /// The configuration is persisted on the way out.
    pub fn run(&mut self) -> Result<RunStats> {
        info!("Entering tracking loop");

        while !self.stop.load(Ordering::SeqCst) {
            self.apply_pending_commands();
            self.poll_reload(Instant::now());

            match self.source.next_sample() {
                Ok(Some(sample)) => self.process(sample),
                Ok(None) => self.stats.empty_frames += 1,
                Err(Error::InputClosed(reason)) => {
                    info!("Pose input closed: {reason}");
                    break;
                }
                Err(e @ Error::InvalidInput(_)) => {
                    warn!("Skipping pose sample: {e}");
                    self.stats.rejected += 1;
                }
                Err(e) => {
                    error!("Pose input failed: {e}");
                    break;
                }
            }
        }

        if self.stop.load(Ordering::SeqCst) {
            info!("Stop requested");
        }
        self.shutdown()?;
        Ok(self.stats)
    }

    fn process(&mut self, sample: PoseSample) {
        match self.pipeline.process(sample, &self.config, Instant::now()) {
            Ok(report) => {
                self.stats.frames += 1;
                match report.dispatch {
                    DispatchOutcome::Sent => self.stats.sent += 1,
                    DispatchOutcome::Failed => self.stats.failed += 1,
                    DispatchOutcome::Skipped => {}
                }
                if report.gesture.is_some() {
                    self.stats.gestures += 1;
                }
            }
            Err(e) => {
                warn!("Skipping pose sample: {e}");
                self.stats.rejected += 1;
            }
        }
    }

    /// Apply queued commands as one snapshot swap
    ///
    /// A command that changes the protocol or update rate takes precedence
    /// over the matching command-line override for the rest of the run.
    fn apply_pending_commands(&mut self) {
        let (stored, applied) = self.commands.drain(&self.stored);
        if applied == 0 {
            return;
        }
        debug!("Applied {applied} config command(s)");
        if stored.use_osc != self.stored.use_osc {
            self.settings.protocol_override = None;
        }
        if stored.update_rate != self.stored.update_rate {
            self.settings.rate_override = None;
        }
        self.set_stored(stored);
    }

    fn poll_reload(&mut self, now: Instant) {
        if let Some(stored) = self.watcher.poll(now) {
            if self.store_unreadable {
                info!("Config file {} is readable again", self.settings.config_path.display());
                self.store_unreadable = false;
            }
            self.set_stored(stored);
        }
    }

    fn set_stored(&mut self, stored: Config) {
        self.config = self.settings.apply_overrides(stored.clone());
        self.stored = stored;
        self.stats.reloads += 1;
    }

    fn shutdown(&mut self) -> Result<()> {
        info!(
            "Tracker shutting down after {} frames ({} sent, {} failed, {} gestures)",
            self.stats.frames, self.stats.sent, self.stats.failed, self.stats.gestures
        );
        if !self.settings.persist_on_exit {
            return Ok(());
        }
        if self.store_unreadable {
            warn!(
                "Not saving config: {} could not be parsed at startup",
                self.settings.config_path.display()
            );
            return Ok(());
        }
        self.stored.to_file(&self.settings.config_path)?;
        info!("Config saved to {}", self.settings.config_path.display());
        Ok(())
    }
}

/// Load the startup snapshot, flagging a file that could not be parsed
fn load_startup_config(settings: &AppConfig) -> Result<(Config, bool)> {
    let path = &settings.config_path;
    let config = match Config::load_or_create(path) {
        Ok(config) => {
            info!("Loaded config from {}", path.display());
            config
        }
        Err(e @ (Error::Json(_) | Error::Yaml(_))) => {
            warn!("Failed to parse config file {}: {e}. Using defaults.", path.display());
            return Ok((Config::default(), true));
        }
        Err(e) => return Err(e),
    };

    if let Err(e) = config.validate() {
        warn!("{e}; repairing out-of-range values");
        return Ok((config.sanitized(), false));
    }
    Ok((config, false))
}
