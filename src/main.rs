//! Head-tracked DMX fixture controller.
//!
//! Reads normalized `pan tilt` samples (one per line) from stdin or a file
//! and drives a moving light over OSC or the HTTP batch API.

use anyhow::{Context, Result};
use clap::Parser;
use dmx_head_tracker::{
    app::{AppConfig, TrackerApp},
    config::Config,
    constants::DEFAULT_CONFIG_PATH,
    pose::{LinePoseSource, PoseSource},
};
use log::{info, warn};
use std::fs::File;
use std::io::BufReader;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (JSON, or YAML by extension)
    #[arg(short = 'C', long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Pose sample input file, or - for stdin
    #[arg(short, long, default_value = "-")]
    input: String,

    /// Send over OSC regardless of the config file
    #[arg(long, conflicts_with = "http")]
    osc: bool,

    /// Send over the HTTP batch API regardless of the config file
    #[arg(long)]
    http: bool,

    /// Override the update rate in Hz
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    rate: Option<u32>,

    /// Do not write the configuration back on exit
    #[arg(long)]
    no_persist: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    /// Print the default configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

impl Args {
    fn protocol_override(&self) -> Option<bool> {
        match (self.osc, self.http) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

fn open_input(input: &str) -> Result<Box<dyn PoseSource>> {
    if input == "-" {
        info!("Reading pose samples from stdin");
        return Ok(Box::new(LinePoseSource::new(std::io::stdin().lock())));
    }
    info!("Reading pose samples from {input}");
    let file = File::open(input).with_context(|| format!("failed to open pose input {input}"))?;
    Ok(Box::new(LinePoseSource::new(BufReader::new(file))))
}

/// Stop the loop on Ctrl+C so the configuration is saved; a second Ctrl+C
/// exits immediately (the loop may be blocked waiting for input)
fn install_stop_handler(stop: Arc<AtomicBool>) {
    if let Err(err) = ctrlc::set_handler(move || {
        if stop.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }
        info!("Stop signal received, finishing current frame");
    }) {
        warn!("Failed to install Ctrl+C handler: {err}");
    }
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&Config::default())?);
        return Ok(());
    }

    // Initialize logger
    if args.debug {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("debug"));
    } else {
        env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    }

    info!("DMX Head Tracker (built for {})", env!("BUILD_TARGET"));

    let settings = AppConfig {
        config_path: args.config.clone().into(),
        persist_on_exit: !args.no_persist,
        protocol_override: args.protocol_override(),
        rate_override: args.rate,
    };

    let source = open_input(&args.input)?;
    let mut app = TrackerApp::new(settings, source).context("failed to start tracker")?;
    install_stop_handler(app.stop_handle());
    let stats = app.run()?;
    info!(
        "Processed {} frames, {} without a face, {} rejected",
        stats.frames, stats.empty_frames, stats.rejected
    );

    Ok(())
}
