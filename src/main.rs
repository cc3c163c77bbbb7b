mod app;
mod config;
mod controller;
mod grid;
mod model;
mod source;
mod topology;

use anyhow::{bail, Context, Result};
use app::App;
use clap::Parser;
use config::Config;
use log::info;
use model::GridGeometry;
use source::SourceSpec;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use topology::Topology;

#[derive(Debug, Parser)]
#[command(
    name = "corepaint",
    version,
    about = "Paints an image onto the per-core CPU utilization display"
)]
struct Opts {
    /// Path to an image file, or a nonzero process id whose main window is
    /// captured live instead.
    source: String,

    /// Number of columns in the target utilization display's core view.
    width: u32,

    /// Shades of grey mapped onto the busy/sleep duty cycle.
    #[clap(long)]
    duty_levels: Option<u32>,

    /// Length of one busy/sleep cycle in milliseconds.
    #[clap(long)]
    control_period_ms: Option<u64>,

    /// Interval between image refreshes in milliseconds.
    #[clap(long)]
    refresh_period_ms: Option<u64>,

    /// Optional JSON config file; command-line flags take precedence.
    #[clap(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let opts = Opts::parse();

    let mut config = match &opts.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    if let Some(levels) = opts.duty_levels {
        config.duty_levels = levels;
    }
    if let Some(ms) = opts.control_period_ms {
        config.control_period_ms = ms;
    }
    if let Some(ms) = opts.refresh_period_ms {
        config.refresh_period_ms = ms;
    }
    config.validate()?;
    if opts.width == 0 {
        bail!("width must be at least 1");
    }

    let topology = Topology::enumerate().context("failed to enumerate processor topology")?;
    if topology.is_empty() {
        bail!("no logical processors reported by the host");
    }
    topology.log_summary();

    let geometry = GridGeometry::new(topology.len(), opts.width);
    let spec = SourceSpec::parse(&opts.source);
    let source = source::open(&spec, &geometry)
        .with_context(|| format!("failed to open image source {}", opts.source))?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::Relaxed);
    })
    .context("failed to set Ctrl-C handler")?;

    info!(
        "painting {} with {} grey levels, {}ms cycle, {}ms refresh",
        opts.source, config.duty_levels, config.control_period_ms, config.refresh_period_ms
    );
    App::new(&config, &topology, geometry, source, shutdown).run();
    Ok(())
}
