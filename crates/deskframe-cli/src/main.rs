//! Drives the deskframe engine through a synthetic capture pipeline.
//!
//! Usage: `deskframe-cli [config.json]`. Statistics are printed as JSON once
//! every frame has been processed.

mod config;
mod painter;
mod pipeline;
mod stats;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::PipelineConfig;
use crate::stats::PipelineStats;

/// Initialize logging.
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,deskframe=debug,deskframe_cli=debug")),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let config = match std::env::args().nth(1) {
        Some(path) => PipelineConfig::load(Path::new(&path))?,
        None => PipelineConfig::default(),
    };
    info!(
        size = %config.frame_size,
        frames = config.frame_count,
        crop = %config.crop,
        rotation = config.rotation.degrees(),
        "Starting pipeline"
    );

    let stats = Arc::new(PipelineStats::new());
    pipeline::run(&config, Arc::clone(&stats))?;

    let snapshot = stats.snapshot();
    let report =
        serde_json::to_string_pretty(&snapshot).context("Failed to serialize statistics")?;
    println!("{report}");
    Ok(())
}
