use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use glimpse_core::EmissionThrottle;
use glimpse_sensor::{SyntheticCamera, SyntheticExtractor};
use glimpse_store::ProfileStore;
use tracing_subscriber::EnvFilter;

mod config;
mod pipeline;

use config::{Config, PLACEHOLDER_SALT};
use pipeline::Pipeline;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();
    tracing::info!(
        db = %config.db_path.display(),
        cooldown_secs = config.cooldown_secs,
        subjects = config.synth_subjects,
        "glimpsed starting"
    );

    if config.id_salt == PLACEHOLDER_SALT {
        tracing::warn!("GLIMPSE_ID_SALT is the placeholder value; identifiers are guessable");
    }

    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating data directory {}", parent.display()))?;
    }

    // Fail fast: a missing store or capture device is an operator problem,
    // not something to retry in a loop.
    let store = ProfileStore::open(&config.db_path)
        .with_context(|| format!("opening store at {}", config.db_path.display()))?;
    let camera =
        SyntheticCamera::open(config.synth_drop_every as u32).context("opening capture device")?;
    let extractor = SyntheticExtractor::new(config.synth_subjects, config.synth_seed);
    let throttle = EmissionThrottle::new(config.cooldown_secs);

    let mut pipeline = Pipeline::new(
        camera,
        extractor,
        store,
        throttle,
        config.id_salt,
        Duration::from_millis(config.frame_interval_ms),
        Duration::from_millis(config.read_backoff_ms),
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();
    let producer = std::thread::Builder::new()
        .name("glimpse-producer".into())
        .spawn(move || pipeline.run(&flag))
        .context("spawning producer thread")?;

    wait_for_signal().await?;
    tracing::info!("shutdown requested; letting current iteration finish");
    shutdown.store(true, Ordering::SeqCst);

    if producer.join().is_err() {
        tracing::error!("producer thread panicked");
    }
    tracing::info!("glimpsed stopped");
    Ok(())
}

/// Resolve on SIGINT or SIGTERM.
async fn wait_for_signal() -> Result<()> {
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        .context("installing SIGTERM handler")?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result.context("waiting for ctrl-c")?,
        _ = sigterm.recv() => {}
    }
    Ok(())
}
