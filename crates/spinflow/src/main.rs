//! SpinFlow - audio-reactive record player with a plant-watering log
//!
//! The binary wires the animator loops to the audio capture backend, starts
//! the web server (plant-log endpoints plus the visual-frame WebSocket), and
//! runs until interrupted.

mod config;
mod logging_setup;
mod runtime;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::broadcast;
use tracing::{info, warn};

use spinflow_control::{AppState, PlantStore, WebServer};
use spinflow_core::VolumeAnimator;

use crate::config::AppConfig;
use crate::runtime::AnimatorRuntime;

#[derive(Parser, Debug)]
#[command(name = "spinflow", version, about = "Audio-reactive record player and plant log")]
struct Cli {
    /// Path to the TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run without attaching an audio capture source
    #[arg(long)]
    no_audio: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    let _log_guard = logging_setup::init(&config.log)?;
    info!("spinflow starting");

    let database_url = config
        .resolved_database_url()
        .context("DATABASE_URL is not set (environment or config file)")?;
    let store = PlantStore::connect(&database_url)
        .await
        .context("failed to connect to Postgres")?;

    let (frames_tx, _) = broadcast::channel(64);
    let mut animator = AnimatorRuntime::new(
        VolumeAnimator::new(config.animator.clone()),
        config.audio.frame_rate,
        frames_tx.clone(),
    );

    if cli.no_audio {
        info!("audio capture disabled by flag");
    } else {
        attach_capture(&mut animator, &config).await;
    }

    let state = AppState {
        store,
        frames: frames_tx,
    };
    let server = WebServer::new(config.server.clone(), state);

    tokio::select! {
        result = server.run() => {
            result.context("web server failed")?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    animator.detach().await;
    Ok(())
}

/// Best-effort capture startup: a headless or deviceless host still gets the
/// web endpoints, just no moving record.
#[cfg(feature = "audio")]
async fn attach_capture(animator: &mut AnimatorRuntime, config: &AppConfig) {
    use spinflow_core::{ByteSpectrumAnalyzer, CaptureBackend};

    let analyzer = match ByteSpectrumAnalyzer::new(config.audio.analyzer.clone()) {
        Ok(analyzer) => analyzer,
        Err(e) => {
            warn!("audio analyzer unavailable: {e}");
            return;
        }
    };

    match CaptureBackend::open(config.audio.device.as_deref()) {
        Ok(backend) => {
            animator
                .attach_source(Box::new(backend.into_source(analyzer)))
                .await;
        }
        Err(e) => warn!("audio capture unavailable: {e}"),
    }
}

#[cfg(not(feature = "audio"))]
async fn attach_capture(_animator: &mut AnimatorRuntime, _config: &AppConfig) {
    warn!("built without the audio feature; no capture source attached");
}
