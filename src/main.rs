//! Crosswalk Signal - presence-aware pedestrian signal controller
//!
//! Serves the detection ingress, status queries and the observer WebSocket
//! for one crossing.
//!
//! # Usage
//!
//! ```bash
//! # Defaults: D = 10 s, listen on 0.0.0.0:3000
//! cargo run --release
//!
//! # Short phases, JSON logs
//! ./crosswalk-signal --phase-duration 5 --log-format json
//!
//! # Feed detections from a camera pipeline
//! camera-detector | ./detection-feed --server http://localhost:3000
//! ```
//!
//! # Environment Variables
//!
//! - `CROSSWALK_CONFIG`: Path to a TOML config file (default: ./crosswalk.toml)
//! - `CROSSWALK_SERVER_ADDR`: Bind address, overrides the config file
//! - `PORT`: Bind `0.0.0.0:$PORT` when no address is given
//! - `CROSSWALK_CORS_ORIGINS`: Comma-separated browser origins allowed to call the API
//! - `RUST_LOG`: Logging level (default: info)

use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::Router;
use clap::Parser;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crosswalk_signal::api::{create_app, ApiState};
use crosswalk_signal::config::CrosswalkConfig;
use crosswalk_signal::controller::{ControllerOptions, SignalActor};
use crosswalk_signal::logging::{self, LogFormat};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "crosswalk-signal")]
#[command(about = "Presence-aware pedestrian signal controller")]
#[command(version)]
struct CliArgs {
    /// Path to a TOML config file; failure to load it is fatal
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the server address (default: "0.0.0.0:3000")
    #[arg(short, long)]
    addr: Option<String>,

    /// Override the GO / STOP phase duration, in clock ticks
    #[arg(long, value_name = "TICKS")]
    phase_duration: Option<u32>,

    /// Log output format
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

// ============================================================================
// Task Names for Supervisor Logging
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum TaskName {
    HttpServer,
    SignalController,
}

impl std::fmt::Display for TaskName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskName::HttpServer => write!(f, "HttpServer"),
            TaskName::SignalController => write!(f, "SignalController"),
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Resolve the effective configuration.
///
/// Precedence, highest first: CLI flags, `CROSSWALK_SERVER_ADDR`, `PORT`,
/// the TOML file, built-in defaults.
fn load_config(args: &CliArgs) -> Result<CrosswalkConfig> {
    let mut config = match &args.config {
        Some(path) => CrosswalkConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => CrosswalkConfig::load(),
    };

    config.apply_env_overrides();

    if let Some(addr) = &args.addr {
        config.server.addr.clone_from(addr);
    }
    if let Some(duration) = args.phase_duration {
        config.signal.phase_duration_secs = duration;
    }
    if let Some(format) = args.log_format {
        config.logging.format = format;
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

// ============================================================================
// Tasks
// ============================================================================

/// Spawn the signal controller actor into the JoinSet.
fn spawn_signal_controller(task_set: &mut JoinSet<Result<TaskName>>, actor: SignalActor) {
    task_set.spawn(async move {
        info!("[SignalController] Task starting");
        actor.run().await;
        Ok(TaskName::SignalController)
    });
}

/// Spawn the HTTP server task into the JoinSet.
fn spawn_http_server(
    task_set: &mut JoinSet<Result<TaskName>>,
    listener: tokio::net::TcpListener,
    app: Router,
    cancel_token: CancellationToken,
) {
    task_set.spawn(async move {
        info!("[HttpServer] Task starting");

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel_token.cancelled().await;
                info!("[HttpServer] Received shutdown signal");
            })
            .await;

        match result {
            Ok(()) => {
                info!("[HttpServer] Graceful shutdown complete");
                Ok(TaskName::HttpServer)
            }
            Err(e) => {
                error!("[HttpServer] Server error: {}", e);
                Err(anyhow::anyhow!("HTTP server error: {}", e))
            }
        }
    });
}

/// Run the supervisor loop: monitor tasks, cancel everything on failure.
///
/// Either task finishing early takes the other one down with it; a signal
/// controller without its server, or the reverse, is not useful.
async fn run_supervisor(
    task_set: &mut JoinSet<Result<TaskName>>,
    cancel_token: CancellationToken,
) -> Result<()> {
    info!("Supervisor: All tasks spawned, monitoring...");

    let outcome = loop {
        tokio::select! {
            () = cancel_token.cancelled() => {
                info!("Supervisor: Shutdown signal received");
                break Ok(());
            }
            result = task_set.join_next() => {
                match result {
                    Some(Ok(Ok(task_name))) => {
                        info!("Supervisor: Task {} completed, shutting down", task_name);
                        cancel_token.cancel();
                        break Ok(());
                    }
                    Some(Ok(Err(e))) => {
                        error!("Supervisor: Task failed with error: {}", e);
                        cancel_token.cancel();
                        break Err(e);
                    }
                    Some(Err(e)) => {
                        error!("Supervisor: Task panicked: {}", e);
                        cancel_token.cancel();
                        break Err(anyhow::anyhow!("Task panicked: {}", e));
                    }
                    None => {
                        info!("Supervisor: All tasks completed");
                        break Ok(());
                    }
                }
            }
        }
    };

    // Let the remaining tasks observe the cancellation and finish.
    while let Some(result) = task_set.join_next().await {
        match result {
            Ok(Ok(task_name)) => info!("Supervisor: Task {} stopped", task_name),
            Ok(Err(e)) => error!("Supervisor: Task failed during shutdown: {}", e),
            Err(e) => error!("Supervisor: Task panicked during shutdown: {}", e),
        }
    }

    outcome
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    let config = logging::with_startup_logging(args.log_format.unwrap_or_default(), || {
        load_config(&args)
    })?;
    logging::init_logging(config.logging.format);

    match config.to_toml() {
        Ok(effective) => debug!(config = %effective, "Effective configuration"),
        Err(e) => warn!(error = %e, "Could not render effective configuration"),
    }

    info!(
        phase_duration = config.signal.phase_duration_secs,
        tick_ms = config.signal.tick_interval_ms,
        addr = %config.server.addr,
        "Crosswalk signal controller starting"
    );

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let listener = tokio::net::TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.addr))?;
    info!(addr = %config.server.addr, "HTTP server listening");

    let (actor, handle) = SignalActor::new(&ControllerOptions::from(&config), cancel_token.clone());
    let app = create_app(ApiState::new(handle));

    let mut task_set: JoinSet<Result<TaskName>> = JoinSet::new();
    spawn_signal_controller(&mut task_set, actor);
    spawn_http_server(&mut task_set, listener, app, cancel_token.clone());

    run_supervisor(&mut task_set, cancel_token).await?;

    info!("Crosswalk signal controller shutdown complete");
    Ok(())
}
