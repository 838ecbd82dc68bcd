use anyhow::{Context, Result, bail};
use attendance_sync::domain::entities::{AttendanceCapture, BatchSyncResult};
use attendance_sync::domain::value_objects::AttendanceRecordId;
use attendance_sync::shared::logging;
use attendance_sync::{AppConfig, AppState, OfflineAttendanceQueue};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "attendance-sync")]
#[command(about = "Offline attendance queue with retrying sync", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// SQLite database holding the queue
    #[arg(long, env = "ATTENDANCE_SYNC_DATABASE_URL")]
    database_url: Option<String>,

    /// Base URL of the attendance API
    #[arg(long, env = "ATTENDANCE_SYNC_API_BASE_URL")]
    api_base_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, env = "JSON_LOGS")]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Queue a scanned QR code
    Capture {
        /// Raw QR payload as scanned
        #[arg(long)]
        qr_payload: String,
        #[arg(long)]
        session_id: String,
        /// Student UUID the operator expects; must match the payload
        #[arg(long)]
        student_uuid: Option<String>,
        /// Defaults to now (RFC 3339)
        #[arg(long)]
        captured_at: Option<DateTime<Utc>>,
        /// Push the queue right after capturing
        #[arg(long)]
        sync: bool,
    },
    /// Push pending records once
    Sync,
    /// Print queue status
    Status,
    /// List dead-lettered records
    DeadLetters,
    /// Move a dead-lettered record back to pending and try it
    Retry { id: String },
    /// Drop dead-lettered records
    Discard {
        id: Option<String>,
        #[arg(long, conflicts_with = "id")]
        all: bool,
    },
    /// Write the diagnostics report
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Keep syncing in the background until Ctrl+C
    Run {
        /// Seconds between connection probes
        #[arg(long, default_value_t = 15)]
        refresh_every: u64,
        /// Seconds between queue snapshots
        #[arg(long, default_value_t = 30)]
        persist_every: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(Some(&cli.log_level), cli.json_logs);

    let mut config = AppConfig::from_env();
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }
    if let Some(base) = cli.api_base_url {
        config.network.api_base_url = base.trim_end_matches('/').to_string();
    }

    info!("Starting attendance-sync v{}", env!("CARGO_PKG_VERSION"));
    let state = AppState::initialize(&config)
        .await
        .context("failed to initialize attendance sync")?;

    let outcome = run_command(&state, cli.command).await;
    if let Err(err) = state.shutdown().await {
        error!("Failed to save queue on shutdown: {}", err);
    }
    outcome
}

async fn run_command(state: &AppState, command: Commands) -> Result<()> {
    let queue = &state.queue;
    match command {
        Commands::Capture {
            qr_payload,
            session_id,
            student_uuid,
            captured_at,
            sync,
        } => {
            // The immediate push would not outlive the process; sync explicitly instead.
            queue.monitor().set_online_status(false);
            let capture = AttendanceCapture {
                qr_payload,
                session_id,
                captured_at: captured_at.unwrap_or_else(Utc::now),
                student_uuid,
            };
            let id = queue.enqueue(capture).await?;
            state.persist().await?;
            println!("{id}");

            if sync {
                print_json(&sync_now(queue).await?)?;
            }
        }
        Commands::Sync => print_json(&sync_now(queue).await?)?,
        Commands::Status => print_json(&queue.status().await)?,
        Commands::DeadLetters => {
            let report = queue.export_diagnostics().await;
            print_json(&report.dead_lettered)?;
        }
        Commands::Retry { id } => {
            let id = parse_id(&id)?;
            queue.refresh_connection().await;
            if !queue.retry_dead_lettered(&id).await {
                bail!("{id} is not dead-lettered or is too old to retry");
            }
            print_json(&queue.status().await)?;
        }
        Commands::Discard { id, all } => {
            if all {
                let removed = queue.clear_dead_lettered().await;
                info!("Discarded {} dead-lettered records", removed);
            } else {
                let Some(id) = id else {
                    bail!("pass a record id or --all");
                };
                let id = parse_id(&id)?;
                if !queue.discard_dead_lettered(&id).await {
                    bail!("{id} is not dead-lettered");
                }
            }
        }
        Commands::Export { output } => {
            queue.refresh_connection().await;
            let json = queue.export_diagnostics().await.to_json_pretty()?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    info!("Diagnostics written to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        Commands::Run {
            refresh_every,
            persist_every,
        } => run_daemon(state, refresh_every, persist_every).await?,
    }
    Ok(())
}

async fn run_daemon(state: &AppState, refresh_every: u64, persist_every: u64) -> Result<()> {
    let queue = &state.queue;
    queue.refresh_connection().await;
    if !queue.start().await {
        warn!("Auto-sync is disabled; only connection changes will trigger a sync");
    }

    let mut refresh = tokio::time::interval(Duration::from_secs(refresh_every.max(1)));
    let mut persist = tokio::time::interval(Duration::from_secs(persist_every.max(1)));
    info!("Attendance sync is running. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal?;
                break;
            }
            _ = refresh.tick() => {
                queue.refresh_connection().await;
            }
            _ = persist.tick() => {
                if let Err(err) = state.persist().await {
                    error!("Failed to save queue: {}", err);
                }
            }
        }
    }

    info!("Shutting down attendance sync...");
    Ok(())
}

async fn sync_now(queue: &Arc<OfflineAttendanceQueue>) -> Result<BatchSyncResult> {
    let (_, handle) = queue.refresh_connection().await;
    let result = match handle {
        Some(handle) => handle.await?,
        None => queue.sync_batch().await,
    };
    Ok(result)
}

fn parse_id(raw: &str) -> Result<AttendanceRecordId> {
    AttendanceRecordId::parse(raw).map_err(anyhow::Error::msg)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
