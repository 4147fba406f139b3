use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use reelstats_core::records::NormalizedBatches;
use reelstats_db::{DbConfig, LoadSession};
use reelstats_pipeline::{LoadError, LoadOrchestrator};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Env var naming the batches file when no path argument is given.
const BATCHES_PATH_VAR: &str = "LOAD_BATCHES_PATH";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "reelstats_loader=info,reelstats_pipeline=info,reelstats_db=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run().await {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(summary) => {
            println!("{summary}");
            ExitCode::FAILURE
        }
    }
}

/// Load the batches file and run it, producing the JSON summary printed on
/// stdout for either outcome.
async fn run() -> Result<serde_json::Value, serde_json::Value> {
    let setup = async {
        let config = DbConfig::from_env().context("Invalid database configuration")?;
        let path = batches_path()?;
        let batches = read_batches(&path).await?;
        tracing::info!(
            path = %path.display(),
            records = batches.total_records(),
            "Batches loaded"
        );

        if migrations_enabled() {
            apply_migrations(&config).await?;
        }
        anyhow::Ok((config, batches))
    };
    let (config, batches) = setup.await.map_err(|e| {
        tracing::error!(error = %format!("{e:#}"), "Loader setup failed");
        json!({ "error": format!("{e:#}") })
    })?;

    match LoadOrchestrator::run(&config, &batches).await {
        Ok(result) => Ok(json!({
            "message": "Load completed successfully",
            "movies_processed": batches.movies.len(),
            "result": result,
        })),
        Err(e) => Err(failure_summary(&e)),
    }
}

fn failure_summary(err: &LoadError) -> serde_json::Value {
    json!({
        "error": err.to_string(),
        "stage": err.stage(),
        "last_completed": err.last_completed(),
    })
}

fn batches_path() -> anyhow::Result<PathBuf> {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os(BATCHES_PATH_VAR).map(PathBuf::from))
        .with_context(|| {
            format!("Usage: reelstats-loader <batches.json> (or set {BATCHES_PATH_VAR})")
        })
}

async fn read_batches(path: &Path) -> anyhow::Result<NormalizedBatches> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn migrations_enabled() -> bool {
    std::env::var("RUN_MIGRATIONS")
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

async fn apply_migrations(config: &DbConfig) -> anyhow::Result<()> {
    let mut session = LoadSession::open(config)
        .await
        .context("Failed to connect for migrations")?;
    let outcome = match session.connection() {
        Ok(conn) => reelstats_db::run_migrations(conn)
            .await
            .context("Failed to run database migrations"),
        Err(e) => Err(e.into()),
    };
    session.close().await;
    outcome?;
    tracing::info!("Database migrations applied");
    Ok(())
}
