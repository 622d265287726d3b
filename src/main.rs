//! factstash binary entrypoint kept minimal. The runtime lives in `app`.

use std::fmt;
use std::sync::{Arc, OnceLock};

use clap::Parser;

use factstash::api::{FactsApi, LiveApi};
use factstash::app::Runtime;
use factstash::config::Settings;
use factstash::engine::SearchEngine;
use factstash::storage::{FileStore, KvStore, MemoryStore};
use factstash::util;

struct StashTimer;

impl tracing_subscriber::fmt::time::FormatTime for StashTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> fmt::Result {
        let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string();
        w.write_str(&ts)
    }
}

static LOG_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Caching search client for the chucknorris.io facts API.
#[derive(Parser)]
#[command(name = "factstash", version, about)]
struct Cli {
    /// One-shot search term; starts the interactive prompt when omitted
    query: Option<String>,
    /// Fetch one random fact from the given category and exit
    #[arg(long, value_name = "CATEGORY", conflicts_with = "query")]
    random: Option<String>,
    /// Override the state directory used for history and cache files
    #[arg(long, value_name = "DIR")]
    data_dir: Option<std::path::PathBuf>,
    /// Keep all state in memory; nothing is persisted
    #[arg(long)]
    ephemeral: bool,
}

/// Initialize tracing to `<config-dir>/logs/factstash.log`, falling back to
/// stderr when the log file cannot be opened.
fn init_logging() {
    let mut log_path = util::logs_dir();
    log_path.push("factstash.log");
    match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        Ok(file) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(file);
            let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(non_blocking)
                .with_timer(StashTimer)
                .init();
            let _ = LOG_GUARD.set(guard);
            tracing::info!(path = %log_path.display(), "logging initialized");
        }
        Err(e) => {
            let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_ansi(true)
                .with_writer(std::io::stderr)
                .with_timer(StashTimer)
                .init();
            tracing::warn!(error = %e, "failed to open log file; using stderr");
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging();

    let settings = Settings::load();
    let api = LiveApi::new(settings.api_base_url.clone());
    let store: Arc<dyn KvStore> = if cli.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(FileStore::new(
            cli.data_dir.unwrap_or_else(util::state_dir),
        ))
    };
    tracing::info!(
        ephemeral = cli.ephemeral,
        base_url = %settings.api_base_url,
        "factstash starting"
    );

    if let Some(category) = cli.random {
        match api.random_by_category(&category).await {
            Ok(fact) => println!("{}", fact.value),
            Err(e) => {
                tracing::error!(error = %e, category, "random fact failed");
                eprintln!("random fact failed: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    let engine = SearchEngine::with_epoch_seeds();
    let runtime = Runtime::new(engine, api, store);
    let ok = match cli.query {
        Some(query) => runtime.run_once(query).await,
        None => {
            runtime.run_interactive().await;
            true
        }
    };
    tracing::info!("factstash exited");
    if !ok {
        std::process::exit(1);
    }
}
