//! persona-books server and offline scoring CLI.
//!
//! Usage:
//!   persona-books                      # same as `serve`
//!   persona-books serve --bind 0.0.0.0:8000 --db ./users.db
//!   persona-books score '{"q1": "Analyze it logically"}'
//!   persona-books score @answers.json

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use persona_books::{
    build_state,
    config::{Config, RuntimeConfig},
    http::start_http_server,
    quiz::Scorer,
};

#[derive(Parser)]
#[command(name = "persona-books")]
#[command(about = "Personality quiz scoring and book recommendations", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Override PERSONA_HTTP_BIND
        #[arg(long)]
        bind: Option<std::net::SocketAddr>,
        /// Override PERSONA_DB_PATH
        #[arg(long)]
        db: Option<PathBuf>,
    },
    /// Score an answer set and print the result as JSON
    Score {
        /// JSON object of answers (bare or wrapped in {"answers": ...}), or @file
        answers: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Score { answers }) => score(&answers),
        Some(Commands::Serve { bind, db }) => serve(bind, db).await,
        None => serve(None, None).await,
    }
}

async fn serve(bind: Option<std::net::SocketAddr>, db: Option<PathBuf>) -> Result<()> {
    // .env may carry RUST_LOG, so load it before the subscriber
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(RuntimeConfig::default().log_level)),
        )
        .init();

    let mut config = Config::load()?;
    if let Some(bind) = bind {
        config.runtime.http_bind = bind;
    }
    if let Some(db) = db {
        config.runtime.database_path = db;
    }

    tracing::info!("Starting persona-books");
    let state = build_state(&config)?;

    start_http_server(
        state,
        config.runtime.http_bind,
        Duration::from_millis(config.runtime.http_request_timeout_ms),
    )
    .await
}

fn score(arg: &str) -> Result<()> {
    let raw = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read answers from {}", path))?,
        None => arg.to_string(),
    };

    let mut value: Value = serde_json::from_str(&raw).context("Answers must be a JSON object")?;
    if let Some(inner) = value.get_mut("answers") {
        value = inner.take();
    }
    let answers: HashMap<String, Value> =
        serde_json::from_value(value).context("Answers must be a JSON object")?;

    let scorer = Scorer::default();
    let result = scorer.score(
        answers
            .iter()
            .filter_map(|(q, a)| a.as_str().map(|a| (q.as_str(), a))),
    );
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
