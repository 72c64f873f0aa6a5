mod engine;
mod models;
mod storage;
mod types;

use std::io::{stderr, stdout, Write};
use std::path::Path;
use std::process::exit;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

use crate::engine::IngestEngine;
use crate::models::{ImportResult, UploadRequest};
use crate::storage::MemoryStore;
use crate::types::BusinessId;

#[tokio::main]
async fn main() -> Result<()> {
    //NOTE: If this grows more flags it should move to the clap crate; two
    //      positional arguments do not justify the dependency yet.
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: revenue-ingest [input].csv [business_id] [log_level:optional]");
        eprintln!("Available log levels: error, warn, info, debug, trace (default: error)");
        exit(1);
    }

    let path = Path::new(&args[1]);
    let business_id: BusinessId = args[2].parse()?;
    let log_level = args.get(3)
        .map(|level| parse_log_level(level)).unwrap_or(LevelFilter::ERROR);

    setup_logging(log_level);

    let store = Arc::new(MemoryStore::new());
    let engine = IngestEngine::new(store.clone());
    let request = UploadRequest::from_path(path, business_id)?;

    let timer = Instant::now();
    let result = engine.ingest(request).await?;
    let duration = timer.elapsed();

    info!(
        "Imported {} of {} data rows for business [{business_id}] in {duration:?}",
        result.imported_count,
        result.imported_count + result.skipped_count
    );

    write_result_to_stdout(&result)?;

    Ok(())
}

fn parse_log_level(level: &str) -> LevelFilter {
    match level.to_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        _ => {
            eprintln!("Invalid log level '{}', defaulting to 'error'", level);
            LevelFilter::ERROR
        }
    }
}

fn setup_logging(level: LevelFilter) {
    //NOTE: The import report goes to stdout, so logging has to stay on stderr
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry()
        .with(terminal_log)
        .init();
}

fn write_result_to_stdout(result: &ImportResult) -> Result<()> {
    let mut output = stdout().lock();

    serde_json::to_writer_pretty(&mut output, result)?;
    writeln!(output)?;
    output.flush()?;

    Ok(())
}
