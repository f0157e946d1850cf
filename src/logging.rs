//! Logging for the reconciler: human-readable console output plus
//! daily-rotated JSON files under `logs/`. Batch progress lands at
//! `info`; per-record match decisions and store lookups at `debug`.

use std::fs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs the global subscriber. `RUST_LOG` extends the default
/// `gig_reconciler=info` directive, so `RUST_LOG=gig_reconciler=debug`
/// surfaces individual match decisions without touching the code.
pub fn init_logging() {
    let _ = fs::create_dir_all("logs");

    let file_appender = tracing_appender::rolling::daily("logs", "reconciler.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("gig_reconciler=info".parse().unwrap()))
        .with(fmt::layer().json().with_writer(file_writer))
        .with(fmt::layer().with_writer(std::io::stdout))
        .init();

    // The writer guard must outlive the process for the file logs to flush.
    std::mem::forget(guard);
}
