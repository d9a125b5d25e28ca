//! Logging for mediatree.
//!
//! Every command appends `tracing` output to one log file in the user cache
//! directory; `mediatree status` prints where it is. `MEDIATREE_LOG` takes
//! an `EnvFilter` directive (default `info`) and, when set, also mirrors the
//! output to stderr.
//!
//! ```bash
//! # Which records a scan added
//! MEDIATREE_LOG=debug mediatree scan ~/photos
//!
//! # How the tree re-rooted after a move or copy
//! MEDIATREE_LOG=mediatree::session=debug,mediatree::tree=debug \
//!     mediatree cp ~/photos/2024 --to ~/backup
//!
//! # Follow a long `mv` from another terminal
//! tail -f "$(mediatree status | sed -n 's/^  Log: //p')"
//! ```

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::config::project_dirs;

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "MEDIATREE_LOG";

const LOG_FILENAME: &str = "mediatree.log";
const DEFAULT_FILTER: &str = "info";

/// The shared log file, e.g. `~/.cache/mediatree/mediatree.log` on Linux
pub fn log_file_path() -> Result<PathBuf> {
    Ok(project_dirs()?.cache_dir().join(LOG_FILENAME))
}

/// Install the global subscriber and return the guard of the file writer.
/// Buffered lines are flushed when the guard drops, so `main` holds it.
pub fn init_logging() -> Result<WorkerGuard> {
    let log_file = log_file_path()?;
    if let Some(dir) = log_file.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create cache directory: {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
        .with_context(|| format!("Failed to open log file: {}", log_file.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);

    let directive = std::env::var(LOG_ENV).ok();
    let stderr_layer = directive.is_some().then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
    });

    tracing_subscriber::registry()
        .with(EnvFilter::new(directive.as_deref().unwrap_or(DEFAULT_FILTER)))
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_span_events(FmtSpan::CLOSE),
        )
        .with(stderr_layer)
        .try_init()
        .context("Failed to set global tracing subscriber")?;

    Ok(guard)
}
