//! File-backed tracing setup.
//!
//! The terminal belongs to the UI, so logs go to
//! `~/.voyagemart/logs/voyagemart.log`. `RUST_LOG` overrides the filter.

use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::{Mutex, Once};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_FILTER: &str = "info,voyagemart=debug";

static INIT: Once = Once::new();

/// Install the global subscriber. Later calls are ignored.
pub fn init_logging(log_path: &Path) -> Result<()> {
    if let Some(parent) = log_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        let subscriber = tracing_subscriber::registry().with(filter).with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false),
        );

        if let Err(e) = subscriber.try_init() {
            eprintln!("[voyagemart] Failed to install log subscriber: {e}");
        }
    });

    Ok(())
}
