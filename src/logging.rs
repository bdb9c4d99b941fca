//! Tracing subscriber setup.
//!
//! The console is the user interface (banner, prompt, report on stdout), so
//! stderr logging stays quiet unless asked: it defaults to `warn`. The
//! optional JSON log file records the full stage timeline and defaults to
//! `info`.

use std::path::Path;
use std::sync::Once;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, Layer};

const DEFAULT_STDERR_LEVEL: &str = "warn";
const DEFAULT_FILE_LEVEL: &str = "info";
const ENV_VAR_NAME: &str = "JOBSHIFT_LOG";

static INIT: Once = Once::new();

/// Initialize the global tracing subscriber. Only the first call has effect.
///
/// Filter precedence for each layer: `JOBSHIFT_LOG` env var > `log_level`
/// argument > layer default (`warn` for stderr, `info` for the file).
pub fn init(log_level: Option<&str>, log_file: Option<&Path>) -> anyhow::Result<()> {
    let mut init_err: Option<anyhow::Error> = None;

    INIT.call_once(|| {
        if let Err(e) = try_init(log_level, log_file) {
            init_err = Some(e);
        }
    });

    match init_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn try_init(log_level: Option<&str>, log_file: Option<&Path>) -> anyhow::Result<()> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(true)
        .compact()
        .with_filter(build_filter(log_level, DEFAULT_STDERR_LEVEL));

    let file_layer = match log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(file)
                    .with_target(false)
                    .with_ansi(false)
                    .json()
                    .with_filter(build_filter(log_level, DEFAULT_FILE_LEVEL)),
            )
        }
        None => None,
    };

    let result: Result<(), TryInitError> = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    result.map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
}

fn build_filter(log_level: Option<&str>, default: &str) -> EnvFilter {
    EnvFilter::try_from_env(ENV_VAR_NAME)
        .unwrap_or_else(|_| EnvFilter::new(log_level.unwrap_or(default)))
}

fn open_log_file(path: &Path) -> anyhow::Result<std::fs::File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "failed to create log file directory {}: {e}",
                parent.display()
            )
        })?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| anyhow::anyhow!("failed to open log file {}: {e}", path.display()))
}
