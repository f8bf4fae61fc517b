//! Process-wide `tracing` setup.
//!
//! Every component logs to its own daily file under `~/.cdda-lsp/logs`
//! (`lsp.log.<date>`, `cli.log.<date>`). The level comes from `RUST_LOG` and
//! defaults to `info`.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const LOG_DIR: &str = ".cdda-lsp/logs";

/// Directory holding the rolling log files. Falls back to the working
/// directory when there is no home directory.
pub fn log_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(LOG_DIR)
}

fn env_filter() -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy()
}

/// Install the global subscriber for `component`.
///
/// Passing `to_stderr` adds a colored stderr layer. The LSP server leaves it
/// off: its client owns stdio.
///
/// Keep the returned guard alive for the life of the process; dropping it
/// stops the background writer and loses buffered lines.
pub fn init_logging(component: &str, to_stderr: bool) -> WorkerGuard {
    let dir = log_dir();
    if let Err(e) = std::fs::create_dir_all(&dir) {
        eprintln!("Cannot create log directory {}: {}", dir.display(), e);
    }

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&dir, format!("{component}.log")));

    let stderr_layer = to_stderr.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(stderr_layer)
        .init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_dir_is_per_user() {
        let dir = log_dir();
        assert!(dir.ends_with(LOG_DIR));
        if let Some(home) = dirs::home_dir() {
            assert!(dir.starts_with(home));
        }
    }
}
