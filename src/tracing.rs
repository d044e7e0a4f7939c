//! Logging setup
//!
//! Console output is filtered by `RUST_LOG` and defaults to `warn`, e.g.
//! `RUST_LOG=panel_stack::manager=debug`. When a logs directory is given,
//! everything at debug and above is also written to a daily rotated
//! `panel-stack.log` there, off the calling thread.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE: &str = "panel-stack.log";
const DEFAULT_CONSOLE_FILTER: &str = "warn";
const FILE_FILTER: &str = "debug";

/// Install the global subscriber
///
/// Keep the returned guard alive for as long as file output is wanted;
/// dropping it flushes and stops the writer thread. Only the first call in
/// a process installs anything.
pub fn init(logs_dir: Option<&Path>) -> Option<WorkerGuard> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_CONSOLE_FILTER));
    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_filter(console_filter);

    let (file, guard) = match logs_dir {
        Some(dir) => {
            let (writer, guard) = tracing_appender::non_blocking(rolling::daily(dir, LOG_FILE));
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_line_number(true)
                .with_filter(EnvFilter::new(FILE_FILTER));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    if tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .is_err()
    {
        ::tracing::debug!("global subscriber already installed");
    }
    guard
}
