//! Console log format
//!
//! Every line is `YYYY-MM-DD HH:MM:SS <message>` in local time. Level and
//! target are left out so the output reads like a plain activity log.

use tracing::Level;
use tracing_subscriber::fmt::{self, MakeWriter, time::ChronoLocal};

/// Timestamp format used at the start of every log line
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Build the subscriber used by the daemon
///
/// The writer is a parameter so tests can capture output.
pub fn subscriber<W>(level: Level, writer: W) -> impl tracing::Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    fmt::Subscriber::builder()
        .with_max_level(level)
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
        .with_target(false)
        .with_level(false)
        .with_ansi(false)
        .with_writer(writer)
        .finish()
}

/// Parse a log level name (`trace`, `debug`, `info`, `warn`, `error`)
pub fn parse_level(name: &str) -> Option<Level> {
    name.trim().parse().ok()
}
