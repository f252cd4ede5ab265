//! Writes statistics as `{PREFIX} {NAME}={VALUE}` lines to a configured writer.

use std::fmt::Display;
use std::io::Write;
use std::io::stdout;
use std::sync::Mutex;
use std::sync::OnceLock;

use convert_case::Case;
use convert_case::Casing;

struct StatisticSink {
    prefix: &'static str,
    /// Written after a block of statistics.
    postfix: Option<&'static str>,
    casing: Option<Case>,
    writer: Box<dyn Write + Send + Sync>,
}

impl StatisticSink {
    fn write_statistic(&mut self, name: impl Display, value: impl Display) {
        let name = match self.casing {
            Some(casing) => name.to_string().to_case(casing),
            None => name.to_string(),
        };
        let _ = writeln!(self.writer, "{} {name}={value}", self.prefix);
    }
}

static STATISTIC_SINK: OnceLock<Mutex<StatisticSink>> = OnceLock::new();

fn with_sink(action: impl FnOnce(&mut StatisticSink)) {
    if let Some(sink) = STATISTIC_SINK.get() {
        if let Ok(mut sink) = sink.lock() {
            action(&mut sink);
        }
    }
}

/// Configures the logging of statistics; only the first call has an effect.
///
/// Statistics are written to `writer`, or to stdout if no writer is given. Until this function is
/// called, no statistics are written at all.
pub fn configure_statistic_logging(
    prefix: &'static str,
    postfix: Option<&'static str>,
    casing: Option<Case>,
    writer: Option<Box<dyn Write + Send + Sync>>,
) {
    let _ = STATISTIC_SINK.get_or_init(|| {
        Mutex::new(StatisticSink {
            prefix,
            postfix,
            casing,
            writer: writer.unwrap_or_else(|| Box::new(stdout())),
        })
    });
}

/// Logs the statistic `name` with `value`.
pub fn log_statistic(name: impl Display, value: impl Display) {
    with_sink(|sink| sink.write_statistic(name, value));
}

/// Writes the closing line of a block of statistics, if one is configured.
pub fn log_statistic_postfix() {
    with_sink(|sink| {
        if let Some(postfix) = sink.postfix {
            let _ = writeln!(sink.writer, "{postfix}");
        }
    });
}

/// Whether statistic logging has been configured.
pub fn should_log_statistics() -> bool {
    STATISTIC_SINK.get().is_some()
}
