//! Log sink boundary.
//!
//! The client reports what it is about to send through an injected
//! [`LogSink`]. The default sink is a no-op; [`TracingLogSink`] forwards
//! to the `tracing` macros for applications that already run a subscriber.

use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

/// Destination for diagnostic log lines.
///
/// `context` is a structured map carrying whatever the message refers to
/// (headers, encoded body, and so on).
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, message: &str, context: &Value);
}

/// Default sink. Drops everything.
pub struct NoopLogSink;

impl LogSink for NoopLogSink {
    fn log(&self, _level: LogLevel, _message: &str, _context: &Value) {}
}

/// Returns the default no-op sink.
pub fn noop_sink() -> Arc<dyn LogSink> {
    Arc::new(NoopLogSink)
}

/// Sink that forwards to the `tracing` macros.
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, level: LogLevel, message: &str, context: &Value) {
        match level {
            LogLevel::Debug => tracing::debug!(context = %context, "{}", message),
            LogLevel::Info => tracing::info!(context = %context, "{}", message),
            LogLevel::Warning => tracing::warn!(context = %context, "{}", message),
            LogLevel::Error => tracing::error!(context = %context, "{}", message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noop_sink_accepts_anything() {
        let sink = noop_sink();
        sink.log(LogLevel::Debug, "message", &Value::Null);
        sink.log(LogLevel::Error, "message", &Value::Bool(true));
    }
}
