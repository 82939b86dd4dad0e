//! Tracing setup for hosts embedding the lobby, plus an in-memory capture
//! layer so tests can assert on what the lobby logged.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::field::{Field, Visit};
use tracing::subscriber::SetGlobalDefaultError;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::{EnvFilter, Layer};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,durak_lobby=debug";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines with thread ids and source locations
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

/// Installs the global fmt subscriber. `RUST_LOG` wins over `filter`.
pub fn init_logging(filter: Option<&str>, format: LogFormat) -> Result<(), SetGlobalDefaultError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter.unwrap_or(DEFAULT_FILTER)));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    match format {
        LogFormat::Json => {
            tracing::subscriber::set_global_default(builder.json().with_current_span(false).finish())
        }
        LogFormat::Pretty => tracing::subscriber::set_global_default(
            builder
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .finish(),
        ),
    }
}

/// One captured event.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub fields: BTreeMap<String, String>,
}

impl LogEntry {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Shared buffer of captured events; clones see the same entries.
#[derive(Debug, Clone, Default)]
pub struct TestLogSubscriber {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl TestLogSubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    /// Entries whose message contains `needle`.
    pub fn matching(&self, needle: &str) -> Vec<LogEntry> {
        self.lock()
            .iter()
            .filter(|e| e.message.contains(needle))
            .cloned()
            .collect()
    }

    pub fn at_level(&self, level: Level) -> Vec<LogEntry> {
        self.lock()
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// A layer feeding this buffer, for use with `Registry::default().with(..)`.
    pub fn layer(&self) -> CaptureLayer {
        CaptureLayer {
            sink: self.clone(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<LogEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

pub struct CaptureLayer {
    sink: TestLogSubscriber,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = FieldCollector::default();
        event.record(&mut fields);

        let meta = event.metadata();
        self.sink.lock().push(LogEntry {
            level: *meta.level(),
            target: meta.target().to_string(),
            message: fields.message,
            fields: fields.values,
        });
    }
}

#[derive(Default)]
struct FieldCollector {
    message: String,
    values: BTreeMap<String, String>,
}

impl FieldCollector {
    fn put(&mut self, field: &Field, value: String) {
        if field.name() == "message" {
            self.message = value;
        } else {
            self.values.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.put(field, value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.put(field, format!("{:?}", value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::{debug, error, info, warn};
    use tracing_subscriber::Registry;
    use tracing_subscriber::layer::SubscriberExt;

    fn captured(f: impl FnOnce()) -> TestLogSubscriber {
        let logs = TestLogSubscriber::new();
        let registry = Registry::default().with(logs.layer());
        tracing::subscriber::with_default(registry, f);
        logs
    }

    #[test]
    fn levels_and_messages_are_kept() {
        let logs = captured(|| {
            info!("room opened");
            warn!("move rejected");
            error!("lock poisoned");
        });

        let entries = logs.entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].message, "room opened");
        assert_eq!(logs.at_level(Level::WARN).len(), 1);
        assert_eq!(logs.at_level(Level::ERROR)[0].message, "lock poisoned");
    }

    #[test]
    fn string_fields_are_not_quoted() {
        let logs = captured(|| {
            info!(session_id = "abc123", version = 4u64, stage = ?Level::DEBUG, "move applied");
        });

        let entry = &logs.matching("move applied")[0];
        assert_eq!(entry.field("session_id"), Some("abc123"));
        assert_eq!(entry.field("version"), Some("4"));
        assert!(entry.field("stage").is_some());
        assert!(entry.field("missing").is_none());
    }

    #[test]
    fn clear_empties_every_clone() {
        let logs = captured(|| debug!("first"));
        let other = logs.clone();
        assert_eq!(other.entries().len(), 1);

        logs.clear();
        assert!(other.entries().is_empty());
    }

    #[test]
    fn global_subscriber_installs_once() {
        assert!(init_logging(Some("warn"), LogFormat::Json).is_ok());
        assert!(init_logging(None, LogFormat::Pretty).is_err());
    }
}
