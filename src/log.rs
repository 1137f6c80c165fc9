//! Structured event output.
//!
//! Every event the client produces goes to `tracing`. When a [`LogSink`] is
//! configured the same event, with the same context, is also handed to it.

use crate::config::Environment;
use crate::error::Context;
use serde_json::Value;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::Level;

/// Receives leveled, structured log records.
///
/// # Examples
///
/// ```
/// use amwal::log::LogSink;
/// use amwal::Context;
/// use std::sync::Mutex;
/// use tracing::Level;
///
/// #[derive(Default)]
/// struct Collect(Mutex<Vec<String>>);
///
/// impl LogSink for Collect {
///     fn record(&self, level: Level, message: &str, _context: &Context) {
///         self.0.lock().unwrap().push(format!("{} {}", level, message));
///     }
/// }
/// ```
pub trait LogSink: Send + Sync {
    fn record(&self, level: Level, message: &str, context: &Context);
}

/// Appends one line per record to a file:
/// `[YYYY-mm-dd HH:MM:SS] LEVEL: message {context}`.
#[derive(Debug, Clone)]
pub struct FileLogSink {
    path: PathBuf,
}

impl FileLogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn format_line(level: Level, message: &str, context: &Context) -> String {
        format!(
            "[{}] {}: {} {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            level,
            message,
            Value::Object(context.clone())
        )
    }
}

impl LogSink for FileLogSink {
    fn record(&self, level: Level, message: &str, context: &Context) {
        let line = Self::format_line(level, message, context);
        let written = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()));

        if let Err(e) = written {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to append to log file");
        }
    }
}

/// Emits client events, tagging each with the environment.
#[derive(Clone)]
pub(crate) struct EventLog {
    environment: Environment,
    sink: Option<Arc<dyn LogSink>>,
}

impl EventLog {
    pub(crate) fn new(environment: Environment, sink: Option<Arc<dyn LogSink>>) -> Self {
        Self { environment, sink }
    }

    pub(crate) fn emit(&self, level: Level, message: &str, mut context: Context) {
        context.insert(
            "environment".to_string(),
            Value::from(self.environment.as_str()),
        );

        let fields = Value::Object(context.clone());
        match level {
            Level::ERROR => tracing::error!(context = %fields, "{}", message),
            Level::WARN => tracing::warn!(context = %fields, "{}", message),
            Level::INFO => tracing::info!(context = %fields, "{}", message),
            Level::DEBUG => tracing::debug!(context = %fields, "{}", message),
            _ => tracing::trace!(context = %fields, "{}", message),
        }

        if let Some(sink) = &self.sink {
            sink.record(level, message, &context);
        }
    }

    pub(crate) fn debug(&self, message: &str, context: Context) {
        self.emit(Level::DEBUG, message, context);
    }

    pub(crate) fn info(&self, message: &str, context: Context) {
        self.emit(Level::INFO, message, context);
    }

    pub(crate) fn warn(&self, message: &str, context: Context) {
        self.emit(Level::WARN, message, context);
    }

    pub(crate) fn error(&self, message: &str, context: Context) {
        self.emit(Level::ERROR, message, context);
    }
}

/// Builds a [`Context`] from `key => value` pairs.
macro_rules! context {
    ($($key:literal => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut map = $crate::error::Context::new();
        $(map.insert($key.to_string(), ::serde_json::Value::from($value));)*
        map
    }};
}

pub(crate) use context;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(Level, String, Context)>>);

    impl LogSink for Recorder {
        fn record(&self, level: Level, message: &str, context: &Context) {
            self.0
                .lock()
                .unwrap()
                .push((level, message.to_string(), context.clone()));
        }
    }

    #[test]
    fn test_event_log_adds_environment() {
        let recorder = Arc::new(Recorder::default());
        let log = EventLog::new(Environment::Sandbox, Some(recorder.clone()));

        log.info("Creating payment", context! { "amount" => 100 });

        let records = recorder.0.lock().unwrap();
        assert_eq!(records.len(), 1);
        let (level, message, context) = &records[0];
        assert_eq!(*level, Level::INFO);
        assert_eq!(message, "Creating payment");
        assert_eq!(context["environment"], "sandbox");
        assert_eq!(context["amount"], 100);
    }

    #[test]
    fn test_file_sink_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileLogSink::new(dir.path().join("amwal.log"));

        sink.record(Level::INFO, "first", &context! { "environment" => "test" });
        sink.record(Level::ERROR, "second", &Context::new());

        let contents = std::fs::read_to_string(sink.path()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(r#"INFO: first {"environment":"test"}"#));
        assert!(lines[1].ends_with("ERROR: second {}"));
        assert!(lines[0].starts_with('['));
    }

    #[test]
    fn test_file_sink_failure_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be opened for appending.
        let sink = FileLogSink::new(dir.path());
        sink.record(Level::INFO, "ignored", &Context::new());
    }
}
