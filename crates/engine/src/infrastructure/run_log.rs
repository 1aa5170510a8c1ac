//! Buffered run log.

use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::SecondsFormat;

use crate::infrastructure::ports::{ClockPort, RunLog};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Info,
    Warn,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
        })
    }
}

/// Emits every line through `tracing` and keeps a timestamped copy in memory
/// so the whole run can be written to a file at the end.
pub struct BufferedRunLog {
    clock: Arc<dyn ClockPort>,
    lines: Mutex<Vec<String>>,
}

impl BufferedRunLog {
    pub fn new(clock: Arc<dyn ClockPort>) -> Self {
        Self {
            clock,
            lines: Mutex::new(Vec::new()),
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn record(&self, level: Level, message: &str) {
        match level {
            Level::Info => tracing::info!("{message}"),
            Level::Warn => tracing::warn!("{message}"),
            Level::Error => tracing::error!("{message}"),
        }
        let stamp = self
            .clock
            .now()
            .to_rfc3339_opts(SecondsFormat::Millis, true);
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(format!("[{stamp}] {level}: {message}"));
    }
}

impl RunLog for BufferedRunLog {
    fn info(&self, message: &str) {
        self.record(Level::Info, message);
    }

    fn warn(&self, message: &str) {
        self.record(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.record(Level::Error, message);
    }

    fn flush(&self, path: &Path) -> std::io::Result<()> {
        let mut contents = self.lines().join("\n");
        contents.push('\n');
        std::fs::write(path, contents)
    }
}
