use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const LOG_FILE: &str = "widget.log";

/// Append-only JSON-lines log under `logs/widget.log`.
///
/// Write failures are swallowed; logging never changes widget behaviour.
#[derive(Debug, Default)]
pub struct EventLog {
    logs_dir: Option<PathBuf>,
    guard: Mutex<()>,
}

impl EventLog {
    pub fn new(logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            logs_dir: Some(logs_dir.into()),
            guard: Mutex::new(()),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn path(&self) -> Option<PathBuf> {
        self.logs_dir.as_deref().map(|dir| dir.join(LOG_FILE))
    }

    pub fn info(&self, event: &str, message: &str) {
        self.append("info", event, message);
    }

    pub fn warn(&self, event: &str, message: &str) {
        self.append("warn", event, message);
    }

    fn append(&self, level: &str, event: &str, message: &str) {
        let Some(dir) = self.logs_dir.as_deref() else {
            return;
        };
        let Ok(_guard) = self.guard.lock() else {
            return;
        };
        let payload = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "level": level,
            "event": event,
            "message": message,
        });

        if let Ok(mut file) = open_append(dir) {
            let _ = writeln!(file, "{}", payload);
        }
    }
}

fn open_append(dir: &Path) -> std::io::Result<std::fs::File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))
}
