use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::translate::dialect::{PayloadKind, TranslationDirection, TranslationMode};

const MAX_LOG_ENTRIES: usize = 10_000;

pub const TRANSLATION_COMPONENT: &str = "translation";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub component: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<serde_json::Value>,
}

impl LogEntry {
    pub fn new(level: LogLevel, component: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            component: component.into(),
            message: message.into(),
            context: None,
        }
    }

    pub fn with_context(mut self, ctx: serde_json::Value) -> Self {
        self.context = Some(ctx);
        self
    }
}

/// One record per translation call, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationLogEntry {
    pub request_id: String,
    pub kind: PayloadKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Absent for pass-through.
    pub direction: Option<TranslationDirection>,
    /// Absent when the call failed before direction resolution.
    pub mode: Option<TranslationMode>,
    pub unknown_fields: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub duration_us: u64,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TranslationLogEntry {
    fn summary(&self) -> String {
        let route = match (self.direction, self.mode) {
            (Some(direction), _) => direction.as_str(),
            (None, Some(mode)) => mode.as_str(),
            (None, None) => "unresolved",
        };
        match self.error {
            Some(ref error) => format!("{} {} failed: {}", self.request_id, route, error),
            None => format!("{} {} in {}us", self.request_id, route, self.duration_us),
        }
    }
}

/// Ring-buffer logger that persists to JSONL
pub struct Logger {
    entries: VecDeque<LogEntry>,
    file_path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl Logger {
    pub fn new(file_path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file_path = file_path.as_ref().to_path_buf();

        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut entries = VecDeque::with_capacity(MAX_LOG_ENTRIES);

        if file_path.exists() {
            let file = File::open(&file_path)?;
            let reader = BufReader::new(file);
            for line in reader.lines().map_while(std::result::Result::ok) {
                if let Ok(entry) = serde_json::from_str::<LogEntry>(&line) {
                    if entries.len() >= MAX_LOG_ENTRIES {
                        entries.pop_front();
                    }
                    entries.push_back(entry);
                }
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)?;
        let writer = BufWriter::new(file);

        Ok(Self {
            entries,
            file_path,
            writer: Some(writer),
        })
    }

    pub fn log(&mut self, entry: LogEntry) {
        if let Some(ref mut writer) = self.writer {
            if let Ok(json) = serde_json::to_string(&entry) {
                let _ = writeln!(writer, "{}", json);
                let _ = writer.flush();
            }
        }
        if self.entries.len() >= MAX_LOG_ENTRIES {
            self.entries.pop_front();
        }
        self.entries.push_back(entry);
    }

    /// Newest first.
    pub fn recent(&self, limit: usize) -> Vec<LogEntry> {
        self.entries.iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrite the file so it holds only the buffered entries.
    pub fn compact(&mut self) -> std::io::Result<()> {
        self.writer = None;
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.file_path)?;
        let mut writer = BufWriter::new(file);
        for entry in &self.entries {
            if let Ok(json) = serde_json::to_string(entry) {
                writeln!(writer, "{}", json)?;
            }
        }
        writer.flush()?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file_path)?;
        self.writer = Some(BufWriter::new(file));
        Ok(())
    }
}

#[derive(Clone)]
pub struct SharedLogger(Arc<Mutex<Logger>>);

impl SharedLogger {
    pub fn new(file_path: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self(Arc::new(Mutex::new(Logger::new(file_path)?))))
    }

    pub fn log(&self, entry: LogEntry) {
        if let Ok(mut logger) = self.0.lock() {
            logger.log(entry);
        }
    }

    pub fn info(&self, component: impl Into<String>, message: impl Into<String>) {
        self.log(LogEntry::new(LogLevel::Info, component, message));
    }

    pub fn warn(&self, component: impl Into<String>, message: impl Into<String>) {
        self.log(LogEntry::new(LogLevel::Warn, component, message));
    }

    pub fn error(&self, component: impl Into<String>, message: impl Into<String>) {
        self.log(LogEntry::new(LogLevel::Error, component, message));
    }

    pub fn log_with_context(
        &self,
        level: LogLevel,
        component: impl Into<String>,
        message: impl Into<String>,
        context: serde_json::Value,
    ) {
        self.log(LogEntry::new(level, component, message).with_context(context));
    }

    /// Record the outcome of one translation call.
    pub fn log_translation(&self, entry: &TranslationLogEntry) {
        let level = if entry.success {
            LogLevel::Info
        } else {
            LogLevel::Error
        };
        let message = entry.summary();
        match serde_json::to_value(entry) {
            Ok(context) => self.log_with_context(level, TRANSLATION_COMPONENT, message, context),
            Err(_) => self.log(LogEntry::new(level, TRANSLATION_COMPONENT, message)),
        }
    }

    /// Diagnostic event for keys the source dialect doesn't define. Not an error.
    pub fn log_unknown_fields(&self, request_id: &str, direction: TranslationDirection, fields: &[String]) {
        if fields.is_empty() {
            return;
        }
        self.log_with_context(
            LogLevel::Warn,
            TRANSLATION_COMPONENT,
            format!(
                "{} {} carried {} unknown field(s): {}",
                request_id,
                direction,
                fields.len(),
                fields.join(", ")
            ),
            serde_json::json!({
                "request_id": request_id,
                "direction": direction,
                "unknown_fields": fields,
            }),
        );
    }

    pub fn recent(&self, limit: usize) -> Vec<LogEntry> {
        self.0.lock().map(|l| l.recent(limit)).unwrap_or_default()
    }

    pub fn compact(&self) -> std::io::Result<()> {
        match self.0.lock() {
            Ok(mut logger) => logger.compact(),
            Err(_) => Ok(()),
        }
    }
}
