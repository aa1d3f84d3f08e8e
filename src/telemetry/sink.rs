//! Log entries and the sinks that consume them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Info,
    Success,
    Agent,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub message: String,
    pub kind: LogKind,
    pub timestamp: DateTime<Utc>,
    /// Stage that produced the line, if any
    pub subject_name: Option<String>,
}

impl LogEntry {
    pub fn new(kind: LogKind, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            message: message.into(),
            kind,
            timestamp: Utc::now(),
            subject_name: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogKind::Info, message)
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject_name = Some(subject.into());
        self
    }
}

/// Receives log entries synchronously, in emission order
pub trait LogSink: Send + Sync {
    fn emit(&self, entry: &LogEntry);
}

impl<F> LogSink for F
where
    F: Fn(&LogEntry) + Send + Sync,
{
    fn emit(&self, entry: &LogEntry) {
        self(entry)
    }
}

/// Sink that keeps every entry and optionally forwards it
#[derive(Default)]
pub struct LogBuffer {
    entries: Mutex<Vec<LogEntry>>,
    forward: Option<Arc<dyn LogSink>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forwarding_to(sink: Arc<dyn LogSink>) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            forward: Some(sink),
        }
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogEntry>> {
        // A panicking sink cannot leave the vector half-written
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LogSink for LogBuffer {
    fn emit(&self, entry: &LogEntry) {
        self.lock().push(entry.clone());
        if let Some(forward) = &self.forward {
            forward.emit(entry);
        }
    }
}
