//! Span recorder used by every pipeline stage

use crate::telemetry::sink::{LogEntry, LogKind, LogSink};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpanStatus {
    Started,
    Completed,
    Failed,
}

impl fmt::Display for SpanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SpanStatus::Started => "started",
            SpanStatus::Completed => "completed",
            SpanStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySpan {
    pub id: String,
    pub subject: String,
    pub action: String,
    pub status: SpanStatus,
    pub started_at: DateTime<Utc>,
    pub duration_ms: Option<u64>,
}

/// Records operation spans and reports each transition to a log sink.
///
/// Shared by reference between concurrently running stages.
pub struct TelemetryRecorder {
    spans: Mutex<Vec<TelemetrySpan>>,
    sink: Arc<dyn LogSink>,
}

impl TelemetryRecorder {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            spans: Mutex::new(Vec::new()),
            sink,
        }
    }

    /// Open a span and announce it as an agent line
    pub fn start_span(&self, subject: &str, action: &str) -> String {
        let id = Uuid::new_v4().to_string();
        let started_at = Utc::now();

        self.lock().push(TelemetrySpan {
            id: id.clone(),
            subject: subject.to_string(),
            action: action.to_string(),
            status: SpanStatus::Started,
            started_at,
            duration_ms: None,
        });

        debug!("[{}] {}...", subject, action);
        let mut entry = LogEntry::new(LogKind::Agent, format!("{}...", action)).with_subject(subject);
        entry.id = id.clone();
        entry.timestamp = started_at;
        self.sink.emit(&entry);

        id
    }

    /// Close a span. Unknown or already closed ids are ignored.
    pub fn end_span(&self, span_id: &str, status: SpanStatus, message: Option<&str>) {
        let entry = {
            let mut spans = self.lock();
            let Some(span) = spans
                .iter_mut()
                .find(|span| span.id == span_id && span.status == SpanStatus::Started)
            else {
                debug!("Ignoring end of unknown or closed span {}", span_id);
                return;
            };

            let duration_ms = (Utc::now() - span.started_at).num_milliseconds().max(0) as u64;
            span.status = status;
            span.duration_ms = Some(duration_ms);

            let message = message
                .map(str::to_string)
                .unwrap_or_else(|| format!("{} {} ({}ms)", span.action, status, duration_ms));
            let kind = if status == SpanStatus::Completed {
                LogKind::Success
            } else {
                LogKind::Error
            };
            LogEntry::new(kind, message).with_subject(span.subject.clone())
        };

        match entry.kind {
            LogKind::Success => info!("[{}] {}", entry.subject_name.as_deref().unwrap_or("-"), entry.message),
            _ => warn!("[{}] {}", entry.subject_name.as_deref().unwrap_or("-"), entry.message),
        }
        self.sink.emit(&entry);
    }

    /// Emit a free-standing info line
    pub fn info(&self, message: &str) {
        info!("{}", message);
        self.sink.emit(&LogEntry::info(message));
    }

    pub fn spans(&self) -> Vec<TelemetrySpan> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<TelemetrySpan>> {
        self.spans.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::sink::LogBuffer;

    fn recorder() -> (TelemetryRecorder, Arc<LogBuffer>) {
        let buffer = Arc::new(LogBuffer::new());
        (TelemetryRecorder::new(buffer.clone()), buffer)
    }

    #[test]
    fn test_start_span_emits_agent_line() {
        let (telemetry, logs) = recorder();
        let id = telemetry.start_span("Resume_Parser_Agent", "Processing PDF Document");

        let spans = telemetry.spans();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].id, id);
        assert_eq!(spans[0].status, SpanStatus::Started);
        assert!(spans[0].duration_ms.is_none());

        let entries = logs.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, LogKind::Agent);
        assert_eq!(entries[0].message, "Processing PDF Document...");
        assert_eq!(entries[0].subject_name.as_deref(), Some("Resume_Parser_Agent"));
    }

    #[test]
    fn test_end_span_auto_message() {
        let (telemetry, logs) = recorder();
        let id = telemetry.start_span("Gap_Analysis_Agent", "Performing Gap Analysis");
        telemetry.end_span(&id, SpanStatus::Failed, None);

        let span = &telemetry.spans()[0];
        assert_eq!(span.status, SpanStatus::Failed);
        let duration = span.duration_ms.expect("closed span has a duration");

        let last = logs.entries().pop().unwrap();
        assert_eq!(last.kind, LogKind::Error);
        assert_eq!(
            last.message,
            format!("Performing Gap Analysis failed ({}ms)", duration)
        );
    }

    #[test]
    fn test_end_span_custom_message() {
        let (telemetry, logs) = recorder();
        let id = telemetry.start_span("Resume_Parser_Agent", "Processing PDF Document");
        telemetry.end_span(&id, SpanStatus::Completed, Some("Resume extracted"));

        let last = logs.entries().pop().unwrap();
        assert_eq!(last.kind, LogKind::Success);
        assert_eq!(last.message, "Resume extracted");
    }

    #[test]
    fn test_end_unknown_span_is_silent() {
        let (telemetry, logs) = recorder();
        telemetry.end_span("never-opened", SpanStatus::Completed, None);

        assert!(logs.is_empty());
        assert!(telemetry.spans().is_empty());
    }

    #[test]
    fn test_span_closes_only_once() {
        let (telemetry, logs) = recorder();
        let id = telemetry.start_span("Job_Architect_Agent", "Researching Job at example.com");
        telemetry.end_span(&id, SpanStatus::Completed, None);
        telemetry.end_span(&id, SpanStatus::Failed, None);

        assert_eq!(telemetry.spans()[0].status, SpanStatus::Completed);
        assert_eq!(logs.len(), 2);
    }

    #[test]
    fn test_info_line_has_no_subject() {
        let (telemetry, logs) = recorder();
        telemetry.info("Orchestrator starting parallel agents...");

        let entries = logs.entries();
        assert_eq!(entries[0].kind, LogKind::Info);
        assert!(entries[0].subject_name.is_none());
    }
}
