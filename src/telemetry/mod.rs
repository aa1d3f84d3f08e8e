//! Observability for pipeline stages
//! Timed spans plus the human-readable log lines they emit

pub mod sink;
pub mod recorder;

pub use sink::{LogBuffer, LogEntry, LogKind, LogSink};
pub use recorder::{SpanStatus, TelemetryRecorder, TelemetrySpan};
