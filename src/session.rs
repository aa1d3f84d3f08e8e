//! Interactive session state: one analysis, its chat, and the drafted CV.
//!
//! Every operation takes `&mut self`, so a session handles one user action at
//! a time. Stage failures are turned into log lines or chat apologies here;
//! the pipeline itself only propagates them.

use crate::error::{AssistantError, Result};
use crate::pipeline::conversation::{classify_reply, ChatSession, ReplyKind};
use crate::pipeline::memory::MemoryBank;
use crate::pipeline::orchestrator::Orchestrator;
use crate::telemetry::{LogBuffer, LogEntry, LogSink, TelemetrySpan};
use crate::types::{AnalysisResult, ChatMessage, ViewMode};
use log::error;
use std::path::Path;
use std::sync::Arc;

pub const ANALYSIS_FAILED_NOTICE: &str = "An error occurred during analysis.";
pub const CHAT_FAILED_REPLY: &str = "Sorry, I encountered an error processing your message.";
pub const CV_UPDATED_REPLY: &str = "✅ I've updated the CV draft based on your feedback.";
pub const DRAFT_CV_REQUEST: &str = "Draft Proposed CV for the job";
pub const CV_DRAFTED_REPLY: &str = "I have drafted the tailored CV. You can now review it in the CV preview.";
pub const CV_FAILED_REPLY: &str = "Sorry, I failed to generate the CV. Please try again.";

pub struct AssistantSession {
    orchestrator: Orchestrator,
    logs: Arc<LogBuffer>,
    result: Option<AnalysisResult>,
    memory: Option<MemoryBank>,
    spans: Vec<TelemetrySpan>,
    chat: Option<ChatSession>,
    transcript: Vec<ChatMessage>,
    view_mode: ViewMode,
    generated_cv: Option<String>,
}

impl AssistantSession {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self::with_logs(orchestrator, Arc::new(LogBuffer::new()))
    }

    /// Session whose log lines are also forwarded to `sink` as they happen
    pub fn with_log_sink(orchestrator: Orchestrator, sink: Arc<dyn LogSink>) -> Self {
        Self::with_logs(orchestrator, Arc::new(LogBuffer::forwarding_to(sink)))
    }

    fn with_logs(orchestrator: Orchestrator, logs: Arc<LogBuffer>) -> Self {
        Self {
            orchestrator,
            logs,
            result: None,
            memory: None,
            spans: Vec::new(),
            chat: None,
            transcript: Vec::new(),
            view_mode: ViewMode::Analysis,
            generated_cv: None,
        }
    }

    /// Run a fresh analysis, discarding everything from the previous one.
    ///
    /// On failure two log lines describe the error and the session stays empty.
    pub async fn run_analysis(&mut self, resume: &Path, job_url: &str) -> Result<&AnalysisResult> {
        if job_url.trim().is_empty() {
            return Err(AssistantError::InvalidInput("Job URL is required".to_string()));
        }

        self.reset();

        match self
            .orchestrator
            .run(resume, job_url.trim(), self.logs.clone())
            .await
        {
            Ok(run) => {
                self.chat = Some(ChatSession::create(
                    self.orchestrator.client(),
                    self.orchestrator.prompts(),
                    &run.memory,
                ));
                self.memory = Some(run.memory);
                self.spans = run.spans;
                Ok(self.result.insert(run.result))
            }
            Err(e) => {
                error!("Orchestration failed: {}", e);
                self.logs.emit(&LogEntry::info(ANALYSIS_FAILED_NOTICE));
                self.logs.emit(&LogEntry::info(format!("Error details: {}", e)));
                Err(e)
            }
        }
    }

    /// Send a chat message and record both sides in the transcript.
    ///
    /// While the CV preview is open, a reply that looks like a full CV replaces
    /// the draft instead of being shown as chat.
    pub async fn send_chat_message(&mut self, text: &str) -> Result<&ChatMessage> {
        let chat = self.chat.as_mut().ok_or(AssistantError::NoActiveSession)?;
        self.transcript.push(ChatMessage::user(text));

        let reply = match chat.send(text).await {
            Ok(response) => {
                if self.view_mode == ViewMode::CvPreview && classify_reply(&response) == ReplyKind::Cv {
                    self.generated_cv = Some(response);
                    ChatMessage::assistant(CV_UPDATED_REPLY)
                } else {
                    ChatMessage::assistant(response)
                }
            }
            Err(e) => {
                error!("Chat error: {}", e);
                ChatMessage::assistant(CHAT_FAILED_REPLY)
            }
        };

        self.transcript.push(reply);
        Ok(self.last_message())
    }

    /// Ask the coach for a complete CV and open the preview
    pub async fn draft_cv(&mut self) -> Result<&ChatMessage> {
        let chat = self.chat.as_mut().ok_or(AssistantError::NoActiveSession)?;
        self.transcript.push(ChatMessage::user(DRAFT_CV_REQUEST));

        let prompt = self.orchestrator.prompts().draft_cv.clone();
        let reply = match chat.send(&prompt).await {
            Ok(cv) => {
                self.generated_cv = Some(cv);
                self.view_mode = ViewMode::CvPreview;
                ChatMessage::assistant(CV_DRAFTED_REPLY)
            }
            Err(e) => {
                error!("CV generation error: {}", e);
                ChatMessage::assistant(CV_FAILED_REPLY)
            }
        };

        self.transcript.push(reply);
        Ok(self.last_message())
    }

    pub fn back_to_analysis(&mut self) {
        self.view_mode = ViewMode::Analysis;
    }

    pub fn logs(&self) -> Vec<LogEntry> {
        self.logs.entries()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn memory(&self) -> Option<&MemoryBank> {
        self.memory.as_ref()
    }

    pub fn spans(&self) -> &[TelemetrySpan] {
        &self.spans
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn generated_cv(&self) -> Option<&str> {
        self.generated_cv.as_deref()
    }

    pub fn has_chat(&self) -> bool {
        self.chat.is_some()
    }

    fn reset(&mut self) {
        self.logs.clear();
        self.result = None;
        self.memory = None;
        self.spans.clear();
        self.chat = None;
        self.transcript.clear();
        self.generated_cv = None;
        self.view_mode = ViewMode::Analysis;
    }

    fn last_message(&self) -> &ChatMessage {
        // Callers push before reading
        &self.transcript[self.transcript.len() - 1]
    }
}
