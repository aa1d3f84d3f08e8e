//! Fetch stage: job research and résumé encoding.
//!
//! The orchestrator always runs both operations concurrently; they share
//! nothing but the telemetry recorder.

use crate::error::{AssistantError, Result};
use crate::input::read_attachment;
use crate::llm::client::{GenerateRequest, GenerativeClient};
use crate::llm::prompts::PromptTemplates;
use crate::pipeline::Stage;
use crate::telemetry::{SpanStatus, TelemetryRecorder};
use crate::types::ResumeAttachment;
use std::path::Path;
use url::Url;

/// Ask the model for a summary of the job posted at `job_url`.
///
/// With `web_search` the model may fall back to searching when it cannot read
/// the page directly. An empty reply is an [`AssistantError::EmptyResponse`].
pub async fn fetch_job_context(
    client: &dyn GenerativeClient,
    telemetry: &TelemetryRecorder,
    prompts: &PromptTemplates,
    job_url: &str,
    web_search: bool,
) -> Result<String> {
    let url = Url::parse(job_url)
        .map_err(|e| AssistantError::InvalidInput(format!("Invalid job URL '{}': {}", job_url, e)))?;
    let host = url.host_str().unwrap_or(job_url);

    let span = telemetry.start_span(
        Stage::JobResearch.subject(),
        &format!("Researching Job at {}", host),
    );

    let request = GenerateRequest {
        web_search,
        ..GenerateRequest::prompt(prompts.render_job_research(job_url))
    };

    let outcome = match client.generate(request).await {
        Ok(text) if text.trim().is_empty() => Err(AssistantError::EmptyResponse(
            "Could not fetch job description".to_string(),
        )),
        other => other,
    };

    match outcome {
        Ok(text) => {
            telemetry.end_span(&span, SpanStatus::Completed, None);
            Ok(text)
        }
        Err(e) => {
            telemetry.end_span(&span, SpanStatus::Failed, Some("Failed to fetch job description"));
            Err(e)
        }
    }
}

/// Read the résumé into an inline attachment
pub async fn extract_resume_attachment(
    telemetry: &TelemetryRecorder,
    path: &Path,
) -> Result<ResumeAttachment> {
    let span = telemetry.start_span(Stage::ResumeParsing.subject(), "Processing PDF Document");

    match read_attachment(path).await {
        Ok(attachment) => {
            telemetry.end_span(&span, SpanStatus::Completed, Some("Resume extracted"));
            Ok(attachment)
        }
        Err(e) => {
            telemetry.end_span(&span, SpanStatus::Failed, None);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::MockGenerativeClient;
    use crate::telemetry::{LogBuffer, LogKind};
    use std::sync::Arc;

    fn telemetry() -> (TelemetryRecorder, Arc<LogBuffer>) {
        let logs = Arc::new(LogBuffer::new());
        (TelemetryRecorder::new(logs.clone()), logs)
    }

    #[tokio::test]
    async fn test_fetch_job_context_returns_text() {
        let mut client = MockGenerativeClient::new();
        client
            .expect_generate()
            .withf(|request| {
                request.web_search
                    && !request.has_attachment()
                    && request.text().contains("https://example.com/jobs/123")
            })
            .times(1)
            .returning(|_| Ok("Rust engineer, 5 years".to_string()));

        let (telemetry, logs) = telemetry();
        let text = fetch_job_context(
            &client,
            &telemetry,
            &PromptTemplates::default(),
            "https://example.com/jobs/123",
            true,
        )
        .await
        .unwrap();

        assert_eq!(text, "Rust engineer, 5 years");
        let entries = logs.entries();
        assert_eq!(entries[0].message, "Researching Job at example.com...");
        assert_eq!(entries[1].kind, LogKind::Success);
    }

    #[tokio::test]
    async fn test_search_tool_can_be_disabled() {
        let mut client = MockGenerativeClient::new();
        client
            .expect_generate()
            .withf(|request| !request.web_search)
            .times(1)
            .returning(|_| Ok("summary".to_string()));

        let (telemetry, _) = telemetry();
        let result = fetch_job_context(
            &client,
            &telemetry,
            &PromptTemplates::default(),
            "https://jobs.example.org/42",
            false,
        )
        .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_empty_reply_is_empty_response() {
        let mut client = MockGenerativeClient::new();
        client.expect_generate().returning(|_| Ok("   ".to_string()));

        let (telemetry, logs) = telemetry();
        let result = fetch_job_context(
            &client,
            &telemetry,
            &PromptTemplates::default(),
            "https://example.com/jobs/1",
            true,
        )
        .await;

        assert!(matches!(result, Err(AssistantError::EmptyResponse(_))));
        let last = logs.entries().pop().unwrap();
        assert_eq!(last.kind, LogKind::Error);
        assert_eq!(last.message, "Failed to fetch job description");
        assert_eq!(telemetry.spans()[0].status, SpanStatus::Failed);
    }

    #[tokio::test]
    async fn test_invalid_url_fails_before_any_call() {
        let mut client = MockGenerativeClient::new();
        client.expect_generate().times(0);

        let (telemetry, logs) = telemetry();
        let result = fetch_job_context(
            &client,
            &telemetry,
            &PromptTemplates::default(),
            "not a url",
            true,
        )
        .await;

        assert!(matches!(result, Err(AssistantError::InvalidInput(_))));
        assert!(logs.is_empty());
    }

    #[tokio::test]
    async fn test_extract_resume_attachment_failure_closes_span() {
        let (telemetry, logs) = telemetry();
        let result = extract_resume_attachment(&telemetry, Path::new("does/not/exist.pdf")).await;

        assert!(matches!(result, Err(AssistantError::ReadError { .. })));
        assert_eq!(telemetry.spans()[0].status, SpanStatus::Failed);
        assert_eq!(logs.entries().pop().unwrap().kind, LogKind::Error);
    }
}
