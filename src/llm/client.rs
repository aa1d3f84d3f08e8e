//! Client for the hosted generative model.
//!
//! [`GenerativeClient`] is the single seam between the pipeline and the remote
//! API. [`GeminiClient`] implements it over the Gemini `generateContent` REST
//! endpoint; tests substitute a mock or point the client at a local server.

use crate::config::ApiConfig;
use crate::error::{AssistantError, Result};
use crate::types::ResumeAttachment;
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Part {
    Text(String),
    Attachment(ResumeAttachment),
}

/// One message of a conversation sent to the model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Turn {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            parts: vec![Part::Text(text.into())],
        }
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            parts: vec![Part::Text(text.into())],
        }
    }
}

/// Provider-neutral description of a single generation call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateRequest {
    pub system_instruction: Option<String>,
    pub turns: Vec<Turn>,
    /// Allow the model to ground its answer with web search
    pub web_search: bool,
    /// Ask for a JSON document instead of prose
    pub json_output: bool,
}

impl GenerateRequest {
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::user_text(text)],
            ..Default::default()
        }
    }

    pub fn has_attachment(&self) -> bool {
        self.turns
            .iter()
            .flat_map(|turn| turn.parts.iter())
            .any(|part| matches!(part, Part::Attachment(_)))
    }

    /// Concatenated text of every part, for matching in tests and debug logs
    pub fn text(&self) -> String {
        self.turns
            .iter()
            .flat_map(|turn| turn.parts.iter())
            .filter_map(|part| match part {
                Part::Text(text) => Some(text.as_str()),
                Part::Attachment(_) => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Text generation backed by a remote model.
///
/// Returns the reply text, which may be empty; callers decide whether an empty
/// reply is an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerativeClient: Send + Sync {
    async fn generate(&self, request: GenerateRequest) -> Result<String>;
}

/// HTTP client for the Gemini REST API
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: crate::config::DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn from_config(config: &ApiConfig, api_key: impl Into<String>) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| AssistantError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            model: config.model.clone(),
            base_url: config.base_url.clone(),
        })
    }

    /// Point the client at another endpoint, e.g. a proxy or a test server
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl GenerativeClient for GeminiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<String> {
        let body = GenerateContentRequest::from(&request);
        debug!(
            "POST {} ({} turns, search: {}, json: {})",
            self.endpoint(),
            body.contents.len(),
            request.web_search,
            request.json_output
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(map_http_error(status, &body_text));
        }

        let parsed: GenerateContentResponse = response.json().await?;
        Ok(extract_text(parsed))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl From<&GenerateRequest> for GenerateContentRequest {
    fn from(request: &GenerateRequest) -> Self {
        let contents = request
            .turns
            .iter()
            .map(|turn| Content {
                role: Some(turn.role.as_str().to_string()),
                parts: turn.parts.iter().map(WirePart::from).collect(),
            })
            .collect();

        let system_instruction = request.system_instruction.as_ref().map(|text| Content {
            role: None,
            parts: vec![WirePart::Text { text: text.clone() }],
        });

        let tools = if request.web_search {
            vec![Tool::default()]
        } else {
            Vec::new()
        };

        let generation_config = request.json_output.then(|| GenerationConfig {
            response_mime_type: "application/json".to_string(),
        });

        Self {
            contents,
            system_instruction,
            tools,
            generation_config,
        }
    }
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<WirePart>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum WirePart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

impl From<&Part> for WirePart {
    fn from(part: &Part) -> Self {
        match part {
            Part::Text(text) => WirePart::Text { text: text.clone() },
            Part::Attachment(attachment) => WirePart::InlineData {
                inline_data: InlineData {
                    mime_type: attachment.mime_type.clone(),
                    data: attachment.data.clone(),
                },
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize, Default)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Serialize, Default)]
struct GoogleSearch {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Text parts of the first candidate, joined; empty when there are none
fn extract_text(response: GenerateContentResponse) -> String {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default()
}

fn map_http_error(status: StatusCode, body: &str) -> AssistantError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            let error = json.get("error")?;
            let message = error.get("message")?.as_str()?.to_string();
            Some(match error.get("status").and_then(|s| s.as_str()) {
                Some(status_text) if !status_text.is_empty() => format!("{}: {}", status_text, message),
                _ => message,
            })
        })
        .unwrap_or_else(|| body.to_string());

    AssistantError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attachment() -> ResumeAttachment {
        ResumeAttachment {
            data: "JVBERi0xLjQ=".to_string(),
            mime_type: "application/pdf".to_string(),
        }
    }

    #[test]
    fn test_wire_body_for_attachment_request() {
        let request = GenerateRequest {
            turns: vec![Turn {
                role: Role::User,
                parts: vec![Part::Attachment(attachment()), Part::Text("Analyze".to_string())],
            }],
            json_output: true,
            ..Default::default()
        };

        let body = serde_json::to_value(GenerateContentRequest::from(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"inlineData": {"mimeType": "application/pdf", "data": "JVBERi0xLjQ="}},
                        {"text": "Analyze"}
                    ]
                }],
                "generationConfig": {"responseMimeType": "application/json"}
            })
        );
    }

    #[test]
    fn test_wire_body_with_search_and_system_instruction() {
        let request = GenerateRequest {
            system_instruction: Some("Be brief".to_string()),
            turns: vec![Turn::user_text("hi"), Turn::model_text("hello")],
            web_search: true,
            json_output: false,
        };

        let body = serde_json::to_value(GenerateContentRequest::from(&request)).unwrap();
        assert_eq!(body["systemInstruction"], json!({"parts": [{"text": "Be brief"}]}));
        assert_eq!(body["tools"], json!([{"google_search": {}}]));
        assert_eq!(body["contents"][1]["role"], "model");
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_extract_text_joins_parts_of_first_candidate() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                {"content": {"parts": [{"text": "Hello, "}, {"text": "world"}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        }))
        .unwrap();
        assert_eq!(extract_text(response), "Hello, world");
    }

    #[test]
    fn test_extract_text_empty_when_no_candidates() {
        let response: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(extract_text(response), "");
    }

    #[test]
    fn test_map_http_error_uses_error_body() {
        let body = r#"{"error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}}"#;
        match map_http_error(StatusCode::FORBIDDEN, body) {
            AssistantError::Api { status, message } => {
                assert_eq!(status, 403);
                assert_eq!(message, "PERMISSION_DENIED: API key not valid");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_map_http_error_falls_back_to_raw_body() {
        match map_http_error(StatusCode::BAD_GATEWAY, "upstream down") {
            AssistantError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_request_helpers() {
        let request = GenerateRequest::prompt("Find the job");
        assert!(!request.has_attachment());
        assert_eq!(request.text(), "Find the job");
    }
}
