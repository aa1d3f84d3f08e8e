//! Gap analysis stage: résumé + job context -> structured fit report

use crate::error::{AssistantError, Result};
use crate::llm::client::{GenerateRequest, GenerativeClient, Part, Role, Turn};
use crate::llm::prompts::PromptTemplates;
use crate::pipeline::Stage;
use crate::telemetry::{SpanStatus, TelemetryRecorder};
use crate::types::{AnalysisResult, ResumeAttachment, REQUIRED_FIELDS};
use log::debug;
use serde_json::Value;

/// Compare the résumé against the job context in one model call.
///
/// The reply is sanitized and parsed; it is not retried. With `strict` the
/// parsed result must also carry every field with in-range values.
pub async fn run_gap_analysis(
    client: &dyn GenerativeClient,
    telemetry: &TelemetryRecorder,
    prompts: &PromptTemplates,
    attachment: &ResumeAttachment,
    job_context: &str,
    strict: bool,
) -> Result<AnalysisResult> {
    let span = telemetry.start_span(Stage::GapAnalysis.subject(), "Performing Gap Analysis");

    let request = GenerateRequest {
        turns: vec![Turn {
            role: Role::User,
            parts: vec![
                Part::Attachment(attachment.clone()),
                Part::Text(prompts.render_gap_analysis(job_context)),
            ],
        }],
        json_output: true,
        ..Default::default()
    };

    let outcome = match client.generate(request).await {
        Ok(raw) => parse_analysis(&raw, strict),
        Err(e) => Err(e),
    };

    match outcome {
        Ok(result) => {
            telemetry.end_span(
                &span,
                SpanStatus::Completed,
                Some(&format!("Analysis complete. Score: {}", result.match_score)),
            );
            Ok(result)
        }
        Err(e) => {
            telemetry.end_span(&span, SpanStatus::Failed, None);
            Err(e)
        }
    }
}

/// Strip code fences and surrounding prose from a JSON reply.
///
/// Steps, in order: trim; empty becomes `{}`; drop a leading ```` ``` ```` /
/// ```` ```json ```` line and a trailing fence; slice from the first `{` to
/// the last `}` when both are present.
pub fn sanitize_json_response(raw: &str) -> &str {
    let mut text = raw.trim();
    if text.is_empty() {
        return "{}";
    }

    if text.starts_with("```") {
        if let Some(rest) = text
            .strip_prefix("```json\n")
            .or_else(|| text.strip_prefix("```\n"))
        {
            text = rest;
        }
        if let Some(rest) = text.strip_suffix("\n```") {
            text = rest;
        }
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            text = &text[start..=end];
        }
    }

    text
}

/// Sanitize and parse a gap analysis reply.
///
/// Any syntactically valid JSON object is accepted unless `strict` is set;
/// fields of the wrong type fall back to empty values.
pub fn parse_analysis(raw: &str, strict: bool) -> Result<AnalysisResult> {
    let json = sanitize_json_response(raw);
    debug!("Parsing analysis JSON ({} chars)", json.len());

    let value: Value =
        serde_json::from_str(json).map_err(|e| AssistantError::Parse(e.to_string()))?;
    if !value.is_object() {
        return Err(AssistantError::Parse("expected a JSON object".to_string()));
    }

    if strict {
        let missing: Vec<&str> = REQUIRED_FIELDS
            .iter()
            .copied()
            .filter(|field| value.get(field).map_or(true, |v| v.is_null()))
            .collect();
        if !missing.is_empty() {
            return Err(AssistantError::Validation(format!(
                "missing fields: {}",
                missing.join(", ")
            )));
        }

        let mistyped = mistyped_fields(&value);
        if !mistyped.is_empty() {
            return Err(AssistantError::Validation(format!(
                "wrong type for fields: {}",
                mistyped.join(", ")
            )));
        }
    }

    let result: AnalysisResult =
        serde_json::from_value(value).map_err(|e| AssistantError::Parse(e.to_string()))?;

    if strict {
        let issues = result.validate();
        if !issues.is_empty() {
            return Err(AssistantError::Validation(issues.join("; ")));
        }
    }

    Ok(result)
}

/// Present fields whose JSON type differs from the expected schema
fn mistyped_fields(value: &Value) -> Vec<&'static str> {
    let is_string_list =
        |v: &Value| v.as_array().map_or(false, |items| items.iter().all(Value::is_string));

    REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| match value.get(field) {
            None | Some(Value::Null) => false,
            Some(v) => match *field {
                "overallFitSummary" => !v.is_string(),
                "matchScore" => !v.is_number(),
                _ => !is_string_list(v),
            },
        })
        .collect()
}
