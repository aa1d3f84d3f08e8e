//! Core data model shared by the pipeline, the session and the output layer

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Structured fit report returned by the gap analysis call.
///
/// Every field falls back to an empty value when the model omits it or sends
/// an unusable type, and the score is kept even when it lies outside 0..=100.
/// Use [`AnalysisResult::validate`] to enforce the shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisResult {
    #[serde(deserialize_with = "deserialize_text")]
    pub overall_fit_summary: String,
    #[serde(deserialize_with = "deserialize_list")]
    pub candidate_skills: Vec<String>,
    #[serde(deserialize_with = "deserialize_list")]
    pub required_job_skills: Vec<String>,
    #[serde(deserialize_with = "deserialize_list")]
    pub gap_analysis: Vec<String>,
    #[serde(deserialize_with = "deserialize_score")]
    pub match_score: i64,
}

/// Field names the model is asked to return
pub const REQUIRED_FIELDS: [&str; 5] = [
    "overallFitSummary",
    "candidateSkills",
    "requiredJobSkills",
    "gapAnalysis",
    "matchScore",
];

impl AnalysisResult {
    /// Problems with the result's shape; empty when it satisfies the invariants
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !(0..=100).contains(&self.match_score) {
            issues.push(format!("matchScore {} is outside 0-100", self.match_score));
        }
        if self.overall_fit_summary.trim().is_empty() {
            issues.push("overallFitSummary is empty".to_string());
        }

        for (name, items) in [
            ("candidateSkills", &self.candidate_skills),
            ("requiredJobSkills", &self.required_job_skills),
            ("gapAnalysis", &self.gap_analysis),
        ] {
            if items.iter().any(|item| item.trim().is_empty()) {
                issues.push(format!("{} contains an empty entry", name));
            }
        }

        issues
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

/// Strings pass through, numbers and booleans are printed, anything else is empty
fn deserialize_text<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
}

/// Arrays keep their scalar entries; a lone string is split on commas
fn deserialize_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
        Value::String(text) => text
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    })
}

/// Accepts integers, floats (rounded) and numeric strings; anything else is 0
fn deserialize_score<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|f| f.round() as i64))
            .unwrap_or_default(),
        Value::String(text) => {
            let text = text.trim();
            text.parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().map(|f| f.round() as i64))
                .unwrap_or_default()
        }
        _ => 0,
    })
}

/// Résumé bytes encoded for inline transport to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeAttachment {
    /// Standard-alphabet base64 of the whole file
    pub data: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub speaker: Speaker,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    #[default]
    Analysis,
    CvPreview,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_result() {
        let json = r#"{
            "overallFitSummary": "Strong backend match",
            "candidateSkills": ["Rust", "Postgres"],
            "requiredJobSkills": ["Rust", "Kubernetes"],
            "gapAnalysis": ["No Kubernetes experience"],
            "matchScore": 72
        }"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.match_score, 72);
        assert_eq!(result.candidate_skills, vec!["Rust", "Postgres"]);
        assert!(result.validate().is_empty());
    }

    #[test]
    fn test_missing_fields_and_fractional_score() {
        let result: AnalysisResult = serde_json::from_str(r#"{"matchScore": 81.6}"#).unwrap();
        assert_eq!(result.match_score, 82);
        assert!(result.gap_analysis.is_empty());
        assert!(result.overall_fit_summary.is_empty());
    }

    #[test]
    fn test_wrong_typed_fields_fall_back() {
        let json = r#"{
            "overallFitSummary": null,
            "candidateSkills": "Rust, Go",
            "requiredJobSkills": {"primary": "Rust"},
            "gapAnalysis": ["Kubernetes", null, 3],
            "matchScore": " 85 "
        }"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.overall_fit_summary, "");
        assert_eq!(result.candidate_skills, vec!["Rust", "Go"]);
        assert!(result.required_job_skills.is_empty());
        assert_eq!(result.gap_analysis, vec!["Kubernetes", "3"]);
        assert_eq!(result.match_score, 85);
    }

    #[test]
    fn test_unusable_score_is_zero() {
        let result: AnalysisResult = serde_json::from_str(r#"{"matchScore": "high"}"#).unwrap();
        assert_eq!(result.match_score, 0);
        let result: AnalysisResult = serde_json::from_str(r#"{"matchScore": "72.5"}"#).unwrap();
        assert_eq!(result.match_score, 73);
    }

    #[test]
    fn test_out_of_range_score_is_kept_but_flagged() {
        let result: AnalysisResult =
            serde_json::from_str(r#"{"overallFitSummary": "ok", "matchScore": 140}"#).unwrap();
        assert_eq!(result.match_score, 140);

        let issues = result.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("140"));
    }

    #[test]
    fn test_validate_flags_empty_entries() {
        let result = AnalysisResult {
            overall_fit_summary: "fine".to_string(),
            candidate_skills: vec!["Rust".to_string(), " ".to_string()],
            required_job_skills: vec![],
            gap_analysis: vec![String::new()],
            match_score: 50,
        };
        let issues = result.validate();
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn test_speaker_serializes_lowercase() {
        let message = ChatMessage::assistant("hi");
        let json = serde_json::to_string(&message).unwrap();
        assert_eq!(json, r#"{"speaker":"assistant","text":"hi"}"#);
    }
}
