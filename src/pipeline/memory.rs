//! Long-lived facts gathered during one analysis run

use crate::types::{AnalysisResult, ResumeAttachment};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of candidate skills kept in the compacted context
const COMPACTED_SKILL_COUNT: usize = 5;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryBank {
    pub job_description: Option<String>,
    pub resume_attachment: Option<ResumeAttachment>,
    pub analysis_context: Option<AnalysisResult>,
    pub user_preferences: HashMap<String, serde_json::Value>,
}

impl MemoryBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Short summary of the analysis for prompt injection.
    ///
    /// Empty when no analysis is stored. Keeps the score, the first five
    /// candidate skills in producer order, and every gap.
    pub fn compacted_context(&self) -> String {
        let Some(analysis) = &self.analysis_context else {
            return String::new();
        };

        let top_skills = analysis
            .candidate_skills
            .iter()
            .take(COMPACTED_SKILL_COUNT)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "Match Score: {}/100.\nTop Skills: {}.\nCritical Gaps: {}.\n",
            analysis.match_score,
            top_skills,
            analysis.gap_analysis.join(", ")
        )
    }

    pub fn set_preference(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.user_preferences.insert(key.into(), value);
    }

    pub fn preference(&self, key: &str) -> Option<&serde_json::Value> {
        self.user_preferences.get(key)
    }
}
