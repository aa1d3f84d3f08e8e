//! Report structure presented after an analysis run

use crate::telemetry::TelemetrySpan;
use crate::types::AnalysisResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Analysis result plus the metadata shown around it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitReport {
    pub job_url: String,
    pub resume_file: String,
    pub analysis: AnalysisResult,
    pub rating: ScoreRating,
    /// Skills the job asks for that the candidate list does not contain
    pub unmatched_requirements: Vec<String>,
    pub stages: Vec<StageTiming>,
    pub generated_at: DateTime<Utc>,
    pub model: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreRating {
    Excellent,
    VeryGood,
    Good,
    Fair,
    BelowAverage,
    Poor,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageTiming {
    pub subject: String,
    pub action: String,
    pub status: String,
    pub duration_ms: Option<u64>,
}

impl ScoreRating {
    pub fn from_score(score: i64) -> Self {
        match score {
            90..=i64::MAX => ScoreRating::Excellent,
            80..=89 => ScoreRating::VeryGood,
            70..=79 => ScoreRating::Good,
            60..=69 => ScoreRating::Fair,
            50..=59 => ScoreRating::BelowAverage,
            _ => ScoreRating::Poor,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreRating::Excellent => "EXCELLENT",
            ScoreRating::VeryGood => "VERY GOOD",
            ScoreRating::Good => "GOOD",
            ScoreRating::Fair => "FAIR",
            ScoreRating::BelowAverage => "BELOW AVG",
            ScoreRating::Poor => "POOR",
        }
    }
}

impl FitReport {
    pub fn new(
        analysis: AnalysisResult,
        job_url: impl Into<String>,
        resume_file: impl Into<String>,
        model: impl Into<String>,
        spans: &[TelemetrySpan],
    ) -> Self {
        let unmatched_requirements = unmatched_requirements(&analysis);
        let stages = spans
            .iter()
            .map(|span| StageTiming {
                subject: span.subject.clone(),
                action: span.action.clone(),
                status: span.status.to_string(),
                duration_ms: span.duration_ms,
            })
            .collect();

        Self {
            job_url: job_url.into(),
            resume_file: resume_file.into(),
            rating: ScoreRating::from_score(analysis.match_score),
            analysis,
            unmatched_requirements,
            stages,
            generated_at: Utc::now(),
            model: model.into(),
        }
    }

    /// Sum of the recorded stage durations
    pub fn total_duration_ms(&self) -> u64 {
        self.stages.iter().filter_map(|stage| stage.duration_ms).sum()
    }
}

/// Case-insensitive set difference, keeping the job's order
fn unmatched_requirements(analysis: &AnalysisResult) -> Vec<String> {
    let candidate: Vec<String> = analysis
        .candidate_skills
        .iter()
        .map(|skill| skill.trim().to_lowercase())
        .collect();

    analysis
        .required_job_skills
        .iter()
        .filter(|skill| !candidate.contains(&skill.trim().to_lowercase()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analysis(score: i64) -> AnalysisResult {
        AnalysisResult {
            overall_fit_summary: "Summary".to_string(),
            candidate_skills: vec!["Rust".to_string(), "sql".to_string()],
            required_job_skills: vec!["rust".to_string(), "SQL".to_string(), "Kubernetes".to_string()],
            gap_analysis: vec!["Kubernetes".to_string()],
            match_score: score,
        }
    }

    #[test]
    fn test_rating_thresholds() {
        assert_eq!(ScoreRating::from_score(100), ScoreRating::Excellent);
        assert_eq!(ScoreRating::from_score(85), ScoreRating::VeryGood);
        assert_eq!(ScoreRating::from_score(70), ScoreRating::Good);
        assert_eq!(ScoreRating::from_score(60), ScoreRating::Fair);
        assert_eq!(ScoreRating::from_score(55).label(), "BELOW AVG");
        assert_eq!(ScoreRating::from_score(-4), ScoreRating::Poor);
    }

    #[test]
    fn test_unmatched_requirements_ignore_case() {
        let report = FitReport::new(analysis(72), "https://example.com", "cv.pdf", "gemini-2.5-flash", &[]);
        assert_eq!(report.unmatched_requirements, vec!["Kubernetes"]);
        assert_eq!(report.rating, ScoreRating::Good);
        assert_eq!(report.total_duration_ms(), 0);
    }
}
