//! Prompt templates for each pipeline stage

/// Prompt templates with `{placeholder}` substitution
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub job_research: String,
    pub gap_analysis: String,
    pub career_coach: String,
    pub draft_cv: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            job_research: JOB_RESEARCH_TEMPLATE.to_string(),
            gap_analysis: GAP_ANALYSIS_TEMPLATE.to_string(),
            career_coach: CAREER_COACH_TEMPLATE.to_string(),
            draft_cv: DRAFT_CV_PROMPT.to_string(),
        }
    }
}

impl PromptTemplates {
    pub fn render_job_research(&self, job_url: &str) -> String {
        self.job_research.replace("{url}", job_url)
    }

    pub fn render_gap_analysis(&self, job_context: &str) -> String {
        self.gap_analysis.replace("{job}", job_context)
    }

    /// System instruction for the chat, seeded with the compacted memory
    pub fn render_career_coach(&self, compacted_context: &str) -> String {
        self.career_coach.replace("{context}", compacted_context.trim())
    }
}

const JOB_RESEARCH_TEMPLATE: &str = "Find the full job description text for this URL: {url}. \
Return a comprehensive summary of the responsibilities and requirements.";

const GAP_ANALYSIS_TEMPLATE: &str = r#"You are an expert Technical Recruiter.

Job Context: {job}

Task: Analyze the provided Resume (PDF) against the Job Context above.

Output Requirements:
Return a single valid JSON object. No markdown formatting.
Structure:
{
  "overallFitSummary": "string",
  "candidateSkills": ["string"],
  "requiredJobSkills": ["string"],
  "gapAnalysis": ["string"],
  "matchScore": number (0-100)
}"#;

const CAREER_COACH_TEMPLATE: &str = r#"You are a dedicated Career Coach.

Current Analysis Context:
{context}

Goal: Help the candidate land this job.

Capabilities:
1. Answer questions about the gaps.
2. "Draft CV": If asked, generate a full ATS-compliant Markdown CV.
   - Use standard headers (# Name, ## Experience).
   - No conversational filler when drafting.

If the user asks for changes to the CV, regenerate the WHOLE CV with improvements."#;

const DRAFT_CV_PROMPT: &str = "Based on our discussion and the initial analysis, please draft the full \
proposed CV now in Markdown format. Remember: Output ONLY the Markdown content.";
