//! Analysis pipeline
//! Fetch (parallel) -> gap analysis -> memory bank -> conversation

pub mod analysis;
pub mod conversation;
pub mod fetch;
pub mod memory;
pub mod orchestrator;

use std::fmt;

pub use analysis::{parse_analysis, run_gap_analysis, sanitize_json_response};
pub use conversation::{classify_reply, ChatSession, ReplyKind};
pub use fetch::{extract_resume_attachment, fetch_job_context};
pub use memory::MemoryBank;
pub use orchestrator::{AnalysisRun, Orchestrator};

/// Pipeline stages, used to label telemetry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    JobResearch,
    ResumeParsing,
    GapAnalysis,
}

impl Stage {
    pub fn subject(&self) -> &'static str {
        match self {
            Stage::JobResearch => "Job_Architect_Agent",
            Stage::ResumeParsing => "Resume_Parser_Agent",
            Stage::GapAnalysis => "Gap_Analysis_Agent",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.subject())
    }
}
