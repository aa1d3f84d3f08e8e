//! Runs the fetch stage in parallel, then the gap analysis

use crate::config::Config;
use crate::error::Result;
use crate::llm::client::GenerativeClient;
use crate::llm::prompts::PromptTemplates;
use crate::pipeline::analysis::run_gap_analysis;
use crate::pipeline::fetch::{extract_resume_attachment, fetch_job_context};
use crate::pipeline::memory::MemoryBank;
use crate::telemetry::{LogSink, TelemetryRecorder, TelemetrySpan};
use crate::types::AnalysisResult;
use std::path::Path;
use std::sync::Arc;

/// Outcome of one successful orchestration
#[derive(Debug, Clone)]
pub struct AnalysisRun {
    pub result: AnalysisResult,
    pub memory: MemoryBank,
    pub spans: Vec<TelemetrySpan>,
}

pub struct Orchestrator {
    client: Arc<dyn GenerativeClient>,
    prompts: PromptTemplates,
    web_search: bool,
    strict_validation: bool,
}

impl Orchestrator {
    pub fn new(client: Arc<dyn GenerativeClient>) -> Self {
        Self {
            client,
            prompts: PromptTemplates::default(),
            web_search: true,
            strict_validation: false,
        }
    }

    pub fn from_config(client: Arc<dyn GenerativeClient>, config: &Config) -> Self {
        Self::new(client)
            .with_web_search(config.api.enable_search)
            .with_strict_validation(config.analysis.strict_validation)
    }

    pub fn with_web_search(mut self, enabled: bool) -> Self {
        self.web_search = enabled;
        self
    }

    pub fn with_strict_validation(mut self, enabled: bool) -> Self {
        self.strict_validation = enabled;
        self
    }

    pub fn with_prompts(mut self, prompts: PromptTemplates) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn client(&self) -> Arc<dyn GenerativeClient> {
        self.client.clone()
    }

    pub fn prompts(&self) -> &PromptTemplates {
        &self.prompts
    }

    /// Analyze `resume_path` against the job at `job_url`.
    ///
    /// Job research and résumé encoding run concurrently and must both
    /// succeed; the first failure aborts the run before the gap analysis.
    /// Errors are returned unchanged and nothing is retried.
    pub async fn run(
        &self,
        resume_path: &Path,
        job_url: &str,
        sink: Arc<dyn LogSink>,
    ) -> Result<AnalysisRun> {
        let telemetry = TelemetryRecorder::new(sink);
        let mut memory = MemoryBank::new();

        telemetry.info("Orchestrator starting parallel agents...");

        let (job_context, attachment) = tokio::try_join!(
            fetch_job_context(
                self.client.as_ref(),
                &telemetry,
                &self.prompts,
                job_url,
                self.web_search,
            ),
            extract_resume_attachment(&telemetry, resume_path),
        )?;

        memory.job_description = Some(job_context.clone());
        memory.resume_attachment = Some(attachment.clone());

        let result = run_gap_analysis(
            self.client.as_ref(),
            &telemetry,
            &self.prompts,
            &attachment,
            &job_context,
            self.strict_validation,
        )
        .await?;
        memory.analysis_context = Some(result.clone());

        Ok(AnalysisRun {
            result,
            memory,
            spans: telemetry.spans(),
        })
    }
}
