//! Job fit assistant library

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod session;
pub mod telemetry;
pub mod types;

pub use config::Config;
pub use error::{AssistantError, Result};
pub use session::AssistantSession;
pub use types::{AnalysisResult, ChatMessage, ResumeAttachment, Speaker, ViewMode};
