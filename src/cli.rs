//! CLI interface for the job fit assistant

use crate::config::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "job-fit")]
#[command(about = "AI-powered resume and job posting fit analysis")]
#[command(long_about = "Compare a resume against a job posting with a hosted Gemini model, chat with a career coach about the gaps, and export a tailored CV as a Word document")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a resume against a job posting
    Analyze {
        /// Path to resume file (PDF, TXT, MD)
        #[arg(short, long)]
        resume: PathBuf,

        /// URL of the job posting
        #[arg(short, long)]
        job_url: String,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Save the report to a file or directory
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Reject analysis results with missing fields or out-of-range scores
        #[arg(long)]
        strict: bool,

        /// Do not let the model search the web for the posting
        #[arg(long)]
        no_search: bool,

        /// Start an interactive coaching chat after the report
        #[arg(long)]
        chat: bool,
    },

    /// Convert a Markdown CV into a Word document
    Export {
        /// Markdown CV file
        #[arg(long)]
        cv: PathBuf,

        /// Output file or directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Show or change configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., "api.model")
        key: String,

        /// Configuration value
        value: String,
    },
}

/// Commands accepted inside the chat loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    Message(String),
    Draft,
    ShowCv,
    CopyCv,
    Export(Option<PathBuf>),
    Back,
    Help,
    Quit,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown",
            format
        )),
    }
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}

/// Parse one line typed in the chat loop. Blank lines yield `None`.
pub fn parse_chat_command(line: &str) -> Option<ChatCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    if !line.starts_with('/') {
        return Some(ChatCommand::Message(line.to_string()));
    }

    let (command, argument) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    let parsed = match command.to_lowercase().as_str() {
        "/draft" => ChatCommand::Draft,
        "/cv" => ChatCommand::ShowCv,
        "/copy" => ChatCommand::CopyCv,
        "/export" => ChatCommand::Export((!argument.is_empty()).then(|| PathBuf::from(argument))),
        "/back" => ChatCommand::Back,
        "/help" => ChatCommand::Help,
        "/quit" | "/exit" => ChatCommand::Quit,
        _ => ChatCommand::Message(line.to_string()),
    };
    Some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze_command() {
        let cli = Cli::try_parse_from([
            "job-fit",
            "analyze",
            "--resume",
            "cv.pdf",
            "--job-url",
            "https://jobs.example.com/1",
            "--no-search",
            "--chat",
        ])
        .unwrap();

        match cli.command {
            Commands::Analyze { resume, job_url, no_search, chat, strict, output, .. } => {
                assert_eq!(resume, PathBuf::from("cv.pdf"));
                assert_eq!(job_url, "https://jobs.example.com/1");
                assert!(no_search && chat && !strict);
                assert!(output.is_none());
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("MD"), Ok(OutputFormat::Markdown));
        assert_eq!(parse_output_format("json"), Ok(OutputFormat::Json));
        assert!(parse_output_format("pdf").is_err());
    }

    #[test]
    fn test_validate_file_extension() {
        assert!(validate_file_extension(Path::new("cv.PDF"), &["pdf"]).is_ok());
        assert!(validate_file_extension(Path::new("cv.docx"), &["pdf", "txt"]).is_err());
        assert!(validate_file_extension(Path::new("cv"), &["pdf"]).is_err());
    }

    #[test]
    fn test_parse_chat_commands() {
        assert_eq!(parse_chat_command("   "), None);
        assert_eq!(
            parse_chat_command("What should I improve?"),
            Some(ChatCommand::Message("What should I improve?".to_string()))
        );
        assert_eq!(parse_chat_command("/draft"), Some(ChatCommand::Draft));
        assert_eq!(parse_chat_command("/export"), Some(ChatCommand::Export(None)));
        assert_eq!(
            parse_chat_command("/export  out/cv.doc "),
            Some(ChatCommand::Export(Some(PathBuf::from("out/cv.doc"))))
        );
        assert_eq!(parse_chat_command("/QUIT"), Some(ChatCommand::Quit));
        assert_eq!(
            parse_chat_command("/unknown thing"),
            Some(ChatCommand::Message("/unknown thing".to_string()))
        );
    }
}
