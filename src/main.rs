//! job-fit: compare a resume with a job posting and coach the candidate

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use job_fit_assistant::cli::{self, ChatCommand, Cli, Commands, ConfigAction};
use job_fit_assistant::config::{Config, OutputConfig, OutputFormat};
use job_fit_assistant::llm::GeminiClient;
use job_fit_assistant::output::formatter::{resolve_save_path, save_report_to_file};
use job_fit_assistant::output::{
    export_markdown_file, format_log_entry, format_transcript, render_cv_preview, FitReport,
    ReportGenerator, WordDocument,
};
use job_fit_assistant::pipeline::Orchestrator;
use job_fit_assistant::session::{AssistantSession, CV_UPDATED_REPLY};
use job_fit_assistant::telemetry::{LogEntry, LogSink};
use job_fit_assistant::types::{ChatMessage, ViewMode};
use job_fit_assistant::AssistantError;
use log::{debug, error, info};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Stage progress is shown by the log feed; env_logger reports warnings only
    let log_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Err(e) = dotenvy::dotenv() {
        debug!("No .env file loaded: {}", e);
    }

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let config = match Config::load_from(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            eprintln!("❌ {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("Command failed: {:#}", e);
        eprintln!("❌ {:#}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config: Config, config_path: &Path) -> anyhow::Result<()> {
    match command {
        Commands::Analyze {
            resume,
            job_url,
            output,
            save,
            strict,
            no_search,
            chat,
        } => {
            info!("Starting job fit analysis");

            cli::validate_file_extension(&resume, &["pdf", "txt", "md"])
                .map_err(|e| AssistantError::InvalidInput(format!("Resume file: {}", e)))?;

            let output_format = match output {
                Some(format) => cli::parse_output_format(&format).map_err(AssistantError::InvalidInput)?,
                None => config.output.format,
            };

            let api_key = config.resolve_api_key()?;
            let client = GeminiClient::from_config(&config.api, api_key)?;
            let model = client.model().to_string();
            let orchestrator = Orchestrator::from_config(Arc::new(client), &config)
                .with_web_search(config.api.enable_search && !no_search)
                .with_strict_validation(config.analysis.strict_validation || strict);

            let use_colors = config.output.color_output;
            if output_format == OutputFormat::Console {
                println!("🚀 Job fit analysis");
                println!("📄 Resume: {}", resume.display());
                println!("💼 Job: {}", job_url);
                println!("🤖 Model: {}\n", model);
            }

            let progress = spinner("Agents working...");
            let feed = progress.clone();
            let sink: Arc<dyn LogSink> = Arc::new(move |entry: &LogEntry| {
                let line = format_log_entry(entry, use_colors);
                feed.suspend(|| eprintln!("{}", line));
            });

            let mut session = AssistantSession::with_log_sink(orchestrator, sink);
            let outcome = session
                .run_analysis(&resume, &job_url)
                .await
                .cloned();
            progress.finish_and_clear();
            let result = outcome.context("Analysis failed")?;

            let report = FitReport::new(
                result,
                &job_url,
                resume.display().to_string(),
                &model,
                session.spans(),
            );
            let generator = ReportGenerator::from_config(&config.output);
            println!("{}", generator.generate_report(&report, output_format)?);

            if let Some(target) = save {
                let plain = ReportGenerator::from_config(&OutputConfig {
                    color_output: false,
                    ..config.output.clone()
                });
                let content = plain.generate_report(&report, output_format)?;
                let path = resolve_save_path(&target, output_format, &resume.to_string_lossy());
                save_report_to_file(&content, &path)
                    .with_context(|| format!("Failed to save report to {}", path.display()))?;
                println!("💾 Report saved to {}", path.display());
            }

            if chat {
                run_chat_loop(&mut session, &config).await?;
            }
        }

        Commands::Export { cv, out } => {
            let target = out.unwrap_or_else(|| PathBuf::from(&config.export.file_name));
            let path = export_markdown_file(&cv, &target, &config.export.file_name).await?;
            println!("✅ Word document written to {}", path.display());
        }

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("⚙️  Current Configuration ({})\n", config_path.display());
                println!("{}", toml::to_string_pretty(&config).context("Failed to render configuration")?);
                let key_status = if config.resolve_api_key().is_ok() { "found" } else { "missing" };
                println!("API key ({}): {}", config.api.api_key_env, key_status);
            }

            Some(ConfigAction::Reset) => {
                println!("🔄 Resetting configuration to defaults...");
                Config::default().save_to(config_path)?;
                println!("✅ Configuration reset successfully!");
            }

            Some(ConfigAction::Set { key, value }) => {
                let mut updated = config;
                updated.set_value(&key, &value)?;
                updated.save_to(config_path)?;
                println!("🔧 Set {} = {}", key, value);
            }
        },
    }

    Ok(())
}

async fn run_chat_loop(session: &mut AssistantSession, config: &Config) -> anyhow::Result<()> {
    let use_colors = config.output.color_output;
    print_chat_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let prompt = match session.view_mode() {
            ViewMode::Analysis => "you>",
            ViewMode::CvPreview => "cv>",
        };
        print!("{} ", if use_colors { prompt.cyan().bold().to_string() } else { prompt.to_string() });
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let Some(command) = cli::parse_chat_command(&line) else {
            continue;
        };

        match command {
            ChatCommand::Message(text) => {
                let progress = spinner("Coach is typing...");
                let reply = session.send_chat_message(&text).await.cloned();
                progress.finish_and_clear();
                let reply = reply?;
                print_message(&reply, use_colors);
                if reply.text == CV_UPDATED_REPLY {
                    print_cv(session, use_colors);
                }
            }
            ChatCommand::Draft => {
                let progress = spinner("Drafting your CV...");
                let reply = session.draft_cv().await.cloned();
                progress.finish_and_clear();
                print_message(&reply?, use_colors);
                if session.view_mode() == ViewMode::CvPreview {
                    print_cv(session, use_colors);
                }
            }
            ChatCommand::ShowCv => print_cv(session, use_colors),
            ChatCommand::CopyCv => match session.generated_cv() {
                Some(cv) => println!("{}", cv),
                None => println!("💡 No CV drafted yet. Use /draft first."),
            },
            ChatCommand::Export(target) => match session.generated_cv() {
                Some(cv) => {
                    let document = WordDocument::from_markdown_named(cv, config.export.file_name.as_str())?;
                    let target = target.unwrap_or_else(|| PathBuf::from(&config.export.file_name));
                    let path = document.write_to(&target)?;
                    println!("📄 Saved {} to {}", document.mime_type, path.display());
                }
                None => println!("💡 No CV drafted yet. Use /draft first."),
            },
            ChatCommand::Back => {
                session.back_to_analysis();
                println!("↩️  Back to analysis view");
            }
            ChatCommand::Help => print_chat_help(),
            ChatCommand::Quit => break,
        }
    }

    println!("👋 Goodbye!");
    Ok(())
}

fn spinner(message: &str) -> ProgressBar {
    let progress = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        progress.set_style(style);
    }
    progress.set_message(message.to_string());
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

fn print_message(message: &ChatMessage, use_colors: bool) {
    print!("{}", format_transcript(std::slice::from_ref(message), use_colors));
}

fn print_cv(session: &AssistantSession, use_colors: bool) {
    match session.generated_cv() {
        Some(cv) => {
            println!("\n{}", "─".repeat(60));
            print!("{}", render_cv_preview(cv, use_colors));
            println!("{}", "─".repeat(60));
        }
        None => println!("💡 No CV drafted yet. Use /draft first."),
    }
}

fn print_chat_help() {
    println!("\n💬 Career coach chat. Type a message, or one of:");
    println!("  /draft          Draft a tailored CV");
    println!("  /cv             Show the drafted CV");
    println!("  /copy           Print the CV as raw Markdown");
    println!("  /export [path]  Save the CV as a Word document");
    println!("  /back           Return to the analysis view");
    println!("  /quit           Leave the chat\n");
}
