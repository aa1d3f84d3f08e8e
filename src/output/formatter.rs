//! Output formatters for the fit report, log lines and chat transcript

use crate::config::{OutputConfig, OutputFormat};
use crate::error::Result;
use crate::output::report::{FitReport, ScoreRating};
use crate::telemetry::{LogEntry, LogKind};
use crate::types::{ChatMessage, Speaker};
use colored::{Color, Colorize};
use std::path::{Path, PathBuf};

/// Trait for formatting fit reports
pub trait OutputFormatter {
    fn format_report(&self, report: &FitReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter with colors and section headers
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

/// JSON formatter for scripting and storage
pub struct JsonFormatter {
    pretty: bool,
}

/// Markdown formatter for sharing reports
pub struct MarkdownFormatter {
    include_metadata: bool,
}

/// Report generator that picks the formatter for a format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str, level: u8) -> String {
        let prefix = match level {
            1 => "█",
            2 => "▓",
            3 => "▒",
            _ => "░",
        };

        let color = match level {
            1 => Color::Blue,
            2 => Color::Green,
            3 => Color::Yellow,
            _ => Color::White,
        };

        if self.use_colors {
            format!("\n{} {}\n", prefix.color(color).bold(), title.color(color).bold())
        } else {
            format!("\n{} {}\n", prefix, title)
        }
    }

    fn format_score_badge(&self, rating: ScoreRating) -> String {
        let color = match rating {
            ScoreRating::Excellent => Color::Green,
            ScoreRating::VeryGood => Color::BrightGreen,
            ScoreRating::Good => Color::Yellow,
            ScoreRating::Fair => Color::BrightYellow,
            ScoreRating::BelowAverage => Color::Red,
            ScoreRating::Poor => Color::BrightRed,
        };

        if self.use_colors {
            format!("[{}]", rating.label().color(color).bold())
        } else {
            format!("[{}]", rating.label())
        }
    }

    fn format_skill_list(&self, output: &mut String, skills: &[String], color: Color) {
        if skills.is_empty() {
            output.push_str(&format!("  {}\n", self.colorize("(none reported)", Color::BrightBlack)));
            return;
        }
        for skill in skills {
            output.push_str(&format!("  • {}\n", self.colorize(skill, color)));
        }
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &FitReport) -> Result<String> {
        let mut output = String::new();
        let analysis = &report.analysis;

        output.push_str(&self.format_header("📊 JOB FIT ANALYSIS", 1));
        output.push_str(&format!(
            "Generated: {} | Job: {}\n",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.colorize(&report.job_url, Color::Cyan)
        ));

        output.push_str(&self.format_header("Match Score", 2));
        output.push_str(&format!(
            "{}/100 {}\n",
            analysis.match_score,
            self.format_score_badge(report.rating)
        ));

        output.push_str(&self.format_header("Overall Fit", 2));
        output.push_str(&format!("{}\n", analysis.overall_fit_summary.trim()));

        output.push_str(&self.format_header("✅ Your Skills", 3));
        self.format_skill_list(&mut output, &analysis.candidate_skills, Color::Green);

        output.push_str(&self.format_header("🎯 Required Skills", 3));
        if analysis.required_job_skills.is_empty() {
            self.format_skill_list(&mut output, &[], Color::White);
        }
        for skill in &analysis.required_job_skills {
            let (mark, color) = if report.unmatched_requirements.contains(skill) {
                ("✗", Color::Red)
            } else {
                ("✓", Color::Green)
            };
            output.push_str(&format!("  {} {}\n", self.colorize(mark, color), skill));
        }

        output.push_str(&self.format_header("🚨 Gap Analysis", 2));
        self.format_skill_list(&mut output, &analysis.gap_analysis, Color::Yellow);

        if self.detailed && !report.stages.is_empty() {
            output.push_str(&self.format_header("⏱️ Stage Timings", 3));
            for stage in &report.stages {
                let duration = stage
                    .duration_ms
                    .map(|ms| format!("{}ms", ms))
                    .unwrap_or_else(|| "-".to_string());
                output.push_str(&format!(
                    "  {} {} {}\n",
                    self.colorize(&stage.subject, Color::Magenta),
                    stage.action,
                    self.colorize(&format!("[{} {}]", stage.status, duration), Color::BrightBlack)
                ));
            }
            output.push_str(&format!("  Total: {}ms\n", report.total_duration_ms()));
        }

        output.push_str(&format!(
            "\n{} Resume: {} | Model: {}\n",
            self.colorize("ℹ️", Color::Blue),
            report.resume_file,
            report.model
        ));

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &FitReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool) -> Self {
        Self { include_metadata }
    }

    fn markdown_score_badge(rating: ScoreRating) -> &'static str {
        match rating {
            ScoreRating::Excellent => "🟢 Excellent",
            ScoreRating::VeryGood => "🟡 Very Good",
            ScoreRating::Good => "🟠 Good",
            ScoreRating::Fair => "🔴 Fair",
            ScoreRating::BelowAverage => "🔴 Below Average",
            ScoreRating::Poor => "🔴 Poor",
        }
    }

    fn push_bullets(output: &mut String, items: &[String]) {
        if items.is_empty() {
            output.push_str("_None reported._\n\n");
            return;
        }
        for item in items {
            output.push_str(&format!("- {}\n", item));
        }
        output.push('\n');
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &FitReport) -> Result<String> {
        let mut output = String::new();
        let analysis = &report.analysis;

        output.push_str("# 📊 Job Fit Analysis\n\n");

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Model:** {}\n",
                report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                report.model
            ));
            output.push_str(&format!(
                "**Resume:** `{}` | **Job:** <{}>\n\n",
                report.resume_file, report.job_url
            ));
        }

        output.push_str("## Match Score\n\n");
        output.push_str(&format!(
            "**{}/100** {}\n\n",
            analysis.match_score,
            Self::markdown_score_badge(report.rating)
        ));

        output.push_str("## Overall Fit\n\n");
        output.push_str(&format!("> {}\n\n", analysis.overall_fit_summary.trim()));

        output.push_str("## Skills\n\n");
        output.push_str("| Required Skill | In Resume |\n");
        output.push_str("|----------------|-----------|\n");
        for skill in &analysis.required_job_skills {
            let present = if report.unmatched_requirements.contains(skill) {
                "❌"
            } else {
                "✅"
            };
            output.push_str(&format!("| {} | {} |\n", skill, present));
        }
        output.push('\n');

        output.push_str("### ✅ Candidate Skills\n\n");
        Self::push_bullets(&mut output, &analysis.candidate_skills);

        output.push_str("## 🚨 Gap Analysis\n\n");
        Self::push_bullets(&mut output, &analysis.gap_analysis);

        if self.include_metadata && !report.stages.is_empty() {
            output.push_str("---\n\n");
            output.push_str("| Stage | Action | Status | Duration |\n");
            output.push_str("|-------|--------|--------|----------|\n");
            for stage in &report.stages {
                output.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    stage.subject,
                    stage.action,
                    stage.status,
                    stage.duration_ms.map(|ms| format!("{}ms", ms)).unwrap_or_default()
                ));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(true, false),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(config.color_output, config.detailed),
            json_formatter: JsonFormatter::new(true),
            markdown_formatter: MarkdownFormatter::new(true),
        }
    }

    pub fn generate_report(&self, report: &FitReport, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// One log line as shown in the terminal feed
pub fn format_log_entry(entry: &LogEntry, use_colors: bool) -> String {
    let (icon, color) = match entry.kind {
        LogKind::Info => ("ℹ", Color::Blue),
        LogKind::Success => ("✔", Color::Green),
        LogKind::Agent => ("⚙", Color::Magenta),
        LogKind::Error => ("✖", Color::Red),
    };
    let time = entry.timestamp.format("%H:%M:%S").to_string();
    let subject = entry
        .subject_name
        .as_deref()
        .map(|name| format!("[{}] ", name))
        .unwrap_or_default();

    if use_colors {
        format!(
            "{} {} {}{}",
            time.bright_black(),
            icon.color(color),
            subject.color(color).bold(),
            entry.message
        )
    } else {
        format!("{} {} {}{}", time, icon, subject, entry.message)
    }
}

/// Chat transcript in the order the messages were exchanged
pub fn format_transcript(messages: &[ChatMessage], use_colors: bool) -> String {
    let mut output = String::new();
    for message in messages {
        let (label, color) = match message.speaker {
            Speaker::User => ("You", Color::Cyan),
            Speaker::Assistant => ("Coach", Color::Green),
        };
        let label = if use_colors {
            label.color(color).bold().to_string()
        } else {
            label.to_string()
        };
        output.push_str(&format!("{}: {}\n", label, message.text.trim_end()));
    }
    output
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    use std::fs;
    if let Some(parent) = file_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(file_path, content)?;
    Ok(())
}

pub fn suggest_filename(format: OutputFormat, resume_name: &str, timestamp: bool) -> String {
    let base_name = Path::new(resume_name)
        .file_stem()
        .unwrap_or_default()
        .to_string_lossy();

    let timestamp_suffix = if timestamp {
        format!("_{}", chrono::Utc::now().format("%Y%m%d_%H%M%S"))
    } else {
        String::new()
    };

    match format {
        OutputFormat::Console => format!("{}_fit{}.txt", base_name, timestamp_suffix),
        OutputFormat::Json => format!("{}_fit{}.json", base_name, timestamp_suffix),
        OutputFormat::Markdown => format!("{}_fit{}.md", base_name, timestamp_suffix),
    }
}

/// Resolve `--save`: a directory gets a suggested file name inside it
pub fn resolve_save_path(target: &Path, format: OutputFormat, resume_name: &str) -> PathBuf {
    if target.is_dir() {
        target.join(suggest_filename(format, resume_name, true))
    } else {
        target.to_path_buf()
    }
}
