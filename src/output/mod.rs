pub mod formatter;
pub mod preview;
pub mod report;
pub mod word;

pub use formatter::{
    format_log_entry, format_transcript, OutputFormatter, ReportGenerator,
};
pub use preview::render_cv_preview;
pub use report::{FitReport, ScoreRating};
pub use word::{export_markdown_file, markdown_to_word_html, WordDocument};
