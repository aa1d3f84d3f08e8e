//! Markdown CV -> Word-compatible HTML document

use crate::config::DEFAULT_CV_FILE_NAME;
use crate::error::{AssistantError, Result};
use askama::Template;
use log::info;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub const WORD_MIME_TYPE: &str = "application/msword";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const H1_STYLE: &str = "font-size: 24pt; font-family: Arial, sans-serif; color: #333; border-bottom: 2px solid #333; padding-bottom: 10px; margin-bottom: 20px;";
const H2_STYLE: &str = "font-size: 16pt; font-family: Arial, sans-serif; color: #334155; margin-top: 20px; margin-bottom: 10px; text-transform: uppercase;";
const H3_STYLE: &str = "font-size: 13pt; font-family: Arial, sans-serif; color: #475569; margin-top: 15px; margin-bottom: 5px; font-weight: bold;";
const LI_STYLE: &str = "margin-bottom: 5px;";
const P_STYLE: &str = "font-family: Arial, sans-serif; font-size: 11pt; line-height: 1.5; margin-bottom: 10px;";

#[derive(Template)]
#[template(source = r#"<html xmlns:o='urn:schemas-microsoft-com:office:office' xmlns:w='urn:schemas-microsoft-com:office:word' xmlns='http://www.w3.org/TR/REC-html40'>
<head>
<meta charset="utf-8">
<title>{{ title }}</title>
<style>body { font-family: Arial, sans-serif; font-size: 11pt; }</style>
</head>
<body>{{ body|safe }}</body>
</html>"#, ext = "html")]
struct WordEnvelope<'a> {
    title: &'a str,
    body: &'a str,
}

/// A rendered document ready to be written to disk
#[derive(Debug, Clone)]
pub struct WordDocument {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

enum Line {
    Heading(u8, String),
    Item(String),
    Blank,
    Paragraph(String),
}

fn list_item_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*-\s+(.*)$").expect("valid list item pattern"))
}

fn strong_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid strong pattern"))
}

/// One line of CV text through askama's HTML escaper
#[derive(Template)]
#[template(source = "{{ text }}", ext = "html")]
struct EscapedText<'a> {
    text: &'a str,
}

fn classify_line(line: &str) -> Result<Line> {
    let escaped = EscapedText { text: line }.render()?;
    let line = strong_pattern()
        .replace_all(&escaped, "<strong>$1</strong>")
        .into_owned();

    Ok(if let Some(text) = line.strip_prefix("# ") {
        Line::Heading(1, text.to_string())
    } else if let Some(text) = line.strip_prefix("## ") {
        Line::Heading(2, text.to_string())
    } else if let Some(text) = line.strip_prefix("### ") {
        Line::Heading(3, text.to_string())
    } else if let Some(caps) = list_item_pattern().captures(&line) {
        Line::Item(caps[1].to_string())
    } else if line.trim().is_empty() {
        Line::Blank
    } else {
        Line::Paragraph(line)
    })
}

/// Convert a Markdown CV into the HTML body of a Word document.
///
/// Only the subset the coach produces is recognised: `#`/`##`/`###` headings,
/// `**bold**`, `- ` list items, blank lines and plain paragraphs. All list
/// items share one `<ul>` running from the first item to the last.
pub fn markdown_to_word_html(markdown: &str) -> Result<String> {
    let lines = markdown
        .lines()
        .map(classify_line)
        .collect::<Result<Vec<Line>>>()?;
    let first_item = lines.iter().position(|line| matches!(line, Line::Item(_)));
    let last_item = lines.iter().rposition(|line| matches!(line, Line::Item(_)));

    Ok(lines
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let mut html = match line {
                Line::Heading(1, text) => format!("<h1 style=\"{}\">{}</h1>", H1_STYLE, text),
                Line::Heading(2, text) => format!("<h2 style=\"{}\">{}</h2>", H2_STYLE, text),
                Line::Heading(_, text) => format!("<h3 style=\"{}\">{}</h3>", H3_STYLE, text),
                Line::Item(text) => format!("<li style=\"{}\">{}</li>", LI_STYLE, text),
                Line::Blank => "<br/>".to_string(),
                Line::Paragraph(text) => format!("<p style=\"{}\">{}</p>", P_STYLE, text),
            };
            if Some(index) == first_item {
                html.insert_str(0, "<ul>");
            }
            if Some(index) == last_item {
                html.push_str("</ul>");
            }
            html
        })
        .collect::<Vec<_>>()
        .join("\n"))
}

impl WordDocument {
    pub fn from_markdown(markdown: &str) -> Result<Self> {
        Self::from_markdown_named(markdown, DEFAULT_CV_FILE_NAME)
    }

    pub fn from_markdown_named(markdown: &str, file_name: impl Into<String>) -> Result<Self> {
        let body = markdown_to_word_html(markdown)?;
        let html = WordEnvelope {
            title: "Proposed CV",
            body: &body,
        }
        .render()?;

        let mut bytes = Vec::with_capacity(UTF8_BOM.len() + html.len());
        bytes.extend_from_slice(UTF8_BOM);
        bytes.extend_from_slice(html.as_bytes());

        Ok(Self {
            file_name: file_name.into(),
            mime_type: WORD_MIME_TYPE,
            bytes,
        })
    }

    /// Write the document; a directory target receives `file_name` inside it.
    pub fn write_to(&self, target: &Path) -> Result<PathBuf> {
        let path = if target.is_dir() {
            target.join(&self.file_name)
        } else {
            target.to_path_buf()
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&path, &self.bytes)?;
        info!("Wrote {} ({} bytes) to {}", self.mime_type, self.bytes.len(), path.display());
        Ok(path)
    }
}

/// Read a Markdown CV from `source` and write it as a Word document to `target`
pub async fn export_markdown_file(source: &Path, target: &Path, file_name: &str) -> Result<PathBuf> {
    let markdown = tokio::fs::read_to_string(source)
        .await
        .map_err(|e| AssistantError::ReadError {
            path: source.to_path_buf(),
            source: e,
        })?;
    WordDocument::from_markdown_named(&markdown, file_name)?.write_to(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const CV: &str = "# Jane Doe\n## Experience\n### Acme Corp\n- Built **Rust** services\n- Led migrations\n\nShipped on time.";

    #[test]
    fn test_headings_and_paragraphs() {
        let html = markdown_to_word_html(CV).unwrap();
        let lines: Vec<&str> = html.lines().collect();
        assert!(lines[0].starts_with("<h1 style=") && lines[0].ends_with(">Jane Doe</h1>"));
        assert!(lines[1].starts_with("<h2 ") && lines[1].contains("text-transform: uppercase"));
        assert!(lines[2].starts_with("<h3 ") && lines[2].ends_with(">Acme Corp</h3>"));
        assert_eq!(lines[5], "<br/>");
        assert!(lines[6].starts_with("<p style=") && lines[6].ends_with(">Shipped on time.</p>"));
    }

    #[test]
    fn test_single_list_container() {
        let html = markdown_to_word_html(CV).unwrap();
        assert_eq!(html.matches("<ul>").count(), 1);
        assert_eq!(html.matches("</ul>").count(), 1);
        assert!(html.contains("<ul><li style=\"margin-bottom: 5px;\">Built <strong>Rust</strong> services</li>"));
        assert!(html.contains(">Led migrations</li></ul>"));
    }

    #[test]
    fn test_list_container_spans_interleaved_text() {
        let html = markdown_to_word_html("- one\nbetween\n  - two").unwrap();
        let lines: Vec<&str> = html.lines().collect();
        assert!(lines[0].starts_with("<ul><li"));
        assert!(lines[1].starts_with("<p "));
        assert!(lines[2].ends_with(">two</li></ul>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let html = markdown_to_word_html("C++ & <Go> **\"fast\"** it's").unwrap();
        assert!(html.starts_with("<p style="));
        assert!(html.contains("C++ &"));
        assert!(!html.contains(" & "));
        assert!(!html.contains("<Go>"));
        assert!(!html.contains("\"fast\""));
        assert!(!html.contains("it's"));
        assert!(html.contains("<strong>") && html.contains("fast") && html.contains("</strong>"));
    }

    #[test]
    fn test_document_envelope() {
        let doc = WordDocument::from_markdown(CV).unwrap();
        assert_eq!(doc.file_name, "Proposed_CV.doc");
        assert_eq!(doc.mime_type, "application/msword");
        assert!(doc.bytes.starts_with(UTF8_BOM));

        let text = String::from_utf8(doc.bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        assert!(text.contains("xmlns:o='urn:schemas-microsoft-com:office:office'"));
        assert!(text.contains("xmlns:w='urn:schemas-microsoft-com:office:word'"));
        assert!(text.contains("<title>Proposed CV</title>"));
        assert!(text.contains("<body><h1 style="));
    }

    #[test]
    fn test_write_into_directory() {
        let dir = TempDir::new().unwrap();
        let doc = WordDocument::from_markdown("# Jane").unwrap();
        let path = doc.write_to(dir.path()).unwrap();
        assert_eq!(path, dir.path().join("Proposed_CV.doc"));
        assert_eq!(std::fs::read(path).unwrap(), doc.bytes);
    }

    #[tokio::test]
    async fn test_export_missing_source() {
        let dir = TempDir::new().unwrap();
        let result = export_markdown_file(&dir.path().join("none.md"), dir.path(), "cv.doc").await;
        assert!(matches!(result, Err(AssistantError::ReadError { .. })));
    }
}
