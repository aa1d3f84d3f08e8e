//! Terminal preview of a Markdown CV

use colored::Colorize;
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag};

fn ensure_newline(output: &mut String) {
    if !output.is_empty() && !output.ends_with('\n') {
        output.push('\n');
    }
}

fn styled(text: &str, strong: bool, emphasis: bool, use_colors: bool) -> String {
    if !use_colors {
        return text.to_string();
    }
    match (strong, emphasis) {
        (true, true) => text.bold().italic().to_string(),
        (true, false) => text.bold().to_string(),
        (false, true) => text.italic().to_string(),
        (false, false) => text.to_string(),
    }
}

fn render_heading(level: HeadingLevel, text: &str, use_colors: bool) -> String {
    match level {
        HeadingLevel::H1 => {
            let rule = "═".repeat(text.chars().count().max(3));
            if use_colors {
                format!("{}\n{}\n", text.bright_blue().bold(), rule.bright_blue())
            } else {
                format!("{}\n{}\n", text, rule)
            }
        }
        HeadingLevel::H2 => {
            let upper = text.to_uppercase();
            if use_colors {
                format!("{}\n", upper.green().bold())
            } else {
                format!("{}\n", upper)
            }
        }
        _ => {
            if use_colors {
                format!("{}\n", text.yellow().bold())
            } else {
                format!("{}\n", text)
            }
        }
    }
}

/// Render Markdown for reading in a terminal.
///
/// Headings are emphasised (level-2 headings upper-cased), list items become
/// bullets indented by nesting depth, and inline strong/emphasis map to bold
/// and italic when colors are enabled.
pub fn render_cv_preview(markdown: &str, use_colors: bool) -> String {
    let mut output = String::new();
    let mut heading: Option<(HeadingLevel, String)> = None;
    let mut strong = false;
    let mut emphasis = false;
    let mut list_depth = 0usize;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading(level, _, _)) => {
                ensure_newline(&mut output);
                if !output.is_empty() {
                    output.push('\n');
                }
                heading = Some((level, String::new()));
            }
            Event::End(Tag::Heading(..)) => {
                if let Some((level, text)) = heading.take() {
                    output.push_str(&render_heading(level, text.trim(), use_colors));
                }
            }
            Event::Start(Tag::List(_)) => {
                ensure_newline(&mut output);
                list_depth += 1;
            }
            Event::End(Tag::List(_)) => {
                list_depth = list_depth.saturating_sub(1);
            }
            Event::Start(Tag::Item) => {
                ensure_newline(&mut output);
                output.push_str(&"  ".repeat(list_depth));
                output.push_str("• ");
            }
            Event::End(Tag::Item) => ensure_newline(&mut output),
            Event::Start(Tag::Paragraph) => {
                if list_depth == 0 {
                    ensure_newline(&mut output);
                }
            }
            Event::End(Tag::Paragraph) => {
                output.push('\n');
            }
            Event::Start(Tag::Strong) => strong = true,
            Event::End(Tag::Strong) => strong = false,
            Event::Start(Tag::Emphasis) => emphasis = true,
            Event::End(Tag::Emphasis) => emphasis = false,
            Event::Text(text) | Event::Code(text) => match heading.as_mut() {
                Some((_, buffer)) => buffer.push_str(&text),
                None => output.push_str(&styled(&text, strong, emphasis, use_colors)),
            },
            Event::SoftBreak => match heading.as_mut() {
                Some((_, buffer)) => buffer.push(' '),
                None => output.push(' '),
            },
            Event::HardBreak => output.push('\n'),
            Event::Rule => {
                ensure_newline(&mut output);
                output.push_str(&"─".repeat(40));
                output.push('\n');
            }
            _ => {}
        }
    }

    let trimmed = output.trim_end();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}\n", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_preview_structure() {
        let cv = "# Jane Doe\n\n## Experience\n\n- Built **Rust** services\n- Led *two* migrations\n\nShipped on time.";
        let preview = render_cv_preview(cv, false);
        assert_eq!(
            preview,
            "Jane Doe\n════════\n\nEXPERIENCE\n  • Built Rust services\n  • Led two migrations\nShipped on time.\n"
        );
    }

    #[test]
    fn test_nested_items_indent() {
        let preview = render_cv_preview("- Acme\n  - Rust\n", false);
        assert_eq!(preview, "  • Acme\n    • Rust\n");
    }

    #[test]
    fn test_empty_markdown() {
        assert_eq!(render_cv_preview("   \n", false), "");
    }

    #[test]
    fn test_colored_preview_keeps_text() {
        let preview = render_cv_preview("### Skills\nRust", true);
        assert!(preview.contains("Skills"));
        assert!(preview.contains("Rust"));
    }
}
