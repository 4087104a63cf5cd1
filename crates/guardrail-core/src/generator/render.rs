//! Rendering collaborator seam.
//!
//! The engine decides document content; a [`DocumentRenderer`] decides how
//! bytes are laid out. The built-in implementation emits markdown, which
//! the rest of the stack already knows how to display. A PDF or HTML
//! engine plugs in behind the same trait without touching the generator.

use std::fmt::Write as _;

use crate::error::Result;

use super::{ContentRow, DocumentContent};

/// External rendering collaborator: structured content in, raw bytes out.
///
/// Implementations must be pure with respect to tracker state: rendering
/// writes nothing, so a failed or timed-out render leaves no partial
/// evidence behind.
pub trait DocumentRenderer: Send + Sync {
    /// Render the assembled document to its byte representation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TrackerError::Render`] when the backing engine
    /// cannot produce output.
    fn render(&self, content: &DocumentContent) -> Result<Vec<u8>>;
}

/// Default renderer producing UTF-8 markdown.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl DocumentRenderer for MarkdownRenderer {
    fn render(&self, content: &DocumentContent) -> Result<Vec<u8>> {
        let mut out = String::new();

        // Writing to a String cannot fail; unwraps are fine here.
        writeln!(out, "# {}", content.title).unwrap();
        if !content.intro_text.is_empty() {
            writeln!(out).unwrap();
            writeln!(out, "{}", content.intro_text).unwrap();
        }

        if !content.rows.is_empty() {
            writeln!(out).unwrap();
            for row in &content.rows {
                match row {
                    ContentRow::Line { label, value } => {
                        writeln!(out, "- **{label}**: {value}").unwrap();
                    }
                    ContentRow::Block { label, value } => {
                        writeln!(out).unwrap();
                        writeln!(out, "## {label}").unwrap();
                        writeln!(out).unwrap();
                        writeln!(out, "{value}").unwrap();
                    }
                }
            }
        }

        Ok(out.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_content() -> DocumentContent {
        DocumentContent {
            title: "FATIGUE MANAGEMENT ACT".to_string(),
            intro_text: "Reviewed under the road safety program.".to_string(),
            rows: vec![
                ContentRow::Line {
                    label: "Responsible".to_string(),
                    value: "J. Perez".to_string(),
                },
                ContentRow::Block {
                    label: "Findings".to_string(),
                    value: "No deviations observed.".to_string(),
                },
            ],
        }
    }

    #[test]
    fn test_markdown_renderer_layout() {
        let bytes = MarkdownRenderer.render(&sample_content()).unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("# FATIGUE MANAGEMENT ACT\n"));
        assert!(text.contains("Reviewed under the road safety program."));
        assert!(text.contains("- **Responsible**: J. Perez"));
        assert!(text.contains("## Findings\n\nNo deviations observed."));
    }

    #[test]
    fn test_markdown_renderer_empty_intro_omitted() {
        let mut content = sample_content();
        content.intro_text = String::new();
        let text = String::from_utf8(MarkdownRenderer.render(&content).unwrap()).unwrap();
        assert!(!text.contains("\n\n\n"));
    }

    #[test]
    fn test_markdown_renderer_is_deterministic() {
        let content = sample_content();
        assert_eq!(
            MarkdownRenderer.render(&content).unwrap(),
            MarkdownRenderer.render(&content).unwrap()
        );
    }
}
