use base64::{engine::general_purpose::STANDARD, Engine as _};
use lopdf::Document;
use std::panic::{self, AssertUnwindSafe};

use super::splitter::RecursiveSplitter;

/// Extract readable text from a base64-encoded PDF
///
/// Pages are split into overlapping chunks, joined back with blank lines and
/// whitespace-collapsed. Any failure yields `[Error parsing PDF: <name>]`.
pub fn parse_pdf(name: &str, content: &str) -> String {
    // lopdf can panic on malformed cross-reference tables
    let extracted = panic::catch_unwind(AssertUnwindSafe(|| extract_text(content)))
        .map_err(|_| "PDF parser panicked".to_string())
        .and_then(|result| result);

    match extracted {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(file = %name, "Error parsing PDF: {}", e);
            format!("[Error parsing PDF: {}]", name)
        }
    }
}

fn extract_text(content: &str) -> Result<String, String> {
    let bytes = STANDARD
        .decode(content.trim())
        .map_err(|e| format!("invalid base64: {}", e))?;
    let document = Document::load_mem(&bytes).map_err(|e| e.to_string())?;

    let splitter = RecursiveSplitter::default();
    let mut chunks = Vec::new();
    for page_number in document.get_pages().keys() {
        let page_text = document
            .extract_text(&[*page_number])
            .map_err(|e| format!("page {}: {}", page_number, e))?;
        chunks.extend(splitter.split(&page_text));
    }

    Ok(collapse_whitespace(&chunks.join("\n\n")))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_base64() {
        assert_eq!(parse_pdf("a.pdf", "%%%"), "[Error parsing PDF: a.pdf]");
    }

    #[test]
    fn test_not_a_pdf() {
        let content = STANDARD.encode("just some text");
        assert_eq!(parse_pdf("b.pdf", &content), "[Error parsing PDF: b.pdf]");
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\n b\t c  "), "a b c");
    }
}
