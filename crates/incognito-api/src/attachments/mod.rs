//! Turns uploaded files into text the model can read
//!
//! Every attachment is parsed on its own; a file that fails to parse becomes
//! a bracketed placeholder and never affects its siblings.

mod pdf;
mod splitter;

pub use pdf::parse_pdf;
pub use splitter::RecursiveSplitter;

use incognito_llm::Attachment;

/// Extensions fenced as source code when the MIME type is not textual
pub const CODE_EXTENSIONS: &[&str] = &[
    "js", "ts", "py", "java", "c", "cpp", "php", "rb", "go", "rs", "swift", "html", "css",
    "json", "xml", "yaml", "md",
];

/// Text fragment standing in for one attachment
pub fn parse_attachment(attachment: &Attachment) -> String {
    let mime_type = attachment.mime_type.as_str();

    if mime_type.starts_with("text/") {
        return attachment.content.clone();
    }

    if mime_type == "application/pdf" {
        return parse_pdf(&attachment.name, &attachment.content);
    }

    if mime_type.starts_with("image/") {
        return format!("[Image: {}]", attachment.name);
    }

    if let Some(extension) = code_extension(&attachment.name) {
        return format!("```{}\n{}\n```", extension, attachment.content);
    }

    format!("[File: {}]", attachment.name)
}

/// Message content with every attachment appended under an `Attached Files:` header
pub fn expand_message(content: &str, attachments: &[Attachment]) -> String {
    if attachments.is_empty() {
        return content.to_string();
    }

    let blocks: Vec<String> = attachments
        .iter()
        .map(|attachment| {
            format!(
                "\nFile: {}\n{}\n",
                attachment.name,
                parse_attachment(attachment)
            )
        })
        .collect();

    format!("{}\n\nAttached Files:\n{}", content, blocks.join("\n"))
}

fn code_extension(name: &str) -> Option<&str> {
    let (_, extension) = name.rsplit_once('.')?;
    CODE_EXTENSIONS.contains(&extension).then_some(extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_passes_through() {
        let attachment = Attachment::new("a.txt", "text/plain", "hello");
        assert_eq!(parse_attachment(&attachment), "hello");
    }

    #[test]
    fn test_textual_code_is_not_fenced() {
        let attachment = Attachment::new("main.rs", "text/x-rust", "fn main() {}");
        assert_eq!(parse_attachment(&attachment), "fn main() {}");
    }

    #[test]
    fn test_code_extension_on_binary_type() {
        let attachment = Attachment::new("app.py", "application/octet-stream", "print(1)");
        assert_eq!(parse_attachment(&attachment), "```py\nprint(1)\n```");
    }

    #[test]
    fn test_image_and_unknown() {
        let image = Attachment::new("cat.png", "image/png", "iVBORw0KGgo=");
        assert_eq!(parse_attachment(&image), "[Image: cat.png]");

        let archive = Attachment::new("bundle.zip", "application/zip", "UEsDBA==");
        assert_eq!(parse_attachment(&archive), "[File: bundle.zip]");

        let no_extension = Attachment::new("Makefile", "application/octet-stream", "all:");
        assert_eq!(parse_attachment(&no_extension), "[File: Makefile]");
    }

    #[test]
    fn test_expand_single_attachment() {
        let expanded = expand_message("Hi", &[Attachment::new("a.txt", "text/plain", "hello")]);
        assert_eq!(expanded, "Hi\n\nAttached Files:\n\nFile: a.txt\nhello\n");
    }

    #[test]
    fn test_failed_attachment_keeps_siblings() {
        let expanded = expand_message(
            "Look",
            &[
                Attachment::new("broken.pdf", "application/pdf", "not base64!"),
                Attachment::new("notes.txt", "text/plain", "keep me"),
            ],
        );

        assert_eq!(
            expanded,
            "Look\n\nAttached Files:\n\nFile: broken.pdf\n[Error parsing PDF: broken.pdf]\n\n\
             \nFile: notes.txt\nkeep me\n"
        );
    }

    #[test]
    fn test_no_attachments_is_identity() {
        assert_eq!(expand_message("plain", &[]), "plain");
    }
}
