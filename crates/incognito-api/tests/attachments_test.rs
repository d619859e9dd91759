use base64::{engine::general_purpose::STANDARD, Engine as _};
use incognito_api::attachments::{expand_message, parse_attachment};
use incognito_llm::Attachment;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// Single-page PDF showing `text` in Courier
fn pdf_with_text(text: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 24.into()]),
            Operation::new("Td", vec![100.into(), 600.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

#[test]
fn test_pdf_text_is_extracted_and_collapsed() {
    let attachment = Attachment::new(
        "report.pdf",
        "application/pdf",
        STANDARD.encode(pdf_with_text("Quarterly   revenue grew")),
    );

    let parsed = parse_attachment(&attachment);
    assert!(parsed.contains("Quarterly revenue grew"), "got {:?}", parsed);
    assert!(!parsed.contains("  "));
    assert_eq!(parsed, parsed.trim());
}

#[test]
fn test_corrupt_pdf_becomes_placeholder() {
    let attachment = Attachment::new(
        "broken.pdf",
        "application/pdf",
        STANDARD.encode(b"%PDF-1.5 truncated"),
    );
    assert_eq!(parse_attachment(&attachment), "[Error parsing PDF: broken.pdf]");
}

#[test]
fn test_mixed_attachments_expand_in_order() {
    let attachments = vec![
        Attachment::new("notes.txt", "text/plain", "line one\nline two"),
        Attachment::new("script.js", "application/javascript", "console.log(1)"),
        Attachment::new("photo.jpg", "image/jpeg", "/9j/4AAQ"),
        Attachment::new("data.bin", "application/octet-stream", "AAEC"),
    ];

    let expanded = expand_message("Please review", &attachments);

    assert_eq!(
        expanded,
        "Please review\n\nAttached Files:\n\
         \nFile: notes.txt\nline one\nline two\n\n\
         \nFile: script.js\n```js\nconsole.log(1)\n```\n\n\
         \nFile: photo.jpg\n[Image: photo.jpg]\n\n\
         \nFile: data.bin\n[File: data.bin]\n"
    );
}
