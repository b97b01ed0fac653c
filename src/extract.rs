//! Text extraction for binary documents (PDF, DOCX) and HTML pages.
//!
//! Loaders supply bytes; this module returns plain UTF-8 text. Extraction
//! never panics on malformed input; callers receive [`RagError::Extract`]
//! and skip the document.

use std::io::Read;

use crate::error::RagError;

/// Maximum decompressed bytes to read from a single ZIP entry (zip-bomb protection).
const MAX_XML_ENTRY_BYTES: u64 = 50 * 1024 * 1024;

/// Extract plain text from a PDF document.
pub fn extract_pdf(bytes: &[u8]) -> Result<String, RagError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| RagError::Extract(e.to_string()))
}

/// Extract plain text from a DOCX document.
///
/// Reads `word/document.xml` out of the OOXML ZIP container and collects
/// the contents of every `w:t` run.
pub fn extract_docx(bytes: &[u8]) -> Result<String, RagError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| RagError::Extract(e.to_string()))?;

    let entry = archive
        .by_name("word/document.xml")
        .map_err(|_| RagError::Extract("word/document.xml not found".to_string()))?;

    let mut doc_xml = Vec::new();
    entry
        .take(MAX_XML_ENTRY_BYTES)
        .read_to_end(&mut doc_xml)
        .map_err(|e| RagError::Extract(e.to_string()))?;
    if doc_xml.len() as u64 >= MAX_XML_ENTRY_BYTES {
        return Err(RagError::Extract(
            "word/document.xml exceeds size limit".to_string(),
        ));
    }

    extract_t_elements(&doc_xml)
}

fn extract_t_elements(xml: &[u8]) -> Result<String, RagError> {
    let mut out = String::new();
    let mut reader = quick_xml::Reader::from_reader(xml);
    reader.config_mut().trim_text(true);
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                if e.local_name().as_ref() == b"t" {
                    if let Ok(quick_xml::events::Event::Text(te)) = reader.read_event_into(&mut buf)
                    {
                        if !out.is_empty() {
                            out.push(' ');
                        }
                        out.push_str(te.unescape().unwrap_or_default().as_ref());
                    }
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => return Err(RagError::Extract(e.to_string())),
            _ => {}
        }
        buf.clear();
    }
    Ok(out)
}

/// Extract visible text from an HTML page.
///
/// Lenient event walk: `script` and `style` subtrees are dropped, text nodes
/// are collected line by line, and parse errors terminate the walk instead of
/// failing it, since real-world HTML is rarely well formed.
pub fn html_to_text(html: &str) -> String {
    let mut reader = quick_xml::Reader::from_str(html);
    {
        let config = reader.config_mut();
        config.trim_text(true);
        config.check_end_names = false;
    }

    let mut lines: Vec<String> = Vec::new();
    let mut skip_depth = 0usize;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(e)) => {
                let name = e.local_name();
                if name.as_ref() == b"script" || name.as_ref() == b"style" {
                    skip_depth += 1;
                }
            }
            Ok(quick_xml::events::Event::End(e)) => {
                let name = e.local_name();
                if (name.as_ref() == b"script" || name.as_ref() == b"style") && skip_depth > 0 {
                    skip_depth -= 1;
                }
            }
            Ok(quick_xml::events::Event::Text(te)) if skip_depth == 0 => {
                let text = match te.unescape() {
                    Ok(t) => t.into_owned(),
                    Err(_) => String::from_utf8_lossy(te.as_ref()).into_owned(),
                };
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    lines.push(trimmed.to_string());
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            // Malformed markup: keep whatever text was collected so far.
            Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_pdf_returns_error() {
        let err = extract_pdf(b"not a pdf").unwrap_err();
        assert!(matches!(err, RagError::Extract(_)));
    }

    #[test]
    fn invalid_zip_returns_error_for_docx() {
        let err = extract_docx(b"not a zip").unwrap_err();
        assert!(matches!(err, RagError::Extract(_)));
    }

    #[test]
    fn html_text_is_extracted_line_by_line() {
        let html = "<html><body><h1>Clinics</h1><p>Open 8am to 6pm.</p></body></html>";
        let text = html_to_text(html);
        assert!(text.contains("Clinics"));
        assert!(text.contains("Open 8am to 6pm."));
    }

    #[test]
    fn script_and_style_are_dropped() {
        let html = "<html><head><style>body { color: red }</style></head>\
                    <body><script>var x = 1;</script><p>Visible</p></body></html>";
        let text = html_to_text(html);
        assert!(text.contains("Visible"));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("var x"));
    }

    #[test]
    fn entities_are_unescaped() {
        let text = html_to_text("<p>Fish &amp; Chips</p>");
        assert_eq!(text, "Fish & Chips");
    }
}
