use crate::error::LoadError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const DOCUMENT_PART: &str = "word/document.xml";

pub trait DocumentExtractor {
    /// Paragraph texts in source order.
    fn extract_paragraphs(&self, path: &Path) -> Result<Vec<String>, LoadError>;
}

/// Reads the main document part of a WordprocessingML (`.docx`) file.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxExtractor;

impl DocumentExtractor for DocxExtractor {
    fn extract_paragraphs(&self, path: &Path) -> Result<Vec<String>, LoadError> {
        let file = File::open(path)?;
        let mut archive =
            zip::ZipArchive::new(file).map_err(|error| LoadError::malformed(path, error))?;
        let mut part = archive
            .by_name(DOCUMENT_PART)
            .map_err(|error| LoadError::malformed(path, error))?;

        let mut xml = String::new();
        part.read_to_string(&mut xml)
            .map_err(|error| LoadError::malformed(path, error))?;

        paragraphs_from_xml(&xml).map_err(|details| LoadError::malformed(path, details))
    }
}

/// Lyrics are the document's paragraphs joined by newline.
pub fn extract_lyrics(extractor: &impl DocumentExtractor, path: &Path) -> Result<String, LoadError> {
    Ok(extractor.extract_paragraphs(path)?.join("\n"))
}

/// Text-box content (`w:txbxContent`) is anchored inside a run of the
/// surrounding paragraph and is not part of its text, so it is skipped.
fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, String> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut paragraph_depth = 0usize;
    let mut text_box_depth = 0usize;
    let mut in_run = false;
    let mut in_text = false;

    loop {
        let event = reader.read_event();
        if text_box_depth > 0 {
            match event {
                Ok(Event::Start(element)) if element.name().as_ref() == b"w:txbxContent" => {
                    text_box_depth += 1
                }
                Ok(Event::End(element)) if element.name().as_ref() == b"w:txbxContent" => {
                    text_box_depth -= 1
                }
                Ok(Event::Eof) => return Err("unterminated text box".to_string()),
                Err(error) => {
                    return Err(format!(
                        "xml error at position {}: {error}",
                        reader.error_position()
                    ))
                }
                _ => {}
            }
            continue;
        }

        match event {
            Ok(Event::Start(element)) => match element.name().as_ref() {
                b"w:p" => {
                    if paragraph_depth == 0 {
                        current.clear();
                    }
                    paragraph_depth += 1;
                }
                b"w:r" => in_run = true,
                b"w:t" => in_text = true,
                b"w:txbxContent" => text_box_depth = 1,
                _ => {}
            },
            Ok(Event::Empty(element)) => match element.name().as_ref() {
                b"w:p" if paragraph_depth == 0 => paragraphs.push(String::new()),
                // w:tab also appears in paragraph properties as a tab stop.
                b"w:tab" if in_run => current.push('\t'),
                b"w:br" | b"w:cr" if in_run => current.push('\n'),
                _ => {}
            },
            Ok(Event::End(element)) => match element.name().as_ref() {
                b"w:p" => {
                    paragraph_depth = paragraph_depth.saturating_sub(1);
                    if paragraph_depth == 0 {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                }
                b"w:r" => in_run = false,
                b"w:t" => in_text = false,
                _ => {}
            },
            Ok(Event::Text(text)) if in_text => {
                let unescaped = text.unescape().map_err(|error| error.to_string())?;
                current.push_str(&unescaped);
            }
            Ok(Event::CData(data)) if in_text => {
                current.push_str(&String::from_utf8_lossy(&data));
            }
            Ok(Event::Eof) => break,
            Err(error) => {
                return Err(format!(
                    "xml error at position {}: {error}",
                    reader.error_position()
                ))
            }
            _ => {}
        }
    }

    Ok(paragraphs)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::Write;
    use std::path::Path;
    use zip::write::SimpleFileOptions;

    pub(crate) fn document_xml(paragraphs: &[&str]) -> String {
        let body = paragraphs
            .iter()
            .map(|text| {
                let escaped = text
                    .replace('&', "&amp;")
                    .replace('<', "&lt;")
                    .replace('>', "&gt;");
                format!("<w:p><w:r><w:t xml:space=\"preserve\">{escaped}</w:t></w:r></w:p>")
            })
            .collect::<String>();

        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
             <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:body>{body}</w:body></w:document>"
        )
    }

    pub(crate) fn write_docx_xml(path: &Path, xml: &str) -> Result<(), Box<dyn std::error::Error>> {
        let file = std::fs::File::create(path)?;
        let mut writer = zip::ZipWriter::new(file);
        writer.start_file("word/document.xml", SimpleFileOptions::default())?;
        writer.write_all(xml.as_bytes())?;
        writer.finish()?;
        Ok(())
    }

    pub(crate) fn write_docx(path: &Path, paragraphs: &[&str]) -> Result<(), Box<dyn std::error::Error>> {
        write_docx_xml(path, &document_xml(paragraphs))
    }
}
