use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use xml::reader::{EventReader, XmlEvent};
use zip::ZipArchive;

pub const UNSUPPORTED_MESSAGE: &str = "❌ Unsupported file type.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Text,
    Docx,
    Pdf,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" => Some(DocumentKind::Text),
            "docx" => Some(DocumentKind::Docx),
            "pdf" => Some(DocumentKind::Pdf),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file type: {}", .0.display())]
    Unsupported(PathBuf),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid docx archive: {0}")]
    Docx(#[from] zip::result::ZipError),
    #[error("invalid docx xml: {0}")]
    Xml(#[from] xml::reader::Error),
    #[error("could not read pdf: {0}")]
    Pdf(#[from] pdf_extract::OutputError),
    #[error("extraction task failed: {0}")]
    Task(String),
}

impl ExtractError {
    /// The text a user sees in place of a result.
    pub fn user_message(&self) -> String {
        match self {
            ExtractError::Unsupported(_) => UNSUPPORTED_MESSAGE.to_string(),
            other => format!("❌ Error: {other}"),
        }
    }
}

/// Reads the plain text out of a `.txt`, `.docx` or `.pdf` file.
pub fn extract_text(path: &Path) -> Result<String, ExtractError> {
    let kind = DocumentKind::from_path(path).ok_or_else(|| ExtractError::Unsupported(path.to_path_buf()))?;
    extract_as(path, kind)
}

pub fn extract_as(path: &Path, kind: DocumentKind) -> Result<String, ExtractError> {
    let text = match kind {
        DocumentKind::Text => fs::read_to_string(path)?,
        DocumentKind::Docx => extract_docx(path)?,
        DocumentKind::Pdf => pdf_extract::extract_text(path)?,
    };
    debug!(path = %path.display(), ?kind, chars = text.len(), "Extracted document text");
    Ok(text)
}

/// Runs [`extract_text`] on the blocking pool; PDF parsing can take a while.
pub async fn extract_text_blocking(path: PathBuf) -> Result<String, ExtractError> {
    tokio::task::spawn_blocking(move || extract_text(&path))
        .await
        .map_err(|e| ExtractError::Task(e.to_string()))?
}

fn extract_docx(path: &Path) -> Result<String, ExtractError> {
    let mut archive = ZipArchive::new(File::open(path)?)?;
    let mut xml = String::new();
    archive.by_name("word/document.xml")?.read_to_string(&mut xml)?;
    document_xml_text(&xml)
}

/// `w:t` runs carry the text, `w:p` ends a paragraph, `w:tab`/`w:br` are inline breaks.
fn document_xml_text(xml: &str) -> Result<String, ExtractError> {
    let mut content = String::new();
    let mut in_text_run = false;

    for event in EventReader::from_str(xml) {
        match event? {
            XmlEvent::StartElement { name, .. } => match name.local_name.as_str() {
                "t" => in_text_run = true,
                "tab" => content.push('\t'),
                "br" | "cr" => content.push('\n'),
                _ => {}
            },
            XmlEvent::EndElement { name } => match name.local_name.as_str() {
                "t" => in_text_run = false,
                "p" => content.push('\n'),
                _ => {}
            },
            XmlEvent::Characters(text) | XmlEvent::Whitespace(text) if in_text_run => {
                content.push_str(&text);
            }
            _ => {}
        }
    }

    Ok(content.trim_end().to_string())
}

#[cfg(test)]
pub(crate) mod testing {
    use std::path::Path;

    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    /// Writes a one-page PDF that draws `line` in Courier.
    pub fn write_pdf(path: &Path, line: &str) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal(line)]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }
}

#[cfg(test)]
mod tests {
    use super::testing::write_pdf;
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const DOCUMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:r><w:t>Q1. Define</w:t></w:r><w:r><w:t xml:space="preserve"> inertia.</w:t></w:r></w:p>
    <w:p><w:r><w:t>Q2.</w:t><w:tab/><w:t>State Ohm's law.</w:t></w:r></w:p>
  </w:body>
</w:document>"#;

    fn write_docx(path: &Path, document_xml: &str) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        zip.start_file("word/document.xml", SimpleFileOptions::default()).unwrap();
        zip.write_all(document_xml.as_bytes()).unwrap();
        zip.finish().unwrap();
    }

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(DocumentKind::from_path(Path::new("a.txt")), Some(DocumentKind::Text));
        assert_eq!(DocumentKind::from_path(Path::new("b.DOCX")), Some(DocumentKind::Docx));
        assert_eq!(DocumentKind::from_path(Path::new("dir/c.pdf")), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_path(Path::new("d.odt")), None);
        assert_eq!(DocumentKind::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_plain_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("homework.txt");
        fs::write(&path, "1. What is 2 + 2?\n").unwrap();
        assert_eq!(extract_text(&path).unwrap(), "1. What is 2 + 2?\n");
    }

    #[test]
    fn test_docx_paragraphs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("homework.docx");
        write_docx(&path, DOCUMENT_XML);
        assert_eq!(
            extract_text(&path).unwrap(),
            "Q1. Define inertia.\nQ2.\tState Ohm's law."
        );
    }

    #[test]
    fn test_docx_without_document_part() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.docx");
        let mut zip = ZipWriter::new(File::create(&path).unwrap());
        zip.start_file("other.xml", SimpleFileOptions::default()).unwrap();
        zip.finish().unwrap();
        assert!(matches!(extract_text(&path), Err(ExtractError::Docx(_))));
    }

    #[test]
    fn test_unsupported_extension_leaves_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slides.pptx");
        fs::write(&path, "not really a deck").unwrap();

        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, ExtractError::Unsupported(_)));
        assert_eq!(err.user_message(), UNSUPPORTED_MESSAGE);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = extract_text(Path::new("/definitely/not/here.txt")).unwrap_err();
        assert!(matches!(err, ExtractError::Io(_)));
        assert!(err.user_message().starts_with("❌ Error:"));
    }

    #[test]
    fn test_pdf_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lecture.PDF");
        write_pdf(&path, "Photosynthesis");
        assert!(extract_text(&path).unwrap().contains("Photosynthesis"));
    }

    #[test]
    fn test_corrupt_pdf_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, "%PDF-1.5 nothing else").unwrap();
        let err = extract_text(&path).unwrap_err();
        assert!(err.user_message().starts_with("❌ Error:"));
    }

    #[tokio::test]
    async fn test_blocking_wrapper() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "photosynthesis").unwrap();
        assert_eq!(extract_text_blocking(path).await.unwrap(), "photosynthesis");
    }
}
