//! Document ingestion: MIME dispatch and plain text extraction.

use std::io::{Cursor, Read};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use tracing::debug;

use crate::error::{RedactorError, RedactorResult};
use crate::layout;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MSWORD_MIME: &str = "application/msword";

const DOCX_BODY: &str = "word/document.xml";

/// Formats the ingestion boundary accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Docx,
    /// Legacy Word MIME type; parsed as an Office Open XML container.
    MsWord,
}

impl DocumentFormat {
    /// Recognises a MIME type, ignoring case and parameters such as
    /// `; charset=binary`.
    pub fn from_mime(mime: &str) -> RedactorResult<Self> {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            PDF_MIME => Ok(Self::Pdf),
            DOCX_MIME => Ok(Self::Docx),
            MSWORD_MIME => Ok(Self::MsWord),
            _ => Err(RedactorError::UnsupportedFormat {
                mime: mime.to_string(),
            }),
        }
    }

    /// Guesses the format from a file extension.
    pub fn from_path(path: &Path) -> RedactorResult<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("pdf") => Ok(Self::Pdf),
            Some("docx") => Ok(Self::Docx),
            Some("doc") => Ok(Self::MsWord),
            _ => Err(RedactorError::UnsupportedFormat {
                mime: path.display().to_string(),
            }),
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Pdf => PDF_MIME,
            Self::Docx => DOCX_MIME,
            Self::MsWord => MSWORD_MIME,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx | Self::MsWord => "Word",
        }
    }
}

/// Plain text of a document plus simple counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedDocument {
    pub format: DocumentFormat,
    pub text: String,
    /// Known for PDF only.
    pub page_count: Option<usize>,
    pub word_count: usize,
}

/// Extracts text from `bytes` declared as `mime`.
pub fn parse_document(bytes: &[u8], mime: &str) -> RedactorResult<ParsedDocument> {
    parse_as(bytes, DocumentFormat::from_mime(mime)?)
}

/// Extracts text from `bytes` of a known format.
pub fn parse_as(bytes: &[u8], format: DocumentFormat) -> RedactorResult<ParsedDocument> {
    let (text, page_count) = match format {
        DocumentFormat::Pdf => {
            let (text, pages) = pdf_text(bytes)?;
            (text, Some(pages))
        }
        DocumentFormat::Docx | DocumentFormat::MsWord => (docx_text(bytes, format)?, None),
    };
    let word_count = text.split_whitespace().count();
    debug!(format = format.label(), word_count, ?page_count, "parsed document");
    Ok(ParsedDocument {
        format,
        text,
        page_count,
        word_count,
    })
}

fn pdf_text(bytes: &[u8]) -> RedactorResult<(String, usize)> {
    let pages = layout::load(bytes)?.get_pages().len();
    let extracted = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(bytes)
    }));
    match extracted {
        Ok(Ok(text)) => Ok((text, pages)),
        Ok(Err(e)) => Err(RedactorError::pdf_parse(format!("{e:?}"))),
        Err(_) => Err(RedactorError::pdf_parse(
            "text interpreter aborted on malformed content",
        )),
    }
}

fn docx_text(bytes: &[u8], format: DocumentFormat) -> RedactorResult<String> {
    let parse_error = |reason: String| RedactorError::Parse {
        format: format.label().to_string(),
        reason,
    };

    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).map_err(|e| parse_error(e.to_string()))?;
    let mut xml = String::new();
    archive
        .by_name(DOCX_BODY)
        .map_err(|e| parse_error(format!("{DOCX_BODY}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| parse_error(format!("{DOCX_BODY}: {e}")))?;

    body_text(&xml).map_err(|e| parse_error(e.to_string()))
}

/// Collects `w:t` runs, ending paragraphs with a newline and mapping tabs
/// and breaks to whitespace.
fn body_text(xml: &str) -> Result<String, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"w:t" => in_text = true,
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:tab" => text.push('\t'),
                b"w:br" | b"w:cr" => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => text.push_str(&t.unescape()?),
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(text)
}
