//! Test fixtures and document builders.
//!
//! [`CvPdfBuilder`] writes content streams by hand so every line and image
//! lands at a known position. [`TestCvBuilder`] produces a printpdf document
//! the way a CV generator would.

use anyhow::Result;
use cvredact::Mapping;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::fs;
use std::io::{BufWriter, Cursor, Write};
use std::path::{Path, PathBuf};

pub const A4_WIDTH: f64 = 595.0;
pub const A4_HEIGHT: f64 = 842.0;

#[derive(Debug, Clone)]
struct Line {
    page: usize,
    x: f64,
    y: f64,
    size: f64,
    /// Each word is shown with its own positioning operator.
    words: Vec<String>,
}

#[derive(Debug, Clone)]
struct Image {
    page: usize,
    matrix: [f64; 6],
}

/// Builder for PDFs with exactly placed Helvetica text and gray images.
///
/// # Example
///
/// ```no_run
/// let bytes = CvPdfBuilder::new()
///     .with_line(0, 72.0, 760.0, 18.0, "Maciej Kowalczyk")
///     .with_photo(0, 440.0, 50.0, 120.0)
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct CvPdfBuilder {
    pages: usize,
    lines: Vec<Line>,
    images: Vec<Image>,
}

impl CvPdfBuilder {
    pub fn new() -> Self {
        Self {
            pages: 1,
            lines: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn with_pages(mut self, pages: usize) -> Self {
        self.pages = pages;
        self
    }

    /// Adds a line shown with a single `Tj`.
    pub fn with_line(mut self, page: usize, x: f64, y: f64, size: f64, text: &str) -> Self {
        self.lines.push(Line {
            page,
            x,
            y,
            size,
            words: vec![text.to_string()],
        });
        self
    }

    /// Adds a line whose words are positioned separately, as many
    /// generators do.
    pub fn with_split_line(mut self, page: usize, x: f64, y: f64, size: f64, text: &str) -> Self {
        self.lines.push(Line {
            page,
            x,
            y,
            size,
            words: text.split_whitespace().map(str::to_string).collect(),
        });
        self
    }

    /// Adds a square image whose top edge is `from_top` below the page top.
    pub fn with_photo(self, page: usize, x: f64, from_top: f64, side: f64) -> Self {
        let y = A4_HEIGHT - from_top - side;
        self.with_image_matrix(page, [side, 0.0, 0.0, side, x, y])
    }

    /// Adds an image drawn under an explicit `cm` matrix.
    pub fn with_image_matrix(mut self, page: usize, matrix: [f64; 6]) -> Self {
        self.images.push(Image { page, matrix });
        self
    }

    pub fn build(&self) -> Result<Vec<u8>> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 2,
                "Height" => 2,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            vec![0x40, 0x80, 0xC0, 0xFF],
        ));

        let mut kids: Vec<Object> = Vec::new();
        for page in 0..self.pages {
            let content = self.page_content(page);
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => media_box(),
                "Contents" => content_id,
                "Resources" => dictionary! {
                    "Font" => dictionary! { "F1" => font_id },
                    "XObject" => dictionary! { "Im1" => image_id },
                },
            });
            kids.push(page_id.into());
        }

        finish(&mut doc, pages_id, kids)
    }

    fn page_content(&self, page: usize) -> Content {
        let mut operations = Vec::new();
        for image in self.images.iter().filter(|i| i.page == page) {
            operations.push(Operation::new("q", vec![]));
            operations.push(Operation::new(
                "cm",
                image.matrix.iter().map(|v| Object::Real(*v as f32)).collect(),
            ));
            operations.push(Operation::new("Do", vec![Object::Name(b"Im1".to_vec())]));
            operations.push(Operation::new("Q", vec![]));
        }

        for line in self.lines.iter().filter(|l| l.page == page) {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new(
                "Tf",
                vec!["F1".into(), Object::Real(line.size as f32)],
            ));
            let mut x = line.x;
            for word in &line.words {
                operations.push(Operation::new(
                    "Tm",
                    [1.0, 0.0, 0.0, 1.0, x, line.y]
                        .iter()
                        .map(|v| Object::Real(*v as f32))
                        .collect(),
                ));
                operations.push(Operation::new("Tj", vec![Object::string_literal(word.as_str())]));
                // Generous advance: Helvetica glyphs are at most one em wide.
                x += line.size * 0.6 * (word.chars().count() as f64 + 1.0);
            }
            operations.push(Operation::new("ET", vec![]));
        }
        Content { operations }
    }
}

impl Default for CvPdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn media_box() -> Object {
    vec![0.into(), 0.into(), (A4_WIDTH as i64).into(), (A4_HEIGHT as i64).into()].into()
}

fn finish(doc: &mut Document, pages_id: ObjectId, kids: Vec<Object>) -> Result<Vec<u8>> {
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Count" => kids.len() as i64,
            "Kids" => kids,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

/// A structurally valid PDF with no pages at all.
pub fn empty_pdf() -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    finish(&mut doc, pages_id, Vec::new())
}

/// The contact line used across tests, on page one of an A4 CV.
pub fn contact_cv() -> CvPdfBuilder {
    CvPdfBuilder::new()
        .with_line(0, 72.0, 760.0, 18.0, "Maciej Kowalczyk")
        .with_line(0, 72.0, 730.0, 11.0, "Senior Rust Developer")
        .with_line(
            0,
            72.0,
            700.0,
            11.0,
            "Kontakt: jan.kowalski@gmail.com | 123 456 789",
        )
        .with_line(0, 72.0, 640.0, 11.0, "Experience: 2019-2024 Systems Engineering")
}

/// Detector output matching [`contact_cv`].
pub fn contact_mappings() -> Vec<Mapping> {
    vec![
        Mapping::new("Maciej Kowalczyk", "[NAME]", "name"),
        Mapping::new("jan.kowalski@gmail.com", "[EMAIL]", "email"),
        Mapping::new("123 456 789", "[PHONE]", "phone"),
        Mapping::new("Rust", "", "skill"),
    ]
}

/// Writes detector JSON for `mappings` to `path`.
pub fn write_mappings(path: &Path, mappings: &[Mapping]) -> Result<PathBuf> {
    let body = serde_json::json!({
        "cleanCV": "",
        "mappings": mappings,
    });
    fs::write(path, serde_json::to_string_pretty(&body)?)?;
    Ok(path.to_path_buf())
}

/// Builder for realistic single-page CVs rendered by printpdf.
#[derive(Debug, Clone)]
pub struct TestCvBuilder {
    title: String,
    name: String,
    contact: Vec<String>,
    sections: Vec<String>,
}

impl TestCvBuilder {
    pub fn new() -> Self {
        Self {
            title: "Curriculum Vitae".to_string(),
            name: "Anna Nowakowska".to_string(),
            contact: Vec::new(),
            sections: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_contact(mut self, line: &str) -> Self {
        self.contact.push(line.to_string());
        self
    }

    pub fn with_section(mut self, line: &str) -> Self {
        self.sections.push(line.to_string());
        self
    }

    /// Builds the PDF and writes it to the specified path.
    pub fn build(self, output_path: &Path) -> Result<PathBuf> {
        let (doc, page1, layer1) =
            PdfDocument::new(&self.title, Mm(210.0), Mm(297.0), "Layer 1");
        let layer = doc.get_page(page1).get_layer(layer1);
        let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
        let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

        layer.use_text(&self.name, 20.0, Mm(20.0), Mm(270.0), &bold);
        let mut y = 258.0;
        for line in self.contact.iter().chain(&self.sections) {
            layer.use_text(line, 11.0, Mm(20.0), Mm(y), &font);
            y -= 8.0;
        }

        doc.save(&mut BufWriter::new(fs::File::create(output_path)?))?;
        Ok(output_path.to_path_buf())
    }
}

impl Default for TestCvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a minimal DOCX container whose body holds one paragraph per line.
pub fn docx_bytes(paragraphs: &[&str]) -> Result<Vec<u8>> {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{p}</w:t></w:r></w:p>"))
        .collect();
    let xml = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
         <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
         <w:body>{body}</w:body></w:document>"
    );

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut zip = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::SimpleFileOptions::default();
        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(b"<?xml version=\"1.0\"?><Types/>")?;
        zip.start_file("word/document.xml", options)?;
        zip.write_all(xml.as_bytes())?;
        zip.finish()?;
    }
    Ok(cursor.into_inner())
}
