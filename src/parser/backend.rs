//! PDF access for page extraction.
//!
//! [`PdfBackend`] serves exactly what the extractor reads from a page: its
//! plain text, and its text-showing operations with the fonts they name.
//! Pages are numbered from 1. [`LopdfBackend`] implements it over lopdf.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use lopdf::{Document, Object, ObjectId};

use crate::error::{Error, Result};

/// An operand of a content-stream operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Number(f32),
    Name(Vec<u8>),
    /// String operand, still in the font's encoding
    Bytes(Vec<u8>),
    Array(Vec<Operand>),
    Other,
}

impl Operand {
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Operand::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&[u8]> {
        match self {
            Operand::Name(name) => Some(name),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Operand::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }
}

impl From<&Object> for Operand {
    fn from(obj: &Object) -> Self {
        match obj {
            Object::Integer(i) => Operand::Number(*i as f32),
            Object::Real(r) => Operand::Number(*r),
            Object::Name(name) => Operand::Name(name.clone()),
            Object::String(bytes, _) => Operand::Bytes(bytes.clone()),
            Object::Array(items) => Operand::Array(items.iter().map(Operand::from).collect()),
            _ => Operand::Other,
        }
    }
}

/// One content-stream operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub operator: String,
    pub operands: Vec<Operand>,
}

impl Operation {
    pub fn new(operator: impl Into<String>, operands: Vec<Operand>) -> Self {
        Self {
            operator: operator.into(),
            operands,
        }
    }

    /// Numeric operand `index`, or `default` when missing or not a number.
    pub fn number(&self, index: usize, default: f32) -> f32 {
        self.operands
            .get(index)
            .and_then(Operand::as_number)
            .unwrap_or(default)
    }
}

/// Decoded content of one page.
#[derive(Debug, Clone, Default)]
pub struct PageContent {
    /// Font resource name (`F1`) to base font name (`Helvetica-Bold`)
    pub fonts: HashMap<Vec<u8>, String>,
    pub operations: Vec<Operation>,
}

impl PageContent {
    /// Base font behind a resource name, or the resource name itself.
    pub fn font_name(&self, resource: &[u8]) -> String {
        self.fonts
            .get(resource)
            .cloned()
            .unwrap_or_else(|| String::from_utf8_lossy(resource).into_owned())
    }
}

/// Page-level access to a PDF document.
pub trait PdfBackend {
    fn page_count(&self) -> u32;

    /// Plain text of a page, in content-stream order.
    fn page_text(&self, page: u32) -> Result<String>;

    /// Fonts and decoded operations of a page.
    fn page_content(&self, page: u32) -> Result<PageContent>;

    /// Decode a shown string with the page font `font`.
    fn decode_text(&self, page: u32, font: &[u8], bytes: &[u8]) -> String;
}

/// Decode string bytes when no font encoding applies: UTF-16BE with a BOM,
/// else UTF-8, else one byte per character.
pub fn decode_unencoded(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
        return char::decode_utf16(units)
            .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect();
    }
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|&b| char::from(b)).collect(),
    }
}

/// [`PdfBackend`] over a loaded `lopdf::Document`.
pub struct LopdfBackend {
    doc: Document,
    pages: BTreeMap<u32, ObjectId>,
}

impl LopdfBackend {
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::from_document(Document::load(path)?))
    }

    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        Ok(Self::from_document(Document::load_mem(data)?))
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: Document) -> Self {
        let pages = doc.get_pages();
        Self { doc, pages }
    }

    pub fn is_encrypted(&self) -> bool {
        self.doc.is_encrypted()
    }

    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.pages
            .get(&page)
            .copied()
            .ok_or(Error::PageOutOfRange(page, self.page_count()))
    }
}

impl PdfBackend for LopdfBackend {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_text(&self, page: u32) -> Result<String> {
        self.page_id(page)?;
        self.doc
            .extract_text(&[page])
            .map_err(|e| Error::TextExtract(format!("Page {}: {}", page, e)))
    }

    fn page_content(&self, page: u32) -> Result<PageContent> {
        let id = self.page_id(page)?;
        let parse_error = |e: lopdf::Error| Error::PdfParse(format!("Page {}: {}", page, e));

        let fonts = self
            .doc
            .get_page_fonts(id)
            .map_err(parse_error)?
            .into_iter()
            .filter_map(|(resource, dict)| {
                let base = dict.get(b"BaseFont").ok()?.as_name().ok()?;
                Some((resource, String::from_utf8_lossy(base).into_owned()))
            })
            .collect();

        let content = self.doc.get_and_decode_page_content(id).map_err(parse_error)?;
        let operations = content
            .operations
            .iter()
            .map(|op| Operation {
                operator: op.operator.clone(),
                operands: op.operands.iter().map(Operand::from).collect(),
            })
            .collect();

        Ok(PageContent { fonts, operations })
    }

    fn decode_text(&self, page: u32, font: &[u8], bytes: &[u8]) -> String {
        let decoded = self
            .pages
            .get(&page)
            .and_then(|&id| self.doc.get_page_fonts(id).ok())
            .and_then(|fonts| {
                let encoding = fonts.get(font)?.get_font_encoding(&self.doc).ok()?;
                Document::decode_text(&encoding, bytes).ok()
            });
        decoded.unwrap_or_else(|| decode_unencoded(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn test_decode_unencoded() {
        assert_eq!(decode_unencoded(b"Tekst"), "Tekst");
        assert_eq!(decode_unencoded(&[0x53, 0xF8, 0x6E]), "Søn");
        assert_eq!(decode_unencoded(&[0xFE, 0xFF, 0x00, 0xC6, 0x00, 0x62]), "Æb");
        // Lone surrogate
        assert_eq!(decode_unencoded(&[0xFE, 0xFF, 0xD8, 0x00]), "\u{FFFD}");
    }

    #[test]
    fn test_operand_from_object() {
        assert_eq!(Operand::from(&Object::Integer(7)), Operand::Number(7.0));
        assert_eq!(
            Operand::from(&Object::Array(vec![Object::Real(-120.0), Object::Null])),
            Operand::Array(vec![Operand::Number(-120.0), Operand::Other])
        );
        assert_eq!(Operand::from(&Object::Name(b"F1".to_vec())).as_name(), Some(&b"F1"[..]));
    }

    #[test]
    fn test_operation_number_defaults() {
        let op = Operation::new("Td", vec![Operand::Number(72.0), Operand::Name(b"x".to_vec())]);
        assert_eq!(op.number(0, 0.0), 72.0);
        assert_eq!(op.number(1, 3.0), 3.0);
        assert_eq!(op.number(2, 5.0), 5.0);
    }

    #[test]
    fn test_load_garbage_is_parse_error() {
        let err = LopdfBackend::load_bytes(b"definitely not a pdf").err().unwrap();
        assert!(matches!(err, Error::PdfParse(_) | Error::Io(_)));
    }

    #[test]
    fn test_page_out_of_range() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        doc.objects.insert(
            pages_id,
            Object::Dictionary(lopdf::dictionary! {
                "Type" => "Pages",
                "Kids" => Vec::<Object>::new(),
                "Count" => 0,
            }),
        );
        let catalog = doc.add_object(lopdf::dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog);

        let backend = LopdfBackend::from_document(doc);
        assert_eq!(backend.page_count(), 0);
        assert!(matches!(backend.page_text(1), Err(Error::PageOutOfRange(1, 0))));
        assert!(matches!(backend.page_content(2), Err(Error::PageOutOfRange(2, 0))));
    }
}
