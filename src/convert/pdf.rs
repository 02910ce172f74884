//! PDF document converter implementation.

use crate::error::Result;
use crate::parser::{PdfExtraction, PdfExtractor};
use std::path::Path;

use super::{ConvertOptions, ConvertResult, DocumentConverter, SourceMetadata};

/// PDF document converter.
///
/// Extracts Markdown page by page; metadata carries the total page count.
#[derive(Debug, Clone, Default)]
pub struct PdfConverter {
    _private: (),
}

impl PdfConverter {
    /// Create a new PDF converter.
    pub fn new() -> Self {
        Self { _private: () }
    }

    fn to_result(extraction: PdfExtraction) -> ConvertResult {
        log::debug!(
            "extracted {} of {} pages",
            extraction.pages_extracted,
            extraction.page_count
        );
        ConvertResult::new(extraction.markdown, SourceMetadata::pdf(extraction.page_count))
    }
}

impl DocumentConverter for PdfConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["pdf"]
    }

    fn name(&self) -> &str {
        "pdf"
    }

    fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult> {
        let extractor = PdfExtractor::open_with_options(path, options.extract.clone())?;
        Ok(Self::to_result(extractor.extract()?))
    }

    fn convert_bytes(&self, bytes: &[u8], options: &ConvertOptions) -> Result<ConvertResult> {
        let extractor = PdfExtractor::from_bytes_with_options(bytes, options.extract.clone())?;
        Ok(Self::to_result(extractor.extract()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_converter_extensions() {
        let converter = PdfConverter::new();
        assert_eq!(converter.supported_extensions(), &["pdf"]);
        assert!(converter.supports_extension("pdf"));
        assert!(converter.supports_extension("PDF"));
        assert!(!converter.supports_extension("docx"));
    }

    #[test]
    fn test_pdf_converter_rejects_non_pdf_bytes() {
        let converter = PdfConverter::new();
        let err = converter
            .convert_bytes(b"plain text", &ConvertOptions::default())
            .unwrap_err();
        assert!(matches!(err, crate::Error::UnknownFormat));
    }
}
