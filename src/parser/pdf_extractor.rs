//! Page-wise PDF to Markdown extraction.

use std::path::Path;

use crate::detect::{detect_format_from_bytes, detect_format_from_path};
use crate::error::Result;
use crate::render::{CleanupPipeline, MarkdownRenderer};

use super::backend::{LopdfBackend, PdfBackend};
use super::layout::LayoutAnalyzer;
use super::options::{ErrorMode, ExtractOptions};

/// Markdown extracted from a PDF.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfExtraction {
    /// Joined page Markdown, trimmed
    pub markdown: String,
    /// Total pages in the document, regardless of the page limit
    pub page_count: u32,
    /// Pages that produced text
    pub pages_extracted: u32,
}

/// PDF extractor.
///
/// Owns its backend; [`PdfExtractor::extract`] consumes the extractor so the
/// document is released as soon as extraction returns.
pub struct PdfExtractor<B: PdfBackend = LopdfBackend> {
    backend: B,
    options: ExtractOptions,
}

impl PdfExtractor<LopdfBackend> {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ExtractOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ExtractOptions) -> Result<Self> {
        let path = path.as_ref();
        detect_format_from_path(path)?;
        let backend = LopdfBackend::load_file(path)?;
        log::debug!(
            "opened {} (PDF {}, {} pages, encrypted: {})",
            path.display(),
            backend.version(),
            backend.page_count(),
            backend.is_encrypted()
        );
        Ok(Self::with_backend(backend, options))
    }

    /// Load a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ExtractOptions) -> Result<Self> {
        detect_format_from_bytes(data)?;
        let backend = LopdfBackend::load_bytes(data)?;
        Ok(Self::with_backend(backend, options))
    }
}

impl<B: PdfBackend> PdfExtractor<B> {
    /// Wrap any backend.
    pub fn with_backend(backend: B, options: ExtractOptions) -> Self {
        Self { backend, options }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Extract Markdown page by page.
    ///
    /// Pages are visited in order until the page limit. Each page yields its
    /// structured Markdown, or its plain text when that is empty; blank pages
    /// are skipped and the rest are joined by one blank line.
    pub fn extract(self) -> Result<PdfExtraction> {
        let page_count = self.backend.page_count();
        let mut analyzer = LayoutAnalyzer::new(&self.backend);
        let renderer = MarkdownRenderer::default();
        let mut chunks: Vec<String> = Vec::new();

        for page_num in 1..=page_count {
            if self.options.exceeds_limit((page_num - 1) as usize) {
                break;
            }

            let text = match self.page_markdown(&mut analyzer, &renderer, page_num) {
                Ok(text) => text,
                Err(e) if self.options.error_mode == ErrorMode::Lenient => {
                    log::warn!("Failed to extract text from page {}: {}", page_num, e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            if !text.is_empty() {
                chunks.push(text);
            }
        }

        let joined = chunks.join("\n\n");
        let markdown = match &self.options.cleanup {
            Some(cleanup) => CleanupPipeline::new(cleanup.clone()).process(&joined),
            None => joined.trim().to_string(),
        };

        Ok(PdfExtraction {
            markdown,
            page_count,
            pages_extracted: chunks.len() as u32,
        })
    }

    /// Trimmed Markdown of one page, falling back to plain text.
    fn page_markdown(
        &self,
        analyzer: &mut LayoutAnalyzer<'_, B>,
        renderer: &MarkdownRenderer,
        page_num: u32,
    ) -> Result<String> {
        if self.options.structured {
            match analyzer.extract_page_blocks(page_num) {
                Ok(blocks) => {
                    let markdown = renderer.render(&blocks);
                    if !markdown.trim().is_empty() {
                        return Ok(markdown.trim().to_string());
                    }
                }
                Err(e) => log::debug!("layout analysis failed on page {}: {}", page_num, e),
            }
        }

        let text = self.backend.page_text(page_num)?;
        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::parser::backend::PageContent;

    /// Backend whose pages carry only plain text, with an optional broken page.
    struct TextPages {
        pages: Vec<&'static str>,
        broken: Option<u32>,
    }

    impl PdfBackend for TextPages {
        fn page_count(&self) -> u32 {
            self.pages.len() as u32
        }

        fn page_text(&self, page: u32) -> Result<String> {
            if self.broken == Some(page) {
                return Err(Error::TextExtract(format!("Page {}: bad stream", page)));
            }
            Ok(self.pages[page as usize - 1].to_string())
        }

        fn page_content(&self, _page: u32) -> Result<PageContent> {
            Ok(PageContent::default())
        }

        fn decode_text(&self, _page: u32, _font: &[u8], bytes: &[u8]) -> String {
            String::from_utf8_lossy(bytes).to_string()
        }
    }

    fn extract(backend: TextPages, options: ExtractOptions) -> Result<PdfExtraction> {
        PdfExtractor::with_backend(backend, options).extract()
    }

    #[test]
    fn test_plain_text_fallback_and_join() {
        let backend = TextPages {
            pages: vec!["  first page \n", "", "third"],
            broken: None,
        };
        let result = extract(backend, ExtractOptions::default()).unwrap();
        assert_eq!(result.markdown, "first page\n\nthird");
        assert_eq!(result.page_count, 3);
        assert_eq!(result.pages_extracted, 2);
    }

    #[test]
    fn test_page_limit_keeps_total_count() {
        let backend = TextPages {
            pages: vec!["one", "two", "three", "four", "five"],
            broken: None,
        };
        let result = extract(backend, ExtractOptions::new().with_max_pages(1)).unwrap();
        assert_eq!(result.markdown, "one");
        assert_eq!(result.page_count, 5);
    }

    #[test]
    fn test_strict_mode_fails_on_bad_page() {
        let backend = TextPages {
            pages: vec!["one", "two"],
            broken: Some(2),
        };
        let err = extract(backend, ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, Error::TextExtract(_)));
    }

    #[test]
    fn test_lenient_mode_skips_bad_page() {
        let backend = TextPages {
            pages: vec!["one", "two", "three"],
            broken: Some(2),
        };
        let result = extract(backend, ExtractOptions::new().lenient()).unwrap();
        assert_eq!(result.markdown, "one\n\nthree");
        assert_eq!(result.pages_extracted, 2);
    }

    #[test]
    fn test_not_a_pdf() {
        let err = PdfExtractor::from_bytes_with_options(b"hello", ExtractOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, Error::UnknownFormat));
    }
}
