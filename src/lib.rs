//! # mddoc
//!
//! Document conversion for case-handling drafts.
//!
//! Two pipelines share this crate:
//!
//! - **Markdown → Word**: [`DocxBuilder`] writes Markdown into a `.docx`
//!   template, inserting a response block under each `##` section, turning
//!   CriticMarkup (`{==text==}{>>note<<}`) into Word comments and rebuilding
//!   the table of contents.
//! - **PDF/Markdown/text → Markdown**: [`convert_file`] dispatches on the
//!   file extension; PDFs are extracted page by page with layout analysis.
//!
//! ## Quick Start
//!
//! ```no_run
//! use mddoc::{build_docx, convert_file, ConvertOptions};
//! use std::path::Path;
//!
//! fn main() -> mddoc::Result<()> {
//!     let report = build_docx(
//!         "## Emne\nTekst med {==markering==}{>>note<<}",
//!         Path::new("template.docx"),
//!         Some(Path::new("block.md")),
//!         Path::new("out/answer.docx"),
//!     )?;
//!     println!("{} comments", report.comments);
//!
//!     let result = convert_file("hearing.pdf", &ConvertOptions::new().with_max_pages(10))?;
//!     println!("{}", result.markdown);
//!     Ok(())
//! }
//! ```

pub mod build;
pub mod convert;
pub mod detect;
pub mod docx;
pub mod error;
pub mod markdown;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use build::{BuildOptions, BuildReport, DocxBuilder};
pub use convert::{
    convert_file, ConvertOptions, ConvertResult, ConverterRegistry, DocumentConverter,
    SourceMetadata,
};
pub use detect::{detect_format_from_bytes, detect_format_from_path, PdfFormat, SourceType};
pub use docx::WordDocument;
pub use error::{Error, Result};
pub use parser::{ErrorMode, ExtractOptions, PdfExtraction, PdfExtractor};
pub use render::{CleanupOptions, CleanupPipeline};

use std::path::Path;

/// Build a Word document from Markdown with default options.
///
/// See [`DocxBuilder::build_file`] for how `template` and `template_block`
/// are treated when missing.
pub fn build_docx(
    markdown: &str,
    template: &Path,
    template_block: Option<&Path>,
    output: &Path,
) -> Result<BuildReport> {
    DocxBuilder::default().build_file(markdown, template, template_block, output)
}

/// Extract Markdown from a PDF file.
///
/// # Example
///
/// ```no_run
/// use mddoc::extract_markdown;
///
/// let extraction = extract_markdown("document.pdf").unwrap();
/// println!("{} pages", extraction.page_count);
/// ```
pub fn extract_markdown<P: AsRef<Path>>(path: P) -> Result<PdfExtraction> {
    extract_markdown_with_options(path, ExtractOptions::default())
}

/// Extract Markdown from a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use mddoc::{extract_markdown_with_options, ExtractOptions};
///
/// let options = ExtractOptions::new().with_max_pages(2).lenient();
/// let extraction = extract_markdown_with_options("document.pdf", options).unwrap();
/// ```
pub fn extract_markdown_with_options<P: AsRef<Path>>(
    path: P,
    options: ExtractOptions,
) -> Result<PdfExtraction> {
    PdfExtractor::open_with_options(path, options)?.extract()
}

/// Extract Markdown from PDF bytes.
pub fn extract_markdown_bytes(data: &[u8], options: ExtractOptions) -> Result<PdfExtraction> {
    PdfExtractor::from_bytes_with_options(data, options)?.extract()
}
