//! Document converters with dispatch by file extension.
//!
//! # Example
//!
//! ```no_run
//! use mddoc::convert::{ConverterRegistry, ConvertOptions};
//! use std::path::Path;
//!
//! fn main() -> mddoc::Result<()> {
//!     let registry = ConverterRegistry::with_defaults();
//!     let result = registry.convert(Path::new("hearing.pdf"), &ConvertOptions::default())?;
//!     println!("{} ({:?} pages)", result.markdown, result.metadata.pages);
//!     Ok(())
//! }
//! ```

mod pdf;
mod text;

pub use pdf::PdfConverter;
pub use text::{MarkdownConverter, TextConverter};

use crate::detect::{display_suffix, extension_of, SourceType};
use crate::error::{Error, Result};
use crate::parser::ExtractOptions;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Options for document conversion.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// PDF extraction options (ignored for text inputs)
    pub extract: ExtractOptions,
}

impl ConvertOptions {
    /// Create new conversion options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set PDF extraction options.
    pub fn with_extract_options(mut self, options: ExtractOptions) -> Self {
        self.extract = options;
        self
    }

    /// Limit PDF extraction to the first `pages` pages; 0 means all.
    pub fn with_max_pages(mut self, pages: u32) -> Self {
        self.extract = self.extract.with_max_pages(pages);
        self
    }
}

/// Metadata reported alongside converted Markdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// Total page count (PDF only)
    pub pages: Option<u32>,

    /// Source type
    #[serde(rename = "type")]
    pub source_type: SourceType,
}

impl SourceMetadata {
    /// Metadata of a PDF with `pages` pages in total.
    pub fn pdf(pages: u32) -> Self {
        Self {
            pages: Some(pages),
            source_type: SourceType::Pdf,
        }
    }

    /// Metadata of a page-less text source.
    pub fn text(source_type: SourceType) -> Self {
        Self {
            pages: None,
            source_type,
        }
    }
}

/// Result of document conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertResult {
    /// Converted Markdown
    pub markdown: String,

    /// Source document metadata
    pub metadata: SourceMetadata,
}

impl ConvertResult {
    /// Create a new conversion result.
    pub fn new(markdown: String, metadata: SourceMetadata) -> Self {
        Self { markdown, metadata }
    }

    /// Get content length in bytes.
    pub fn content_len(&self) -> usize {
        self.markdown.len()
    }
}

/// Trait for document converters.
///
/// Implement this trait to add support for a new document format.
pub trait DocumentConverter: Send + Sync {
    /// Get the supported file extensions for this converter.
    ///
    /// Extensions should be lowercase without the leading dot (e.g., `["pdf"]`).
    /// The empty string claims files without an extension.
    fn supported_extensions(&self) -> &[&str];

    /// Get the name of this converter.
    fn name(&self) -> &str;

    /// Convert a file at the given path.
    fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult>;

    /// Convert from bytes.
    fn convert_bytes(&self, bytes: &[u8], options: &ConvertOptions) -> Result<ConvertResult>;

    /// Check if this converter supports the given extension.
    fn supports_extension(&self, ext: &str) -> bool {
        let ext_lower = ext.to_lowercase();
        self.supported_extensions().iter().any(|e| *e == ext_lower)
    }
}

/// Registry for document converters.
///
/// The registry maps file extensions to converters and provides
/// convenient methods for converting documents.
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<dyn DocumentConverter>>,
    by_name: HashMap<String, Arc<dyn DocumentConverter>>,
}

impl ConverterRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
            by_name: HashMap::new(),
        }
    }

    /// Create a registry with the PDF, Markdown and text converters.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(PdfConverter::new()));
        registry.register(Arc::new(MarkdownConverter::new()));
        registry.register(Arc::new(TextConverter::new()));
        registry
    }

    /// Register a converter.
    ///
    /// The converter will be registered for all its supported extensions.
    pub fn register(&mut self, converter: Arc<dyn DocumentConverter>) {
        for ext in converter.supported_extensions() {
            self.converters
                .insert(ext.to_lowercase(), converter.clone());
        }
        self.by_name
            .insert(converter.name().to_lowercase(), converter);
    }

    /// Get a converter by file extension.
    pub fn get_by_extension(&self, ext: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.converters.get(&ext.to_lowercase()).cloned()
    }

    /// Get a converter by name.
    pub fn get_by_name(&self, name: &str) -> Option<Arc<dyn DocumentConverter>> {
        self.by_name.get(&name.to_lowercase()).cloned()
    }

    /// Check if an extension is supported.
    pub fn supports(&self, ext: &str) -> bool {
        self.converters.contains_key(&ext.to_lowercase())
    }

    /// Get all supported extensions.
    pub fn supported_extensions(&self) -> Vec<&str> {
        self.converters.keys().map(|s| s.as_str()).collect()
    }

    /// Convert a file using the converter for its extension.
    pub fn convert(&self, path: &Path, options: &ConvertOptions) -> Result<ConvertResult> {
        let ext = extension_of(path);
        let converter = self
            .get_by_extension(&ext)
            .ok_or_else(|| Error::UnsupportedExtension(display_suffix(&ext)))?;
        log::debug!("converting {} with {}", path.display(), converter.name());
        converter.convert(path, options)
    }

    /// Convert bytes using the specified extension to determine the converter.
    pub fn convert_bytes(
        &self,
        bytes: &[u8],
        ext: &str,
        options: &ConvertOptions,
    ) -> Result<ConvertResult> {
        let converter = self
            .get_by_extension(ext)
            .ok_or_else(|| Error::UnsupportedExtension(display_suffix(&ext.to_lowercase())))?;

        converter.convert_bytes(bytes, options)
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Convert a file with the default converters.
pub fn convert_file<P: AsRef<Path>>(path: P, options: &ConvertOptions) -> Result<ConvertResult> {
    ConverterRegistry::with_defaults().convert(path.as_ref(), options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_options_builder() {
        let options = ConvertOptions::new().with_max_pages(3);
        assert_eq!(options.extract.max_pages, Some(3));
        assert_eq!(ConvertOptions::new().with_max_pages(0).extract.max_pages, None);
    }

    #[test]
    fn test_registry_with_defaults() {
        let registry = ConverterRegistry::with_defaults();
        assert!(registry.supports("pdf"));
        assert!(registry.supports("PDF"));
        assert!(registry.supports("md"));
        assert!(registry.supports("markdown"));
        assert!(registry.supports("txt"));
        assert!(registry.supports(""));
        assert!(!registry.supports("docx"));
    }

    #[test]
    fn test_registry_get_by_name() {
        let registry = ConverterRegistry::with_defaults();
        assert_eq!(registry.get_by_extension("pdf").unwrap().name(), "pdf");
        assert_eq!(registry.get_by_extension("md").unwrap().name(), "markdown");
        assert!(registry.get_by_name("TEXT").is_some());
    }

    #[test]
    fn test_unsupported_extension_message() {
        let registry = ConverterRegistry::with_defaults();
        let err = registry
            .convert(Path::new("report.docx"), &ConvertOptions::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file extension: .docx");
    }

    #[test]
    fn test_metadata_json_shape() {
        let json = serde_json::to_value(SourceMetadata::pdf(5)).unwrap();
        assert_eq!(json, serde_json::json!({"pages": 5, "type": "pdf"}));

        let json = serde_json::to_value(SourceMetadata::text(SourceType::Markdown)).unwrap();
        assert_eq!(json, serde_json::json!({"pages": null, "type": "markdown"}));
    }
}
