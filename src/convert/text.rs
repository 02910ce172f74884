//! Markdown and plain-text converters: the input is returned verbatim.

use crate::detect::SourceType;
use crate::error::{Error, Result};
use std::path::Path;

use super::{ConvertOptions, ConvertResult, DocumentConverter, SourceMetadata};

fn verbatim(bytes: Vec<u8>, source_type: SourceType) -> Result<ConvertResult> {
    let markdown = String::from_utf8(bytes).map_err(|e| Error::Encoding(e.to_string()))?;
    Ok(ConvertResult::new(markdown, SourceMetadata::text(source_type)))
}

/// Markdown converter (`.md`, `.markdown`).
#[derive(Debug, Clone, Default)]
pub struct MarkdownConverter {
    _private: (),
}

impl MarkdownConverter {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentConverter for MarkdownConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }

    fn name(&self) -> &str {
        "markdown"
    }

    fn convert(&self, path: &Path, _options: &ConvertOptions) -> Result<ConvertResult> {
        verbatim(std::fs::read(path)?, SourceType::Markdown)
    }

    fn convert_bytes(&self, bytes: &[u8], _options: &ConvertOptions) -> Result<ConvertResult> {
        verbatim(bytes.to_vec(), SourceType::Markdown)
    }
}

/// Plain-text converter (`.txt` and files without an extension).
#[derive(Debug, Clone, Default)]
pub struct TextConverter {
    _private: (),
}

impl TextConverter {
    pub fn new() -> Self {
        Self { _private: () }
    }
}

impl DocumentConverter for TextConverter {
    fn supported_extensions(&self) -> &[&str] {
        &["txt", ""]
    }

    fn name(&self) -> &str {
        "text"
    }

    fn convert(&self, path: &Path, _options: &ConvertOptions) -> Result<ConvertResult> {
        verbatim(std::fs::read(path)?, SourceType::Text)
    }

    fn convert_bytes(&self, bytes: &[u8], _options: &ConvertOptions) -> Result<ConvertResult> {
        verbatim(bytes.to_vec(), SourceType::Text)
    }
}
