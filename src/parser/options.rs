//! Extraction options and configuration.

use crate::render::CleanupOptions;

/// Options for extracting Markdown from PDF documents.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Maximum number of pages to extract (`None` = all pages)
    pub max_pages: Option<u32>,

    /// Error handling mode
    pub error_mode: ErrorMode,

    /// Use layout analysis (headings, emphasis, lists) before plain text
    pub structured: bool,

    /// Cleanup applied to the joined Markdown (`None` = raw output)
    pub cleanup: Option<CleanupOptions>,
}

impl ExtractOptions {
    /// Create new extraction options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit extraction to the first `pages` pages; 0 means no limit.
    pub fn with_max_pages(mut self, pages: u32) -> Self {
        self.max_pages = (pages > 0).then_some(pages);
        self
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (skip pages that fail to decode).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Skip layout analysis and use plain text extraction only.
    pub fn plain_text(mut self) -> Self {
        self.structured = false;
        self
    }

    /// Set cleanup options.
    pub fn with_cleanup(mut self, options: CleanupOptions) -> Self {
        self.cleanup = Some(options);
        self
    }

    /// Disable cleanup.
    pub fn without_cleanup(mut self) -> Self {
        self.cleanup = None;
        self
    }

    /// Whether the page at zero-based `index` is past the limit.
    pub fn exceeds_limit(&self, index: usize) -> bool {
        self.max_pages.is_some_and(|max| index >= max as usize)
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_pages: None,
            error_mode: ErrorMode::Strict,
            structured: true,
            cleanup: Some(CleanupOptions::default()),
        }
    }
}

/// Error handling mode during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail on any error
    #[default]
    Strict,
    /// Skip invalid pages and continue
    Lenient,
}
