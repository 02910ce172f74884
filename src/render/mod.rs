//! Rendering of analyzed PDF pages to Markdown, plus text cleanup.

mod cleanup;
mod markdown;

pub use cleanup::{CleanupOptions, CleanupPipeline};
pub use markdown::{blocks_to_markdown, MarkdownRenderer};
