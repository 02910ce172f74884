//! Pure Markdown text transforms used by the Word builder.
//!
//! Nothing in here touches a document object: every function maps text to
//! text (or to tokens), which keeps the builder's behaviour testable without
//! a Word package.

mod critic;
mod inline;
mod line;
mod section;

pub use critic::{
    extract_critic_markup, normalize_comment_text, prepare_comment, segments, strip_html_comments,
    CriticBlock, Segment,
};
pub use inline::{tokenize, InlineRun, RunStyle};
pub use line::{classify_line, split_lines, LineKind};
pub use section::{insert_block_in_sections, normalize_newlines, Insertion, InsertionBlock};
