//! Word (`.docx`) editing.
//!
//! This module provides:
//! - [`Package`]: the zip container with relationship and content-type helpers
//! - [`Element`]: a small owned XML tree for the parts we edit
//! - [`WordDocument`]: paragraphs, styles, comments, TOC and settings
//! - [`Paragraph`]: runs and comment anchors, built before insertion

mod comments;
mod document;
mod package;
mod paragraph;
mod styles;
mod template;
mod toc;
pub mod xml;

pub use comments::{CommentStyles, Comments};
pub use document::WordDocument;
pub use package::Package;
pub use paragraph::{paragraph_text, run_element, Item, Paragraph};
pub use styles::{StyleKind, StyleSheet};
pub use template::blank_package;
pub use toc::{
    enable_update_fields, exclude_title, read_toc_instruction, replace_toc, set_outline_level,
    TocReplacement, BODY_TEXT_OUTLINE_LEVEL, DEFAULT_TOC_INSTRUCTION,
};
pub use xml::{Element, Node};
