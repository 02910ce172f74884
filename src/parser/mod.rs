//! PDF parsing module.

pub mod backend;
mod layout;
mod options;
mod pdf_extractor;

pub use backend::{LopdfBackend, Operand, Operation, PageContent, PdfBackend};
pub use layout::{BlockType, FontStatistics, LayoutAnalyzer, TextBlock, TextLine, TextSpan};
pub(crate) use layout::{list_marker_len, needs_word_space};
pub use options::{ErrorMode, ExtractOptions};
pub use pdf_extractor::{PdfExtraction, PdfExtractor};
