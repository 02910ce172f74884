//! Layout analysis for PDF pages.
//!
//! Content-stream text operators are turned into positioned [`TextSpan`]s,
//! grouped into lines by baseline, and lines into blocks by spacing, font
//! size and indentation. Headings are ranked by font size against the most
//! common (body) size seen so far in the document.

use std::collections::HashMap;

use super::backend::{Operand, PageContent, PdfBackend};
use crate::error::Result;

/// A text span with position and style information.
#[derive(Debug, Clone)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// X position (left edge)
    pub x: f32,
    /// Y position (baseline)
    pub y: f32,
    /// Font size in points
    pub font_size: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Whether the font appears to be bold
    pub is_bold: bool,
    /// Whether the font appears to be italic
    pub is_italic: bool,
}

impl TextSpan {
    /// Create a new text span; weight and slant are guessed from the font name.
    pub fn new(text: String, x: f32, y: f32, font_size: f32, font_name: String) -> Self {
        let lower = font_name.to_lowercase();
        let is_bold = ["bold", "black", "heavy", "semibold"]
            .iter()
            .any(|w| lower.contains(w));
        let is_italic = lower.contains("italic") || lower.contains("oblique");

        Self {
            text,
            x,
            y,
            font_size,
            font_name,
            is_bold,
            is_italic,
        }
    }
}

/// A text line composed of spans on the same baseline.
#[derive(Debug, Clone)]
pub struct TextLine {
    /// The spans in this line, sorted by X position
    pub spans: Vec<TextSpan>,
    /// Y position (baseline)
    pub y: f32,
    /// Leftmost X position
    pub x: f32,
    /// Dominant font size in this line
    pub font_size: f32,
    /// Detected heading level (1-6, or 0 for non-heading)
    pub heading_level: u8,
}

impl TextLine {
    /// Create a new text line from spans.
    pub fn from_spans(mut spans: Vec<TextSpan>) -> Self {
        spans.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal));

        // Dominant size, weighted by text length
        let total_chars: usize = spans.iter().map(|s| s.text.len()).sum();
        let weighted: f32 = spans.iter().map(|s| s.font_size * s.text.len() as f32).sum();
        let font_size = match spans.first() {
            Some(_) if total_chars > 0 => weighted / total_chars as f32,
            Some(first) => first.font_size,
            None => 0.0,
        };
        let (x, y) = spans.first().map(|s| (s.x, s.y)).unwrap_or((0.0, 0.0));

        Self {
            spans,
            y,
            x,
            font_size,
            heading_level: 0,
        }
    }

    /// Whether this line was classified as a heading.
    pub fn is_heading(&self) -> bool {
        self.heading_level > 0
    }

    /// Combined text of all spans.
    ///
    /// A space is inserted between spans unless one side already has one or
    /// both sides are from a script written without word spaces.
    pub fn text(&self) -> String {
        let mut result = String::new();
        for span in &self.spans {
            if needs_word_space(&result, &span.text) {
                result.push(' ');
            }
            result.push_str(&span.text);
        }
        result
    }

    /// Check if the line is predominantly bold.
    pub fn is_bold(&self) -> bool {
        self.share(|s| s.is_bold) > 0.5
    }

    /// Check if the line is predominantly italic.
    pub fn is_italic(&self) -> bool {
        self.share(|s| s.is_italic) > 0.5
    }

    /// Check if the line appears to be a list item.
    pub fn is_list_item(&self) -> bool {
        list_marker_len(self.text().trim_start()).is_some()
    }

    fn share<F: Fn(&TextSpan) -> bool>(&self, pred: F) -> f32 {
        let total: usize = self.spans.iter().map(|s| s.text.len()).sum();
        if total == 0 {
            return 0.0;
        }
        let matching: usize = self
            .spans
            .iter()
            .filter(|s| pred(s))
            .map(|s| s.text.len())
            .sum();
        matching as f32 / total as f32
    }
}

/// Type of text block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    /// A heading (H1-H6)
    Heading,
    /// A regular paragraph
    Paragraph,
    /// A list item
    ListItem,
}

/// A text block (paragraph, heading, list item).
#[derive(Debug, Clone)]
pub struct TextBlock {
    /// The lines in this block
    pub lines: Vec<TextLine>,
    /// Block type
    pub block_type: BlockType,
    /// Heading level (1-6 for headings, 0 otherwise)
    pub heading_level: u8,
}

impl TextBlock {
    /// Create a block, deriving its type from the lines.
    pub fn from_lines(lines: Vec<TextLine>) -> Self {
        let heading_level = lines
            .iter()
            .filter(|l| l.is_heading())
            .map(|l| l.heading_level)
            .min()
            .unwrap_or(0);
        let block_type = if heading_level > 0 {
            BlockType::Heading
        } else if lines.first().is_some_and(TextLine::is_list_item) {
            BlockType::ListItem
        } else {
            BlockType::Paragraph
        };
        Self {
            lines,
            block_type,
            heading_level,
        }
    }

    /// Get the combined text of all lines.
    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(|l| l.text())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Check if the block is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() || self.text().trim().is_empty()
    }
}

/// Font statistics for heading detection.
#[derive(Debug, Clone, Default)]
pub struct FontStatistics {
    /// Body text font size (most common)
    pub body_size: f32,
    /// Font sizes larger than body, largest first
    pub heading_sizes: Vec<f32>,
    /// Observed font sizes (tenths of a point) with frequency
    pub size_histogram: HashMap<i32, usize>,
}

impl FontStatistics {
    /// Add a font size observation.
    pub fn add_size(&mut self, size: f32) {
        let key = (size * 10.0).round() as i32;
        *self.size_histogram.entry(key).or_insert(0) += 1;
    }

    /// Recalculate body size and heading sizes.
    pub fn analyze(&mut self) {
        // Ties go to the smaller size so results do not depend on hash order.
        let Some((&body_key, _)) = self
            .size_histogram
            .iter()
            .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then(kb.cmp(ka)))
        else {
            self.body_size = 12.0;
            self.heading_sizes.clear();
            return;
        };
        self.body_size = body_key as f32 / 10.0;

        let mut larger: Vec<f32> = self
            .size_histogram
            .keys()
            .map(|k| *k as f32 / 10.0)
            .filter(|size| *size > self.body_size + 0.5)
            .collect();
        larger.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        self.heading_sizes = larger;
    }

    /// Heading level for a font size (1-6, or 0 for body text).
    pub fn heading_level(&self, font_size: f32) -> u8 {
        // At least 1.5pt above body to avoid false positives
        if font_size < self.body_size + 1.5 {
            return 0;
        }

        for (i, &heading_size) in self.heading_sizes.iter().enumerate() {
            if font_size >= heading_size - 0.5 {
                return (i + 1).min(6) as u8;
            }
        }
        5
    }
}

/// Layout analyzer for extracting structured text from PDF pages.
///
/// Font statistics accumulate across calls, so later pages are ranked
/// against everything seen so far.
pub struct LayoutAnalyzer<'a, B: PdfBackend + ?Sized> {
    backend: &'a B,
    font_stats: FontStatistics,
}

impl<'a, B: PdfBackend + ?Sized> LayoutAnalyzer<'a, B> {
    /// Create a new layout analyzer.
    pub fn new(backend: &'a B) -> Self {
        Self {
            backend,
            font_stats: FontStatistics::default(),
        }
    }

    /// Font statistics gathered so far.
    pub fn font_stats(&self) -> &FontStatistics {
        &self.font_stats
    }

    /// Extract positioned spans from a page (1-based).
    pub fn extract_page_spans(&self, page_num: u32) -> Result<Vec<TextSpan>> {
        let content = self.backend.page_content(page_num)?;
        Ok(self.collect_spans(page_num, &content))
    }

    /// Extract structured text blocks from a page (1-based).
    pub fn extract_page_blocks(&mut self, page_num: u32) -> Result<Vec<TextBlock>> {
        let spans = self.extract_page_spans(page_num)?;
        Ok(self.analyze_spans(spans))
    }

    /// Group already extracted spans into blocks, updating font statistics.
    pub fn analyze_spans(&mut self, spans: Vec<TextSpan>) -> Vec<TextBlock> {
        for span in &spans {
            self.font_stats.add_size(span.font_size);
        }
        self.font_stats.analyze();

        let mut lines = group_spans_into_lines(spans);
        for line in &mut lines {
            line.heading_level = self.font_stats.heading_level(line.font_size);
        }
        group_lines_into_blocks(lines)
    }

    /// Walk text operators and emit a span per shown string.
    fn collect_spans(&self, page: u32, content: &PageContent) -> Vec<TextSpan> {
        let mut spans = Vec::new();
        let mut font_key: Vec<u8> = Vec::new();
        let mut font_name = String::new();
        let mut font_size: f32 = 12.0;
        let mut matrix = TextMatrix::default();
        let mut in_text = false;

        for op in &content.operations {
            let decode = |bytes: &[u8]| self.backend.decode_text(page, &font_key, bytes);

            let shown: Option<String> = match op.operator.as_str() {
                "BT" => {
                    in_text = true;
                    matrix = TextMatrix::default();
                    None
                }
                "ET" => {
                    in_text = false;
                    None
                }
                "Tf" => {
                    if let Some(name) = op.operands.first().and_then(Operand::as_name) {
                        font_key = name.to_vec();
                        font_name = content.font_name(name);
                    }
                    font_size = op.number(1, 12.0);
                    None
                }
                "TL" => {
                    matrix.leading = op.number(0, 0.0);
                    None
                }
                "Td" => {
                    matrix.translate(op.number(0, 0.0), op.number(1, 0.0));
                    None
                }
                "TD" => {
                    let ty = op.number(1, 0.0);
                    matrix.leading = -ty;
                    matrix.translate(op.number(0, 0.0), ty);
                    None
                }
                "Tm" => {
                    matrix.set(
                        op.number(0, 1.0),
                        op.number(1, 0.0),
                        op.number(2, 0.0),
                        op.number(3, 1.0),
                        op.number(4, 0.0),
                        op.number(5, 0.0),
                    );
                    None
                }
                "T*" => {
                    matrix.next_line();
                    None
                }
                "Tj" if in_text => op.operands.first().and_then(Operand::as_bytes).map(decode),
                "TJ" if in_text => match op.operands.first() {
                    Some(Operand::Array(items)) => Some(self.decode_tj(page, &font_key, items)),
                    _ => None,
                },
                "'" | "\"" => {
                    matrix.next_line();
                    let idx = if op.operator == "\"" { 2 } else { 0 };
                    op.operands
                        .get(idx)
                        .and_then(Operand::as_bytes)
                        .filter(|_| in_text)
                        .map(decode)
                }
                _ => None,
            };

            if let Some(text) = shown.filter(|t| !t.trim().is_empty()) {
                let (x, y) = matrix.position();
                spans.push(TextSpan::new(
                    text,
                    x,
                    y,
                    font_size * matrix.scale(),
                    font_name.clone(),
                ));
            }
        }

        spans
    }

    /// Decode a TJ array; large negative adjustments become word spaces.
    fn decode_tj(&self, page: u32, font_key: &[u8], items: &[Operand]) -> String {
        // In 1/1000 text space units
        const SPACE_THRESHOLD: f32 = 200.0;

        let mut combined = String::new();
        for item in items {
            match item {
                Operand::Bytes(bytes) => {
                    combined.push_str(&self.backend.decode_text(page, font_key, bytes));
                }
                Operand::Number(n) => {
                    let spaced = combined
                        .chars()
                        .last()
                        .is_some_and(|c| c.is_whitespace() || is_spaceless_script_char(c));
                    if -n > SPACE_THRESHOLD && !combined.is_empty() && !spaced {
                        combined.push(' ');
                    }
                }
                _ => {}
            }
        }
        combined
    }
}

/// Group spans into lines by baseline, top to bottom.
fn group_spans_into_lines(mut spans: Vec<TextSpan>) -> Vec<TextLine> {
    // PDF Y grows upwards
    spans.sort_by(|a, b| {
        b.y.partial_cmp(&a.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.x.partial_cmp(&b.x).unwrap_or(std::cmp::Ordering::Equal))
    });

    let mut lines = Vec::new();
    let mut current: Vec<TextSpan> = Vec::new();
    let mut current_y: Option<f32> = None;

    for span in spans {
        let tolerance = span.font_size * 0.3;
        match current_y {
            Some(y) if (span.y - y).abs() <= tolerance => current.push(span),
            _ => {
                if !current.is_empty() {
                    lines.push(TextLine::from_spans(std::mem::take(&mut current)));
                }
                current_y = Some(span.y);
                current.push(span);
            }
        }
    }
    if !current.is_empty() {
        lines.push(TextLine::from_spans(current));
    }

    lines
}

/// Group lines into blocks (paragraphs) based on spacing.
fn group_lines_into_blocks(lines: Vec<TextLine>) -> Vec<TextBlock> {
    let avg_spacing = average_line_spacing(&lines);
    let mut blocks = Vec::new();
    let mut current: Vec<TextLine> = Vec::new();

    for line in lines {
        if let Some(prev) = current.last() {
            if should_break_block(prev, &line, avg_spacing) {
                blocks.push(TextBlock::from_lines(std::mem::take(&mut current)));
            }
        }
        current.push(line);
    }
    if !current.is_empty() {
        blocks.push(TextBlock::from_lines(current));
    }

    blocks
}

fn average_line_spacing(lines: &[TextLine]) -> f32 {
    let spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[0].y - w[1].y).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return 12.0;
    }
    spacings.iter().sum::<f32>() / spacings.len() as f32
}

fn should_break_block(prev: &TextLine, curr: &TextLine, avg_spacing: f32) -> bool {
    if curr.is_heading() || prev.is_heading() || curr.is_list_item() {
        return true;
    }

    let spacing = (prev.y - curr.y).abs();
    spacing > avg_spacing * 1.5
        || (prev.font_size - curr.font_size).abs() > 1.0
        || (prev.x - curr.x).abs() > 20.0
}

/// Byte length of a leading list marker including the following space.
///
/// Recognizes bullets (`•`, `◦`, `▪`, `-`, `–`, `*`) and numbers like `1.`
/// or `2)`.
pub(crate) fn list_marker_len(text: &str) -> Option<usize> {
    let mut chars = text.char_indices();
    let (_, first) = chars.next()?;

    if matches!(first, '•' | '◦' | '▪' | '-' | '–' | '*') {
        let after = first.len_utf8();
        return text[after..]
            .starts_with(char::is_whitespace)
            .then_some(after + 1);
    }

    if first.is_ascii_digit() {
        let digits = text.bytes().take_while(u8::is_ascii_digit).count();
        if digits <= 3 {
            let rest = &text[digits..];
            if (rest.starts_with(". ") || rest.starts_with(") ")) && rest.len() > 2 {
                return Some(digits + 2);
            }
        }
    }
    None
}

/// Whether a word space belongs between `before` and `next`.
pub(crate) fn needs_word_space(before: &str, next: &str) -> bool {
    let (Some(prev), Some(curr)) = (before.chars().last(), next.chars().next()) else {
        return false;
    };
    if prev.is_whitespace() || curr.is_whitespace() {
        return false;
    }
    !(is_spaceless_script_char(prev) && is_spaceless_script_char(curr))
}

/// Text matrix for tracking position in a content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
    leading: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            leading: 12.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    fn next_line(&mut self) {
        self.translate(0.0, -self.leading);
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        (self.a * self.a + self.c * self.c).sqrt()
    }
}

/// Whether a character belongs to a script written without word spaces
/// (Han, Hiragana, Katakana, CJK punctuation). Hangul uses spaces.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2EBEF).contains(&code)
        || (0x3040..=0x309F).contains(&code)
        || (0x30A0..=0x30FF).contains(&code)
        || (0x3000..=0x303F).contains(&code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::parser::backend::Operation;

    /// One-page backend serving a fixed operation list.
    struct MockBackend {
        ops: Vec<Operation>,
    }

    impl PdfBackend for MockBackend {
        fn page_count(&self) -> u32 {
            1
        }

        fn page_text(&self, _page: u32) -> Result<String> {
            Ok(String::new())
        }

        fn page_content(&self, page: u32) -> Result<PageContent> {
            if page != 1 {
                return Err(Error::PageOutOfRange(page, 1));
            }
            Ok(PageContent {
                fonts: HashMap::from([
                    (b"F1".to_vec(), "Helvetica".to_string()),
                    (b"F2".to_vec(), "Helvetica-Bold".to_string()),
                ]),
                operations: self.ops.clone(),
            })
        }

        fn decode_text(&self, _page: u32, _font: &[u8], bytes: &[u8]) -> String {
            String::from_utf8_lossy(bytes).to_string()
        }
    }

    fn op(operator: &str, operands: Vec<Operand>) -> Operation {
        Operation::new(operator, operands)
    }

    fn show(font: &str, size: f32, x: f32, y: f32, text: &str) -> Vec<Operation> {
        vec![
            op("BT", vec![]),
            op(
                "Tf",
                vec![Operand::Name(font.as_bytes().to_vec()), Operand::Number(size)],
            ),
            op("Td", vec![Operand::Number(x), Operand::Number(y)]),
            op("Tj", vec![Operand::Bytes(text.as_bytes().to_vec())]),
            op("ET", vec![]),
        ]
    }

    fn span(text: &str, x: f32, y: f32, size: f32) -> TextSpan {
        TextSpan::new(text.to_string(), x, y, size, "Helvetica".to_string())
    }

    #[test]
    fn test_font_statistics() {
        let mut stats = FontStatistics::default();
        for _ in 0..100 {
            stats.add_size(12.0);
        }
        for _ in 0..10 {
            stats.add_size(18.0);
        }
        for _ in 0..5 {
            stats.add_size(24.0);
        }
        stats.analyze();

        assert!((stats.body_size - 12.0).abs() < 0.1);
        assert_eq!(stats.heading_level(24.0), 1);
        assert_eq!(stats.heading_level(18.0), 2);
        assert_eq!(stats.heading_level(12.0), 0);
        assert_eq!(stats.heading_level(13.0), 0);
    }

    #[test]
    fn test_empty_statistics_default_body() {
        let mut stats = FontStatistics::default();
        stats.analyze();
        assert_eq!(stats.body_size, 12.0);
        assert_eq!(stats.heading_level(12.0), 0);
    }

    #[test]
    fn test_span_style_detection() {
        let bold = TextSpan::new("a".into(), 0.0, 0.0, 12.0, "Arial-BoldMT".into());
        assert!(bold.is_bold);
        assert!(!bold.is_italic);
        let italic = TextSpan::new("a".into(), 0.0, 0.0, 12.0, "Times-Oblique".into());
        assert!(italic.is_italic);
    }

    #[test]
    fn test_line_text_spacing() {
        let line = TextLine::from_spans(vec![span("world", 50.0, 0.0, 12.0), span("Hello", 0.0, 0.0, 12.0)]);
        assert_eq!(line.text(), "Hello world");

        let cjk = TextLine::from_spans(vec![span("日本", 0.0, 0.0, 12.0), span("語", 30.0, 0.0, 12.0)]);
        assert_eq!(cjk.text(), "日本語");
    }

    #[test]
    fn test_list_marker_detection() {
        assert_eq!(list_marker_len("• item"), Some(4));
        assert_eq!(list_marker_len("- item"), Some(2));
        assert_eq!(list_marker_len("12. item"), Some(4));
        assert_eq!(list_marker_len("3) item"), Some(3));
        assert_eq!(list_marker_len("2024 was"), None);
        assert_eq!(list_marker_len("-5 degrees"), None);
    }

    #[test]
    fn test_group_lines_into_blocks() {
        let lines = group_spans_into_lines(vec![
            span("First line", 72.0, 700.0, 12.0),
            span("second line", 72.0, 686.0, 12.0),
            span("New paragraph", 72.0, 640.0, 12.0),
        ]);
        assert_eq!(lines.len(), 3);

        let blocks = group_lines_into_blocks(lines);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].text(), "First line second line");
        assert_eq!(blocks[1].block_type, BlockType::Paragraph);
    }

    #[test]
    fn test_extract_blocks_from_backend() {
        let mut ops = show("F2", 24.0, 72.0, 750.0, "Title");
        for (i, text) in ["Body one", "Body two", "Body three"].iter().enumerate() {
            ops.extend(show("F1", 12.0, 72.0, 700.0 - 14.0 * i as f32, text));
        }
        let backend = MockBackend { ops };

        let mut analyzer = LayoutAnalyzer::new(&backend);
        let blocks = analyzer.extract_page_blocks(1).unwrap();

        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].block_type, BlockType::Heading);
        assert_eq!(blocks[0].heading_level, 1);
        assert!(blocks[0].lines[0].is_bold());
        assert_eq!(blocks[1].text(), "Body one Body two Body three");
        assert!((analyzer.font_stats().body_size - 12.0).abs() < 0.1);
    }

    #[test]
    fn test_tj_adjustment_inserts_space() {
        let ops = vec![
            op("BT", vec![]),
            op("Tf", vec![Operand::Name(b"F1".to_vec()), Operand::Number(12.0)]),
            op(
                "TJ",
                vec![Operand::Array(vec![
                    Operand::Bytes(b"Hello".to_vec()),
                    Operand::Number(-250.0),
                    Operand::Bytes(b"world".to_vec()),
                    Operand::Number(-40.0),
                    Operand::Bytes(b"!".to_vec()),
                ])],
            ),
            op("ET", vec![]),
        ];
        let backend = MockBackend { ops };
        let spans = LayoutAnalyzer::new(&backend).extract_page_spans(1).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Hello world!");
    }

    #[test]
    fn test_page_out_of_range() {
        let backend = MockBackend { ops: vec![] };
        let err = LayoutAnalyzer::new(&backend).extract_page_spans(3).unwrap_err();
        assert!(matches!(err, Error::PageOutOfRange(3, 1)));
    }
}
