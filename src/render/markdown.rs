//! Markdown rendering for analyzed PDF pages.

use crate::parser::{list_marker_len, needs_word_space, BlockType, TextBlock, TextLine};

/// Markdown renderer for layout blocks.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    /// Marker written for unordered list items
    pub list_marker: char,
    /// Deepest heading level emitted
    pub max_heading_level: u8,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self {
            list_marker: '-',
            max_heading_level: 6,
        }
    }
}

/// Render blocks with the default renderer.
pub fn blocks_to_markdown(blocks: &[TextBlock]) -> String {
    MarkdownRenderer::default().render(blocks)
}

impl MarkdownRenderer {
    /// Render a page's blocks. The result is trimmed.
    pub fn render(&self, blocks: &[TextBlock]) -> String {
        let mut output = String::new();
        let mut in_list = false;

        for block in blocks.iter().filter(|b| !b.is_empty()) {
            let is_list = block.block_type == BlockType::ListItem;
            if in_list && !is_list {
                output.push('\n');
            }
            in_list = is_list;

            match block.block_type {
                BlockType::Heading => self.render_heading(&mut output, block),
                BlockType::ListItem => self.render_list_item(&mut output, block),
                BlockType::Paragraph => {
                    output.push_str(&join_lines(&block.lines));
                    output.push_str("\n\n");
                }
            }
        }

        output.trim().to_string()
    }

    fn render_heading(&self, output: &mut String, block: &TextBlock) {
        let level = block.heading_level.clamp(1, self.max_heading_level.max(1));
        output.push_str(&"#".repeat(level as usize));
        output.push(' ');
        output.push_str(block.text().trim());
        output.push_str("\n\n");
    }

    fn render_list_item(&self, output: &mut String, block: &TextBlock) {
        let plain = block.text();
        let plain = plain.trim_start();
        let Some(marker_len) = list_marker_len(plain) else {
            output.push_str(&join_lines(&block.lines));
            output.push('\n');
            return;
        };

        let marker = plain[..marker_len].trim_end();
        if marker.starts_with(|c: char| c.is_ascii_digit()) {
            output.push_str(&marker.replace(')', "."));
        } else {
            output.push(self.list_marker);
        }
        output.push(' ');
        output.push_str(plain[marker_len..].trim());
        output.push('\n');
    }
}

/// Join a paragraph's lines, undoing end-of-line hyphenation.
fn join_lines(lines: &[TextLine]) -> String {
    let mut result = String::new();
    for line in lines {
        let rendered = render_line(line);
        let rendered = rendered.trim();
        if rendered.is_empty() {
            continue;
        }
        if result.is_empty() {
            result.push_str(rendered);
            continue;
        }

        let hyphenated = result.ends_with('-')
            && result[..result.len() - 1]
                .chars()
                .last()
                .is_some_and(char::is_alphabetic)
            && rendered.starts_with(|c: char| c.is_lowercase());
        if hyphenated {
            result.pop();
        } else {
            result.push(' ');
        }
        result.push_str(rendered);
    }
    result
}

/// Render one line, wrapping bold and italic runs in emphasis markers.
fn render_line(line: &TextLine) -> String {
    // (bold, italic, text)
    let mut runs: Vec<(bool, bool, String)> = Vec::new();
    let mut plain = String::new();

    for span in &line.spans {
        let spacer = if needs_word_space(&plain, &span.text) {
            " "
        } else {
            ""
        };
        plain.push_str(spacer);
        plain.push_str(&span.text);

        match runs.last_mut() {
            Some((bold, italic, text)) if *bold == span.is_bold && *italic == span.is_italic => {
                text.push_str(spacer);
                text.push_str(&span.text);
            }
            Some((_, _, text)) => {
                text.push_str(spacer);
                runs.push((span.is_bold, span.is_italic, span.text.clone()));
            }
            None => runs.push((span.is_bold, span.is_italic, span.text.clone())),
        }
    }

    let mut output = String::with_capacity(plain.len() + 8);
    for (bold, italic, text) in &runs {
        let marker = match (bold, italic) {
            (true, true) => "***",
            (true, false) => "**",
            (false, true) => "*",
            (false, false) => "",
        };
        let core = text.trim();
        if marker.is_empty() || core.is_empty() {
            output.push_str(text);
            continue;
        }
        let start = text.len() - text.trim_start().len();
        let end = start + core.len();
        output.push_str(&text[..start]);
        output.push_str(marker);
        output.push_str(core);
        output.push_str(marker);
        output.push_str(&text[end..]);
    }
    output
}
