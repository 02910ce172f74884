//! Line classification for the document assembler.

use regex::Regex;
use std::sync::OnceLock;

fn heading_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*(#{1,6})\s+(.*)").expect("valid heading regex"))
}

/// What a single Markdown line turns into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Whitespace-only line
    Blank,
    /// `#`..`######` heading with its trimmed content
    Heading { level: u8, text: &'a str },
    /// Any other line, trimmed
    Body(&'a str),
}

/// Line boundaries besides `\n` and `\r`: vertical tab, form feed, file,
/// group and record separators, NEL, line and paragraph separators.
fn is_line_boundary(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0B}' | '\u{0C}' | '\u{1C}' | '\u{1D}' | '\u{1E}' | '\u{85}' | '\u{2028}' | '\u{2029}'
    )
}

/// Split `text` into lines at every Unicode line boundary.
///
/// `\r\n` counts as one boundary and a trailing boundary does not start an
/// empty last line, so page breaks pasted from PDFs become line breaks.
pub fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !is_line_boundary(c) {
            continue;
        }
        lines.push(&text[start..i]);
        start = i + c.len_utf8();
        if c == '\r' {
            if let Some(&(j, '\n')) = chars.peek() {
                chars.next();
                start = j + 1;
            }
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Classify one line of sanitized Markdown.
pub fn classify_line(line: &str) -> LineKind<'_> {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    if let Some(caps) = heading_regex().captures(line) {
        let level = caps[1].len() as u8;
        let text = caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default();
        return LineKind::Heading { level, text };
    }
    LineKind::Body(line.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify_line("   "), LineKind::Blank);
        assert_eq!(
            classify_line("## Emne  "),
            LineKind::Heading {
                level: 2,
                text: "Emne"
            }
        );
        assert_eq!(
            classify_line("  ###### dyb"),
            LineKind::Heading {
                level: 6,
                text: "dyb"
            }
        );
        assert_eq!(classify_line("####### for dyb"), LineKind::Body("####### for dyb"));
        assert_eq!(classify_line("#hashtag"), LineKind::Body("#hashtag"));
        assert_eq!(classify_line("  brødtekst "), LineKind::Body("brødtekst"));
    }

    #[test]
    fn test_split_lines_on_unicode_boundaries() {
        assert_eq!(split_lines("a\nb"), vec!["a", "b"]);
        assert_eq!(split_lines("a\r\nb\rc"), vec!["a", "b", "c"]);
        assert_eq!(
            split_lines("Side 1\u{0C}Side 2\nlinje\u{0B}to"),
            vec!["Side 1", "Side 2", "linje", "to"]
        );
        assert_eq!(split_lines("x\u{1C}y\u{1D}z\u{1E}w"), vec!["x", "y", "z", "w"]);
        assert_eq!(split_lines("æ\u{85}ø\u{2028}å\u{2029}"), vec!["æ", "ø", "å"]);
    }

    #[test]
    fn test_split_lines_trailing_and_empty() {
        assert!(split_lines("").is_empty());
        assert_eq!(split_lines("a\n"), vec!["a"]);
        assert_eq!(split_lines("a\n\nb\n"), vec!["a", "", "b"]);
        assert_eq!(split_lines("\n"), vec![""]);
        assert_eq!(split_lines("\u{0C}\u{0C}"), vec!["", ""]);
    }
}
