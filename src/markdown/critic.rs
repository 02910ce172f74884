//! CriticMarkup highlight/comment extraction.
//!
//! `{==highlight==}{>>comment<<}` spans are swapped for positional
//! placeholders before the text is split into lines, so a comment spanning
//! several lines still resolves onto the line that held its highlight.

use regex::Regex;
use std::sync::OnceLock;

const PLACEHOLDER_PREFIX: &str = "__CRITIC_MARKUP_";

fn critic_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)\{==(.*?)==\}\s*\{>>(.+?)<<\}").expect("valid criticmarkup regex")
    })
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"__CRITIC_MARKUP_(\d+)__").expect("valid placeholder regex"))
}

fn html_comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("valid html comment regex"))
}

/// A highlight with its reviewer comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CriticBlock {
    /// Highlighted text (may contain inline formatting)
    pub highlight: String,
    /// Raw comment text
    pub comment: String,
}

/// Piece of a sanitized line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// Plain text between placeholders
    Text(&'a str),
    /// Index into the extracted [`CriticBlock`] list
    Critic(usize),
}

/// Remove `<!-- ... -->` comments, including multi-line ones.
pub fn strip_html_comments(md_text: &str) -> String {
    html_comment_regex().replace_all(md_text, "").into_owned()
}

/// Replace every CriticMarkup span with a numbered placeholder.
///
/// Returns the sanitized text and the extracted blocks, where block `i` is
/// referenced by `__CRITIC_MARKUP_i__`.
pub fn extract_critic_markup(md_text: &str) -> (String, Vec<CriticBlock>) {
    let mut blocks = Vec::new();
    let sanitized = critic_regex()
        .replace_all(md_text, |caps: &regex::Captures<'_>| {
            let index = blocks.len();
            blocks.push(CriticBlock {
                highlight: caps[1].to_string(),
                comment: caps[2].to_string(),
            });
            format!("{}{}__", PLACEHOLDER_PREFIX, index)
        })
        .into_owned();
    (sanitized, blocks)
}

/// Split a sanitized line into text and placeholder segments.
///
/// Placeholders that do not refer to one of the `block_count` extracted
/// blocks are dropped. Empty text segments are omitted.
pub fn segments(line: &str, block_count: usize) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut last_end = 0;

    for caps in placeholder_regex().captures_iter(line) {
        let whole = caps.get(0).expect("group 0 always present");
        let before = &line[last_end..whole.start()];
        if !before.is_empty() {
            out.push(Segment::Text(before));
        }
        match caps[1].parse::<usize>() {
            Ok(index) if index < block_count => out.push(Segment::Critic(index)),
            _ => log::debug!("dropping dangling placeholder {}", whole.as_str()),
        }
        last_end = whole.end();
    }

    let after = &line[last_end..];
    if !after.is_empty() {
        out.push(Segment::Text(after));
    }
    out
}

/// Normalize line endings and turn literal `\n` escape sequences into newlines.
pub fn normalize_comment_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace("\\n", "\n")
}

/// Prepare a raw comment for attachment.
///
/// A bold `**<label> N**` heading directly followed by a quote is split onto
/// its own line, then the text is normalized with [`normalize_comment_text`].
pub fn prepare_comment(comment: &str, label: &str) -> String {
    let separated = if label.is_empty() {
        comment.to_string()
    } else {
        let pattern = format!(r#"(\*\*{} \d+\*\*)\s*(")"#, regex::escape(label));
        match Regex::new(&pattern) {
            Ok(re) => re.replace_all(comment, "$1\n$2").into_owned(),
            Err(_) => comment.to_string(),
        }
    };
    normalize_comment_text(&separated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_html_comments() {
        let md = "a<!-- x -->b\n<!--\nmulti\n-->c";
        assert_eq!(strip_html_comments(md), "ab\nc");
    }

    #[test]
    fn test_extract_replaces_each_span() {
        let md = "Før {==fremhævet==} {>>kommentar<<} midt {==to==}{>>anden<<} efter";
        let (text, blocks) = extract_critic_markup(md);
        assert_eq!(
            text,
            "Før __CRITIC_MARKUP_0__ midt __CRITIC_MARKUP_1__ efter"
        );
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].highlight, "fremhævet");
        assert_eq!(blocks[0].comment, "kommentar");
        assert_eq!(blocks[1].highlight, "to");
        assert_eq!(blocks[1].comment, "anden");
    }

    #[test]
    fn test_extract_spans_lines() {
        let md = "{==linje\nto==}\n  {>>kommentar\nover linjer<<}";
        let (text, blocks) = extract_critic_markup(md);
        assert_eq!(text, "__CRITIC_MARKUP_0__");
        assert_eq!(blocks[0].highlight, "linje\nto");
        assert_eq!(blocks[0].comment, "kommentar\nover linjer");
    }

    #[test]
    fn test_unmatched_markup_is_left_alone() {
        let md = "{==kun fremhævning==} uden kommentar";
        let (text, blocks) = extract_critic_markup(md);
        assert_eq!(text, md);
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_segments_preserve_surrounding_text() {
        let segs = segments("a __CRITIC_MARKUP_0__ b __CRITIC_MARKUP_1__", 2);
        assert_eq!(
            segs,
            vec![
                Segment::Text("a "),
                Segment::Critic(0),
                Segment::Text(" b "),
                Segment::Critic(1),
            ]
        );
    }

    #[test]
    fn test_segments_drop_out_of_range_placeholder() {
        let segs = segments("x__CRITIC_MARKUP_7__y", 1);
        assert_eq!(segs, vec![Segment::Text("x"), Segment::Text("y")]);
    }

    #[test]
    fn test_prepare_comment() {
        let raw = "**Henvendelse 12** \"citat\"\\nmere\r\nslut";
        assert_eq!(
            prepare_comment(raw, "Henvendelse"),
            "**Henvendelse 12**\n\"citat\"\nmere\nslut"
        );
        assert_eq!(prepare_comment("a\\nb", ""), "a\nb");
    }
}
