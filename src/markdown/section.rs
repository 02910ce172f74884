//! Idempotent insertion of a template block under every level-2 section.

use regex::Regex;
use sha1::{Digest, Sha1};
use std::sync::OnceLock;

fn h2_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^##\s+.*$").expect("valid h2 regex"))
}

fn h1_or_h2_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^#{1,2}\s+").expect("valid heading regex"))
}

/// Convert `\r\n` and lone `\r` line endings to `\n`.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// A template fragment tagged with a marker derived from its content hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertionBlock {
    text: String,
    marker: String,
}

impl InsertionBlock {
    /// Build the insertion text from raw template Markdown.
    ///
    /// The fragment is newline-normalized and trimmed before hashing, so the
    /// marker is stable across platforms and surrounding whitespace.
    pub fn from_template(template_md: &str) -> Self {
        let fragment = normalize_newlines(template_md).trim().to_string();
        let digest = Sha1::digest(fragment.as_bytes());
        let marker = format!("<!-- INSERTED_BLOCK_SHA1:{:x} -->", digest);
        let text = format!("{} {}", fragment, marker);
        Self { text, marker }
    }

    /// Text inserted into each section (fragment followed by the marker).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The hash marker that identifies a previous insertion.
    pub fn marker(&self) -> &str {
        &self.marker
    }
}

/// Outcome of [`insert_block_in_sections`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Insertion {
    /// The rewritten Markdown
    pub text: String,
    /// Number of sections that received the block
    pub inserted: usize,
    /// Number of level-2 sections found
    pub sections: usize,
}

impl Insertion {
    /// Whether any block was inserted.
    pub fn changed(&self) -> bool {
        self.inserted > 0
    }
}

/// Append `block` to every level-2 section that does not already carry it.
///
/// A section runs from its `## ` heading to the next level-1/level-2 heading
/// or the end of the document. Sections containing the block marker, or any
/// of `answered_markers`, are left untouched.
pub fn insert_block_in_sections(
    md_text: &str,
    block: &InsertionBlock,
    answered_markers: &[String],
) -> Insertion {
    let text = normalize_newlines(md_text);
    let headings: Vec<(usize, usize)> = h2_regex()
        .find_iter(&text)
        .map(|m| (m.start(), m.end()))
        .collect();

    if headings.is_empty() {
        return Insertion {
            text,
            inserted: 0,
            sections: 0,
        };
    }

    let mut out = String::with_capacity(text.len() + headings.len() * block.text().len());
    let mut cursor = 0;
    let mut inserted = 0;

    for &(start, end) in &headings {
        // Overlapping matches cannot happen, but a previous section may already
        // have consumed this heading's start when `\s+` spans a blank line.
        if start < cursor {
            continue;
        }
        out.push_str(&text[cursor..start]);

        let next = h1_or_h2_regex().find_at(&text, end).map(|m| m.start());
        let section_end = next.unwrap_or(text.len());
        let section = &text[start..section_end];

        let answered = section.contains(block.marker())
            || answered_markers
                .iter()
                .any(|m| !m.is_empty() && section.contains(m.as_str()));

        if answered {
            out.push_str(section);
        } else {
            out.push_str(section.trim_end_matches('\n'));
            out.push('\n');
            out.push_str(block.text());
            if next.is_some() {
                out.push('\n');
            }
            inserted += 1;
        }
        cursor = section_end;
    }

    out.push_str(&text[cursor..]);
    log::debug!(
        "inserted template block into {} of {} sections",
        inserted,
        headings.len()
    );

    Insertion {
        text: out,
        inserted,
        sections: headings.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answered() -> Vec<String> {
        vec!["### Forvaltningens svar".to_string()]
    }

    #[test]
    fn test_marker_is_stable_across_line_endings() {
        let a = InsertionBlock::from_template("### Svar\r\nTekst\r\n");
        let b = InsertionBlock::from_template("\n### Svar\nTekst");
        assert_eq!(a.marker(), b.marker());
        assert!(a.marker().starts_with("<!-- INSERTED_BLOCK_SHA1:"));
        // 40 hex chars of SHA-1
        let hex = a
            .marker()
            .trim_start_matches("<!-- INSERTED_BLOCK_SHA1:")
            .trim_end_matches(" -->");
        assert_eq!(hex.len(), 40);
        assert_eq!(a.text(), format!("### Svar\nTekst {}", a.marker()));
    }

    #[test]
    fn test_inserts_under_each_h2() {
        let block = InsertionBlock::from_template("SVAR");
        let md = "# Titel\n\n## Emne 1\nTekst 1\n\n\n## Emne 2\nTekst 2\n";
        let result = insert_block_in_sections(md, &block, &answered());

        assert_eq!(result.sections, 2);
        assert_eq!(result.inserted, 2);
        let expected = format!(
            "# Titel\n\n## Emne 1\nTekst 1\n{0}\n## Emne 2\nTekst 2\n{0}",
            block.text()
        );
        assert_eq!(result.text, expected);
    }

    #[test]
    fn test_idempotent_on_own_output() {
        let block = InsertionBlock::from_template("### Svar\nSkriv her");
        let md = "## A\nx\n## B\ny\n# C\n## D\n";
        let first = insert_block_in_sections(md, &block, &answered());
        assert_eq!(first.inserted, 3);

        let second = insert_block_in_sections(&first.text, &block, &answered());
        assert_eq!(second.inserted, 0);
        assert!(!second.changed());
        assert_eq!(second.text, first.text);
    }

    #[test]
    fn test_skips_answered_sections() {
        let block = InsertionBlock::from_template("SVAR");
        let md = "## A\ntekst\n### Forvaltningens svar\nallerede svaret\n## B\nmere";
        let result = insert_block_in_sections(md, &block, &answered());
        assert_eq!(result.inserted, 1);
        assert!(result.text.starts_with("## A\ntekst\n### Forvaltningens svar"));
        assert!(result.text.ends_with(&format!("## B\nmere\n{}", block.text())));
    }

    #[test]
    fn test_no_h2_returns_normalized_text() {
        let block = InsertionBlock::from_template("SVAR");
        let result = insert_block_in_sections("# Kun titel\r\ntekst", &block, &answered());
        assert_eq!(result.sections, 0);
        assert_eq!(result.inserted, 0);
        assert_eq!(result.text, "# Kun titel\ntekst");
    }

    #[test]
    fn test_h3_does_not_start_a_section() {
        let block = InsertionBlock::from_template("SVAR");
        let md = "## A\n### Under\ntekst\n";
        let result = insert_block_in_sections(md, &block, &[]);
        assert_eq!(result.sections, 1);
        assert_eq!(
            result.text,
            format!("## A\n### Under\ntekst\n{}", block.text())
        );
    }
}
