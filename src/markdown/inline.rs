//! Bold/italic tokenization.

use regex::Regex;
use std::sync::OnceLock;

fn emphasis_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(\*\*([^*]+?)\*\*)|(\*([^*]+?)\*)").expect("valid emphasis regex")
    })
}

/// Character formatting of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStyle {
    pub bold: bool,
    pub italic: bool,
}

impl RunStyle {
    pub const PLAIN: RunStyle = RunStyle {
        bold: false,
        italic: false,
    };
    pub const BOLD: RunStyle = RunStyle {
        bold: true,
        italic: false,
    };
    pub const ITALIC: RunStyle = RunStyle {
        bold: false,
        italic: true,
    };
}

/// A run of text with uniform formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineRun {
    pub text: String,
    pub style: RunStyle,
}

impl InlineRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: RunStyle::PLAIN,
        }
    }

    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: RunStyle::BOLD,
        }
    }

    pub fn italic(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: RunStyle::ITALIC,
        }
    }
}

/// Split `text` into plain, `**bold**` and `*italic*` runs, in order.
///
/// Empty plain runs between adjacent spans are not emitted.
pub fn tokenize(text: &str) -> Vec<InlineRun> {
    let mut runs = Vec::new();
    let mut last_end = 0;

    for caps in emphasis_regex().captures_iter(text) {
        let whole = caps.get(0).expect("group 0 always present");
        if whole.start() > last_end {
            runs.push(InlineRun::plain(&text[last_end..whole.start()]));
        }
        if let Some(bold) = caps.get(2) {
            runs.push(InlineRun::bold(bold.as_str()));
        } else if let Some(italic) = caps.get(4) {
            runs.push(InlineRun::italic(italic.as_str()));
        }
        last_end = whole.end();
    }

    if last_end < text.len() {
        runs.push(InlineRun::plain(&text[last_end..]));
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bold_plain_italic() {
        assert_eq!(
            tokenize("**a** b *c*"),
            vec![
                InlineRun::bold("a"),
                InlineRun::plain(" b "),
                InlineRun::italic("c"),
            ]
        );
    }

    #[test]
    fn test_plain_only() {
        assert_eq!(tokenize("bare tekst"), vec![InlineRun::plain("bare tekst")]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_adjacent_spans() {
        assert_eq!(
            tokenize("**x***y*"),
            vec![InlineRun::bold("x"), InlineRun::italic("y")]
        );
    }

    #[test]
    fn test_unbalanced_markers_stay_plain() {
        assert_eq!(tokenize("2 * 3 = 6"), vec![InlineRun::plain("2 * 3 = 6")]);
        assert_eq!(
            tokenize("**åben"),
            vec![InlineRun::plain("**åben")]
        );
    }
}
