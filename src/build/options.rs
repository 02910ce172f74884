//! Word builder options and configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::docx::DEFAULT_TOC_INSTRUCTION;
use crate::error::Result;

/// Options for building a Word document from Markdown.
///
/// Every field has a default matching the hearing-response template, so a
/// JSON options file only needs the fields it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Prefix of the title paragraph kept out of the TOC (case-insensitive)
    pub title_prefix: String,

    /// Headings that mark a section as already answered
    pub answered_markers: Vec<String>,

    /// Author written on every comment
    pub comment_author: String,

    /// Initials written on every comment
    pub comment_initials: String,

    /// Label of the bold `**<label> N**` heading inside comments
    pub comment_label: String,

    /// Prefix of the inline note used when a comment cannot be attached
    pub inline_note_prefix: String,

    /// Attach CriticMarkup comments as Word comments (false = inline notes)
    pub attach_comments: bool,

    /// Text shown in the rebuilt TOC until fields are updated
    pub toc_placeholder: String,

    /// Instruction used when the template's TOC field cannot be read
    pub default_toc_instruction: String,

    /// Paragraph styles tried, in order, for body text and blank lines
    pub body_styles: Vec<String>,

    /// Heading style patterns tried in order; `{level}` is replaced by 1-6
    pub heading_styles: Vec<String>,

    /// Set `w:updateFields` so Word refreshes the TOC on open
    pub update_fields_on_open: bool,
}

impl BuildOptions {
    /// Create new build options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON file; missing fields keep their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&data)
    }

    pub fn from_json(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }

    /// Set the comment author and initials.
    pub fn with_author(mut self, author: impl Into<String>, initials: impl Into<String>) -> Self {
        self.comment_author = author.into();
        self.comment_initials = initials.into();
        self
    }

    /// Set the title prefix.
    pub fn with_title_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.title_prefix = prefix.into();
        self
    }

    /// Add a marker that flags a section as answered.
    pub fn with_answered_marker(mut self, marker: impl Into<String>) -> Self {
        self.answered_markers.push(marker.into());
        self
    }

    /// Write comments inline instead of attaching Word comments.
    pub fn inline_comments(mut self) -> Self {
        self.attach_comments = false;
        self
    }

    /// Set the TOC placeholder text.
    pub fn with_toc_placeholder(mut self, text: impl Into<String>) -> Self {
        self.toc_placeholder = text.into();
        self
    }

    /// Set the body style fallback chain.
    pub fn with_body_styles<I, S>(mut self, styles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.body_styles = styles.into_iter().map(Into::into).collect();
        self
    }

    /// Enable or disable update-fields-on-open.
    pub fn with_update_fields(mut self, enabled: bool) -> Self {
        self.update_fields_on_open = enabled;
        self
    }

    /// Style names to try for a heading of `level`.
    pub fn heading_style_names(&self, level: u8) -> Vec<String> {
        let level = level.to_string();
        self.heading_styles
            .iter()
            .map(|pattern| pattern.replace("{level}", &level))
            .collect()
    }
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            title_prefix: "forslag til".to_string(),
            answered_markers: vec!["### Forvaltningens svar".to_string()],
            comment_author: "AI Høringsassistent".to_string(),
            comment_initials: "AI".to_string(),
            comment_label: "Henvendelse".to_string(),
            inline_note_prefix: "[Kommentar]".to_string(),
            attach_comments: true,
            toc_placeholder: "Højreklik -> Opdater felt".to_string(),
            default_toc_instruction: DEFAULT_TOC_INSTRUCTION.to_string(),
            body_styles: vec![
                "Normal".to_string(),
                "Brødtekst".to_string(),
                "Body Text".to_string(),
            ],
            heading_styles: vec![
                "Heading {level}".to_string(),
                "Overskrift {level}".to_string(),
                "Rubrik {level}".to_string(),
                "Titel {level}".to_string(),
            ],
            update_fields_on_open: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = BuildOptions::default();
        assert_eq!(options.comment_author, "AI Høringsassistent");
        assert_eq!(options.default_toc_instruction, r#"TOC \o "1-3" \h \z \u"#);
        assert_eq!(
            options.heading_style_names(2),
            vec!["Heading 2", "Overskrift 2", "Rubrik 2", "Titel 2"]
        );
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let options = BuildOptions::from_json(r#"{"comment_author": "Sagsbehandler", "attach_comments": false}"#).unwrap();
        assert_eq!(options.comment_author, "Sagsbehandler");
        assert!(!options.attach_comments);
        assert_eq!(options.comment_initials, "AI");
        assert_eq!(options.body_styles.len(), 3);
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let err = BuildOptions::from_json("{nope").unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_builder_methods() {
        let options = BuildOptions::new()
            .with_author("X", "Y")
            .with_answered_marker("### Svar")
            .inline_comments()
            .with_body_styles(["Brødtekst"]);
        assert_eq!(options.comment_initials, "Y");
        assert_eq!(options.answered_markers.len(), 2);
        assert!(!options.attach_comments);
        assert_eq!(options.body_styles, vec!["Brødtekst"]);
    }
}
