//! Style lookup over `word/styles.xml`.

use super::xml::Element;

/// Kind of a style definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleKind {
    Paragraph,
    Character,
    Table,
    Numbering,
}

impl StyleKind {
    fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some("character") => StyleKind::Character,
            Some("table") => StyleKind::Table,
            Some("numbering") => StyleKind::Numbering,
            _ => StyleKind::Paragraph,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct StyleEntry {
    id: String,
    name: String,
    kind: StyleKind,
    is_default: bool,
}

/// Styles declared by a document.
///
/// Lookups accept a display name (case-insensitive, so `Heading 1` finds
/// Word's stored `heading 1`) or a style id.
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    entries: Vec<StyleEntry>,
}

impl StyleSheet {
    pub fn from_element(root: &Element) -> Self {
        let entries = root
            .elements()
            .filter(|e| e.is("w:style"))
            .filter_map(|style| {
                let id = style.attr("w:styleId")?.to_string();
                let name = style
                    .child("w:name")
                    .and_then(|n| n.attr("w:val"))
                    .unwrap_or(id.as_str())
                    .to_string();
                Some(StyleEntry {
                    name,
                    kind: StyleKind::from_attr(style.attr("w:type")),
                    is_default: matches!(style.attr("w:default"), Some("1") | Some("true")),
                    id,
                })
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn find(&self, kind: StyleKind, name_or_id: &str) -> Option<&StyleEntry> {
        let wanted = name_or_id.trim();
        let lowered = wanted.to_lowercase();
        let of_kind = || self.entries.iter().filter(move |e| e.kind == kind);
        of_kind()
            .find(|e| e.name.to_lowercase() == lowered)
            .or_else(|| of_kind().find(|e| e.id == wanted))
    }

    /// Style id of the paragraph style called `name_or_id`.
    pub fn paragraph_style_id(&self, name_or_id: &str) -> Option<&str> {
        self.find(StyleKind::Paragraph, name_or_id)
            .map(|e| e.id.as_str())
    }

    /// Style id of the first paragraph style found among `candidates`.
    pub fn first_paragraph_style<S: AsRef<str>>(&self, candidates: &[S]) -> Option<&str> {
        candidates
            .iter()
            .find_map(|c| self.paragraph_style_id(c.as_ref()))
    }

    pub fn character_style_id(&self, name_or_id: &str) -> Option<&str> {
        self.find(StyleKind::Character, name_or_id)
            .map(|e| e.id.as_str())
    }

    /// Display name of the style with the given id.
    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.name.as_str())
    }

    /// Id of the default paragraph style.
    pub fn default_paragraph_style(&self) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.kind == StyleKind::Paragraph && e.is_default)
            .map(|e| e.id.as_str())
    }

    /// Whether a paragraph style id names a table-of-contents level.
    ///
    /// Either the display name or the id starting with `TOC` counts, which
    /// covers both `toc 1` and localized ids such as `Indholdsfortegnelse1`
    /// that keep an English name.
    pub fn is_toc_style(&self, id: &str) -> bool {
        let starts_with_toc = |s: &str| {
            s.get(..3)
                .map(|prefix| prefix.eq_ignore_ascii_case("toc"))
                .unwrap_or(false)
        };
        starts_with_toc(id) || self.name_of(id).map(starts_with_toc).unwrap_or(false)
    }
}
