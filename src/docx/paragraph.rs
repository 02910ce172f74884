//! Paragraph and run model, turned into `w:p` elements.

use super::xml::{self, Element};
use crate::markdown::{tokenize, InlineRun, RunStyle};

/// Something placed inside a paragraph.
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Run(InlineRun),
    /// A run holding a single line break
    Break,
    CommentStart(u32),
    CommentEnd(u32),
    /// The run that shows the comment mark, with an optional character style
    CommentReference { id: u32, style: Option<String> },
    /// Comment mark inside the comment body itself
    AnnotationRef { style: Option<String> },
}

/// A paragraph under construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    style: Option<String>,
    outline_level: Option<u8>,
    items: Vec<Item>,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_style(&mut self, style_id: impl Into<String>) {
        self.style = Some(style_id.into());
    }

    pub fn style(&self) -> Option<&str> {
        self.style.as_deref()
    }

    pub fn set_outline_level(&mut self, level: u8) {
        self.outline_level = Some(level);
    }

    pub fn outline_level(&self) -> Option<u8> {
        self.outline_level
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn push_run(&mut self, run: InlineRun) {
        self.items.push(Item::Run(run));
    }

    /// Append `text` as runs, applying `**bold**` and `*italic*` markup.
    pub fn push_formatted(&mut self, text: &str) {
        for run in tokenize(text) {
            self.push_run(run);
        }
    }

    pub fn add_break(&mut self) {
        self.items.push(Item::Break);
    }

    /// Anchor comment `id` on the items from `start` to the current end.
    ///
    /// An empty range still gets its start and end marks.
    pub fn wrap_comment(&mut self, start: usize, id: u32, reference_style: Option<String>) {
        let start = start.min(self.items.len());
        self.items.insert(start, Item::CommentStart(id));
        self.items.push(Item::CommentEnd(id));
        self.items.push(Item::CommentReference {
            id,
            style: reference_style,
        });
    }

    /// Plain text of all runs; breaks become `\n`.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            match item {
                Item::Run(run) => out.push_str(&run.text),
                Item::Break => out.push('\n'),
                _ => {}
            }
        }
        out
    }

    pub fn to_element(&self) -> Element {
        let mut p = Element::new("w:p");

        let mut ppr = Element::new("w:pPr");
        if let Some(style) = &self.style {
            ppr.push(Element::new("w:pStyle").with_attr("w:val", style.as_str()));
        }
        if let Some(level) = self.outline_level {
            ppr.push(Element::new("w:outlineLvl").with_attr("w:val", level.to_string()));
        }
        if !ppr.children.is_empty() {
            p.push(ppr);
        }

        for item in &self.items {
            match item {
                Item::Run(run) => p.push(run_element(&run.text, run.style)),
                Item::Break => p.push(Element::new("w:r").with_child(Element::new("w:br"))),
                Item::CommentStart(id) => {
                    p.push(Element::new("w:commentRangeStart").with_attr("w:id", id.to_string()))
                }
                Item::CommentEnd(id) => {
                    p.push(Element::new("w:commentRangeEnd").with_attr("w:id", id.to_string()))
                }
                Item::CommentReference { id, style } => {
                    let mut r = Element::new("w:r");
                    if let Some(rpr) = character_style(style.as_deref()) {
                        r.push(rpr);
                    }
                    r.push(Element::new("w:commentReference").with_attr("w:id", id.to_string()));
                    p.push(r);
                }
                Item::AnnotationRef { style } => {
                    let mut r = Element::new("w:r");
                    if let Some(rpr) = character_style(style.as_deref()) {
                        r.push(rpr);
                    }
                    r.push(Element::new("w:annotationRef"));
                    p.push(r);
                }
            }
        }
        p
    }
}

fn character_style(style: Option<&str>) -> Option<Element> {
    style.map(|id| Element::new("w:rPr").with_child(Element::new("w:rStyle").with_attr("w:val", id)))
}

/// A `w:r` for `text`; `\n` becomes `w:br` and `\t` becomes `w:tab`.
pub fn run_element(text: &str, style: RunStyle) -> Element {
    let mut r = Element::new("w:r");
    if style.bold || style.italic {
        let mut rpr = Element::new("w:rPr");
        if style.bold {
            rpr.push(Element::new("w:b"));
        }
        if style.italic {
            rpr.push(Element::new("w:i"));
        }
        r.push(rpr);
    }

    let mut pending = String::new();
    let flush = |r: &mut Element, pending: &mut String| {
        if !pending.is_empty() {
            r.push(text_element(pending));
            pending.clear();
        }
    };
    for ch in text.chars() {
        match ch {
            '\n' => {
                flush(&mut r, &mut pending);
                r.push(Element::new("w:br"));
            }
            '\t' => {
                flush(&mut r, &mut pending);
                r.push(Element::new("w:tab"));
            }
            '\r' => {}
            other if !xml::is_xml_char(other) => {}
            other => pending.push(other),
        }
    }
    flush(&mut r, &mut pending);
    r
}

fn text_element(text: &str) -> Element {
    let mut t = Element::new("w:t");
    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
        t.set_attr("xml:space", "preserve");
    }
    t.with_text(text)
}

/// Visible text of a `w:p`: `w:t` content, tabs as `\t`, breaks as `\n`.
pub fn paragraph_text(p: &Element) -> String {
    let mut out = String::new();
    collect_text(p, &mut out);
    out
}

fn collect_text(element: &Element, out: &mut String) {
    for child in element.elements() {
        match child.name.as_str() {
            "w:t" => out.push_str(&child.text()),
            "w:tab" => out.push('\t'),
            "w:br" | "w:cr" => out.push('\n'),
            // deleted revisions and field codes are not visible text
            "w:delText" | "w:instrText" | "w:pPr" | "w:rPr" => {}
            _ => collect_text(child, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::xml;

    #[test]
    fn test_run_element_breaks_and_tabs() {
        let r = run_element("a\nb\tc ", RunStyle::BOLD);
        let names: Vec<&str> = r.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["w:rPr", "w:t", "w:br", "w:t", "w:tab", "w:t"]);
        let last = r.elements().last().unwrap();
        assert_eq!(last.attr("xml:space"), Some("preserve"));
        assert_eq!(last.text(), "c ");
    }

    #[test]
    fn test_formatted_paragraph() {
        let mut p = Paragraph::new();
        p.set_style("BodyText");
        p.push_formatted("**fed** og *kursiv*");
        let element = p.to_element();
        let out = String::from_utf8(xml::to_bytes(&element)).unwrap();
        assert!(out.contains(r#"<w:pStyle w:val="BodyText"/>"#));
        assert!(out.contains("<w:r><w:rPr><w:b/></w:rPr><w:t>fed</w:t></w:r>"));
        assert!(out.contains("<w:r><w:rPr><w:i/></w:rPr><w:t>kursiv</w:t></w:r>"));
        assert_eq!(paragraph_text(&element), "fed og kursiv");
    }

    #[test]
    fn test_wrap_comment_order() {
        let mut p = Paragraph::new();
        p.push_formatted("før ");
        let start = p.len();
        p.push_formatted("fremhævet");
        p.wrap_comment(start, 3, Some("CommentReference".to_string()));
        p.push_formatted(" efter");

        let element = p.to_element();
        let names: Vec<&str> = element.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["w:r", "w:commentRangeStart", "w:r", "w:commentRangeEnd", "w:r", "w:r"]
        );
        let reference = element.find_descendant(|e| e.is("w:commentReference")).unwrap();
        assert_eq!(reference.attr("w:id"), Some("3"));
    }

    #[test]
    fn test_empty_comment_range() {
        let mut p = Paragraph::new();
        p.wrap_comment(0, 0, None);
        assert_eq!(
            p.items(),
            &[
                Item::CommentStart(0),
                Item::CommentEnd(0),
                Item::CommentReference { id: 0, style: None },
            ]
        );
    }

    #[test]
    fn test_paragraph_text_reads_runs() {
        let p = xml::parse(
            br#"<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr><w:r><w:t>Forslag</w:t><w:tab/><w:t>til</w:t></w:r><w:r><w:instrText>TOC</w:instrText></w:r></w:p>"#,
            "p",
        )
        .unwrap();
        assert_eq!(paragraph_text(&p), "Forslag\ttil");
    }
}
