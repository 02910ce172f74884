//! Outline levels, table-of-contents rebuild and update-on-open.

use regex::Regex;
use std::sync::OnceLock;

use super::paragraph::paragraph_text;
use super::styles::StyleSheet;
use super::xml::{Element, Node};

pub const DEFAULT_TOC_INSTRUCTION: &str = r#"TOC \o "1-3" \h \z \u"#;

/// Outline level that keeps a paragraph out of the TOC.
pub const BODY_TEXT_OUTLINE_LEVEL: u8 = 9;

/// `w:pPr` children that must follow `w:outlineLvl`.
const PPR_AFTER_OUTLINE: &[&str] = &["w:divId", "w:cnfStyle", "w:rPr", "w:sectPr", "w:pPrChange"];

/// `w:settings` children that must follow `w:updateFields`.
const SETTINGS_AFTER_UPDATE_FIELDS: &[&str] = &[
    "w:hdrShapeDefaults",
    "w:footnotePr",
    "w:endnotePr",
    "w:compat",
    "w:docVars",
    "w:rsids",
    "m:mathPr",
    "w:attachedSchema",
    "w:themeFontLang",
    "w:clrSchemeMapping",
    "w:doNotIncludeSubdocsInStats",
    "w:doNotAutoCompressPictures",
    "w:forceUpgrade",
    "w:captions",
    "w:readModeInkLockDown",
    "w:smartTagType",
    "sl:schemaLibrary",
    "w:shapeDefaults",
    "w:doNotEmbedSmartTags",
    "w:decimalSymbol",
    "w:listSeparator",
];

fn toc_instr_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(TOC\s.*)").expect("valid toc instruction regex"))
}

/// Result of a TOC rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocReplacement {
    /// Field instruction written into the new TOC paragraph
    pub instruction: String,
    /// Number of old TOC paragraphs removed
    pub removed: usize,
}

/// The `w:pPr` of a paragraph, created as its first child when absent.
fn ensure_ppr(p: &mut Element) -> &mut Element {
    if p.child("w:pPr").is_none() {
        p.children.insert(0, Node::Element(Element::new("w:pPr")));
    }
    p.ensure_child("w:pPr")
}

fn paragraph_style(p: &Element) -> Option<&str> {
    p.child("w:pPr")
        .and_then(|ppr| ppr.child("w:pStyle"))
        .and_then(|s| s.attr("w:val"))
}

/// Replace the paragraph's outline level.
pub fn set_outline_level(p: &mut Element, level: u8) {
    let ppr = ensure_ppr(p);
    ppr.remove_children("w:outlineLvl");
    ppr.insert_before_any(
        Element::new("w:outlineLvl").with_attr("w:val", level.to_string()),
        PPR_AFTER_OUTLINE,
    );
}

/// Give the first body paragraph starting with `prefix` body-text outline
/// level, so the document title stays out of the TOC.
///
/// Matching ignores case and leading whitespace. An empty prefix disables
/// the lookup.
pub fn exclude_title(body: &mut Element, prefix: &str) -> bool {
    let prefix = prefix.to_lowercase();
    if prefix.trim().is_empty() {
        return false;
    }
    let title = body
        .elements_mut()
        .filter(|e| e.is("w:p"))
        .find(|p| {
            paragraph_text(p)
                .trim_start()
                .to_lowercase()
                .starts_with(&prefix)
        });
    match title {
        Some(p) => {
            set_outline_level(p, BODY_TEXT_OUTLINE_LEVEL);
            true
        }
        None => false,
    }
}

/// Instruction of the existing TOC field, if the body has one.
///
/// Simple fields win over complex ones; a complex field's `w:instrText`
/// pieces are joined and cut at the `TOC` keyword.
pub fn read_toc_instruction(body: &Element) -> Option<String> {
    let simple = body.find_descendant(|e| {
        e.is("w:fldSimple") && e.attr("w:instr").map(|i| i.contains("TOC")).unwrap_or(false)
    });
    if let Some(instr) = simple.and_then(|f| f.attr("w:instr")) {
        return Some(instr.to_string());
    }

    let mut instr_nodes = Vec::new();
    body.descendants_named("w:instrText", &mut instr_nodes);
    let joined: String = instr_nodes
        .iter()
        .map(|e| e.text())
        .filter(|t| t.contains("TOC"))
        .collect();
    toc_instr_regex()
        .captures(joined.trim())
        .map(|caps| caps[1].trim().to_string())
}

fn is_toc_styled(p: &Element, styles: &StyleSheet) -> bool {
    paragraph_style(p)
        .map(|id| styles.is_toc_style(id))
        .unwrap_or(false)
}

fn has_toc_simple_field(p: &Element) -> bool {
    p.find_descendant(|e| {
        e.is("w:fldSimple") && e.attr("w:instr").map(|i| i.contains("TOC")).unwrap_or(false)
    })
    .is_some()
}

fn has_field(p: &Element) -> bool {
    p.find_descendant(|e| e.is("w:fldSimple") || e.is("w:fldChar"))
        .is_some()
}

fn paragraph_positions(container: &Element) -> impl Iterator<Item = (usize, &Element)> {
    container
        .children
        .iter()
        .enumerate()
        .filter_map(|(i, n)| match n {
            Node::Element(e) if e.is("w:p") => Some((i, e)),
            _ => None,
        })
}

/// Child index of the first TOC entry paragraph in `container`.
pub fn first_toc_entry(container: &Element, styles: &StyleSheet) -> Option<usize> {
    paragraph_positions(container)
        .find(|(_, p)| is_toc_styled(p, styles))
        .or_else(|| paragraph_positions(container).find(|(_, p)| has_toc_simple_field(p)))
        .map(|(i, _)| i)
}

fn toc_paragraph(instruction: &str, placeholder: &str) -> Element {
    Element::new("w:p").with_child(
        Element::new("w:fldSimple")
            .with_attr("w:instr", instruction)
            .with_child(
                Element::new("w:r").with_child(Element::new("w:t").with_text(placeholder)),
            ),
    )
}

/// Swap the TOC entries in `container` for a single field paragraph.
fn replace_in(container: &mut Element, styles: &StyleSheet, instruction: &str, placeholder: &str) -> Option<usize> {
    let start = first_toc_entry(container, styles)?;

    // Paragraphs from the entry on, stopping at the first one that is
    // neither a field nor TOC-styled. Non-paragraph siblings are skipped.
    let mut doomed = Vec::new();
    for (i, p) in paragraph_positions(container).filter(|(i, _)| *i >= start) {
        if has_field(p) || is_toc_styled(p, styles) {
            doomed.push(i);
        } else {
            break;
        }
    }
    let first = *doomed.first()?;

    container
        .children
        .insert(first, Node::Element(toc_paragraph(instruction, placeholder)));
    for &i in doomed.iter().rev() {
        container.children.remove(i + 1);
    }
    Some(doomed.len())
}

/// Rebuild the table of contents as one `TOC` field with placeholder text.
///
/// The existing instruction is kept verbatim (`default_instruction` when
/// none can be read). Entries are looked up among the body's paragraphs
/// first, then inside body-level content controls. Returns `None` when the
/// document has no TOC.
pub fn replace_toc(
    body: &mut Element,
    styles: &StyleSheet,
    default_instruction: &str,
    placeholder: &str,
) -> Option<TocReplacement> {
    let instruction = read_toc_instruction(body).unwrap_or_else(|| default_instruction.to_string());

    let removed = match replace_in(body, styles, &instruction, placeholder) {
        Some(removed) => Some(removed),
        None => body
            .elements_mut()
            .filter(|e| e.is("w:sdt"))
            .filter_map(|sdt| sdt.child_mut("w:sdtContent"))
            .find_map(|content| replace_in(content, styles, &instruction, placeholder)),
    }?;

    log::debug!("replaced {} TOC paragraphs, instruction {:?}", removed, instruction);
    Some(TocReplacement {
        instruction,
        removed,
    })
}

/// Ask Word to refresh all fields when the document is opened.
pub fn enable_update_fields(settings: &mut Element) {
    settings.remove_children("w:updateFields");
    settings.insert_before_any(
        Element::new("w:updateFields").with_attr("w:val", "true"),
        SETTINGS_AFTER_UPDATE_FIELDS,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::xml;

    fn styles() -> StyleSheet {
        let styles = br#"<w:styles>
            <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
            <w:style w:type="paragraph" w:styleId="Indholdsfortegnelse1"><w:name w:val="toc 1"/></w:style>
            <w:style w:type="paragraph" w:styleId="Indholdsfortegnelse2"><w:name w:val="toc 2"/></w:style>
        </w:styles>"#;
        StyleSheet::from_element(&xml::parse(styles, "word/styles.xml").unwrap())
    }

    fn body(inner: &str) -> Element {
        xml::parse(format!("<w:body>{}</w:body>", inner).as_bytes(), "body").unwrap()
    }

    fn texts(body: &Element) -> Vec<String> {
        body.elements()
            .filter(|e| e.is("w:p"))
            .map(paragraph_text)
            .collect()
    }

    #[test]
    fn test_outline_level_precedes_rpr() {
        let mut p = xml::parse(
            br#"<w:p><w:pPr><w:pStyle w:val="Title"/><w:outlineLvl w:val="0"/><w:rPr><w:b/></w:rPr></w:pPr></w:p>"#,
            "p",
        )
        .unwrap();
        set_outline_level(&mut p, 9);
        let ppr = p.child("w:pPr").unwrap();
        let names: Vec<&str> = ppr.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["w:pStyle", "w:outlineLvl", "w:rPr"]);
        assert_eq!(ppr.child("w:outlineLvl").unwrap().attr("w:val"), Some("9"));
    }

    #[test]
    fn test_exclude_title() {
        let mut b = body(
            r#"<w:p><w:r><w:t>Indledning</w:t></w:r></w:p><w:p><w:r><w:t>  FORSLAG TIL lokalplan</w:t></w:r></w:p><w:p><w:r><w:t>Forslag til andet</w:t></w:r></w:p>"#,
        );
        assert!(exclude_title(&mut b, "forslag til"));
        let levels: Vec<bool> = b
            .elements()
            .map(|p| p.has_descendant("w:outlineLvl"))
            .collect();
        assert_eq!(levels, vec![false, true, false]);
        // pPr is the first child of the paragraph
        let title = b.elements().nth(1).unwrap();
        assert_eq!(title.elements().next().unwrap().name, "w:pPr");
        assert!(!exclude_title(&mut body("<w:p/>"), "forslag til"));
    }

    #[test]
    fn test_read_instruction_from_complex_field() {
        let b = body(
            r#"<w:p><w:r><w:fldChar w:fldCharType="begin"/></w:r><w:r><w:instrText xml:space="preserve"> TOC \o "1-2" \h </w:instrText></w:r><w:r><w:fldChar w:fldCharType="separate"/></w:r></w:p>"#,
        );
        assert_eq!(read_toc_instruction(&b), Some(r#"TOC \o "1-2" \h"#.to_string()));
        assert_eq!(read_toc_instruction(&body("<w:p/>")), None);
    }

    #[test]
    fn test_replace_toc_keeps_instruction_and_removes_entries() {
        let instr = r#"TOC \o "1-4" \h \z \u"#;
        let mut b = body(&format!(
            concat!(
                r#"<w:p><w:r><w:t>Indhold</w:t></w:r></w:p>"#,
                r#"<w:p><w:pPr><w:pStyle w:val="Indholdsfortegnelse1"/></w:pPr><w:r><w:fldChar w:fldCharType="begin"/></w:r><w:r><w:instrText>{}</w:instrText></w:r><w:r><w:fldChar w:fldCharType="separate"/></w:r><w:r><w:t>Emne 1</w:t></w:r></w:p>"#,
                r#"<w:p><w:pPr><w:pStyle w:val="Indholdsfortegnelse2"/></w:pPr><w:r><w:t>Emne 1.1</w:t></w:r></w:p>"#,
                r#"<w:p><w:r><w:fldChar w:fldCharType="end"/></w:r></w:p>"#,
                r#"<w:p><w:r><w:t>Brødtekst</w:t></w:r></w:p>"#,
                r#"<w:sectPr/>"#
            ),
            instr
        ));

        let result = replace_toc(&mut b, &styles(), DEFAULT_TOC_INSTRUCTION, "Højreklik -> Opdater felt").unwrap();
        assert_eq!(result.instruction, instr);
        assert_eq!(result.removed, 3);
        assert_eq!(
            texts(&b),
            vec!["Indhold", "Højreklik -> Opdater felt", "Brødtekst"]
        );
        let field = b.find_descendant(|e| e.is("w:fldSimple")).unwrap();
        assert_eq!(field.attr("w:instr"), Some(instr));
        assert!(b.elements().last().unwrap().is("w:sectPr"));
    }

    #[test]
    fn test_replace_toc_inside_content_control() {
        let mut b = body(concat!(
            r#"<w:sdt><w:sdtPr/><w:sdtContent>"#,
            r#"<w:p><w:pPr><w:pStyle w:val="TOC1"/></w:pPr><w:r><w:t>Emne</w:t></w:r></w:p>"#,
            r#"</w:sdtContent></w:sdt><w:p><w:r><w:t>Efter</w:t></w:r></w:p>"#
        ));
        let result = replace_toc(&mut b, &styles(), DEFAULT_TOC_INSTRUCTION, "x").unwrap();
        assert_eq!(result.instruction, DEFAULT_TOC_INSTRUCTION);
        assert_eq!(result.removed, 1);
        let content = b.child("w:sdt").unwrap().child("w:sdtContent").unwrap();
        assert_eq!(texts(content), vec!["x"]);
        assert_eq!(texts(&b), vec!["Efter"]);
    }

    #[test]
    fn test_no_toc_no_change() {
        let mut b = body(r#"<w:p><w:r><w:t>tekst</w:t></w:r></w:p>"#);
        let before = b.clone();
        assert!(replace_toc(&mut b, &styles(), DEFAULT_TOC_INSTRUCTION, "x").is_none());
        assert_eq!(b, before);
    }

    #[test]
    fn test_update_fields_schema_position() {
        let mut settings = xml::parse(
            br#"<w:settings><w:zoom w:percent="100"/><w:updateFields w:val="false"/><w:compat/><w:rsids/></w:settings>"#,
            "word/settings.xml",
        )
        .unwrap();
        enable_update_fields(&mut settings);
        let names: Vec<&str> = settings.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["w:zoom", "w:updateFields", "w:compat", "w:rsids"]);
        assert_eq!(settings.child("w:updateFields").unwrap().attr("w:val"), Some("true"));

        let mut bare = Element::new("w:settings");
        enable_update_fields(&mut bare);
        assert_eq!(bare.elements().count(), 1);
    }
}
