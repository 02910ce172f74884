//! Parts of a blank Word document, used when no template exists yet.

use super::package::{
    Package, CONTENT_TYPES_PART, CT_DOCUMENT, CT_RELATIONSHIPS, CT_SETTINGS, CT_STYLES,
    PACKAGE_RELS_PART, REL_OFFICE_DOCUMENT, REL_SETTINGS, REL_STYLES,
};

pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const XML_HEADER: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\r\n";

fn content_types() -> String {
    format!(
        concat!(
            "{header}<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\">",
            "<Default Extension=\"rels\" ContentType=\"{rels}\"/>",
            "<Default Extension=\"xml\" ContentType=\"application/xml\"/>",
            "<Override PartName=\"/word/document.xml\" ContentType=\"{document}\"/>",
            "<Override PartName=\"/word/styles.xml\" ContentType=\"{styles}\"/>",
            "<Override PartName=\"/word/settings.xml\" ContentType=\"{settings}\"/>",
            "</Types>"
        ),
        header = XML_HEADER,
        rels = CT_RELATIONSHIPS,
        document = CT_DOCUMENT,
        styles = CT_STYLES,
        settings = CT_SETTINGS,
    )
}

fn package_rels() -> String {
    format!(
        concat!(
            "{header}<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
            "<Relationship Id=\"rId1\" Type=\"{office}\" Target=\"word/document.xml\"/>",
            "</Relationships>"
        ),
        header = XML_HEADER,
        office = REL_OFFICE_DOCUMENT,
    )
}

fn document_rels() -> String {
    format!(
        concat!(
            "{header}<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\">",
            "<Relationship Id=\"rId1\" Type=\"{styles}\" Target=\"styles.xml\"/>",
            "<Relationship Id=\"rId2\" Type=\"{settings}\" Target=\"settings.xml\"/>",
            "</Relationships>"
        ),
        header = XML_HEADER,
        styles = REL_STYLES,
        settings = REL_SETTINGS,
    )
}

fn document() -> String {
    format!(
        concat!(
            "{header}<w:document xmlns:w=\"{w}\" xmlns:r=\"{r}\"><w:body>",
            "<w:sectPr><w:pgSz w:w=\"11906\" w:h=\"16838\"/>",
            "<w:pgMar w:top=\"1701\" w:right=\"1134\" w:bottom=\"1701\" w:left=\"1134\" ",
            "w:header=\"708\" w:footer=\"708\" w:gutter=\"0\"/></w:sectPr>",
            "</w:body></w:document>"
        ),
        header = XML_HEADER,
        w = W_NS,
        r = R_NS,
    )
}

fn settings() -> String {
    format!(
        concat!(
            "{header}<w:settings xmlns:w=\"{w}\">",
            "<w:zoom w:percent=\"100\"/><w:defaultTabStop w:val=\"1304\"/>",
            "<w:characterSpacingControl w:val=\"doNotCompress\"/>",
            "<w:compat><w:compatSetting w:name=\"compatibilityMode\" ",
            "w:uri=\"http://schemas.microsoft.com/office/word\" w:val=\"15\"/></w:compat>",
            "</w:settings>"
        ),
        header = XML_HEADER,
        w = W_NS,
    )
}

fn paragraph_style(id: &str, name: &str, outline: Option<u8>, run_props: &str) -> String {
    let ppr = match outline {
        Some(level) => format!(
            "<w:pPr><w:keepNext/><w:spacing w:before=\"240\" w:after=\"60\"/><w:outlineLvl w:val=\"{}\"/></w:pPr>",
            level
        ),
        None => String::new(),
    };
    format!(
        concat!(
            "<w:style w:type=\"paragraph\" w:styleId=\"{id}\"><w:name w:val=\"{name}\"/>",
            "<w:basedOn w:val=\"Normal\"/><w:next w:val=\"Normal\"/><w:qFormat/>",
            "{ppr}<w:rPr>{rpr}</w:rPr></w:style>"
        ),
        id = id,
        name = name,
        ppr = ppr,
        rpr = run_props,
    )
}

fn styles() -> String {
    let mut body = String::new();
    body.push_str(concat!(
        "<w:docDefaults><w:rPrDefault><w:rPr>",
        "<w:rFonts w:ascii=\"Calibri\" w:hAnsi=\"Calibri\" w:cs=\"Calibri\"/>",
        "<w:sz w:val=\"22\"/><w:lang w:val=\"da-DK\"/></w:rPr></w:rPrDefault>",
        "<w:pPrDefault><w:pPr><w:spacing w:after=\"160\" w:line=\"259\" w:lineRule=\"auto\"/></w:pPr></w:pPrDefault>",
        "</w:docDefaults>",
        "<w:style w:type=\"paragraph\" w:default=\"1\" w:styleId=\"Normal\"><w:name w:val=\"Normal\"/><w:qFormat/></w:style>",
        "<w:style w:type=\"character\" w:default=\"1\" w:styleId=\"DefaultParagraphFont\">",
        "<w:name w:val=\"Default Paragraph Font\"/><w:uiPriority w:val=\"1\"/><w:semiHidden/></w:style>",
    ));
    body.push_str(&paragraph_style("Title", "Title", None, "<w:b/><w:sz w:val=\"48\"/>"));
    for level in 1..=6u8 {
        let size = 36u8.saturating_sub(level * 4).max(22);
        body.push_str(&paragraph_style(
            &format!("Heading{}", level),
            &format!("heading {}", level),
            Some(level - 1),
            &format!("<w:b/><w:sz w:val=\"{}\"/>", size),
        ));
    }
    body.push_str(&paragraph_style("BodyText", "Body Text", None, ""));
    for level in 1..=3u8 {
        body.push_str(&format!(
            concat!(
                "<w:style w:type=\"paragraph\" w:styleId=\"TOC{level}\"><w:name w:val=\"toc {level}\"/>",
                "<w:basedOn w:val=\"Normal\"/><w:next w:val=\"Normal\"/><w:uiPriority w:val=\"39\"/>",
                "<w:pPr><w:spacing w:after=\"100\"/><w:ind w:left=\"{indent}\"/></w:pPr></w:style>"
            ),
            level = level,
            indent = (level as u32 - 1) * 220,
        ));
    }
    body.push_str(concat!(
        "<w:style w:type=\"paragraph\" w:styleId=\"TOCHeading\"><w:name w:val=\"TOC Heading\"/>",
        "<w:basedOn w:val=\"Heading1\"/><w:next w:val=\"Normal\"/><w:uiPriority w:val=\"39\"/></w:style>",
        "<w:style w:type=\"paragraph\" w:styleId=\"CommentText\"><w:name w:val=\"annotation text\"/>",
        "<w:basedOn w:val=\"Normal\"/><w:rPr><w:sz w:val=\"20\"/></w:rPr></w:style>",
        "<w:style w:type=\"character\" w:styleId=\"CommentReference\"><w:name w:val=\"annotation reference\"/>",
        "<w:basedOn w:val=\"DefaultParagraphFont\"/><w:rPr><w:sz w:val=\"16\"/></w:rPr></w:style>",
    ));

    format!(
        "{header}<w:styles xmlns:w=\"{w}\">{body}</w:styles>",
        header = XML_HEADER,
        w = W_NS,
        body = body,
    )
}

/// A minimal, valid `.docx` package: document, styles and settings.
pub fn blank_package() -> Package {
    let mut package = Package::new();
    package.set_part(CONTENT_TYPES_PART, content_types().into_bytes());
    package.set_part(PACKAGE_RELS_PART, package_rels().into_bytes());
    package.set_part("word/document.xml", document().into_bytes());
    package.set_part("word/_rels/document.xml.rels", document_rels().into_bytes());
    package.set_part("word/styles.xml", styles().into_bytes());
    package.set_part("word/settings.xml", settings().into_bytes());
    package
}
