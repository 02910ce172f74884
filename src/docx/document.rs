//! A Word document opened for editing.

use std::path::Path;

use super::comments::{CommentStyles, Comments};
use super::package::{
    Package, CT_COMMENTS, CT_SETTINGS, REL_COMMENTS, REL_SETTINGS, REL_STYLES,
};
use super::paragraph::{paragraph_text, Paragraph};
use super::styles::StyleSheet;
use super::template::{blank_package, W_NS};
use super::toc::{self, TocReplacement};
use super::xml::{Element, Node};
use crate::error::{Error, Result};

/// A `.docx` package with its main document part parsed.
///
/// Comments and settings are loaded on first use and written back by
/// [`WordDocument::save`].
#[derive(Debug, Clone)]
pub struct WordDocument {
    package: Package,
    document_part: String,
    document: Element,
    styles: StyleSheet,
    comments: Option<(String, Comments)>,
    settings: Option<(String, Element)>,
}

impl WordDocument {
    /// Open an existing `.docx` file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_package(Package::open(path)?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_package(Package::from_bytes(data)?)
    }

    /// A new document from the built-in blank template.
    pub fn blank() -> Result<Self> {
        Self::from_package(blank_package())
    }

    /// Open `path`, first writing a blank document there if it does not exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("template {} not found, creating a blank one", path.display());
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            blank_package().save(path)?;
        }
        Self::open(path)
    }

    pub fn from_package(package: Package) -> Result<Self> {
        let document_part = package.main_document_part()?;
        let document = package.xml_part(&document_part)?;
        if document.child("w:body").is_none() {
            return Err(Error::Xml {
                part: document_part,
                message: "document has no w:body".to_string(),
            });
        }

        let styles = match package.related_part(&document_part, REL_STYLES)? {
            Some(part) if package.contains(&part) => StyleSheet::from_element(&package.xml_part(&part)?),
            _ => {
                log::debug!("document has no styles part");
                StyleSheet::default()
            }
        };

        Ok(Self {
            package,
            document_part,
            document,
            styles,
            comments: None,
            settings: None,
        })
    }

    pub fn styles(&self) -> &StyleSheet {
        &self.styles
    }

    pub fn package(&self) -> &Package {
        &self.package
    }

    /// The `w:body` element.
    pub fn body(&self) -> &Element {
        // presence is checked when the document is loaded
        static EMPTY: Element = Element {
            name: String::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        };
        self.document.child("w:body").unwrap_or(&EMPTY)
    }

    pub fn body_mut(&mut self) -> &mut Element {
        self.document.ensure_child("w:body")
    }

    /// Direct paragraphs of the body, in order.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Element> {
        self.body().elements().filter(|e| e.is("w:p"))
    }

    /// Visible text of each body paragraph.
    pub fn paragraph_texts(&self) -> Vec<String> {
        self.paragraphs().map(paragraph_text).collect()
    }

    /// Append a paragraph at the end of the body, before its section properties.
    pub fn append_paragraph(&mut self, paragraph: &Paragraph) {
        let element = paragraph.to_element();
        let body = self.body_mut();
        let pos = match body.children.iter().rposition(|n| matches!(n, Node::Element(_))) {
            Some(i) if matches!(&body.children[i], Node::Element(e) if e.is("w:sectPr")) => i,
            _ => body.children.len(),
        };
        body.children.insert(pos, Node::Element(element));
    }

    /// Set the paragraph's style to the first of `names` the document defines.
    ///
    /// Returns `false` and leaves the paragraph alone when none exists.
    pub fn apply_style<S: AsRef<str>>(&self, paragraph: &mut Paragraph, names: &[S]) -> bool {
        match self.styles.first_paragraph_style(names) {
            Some(id) => {
                paragraph.set_style(id);
                true
            }
            None => {
                log::debug!(
                    "none of the styles {:?} exist",
                    names.iter().map(|n| n.as_ref()).collect::<Vec<_>>()
                );
                false
            }
        }
    }

    /// Style ids used for comment bodies and comment marks.
    pub fn comment_styles(&self) -> CommentStyles {
        CommentStyles {
            paragraph: self
                .styles
                .paragraph_style_id("annotation text")
                .map(str::to_string),
            reference: self
                .styles
                .character_style_id("annotation reference")
                .map(str::to_string),
        }
    }

    fn comments_mut(&mut self) -> Result<&mut Comments> {
        if self.comments.is_none() {
            let loaded = match self.package.related_part(&self.document_part, REL_COMMENTS)? {
                Some(part) if self.package.contains(&part) => {
                    let root = self.package.xml_part(&part)?;
                    (part, Comments::from_element(root))
                }
                _ => {
                    let target = "comments.xml";
                    self.package
                        .ensure_relationship(&self.document_part, REL_COMMENTS, target)?;
                    let part = super::package::resolve_target(&self.document_part, target);
                    self.package.ensure_override(&part, CT_COMMENTS)?;
                    (part, Comments::new())
                }
            };
            self.comments = Some(loaded);
        }
        match self.comments.as_mut() {
            Some((_, comments)) => Ok(comments),
            None => Err(Error::MissingPart("comments".to_string())),
        }
    }

    /// Add a comment to the comments part and return its id.
    ///
    /// The comments part, its relationship and content type are created on
    /// first use.
    pub fn add_comment(&mut self, author: &str, initials: &str, text: &str) -> Result<u32> {
        let styles = self.comment_styles();
        let date = comment_timestamp();
        let comments = self.comments_mut()?;
        Ok(comments.add(author, initials, &date, text, &styles))
    }

    /// Number of comments in the document.
    pub fn comment_count(&self) -> usize {
        if let Some((_, comments)) = &self.comments {
            return comments.len();
        }
        self.package
            .related_part(&self.document_part, REL_COMMENTS)
            .ok()
            .flatten()
            .and_then(|part| self.package.xml_part(&part).ok())
            .map(|root| Comments::from_element(root).len())
            .unwrap_or(0)
    }

    /// Keep the title paragraph out of the TOC. See [`toc::exclude_title`].
    pub fn exclude_title_from_toc(&mut self, prefix: &str) -> bool {
        let body = self.document.ensure_child("w:body");
        toc::exclude_title(body, prefix)
    }

    /// Rebuild the TOC field. See [`toc::replace_toc`].
    pub fn replace_toc(&mut self, default_instruction: &str, placeholder: &str) -> Option<TocReplacement> {
        let body = self.document.ensure_child("w:body");
        toc::replace_toc(body, &self.styles, default_instruction, placeholder)
    }

    fn settings_mut(&mut self) -> Result<&mut Element> {
        if self.settings.is_none() {
            let loaded = match self.package.related_part(&self.document_part, REL_SETTINGS)? {
                Some(part) if self.package.contains(&part) => {
                    let root = self.package.xml_part(&part)?;
                    (part, root)
                }
                _ => {
                    let target = "settings.xml";
                    self.package
                        .ensure_relationship(&self.document_part, REL_SETTINGS, target)?;
                    let part = super::package::resolve_target(&self.document_part, target);
                    self.package.ensure_override(&part, CT_SETTINGS)?;
                    (part, Element::new("w:settings").with_attr("xmlns:w", W_NS))
                }
            };
            self.settings = Some(loaded);
        }
        match self.settings.as_mut() {
            Some((_, settings)) => Ok(settings),
            None => Err(Error::MissingPart("settings".to_string())),
        }
    }

    /// Make Word refresh fields (and so the TOC) when the file is opened.
    pub fn enable_update_fields_on_open(&mut self) -> Result<()> {
        toc::enable_update_fields(self.settings_mut()?);
        Ok(())
    }

    fn flush(&mut self) {
        self.package.set_xml_part(&self.document_part, &self.document);
        if let Some((part, comments)) = &self.comments {
            self.package.set_xml_part(part, comments.element());
        }
        if let Some((part, settings)) = &self.settings {
            self.package.set_xml_part(part, settings);
        }
    }

    /// Serialize the edited document into `.docx` bytes.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        self.flush();
        self.package.to_bytes()
    }

    /// Save the edited document to `path`.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.flush();
        self.package.save(path)
    }
}

fn comment_timestamp() -> String {
    chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
