//! Markdown to Word assembly.
//!
//! [`DocxBuilder`] runs the whole pipeline: template block insertion,
//! comment stripping, CriticMarkup extraction, TOC rebuild and the
//! line-by-line paragraph writer.

mod options;

pub use options::BuildOptions;

use std::path::Path;

use crate::docx::{Paragraph, TocReplacement, WordDocument};
use crate::error::Result;
use crate::markdown::{
    classify_line, extract_critic_markup, insert_block_in_sections, normalize_newlines,
    prepare_comment, segments, split_lines, strip_html_comments, CriticBlock, InsertionBlock,
    LineKind, Segment,
};

/// What a build did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// Level-2 sections found in the Markdown
    pub sections: usize,
    /// Sections that received the template block
    pub inserted_blocks: usize,
    /// Paragraphs appended (headings and blank lines included)
    pub paragraphs: usize,
    /// Heading paragraphs among them
    pub headings: usize,
    /// Comments attached as Word comments
    pub comments: usize,
    /// Comments written inline instead
    pub inline_notes: usize,
    /// Whether a title paragraph was kept out of the TOC
    pub title_excluded: bool,
    /// TOC rebuild result, if the template had a TOC
    pub toc: Option<TocReplacement>,
}

/// Builds Word documents from Markdown on top of a template.
#[derive(Debug, Clone, Default)]
pub struct DocxBuilder {
    options: BuildOptions,
}

impl DocxBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Build `output` from `markdown` and the template at `template`.
    ///
    /// A missing template is created as a blank document first. The template
    /// block is only used when `template_block` points at an existing file.
    pub fn build_file(
        &self,
        markdown: &str,
        template: &Path,
        template_block: Option<&Path>,
        output: &Path,
    ) -> Result<BuildReport> {
        let block = match template_block {
            Some(path) if path.exists() => Some(std::fs::read_to_string(path)?),
            Some(path) => {
                log::debug!("template block {} not found, skipping insertion", path.display());
                None
            }
            None => None,
        };

        let mut doc = WordDocument::open_or_create(template)?;
        let report = self.build(&mut doc, markdown, block.as_deref())?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        doc.save(output)?;
        log::info!(
            "wrote {} ({} paragraphs, {} comments)",
            output.display(),
            report.paragraphs,
            report.comments
        );
        Ok(report)
    }

    /// Render `markdown` into `doc`.
    ///
    /// The document is edited in place; call [`WordDocument::save`] to write it.
    pub fn build(&self, doc: &mut WordDocument, markdown: &str, template_block: Option<&str>) -> Result<BuildReport> {
        let mut report = BuildReport::default();

        let mut markdown = normalize_newlines(markdown);
        if let Some(block) = template_block {
            let block = InsertionBlock::from_template(block);
            let insertion = insert_block_in_sections(&markdown, &block, &self.options.answered_markers);
            report.sections = insertion.sections;
            report.inserted_blocks = insertion.inserted;
            markdown = insertion.text;
        }

        let stripped = strip_html_comments(&markdown);
        let (sanitized, blocks) = extract_critic_markup(&stripped);
        log::debug!("extracted {} CriticMarkup spans", blocks.len());

        report.title_excluded = doc.exclude_title_from_toc(&self.options.title_prefix);
        report.toc = doc.replace_toc(&self.options.default_toc_instruction, &self.options.toc_placeholder);

        for line in split_lines(&sanitized) {
            let mut paragraph = Paragraph::new();
            match classify_line(line) {
                LineKind::Blank => {
                    doc.apply_style(&mut paragraph, &self.options.body_styles);
                }
                LineKind::Heading { level, text } => {
                    paragraph.set_outline_level(level.saturating_sub(1));
                    self.write_content(doc, &mut paragraph, text, &blocks, &mut report);
                    doc.apply_style(&mut paragraph, &self.options.heading_style_names(level));
                    report.headings += 1;
                }
                LineKind::Body(text) => {
                    self.write_content(doc, &mut paragraph, text, &blocks, &mut report);
                    doc.apply_style(&mut paragraph, &self.options.body_styles);
                }
            }
            doc.append_paragraph(&paragraph);
            report.paragraphs += 1;
        }

        if self.options.update_fields_on_open {
            doc.enable_update_fields_on_open()?;
        }
        Ok(report)
    }

    /// Write a line's text, resolving CriticMarkup placeholders into comments.
    fn write_content(
        &self,
        doc: &mut WordDocument,
        paragraph: &mut Paragraph,
        text: &str,
        blocks: &[CriticBlock],
        report: &mut BuildReport,
    ) {
        for segment in segments(text, blocks.len()) {
            match segment {
                Segment::Text(plain) => paragraph.push_formatted(plain),
                Segment::Critic(index) => {
                    let block = &blocks[index];
                    let start = paragraph.len();
                    paragraph.push_formatted(&block.highlight);
                    let comment = prepare_comment(&block.comment, &self.options.comment_label);
                    self.attach_comment(doc, paragraph, start, &comment, report);
                }
            }
        }
    }

    fn attach_comment(
        &self,
        doc: &mut WordDocument,
        paragraph: &mut Paragraph,
        start: usize,
        comment: &str,
        report: &mut BuildReport,
    ) {
        if self.options.attach_comments {
            match doc.add_comment(&self.options.comment_author, &self.options.comment_initials, comment) {
                Ok(id) => {
                    paragraph.wrap_comment(start, id, doc.comment_styles().reference);
                    report.comments += 1;
                    return;
                }
                Err(err) => log::debug!("writing comment inline, attach failed: {}", err),
            }
        }

        let mut lines = comment.split('\n');
        let first = lines.next().unwrap_or_default();
        paragraph.push_formatted(&format!(" {} {}", self.options.inline_note_prefix, first));
        for extra in lines {
            paragraph.add_break();
            paragraph.push_formatted(extra);
        }
        report.inline_notes += 1;
    }
}
