//! The `word/comments.xml` part.

use super::paragraph::{Item, Paragraph};
use super::template::W_NS;
use super::xml::Element;
use crate::markdown::tokenize;

/// Reviewer comments of a document.
#[derive(Debug, Clone)]
pub struct Comments {
    root: Element,
    next_id: u32,
}

impl Comments {
    /// An empty comments part.
    pub fn new() -> Self {
        Self {
            root: Element::new("w:comments").with_attr("xmlns:w", W_NS),
            next_id: 0,
        }
    }

    /// Wrap an existing part; new ids continue after the highest one present.
    pub fn from_element(root: Element) -> Self {
        let next_id = root
            .elements()
            .filter(|e| e.is("w:comment"))
            .filter_map(|e| e.attr("w:id")?.parse::<u32>().ok())
            .max()
            .map(|max| max + 1)
            .unwrap_or(0);
        Self { root, next_id }
    }

    pub fn len(&self) -> usize {
        self.root.elements().filter(|e| e.is("w:comment")).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn element(&self) -> &Element {
        &self.root
    }

    /// Add a comment and return its id.
    ///
    /// Each line of `text` is tokenized for bold/italic and separated from
    /// the next by a line break, all inside one comment paragraph.
    pub fn add(&mut self, author: &str, initials: &str, date: &str, text: &str, styles: &CommentStyles) -> u32 {
        let id = self.next_id;
        self.next_id += 1;

        let mut body = Paragraph::new();
        if let Some(style) = &styles.paragraph {
            body.set_style(style.as_str());
        }
        body.push(Item::AnnotationRef {
            style: styles.reference.clone(),
        });
        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                body.add_break();
            }
            for run in tokenize(line) {
                body.push_run(run);
            }
        }

        let mut comment = Element::new("w:comment")
            .with_attr("w:id", id.to_string())
            .with_attr("w:author", author);
        if !date.is_empty() {
            comment.set_attr("w:date", date);
        }
        if !initials.is_empty() {
            comment.set_attr("w:initials", initials);
        }
        comment.push(body.to_element());
        self.root.push(comment);
        id
    }
}

impl Default for Comments {
    fn default() -> Self {
        Self::new()
    }
}

/// Style ids used inside comment bodies, when the document defines them.
#[derive(Debug, Clone, Default)]
pub struct CommentStyles {
    /// Paragraph style of the comment text (`annotation text`)
    pub paragraph: Option<String>,
    /// Character style of comment marks (`annotation reference`)
    pub reference: Option<String>,
}
