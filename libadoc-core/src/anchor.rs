//! Anchor identifiers derived from inline content.
//!
//! A single left-to-right walk over an already built [`InlineContent`]:
//! entering the content emits `_`, quoted text is framed by kind markers
//! such as `_strong_` and `_strong`, and plain text is normalized to
//! lowercase letters and digits separated by single underscores.

use crate::ast::{InlineContent, InlineElement, QuotedTextKind};
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

const SEPARATOR: char = '_';

static COMBINING_MARKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\p{Mn}").unwrap());
static SEPARATORS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\p{White_Space}\p{P}]").unwrap());

/// Callbacks for a walk over inline content.
pub trait InlineVisitor {
    fn visit_content(&mut self, _content: &InlineContent) {}

    fn visit_text(&mut self, _text: &str) {}

    fn enter_quoted(&mut self, _kind: QuotedTextKind) {}

    fn leave_quoted(&mut self, _kind: QuotedTextKind) {}

    /// Elements with nothing to descend into.
    fn visit_other(&mut self, _element: &InlineElement) {}
}

impl InlineContent {
    pub fn accept(&self, visitor: &mut impl InlineVisitor) {
        visitor.visit_content(self);
        for element in &self.elements {
            element.accept(visitor);
        }
    }
}

impl InlineElement {
    pub fn accept(&self, visitor: &mut impl InlineVisitor) {
        match self {
            InlineElement::StringElement { content } => visitor.visit_text(content),
            InlineElement::QuotedText { kind, elements } => {
                visitor.enter_quoted(*kind);
                for element in elements {
                    element.accept(visitor);
                }
                visitor.leave_quoted(*kind);
            }
            InlineElement::EscapedQuotedText { .. } => visitor.visit_text(&self.to_string()),
            InlineElement::Passthrough { elements, .. } => {
                for element in elements {
                    element.accept(visitor);
                }
            }
            other => visitor.visit_other(other),
        }
    }
}

/// Builds the anchor of a title.
#[derive(Debug, Default)]
pub struct AnchorVisitor {
    buffer: String,
}

impl AnchorVisitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_anchor(self) -> String {
        self.buffer
    }
}

impl InlineVisitor for AnchorVisitor {
    fn visit_content(&mut self, _content: &InlineContent) {
        self.buffer.push(SEPARATOR);
    }

    fn visit_text(&mut self, text: &str) {
        self.buffer.push_str(&normalize(text));
    }

    fn enter_quoted(&mut self, kind: QuotedTextKind) {
        self.buffer.push_str(match kind {
            QuotedTextKind::Bold => "_strong_",
            QuotedTextKind::Italic => "_italic_",
            QuotedTextKind::Monospace => "_monospace_",
        });
    }

    fn leave_quoted(&mut self, kind: QuotedTextKind) {
        self.buffer.push_str(match kind {
            QuotedTextKind::Bold => "_strong",
            QuotedTextKind::Italic => "_italic",
            QuotedTextKind::Monospace => "_monospace",
        });
    }
}

/// Anchor identifier for `content`, e.g. `"Section A"` becomes `"_section_a"`.
pub fn anchor_id(content: &InlineContent) -> String {
    let mut visitor = AnchorVisitor::new();
    content.accept(&mut visitor);
    visitor.into_anchor()
}

/// Lowercase, drop combining marks and symbols, and collapse whitespace
/// and punctuation runs into one separator.
///
/// Leading spaces are skipped and one trailing separator is dropped. Other
/// leading punctuation still yields a separator, so text that follows a
/// quoted span stays apart from it: `": intro"` becomes `"_intro"`.
pub fn normalize(text: &str) -> String {
    let mut out = String::new();
    let mut separated = false;
    for grapheme in text.trim_start_matches(' ').graphemes(true) {
        let base = COMBINING_MARKS.replace_all(grapheme, "");
        let Some(first) = base.chars().next() else {
            continue;
        };
        if first.is_alphanumeric() {
            out.extend(base.chars().flat_map(char::to_lowercase));
            separated = false;
        } else if SEPARATORS.is_match(&base) && !separated {
            out.push(SEPARATOR);
            separated = true;
        }
    }
    if out.ends_with(SEPARATOR) {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(elements: Vec<InlineElement>) -> InlineContent {
        InlineContent::new(elements)
    }

    fn quoted(kind: QuotedTextKind, text: &str) -> InlineElement {
        InlineElement::QuotedText {
            kind,
            elements: vec![InlineElement::text(text)],
        }
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Title"), "title");
        assert_eq!(normalize("  Hello,   World! "), "hello_world");
        assert_eq!(normalize("C++ Programming"), "c_programming");
        assert_eq!(normalize("a + b"), "a_b");
        assert_eq!(normalize("snake_case"), "snake_case");
        assert_eq!(normalize("Cafe\u{301} na\u{ef}ve"), "cafe_naïve");
        assert_eq!(normalize("!!!"), "");
        assert_eq!(normalize(": intro"), "_intro");
        assert_eq!(normalize("\tindented"), "_indented");
    }

    #[test]
    fn test_punctuation_after_quoted_text() {
        let title = content(vec![
            quoted(QuotedTextKind::Bold, "Bold"),
            InlineElement::text(": intro"),
        ]);
        assert_eq!(anchor_id(&title), "__strong_bold_strong_intro");
    }

    #[test]
    fn test_plain_title() {
        assert_eq!(anchor_id(&content(vec![InlineElement::text("Title")])), "_title");
        assert_eq!(
            anchor_id(&content(vec![InlineElement::text("Section A")])),
            "_section_a"
        );
    }

    #[test]
    fn test_quoted_markers() {
        let title = content(vec![
            InlineElement::text("a "),
            quoted(QuotedTextKind::Bold, "b"),
            InlineElement::text(" "),
            quoted(QuotedTextKind::Italic, "c"),
            InlineElement::text(" "),
            quoted(QuotedTextKind::Monospace, "d"),
        ]);
        insta::assert_snapshot!(anchor_id(&title), @"_a_strong_b_strong_italic_c_italic_monospace_d_monospace");
    }

    #[test]
    fn test_other_elements_are_skipped() {
        let title = content(vec![
            InlineElement::text("see "),
            InlineElement::CrossReference {
                id: "intro".to_string(),
            },
        ]);
        assert_eq!(anchor_id(&title), "_see");
    }

    #[test]
    fn test_escaped_text_is_plain() {
        let title = content(vec![InlineElement::EscapedQuotedText {
            kind: QuotedTextKind::Bold,
            backslashes: "\\".to_string(),
            punctuation: "*".to_string(),
            elements: vec![InlineElement::text("bold")],
        }]);
        assert_eq!(anchor_id(&title), "_bold");
    }
}
