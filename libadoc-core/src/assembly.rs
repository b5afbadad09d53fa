//! Turning raw captures into document nodes.
//!
//! Captured values arrive as whatever the grammar matched: text, nested
//! lists from sequences and repetitions, `Absent` placeholders and nodes
//! built by inner rules. The helpers here normalize them.

use crate::ast::{DocElement, ElementAttribute, InlineContent, InlineElement};
use crate::node::{describe, Node};
use libadoc_peg::{ActionError, Value};
use tracing::debug;

/// Flatten `fragments` and join adjacent text.
///
/// Raw text and string elements are concatenated into a single string
/// element, nested lists and inline content are spliced in place, `Absent`
/// and empty text disappear. Any other node is kept as is and ends the
/// current text run. Merging an already merged sequence changes nothing.
pub fn merge(fragments: impl IntoIterator<Item = Value<Node>>) -> Vec<Node> {
    let mut merged = Vec::new();
    let mut buffer = String::new();
    for fragment in fragments {
        merge_into(fragment, &mut merged, &mut buffer);
    }
    flush(&mut merged, &mut buffer);
    merged
}

fn merge_into(fragment: Value<Node>, merged: &mut Vec<Node>, buffer: &mut String) {
    match fragment {
        Value::Absent => {}
        Value::Text(text) => buffer.push_str(&text),
        Value::List(items) => {
            for item in items {
                merge_into(item, merged, buffer);
            }
        }
        Value::Node(Node::Inline(InlineElement::StringElement { content })) => {
            buffer.push_str(&content)
        }
        Value::Node(Node::InlineContent(content)) => {
            for element in content.elements {
                merge_into(element.into(), merged, buffer);
            }
        }
        Value::Node(node) => {
            flush(merged, buffer);
            merged.push(node);
        }
    }
}

fn flush(merged: &mut Vec<Node>, buffer: &mut String) {
    if !buffer.is_empty() {
        merged.push(Node::Inline(InlineElement::text(std::mem::take(buffer))));
    }
}

/// Merge, then require every fragment to be an inline element.
pub fn to_inline_elements(
    fragments: impl IntoIterator<Item = Value<Node>>,
) -> Result<Vec<InlineElement>, ActionError> {
    merge(fragments)
        .into_iter()
        .map(|node| match node {
            Node::Inline(element) => Ok(element),
            other => Err(ActionError::new(format!(
                "unexpected element of type {} (expected an inline element instead)",
                other.describe()
            ))),
        })
        .collect()
}

/// Concatenate text-only fragments into a string.
pub fn stringify(fragments: impl IntoIterator<Item = Value<Node>>) -> Result<String, ActionError> {
    let mut out = String::new();
    for node in merge(fragments) {
        match node {
            Node::Inline(InlineElement::StringElement { content }) => out.push_str(&content),
            other => {
                return Err(ActionError::new(format!(
                    "cannot convert element of type {} to string content",
                    other.describe()
                )))
            }
        }
    }
    Ok(out)
}

/// Flatten block fragments, dropping blank lines and empty preambles.
pub fn filter_blocks(
    fragments: impl IntoIterator<Item = Value<Node>>,
) -> Result<Vec<DocElement>, ActionError> {
    let mut blocks = Vec::new();
    for fragment in fragments {
        filter_into(fragment, &mut blocks)?;
    }
    debug!(count = blocks.len(), "filtered blocks");
    Ok(blocks)
}

fn filter_into(fragment: Value<Node>, blocks: &mut Vec<DocElement>) -> Result<(), ActionError> {
    match fragment {
        Value::Absent => Ok(()),
        Value::List(items) => {
            for item in items {
                filter_into(item, blocks)?;
            }
            Ok(())
        }
        Value::Node(Node::Block(block)) => {
            match *block {
                DocElement::BlankLine => {}
                DocElement::Preamble(preamble) if preamble.elements.is_empty() => {}
                block => blocks.push(block),
            }
            Ok(())
        }
        other => Err(ActionError::new(format!(
            "unexpected element of type {} (expected a block element instead)",
            describe(&other)
        ))),
    }
}

/// Inline content nodes found anywhere in `fragments`, such as the lines
/// of a paragraph.
pub fn collect_lines(fragments: impl IntoIterator<Item = Value<Node>>) -> Vec<InlineContent> {
    let mut lines = Vec::new();
    for fragment in fragments {
        collect_nodes(fragment, &mut |node| {
            if let Node::InlineContent(content) = node {
                lines.push(content);
            }
        });
    }
    lines
}

/// Element attributes found anywhere in `fragments`.
pub fn collect_attributes(
    fragments: impl IntoIterator<Item = Value<Node>>,
) -> Vec<ElementAttribute> {
    let mut attributes = Vec::new();
    for fragment in fragments {
        collect_nodes(fragment, &mut |node| {
            if let Node::Attribute(attribute) = node {
                attributes.push(attribute);
            }
        });
    }
    attributes
}

fn collect_nodes(fragment: Value<Node>, visit: &mut impl FnMut(Node)) {
    match fragment {
        Value::List(items) => {
            for item in items {
                collect_nodes(item, visit);
            }
        }
        Value::Node(node) => visit(node),
        Value::Absent | Value::Text(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Paragraph, Preamble, QuotedTextKind};
    use proptest::prelude::*;

    fn bold(text: &str) -> Node {
        Node::Inline(InlineElement::QuotedText {
            kind: QuotedTextKind::Bold,
            elements: vec![InlineElement::text(text)],
        })
    }

    #[test]
    fn test_merge_joins_text_and_flattens() {
        let fragments: Vec<Value<Node>> = vec![
            Value::from("a"),
            Value::List(vec![Value::Absent, Value::from("b"), Value::List(vec![Value::from("c")])]),
            Value::Node(bold("x")),
            InlineElement::text("d").into(),
            Value::from(""),
            Value::from("e"),
        ];
        assert_eq!(
            merge(fragments),
            vec![
                Node::Inline(InlineElement::text("abc")),
                bold("x"),
                Node::Inline(InlineElement::text("de")),
            ]
        );
    }

    #[test]
    fn test_merge_splices_inline_content() {
        let content = InlineContent::new(vec![InlineElement::text("b"), InlineElement::text("c")]);
        let merged = merge(vec![
            Value::from("a"),
            Value::Node(Node::InlineContent(content)),
        ]);
        assert_eq!(merged, vec![Node::Inline(InlineElement::text("abc"))]);
    }

    #[test]
    fn test_to_inline_elements_rejects_blocks() {
        let fragments: Vec<Value<Node>> =
            vec![Value::from("a"), DocElement::TableOfContentsMacro.into()];
        let err = to_inline_elements(fragments).unwrap_err();
        assert_eq!(
            err.message(),
            "unexpected element of type table of contents macro (expected an inline element instead)"
        );
    }

    #[test]
    fn test_stringify() {
        let fragments: Vec<Value<Node>> = vec![
            Value::from("a"),
            Value::List(vec![Value::from("b")]),
            InlineElement::text("c").into(),
        ];
        let text = stringify(fragments).unwrap();
        assert_eq!(text, "abc");
        assert!(stringify(vec![Value::Node(bold("x"))]).is_err());
    }

    #[test]
    fn test_filter_blocks_drops_placeholders() {
        let paragraph = DocElement::Paragraph(Paragraph {
            attributes: Default::default(),
            admonition: None,
            lines: vec![InlineContent::new(vec![InlineElement::text("p")])],
        });
        let fragments: Vec<Value<Node>> = vec![
            DocElement::Preamble(Preamble { elements: vec![] }).into(),
            DocElement::BlankLine.into(),
            Value::List(vec![paragraph.clone().into(), Value::Absent]),
            DocElement::BlankLine.into(),
        ];
        let blocks = filter_blocks(fragments).unwrap();
        assert_eq!(blocks, vec![paragraph]);
        assert!(filter_blocks(vec![Value::<Node>::from("stray")]).is_err());
    }

    fn fragment_strategy() -> impl Strategy<Value = Value<Node>> {
        let leaf = prop_oneof![
            Just(Value::Absent),
            "[a-c ]{0,3}".prop_map(Value::Text),
            "[a-c]{0,2}".prop_map(|text| InlineElement::text(text).into()),
            "[a-c]{1,2}".prop_map(|text| Value::Node(bold(&text))),
        ];
        leaf.prop_recursive(3, 20, 4, |inner| {
            prop::collection::vec(inner, 0..4).prop_map(Value::List)
        })
    }

    proptest! {
        #[test]
        fn merge_is_idempotent(fragments in prop::collection::vec(fragment_strategy(), 0..6)) {
            let once = merge(fragments);
            let twice = merge(once.iter().cloned().map(Value::Node));
            prop_assert_eq!(twice, once);
        }

        #[test]
        fn merge_never_leaves_adjacent_text(fragments in prop::collection::vec(fragment_strategy(), 0..6)) {
            let merged = merge(fragments);
            for pair in merged.windows(2) {
                let both_text = pair.iter().all(|node| {
                    matches!(node, Node::Inline(InlineElement::StringElement { .. }))
                });
                prop_assert!(!both_text);
            }
        }
    }
}
