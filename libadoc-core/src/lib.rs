//! # libadoc-core
//!
//! AsciiDoc front end built on the `libadoc-peg` interpreter.
//!
//! This crate provides the rule table for the markup, the document model it
//! builds, and the normalization that derives section anchors from titles.

pub mod anchor;
pub mod assembly;
pub mod ast;
pub mod error;
pub mod frontmatter;
pub mod grammar;
pub mod node;

pub use anchor::{anchor_id, normalize, AnchorVisitor, InlineVisitor};
pub use assembly::{filter_blocks, merge, stringify, to_inline_elements};
pub use ast::{
    AdmonitionKind, Attributes, BlockContent, DocElement, Document, DocumentHeader, InlineContent,
    InlineElement, List, ListItem, Paragraph, QuotedTextKind, Section, SectionTitle,
};
pub use error::{AdocError, Result};
pub use frontmatter::{FrontMatterDecoder, FrontMatterError, YamlFrontMatterDecoder};
pub use grammar::{asciidoc_grammar, asciidoc_grammar_with};
pub use libadoc_peg::{ParseOptions, ParseOutput, PegError};
pub use node::Node;

use libadoc_peg::{Grammar, Value};
use tracing::debug;

/// Parse a whole document starting at the `Document` rule.
pub fn parse_document(input: impl AsRef<[u8]>, options: &ParseOptions) -> Result<Document> {
    let output = parse_with(asciidoc_grammar(), "Document", input, options)?;
    debug!(
        expressions = output.stats.expressions,
        "parsed document"
    );
    match output.value {
        Value::Node(Node::Document(document)) => Ok(*document),
        other => Err(AdocError::UnexpectedRoot {
            expected: "document",
            found: node::describe(&other),
        }),
    }
}

/// Parse a run of inline markup, such as a title.
///
/// Trailing input the inline rules cannot consume is left unparsed.
pub fn parse_inline(input: impl AsRef<[u8]>, options: &ParseOptions) -> Result<InlineContent> {
    let output = parse_with(asciidoc_grammar(), "InlineContent", input, options)?;
    match output.value {
        Value::Node(Node::InlineContent(content)) => Ok(content),
        other => Err(AdocError::UnexpectedRoot {
            expected: "inline content",
            found: node::describe(&other),
        }),
    }
}

/// Run `grammar` from any rule and keep the raw output.
pub fn parse_with(
    grammar: &Grammar<Node>,
    entry: &str,
    input: impl AsRef<[u8]>,
    options: &ParseOptions,
) -> std::result::Result<ParseOutput<Node>, PegError> {
    libadoc_peg::parse(grammar, entry, input, options)
}
