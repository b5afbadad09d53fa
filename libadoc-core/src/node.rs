//! Values produced by the grammar's semantic actions.

use crate::ast::{
    AdmonitionKind, BulletStyle, DocElement, Document, DocumentAuthor, DocumentHeader,
    DocumentRevision, ElementAttribute, FrontMatter, GenericAttribute, ImageMacro, InlineContent,
    InlineElement, ListItem, NumberingStyle, SectionTitle,
};
use libadoc_peg::Value;

/// Everything a rule can build. Most variants are intermediate: only
/// `Document`, `Block`, `Inline` and `InlineContent` survive into the tree.
///
/// Large payloads are boxed. Every interpreter frame holds a few values, so
/// the size of `Value<Node>` bounds how deep a document can nest.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Document(Box<Document>),
    FrontMatter(Box<FrontMatter>),
    Header(Box<DocumentHeader>),
    Author(DocumentAuthor),
    Authors(Vec<DocumentAuthor>),
    Revision(DocumentRevision),
    Title(Box<SectionTitle>),
    Block(Box<DocElement>),
    Inline(InlineElement),
    InlineContent(InlineContent),
    ListItem(Box<ListItem>),
    ListPrefix(ListPrefix),
    Attribute(ElementAttribute),
    GenericAttribute(GenericAttribute),
    Image(Box<ImageMacro>),
    Admonition(AdmonitionKind),
}

/// Marker of a list item before its content is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPrefix {
    Ordered {
        numbering: NumberingStyle,
        level: usize,
    },
    Unordered {
        bullet: BulletStyle,
        level: usize,
    },
}

impl Node {
    pub fn document(document: Document) -> Self {
        Node::Document(Box::new(document))
    }

    pub fn front_matter(front_matter: FrontMatter) -> Self {
        Node::FrontMatter(Box::new(front_matter))
    }

    pub fn header(header: DocumentHeader) -> Self {
        Node::Header(Box::new(header))
    }

    pub fn title(title: SectionTitle) -> Self {
        Node::Title(Box::new(title))
    }

    pub fn block(block: DocElement) -> Self {
        Node::Block(Box::new(block))
    }

    pub fn list_item(item: ListItem) -> Self {
        Node::ListItem(Box::new(item))
    }

    pub fn image(image: ImageMacro) -> Self {
        Node::Image(Box::new(image))
    }

    pub fn describe(&self) -> String {
        match self {
            Node::Document(_) => "document".to_string(),
            Node::FrontMatter(_) => "front matter".to_string(),
            Node::Header(_) => "document header".to_string(),
            Node::Author(_) => "author".to_string(),
            Node::Authors(_) => "authors".to_string(),
            Node::Revision(_) => "revision".to_string(),
            Node::Title(_) => "section title".to_string(),
            Node::Block(block) => block.kind().to_string(),
            Node::Inline(inline) => inline.kind().to_string(),
            Node::InlineContent(_) => "inline content".to_string(),
            Node::ListItem(_) => "list item".to_string(),
            Node::ListPrefix(_) => "list item prefix".to_string(),
            Node::Attribute(_) => "element attribute".to_string(),
            Node::GenericAttribute(_) => "generic attribute".to_string(),
            Node::Image(_) => "image macro".to_string(),
            Node::Admonition(_) => "admonition kind".to_string(),
        }
    }
}

impl From<DocElement> for Value<Node> {
    fn from(block: DocElement) -> Self {
        Value::Node(Node::block(block))
    }
}

impl From<InlineElement> for Value<Node> {
    fn from(inline: InlineElement) -> Self {
        Value::Node(Node::Inline(inline))
    }
}

/// Short description of any value, for error messages.
pub fn describe(value: &Value<Node>) -> String {
    match value {
        Value::Absent => "nothing".to_string(),
        Value::Text(_) => "text".to_string(),
        Value::List(_) => "list".to_string(),
        Value::Node(node) => node.describe(),
    }
}
