//! The document model.
//!
//! Nodes are built bottom-up by the grammar's semantic actions and are never
//! mutated afterwards. Everything serializes to JSON for tooling.

use serde::Serialize;
use std::fmt;
use std::path::Path;

/// Root of a parsed document.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Document {
    pub front_matter: Option<FrontMatter>,
    pub header: Option<DocumentHeader>,
    pub elements: Vec<DocElement>,
}

impl Document {
    /// Every section in document order, nested ones included.
    pub fn sections(&self) -> Vec<&Section> {
        let mut found = Vec::new();
        collect_sections(&self.elements, &mut found);
        found
    }
}

fn collect_sections<'a>(elements: &'a [DocElement], found: &mut Vec<&'a Section>) {
    for element in elements {
        match element {
            DocElement::Section(section) => {
                found.push(section);
                collect_sections(&section.elements, found);
            }
            DocElement::Preamble(preamble) => collect_sections(&preamble.elements, found),
            _ => {}
        }
    }
}

/// Raw front matter together with its decoded attributes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrontMatter {
    pub raw: String,
    pub attributes: serde_yaml::Mapping,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentHeader {
    pub title: SectionTitle,
    pub authors: Vec<DocumentAuthor>,
    pub revision: Option<DocumentRevision>,
    pub attributes: Vec<AttributeDeclaration>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentAuthor {
    pub full_name: String,
    pub email: Option<String>,
}

impl DocumentAuthor {
    /// Join the non-empty name parts with single spaces.
    pub fn new<'a>(parts: impl IntoIterator<Item = &'a str>, email: Option<&str>) -> Self {
        let full_name = parts
            .into_iter()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        DocumentAuthor {
            full_name,
            email: non_empty(email),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentRevision {
    pub number: Option<String>,
    pub date: Option<String>,
    pub remark: Option<String>,
}

impl DocumentRevision {
    /// Returns `None` when all three parts are blank.
    pub fn new(number: Option<&str>, date: Option<&str>, remark: Option<&str>) -> Option<Self> {
        let number = number.map(|n| {
            let n = n.trim();
            n.strip_prefix(['v', 'V']).unwrap_or(n).trim()
        });
        let revision = DocumentRevision {
            number: non_empty(number),
            date: non_empty(date),
            remark: non_empty(remark),
        };
        if revision.number.is_none() && revision.date.is_none() && revision.remark.is_none() {
            return None;
        }
        Some(revision)
    }
}

fn non_empty(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// `:name: value`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeDeclaration {
    pub name: String,
    pub value: Option<String>,
}

/// Block-level element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocElement {
    Preamble(Preamble),
    Section(Section),
    Paragraph(Paragraph),
    List(List),
    DelimitedBlock(DelimitedBlock),
    LiteralBlock { content: String },
    BlockImage(BlockImage),
    TableOfContentsMacro,
    DocumentAttributeDeclaration(AttributeDeclaration),
    DocumentAttributeReset { name: String },
    /// Vertical whitespace; removed before the tree is handed out.
    BlankLine,
}

impl DocElement {
    pub fn kind(&self) -> &'static str {
        match self {
            DocElement::Preamble(_) => "preamble",
            DocElement::Section(_) => "section",
            DocElement::Paragraph(_) => "paragraph",
            DocElement::List(_) => "list",
            DocElement::DelimitedBlock(_) => "delimited block",
            DocElement::LiteralBlock { .. } => "literal block",
            DocElement::BlockImage(_) => "block image",
            DocElement::TableOfContentsMacro => "table of contents macro",
            DocElement::DocumentAttributeDeclaration(_) => "attribute declaration",
            DocElement::DocumentAttributeReset { .. } => "attribute reset",
            DocElement::BlankLine => "blank line",
        }
    }
}

/// Blocks before the first section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Preamble {
    pub elements: Vec<DocElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    /// 1 for `==`, up to 5 for `======`
    pub level: usize,
    pub title: SectionTitle,
    pub elements: Vec<DocElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionTitle {
    /// Explicit ID when one was given, derived anchor otherwise
    pub id: String,
    pub attributes: Attributes,
    pub content: InlineContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paragraph {
    pub attributes: Attributes,
    pub admonition: Option<AdmonitionKind>,
    pub lines: Vec<InlineContent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdmonitionKind {
    Tip,
    Note,
    Important,
    Warning,
    Caution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListKind {
    Ordered,
    Unordered,
    Labeled,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct List {
    pub kind: ListKind,
    pub attributes: Attributes,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NumberingStyle {
    Arabic,
    LowerAlpha,
    UpperAlpha,
    LowerRoman,
    UpperRoman,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BulletStyle {
    Dash,
    OneAsterisk,
    TwoAsterisks,
    ThreeAsterisks,
    FourAsterisks,
    FiveAsterisks,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListItem {
    Ordered {
        level: usize,
        numbering: NumberingStyle,
        attributes: Attributes,
        elements: Vec<DocElement>,
    },
    Unordered {
        level: usize,
        bullet: BulletStyle,
        elements: Vec<DocElement>,
    },
    Labeled {
        term: String,
        elements: Vec<DocElement>,
    },
}

impl ListItem {
    pub fn kind(&self) -> ListKind {
        match self {
            ListItem::Ordered { .. } => ListKind::Ordered,
            ListItem::Unordered { .. } => ListKind::Unordered,
            ListItem::Labeled { .. } => ListKind::Labeled,
        }
    }

    /// Nesting depth given by the item marker.
    pub fn level(&self) -> usize {
        match self {
            ListItem::Ordered { level, .. } | ListItem::Unordered { level, .. } => *level,
            ListItem::Labeled { .. } => 1,
        }
    }

    pub fn elements(&self) -> &[DocElement] {
        match self {
            ListItem::Ordered { elements, .. }
            | ListItem::Unordered { elements, .. }
            | ListItem::Labeled { elements, .. } => elements,
        }
    }

    pub(crate) fn elements_mut(&mut self) -> &mut Vec<DocElement> {
        match self {
            ListItem::Ordered { elements, .. }
            | ListItem::Unordered { elements, .. }
            | ListItem::Labeled { elements, .. } => elements,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DelimitedBlockKind {
    Fenced,
    Listing,
    Example,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DelimitedBlock {
    pub kind: DelimitedBlockKind,
    pub attributes: Attributes,
    pub content: BlockContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockContent {
    Verbatim(String),
    Blocks(Vec<DocElement>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockImage {
    pub attributes: Attributes,
    pub image: ImageMacro,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageMacro {
    pub path: String,
    pub alt: String,
    pub width: Option<String>,
    pub height: Option<String>,
}

impl ImageMacro {
    /// Build from the macro target and its `alt,width,height` attribute text.
    ///
    /// An empty alt text falls back to the file stem of `path`.
    pub fn new(path: &str, attributes: Option<&str>) -> Self {
        let mut parts = attributes
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .map(|part| (!part.is_empty()).then(|| part.to_string()));
        let alt = parts.next().flatten().unwrap_or_else(|| {
            Path::new(path)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        ImageMacro {
            path: path.to_string(),
            alt,
            width: parts.next().flatten(),
            height: parts.next().flatten(),
        }
    }
}

/// A `key` or `key=value` entry from an attribute group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenericAttribute {
    pub key: String,
    pub value: Option<String>,
}

/// One attribute line above a block, as written.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ElementAttribute {
    Id(String),
    Title(String),
    Group(Vec<GenericAttribute>),
    /// `[ ...]` with a leading space; kept for diagnostics only
    Invalid(String),
}

/// Element attributes folded into their effective values.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Attributes {
    pub id: Option<String>,
    pub title: Option<String>,
    pub options: Vec<GenericAttribute>,
}

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Later IDs and titles override earlier ones; options accumulate.
    pub fn fold<'a>(attributes: impl IntoIterator<Item = &'a ElementAttribute>) -> Self {
        let mut folded = Attributes::new();
        for attribute in attributes {
            folded.apply(attribute);
        }
        folded
    }

    pub fn apply(&mut self, attribute: &ElementAttribute) {
        match attribute {
            ElementAttribute::Id(id) => self.id = Some(id.clone()),
            ElementAttribute::Title(title) => self.title = Some(title.clone()),
            ElementAttribute::Group(options) => self.options.extend(options.iter().cloned()),
            ElementAttribute::Invalid(_) => {}
        }
    }

    pub fn merge(mut self, other: Attributes) -> Self {
        if other.id.is_some() {
            self.id = other.id;
        }
        if other.title.is_some() {
            self.title = other.title;
        }
        self.options.extend(other.options);
        self
    }

    pub fn option(&self, key: &str) -> Option<&GenericAttribute> {
        self.options.iter().rev().find(|option| option.key == key)
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.title.is_none() && self.options.is_empty()
    }
}

/// A run of inline elements, one line or one title.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct InlineContent {
    pub elements: Vec<InlineElement>,
}

impl InlineContent {
    pub fn new(elements: Vec<InlineElement>) -> Self {
        InlineContent { elements }
    }
}

impl fmt::Display for InlineContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in &self.elements {
            write!(f, "{element}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotedTextKind {
    Bold,
    Italic,
    Monospace,
}

impl QuotedTextKind {
    pub fn punctuation(self) -> &'static str {
        match self {
            QuotedTextKind::Bold => "*",
            QuotedTextKind::Italic => "_",
            QuotedTextKind::Monospace => "`",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassthroughKind {
    SinglePlus,
    TriplePlus,
    Macro,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InlineElement {
    StringElement {
        content: String,
    },
    QuotedText {
        kind: QuotedTextKind,
        elements: Vec<InlineElement>,
    },
    /// Quote punctuation preceded by backslashes; not emphasis.
    EscapedQuotedText {
        kind: QuotedTextKind,
        backslashes: String,
        punctuation: String,
        elements: Vec<InlineElement>,
    },
    Passthrough {
        kind: PassthroughKind,
        elements: Vec<InlineElement>,
    },
    CrossReference {
        id: String,
    },
    Link {
        url: String,
        text: Option<String>,
    },
    InlineImage(ImageMacro),
    DocumentAttributeSubstitution {
        name: String,
    },
}

impl InlineElement {
    pub fn text(content: impl Into<String>) -> Self {
        InlineElement::StringElement {
            content: content.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            InlineElement::StringElement { .. } => "string",
            InlineElement::QuotedText { .. } => "quoted text",
            InlineElement::EscapedQuotedText { .. } => "escaped quoted text",
            InlineElement::Passthrough { .. } => "passthrough",
            InlineElement::CrossReference { .. } => "cross reference",
            InlineElement::Link { .. } => "link",
            InlineElement::InlineImage(_) => "inline image",
            InlineElement::DocumentAttributeSubstitution { .. } => "attribute substitution",
        }
    }
}

fn write_all(f: &mut fmt::Formatter<'_>, elements: &[InlineElement]) -> fmt::Result {
    for element in elements {
        write!(f, "{element}")?;
    }
    Ok(())
}

/// Plain-text rendering: markup around quoted text is dropped, escaped
/// quotes keep their backslashes.
impl fmt::Display for InlineElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InlineElement::StringElement { content } => write!(f, "{content}"),
            InlineElement::QuotedText { elements, .. }
            | InlineElement::Passthrough { elements, .. } => write_all(f, elements),
            InlineElement::EscapedQuotedText {
                backslashes,
                punctuation,
                elements,
                ..
            } => {
                write!(f, "{backslashes}{punctuation}")?;
                write_all(f, elements)?;
                write!(f, "{punctuation}")
            }
            InlineElement::CrossReference { id } => write!(f, "[{id}]"),
            InlineElement::Link { url, text } => write!(f, "{}", text.as_deref().unwrap_or(url)),
            InlineElement::InlineImage(image) => write!(f, "{}", image.alt),
            InlineElement::DocumentAttributeSubstitution { name } => write!(f, "{{{name}}}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_macro_defaults_alt_to_stem() {
        let image = ImageMacro::new("images/foo.png", None);
        assert_eq!(image.alt, "foo");
        assert_eq!(image.width, None);

        let image = ImageMacro::new("foo.png", Some("the foo , 600, 400"));
        assert_eq!(image.alt, "the foo");
        assert_eq!(image.width.as_deref(), Some("600"));
        assert_eq!(image.height.as_deref(), Some("400"));

        let image = ImageMacro::new("foo.png", Some(",600"));
        assert_eq!(image.alt, "foo");
        assert_eq!(image.width.as_deref(), Some("600"));
    }

    #[test]
    fn test_revision_strips_prefix() {
        let revision = DocumentRevision::new(Some(" v1.2 "), Some("2024-01-01 "), None).unwrap();
        assert_eq!(revision.number.as_deref(), Some("1.2"));
        assert_eq!(revision.date.as_deref(), Some("2024-01-01"));
        assert_eq!(revision.remark, None);
        assert!(DocumentRevision::new(Some(""), Some("  "), None).is_none());
    }

    #[test]
    fn test_author_joins_name_parts() {
        let author = DocumentAuthor::new(["Kismet ", "R. ", "Lee "], Some("kismet@example.com"));
        assert_eq!(author.full_name, "Kismet R. Lee");
        assert_eq!(author.email.as_deref(), Some("kismet@example.com"));
    }

    #[test]
    fn test_attributes_fold() {
        let folded = Attributes::fold(&[
            ElementAttribute::Id("a".to_string()),
            ElementAttribute::Group(vec![GenericAttribute {
                key: "source".to_string(),
                value: None,
            }]),
            ElementAttribute::Invalid("[ nope]".to_string()),
            ElementAttribute::Id("b".to_string()),
        ]);
        assert_eq!(folded.id.as_deref(), Some("b"));
        assert_eq!(folded.options.len(), 1);
        assert!(folded.option("source").is_some());
    }

    #[test]
    fn test_display_keeps_escaped_punctuation() {
        let content = InlineContent::new(vec![
            InlineElement::text("a "),
            InlineElement::QuotedText {
                kind: QuotedTextKind::Bold,
                elements: vec![InlineElement::text("b")],
            },
            InlineElement::text(" "),
            InlineElement::EscapedQuotedText {
                kind: QuotedTextKind::Bold,
                backslashes: "\\".to_string(),
                punctuation: "*".to_string(),
                elements: vec![InlineElement::text("c")],
            },
        ]);
        assert_eq!(content.to_string(), "a b \\*c*");
    }
}
