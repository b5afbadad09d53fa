//! Document structure: front matter, header, attribute declarations and
//! the section hierarchy.

use super::{
    attributes_of, bind, inline_content_of, node, optional_text_of, pass, text_of, unexpected,
    ws0, ws1, Built, Ctx, Expr,
};
use crate::anchor::anchor_id;
use crate::assembly::filter_blocks;
use crate::ast::{
    AttributeDeclaration, DocElement, Document, DocumentAuthor, DocumentHeader, DocumentRevision,
    ElementAttribute, FrontMatter, InlineElement, Preamble, Section, SectionTitle,
};
use crate::frontmatter::FrontMatterDecoder;
use crate::node::Node;
use libadoc_peg::dsl::*;
use libadoc_peg::{ActionError, Grammar, Value};
use std::sync::Arc;

/// Deepest section level, written `======`.
pub(crate) const MAX_SECTION_LEVEL: usize = 5;

pub(super) fn add_rules(g: &mut Grammar<Node>, decoder: Arc<dyn FrontMatterDecoder>) {
    g.add_rule(
        "Document",
        action(
            seq([
                label("frontMatter", opt(rule("FrontMatter"))),
                label("documentHeader", opt(rule("DocumentHeader"))),
                bind("blocks", "DocumentBlocks"),
                rule("EOF"),
            ]),
            document,
        ),
    );
    g.add_rule(
        "DocumentBlocks",
        choice([
            label(
                "content",
                seq([rule("Preamble"), plus(rule("Section"))]),
            ),
            label("content", star(rule("BlockElement"))),
        ]),
    );
    g.add_rule(
        "Preamble",
        action(label("elements", star(rule("BlockElement"))), |ctx| {
            let elements = filter_blocks([ctx.capture("elements")])?;
            node(Node::block(DocElement::Preamble(Preamble { elements })))
        }),
    );

    add_front_matter(g, decoder);
    add_header(g);
    add_attributes(g);
    add_sections(g);
}

fn document(ctx: &mut Ctx<'_>) -> Built {
    let front_matter = match ctx.capture("frontMatter") {
        Value::Node(Node::FrontMatter(front_matter)) => Some(*front_matter),
        Value::Absent => None,
        other => return Err(unexpected("front matter", &other)),
    };
    let header = match ctx.capture("documentHeader") {
        Value::Node(Node::Header(header)) => Some(*header),
        Value::Absent => None,
        other => return Err(unexpected("document header", &other)),
    };
    let elements = filter_blocks([ctx.capture("blocks")])?;
    node(Node::document(Document {
        front_matter,
        header,
        elements,
    }))
}

fn add_front_matter(g: &mut Grammar<Node>, decoder: Arc<dyn FrontMatterDecoder>) {
    g.add_rule("FrontMatter", rule("YamlFrontMatter"));
    g.add_rule(
        "YamlFrontMatter",
        action(
            seq([
                rule("YamlFrontMatterToken"),
                bind("content", "YamlFrontMatterContent"),
                rule("YamlFrontMatterToken"),
            ]),
            move |ctx| {
                let raw = text_of(ctx, "content")?;
                let attributes = decoder
                    .decode(&raw)
                    .map_err(|err| ActionError::new(err.to_string()))?;
                node(Node::front_matter(FrontMatter { raw, attributes }))
            },
        ),
    );
    g.add_rule("YamlFrontMatterToken", seq([lit("---"), rule("EOL")]));
    g.add_rule(
        "YamlFrontMatterContent",
        text(star(seq([not(rule("YamlFrontMatterToken")), any()]))),
    );
}

fn add_header(g: &mut Grammar<Node>) {
    g.add_rule(
        "DocumentHeader",
        action(
            seq([
                bind("header", "DocumentTitle"),
                label("authors", opt(rule("DocumentAuthors"))),
                label("revision", opt(rule("DocumentRevision"))),
                label("otherAttributes", star(rule("DocumentAttributeDeclaration"))),
            ]),
            document_header,
        ),
    );
    g.add_rule("DocumentTitle", title_rule("=", false));
    g.add_rule(
        "DocumentAuthors",
        choice([
            rule("DocumentAuthorsInlineForm"),
            rule("DocumentAuthorsAttributeForm"),
        ]),
    );
    g.add_rule(
        "DocumentAuthorsInlineForm",
        action(
            seq([
                ws0(),
                not(lit(":")),
                label("authors", plus(rule("DocumentAuthor"))),
                rule("EOL"),
            ]),
            |ctx| {
                let authors = ctx
                    .capture("authors")
                    .into_list()
                    .into_iter()
                    .map(|value| match value {
                        Value::Node(Node::Author(author)) => Ok(author),
                        other => Err(unexpected("an author", &other)),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                node(Node::Authors(authors))
            },
        ),
    );
    g.add_rule(
        "DocumentAuthorsAttributeForm",
        action(
            seq([ws0(), lit(":author:"), bind("author", "DocumentAuthor")]),
            |ctx| match ctx.capture("author") {
                Value::Node(Node::Author(author)) => node(Node::Authors(vec![author])),
                other => Err(unexpected("an author", &other)),
            },
        ),
    );
    g.add_rule(
        "DocumentAuthor",
        action(
            seq([
                ws0(),
                bind("namePart1", "DocumentAuthorNamePart"),
                label("namePart2", opt(rule("DocumentAuthorNamePart"))),
                label("namePart3", opt(rule("DocumentAuthorNamePart"))),
                label("email", opt(rule("DocumentAuthorEmail"))),
                ws0(),
                opt(lit(";")),
                ws0(),
            ]),
            |ctx| {
                let mut parts = Vec::new();
                for part in ["namePart1", "namePart2", "namePart3"] {
                    parts.extend(optional_text_of(ctx, part)?);
                }
                let email = optional_text_of(ctx, "email")?;
                node(Node::Author(DocumentAuthor::new(
                    parts.iter().map(String::as_str),
                    email.as_deref(),
                )))
            },
        ),
    );
    g.add_rule(
        "DocumentAuthorNamePart",
        pass(
            seq([
                not(lit("<")),
                not(lit(";")),
                bind("part", "Characters"),
                ws0(),
            ]),
            "part",
        ),
    );
    g.add_rule(
        "DocumentAuthorEmail",
        pass(
            seq([
                lit("<"),
                label(
                    "email",
                    text(plus(seq([not(lit(">")), not(rule("EOL")), any()]))),
                ),
                lit(">"),
            ]),
            "email",
        ),
    );
    g.add_rule(
        "DocumentRevision",
        action(
            seq([
                ws0(),
                not(lit(":")),
                label("revnumber", opt(rule("DocumentRevisionNumber"))),
                opt(lit(",")),
                label("revdate", opt(rule("DocumentRevisionDate"))),
                opt(lit(":")),
                label("revremark", opt(rule("DocumentRevisionRemark"))),
                rule("EOL"),
            ]),
            |ctx| {
                let number = optional_text_of(ctx, "revnumber")?;
                let date = optional_text_of(ctx, "revdate")?;
                let remark = optional_text_of(ctx, "revremark")?;
                // A blank line also matches; it carries no revision.
                Ok(
                    DocumentRevision::new(number.as_deref(), date.as_deref(), remark.as_deref())
                        .map_or(Value::Absent, |revision| {
                            Value::Node(Node::Revision(revision))
                        }),
                )
            },
        ),
    );
    let revision_char = || {
        seq([
            not(rule("EOL")),
            not(lit(",")),
            not(lit(":")),
            any(),
        ])
    };
    g.add_rule(
        "DocumentRevisionNumber",
        text(choice([
            seq([lit_i("v"), rule("DIGIT"), star(revision_char())]),
            seq([
                opt(lit_i("v")),
                rule("DIGIT"),
                star(revision_char()),
                ws0(),
                and(lit(",")),
            ]),
        ])),
    );
    g.add_rule(
        "DocumentRevisionDate",
        text(star(seq([not(rule("EOL")), not(lit(":")), any()]))),
    );
    g.add_rule(
        "DocumentRevisionRemark",
        text(star(seq([not(rule("EOL")), any()]))),
    );
}

fn document_header(ctx: &mut Ctx<'_>) -> Built {
    let title = match ctx.capture("header") {
        Value::Node(Node::Title(title)) => *title,
        other => return Err(unexpected("a document title", &other)),
    };
    let authors = match ctx.capture("authors") {
        Value::Node(Node::Authors(authors)) => authors,
        Value::Absent => Vec::new(),
        other => return Err(unexpected("authors", &other)),
    };
    let revision = match ctx.capture("revision") {
        Value::Node(Node::Revision(revision)) => Some(revision),
        Value::Absent => None,
        other => return Err(unexpected("a revision", &other)),
    };
    let attributes = filter_blocks([ctx.capture("otherAttributes")])?
        .into_iter()
        .filter_map(|block| match block {
            DocElement::DocumentAttributeDeclaration(declaration) => Some(declaration),
            _ => None,
        })
        .collect();
    node(Node::header(DocumentHeader {
        title,
        authors,
        revision,
        attributes,
    }))
}

fn add_attributes(g: &mut Grammar<Node>) {
    g.add_rule(
        "DocumentAttributeDeclaration",
        choice([
            rule("DocumentAttributeDeclarationWithNameOnly"),
            rule("DocumentAttributeDeclarationWithNameAndValue"),
        ]),
    );
    g.add_rule(
        "DocumentAttributeDeclarationWithNameOnly",
        action(
            seq([
                lit(":"),
                bind("name", "AttributeName"),
                lit(":"),
                ws0(),
                rule("EOL"),
            ]),
            |ctx| declaration(ctx, None),
        ),
    );
    g.add_rule(
        "DocumentAttributeDeclarationWithNameAndValue",
        action(
            seq([
                lit(":"),
                bind("name", "AttributeName"),
                lit(":"),
                ws1(),
                label("value", text(star(seq([not(rule("NEWLINE")), any()])))),
                rule("EOL"),
            ]),
            |ctx| {
                let value = text_of(ctx, "value")?;
                declaration(ctx, Some(value.trim_end().to_string()))
            },
        ),
    );
    g.add_rule(
        "DocumentAttributeReset",
        choice([
            rule("DocumentAttributeResetWithSectionTitleBangSymbol"),
            rule("DocumentAttributeResetWithTrailingBangSymbol"),
        ]),
    );
    g.add_rule(
        "DocumentAttributeResetWithSectionTitleBangSymbol",
        action(
            seq([
                lit(":!"),
                bind("name", "AttributeName"),
                lit(":"),
                ws0(),
                rule("EOL"),
            ]),
            reset,
        ),
    );
    g.add_rule(
        "DocumentAttributeResetWithTrailingBangSymbol",
        action(
            seq([
                lit(":"),
                bind("name", "AttributeName"),
                lit("!:"),
                ws0(),
                rule("EOL"),
            ]),
            reset,
        ),
    );
    g.add_rule(
        "DocumentAttributeSubstitution",
        action(
            seq([lit("{"), bind("name", "AttributeName"), lit("}")]),
            |ctx| {
                let name = text_of(ctx, "name")?;
                node(Node::Inline(InlineElement::DocumentAttributeSubstitution {
                    name,
                }))
            },
        ),
    );
    let name_char = |first: &str| {
        choice([
            class("", &[('A', 'Z')]),
            class("", &[('a', 'z')]),
            class("", &[('0', '9')]),
            lit(first),
        ])
    };
    g.add_rule(
        "AttributeName",
        text(seq([name_char("_"), star(name_char("-"))])),
    );
}

fn declaration(ctx: &Ctx<'_>, value: Option<String>) -> Built {
    let name = text_of(ctx, "name")?;
    node(Node::block(DocElement::DocumentAttributeDeclaration(
        AttributeDeclaration { name, value },
    )))
}

fn reset(ctx: &mut Ctx<'_>) -> Built {
    let name = text_of(ctx, "name")?;
    node(Node::block(DocElement::DocumentAttributeReset { name }))
}

fn add_sections(g: &mut Grammar<Node>) {
    g.add_rule(
        "Section",
        choice((1..=MAX_SECTION_LEVEL).map(|level| rule(&format!("Section{level}")))),
    );
    for level in 1..=MAX_SECTION_LEVEL {
        g.add_rule(
            format!("Section{level}"),
            action(
                seq([
                    bind("header", &format!("Section{level}Title")),
                    label("elements", star(rule(&format!("Section{level}Block")))),
                ]),
                move |ctx| section(ctx, level),
            ),
        );

        // A block ends the section once a sibling or ancestor title starts.
        let mut block: Vec<Expr> = (1..=level)
            .map(|outer| not(rule(&format!("Section{outer}"))))
            .collect();
        let mut content: Vec<Expr> = (level + 1..=MAX_SECTION_LEVEL)
            .map(|inner| rule(&format!("Section{inner}")))
            .collect();
        content.push(rule("BlockElement"));
        block.push(label("content", choice(content)));
        g.add_rule(format!("Section{level}Block"), pass(seq(block), "content"));

        g.add_rule(
            format!("Section{level}Title"),
            title_rule(&"=".repeat(level + 1), true),
        );
    }
    g.add_rule(
        "SectionTitle",
        choice((1..=MAX_SECTION_LEVEL).map(|level| rule(&format!("Section{level}Title")))),
    );
}

/// `attributes* marker WS+ content WS* [[id]]? EOL`; section titles also
/// swallow one blank line after them.
fn title_rule(marker: &str, section: bool) -> Expr {
    let mut parts = vec![
        label("attributes", star(rule("ElementAttribute"))),
        label("level", lit(marker)),
        ws1(),
        bind("content", "InlineContent"),
        ws0(),
        label("id", opt(rule("InlineElementID"))),
    ];
    // The two outermost section levels tolerate spaces after the ID.
    if section && marker.len() <= 3 {
        parts.push(ws0());
    }
    parts.push(rule("EOL"));
    if section {
        parts.push(choice([opt(rule("BlankLine")), rule("EOF")]));
    }
    action(seq(parts), section_title)
}

fn section_title(ctx: &mut Ctx<'_>) -> Built {
    let content = inline_content_of(ctx, "content")?;
    let attributes = attributes_of(ctx, "attributes");
    let explicit = match ctx.capture("id") {
        Value::Node(Node::Attribute(ElementAttribute::Id(id))) => Some(id),
        _ => None,
    };
    let id = explicit
        .or_else(|| attributes.id.clone())
        .unwrap_or_else(|| anchor_id(&content));
    node(Node::title(SectionTitle {
        id,
        attributes,
        content,
    }))
}

fn section(ctx: &mut Ctx<'_>, level: usize) -> Built {
    let title = match ctx.capture("header") {
        Value::Node(Node::Title(title)) => *title,
        other => return Err(unexpected("a section title", &other)),
    };
    let elements = filter_blocks([ctx.capture("elements")])?;
    for element in &elements {
        if let DocElement::Section(child) = element {
            if child.level != level + 1 {
                return Err(ActionError::new(format!(
                    "section of level {} cannot be nested in a section of level {level}",
                    child.level
                )));
            }
        }
    }
    node(Node::block(DocElement::Section(Section {
        level,
        title,
        elements,
    })))
}
