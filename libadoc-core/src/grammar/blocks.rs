//! Block elements: lists, paragraphs, admonitions, delimited and literal
//! blocks, block images and element attribute lines.

use super::{
    attributes_of, bind, char_except, node, pass, text_of, unexpected, ws0, ws1, Built, Ctx,
    Expr,
};
use crate::assembly::{collect_lines, filter_blocks};
use crate::ast::{
    AdmonitionKind, BlockContent, BlockImage, BulletStyle, DelimitedBlock, DelimitedBlockKind,
    DocElement, ElementAttribute, GenericAttribute, ImageMacro, List, ListItem, NumberingStyle,
    Paragraph,
};
use crate::node::{ListPrefix, Node};
use libadoc_peg::dsl::*;
use libadoc_peg::{ActionError, Grammar, Value};
use tracing::debug;

pub(super) fn add_rules(g: &mut Grammar<Node>) {
    g.add_rule(
        "BlockElement",
        choice([
            rule("DocumentAttributeDeclaration"),
            rule("DocumentAttributeReset"),
            rule("TableOfContentsMacro"),
            rule("BlockImage"),
            rule("List"),
            rule("LiteralBlock"),
            rule("DelimitedBlock"),
            rule("Admonition"),
            rule("Paragraph"),
            // A dangling attribute line attaches to nothing.
            action(seq([rule("ElementAttribute"), rule("EOL")]), |_| {
                Ok(DocElement::BlankLine.into())
            }),
            rule("BlankLine"),
        ]),
    );
    g.add_rule(
        "TableOfContentsMacro",
        action(seq([lit("toc::[]"), rule("NEWLINE")]), |_| {
            Ok(DocElement::TableOfContentsMacro.into())
        }),
    );
    g.add_rule(
        "BlankLine",
        action(seq([not(rule("EOF")), ws0(), rule("EOL")]), |_| {
            Ok(DocElement::BlankLine.into())
        }),
    );

    add_lists(g);
    add_paragraphs(g);
    add_images(g);
    add_delimited_blocks(g);
    add_literal_blocks(g);
    add_element_attributes(g);
}

fn add_lists(g: &mut Grammar<Node>) {
    g.add_rule(
        "List",
        action(
            seq([
                label("attributes", star(rule("ListAttribute"))),
                bind("elements", "ListItems"),
            ]),
            |ctx| {
                let attributes = attributes_of(ctx, "attributes");
                let items = ctx
                    .capture("elements")
                    .into_list()
                    .into_iter()
                    .map(|value| match value {
                        Value::Node(Node::ListItem(item)) => Ok(*item),
                        other => Err(unexpected("a list item", &other)),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                let mut list = nest_items(items)?;
                list.attributes = attributes;
                node(Node::block(DocElement::List(list)))
            },
        ),
    );
    g.add_rule(
        "ListItems",
        plus(choice([
            rule("OrderedListItem"),
            rule("UnorderedListItem"),
            rule("LabeledListItem"),
        ])),
    );
    g.add_rule(
        "ListAttribute",
        pass(
            seq([
                label(
                    "attribute",
                    choice([rule("HorizontalLayout"), rule("ListID")]),
                ),
                rule("NEWLINE"),
            ]),
            "attribute",
        ),
    );
    g.add_rule(
        "ListID",
        action(seq([lit("[#"), bind("id", "ID"), lit("]")]), |ctx| {
            let id = text_of(ctx, "id")?;
            node(Node::Attribute(ElementAttribute::Id(id)))
        }),
    );
    g.add_rule(
        "HorizontalLayout",
        action(lit("[horizontal]"), |_| {
            node(Node::Attribute(ElementAttribute::Group(vec![
                GenericAttribute {
                    key: "layout".to_string(),
                    value: Some("horizontal".to_string()),
                },
            ])))
        }),
    );
    g.add_rule(
        "ListParagraph",
        action(
            label(
                "lines",
                plus(seq([
                    not(rule("OrderedListItemPrefix")),
                    not(rule("UnorderedListItemPrefix")),
                    not(seq([
                        rule("LabeledListItemTerm"),
                        rule("LabeledListItemSeparator"),
                    ])),
                    not(rule("ListItemContinuation")),
                    not(rule("ElementAttribute")),
                    rule("InlineContentWithTrailingSpaces"),
                    rule("EOL"),
                ])),
            ),
            |ctx| {
                let lines = collect_lines([ctx.capture("lines")]);
                node(Node::block(DocElement::Paragraph(Paragraph {
                    attributes: Default::default(),
                    admonition: None,
                    lines,
                })))
            },
        ),
    );
    g.add_rule(
        "ListItemContinuation",
        seq([lit("+"), ws0(), rule("EOL")]),
    );
    g.add_rule(
        "ContinuedBlockElement",
        pass(
            seq([rule("ListItemContinuation"), bind("element", "BlockElement")]),
            "element",
        ),
    );

    g.add_rule(
        "OrderedListItem",
        action(
            seq([
                label("attributes", star(rule("ElementAttribute"))),
                bind("prefix", "OrderedListItemPrefix"),
                bind("content", "OrderedListItemContent"),
                opt(rule("BlankLine")),
            ]),
            |ctx| {
                let Value::Node(Node::ListPrefix(ListPrefix::Ordered { numbering, level })) =
                    ctx.capture("prefix")
                else {
                    return Err(unexpected("an ordered list prefix", &ctx.capture("prefix")));
                };
                node(Node::list_item(ListItem::Ordered {
                    level,
                    numbering,
                    attributes: attributes_of(ctx, "attributes"),
                    elements: filter_blocks([ctx.capture("content")])?,
                }))
            },
        ),
    );
    g.add_rule(
        "OrderedListItemPrefix",
        choice([
            ordered_prefix(lit("....."), NumberingStyle::UpperRoman, 5),
            ordered_prefix(lit("...."), NumberingStyle::UpperAlpha, 4),
            ordered_prefix(lit("..."), NumberingStyle::LowerRoman, 3),
            ordered_prefix(lit(".."), NumberingStyle::LowerAlpha, 2),
            ordered_prefix(lit("."), NumberingStyle::Arabic, 1),
            ordered_prefix(explicit_number('.', ('0', '9')), NumberingStyle::Arabic, 1),
            ordered_prefix(explicit_number('.', ('a', 'z')), NumberingStyle::LowerAlpha, 1),
            ordered_prefix(explicit_number('.', ('A', 'Z')), NumberingStyle::UpperAlpha, 1),
            ordered_prefix(explicit_number(')', ('a', 'z')), NumberingStyle::LowerRoman, 1),
            ordered_prefix(explicit_number(')', ('A', 'Z')), NumberingStyle::UpperRoman, 1),
        ]),
    );
    g.add_rule("OrderedListItemContent", list_item_content());

    g.add_rule(
        "UnorderedListItem",
        action(
            seq([
                bind("prefix", "UnorderedListItemPrefix"),
                bind("content", "UnorderedListItemContent"),
                opt(rule("BlankLine")),
            ]),
            |ctx| {
                let Value::Node(Node::ListPrefix(ListPrefix::Unordered { bullet, level })) =
                    ctx.capture("prefix")
                else {
                    return Err(unexpected("an unordered list prefix", &ctx.capture("prefix")));
                };
                node(Node::list_item(ListItem::Unordered {
                    level,
                    bullet,
                    elements: filter_blocks([ctx.capture("content")])?,
                }))
            },
        ),
    );
    g.add_rule(
        "UnorderedListItemPrefix",
        choice([
            bullet_prefix("*****", BulletStyle::FiveAsterisks, 5),
            bullet_prefix("****", BulletStyle::FourAsterisks, 4),
            bullet_prefix("***", BulletStyle::ThreeAsterisks, 3),
            bullet_prefix("**", BulletStyle::TwoAsterisks, 2),
            bullet_prefix("*", BulletStyle::OneAsterisk, 1),
            bullet_prefix("-", BulletStyle::Dash, 1),
        ]),
    );
    g.add_rule("UnorderedListItemContent", list_item_content());

    g.add_rule(
        "LabeledListItem",
        choice([
            action(
                seq([
                    bind("term", "LabeledListItemTerm"),
                    rule("LabeledListItemSeparator"),
                    bind("description", "LabeledListItemDescription"),
                ]),
                labeled_item,
            ),
            action(
                seq([
                    bind("term", "LabeledListItemTerm"),
                    lit("::"),
                    ws0(),
                    rule("EOL"),
                ]),
                labeled_item,
            ),
        ]),
    );
    g.add_rule(
        "LabeledListItemTerm",
        text(star(char_except([rule("NEWLINE"), lit("::")]))),
    );
    g.add_rule(
        "LabeledListItemSeparator",
        seq([lit("::"), plus(choice([rule("WS"), rule("NEWLINE")]))]),
    );
    g.add_rule(
        "LabeledListItemDescription",
        action(
            label(
                "elements",
                star(choice([rule("ListParagraph"), rule("ContinuedBlockElement")])),
            ),
            |ctx| blocks_value(ctx, "elements"),
        ),
    );
}

/// `WS* marker WS+` producing an ordered prefix node.
fn ordered_prefix(marker: Expr, numbering: NumberingStyle, level: usize) -> Expr {
    action(seq([ws0(), marker, ws1()]), move |_| {
        node(Node::ListPrefix(ListPrefix::Ordered { numbering, level }))
    })
}

/// `(!terminator !WS !NEWLINE [range])+ terminator`, as in `12.` or `iv)`.
fn explicit_number(terminator: char, range: (char, char)) -> Expr {
    let terminator = terminator.to_string();
    seq([
        plus(seq([
            not(lit(&terminator)),
            not(rule("WS")),
            not(rule("NEWLINE")),
            class("", &[range]),
        ])),
        lit(&terminator),
    ])
}

fn bullet_prefix(marker: &str, bullet: BulletStyle, level: usize) -> Expr {
    action(seq([ws0(), lit(marker), ws1()]), move |_| {
        node(Node::ListPrefix(ListPrefix::Unordered { bullet, level }))
    })
}

fn list_item_content() -> Expr {
    action(
        label(
            "elements",
            seq([
                plus(rule("ListParagraph")),
                star(rule("ContinuedBlockElement")),
            ]),
        ),
        |ctx| blocks_value(ctx, "elements"),
    )
}

fn blocks_value(ctx: &Ctx<'_>, label_name: &str) -> Built {
    let blocks = filter_blocks([ctx.capture(label_name)])?;
    Ok(Value::List(blocks.into_iter().map(Value::from).collect()))
}

fn labeled_item(ctx: &mut Ctx<'_>) -> Built {
    let term = text_of(ctx, "term")?.trim().to_string();
    let elements = filter_blocks([ctx.capture("description")])?;
    node(Node::list_item(ListItem::Labeled { term, elements }))
}

/// Rebuild list nesting from the flat item sequence.
///
/// An item whose kind and level match the innermost open list joins it, one
/// matching an enclosing list closes the lists opened since, and anything
/// else opens a new list inside the previous item.
pub(crate) fn nest_items(items: Vec<ListItem>) -> Result<List, ActionError> {
    let mut open: Vec<List> = Vec::new();
    for item in items {
        let key = (item.kind(), item.level());
        let depth = open
            .iter()
            .rposition(|list| list.items.first().map(|first| (first.kind(), first.level())) == Some(key));
        match depth {
            Some(depth) => {
                while open.len() > depth + 1 {
                    close_innermost(&mut open)?;
                }
            }
            None => open.push(List {
                kind: item.kind(),
                attributes: Default::default(),
                items: Vec::new(),
            }),
        }
        if let Some(list) = open.last_mut() {
            list.items.push(item);
        }
    }
    while open.len() > 1 {
        close_innermost(&mut open)?;
    }
    let list = open
        .pop()
        .ok_or_else(|| ActionError::new("a list needs at least one item"))?;
    debug!(kind = ?list.kind, items = list.items.len(), "built list");
    Ok(list)
}

fn close_innermost(open: &mut Vec<List>) -> Result<(), ActionError> {
    let child = open
        .pop()
        .ok_or_else(|| ActionError::new("no open list to close"))?;
    let parent = open
        .last_mut()
        .and_then(|list| list.items.last_mut())
        .ok_or_else(|| ActionError::new("nested list without a parent item"))?;
    parent.elements_mut().push(DocElement::List(child));
    Ok(())
}

fn add_paragraphs(g: &mut Grammar<Node>) {
    // `= Title` style lines are never paragraphs.
    let not_a_title = || not(seq([plus(lit("=")), ws1()]));
    let lines = || {
        label(
            "lines",
            plus(seq([
                rule("InlineContentWithTrailingSpaces"),
                rule("EOL"),
            ])),
        )
    };

    g.add_rule(
        "Paragraph",
        action(
            seq([
                label("attributes", star(rule("ElementAttribute"))),
                not_a_title(),
                lines(),
            ]),
            |ctx| {
                node(Node::block(DocElement::Paragraph(Paragraph {
                    attributes: attributes_of(ctx, "attributes"),
                    admonition: None,
                    lines: collect_lines([ctx.capture("lines")]),
                })))
            },
        ),
    );
    g.add_rule("Admonition", rule("AdmonitionParagraph"));
    g.add_rule(
        "AdmonitionParagraph",
        choice([
            action(
                seq([
                    label("attributes", star(rule("ElementAttribute"))),
                    not_a_title(),
                    bind("t", "AdmonitionKind"),
                    lit(": "),
                    bind("content", "AdmonitionParagraphContent"),
                ]),
                |ctx| admonition(ctx, "t", false),
            ),
            action(
                seq([
                    label("attributes", star(rule("ElementAttribute"))),
                    bind("k", "AdmonitionMarker"),
                    label("otherAttributes", star(rule("ElementAttribute"))),
                    bind("content", "AdmonitionParagraphContent"),
                ]),
                |ctx| admonition(ctx, "k", true),
            ),
        ]),
    );
    g.add_rule(
        "AdmonitionParagraphContent",
        action(lines(), |ctx| {
            Ok(Value::List(
                collect_lines([ctx.capture("lines")])
                    .into_iter()
                    .map(|line| Value::Node(Node::InlineContent(line)))
                    .collect(),
            ))
        }),
    );
    g.add_rule(
        "AdmonitionMarker",
        pass(
            seq([
                lit("["),
                bind("k", "AdmonitionKind"),
                lit("]"),
                ws0(),
                rule("NEWLINE"),
            ]),
            "k",
        ),
    );
    g.add_rule(
        "AdmonitionKind",
        choice([
            admonition_kind("TIP", AdmonitionKind::Tip),
            admonition_kind("NOTE", AdmonitionKind::Note),
            admonition_kind("IMPORTANT", AdmonitionKind::Important),
            admonition_kind("WARNING", AdmonitionKind::Warning),
            admonition_kind("CAUTION", AdmonitionKind::Caution),
        ]),
    );
}

fn admonition_kind(marker: &str, kind: AdmonitionKind) -> Expr {
    action(lit(marker), move |_| node(Node::Admonition(kind)))
}

fn admonition(ctx: &Ctx<'_>, kind_label: &str, block_style: bool) -> Built {
    let kind = match ctx.capture(kind_label) {
        Value::Node(Node::Admonition(kind)) => kind,
        other => return Err(unexpected("an admonition kind", &other)),
    };
    let mut attributes = attributes_of(ctx, "attributes");
    if block_style {
        attributes = attributes.merge(attributes_of(ctx, "otherAttributes"));
    }
    node(Node::block(DocElement::Paragraph(Paragraph {
        attributes,
        admonition: Some(kind),
        lines: collect_lines([ctx.capture("content")]),
    })))
}

fn add_images(g: &mut Grammar<Node>) {
    g.add_rule(
        "BlockImage",
        action(
            seq([
                label("attributes", star(rule("ElementAttribute"))),
                bind("image", "BlockImageMacro"),
                ws0(),
                rule("EOL"),
            ]),
            |ctx| {
                let Value::Node(Node::Image(image)) = ctx.capture("image") else {
                    return Err(unexpected("an image macro", &ctx.capture("image")));
                };
                node(Node::block(DocElement::BlockImage(BlockImage {
                    attributes: attributes_of(ctx, "attributes"),
                    image: *image,
                })))
            },
        ),
    );
    g.add_rule(
        "BlockImageMacro",
        action(
            seq([
                lit("image::"),
                bind("path", "URL"),
                lit("["),
                label("attributes", opt(rule("URL_TEXT"))),
                lit("]"),
            ]),
            image_macro,
        ),
    );
}

pub(super) fn image_macro(ctx: &mut Ctx<'_>) -> Built {
    let path = text_of(ctx, "path")?;
    let attributes = text_of(ctx, "attributes")?;
    node(Node::image(ImageMacro::new(&path, Some(&attributes))))
}

fn add_delimited_blocks(g: &mut Grammar<Node>) {
    g.add_rule(
        "DelimitedBlock",
        choice([
            rule("FencedBlock"),
            rule("ListingBlock"),
            rule("ExampleBlock"),
        ]),
    );
    g.add_rule(
        "BlockDelimiter",
        choice([
            rule("LiteralBlockDelimiter"),
            rule("FencedBlockDelimiter"),
            rule("ListingBlockDelimiter"),
            rule("ExampleBlockDelimiter"),
        ]),
    );
    g.add_rule("FencedBlockDelimiter", lit("```"));
    g.add_rule(
        "FencedBlock",
        verbatim_block("FencedBlockDelimiter", DelimitedBlockKind::Fenced),
    );
    g.add_rule("ListingBlockDelimiter", lit("----"));
    g.add_rule(
        "ListingBlock",
        verbatim_block("ListingBlockDelimiter", DelimitedBlockKind::Listing),
    );
    g.add_rule("ExampleBlockDelimiter", lit("===="));
    g.add_rule(
        "ExampleBlock",
        action(
            seq([
                label("attributes", star(rule("ElementAttribute"))),
                rule("ExampleBlockDelimiter"),
                ws0(),
                rule("NEWLINE"),
                label(
                    "content",
                    star(choice([
                        rule("List"),
                        rule("Paragraph"),
                        rule("BlankLine"),
                    ])),
                ),
                rule("ExampleBlockDelimiter"),
                ws0(),
                rule("EOL"),
            ]),
            |ctx| {
                node(Node::block(DocElement::DelimitedBlock(DelimitedBlock {
                    kind: DelimitedBlockKind::Example,
                    attributes: attributes_of(ctx, "attributes"),
                    content: BlockContent::Blocks(filter_blocks([ctx.capture("content")])?),
                })))
            },
        ),
    );
}

/// `attributes* DELIM WS* NEWLINE content DELIM WS* EOL` with the content
/// kept as is.
fn verbatim_block(delimiter: &str, kind: DelimitedBlockKind) -> Expr {
    action(
        seq([
            label("attributes", star(rule("ElementAttribute"))),
            rule(delimiter),
            ws0(),
            rule("NEWLINE"),
            label("content", text(star(char_except([rule(delimiter)])))),
            rule(delimiter),
            ws0(),
            rule("EOL"),
        ]),
        move |ctx| {
            let content = text_of(ctx, "content")?;
            node(Node::block(DocElement::DelimitedBlock(DelimitedBlock {
                kind,
                attributes: attributes_of(ctx, "attributes"),
                content: BlockContent::Verbatim(strip_final_newline(&content).to_string()),
            })))
        },
    )
}

fn strip_final_newline(content: &str) -> &str {
    content
        .strip_suffix("\r\n")
        .or_else(|| content.strip_suffix('\n'))
        .or_else(|| content.strip_suffix('\r'))
        .unwrap_or(content)
}

fn add_literal_blocks(g: &mut Grammar<Node>) {
    g.add_rule(
        "LiteralBlock",
        choice([
            rule("ParagraphWithSpaces"),
            rule("ParagraphWithLiteralBlockDelimiter"),
            rule("ParagraphWithLiteralAttribute"),
        ]),
    );
    g.add_rule(
        "ParagraphWithSpaces",
        action(
            seq([
                label("spaces", text(ws1())),
                not(rule("NEWLINE")),
                bind("content", "LiteralBlockContent"),
                rule("EndOfLiteralBlock"),
            ]),
            |ctx| {
                let spaces = text_of(ctx, "spaces")?;
                let content = text_of(ctx, "content")?;
                literal(format!("{spaces}{content}"))
            },
        ),
    );
    g.add_rule(
        "LiteralBlockContent",
        text(plus(char_except([
            seq([rule("NEWLINE"), rule("BlankLine")]),
            seq([rule("NEWLINE"), rule("EOF")]),
        ]))),
    );
    g.add_rule(
        "EndOfLiteralBlock",
        choice([
            seq([rule("NEWLINE"), rule("BlankLine")]),
            rule("NEWLINE"),
            rule("EOF"),
        ]),
    );
    g.add_rule(
        "ParagraphWithLiteralBlockDelimiter",
        action(
            seq([
                rule("LiteralBlockDelimiter"),
                ws0(),
                rule("NEWLINE"),
                label(
                    "content",
                    text(star(char_except([rule("LiteralBlockDelimiter")]))),
                ),
                rule("LiteralBlockDelimiter"),
                ws0(),
                rule("EOL"),
            ]),
            |ctx| {
                let content = text_of(ctx, "content")?;
                literal(strip_final_newline(&content).to_string())
            },
        ),
    );
    g.add_rule("LiteralBlockDelimiter", lit("...."));
    g.add_rule(
        "ParagraphWithLiteralAttribute",
        action(
            seq([
                lit("[literal]"),
                ws0(),
                rule("NEWLINE"),
                bind("content", "LiteralBlockContent"),
                rule("EndOfLiteralBlock"),
            ]),
            |ctx| literal(text_of(ctx, "content")?),
        ),
    );
}

fn literal(content: String) -> Built {
    node(Node::block(DocElement::LiteralBlock { content }))
}

fn add_element_attributes(g: &mut Grammar<Node>) {
    g.add_rule(
        "ElementAttribute",
        pass(
            seq([
                not(rule("AdmonitionMarker")),
                label(
                    "attr",
                    choice([
                        rule("ElementID"),
                        rule("ElementTitle"),
                        rule("AttributeGroup"),
                        rule("InvalidElementAttribute"),
                    ]),
                ),
                rule("EOL"),
            ]),
            "attr",
        ),
    );
    g.add_rule(
        "ElementID",
        choice([
            pass(bind("id", "InlineElementID"), "id"),
            action(
                seq([lit("[#"), bind("id", "ID"), lit("]"), ws0()]),
                |ctx| {
                    let id = text_of(ctx, "id")?;
                    node(Node::Attribute(ElementAttribute::Id(id)))
                },
            ),
        ]),
    );
    g.add_rule(
        "InlineElementID",
        action(
            seq([lit("[["), bind("id", "ID"), lit("]]"), ws0()]),
            |ctx| {
                let id = text_of(ctx, "id")?;
                node(Node::Attribute(ElementAttribute::Id(id)))
            },
        ),
    );
    g.add_rule(
        "ElementTitle",
        action(
            seq([
                lit("."),
                not(lit(".")),
                not(rule("WS")),
                label("title", text(plus(char_except([rule("NEWLINE")])))),
                ws0(),
            ]),
            |ctx| {
                let title = text_of(ctx, "title")?.trim_end().to_string();
                node(Node::Attribute(ElementAttribute::Title(title)))
            },
        ),
    );
    g.add_rule(
        "AttributeGroup",
        action(
            seq([
                lit("["),
                label("attributes", star(rule("GenericAttribute"))),
                lit("]"),
                ws0(),
            ]),
            |ctx| {
                let options = ctx
                    .capture("attributes")
                    .into_list()
                    .into_iter()
                    .map(|value| match value {
                        Value::Node(Node::GenericAttribute(attribute)) => Ok(attribute),
                        other => Err(unexpected("a generic attribute", &other)),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                node(Node::Attribute(ElementAttribute::Group(options)))
            },
        ),
    );
    let separator = || opt(seq([lit(","), ws0()]));
    g.add_rule(
        "GenericAttribute",
        choice([
            action(
                seq([
                    bind("key", "AttributeKey"),
                    lit("="),
                    bind("value", "AttributeValue"),
                    separator(),
                ]),
                generic_attribute,
            ),
            action(
                seq([bind("key", "AttributeKey"), separator()]),
                generic_attribute,
            ),
        ]),
    );
    g.add_rule(
        "AttributeKey",
        pass(
            seq([
                label(
                    "key",
                    text(plus(char_except([
                        rule("WS"),
                        lit("="),
                        lit(","),
                        lit("]"),
                    ]))),
                ),
                ws0(),
            ]),
            "key",
        ),
    );
    g.add_rule(
        "AttributeValue",
        pass(
            seq([
                ws0(),
                label(
                    "value",
                    text(star(char_except([
                        rule("WS"),
                        lit("="),
                        lit(","),
                        lit("]"),
                    ]))),
                ),
                ws0(),
            ]),
            "value",
        ),
    );
    g.add_rule(
        "InvalidElementAttribute",
        action(
            seq([
                lit("["),
                ws1(),
                label("content", star(char_except([lit("]")]))),
                lit("]"),
                ws0(),
            ]),
            |ctx| {
                node(Node::Attribute(ElementAttribute::Invalid(
                    ctx.text().trim_end().to_string(),
                )))
            },
        ),
    );
}

fn generic_attribute(ctx: &mut Ctx<'_>) -> Built {
    let key = text_of(ctx, "key")?;
    let value = if ctx.get("value").is_some() {
        Some(text_of(ctx, "value")?)
    } else {
        None
    };
    node(Node::GenericAttribute(GenericAttribute { key, value }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ListKind;

    fn unordered(level: usize, text: &str) -> ListItem {
        ListItem::Unordered {
            level,
            bullet: BulletStyle::OneAsterisk,
            elements: vec![DocElement::LiteralBlock {
                content: text.to_string(),
            }],
        }
    }

    fn ordered(level: usize) -> ListItem {
        ListItem::Ordered {
            level,
            numbering: NumberingStyle::Arabic,
            attributes: Default::default(),
            elements: Vec::new(),
        }
    }

    #[test]
    fn test_nest_flat_items() {
        let list = nest_items(vec![
            unordered(1, "a"),
            unordered(2, "a.1"),
            unordered(2, "a.2"),
            unordered(1, "b"),
        ])
        .unwrap();
        assert_eq!(list.kind, ListKind::Unordered);
        assert_eq!(list.items.len(), 2);
        let DocElement::List(child) = &list.items[0].elements()[1] else {
            panic!("expected a nested list");
        };
        assert_eq!(child.items.len(), 2);
        assert_eq!(list.items[1].elements().len(), 1);
    }

    #[test]
    fn test_nest_mixed_kinds() {
        let list = nest_items(vec![unordered(1, "a"), ordered(1), ordered(1), unordered(1, "b")])
            .unwrap();
        assert_eq!(list.items.len(), 2);
        let DocElement::List(child) = &list.items[0].elements()[1] else {
            panic!("expected a nested list");
        };
        assert_eq!(child.kind, ListKind::Ordered);
        assert_eq!(child.items.len(), 2);
    }

    #[test]
    fn test_nest_closes_several_levels() {
        let list = nest_items(vec![
            unordered(1, "a"),
            unordered(2, "b"),
            unordered(3, "c"),
            unordered(1, "d"),
        ])
        .unwrap();
        assert_eq!(list.items.len(), 2);
    }

    #[test]
    fn test_nest_requires_items() {
        assert!(nest_items(Vec::new()).is_err());
    }

    #[test]
    fn test_strip_final_newline() {
        assert_eq!(strip_final_newline("a\nb\n"), "a\nb");
        assert_eq!(strip_final_newline("a\r\n"), "a");
        assert_eq!(strip_final_newline("a"), "a");
    }
}
