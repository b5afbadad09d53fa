//! Inline elements: quoted text, passthroughs, cross references, links
//! and inline images.

use super::blocks::image_macro;
use super::{bind, char_except, node, optional_text_of, text_of, unexpected, ws0, Built, Ctx, Expr};
use crate::assembly::to_inline_elements;
use crate::ast::{InlineContent, InlineElement, PassthroughKind, QuotedTextKind};
use crate::node::Node;
use libadoc_peg::dsl::*;
use libadoc_peg::{Grammar, Value};

pub(super) fn add_rules(g: &mut Grammar<Node>) {
    let element = || {
        seq([
            ws0(),
            not(rule("InlineElementID")),
            rule("InlineElement"),
        ])
    };
    g.add_rule(
        "InlineContentWithTrailingSpaces",
        action(
            seq([
                not(rule("BlockDelimiter")),
                label("elements", plus(seq([element(), ws0()]))),
            ]),
            inline_content,
        ),
    );
    g.add_rule(
        "InlineContent",
        action(
            seq([
                not(rule("BlockDelimiter")),
                label("elements", plus(element())),
            ]),
            inline_content,
        ),
    );
    g.add_rule(
        "InlineElement",
        choice([
            rule("CrossReference"),
            rule("Passthrough"),
            rule("InlineImage"),
            rule("QuotedText"),
            rule("Link"),
            rule("DocumentAttributeSubstitution"),
            rule("Characters"),
        ]),
    );

    add_quoted_text(g);
    add_passthroughs(g);
    add_references(g);
}

fn inline_content(ctx: &mut Ctx<'_>) -> Built {
    let elements = to_inline_elements([ctx.capture("elements")])?;
    node(Node::InlineContent(InlineContent::new(elements)))
}

fn add_quoted_text(g: &mut Grammar<Node>) {
    g.add_rule(
        "QuotedText",
        choice([
            rule("BoldText"),
            rule("ItalicText"),
            rule("MonospaceText"),
            rule("EscapedBoldText"),
            rule("EscapedItalicText"),
            rule("EscapedMonospaceText"),
        ]),
    );
    for (kind, name) in [
        (QuotedTextKind::Bold, "Bold"),
        (QuotedTextKind::Italic, "Italic"),
        (QuotedTextKind::Monospace, "Monospace"),
    ] {
        g.add_rule(format!("{name}Text"), quoted_text(kind));
        g.add_rule(format!("Escaped{name}Text"), escaped_quoted_text(kind));
    }

    g.add_rule(
        "QuotedTextContent",
        seq([
            rule("QuotedTextContentElement"),
            star(seq([
                plus(rule("WS")),
                rule("QuotedTextContentElement"),
            ])),
        ]),
    );
    g.add_rule(
        "QuotedTextContentElement",
        choice([
            rule("QuotedText"),
            rule("QuotedTextCharacters"),
            rule("CharactersWithQuotePunctuation"),
        ]),
    );
    g.add_rule(
        "QuotedTextCharacters",
        text(plus(char_except([
            rule("NEWLINE"),
            rule("WS"),
            lit("*"),
            lit("_"),
            lit("`"),
        ]))),
    );
    g.add_rule(
        "CharactersWithQuotePunctuation",
        text(plus(char_except([rule("NEWLINE"), rule("WS")]))),
    );
    g.add_rule(
        "UnbalancedQuotePunctuation",
        choice([lit("*"), lit("_"), lit("`")]),
    );
}

/// `**x**`, `**x*` and `*x*` for the punctuation of `kind`, never
/// preceded by the backslashes that would escape them.
fn quoted_text(kind: QuotedTextKind) -> Expr {
    let single = kind.punctuation();
    let double = single.repeat(2);
    choice([
        action(
            seq([
                not(lit("\\\\")),
                lit(&double),
                bind("content", "QuotedTextContent"),
                lit(&double),
            ]),
            move |ctx| quoted(ctx, kind, None),
        ),
        action(
            seq([
                not(lit("\\\\")),
                lit(&double),
                bind("content", "QuotedTextContent"),
                lit(single),
            ]),
            move |ctx| quoted(ctx, kind, Some(kind.punctuation())),
        ),
        action(
            seq([
                not(lit("\\")),
                lit(single),
                bind("content", "QuotedTextContent"),
                lit(single),
            ]),
            move |ctx| quoted(ctx, kind, None),
        ),
    ])
}

/// Quoted content; `excess` is an unmatched leading punctuation kept as text.
fn quoted(ctx: &Ctx<'_>, kind: QuotedTextKind, excess: Option<&str>) -> Built {
    let elements = to_inline_elements([
        excess.map(Value::from).unwrap_or(Value::Absent),
        ctx.capture("content"),
    ])?;
    Ok(InlineElement::QuotedText { kind, elements }.into())
}

fn escaped_quoted_text(kind: QuotedTextKind) -> Expr {
    let single = kind.punctuation();
    let double = single.repeat(2);
    let backslashes = |first: &str| {
        label(
            "backslashes",
            text(seq([lit(first), star(lit("\\"))])),
        )
    };
    choice([
        action(
            seq([
                backslashes("\\\\"),
                lit(&double),
                bind("content", "QuotedTextContent"),
                lit(&double),
            ]),
            move |ctx| escaped(ctx, kind, kind.punctuation().repeat(2), None),
        ),
        action(
            seq([
                backslashes("\\"),
                lit(&double),
                bind("content", "QuotedTextContent"),
                lit(single),
            ]),
            move |ctx| {
                let punctuation = kind.punctuation();
                escaped(ctx, kind, punctuation.to_string(), Some(punctuation))
            },
        ),
        action(
            seq([
                backslashes("\\"),
                lit(single),
                bind("content", "QuotedTextContent"),
                lit(single),
            ]),
            move |ctx| escaped(ctx, kind, kind.punctuation().to_string(), None),
        ),
    ])
}

fn escaped(
    ctx: &Ctx<'_>,
    kind: QuotedTextKind,
    punctuation: String,
    excess: Option<&str>,
) -> Built {
    let backslashes = text_of(ctx, "backslashes")?;
    let elements = to_inline_elements([
        excess.map(Value::from).unwrap_or(Value::Absent),
        ctx.capture("content"),
    ])?;
    Ok(InlineElement::EscapedQuotedText {
        kind,
        backslashes,
        punctuation,
        elements,
    }
    .into())
}

fn add_passthroughs(g: &mut Grammar<Node>) {
    g.add_rule(
        "Passthrough",
        choice([
            rule("TriplePlusPassthrough"),
            rule("SinglePlusPassthrough"),
            rule("PassthroughMacro"),
        ]),
    );
    g.add_rule(
        "SinglePlusPassthrough",
        action(
            seq([
                lit("+"),
                label(
                    "content",
                    text(star(char_except([rule("NEWLINE"), lit("+")]))),
                ),
                lit("+"),
            ]),
            |ctx| passthrough(ctx, PassthroughKind::SinglePlus),
        ),
    );
    g.add_rule(
        "TriplePlusPassthrough",
        action(
            seq([
                lit("+++"),
                label("content", text(star(char_except([lit("+++")])))),
                lit("+++"),
            ]),
            |ctx| passthrough(ctx, PassthroughKind::TriplePlus),
        ),
    );
    g.add_rule(
        "PassthroughMacro",
        choice([
            action(
                seq([
                    lit("pass:["),
                    label("content", star(rule("PassthroughMacroCharacter"))),
                    lit("]"),
                ]),
                |ctx| passthrough(ctx, PassthroughKind::Macro),
            ),
            action(
                seq([
                    lit("pass:q["),
                    label(
                        "content",
                        star(choice([
                            rule("QuotedText"),
                            rule("PassthroughMacroCharacter"),
                        ])),
                    ),
                    lit("]"),
                ]),
                |ctx| passthrough(ctx, PassthroughKind::Macro),
            ),
        ]),
    );
    g.add_rule(
        "PassthroughMacroCharacter",
        text(char_except([lit("]")])),
    );
}

fn passthrough(ctx: &Ctx<'_>, kind: PassthroughKind) -> Built {
    let elements = to_inline_elements([ctx.capture("content")])?;
    Ok(InlineElement::Passthrough { kind, elements }.into())
}

fn add_references(g: &mut Grammar<Node>) {
    g.add_rule(
        "CrossReference",
        action(
            seq([lit("<<"), bind("id", "ID"), lit(">>")]),
            |ctx| {
                let id = text_of(ctx, "id")?;
                Ok(InlineElement::CrossReference { id }.into())
            },
        ),
    );
    g.add_rule(
        "Link",
        choice([rule("RelativeLink"), rule("ExternalLink")]),
    );
    let link_text = || {
        seq([
            lit("["),
            label("text", star(rule("URL_TEXT"))),
            lit("]"),
        ])
    };
    g.add_rule(
        "ExternalLink",
        action(
            seq([
                label("url", text(seq([rule("URL_SCHEME"), rule("URL")]))),
                opt(link_text()),
            ]),
            link,
        ),
    );
    g.add_rule(
        "RelativeLink",
        action(
            seq([
                lit("link:"),
                label("url", text(seq([opt(rule("URL_SCHEME")), rule("URL")]))),
                link_text(),
            ]),
            link,
        ),
    );

    g.add_rule(
        "InlineImage",
        action(bind("image", "InlineImageMacro"), |ctx| {
            match ctx.capture("image") {
                Value::Node(Node::Image(image)) => Ok(InlineElement::InlineImage(*image).into()),
                other => Err(unexpected("an image macro", &other)),
            }
        }),
    );
    g.add_rule(
        "InlineImageMacro",
        action(
            seq([
                lit("image:"),
                not(lit(":")),
                bind("path", "URL"),
                lit("["),
                label("attributes", opt(rule("URL_TEXT"))),
                lit("]"),
            ]),
            image_macro,
        ),
    );
}

fn link(ctx: &mut Ctx<'_>) -> Built {
    let url = text_of(ctx, "url")?;
    let text = optional_text_of(ctx, "text")?;
    Ok(InlineElement::Link { url, text }.into())
}
