//! The AsciiDoc rule table.
//!
//! Rules are plain [`Expr`] data interpreted by `libadoc-peg`. The first
//! rule, `Document`, is the default entry point. Alternative order matters
//! everywhere: the interpreter takes the first alternative that matches.

mod blocks;
mod document;
mod inline;

use crate::assembly::{collect_attributes, stringify};
use crate::ast::{Attributes, InlineContent};
use crate::frontmatter::{FrontMatterDecoder, YamlFrontMatterDecoder};
use crate::node::{describe, Node};
use libadoc_peg::dsl::*;
use libadoc_peg::{ActionContext, ActionError, Grammar, Value};
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::debug;

pub(crate) type Expr = libadoc_peg::Expr<Node>;
pub(crate) type Ctx<'s> = ActionContext<'s, Node>;
pub(crate) type Built = Result<Value<Node>, ActionError>;

static GRAMMAR: Lazy<Grammar<Node>> =
    Lazy::new(|| asciidoc_grammar_with(Arc::new(YamlFrontMatterDecoder)));

/// Shared grammar using the YAML front matter decoder.
pub fn asciidoc_grammar() -> &'static Grammar<Node> {
    &GRAMMAR
}

/// Build the grammar with a custom front matter decoder.
pub fn asciidoc_grammar_with(decoder: Arc<dyn FrontMatterDecoder>) -> Grammar<Node> {
    let mut grammar = Grammar::new();
    document::add_rules(&mut grammar, decoder);
    blocks::add_rules(&mut grammar);
    inline::add_rules(&mut grammar);
    add_terminals(&mut grammar);
    debug!(rules = grammar.len(), "built asciidoc grammar");
    grammar
}

fn add_terminals(g: &mut Grammar<Node>) {
    g.add_rule(
        "Characters",
        text(plus(seq([not(rule("NEWLINE")), not(rule("WS")), any()]))),
    );
    g.add_rule(
        "URL",
        text(plus(seq([
            not(rule("NEWLINE")),
            not(rule("WS")),
            not(lit("[")),
            not(lit("]")),
            any(),
        ]))),
    );
    g.add_rule(
        "ID",
        text(plus(seq([
            not(rule("NEWLINE")),
            not(rule("WS")),
            not(lit("[")),
            not(lit("]")),
            not(lit("<<")),
            not(lit(">>")),
            any(),
        ]))),
    );
    g.add_rule(
        "URL_TEXT",
        text(plus(seq([
            not(rule("NEWLINE")),
            not(lit("[")),
            not(lit("]")),
            any(),
        ]))),
    );
    g.add_rule(
        "URL_SCHEME",
        choice([
            lit("http://"),
            lit("https://"),
            lit("ftp://"),
            lit("irc://"),
            lit("mailto:"),
        ]),
    );
    g.add_rule("DIGIT", class("", &[('0', '9')]));
    g.add_rule("NEWLINE", choice([lit("\r\n"), lit("\r"), lit("\n")]));
    g.add_rule("WS", choice([lit(" "), lit("\t")]));
    g.add_rule("EOF", eof());
    g.add_rule("EOL", choice([rule("NEWLINE"), rule("EOF")]));
}

/// `rule` bound to `label`.
pub(crate) fn bind(label_name: &str, rule_name: &str) -> Expr {
    label(label_name, rule(rule_name))
}

pub(crate) fn ws0() -> Expr {
    star(rule("WS"))
}

pub(crate) fn ws1() -> Expr {
    plus(rule("WS"))
}

/// `(!stop1 !stop2 ... .)`, one character not starting any of `stops`.
pub(crate) fn char_except(stops: impl IntoIterator<Item = Expr>) -> Expr {
    let mut parts: Vec<Expr> = stops.into_iter().map(not).collect();
    parts.push(any());
    seq(parts)
}

/// Action returning the value bound to `label`.
pub(crate) fn pass(expr: Expr, label_name: &'static str) -> Expr {
    action(expr, move |ctx| Ok(ctx.capture(label_name)))
}

pub(crate) fn node(node: Node) -> Built {
    Ok(Value::Node(node))
}

pub(crate) fn text_of(ctx: &Ctx<'_>, label_name: &str) -> Result<String, ActionError> {
    stringify([ctx.capture(label_name)])
}

/// Text bound to `label`, `None` when it is unbound or blank.
pub(crate) fn optional_text_of(
    ctx: &Ctx<'_>,
    label_name: &str,
) -> Result<Option<String>, ActionError> {
    if !ctx.has(label_name) {
        return Ok(None);
    }
    let text = text_of(ctx, label_name)?;
    Ok((!text.trim().is_empty()).then_some(text))
}

pub(crate) fn attributes_of(ctx: &Ctx<'_>, label_name: &str) -> Attributes {
    Attributes::fold(&collect_attributes([ctx.capture(label_name)]))
}

pub(crate) fn inline_content_of(
    ctx: &Ctx<'_>,
    label_name: &str,
) -> Result<InlineContent, ActionError> {
    match ctx.capture(label_name) {
        Value::Node(Node::InlineContent(content)) => Ok(content),
        other => Err(unexpected("inline content", &other)),
    }
}

pub(crate) fn unexpected(expected: &str, found: &Value<Node>) -> ActionError {
    ActionError::new(format!("expected {expected}, found {}", describe(found)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_reference_is_defined() {
        assert!(asciidoc_grammar().undefined_references().is_empty());
    }

    #[test]
    fn test_document_is_the_entry_rule() {
        let first = asciidoc_grammar().first_rule().map(|rule| rule.name.as_str());
        assert_eq!(first, Some("Document"));
    }
}
