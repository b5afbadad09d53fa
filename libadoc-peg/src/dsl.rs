//! Short constructors for writing grammars as Rust data.
//!
//! ```
//! use libadoc_peg::dsl::*;
//! use libadoc_peg::{Grammar, ParseOptions, Value};
//!
//! let grammar: Grammar<()> = Grammar::new()
//!     .with_rule("Greeting", seq([lit_i("hello"), plus(class(" ", &[])), rule("Name")]))
//!     .with_rule("Name", plus(class("", &[('a', 'z')])));
//! let output = grammar.parse("Hello world", &ParseOptions::default()).unwrap();
//! assert!(matches!(output.value, Value::List(_)));
//! ```

use crate::action::ActionContext;
use crate::error::ActionError;
use crate::expr::{CharClass, Expr, Literal};
use crate::value::Value;
use std::sync::Arc;

pub fn lit<N>(text: &str) -> Expr<N> {
    Expr::Literal(Literal::new(text, false))
}

/// Case-insensitive literal.
pub fn lit_i<N>(text: &str) -> Expr<N> {
    Expr::Literal(Literal::new(text, true))
}

pub fn class<N>(chars: &str, ranges: &[(char, char)]) -> Expr<N> {
    Expr::Class(CharClass::new(chars, ranges))
}

pub fn not_class<N>(chars: &str, ranges: &[(char, char)]) -> Expr<N> {
    Expr::Class(CharClass::new(chars, ranges).inverted())
}

pub fn any<N>() -> Expr<N> {
    Expr::Any
}

pub fn seq<N>(children: impl IntoIterator<Item = Expr<N>>) -> Expr<N> {
    Expr::Sequence(children.into_iter().collect())
}

pub fn choice<N>(alternatives: impl IntoIterator<Item = Expr<N>>) -> Expr<N> {
    Expr::Choice(alternatives.into_iter().collect())
}

pub fn label<N>(name: &str, expr: Expr<N>) -> Expr<N> {
    Expr::Labeled(name.to_string(), Box::new(expr))
}

pub fn opt<N>(expr: Expr<N>) -> Expr<N> {
    Expr::ZeroOrOne(Box::new(expr))
}

pub fn star<N>(expr: Expr<N>) -> Expr<N> {
    Expr::ZeroOrMore(Box::new(expr))
}

pub fn plus<N>(expr: Expr<N>) -> Expr<N> {
    Expr::OneOrMore(Box::new(expr))
}

pub fn and<N>(expr: Expr<N>) -> Expr<N> {
    Expr::And(Box::new(expr))
}

pub fn not<N>(expr: Expr<N>) -> Expr<N> {
    Expr::Not(Box::new(expr))
}

/// End of input, `!.`
pub fn eof<N>() -> Expr<N> {
    not(any())
}

pub fn rule<N>(name: &str) -> Expr<N> {
    Expr::RuleRef(name.to_string())
}

pub fn action<N, F>(expr: Expr<N>, f: F) -> Expr<N>
where
    F: Fn(&mut ActionContext<'_, N>) -> Result<Value<N>, ActionError> + Send + Sync + 'static,
{
    Expr::Action(Box::new(expr), Arc::new(f))
}

/// Action that returns the matched text.
pub fn text<N: 'static>(expr: Expr<N>) -> Expr<N> {
    action(expr, |ctx| Ok(Value::Text(ctx.text().to_string())))
}

pub fn and_code<N, F>(f: F) -> Expr<N>
where
    F: Fn(&mut ActionContext<'_, N>) -> Result<bool, ActionError> + Send + Sync + 'static,
{
    Expr::AndCode(Arc::new(f))
}

pub fn not_code<N, F>(f: F) -> Expr<N>
where
    F: Fn(&mut ActionContext<'_, N>) -> Result<bool, ActionError> + Send + Sync + 'static,
{
    Expr::NotCode(Arc::new(f))
}

pub fn state_code<N, F>(f: F) -> Expr<N>
where
    F: Fn(&mut ActionContext<'_, N>) -> Result<(), ActionError> + Send + Sync + 'static,
{
    Expr::StateCode(Arc::new(f))
}

pub fn recover<N>(expr: Expr<N>, fallback: Expr<N>, labels: &[&str]) -> Expr<N> {
    Expr::Recovery {
        expr: Box::new(expr),
        fallback: Box::new(fallback),
        labels: labels.iter().map(|label| label.to_string()).collect(),
    }
}

pub fn throw<N>(label: &str) -> Expr<N> {
    Expr::Throw(label.to_string())
}
