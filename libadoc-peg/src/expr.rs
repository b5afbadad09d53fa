//! Grammar expression trees and the rule table.
//!
//! A [`Grammar`] is built once and then only read: the interpreter keys its
//! memo table by the address of each [`Expr`] node, so expressions must not
//! move or change while a parse borrows the grammar.

use crate::action::ActionContext;
use crate::error::ActionError;
use crate::value::Value;
use hashbrown::HashMap;
use std::fmt;
use std::sync::Arc;

/// Semantic action run when its child expression matches.
pub type ActionFn<N> =
    Arc<dyn Fn(&mut ActionContext<'_, N>) -> Result<Value<N>, ActionError> + Send + Sync>;

/// Semantic predicate consulted without consuming input.
pub type PredicateFn<N> =
    Arc<dyn Fn(&mut ActionContext<'_, N>) -> Result<bool, ActionError> + Send + Sync>;

/// Code that updates the semantic state and always succeeds.
pub type StateFn<N> =
    Arc<dyn Fn(&mut ActionContext<'_, N>) -> Result<(), ActionError> + Send + Sync>;

/// A literal string, optionally matched case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    text: String,
    ignore_case: bool,
    description: String,
}

impl Literal {
    pub fn new(text: impl Into<String>, ignore_case: bool) -> Self {
        let text = text.into();
        let text = if ignore_case {
            text.chars().map(fold_case).collect()
        } else {
            text
        };
        let mut description = format!("{:?}", text);
        if ignore_case {
            description.push('i');
        }
        Literal {
            text,
            ignore_case,
            description,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn ignore_case(&self) -> bool {
        self.ignore_case
    }

    /// Expected-token description, e.g. `"=="` or `"v"i`.
    pub fn description(&self) -> &str {
        &self.description
    }
}

/// A set of characters given as single members and inclusive ranges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharClass {
    chars: Vec<char>,
    ranges: Vec<(char, char)>,
    inverted: bool,
    ignore_case: bool,
    description: String,
}

impl CharClass {
    pub fn new(chars: &str, ranges: &[(char, char)]) -> Self {
        let mut class = CharClass {
            chars: chars.chars().collect(),
            ranges: ranges.to_vec(),
            inverted: false,
            ignore_case: false,
            description: String::new(),
        };
        class.describe();
        class
    }

    /// Match every character outside the set.
    pub fn inverted(mut self) -> Self {
        self.inverted = true;
        self.describe();
        self
    }

    pub fn ignore_case(mut self) -> Self {
        self.ignore_case = true;
        self.chars = self.chars.iter().copied().map(fold_case).collect();
        self.ranges = self
            .ranges
            .iter()
            .map(|&(lo, hi)| (fold_case(lo), fold_case(hi)))
            .collect();
        self.describe();
        self
    }

    pub fn matches(&self, ch: char) -> bool {
        let ch = if self.ignore_case { fold_case(ch) } else { ch };
        let member =
            self.chars.contains(&ch) || self.ranges.iter().any(|&(lo, hi)| lo <= ch && ch <= hi);
        member != self.inverted
    }

    /// Expected-token description, e.g. `[0-9]` or `[^\]]`.
    pub fn description(&self) -> &str {
        &self.description
    }

    fn describe(&mut self) {
        let mut out = String::from("[");
        if self.inverted {
            out.push('^');
        }
        for &ch in &self.chars {
            push_class_char(&mut out, ch);
        }
        for &(lo, hi) in &self.ranges {
            push_class_char(&mut out, lo);
            out.push('-');
            push_class_char(&mut out, hi);
        }
        out.push(']');
        if self.ignore_case {
            out.push('i');
        }
        self.description = out;
    }
}

fn push_class_char(out: &mut String, ch: char) {
    match ch {
        ']' | '\\' | '-' | '^' => {
            out.push('\\');
            out.push(ch);
        }
        _ if ch.is_control() => out.extend(ch.escape_default()),
        _ => out.push(ch),
    }
}

pub(crate) fn fold_case(ch: char) -> char {
    ch.to_lowercase().next().unwrap_or(ch)
}

/// One node of a grammar expression tree.
#[derive(Clone)]
pub enum Expr<N> {
    Literal(Literal),
    Class(CharClass),
    /// Any single character
    Any,
    Sequence(Vec<Expr<N>>),
    /// Ordered choice: the first matching alternative wins
    Choice(Vec<Expr<N>>),
    Labeled(String, Box<Expr<N>>),
    ZeroOrOne(Box<Expr<N>>),
    ZeroOrMore(Box<Expr<N>>),
    OneOrMore(Box<Expr<N>>),
    /// Positive lookahead
    And(Box<Expr<N>>),
    /// Negative lookahead
    Not(Box<Expr<N>>),
    RuleRef(String),
    Action(Box<Expr<N>>, ActionFn<N>),
    AndCode(PredicateFn<N>),
    NotCode(PredicateFn<N>),
    StateCode(StateFn<N>),
    /// Registers `fallback` under `labels` while `expr` is evaluated
    Recovery {
        expr: Box<Expr<N>>,
        fallback: Box<Expr<N>>,
        labels: Vec<String>,
    },
    Throw(String),
}

impl<N> Expr<N> {
    /// Stable identity used as the memoization key.
    pub(crate) fn id(&self) -> usize {
        self as *const Expr<N> as usize
    }

    /// Call `visit` on this node and every node below it.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expr<N>)) {
        visit(self);
        match self {
            Expr::Sequence(children) | Expr::Choice(children) => {
                for child in children {
                    child.walk(visit);
                }
            }
            Expr::Labeled(_, child)
            | Expr::ZeroOrOne(child)
            | Expr::ZeroOrMore(child)
            | Expr::OneOrMore(child)
            | Expr::And(child)
            | Expr::Not(child)
            | Expr::Action(child, _) => child.walk(visit),
            Expr::Recovery { expr, fallback, .. } => {
                expr.walk(visit);
                fallback.walk(visit);
            }
            Expr::Literal(_)
            | Expr::Class(_)
            | Expr::Any
            | Expr::RuleRef(_)
            | Expr::AndCode(_)
            | Expr::NotCode(_)
            | Expr::StateCode(_)
            | Expr::Throw(_) => {}
        }
    }
}

impl<N> fmt::Debug for Expr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(lit) => write!(f, "Literal({})", lit.description()),
            Expr::Class(class) => write!(f, "Class({})", class.description()),
            Expr::Any => write!(f, "Any"),
            Expr::Sequence(children) => f.debug_tuple("Sequence").field(children).finish(),
            Expr::Choice(children) => f.debug_tuple("Choice").field(children).finish(),
            Expr::Labeled(label, child) => {
                f.debug_tuple("Labeled").field(label).field(child).finish()
            }
            Expr::ZeroOrOne(child) => f.debug_tuple("ZeroOrOne").field(child).finish(),
            Expr::ZeroOrMore(child) => f.debug_tuple("ZeroOrMore").field(child).finish(),
            Expr::OneOrMore(child) => f.debug_tuple("OneOrMore").field(child).finish(),
            Expr::And(child) => f.debug_tuple("And").field(child).finish(),
            Expr::Not(child) => f.debug_tuple("Not").field(child).finish(),
            Expr::RuleRef(name) => f.debug_tuple("RuleRef").field(name).finish(),
            Expr::Action(child, _) => f.debug_tuple("Action").field(child).finish_non_exhaustive(),
            Expr::AndCode(_) => write!(f, "AndCode(..)"),
            Expr::NotCode(_) => write!(f, "NotCode(..)"),
            Expr::StateCode(_) => write!(f, "StateCode(..)"),
            Expr::Recovery {
                expr,
                fallback,
                labels,
            } => f
                .debug_struct("Recovery")
                .field("expr", expr)
                .field("fallback", fallback)
                .field("labels", labels)
                .finish(),
            Expr::Throw(label) => f.debug_tuple("Throw").field(label).finish(),
        }
    }
}

/// A named grammar rule.
#[derive(Debug, Clone)]
pub struct Rule<N> {
    pub name: String,
    pub expr: Expr<N>,
}

/// An immutable table of named rules.
///
/// The first rule added is the default entry point.
#[derive(Debug, Clone)]
pub struct Grammar<N> {
    rules: Vec<Rule<N>>,
    index: HashMap<String, usize>,
}

impl<N> Default for Grammar<N> {
    fn default() -> Self {
        Grammar {
            rules: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<N> Grammar<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule, replacing any earlier rule with the same name.
    pub fn with_rule(mut self, name: impl Into<String>, expr: Expr<N>) -> Self {
        self.add_rule(name, expr);
        self
    }

    pub fn add_rule(&mut self, name: impl Into<String>, expr: Expr<N>) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&slot) => {
                tracing::warn!(rule = %name, "replacing duplicate rule definition");
                self.rules[slot].expr = expr;
            }
            None => {
                self.index.insert(name.clone(), self.rules.len());
                self.rules.push(Rule { name, expr });
            }
        }
    }

    pub fn rule(&self, name: &str) -> Option<&Rule<N>> {
        self.index.get(name).map(|&slot| &self.rules[slot])
    }

    pub fn first_rule(&self) -> Option<&Rule<N>> {
        self.rules.first()
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule<N>> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule names referenced somewhere in the grammar but never defined,
    /// sorted and deduplicated.
    pub fn undefined_references(&self) -> Vec<String> {
        let mut missing = Vec::new();
        for rule in &self.rules {
            rule.expr.walk(&mut |expr| {
                if let Expr::RuleRef(name) = expr {
                    if !self.index.contains_key(name.as_str()) {
                        missing.push(name.clone());
                    }
                }
            });
        }
        missing.sort();
        missing.dedup();
        missing
    }
}
