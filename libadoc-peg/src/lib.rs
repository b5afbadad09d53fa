//! # libadoc-peg
//!
//! A packrat PEG interpreter. Grammars are plain Rust data (a table of named
//! [`Rule`]s, each an [`Expr`] tree) that the interpreter walks directly;
//! nothing is generated ahead of time.
//!
//! ## Features
//!
//! - **Ordered choice with full backtracking**: a failed attempt restores the
//!   cursor, the semantic [`State`] and the capture scope exactly
//! - **Packrat memoization**: optional, caches rule calls by position and
//!   semantic state, changes running time but never results
//! - **Capture scopes**: labels bound inside a rule are visible to that rule's
//!   semantic actions and nowhere else
//! - **Farthest-failure diagnostics**: a failed parse reports the deepest
//!   position reached and the sorted set of tokens expected there
//! - **Budgets**: an optional cap on evaluated expressions aborts runaway parses
//!
//! ## Example
//!
//! ```
//! use libadoc_peg::dsl::*;
//! use libadoc_peg::{Grammar, ParseOptions, Value};
//!
//! let grammar: Grammar<u32> = Grammar::new().with_rule(
//!     "Number",
//!     action(plus(class("", &[('0', '9')])), |ctx| {
//!         ctx.text()
//!             .parse::<u32>()
//!             .map(Value::Node)
//!             .map_err(|err| libadoc_peg::ActionError::new(err.to_string()))
//!     }),
//! );
//!
//! let output = grammar.parse("42", &ParseOptions::default()).unwrap();
//! assert_eq!(output.value, Value::Node(42));
//!
//! let err = grammar.parse("x", &ParseOptions::default()).unwrap_err();
//! assert_eq!(err.to_string(), "1:1 (0): rule Number: no match found, expected: [0-9]");
//! ```

pub mod action;
pub mod dsl;
pub mod error;
pub mod expr;
pub mod failure;
pub mod memo;
pub mod options;
pub mod position;
mod scope;
pub mod session;
pub mod stats;
pub mod value;

pub use action::{ActionContext, GlobalStore, State};
pub use error::{ActionError, ErrorContext, PegError, Result};
pub use expr::{ActionFn, CharClass, Expr, Grammar, Literal, PredicateFn, Rule, StateFn};
pub use failure::{Farthest, FailureTracker};
pub use options::{OptionsError, ParseOptions};
pub use position::{Cursor, Position, Savepoint};
pub use session::{parse, ParseOutput};
pub use stats::ParseStats;
pub use value::Value;
