//! The backtracking interpreter.
//!
//! One [`Session`] owns all mutable parse data: the cursor, capture scopes,
//! semantic state, memo table and diagnostics. The grammar is only borrowed,
//! so any number of sessions may share it across threads.
//!
//! Every evaluation goes through [`Session::eval`], which snapshots the
//! cursor, the semantic state and the current scope's bindings, and restores
//! all three when the expression does not match. Individual expression kinds
//! therefore never have to undo partial progress themselves.

use crate::action::{ActionContext, GlobalStore, State};
use crate::error::{ActionError, PegError};
use crate::expr::{fold_case, ActionFn, CharClass, Expr, Grammar, Literal, PredicateFn, StateFn};
use crate::failure::{Farthest, FailureTracker};
use crate::memo::{MemoEntry, MemoKey, MemoTable};
use crate::options::ParseOptions;
use crate::position::{Cursor, Position};
use crate::scope::CaptureStack;
use crate::stats::ParseStats;
use crate::value::Value;
use tracing::{debug, trace};

type Eval<N> = Result<Option<Value<N>>, PegError>;

/// Result of a successful parse.
#[derive(Debug, Clone)]
pub struct ParseOutput<N> {
    /// Value produced by the entry rule
    pub value: Value<N>,
    pub stats: ParseStats,
    /// Farthest failure seen along the way, if any
    pub farthest: Option<Farthest>,
    /// Global store as the parse left it
    pub global: GlobalStore,
}

/// Parse `input` starting at rule `entry`.
pub fn parse<N: Clone>(
    grammar: &Grammar<N>,
    entry: &str,
    input: impl AsRef<[u8]>,
    options: &ParseOptions,
) -> Result<ParseOutput<N>, PegError> {
    let input = input.as_ref();
    if grammar.is_empty() {
        return Err(PegError::EmptyGrammar);
    }
    if grammar.rule(entry).is_none() {
        return Err(PegError::InvalidEntrypoint(entry.to_string()));
    }
    if !options.allow_invalid_utf8 {
        if let Err(err) = std::str::from_utf8(input) {
            return Err(PegError::InvalidEncoding {
                position: Position::locate(input, err.valid_up_to()),
            });
        }
    }

    debug!(
        entry,
        bytes = input.len(),
        memoize = options.memoize,
        "starting parse"
    );
    let mut session = Session::new(grammar, input, options);
    let outcome = session.call_rule(entry);
    session.finish(outcome)
}

impl<N: Clone> Grammar<N> {
    /// Parse from `options.entrypoint`, or from the first rule when unset.
    pub fn parse(
        &self,
        input: impl AsRef<[u8]>,
        options: &ParseOptions,
    ) -> Result<ParseOutput<N>, PegError> {
        let entry = match (&options.entrypoint, self.first_rule()) {
            (Some(entry), _) => entry.as_str(),
            (None, Some(first)) => first.name.as_str(),
            (None, None) => return Err(PegError::EmptyGrammar),
        };
        parse(self, entry, input, options)
    }
}

struct RecoveryFrame<'g, N> {
    labels: &'g [String],
    fallback: &'g Expr<N>,
}

impl<N> Clone for RecoveryFrame<'_, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<N> Copy for RecoveryFrame<'_, N> {}

pub(crate) struct Session<'g, 'i, N> {
    grammar: &'g Grammar<N>,
    cursor: Cursor<'i>,
    captures: CaptureStack<N>,
    rules: Vec<&'g str>,
    state: State,
    global: GlobalStore,
    memo: Option<MemoTable<N>>,
    failures: FailureTracker,
    recovery: Vec<RecoveryFrame<'g, N>>,
    errors: Vec<PegError>,
    stats: ParseStats,
    max_expressions: Option<u64>,
}

impl<'g, 'i, N: Clone> Session<'g, 'i, N> {
    pub fn new(grammar: &'g Grammar<N>, input: &'i [u8], options: &ParseOptions) -> Self {
        Session {
            grammar,
            cursor: Cursor::new(input),
            captures: CaptureStack::new(),
            rules: Vec::new(),
            state: options
                .initial_state
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            global: options.global_store.clone(),
            memo: options.memoize.then(MemoTable::new),
            failures: FailureTracker::new(),
            recovery: Vec::new(),
            errors: Vec::new(),
            stats: ParseStats::new(),
            max_expressions: options.max_expressions,
        }
    }

    fn finish(self, outcome: Eval<N>) -> Result<ParseOutput<N>, PegError> {
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(err) => {
                debug!(error = %err, expressions = self.stats.expressions, "parse aborted");
                return Err(err);
            }
        };
        debug!(
            matched = outcome.is_some(),
            expressions = self.stats.expressions,
            memo_hits = self.stats.memo_hits,
            action_errors = self.errors.len(),
            "parse finished"
        );
        let farthest = self.failures.farthest();

        if !self.errors.is_empty() {
            return Err(PegError::aggregate(self.errors));
        }
        match outcome {
            Some(value) => Ok(ParseOutput {
                value,
                stats: self.stats,
                farthest,
                global: self.global,
            }),
            None => {
                let farthest = farthest.unwrap_or_else(|| Farthest {
                    position: self.cursor.position(),
                    rule: None,
                    expected: Vec::new(),
                });
                Err(PegError::NoMatch {
                    position: farthest.position,
                    rule: farthest.rule,
                    expected: farthest.expected,
                })
            }
        }
    }

    fn current_rule(&self) -> Option<&'g str> {
        self.rules.last().copied()
    }

    fn fail_at(&mut self, matched: bool, start: Position, want: &str) {
        let rule = self.current_rule();
        self.failures.record(matched, start, want, rule);
    }

    /// Evaluate `expr` at the cursor. `Ok(None)` is an ordinary mismatch,
    /// after which cursor, state and bindings are exactly as before.
    fn eval(&mut self, expr: &'g Expr<N>) -> Eval<N> {
        let count = self.stats.record_expression();
        if let Some(limit) = self.max_expressions {
            if count > limit {
                return Err(PegError::ExpressionLimit {
                    position: self.cursor.position(),
                    limit,
                });
            }
        }

        let start = self.cursor.savepoint();
        let state = self.state.clone();
        let mark = self.captures.mark();

        let result = self.eval_kind(expr)?;
        if result.is_none() {
            self.cursor.restore(start);
            self.state = state;
            self.captures.truncate(mark);
        }
        Ok(result)
    }

    // Every arm is a single call so that this frame stays small: the
    // interpreter recurses once per nested expression.
    fn eval_kind(&mut self, expr: &'g Expr<N>) -> Eval<N> {
        match expr {
            Expr::Literal(literal) => self.match_literal(literal),
            Expr::Class(class) => self.match_class(class),
            Expr::Any => self.match_any(),
            Expr::Sequence(children) => self.eval_sequence(children),
            Expr::Choice(alternatives) => self.eval_choice(alternatives),
            Expr::Labeled(label, child) => self.eval_labeled(label, child),
            Expr::ZeroOrOne(child) => self.eval_optional(child),
            Expr::ZeroOrMore(child) => self.repeat(child, false),
            Expr::OneOrMore(child) => self.repeat(child, true),
            Expr::And(child) => self.eval_and(child),
            Expr::Not(child) => self.eval_not(child),
            Expr::RuleRef(name) => self.call_rule(name),
            Expr::Action(child, run) => self.run_action(child, run),
            Expr::AndCode(predicate) => self.check(predicate, true),
            Expr::NotCode(predicate) => self.check(predicate, false),
            Expr::StateCode(run) => self.run_state_code(run),
            Expr::Recovery {
                expr,
                fallback,
                labels,
            } => self.eval_recovery(expr, fallback, labels),
            Expr::Throw(label) => self.eval_throw(label),
        }
    }

    #[inline(never)]
    fn eval_sequence(&mut self, children: &'g [Expr<N>]) -> Eval<N> {
        let mut values = Vec::with_capacity(children.len());
        for child in children {
            match self.eval(child)? {
                Some(value) => values.push(value),
                None => return Ok(None),
            }
        }
        Ok(Some(Value::List(values)))
    }

    #[inline(never)]
    fn eval_choice(&mut self, alternatives: &'g [Expr<N>]) -> Eval<N> {
        for (index, alternative) in alternatives.iter().enumerate() {
            if let Some(value) = self.eval(alternative)? {
                self.record_choice(Some(index));
                return Ok(Some(value));
            }
        }
        self.record_choice(None);
        Ok(None)
    }

    #[inline(never)]
    fn eval_labeled(&mut self, label: &str, child: &'g Expr<N>) -> Eval<N> {
        let value = self.eval(child)?;
        if let Some(value) = &value {
            self.captures.bind(label, value.clone());
        }
        Ok(value)
    }

    #[inline(never)]
    fn eval_optional(&mut self, child: &'g Expr<N>) -> Eval<N> {
        Ok(Some(self.eval(child)?.unwrap_or(Value::Absent)))
    }

    #[inline(never)]
    fn eval_and(&mut self, child: &'g Expr<N>) -> Eval<N> {
        let matched = self.lookahead(child)?;
        Ok(matched.then_some(Value::Absent))
    }

    #[inline(never)]
    fn eval_not(&mut self, child: &'g Expr<N>) -> Eval<N> {
        self.failures.invert();
        let matched = self.lookahead(child);
        self.failures.invert();
        Ok((!matched?).then_some(Value::Absent))
    }

    #[inline(never)]
    fn run_action(&mut self, child: &'g Expr<N>, run: &ActionFn<N>) -> Eval<N> {
        let start = self.cursor.savepoint();
        let Some(value) = self.eval(child)? else {
            return Ok(None);
        };
        let rule = self.current_rule();
        let mut ctx = ActionContext::new(
            self.cursor.text_from(&start),
            start.position,
            rule,
            value,
            self.captures.current(),
            &mut self.state,
            &mut self.global,
        );
        let outcome = run(&mut ctx);
        drop(ctx);
        match outcome {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                self.record_action_error(start.position, err);
                Ok(None)
            }
        }
    }

    #[inline(never)]
    fn run_state_code(&mut self, run: &StateFn<N>) -> Eval<N> {
        let start = self.cursor.savepoint();
        let rule = self.current_rule();
        let mut ctx = ActionContext::new(
            self.cursor.text_from(&start),
            start.position,
            rule,
            Value::Absent,
            self.captures.current(),
            &mut self.state,
            &mut self.global,
        );
        let outcome = run(&mut ctx);
        drop(ctx);
        if let Err(err) = outcome {
            self.record_action_error(start.position, err);
        }
        Ok(Some(Value::Absent))
    }

    #[inline(never)]
    fn eval_recovery(
        &mut self,
        expr: &'g Expr<N>,
        fallback: &'g Expr<N>,
        labels: &'g [String],
    ) -> Eval<N> {
        self.recovery.push(RecoveryFrame { labels, fallback });
        let result = self.eval(expr);
        self.recovery.pop();
        result
    }

    #[inline(never)]
    fn eval_throw(&mut self, label: &str) -> Eval<N> {
        for depth in (0..self.recovery.len()).rev() {
            let frame = self.recovery[depth];
            if !frame.labels.iter().any(|registered| registered == label) {
                continue;
            }
            if let Some(value) = self.eval(frame.fallback)? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Invoke a rule in a fresh capture scope.
    ///
    /// Rule calls are the memoization boundary. A rule's expression only
    /// sees the labels it binds itself, so its outcome depends on nothing
    /// but the offset and the semantic state. Results of expressions inside
    /// a rule may depend on earlier bindings and are never cached.
    #[inline(never)]
    fn call_rule(&mut self, name: &str) -> Eval<N> {
        let grammar = self.grammar;
        let Some(rule) = grammar.rule(name) else {
            return Err(PegError::UndefinedRule {
                position: self.cursor.position(),
                name: name.to_string(),
            });
        };

        let key = self.memo_key(&rule.expr);
        if let Some(key) = &key {
            if let Some(replayed) = self.replay(key) {
                return Ok(replayed);
            }
        }
        let state_before = key.as_ref().map(|_| self.state.clone());

        let start = self.cursor.offset();
        self.rules.push(rule.name.as_str());
        self.captures.push();
        let result = self.eval(&rule.expr);
        self.captures.pop();
        self.rules.pop();

        let result = result?;
        self.finish_rule(&rule.name, start, key.zip(state_before), &result);
        Ok(result)
    }

    #[inline(never)]
    fn finish_rule(
        &mut self,
        name: &str,
        start: usize,
        memo: Option<(MemoKey, State)>,
        result: &Option<Value<N>>,
    ) {
        if result.is_some() {
            trace!(rule = name, start, end = self.cursor.offset(), "matched");
        } else {
            trace!(rule = name, start, "failed");
        }

        let Some((key, state_before)) = memo else {
            return;
        };
        let entry = MemoEntry {
            value: result.clone(),
            end: self.cursor.savepoint(),
            state_before,
            state_after: self.state.clone(),
        };
        if let Some(memo) = self.memo.as_mut() {
            memo.insert(key, entry);
        }
    }

    fn memo_key(&self, expr: &Expr<N>) -> Option<MemoKey> {
        // Recovery registrations change what Throw does, so results computed
        // under them are not reusable.
        if self.memo.is_none() || !self.recovery.is_empty() {
            return None;
        }
        Some(MemoKey {
            offset: self.cursor.offset(),
            node: expr.id(),
            inverted: self.failures.is_inverted(),
        })
    }

    fn replay(&mut self, key: &MemoKey) -> Option<Option<Value<N>>> {
        let memo = self.memo.as_ref()?;
        let entry = memo.get(key).filter(|entry| entry.is_valid_for(&self.state));
        let Some(entry) = entry else {
            self.stats.record_miss();
            return None;
        };
        self.cursor.restore(entry.end);
        self.state = entry.state_after.clone();
        let value = entry.value.clone();
        self.stats.record_hit();
        Some(value)
    }

    #[inline(never)]
    fn repeat(&mut self, child: &'g Expr<N>, at_least_one: bool) -> Eval<N> {
        let mut values = Vec::new();
        loop {
            let before = self.cursor.offset();
            match self.eval(child)? {
                Some(value) => values.push(value),
                None => break,
            }
            // An empty match would repeat forever.
            if self.cursor.offset() == before {
                break;
            }
        }
        if at_least_one && values.is_empty() {
            return Ok(None);
        }
        Ok(Some(Value::List(values)))
    }

    /// Evaluate `child` for its outcome only.
    fn lookahead(&mut self, child: &'g Expr<N>) -> Result<bool, PegError> {
        let start = self.cursor.savepoint();
        let state = self.state.clone();
        let mark = self.captures.mark();
        let matched = self.eval(child)?.is_some();
        self.cursor.restore(start);
        self.state = state;
        self.captures.truncate(mark);
        Ok(matched)
    }

    /// Run a predicate; its state writes are discarded. The expression
    /// matches when the predicate's answer equals `want`.
    #[inline(never)]
    fn check(&mut self, predicate: &PredicateFn<N>, want: bool) -> Eval<N> {
        let start = self.cursor.savepoint();
        let saved = self.state.clone();
        let rule = self.current_rule();
        let mut ctx = ActionContext::new(
            self.cursor.text_from(&start),
            start.position,
            rule,
            Value::Absent,
            self.captures.current(),
            &mut self.state,
            &mut self.global,
        );
        let outcome = predicate(&mut ctx);
        drop(ctx);
        self.state = saved;
        let holds = match outcome {
            Ok(holds) => holds,
            Err(err) => {
                self.record_action_error(start.position, err);
                false
            }
        };
        Ok((holds == want).then_some(Value::Absent))
    }

    fn record_action_error(&mut self, position: Position, err: ActionError) {
        let rule = self.current_rule().map(str::to_string);
        debug!(rule = ?rule, %position, error = %err, "semantic action failed");
        self.errors.push(PegError::Action {
            position,
            rule,
            message: err.to_string(),
        });
    }

    fn record_choice(&mut self, alternative: Option<usize>) {
        if let Some(rule) = self.current_rule() {
            self.stats.record_choice(rule, alternative);
        }
    }

    #[inline(never)]
    fn match_literal(&mut self, literal: &Literal) -> Eval<N> {
        let start = self.cursor.savepoint();
        for want in literal.text().chars() {
            let current = match self.cursor.current() {
                Some(ch) if literal.ignore_case() => Some(fold_case(ch)),
                other => other,
            };
            if current != Some(want) {
                self.fail_at(false, start.position, literal.description());
                self.cursor.restore(start);
                return Ok(None);
            }
            self.cursor.advance();
        }
        self.fail_at(true, start.position, literal.description());
        Ok(Some(Value::Text(self.cursor.text_from(&start).into_owned())))
    }

    #[inline(never)]
    fn match_class(&mut self, class: &CharClass) -> Eval<N> {
        let start = self.cursor.savepoint();
        match self.cursor.current() {
            Some(ch) if class.matches(ch) => {
                self.cursor.advance();
                self.fail_at(true, start.position, class.description());
                Ok(Some(Value::Text(self.cursor.text_from(&start).into_owned())))
            }
            _ => {
                self.fail_at(false, start.position, class.description());
                Ok(None)
            }
        }
    }

    #[inline(never)]
    fn match_any(&mut self) -> Eval<N> {
        let start = self.cursor.savepoint();
        if self.cursor.at_end() {
            self.fail_at(false, start.position, ".");
            return Ok(None);
        }
        self.cursor.advance();
        self.fail_at(true, start.position, ".");
        Ok(Some(Value::Text(self.cursor.text_from(&start).into_owned())))
    }
}
