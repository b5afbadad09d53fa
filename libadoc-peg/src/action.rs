use crate::position::Position;
use crate::value::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Backtracked semantic state.
///
/// A persistent map: snapshots taken before every attempt are O(1) and
/// never alias the live copy, so a failed branch cannot leak writes.
pub type State = im::HashMap<String, serde_json::Value>;

/// Caller-owned store that is never rolled back.
pub type GlobalStore = BTreeMap<String, serde_json::Value>;

/// Everything a semantic action or predicate can see.
pub struct ActionContext<'s, N> {
    text: Cow<'s, str>,
    position: Position,
    rule: Option<&'s str>,
    value: Value<N>,
    captures: &'s [(String, Value<N>)],
    state: &'s mut State,
    global: &'s mut GlobalStore,
}

impl<'s, N> ActionContext<'s, N> {
    pub(crate) fn new(
        text: Cow<'s, str>,
        position: Position,
        rule: Option<&'s str>,
        value: Value<N>,
        captures: &'s [(String, Value<N>)],
        state: &'s mut State,
        global: &'s mut GlobalStore,
    ) -> Self {
        ActionContext {
            text,
            position,
            rule,
            value,
            captures,
            state,
            global,
        }
    }

    /// Matched input text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Start of the match.
    pub fn position(&self) -> Position {
        self.position
    }

    /// Innermost rule being evaluated.
    pub fn rule(&self) -> Option<&str> {
        self.rule
    }

    /// Value produced by the expression the action wraps.
    pub fn value(&self) -> &Value<N> {
        &self.value
    }

    pub fn take_value(&mut self) -> Value<N> {
        std::mem::replace(&mut self.value, Value::Absent)
    }

    /// Most recent binding of `label` in the current rule.
    pub fn get(&self, label: &str) -> Option<&Value<N>> {
        self.captures
            .iter()
            .rev()
            .find(|(name, _)| name == label)
            .map(|(_, value)| value)
    }

    pub fn has(&self, label: &str) -> bool {
        self.get(label).is_some_and(|value| !value.is_absent())
    }

    pub fn state(&self) -> &State {
        &*self.state
    }

    pub fn state_mut(&mut self) -> &mut State {
        &mut *self.state
    }

    pub fn global(&self) -> &GlobalStore {
        &*self.global
    }

    pub fn global_mut(&mut self) -> &mut GlobalStore {
        &mut *self.global
    }
}

impl<N: Clone> ActionContext<'_, N> {
    /// Owned copy of a capture, `Absent` when the label is unbound.
    pub fn capture(&self, label: &str) -> Value<N> {
        self.get(label).cloned().unwrap_or(Value::Absent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_binding_wins() {
        let captures = vec![
            ("a".to_string(), Value::<()>::from("first")),
            ("b".to_string(), Value::Absent),
            ("a".to_string(), Value::from("second")),
        ];
        let mut state = State::new();
        let mut global = GlobalStore::new();
        let ctx = ActionContext::new(
            Cow::Borrowed("text"),
            Position::default(),
            Some("Rule"),
            Value::Absent,
            &captures,
            &mut state,
            &mut global,
        );
        assert_eq!(ctx.get("a").and_then(Value::as_text), Some("second"));
        assert!(!ctx.has("b"));
        assert!(ctx.capture("missing").is_absent());
        assert_eq!(ctx.text(), "text");
        assert_eq!(ctx.rule(), Some("Rule"));
    }
}
