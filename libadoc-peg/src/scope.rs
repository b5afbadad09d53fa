//! Capture scopes, one per active rule invocation.

use crate::value::Value;

pub(crate) type Binding<N> = (String, Value<N>);

#[derive(Debug)]
pub(crate) struct CaptureStack<N> {
    scopes: Vec<Vec<Binding<N>>>,
}

impl<N> CaptureStack<N> {
    /// A stack holding a single root scope.
    pub fn new() -> Self {
        CaptureStack {
            scopes: vec![Vec::new()],
        }
    }

    pub fn push(&mut self) {
        self.scopes.push(Vec::new());
    }

    /// Discard the innermost scope. The root scope is never removed.
    pub fn pop(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn bind(&mut self, label: &str, value: Value<N>) {
        self.top_mut().push((label.to_string(), value));
    }

    /// Number of bindings in the innermost scope, for later rollback.
    pub fn mark(&self) -> usize {
        self.current().len()
    }

    pub fn truncate(&mut self, mark: usize) {
        self.top_mut().truncate(mark);
    }

    pub fn current(&self) -> &[Binding<N>] {
        self.scopes.last().map(Vec::as_slice).unwrap_or(&[])
    }

    fn top_mut(&mut self) -> &mut Vec<Binding<N>> {
        if self.scopes.is_empty() {
            self.scopes.push(Vec::new());
        }
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scopes_do_not_leak_into_parent() {
        let mut stack = CaptureStack::<()>::new();
        stack.bind("outer", Value::from("x"));
        stack.push();
        assert!(stack.current().is_empty());
        stack.bind("inner", Value::from("y"));
        assert_eq!(stack.current().len(), 1);
        assert_eq!(stack.current()[0].0, "inner");
        stack.pop();
        assert_eq!(stack.current().len(), 1);
        assert_eq!(stack.current()[0].0, "outer");
    }

    #[test]
    fn test_truncate_rolls_back_bindings() {
        let mut stack = CaptureStack::<()>::new();
        stack.bind("a", Value::Absent);
        let mark = stack.mark();
        stack.bind("b", Value::Absent);
        stack.bind("c", Value::Absent);
        assert_eq!(stack.mark(), 3);
        stack.truncate(mark);
        assert_eq!(stack.mark(), 1);
        assert_eq!(stack.current()[0].0, "a");
    }

    #[test]
    fn test_root_scope_survives_pop() {
        let mut stack = CaptureStack::<()>::new();
        stack.bind("root", Value::Absent);
        stack.pop();
        stack.pop();
        assert_eq!(stack.current()[0].0, "root");
        stack.bind("a", Value::Absent);
        assert_eq!(stack.mark(), 2);
    }
}
