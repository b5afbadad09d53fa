//! Farthest-failure bookkeeping.
//!
//! Every atomic match reports its outcome here. Outside a negative lookahead
//! only mismatches count; inside one the roles flip and successful matches
//! are recorded as `!<expected>`, since that is what the lookahead rejected.

use crate::position::Position;
use serde::Serialize;

/// Description reported for "end of input".
pub const END_OF_INPUT: &str = "EOF";

const NOT_ANY: &str = "!.";

#[derive(Debug, Clone, Default)]
pub struct FailureTracker {
    position: Option<Position>,
    rule: Option<String>,
    expected: Vec<String>,
    inverted: bool,
}

impl FailureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of an atomic match that started at `position`.
    pub fn record(&mut self, matched: bool, position: Position, want: &str, rule: Option<&str>) {
        if matched != self.inverted {
            return;
        }
        match self.position {
            Some(farthest) if position.offset < farthest.offset => return,
            Some(farthest) if position.offset == farthest.offset => {}
            _ => {
                self.position = Some(position);
                self.rule = rule.map(str::to_string);
                self.expected.clear();
            }
        }
        if self.inverted {
            self.expected.push(format!("!{want}"));
        } else {
            self.expected.push(want.to_string());
        }
    }

    /// Enter or leave a negative lookahead.
    pub fn invert(&mut self) {
        self.inverted = !self.inverted;
    }

    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Farthest recorded position, if any failure was recorded.
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn farthest(&self) -> Option<Farthest> {
        let position = self.position?;
        Some(Farthest {
            position,
            rule: self.rule.clone(),
            expected: normalize_expected(&self.expected),
        })
    }
}

/// Snapshot of the farthest failure of a parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Farthest {
    pub position: Position,
    /// Rule active when the position was first reached
    pub rule: Option<String>,
    /// Sorted, deduplicated descriptions, with `EOF` last when present
    pub expected: Vec<String>,
}

/// Deduplicate and sort expectations, moving end-of-input to the back.
pub fn normalize_expected(expected: &[String]) -> Vec<String> {
    let mut out: Vec<String> = expected.to_vec();
    out.sort();
    out.dedup();
    let eof = out.iter().any(|want| want == NOT_ANY);
    if eof {
        out.retain(|want| want != NOT_ANY);
        out.push(END_OF_INPUT.to_string());
    }
    out
}

/// Join items as `a, b or c`.
pub fn list_join(items: &[String], separator: &str, last: &str) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [init @ .., tail] => format!("{} {} {}", init.join(separator), last, tail),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(offset: usize) -> Position {
        Position {
            offset,
            line: 1,
            column: offset + 1,
        }
    }

    #[test]
    fn test_farther_resets_equal_appends_nearer_ignored() {
        let mut tracker = FailureTracker::new();
        tracker.record(false, at(2), "\"a\"", Some("A"));
        tracker.record(false, at(2), "\"b\"", Some("B"));
        tracker.record(false, at(1), "\"c\"", Some("C"));
        let farthest = tracker.farthest().unwrap();
        assert_eq!(farthest.position.offset, 2);
        assert_eq!(farthest.rule.as_deref(), Some("A"));
        assert_eq!(farthest.expected, vec!["\"a\"", "\"b\""]);

        tracker.record(false, at(5), "\"d\"", None);
        let farthest = tracker.farthest().unwrap();
        assert_eq!(farthest.position.offset, 5);
        assert_eq!(farthest.expected, vec!["\"d\""]);
    }

    #[test]
    fn test_successes_ignored_outside_lookahead() {
        let mut tracker = FailureTracker::new();
        tracker.record(true, at(3), "\"x\"", None);
        assert!(tracker.farthest().is_none());
    }

    #[test]
    fn test_inverted_records_successes() {
        let mut tracker = FailureTracker::new();
        tracker.invert();
        tracker.record(false, at(0), "\"x\"", None);
        tracker.record(true, at(0), ".", None);
        tracker.invert();
        assert!(!tracker.is_inverted());
        assert_eq!(tracker.farthest().unwrap().expected, vec!["EOF"]);
    }

    #[test]
    fn test_normalize_expected() {
        let raw: Vec<String> = ["\"b\"", "!.", "\"a\"", "\"b\"", "[0-9]"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            normalize_expected(&raw),
            vec!["\"a\"", "\"b\"", "[0-9]", "EOF"]
        );
    }

    #[test]
    fn test_list_join() {
        let items: Vec<String> = vec!["a".into(), "b".into(), "c".into()];
        assert_eq!(list_join(&items, ", ", "or"), "a, b or c");
        assert_eq!(list_join(&items[..1], ", ", "or"), "a");
        assert_eq!(list_join(&items[..2], ", ", "or"), "a or b");
        assert_eq!(list_join(&[], ", ", "or"), "");
    }
}
