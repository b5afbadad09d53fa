use crate::failure::list_join;
use crate::position::Position;
use std::fmt;

/// Errors that end a parse
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PegError {
    #[error("{}: no match found, expected: {}", located(.position, .rule), list_join(.expected, ", ", "or"))]
    NoMatch {
        position: Position,
        rule: Option<String>,
        expected: Vec<String>,
    },

    #[error("{}: {message}", located(.position, .rule))]
    Action {
        position: Position,
        rule: Option<String>,
        message: String,
    },

    #[error("{position}: invalid encoding")]
    InvalidEncoding { position: Position },

    #[error("{position}: max number of expressions parsed ({limit})")]
    ExpressionLimit { position: Position, limit: u64 },

    #[error("{position}: undefined rule: {name}")]
    UndefinedRule { position: Position, name: String },

    #[error("invalid entrypoint: {0}")]
    InvalidEntrypoint(String),

    #[error("grammar has no rules")]
    EmptyGrammar,

    #[error("{}", join_errors(.0))]
    Multiple(Vec<PegError>),
}

pub type Result<T> = std::result::Result<T, PegError>;

fn located(position: &Position, rule: &Option<String>) -> String {
    match rule {
        Some(rule) => format!("{position}: rule {rule}"),
        None => position.to_string(),
    }
}

fn join_errors(errors: &[PegError]) -> String {
    errors
        .iter()
        .map(PegError::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

impl PegError {
    pub fn position(&self) -> Option<Position> {
        match self {
            PegError::NoMatch { position, .. }
            | PegError::Action { position, .. }
            | PegError::InvalidEncoding { position }
            | PegError::ExpressionLimit { position, .. }
            | PegError::UndefinedRule { position, .. } => Some(*position),
            PegError::Multiple(errors) => errors.first().and_then(PegError::position),
            PegError::InvalidEntrypoint(_) | PegError::EmptyGrammar => None,
        }
    }

    /// Expected-token descriptions of a no-match error, empty otherwise.
    pub fn expected(&self) -> &[String] {
        match self {
            PegError::NoMatch { expected, .. } => expected,
            _ => &[],
        }
    }

    /// The individual errors, flattening [`PegError::Multiple`].
    pub fn errors(&self) -> Vec<&PegError> {
        match self {
            PegError::Multiple(errors) => errors.iter().flat_map(PegError::errors).collect(),
            other => vec![other],
        }
    }

    /// Collapse recorded errors: duplicates removed, a single error unwrapped.
    pub(crate) fn aggregate(errors: Vec<PegError>) -> PegError {
        let mut seen = Vec::new();
        let mut unique = Vec::new();
        for error in errors {
            let message = error.to_string();
            if !seen.contains(&message) {
                seen.push(message);
                unique.push(error);
            }
        }
        if unique.len() == 1 {
            unique.remove(0)
        } else {
            PegError::Multiple(unique)
        }
    }
}

/// Error returned by semantic actions and predicates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ActionError {
    message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        ActionError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Display context for better error messages
pub struct ErrorContext<'a> {
    pub source: &'a str,
    pub error: &'a PegError,
}

impl<'a> ErrorContext<'a> {
    pub fn new(source: &'a str, error: &'a PegError) -> Self {
        Self { source, error }
    }

    /// Get the source line containing the error
    pub fn source_line(&self) -> Option<&'a str> {
        let start = self.offset()?;

        let line_start = self.source[..start]
            .rfind('\n')
            .map(|pos| pos + 1)
            .unwrap_or(0);

        let line_end = self.source[start..]
            .find('\n')
            .map(|pos| start + pos)
            .unwrap_or(self.source.len());

        Some(&self.source[line_start..line_end])
    }

    /// Get line and column numbers (1-indexed, columns counted in characters)
    pub fn line_col(&self) -> Option<(usize, usize)> {
        let start = self.offset()?;

        let line = self.source[..start].matches('\n').count() + 1;
        let line_start = self.source[..start]
            .rfind('\n')
            .map(|pos| pos + 1)
            .unwrap_or(0);
        let col = self.source[line_start..start].chars().count() + 1;

        Some((line, col))
    }

    fn offset(&self) -> Option<usize> {
        let offset = self.error.position()?.offset.min(self.source.len());
        self.source.is_char_boundary(offset).then_some(offset)
    }
}

impl<'a> fmt::Display for ErrorContext<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let PegError::Multiple(errors) = self.error {
            for error in errors {
                write!(f, "{}", ErrorContext::new(self.source, error))?;
            }
            return Ok(());
        }

        let Some((line, col)) = self.line_col() else {
            return writeln!(f, "Error: {}", self.error);
        };
        writeln!(f, "Error at line {}, column {}:", line, col)?;
        writeln!(f, "  {}", self.error)?;

        if let Some(source_line) = self.source_line() {
            writeln!(f)?;
            writeln!(f, "  {}", source_line)?;
            let indicator = " ".repeat(col - 1) + "^";
            writeln!(f, "  {}", indicator)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(offset: usize, line: usize, column: usize) -> Position {
        Position {
            offset,
            line,
            column,
        }
    }

    #[test]
    fn test_no_match_message() {
        let error = PegError::NoMatch {
            position: at(4, 1, 5),
            rule: Some("Greeting".to_string()),
            expected: vec!["\"a\"".into(), "[0-9]".into(), "EOF".into()],
        };
        assert_eq!(
            error.to_string(),
            "1:5 (4): rule Greeting: no match found, expected: \"a\", [0-9] or EOF"
        );
        assert_eq!(error.expected().len(), 3);
    }

    #[test]
    fn test_action_message_without_rule() {
        let error = PegError::Action {
            position: at(0, 1, 1),
            rule: None,
            message: "bad shape".to_string(),
        };
        assert_eq!(error.to_string(), "1:1 (0): bad shape");
    }

    #[test]
    fn test_aggregate_dedupes() {
        let error = PegError::Action {
            position: at(0, 1, 1),
            rule: None,
            message: "boom".to_string(),
        };
        let single = PegError::aggregate(vec![error.clone(), error.clone()]);
        assert_eq!(single, error);

        let other = PegError::InvalidEncoding {
            position: at(2, 1, 3),
        };
        let multiple = PegError::aggregate(vec![error.clone(), other.clone(), error]);
        assert_eq!(multiple.errors().len(), 2);
        assert_eq!(multiple.position(), Some(at(0, 1, 1)));
    }

    #[test]
    fn test_error_context_points_at_column() {
        let source = "first\nsecXnd\n";
        let error = PegError::NoMatch {
            position: at(9, 2, 4),
            rule: None,
            expected: vec!["\"o\"".into()],
        };
        let context = ErrorContext::new(source, &error);
        assert_eq!(context.line_col(), Some((2, 4)));
        assert_eq!(context.source_line(), Some("secXnd"));
        insta::assert_snapshot!(context.to_string(), @r###"
        Error at line 2, column 4:
          2:4 (9): no match found, expected: "o"

          secXnd
             ^
        "###);
    }

    #[test]
    fn test_error_context_without_position() {
        let error = PegError::InvalidEntrypoint("Nope".to_string());
        let context = ErrorContext::new("", &error);
        assert_eq!(context.to_string(), "Error: invalid entrypoint: Nope\n");
    }
}
