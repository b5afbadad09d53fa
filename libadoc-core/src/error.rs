use libadoc_peg::PegError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdocError {
    #[error(transparent)]
    Parse(#[from] PegError),

    #[error("expected the parse to produce {expected}, found {found}")]
    UnexpectedRoot {
        expected: &'static str,
        found: String,
    },
}

impl AdocError {
    /// The underlying parse error, if any.
    pub fn parse_error(&self) -> Option<&PegError> {
        match self {
            AdocError::Parse(err) => Some(err),
            AdocError::UnexpectedRoot { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AdocError>;
