use quill_common::Position;
use thiserror::Error;

/// Every way a render can fail.
///
/// Errors abort the render in progress. Output already written to the
/// destination stays there.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    /// Malformed directive syntax or an unmatched block terminator.
    #[error("parse error at {position}: {message}")]
    Parse { message: String, position: Position },

    /// An operation applied to a value kind that does not support it.
    #[error("type error: {0}")]
    Type(String),

    /// A name or list element that resolves to nothing.
    #[error("reference error: {0}")]
    Reference(String),

    /// A function invoked with the wrong number of arguments.
    #[error("arity error: `{function}` expects {expected} argument(s), got {found}")]
    Arity {
        function: String,
        expected: String,
        found: usize,
    },
}

impl RenderError {
    pub fn parse(message: impl Into<String>, position: Position) -> Self {
        RenderError::Parse {
            message: message.into(),
            position,
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        RenderError::Type(message.into())
    }

    pub fn reference(message: impl Into<String>) -> Self {
        RenderError::Reference(message.into())
    }

    pub fn arity(function: impl Into<String>, expected: impl ToString, found: usize) -> Self {
        RenderError::Arity {
            function: function.into(),
            expected: expected.to_string(),
            found,
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;
