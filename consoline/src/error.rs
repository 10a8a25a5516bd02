//! Error types

use thiserror::Error;

/// Errors surfaced by the editing session
///
/// `Interrupted` and `Aborted` are control signals rather than failures:
/// [`crate::session::Session`] catches them and reprompts. Only `Closed` and
/// `Write` ever escape [`crate::session::Session::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// Ctrl+C unwound the current read
    #[error("interrupted")]
    Interrupted,
    /// A bare Escape abandoned the current line
    #[error("line aborted")]
    Aborted,
    /// Every sender of the event source has been dropped
    #[error("input closed")]
    Closed,
    /// The terminal surface refused a write
    #[error("surface write failed: {0:?}")]
    Write(embedded_io::ErrorKind),
}

impl Error {
    pub(crate) fn write_error(kind: impl Into<embedded_io::ErrorKind>) -> Self {
        Error::Write(kind.into())
    }
}

impl embedded_io::Error for Error {
    fn kind(&self) -> embedded_io::ErrorKind {
        match *self {
            Error::Interrupted | Error::Aborted => embedded_io::ErrorKind::Interrupted,
            Error::Closed => embedded_io::ErrorKind::BrokenPipe,
            Error::Write(kind) => kind,
        }
    }
}

/// Error raised by a statement while it executes
///
/// Rendered as `"{name}: {message}"`, e.g. `ZeroDivisionError: division by zero`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name}: {message}")]
pub struct ExecError {
    pub name: String,
    pub message: String,
}

impl ExecError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Failure reported by a completion provider or a highlighter.
///
/// These never interrupt editing; the session logs them and degrades.
pub type ProviderError = Box<dyn std::error::Error + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::Error as _;

    #[test]
    fn exec_error_display() {
        let err = ExecError::new("NameError", "name 'x' is not defined");

        assert_eq!(err.to_string(), "NameError: name 'x' is not defined");
    }

    #[test]
    fn kinds() {
        assert_eq!(Error::Interrupted.kind(), embedded_io::ErrorKind::Interrupted);
        assert_eq!(Error::Closed.kind(), embedded_io::ErrorKind::BrokenPipe);
        assert_eq!(
            Error::write_error(embedded_io::ErrorKind::InvalidData).kind(),
            embedded_io::ErrorKind::InvalidData
        );
    }
}
