//! Error taxonomy for code parsing and exercise generation.

use thiserror::Error;

/// Errors surfaced by the engine.
///
/// `Format`, `Overflow` and `Checksum` are user-input errors from parsing a
/// text code and are safe to report verbatim. `Precondition` means the
/// calling code is wrong; it is never recovered from internally.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid exercise code: {0}")]
    Format(String),

    #[error("exercise code too long: value needs {bytes} bytes, at most {max} allowed")]
    Overflow { bytes: usize, max: usize },

    #[error("exercise code checksum mismatch (stored {stored:04x}, computed {computed:04x}); check for typos")]
    Checksum { stored: u16, computed: u16 },

    #[error("precondition violated: {0}")]
    Precondition(String),

    #[error("output failed: {0}")]
    Output(#[from] std::io::Error),

    #[error("generator failed: {0}")]
    Generator(String),
}

impl Error {
    /// True for errors caused by a malformed or mistyped text code.
    pub fn is_code_error(&self) -> bool {
        matches!(
            self,
            Error::Format(_) | Error::Overflow { .. } | Error::Checksum { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
