use thiserror::Error;

use crate::classfile::error::{ClassFormatError, ClassGenerationError, ConstPoolError};
use crate::verify::VerifyError;

/// Result type for abistub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for stub generation
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed class file: {0}")]
    ClassFormat(#[from] ClassFormatError),

    #[error("Class generation error: {0}")]
    ClassGeneration(#[from] ClassGenerationError),

    #[error("Stub verification failed: {0}")]
    Verify(#[from] VerifyError),

    /// The traversal driver broke the callback protocol, e.g. delivered a
    /// member before the class header.
    #[error("Precondition violated: {message}")]
    Precondition { message: String },

    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

impl From<ConstPoolError> for Error {
    fn from(err: ConstPoolError) -> Self {
        Self::ClassGeneration(ClassGenerationError::ConstPool(err))
    }
}

impl Error {
    /// Create a precondition error
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition { message: message.into() }
    }
}
