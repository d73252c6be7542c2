//! Specific error types for class file reading and writing

use thiserror::Error;

/// Errors that can occur during constant pool operations
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConstPoolError {
    #[error("Constant pool is out of space")]
    OutOfSpace,
    #[error("Invalid constant pool index: {0}")]
    InvalidIndex(u16),
    #[error("Constant pool index {index} is not a {expected} entry")]
    UnexpectedKind { index: u16, expected: &'static str },
    #[error("Constant pool entry {0} holds unpaired surrogates and cannot be used as a name")]
    UnpairedSurrogate(u16),
    #[error("Unknown constant pool tag {tag} at index {index}")]
    UnknownTag { tag: u8, index: u16 },
}

/// Errors that can occur while decoding a class file
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ClassFormatError {
    #[error("Invalid magic number: 0x{0:08x}")]
    BadMagic(u32),
    #[error("Unexpected end of class file at offset {offset} (needed {needed} more bytes)")]
    Truncated { offset: usize, needed: usize },
    #[error("Constant pool error: {0}")]
    ConstPool(#[from] ConstPoolError),
    #[error("Invalid modified UTF-8 in constant pool entry {index}")]
    InvalidUtf8 { index: u16 },
    #[error("Invalid element value tag '{0}'")]
    InvalidElementTag(char),
    #[error("Invalid type annotation target type 0x{0:02x}")]
    InvalidTargetType(u8),
    #[error("Attribute {name} is malformed: {reason}")]
    MalformedAttribute { name: &'static str, reason: String },
    #[error("Trailing bytes after class file: {0}")]
    TrailingBytes(usize),
}

/// Errors that can occur while assembling an output class file
#[derive(Error, Debug)]
pub enum ClassGenerationError {
    #[error("Constant pool error: {0}")]
    ConstPool(#[from] ConstPoolError),
    #[error("Too many {what}: {count}")]
    TooMany { what: &'static str, count: usize },
}

/// Generic result type for constant pool operations
pub type ConstPoolResult<T> = Result<T, ConstPoolError>;

/// Generic result type for class file decoding
pub type ClassFormatResult<T> = Result<T, ClassFormatError>;
