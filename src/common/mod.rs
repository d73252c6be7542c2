//! Shared definitions: configuration and the crate error type.

pub mod config;
pub mod error;

pub use config::{Config, MethodBodyStyle};
pub use error::{Error, Result};
