//! Structural verifiers for emitted class files
//!
//! Checks a `ClassFile` for internal consistency before it is serialized:
//! constant pool references resolve to entries of the right kind, member and
//! attribute names are Utf8 entries, and no member carries more than one
//! visibility flag.

mod verifier;
pub mod attributes;
pub mod constant_pool;
pub mod fields;
pub mod methods;

pub use verifier::{verify, VerifyError, VerifyResult};
