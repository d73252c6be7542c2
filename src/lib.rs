//! abistub
//!
//! Derives a minimal, deterministic ABI stub from a compiled JVM class file:
//! the structural surface other code compiles against, without method bodies,
//! private members or static initializers. Two class files that differ only
//! in private implementation produce byte-identical stubs.
//!
//! ## Architecture
//!
//! - **classfile**: class file codec (constant pool, attributes, reader, writer)
//! - **abi**: descriptors, membership rules, canonical ordering, accumulation and replay
//! - **verify**: structural checks on emitted class files
//! - **common**: configuration and errors
//! - **bin**: command-line interface
//!
//! ## Flow
//!
//! ```text
//! bytes → ClassReader → ClassMirror (classifier, ordered sets) → ClassDescriptor
//!                                                                     ↓
//!                                          bytes ← ClassWriter ← canonical replay
//! ```

pub mod abi;
pub mod classfile;
pub mod common;
pub mod tree;
pub mod verify;

pub use abi::{ClassDescriptor, ClassMirror};
pub use common::{Config, Error, MethodBodyStyle, Result};
pub use tree::{stub_tree, StubSummary};

use classfile::ClassReader;

/// Parse a class file and accumulate its stub surface.
pub fn read_class(bytes: &[u8]) -> Result<ClassDescriptor> {
    let reader = ClassReader::new(bytes)?;
    let mut mirror = ClassMirror::new();
    reader.accept(&mut mirror)?;
    mirror.finish()
}

/// Stub a class file with the default configuration.
pub fn stub_class(bytes: &[u8]) -> Result<Vec<u8>> {
    stub_class_with_config(bytes, &Config::default())
}

pub fn stub_class_with_config(bytes: &[u8], config: &Config) -> Result<Vec<u8>> {
    read_class(bytes)?.to_stub_bytes(config)
}
