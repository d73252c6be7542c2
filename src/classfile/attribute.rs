//! Attribute structures for Java class files

use super::constpool::ConstantPool;
use super::defs::{attribute_names as names, opcodes};
use super::error::ConstPoolResult;

/// An attribute whose payload has already been encoded against the pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeInfo {
    pub name_index: u16,
    pub info: Vec<u8>,
}

impl AttributeInfo {
    pub fn new(name_index: u16, info: Vec<u8>) -> Self {
        Self { name_index, info }
    }

    /// Intern `name` and wrap the payload.
    pub fn named(constant_pool: &mut ConstantPool, name: &str, info: Vec<u8>) -> ConstPoolResult<Self> {
        Ok(Self::new(constant_pool.add_utf8(name)?, info))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.name_index.to_be_bytes());
        bytes.extend_from_slice(&(self.info.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&self.info);
        bytes
    }
}

#[derive(Debug)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
}

impl CodeAttribute {
    /// `aconst_null; athrow`: valid for any method, without branches and
    /// therefore without a StackMapTable.
    pub fn throw_null(max_locals: u16) -> Self {
        Self {
            max_stack: 1,
            max_locals,
            code: vec![opcodes::ACONST_NULL, opcodes::ATHROW],
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.max_stack.to_be_bytes());
        bytes.extend_from_slice(&self.max_locals.to_be_bytes());
        bytes.extend_from_slice(&(self.code.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&self.code);
        // exception_table_length, attributes_count
        bytes.extend_from_slice(&0u16.to_be_bytes());
        bytes.extend_from_slice(&0u16.to_be_bytes());
        bytes
    }
}

/// Helper to build an AttributeInfo for Code
pub fn make_code_attribute(constant_pool: &mut ConstantPool, code: &CodeAttribute) -> ConstPoolResult<AttributeInfo> {
    AttributeInfo::named(constant_pool, names::CODE, code.to_bytes())
}

/// Helper to build an attribute holding a single constant pool index
pub fn make_index_attribute(constant_pool: &mut ConstantPool, name: &str, index: u16) -> ConstPoolResult<AttributeInfo> {
    AttributeInfo::named(constant_pool, name, index.to_be_bytes().to_vec())
}

/// Helper to build an AttributeInfo for Exceptions
pub fn make_exceptions_attribute(constant_pool: &mut ConstantPool, exceptions: &[String]) -> ConstPoolResult<AttributeInfo> {
    let mut info = Vec::with_capacity(2 + exceptions.len() * 2);
    info.extend_from_slice(&(exceptions.len() as u16).to_be_bytes());
    for exception in exceptions {
        info.extend_from_slice(&constant_pool.add_class(exception)?.to_be_bytes());
    }
    AttributeInfo::named(constant_pool, names::EXCEPTIONS, info)
}

/// Helper for the empty marker attributes (Deprecated, Synthetic)
pub fn make_marker_attribute(constant_pool: &mut ConstantPool, name: &str) -> ConstPoolResult<AttributeInfo> {
    AttributeInfo::named(constant_pool, name, Vec::new())
}
