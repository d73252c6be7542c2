use crate::classfile::class::ClassFile;
use crate::classfile::defs::access_flags;

use super::attributes::{self, AttributesVerifyError};
use super::constant_pool::{self, check_index, is_class, ConstantPoolVerifyError, IndexCheck};
use super::fields::{self, FieldVerifyError};
use super::methods::{self, MethodVerifyError};

pub type VerifyResult<T> = Result<T, VerifyError>;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum VerifyError {
    #[error("Constant pool: {0}")]
    ConstantPool(#[from] ConstantPoolVerifyError),
    #[error("Field: {0}")]
    Field(#[from] FieldVerifyError),
    #[error("Method: {0}")]
    Method(#[from] MethodVerifyError),
    #[error("Attribute: {0}")]
    Attribute(#[from] AttributesVerifyError),
    #[error("Invalid constant pool index {0}")]
    InvalidConstantPoolIndex(u16),
    #[error("Invalid constant pool index type {0}")]
    InvalidConstantPoolIndexType(u16),
    #[error("Interface must extend java/lang/Object")]
    InterfaceWithoutSuperclass,
}

/// Verify the ClassFile by orchestrating all sub-verifiers
pub fn verify(class_file: &ClassFile) -> VerifyResult<()> {
    constant_pool::verify(class_file)?;
    verify_this_class(class_file)?;
    verify_super_class(class_file)?;
    for &interface in &class_file.interfaces {
        verify_class_index(class_file, interface)?;
    }
    fields::verify(class_file)?;
    methods::verify(class_file)?;
    attributes::verify(class_file)?;
    Ok(())
}

fn verify_class_index(class_file: &ClassFile, index: u16) -> VerifyResult<()> {
    match check_index(&class_file.constant_pool, index, is_class) {
        IndexCheck::Valid => Ok(()),
        IndexCheck::Missing => Err(VerifyError::InvalidConstantPoolIndex(index)),
        IndexCheck::WrongKind => Err(VerifyError::InvalidConstantPoolIndexType(index)),
    }
}

fn verify_this_class(class_file: &ClassFile) -> VerifyResult<()> {
    verify_class_index(class_file, class_file.this_class)
}

fn verify_super_class(class_file: &ClassFile) -> VerifyResult<()> {
    let super_class = class_file.super_class;

    let class_is_interface = class_file.access_flags & access_flags::ACC_INTERFACE != 0;
    if super_class == 0 {
        // only java/lang/Object and module-info have no superclass
        if class_is_interface {
            return Err(VerifyError::InterfaceWithoutSuperclass);
        }
        return Ok(());
    }
    verify_class_index(class_file, super_class)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn this_class_must_be_a_class_entry() {
        let mut class_file = ClassFile::new();
        class_file.this_class = class_file.constant_pool.add_utf8("A").unwrap();
        assert_eq!(verify(&class_file), Err(VerifyError::InvalidConstantPoolIndexType(1)));
    }

    #[test]
    fn root_class_may_omit_superclass() {
        let mut class_file = ClassFile::new();
        class_file.this_class = class_file.constant_pool.add_class("java/lang/Object").unwrap();
        assert_eq!(verify(&class_file), Ok(()));

        class_file.access_flags = access_flags::ACC_INTERFACE | access_flags::ACC_ABSTRACT;
        assert_eq!(verify(&class_file), Err(VerifyError::InterfaceWithoutSuperclass));
    }

    #[test]
    fn interfaces_must_resolve() {
        let mut class_file = ClassFile::new();
        class_file.this_class = class_file.constant_pool.add_class("A").unwrap();
        class_file.interfaces.push(40);
        assert_eq!(verify(&class_file), Err(VerifyError::InvalidConstantPoolIndex(40)));
    }
}
