use crate::classfile::class::ClassFile;
use crate::classfile::constpool::Constant;
use crate::classfile::defs::access_flags;
use crate::classfile::defs::attribute_names as names;
use crate::classfile::field::FieldInfo;

use super::attributes::{attribute_name, count_named};
use super::constant_pool::{check_index, is_utf8, IndexCheck};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum FieldVerifyError {
    #[error("Invalid constant pool index {0}")]
    InvalidConstantPoolIndex(u16),
    #[error("Invalid constant pool index type {0}")]
    InvalidConstantPoolIndexType(u16),
    #[error("Invalid field access flags: 0x{0:04x}")]
    InvalidFieldAccessFlags(u16),
    #[error("Invalid field attribute: {0}")]
    InvalidFieldAttribute(String),
    #[error("Duplicate field attribute: {0}")]
    DuplicateFieldAttribute(String),
    #[error("ConstantValue refers to invalid constant kind for field")]
    InvalidConstantValueKind,
}

pub type Result<T> = std::result::Result<T, FieldVerifyError>;

pub fn verify(class_file: &ClassFile) -> Result<()> {
    for field in &class_file.fields {
        verify_utf8_index(class_file, field.name_index)?;
        verify_utf8_index(class_file, field.descriptor_index)?;
        verify_access_flags(field.access_flags)?;
        verify_attributes(class_file, field)?;
    }
    Ok(())
}

fn verify_utf8_index(class_file: &ClassFile, index: u16) -> Result<()> {
    match check_index(&class_file.constant_pool, index, is_utf8) {
        IndexCheck::Valid => Ok(()),
        IndexCheck::Missing => Err(FieldVerifyError::InvalidConstantPoolIndex(index)),
        IndexCheck::WrongKind => Err(FieldVerifyError::InvalidConstantPoolIndexType(index)),
    }
}

fn verify_access_flags(flags: u16) -> Result<()> {
    let public_set = flags & access_flags::ACC_PUBLIC != 0;
    let protected_set = flags & access_flags::ACC_PROTECTED != 0;
    let private_set = flags & access_flags::ACC_PRIVATE != 0;

    if (public_set as u8 + protected_set as u8 + private_set as u8) > 1 {
        return Err(FieldVerifyError::InvalidFieldAccessFlags(flags));
    }
    Ok(())
}

fn verify_attributes(class_file: &ClassFile, field: &FieldInfo) -> Result<()> {
    let pool = &class_file.constant_pool;
    for name in [names::CONSTANT_VALUE, names::SIGNATURE] {
        if count_named(pool, &field.attributes, name) > 1 {
            return Err(FieldVerifyError::DuplicateFieldAttribute(name.to_string()));
        }
    }
    for attribute in &field.attributes {
        let name = attribute_name(pool, attribute)
            .ok_or_else(|| FieldVerifyError::InvalidConstantPoolIndexType(attribute.name_index))?;
        match name {
            names::CONSTANT_VALUE => {
                if attribute.info.len() != 2 {
                    return Err(FieldVerifyError::InvalidFieldAttribute(name.to_string()));
                }
                let index = u16::from_be_bytes([attribute.info[0], attribute.info[1]]);
                match pool.get(index) {
                    Ok(Constant::Integer(_))
                    | Ok(Constant::Float(_))
                    | Ok(Constant::Long(_))
                    | Ok(Constant::Double(_))
                    | Ok(Constant::String(_)) => {}
                    _ => return Err(FieldVerifyError::InvalidConstantValueKind),
                }
            }
            // Disallow method/class/code-only attributes on fields
            names::CODE
            | names::EXCEPTIONS
            | names::INNER_CLASSES
            | names::ENCLOSING_METHOD
            | names::ANNOTATION_DEFAULT
            | names::RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS
            | names::RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS => {
                return Err(FieldVerifyError::InvalidFieldAttribute(name.to_string()))
            }
            _ => {}
        }
    }
    Ok(())
}
