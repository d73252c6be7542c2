use crate::classfile::class::ClassFile;
use crate::classfile::defs::access_flags;
use crate::classfile::defs::attribute_names as names;
use crate::classfile::method::MethodInfo;

use super::attributes::{attribute_name, count_named};
use super::constant_pool::{check_index, is_class, is_utf8, IndexCheck};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum MethodVerifyError {
    #[error("Invalid constant pool index {0}")]
    InvalidConstantPoolIndex(u16),
    #[error("Invalid constant pool index type {0}")]
    InvalidConstantPoolIndexType(u16),
    #[error("Invalid method access flags: 0x{0:04x}")]
    InvalidMethodAccessFlags(u16),
    #[error("Abstract or native method must not have Code attribute")]
    ForbiddenCodeAttribute,
    #[error("Invalid method attribute: {0}")]
    InvalidMethodAttribute(String),
    #[error("Duplicate method attribute: {0}")]
    DuplicateMethodAttribute(String),
}

pub type Result<T> = std::result::Result<T, MethodVerifyError>;

/// Verify the ClassFile methods
pub fn verify(class_file: &ClassFile) -> Result<()> {
    for method in &class_file.methods {
        verify_access_flags(method.access_flags)?;
        verify_index(class_file, method.name_index, is_utf8)?;
        verify_index(class_file, method.descriptor_index, is_utf8)?;
        verify_method_attributes(class_file, method)?;
    }
    Ok(())
}

fn verify_index(class_file: &ClassFile, index: u16, accepts: fn(&crate::classfile::Constant) -> bool) -> Result<()> {
    match check_index(&class_file.constant_pool, index, accepts) {
        IndexCheck::Valid => Ok(()),
        IndexCheck::Missing => Err(MethodVerifyError::InvalidConstantPoolIndex(index)),
        IndexCheck::WrongKind => Err(MethodVerifyError::InvalidConstantPoolIndexType(index)),
    }
}

fn verify_access_flags(flags: u16) -> Result<()> {
    let public_set = flags & access_flags::ACC_PUBLIC != 0;
    let protected_set = flags & access_flags::ACC_PROTECTED != 0;
    let private_set = flags & access_flags::ACC_PRIVATE != 0;

    if (public_set as u8 + protected_set as u8 + private_set as u8) > 1 {
        return Err(MethodVerifyError::InvalidMethodAccessFlags(flags));
    }
    Ok(())
}

fn verify_method_attributes(class_file: &ClassFile, method: &MethodInfo) -> Result<()> {
    let pool = &class_file.constant_pool;
    for name in [names::CODE, names::EXCEPTIONS, names::SIGNATURE, names::ANNOTATION_DEFAULT] {
        if count_named(pool, &method.attributes, name) > 1 {
            return Err(MethodVerifyError::DuplicateMethodAttribute(name.to_string()));
        }
    }
    let bodiless = method.access_flags & (access_flags::ACC_ABSTRACT | access_flags::ACC_NATIVE) != 0;
    for attribute in &method.attributes {
        let name = attribute_name(pool, attribute)
            .ok_or(MethodVerifyError::InvalidConstantPoolIndexType(attribute.name_index))?;
        match name {
            names::CODE if bodiless => return Err(MethodVerifyError::ForbiddenCodeAttribute),
            names::EXCEPTIONS => {
                let info = &attribute.info;
                if info.len() < 2 {
                    return Err(MethodVerifyError::InvalidMethodAttribute(name.to_string()));
                }
                let count = u16::from_be_bytes([info[0], info[1]]) as usize;
                if info.len() != 2 + count * 2 {
                    return Err(MethodVerifyError::InvalidMethodAttribute(name.to_string()));
                }
                for entry in info[2..].chunks_exact(2) {
                    verify_index(class_file, u16::from_be_bytes([entry[0], entry[1]]), is_class)?;
                }
            }
            names::CONSTANT_VALUE | names::INNER_CLASSES | names::ENCLOSING_METHOD => {
                return Err(MethodVerifyError::InvalidMethodAttribute(name.to_string()))
            }
            _ => {}
        }
    }
    Ok(())
}
