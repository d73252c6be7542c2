use crate::classfile::attribute::AttributeInfo;
use crate::classfile::class::ClassFile;
use crate::classfile::constpool::{Constant, ConstantPool};
use crate::classfile::defs::attribute_names as names;

use super::constant_pool::{check_index, is_class, is_utf8, IndexCheck};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum AttributesVerifyError {
    #[error("Attribute name index {0} is not a Utf8 entry")]
    InvalidAttributeName(u16),
    #[error("Duplicate class attribute: {0}")]
    DuplicateClassAttribute(&'static str),
    #[error("Attribute {0} is not allowed on a class")]
    MisplacedAttribute(String),
    #[error("Invalid attribute content: {0}")]
    InvalidContent(&'static str),
}

pub type Result<T> = std::result::Result<T, AttributesVerifyError>;

/// Name of an attribute, if its name index resolves to a Utf8 entry.
pub(crate) fn attribute_name<'a>(pool: &'a ConstantPool, attribute: &AttributeInfo) -> Option<&'a str> {
    pool.get_utf8(attribute.name_index).ok()
}

pub(crate) fn count_named(pool: &ConstantPool, attributes: &[AttributeInfo], name: &str) -> usize {
    attributes
        .iter()
        .filter(|attribute| attribute_name(pool, attribute) == Some(name))
        .count()
}

const UNIQUE_CLASS_ATTRIBUTES: [&str; 9] = [
    names::SIGNATURE,
    names::DEPRECATED,
    names::SYNTHETIC,
    names::ENCLOSING_METHOD,
    names::INNER_CLASSES,
    names::RUNTIME_VISIBLE_ANNOTATIONS,
    names::RUNTIME_INVISIBLE_ANNOTATIONS,
    names::RUNTIME_VISIBLE_TYPE_ANNOTATIONS,
    names::RUNTIME_INVISIBLE_TYPE_ANNOTATIONS,
];

pub fn verify(class_file: &ClassFile) -> Result<()> {
    let pool = &class_file.constant_pool;
    let member_attributes = class_file
        .fields
        .iter()
        .flat_map(|field| field.attributes.iter())
        .chain(class_file.methods.iter().flat_map(|method| method.attributes.iter()));
    for attribute in class_file.attributes.iter().chain(member_attributes) {
        if attribute_name(pool, attribute).is_none() {
            return Err(AttributesVerifyError::InvalidAttributeName(attribute.name_index));
        }
    }

    for name in UNIQUE_CLASS_ATTRIBUTES {
        if count_named(pool, &class_file.attributes, name) > 1 {
            return Err(AttributesVerifyError::DuplicateClassAttribute(name));
        }
    }

    for attribute in &class_file.attributes {
        match attribute_name(pool, attribute) {
            Some(names::INNER_CLASSES) => verify_inner_classes(pool, &attribute.info)?,
            Some(names::ENCLOSING_METHOD) => verify_enclosing_method(pool, &attribute.info)?,
            Some(name @ (names::CODE | names::CONSTANT_VALUE | names::EXCEPTIONS | names::ANNOTATION_DEFAULT)) => {
                return Err(AttributesVerifyError::MisplacedAttribute(name.to_string()))
            }
            _ => {}
        }
    }
    Ok(())
}

fn index_at(info: &[u8], offset: usize) -> u16 {
    u16::from_be_bytes([info[offset], info[offset + 1]])
}

fn verify_inner_classes(pool: &ConstantPool, info: &[u8]) -> Result<()> {
    if info.len() < 2 {
        return Err(AttributesVerifyError::InvalidContent("InnerClasses"));
    }
    let count = index_at(info, 0) as usize;
    if info.len() != 2 + count * 8 {
        return Err(AttributesVerifyError::InvalidContent("InnerClasses"));
    }
    for entry in info[2..].chunks_exact(8) {
        let inner = index_at(entry, 0);
        let outer = index_at(entry, 2);
        let simple = index_at(entry, 4);
        if check_index(pool, inner, is_class) != IndexCheck::Valid
            || (outer != 0 && check_index(pool, outer, is_class) != IndexCheck::Valid)
            || (simple != 0 && check_index(pool, simple, is_utf8) != IndexCheck::Valid)
        {
            return Err(AttributesVerifyError::InvalidContent("InnerClasses"));
        }
    }
    Ok(())
}

fn verify_enclosing_method(pool: &ConstantPool, info: &[u8]) -> Result<()> {
    if info.len() != 4 {
        return Err(AttributesVerifyError::InvalidContent("EnclosingMethod"));
    }
    let class_index = index_at(info, 0);
    let method_index = index_at(info, 2);
    if check_index(pool, class_index, is_class) != IndexCheck::Valid {
        return Err(AttributesVerifyError::InvalidContent("EnclosingMethod"));
    }
    if method_index != 0 && check_index(pool, method_index, |c| matches!(c, Constant::NameAndType(..))) != IndexCheck::Valid {
        return Err(AttributesVerifyError::InvalidContent("EnclosingMethod"));
    }
    Ok(())
}
