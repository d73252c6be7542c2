//! Constant pool and constants for Java class files

use std::collections::HashMap;

use super::cursor::ByteCursor;
use super::defs::constant_tags;
use super::error::{ClassFormatError, ClassFormatResult, ConstPoolError, ConstPoolResult};
use super::mutf8::{encode_modified_utf8, JavaString};

#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    Utf8(String),
    /// Utf8 entry holding unpaired surrogates. Usable as string data, never as a name.
    Utf8Surrogates(JavaString),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(u16),
    String(u16),
    FieldRef(u16, u16),
    MethodRef(u16, u16),
    InterfaceMethodRef(u16, u16),
    NameAndType(u16, u16),
    MethodHandle(u8, u16),
    MethodType(u16),
    Dynamic(u16, u16),
    InvokeDynamic(u16, u16),
    Module(u16),
    Package(u16),
    /// Second slot of a Long or Double entry; never serialized.
    Unusable,
}

impl Constant {
    /// Number of constant pool slots the entry occupies.
    pub fn width(&self) -> usize {
        match self {
            Constant::Long(_) | Constant::Double(_) => 2,
            _ => 1,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        use constant_tags::*;
        let mut bytes = Vec::new();
        match self {
            Constant::Utf8(value) => {
                bytes.push(CONSTANT_UTF8);
                let encoded = encode_modified_utf8(value);
                bytes.extend_from_slice(&(encoded.len() as u16).to_be_bytes());
                bytes.extend_from_slice(&encoded);
            }
            Constant::Utf8Surrogates(value) => {
                bytes.push(CONSTANT_UTF8);
                let encoded = value.to_modified_utf8();
                bytes.extend_from_slice(&(encoded.len() as u16).to_be_bytes());
                bytes.extend_from_slice(&encoded);
            }
            Constant::Integer(value) => {
                bytes.push(CONSTANT_INTEGER);
                bytes.extend_from_slice(&value.to_be_bytes());
            }
            Constant::Float(value) => {
                bytes.push(CONSTANT_FLOAT);
                bytes.extend_from_slice(&value.to_bits().to_be_bytes());
            }
            Constant::Long(value) => {
                bytes.push(CONSTANT_LONG);
                bytes.extend_from_slice(&value.to_be_bytes());
            }
            Constant::Double(value) => {
                bytes.push(CONSTANT_DOUBLE);
                bytes.extend_from_slice(&value.to_bits().to_be_bytes());
            }
            Constant::Class(name_index) => {
                bytes.push(CONSTANT_CLASS);
                bytes.extend_from_slice(&name_index.to_be_bytes());
            }
            Constant::String(string_index) => {
                bytes.push(CONSTANT_STRING);
                bytes.extend_from_slice(&string_index.to_be_bytes());
            }
            Constant::FieldRef(class_index, name_and_type_index) => {
                bytes.push(CONSTANT_FIELDREF);
                bytes.extend_from_slice(&class_index.to_be_bytes());
                bytes.extend_from_slice(&name_and_type_index.to_be_bytes());
            }
            Constant::MethodRef(class_index, name_and_type_index) => {
                bytes.push(CONSTANT_METHODREF);
                bytes.extend_from_slice(&class_index.to_be_bytes());
                bytes.extend_from_slice(&name_and_type_index.to_be_bytes());
            }
            Constant::InterfaceMethodRef(class_index, name_and_type_index) => {
                bytes.push(CONSTANT_INTERFACEMETHODREF);
                bytes.extend_from_slice(&class_index.to_be_bytes());
                bytes.extend_from_slice(&name_and_type_index.to_be_bytes());
            }
            Constant::NameAndType(name_index, descriptor_index) => {
                bytes.push(CONSTANT_NAMEANDTYPE);
                bytes.extend_from_slice(&name_index.to_be_bytes());
                bytes.extend_from_slice(&descriptor_index.to_be_bytes());
            }
            Constant::MethodHandle(reference_kind, reference_index) => {
                bytes.push(CONSTANT_METHODHANDLE);
                bytes.push(*reference_kind);
                bytes.extend_from_slice(&reference_index.to_be_bytes());
            }
            Constant::MethodType(descriptor_index) => {
                bytes.push(CONSTANT_METHODTYPE);
                bytes.extend_from_slice(&descriptor_index.to_be_bytes());
            }
            Constant::Dynamic(bootstrap_method_attr_index, name_and_type_index) => {
                bytes.push(CONSTANT_DYNAMIC);
                bytes.extend_from_slice(&bootstrap_method_attr_index.to_be_bytes());
                bytes.extend_from_slice(&name_and_type_index.to_be_bytes());
            }
            Constant::InvokeDynamic(bootstrap_method_attr_index, name_and_type_index) => {
                bytes.push(CONSTANT_INVOKEDYNAMIC);
                bytes.extend_from_slice(&bootstrap_method_attr_index.to_be_bytes());
                bytes.extend_from_slice(&name_and_type_index.to_be_bytes());
            }
            Constant::Module(name_index) => {
                bytes.push(CONSTANT_MODULE);
                bytes.extend_from_slice(&name_index.to_be_bytes());
            }
            Constant::Package(name_index) => {
                bytes.push(CONSTANT_PACKAGE);
                bytes.extend_from_slice(&name_index.to_be_bytes());
            }
            Constant::Unusable => {}
        }
        bytes
    }
}

/// Constant pool with 1-based indexing. Entries added through the `add_*`
/// methods are deduplicated, so the same sequence of additions always yields
/// the same pool.
#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    pub(crate) constants: Vec<Constant>,
    lookup: HashMap<Vec<u8>, u16>,
}

impl ConstantPool {
    /// Highest usable index; `constant_pool_count` itself must fit in a u16.
    pub const MAX_INDEX: usize = u16::MAX as usize - 1;

    pub fn new() -> Self {
        Self::default()
    }

    /// Value written as `constant_pool_count`.
    pub fn count(&self) -> u16 {
        (self.constants.len() + 1) as u16
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constant> {
        self.constants.iter()
    }

    pub fn get(&self, index: u16) -> ConstPoolResult<&Constant> {
        if index == 0 {
            return Err(ConstPoolError::InvalidIndex(index));
        }
        match self.constants.get(index as usize - 1) {
            Some(Constant::Unusable) | None => Err(ConstPoolError::InvalidIndex(index)),
            Some(constant) => Ok(constant),
        }
    }

    pub fn get_utf8(&self, index: u16) -> ConstPoolResult<&str> {
        match self.get(index)? {
            Constant::Utf8(value) => Ok(value),
            Constant::Utf8Surrogates(_) => Err(ConstPoolError::UnpairedSurrogate(index)),
            _ => Err(ConstPoolError::UnexpectedKind { index, expected: "Utf8" }),
        }
    }

    /// Resolve a Utf8 entry as string data, unpaired surrogates included.
    pub fn get_text(&self, index: u16) -> ConstPoolResult<JavaString> {
        match self.get(index)? {
            Constant::Utf8(value) => Ok(JavaString::from(value.as_str())),
            Constant::Utf8Surrogates(value) => Ok(value.clone()),
            _ => Err(ConstPoolError::UnexpectedKind { index, expected: "Utf8" }),
        }
    }

    /// Resolve a zero-or-Utf8 index, as used by optional name slots.
    pub fn get_optional_utf8(&self, index: u16) -> ConstPoolResult<Option<&str>> {
        if index == 0 {
            return Ok(None);
        }
        self.get_utf8(index).map(Some)
    }

    pub fn get_class_name(&self, index: u16) -> ConstPoolResult<&str> {
        match self.get(index)? {
            Constant::Class(name_index) => self.get_utf8(*name_index),
            _ => Err(ConstPoolError::UnexpectedKind { index, expected: "Class" }),
        }
    }

    pub fn get_optional_class_name(&self, index: u16) -> ConstPoolResult<Option<&str>> {
        if index == 0 {
            return Ok(None);
        }
        self.get_class_name(index).map(Some)
    }

    pub fn get_name_and_type(&self, index: u16) -> ConstPoolResult<(&str, &str)> {
        match self.get(index)? {
            Constant::NameAndType(name_index, descriptor_index) => {
                Ok((self.get_utf8(*name_index)?, self.get_utf8(*descriptor_index)?))
            }
            _ => Err(ConstPoolError::UnexpectedKind { index, expected: "NameAndType" }),
        }
    }

    fn add(&mut self, constant: Constant) -> ConstPoolResult<u16> {
        let key = constant.to_bytes();
        if let Some(&index) = self.lookup.get(&key) {
            return Ok(index);
        }
        let width = constant.width();
        if self.constants.len() + width > Self::MAX_INDEX {
            return Err(ConstPoolError::OutOfSpace);
        }
        let index = (self.constants.len() + 1) as u16;
        self.constants.push(constant);
        if width == 2 {
            self.constants.push(Constant::Unusable);
        }
        self.lookup.insert(key, index);
        Ok(index)
    }

    pub fn add_utf8(&mut self, value: &str) -> ConstPoolResult<u16> {
        self.add(Constant::Utf8(value.to_string()))
    }

    pub fn add_text(&mut self, value: &JavaString) -> ConstPoolResult<u16> {
        match value.as_string() {
            Some(valid) => self.add(Constant::Utf8(valid)),
            None => self.add(Constant::Utf8Surrogates(value.clone())),
        }
    }

    pub fn add_class(&mut self, name: &str) -> ConstPoolResult<u16> {
        let name_index = self.add_utf8(name)?;
        self.add(Constant::Class(name_index))
    }

    pub fn add_name_and_type(&mut self, name: &str, descriptor: &str) -> ConstPoolResult<u16> {
        let name_index = self.add_utf8(name)?;
        let descriptor_index = self.add_utf8(descriptor)?;
        self.add(Constant::NameAndType(name_index, descriptor_index))
    }

    pub fn add_string(&mut self, value: &JavaString) -> ConstPoolResult<u16> {
        let utf8_index = self.add_text(value)?;
        self.add(Constant::String(utf8_index))
    }

    pub fn add_integer(&mut self, value: i32) -> ConstPoolResult<u16> {
        self.add(Constant::Integer(value))
    }

    pub fn add_float(&mut self, value: f32) -> ConstPoolResult<u16> {
        self.add(Constant::Float(value))
    }

    pub fn add_long(&mut self, value: i64) -> ConstPoolResult<u16> {
        self.add(Constant::Long(value))
    }

    pub fn add_double(&mut self, value: f64) -> ConstPoolResult<u16> {
        self.add(Constant::Double(value))
    }

    /// Decode the `constant_pool_count` and entries at the cursor.
    pub(crate) fn parse(cursor: &mut ByteCursor<'_>) -> ClassFormatResult<Self> {
        use constant_tags::*;

        let count = cursor.u2()?;
        let mut constants = Vec::with_capacity(count as usize);
        let mut index: u16 = 1;
        while index < count {
            let tag = cursor.u1()?;
            let constant = match tag {
                CONSTANT_UTF8 => {
                    let length = cursor.u2()? as usize;
                    let raw = cursor.bytes(length)?;
                    let text = JavaString::from_modified_utf8(raw).ok_or(ClassFormatError::InvalidUtf8 { index })?;
                    match text.into_string() {
                        Ok(value) => Constant::Utf8(value),
                        Err(text) => Constant::Utf8Surrogates(text),
                    }
                }
                CONSTANT_INTEGER => Constant::Integer(cursor.u4()? as i32),
                CONSTANT_FLOAT => Constant::Float(f32::from_bits(cursor.u4()?)),
                CONSTANT_LONG => Constant::Long(cursor.u8()? as i64),
                CONSTANT_DOUBLE => Constant::Double(f64::from_bits(cursor.u8()?)),
                CONSTANT_CLASS => Constant::Class(cursor.u2()?),
                CONSTANT_STRING => Constant::String(cursor.u2()?),
                CONSTANT_FIELDREF => Constant::FieldRef(cursor.u2()?, cursor.u2()?),
                CONSTANT_METHODREF => Constant::MethodRef(cursor.u2()?, cursor.u2()?),
                CONSTANT_INTERFACEMETHODREF => Constant::InterfaceMethodRef(cursor.u2()?, cursor.u2()?),
                CONSTANT_NAMEANDTYPE => Constant::NameAndType(cursor.u2()?, cursor.u2()?),
                CONSTANT_METHODHANDLE => Constant::MethodHandle(cursor.u1()?, cursor.u2()?),
                CONSTANT_METHODTYPE => Constant::MethodType(cursor.u2()?),
                CONSTANT_DYNAMIC => Constant::Dynamic(cursor.u2()?, cursor.u2()?),
                CONSTANT_INVOKEDYNAMIC => Constant::InvokeDynamic(cursor.u2()?, cursor.u2()?),
                CONSTANT_MODULE => Constant::Module(cursor.u2()?),
                CONSTANT_PACKAGE => Constant::Package(cursor.u2()?),
                _ => return Err(ConstPoolError::UnknownTag { tag, index }.into()),
            };
            let width = constant.width();
            constants.push(constant);
            if width == 2 {
                constants.push(Constant::Unusable);
            }
            index = index.saturating_add(width as u16);
        }
        Ok(Self { constants, lookup: HashMap::new() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_deduplicates_entries() {
        let mut cp = ConstantPool::new();
        let a = cp.add_class("java/lang/Object").unwrap();
        let b = cp.add_class("java/lang/Object").unwrap();
        assert_eq!(a, b);
        // Utf8 + Class
        assert_eq!(cp.count(), 3);
        assert_eq!(cp.get_class_name(a).unwrap(), "java/lang/Object");
    }

    #[test]
    fn wide_entries_take_two_slots() {
        let mut cp = ConstantPool::new();
        let long_index = cp.add_long(7).unwrap();
        let next = cp.add_utf8("after").unwrap();
        assert_eq!(long_index, 1);
        assert_eq!(next, 3);
        assert_eq!(cp.get(2), Err(ConstPoolError::InvalidIndex(2)));
    }

    #[test]
    fn index_zero_and_wrong_kind_are_rejected() {
        let mut cp = ConstantPool::new();
        let utf8 = cp.add_utf8("x").unwrap();
        assert_eq!(cp.get(0), Err(ConstPoolError::InvalidIndex(0)));
        assert!(matches!(cp.get_class_name(utf8), Err(ConstPoolError::UnexpectedKind { .. })));
        assert_eq!(cp.get_optional_class_name(0).unwrap(), None);
    }

    #[test]
    fn unpaired_surrogates_are_kept_apart_from_names() {
        let mut cp = ConstantPool::new();
        let lone = JavaString::from_units(vec![0xd800]);
        let string = cp.add_string(&lone).unwrap();
        let Constant::String(utf8) = cp.get(string).unwrap().clone() else { panic!("not a String entry") };
        assert_eq!(cp.get_text(utf8).unwrap(), lone);
        assert_eq!(cp.get_utf8(utf8), Err(ConstPoolError::UnpairedSurrogate(utf8)));
        // well-formed text shares the plain Utf8 entry
        let name = cp.add_utf8("S").unwrap();
        assert_eq!(cp.add_text(&JavaString::from("S")).unwrap(), name);
    }

    #[test]
    fn parse_keeps_unpaired_surrogates() {
        let mut bytes = vec![0, 3];
        bytes.extend_from_slice(&[1, 0, 3, 0xed, 0xa0, 0x80]);
        bytes.extend_from_slice(&[8, 0, 1]);
        let cp = ConstantPool::parse(&mut ByteCursor::new(&bytes)).unwrap();
        assert_eq!(cp.get_text(1).unwrap().units(), &[0xd800]);
        assert_eq!(cp.constants[0].to_bytes(), &bytes[2..8]);
    }
}
