//! Class file reader: decodes raw bytes and drives a `ClassVisitor`.

use log::trace;

use crate::abi::annotation::{Annotation, TypeAnnotation};
use crate::abi::descriptor::{
    ClassHeader, ClassVersion, ConstantValue, FieldDescriptor, InnerClass, MethodDescriptor, OuterClass,
};
use crate::common::error::Result;

use super::annotation::{read_annotations, read_element_value, read_parameter_annotations, read_type_annotations};
use super::constpool::{Constant, ConstantPool};
use super::cursor::ByteCursor;
use super::defs::{attribute_names as names, MAGIC};
use super::error::{ClassFormatError, ClassFormatResult, ConstPoolError};
use super::visitor::ClassVisitor;

#[derive(Debug)]
struct RawAttribute<'a> {
    name_index: u16,
    data: &'a [u8],
}

#[derive(Debug)]
struct RawMember<'a> {
    access_flags: u16,
    name_index: u16,
    descriptor_index: u16,
    attributes: Vec<RawAttribute<'a>>,
}

/// A parsed class file, ready to be replayed into any number of visitors.
#[derive(Debug)]
pub struct ClassReader<'a> {
    minor_version: u16,
    major_version: u16,
    constant_pool: ConstantPool,
    access_flags: u16,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<RawMember<'a>>,
    methods: Vec<RawMember<'a>>,
    attributes: Vec<RawAttribute<'a>>,
}

fn read_attributes<'a>(cursor: &mut ByteCursor<'a>) -> ClassFormatResult<Vec<RawAttribute<'a>>> {
    let count = cursor.u2()?;
    let mut attributes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let name_index = cursor.u2()?;
        let length = cursor.u4()? as usize;
        let data = cursor.bytes(length)?;
        attributes.push(RawAttribute { name_index, data });
    }
    Ok(attributes)
}

fn read_members<'a>(cursor: &mut ByteCursor<'a>) -> ClassFormatResult<Vec<RawMember<'a>>> {
    let count = cursor.u2()?;
    let mut members = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let access_flags = cursor.u2()?;
        let name_index = cursor.u2()?;
        let descriptor_index = cursor.u2()?;
        let attributes = read_attributes(cursor)?;
        members.push(RawMember { access_flags, name_index, descriptor_index, attributes });
    }
    Ok(members)
}

fn single_index(name: &'static str, data: &[u8]) -> ClassFormatResult<u16> {
    if data.len() != 2 {
        return Err(ClassFormatError::MalformedAttribute {
            name,
            reason: format!("expected 2 bytes, found {}", data.len()),
        });
    }
    Ok(u16::from_be_bytes([data[0], data[1]]))
}

/// Signature, Deprecated, Synthetic and the annotation attributes are shared
/// by classes, fields and methods.
#[derive(Debug, Default)]
struct CommonAttributes {
    signature: Option<String>,
    deprecated: bool,
    synthetic: bool,
    annotations: Vec<Annotation>,
    type_annotations: Vec<TypeAnnotation>,
}

impl CommonAttributes {
    /// Returns false when the attribute is not one of the shared kinds.
    fn accept(&mut self, name: &str, data: &[u8], pool: &ConstantPool) -> ClassFormatResult<bool> {
        match name {
            names::SIGNATURE => {
                let index = single_index(names::SIGNATURE, data)?;
                self.signature = Some(pool.get_utf8(index)?.to_string());
            }
            names::DEPRECATED => self.deprecated = true,
            names::SYNTHETIC => self.synthetic = true,
            names::RUNTIME_VISIBLE_ANNOTATIONS => self.annotations.extend(read_annotations(data, pool, true)?),
            names::RUNTIME_INVISIBLE_ANNOTATIONS => self.annotations.extend(read_annotations(data, pool, false)?),
            names::RUNTIME_VISIBLE_TYPE_ANNOTATIONS => {
                self.type_annotations.extend(read_type_annotations(data, pool, true)?)
            }
            names::RUNTIME_INVISIBLE_TYPE_ANNOTATIONS => {
                self.type_annotations.extend(read_type_annotations(data, pool, false)?)
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl<'a> ClassReader<'a> {
    /// Parse the structure of a class file. Attribute bodies are decoded
    /// lazily by `accept`.
    pub fn new(bytes: &'a [u8]) -> ClassFormatResult<Self> {
        let mut cursor = ByteCursor::new(bytes);
        let magic = cursor.u4()?;
        if magic != MAGIC {
            return Err(ClassFormatError::BadMagic(magic));
        }
        let minor_version = cursor.u2()?;
        let major_version = cursor.u2()?;
        let constant_pool = ConstantPool::parse(&mut cursor)?;
        let access_flags = cursor.u2()?;
        let this_class = cursor.u2()?;
        let super_class = cursor.u2()?;
        let interface_count = cursor.u2()?;
        let mut interfaces = Vec::with_capacity(interface_count as usize);
        for _ in 0..interface_count {
            interfaces.push(cursor.u2()?);
        }
        let fields = read_members(&mut cursor)?;
        let methods = read_members(&mut cursor)?;
        let attributes = read_attributes(&mut cursor)?;
        if cursor.remaining() != 0 {
            return Err(ClassFormatError::TrailingBytes(cursor.remaining()));
        }
        Ok(Self {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    pub fn class_name(&self) -> ClassFormatResult<&str> {
        Ok(self.constant_pool.get_class_name(self.this_class)?)
    }

    pub fn version(&self) -> ClassVersion {
        ClassVersion::new(self.major_version, self.minor_version)
    }

    pub fn constant_pool(&self) -> &ConstantPool {
        &self.constant_pool
    }

    /// Replay the class into `visitor`: header, outer class, annotations,
    /// type annotations, inner classes, fields, methods, end.
    pub fn accept<V: ClassVisitor + ?Sized>(&self, visitor: &mut V) -> Result<()> {
        let pool = &self.constant_pool;
        let name = self.class_name()?;
        trace!("reading {} (version {}.{})", name, self.major_version, self.minor_version);

        let mut common = CommonAttributes::default();
        let mut outer_class = None;
        let mut inner_classes = Vec::new();
        for attribute in &self.attributes {
            let attribute_name = pool.get_utf8(attribute.name_index).map_err(ClassFormatError::from)?;
            if common.accept(attribute_name, attribute.data, pool)? {
                continue;
            }
            match attribute_name {
                names::ENCLOSING_METHOD => outer_class = Some(self.read_enclosing_method(attribute.data)?),
                names::INNER_CLASSES => inner_classes = self.read_inner_classes(attribute.data)?,
                _ => trace!("{}: skipping class attribute {}", name, attribute_name),
            }
        }

        let interfaces = self
            .interfaces
            .iter()
            .map(|&index| pool.get_class_name(index).map(str::to_string))
            .collect::<std::result::Result<Vec<_>, ConstPoolError>>()
            .map_err(ClassFormatError::from)?;
        let header = ClassHeader {
            version: self.version(),
            access: self.access_flags,
            name: name.to_string(),
            signature: common.signature,
            super_name: pool
                .get_optional_class_name(self.super_class)
                .map_err(ClassFormatError::from)?
                .map(str::to_string),
            interfaces,
            deprecated: common.deprecated,
            synthetic: common.synthetic,
        };
        visitor.visit_header(header)?;

        if let Some(outer) = outer_class {
            visitor.visit_outer_class(outer)?;
        }
        for annotation in common.annotations {
            visitor.visit_annotation(annotation)?;
        }
        for annotation in common.type_annotations {
            visitor.visit_type_annotation(annotation)?;
        }
        for inner in inner_classes {
            visitor.visit_inner_class(inner)?;
        }
        for field in &self.fields {
            visitor.visit_field(self.read_field(field)?)?;
        }
        for method in &self.methods {
            visitor.visit_method(self.read_method(method)?)?;
        }
        visitor.visit_end()
    }

    fn read_enclosing_method(&self, data: &[u8]) -> ClassFormatResult<OuterClass> {
        let mut cursor = ByteCursor::new(data);
        let owner = self.constant_pool.get_class_name(cursor.u2()?)?;
        let method_index = cursor.u2()?;
        let (method_name, method_descriptor) = if method_index == 0 {
            (None, None)
        } else {
            let (name, descriptor) = self.constant_pool.get_name_and_type(method_index)?;
            (Some(name), Some(descriptor))
        };
        Ok(OuterClass::new(owner, method_name, method_descriptor))
    }

    fn read_inner_classes(&self, data: &[u8]) -> ClassFormatResult<Vec<InnerClass>> {
        let pool = &self.constant_pool;
        let mut cursor = ByteCursor::new(data);
        let count = cursor.u2()?;
        let mut entries = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let name = pool.get_class_name(cursor.u2()?)?;
            let outer_name = pool.get_optional_class_name(cursor.u2()?)?;
            let inner_name = pool.get_optional_utf8(cursor.u2()?)?;
            let access = cursor.u2()?;
            entries.push(InnerClass::new(name, outer_name, inner_name, access));
        }
        Ok(entries)
    }

    fn read_field(&self, raw: &RawMember<'_>) -> ClassFormatResult<FieldDescriptor> {
        let pool = &self.constant_pool;
        let mut field = FieldDescriptor::new(
            raw.access_flags,
            pool.get_utf8(raw.name_index)?,
            pool.get_utf8(raw.descriptor_index)?,
        );
        let mut common = CommonAttributes::default();
        for attribute in &raw.attributes {
            let attribute_name = pool.get_utf8(attribute.name_index)?;
            if common.accept(attribute_name, attribute.data, pool)? {
                continue;
            }
            if attribute_name == names::CONSTANT_VALUE {
                let index = single_index(names::CONSTANT_VALUE, attribute.data)?;
                field.value = Some(match pool.get(index)? {
                    Constant::Integer(v) => ConstantValue::Int(*v),
                    Constant::Float(v) => ConstantValue::Float(*v),
                    Constant::Long(v) => ConstantValue::Long(*v),
                    Constant::Double(v) => ConstantValue::Double(*v),
                    Constant::String(utf8) => ConstantValue::String(pool.get_text(*utf8)?),
                    _ => return Err(ConstPoolError::UnexpectedKind { index, expected: "constant value" }.into()),
                });
            }
        }
        field.signature = common.signature;
        field.deprecated = common.deprecated;
        field.synthetic = common.synthetic;
        field.annotations.extend(common.annotations);
        field.type_annotations.extend(common.type_annotations);
        Ok(field)
    }

    fn read_method(&self, raw: &RawMember<'_>) -> ClassFormatResult<MethodDescriptor> {
        let pool = &self.constant_pool;
        let mut method = MethodDescriptor::new(
            raw.access_flags,
            pool.get_utf8(raw.name_index)?,
            pool.get_utf8(raw.descriptor_index)?,
        );
        let mut common = CommonAttributes::default();
        for attribute in &raw.attributes {
            let attribute_name = pool.get_utf8(attribute.name_index)?;
            if common.accept(attribute_name, attribute.data, pool)? {
                continue;
            }
            match attribute_name {
                names::EXCEPTIONS => {
                    let mut cursor = ByteCursor::new(attribute.data);
                    let count = cursor.u2()?;
                    for _ in 0..count {
                        method.exceptions.push(pool.get_class_name(cursor.u2()?)?.to_string());
                    }
                }
                names::RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS => {
                    method.visible_parameter_annotations = Some(read_parameter_annotations(attribute.data, pool, true)?);
                }
                names::RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS => {
                    method.invisible_parameter_annotations = Some(read_parameter_annotations(attribute.data, pool, false)?);
                }
                names::ANNOTATION_DEFAULT => {
                    let mut cursor = ByteCursor::new(attribute.data);
                    method.annotation_default = Some(read_element_value(&mut cursor, pool)?);
                }
                // Code and its nested attributes never reach a stub
                _ => {}
            }
        }
        method.signature = common.signature;
        method.deprecated = common.deprecated;
        method.synthetic = common.synthetic;
        method.annotations.extend(common.annotations);
        method.type_annotations.extend(common.type_annotations);
        Ok(method)
    }
}
