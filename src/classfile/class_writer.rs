//! Class file writer: a `ClassVisitor` that serializes what it is fed.
//!
//! Members and links are encoded in the order they are visited, and constant
//! pool entries are interned on first use. Feeding the same callbacks in the
//! same order therefore always yields the same bytes.

use log::trace;

use crate::abi::annotation::{Annotation, TypeAnnotation};
use crate::abi::descriptor::{
    ClassHeader, ConstantValue, FieldDescriptor, InnerClass, MethodDescriptor, OuterClass,
};
use crate::common::config::MethodBodyStyle;
use crate::common::error::{Error, Result};

use super::annotation::{write_annotations, write_element_value, write_parameter_annotations, write_type_annotations};
use super::attribute::{
    make_code_attribute, make_exceptions_attribute, make_index_attribute, make_marker_attribute, AttributeInfo,
    CodeAttribute,
};
use super::class::ClassFile;
use super::constpool::ConstantPool;
use super::defs::access_flags::{ACC_ABSTRACT, ACC_NATIVE, ACC_STATIC};
use super::defs::attribute_names as names;
use super::descriptor::argument_slots;
use super::error::{ClassGenerationError, ConstPoolResult};
use super::field::FieldInfo;
use super::method::MethodInfo;
use super::visitor::ClassVisitor;
use super::writer::ClassfileWritable;

/// Attributes shared by classes, fields and methods, appended in a fixed order.
fn push_common_attributes(
    pool: &mut ConstantPool,
    attributes: &mut Vec<AttributeInfo>,
    signature: Option<&str>,
    deprecated: bool,
    synthetic: bool,
) -> ConstPoolResult<()> {
    if let Some(signature) = signature {
        let index = pool.add_utf8(signature)?;
        attributes.push(make_index_attribute(pool, names::SIGNATURE, index)?);
    }
    if deprecated {
        attributes.push(make_marker_attribute(pool, names::DEPRECATED)?);
    }
    if synthetic {
        attributes.push(make_marker_attribute(pool, names::SYNTHETIC)?);
    }
    Ok(())
}

/// Split annotations by retention and emit one attribute per non-empty side.
fn push_annotation_attributes<'a, I>(pool: &mut ConstantPool, attributes: &mut Vec<AttributeInfo>, annotations: I) -> ConstPoolResult<()>
where
    I: IntoIterator<Item = &'a Annotation>,
{
    let (visible, invisible): (Vec<&Annotation>, Vec<&Annotation>) =
        annotations.into_iter().partition(|annotation| annotation.is_visible());
    if !visible.is_empty() {
        let info = write_annotations(pool, visible.into_iter())?;
        attributes.push(AttributeInfo::named(pool, names::RUNTIME_VISIBLE_ANNOTATIONS, info)?);
    }
    if !invisible.is_empty() {
        let info = write_annotations(pool, invisible.into_iter())?;
        attributes.push(AttributeInfo::named(pool, names::RUNTIME_INVISIBLE_ANNOTATIONS, info)?);
    }
    Ok(())
}

fn push_type_annotation_attributes<'a, I>(pool: &mut ConstantPool, attributes: &mut Vec<AttributeInfo>, annotations: I) -> ConstPoolResult<()>
where
    I: IntoIterator<Item = &'a TypeAnnotation>,
{
    let (visible, invisible): (Vec<&TypeAnnotation>, Vec<&TypeAnnotation>) =
        annotations.into_iter().partition(|annotation| annotation.is_visible());
    if !visible.is_empty() {
        let info = write_type_annotations(pool, visible.into_iter())?;
        attributes.push(AttributeInfo::named(pool, names::RUNTIME_VISIBLE_TYPE_ANNOTATIONS, info)?);
    }
    if !invisible.is_empty() {
        let info = write_type_annotations(pool, invisible.into_iter())?;
        attributes.push(AttributeInfo::named(pool, names::RUNTIME_INVISIBLE_TYPE_ANNOTATIONS, info)?);
    }
    Ok(())
}

fn intern_constant_value(pool: &mut ConstantPool, value: &ConstantValue) -> ConstPoolResult<u16> {
    match value {
        ConstantValue::Int(v) => pool.add_integer(*v),
        ConstantValue::Float(v) => pool.add_float(*v),
        ConstantValue::Long(v) => pool.add_long(*v),
        ConstantValue::Double(v) => pool.add_double(*v),
        ConstantValue::String(v) => pool.add_string(v),
    }
}

fn check_count(what: &'static str, count: usize) -> Result<()> {
    if count > u16::MAX as usize {
        return Err(ClassGenerationError::TooMany { what, count }.into());
    }
    Ok(())
}

/// Serializes visitor callbacks into a `ClassFile`.
#[derive(Debug)]
pub struct ClassWriter {
    body_style: MethodBodyStyle,
    class_file: ClassFile,
    header: Option<ClassHeader>,
    outer_class: Option<OuterClass>,
    annotations: Vec<Annotation>,
    type_annotations: Vec<TypeAnnotation>,
    inner_classes: Vec<InnerClass>,
    ended: bool,
}

impl ClassWriter {
    pub fn new(body_style: MethodBodyStyle) -> Self {
        Self {
            body_style,
            class_file: ClassFile::new(),
            header: None,
            outer_class: None,
            annotations: Vec::new(),
            type_annotations: Vec::new(),
            inner_classes: Vec::new(),
            ended: false,
        }
    }

    fn pool(&mut self) -> &mut ConstantPool {
        &mut self.class_file.constant_pool
    }

    fn require_header(&self, callback: &str) -> Result<()> {
        if self.header.is_none() {
            return Err(Error::precondition(format!("{} visited before the class header", callback)));
        }
        if self.ended {
            return Err(Error::precondition(format!("{} visited after the end of the class", callback)));
        }
        Ok(())
    }

    fn method_body(&self, method: &MethodDescriptor) -> Option<CodeAttribute> {
        if method.access & (ACC_ABSTRACT | ACC_NATIVE) != 0 {
            return None;
        }
        match self.body_style {
            MethodBodyStyle::Omit => None,
            MethodBodyStyle::ThrowNull => {
                let receiver = if method.access & ACC_STATIC != 0 { 0 } else { 1 };
                Some(CodeAttribute::throw_null(argument_slots(&method.descriptor).saturating_add(receiver)))
            }
        }
    }

    /// Finish assembly. Fails unless both the header and the end callback
    /// have been seen.
    pub fn into_class_file(self) -> Result<ClassFile> {
        if self.header.is_none() {
            return Err(Error::precondition("class file requested before the class header was visited"));
        }
        if !self.ended {
            return Err(Error::precondition("class file requested before the end of the class was visited"));
        }
        check_count("interfaces", self.class_file.interfaces.len())?;
        check_count("fields", self.class_file.fields.len())?;
        check_count("methods", self.class_file.methods.len())?;
        check_count("inner classes", self.inner_classes.len())?;
        Ok(self.class_file)
    }

    pub fn into_bytes(self) -> Result<Vec<u8>> {
        Ok(self.into_class_file()?.to_classfile_bytes()?)
    }
}

impl ClassVisitor for ClassWriter {
    fn visit_header(&mut self, header: ClassHeader) -> Result<()> {
        if self.header.is_some() {
            return Err(Error::precondition(format!("class header visited twice ({})", header.name)));
        }
        trace!("writing {}", header.name);
        let pool = &mut self.class_file.constant_pool;
        self.class_file.minor_version = header.version.minor;
        self.class_file.major_version = header.version.major;
        self.class_file.access_flags = header.access;
        self.class_file.this_class = pool.add_class(&header.name)?;
        self.class_file.super_class = match &header.super_name {
            Some(super_name) => pool.add_class(super_name)?,
            None => 0,
        };
        for interface in &header.interfaces {
            let index = pool.add_class(interface)?;
            self.class_file.interfaces.push(index);
        }
        self.header = Some(header);
        Ok(())
    }

    fn visit_outer_class(&mut self, outer: OuterClass) -> Result<()> {
        self.require_header("outer class")?;
        self.outer_class = Some(outer);
        Ok(())
    }

    fn visit_annotation(&mut self, annotation: Annotation) -> Result<()> {
        self.require_header("annotation")?;
        self.annotations.push(annotation);
        Ok(())
    }

    fn visit_type_annotation(&mut self, annotation: TypeAnnotation) -> Result<()> {
        self.require_header("type annotation")?;
        self.type_annotations.push(annotation);
        Ok(())
    }

    fn visit_inner_class(&mut self, inner: InnerClass) -> Result<()> {
        self.require_header("inner class")?;
        self.inner_classes.push(inner);
        Ok(())
    }

    fn visit_field(&mut self, field: FieldDescriptor) -> Result<()> {
        self.require_header("field")?;
        let pool = self.pool();
        let mut info = FieldInfo::new(field.access, pool.add_utf8(&field.name)?, pool.add_utf8(&field.descriptor)?);
        if let Some(value) = &field.value {
            let index = intern_constant_value(pool, value)?;
            info.attributes.push(make_index_attribute(pool, names::CONSTANT_VALUE, index)?);
        }
        push_common_attributes(pool, &mut info.attributes, field.signature.as_deref(), field.deprecated, field.synthetic)?;
        push_annotation_attributes(pool, &mut info.attributes, &field.annotations)?;
        push_type_annotation_attributes(pool, &mut info.attributes, &field.type_annotations)?;
        self.class_file.fields.push(info);
        Ok(())
    }

    fn visit_method(&mut self, method: MethodDescriptor) -> Result<()> {
        self.require_header("method")?;
        let body = self.method_body(&method);
        let pool = self.pool();
        let mut info = MethodInfo::new(method.access, pool.add_utf8(&method.name)?, pool.add_utf8(&method.descriptor)?);
        if let Some(body) = &body {
            info.attributes.push(make_code_attribute(pool, body)?);
        }
        if !method.exceptions.is_empty() {
            info.attributes.push(make_exceptions_attribute(pool, &method.exceptions)?);
        }
        push_common_attributes(pool, &mut info.attributes, method.signature.as_deref(), method.deprecated, method.synthetic)?;
        if let Some(default) = &method.annotation_default {
            let mut data = Vec::new();
            write_element_value(&mut data, pool, default)?;
            info.attributes.push(AttributeInfo::named(pool, names::ANNOTATION_DEFAULT, data)?);
        }
        push_annotation_attributes(pool, &mut info.attributes, &method.annotations)?;
        if let Some(table) = &method.visible_parameter_annotations {
            let data = write_parameter_annotations(pool, table)?;
            info.attributes.push(AttributeInfo::named(pool, names::RUNTIME_VISIBLE_PARAMETER_ANNOTATIONS, data)?);
        }
        if let Some(table) = &method.invisible_parameter_annotations {
            let data = write_parameter_annotations(pool, table)?;
            info.attributes.push(AttributeInfo::named(pool, names::RUNTIME_INVISIBLE_PARAMETER_ANNOTATIONS, data)?);
        }
        push_type_annotation_attributes(pool, &mut info.attributes, &method.type_annotations)?;
        self.class_file.methods.push(info);
        Ok(())
    }

    fn visit_end(&mut self) -> Result<()> {
        self.require_header("end")?;
        let header = match &self.header {
            Some(header) => header,
            None => return Err(Error::precondition("end visited before the class header")),
        };
        let pool = &mut self.class_file.constant_pool;
        let mut attributes = Vec::new();
        push_common_attributes(pool, &mut attributes, header.signature.as_deref(), header.deprecated, header.synthetic)?;

        if let Some(outer) = &self.outer_class {
            let mut data = Vec::with_capacity(4);
            data.extend_from_slice(&pool.add_class(&outer.owner)?.to_be_bytes());
            let method_index = match (&outer.method_name, &outer.method_descriptor) {
                (Some(name), Some(descriptor)) => pool.add_name_and_type(name, descriptor)?,
                _ => 0,
            };
            data.extend_from_slice(&method_index.to_be_bytes());
            attributes.push(AttributeInfo::named(pool, names::ENCLOSING_METHOD, data)?);
        }

        if !self.inner_classes.is_empty() {
            check_count("inner classes", self.inner_classes.len())?;
            let mut data = Vec::with_capacity(2 + self.inner_classes.len() * 8);
            data.extend_from_slice(&(self.inner_classes.len() as u16).to_be_bytes());
            for inner in &self.inner_classes {
                let name = pool.add_class(&inner.name)?;
                let outer = match &inner.outer_name {
                    Some(outer_name) => pool.add_class(outer_name)?,
                    None => 0,
                };
                let simple = match &inner.inner_name {
                    Some(inner_name) => pool.add_utf8(inner_name)?,
                    None => 0,
                };
                for index in [name, outer, simple, inner.access] {
                    data.extend_from_slice(&index.to_be_bytes());
                }
            }
            attributes.push(AttributeInfo::named(pool, names::INNER_CLASSES, data)?);
        }

        push_annotation_attributes(pool, &mut attributes, &self.annotations)?;
        push_type_annotation_attributes(pool, &mut attributes, &self.type_annotations)?;

        self.class_file.attributes = attributes;
        self.ended = true;
        Ok(())
    }
}
