//! Annotation and type-annotation descriptors.
//!
//! Both kinds are ordered by their canonical encoded form. The encoding is
//! independent of any constant pool: strings are written inline, numbers by
//! their bit patterns. Element-value pairs keep their source order.

use super::ordering::{canonical_ord, CanonicalKey};
use crate::classfile::JavaString;

/// Value of an annotation element (JVMS 4.7.16.1).
#[derive(Debug, Clone, PartialEq)]
pub enum ElementValue {
    Byte(i8),
    Char(u16),
    Double(f64),
    Float(f32),
    Int(i32),
    Long(i64),
    Short(i16),
    Boolean(bool),
    String(JavaString),
    Enum { type_descriptor: String, const_name: String },
    Class(String),
    Annotation { descriptor: String, elements: Vec<ElementPair> },
    Array(Vec<ElementValue>),
}

/// A named element inside an annotation.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementPair {
    pub name: String,
    pub value: ElementValue,
}

impl ElementPair {
    pub fn new(name: impl Into<String>, value: ElementValue) -> Self {
        Self { name: name.into(), value }
    }
}

impl ElementValue {
    /// The JVMS tag character of the value.
    pub fn tag(&self) -> u8 {
        match self {
            ElementValue::Byte(_) => b'B',
            ElementValue::Char(_) => b'C',
            ElementValue::Double(_) => b'D',
            ElementValue::Float(_) => b'F',
            ElementValue::Int(_) => b'I',
            ElementValue::Long(_) => b'J',
            ElementValue::Short(_) => b'S',
            ElementValue::Boolean(_) => b'Z',
            ElementValue::String(_) => b's',
            ElementValue::Enum { .. } => b'e',
            ElementValue::Class(_) => b'c',
            ElementValue::Annotation { .. } => b'@',
            ElementValue::Array(_) => b'[',
        }
    }

    pub(crate) fn encode_canonical(&self, out: &mut Vec<u8>) {
        out.push(self.tag());
        match self {
            ElementValue::Byte(v) => out.extend_from_slice(&(*v as i32).to_be_bytes()),
            ElementValue::Char(v) => out.extend_from_slice(&(*v as i32).to_be_bytes()),
            ElementValue::Short(v) => out.extend_from_slice(&(*v as i32).to_be_bytes()),
            ElementValue::Boolean(v) => out.extend_from_slice(&(*v as i32).to_be_bytes()),
            ElementValue::Int(v) => out.extend_from_slice(&v.to_be_bytes()),
            ElementValue::Long(v) => out.extend_from_slice(&v.to_be_bytes()),
            ElementValue::Float(v) => out.extend_from_slice(&v.to_bits().to_be_bytes()),
            ElementValue::Double(v) => out.extend_from_slice(&v.to_bits().to_be_bytes()),
            ElementValue::String(s) => encode_text(s, out),
            ElementValue::Class(s) => encode_str(s, out),
            ElementValue::Enum { type_descriptor, const_name } => {
                encode_str(type_descriptor, out);
                encode_str(const_name, out);
            }
            ElementValue::Annotation { descriptor, elements } => {
                encode_str(descriptor, out);
                encode_pairs(elements, out);
            }
            ElementValue::Array(values) => {
                out.extend_from_slice(&(values.len() as u32).to_be_bytes());
                for value in values {
                    value.encode_canonical(out);
                }
            }
        }
    }
}

fn encode_str(value: &str, out: &mut Vec<u8>) {
    out.extend_from_slice(&(value.len() as u32).to_be_bytes());
    out.extend_from_slice(value.as_bytes());
}

fn encode_text(value: &JavaString, out: &mut Vec<u8>) {
    out.extend_from_slice(&(value.units().len() as u32).to_be_bytes());
    for unit in value.units() {
        out.extend_from_slice(&unit.to_be_bytes());
    }
}

fn encode_pairs(elements: &[ElementPair], out: &mut Vec<u8>) {
    out.extend_from_slice(&(elements.len() as u32).to_be_bytes());
    for pair in elements {
        encode_str(&pair.name, out);
        pair.value.encode_canonical(out);
    }
}

/// A declaration annotation on a class, field, method or parameter.
#[derive(Debug, Clone)]
pub struct Annotation {
    descriptor: String,
    visible: bool,
    elements: Vec<ElementPair>,
    elements_key: Vec<u8>,
}

impl Annotation {
    pub fn new(descriptor: impl Into<String>, visible: bool, elements: Vec<ElementPair>) -> Self {
        let mut elements_key = Vec::new();
        encode_pairs(&elements, &mut elements_key);
        Self { descriptor: descriptor.into(), visible, elements, elements_key }
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Runtime-visible (retention RUNTIME) versus class-file-only.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn elements(&self) -> &[ElementPair] {
        &self.elements
    }
}

impl CanonicalKey for Annotation {
    type Key<'a> = (&'a str, bool, &'a [u8]);

    fn canonical_key(&self) -> Self::Key<'_> {
        (&self.descriptor, self.visible, &self.elements_key)
    }
}

canonical_ord!(Annotation);

/// Location of a type annotation in a class, field or method signature
/// (JVMS 4.7.20.1). Targets inside method bodies never reach a stub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TargetInfo {
    /// 0x00 class type parameter, 0x01 method type parameter
    TypeParameter { index: u8 },
    /// 0x10 extends/implements clause; 65535 names the superclass
    Supertype { index: u16 },
    /// 0x11 class type parameter bound, 0x12 method type parameter bound
    TypeParameterBound { type_parameter: u8, bound: u8 },
    /// 0x13 field, 0x14 method return or constructed type, 0x15 receiver
    Empty,
    /// 0x16
    FormalParameter { index: u8 },
    /// 0x17
    Throws { index: u16 },
}

impl TargetInfo {
    pub(crate) fn write(&self, out: &mut Vec<u8>) {
        match *self {
            TargetInfo::TypeParameter { index } => out.push(index),
            TargetInfo::Supertype { index } => out.extend_from_slice(&index.to_be_bytes()),
            TargetInfo::TypeParameterBound { type_parameter, bound } => {
                out.push(type_parameter);
                out.push(bound);
            }
            TargetInfo::Empty => {}
            TargetInfo::FormalParameter { index } => out.push(index),
            TargetInfo::Throws { index } => out.extend_from_slice(&index.to_be_bytes()),
        }
    }
}

/// One step of a type path: `(type_path_kind, type_argument_index)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TypePathStep {
    pub kind: u8,
    pub argument_index: u8,
}

/// The type path locating the annotated part of a compound type.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct TypePath {
    pub steps: Vec<TypePathStep>,
}

impl TypePath {
    pub(crate) fn write(&self, out: &mut Vec<u8>) {
        out.push(self.steps.len() as u8);
        for step in &self.steps {
            out.push(step.kind);
            out.push(step.argument_index);
        }
    }
}

/// A type annotation: an annotation plus the site it applies to.
#[derive(Debug, Clone)]
pub struct TypeAnnotation {
    target_type: u8,
    target_info: TargetInfo,
    type_path: TypePath,
    annotation: Annotation,
    site_key: Vec<u8>,
}

impl TypeAnnotation {
    pub fn new(target_type: u8, target_info: TargetInfo, type_path: TypePath, annotation: Annotation) -> Self {
        let mut site_key = vec![target_type];
        target_info.write(&mut site_key);
        type_path.write(&mut site_key);
        Self { target_type, target_info, type_path, annotation, site_key }
    }

    pub fn target_type(&self) -> u8 {
        self.target_type
    }

    pub fn target_info(&self) -> &TargetInfo {
        &self.target_info
    }

    pub fn type_path(&self) -> &TypePath {
        &self.type_path
    }

    pub fn annotation(&self) -> &Annotation {
        &self.annotation
    }

    pub fn is_visible(&self) -> bool {
        self.annotation.visible
    }

    /// `target_type`, `target_info` and `type_path` exactly as they appear in
    /// the class file.
    pub(crate) fn site_bytes(&self) -> &[u8] {
        &self.site_key
    }
}

impl CanonicalKey for TypeAnnotation {
    type Key<'a> = (&'a [u8], (&'a str, bool, &'a [u8]));

    fn canonical_key(&self) -> Self::Key<'_> {
        (&self.site_key, self.annotation.canonical_key())
    }
}

canonical_ord!(TypeAnnotation);
