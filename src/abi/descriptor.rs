//! Structural descriptors: immutable records for the members and links of a
//! class, each ordered by its canonical key.

use std::collections::BTreeSet;

use super::annotation::{Annotation, ElementValue, TypeAnnotation};
use super::ordering::{canonical_ord, or_absent, CanonicalKey};
use crate::classfile::JavaString;

/// Class file format version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClassVersion {
    pub major: u16,
    pub minor: u16,
}

impl ClassVersion {
    pub fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }
}

/// Everything delivered by the header callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassHeader {
    pub version: ClassVersion,
    pub access: u16,
    /// Internal binary name, e.g. `com/example/Foo$Bar`.
    pub name: String,
    pub signature: Option<String>,
    /// Absent only for `java/lang/Object` and `module-info`.
    pub super_name: Option<String>,
    /// Order is significant and preserved.
    pub interfaces: Vec<String>,
    pub deprecated: bool,
    pub synthetic: bool,
}

impl ClassHeader {
    pub fn new(version: ClassVersion, access: u16, name: impl Into<String>, super_name: Option<&str>) -> Self {
        Self {
            version,
            access,
            name: name.into(),
            signature: None,
            super_name: super_name.map(str::to_string),
            interfaces: Vec::new(),
            deprecated: false,
            synthetic: false,
        }
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn with_interfaces<I, S>(mut self, interfaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interfaces = interfaces.into_iter().map(Into::into).collect();
        self
    }
}

/// Compile-time constant of a static field (`ConstantValue` attribute).
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Int(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    String(JavaString),
}

#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub access: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub value: Option<ConstantValue>,
    pub annotations: BTreeSet<Annotation>,
    pub type_annotations: BTreeSet<TypeAnnotation>,
    pub deprecated: bool,
    pub synthetic: bool,
}

impl FieldDescriptor {
    pub fn new(access: u16, name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            access,
            name: name.into(),
            descriptor: descriptor.into(),
            signature: None,
            value: None,
            annotations: BTreeSet::new(),
            type_annotations: BTreeSet::new(),
            deprecated: false,
            synthetic: false,
        }
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn with_value(mut self, value: ConstantValue) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.insert(annotation);
        self
    }

    pub fn with_type_annotation(mut self, annotation: TypeAnnotation) -> Self {
        self.type_annotations.insert(annotation);
        self
    }
}

impl CanonicalKey for FieldDescriptor {
    type Key<'a> = (&'a str, &'a str);

    fn canonical_key(&self) -> Self::Key<'_> {
        (&self.name, &self.descriptor)
    }
}

canonical_ord!(FieldDescriptor);

/// Annotations of every formal parameter of a method, for one visibility.
/// The count comes from the attribute and may differ from the descriptor's.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterAnnotations {
    pub parameters: Vec<BTreeSet<Annotation>>,
}

impl ParameterAnnotations {
    pub fn with_count(count: usize) -> Self {
        Self { parameters: vec![BTreeSet::new(); count] }
    }
}

#[derive(Debug, Clone)]
pub struct MethodDescriptor {
    pub access: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    /// Internal names from the `Exceptions` attribute, in declaration order.
    pub exceptions: Vec<String>,
    pub annotations: BTreeSet<Annotation>,
    pub type_annotations: BTreeSet<TypeAnnotation>,
    pub visible_parameter_annotations: Option<ParameterAnnotations>,
    pub invisible_parameter_annotations: Option<ParameterAnnotations>,
    /// Default value of an annotation interface element.
    pub annotation_default: Option<ElementValue>,
    pub deprecated: bool,
    pub synthetic: bool,
}

impl MethodDescriptor {
    pub fn new(access: u16, name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            access,
            name: name.into(),
            descriptor: descriptor.into(),
            signature: None,
            exceptions: Vec::new(),
            annotations: BTreeSet::new(),
            type_annotations: BTreeSet::new(),
            visible_parameter_annotations: None,
            invisible_parameter_annotations: None,
            annotation_default: None,
            deprecated: false,
            synthetic: false,
        }
    }

    pub fn with_signature(mut self, signature: impl Into<String>) -> Self {
        self.signature = Some(signature.into());
        self
    }

    pub fn with_exceptions<I, S>(mut self, exceptions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exceptions = exceptions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_annotation(mut self, annotation: Annotation) -> Self {
        self.annotations.insert(annotation);
        self
    }

    pub fn with_type_annotation(mut self, annotation: TypeAnnotation) -> Self {
        self.type_annotations.insert(annotation);
        self
    }

    /// Attach a parameter annotation, growing the per-parameter table of the
    /// annotation's visibility as needed.
    pub fn with_parameter_annotation(mut self, parameter: usize, annotation: Annotation) -> Self {
        let table = if annotation.is_visible() {
            self.visible_parameter_annotations.get_or_insert_with(Default::default)
        } else {
            self.invisible_parameter_annotations.get_or_insert_with(Default::default)
        };
        if table.parameters.len() <= parameter {
            table.parameters.resize(parameter + 1, BTreeSet::new());
        }
        table.parameters[parameter].insert(annotation);
        self
    }

    pub fn with_annotation_default(mut self, value: ElementValue) -> Self {
        self.annotation_default = Some(value);
        self
    }
}

impl CanonicalKey for MethodDescriptor {
    type Key<'a> = (&'a str, &'a str);

    fn canonical_key(&self) -> Self::Key<'_> {
        (&self.name, &self.descriptor)
    }
}

canonical_ord!(MethodDescriptor);

/// One `InnerClasses` entry: records that `name` is nested in `outer_name`.
#[derive(Debug, Clone)]
pub struct InnerClass {
    pub name: String,
    /// Absent for anonymous and local classes.
    pub outer_name: Option<String>,
    /// Absent for anonymous classes.
    pub inner_name: Option<String>,
    pub access: u16,
}

impl InnerClass {
    pub fn new(name: impl Into<String>, outer_name: Option<&str>, inner_name: Option<&str>, access: u16) -> Self {
        Self {
            name: name.into(),
            outer_name: outer_name.map(str::to_string),
            inner_name: inner_name.map(str::to_string),
            access,
        }
    }
}

impl CanonicalKey for InnerClass {
    type Key<'a> = (&'a str, &'a str, &'a str);

    fn canonical_key(&self) -> Self::Key<'_> {
        (
            &self.name,
            or_absent(self.outer_name.as_deref()),
            or_absent(self.inner_name.as_deref()),
        )
    }
}

canonical_ord!(InnerClass);

/// The `EnclosingMethod` attribute of a local or anonymous class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OuterClass {
    pub owner: String,
    pub method_name: Option<String>,
    pub method_descriptor: Option<String>,
}

impl OuterClass {
    pub fn new(owner: impl Into<String>, method_name: Option<&str>, method_descriptor: Option<&str>) -> Self {
        Self {
            owner: owner.into(),
            method_name: method_name.map(str::to_string),
            method_descriptor: method_descriptor.map(str::to_string),
        }
    }
}
