//! The callback interface between the class file codec and its consumers.
//!
//! `ClassReader` drives an implementation through one class; `ClassWriter`
//! implements it to serialize whatever it is fed; `ClassMirror` implements it
//! to accumulate the stub surface. Member callbacks carry their own
//! annotations.

use crate::abi::annotation::{Annotation, TypeAnnotation};
use crate::abi::descriptor::{ClassHeader, FieldDescriptor, InnerClass, MethodDescriptor, OuterClass};
use crate::common::error::Result;

pub trait ClassVisitor {
    /// Always the first callback.
    fn visit_header(&mut self, header: ClassHeader) -> Result<()>;

    fn visit_outer_class(&mut self, outer: OuterClass) -> Result<()>;

    fn visit_annotation(&mut self, annotation: Annotation) -> Result<()>;

    fn visit_type_annotation(&mut self, annotation: TypeAnnotation) -> Result<()>;

    fn visit_inner_class(&mut self, inner: InnerClass) -> Result<()>;

    fn visit_field(&mut self, field: FieldDescriptor) -> Result<()>;

    fn visit_method(&mut self, method: MethodDescriptor) -> Result<()>;

    /// Always the last callback.
    fn visit_end(&mut self) -> Result<()>;
}
