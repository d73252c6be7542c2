//! The finished class descriptor and its replay into a writer.

use std::collections::BTreeSet;

use log::debug;

use crate::classfile::class_writer::ClassWriter;
use crate::classfile::visitor::ClassVisitor;
use crate::classfile::writer::ClassfileWritable;
use crate::common::config::Config;
use crate::common::error::Result;
use crate::verify::verify;

use super::annotation::{Annotation, TypeAnnotation};
use super::descriptor::{ClassHeader, ClassVersion, FieldDescriptor, InnerClass, MethodDescriptor, OuterClass};
use super::mirror::has_anonymous_or_local_shape;

/// Immutable stub surface of one class, produced by `ClassMirror::finish`.
#[derive(Debug, Clone)]
pub struct ClassDescriptor {
    header: ClassHeader,
    outer_class: Option<OuterClass>,
    inner_classes: BTreeSet<InnerClass>,
    annotations: BTreeSet<Annotation>,
    type_annotations: BTreeSet<TypeAnnotation>,
    fields: BTreeSet<FieldDescriptor>,
    methods: BTreeSet<MethodDescriptor>,
}

impl ClassDescriptor {
    pub(crate) fn new(
        header: ClassHeader,
        outer_class: Option<OuterClass>,
        inner_classes: BTreeSet<InnerClass>,
        annotations: BTreeSet<Annotation>,
        type_annotations: BTreeSet<TypeAnnotation>,
        fields: BTreeSet<FieldDescriptor>,
        methods: BTreeSet<MethodDescriptor>,
    ) -> Self {
        Self { header, outer_class, inner_classes, annotations, type_annotations, fields, methods }
    }

    pub fn header(&self) -> &ClassHeader {
        &self.header
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn version(&self) -> ClassVersion {
        self.header.version
    }

    pub fn access(&self) -> u16 {
        self.header.access
    }

    pub fn super_name(&self) -> Option<&str> {
        self.header.super_name.as_deref()
    }

    pub fn interfaces(&self) -> &[String] {
        &self.header.interfaces
    }

    pub fn outer_class(&self) -> Option<&OuterClass> {
        self.outer_class.as_ref()
    }

    pub fn inner_classes(&self) -> &BTreeSet<InnerClass> {
        &self.inner_classes
    }

    pub fn annotations(&self) -> &BTreeSet<Annotation> {
        &self.annotations
    }

    pub fn type_annotations(&self) -> &BTreeSet<TypeAnnotation> {
        &self.type_annotations
    }

    pub fn fields(&self) -> &BTreeSet<FieldDescriptor> {
        &self.fields
    }

    pub fn methods(&self) -> &BTreeSet<MethodDescriptor> {
        &self.methods
    }

    /// See `ClassMirror::is_anonymous_or_local`. Identity is always set on a
    /// finished descriptor, so this cannot fail.
    pub fn is_anonymous_or_local(&self) -> bool {
        has_anonymous_or_local_shape(&self.header.name, self.outer_class.as_ref(), &self.inner_classes)
    }

    /// Replay the descriptor in canonical order: header, outer class, inner
    /// classes, annotations, type annotations, fields, methods, end.
    pub fn accept<V: ClassVisitor + ?Sized>(&self, visitor: &mut V) -> Result<()> {
        visitor.visit_header(self.header.clone())?;
        if let Some(outer) = &self.outer_class {
            visitor.visit_outer_class(outer.clone())?;
        }
        for inner in &self.inner_classes {
            visitor.visit_inner_class(inner.clone())?;
        }
        for annotation in &self.annotations {
            visitor.visit_annotation(annotation.clone())?;
        }
        for annotation in &self.type_annotations {
            visitor.visit_type_annotation(annotation.clone())?;
        }
        for field in &self.fields {
            visitor.visit_field(field.clone())?;
        }
        for method in &self.methods {
            visitor.visit_method(method.clone())?;
        }
        visitor.visit_end()
    }

    /// Serialize the stub, verifying the assembled class file first when
    /// `config.verify` is set.
    pub fn to_stub_bytes(&self, config: &Config) -> Result<Vec<u8>> {
        let mut writer = ClassWriter::new(config.method_bodies);
        self.accept(&mut writer)?;
        let class_file = writer.into_class_file()?;
        if config.verify {
            verify(&class_file)?;
        }
        let bytes = class_file.to_classfile_bytes()?;
        debug!(
            "{}: stub has {} fields, {} methods, {} bytes",
            self.header.name,
            self.fields.len(),
            self.methods.len(),
            bytes.len()
        );
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::mirror::ClassMirror;
    use crate::classfile::defs::access_flags::*;

    /// Records callback names in order.
    #[derive(Default)]
    struct Trace(Vec<String>);

    impl ClassVisitor for Trace {
        fn visit_header(&mut self, header: ClassHeader) -> Result<()> {
            self.0.push(format!("header {}", header.name));
            Ok(())
        }
        fn visit_outer_class(&mut self, outer: OuterClass) -> Result<()> {
            self.0.push(format!("outer {}", outer.owner));
            Ok(())
        }
        fn visit_annotation(&mut self, annotation: Annotation) -> Result<()> {
            self.0.push(format!("annotation {}", annotation.descriptor()));
            Ok(())
        }
        fn visit_type_annotation(&mut self, annotation: TypeAnnotation) -> Result<()> {
            self.0.push(format!("type annotation {}", annotation.annotation().descriptor()));
            Ok(())
        }
        fn visit_inner_class(&mut self, inner: InnerClass) -> Result<()> {
            self.0.push(format!("inner {}", inner.name));
            Ok(())
        }
        fn visit_field(&mut self, field: FieldDescriptor) -> Result<()> {
            self.0.push(format!("field {}", field.name));
            Ok(())
        }
        fn visit_method(&mut self, method: MethodDescriptor) -> Result<()> {
            self.0.push(format!("method {}{}", method.name, method.descriptor));
            Ok(())
        }
        fn visit_end(&mut self) -> Result<()> {
            self.0.push("end".to_string());
            Ok(())
        }
    }

    #[test]
    fn replays_in_canonical_order() {
        let mut mirror = ClassMirror::new();
        mirror
            .visit_header(ClassHeader::new(ClassVersion::new(52, 0), ACC_PUBLIC, "A", Some("java/lang/Object")))
            .unwrap();
        mirror.visit_annotation(Annotation::new("LZ;", true, vec![])).unwrap();
        mirror.visit_annotation(Annotation::new("LB;", true, vec![])).unwrap();
        mirror.visit_inner_class(InnerClass::new("A$B", Some("A"), Some("B"), ACC_PUBLIC)).unwrap();
        mirror.visit_method(MethodDescriptor::new(ACC_PUBLIC, "z", "()V")).unwrap();
        mirror.visit_method(MethodDescriptor::new(ACC_PUBLIC, "<init>", "()V")).unwrap();
        mirror.visit_field(FieldDescriptor::new(ACC_PUBLIC, "b", "I")).unwrap();
        mirror.visit_field(FieldDescriptor::new(ACC_PUBLIC, "a", "I")).unwrap();
        mirror.visit_end().unwrap();

        let mut trace = Trace::default();
        mirror.finish().unwrap().accept(&mut trace).unwrap();
        assert_eq!(
            trace.0,
            vec![
                "header A",
                "inner A$B",
                "annotation LB;",
                "annotation LZ;",
                "field a",
                "field b",
                "method <init>()V",
                "method z()V",
                "end"
            ]
        );
    }
}
