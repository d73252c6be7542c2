//! Class descriptor accumulator.
//!
//! `ClassMirror` sits on the receiving end of a `ClassReader` traversal. Every
//! callback is run through the membership classifier; survivors land in
//! ordered sets, so the finished descriptor is independent of the order the
//! input delivered them in.

use std::collections::BTreeSet;

use log::debug;

use crate::classfile::visitor::ClassVisitor;
use crate::common::error::{Error, Result};

use super::annotation::{Annotation, TypeAnnotation};
use super::classifier::{classify_field, classify_inner_class, classify_method, Membership};
use super::descriptor::{ClassHeader, FieldDescriptor, InnerClass, MethodDescriptor, OuterClass};
use super::emit::ClassDescriptor;

/// Mutable builder populated by one traversal.
#[derive(Debug, Default)]
pub struct ClassMirror {
    header: Option<ClassHeader>,
    outer_class: Option<OuterClass>,
    inner_classes: BTreeSet<InnerClass>,
    annotations: BTreeSet<Annotation>,
    type_annotations: BTreeSet<TypeAnnotation>,
    fields: BTreeSet<FieldDescriptor>,
    methods: BTreeSet<MethodDescriptor>,
}

/// Shared by the mirror and the finished descriptor.
pub(crate) fn has_anonymous_or_local_shape(
    name: &str,
    outer_class: Option<&OuterClass>,
    inner_classes: &BTreeSet<InnerClass>,
) -> bool {
    outer_class.is_some()
        && inner_classes
            .iter()
            .any(|inner| inner.name == name && inner.outer_name.is_none())
}

impl ClassMirror {
    pub fn new() -> Self {
        Self::default()
    }

    fn identity(&self, operation: &str) -> Result<&ClassHeader> {
        self.header
            .as_ref()
            .ok_or_else(|| Error::precondition(format!("{} requires the class header to have been visited", operation)))
    }

    /// True when the class is anonymous or local: it has an enclosing-method
    /// link and lists itself as a nested type without an outer class.
    pub fn is_anonymous_or_local(&self) -> Result<bool> {
        let header = self.identity("anonymous or local class check")?;
        Ok(has_anonymous_or_local_shape(&header.name, self.outer_class.as_ref(), &self.inner_classes))
    }

    /// Freeze the accumulated state.
    pub fn finish(self) -> Result<ClassDescriptor> {
        let header = match self.header {
            Some(header) => header,
            None => return Err(Error::precondition("finish requires the class header to have been visited")),
        };
        Ok(ClassDescriptor::new(
            header,
            self.outer_class,
            self.inner_classes,
            self.annotations,
            self.type_annotations,
            self.fields,
            self.methods,
        ))
    }
}

impl ClassVisitor for ClassMirror {
    fn visit_header(&mut self, header: ClassHeader) -> Result<()> {
        if let Some(existing) = &self.header {
            return Err(Error::precondition(format!(
                "class header for {} visited while {} is already set",
                header.name, existing.name
            )));
        }
        self.header = Some(header);
        Ok(())
    }

    fn visit_outer_class(&mut self, outer: OuterClass) -> Result<()> {
        self.identity("enclosing method link")?;
        self.outer_class = Some(outer);
        Ok(())
    }

    fn visit_annotation(&mut self, annotation: Annotation) -> Result<()> {
        self.identity("class annotation")?;
        self.annotations.insert(annotation);
        Ok(())
    }

    fn visit_type_annotation(&mut self, annotation: TypeAnnotation) -> Result<()> {
        self.identity("class type annotation")?;
        self.type_annotations.insert(annotation);
        Ok(())
    }

    fn visit_inner_class(&mut self, inner: InnerClass) -> Result<()> {
        let this_class = self.identity("inner class link")?.name.clone();
        match classify_inner_class(&inner, &this_class) {
            Membership::Retain => {
                self.inner_classes.insert(inner);
            }
            Membership::Drop(reason) => debug!("{}: dropping inner class {} ({:?})", this_class, inner.name, reason),
        }
        Ok(())
    }

    fn visit_field(&mut self, field: FieldDescriptor) -> Result<()> {
        let this_class = self.identity("field")?.name.clone();
        match classify_field(&field) {
            Membership::Retain => {
                self.fields.insert(field);
            }
            Membership::Drop(reason) => {
                debug!("{}: dropping field {} {} ({:?})", this_class, field.name, field.descriptor, reason)
            }
        }
        Ok(())
    }

    fn visit_method(&mut self, method: MethodDescriptor) -> Result<()> {
        let this_class = self.identity("method")?.name.clone();
        match classify_method(&method) {
            Membership::Retain => {
                self.methods.insert(method);
            }
            Membership::Drop(reason) => {
                debug!("{}: dropping method {}{} ({:?})", this_class, method.name, method.descriptor, reason)
            }
        }
        Ok(())
    }

    fn visit_end(&mut self) -> Result<()> {
        self.identity("end of class")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::descriptor::ClassVersion;
    use crate::classfile::defs::access_flags::*;

    fn header(name: &str) -> ClassHeader {
        ClassHeader::new(ClassVersion::new(52, 0), ACC_PUBLIC | ACC_SUPER, name, Some("java/lang/Object"))
    }

    #[test]
    fn filters_private_members_and_static_initializer() {
        let mut mirror = ClassMirror::new();
        mirror.visit_header(header("Foo")).unwrap();
        mirror.visit_field(FieldDescriptor::new(ACC_PRIVATE, "x", "I")).unwrap();
        mirror.visit_field(FieldDescriptor::new(ACC_PUBLIC, "y", "I")).unwrap();
        mirror.visit_method(MethodDescriptor::new(ACC_PUBLIC, "bar", "()V")).unwrap();
        mirror.visit_method(MethodDescriptor::new(ACC_PRIVATE, "secret", "()V")).unwrap();
        mirror.visit_method(MethodDescriptor::new(ACC_STATIC, "<clinit>", "()V")).unwrap();
        mirror.visit_end().unwrap();

        let class = mirror.finish().unwrap();
        let fields: Vec<_> = class.fields().iter().map(|f| f.name.as_str()).collect();
        let methods: Vec<_> = class.methods().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(fields, vec!["y"]);
        assert_eq!(methods, vec!["bar"]);
    }

    #[test]
    fn detects_anonymous_class() {
        let mut mirror = ClassMirror::new();
        mirror.visit_header(header("Foo$1")).unwrap();
        mirror.visit_outer_class(OuterClass::new("Foo", Some("run"), Some("()V"))).unwrap();
        mirror.visit_inner_class(InnerClass::new("Foo$1", None, None, 0)).unwrap();
        assert!(mirror.is_anonymous_or_local().unwrap());
    }

    #[test]
    fn member_class_is_not_anonymous() {
        let mut mirror = ClassMirror::new();
        mirror.visit_header(header("Foo$Bar")).unwrap();
        mirror.visit_inner_class(InnerClass::new("Foo$Bar", Some("Foo"), Some("Bar"), ACC_PUBLIC)).unwrap();
        assert!(!mirror.is_anonymous_or_local().unwrap());

        // an enclosing link alone is not enough
        let mut mirror = ClassMirror::new();
        mirror.visit_header(header("Foo$1")).unwrap();
        mirror.visit_outer_class(OuterClass::new("Foo", None, None)).unwrap();
        assert!(!mirror.is_anonymous_or_local().unwrap());
    }

    #[test]
    fn keeps_only_self_relevant_inner_classes() {
        let mut mirror = ClassMirror::new();
        mirror.visit_header(header("Outer")).unwrap();
        mirror.visit_inner_class(InnerClass::new("Unrelated$Ref", Some("Unrelated"), Some("Ref"), ACC_PUBLIC)).unwrap();
        mirror.visit_inner_class(InnerClass::new("Outer$Inner", Some("Outer"), Some("Inner"), ACC_PUBLIC)).unwrap();
        mirror.visit_inner_class(InnerClass::new("Outer$Hidden", Some("Outer"), Some("Hidden"), ACC_PRIVATE)).unwrap();
        let class = mirror.finish().unwrap();
        let names: Vec<_> = class.inner_classes().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Outer$Inner"]);
    }

    #[test]
    fn protocol_violations_are_errors() {
        let mut mirror = ClassMirror::new();
        assert!(matches!(mirror.is_anonymous_or_local(), Err(Error::Precondition { .. })));
        assert!(matches!(
            mirror.visit_inner_class(InnerClass::new("A$B", Some("A"), Some("B"), 0)),
            Err(Error::Precondition { .. })
        ));
        assert!(matches!(mirror.visit_field(FieldDescriptor::new(ACC_PUBLIC, "f", "I")), Err(Error::Precondition { .. })));
        assert!(matches!(
            mirror.visit_method(MethodDescriptor::new(ACC_PUBLIC, "m", "()V")),
            Err(Error::Precondition { .. })
        ));
        assert!(matches!(
            mirror.visit_annotation(Annotation::new("LA;", true, vec![])),
            Err(Error::Precondition { .. })
        ));
        assert!(matches!(mirror.visit_outer_class(OuterClass::new("O", None, None)), Err(Error::Precondition { .. })));
        assert!(matches!(mirror.visit_end(), Err(Error::Precondition { .. })));

        // nothing leaked into the mirror before the header arrived
        mirror.visit_header(header("A")).unwrap();
        assert!(matches!(mirror.visit_header(header("B")), Err(Error::Precondition { .. })));
        mirror.visit_end().unwrap();
        let class = mirror.finish().unwrap();
        assert!(class.fields().is_empty() && class.methods().is_empty() && class.annotations().is_empty());
        assert_eq!(class.outer_class(), None);
        assert!(matches!(ClassMirror::new().finish(), Err(Error::Precondition { .. })));
    }

    #[test]
    fn duplicate_members_collapse() {
        let mut mirror = ClassMirror::new();
        mirror.visit_header(header("A")).unwrap();
        mirror.visit_method(MethodDescriptor::new(ACC_PUBLIC, "m", "()V")).unwrap();
        mirror.visit_method(MethodDescriptor::new(ACC_PUBLIC, "m", "()V")).unwrap();
        assert_eq!(mirror.finish().unwrap().methods().len(), 1);
    }
}
