// Common test utilities
#![allow(dead_code)]

use abistub::abi::{ClassHeader, ClassVersion, FieldDescriptor, InnerClass, MethodDescriptor, OuterClass};
use abistub::classfile::defs::access_flags::*;
use abistub::classfile::{ClassFile, ClassVisitor, ClassWriter};
use abistub::MethodBodyStyle;

/// Route `log` output through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn header(name: &str) -> ClassHeader {
    ClassHeader::new(ClassVersion::new(52, 0), ACC_PUBLIC | ACC_SUPER, name, Some("java/lang/Object"))
}

/// Assemble a class file by feeding callbacks to a `ClassWriter` in the order given.
pub fn build_class_file<F>(header: ClassHeader, body: F) -> ClassFile
where
    F: FnOnce(&mut ClassWriter),
{
    let mut writer = ClassWriter::new(MethodBodyStyle::ThrowNull);
    writer.visit_header(header).unwrap();
    body(&mut writer);
    writer.visit_end().unwrap();
    writer.into_class_file().unwrap()
}

pub fn build_class<F>(header: ClassHeader, body: F) -> Vec<u8>
where
    F: FnOnce(&mut ClassWriter),
{
    use abistub::classfile::ClassfileWritable;
    build_class_file(header, body).to_classfile_bytes().unwrap()
}

/// `Foo { private int x; public int y; public void bar(); private void secret(); static <clinit> }`
/// with members delivered in declaration order or reversed.
pub fn foo_class(reversed: bool) -> Vec<u8> {
    let mut fields = vec![
        FieldDescriptor::new(ACC_PRIVATE, "x", "I"),
        FieldDescriptor::new(ACC_PUBLIC, "y", "I"),
    ];
    let mut methods = vec![
        MethodDescriptor::new(ACC_PUBLIC, "<init>", "()V"),
        MethodDescriptor::new(ACC_PUBLIC, "bar", "()V"),
        MethodDescriptor::new(ACC_PRIVATE, "secret", "()V"),
        MethodDescriptor::new(ACC_STATIC, "<clinit>", "()V"),
    ];
    if reversed {
        fields.reverse();
        methods.reverse();
    }
    build_class(header("Foo"), |w| {
        for field in fields {
            w.visit_field(field).unwrap();
        }
        for method in methods {
            w.visit_method(method).unwrap();
        }
    })
}

/// `Foo$1`: an anonymous class created inside `Foo.run()`.
pub fn anonymous_class() -> Vec<u8> {
    build_class(header("Foo$1"), |w| {
        w.visit_outer_class(OuterClass::new("Foo", Some("run"), Some("()V"))).unwrap();
        w.visit_inner_class(InnerClass::new("Foo$1", None, None, 0)).unwrap();
        w.visit_method(MethodDescriptor::new(0, "<init>", "()V")).unwrap();
    })
}

/// `Outer` referencing its own member class and an unrelated nested type.
pub fn outer_class() -> Vec<u8> {
    build_class(header("Outer"), |w| {
        w.visit_inner_class(InnerClass::new("Outer$Inner", Some("Outer"), Some("Inner"), ACC_PUBLIC | ACC_STATIC))
            .unwrap();
        w.visit_inner_class(InnerClass::new("Unrelated$Ref", Some("Unrelated"), Some("Ref"), ACC_PUBLIC)).unwrap();
        w.visit_method(MethodDescriptor::new(ACC_PUBLIC, "<init>", "()V")).unwrap();
    })
}
