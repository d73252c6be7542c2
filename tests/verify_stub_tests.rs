mod common;

use abistub::abi::{FieldDescriptor, MethodDescriptor};
use abistub::classfile::defs::access_flags::*;
use abistub::classfile::{ClassReader, ClassVisitor, ClassWriter};
use abistub::verify::{verify, VerifyError};
use abistub::{read_class, stub_class_with_config, Config, Error, MethodBodyStyle};

use common::*;

#[test]
fn stubs_pass_structural_verification() {
    for input in [foo_class(false), anonymous_class(), outer_class()] {
        let class = read_class(&input).unwrap();
        let mut writer = ClassWriter::new(MethodBodyStyle::ThrowNull);
        class.accept(&mut writer).unwrap();
        assert_eq!(verify(&writer.into_class_file().unwrap()), Ok(()));
    }
}

#[test]
fn conflicting_visibility_fails_verification() {
    let input = build_class(header("Bad"), |w| {
        w.visit_field(FieldDescriptor::new(ACC_PUBLIC | ACC_PROTECTED, "f", "I")).unwrap();
    });
    let err = stub_class_with_config(&input, &Config::default()).unwrap_err();
    assert!(matches!(err, Error::Verify(VerifyError::Field(_))));

    // with verification off the stub is produced as-is
    let config = Config { verify: false, ..Default::default() };
    assert!(stub_class_with_config(&input, &config).is_ok());
}

#[test]
fn omitted_bodies_leave_no_code_attribute() {
    let input = build_class(header("Svc"), |w| {
        w.visit_method(MethodDescriptor::new(ACC_PUBLIC, "run", "(JD)V")).unwrap();
        w.visit_method(MethodDescriptor::new(ACC_PUBLIC | ACC_NATIVE, "poke", "()V")).unwrap();
    });
    let config = Config { method_bodies: MethodBodyStyle::Omit, ..Default::default() };
    let stub = stub_class_with_config(&input, &config).unwrap();

    let reader = ClassReader::new(&stub).unwrap();
    assert!(reader.constant_pool().iter().all(|c| !matches!(c, abistub::classfile::Constant::Utf8(s) if s == "Code")));
}

#[test]
fn throwing_bodies_size_locals_from_the_descriptor() {
    let input = build_class(header("Svc"), |w| {
        w.visit_method(MethodDescriptor::new(ACC_PUBLIC | ACC_STATIC, "of", "(JD[I)LSvc;")).unwrap();
    });
    let stub = stub_class_with_config(&input, &Config::default()).unwrap();
    // Code attribute: max_stack 1, max_locals 5, code aconst_null athrow
    let needle = [0, 1, 0, 5, 0, 0, 0, 2, 0x01, 0xbf, 0, 0, 0, 0];
    assert!(stub.windows(needle.len()).any(|w| w == needle));
}
