mod common;

use abistub::abi::{
    Annotation, ConstantValue, ElementPair, ElementValue, FieldDescriptor, InnerClass, MethodDescriptor, OuterClass,
    TargetInfo, TypeAnnotation, TypePath, TypePathStep,
};
use abistub::classfile::attribute::AttributeInfo;
use abistub::classfile::defs::access_flags::*;
use abistub::classfile::{ClassVisitor, ClassfileWritable};
use abistub::{read_class, stub_class, stub_class_with_config, Config, MethodBodyStyle};

use common::*;

#[test]
fn member_order_does_not_change_the_stub() {
    init_logging();
    let forward = foo_class(false);
    let reversed = foo_class(true);
    assert_ne!(forward, reversed);
    assert_eq!(stub_class(&forward).unwrap(), stub_class(&reversed).unwrap());
}

#[test]
fn private_implementation_does_not_change_the_stub() {
    let plain = build_class(header("Svc"), |w| {
        w.visit_field(FieldDescriptor::new(ACC_PUBLIC, "count", "I")).unwrap();
        w.visit_method(MethodDescriptor::new(ACC_PUBLIC, "run", "()V")).unwrap();
    });

    let mut changed = build_class_file(header("Svc"), |w| {
        w.visit_field(FieldDescriptor::new(ACC_PRIVATE, "cache", "Ljava/util/Map;")).unwrap();
        w.visit_method(MethodDescriptor::new(ACC_PRIVATE, "helper", "(I)I")).unwrap();
        w.visit_method(MethodDescriptor::new(ACC_PUBLIC, "run", "()V")).unwrap();
        w.visit_field(FieldDescriptor::new(ACC_PUBLIC, "count", "I")).unwrap();
        w.visit_method(MethodDescriptor::new(ACC_STATIC, "<clinit>", "()V")).unwrap();
    });
    // a different body for run() and a SourceFile attribute
    let run = changed
        .methods
        .iter_mut()
        .find(|m| changed.constant_pool.get_utf8(m.name_index).unwrap() == "run")
        .unwrap();
    run.attributes[0].info = vec![0, 2, 0, 1, 0, 0, 0, 3, 0x04, 0x57, 0xb1, 0, 0, 0, 0];
    let source = changed.constant_pool.add_utf8("Svc.java").unwrap();
    let source_file = AttributeInfo::named(&mut changed.constant_pool, "SourceFile", source.to_be_bytes().to_vec()).unwrap();
    changed.attributes.push(source_file);
    let changed = changed.to_classfile_bytes().unwrap();

    assert_ne!(plain, changed);
    assert_eq!(stub_class(&plain).unwrap(), stub_class(&changed).unwrap());
}

fn annotated_class(reversed: bool) -> Vec<u8> {
    let retention = Annotation::new(
        "Ljava/lang/annotation/Retention;",
        true,
        vec![ElementPair::new(
            "value",
            ElementValue::Enum {
                type_descriptor: "Ljava/lang/annotation/RetentionPolicy;".to_string(),
                const_name: "RUNTIME".to_string(),
            },
        )],
    );
    let marker = Annotation::new("Lp/Marker;", false, vec![]);
    let named = Annotation::new(
        "Lp/Named;",
        true,
        vec![
            ElementPair::new("value", ElementValue::String("x".into())),
            ElementPair::new("tags", ElementValue::Array(vec![ElementValue::Int(1), ElementValue::Int(2)])),
        ],
    );
    let mut annotations = vec![retention, marker, named];
    let type_use = TypeAnnotation::new(
        0x10,
        TargetInfo::Supertype { index: 0 },
        TypePath { steps: vec![TypePathStep { kind: 3, argument_index: 0 }] },
        Annotation::new("Lp/NonNull;", true, vec![]),
    );
    let super_use = TypeAnnotation::new(
        0x10,
        TargetInfo::Supertype { index: 65535 },
        TypePath::default(),
        Annotation::new("Lp/NonNull;", true, vec![]),
    );
    let mut type_annotations = vec![type_use, super_use];

    let field = FieldDescriptor::new(ACC_PUBLIC | ACC_STATIC | ACC_FINAL, "LIMIT", "J")
        .with_value(ConstantValue::Long(1 << 40))
        .with_annotation(Annotation::new("Ljava/lang/Deprecated;", true, vec![]))
        .with_type_annotation(TypeAnnotation::new(
            0x13,
            TargetInfo::Empty,
            TypePath::default(),
            Annotation::new("Lp/Unit;", false, vec![]),
        ));
    let mut field = field;
    field.deprecated = true;

    let method = MethodDescriptor::new(ACC_PUBLIC, "apply", "(Ljava/lang/String;I)Ljava/util/List;")
        .with_signature("(Ljava/lang/String;I)Ljava/util/List<Ljava/lang/String;>;")
        .with_exceptions(["java/io/IOException", "java/lang/InterruptedException"])
        .with_parameter_annotation(1, Annotation::new("Lp/Positive;", true, vec![]))
        .with_parameter_annotation(0, Annotation::new("Lp/Name;", false, vec![]))
        .with_type_annotation(TypeAnnotation::new(
            0x17,
            TargetInfo::Throws { index: 1 },
            TypePath::default(),
            Annotation::new("Lp/Rare;", true, vec![]),
        ));
    let element = MethodDescriptor::new(ACC_PUBLIC | ACC_ABSTRACT, "weight", "()D")
        .with_annotation_default(ElementValue::Double(0.5));

    let mut inner = vec![
        InnerClass::new("Api$Builder", Some("Api"), Some("Builder"), ACC_PUBLIC | ACC_STATIC),
        InnerClass::new("Api$Mode", Some("Api"), Some("Mode"), ACC_PUBLIC | ACC_STATIC | ACC_FINAL | ACC_ENUM),
    ];
    let mut methods = vec![method, element];
    if reversed {
        annotations.reverse();
        type_annotations.reverse();
        inner.reverse();
        methods.reverse();
    }

    build_class(header("Api").with_signature("<T:Ljava/lang/Object;>Ljava/lang/Object;"), |w| {
        w.visit_outer_class(OuterClass::new("Host", None, None)).unwrap();
        for annotation in annotations {
            w.visit_annotation(annotation).unwrap();
        }
        for annotation in type_annotations {
            w.visit_type_annotation(annotation).unwrap();
        }
        for link in inner {
            w.visit_inner_class(link).unwrap();
        }
        w.visit_field(field).unwrap();
        for method in methods {
            w.visit_method(method).unwrap();
        }
    })
}

#[test]
fn annotation_order_does_not_change_the_stub() {
    let forward = stub_class(&annotated_class(false)).unwrap();
    let reversed = stub_class(&annotated_class(true)).unwrap();
    assert_eq!(forward, reversed);
}

#[test]
fn stubbing_is_idempotent() {
    for input in [foo_class(false), anonymous_class(), outer_class(), annotated_class(true)] {
        let once = stub_class(&input).unwrap();
        let twice = stub_class(&once).unwrap();
        assert_eq!(once, twice);
    }
}

#[test]
fn stubbing_without_bodies_is_idempotent() {
    let config = Config { method_bodies: MethodBodyStyle::Omit, ..Default::default() };
    let once = stub_class_with_config(&annotated_class(false), &config).unwrap();
    let twice = stub_class_with_config(&once, &config).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn stubbing_twice_gives_identical_bytes() {
    let input = annotated_class(false);
    assert_eq!(stub_class(&input).unwrap(), stub_class(&input).unwrap());
}

#[test]
fn metadata_survives_stubbing() {
    let class = read_class(&stub_class(&annotated_class(false)).unwrap()).unwrap();
    assert_eq!(class.header().signature.as_deref(), Some("<T:Ljava/lang/Object;>Ljava/lang/Object;"));
    assert_eq!(class.outer_class(), Some(&OuterClass::new("Host", None, None)));

    let descriptors: Vec<_> = class.annotations().iter().map(|a| a.descriptor()).collect();
    assert_eq!(descriptors, vec!["Ljava/lang/annotation/Retention;", "Lp/Marker;", "Lp/Named;"]);
    assert_eq!(class.type_annotations().len(), 2);

    let field = class.fields().iter().next().unwrap();
    assert_eq!(field.value, Some(ConstantValue::Long(1 << 40)));
    assert!(field.deprecated);
    assert_eq!(field.annotations.len(), 1);
    assert_eq!(field.type_annotations.len(), 1);

    let methods: Vec<_> = class.methods().iter().collect();
    assert_eq!(methods[0].name, "apply");
    assert_eq!(methods[0].exceptions, vec!["java/io/IOException", "java/lang/InterruptedException"]);
    let visible = methods[0].visible_parameter_annotations.as_ref().unwrap();
    assert_eq!(visible.parameters.len(), 2);
    assert!(visible.parameters[0].is_empty());
    assert_eq!(methods[0].invisible_parameter_annotations.as_ref().unwrap().parameters.len(), 1);
    assert_eq!(methods[1].annotation_default, Some(ElementValue::Double(0.5)));
}
