//! ABI extraction: structural descriptors, membership rules, canonical
//! ordering, the accumulating mirror and the replaying emitter.

pub mod annotation;
pub mod classifier;
pub mod descriptor;
pub mod emit;
pub mod mirror;
pub mod ordering;

pub use annotation::{Annotation, ElementPair, ElementValue, TargetInfo, TypeAnnotation, TypePath, TypePathStep};
pub use classifier::{DropReason, Membership};
pub use descriptor::{
    ClassHeader, ClassVersion, ConstantValue, FieldDescriptor, InnerClass, MethodDescriptor, OuterClass,
    ParameterAnnotations,
};
pub use emit::ClassDescriptor;
pub use mirror::ClassMirror;
pub use ordering::CanonicalKey;
