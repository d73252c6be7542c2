//! Membership rules: which structural elements belong in a stub.
//!
//! All rules are total over access flags and names. Unknown flag bits are
//! never inspected.

use crate::classfile::defs::access_flags::{ACC_PRIVATE, ACC_STATIC};
use crate::classfile::defs::STATIC_INITIALIZER_METHOD_NAME;

use super::descriptor::{FieldDescriptor, InnerClass, MethodDescriptor};

/// Outcome of classifying one callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Retain,
    Drop(DropReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    Private,
    StaticInitializer,
    /// A nested-type link about a type that is neither this class nor one
    /// nested directly inside it.
    UnrelatedNestedType,
}

fn is_private(access: u16) -> bool {
    access & ACC_PRIVATE != 0
}

pub fn classify_field(field: &FieldDescriptor) -> Membership {
    if is_private(field.access) {
        return Membership::Drop(DropReason::Private);
    }
    Membership::Retain
}

/// Bridge and synthetic methods are retained. The compiler emits bridges to
/// cover type erasure, and code compiled against the real class may link to
/// them; a stub without them would not present the same surface.
pub fn classify_method(method: &MethodDescriptor) -> Membership {
    if is_private(method.access) {
        return Membership::Drop(DropReason::Private);
    }
    // <clinit> is only ever run by the JVM during class initialization
    // (JVMS 2.9), so nothing compiled against the class can refer to it.
    if method.name == STATIC_INITIALIZER_METHOD_NAME && method.access & ACC_STATIC != 0 {
        return Membership::Drop(DropReason::StaticInitializer);
    }
    Membership::Retain
}

/// `InnerClasses` lists every member class referenced from the class file.
/// A stub needs only the entry describing the class itself and the entries
/// of classes nested directly inside it.
pub fn classify_inner_class(inner: &InnerClass, this_class: &str) -> Membership {
    if is_private(inner.access) {
        return Membership::Drop(DropReason::Private);
    }
    if inner.name == this_class || inner.outer_name.as_deref() == Some(this_class) {
        return Membership::Retain;
    }
    Membership::Drop(DropReason::UnrelatedNestedType)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classfile::defs::access_flags::*;

    #[test]
    fn private_fields_are_dropped() {
        assert_eq!(classify_field(&FieldDescriptor::new(ACC_PRIVATE, "x", "I")), Membership::Drop(DropReason::Private));
        assert_eq!(classify_field(&FieldDescriptor::new(ACC_PUBLIC, "y", "I")), Membership::Retain);
        assert_eq!(classify_field(&FieldDescriptor::new(0, "pkg", "I")), Membership::Retain);
        assert_eq!(classify_field(&FieldDescriptor::new(ACC_PROTECTED | ACC_STATIC, "p", "I")), Membership::Retain);
    }

    #[test]
    fn static_initializer_is_dropped_but_instance_methods_named_alike_are_not() {
        let clinit = MethodDescriptor::new(ACC_STATIC, "<clinit>", "()V");
        assert_eq!(classify_method(&clinit), Membership::Drop(DropReason::StaticInitializer));
        // Only the static one is the initializer (pre-Java 7 class files).
        let odd = MethodDescriptor::new(0, "<clinit>", "()V");
        assert_eq!(classify_method(&odd), Membership::Retain);
    }

    #[test]
    fn bridge_and_synthetic_methods_are_kept() {
        let bridge = MethodDescriptor::new(ACC_PUBLIC | ACC_BRIDGE | ACC_SYNTHETIC, "compareTo", "(Ljava/lang/Object;)I");
        let synthetic = MethodDescriptor::new(ACC_STATIC | ACC_SYNTHETIC, "access$000", "(LFoo;)I");
        assert_eq!(classify_method(&bridge), Membership::Retain);
        assert_eq!(classify_method(&synthetic), Membership::Retain);
    }

    #[test]
    fn private_methods_are_dropped() {
        let secret = MethodDescriptor::new(ACC_PRIVATE, "secret", "()V");
        assert_eq!(classify_method(&secret), Membership::Drop(DropReason::Private));
    }

    #[test]
    fn unknown_flag_bits_pass_through() {
        let field = FieldDescriptor::new(0x8000 | ACC_PUBLIC, "f", "I");
        assert_eq!(classify_field(&field), Membership::Retain);
    }

    #[test]
    fn inner_classes_must_be_self_relevant() {
        let own = InnerClass::new("Outer", Some("Top"), Some("Outer"), ACC_PUBLIC);
        let nested = InnerClass::new("Outer$Inner", Some("Outer"), Some("Inner"), ACC_PUBLIC);
        let unrelated = InnerClass::new("Unrelated$Ref", Some("Unrelated"), Some("Ref"), ACC_PUBLIC);
        let hidden = InnerClass::new("Outer$Secret", Some("Outer"), Some("Secret"), ACC_PRIVATE);
        assert_eq!(classify_inner_class(&own, "Outer"), Membership::Retain);
        assert_eq!(classify_inner_class(&nested, "Outer"), Membership::Retain);
        assert_eq!(classify_inner_class(&unrelated, "Outer"), Membership::Drop(DropReason::UnrelatedNestedType));
        assert_eq!(classify_inner_class(&hidden, "Outer"), Membership::Drop(DropReason::Private));
    }
}
