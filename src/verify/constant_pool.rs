use crate::classfile::class::ClassFile;
use crate::classfile::constpool::{Constant, ConstantPool};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConstantPoolVerifyError {
    #[error("Invalid constant pool index {0}")]
    InvalidConstantPoolIndex(u16),
    #[error("Invalid constant pool index type {0}")]
    InvalidConstantPoolIndexType(u16),
    #[error("Unusable constant pool slot {0} is not preceded by a Long or Double")]
    MisplacedUnusableSlot(u16),
}

pub type Result<T> = std::result::Result<T, ConstantPoolVerifyError>;

/// Outcome of resolving one index against the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IndexCheck {
    Valid,
    Missing,
    WrongKind,
}

pub(crate) fn check_index(pool: &ConstantPool, index: u16, accepts: fn(&Constant) -> bool) -> IndexCheck {
    match pool.get(index) {
        Ok(constant) if accepts(constant) => IndexCheck::Valid,
        Ok(_) => IndexCheck::WrongKind,
        Err(_) => IndexCheck::Missing,
    }
}

pub(crate) fn is_utf8(constant: &Constant) -> bool {
    matches!(constant, Constant::Utf8(_) | Constant::Utf8Surrogates(_))
}

pub(crate) fn is_class(constant: &Constant) -> bool {
    matches!(constant, Constant::Class(_))
}

fn is_name_and_type(constant: &Constant) -> bool {
    matches!(constant, Constant::NameAndType(..))
}

fn is_member_ref(constant: &Constant) -> bool {
    matches!(constant, Constant::FieldRef(..) | Constant::MethodRef(..) | Constant::InterfaceMethodRef(..))
}

/// Verify the ClassFile ConstantPool
pub fn verify(class_file: &ClassFile) -> Result<()> {
    verify_slots(&class_file.constant_pool)?;
    verify_constant_indexes(&class_file.constant_pool)?;
    Ok(())
}

fn verify_slots(pool: &ConstantPool) -> Result<()> {
    let mut previous_wide = false;
    for (i, constant) in pool.iter().enumerate() {
        let index = (i + 1) as u16;
        if matches!(constant, Constant::Unusable) != previous_wide {
            return Err(ConstantPoolVerifyError::MisplacedUnusableSlot(index));
        }
        previous_wide = constant.width() == 2;
    }
    Ok(())
}

fn expect(pool: &ConstantPool, owner: u16, target: u16, accepts: fn(&Constant) -> bool) -> Result<()> {
    match check_index(pool, target, accepts) {
        IndexCheck::Valid => Ok(()),
        IndexCheck::Missing => Err(ConstantPoolVerifyError::InvalidConstantPoolIndex(owner)),
        IndexCheck::WrongKind => Err(ConstantPoolVerifyError::InvalidConstantPoolIndexType(owner)),
    }
}

fn verify_constant_indexes(pool: &ConstantPool) -> Result<()> {
    for (i, constant) in pool.iter().enumerate() {
        let index = (i + 1) as u16;
        match constant {
            Constant::Class(name_index) | Constant::Module(name_index) | Constant::Package(name_index) => {
                expect(pool, index, *name_index, is_utf8)?
            }
            Constant::String(string_index) => expect(pool, index, *string_index, is_utf8)?,
            Constant::MethodType(descriptor_index) => expect(pool, index, *descriptor_index, is_utf8)?,
            Constant::FieldRef(class_index, nat_index)
            | Constant::MethodRef(class_index, nat_index)
            | Constant::InterfaceMethodRef(class_index, nat_index) => {
                expect(pool, index, *class_index, is_class)?;
                expect(pool, index, *nat_index, is_name_and_type)?;
            }
            Constant::NameAndType(name_index, descriptor_index) => {
                expect(pool, index, *name_index, is_utf8)?;
                expect(pool, index, *descriptor_index, is_utf8)?;
            }
            Constant::MethodHandle(_kind, reference_index) => expect(pool, index, *reference_index, is_member_ref)?,
            Constant::Dynamic(_bsm_index, nat_index) | Constant::InvokeDynamic(_bsm_index, nat_index) => {
                expect(pool, index, *nat_index, is_name_and_type)?
            }
            _ => {}
        }
    }
    Ok(())
}
