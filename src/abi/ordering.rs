//! Deterministic ordering for structural descriptors.
//!
//! Every descriptor kind exposes an explicit canonical key: a tuple of
//! strings, flags and pool-independent byte encodings. Descriptors compare by
//! that key lexicographically, so the order of the emitted stub never depends
//! on the order the input delivered its elements, on hashing, or on memory
//! layout. Absent optional strings are replaced by the empty string.

/// Explicit comparison key of a descriptor kind.
pub trait CanonicalKey {
    type Key<'a>: Ord
    where
        Self: 'a;

    fn canonical_key(&self) -> Self::Key<'_>;
}

/// Sentinel used for absent optional key components.
pub const ABSENT: &str = "";

/// Key component for an optional string: absent sorts before any present
/// value and compares equal to an explicitly empty one.
pub fn or_absent(value: Option<&str>) -> &str {
    value.unwrap_or(ABSENT)
}

/// Derive `PartialEq`, `Eq`, `PartialOrd` and `Ord` from `CanonicalKey`.
macro_rules! canonical_ord {
    ($ty:ty) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                $crate::abi::ordering::CanonicalKey::canonical_key(self)
                    == $crate::abi::ordering::CanonicalKey::canonical_key(other)
            }
        }

        impl Eq for $ty {}

        impl PartialOrd for $ty {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $ty {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                $crate::abi::ordering::CanonicalKey::canonical_key(self)
                    .cmp(&$crate::abi::ordering::CanonicalKey::canonical_key(other))
            }
        }
    };
}

pub(crate) use canonical_ord;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_sorts_before_present() {
        assert!(or_absent(None) < or_absent(Some("A")));
        assert_eq!(or_absent(None), or_absent(Some("")));
    }
}
