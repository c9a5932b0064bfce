//! Object identity with generational indices

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of a physical body reported by the collision detector.
///
/// Only equality is meaningful; the packed index/generation exists so that
/// recycled engine slots never compare equal to a stale handle.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId {
    /// Lower 32 bits: index, Upper 32 bits: generation
    bits: u64,
}

impl ObjectId {
    /// Create a new ID from index and generation
    #[inline]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self {
            bits: (generation as u64) << 32 | index as u64,
        }
    }

    /// The null ID, used where a wire format needs "no object"
    #[inline]
    pub const fn null() -> Self {
        Self { bits: u64::MAX }
    }

    /// Check if this ID is null
    #[inline]
    pub const fn is_null(&self) -> bool {
        self.bits == u64::MAX
    }

    /// Get the index portion
    #[inline]
    pub const fn index(&self) -> u32 {
        self.bits as u32
    }

    /// Get the generation portion
    #[inline]
    pub const fn generation(&self) -> u32 {
        (self.bits >> 32) as u32
    }

    /// Get the raw bits
    #[inline]
    pub const fn to_bits(&self) -> u64 {
        self.bits
    }

    /// Create from raw bits
    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self { bits }
    }
}

impl From<u64> for ObjectId {
    fn from(bits: u64) -> Self {
        Self::from_bits(bits)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "ObjectId(null)")
        } else {
            write!(f, "ObjectId({}v{})", self.index(), self.generation())
        }
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "null")
        } else {
            write!(f, "{}v{}", self.index(), self.generation())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_parts() {
        let id = ObjectId::new(42, 7);
        assert_eq!(id.index(), 42);
        assert_eq!(id.generation(), 7);
        assert_eq!(ObjectId::from_bits(id.to_bits()), id);
    }

    #[test]
    fn test_generation_distinguishes() {
        assert_ne!(ObjectId::new(3, 0), ObjectId::new(3, 1));
    }

    #[test]
    fn test_null() {
        assert!(ObjectId::null().is_null());
        assert!(!ObjectId::new(1, 0).is_null());
        assert_eq!(ObjectId::null().to_string(), "null");
    }

    #[test]
    fn test_serde_transparent() {
        let id: ObjectId = serde_json::from_str("12").unwrap();
        assert_eq!(id, ObjectId::new(12, 0));
    }
}
