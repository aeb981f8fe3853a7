use std::fmt;

use serde::{Deserialize, Serialize};

/// A dense index into the type database.
///
/// Type indices run from `0` to `N - 1` for a catalog with `N` types and are the only way
/// types refer to each other (base type, field types, array element types, method
/// signatures). They are stable for one import session and never reused.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeIndex(pub u32);

impl TypeIndex {
    /// Creates a new index from a raw value
    #[must_use]
    pub fn new(value: u32) -> Self {
        TypeIndex(value)
    }

    /// Returns the raw index value
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// Returns the index as a `usize`, for addressing the catalog arena
    #[must_use]
    pub fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

impl From<u32> for TypeIndex {
    fn from(value: u32) -> Self {
        TypeIndex(value)
    }
}

impl From<TypeIndex> for u32 {
    fn from(index: TypeIndex) -> Self {
        index.0
    }
}

impl fmt::Debug for TypeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeIndex({})", self.0)
    }
}

impl fmt::Display for TypeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
