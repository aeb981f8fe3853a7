use std::ops::Index;

use crate::{
    tdb::{TypeCatalog, TypeIndex},
    target::{DataType, ScalarKind, StructHandle, POINTER_SIZE},
};

/// The representation a type got in the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRepr {
    /// Mapped onto a built-in scalar
    Primitive(ScalarKind),
    /// Backed by a named structure
    Structure(StructHandle),
}

impl TypeRepr {
    /// The data type naming this representation
    #[must_use]
    pub fn data_type(&self) -> DataType {
        match self {
            TypeRepr::Primitive(kind) => DataType::Scalar(*kind),
            TypeRepr::Structure(handle) => DataType::Structure(*handle),
        }
    }

    /// Returns true for built-in scalars
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeRepr::Primitive(_))
    }
}

/// How a value of some type is stored inside another type or an array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Storage {
    /// Stored data type, the type itself or a pointer to it
    pub data_type: DataType,
    /// Bytes taken by one stored value
    pub length: u64,
}

/// Target representations of all catalog types, parallel to the [`TypeCatalog`].
///
/// Created once by [`crate::layout::register_types`] before any layout is computed, so
/// every type, including ones referenced before their own definition or through cycles,
/// already has a representation when the resolver needs it.
#[derive(Debug, Clone, Default)]
pub struct TypeHandles {
    reprs: Vec<TypeRepr>,
}

impl TypeHandles {
    pub(crate) fn new(reprs: Vec<TypeRepr>) -> Self {
        TypeHandles { reprs }
    }

    /// Representation of a type, `None` if the index is unknown
    #[must_use]
    pub fn get(&self, index: TypeIndex) -> Option<&TypeRepr> {
        self.reprs.get(index.as_usize())
    }

    /// The data type naming a type
    #[must_use]
    pub fn data_type(&self, index: TypeIndex) -> DataType {
        self[index].data_type()
    }

    /// How a value of type `index` is stored: value types inline with their own size,
    /// reference types as a pointer.
    #[must_use]
    pub fn storage(&self, catalog: &TypeCatalog, index: TypeIndex) -> Storage {
        let record = &catalog[index];
        if record.is_value_type {
            Storage {
                data_type: self.data_type(index),
                length: u64::from(record.size),
            }
        } else {
            Storage {
                data_type: DataType::pointer_to(self.data_type(index)),
                length: u64::from(POINTER_SIZE),
            }
        }
    }

    /// Number of represented types
    #[must_use]
    pub fn len(&self) -> usize {
        self.reprs.len()
    }

    /// Returns true if no type is represented
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reprs.is_empty()
    }

    /// Number of types mapped onto scalars
    #[must_use]
    pub fn primitive_count(&self) -> usize {
        self.reprs.iter().filter(|repr| repr.is_primitive()).count()
    }
}

impl Index<TypeIndex> for TypeHandles {
    type Output = TypeRepr;

    fn index(&self, index: TypeIndex) -> &Self::Output {
        &self.reprs[index.as_usize()]
    }
}
