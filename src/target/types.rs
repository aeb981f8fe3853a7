//! Data type model handed to a [`crate::target::Target`].

use std::fmt;

use bitflags::bitflags;
use serde::Serialize;
use strum::{Display, EnumIter};

/// Size of a pointer on the analysed platform
pub const POINTER_SIZE: u32 = 8;

/// Opaque handle to a structure created by a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct StructHandle(pub u32);

/// Opaque handle to a function known to a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct FunctionId(pub u64);

/// Built-in scalar representations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize)]
#[strum(serialize_all = "lowercase")]
pub enum ScalarKind {
    /// Unsigned 8-bit integer
    U8,
    /// Signed 8-bit integer
    I8,
    /// Unsigned 16-bit integer
    U16,
    /// Signed 16-bit integer
    I16,
    /// Signed 32-bit integer
    I32,
    /// Unsigned 32-bit integer
    U32,
    /// Signed 64-bit integer
    I64,
    /// Unsigned 64-bit integer
    U64,
    /// 32-bit float
    F32,
    /// 64-bit float
    F64,
    /// Boolean
    Bool,
    /// No value
    Void,
}

impl ScalarKind {
    /// Size of the scalar in bytes
    #[must_use]
    pub fn size(&self) -> u32 {
        match self {
            ScalarKind::Void => 0,
            ScalarKind::U8 | ScalarKind::I8 | ScalarKind::Bool => 1,
            ScalarKind::U16 | ScalarKind::I16 => 2,
            ScalarKind::I32 | ScalarKind::U32 | ScalarKind::F32 => 4,
            ScalarKind::I64 | ScalarKind::U64 | ScalarKind::F64 => 8,
        }
    }

    /// The C spelling of the scalar
    #[must_use]
    pub fn c_name(&self) -> &'static str {
        match self {
            ScalarKind::U8 => "uint8_t",
            ScalarKind::I8 => "int8_t",
            ScalarKind::U16 => "uint16_t",
            ScalarKind::I16 => "int16_t",
            ScalarKind::I32 => "int32_t",
            ScalarKind::U32 => "uint32_t",
            ScalarKind::I64 => "int64_t",
            ScalarKind::U64 => "uint64_t",
            ScalarKind::F32 => "float",
            ScalarKind::F64 => "double",
            ScalarKind::Bool => "bool",
            ScalarKind::Void => "void",
        }
    }
}

/// A composed data type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum DataType {
    /// One byte of unknown meaning
    Undefined,
    /// A built-in scalar
    Scalar(ScalarKind),
    /// A structure created through the target
    Structure(StructHandle),
    /// A pointer to another type
    Pointer(Box<DataType>),
    /// A fixed-length array
    Array {
        /// Element type
        element: Box<DataType>,
        /// Number of elements
        count: u64,
        /// Size of one element in bytes
        element_len: u64,
    },
}

impl DataType {
    /// A pointer to `inner`
    #[must_use]
    pub fn pointer_to(inner: DataType) -> Self {
        DataType::Pointer(Box::new(inner))
    }

    /// An untyped pointer
    #[must_use]
    pub fn void_pointer() -> Self {
        DataType::pointer_to(DataType::Scalar(ScalarKind::Void))
    }

    /// An array of `len` undefined bytes
    #[must_use]
    pub fn filler(len: u64) -> Self {
        DataType::Array {
            element: Box::new(DataType::Undefined),
            count: len,
            element_len: 1,
        }
    }

    /// Returns true for the `void` scalar
    #[must_use]
    pub fn is_void(&self) -> bool {
        matches!(self, DataType::Scalar(ScalarKind::Void))
    }
}

/// One member of a structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    /// Byte offset from the start of the structure
    pub offset: u64,
    /// Member name, `None` for anonymous filler
    pub name: Option<String>,
    /// Member type
    pub data_type: DataType,
    /// Size in bytes
    pub length: u64,
}

impl Member {
    /// A named member
    pub fn field(offset: u64, name: impl Into<String>, data_type: DataType, length: u64) -> Self {
        Member {
            offset,
            name: Some(name.into()),
            data_type,
            length,
        }
    }

    /// Anonymous filler bytes covering `[offset, offset + length)`
    #[must_use]
    pub fn filler(offset: u64, length: u64) -> Self {
        Member {
            offset,
            name: None,
            data_type: DataType::filler(length),
            length,
        }
    }

    /// Returns true for anonymous filler
    #[must_use]
    pub fn is_filler(&self) -> bool {
        self.name.is_none()
    }

    /// First byte after the member
    #[must_use]
    pub fn end(&self) -> u64 {
        self.offset.saturating_add(self.length)
    }
}

/// A named, typed parameter slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Parameter type
    pub data_type: DataType,
}

impl Parameter {
    /// Create a parameter
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Parameter {
            name: name.into(),
            data_type,
        }
    }
}

/// Return type and ordered parameter list of a function.
///
/// Storage (registers, stack slots) is left to the target, a signature only lists typed
/// slots in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSignature {
    /// Declared return type
    pub return_type: DataType,
    /// Parameters, implicit ones first
    pub parameters: Vec<Parameter>,
}

/// How to treat a structure whose name is already taken in its category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
pub enum ConflictPolicy {
    /// Replace the existing definition with the new, empty one
    Replace,
    /// Keep the existing definition and hand out its handle
    Keep,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Access permissions of a memory region
    pub struct RegionPermissions: u8 {
        /// Readable
        const READ = 0x1;
        /// Writable
        const WRITE = 0x2;
        /// Executable
        const EXECUTE = 0x4;
    }
}

impl fmt::Display for RegionPermissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |bit: RegionPermissions, c: char| if self.contains(bit) { c } else { '-' };
        write!(
            f,
            "{}{}{}",
            flag(RegionPermissions::READ, 'r'),
            flag(RegionPermissions::WRITE, 'w'),
            flag(RegionPermissions::EXECUTE, 'x')
        )
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_scalar_sizes() {
        for kind in ScalarKind::iter() {
            let expected = match kind.c_name() {
                "void" => 0,
                "uint8_t" | "int8_t" | "bool" => 1,
                "uint16_t" | "int16_t" => 2,
                "int32_t" | "uint32_t" | "float" => 4,
                _ => 8,
            };
            assert_eq!(kind.size(), expected, "{kind}");
        }
        assert_eq!(ScalarKind::I32.to_string(), "i32");
    }

    #[test]
    fn test_member_helpers() {
        let filler = Member::filler(4, 12);
        assert!(filler.is_filler());
        assert_eq!(filler.end(), 16);
        assert_eq!(filler.data_type, DataType::filler(12));

        let field = Member::field(16, "_Hp", DataType::Scalar(ScalarKind::I32), 4);
        assert!(!field.is_filler());
        assert_eq!(field.end(), 20);
    }

    #[test]
    fn test_pointer_helpers() {
        assert_eq!(
            DataType::void_pointer(),
            DataType::Pointer(Box::new(DataType::Scalar(ScalarKind::Void)))
        );
        assert!(DataType::Scalar(ScalarKind::Void).is_void());
        assert!(!DataType::void_pointer().is_void());
    }

    #[test]
    fn test_permissions_display() {
        let all = RegionPermissions::READ | RegionPermissions::WRITE | RegionPermissions::EXECUTE;
        assert_eq!(all.to_string(), "rwx");
        assert_eq!(RegionPermissions::READ.to_string(), "r--");
    }
}
