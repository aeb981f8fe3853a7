//! Runtime flag words carried by TDB descriptors.
//!
//! The dumper copies the runtime's raw flag words into the JSON as plain integers
//! (`via.clr.FieldFlag`, `via.clr.MethodFlag`, `via.clr.ParamModifier`). This module gives
//! them typed [`bitflags`] views. Unknown bits are retained, so a flag word always survives
//! a round trip through the typed representation.
//!
//! # Key Types
//! - [`FieldFlags`]: field attributes, bit `0x10` removes a field from the instance layout
//! - [`MethodFlags`]: method attributes, bit `0x10` marks a static method
//! - [`ParamModifiers`]: parameter modifiers, bit `0x1` marks a by-ref parameter
//! - [`VmObjType`]: the runtime object kind, deciding value vs. reference semantics

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, FromRepr};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Field attribute flags (`via.clr.FieldFlag`)
    pub struct FieldFlags: u32 {
        /// Accessible only by the parent type
        const PRIVATE = 0x0001;
        /// Accessibly by anyone who has visibility to this scope
        const PUBLIC = 0x0006;
        /// Field has no per-instance storage
        const STATIC = 0x0010;
        /// Field can only be initialized
        const READONLY = 0x0020;
        /// Field is a compile time constant
        const LITERAL = 0x0040;
        /// Field is not serialized
        const NO_SERIALIZE = 0x0080;
        /// Field has an RVA
        const HAS_RVA = 0x0100;
        /// Field is special
        const SPECIAL = 0x0200;
        /// Field is special to the runtime
        const RT_SPECIAL = 0x0400;
    }
}

impl FieldFlags {
    /// Returns true if the field takes no part in the instance layout.
    #[must_use]
    pub fn is_excluded_from_layout(&self) -> bool {
        self.contains(FieldFlags::STATIC)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Method attribute flags (`via.clr.MethodFlag`)
    pub struct MethodFlags: u32 {
        /// Accessible only by the parent type
        const PRIVATE = 0x0001;
        /// Accessibly by anyone who has visibility to this scope
        const PUBLIC = 0x0006;
        /// Method is exported to unmanaged code
        const UNMANAGED_EXPORT = 0x0008;
        /// Method is static, it receives no instance pointer
        const STATIC = 0x0010;
        /// Method can not be overridden
        const FINAL = 0x0020;
        /// Method is virtual
        const VIRTUAL = 0x0040;
        /// Method hides by name and signature
        const HIDE_BY_SIG = 0x0080;
        /// Method always gets a new vtable slot
        const NEW_SLOT = 0x0100;
        /// Method does not provide an implementation
        const ABSTRACT = 0x0400;
        /// Method is special
        const SPECIAL_NAME = 0x0800;
        /// Method is special to the runtime
        const RT_SPECIAL_NAME = 0x1000;
    }
}

impl MethodFlags {
    /// Returns true if the method receives no implicit `this` pointer.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.contains(MethodFlags::STATIC)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    /// Parameter modifiers (`via.clr.ParamModifier`)
    pub struct ParamModifiers: u32 {
        /// Parameter is passed by reference
        const BY_REF = 0x0001;
    }
}

impl ParamModifiers {
    /// Returns true if the parameter adds one more level of pointer indirection.
    #[must_use]
    pub fn is_by_ref(&self) -> bool {
        self.contains(ParamModifiers::BY_REF)
    }
}

/// The runtime object kind of a type (`via.clr.VMObjType`).
///
/// Only [`VmObjType::ValType`] carries value semantics; every other kind lives on the heap
/// and is referenced through a pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, FromRepr, Serialize, Deserialize)]
#[repr(u32)]
pub enum VmObjType {
    /// No object kind assigned
    Null = 0,
    /// Plain heap object
    Object = 1,
    /// Managed array
    Array = 2,
    /// Managed string
    String = 3,
    /// Delegate object
    Delegate = 4,
    /// Value type, embedded inline
    ValType = 5,
}

impl VmObjType {
    /// Returns true if the raw kind denotes value semantics.
    #[must_use]
    pub fn is_value_type(raw: u32) -> bool {
        VmObjType::from_repr(raw) == Some(VmObjType::ValType)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_exclusion() {
        assert!(FieldFlags::from_bits_retain(0x10).is_excluded_from_layout());
        assert!(FieldFlags::from_bits_retain(0x16).is_excluded_from_layout());
        assert!(!FieldFlags::from_bits_retain(0x06).is_excluded_from_layout());
        assert!(!FieldFlags::from_bits_retain(0x60).is_excluded_from_layout());
    }

    #[test]
    fn test_method_static() {
        assert!(MethodFlags::from_bits_retain(0x0000_0010).is_static());
        assert!(MethodFlags::from_bits_retain(0x0000_0096).is_static());
        assert!(!MethodFlags::from_bits_retain(0x0000_0086).is_static());
    }

    #[test]
    fn test_param_by_ref() {
        assert!(ParamModifiers::from_bits_retain(1).is_by_ref());
        assert!(ParamModifiers::from_bits_retain(3).is_by_ref());
        assert!(!ParamModifiers::from_bits_retain(2).is_by_ref());
    }

    #[test]
    fn test_unknown_bits_retained() {
        let flags = FieldFlags::from_bits_retain(0x8000_0010);
        assert_eq!(flags.bits(), 0x8000_0010);
    }

    #[test]
    fn test_vm_obj_type() {
        assert!(VmObjType::is_value_type(5));
        assert!(!VmObjType::is_value_type(1));
        assert!(!VmObjType::is_value_type(99));
        assert_eq!(VmObjType::from_repr(2), Some(VmObjType::Array));
        assert_eq!(VmObjType::ValType.to_string(), "ValType");
    }
}
