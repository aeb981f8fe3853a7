//! JSON descriptors as written by the TDB dumper.
//!
//! A dump is split into chunk files, each one a [`RawChunk`] holding a contiguous run of
//! type descriptors starting at `start_index`. The structs here mirror the JSON one to one,
//! including the dotted `via.clr.*` key names; interpretation happens in
//! [`crate::tdb::TypeRecord::from_raw`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::tdb::TypeIndex;

/// One chunk file of the type database
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawChunk {
    /// Type index of the first descriptor in `types`
    pub start_index: u32,
    /// Consecutive type descriptors
    pub types: Vec<RawType>,
}

/// One type descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawType {
    /// Address of the runtime type definition
    pub type_def_address: u64,
    /// Fully qualified name
    pub full_name: String,
    /// Runtime object kind, `5` for value types
    #[serde(rename = "via.clr.VMObjType")]
    pub vm_obj_type: u32,
    /// Declared size of the fields
    pub len: u32,
    /// Allocated size of an instance, including the runtime header
    pub runtime_len: u32,
    /// Runtime system type tag
    #[serde(rename = "via.clr.SystemType")]
    pub system_type: u32,
    /// Generic information, an object with a `Template` key for uninstantiated definitions
    #[serde(default)]
    pub generics: Option<Value>,
    /// Base type
    #[serde(default)]
    pub ti_base: Option<TypeIndex>,
    /// Element type if this type is a dynamically sized array
    #[serde(default)]
    pub ti_dearray: Option<TypeIndex>,
    /// Fields declared directly on this type
    #[serde(default)]
    pub fields: Vec<RawField>,
    /// Methods declared directly on this type
    #[serde(default)]
    pub methods: Vec<RawMethod>,
}

impl RawType {
    /// Returns true if the generics block marks an uninstantiated generic definition.
    #[must_use]
    pub fn is_template(&self) -> bool {
        matches!(&self.generics, Some(Value::Object(map)) if map.contains_key("Template"))
    }
}

/// One field descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawField {
    /// Field name
    pub name: String,
    /// Field type
    pub ti: TypeIndex,
    /// Offset relative to the declared (header-less) start of the owning type
    pub position: u32,
    /// Raw field attribute word
    #[serde(rename = "via.clr.FieldFlag", default)]
    pub flags: u32,
}

/// One method descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMethod {
    /// Method name
    pub name: String,
    /// Address of the compiled method, `0` if unknown
    #[serde(default)]
    pub runtime_address: u64,
    /// Return value
    pub ret: RawReturn,
    /// Raw method attribute word
    #[serde(rename = "via.clr.MethodFlag", default)]
    pub flags: u32,
    /// Declared parameters
    #[serde(default)]
    pub params: Vec<RawParam>,
}

/// Return value of a method descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawReturn {
    /// Return type
    pub ti: TypeIndex,
}

/// One parameter descriptor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawParam {
    /// Parameter name
    pub name: String,
    /// Parameter type
    pub ti: TypeIndex,
    /// Raw parameter modifier word
    #[serde(rename = "via.clr.ParamModifier", default)]
    pub modifier: u32,
}
