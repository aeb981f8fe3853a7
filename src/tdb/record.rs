use crate::tdb::{
    flags::{FieldFlags, MethodFlags, ParamModifiers, VmObjType},
    raw::{RawMethod, RawType},
    TypeIndex,
};

/// Marker character the dumper puts into the names of incomplete generic instantiations.
pub const PLACEHOLDER_MARKER: char = '!';

/// A catalog entry describing one runtime type.
///
/// Records are built once from the JSON descriptors and stay read-only for the rest of the
/// pipeline. Sizes are kept as the runtime reports them; for reference types `size` is the
/// allocated instance size and [`TypeRecord::header_length`] yields the runtime prefix that
/// precedes the declared fields.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRecord {
    /// Position in the catalog
    pub index: TypeIndex,
    /// Fully qualified name
    pub full_name: String,
    /// Address of the runtime type definition
    pub type_def_address: u64,
    /// Value semantics (inline) vs. reference semantics (heap object behind a pointer)
    pub is_value_type: bool,
    /// Inline size for value types, allocated size for reference types
    pub size: u32,
    /// Size of the declared fields, without any runtime header
    pub declared_size: u32,
    /// Runtime system type tag
    pub system_type: u32,
    /// Incomplete generic instantiation, never laid out
    pub is_placeholder: bool,
    /// Uninstantiated generic definition, never laid out
    pub is_template_definition: bool,
    /// Single inheritance parent
    pub base: Option<TypeIndex>,
    /// Element type if this type is a dynamically sized array
    pub element: Option<TypeIndex>,
    /// Instance fields declared directly on this type
    pub fields: Vec<FieldRecord>,
    /// Methods declared directly on this type
    pub methods: Vec<MethodRecord>,
}

/// An instance field declared on a type
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRecord {
    /// Field name
    pub name: String,
    /// Field type
    pub type_index: TypeIndex,
    /// Offset relative to the end of the runtime header
    pub offset: u32,
}

/// A method declared on a type
#[derive(Debug, Clone, PartialEq)]
pub struct MethodRecord {
    /// Method name
    pub name: String,
    /// Address of the compiled code, `0` if unknown
    pub runtime_address: u64,
    /// Return type
    pub return_type: TypeIndex,
    /// Method attribute flags
    pub flags: MethodFlags,
    /// Declared parameters
    pub params: Vec<ParamRecord>,
}

/// A declared method parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParamRecord {
    /// Parameter name
    pub name: String,
    /// Parameter type
    pub type_index: TypeIndex,
    /// Parameter modifiers
    pub modifiers: ParamModifiers,
}

impl TypeRecord {
    /// Build a record from its JSON descriptor.
    ///
    /// Static fields (flag bit `0x10`) are dropped here, so `fields` only ever lists
    /// storage that belongs to an instance.
    ///
    /// ## Arguments
    /// * `index` - Catalog position of the descriptor
    /// * `raw`   - The descriptor
    #[must_use]
    pub fn from_raw(index: TypeIndex, raw: RawType) -> Self {
        let is_value_type = VmObjType::is_value_type(raw.vm_obj_type);
        let is_template_definition = raw.is_template();

        let (size, declared_size) = if is_value_type {
            (raw.len, raw.len)
        } else {
            (raw.runtime_len, raw.len)
        };

        let fields = raw
            .fields
            .into_iter()
            .filter(|field| !FieldFlags::from_bits_retain(field.flags).is_excluded_from_layout())
            .map(|field| FieldRecord {
                name: field.name,
                type_index: field.ti,
                offset: field.position,
            })
            .collect();

        let methods = raw.methods.into_iter().map(MethodRecord::from_raw).collect();

        TypeRecord {
            index,
            is_placeholder: raw.full_name.contains(PLACEHOLDER_MARKER),
            full_name: raw.full_name,
            type_def_address: raw.type_def_address,
            is_value_type,
            size,
            declared_size,
            system_type: raw.system_type,
            is_template_definition,
            base: raw.ti_base,
            element: raw.ti_dearray,
            fields,
            methods,
        }
    }

    /// Length of the runtime prefix preceding the declared fields.
    ///
    /// Always `0` for value types. For reference types this is the difference between the
    /// allocated and the declared size, and may be negative for inconsistent dumps.
    #[must_use]
    pub fn header_length(&self) -> i64 {
        i64::from(self.size) - i64::from(self.declared_size)
    }

    /// Returns true if this type is a dynamically sized array container
    #[must_use]
    pub fn is_dearray(&self) -> bool {
        self.element.is_some()
    }
}

impl MethodRecord {
    fn from_raw(raw: RawMethod) -> Self {
        MethodRecord {
            name: raw.name,
            runtime_address: raw.runtime_address,
            return_type: raw.ret.ti,
            flags: MethodFlags::from_bits_retain(raw.flags),
            params: raw
                .params
                .into_iter()
                .map(|param| ParamRecord {
                    name: param.name,
                    type_index: param.ti,
                    modifiers: ParamModifiers::from_bits_retain(param.modifier),
                })
                .collect(),
        }
    }

    /// Returns true if the method receives no implicit `this` pointer
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags.is_static()
    }

    /// Returns true if the method has compiled code that can be annotated
    #[must_use]
    pub fn has_address(&self) -> bool {
        self.runtime_address != 0
    }
}

impl ParamRecord {
    /// Returns true if the parameter is passed by reference
    #[must_use]
    pub fn is_by_ref(&self) -> bool {
        self.modifiers.is_by_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tdb::raw::{RawField, RawParam, RawReturn};

    fn raw_object() -> RawType {
        RawType {
            type_def_address: 0x1_4100_0000,
            full_name: "app.Enemy".to_string(),
            vm_obj_type: 1,
            len: 24,
            runtime_len: 40,
            system_type: 28,
            ti_base: Some(TypeIndex(2)),
            fields: vec![
                RawField {
                    name: "_Hp".to_string(),
                    ti: TypeIndex(18),
                    position: 0,
                    flags: 0x1,
                },
                RawField {
                    name: "Instances".to_string(),
                    ti: TypeIndex(18),
                    position: 0,
                    flags: 0x11,
                },
            ],
            methods: vec![RawMethod {
                name: "get_Hp".to_string(),
                runtime_address: 0x1_4200_0000,
                ret: RawReturn { ti: TypeIndex(18) },
                flags: 0x86,
                params: vec![RawParam {
                    name: "value".to_string(),
                    ti: TypeIndex(18),
                    modifier: 1,
                }],
            }],
            ..RawType::default()
        }
    }

    #[test]
    fn test_reference_type_sizes() {
        let record = TypeRecord::from_raw(TypeIndex(7), raw_object());
        assert_eq!(record.index, TypeIndex(7));
        assert!(!record.is_value_type);
        assert_eq!(record.size, 40);
        assert_eq!(record.declared_size, 24);
        assert_eq!(record.header_length(), 16);
        assert_eq!(record.base, Some(TypeIndex(2)));
        assert!(!record.is_dearray());
    }

    #[test]
    fn test_value_type_sizes() {
        let mut raw = raw_object();
        raw.vm_obj_type = 5;
        raw.len = 12;
        raw.runtime_len = 28;

        let record = TypeRecord::from_raw(TypeIndex(0), raw);
        assert!(record.is_value_type);
        assert_eq!(record.size, 12);
        assert_eq!(record.header_length(), 0);
    }

    #[test]
    fn test_static_fields_dropped() {
        let record = TypeRecord::from_raw(TypeIndex(0), raw_object());
        assert_eq!(record.fields.len(), 1);
        assert_eq!(record.fields[0].name, "_Hp");
    }

    #[test]
    fn test_placeholder_and_template() {
        let mut raw = raw_object();
        raw.full_name = "System.Collections.Generic.List`1<!0>".to_string();
        let record = TypeRecord::from_raw(TypeIndex(0), raw);
        assert!(record.is_placeholder);
        assert!(!record.is_template_definition);

        let mut raw = raw_object();
        raw.generics = Some(serde_json::json!({"Template": {}}));
        let record = TypeRecord::from_raw(TypeIndex(0), raw);
        assert!(!record.is_placeholder);
        assert!(record.is_template_definition);
    }

    #[test]
    fn test_method_conversion() {
        let record = TypeRecord::from_raw(TypeIndex(0), raw_object());
        let method = &record.methods[0];
        assert!(!method.is_static());
        assert!(method.has_address());
        assert_eq!(method.return_type, TypeIndex(18));
        assert!(method.params[0].is_by_ref());
    }

    #[test]
    fn test_negative_header() {
        let mut raw = raw_object();
        raw.runtime_len = 8;
        let record = TypeRecord::from_raw(TypeIndex(0), raw);
        assert_eq!(record.header_length(), -16);
    }
}
