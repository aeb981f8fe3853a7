use std::collections::{BTreeMap, HashMap};

use crate::{
    target::{
        ConflictPolicy, DataType, FunctionId, FunctionSignature, Member, RegionPermissions,
        StructHandle, Target,
    },
    Error::{self, InvalidAddress, RegionOverlap},
    Result,
};

/// A structure definition held by a [`Program`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Structure {
    /// Category (namespace) the structure lives in
    pub category: String,
    /// Structure name, unique within its category
    pub name: String,
    /// Size the structure was created with
    pub size: u32,
    /// Members in offset order
    pub members: Vec<Member>,
}

impl Structure {
    /// Actual length: the declared size, or the end of the last member if that lies beyond.
    #[must_use]
    pub fn length(&self) -> u64 {
        self.members
            .iter()
            .map(Member::end)
            .fold(u64::from(self.size), u64::max)
    }

    /// Find a member by name
    #[must_use]
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members
            .iter()
            .find(|member| member.name.as_deref() == Some(name))
    }
}

/// A function held by a [`Program`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    /// Entry address
    pub address: u64,
    /// Function name
    pub name: String,
    /// Applied signature, if any
    pub signature: Option<FunctionSignature>,
}

/// A memory region held by a [`Program`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRegion {
    /// Region name
    pub name: String,
    /// First address
    pub base: u64,
    /// Initial content
    pub data: Vec<u8>,
    /// Access permissions
    pub permissions: RegionPermissions,
}

impl MemoryRegion {
    /// Returns true if `address` lies inside the region
    #[must_use]
    pub fn contains(&self, address: u64) -> bool {
        address >= self.base && address - self.base < self.data.len() as u64
    }

    /// First address after the region
    #[must_use]
    pub fn end(&self) -> u64 {
        self.base.saturating_add(self.data.len() as u64)
    }
}

/// An in-memory disassembler database.
///
/// Address rules: address `0` never carries a label or a function. As soon as at least one
/// memory region exists, labels must lie inside a region and functions inside an
/// executable one. Without any regions every other address is accepted.
#[derive(Debug, Clone, Default)]
pub struct Program {
    structures: Vec<Structure>,
    by_name: HashMap<(String, String), StructHandle>,
    labels: BTreeMap<u64, Vec<String>>,
    functions: BTreeMap<u64, Function>,
    regions: Vec<MemoryRegion>,
}

impl Program {
    /// Create an empty program
    #[must_use]
    pub fn new() -> Self {
        Program::default()
    }

    /// Get a structure by handle
    #[must_use]
    pub fn structure(&self, handle: StructHandle) -> Option<&Structure> {
        self.structures.get(handle.0 as usize)
    }

    /// Find a structure by category and name
    #[must_use]
    pub fn structure_by_name(&self, category: &str, name: &str) -> Option<&Structure> {
        self.by_name
            .get(&(category.to_string(), name.to_string()))
            .and_then(|handle| self.structure(*handle))
    }

    /// Handle of a structure by category and name
    #[must_use]
    pub fn handle_of(&self, category: &str, name: &str) -> Option<StructHandle> {
        self.by_name
            .get(&(category.to_string(), name.to_string()))
            .copied()
    }

    /// Iterate over all structures in creation order
    pub fn structures(&self) -> impl Iterator<Item = (StructHandle, &Structure)> {
        self.structures
            .iter()
            .enumerate()
            .map(|(position, structure)| (StructHandle(position as u32), structure))
    }

    /// Labels attached to an address
    #[must_use]
    pub fn labels_at(&self, address: u64) -> &[String] {
        self.labels
            .get(&address)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of labelled addresses
    #[must_use]
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    /// Get the function starting at `address`
    #[must_use]
    pub fn function(&self, address: u64) -> Option<&Function> {
        self.functions.get(&address)
    }

    /// Iterate over all functions in address order
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.values()
    }

    /// All memory regions in creation order
    #[must_use]
    pub fn regions(&self) -> &[MemoryRegion] {
        &self.regions
    }

    /// Human readable spelling of a data type, using structure names.
    #[must_use]
    pub fn type_name(&self, data_type: &DataType) -> String {
        match data_type {
            DataType::Undefined => "undefined".to_string(),
            DataType::Scalar(kind) => kind.c_name().to_string(),
            DataType::Structure(handle) => self
                .structure(*handle)
                .map_or_else(|| format!("<struct #{}>", handle.0), |s| s.name.clone()),
            DataType::Pointer(inner) => format!("{} *", self.type_name(inner)),
            DataType::Array { element, count, .. } => {
                format!("{}[{count}]", self.type_name(element))
            }
        }
    }

    fn accepts_label(&self, address: u64) -> bool {
        address != 0
            && (self.regions.is_empty() || self.regions.iter().any(|r| r.contains(address)))
    }

    fn accepts_function(&self, address: u64) -> bool {
        address != 0
            && (self.regions.is_empty()
                || self.regions.iter().any(|r| {
                    r.permissions.contains(RegionPermissions::EXECUTE) && r.contains(address)
                }))
    }
}

impl Target for Program {
    fn create_label(&mut self, address: u64, name: &str) -> Result<()> {
        if !self.accepts_label(address) {
            return Err(InvalidAddress(address));
        }

        let labels = self.labels.entry(address).or_default();
        if !labels.iter().any(|label| label == name) {
            labels.push(name.to_string());
        }
        Ok(())
    }

    fn define_structure(
        &mut self,
        category: &str,
        name: &str,
        size: u32,
        policy: ConflictPolicy,
    ) -> Option<StructHandle> {
        let key = (category.to_string(), name.to_string());
        if let Some(handle) = self.by_name.get(&key).copied() {
            if policy == ConflictPolicy::Replace {
                let structure = self.structures.get_mut(handle.0 as usize)?;
                structure.size = size;
                structure.members.clear();
            }
            return Some(handle);
        }

        let handle = StructHandle(u32::try_from(self.structures.len()).ok()?);
        self.structures.push(Structure {
            category: key.0.clone(),
            name: key.1.clone(),
            size,
            members: Vec::new(),
        });
        self.by_name.insert(key, handle);
        Some(handle)
    }

    fn rebuild_structure(&mut self, handle: StructHandle, members: Vec<Member>) -> Result<()> {
        let structure = self
            .structures
            .get_mut(handle.0 as usize)
            .ok_or_else(|| Error::Error(format!("Unknown structure handle {}", handle.0)))?;
        structure.members = members;
        Ok(())
    }

    fn function_at(&self, address: u64) -> Option<FunctionId> {
        self.functions
            .contains_key(&address)
            .then_some(FunctionId(address))
    }

    fn create_function(&mut self, address: u64, name: &str) -> Result<FunctionId> {
        if !self.accepts_function(address) {
            return Err(InvalidAddress(address));
        }

        self.functions.insert(
            address,
            Function {
                address,
                name: name.to_string(),
                signature: None,
            },
        );
        Ok(FunctionId(address))
    }

    fn rename_function(&mut self, function: FunctionId, name: &str) -> Result<()> {
        let entry = self
            .functions
            .get_mut(&function.0)
            .ok_or(InvalidAddress(function.0))?;
        entry.name = name.to_string();
        Ok(())
    }

    fn apply_signature(
        &mut self,
        function: FunctionId,
        signature: FunctionSignature,
    ) -> Result<()> {
        let entry = self
            .functions
            .get_mut(&function.0)
            .ok_or(InvalidAddress(function.0))?;
        entry.signature = Some(signature);
        Ok(())
    }

    fn create_memory_region(
        &mut self,
        name: &str,
        base: u64,
        data: &[u8],
        permissions: RegionPermissions,
    ) -> Result<()> {
        let len = data.len() as u64;
        if len == 0 {
            return Err(Error::Error(format!("Memory region {name} is empty")));
        }
        let Some(end) = base.checked_add(len) else {
            return Err(InvalidAddress(base));
        };

        if self
            .regions
            .iter()
            .any(|region| base < region.end() && region.base < end)
        {
            return Err(RegionOverlap { base, len });
        }

        self.regions.push(MemoryRegion {
            name: name.to_string(),
            base,
            data: data.to_vec(),
            permissions,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{Parameter, ScalarKind};

    fn rwx() -> RegionPermissions {
        RegionPermissions::READ | RegionPermissions::WRITE | RegionPermissions::EXECUTE
    }

    #[test]
    fn test_structure_replace_policy() {
        let mut program = Program::new();
        let first = program
            .define_structure("/TDB", "app.Player", 16, ConflictPolicy::Replace)
            .unwrap();
        program
            .rebuild_structure(first, vec![Member::filler(0, 16)])
            .unwrap();

        let second = program
            .define_structure("/TDB", "app.Player", 24, ConflictPolicy::Replace)
            .unwrap();
        assert_eq!(first, second);

        let structure = program.structure(second).unwrap();
        assert_eq!(structure.size, 24);
        assert!(structure.members.is_empty());
        assert_eq!(program.structures().count(), 1);
    }

    #[test]
    fn test_structure_keep_policy() {
        let mut program = Program::new();
        let handle = program
            .define_structure("/TDB", "app.Player", 16, ConflictPolicy::Replace)
            .unwrap();
        program
            .rebuild_structure(handle, vec![Member::filler(0, 16)])
            .unwrap();

        let kept = program
            .define_structure("/TDB", "app.Player", 24, ConflictPolicy::Keep)
            .unwrap();
        assert_eq!(kept, handle);
        assert_eq!(program.structure(kept).unwrap().size, 16);
        assert_eq!(program.structure(kept).unwrap().members.len(), 1);
    }

    #[test]
    fn test_categories_are_separate() {
        let mut program = Program::new();
        let a = program
            .define_structure("/TDB", "Vec3", 12, ConflictPolicy::Replace)
            .unwrap();
        let b = program
            .define_structure("/Other", "Vec3", 12, ConflictPolicy::Replace)
            .unwrap();
        assert_ne!(a, b);
        assert_eq!(program.handle_of("/Other", "Vec3"), Some(b));
        assert!(program.structure_by_name("/TDB", "Vec3").is_some());
    }

    #[test]
    fn test_unknown_handle() {
        let mut program = Program::new();
        assert!(program.rebuild_structure(StructHandle(3), Vec::new()).is_err());
    }

    #[test]
    fn test_structure_length() {
        let structure = Structure {
            category: "/TDB".to_string(),
            name: "app.Array".to_string(),
            size: 16,
            members: vec![Member::filler(0, 16), Member::filler(16, 8)],
        };
        assert_eq!(structure.length(), 24);
    }

    #[test]
    fn test_labels_without_regions() {
        let mut program = Program::new();
        program.create_label(0x1000, "TypeDef:a").unwrap();
        program.create_label(0x1000, "TypeDef:a").unwrap();
        program.create_label(0x1000, "TypeDef:b").unwrap();
        assert!(matches!(
            program.create_label(0, "TypeDef:c"),
            Err(Error::InvalidAddress(0))
        ));

        assert_eq!(program.labels_at(0x1000), ["TypeDef:a", "TypeDef:b"]);
        assert!(program.labels_at(0x2000).is_empty());
        assert_eq!(program.label_count(), 1);
    }

    #[test]
    fn test_address_rules_with_regions() {
        let mut program = Program::new();
        program
            .create_memory_region("code", 0x1000, &[0xCC; 0x100], rwx())
            .unwrap();
        program
            .create_memory_region("data", 0x4000, &[0; 0x100], RegionPermissions::READ)
            .unwrap();

        assert!(program.create_label(0x1080, "in code").is_ok());
        assert!(program.create_label(0x4010, "in data").is_ok());
        assert!(program.create_label(0x2000, "unmapped").is_err());

        assert!(program.create_function(0x1010, "f").is_ok());
        assert!(program.create_function(0x4010, "g").is_err());
        assert!(program.create_function(0x1100, "h").is_err());
    }

    #[test]
    fn test_region_overlap() {
        let mut program = Program::new();
        program
            .create_memory_region("a", 0x1000, &[0; 0x100], rwx())
            .unwrap();

        let result = program.create_memory_region("b", 0x10F0, &[0; 0x20], rwx());
        assert!(matches!(
            result,
            Err(Error::RegionOverlap {
                base: 0x10F0,
                len: 0x20
            })
        ));
        assert!(program
            .create_memory_region("c", 0x1100, &[0; 0x20], rwx())
            .is_ok());
        assert!(program.create_memory_region("d", 0x3000, &[], rwx()).is_err());
        assert_eq!(program.regions().len(), 2);
    }

    #[test]
    fn test_functions() {
        let mut program = Program::new();
        assert_eq!(program.function_at(0x1000), None);

        let id = program.create_function(0x1000, "sub_1000").unwrap();
        assert_eq!(program.function_at(0x1000), Some(id));

        program.rename_function(id, "app.Player.update").unwrap();
        let signature = FunctionSignature {
            return_type: DataType::Scalar(ScalarKind::Void),
            parameters: vec![Parameter::new("$ctx", DataType::void_pointer())],
        };
        program.apply_signature(id, signature.clone()).unwrap();

        let function = program.function(0x1000).unwrap();
        assert_eq!(function.name, "app.Player.update");
        assert_eq!(function.signature.as_ref(), Some(&signature));

        assert!(program.rename_function(FunctionId(0x2000), "x").is_err());
    }

    #[test]
    fn test_type_name() {
        let mut program = Program::new();
        let handle = program
            .define_structure("/TDB", "app.Player", 16, ConflictPolicy::Replace)
            .unwrap();

        assert_eq!(
            program.type_name(&DataType::pointer_to(DataType::Structure(handle))),
            "app.Player *"
        );
        assert_eq!(program.type_name(&DataType::filler(4)), "undefined[4]");
        assert_eq!(
            program.type_name(&DataType::Scalar(ScalarKind::F32)),
            "float"
        );
    }
}
