use std::ops::Index;

use crate::{
    tdb::{TypeIndex, TypeRecord},
    Error::InvalidTypeIndex,
    Result,
};

/// The fixed-size arena of all type records of one import session.
///
/// A catalog is validated on construction: record `i` sits at index `i`, every type index
/// a record refers to lies inside the catalog, and every base type chain terminates. Once
/// built, the stages index the arena directly and rely on these guarantees, which is why
/// [`Index<TypeIndex>`] is offered alongside the checked [`TypeCatalog::get`].
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: Vec<TypeRecord>,
}

impl TypeCatalog {
    /// Validate a list of records and turn it into a catalog.
    ///
    /// ## Arguments
    /// * `types` - Records, where `types[i].index` must equal `i`
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidTypeIndex`] if a record references an index outside of
    /// the catalog, or [`crate::Error::Malformed`] if records are out of place or a base type
    /// chain loops.
    pub fn new(types: Vec<TypeRecord>) -> Result<Self> {
        let catalog = TypeCatalog { types };
        catalog.validate_positions()?;
        catalog.validate_references()?;
        catalog.validate_base_chains()?;
        Ok(catalog)
    }

    fn validate_positions(&self) -> Result<()> {
        for (position, record) in self.types.iter().enumerate() {
            if record.index.as_usize() != position {
                return Err(malformed_error!(
                    "Type '{}' carries index {} but sits at position {}",
                    record.full_name,
                    record.index,
                    position
                ));
            }
        }
        Ok(())
    }

    fn validate_references(&self) -> Result<()> {
        for record in &self.types {
            let fields = record.fields.iter().map(|field| field.type_index);
            let methods = record.methods.iter().flat_map(|method| {
                std::iter::once(method.return_type)
                    .chain(method.params.iter().map(|param| param.type_index))
            });

            for index in record
                .base
                .into_iter()
                .chain(record.element)
                .chain(fields)
                .chain(methods)
            {
                if !self.contains(index) {
                    return Err(InvalidTypeIndex(index));
                }
            }
        }
        Ok(())
    }

    fn validate_base_chains(&self) -> Result<()> {
        // 0 = unvisited, 1 = on the current chain, 2 = known to terminate
        let mut state = vec![0u8; self.types.len()];

        for start in 0..self.types.len() {
            let mut chain = Vec::new();
            let mut current = Some(start);

            while let Some(position) = current {
                match state[position] {
                    2 => break,
                    1 => {
                        return Err(malformed_error!(
                            "Inheritance cycle through type '{}'",
                            self.types[position].full_name
                        ))
                    }
                    _ => {}
                }
                state[position] = 1;
                chain.push(position);
                current = self.types[position].base.map(|base| base.as_usize());
            }

            for position in chain {
                state[position] = 2;
            }
        }
        Ok(())
    }

    /// Get a record by index
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidTypeIndex`] if the index lies outside of the catalog.
    pub fn get(&self, index: TypeIndex) -> Result<&TypeRecord> {
        self.types.get(index.as_usize()).ok_or(InvalidTypeIndex(index))
    }

    /// Returns true if the index addresses a record of this catalog
    #[must_use]
    pub fn contains(&self, index: TypeIndex) -> bool {
        index.as_usize() < self.types.len()
    }

    /// Find the first record with the given full name
    #[must_use]
    pub fn find_by_name(&self, full_name: &str) -> Option<&TypeRecord> {
        self.types.iter().find(|record| record.full_name == full_name)
    }

    /// Walk the inheritance chain of a type, starting with the type itself.
    ///
    /// The walk always terminates, the catalog rejects cyclic chains on construction.
    pub fn base_chain(&self, index: TypeIndex) -> impl Iterator<Item = &TypeRecord> + '_ {
        std::iter::successors(self.types.get(index.as_usize()), move |record| {
            record.base.map(|base| &self.types[base.as_usize()])
        })
    }

    /// Number of types in the catalog
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if the catalog holds no types
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Iterate over all records in index order
    pub fn iter(&self) -> std::slice::Iter<'_, TypeRecord> {
        self.types.iter()
    }
}

impl Index<TypeIndex> for TypeCatalog {
    type Output = TypeRecord;

    fn index(&self, index: TypeIndex) -> &Self::Output {
        &self.types[index.as_usize()]
    }
}

impl<'a> IntoIterator for &'a TypeCatalog {
    type Item = &'a TypeRecord;
    type IntoIter = std::slice::Iter<'a, TypeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.types.iter()
    }
}
