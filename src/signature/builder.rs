use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    layout::TypeHandles,
    tdb::{MethodRecord, TypeCatalog, TypeIndex, TypeRecord},
    target::{DataType, FunctionSignature, Parameter, ScalarKind, Target},
};

/// Name of the hidden return slot parameter
pub const RETURN_SLOT_PARAM: &str = "$ret";
/// Name of the runtime context parameter every method receives first
pub const CONTEXT_PARAM: &str = "$ctx";
/// Name of the instance parameter of non-static methods
pub const THIS_PARAM: &str = "$this";
/// Largest value type returned directly; larger ones go through [`RETURN_SLOT_PARAM`]
pub const MAX_DIRECT_RETURN_SIZE: u32 = 8;

/// Outcome of the signature stage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SignatureReport {
    /// Functions created at a method address
    pub created: usize,
    /// Existing functions renamed after their method
    pub renamed: usize,
    /// Methods without a runtime address
    pub skipped: usize,
    /// Methods whose function could not be created or updated
    pub failed: usize,
    /// Signatures applied
    pub applied: usize,
}

/// Turns method records into function signatures.
///
/// Parameter order is fixed: the hidden return slot (only for value types larger than
/// [`MAX_DIRECT_RETURN_SIZE`]), the context pointer, the instance pointer (only for
/// non-static methods), then the declared parameters.
#[derive(Debug, Clone, Copy)]
pub struct SignatureBuilder<'a> {
    catalog: &'a TypeCatalog,
    handles: &'a TypeHandles,
}

impl<'a> SignatureBuilder<'a> {
    /// Create a builder.
    ///
    /// `handles` must come from registering `catalog`.
    #[must_use]
    pub fn new(catalog: &'a TypeCatalog, handles: &'a TypeHandles) -> Self {
        SignatureBuilder { catalog, handles }
    }

    /// Name of the function implementing `method` of `owner`
    #[must_use]
    pub fn function_name(owner: &TypeRecord, method: &MethodRecord) -> String {
        format!("{}.{}", owner.full_name, method.name)
    }

    /// A value type stays itself, a reference type becomes a pointer to it
    fn passed_as(&self, index: TypeIndex) -> DataType {
        let data_type = self.handles.data_type(index);
        if self.catalog[index].is_value_type {
            data_type
        } else {
            DataType::pointer_to(data_type)
        }
    }

    /// Build the signature of `method` declared on `owner`.
    #[must_use]
    pub fn build(&self, owner: &TypeRecord, method: &MethodRecord) -> FunctionSignature {
        let mut parameters = Vec::with_capacity(method.params.len() + 3);

        let ret = &self.catalog[method.return_type];
        let return_type = if ret.is_value_type && ret.size > MAX_DIRECT_RETURN_SIZE {
            parameters.push(Parameter::new(
                RETURN_SLOT_PARAM,
                DataType::pointer_to(self.handles.data_type(method.return_type)),
            ));
            DataType::Scalar(ScalarKind::Void)
        } else {
            self.passed_as(method.return_type)
        };

        parameters.push(Parameter::new(CONTEXT_PARAM, DataType::void_pointer()));
        if !method.is_static() {
            parameters.push(Parameter::new(
                THIS_PARAM,
                DataType::pointer_to(self.handles.data_type(owner.index)),
            ));
        }

        for param in &method.params {
            let mut data_type = self.passed_as(param.type_index);
            if param.is_by_ref() {
                data_type = DataType::pointer_to(data_type);
            }
            parameters.push(Parameter::new(param.name.clone(), data_type));
        }

        FunctionSignature {
            return_type,
            parameters,
        }
    }

    /// Name and type every method with a runtime address in `target`.
    ///
    /// An existing function at the address is renamed, otherwise one is created. Targets
    /// refusing a function are logged and counted, the stage never aborts.
    pub fn apply_all<T: Target>(&self, target: &mut T) -> SignatureReport {
        let mut report = SignatureReport::default();

        for owner in self.catalog {
            for method in &owner.methods {
                if !method.has_address() {
                    report.skipped += 1;
                    continue;
                }

                let name = Self::function_name(owner, method);
                let address = method.runtime_address;

                let function = match target.function_at(address) {
                    Some(function) => match target.rename_function(function, &name) {
                        Ok(()) => {
                            report.renamed += 1;
                            function
                        }
                        Err(error) => {
                            warn!("could not rename function {name} at 0x{address:x}: {error}");
                            report.failed += 1;
                            continue;
                        }
                    },
                    None => match target.create_function(address, &name) {
                        Ok(function) => {
                            report.created += 1;
                            function
                        }
                        Err(error) => {
                            warn!("could not create function {name} at 0x{address:x}: {error}");
                            report.failed += 1;
                            continue;
                        }
                    },
                };

                let signature = self.build(owner, method);
                match target.apply_signature(function, signature) {
                    Ok(()) => {
                        debug!("Applied signature to {name}");
                        report.applied += 1;
                    }
                    Err(error) => {
                        warn!("could not apply signature to {name}: {error}");
                        report.failed += 1;
                    }
                }
            }
        }

        info!(
            "Functions: {} created, {} renamed, {} failed, {} without address",
            report.created, report.renamed, report.failed, report.skipped
        );
        report
    }
}
