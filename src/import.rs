//! The end-to-end import pipeline.
//!
//! [`Importer::run`] executes the stages strictly one after another, each finishing for the
//! whole catalog before the next one starts:
//!
//! 1. load the chunked TDB into a validated [`TypeCatalog`]
//! 2. label every type definition address
//! 3. register a scalar or an empty structure for every type
//! 4. lay out every structured type
//! 5. create functions and apply signatures for every method with an address
//!
//! Fatal errors abort the run and leave the target as far as it got. Everything else is
//! logged, counted in the [`ImportReport`] and skipped.

use std::path::Path;

use log::info;
use serde::Serialize;

use crate::{
    layout::{register_types, LayoutResolver, LayoutWarning, TypeHandles},
    memory::{import_memory, MemoryReport},
    signature::{SignatureBuilder, SignatureReport},
    tdb::{apply_type_labels, ChunkSource, LabelReport, TdbLoader, TypeCatalog},
    target::Target,
    ImportConfig, Result,
};

/// Summary of an import run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Types in the catalog
    pub type_count: usize,
    /// Types mapped onto built-in scalars
    pub primitive_count: usize,
    /// Type definition labels, if the pass ran
    pub labels: Option<LabelReport>,
    /// Structures whose members were rebuilt
    pub layouts: usize,
    /// Types without a layout of their own
    pub layouts_skipped: usize,
    /// Layout overlaps and overflows
    pub warnings: Vec<LayoutWarning>,
    /// Function stage outcome, if the stage ran
    pub functions: Option<SignatureReport>,
}

/// Everything an import produced, for callers that want to keep inspecting it
#[derive(Debug)]
pub struct ImportSession {
    /// The loaded catalog
    pub catalog: TypeCatalog,
    /// Target representation of every type
    pub handles: TypeHandles,
    /// Summary of the run
    pub report: ImportReport,
}

/// Runs the import pipeline with a fixed configuration
#[derive(Debug, Clone, Default)]
pub struct Importer {
    config: ImportConfig,
}

impl Importer {
    /// Create an importer
    #[must_use]
    pub fn new(config: ImportConfig) -> Self {
        Importer { config }
    }

    /// The configuration this importer runs with
    #[must_use]
    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Load the memory dump in `dir` into `target`.
    ///
    /// Usually called before [`Importer::run`], so labels and functions land on mapped
    /// memory.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be read.
    pub fn import_memory<T: Target>(
        &self,
        dir: impl AsRef<Path>,
        target: &mut T,
    ) -> Result<MemoryReport> {
        import_memory(dir, target)
    }

    /// Import the TDB from `source` into `target`.
    ///
    /// # Errors
    /// Returns [`crate::Error::MissingChunk`] if the first chunk is absent,
    /// [`crate::Error::Malformed`] or [`crate::Error::InvalidTypeIndex`] for an inconsistent
    /// dump, [`crate::Error::TypeCreationFailed`] if the target refuses a structure, and any
    /// error the source reports.
    pub fn run<S: ChunkSource, T: Target>(
        &self,
        source: &mut S,
        target: &mut T,
    ) -> Result<ImportReport> {
        Ok(self.session(source, target)?.report)
    }

    /// Like [`Importer::run`], but hands back the catalog and the type handles too.
    ///
    /// # Errors
    /// See [`Importer::run`].
    pub fn session<S: ChunkSource, T: Target>(
        &self,
        source: &mut S,
        target: &mut T,
    ) -> Result<ImportSession> {
        let catalog = TdbLoader::new(self.config.chunk_size).load(source)?;
        let mut report = ImportReport {
            type_count: catalog.len(),
            ..ImportReport::default()
        };

        if self.config.label_types {
            info!("First scan, add type def label");
            report.labels = Some(apply_type_labels(
                &catalog,
                target,
                &self.config.label_prefix,
            ));
        }

        info!("Register types...");
        let handles = register_types(&catalog, target, &self.config.category)?;
        report.primitive_count = handles.primitive_count();

        info!("Add all fields...");
        let resolved = LayoutResolver::new(&catalog, &handles)
            .with_dearray_sample_len(self.config.dearray_sample_len)
            .resolve_all(target, self.config.progress_interval)?;
        report.layouts = resolved.resolved;
        report.layouts_skipped = resolved.skipped;
        report.warnings = resolved.warnings;

        if self.config.apply_signatures {
            info!("Add all methods...");
            report.functions = Some(SignatureBuilder::new(&catalog, &handles).apply_all(target));
        }

        info!("Import of {} types done", report.type_count);
        Ok(ImportSession {
            catalog,
            handles,
            report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        tdb::{
            raw::{RawChunk, RawField, RawMethod, RawReturn},
            MemorySource, TypeIndex,
        },
        target::Program,
        test::{raw_chunk, raw_type, FailingTarget},
        Error,
    };

    fn source() -> MemorySource {
        let mut int = raw_type("System.Int32");
        int.vm_obj_type = 5;
        int.len = 4;
        int.runtime_len = 20;
        int.system_type = 18;
        int.type_def_address = 0x1000;

        let mut player = raw_type("app.Player");
        player.len = 8;
        player.runtime_len = 24;
        player.type_def_address = 0x2000;
        player.fields = vec![RawField {
            name: "_Hp".to_string(),
            ti: TypeIndex(0),
            position: 0,
            flags: 1,
        }];
        player.methods = vec![RawMethod {
            name: "get_Hp".to_string(),
            runtime_address: 0x3000,
            ret: RawReturn { ti: TypeIndex(0) },
            flags: 0,
            params: Vec::new(),
        }];

        [RawChunk {
            start_index: 0,
            types: vec![int, player],
        }]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_run() {
        let mut program = Program::new();
        let report = Importer::default().run(&mut source(), &mut program).unwrap();

        assert_eq!(report.type_count, 2);
        assert_eq!(report.primitive_count, 1);
        assert_eq!(report.labels, Some(LabelReport { created: 2, failed: 0 }));
        assert_eq!(report.layouts, 1);
        assert!(report.warnings.is_empty());
        assert_eq!(report.functions.map(|f| f.applied), Some(1));

        let player = program.structure_by_name("/TDB", "app.Player").unwrap();
        assert_eq!(player.member("_Hp").map(|m| m.offset), Some(16));
        assert_eq!(program.labels_at(0x2000), ["TypeDef:app.Player".to_string()]);
        assert_eq!(program.function(0x3000).unwrap().name, "app.Player.get_Hp");
    }

    #[test]
    fn test_disabled_stages() {
        let config = ImportConfig::default()
            .with_label_types(false)
            .with_apply_signatures(false)
            .with_category("/Game");
        let mut program = Program::new();
        let report = Importer::new(config).run(&mut source(), &mut program).unwrap();

        assert_eq!(report.labels, None);
        assert_eq!(report.functions, None);
        assert_eq!(program.label_count(), 0);
        assert_eq!(program.functions().count(), 0);
        assert!(program.structure_by_name("/Game", "app.Player").is_some());
    }

    #[test]
    fn test_missing_source() {
        let mut program = Program::new();
        let result = Importer::default().run(&mut MemorySource::new(), &mut program);
        assert!(matches!(result, Err(Error::MissingChunk { .. })));
    }

    #[test]
    fn test_type_creation_failure_aborts() {
        let mut source: MemorySource = [raw_chunk(0, 3)].into_iter().collect();
        let mut target = FailingTarget::default();
        let result = Importer::default().run(&mut source, &mut target);
        assert!(matches!(result, Err(Error::TypeCreationFailed(_))));
        // Three refused labels, then the first structure aborts the run
        assert_eq!(target.attempts, 4);
    }

    #[test]
    fn test_session_keeps_catalog() {
        let mut program = Program::new();
        let session = Importer::default()
            .session(&mut source(), &mut program)
            .unwrap();
        assert_eq!(session.catalog.len(), 2);
        assert_eq!(session.handles.len(), 2);
        assert_eq!(session.report.type_count, 2);
    }
}
