use std::path::Path;

use anyhow::Context;
use tdbscope::{tdb::DirectorySource, target::Program, ImportConfig, ImportSession, Importer};

use crate::app::GlobalOptions;

/// The import configuration from `--config`, or the defaults.
pub fn load_config(opts: &GlobalOptions) -> anyhow::Result<ImportConfig> {
    match &opts.config {
        Some(path) => ImportConfig::from_file(path)
            .with_context(|| format!("failed to read config: {}", path.display())),
        None => Ok(ImportConfig::default()),
    }
}

/// Import the TDB in `dir` into `program`.
pub fn import_tdb(
    dir: &Path,
    importer: &Importer,
    program: &mut Program,
) -> anyhow::Result<ImportSession> {
    importer
        .session(&mut DirectorySource::new(dir), program)
        .with_context(|| format!("failed to import TDB: {}", dir.display()))
}

/// Load the configuration and run a full import into a fresh [`Program`].
pub fn import_with_options(
    dir: &Path,
    opts: &GlobalOptions,
) -> anyhow::Result<(Program, ImportSession)> {
    let importer = Importer::new(load_config(opts)?);
    let mut program = Program::new();
    let session = import_tdb(dir, &importer, &mut program)?;
    Ok((program, session))
}
