use std::{fs, path::Path};

use anyhow::Context;
use tdbscope::target::render_header;

use crate::{app::GlobalOptions, commands::common::import_with_options};

pub fn run(tdb: &Path, output: Option<&Path>, opts: &GlobalOptions) -> anyhow::Result<()> {
    let (program, _) = import_with_options(tdb, opts)?;
    let header = render_header(&program);

    match output {
        Some(path) => {
            fs::write(path, &header)
                .with_context(|| format!("failed to write header: {}", path.display()))?;
            log::info!("Wrote {} bytes to {}", header.len(), path.display());
        }
        None => print!("{header}"),
    }
    Ok(())
}
