use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use tdbscope::{memory::MemoryReport, target::Program, ImportReport, Importer};

use crate::{
    app::GlobalOptions,
    commands::common::{import_tdb, load_config},
    output::{print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
struct ImportOutput {
    memory: Option<MemoryReport>,
    report: ImportReport,
}

fn stage_rows(out: &ImportOutput) -> Vec<(&'static str, String, String)> {
    let mut rows = Vec::new();
    let report = &out.report;

    if let Some(memory) = &out.memory {
        rows.push((
            "memory",
            format!("{} regions, {} bytes", memory.imported, memory.bytes),
            memory.failed.to_string(),
        ));
    }
    rows.push((
        "types",
        format!("{} ({} primitive)", report.type_count, report.primitive_count),
        "0".to_string(),
    ));
    if let Some(labels) = &report.labels {
        rows.push(("labels", labels.created.to_string(), labels.failed.to_string()));
    }
    rows.push((
        "layouts",
        format!("{} ({} skipped)", report.layouts, report.layouts_skipped),
        report.warnings.len().to_string(),
    ));
    if let Some(functions) = &report.functions {
        rows.push((
            "functions",
            format!(
                "{} created, {} renamed, {} signatures ({} without address)",
                functions.created, functions.renamed, functions.applied, functions.skipped
            ),
            functions.failed.to_string(),
        ));
    }
    rows
}

pub fn run(tdb: &Path, memory: Option<&Path>, opts: &GlobalOptions) -> anyhow::Result<()> {
    let importer = Importer::new(load_config(opts)?);
    let mut program = Program::new();

    let memory = match memory {
        Some(dir) => Some(
            importer
                .import_memory(dir, &mut program)
                .with_context(|| format!("failed to import memory: {}", dir.display()))?,
        ),
        None => None,
    };
    let session = import_tdb(tdb, &importer, &mut program)?;

    let output = ImportOutput {
        memory,
        report: session.report,
    };

    print_output(&output, opts, |out| {
        let mut tw = TabWriter::new(&[
            ("Stage", Align::Left),
            ("Result", Align::Left),
            ("Problems", Align::Right),
        ]);
        for (stage, result, problems) in stage_rows(out) {
            tw.row(vec![stage.to_string(), result, problems]);
        }
        tw.print();

        if !out.report.warnings.is_empty() {
            println!();
            for warning in &out.report.warnings {
                println!("  {warning}");
            }
        }
    })
}
