use std::path::Path;

use anyhow::{bail, Context};
use serde::Serialize;
use tdbscope::layout::TypeRepr;

use crate::{
    app::GlobalOptions,
    commands::common::import_with_options,
    output::{hex, print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
struct MemberEntry {
    offset: u64,
    name: Option<String>,
    data_type: String,
    length: u64,
}

#[derive(Debug, Serialize)]
struct LayoutOutput {
    name: String,
    size: u32,
    length: u64,
    members: Vec<MemberEntry>,
}

pub fn run(tdb: &Path, name: &str, opts: &GlobalOptions) -> anyhow::Result<()> {
    let (program, session) = import_with_options(tdb, opts)?;

    let record = session
        .catalog
        .find_by_name(name)
        .with_context(|| format!("type not found: {name}"))?;
    let handle = match session.handles.get(record.index) {
        Some(TypeRepr::Structure(handle)) => *handle,
        Some(TypeRepr::Primitive(kind)) => bail!("{name} is the built-in scalar {kind}"),
        None => bail!("{name} was not registered"),
    };
    let structure = program
        .structure(handle)
        .with_context(|| format!("no structure for {name}"))?;

    let output = LayoutOutput {
        name: structure.name.clone(),
        size: structure.size,
        length: structure.length(),
        members: structure
            .members
            .iter()
            .map(|member| MemberEntry {
                offset: member.offset,
                name: member.name.clone(),
                data_type: program.type_name(&member.data_type),
                length: member.length,
            })
            .collect(),
    };

    print_output(&output, opts, |out| {
        println!("{} ({} bytes)", out.name, out.length);
        let mut tw = TabWriter::new(&[
            ("Offset", Align::Right),
            ("Length", Align::Right),
            ("Type", Align::Left),
            ("Name", Align::Left),
        ]);
        for member in &out.members {
            tw.row(vec![
                hex(member.offset),
                hex(member.length),
                member.data_type.clone(),
                member.name.clone().unwrap_or_default(),
            ]);
        }
        tw.print();
        if out.members.is_empty() {
            println!("\nno members, the type has no layout of its own");
        }
    })
}
