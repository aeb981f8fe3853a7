use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use tdbscope::{
    signature::SignatureBuilder,
    target::{FunctionSignature, Program},
};

use crate::{
    app::GlobalOptions,
    commands::common::import_with_options,
    output::{hex, print_output, Align, TabWriter},
};

#[derive(Debug, Serialize)]
struct MethodEntry {
    address: u64,
    name: String,
    is_static: bool,
    prototype: String,
}

#[derive(Debug, Serialize)]
struct MethodsOutput {
    owner: String,
    methods: Vec<MethodEntry>,
    count: usize,
}

fn prototype(program: &Program, name: &str, signature: &FunctionSignature) -> String {
    let params: Vec<String> = signature
        .parameters
        .iter()
        .map(|param| format!("{} {}", program.type_name(&param.data_type), param.name))
        .collect();
    format!(
        "{} {name}({})",
        program.type_name(&signature.return_type),
        params.join(", ")
    )
}

pub fn run(tdb: &Path, name: &str, opts: &GlobalOptions) -> anyhow::Result<()> {
    let (program, session) = import_with_options(tdb, opts)?;

    let owner = session
        .catalog
        .find_by_name(name)
        .with_context(|| format!("type not found: {name}"))?;
    let builder = SignatureBuilder::new(&session.catalog, &session.handles);

    let methods: Vec<MethodEntry> = owner
        .methods
        .iter()
        .map(|method| MethodEntry {
            address: method.runtime_address,
            name: method.name.clone(),
            is_static: method.is_static(),
            prototype: prototype(
                &program,
                &SignatureBuilder::function_name(owner, method),
                &builder.build(owner, method),
            ),
        })
        .collect();

    let count = methods.len();
    let output = MethodsOutput {
        owner: owner.full_name.clone(),
        methods,
        count,
    };

    print_output(&output, opts, |out| {
        let mut tw = TabWriter::new(&[
            ("Address", Align::Right),
            ("Kind", Align::Left),
            ("Signature", Align::Left),
        ]);
        for method in &out.methods {
            tw.row(vec![
                if method.address == 0 {
                    "-".to_string()
                } else {
                    hex(method.address)
                },
                if method.is_static { "static" } else { "instance" }.to_string(),
                method.prototype.clone(),
            ]);
        }
        tw.print();
        println!("\n{} method(s) on {}.", out.count, out.owner);
    })
}
