//! C header rendering of a [`Program`].
//!
//! The header lists forward declarations for every structure first, so that structures can
//! point at each other regardless of order, then every structure definition in creation
//! order, then the prototypes of all functions that carry a signature.

use std::{collections::HashSet, fmt::Write};

use crate::target::{DataType, Program, Structure};

/// Replace every character that is not valid in a C identifier with `_`.
///
/// A leading digit gets an extra `_` prefix, an empty input becomes `_`.
#[must_use]
pub fn sanitize_identifier(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Render all structures and function prototypes of `program` as a C header.
#[must_use]
pub fn render_header(program: &Program) -> String {
    let mut out = String::new();

    out.push_str("/* Generated by tdbscope */\n");
    out.push_str("#pragma once\n\n");
    out.push_str("#include <stdbool.h>\n");
    out.push_str("#include <stdint.h>\n\n");
    out.push_str("typedef uint8_t undefined;\n\n");

    for (_, structure) in program.structures() {
        let _ = writeln!(out, "struct {};", sanitize_identifier(&structure.name));
    }
    out.push('\n');

    for (_, structure) in program.structures() {
        render_structure(program, structure, &mut out);
    }

    for function in program.functions() {
        let Some(signature) = &function.signature else {
            continue;
        };

        let params = if signature.parameters.is_empty() {
            "void".to_string()
        } else {
            signature
                .parameters
                .iter()
                .map(|param| {
                    c_declaration(program, &param.data_type, &sanitize_identifier(&param.name))
                })
                .collect::<Vec<_>>()
                .join(", ")
        };

        let _ = writeln!(
            out,
            "/* 0x{:016x} */ {} {}({params});",
            function.address,
            c_type(program, &signature.return_type),
            sanitize_identifier(&function.name)
        );
    }

    out
}

fn render_structure(program: &Program, structure: &Structure, out: &mut String) {
    let _ = writeln!(
        out,
        "/* {}{} (0x{:x} bytes) */",
        structure.category,
        if structure.category.ends_with('/') { "" } else { "/" },
        structure.length()
    );
    let _ = writeln!(out, "struct {} {{", sanitize_identifier(&structure.name));

    let mut used = HashSet::new();
    for member in &structure.members {
        let base = match &member.name {
            Some(name) => sanitize_identifier(name),
            None => format!("_pad_{:x}", member.offset),
        };
        let name = if used.contains(&base) {
            format!("{base}_{:x}", member.offset)
        } else {
            base
        };
        used.insert(name.clone());

        let _ = writeln!(
            out,
            "    {}; /* 0x{:x} */",
            c_declaration(program, &member.data_type, &name),
            member.offset
        );
    }

    out.push_str("};\n\n");
}

fn c_type(program: &Program, data_type: &DataType) -> String {
    match data_type {
        DataType::Undefined => "undefined".to_string(),
        DataType::Scalar(kind) => kind.c_name().to_string(),
        DataType::Structure(handle) => match program.structure(*handle) {
            Some(structure) => format!("struct {}", sanitize_identifier(&structure.name)),
            None => "undefined".to_string(),
        },
        DataType::Pointer(inner) => format!("{}*", c_type(program, inner)),
        // Arrays only decay when nested, declarators handle the top level
        DataType::Array { element, .. } => format!("{}*", c_type(program, element)),
    }
}

fn c_declaration(program: &Program, data_type: &DataType, name: &str) -> String {
    match data_type {
        DataType::Array { element, count, .. } => {
            format!("{} {name}[{count}]", c_type(program, element))
        }
        _ => format!("{} {name}", c_type(program, data_type)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::{
        ConflictPolicy, FunctionSignature, Member, Parameter, ScalarKind, Target,
    };

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("app.Player"), "app_Player");
        assert_eq!(sanitize_identifier("$vtable"), "_vtable");
        assert_eq!(sanitize_identifier("List`1<app.Item>"), "List_1_app_Item_");
        assert_eq!(sanitize_identifier("3D"), "_3D");
        assert_eq!(sanitize_identifier(""), "_");
    }

    #[test]
    fn test_render_header() {
        let mut program = Program::new();
        let player = program
            .define_structure("/TDB", "app.Player", 24, ConflictPolicy::Replace)
            .unwrap();
        program
            .rebuild_structure(
                player,
                vec![
                    Member::field(0, "$vtable", DataType::void_pointer(), 8),
                    Member::field(8, "$lock", DataType::void_pointer(), 8),
                    Member::field(16, "_Hp", DataType::Scalar(ScalarKind::I32), 4),
                    Member::filler(20, 4),
                ],
            )
            .unwrap();

        let id = program.create_function(0x1_4000_1000, "app.Player.get_Hp").unwrap();
        program
            .apply_signature(
                id,
                FunctionSignature {
                    return_type: DataType::Scalar(ScalarKind::I32),
                    parameters: vec![
                        Parameter::new("$ctx", DataType::void_pointer()),
                        Parameter::new("$this", DataType::pointer_to(DataType::Structure(player))),
                    ],
                },
            )
            .unwrap();
        program.create_function(0x1_4000_2000, "no_signature").unwrap();

        let header = render_header(&program);

        assert!(header.contains("struct app_Player;\n"));
        assert!(header.contains("struct app_Player {\n"));
        assert!(header.contains("    void* _vtable; /* 0x0 */\n"));
        assert!(header.contains("    int32_t _Hp; /* 0x10 */\n"));
        assert!(header.contains("    undefined _pad_14[4]; /* 0x14 */\n"));
        assert!(header.contains(
            "/* 0x0000000140001000 */ int32_t app_Player_get_Hp(void* _ctx, struct app_Player* _this);"
        ));
        assert!(!header.contains("no_signature"));
    }

    #[test]
    fn test_duplicate_member_names() {
        let mut program = Program::new();
        let handle = program
            .define_structure("/TDB", "app.Derived", 8, ConflictPolicy::Replace)
            .unwrap();
        program
            .rebuild_structure(
                handle,
                vec![
                    Member::field(0, "_Id", DataType::Scalar(ScalarKind::I32), 4),
                    Member::field(4, "_Id", DataType::Scalar(ScalarKind::I32), 4),
                ],
            )
            .unwrap();

        let header = render_header(&program);
        assert!(header.contains("    int32_t _Id; /* 0x0 */\n"));
        assert!(header.contains("    int32_t _Id_4; /* 0x4 */\n"));
    }
}
