//! Recovery of declared parameter names.
//!
//! Names only affect the parameter descriptors a wrapper reports to the
//! interpreter, so every step is best effort and falls back to `paramN`.

use std::{fs, path::Path};

use tree_sitter::{Node, Parser};

/// Where to look for the declaration of a function or method.
#[derive(Debug, Clone, Copy)]
pub struct ParamSource<'a> {
    pub explicit: Option<&'a [String]>,
    pub source_file: Option<&'a Path>,
    pub func_name: &'a str,
    /// Receiver type name for methods.
    pub receiver: Option<&'a str>,
}

/// Returns one name per parameter: explicit names when their count matches,
/// then names parsed from the source file, then `param0`, `param1`, ...
pub fn resolve_param_names(source: ParamSource<'_>, count: usize) -> Vec<String> {
    let names = source
        .explicit
        .filter(|names| names.len() == count)
        .map(<[String]>::to_vec)
        .or_else(|| {
            let file = source.source_file?;
            let contents = fs::read_to_string(file)
                .map_err(|err| log::debug!("cannot read {}: {err}", file.display()))
                .ok()?;
            extract_param_names(&contents, source.func_name, source.receiver, count)
        });

    match names {
        Some(names) => names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                if name.is_empty() || name == "_" || name == "param" {
                    format!("param{i}")
                } else {
                    name
                }
            })
            .collect(),
        None => (0..count).map(|i| format!("param{i}")).collect(),
    }
}

/// Parses Go source and returns the parameter names of the top level
/// `func [(recv)] name(...)` declaration, when it has exactly `expected`
/// parameters. Unnamed parameters are reported as `param`.
pub fn extract_param_names(
    source: &str,
    func_name: &str,
    receiver: Option<&str>,
    expected: usize,
) -> Option<Vec<String>> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_go::LANGUAGE.into())
        .map_err(|err| log::debug!("cannot load the Go grammar: {err}"))
        .ok()?;
    let tree = parser.parse(source, None)?;
    let root = tree.root_node();

    let mut cursor = root.walk();
    let found = root.children(&mut cursor).find_map(|decl| {
        let receiver_matches = match (decl.kind(), receiver) {
            ("function_declaration", None) => true,
            ("method_declaration", Some(want)) => decl
                .child_by_field_name("receiver")
                .and_then(|list| receiver_type(source, list))
                .is_some_and(|ty| ty == want),
            _ => false,
        };
        let name = decl.child_by_field_name("name")?;
        if !receiver_matches || text(source, name) != func_name {
            return None;
        }
        decl.child_by_field_name("parameters")
            .map(|list| param_names(source, list))
    })?;
    (found.len() == expected).then_some(found)
}

fn text<'s>(source: &'s str, node: Node<'_>) -> &'s str {
    &source[node.byte_range()]
}

/// `(u *User[T])` -> `User`
fn receiver_type<'s>(source: &'s str, list: Node<'_>) -> Option<&'s str> {
    let mut cursor = list.walk();
    let decl = list
        .named_children(&mut cursor)
        .find(|c| c.kind() == "parameter_declaration")?;
    let mut ty = decl.child_by_field_name("type")?;
    loop {
        ty = match ty.kind() {
            "pointer_type" | "parenthesized_type" => ty.named_child(0)?,
            "generic_type" => ty.child_by_field_name("type")?,
            _ => return Some(text(source, ty)),
        };
    }
}

fn param_names(source: &str, list: Node<'_>) -> Vec<String> {
    let mut names = Vec::new();
    let mut cursor = list.walk();
    for decl in list.named_children(&mut cursor) {
        if !matches!(
            decl.kind(),
            "parameter_declaration" | "variadic_parameter_declaration"
        ) {
            continue;
        }
        let mut inner = decl.walk();
        let declared: Vec<String> = decl
            .children_by_field_name("name", &mut inner)
            .map(|name| text(source, name).to_string())
            .collect();
        if declared.is_empty() {
            names.push("param".to_string());
        } else {
            names.extend(declared);
        }
    }
    names
}
