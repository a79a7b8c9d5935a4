use genco::prelude::*;
use wrapgen_go::{block, comment, lines, GoFile, ImportSet};

use crate::session::PackageEntry;

pub const MANIFEST_FILE: &str = "load.go";

/// The `load.go` of a wrapper package, registering every listed function and
/// class with the interpreter.
pub fn manifest_file(package: &str, entry: &PackageEntry) -> GoFile {
    let mut imports = ImportSet::new();
    imports.require_default(wrapgen_go::imports::DATA);

    let functions: Vec<String> = entry
        .functions
        .iter()
        .map(|name| format!("New{name}Function()"))
        .collect();
    let classes: Vec<String> = entry
        .classes
        .iter()
        .map(|name| format!("vm.AddClass(New{name}Class())"))
        .collect();
    let mut statements: Vec<Tokens<Go>> = Vec::new();
    if !functions.is_empty() {
        let listed = lines(functions.iter().map(|fun| quote!($(fun.as_str()),)));
        statements.push(quote!(for _, fun := range []data.FuncStmt$(block(listed)) $(block(quote!(vm.AddFunc(fun))))));
    }
    statements.extend(classes.iter().map(|class| quote!($(class.as_str()))));

    let body = lines([
        quote!($(comment([format!("Load registers the {package} wrappers with vm.")]))),
        quote!(func Load(vm data.VM) $(block(lines(statements)))),
    ]);
    GoFile::new(package, imports, body)
}
