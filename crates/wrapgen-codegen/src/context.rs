use genco::prelude::*;
use wrapgen_go::imports::{DATA, ERRORS, NODE, RUNTIME};
use wrapgen_go::naming::{is_exported_name, pkg_base_name};
use wrapgen_go::{ChanDir, GoFile, GoType, ImportSet};
use wrapgen_reflect::{ChanDir as ReflectChanDir, TypeExpr, Universe};

use crate::config::GenConfig;
use crate::modpath;

/// Import path of the wrapper package generated for `package_path`.
///
/// Explicit mappings win, then `import_root`, then the module path of the
/// enclosing `go.mod` joined with `output_root`.
pub fn wrapper_import_path(config: &GenConfig, package_path: &str) -> String {
    if let Some(mapped) = config.package_mappings.get(package_path) {
        return mapped.clone();
    }
    let base = pkg_base_name(package_path);
    if let Some(root) = &config.import_root {
        return format!("{}/{base}", root.trim_end_matches('/'));
    }
    let output = config.output_root.to_string_lossy().replace('\\', "/");
    let output = output.trim_start_matches("./").trim_end_matches('/');
    match modpath::module_path() {
        Some(module) if !config.output_root.is_absolute() && !output.is_empty() => {
            format!("{module}/{output}/{base}")
        }
        Some(module) if !config.output_root.is_absolute() => format!("{module}/{base}"),
        _ => {
            log::warn!("no Go module found, importing wrapper package {base} by its directory");
            if output.is_empty() {
                base
            } else {
                format!("{output}/{base}")
            }
        }
    }
}

/// Whether `expr` can be spelled outside its declaring package. Unexported
/// names, including unexported fields and methods of type literals, cannot.
pub fn is_expressible(expr: &TypeExpr) -> bool {
    match expr {
        TypeExpr::Basic { .. } | TypeExpr::Error => true,
        TypeExpr::Named { package, name } => package.is_empty() || is_exported_name(name),
        TypeExpr::Pointer { elem }
        | TypeExpr::Slice { elem }
        | TypeExpr::Array { elem, .. }
        | TypeExpr::Chan { elem, .. } => is_expressible(elem),
        TypeExpr::Map { key, value } => is_expressible(key) && is_expressible(value),
        TypeExpr::Func { signature } => signature
            .params
            .iter()
            .chain(&signature.results)
            .all(is_expressible),
        TypeExpr::Interface { methods } => methods.iter().all(|m| {
            is_exported_name(&m.name) && is_expressible(&TypeExpr::func(m.signature.clone()))
        }),
        TypeExpr::Struct { fields } => fields
            .iter()
            .all(|f| is_exported_name(&f.name) && is_expressible(&f.ty)),
    }
}

/// Per-file generation state: the wrapper package being written and the
/// imports its code references.
pub struct FileContext<'g> {
    universe: &'g Universe,
    config: &'g GenConfig,
    package_path: String,
    package: String,
    source_alias: String,
    imports: ImportSet,
}

impl<'g> FileContext<'g> {
    pub fn new(universe: &'g Universe, config: &'g GenConfig, package_path: &str) -> Self {
        let package = pkg_base_name(package_path);
        let mut imports = ImportSet::new();
        // Declared first so they always keep their plain names.
        imports.declare(ERRORS, "errors");
        imports.declare(DATA, "data");
        imports.declare(NODE, "node");
        imports.declare(RUNTIME, "runtime");
        let source_alias = imports.declare(package_path, &format!("{package}src"));
        Self {
            universe,
            config,
            package_path: package_path.to_string(),
            package,
            source_alias,
            imports,
        }
    }

    pub fn universe(&self) -> &'g Universe {
        self.universe
    }

    pub fn config(&self) -> &'g GenConfig {
        self.config
    }

    /// Name of the wrapper package.
    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn package_path(&self) -> &str {
        &self.package_path
    }

    pub fn use_data(&mut self) {
        self.imports.mark_used(DATA);
    }

    pub fn use_errors(&mut self) {
        self.imports.mark_used(ERRORS);
    }

    pub fn use_node(&mut self) {
        self.imports.mark_used(NODE);
    }

    pub fn use_runtime(&mut self) {
        self.imports.mark_used(RUNTIME);
    }

    /// Alias of the source package, flagged as used.
    pub fn source(&mut self) -> String {
        self.imports.mark_used(&self.package_path);
        self.source_alias.clone()
    }

    /// Alias a source package is imported under, `<base>src`.
    fn source_package(&mut self, package_path: &str) -> String {
        if package_path == self.package_path {
            return self.source();
        }
        let alias = format!("{}src", pkg_base_name(package_path));
        self.imports.require(package_path, &alias)
    }

    /// The Go spelling of `expr` in this file, importing every package it
    /// names.
    pub fn go_type(&mut self, expr: &TypeExpr) -> GoType {
        match expr {
            TypeExpr::Basic { name } => GoType::ident(name.as_str()),
            TypeExpr::Named { package, name } if package.is_empty() => GoType::ident(name.clone()),
            TypeExpr::Named { package, name } => {
                let alias = self.source_package(package);
                GoType::qualified(alias, name.clone())
            }
            TypeExpr::Error => GoType::ident("error"),
            TypeExpr::Pointer { elem } => GoType::pointer(self.go_type(elem)),
            TypeExpr::Slice { elem } => GoType::slice(self.go_type(elem)),
            TypeExpr::Array { len, elem } => GoType::Array(*len, Box::new(self.go_type(elem))),
            TypeExpr::Map { key, value } => {
                let key = self.go_type(key);
                GoType::map(key, self.go_type(value))
            }
            TypeExpr::Chan { dir, elem } => {
                let dir = match dir {
                    ReflectChanDir::Both => ChanDir::Both,
                    ReflectChanDir::Send => ChanDir::Send,
                    ReflectChanDir::Recv => ChanDir::Recv,
                };
                GoType::Chan(dir, Box::new(self.go_type(elem)))
            }
            TypeExpr::Func { signature } => GoType::Func {
                params: signature.params.iter().map(|p| self.go_type(p)).collect(),
                results: signature.results.iter().map(|r| self.go_type(r)).collect(),
                variadic: signature.variadic,
            },
            TypeExpr::Interface { methods } if methods.is_empty() => GoType::ident("any"),
            TypeExpr::Interface { methods } => GoType::Interface(
                methods
                    .iter()
                    .map(|m| (m.name.clone(), self.go_type(&TypeExpr::func(m.signature.clone()))))
                    .collect(),
            ),
            TypeExpr::Struct { fields } => GoType::Struct(
                fields
                    .iter()
                    .map(|f| (f.name.clone(), self.go_type(&f.ty)))
                    .collect(),
            ),
        }
    }

    /// Expression naming the `New<X>ClassFrom` constructor of the class
    /// generated for the named type `package_path.name`, qualified with the
    /// wrapper package when it lives elsewhere.
    pub fn class_ctor(&mut self, package_path: &str, name: &str) -> String {
        let base = pkg_base_name(package_path);
        if base == self.package {
            return format!("New{name}ClassFrom");
        }
        let path = wrapper_import_path(self.config, package_path);
        let alias = self.imports.require(&path, &base);
        format!("{alias}.New{name}ClassFrom")
    }

    /// Assembles the file from its declarations.
    pub fn finish(self, body: Tokens<Go>) -> GoFile {
        GoFile::new(self.package, self.imports, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use wrapgen_reflect::{BasicKind, Signature};

    const DEMO: &str = "example.com/demo";

    fn config() -> GenConfig {
        GenConfig {
            import_root: Some("example.com/app/origami".to_string()),
            ..GenConfig::default()
        }
    }

    #[test]
    fn test_go_type_aliases_source_packages() {
        let universe = Universe::new();
        let config = config();
        let mut cx = FileContext::new(&universe, &config, DEMO);

        let expr = TypeExpr::map(
            TypeExpr::string(),
            TypeExpr::slice(TypeExpr::pointer(TypeExpr::named(DEMO, "User"))),
        );
        assert_eq!(cx.go_type(&expr).to_string(), "map[string][]*demosrc.User");

        let duration = TypeExpr::named("time", "Duration");
        assert_eq!(cx.go_type(&duration).to_string(), "timesrc.Duration");

        let callback = TypeExpr::func(Signature::new(
            vec![TypeExpr::basic(BasicKind::Int)],
            vec![TypeExpr::error()],
        ));
        assert_eq!(cx.go_type(&callback).to_string(), "func(int) error");
        assert_eq!(cx.go_type(&TypeExpr::any()).to_string(), "any");

        let file = cx.finish(quote!());
        let used = file.imports().used();
        assert_eq!(
            used,
            vec![("time", "timesrc"), ("example.com/demo", "demosrc")]
        );
    }

    #[test]
    fn test_runtime_imports_only_when_used() {
        let universe = Universe::new();
        let config = config();
        let mut cx = FileContext::new(&universe, &config, DEMO);
        cx.use_data();
        let file = cx.finish(quote!());
        assert!(file.imports().is_used(DATA));
        assert!(!file.imports().is_used(NODE));
        assert!(!file.imports().is_used(DEMO));
    }

    #[test]
    fn test_class_ctor_qualifies_foreign_packages() {
        let universe = Universe::new();
        let config = config();
        let mut cx = FileContext::new(&universe, &config, DEMO);

        assert_eq!(cx.class_ctor(DEMO, "User"), "NewUserClassFrom");
        assert_eq!(
            cx.class_ctor("example.com/other", "Client"),
            "other.NewClientClassFrom"
        );
        let file = cx.finish(quote!());
        assert!(file.imports().is_used("example.com/app/origami/other"));
    }

    #[test]
    fn test_unexported_names_are_not_expressible() {
        assert!(is_expressible(&TypeExpr::map(
            TypeExpr::string(),
            TypeExpr::pointer(TypeExpr::named(DEMO, "User")),
        )));
        assert!(!is_expressible(&TypeExpr::slice(TypeExpr::named(DEMO, "config"))));
        assert!(is_expressible(&TypeExpr::named("", "int")));
        assert!(!is_expressible(&TypeExpr::func(Signature::new(
            vec![],
            vec![TypeExpr::named(DEMO, "state")],
        ))));
    }

    #[test]
    fn test_wrapper_import_path_prefers_mappings() {
        let mut config = config();
        config.package_mappings.insert(
            "example.com/other".to_string(),
            "example.com/wrappers/other".to_string(),
        );
        assert_eq!(
            wrapper_import_path(&config, "example.com/other"),
            "example.com/wrappers/other"
        );
        assert_eq!(
            wrapper_import_path(&config, "example.com/demo"),
            "example.com/app/origami/demo"
        );
    }
}
