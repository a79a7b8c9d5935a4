//! Recursive generation of wrappers for every reachable class.

use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use wrapgen_go::naming::{is_exported_name, pkg_base_name};
use wrapgen_go::GoFile;
use wrapgen_reflect::{classify, proxy_target, FuncDecl, Kind, Root, Shape, Ty, TypeExpr, Universe};

use crate::class::WrapperPlan;
use crate::config::{Blacklist, GenConfig};
use crate::context::{is_expressible, FileContext};
use crate::emit::{format_or_keep, Emitter, FsEmitter, GoFmt, SourceFormatter};
use crate::error::GenerateError;
use crate::function::FunctionAdapter;
use crate::manifest::{manifest_file, MANIFEST_FILE};
use crate::method::MethodAdapter;
use crate::params::{resolve_param_names, ParamSource};
use crate::session::{Registration, Session};

/// Bounds the walk through container and function types when looking for
/// classes, so recursive named function types terminate.
const MAX_TYPE_NESTING: usize = 8;

/// Generates wrappers for roots of one universe, sharing a [`Session`] so a
/// type reachable from several roots is generated once.
pub struct Generator<'u> {
    universe: &'u Universe,
    config: GenConfig,
    session: Session,
    emitter: Arc<dyn Emitter>,
    formatter: Arc<dyn SourceFormatter>,
}

impl<'u> Generator<'u> {
    pub fn new(universe: &'u Universe, config: GenConfig) -> Self {
        Self {
            universe,
            config,
            session: Session::new(),
            emitter: Arc::new(FsEmitter),
            formatter: Arc::new(GoFmt::default()),
        }
    }

    pub fn with_emitter(mut self, emitter: Arc<dyn Emitter>) -> Self {
        self.emitter = emitter;
        self
    }

    pub fn with_formatter(mut self, formatter: Arc<dyn SourceFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn config(&self) -> &GenConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn generate(&self, root: &Root) -> Result<(), GenerateError> {
        match root {
            Root::Type(expr) => self.generate_type(expr),
            Root::Function(decl) => self.generate_function(decl),
        }
    }

    /// Generates the class wrapper of a struct or interface type and of every
    /// class it reaches.
    pub fn generate_type(&self, expr: &TypeExpr) -> Result<(), GenerateError> {
        self.type_task(self.universe.ty(expr), 0)
    }

    /// Generates the wrapper of a free function and of every class its
    /// signature reaches.
    pub fn generate_function(&self, decl: &FuncDecl) -> Result<(), GenerateError> {
        self.function_task(decl, 0)
    }

    fn depth_exceeded(&self, depth: usize) -> bool {
        self.config.depth_limit().is_some_and(|limit| depth >= limit)
    }

    fn type_task(&self, ty: Ty<'_>, depth: usize) -> Result<(), GenerateError> {
        if self.depth_exceeded(depth) {
            log::debug!("depth limit reached, not generating {ty}");
            return Ok(());
        }
        let target = ty.deref();
        let key = target.to_string();
        if !self.session.claim(&key) {
            log::debug!("skipping already generated type {key}");
            return Ok(());
        }

        if let (Some(package), Some(name)) = (target.pkg_path(), target.name()) {
            let path = self
                .config
                .package_dir(package)
                .join(format!("{}_class.go", name.to_lowercase()));
            if self.replace_fixed(&path, package, Registration::Class(name.to_string()))? {
                return Ok(());
            }
        }

        if target.is_empty_interface() {
            log::debug!("skipping the empty interface");
            return Ok(());
        }
        if target.is_named() && !target.is_exported() {
            log::debug!("skipping unexported type {key}");
            return Ok(());
        }

        match classify(ty) {
            Shape::ClassLike => self.class_task(target, depth),
            Shape::FuncLike => Err(GenerateError::NotCallable(key)),
            Shape::Skip => Err(GenerateError::NotClassLike(key)),
        }
    }

    fn class_task(&self, ty: Ty<'_>, depth: usize) -> Result<(), GenerateError> {
        let plan = WrapperPlan::new(ty)?;
        let universe = ty.universe();
        let package_path = plan.package_path();
        let dir = self.config.package_dir(package_path);

        for slot in plan.methods() {
            let method = slot.method;
            let names = resolve_param_names(
                ParamSource {
                    explicit: method.param_names.as_deref(),
                    source_file: method.source_file.as_deref(),
                    func_name: &method.name,
                    receiver: Some(plan.name()),
                },
                method.signature.params.len(),
            );
            let adapter = MethodAdapter::new(universe, plan.name(), method, &names);
            let mut cx = FileContext::new(universe, &self.config, package_path);
            let source = plan.source_type(&mut cx);
            let body = adapter.generate(&mut cx, &source);
            self.emit(&dir.join(adapter.file_name()), cx.finish(body))?;
        }

        let mut cx = FileContext::new(universe, &self.config, package_path);
        let body = plan.generate(&mut cx);
        self.emit(&dir.join(plan.file_name()), cx.finish(body))?;
        self.register(package_path, Registration::Class(plan.name().to_string()))?;

        for referenced in plan.referenced_types() {
            self.recurse(referenced, depth);
        }
        Ok(())
    }

    fn function_task(&self, decl: &FuncDecl, depth: usize) -> Result<(), GenerateError> {
        if self.depth_exceeded(depth) {
            log::debug!("depth limit reached, not generating {}", decl.name);
            return Ok(());
        }
        let decl = self.resolve_owner(decl)?;
        let key = format!("func {}.{}", decl.package, decl.name);
        if !self.session.claim(&key) {
            log::debug!("skipping already generated function {key}");
            return Ok(());
        }

        let dir = self.config.package_dir(&decl.package);
        let adapter_file = format!("{}_func.go", decl.name.to_lowercase());
        if self.replace_fixed(
            &dir.join(&adapter_file),
            &decl.package,
            Registration::Function(decl.name.clone()),
        )? {
            return Ok(());
        }

        if !is_exported_name(&decl.name) {
            log::debug!("skipping unexported function {key}");
            return Ok(());
        }
        let signature = &decl.signature;
        if !signature.params.iter().chain(&signature.results).all(is_expressible) {
            log::warn!("{key}: signature uses unexported types, skipping");
            return Ok(());
        }

        let names = resolve_param_names(
            ParamSource {
                explicit: decl.param_names.as_deref(),
                source_file: decl.source_file.as_deref(),
                func_name: &decl.name,
                receiver: None,
            },
            signature.params.len(),
        );
        let adapter = FunctionAdapter::new(self.universe, &decl, &names);
        let mut cx = FileContext::new(self.universe, &self.config, &decl.package);
        let body = adapter.generate(&mut cx);
        self.emit(&dir.join(adapter.file_name()), cx.finish(body))?;
        self.register(&decl.package, Registration::Function(decl.name.clone()))?;

        for expr in signature.params.iter().chain(&signature.results) {
            self.recurse(self.universe.ty(expr), depth);
        }
        Ok(())
    }

    /// Fills in the package of a declaration that lacks one from the first
    /// named type among its results, then its parameters.
    fn resolve_owner<'d>(&self, decl: &'d FuncDecl) -> Result<Cow<'d, FuncDecl>, GenerateError> {
        if decl.name.is_empty() {
            let owner = if decl.package.is_empty() { "<unknown>" } else { &decl.package };
            return Err(GenerateError::UnnamedFunction(owner.to_string()));
        }
        if !decl.package.is_empty() {
            return Ok(Cow::Borrowed(decl));
        }
        let signature = &decl.signature;
        let package = signature
            .results
            .iter()
            .chain(&signature.params)
            .find_map(|expr| self.universe.ty(expr).deref().pkg_path())
            .ok_or_else(|| GenerateError::UnknownPackage(decl.name.clone()))?;
        log::debug!("inferred package {package} for function {}", decl.name);
        let mut owned = decl.clone();
        owned.package = package.to_string();
        Ok(Cow::Owned(owned))
    }

    /// Generates the classes `ty` refers to. Failures are logged and do not
    /// affect the caller.
    fn recurse(&self, ty: Ty<'_>, depth: usize) {
        let mut classes = Vec::new();
        collect_classes(ty, &self.config.blacklist, MAX_TYPE_NESTING, &mut classes);
        for class in classes {
            if let Err(err) = self.type_task(class, depth + 1) {
                log::error!("failed to generate {class}: {err}");
            }
        }
    }

    /// Copies the configured replacement over `path`, registering `item` as if
    /// it had been generated. Returns whether a replacement was configured.
    fn replace_fixed(
        &self,
        path: &Path,
        package_path: &str,
        item: Registration,
    ) -> Result<bool, GenerateError> {
        let Some(replacement) = self.config.fixed_replace.get(path) else {
            return Ok(false);
        };
        self.emitter.copy(replacement, path)?;
        log::info!("replaced {} with {}", path.display(), replacement.display());
        self.register(package_path, item)?;
        Ok(true)
    }

    /// Adds `item` to its package manifest and rewrites `load.go`.
    fn register(&self, package_path: &str, item: Registration) -> Result<(), GenerateError> {
        let package = pkg_base_name(package_path);
        let path = self.config.package_dir(package_path).join(MANIFEST_FILE);
        self.session.register(&package, item, |entry| {
            self.emit(&path, manifest_file(&package, entry))
        })
    }

    fn emit(&self, path: &Path, file: GoFile) -> Result<(), GenerateError> {
        let source = file.render().map_err(|source| GenerateError::Render {
            path: path.to_path_buf(),
            source,
        })?;
        let formatted = format_or_keep(self.formatter.as_ref(), path, source);
        self.emitter.write(path, &formatted)?;
        log::info!("wrote {}", path.display());
        Ok(())
    }
}

/// Collects the classes `ty` is proxied through, looking inside containers
/// and function signatures. Blacklisted packages stay opaque.
fn collect_classes<'a>(ty: Ty<'a>, blacklist: &Blacklist, budget: usize, out: &mut Vec<Ty<'a>>) {
    if budget == 0 {
        return;
    }
    if let Some(target) = proxy_target(ty) {
        if !target.class.pkg_path().is_some_and(|p| blacklist.contains(p)) {
            out.push(target.class);
        }
        return;
    }
    match ty.kind() {
        Kind::Pointer | Kind::Slice | Kind::Array | Kind::Chan => {
            if let Some(elem) = ty.elem() {
                collect_classes(elem, blacklist, budget - 1, out);
            }
        }
        Kind::Map => {
            if let Some(key) = ty.key() {
                collect_classes(key, blacklist, budget - 1, out);
            }
            if let Some(elem) = ty.elem() {
                collect_classes(elem, blacklist, budget - 1, out);
            }
        }
        Kind::Func => {
            if let Some(signature) = ty.signature() {
                for expr in signature.params.iter().chain(&signature.results) {
                    collect_classes(ty.sibling(expr), blacklist, budget - 1, out);
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::{MemoryEmitter, Verbatim};
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use std::path::PathBuf;
    use wrapgen_reflect::{BasicKind, Field, Method, Signature, TypeDecl};

    const DEMO: &str = "example.com/demo";
    const TREE: &str = "example.com/tree";

    fn config() -> GenConfig {
        GenConfig {
            import_root: Some("example.com/app/origami".to_string()),
            ..GenConfig::default()
        }
    }

    fn generator(universe: &Universe, config: GenConfig) -> (Generator<'_>, Arc<MemoryEmitter>) {
        let emitter = Arc::new(MemoryEmitter::new());
        let generator = Generator::new(universe, config)
            .with_emitter(emitter.clone())
            .with_formatter(Arc::new(Verbatim));
        (generator, emitter)
    }

    fn file(emitter: &MemoryEmitter, path: &str) -> String {
        emitter
            .get(path)
            .unwrap_or_else(|| panic!("{path} was not written, got {:?}", emitter.paths()))
    }

    fn node_universe() -> Universe {
        let node = TypeExpr::pointer(TypeExpr::named(TREE, "Node"));
        Universe::new()
            .with_type(TypeDecl::new(
                TREE,
                "Node",
                TypeExpr::Struct {
                    fields: vec![
                        Field::new("Name", TypeExpr::string()),
                        Field::new("Parent", node.clone()),
                        Field::new("Children", TypeExpr::slice(node)),
                    ],
                },
            ))
            .unwrap()
    }

    fn demo_universe() -> Universe {
        let db = TypeExpr::pointer(TypeExpr::named(DEMO, "DB"));
        let mut universe = Universe::new()
            .with_type(
                TypeDecl::new(
                    DEMO,
                    "User",
                    TypeExpr::Struct {
                        fields: vec![
                            Field::new("ID", TypeExpr::basic(BasicKind::Int64)),
                            Field::new("Name", TypeExpr::string()),
                        ],
                    },
                )
                .with_method(
                    Method::new("SetName", Signature::new(vec![TypeExpr::string()], vec![]))
                        .with_param_names(["name"]),
                )
                .with_method(Method::new("Activate", Signature::default())),
            )
            .unwrap()
            .with_type(
                TypeDecl::new(DEMO, "DB", TypeExpr::Struct { fields: vec![] })
                    .with_method(Method::new(
                        "Close",
                        Signature::new(vec![], vec![TypeExpr::error()]),
                    ))
                    .with_method(Method::new(
                        "Find",
                        Signature::new(
                            vec![TypeExpr::basic(BasicKind::Int64)],
                            vec![TypeExpr::pointer(TypeExpr::named(DEMO, "User")), TypeExpr::error()],
                        ),
                    )),
            )
            .unwrap();
        universe.add_function(
            FuncDecl::new(
                DEMO,
                "Open",
                Signature::new(vec![TypeExpr::string()], vec![db, TypeExpr::error()]),
            )
            .with_param_names(["dsn"]),
        );
        universe.add_function(
            FuncDecl::new(
                DEMO,
                "Join",
                Signature::new(
                    vec![TypeExpr::string(), TypeExpr::slice(TypeExpr::string())],
                    vec![TypeExpr::string()],
                )
                .variadic(),
            )
            .with_param_names(["sep", "parts"]),
        );
        universe
    }

    #[test]
    fn test_cyclic_type_generates_one_class() {
        let universe = node_universe();
        let (generator, emitter) = generator(&universe, config());
        generator
            .generate_type(&TypeExpr::pointer(TypeExpr::named(TREE, "Node")))
            .unwrap();

        assert_eq!(
            emitter.paths(),
            vec![
                PathBuf::from("origami/tree/load.go"),
                PathBuf::from("origami/tree/node_class.go"),
            ]
        );
        let class = file(&emitter, "origami/tree/node_class.go");
        assert!(class.contains("var val *treesrc.Node"));
        assert!(class.contains("var val []*treesrc.Node"));
        assert!(class.contains("data.NewClassValue(NewNodeClassFrom(s.source.Parent), runtime.NewContextToDo())"));

        let manifest = file(&emitter, "origami/tree/load.go");
        assert_eq!(manifest.matches("vm.AddClass(NewNodeClass())").count(), 1);
    }

    #[test]
    fn test_user_with_set_name() {
        let universe = demo_universe();
        let (generator, emitter) = generator(&universe, config());
        generator.generate_type(&TypeExpr::named(DEMO, "User")).unwrap();

        let class = file(&emitter, "origami/demo/user_class.go");
        assert!(class.contains("case \"name\":"));
        assert!(class.contains("case \"setName\":"));
        assert!(class.contains("setName: &User_SetNameMethod{source: source},"));

        let method = file(&emitter, "origami/demo/user_setname_method.go");
        assert!(method.contains("h.source.SetName(arg0)"));
        assert!(method.contains("node.NewParameter(nil, \"name\", 0, nil, nil),"));

        let activate = file(&emitter, "origami/demo/user_activate_method.go");
        assert!(!activate.contains("GetIndexValue"));
        assert!(activate.contains("h.source.Activate()\n\treturn nil, nil"));
    }

    #[test]
    fn test_open_reuses_class_wrappers() {
        let universe = demo_universe();
        let (generator, emitter) = generator(&universe, config());
        let open = universe.function(DEMO, "Open").unwrap();
        generator.generate_function(open).unwrap();
        generator
            .generate_type(&TypeExpr::pointer(TypeExpr::named(DEMO, "DB")))
            .unwrap();

        let function = file(&emitter, "origami/demo/open_func.go");
        assert!(function.contains("ret0, err := demosrc.Open(arg0)"));
        assert!(function.contains("return data.NewClassValue(NewDBClassFrom(ret0), ctx), nil"));

        file(&emitter, "origami/demo/db_close_method.go");
        file(&emitter, "origami/demo/user_class.go");

        let manifest = file(&emitter, "origami/demo/load.go");
        assert_eq!(manifest.matches("NewOpenFunction(),").count(), 1);
        assert_eq!(manifest.matches("vm.AddClass(NewDBClass())").count(), 1);
        assert_eq!(manifest.matches("vm.AddClass(NewUserClass())").count(), 1);

        let registry = generator.session().registry();
        assert_eq!(
            registry["demo"].classes.iter().collect::<Vec<_>>(),
            vec!["DB", "User"]
        );
    }

    #[test]
    fn test_variadic_function() {
        let universe = demo_universe();
        let (generator, emitter) = generator(&universe, config());
        generator
            .generate_function(universe.function(DEMO, "Join").unwrap())
            .unwrap();

        let function = file(&emitter, "origami/demo/join_func.go");
        assert!(function.contains("node.NewParameters(nil, \"parts\", 1, nil, nil),"));
        assert!(function.contains("ret0 := demosrc.Join(arg0, arg1...)"));
        assert!(function.contains("return data.NewStringValue(ret0), nil"));
    }

    #[test]
    fn test_method_key_collision() {
        let universe = Universe::new()
            .with_type(
                TypeDecl::new(DEMO, "Reader", TypeExpr::Struct { fields: vec![] })
                    .with_method(Method::new("RO", Signature::default()))
                    .with_method(Method::new("Ro", Signature::default())),
            )
            .unwrap();
        let (generator, emitter) = generator(&universe, config());
        generator.generate_type(&TypeExpr::named(DEMO, "Reader")).unwrap();

        let class = file(&emitter, "origami/demo/reader_class.go");
        assert!(class.contains("ro: &Reader_RoMethod{source: source},"));
        assert!(!class.contains("Reader_ROMethod"));
        assert!(file(&emitter, "origami/demo/reader_ro_method.go").contains("h.source.Ro()"));
    }

    #[test]
    fn test_blacklisted_field_is_opaque() {
        let universe = Universe::new()
            .with_type(TypeDecl::new(
                DEMO,
                "Event",
                TypeExpr::Struct {
                    fields: vec![Field::new("At", TypeExpr::named("time", "Time"))],
                },
            ))
            .unwrap()
            .with_type(TypeDecl::new("time", "Time", TypeExpr::Struct { fields: vec![] }))
            .unwrap();
        let mut config = config();
        config.blacklist.packages.push("time".to_string());
        let (generator, emitter) = generator(&universe, config);
        generator.generate_type(&TypeExpr::named(DEMO, "Event")).unwrap();

        let class = file(&emitter, "origami/demo/event_class.go");
        assert!(class.contains("data.NewAnyValue(s.source.At)"));
        assert!(!class.contains("NewTimeClassFrom"));
        assert!(emitter.paths().iter().all(|p| !p.starts_with("origami/time")));
    }

    #[test]
    fn test_cross_package_class() {
        let universe = Universe::new()
            .with_type(TypeDecl::new(
                DEMO,
                "Session",
                TypeExpr::Struct {
                    fields: vec![Field::new(
                        "Client",
                        TypeExpr::pointer(TypeExpr::named("example.com/net", "Client")),
                    )],
                },
            ))
            .unwrap()
            .with_type(TypeDecl::new("example.com/net", "Client", TypeExpr::Struct { fields: vec![] }))
            .unwrap();
        let (generator, emitter) = generator(&universe, config());
        generator.generate_type(&TypeExpr::named(DEMO, "Session")).unwrap();

        let class = file(&emitter, "origami/demo/session_class.go");
        assert!(class.contains("net.NewClientClassFrom(s.source.Client)"));
        assert!(class.contains("\"example.com/app/origami/net\""));
        assert!(class.contains("var val *netsrc.Client"));
        assert!(file(&emitter, "origami/net/load.go").contains("vm.AddClass(NewClientClass())"));
    }

    #[test]
    fn test_fixed_replace_copies_and_registers() {
        let universe = demo_universe();
        let mut replacement = tempfile::NamedTempFile::new().unwrap();
        write!(replacement, "package demo\n\n// hand written\n").unwrap();

        let mut config = config();
        config.fixed_replace.insert(
            PathBuf::from("origami/demo/user_class.go"),
            replacement.path().to_path_buf(),
        );
        let (generator, emitter) = generator(&universe, config);
        generator.generate_type(&TypeExpr::named(DEMO, "User")).unwrap();

        assert_eq!(
            file(&emitter, "origami/demo/user_class.go"),
            "package demo\n\n// hand written\n"
        );
        assert!(emitter.get("origami/demo/user_setname_method.go").is_none());
        assert!(file(&emitter, "origami/demo/load.go").contains("vm.AddClass(NewUserClass())"));
    }

    #[test]
    fn test_depth_limit_stops_expansion() {
        let universe = Universe::new()
            .with_type(TypeDecl::new(
                DEMO,
                "A",
                TypeExpr::Struct {
                    fields: vec![Field::new("B", TypeExpr::pointer(TypeExpr::named(DEMO, "B")))],
                },
            ))
            .unwrap()
            .with_type(TypeDecl::new(DEMO, "B", TypeExpr::Struct { fields: vec![] }))
            .unwrap();
        let mut config = config();
        config.max_depth = 1;
        let (generator, emitter) = generator(&universe, config);
        generator.generate_type(&TypeExpr::named(DEMO, "A")).unwrap();

        file(&emitter, "origami/demo/a_class.go");
        assert!(emitter.get("origami/demo/b_class.go").is_none());
        assert!(!file(&emitter, "origami/demo/load.go").contains("NewBClass"));
    }

    #[test]
    fn test_unsupported_roots() {
        let universe = Universe::new()
            .with_type(TypeDecl::new(
                DEMO,
                "Handler",
                TypeExpr::func(Signature::default()),
            ))
            .unwrap()
            .with_type(TypeDecl::new(DEMO, "state", TypeExpr::Struct { fields: vec![] }))
            .unwrap();
        let (generator, emitter) = generator(&universe, config());

        let err = generator.generate_type(&TypeExpr::string()).unwrap_err();
        assert!(matches!(err, GenerateError::NotClassLike(_)));
        let err = generator
            .generate_type(&TypeExpr::named(DEMO, "Handler"))
            .unwrap_err();
        assert!(matches!(err, GenerateError::NotCallable(_)));

        generator.generate_type(&TypeExpr::named(DEMO, "state")).unwrap();
        generator.generate_type(&TypeExpr::any()).unwrap();
        assert!(emitter.paths().is_empty());
    }

    #[test]
    fn test_function_owner_inference() {
        let universe = demo_universe();
        let (generator, emitter) = generator(&universe, config());
        let db = TypeExpr::pointer(TypeExpr::named(DEMO, "DB"));

        let connect = FuncDecl::new("", "Connect", Signature::new(vec![], vec![db.clone()]));
        generator.generate_function(&connect).unwrap();
        assert!(file(&emitter, "origami/demo/connect_func.go").contains("demosrc.Connect()"));

        let anonymous = FuncDecl::new("", "", Signature::new(vec![], vec![db]));
        let err = generator.generate_function(&anonymous).unwrap_err();
        assert!(matches!(err, GenerateError::UnnamedFunction(_)));

        let now = FuncDecl::new("", "Now", Signature::new(vec![], vec![TypeExpr::string()]));
        let err = generator.generate_function(&now).unwrap_err();
        assert!(matches!(err, GenerateError::UnknownPackage(_)));
    }

    #[test]
    fn test_concurrent_roots_share_the_session() {
        let universe = demo_universe();
        let (generator, emitter) = generator(&universe, config());
        let roots = [
            Root::Type(TypeExpr::named(DEMO, "User")),
            Root::Type(TypeExpr::pointer(TypeExpr::named(DEMO, "DB"))),
            Root::Function(universe.function(DEMO, "Open").unwrap().clone()),
            Root::Function(universe.function(DEMO, "Join").unwrap().clone()),
        ];

        std::thread::scope(|scope| {
            for root in &roots {
                let generator = &generator;
                scope.spawn(move || generator.generate(root).unwrap());
            }
        });

        let manifest = file(&emitter, "origami/demo/load.go");
        assert_eq!(manifest.matches("vm.AddClass(NewUserClass())").count(), 1);
        assert_eq!(manifest.matches("vm.AddClass(NewDBClass())").count(), 1);
        assert_eq!(manifest.matches("NewOpenFunction(),").count(), 1);
        assert_eq!(manifest.matches("NewJoinFunction(),").count(), 1);
    }
}
