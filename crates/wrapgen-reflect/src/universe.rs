use std::fmt;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::types::{BasicKind, ChanDir, Field, FuncDecl, Method, Signature, TypeDecl, TypeExpr};

/// Errors raised while loading a universe or resolving roots.
#[derive(Debug, thiserror::Error)]
pub enum ReflectError {
    #[error("invalid type universe: {0}")]
    Json(#[from] serde_json::Error),
    #[error("type {0} is declared twice")]
    DuplicateType(String),
    #[error("no function or type named {0}")]
    UnknownRoot(String),
}

/// Named chains longer than this are treated as unresolved.
const MAX_NAMED_CHAIN: usize = 16;

/// Every named type and free function generation may reach.
#[derive(Debug, Clone, Default)]
pub struct Universe {
    types: IndexMap<(String, String), TypeDecl>,
    functions: Vec<FuncDecl>,
    roots: Vec<String>,
}

#[derive(Deserialize)]
struct UniverseFile {
    #[serde(default)]
    types: Vec<TypeDecl>,
    #[serde(default)]
    functions: Vec<FuncDecl>,
    #[serde(default)]
    roots: Vec<String>,
}

/// A generation entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Root {
    Type(TypeExpr),
    Function(FuncDecl),
}

impl Universe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self, ReflectError> {
        let file: UniverseFile = serde_json::from_str(json)?;
        let mut universe = Universe::new();
        for decl in file.types {
            universe.add_type(decl)?;
        }
        universe.functions = file.functions;
        universe.roots = file.roots;
        Ok(universe)
    }

    pub fn add_type(&mut self, decl: TypeDecl) -> Result<(), ReflectError> {
        let key = (decl.package.clone(), decl.name.clone());
        if self.types.contains_key(&key) {
            return Err(ReflectError::DuplicateType(format!(
                "{}.{}",
                decl.package, decl.name
            )));
        }
        self.types.insert(key, decl);
        Ok(())
    }

    pub fn add_function(&mut self, decl: FuncDecl) {
        self.functions.push(decl);
    }

    pub fn with_type(mut self, decl: TypeDecl) -> Result<Self, ReflectError> {
        self.add_type(decl)?;
        Ok(self)
    }

    pub fn lookup(&self, package: &str, name: &str) -> Option<&TypeDecl> {
        self.types.get(&(package.to_string(), name.to_string()))
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDecl> {
        self.types.values()
    }

    pub fn functions(&self) -> &[FuncDecl] {
        &self.functions
    }

    pub fn function(&self, package: &str, name: &str) -> Option<&FuncDecl> {
        self.functions
            .iter()
            .find(|f| f.package == package && f.name == name)
    }

    /// Roots listed in the universe file.
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// Resolves `pkgpath.Name` (or `*pkgpath.Name`) to a root, preferring a
    /// function over a type of the same name.
    pub fn resolve_root(&self, root: &str) -> Result<Root, ReflectError> {
        let (pointer, qualified) = match root.strip_prefix('*') {
            Some(rest) => (true, rest),
            None => (false, root),
        };
        let (package, name) = match qualified.rsplit_once('.') {
            Some((package, name)) if !package.ends_with('/') => (package, name),
            _ => ("", qualified),
        };

        if !pointer {
            if let Some(func) = self.function(package, name) {
                return Ok(Root::Function(func.clone()));
            }
        }
        let Some(decl) = self.lookup(package, name) else {
            return Err(ReflectError::UnknownRoot(root.to_string()));
        };
        let ty = decl.as_type();
        Ok(Root::Type(if pointer { TypeExpr::pointer(ty) } else { ty }))
    }

    pub fn ty<'u>(&'u self, expr: &'u TypeExpr) -> Ty<'u> {
        Ty {
            expr,
            universe: self,
        }
    }
}

/// The kind of a type after resolving names, mirroring `reflect.Kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Basic(BasicKind),
    Struct,
    Interface,
    Pointer,
    Slice,
    Array,
    Map,
    Chan,
    Func,
    /// A named type the universe does not declare.
    Unresolved,
}

/// A type expression viewed through the universe that declares its names.
#[derive(Clone, Copy)]
pub struct Ty<'u> {
    expr: &'u TypeExpr,
    universe: &'u Universe,
}

impl<'u> Ty<'u> {
    pub fn expr(&self) -> &'u TypeExpr {
        self.expr
    }

    pub fn universe(&self) -> &'u Universe {
        self.universe
    }

    fn with(&self, expr: &'u TypeExpr) -> Ty<'u> {
        Ty {
            expr,
            universe: self.universe,
        }
    }

    /// The declared name, `error` for the builtin interface, `None` for
    /// unnamed types.
    pub fn name(&self) -> Option<&'u str> {
        match self.expr {
            TypeExpr::Named { name, .. } => Some(name.as_str()),
            TypeExpr::Error => Some("error"),
            _ => None,
        }
    }

    /// Import path of the declaring package, `None` for unnamed and
    /// predeclared types.
    pub fn pkg_path(&self) -> Option<&'u str> {
        match self.expr {
            TypeExpr::Named { package, .. } if !package.is_empty() => Some(package.as_str()),
            _ => None,
        }
    }

    pub fn is_named(&self) -> bool {
        matches!(self.expr, TypeExpr::Named { .. })
    }

    pub fn decl(&self) -> Option<&'u TypeDecl> {
        match self.expr {
            TypeExpr::Named { package, name } => self.universe.lookup(package, name),
            _ => None,
        }
    }

    /// The structural type behind any chain of names.
    pub fn underlying(&self) -> Option<Ty<'u>> {
        let mut current = *self;
        for _ in 0..MAX_NAMED_CHAIN {
            match current.expr {
                TypeExpr::Named { .. } => current = current.with(&current.decl()?.underlying),
                _ => return Some(current),
            }
        }
        None
    }

    pub fn kind(&self) -> Kind {
        let Some(underlying) = self.underlying() else {
            return Kind::Unresolved;
        };
        match underlying.expr {
            TypeExpr::Basic { name } => Kind::Basic(*name),
            TypeExpr::Error | TypeExpr::Interface { .. } => Kind::Interface,
            TypeExpr::Struct { .. } => Kind::Struct,
            TypeExpr::Pointer { .. } => Kind::Pointer,
            TypeExpr::Slice { .. } => Kind::Slice,
            TypeExpr::Array { .. } => Kind::Array,
            TypeExpr::Map { .. } => Kind::Map,
            TypeExpr::Chan { .. } => Kind::Chan,
            TypeExpr::Func { .. } => Kind::Func,
            TypeExpr::Named { .. } => Kind::Unresolved,
        }
    }

    /// Element type of pointers, slices, arrays, channels and maps.
    pub fn elem(&self) -> Option<Ty<'u>> {
        match self.underlying()?.expr {
            TypeExpr::Pointer { elem }
            | TypeExpr::Slice { elem }
            | TypeExpr::Array { elem, .. }
            | TypeExpr::Chan { elem, .. } => Some(self.with(elem)),
            TypeExpr::Map { value, .. } => Some(self.with(value)),
            _ => None,
        }
    }

    pub fn key(&self) -> Option<Ty<'u>> {
        match self.underlying()?.expr {
            TypeExpr::Map { key, .. } => Some(self.with(key)),
            _ => None,
        }
    }

    /// Removes one level of pointer indirection, if any.
    pub fn deref(&self) -> Ty<'u> {
        match self.expr {
            TypeExpr::Pointer { elem } => self.with(elem),
            _ => *self,
        }
    }

    pub fn signature(&self) -> Option<&'u Signature> {
        match self.underlying()?.expr {
            TypeExpr::Func { signature } => Some(signature),
            _ => None,
        }
    }

    pub fn fields(&self) -> &'u [Field] {
        match self.underlying().map(|u| u.expr) {
            Some(TypeExpr::Struct { fields }) => fields,
            _ => &[],
        }
    }

    /// The method set: declared methods of a named struct type (pointer
    /// receivers included) or the methods of an interface.
    pub fn methods(&self) -> Vec<&'u Method> {
        match self.underlying().map(|u| u.expr) {
            Some(TypeExpr::Interface { methods }) => methods.iter().collect(),
            _ => self
                .decl()
                .map(|decl| decl.methods.iter().collect())
                .unwrap_or_default(),
        }
    }

    pub fn is_builtin_error(&self) -> bool {
        matches!(self.expr, TypeExpr::Error)
    }

    /// The anonymous `interface{}`.
    pub fn is_empty_interface(&self) -> bool {
        matches!(self.expr, TypeExpr::Interface { methods } if methods.is_empty())
    }

    /// `context.Context`.
    pub fn is_context(&self) -> bool {
        matches!(self.expr, TypeExpr::Named { package, name } if package == "context" && name == "Context")
    }

    pub fn is_exported(&self) -> bool {
        self.name()
            .is_some_and(|name| name.chars().next().is_some_and(char::is_uppercase))
    }

    /// Interprets another expression in the same universe.
    pub fn sibling(&self, expr: &'u TypeExpr) -> Ty<'u> {
        self.with(expr)
    }
}

impl fmt::Debug for Ty<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ty({self})")
    }
}

/// Canonical form, `reflect.Type.String()` style with full package paths.
impl fmt::Display for Ty<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Canonical(self.expr))
    }
}

struct Canonical<'a>(&'a TypeExpr);

fn write_list(f: &mut fmt::Formatter<'_>, types: &[TypeExpr], variadic: bool) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        match ty {
            TypeExpr::Slice { elem } if variadic && i + 1 == types.len() => {
                write!(f, "...{}", Canonical(elem))?
            }
            _ => write!(f, "{}", Canonical(ty))?,
        }
    }
    Ok(())
}

fn write_signature(f: &mut fmt::Formatter<'_>, sig: &Signature) -> fmt::Result {
    f.write_str("(")?;
    write_list(f, &sig.params, sig.variadic)?;
    f.write_str(")")?;
    match sig.results.as_slice() {
        [] => Ok(()),
        [single] => write!(f, " {}", Canonical(single)),
        results => {
            f.write_str(" (")?;
            write_list(f, results, false)?;
            f.write_str(")")
        }
    }
}

impl fmt::Display for Canonical<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            TypeExpr::Basic { name } => f.write_str(name.as_str()),
            TypeExpr::Named { package, name } if package.is_empty() => f.write_str(name),
            TypeExpr::Named { package, name } => write!(f, "{package}.{name}"),
            TypeExpr::Error => f.write_str("error"),
            TypeExpr::Pointer { elem } => write!(f, "*{}", Canonical(elem)),
            TypeExpr::Slice { elem } => write!(f, "[]{}", Canonical(elem)),
            TypeExpr::Array { len, elem } => write!(f, "[{len}]{}", Canonical(elem)),
            TypeExpr::Map { key, value } => {
                write!(f, "map[{}]{}", Canonical(key), Canonical(value))
            }
            TypeExpr::Chan { dir, elem } => match dir {
                ChanDir::Both => write!(f, "chan {}", Canonical(elem)),
                ChanDir::Send => write!(f, "chan<- {}", Canonical(elem)),
                ChanDir::Recv => write!(f, "<-chan {}", Canonical(elem)),
            },
            TypeExpr::Func { signature } => {
                f.write_str("func")?;
                write_signature(f, signature)
            }
            TypeExpr::Interface { methods } if methods.is_empty() => f.write_str("interface {}"),
            TypeExpr::Interface { methods } => {
                f.write_str("interface { ")?;
                for (i, method) in methods.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    f.write_str(&method.name)?;
                    write_signature(f, &method.signature)?;
                }
                f.write_str(" }")
            }
            TypeExpr::Struct { fields } if fields.is_empty() => f.write_str("struct {}"),
            TypeExpr::Struct { fields } => {
                f.write_str("struct { ")?;
                for (i, field) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{} {}", field.name, Canonical(&field.ty))?;
                }
                f.write_str(" }")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BasicKind, Field, Method, Signature};
    use pretty_assertions::assert_eq;

    const DEMO: &str = "example.com/demo";

    fn node_universe() -> Universe {
        let node = TypeExpr::named(DEMO, "Node");
        Universe::new()
            .with_type(TypeDecl::new(
                DEMO,
                "Node",
                TypeExpr::Struct {
                    fields: vec![
                        Field::new("Parent", TypeExpr::pointer(node.clone())),
                        Field::new("Children", TypeExpr::slice(TypeExpr::pointer(node))),
                    ],
                },
            ))
            .unwrap()
    }

    #[test]
    fn test_cyclic_types_resolve_lazily() {
        let universe = node_universe();
        let expr = TypeExpr::named(DEMO, "Node");
        let node = universe.ty(&expr);

        assert_eq!(node.kind(), Kind::Struct);
        let parent = node.sibling(&node.fields()[0].ty);
        assert_eq!(parent.kind(), Kind::Pointer);
        assert_eq!(parent.elem().unwrap().kind(), Kind::Struct);
        assert_eq!(parent.to_string(), "*example.com/demo.Node");
        let children = node.sibling(&node.fields()[1].ty);
        assert_eq!(children.to_string(), "[]*example.com/demo.Node");
    }

    #[test]
    fn test_unknown_named_types_are_unresolved() {
        let universe = Universe::new();
        let expr = TypeExpr::named("time", "Time");
        let ty = universe.ty(&expr);
        assert_eq!(ty.kind(), Kind::Unresolved);
        assert_eq!(ty.pkg_path(), Some("time"));
        assert_eq!(ty.name(), Some("Time"));
    }

    #[test]
    fn test_named_scalars_resolve_to_their_basic_kind() {
        let universe = Universe::new()
            .with_type(TypeDecl::new(
                "time",
                "Duration",
                TypeExpr::basic(BasicKind::Int64),
            ))
            .unwrap();
        let expr = TypeExpr::named("time", "Duration");
        assert_eq!(universe.ty(&expr).kind(), Kind::Basic(BasicKind::Int64));
    }

    #[test]
    fn test_canonical_strings() {
        let universe = Universe::new();
        let expr = TypeExpr::func(
            Signature::new(
                vec![
                    TypeExpr::string(),
                    TypeExpr::slice(TypeExpr::any()),
                ],
                vec![TypeExpr::map(TypeExpr::string(), TypeExpr::any()), TypeExpr::Error],
            )
            .variadic(),
        );
        assert_eq!(
            universe.ty(&expr).to_string(),
            "func(string, ...interface {}) (map[string]interface {}, error)"
        );
    }

    #[test]
    fn test_method_sets() {
        let universe = Universe::new()
            .with_type(
                TypeDecl::new(DEMO, "User", TypeExpr::Struct { fields: vec![] })
                    .with_method(Method::new("SetName", Signature::default())),
            )
            .unwrap()
            .with_type(TypeDecl::new(
                DEMO,
                "Service",
                TypeExpr::Interface {
                    methods: vec![Method::new("Ping", Signature::default())],
                },
            ))
            .unwrap();

        let user = TypeExpr::named(DEMO, "User");
        let names: Vec<&str> = universe.ty(&user).methods().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["SetName"]);
        let service = TypeExpr::named(DEMO, "Service");
        let names: Vec<&str> = universe
            .ty(&service)
            .methods()
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["Ping"]);
    }

    #[test]
    fn test_resolve_root_prefers_functions() {
        let mut universe = node_universe();
        universe.add_function(FuncDecl::new(DEMO, "NewNode", Signature::default()));

        assert!(matches!(
            universe.resolve_root("example.com/demo.NewNode"),
            Ok(Root::Function(f)) if f.name == "NewNode"
        ));
        assert_eq!(
            universe.resolve_root("*example.com/demo.Node").unwrap(),
            Root::Type(TypeExpr::pointer(TypeExpr::named(DEMO, "Node")))
        );
        assert!(matches!(
            universe.resolve_root("example.com/demo.Missing"),
            Err(ReflectError::UnknownRoot(_))
        ));
    }

    #[test]
    fn test_duplicate_types_are_rejected() {
        let universe = node_universe();
        let again = TypeDecl::new(DEMO, "Node", TypeExpr::any());
        assert!(matches!(
            universe.with_type(again),
            Err(ReflectError::DuplicateType(name)) if name == "example.com/demo.Node"
        ));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "types": [
                {"package": "example.com/demo", "name": "User",
                 "underlying": {"kind": "struct", "fields": [
                     {"name": "Name", "type": {"kind": "basic", "name": "string"}}
                 ]}}
            ],
            "functions": [
                {"package": "example.com/demo", "name": "Open",
                 "signature": {"params": [{"kind": "basic", "name": "string"}],
                               "results": [{"kind": "error"}]}}
            ],
            "roots": ["example.com/demo.User"]
        }"#;
        let universe = Universe::from_json(json).unwrap();
        assert_eq!(universe.roots().to_vec(), vec!["example.com/demo.User".to_string()]);
        assert_eq!(universe.functions().len(), 1);
        let user = universe.lookup(DEMO, "User").unwrap();
        assert_eq!(user.underlying, TypeExpr::Struct { fields: vec![Field::new("Name", TypeExpr::string())] });
    }
}
