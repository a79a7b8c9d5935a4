use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Predeclared Go scalar types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BasicKind {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    Complex64,
    Complex128,
    String,
}

impl BasicKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BasicKind::Bool => "bool",
            BasicKind::Int => "int",
            BasicKind::Int8 => "int8",
            BasicKind::Int16 => "int16",
            BasicKind::Int32 => "int32",
            BasicKind::Int64 => "int64",
            BasicKind::Uint => "uint",
            BasicKind::Uint8 => "uint8",
            BasicKind::Uint16 => "uint16",
            BasicKind::Uint32 => "uint32",
            BasicKind::Uint64 => "uint64",
            BasicKind::Uintptr => "uintptr",
            BasicKind::Float32 => "float32",
            BasicKind::Float64 => "float64",
            BasicKind::Complex64 => "complex64",
            BasicKind::Complex128 => "complex128",
            BasicKind::String => "string",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            BasicKind::Int
                | BasicKind::Int8
                | BasicKind::Int16
                | BasicKind::Int32
                | BasicKind::Int64
                | BasicKind::Uint
                | BasicKind::Uint8
                | BasicKind::Uint16
                | BasicKind::Uint32
                | BasicKind::Uint64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, BasicKind::Float32 | BasicKind::Float64)
    }
}

/// Direction of a channel type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChanDir {
    #[default]
    Both,
    Send,
    Recv,
}

/// The structure of a Go type, as written at a use site.
///
/// Named types are references into a [`crate::Universe`]; their structure is
/// looked up there, which is what lets self-referential types exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeExpr {
    Basic {
        name: BasicKind,
    },
    Named {
        package: String,
        name: String,
    },
    /// The predeclared `error` interface.
    Error,
    Pointer {
        elem: Box<TypeExpr>,
    },
    Slice {
        elem: Box<TypeExpr>,
    },
    Array {
        len: usize,
        elem: Box<TypeExpr>,
    },
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    Chan {
        #[serde(default)]
        dir: ChanDir,
        elem: Box<TypeExpr>,
    },
    Func {
        signature: Signature,
    },
    /// An interface literal. Without methods this is `any`.
    Interface {
        #[serde(default)]
        methods: Vec<Method>,
    },
    Struct {
        #[serde(default)]
        fields: Vec<Field>,
    },
}

impl TypeExpr {
    pub fn basic(kind: BasicKind) -> Self {
        TypeExpr::Basic { name: kind }
    }

    pub fn named(package: impl Into<String>, name: impl Into<String>) -> Self {
        TypeExpr::Named {
            package: package.into(),
            name: name.into(),
        }
    }

    pub fn pointer(elem: TypeExpr) -> Self {
        TypeExpr::Pointer {
            elem: Box::new(elem),
        }
    }

    pub fn slice(elem: TypeExpr) -> Self {
        TypeExpr::Slice {
            elem: Box::new(elem),
        }
    }

    pub fn array(len: usize, elem: TypeExpr) -> Self {
        TypeExpr::Array {
            len,
            elem: Box::new(elem),
        }
    }

    pub fn map(key: TypeExpr, value: TypeExpr) -> Self {
        TypeExpr::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn chan(elem: TypeExpr) -> Self {
        TypeExpr::Chan {
            dir: ChanDir::Both,
            elem: Box::new(elem),
        }
    }

    pub fn func(signature: Signature) -> Self {
        TypeExpr::Func { signature }
    }

    pub fn any() -> Self {
        TypeExpr::Interface {
            methods: Vec::new(),
        }
    }

    pub fn string() -> Self {
        TypeExpr::basic(BasicKind::String)
    }

    pub fn error() -> Self {
        TypeExpr::Error
    }
}

/// Parameter and result types of a function or method. The receiver of a
/// method is never part of its signature.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub params: Vec<TypeExpr>,
    #[serde(default)]
    pub results: Vec<TypeExpr>,
    /// The last parameter is `...T`, declared here as `[]T`.
    #[serde(default)]
    pub variadic: bool,
}

impl Signature {
    pub fn new(params: Vec<TypeExpr>, results: Vec<TypeExpr>) -> Self {
        Self {
            params,
            results,
            variadic: false,
        }
    }

    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }
}

fn default_pointer_receiver() -> bool {
    true
}

/// A method of a named type or an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    #[serde(default)]
    pub signature: Signature,
    /// Declared parameter names, when known.
    #[serde(default)]
    pub param_names: Option<Vec<String>>,
    #[serde(default = "default_pointer_receiver")]
    pub pointer_receiver: bool,
    /// Go source file declaring the method, used to recover parameter names.
    #[serde(default)]
    pub source_file: Option<PathBuf>,
}

impl Method {
    pub fn new(name: impl Into<String>, signature: Signature) -> Self {
        Self {
            name: name.into(),
            signature,
            param_names: None,
            pointer_receiver: true,
            source_file: None,
        }
    }

    pub fn with_param_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.param_names = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeExpr,
    #[serde(default)]
    pub embedded: bool,
}

impl Field {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            ty,
            embedded: false,
        }
    }
}

/// A declared named type: `type Name Underlying` plus its method set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDecl {
    pub package: String,
    pub name: String,
    pub underlying: TypeExpr,
    #[serde(default)]
    pub methods: Vec<Method>,
}

impl TypeDecl {
    pub fn new(package: impl Into<String>, name: impl Into<String>, underlying: TypeExpr) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            underlying,
            methods: Vec::new(),
        }
    }

    pub fn with_method(mut self, method: Method) -> Self {
        self.methods.push(method);
        self
    }

    /// The type expression referring to this declaration.
    pub fn as_type(&self) -> TypeExpr {
        TypeExpr::named(self.package.clone(), self.name.clone())
    }
}

/// A package-level function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuncDecl {
    /// Import path of the declaring package. May be empty when unknown.
    #[serde(default)]
    pub package: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub signature: Signature,
    #[serde(default)]
    pub param_names: Option<Vec<String>>,
    #[serde(default)]
    pub source_file: Option<PathBuf>,
}

impl FuncDecl {
    pub fn new(package: impl Into<String>, name: impl Into<String>, signature: Signature) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
            signature,
            param_names: None,
            source_file: None,
        }
    }

    pub fn with_param_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.param_names = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deserialize_type_expr() {
        let json = r#"{"kind": "pointer", "elem": {"kind": "named", "package": "example.com/demo", "name": "User"}}"#;
        let ty: TypeExpr = serde_json::from_str(json).unwrap();
        assert_eq!(ty, TypeExpr::pointer(TypeExpr::named("example.com/demo", "User")));
    }

    #[test]
    fn test_deserialize_method_defaults() {
        let json = r#"{
            "name": "SetName",
            "signature": {"params": [{"kind": "basic", "name": "string"}]}
        }"#;
        let method: Method = serde_json::from_str(json).unwrap();
        assert_eq!(method.name, "SetName");
        assert!(method.pointer_receiver);
        assert!(!method.signature.variadic);
        assert_eq!(method.signature.params, vec![TypeExpr::string()]);
        assert_eq!(method.param_names, None);
    }

    #[test]
    fn test_deserialize_func_and_chan() {
        let json = r#"{"kind": "func", "signature": {"params": [{"kind": "chan", "dir": "recv", "elem": {"kind": "error"}}], "results": []}}"#;
        let ty: TypeExpr = serde_json::from_str(json).unwrap();
        let TypeExpr::Func { signature } = ty else {
            panic!("expected a func type");
        };
        assert_eq!(
            signature.params,
            vec![TypeExpr::Chan {
                dir: ChanDir::Recv,
                elem: Box::new(TypeExpr::Error)
            }]
        );
    }

    #[test]
    fn test_integer_kinds() {
        assert!(BasicKind::Int64.is_integer());
        assert!(!BasicKind::Float64.is_integer());
        assert!(BasicKind::Float32.is_float());
        assert_eq!(BasicKind::Uint8.as_str(), "uint8");
    }
}
