use std::fmt;

use genco::prelude::*;
use genco::tokens::ItemStr;

/// Direction of a Go channel type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChanDir {
    #[default]
    Both,
    Send,
    Recv,
}

/// A Go type expression as it appears in generated source.
///
/// Package qualifiers are already resolved to the alias the file imports the
/// package under, so rendering never needs the import table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoType {
    /// A predeclared or otherwise unqualified identifier (`int`, `any`, `error`).
    Ident(String),
    /// `alias.Name`
    Qualified { package: String, name: String },
    Pointer(Box<GoType>),
    Slice(Box<GoType>),
    Array(usize, Box<GoType>),
    Map(Box<GoType>, Box<GoType>),
    Chan(ChanDir, Box<GoType>),
    /// A function type. When `variadic` is set the last parameter is a slice
    /// and is rendered with `...`.
    Func {
        params: Vec<GoType>,
        results: Vec<GoType>,
        variadic: bool,
    },
    Struct(Vec<(String, GoType)>),
    /// A non-empty anonymous interface; each method carries a [`GoType::Func`].
    Interface(Vec<(String, GoType)>),
}

impl GoType {
    pub fn ident(name: impl Into<String>) -> Self {
        GoType::Ident(name.into())
    }

    pub fn qualified(package: impl Into<String>, name: impl Into<String>) -> Self {
        GoType::Qualified {
            package: package.into(),
            name: name.into(),
        }
    }

    pub fn pointer(elem: GoType) -> Self {
        GoType::Pointer(Box::new(elem))
    }

    pub fn slice(elem: GoType) -> Self {
        GoType::Slice(Box::new(elem))
    }

    pub fn map(key: GoType, value: GoType) -> Self {
        GoType::Map(Box::new(key), Box::new(value))
    }

    /// Whether a nil value is assignable to this type.
    pub fn is_nilable(&self) -> bool {
        match self {
            GoType::Pointer(_)
            | GoType::Slice(_)
            | GoType::Map(..)
            | GoType::Chan(..)
            | GoType::Func { .. }
            | GoType::Interface(_) => true,
            GoType::Ident(name) => name == "any" || name == "error",
            GoType::Qualified { .. } | GoType::Array(..) | GoType::Struct(_) => false,
        }
    }
}

fn write_signature(
    f: &mut fmt::Formatter<'_>,
    params: &[GoType],
    results: &[GoType],
    variadic: bool,
) -> fmt::Result {
    f.write_str("(")?;
    for (i, param) in params.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        match param {
            GoType::Slice(elem) if variadic && i + 1 == params.len() => write!(f, "...{elem}")?,
            _ => write!(f, "{param}")?,
        }
    }
    f.write_str(")")?;
    match results {
        [] => Ok(()),
        [single] if !matches!(single, GoType::Func { .. }) => write!(f, " {single}"),
        _ => {
            f.write_str(" (")?;
            for (i, result) in results.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{result}")?;
            }
            f.write_str(")")
        }
    }
}

impl fmt::Display for GoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoType::Ident(name) => f.write_str(name),
            GoType::Qualified { package, name } => write!(f, "{package}.{name}"),
            GoType::Pointer(elem) => write!(f, "*{elem}"),
            GoType::Slice(elem) => write!(f, "[]{elem}"),
            GoType::Array(len, elem) => write!(f, "[{len}]{elem}"),
            GoType::Map(key, value) => write!(f, "map[{key}]{value}"),
            GoType::Chan(ChanDir::Both, elem) => write!(f, "chan {elem}"),
            GoType::Chan(ChanDir::Send, elem) => write!(f, "chan<- {elem}"),
            GoType::Chan(ChanDir::Recv, elem) => write!(f, "<-chan {elem}"),
            GoType::Func {
                params,
                results,
                variadic,
            } => {
                f.write_str("func")?;
                write_signature(f, params, results, *variadic)
            }
            GoType::Struct(fields) if fields.is_empty() => f.write_str("struct{}"),
            GoType::Struct(fields) => {
                f.write_str("struct{ ")?;
                for (i, (name, typ)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{name} {typ}")?;
                }
                f.write_str(" }")
            }
            GoType::Interface(methods) if methods.is_empty() => f.write_str("any"),
            GoType::Interface(methods) => {
                f.write_str("interface{ ")?;
                for (i, (name, sig)) in methods.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    f.write_str(name)?;
                    match sig {
                        GoType::Func {
                            params,
                            results,
                            variadic,
                        } => write_signature(f, params, results, *variadic)?,
                        other => write!(f, "() {other}")?,
                    }
                }
                f.write_str(" }")
            }
        }
    }
}

impl FormatInto<Go> for &GoType {
    fn format_into(self, tokens: &mut Tokens<Go>) {
        tokens.append(ItemStr::from(self.to_string()));
    }
}

impl FormatInto<Go> for GoType {
    fn format_into(self, tokens: &mut Tokens<Go>) {
        (&self).format_into(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_composites() {
        let user = GoType::qualified("demosrc", "User");
        assert_eq!(GoType::pointer(user.clone()).to_string(), "*demosrc.User");
        assert_eq!(
            GoType::slice(GoType::pointer(user.clone())).to_string(),
            "[]*demosrc.User"
        );
        assert_eq!(
            GoType::map(GoType::ident("string"), GoType::ident("any")).to_string(),
            "map[string]any"
        );
        assert_eq!(
            GoType::Array(4, Box::new(GoType::ident("byte"))).to_string(),
            "[4]byte"
        );
        assert_eq!(
            GoType::Chan(ChanDir::Recv, Box::new(user)).to_string(),
            "<-chan demosrc.User"
        );
    }

    #[test]
    fn test_render_func_types() {
        let simple = GoType::Func {
            params: vec![GoType::ident("string")],
            results: vec![GoType::ident("error")],
            variadic: false,
        };
        assert_eq!(simple.to_string(), "func(string) error");

        let variadic = GoType::Func {
            params: vec![
                GoType::ident("string"),
                GoType::slice(GoType::ident("any")),
            ],
            results: vec![GoType::ident("int"), GoType::ident("error")],
            variadic: true,
        };
        assert_eq!(variadic.to_string(), "func(string, ...any) (int, error)");
    }

    #[test]
    fn test_render_anonymous_types() {
        assert_eq!(GoType::Struct(vec![]).to_string(), "struct{}");
        assert_eq!(GoType::Interface(vec![]).to_string(), "any");
        let stringer = GoType::Interface(vec![(
            "String".to_string(),
            GoType::Func {
                params: vec![],
                results: vec![GoType::ident("string")],
                variadic: false,
            },
        )]);
        assert_eq!(stringer.to_string(), "interface{ String() string }");
    }

    #[test]
    fn test_format_into_tokens() {
        let typ = GoType::pointer(GoType::qualified("dbsrc", "DB"));
        let tokens: Tokens<Go> = quote!(var x $(&typ));
        assert_eq!(tokens.to_string().unwrap(), "var x *dbsrc.DB");
    }

    #[test]
    fn test_is_nilable() {
        assert!(GoType::pointer(GoType::ident("int")).is_nilable());
        assert!(GoType::ident("error").is_nilable());
        assert!(!GoType::ident("int").is_nilable());
        assert!(!GoType::qualified("demosrc", "User").is_nilable());
    }
}
