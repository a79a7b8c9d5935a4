use crate::universe::{Kind, Ty};

/// Top-level shape of a generation root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    ClassLike,
    FuncLike,
    Skip,
}

/// Classifies a type after unwrapping one level of pointer.
pub fn classify(ty: Ty<'_>) -> Shape {
    match ty.deref().kind() {
        Kind::Struct | Kind::Interface => Shape::ClassLike,
        Kind::Func => Shape::FuncLike,
        _ => Shape::Skip,
    }
}

/// A class wrapper that a field, parameter or result refers to.
#[derive(Debug, Clone, Copy)]
pub struct ProxyTarget<'u> {
    /// The named struct or interface type the wrapper is generated for.
    pub class: Ty<'u>,
    /// How the value is held at the referring site.
    pub holding: Holding,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Holding {
    /// `*T` for a struct `T`.
    Pointer,
    /// A struct `T` held by value.
    Value,
    /// A named interface.
    Interface,
}

/// A named, exported, resolvable type from a real package.
fn is_wrappable(ty: Ty<'_>) -> bool {
    ty.pkg_path().is_some() && ty.is_exported() && !ty.is_context()
}

/// Returns the class a value of type `ty` is proxied through, if any.
///
/// Pointer-to-struct, value structs and named interfaces declared in a package
/// qualify. Primitives, the builtin error, anonymous and empty interfaces and
/// unexported types do not.
pub fn proxy_target(ty: Ty<'_>) -> Option<ProxyTarget<'_>> {
    match ty.kind() {
        Kind::Pointer if !ty.is_named() => {
            let elem = ty.elem()?;
            (elem.kind() == Kind::Struct && is_wrappable(elem)).then_some(ProxyTarget {
                class: elem,
                holding: Holding::Pointer,
            })
        }
        Kind::Struct if is_wrappable(ty) => Some(ProxyTarget {
            class: ty,
            holding: Holding::Value,
        }),
        Kind::Interface if is_wrappable(ty) => Some(ProxyTarget {
            class: ty,
            holding: Holding::Interface,
        }),
        _ => None,
    }
}

/// Whether meeting `ty` as a field, parameter or result requires generating
/// another class wrapper.
pub fn needs_proxy(ty: Ty<'_>) -> bool {
    proxy_target(ty).is_some()
}
