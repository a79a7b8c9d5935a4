use wrapgen_reflect::{BasicKind, Kind, Ty};

use crate::config::Blacklist;

/// How a value crosses the boundary between the interpreter and Go.
///
/// Every type maps to exactly one strategy; anything not covered below is
/// handled as an opaque value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionStrategy {
    /// Unnamed integer and float types.
    PrimitiveScalar(BasicKind),
    String,
    Boolean,
    /// A named type over a scalar, such as `time.Duration`.
    NamedScalar(BasicKind),
    SliceOf,
    MapOf,
    Channel,
    FunctionValue,
    PointerToStruct,
    ValueStruct,
    NamedInterface,
    BuiltinError,
    /// `context.Context`, taken from the calling context rather than an
    /// argument slot.
    HostContext,
    OpaqueAny,
}

impl ConversionStrategy {
    /// Strategies that extract through the wrapped source value.
    pub fn is_proxied(self) -> bool {
        matches!(
            self,
            ConversionStrategy::PointerToStruct
                | ConversionStrategy::ValueStruct
                | ConversionStrategy::NamedInterface
        )
    }
}

/// Whether a named type's package forces opaque handling.
fn blacklisted(ty: Ty<'_>, blacklist: &Blacklist) -> bool {
    ty.pkg_path().is_some_and(|pkg| blacklist.contains(pkg))
}

fn is_class(ty: Ty<'_>, blacklist: &Blacklist) -> bool {
    ty.pkg_path().is_some() && ty.is_exported() && !blacklisted(ty, blacklist)
}

/// Picks the conversion strategy for `ty`.
pub fn classify_conversion(ty: Ty<'_>, blacklist: &Blacklist) -> ConversionStrategy {
    if ty.is_builtin_error() {
        return ConversionStrategy::BuiltinError;
    }
    if ty.is_context() {
        return ConversionStrategy::HostContext;
    }
    match ty.kind() {
        Kind::Pointer => match ty.elem() {
            Some(elem) if !ty.is_named() && elem.kind() == Kind::Struct && is_class(elem, blacklist) => {
                ConversionStrategy::PointerToStruct
            }
            _ => ConversionStrategy::OpaqueAny,
        },
        Kind::Interface if is_class(ty, blacklist) => ConversionStrategy::NamedInterface,
        Kind::Struct if is_class(ty, blacklist) => ConversionStrategy::ValueStruct,
        Kind::Basic(kind) if ty.pkg_path().is_some() => match kind {
            BasicKind::Complex64 | BasicKind::Complex128 | BasicKind::Uintptr => {
                ConversionStrategy::OpaqueAny
            }
            kind => ConversionStrategy::NamedScalar(kind),
        },
        Kind::Basic(BasicKind::String) => ConversionStrategy::String,
        Kind::Basic(BasicKind::Bool) => ConversionStrategy::Boolean,
        Kind::Basic(kind) if kind.is_integer() || kind.is_float() => {
            ConversionStrategy::PrimitiveScalar(kind)
        }
        Kind::Map => ConversionStrategy::MapOf,
        Kind::Slice => ConversionStrategy::SliceOf,
        Kind::Chan => ConversionStrategy::Channel,
        Kind::Func => ConversionStrategy::FunctionValue,
        _ => ConversionStrategy::OpaqueAny,
    }
}
