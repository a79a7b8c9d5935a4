//! Structural description of Go packages: the input of the wrapper generator.

pub mod classify;
pub mod types;
pub mod universe;

pub use classify::{classify, needs_proxy, proxy_target, Holding, ProxyTarget, Shape};
pub use types::{BasicKind, ChanDir, Field, FuncDecl, Method, Signature, TypeDecl, TypeExpr};
pub use universe::{Kind, ReflectError, Root, Ty, Universe};
