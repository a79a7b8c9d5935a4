//! Generation of origami wrapper packages from a type universe.

pub mod call;
pub mod class;
pub mod config;
pub mod context;
pub mod convert;
pub mod driver;
pub mod emit;
pub mod error;
pub mod function;
pub mod manifest;
pub mod method;
pub mod modpath;
pub mod params;
pub mod session;
pub mod strategy;

pub use class::WrapperPlan;
pub use config::{Blacklist, GenConfig};
pub use driver::Generator;
pub use emit::{Emitter, FsEmitter, GoFmt, MemoryEmitter, SourceFormatter, Verbatim};
pub use error::{ConfigError, EmitError, GenerateError};
pub use session::{PackageEntry, Registration, Session};
pub use strategy::{classify_conversion, ConversionStrategy};
