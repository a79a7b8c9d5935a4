pub mod comment;
pub mod file;
pub mod identifier;
pub mod imports;
pub mod layout;
pub mod naming;
pub mod types;

pub use comment::comment;
pub use file::{GoFile, GENERATED_HEADER};
pub use identifier::GoIdentifier;
pub use imports::ImportSet;
pub use layout::{arm, block, decls, lines, switch};
pub use types::{ChanDir, GoType};

// Re-export genco types that are commonly used
pub use genco::{lang::Go, quote, Tokens};
