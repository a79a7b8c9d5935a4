use std::fmt;

use genco::prelude::*;
use genco::tokens::ItemStr;

use crate::naming::{safe_lower_first, upper_first};

/// Represents a Go identifier with appropriate casing rules.
///
/// Names handed to the generator already follow Go conventions, so only the
/// first character is ever recased:
/// - Public identifiers start with uppercase (exported)
/// - Private identifiers start with lowercase and are escaped when they would
///   clash with a keyword or predeclared identifier
/// - Local identifiers are used as-is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoIdentifier {
    Public { name: String },
    Private { name: String },
    Local { name: String },
}

impl GoIdentifier {
    pub fn public(name: impl Into<String>) -> Self {
        Self::Public { name: name.into() }
    }

    pub fn private(name: impl Into<String>) -> Self {
        Self::Private { name: name.into() }
    }

    pub fn local(name: impl Into<String>) -> Self {
        Self::Local { name: name.into() }
    }

    /// The raw name before any case transformation.
    pub fn raw(&self) -> &str {
        match self {
            GoIdentifier::Public { name }
            | GoIdentifier::Private { name }
            | GoIdentifier::Local { name } => name,
        }
    }
}

impl fmt::Display for GoIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GoIdentifier::Public { name } => f.write_str(&upper_first(name)),
            GoIdentifier::Private { name } => f.write_str(&safe_lower_first(name)),
            GoIdentifier::Local { name } => f.write_str(name),
        }
    }
}

impl From<GoIdentifier> for String {
    fn from(value: GoIdentifier) -> Self {
        value.to_string()
    }
}

impl FormatInto<Go> for &GoIdentifier {
    fn format_into(self, tokens: &mut Tokens<Go>) {
        tokens.append(ItemStr::from(self.to_string()));
    }
}

impl FormatInto<Go> for GoIdentifier {
    fn format_into(self, tokens: &mut Tokens<Go>) {
        (&self).format_into(tokens)
    }
}
