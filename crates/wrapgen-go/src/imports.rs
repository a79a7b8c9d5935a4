use genco::prelude::*;
use genco::tokens::{static_literal, ItemStr};
use indexmap::IndexMap;

use crate::naming::pkg_base_name;

/// Import path of the interpreter's value model.
pub const DATA: &str = "github.com/php-any/origami/data";
/// Import path of the interpreter's AST nodes (parameters, properties).
pub const NODE: &str = "github.com/php-any/origami/node";
/// Import path of the interpreter's runtime (detached contexts).
pub const RUNTIME: &str = "github.com/php-any/origami/runtime";
pub const ERRORS: &str = "errors";

#[derive(Debug, Clone, PartialEq, Eq)]
struct ImportEntry {
    alias: String,
    used: bool,
}

/// The imports of one generated file.
///
/// Packages are declared speculatively and flagged as used when the emitted
/// code references them; only flagged entries are rendered, so a file never
/// fails to compile because of an unused import.
#[derive(Debug, Clone, Default)]
pub struct ImportSet {
    entries: IndexMap<String, ImportEntry>,
}

impl ImportSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `path` under `alias` and returns the alias actually assigned.
    ///
    /// Declaring a path twice keeps the first alias. When another path already
    /// owns `alias` a numeric suffix is appended until it is unique.
    pub fn declare(&mut self, path: &str, alias: &str) -> String {
        if let Some(entry) = self.entries.get(path) {
            return entry.alias.clone();
        }
        let mut candidate = alias.to_string();
        let mut suffix = 2;
        while self.entries.values().any(|e| e.alias == candidate) {
            candidate = format!("{alias}{suffix}");
            suffix += 1;
        }
        self.entries.insert(
            path.to_string(),
            ImportEntry {
                alias: candidate.clone(),
                used: false,
            },
        );
        candidate
    }

    /// Flags a declared path as used and returns its alias.
    pub fn mark_used(&mut self, path: &str) -> Option<&str> {
        let entry = self.entries.get_mut(path)?;
        entry.used = true;
        Some(entry.alias.as_str())
    }

    /// Declares `path` under `alias` and flags it as used.
    pub fn require(&mut self, path: &str, alias: &str) -> String {
        let alias = self.declare(path, alias);
        self.mark_used(path);
        alias
    }

    /// Declares and uses a package under its default name.
    pub fn require_default(&mut self, path: &str) -> String {
        self.require(path, &pkg_base_name(path))
    }

    pub fn alias(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(|e| e.alias.as_str())
    }

    pub fn is_used(&self, path: &str) -> bool {
        self.entries.get(path).is_some_and(|e| e.used)
    }

    pub fn is_empty(&self) -> bool {
        !self.entries.values().any(|e| e.used)
    }

    /// Used imports as `(path, alias)`, standard library first, each group
    /// sorted by path.
    pub fn used(&self) -> Vec<(&str, &str)> {
        let mut used: Vec<(&str, &str)> = self
            .entries
            .iter()
            .filter(|(_, e)| e.used)
            .map(|(path, e)| (path.as_str(), e.alias.as_str()))
            .collect();
        used.sort_by_key(|(path, _)| (!is_std_path(path), *path));
        used
    }
}

/// Standard library paths have no dot in their first segment.
fn is_std_path(path: &str) -> bool {
    !path.split('/').next().unwrap_or(path).contains('.')
}

fn import_line(tokens: &mut Tokens<Go>, path: &str, alias: &str) {
    tokens.push();
    if path.rsplit('/').next() != Some(alias) {
        tokens.append(ItemStr::from(alias.to_string()));
        tokens.space();
    }
    tokens.append(quoted(path.to_string()));
}

impl FormatInto<Go> for &ImportSet {
    fn format_into(self, tokens: &mut Tokens<Go>) {
        let used = self.used();
        if used.is_empty() {
            return;
        }
        let (std, external): (Vec<_>, Vec<_>) =
            used.into_iter().partition(|(path, _)| is_std_path(path));

        tokens.push();
        tokens.append(static_literal("import ("));
        tokens.indent();
        for (path, alias) in &std {
            import_line(tokens, path, alias);
        }
        if !std.is_empty() && !external.is_empty() {
            tokens.line();
        }
        for (path, alias) in &external {
            import_line(tokens, path, alias);
        }
        tokens.unindent();
        tokens.push();
        tokens.append(static_literal(")"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_only_used_imports_are_rendered() {
        let mut imports = ImportSet::new();
        imports.declare(ERRORS, "errors");
        imports.declare(NODE, "node");
        imports.require_default(DATA);
        imports.require("example.com/demo", "demosrc");

        let tokens: Tokens<Go> = quote!($(&imports));
        let rendered = tokens.to_string().unwrap();
        let lines: Vec<&str> = rendered.lines().map(str::trim).collect();
        assert_eq!(
            lines,
            vec![
                "import (",
                "\"github.com/php-any/origami/data\"",
                "demosrc \"example.com/demo\"",
                ")"
            ]
        );
        assert!(!imports.is_used(NODE));
    }

    #[test]
    fn test_std_imports_come_first() {
        let mut imports = ImportSet::new();
        imports.require_default(DATA);
        imports.require_default(ERRORS);

        assert_eq!(
            imports.used(),
            vec![("errors", "errors"), (DATA, "data")]
        );
    }

    #[test]
    fn test_alias_collisions_get_a_suffix() {
        let mut imports = ImportSet::new();
        assert_eq!(imports.declare("a.com/log", "logsrc"), "logsrc");
        assert_eq!(imports.declare("b.com/log", "logsrc"), "logsrc2");
        assert_eq!(imports.declare("a.com/log", "other"), "logsrc");
    }

    #[test]
    fn test_empty_set_renders_nothing() {
        let mut imports = ImportSet::new();
        imports.declare(ERRORS, "errors");
        assert!(imports.is_empty());
        let tokens: Tokens<Go> = quote!($(&imports));
        assert_eq!(tokens.to_string().unwrap(), "");
    }
}
