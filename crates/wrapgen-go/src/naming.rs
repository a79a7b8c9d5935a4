//! Naming helpers shared by every generator.

use std::collections::BTreeMap;

use heck::ToLowerCamelCase;

/// Go language keywords. None of these may be used as an identifier.
pub const GO_KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Predeclared identifiers of the universe block. Shadowing them compiles but
/// breaks any later use in the same scope, so generated names avoid them too.
pub const GO_PREDECLARED: &[&str] = &[
    "any",
    "append",
    "bool",
    "byte",
    "cap",
    "clear",
    "close",
    "comparable",
    "complex",
    "complex128",
    "complex64",
    "copy",
    "delete",
    "error",
    "false",
    "float32",
    "float64",
    "imag",
    "int",
    "int16",
    "int32",
    "int64",
    "int8",
    "iota",
    "len",
    "make",
    "max",
    "min",
    "new",
    "nil",
    "panic",
    "print",
    "println",
    "real",
    "recover",
    "rune",
    "string",
    "true",
    "uint",
    "uint16",
    "uint32",
    "uint64",
    "uint8",
    "uintptr",
];

/// Field names the class wrappers declare themselves.
const RESERVED_FIELDS: &[&str] = &["source"];

pub fn is_keyword(name: &str) -> bool {
    GO_KEYWORDS.contains(&name)
}

pub fn is_predeclared(name: &str) -> bool {
    GO_PREDECLARED.contains(&name)
}

/// Lowercases the first character, leaving the rest untouched.
pub fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Uppercases the first character, leaving the rest untouched.
pub fn upper_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Makes `name` usable as a struct field of a generated wrapper.
///
/// Keywords get a leading underscore and names that collide with the
/// wrapper's own fields get a trailing one.
pub fn sanitize_identifier(name: &str) -> String {
    if is_keyword(name) {
        format!("_{name}")
    } else if RESERVED_FIELDS.contains(&name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// [`lower_first`] followed by escaping of keywords and predeclared names.
pub fn safe_lower_first(name: &str) -> String {
    let lowered = lower_first(name);
    if is_predeclared(&lowered) {
        format!("_{lowered}")
    } else {
        sanitize_identifier(&lowered)
    }
}

/// Returns a valid Go package identifier for an import path.
///
/// The empty path is the main package. A trailing major version segment
/// (`/v2`) is skipped in favour of the segment before it, and characters that
/// cannot appear in an identifier are replaced by underscores.
pub fn pkg_base_name(path: &str) -> String {
    if path.is_empty() {
        return "main".to_string();
    }
    let mut segments = path.rsplit('/').filter(|s| !s.is_empty());
    let last = segments.next().unwrap_or(path);
    let base = if is_major_version(last) {
        segments.next().unwrap_or(last)
    } else {
        last
    };
    let mut ident: String = base
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    ident
}

fn is_major_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
}

/// Whether a Go identifier is exported from its package.
pub fn is_exported_name(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Name under which an exported struct field is exposed as a property.
pub fn property_name(field: &str) -> String {
    field.to_lower_camel_case()
}

/// Counts the uppercase characters at the end of `name`.
pub fn count_trailing_upper(name: &str) -> usize {
    name.chars().rev().take_while(|c| c.is_uppercase()).count()
}

/// The dispatch key chosen for a group of method names that fold together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodKey {
    /// Key under which the host looks the method up.
    pub key: String,
    /// Native method bound to the key.
    pub method: String,
}

/// Resolves method names that collide once their first letter is lowered and
/// the result is compared case-insensitively (`Ro` and `RO`).
///
/// Within a group the name with the fewest trailing uppercase letters wins,
/// both for the key and for the bound method. Names are sorted first so the
/// outcome never depends on input order. The result is ordered by key.
pub fn resolve_method_keys<'a, I>(names: I) -> Vec<MethodKey>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut sorted: Vec<&str> = names.into_iter().collect();
    sorted.sort_unstable();
    sorted.dedup();

    let mut groups: BTreeMap<String, (MethodKey, usize)> = BTreeMap::new();
    for name in sorted {
        let key = lower_first(name);
        let score = count_trailing_upper(name);
        let candidate = MethodKey {
            key: key.clone(),
            method: name.to_string(),
        };
        groups
            .entry(key.to_lowercase())
            .and_modify(|(best, best_score)| {
                if score < *best_score {
                    *best = candidate.clone();
                    *best_score = score;
                }
            })
            .or_insert((candidate, score));
    }

    let mut keys: Vec<MethodKey> = groups.into_values().map(|(key, _)| key).collect();
    keys.sort_by(|a, b| a.key.cmp(&b.key));
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lower_and_upper_first() {
        assert_eq!(lower_first("SetName"), "setName");
        assert_eq!(lower_first("ID"), "iD");
        assert_eq!(lower_first(""), "");
        assert_eq!(upper_first("open"), "Open");
    }

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("type"), "_type");
        assert_eq!(sanitize_identifier("source"), "source_");
        assert_eq!(sanitize_identifier("name"), "name");
    }

    #[test]
    fn test_safe_lower_first_escapes_predeclared() {
        assert_eq!(safe_lower_first("String"), "_string");
        assert_eq!(safe_lower_first("Len"), "_len");
        assert_eq!(safe_lower_first("Range"), "_range");
        assert_eq!(safe_lower_first("Source"), "source_");
        assert_eq!(safe_lower_first("Close"), "_close");
        assert_eq!(safe_lower_first("SetName"), "setName");
    }

    #[test]
    fn test_pkg_base_name() {
        assert_eq!(pkg_base_name(""), "main");
        assert_eq!(pkg_base_name("example.com/demo"), "demo");
        assert_eq!(pkg_base_name("net/http"), "http");
        assert_eq!(pkg_base_name("github.com/redis/go-redis/v9"), "go_redis");
        assert_eq!(pkg_base_name("gopkg.in/yaml.v3"), "yaml_v3");
        assert_eq!(pkg_base_name("fmt"), "fmt");
    }

    #[test]
    fn test_is_exported_name() {
        assert!(is_exported_name("User"));
        assert!(!is_exported_name("user"));
        assert!(!is_exported_name("_User"));
        assert!(!is_exported_name(""));
    }

    #[test]
    fn test_property_name() {
        assert_eq!(property_name("Name"), "name");
        assert_eq!(property_name("ID"), "id");
        assert_eq!(property_name("IsActive"), "isActive");
        assert_eq!(property_name("Children"), "children");
    }

    #[test]
    fn test_count_trailing_upper() {
        assert_eq!(count_trailing_upper("Ro"), 0);
        assert_eq!(count_trailing_upper("RO"), 2);
        assert_eq!(count_trailing_upper("GetID"), 2);
        assert_eq!(count_trailing_upper(""), 0);
    }

    #[test]
    fn test_resolve_method_keys_prefers_fewer_trailing_upper() {
        let expected = vec![MethodKey {
            key: "ro".to_string(),
            method: "Ro".to_string(),
        }];
        assert_eq!(resolve_method_keys(["Ro", "RO"]), expected);
        assert_eq!(resolve_method_keys(["RO", "Ro"]), expected);
    }

    #[test]
    fn test_resolve_method_keys_keeps_distinct_names() {
        let keys = resolve_method_keys(["SetName", "Activate", "GetID"]);
        let pairs: Vec<(&str, &str)> = keys
            .iter()
            .map(|k| (k.key.as_str(), k.method.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("activate", "Activate"),
                ("getID", "GetID"),
                ("setName", "SetName")
            ]
        );
    }
}
