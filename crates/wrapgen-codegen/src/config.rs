use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use serde::Deserialize;
use wrapgen_go::naming::pkg_base_name;

use crate::error::ConfigError;

/// Options of a generation run.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenConfig {
    /// Directory every wrapper package is written under.
    pub output_root: PathBuf,
    /// Namespace used in generated `GetName` values. Defaults to the base
    /// name of the source package.
    pub name_prefix: Option<String>,
    /// Maximum recursion depth; zero or less means unbounded.
    pub max_depth: i64,
    pub blacklist: Blacklist,
    /// Source package path to the import path of its wrapper package.
    pub package_mappings: BTreeMap<String, String>,
    /// Expected output path to a file copied there instead of generating it.
    pub fixed_replace: BTreeMap<PathBuf, PathBuf>,
    /// Import path prefix of the wrapper packages. When unset it is derived
    /// from the enclosing `go.mod` and `output_root`.
    pub import_root: Option<String>,
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("origami"),
            name_prefix: None,
            max_depth: 0,
            blacklist: Blacklist::default(),
            package_mappings: BTreeMap::new(),
            fixed_replace: BTreeMap::new(),
            import_root: None,
        }
    }
}

/// Packages whose types are only ever handled as opaque values.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Blacklist {
    pub packages: Vec<String>,
}

impl Blacklist {
    pub fn contains(&self, package: &str) -> bool {
        self.packages.iter().any(|p| p == package)
    }
}

impl GenConfig {
    /// Loads a config file, as JSON when the extension is `.json` and as TOML
    /// otherwise.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(serde_json::from_str(&contents)?),
            _ => Self::from_toml_str(&contents),
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn depth_limit(&self) -> Option<usize> {
        usize::try_from(self.max_depth).ok().filter(|depth| *depth > 0)
    }

    pub fn name_prefix_for(&self, package_path: &str) -> String {
        match &self.name_prefix {
            Some(prefix) if !prefix.is_empty() => prefix.clone(),
            _ => pkg_base_name(package_path),
        }
    }

    /// Directory of the wrapper package generated for `package_path`.
    pub fn package_dir(&self, package_path: &str) -> PathBuf {
        self.output_root.join(pkg_base_name(package_path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = GenConfig::default();
        assert_eq!(config.output_root, PathBuf::from("origami"));
        assert_eq!(config.depth_limit(), None);
        assert_eq!(config.name_prefix_for("example.com/demo"), "demo");
        assert_eq!(
            config.package_dir("example.com/demo"),
            PathBuf::from("origami/demo")
        );
    }

    #[test]
    fn test_from_toml() {
        let config = GenConfig::from_toml_str(
            r#"
            output_root = "out"
            name_prefix = "app"
            max_depth = 3

            [blacklist]
            packages = ["time", "sync"]

            [package_mappings]
            "example.com/other" = "example.com/wrappers/other"

            [fixed_replace]
            "out/demo/user_class.go" = "overrides/user_class.go"
            "#,
        )
        .unwrap();

        assert_eq!(config.output_root, PathBuf::from("out"));
        assert_eq!(config.name_prefix_for("example.com/demo"), "app");
        assert_eq!(config.depth_limit(), Some(3));
        assert!(config.blacklist.contains("time"));
        assert!(!config.blacklist.contains("example.com/demo"));
        assert_eq!(
            config.package_mappings.get("example.com/other").map(String::as_str),
            Some("example.com/wrappers/other")
        );
        assert_eq!(
            config.fixed_replace.get(Path::new("out/demo/user_class.go")),
            Some(&PathBuf::from("overrides/user_class.go"))
        );
    }

    #[test]
    fn test_negative_depth_is_unbounded() {
        let config = GenConfig::from_toml_str("max_depth = -1").unwrap();
        assert_eq!(config.depth_limit(), None);
    }

    #[test]
    fn test_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wrapgen.json");
        fs::write(&path, r#"{"output_root": "gen", "blacklist": {"packages": ["time"]}}"#).unwrap();

        let config = GenConfig::load(&path).unwrap();
        assert_eq!(config.output_root, PathBuf::from("gen"));
        assert!(config.blacklist.contains("time"));
    }

    #[test]
    fn test_load_missing_file() {
        let err = GenConfig::load(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
