use std::{
    env, fs,
    path::{Path, PathBuf},
};

use once_cell::sync::OnceCell;

/// How many directories above the starting point are searched for `go.mod`.
const MAX_PARENTS: usize = 10;

static MODULE_PATH: OnceCell<Option<String>> = OnceCell::new();

/// Module path declared by the `go.mod` enclosing the working directory.
///
/// Looked up once per process.
pub fn module_path() -> Option<&'static str> {
    MODULE_PATH
        .get_or_init(|| {
            let cwd = env::current_dir().ok()?;
            let found = find_module_path(&cwd);
            match &found {
                Some(path) => log::debug!("using Go module path {path}"),
                None => log::debug!("no go.mod found above {}", cwd.display()),
            }
            found
        })
        .as_deref()
}

/// Searches `start` and its parents for a `go.mod` and returns its module
/// path. The nearest `go.mod` wins even when it declares no module.
pub fn find_module_path(start: &Path) -> Option<String> {
    let mut dir: Option<PathBuf> = Some(start.to_path_buf());
    for _ in 0..=MAX_PARENTS {
        let current = dir?;
        let gomod = current.join("go.mod");
        if let Ok(contents) = fs::read_to_string(&gomod) {
            return parse_module_line(&contents);
        }
        dir = current.parent().map(Path::to_path_buf);
    }
    None
}

/// Extracts the module path from the contents of a `go.mod`.
pub fn parse_module_line(contents: &str) -> Option<String> {
    contents.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let path = rest.trim().trim_matches('"');
        (!path.is_empty()).then(|| path.to_string())
    })
}
