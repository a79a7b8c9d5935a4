use std::{
    collections::BTreeMap,
    fs,
    io::Write,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    sync::Mutex,
};

use tempfile::NamedTempFile;

use crate::error::EmitError;

/// Destination of generated files.
pub trait Emitter: Send + Sync {
    /// Writes `contents` to `path`, creating parent directories as needed.
    fn write(&self, path: &Path, contents: &str) -> Result<(), EmitError>;

    /// Copies a hand-written file over the expected output `to`.
    fn copy(&self, from: &Path, to: &Path) -> Result<(), EmitError> {
        let contents = fs::read_to_string(from).map_err(|source| EmitError::Read {
            path: from.to_path_buf(),
            source,
        })?;
        self.write(to, &contents)
    }
}

/// Writes files to disk.
///
/// Contents go to a temporary file in the destination directory first, which
/// is then persisted over the target, so an interrupted write never leaves a
/// truncated file behind.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsEmitter;

impl Emitter for FsEmitter {
    fn write(&self, path: &Path, contents: &str) -> Result<(), EmitError> {
        let err = |source| EmitError::Write {
            path: path.to_path_buf(),
            source,
        };
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(err)?;
        let mut tmp = NamedTempFile::new_in(dir).map_err(err)?;
        tmp.write_all(contents.as_bytes()).map_err(err)?;
        tmp.persist(path).map_err(|e| err(e.error))?;
        log::debug!("persisted {}", path.display());
        Ok(())
    }
}

/// Keeps generated files in memory.
#[derive(Debug, Default)]
pub struct MemoryEmitter {
    files: Mutex<BTreeMap<PathBuf, String>>,
}

impl MemoryEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        self.lock().get(path.as_ref()).cloned()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.lock().keys().cloned().collect()
    }

    pub fn files(&self) -> BTreeMap<PathBuf, String> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<PathBuf, String>> {
        self.files
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Emitter for MemoryEmitter {
    fn write(&self, path: &Path, contents: &str) -> Result<(), EmitError> {
        self.lock().insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}

/// Pretty-printer applied to generated source before it is written.
pub trait SourceFormatter: Send + Sync {
    fn format(&self, source: &str) -> Result<String, String>;
}

/// Formats with the `gofmt` binary found on `PATH`.
#[derive(Debug, Clone)]
pub struct GoFmt {
    program: PathBuf,
}

impl Default for GoFmt {
    fn default() -> Self {
        Self {
            program: PathBuf::from("gofmt"),
        }
    }
}

impl GoFmt {
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl SourceFormatter for GoFmt {
    fn format(&self, source: &str) -> Result<String, String> {
        let mut child = Command::new(&self.program)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| format!("failed to run {}: {e}", self.program.display()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(source.as_bytes())
                .map_err(|e| format!("failed to write to gofmt: {e}"))?;
        }
        let output = child
            .wait_with_output()
            .map_err(|e| format!("failed to wait for gofmt: {e}"))?;
        if !output.status.success() {
            return Err(String::from_utf8_lossy(&output.stderr).trim().to_string());
        }
        String::from_utf8(output.stdout).map_err(|e| e.to_string())
    }
}

/// Leaves the source untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct Verbatim;

impl SourceFormatter for Verbatim {
    fn format(&self, source: &str) -> Result<String, String> {
        Ok(source.to_string())
    }
}

/// Formats `source`, falling back to the unformatted text on failure.
pub fn format_or_keep(formatter: &dyn SourceFormatter, path: &Path, source: String) -> String {
    match formatter.format(&source) {
        Ok(formatted) => formatted,
        Err(err) => {
            log::warn!("could not format {}, writing it unformatted: {err}", path.display());
            source
        }
    }
}
