use std::path::PathBuf;

/// Failures of a single generation task.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("{0} is not a struct or interface type")]
    NotClassLike(String),
    #[error("{0} is a function type without a declaration to call")]
    NotCallable(String),
    #[error("cannot determine the owning package of {0}")]
    UnknownPackage(String),
    #[error("cannot determine the name of function {0}")]
    UnnamedFunction(String),
    #[error("failed to render {}", path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: std::fmt::Error,
    },
    #[error(transparent)]
    Emit(#[from] EmitError),
}

/// Failures writing generated files.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read replacement file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failures loading a [`crate::GenConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML config")]
    Toml(#[from] toml::de::Error),
    #[error("invalid JSON config")]
    Json(#[from] serde_json::Error),
}
