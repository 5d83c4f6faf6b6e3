use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the launcher bootstrap.
/// Every module returns `Result<T, LauncherError>`.
#[derive(Debug, Error)]
pub enum LauncherError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Cache ───────────────────────────────────────────
    #[error("AppCDS cache file not found: {path:?}")]
    CacheFileNotFound { path: PathBuf },

    // ── Process ─────────────────────────────────────────
    #[error("Failed to start {program:?}: {source}")]
    ProcessSpawn {
        program: PathBuf,
        source: std::io::Error,
    },

    // ── Configuration ───────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    // ── VM ──────────────────────────────────────────────
    #[error("VM launch failed: {0}")]
    VmLaunch(String),
}

/// Convenience alias used throughout the crate.
pub type LauncherResult<T> = Result<T, LauncherError>;

impl From<std::io::Error> for LauncherError {
    fn from(source: std::io::Error) -> Self {
        LauncherError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}

impl LauncherError {
    /// Tag an io error with the path it happened at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LauncherError::Io {
            path: path.into(),
            source,
        }
    }
}
