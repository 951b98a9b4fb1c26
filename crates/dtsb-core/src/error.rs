//! Error types for a bundling run.
//!
//! Every variant is fatal: a run that returns an error never writes output.
//! Non-fatal conditions (missing files, unresolved externals, exclusions)
//! are reported through `tracing` and the [`BundleResult`](crate::BundleResult)
//! instead.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, BundleError>;

#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    /// A required option was not supplied.
    #[error("option \"{0}\" must be defined")]
    MissingOption(&'static str),

    /// An option was supplied with a value that cannot be used.
    #[error("option \"{name}\" {reason}")]
    InvalidOption { name: &'static str, reason: String },

    /// The entry declaration file does not exist.
    #[error("main does not exist: {}", .0.display())]
    MainNotFound(PathBuf),

    /// Two files declare the same ambient module.
    #[error(
        "already got export for: {name} (declared in {} and {})",
        first.display(),
        second.display()
    )]
    DuplicateExport {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// A filesystem operation failed.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configured header file could not be read.
    #[error("failed to read header file {}: {source}", path.display())]
    Header {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BundleError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BundleError::Io {
            path: path.into(),
            source,
        }
    }
}
