use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the backup engine.
///
/// Per-file variants (`NotRegularFile`, `Copy`, `UnrecordablePath`) are
/// counted as failures by the orchestrator and never abort a run. The
/// structural ones (`Traversal`, `ManifestRead`, `ManifestCreate`,
/// `ManifestWrite`) do.
#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot list {path:?}: {source}")]
    Traversal {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed manifest line: {reason}")]
    MalformedLine { reason: String },

    #[error("cannot read manifest {path:?} (line {line}): {reason}")]
    ManifestRead { path: PathBuf, line: usize, reason: String },

    #[error("{path:?} is not a regular file")]
    NotRegularFile { path: PathBuf },

    #[error("copy {src:?} -> {dst:?} failed: {source}")]
    Copy {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot create manifest {path:?}: {source}")]
    ManifestCreate {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot append to manifest {path:?}: {source}")]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot record {path:?} in a manifest: {reason}")]
    UnrecordablePath { path: PathBuf, reason: &'static str },

    #[error("unsafe manifest path {path:?}: {reason}")]
    UnsafePath { path: PathBuf, reason: &'static str },

    #[error("invalid pattern: {0}")]
    Pattern(#[from] globset::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
