use crate::error::Result;
use crate::filter::PathFilter;
use std::path::{Path, PathBuf};

pub const DEFAULT_FILES_DIR: &str = "files";
pub const DEFAULT_CHECKSUMS_DIR: &str = "checksums";

/// Directories a single run works against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunContext {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub manifest_dir: PathBuf,
}

impl RunContext {
    /// Source root with the default `files/` and `checksums/` siblings
    /// relative to the working directory.
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: PathBuf::from(DEFAULT_FILES_DIR),
            manifest_dir: PathBuf::from(DEFAULT_CHECKSUMS_DIR),
        }
    }

    /// All three directories placed under `base` instead of the working directory.
    pub fn rooted(base: &Path, source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: base.join(DEFAULT_FILES_DIR),
            manifest_dir: base.join(DEFAULT_CHECKSUMS_DIR),
        }
    }

    pub fn with_destination(mut self, dir: impl Into<PathBuf>) -> Self {
        self.destination = dir.into();
        self
    }

    pub fn with_manifest_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.manifest_dir = dir.into();
        self
    }

    /// Create the destination tree and manifest directory if absent.
    pub fn ensure_layout(&self) -> Result<()> {
        std::fs::create_dir_all(&self.destination)?;
        std::fs::create_dir_all(&self.manifest_dir)?;
        Ok(())
    }
}

/// What to do with a manifest that fails to decode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CorruptManifestPolicy {
    /// Fail the whole reconstruction. Never yields an incomplete known set.
    #[default]
    Abort,
    /// Drop that manifest and keep going; its files look new again.
    Skip,
}

#[derive(Clone, Debug, Default)]
pub struct BackupOptions {
    pub filter: PathFilter,
    pub corrupt_policy: CorruptManifestPolicy,
    pub dry_run: bool,
}
