use crate::error::Error;
use std::collections::BTreeSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Set of file paths. Ordered so runs process files deterministically.
pub type FileSet = BTreeSet<PathBuf>;

/// A walk that stopped on an unreadable entry, with everything found before it.
#[derive(Debug)]
pub struct ScanFailure {
    pub partial: FileSet,
    pub error: Error,
}

impl fmt::Display for ScanFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} files found before the failure)", self.error, self.partial.len())
    }
}

impl std::error::Error for ScanFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

impl From<ScanFailure> for Error {
    fn from(f: ScanFailure) -> Self {
        f.error
    }
}

/// Recursively list every regular file under `root`.
///
/// Symlinks are never followed; they and other special files are skipped.
/// Entries are walked in file-name order; the first unreadable directory
/// stops the walk.
pub fn scan_tree(root: &Path) -> Result<FileSet, ScanFailure> {
    let mut files = FileSet::new();
    match std::fs::metadata(root) {
        Ok(md) if md.is_dir() => {}
        Ok(_) => {
            return Err(ScanFailure {
                partial: files,
                error: Error::Traversal {
                    path: root.to_path_buf(),
                    source: io::Error::other("not a directory"),
                },
            })
        }
        Err(source) => {
            return Err(ScanFailure {
                partial: files,
                error: Error::Traversal { path: root.to_path_buf(), source },
            })
        }
    }

    for ent in WalkDir::new(root).min_depth(1).follow_links(false).sort_by_file_name() {
        let ent = match ent {
            Ok(ent) => ent,
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                return Err(ScanFailure {
                    partial: files,
                    error: Error::Traversal { path, source: e.into() },
                });
            }
        };
        if !ent.file_type().is_file() {
            if !ent.file_type().is_dir() {
                debug!(path = %ent.path().display(), "skipping non-regular entry");
            }
            continue;
        }
        files.insert(ent.into_path());
    }
    Ok(files)
}
