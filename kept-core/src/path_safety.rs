use crate::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

#[derive(Clone, Copy, Debug, Default)]
pub struct PathPolicy {
    pub follow_symlinks: bool,
}

/// Ensure `rel` is safe relative to `root`: no absolute, no `..`, and
/// if `follow_symlinks` then the canonicalized path must stay under root;
/// otherwise any symlink along the way is rejected.
///
/// A path that does not exist yet is returned joined but unresolved.
pub fn validate_path(root: &Path, rel: &Path, policy: PathPolicy) -> Result<PathBuf> {
    let unsafe_path = |reason| Error::UnsafePath { path: rel.to_path_buf(), reason };
    if rel.is_absolute() || rel.has_root() {
        return Err(unsafe_path("absolute paths are not allowed"));
    }
    for comp in rel.components() {
        if matches!(comp, Component::ParentDir | Component::Prefix(_)) {
            return Err(unsafe_path("parent traversal not allowed"));
        }
    }
    let candidate = root.join(rel);
    if !policy.follow_symlinks {
        // Check every component, the leaf included.
        let mut cur = root.to_path_buf();
        for comp in rel.components() {
            cur.push(comp);
            if let Ok(m) = std::fs::symlink_metadata(&cur) {
                if m.file_type().is_symlink() {
                    return Err(unsafe_path("symlink encountered (not following)"));
                }
            }
        }
        Ok(candidate)
    } else {
        if std::fs::symlink_metadata(&candidate).is_err() {
            return Ok(candidate);
        }
        let root_can = std::fs::canonicalize(root)?;
        let cand_can = std::fs::canonicalize(&candidate)?;
        if !cand_can.starts_with(&root_can) {
            return Err(unsafe_path("path escapes root"));
        }
        Ok(cand_can)
    }
}
