use crate::config::CorruptManifestPolicy;
use crate::copy::HashingReader;
use crate::error::Result;
use crate::manifest::reroot;
use crate::path_safety::{validate_path, PathPolicy};
use crate::store::load_manifests;
use serde::Serialize;
use std::fs::File;
use std::io;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, Serialize)]
pub struct VerifyReport {
    pub manifests: usize,
    pub files_ok: u64,
    pub bad: Vec<String>,
    pub missing: Vec<String>,
}

impl VerifyReport {
    pub fn all_ok(&self) -> bool {
        self.bad.is_empty() && self.missing.is_empty()
    }
}

/// Re-hash every recorded file under `destination` against its manifest digest.
pub fn verify(destination: &Path, manifest_dir: &Path) -> Result<VerifyReport> {
    verify_with_policy(destination, manifest_dir, PathPolicy::default())
}

pub fn verify_with_policy(
    destination: &Path,
    manifest_dir: &Path,
    policy: PathPolicy,
) -> Result<VerifyReport> {
    let manifests = load_manifests(manifest_dir, CorruptManifestPolicy::Abort)?;
    let mut report = VerifyReport { manifests: manifests.len(), ..Default::default() };
    for rec in manifests.iter().flat_map(|m| m.records.iter()) {
        let rel = reroot(Path::new(""), &rec.path);
        let path = validate_path(destination, &rel, policy)?;
        let f = match File::open(&path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                report.missing.push(rec.path.clone());
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        let mut reader = HashingReader::new(f);
        io::copy(&mut reader, &mut io::sink())?;
        if reader.finish() == rec.digest {
            report.files_ok += 1;
        } else {
            debug!(path = %rec.path, "digest mismatch");
            report.bad.push(rec.path.clone());
        }
    }
    Ok(report)
}
