use crate::config::CorruptManifestPolicy;
use crate::error::{Error, Result};
use crate::manifest::{encode_line, read_manifest, reroot, FileRecord, Manifest};
use crate::scan::FileSet;
use chrono::{DateTime, Local};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Manifest file name for a run started at `now`: `YYYY-MM-DDTHHMMSS`.
pub fn manifest_name(now: DateTime<Local>) -> String {
    now.format("%Y-%m-%dT%H%M%S").to_string()
}

/// Regular files directly under `dir`, sorted by name.
/// A missing directory holds no manifests.
pub fn list_manifests(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    let rd = match std::fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(out),
        Err(source) => return Err(Error::Traversal { path: dir.to_path_buf(), source }),
    };
    for ent in rd {
        let ent = ent.map_err(|source| Error::Traversal { path: dir.to_path_buf(), source })?;
        let ft = ent.file_type()?;
        if ft.is_file() {
            out.push(ent.path());
        } else {
            debug!(path = %ent.path().display(), "ignoring non-file in manifest dir");
        }
    }
    out.sort();
    Ok(out)
}

/// Read every manifest under `dir`, applying `policy` to ones that fail to decode.
pub fn load_manifests(dir: &Path, policy: CorruptManifestPolicy) -> Result<Vec<Manifest>> {
    let mut out = Vec::new();
    for path in list_manifests(dir)? {
        match read_manifest(&path) {
            Ok(m) => out.push(m),
            Err(e) if policy == CorruptManifestPolicy::Skip => {
                warn!(error = %e, "skipping unreadable manifest; its files will look new");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}

/// Union of all recorded paths, each re-rooted under `source_root`.
pub fn backed_up_set(manifests: &[Manifest], source_root: &Path) -> FileSet {
    manifests
        .iter()
        .flat_map(|m| m.records.iter())
        .map(|r| reroot(source_root, &r.path))
        .collect()
}

/// Append-only handle on the manifest for the current run.
///
/// Every record is written straight to the file as soon as it is appended.
#[derive(Debug)]
pub struct ManifestWriter {
    path: PathBuf,
    file: File,
    records: usize,
}

impl ManifestWriter {
    /// Create a new manifest under `dir` named for `now`. Never reopens an
    /// existing manifest: a name already taken gets a `-N` suffix.
    pub fn create(dir: &Path, now: DateTime<Local>) -> Result<Self> {
        let base = manifest_name(now);
        let mut attempt = 0u32;
        loop {
            let name = if attempt == 0 { base.clone() } else { format!("{base}-{attempt}") };
            let path = dir.join(&name);
            match OpenOptions::new().append(true).create_new(true).open(&path) {
                Ok(file) => {
                    debug!(path = %path.display(), "created manifest");
                    return Ok(Self { path, file, records: 0 });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists && attempt < 1000 => {
                    attempt += 1;
                }
                Err(source) => return Err(Error::ManifestCreate { path, source }),
            }
        }
    }

    pub fn append(&mut self, rec: &FileRecord) -> io::Result<()> {
        let mut line = encode_line(rec);
        line.push('\n');
        self.file.write_all(line.as_bytes())?;
        self.file.flush()?;
        self.records += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn records(&self) -> usize {
        self.records
    }
}
