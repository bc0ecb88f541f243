use crate::config::{BackupOptions, RunContext};
use crate::copy::copy_and_hash;
use crate::diff::new_files;
use crate::error::{Error, Result};
use crate::filter::PathFilter;
use crate::manifest::{record_path, reroot, FileRecord};
use crate::scan::{scan_tree, FileSet};
use crate::store::{backed_up_set, load_manifests, ManifestWriter};
use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What a run would do, computed from the source tree and manifest history.
#[derive(Debug, Clone)]
pub struct Plan {
    /// Canonical source root every path below is rooted at.
    pub source_root: PathBuf,
    pub scanned: usize,
    pub known: usize,
    pub new_files: FileSet,
}

impl Plan {
    /// New files as source-relative, slash-separated strings.
    pub fn relative_new_files(&self) -> Vec<String> {
        self.new_files
            .iter()
            .map(|p| relative_to(&self.source_root, p).to_string_lossy().replace('\\', "/"))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedFile {
    #[serde(serialize_with = "lossy_path")]
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub new_files: usize,
    pub copied: usize,
    pub failed: usize,
    pub bytes_copied: u64,
    #[serde(serialize_with = "lossy_opt_path")]
    pub manifest: Option<PathBuf>,
    pub dry_run: bool,
    pub failures: Vec<FailedFile>,
}

impl RunReport {
    pub fn attempted(&self) -> usize {
        self.copied + self.failed
    }

    pub fn nothing_to_do(&self) -> bool {
        self.new_files == 0
    }

    fn record_failure(&mut self, path: &Path, e: Error) {
        warn!(path = %path.display(), error = %e, "file not backed up");
        self.failed += 1;
        self.failures.push(FailedFile { path: path.to_path_buf(), error: e.to_string() });
    }
}

// Non-UTF-8 names are serialised lossily.
fn lossy_path<S: Serializer>(p: &Path, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&p.to_string_lossy())
}

fn lossy_opt_path<S: Serializer>(
    p: &Option<PathBuf>,
    s: S,
) -> std::result::Result<S::Ok, S::Error> {
    match p {
        Some(p) => s.serialize_some(&p.to_string_lossy()),
        None => s.serialize_none(),
    }
}

/// Scan the source, rebuild the backed-up set from every manifest, and diff.
pub fn plan(ctx: &RunContext, opts: &BackupOptions) -> Result<Plan> {
    let source_root = std::fs::canonicalize(&ctx.source)
        .map_err(|source| Error::Traversal { path: ctx.source.clone(), source })?;
    let scanned = scan_tree(&source_root)?;
    let manifests = load_manifests(&ctx.manifest_dir, opts.corrupt_policy)?;
    let known = backed_up_set(&manifests, &source_root);
    debug!(scanned = scanned.len(), known = known.len(), manifests = manifests.len(), "diffing");

    let candidates: FileSet =
        scanned.iter().filter(|p| filter_allows(&opts.filter, &source_root, p)).cloned().collect();
    let new_files = new_files(&candidates, &known);
    Ok(Plan { source_root, scanned: scanned.len(), known: known.len(), new_files })
}

pub fn run_backup(ctx: &RunContext, opts: &BackupOptions) -> Result<RunReport> {
    run_backup_at(ctx, opts, Local::now())
}

/// Run a backup whose manifest is named for `now`.
///
/// Each new file is copied, then recorded; a record is never written for a
/// file whose copy did not complete. Per-file failures are counted and the
/// run moves on.
pub fn run_backup_at(
    ctx: &RunContext,
    opts: &BackupOptions,
    now: DateTime<Local>,
) -> Result<RunReport> {
    let plan = plan(ctx, opts)?;
    let mut report =
        RunReport { new_files: plan.new_files.len(), dry_run: opts.dry_run, ..Default::default() };
    info!(new = report.new_files, scanned = plan.scanned, "scan complete");
    if plan.new_files.is_empty() || opts.dry_run {
        return Ok(report);
    }

    // Paths the manifest cannot carry fail before any manifest is opened.
    let mut pending = Vec::with_capacity(plan.new_files.len());
    for path in &plan.new_files {
        match record_path(&relative_to(&plan.source_root, path)) {
            Ok(recorded) => pending.push((path, recorded)),
            Err(e) => report.record_failure(path, e),
        }
    }
    if pending.is_empty() {
        return Ok(report);
    }

    let mut writer = ManifestWriter::create(&ctx.manifest_dir, now)?;
    report.manifest = Some(writer.path().to_path_buf());

    for (path, recorded) in pending {
        match copy_one(&ctx.destination, path, recorded) {
            Ok((rec, bytes)) => {
                writer
                    .append(&rec)
                    .map_err(|source| Error::ManifestWrite { path: writer.path().into(), source })?;
                debug!(path = %rec.path, digest = %rec.digest, bytes, "copied");
                report.copied += 1;
                report.bytes_copied += bytes;
            }
            Err(e) => report.record_failure(path, e),
        }
    }
    info!(copied = report.copied, failed = report.failed, "run complete");
    Ok(report)
}

fn copy_one(destination: &Path, path: &Path, recorded: String) -> Result<(FileRecord, u64)> {
    let dst = reroot(destination, &recorded);
    let copied = copy_and_hash(path, &dst)?;
    Ok((FileRecord::new(recorded, copied.digest), copied.bytes))
}

fn relative_to(root: &Path, path: &Path) -> PathBuf {
    pathdiff::diff_paths(path, root).unwrap_or_else(|| path.to_path_buf())
}

fn filter_allows(filter: &PathFilter, root: &Path, path: &Path) -> bool {
    let rel = relative_to(root, path).to_string_lossy().replace('\\', "/");
    filter.allows(&rel)
}
