use crate::error::Result;
use crate::manifest::read_manifest;
use crate::store::list_manifests;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    pub name: String,
    pub records: usize,
    /// Set when the manifest could not be decoded.
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HistoryReport {
    pub entries: Vec<HistoryEntry>,
    pub total_records: usize,
    pub distinct_paths: usize,
}

/// Summarize every manifest under `manifest_dir`, oldest first.
/// Unreadable manifests are listed with their error rather than failing.
pub fn history(manifest_dir: &Path) -> Result<HistoryReport> {
    let mut report = HistoryReport::default();
    let mut paths = HashSet::new();
    for p in list_manifests(manifest_dir)? {
        let name = p.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        match read_manifest(&p) {
            Ok(m) => {
                report.total_records += m.records.len();
                report.entries.push(HistoryEntry { name, records: m.records.len(), error: None });
                paths.extend(m.records.into_iter().map(|r| r.path));
            }
            Err(e) => {
                report.entries.push(HistoryEntry { name, records: 0, error: Some(e.to_string()) })
            }
        }
    }
    report.distinct_paths = paths.len();
    Ok(report)
}
