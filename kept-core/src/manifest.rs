//! Checksum manifest line format: `<sha256-hex> *<relative-path>`.
//!
//! The format is the binary-mode output of `sha256sum`, so a destination
//! tree can be checked with `sha256sum --check` from inside it.

use crate::digest::Digest;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Component, Path, PathBuf};

pub const SEPARATOR: &str = " *";

/// One copied file: its source-relative path and content digest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileRecord {
    pub path: String,
    pub digest: Digest,
}

impl FileRecord {
    pub fn new(path: impl Into<String>, digest: Digest) -> Self {
        Self { path: path.into(), digest }
    }
}

/// A manifest file and the records it holds.
#[derive(Clone, Debug)]
pub struct Manifest {
    pub name: String,
    pub path: PathBuf,
    pub records: Vec<FileRecord>,
}

pub fn encode_line(rec: &FileRecord) -> String {
    format!("{}{}{}", rec.digest.to_hex(), SEPARATOR, rec.path)
}

pub fn decode_line(line: &str) -> Result<FileRecord> {
    let Some((digest, path)) = line.split_once('*') else {
        return Err(Error::MalformedLine { reason: "missing '*' separator".into() });
    };
    let digest = digest.trim();
    let Some(digest) = Digest::from_hex(digest) else {
        return Err(Error::MalformedLine {
            reason: format!("digest is not 64 hex characters: {:?}", digest),
        });
    };
    let path = path.trim();
    if path.is_empty() {
        return Err(Error::MalformedLine { reason: "empty path".into() });
    }
    Ok(FileRecord { path: path.to_string(), digest })
}

/// Decode every record from a reader. Blank lines are ignored; the first
/// malformed line aborts the read.
pub fn decode_all<R: BufRead>(reader: R) -> std::result::Result<Vec<FileRecord>, (usize, Error)> {
    let mut out = Vec::new();
    for (i, line) in reader.lines().enumerate() {
        let lineno = i + 1;
        let line = line.map_err(|e| (lineno, Error::Io(e)))?;
        if line.trim().is_empty() {
            continue;
        }
        out.push(decode_line(&line).map_err(|e| (lineno, e))?);
    }
    Ok(out)
}

pub fn read_manifest(path: &Path) -> Result<Manifest> {
    let read_err = |line: usize, reason: String| Error::ManifestRead {
        path: path.to_path_buf(),
        line,
        reason,
    };
    let f = File::open(path).map_err(|e| read_err(0, e.to_string()))?;
    let records = decode_all(BufReader::new(f)).map_err(|(line, e)| match e {
        Error::MalformedLine { reason } => read_err(line, reason),
        other => read_err(line, other.to_string()),
    })?;
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    Ok(Manifest { name, path: path.to_path_buf(), records })
}

/// Render a source-relative path the way it is stored in a manifest.
///
/// Components are joined with `/`. Paths the line format cannot carry
/// faithfully are rejected instead of being recorded under a different name.
pub fn record_path(rel: &Path) -> Result<String> {
    let unrecordable = |reason| Error::UnrecordablePath { path: rel.to_path_buf(), reason };
    let mut parts = Vec::new();
    for comp in rel.components() {
        match comp {
            Component::Normal(s) => {
                parts.push(s.to_str().ok_or_else(|| unrecordable("not valid UTF-8"))?)
            }
            Component::CurDir => {}
            _ => return Err(unrecordable("not relative to the source root")),
        }
    }
    let joined = parts.join("/");
    if joined.is_empty() {
        return Err(unrecordable("empty path"));
    }
    if joined.contains(['\n', '\r']) {
        return Err(unrecordable("contains a line break"));
    }
    if joined.trim() != joined {
        return Err(unrecordable("leading or trailing whitespace"));
    }
    Ok(joined)
}

/// Join a recorded path under `root`.
pub fn reroot(root: &Path, recorded: &str) -> PathBuf {
    let mut p = root.to_path_buf();
    for part in recorded.split('/').filter(|s| !s.is_empty()) {
        p.push(part);
    }
    p
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_sha256sum_binary_mode() {
        let d = Digest::of(b"X");
        let line = encode_line(&FileRecord::new("photos/a.jpg", d));
        assert_eq!(line, format!("{} *photos/a.jpg", d.to_hex()));
        assert_eq!(line.len(), 64 + 2 + "photos/a.jpg".len());
    }

    #[test]
    fn decode_keeps_internal_spaces_and_trims_ends() {
        let d = Digest::of(b"Y");
        let rec = decode_line(&format!("  {} *my holiday/img 1.jpg \r", d.to_hex())).unwrap();
        assert_eq!(rec.path, "my holiday/img 1.jpg");
        assert_eq!(rec.digest, d);
    }

    #[test]
    fn decode_splits_on_first_star_only() {
        let d = Digest::of(b"Z");
        let rec = decode_line(&format!("{} *odd*name.txt", d.to_hex())).unwrap();
        assert_eq!(rec.path, "odd*name.txt");
    }

    #[test]
    fn malformed_lines_are_rejected() {
        assert!(matches!(decode_line("no separator here"), Err(Error::MalformedLine { .. })));
        assert!(matches!(decode_line("nothex *a.txt"), Err(Error::MalformedLine { .. })));
        let short = "ab".repeat(16);
        assert!(matches!(decode_line(&format!("{short} *a")), Err(Error::MalformedLine { .. })));
        let d = Digest::of(b"");
        assert!(matches!(decode_line(&format!("{d} *  ")), Err(Error::MalformedLine { .. })));
    }

    #[test]
    fn decode_all_reports_line_number_and_skips_blanks() {
        let d = Digest::of(b"a");
        let text = format!("{d} *a\n\n{d} *b\ngarbage\n{d} *c\n");
        let (line, _) = decode_all(text.as_bytes()).unwrap_err();
        assert_eq!(line, 4);
        let ok = format!("{d} *a\n\n{d} *b\n");
        assert_eq!(decode_all(ok.as_bytes()).unwrap().len(), 2);
    }

    #[test]
    fn record_path_uses_forward_slashes() {
        let rel: PathBuf = ["a", "b", "c.txt"].iter().collect();
        assert_eq!(record_path(&rel).unwrap(), "a/b/c.txt");
        assert!(record_path(Path::new("../x")).is_err());
        assert!(record_path(Path::new("line\nbreak")).is_err());
        assert!(record_path(Path::new(" lead")).is_err());
    }

    #[test]
    fn reroot_rebuilds_native_path() {
        let root = Path::new("/src");
        assert_eq!(reroot(root, "a/b.txt"), root.join("a").join("b.txt"));
    }
}
