use crate::digest::Digest;
use crate::error::{Error, Result};
use sha2::{Digest as _, Sha256};
use std::fs::File;
use std::io::{self, BufWriter, Read};
use std::path::Path;

const COPY_BUF: usize = 64 * 1024;

/// Reader that feeds every byte it yields into a SHA-256 hasher.
pub struct HashingReader<R> {
    inner: R,
    hasher: Sha256,
    bytes: u64,
}

impl<R: Read> HashingReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, hasher: Sha256::new(), bytes: 0 }
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes
    }

    pub fn finish(self) -> Digest {
        Digest::from(self.hasher)
    }
}

impl<R: Read> Read for HashingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        self.bytes += n as u64;
        Ok(n)
    }
}

/// Result of a completed copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Copied {
    pub digest: Digest,
    pub bytes: u64,
}

/// Copy `src` to `dst` and return the SHA-256 of the bytes copied.
///
/// The source is read once; the same bytes go to the hasher and the
/// destination. Missing destination parents are created. A partially
/// written destination is left in place on failure.
pub fn copy_and_hash(src: &Path, dst: &Path) -> Result<Copied> {
    let copy_err = |source| Error::Copy { src: src.to_path_buf(), dst: dst.to_path_buf(), source };

    let md = std::fs::symlink_metadata(src).map_err(copy_err)?;
    if !md.file_type().is_file() {
        return Err(Error::NotRegularFile { path: src.to_path_buf() });
    }
    if let Some(parent) = dst.parent() {
        std::fs::create_dir_all(parent).map_err(copy_err)?;
    }

    let mut reader = HashingReader::new(File::open(src).map_err(copy_err)?);
    let mut writer = BufWriter::with_capacity(COPY_BUF, File::create(dst).map_err(copy_err)?);
    io::copy(&mut reader, &mut writer).map_err(copy_err)?;
    let file = writer.into_inner().map_err(|e| copy_err(e.into_error()))?;
    file.sync_all().map_err(copy_err)?;
    let bytes = reader.bytes_read();
    Ok(Copied { digest: reader.finish(), bytes })
}
