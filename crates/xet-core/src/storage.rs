//! Disk I/O and file lifecycle.
//!
//! Media bodies and capture files are written to a temp file next to the
//! destination and atomically renamed into place, so the final path never
//! holds a partial file.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Sequential writer for a temp file. Call `finalize` to publish it or
/// `discard` to remove it.
pub struct StorageWriter {
    file: BufWriter<File>,
    temp_path: PathBuf,
    written: u64,
}

impl StorageWriter {
    /// Create (or truncate) the temp file at `temp_path` (e.g. `destination.part`).
    pub fn create(temp_path: &Path) -> Result<Self> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)
            .with_context(|| format!("failed to create temp file: {}", temp_path.display()))?;
        Ok(StorageWriter {
            file: BufWriter::new(file),
            temp_path: temp_path.to_path_buf(),
            written: 0,
        })
    }

    /// Append `data` at the current end of the temp file.
    pub fn append(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    /// Truncate back to empty so a failed transfer can start over.
    pub fn reset(&mut self) -> io::Result<()> {
        self.file.flush()?;
        let file = self.file.get_mut();
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        self.written = 0;
        Ok(())
    }

    /// Bytes appended so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Path to the current temp file.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Flush buffers and sync file data to disk.
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush().context("storage flush failed")?;
        self.file.get_ref().sync_all().context("storage sync failed")?;
        Ok(())
    }

    /// Flush, sync and atomically rename the temp file to the final path.
    /// Fails if `final_path` is on a different filesystem.
    pub fn finalize(mut self, final_path: &Path) -> Result<()> {
        self.sync()?;
        let temp_path = self.temp_path.clone();
        // Close the handle before rename on some platforms.
        drop(self.file);

        std::fs::rename(&temp_path, final_path).with_context(|| {
            format!(
                "failed to rename {} to {}",
                temp_path.display(),
                final_path.display()
            )
        })?;
        Ok(())
    }

    /// Close and delete the temp file. Removal errors are logged, not returned.
    pub fn discard(self) {
        let temp_path = self.temp_path.clone();
        drop(self.file);
        if let Err(e) = std::fs::remove_file(&temp_path) {
            if e.kind() != io::ErrorKind::NotFound {
                tracing::warn!("failed to remove temp file {}: {}", temp_path.display(), e);
            }
        }
    }
}

/// Path for the temp file: appends `.part` to the final path (e.g. `a_1.m3u8` → `a_1.m3u8.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// Write `bytes` to `final_path` through a temp file and rename.
pub fn write_atomic(final_path: &Path, bytes: &[u8]) -> Result<()> {
    let mut writer = StorageWriter::create(&temp_path(final_path))?;
    if let Err(e) = writer.append(bytes) {
        writer.discard();
        return Err(e).with_context(|| format!("failed to write {}", final_path.display()));
    }
    writer.finalize(final_path)
}
