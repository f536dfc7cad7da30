//! Newline-delimited file sink.
//!
//! Each record is written as one line of UTF-8 JSON. Lines are not indexed,
//! checksummed, or length-prefixed; a reader resynchronizes on `\n` after a
//! torn write. If an earlier append left a partial line at the tail, the next
//! append terminates it first so the retried records start on a fresh line.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use engine_core::error::SinkErrorCode;
use engine_core::limits::RECORD_SEPARATOR;
use engine_core::{Error, Result};
use tracing::debug;

use crate::writer::SinkWriter;

/// Appends records to a file, opening it for each batch.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    /// Prepares a file sink, creating missing parent directories.
    ///
    /// The target is not checked again on later appends.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                Error::sink(
                    SinkErrorCode::Unreachable,
                    format!("failed to create {}", parent.display()),
                    e,
                )
            })?;
        }

        debug!(path = %path.display(), "Prepared file sink");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SinkWriter for FileSink {
    fn append(&self, records: &[Vec<u8>]) -> io::Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(&self.path)?;

        let size = records.iter().map(|r| r.len() + 1).sum::<usize>() + 1;
        let mut buf = Vec::with_capacity(size);
        if has_torn_tail(&mut file)? {
            debug!(path = %self.path.display(), "Terminating torn tail");
            buf.push(RECORD_SEPARATOR);
        }
        for record in records {
            buf.extend_from_slice(record);
            buf.push(RECORD_SEPARATOR);
        }

        file.write_all(&buf)?;
        file.flush()?;

        Ok(buf.len())
    }

    fn target(&self) -> String {
        self.path.display().to_string()
    }
}

/// True when the file is non-empty and its last byte is not a separator.
fn has_torn_tail(file: &mut File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    file.seek(SeekFrom::End(-1))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last)?;
    Ok(last[0] != RECORD_SEPARATOR)
}
