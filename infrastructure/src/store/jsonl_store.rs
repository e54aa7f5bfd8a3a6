//! JSONL file store for experiment records.
//!
//! Each [`ExperimentRecord`] is serialized as a single JSON line, appended
//! to the file via a buffered writer. Opening an existing file appends to
//! it, which is how a run resumes.

use ablation_application::ports::results_store::{ResultsStore, StoreError};
use ablation_domain::ExperimentRecord;
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Append-only record store, one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes after every record and
/// on `Drop`.
pub struct JsonlResultsStore {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlResultsStore {
    /// Open (or create) the store at `path`, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        repair_tail(path)?;
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        debug!("Opened results store {}", path.display());
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Open an existing store for reading; nothing on disk is created or
    /// repaired. Appends through a store opened this way fail.
    pub fn open_existing(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StoreError::NotFound(path.to_path_buf()),
            _ => StoreError::Io(e),
        })?;
        debug!("Opened results store {} read-only", path.display());
        Ok(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the results file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_records(&self) -> Result<Vec<ExperimentRecord>, StoreError> {
        self.flush()?;
        let reader = BufReader::new(File::open(&self.path)?);
        let mut records = Vec::new();
        let mut lines = reader.lines().enumerate().peekable();

        while let Some((i, line)) = lines.next() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(record) => records.push(record),
                // A torn final line from an interrupted write is dropped.
                Err(e) if lines.peek().is_none() => {
                    warn!(
                        "Ignoring incomplete last line of {}: {}",
                        self.path.display(),
                        e
                    );
                }
                Err(e) => {
                    return Err(StoreError::Corrupt {
                        line: i + 1,
                        message: e.to_string(),
                    });
                }
            }
        }
        Ok(records)
    }
}

/// Make the file end on a line boundary before appending to it.
///
/// A tail that parses as a record only lacks its newline; anything else is
/// an interrupted write and is cut off.
fn repair_tail(path: &Path) -> Result<(), StoreError> {
    let content = match std::fs::read(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    if content.is_empty() || content.ends_with(b"\n") {
        return Ok(());
    }

    let keep = content
        .iter()
        .rposition(|b| *b == b'\n')
        .map_or(0, |i| i + 1);
    let mut file = OpenOptions::new().write(true).open(path)?;
    if serde_json::from_slice::<ExperimentRecord>(&content[keep..]).is_ok() {
        file.seek(SeekFrom::End(0))?;
        file.write_all(b"\n")?;
    } else {
        warn!(
            "Dropping incomplete last line of {} ({} bytes)",
            path.display(),
            content.len() - keep
        );
        file.set_len(keep as u64)?;
    }
    Ok(())
}

impl ResultsStore for JsonlResultsStore {
    fn completed_request_ids(&self) -> Result<HashSet<String>, StoreError> {
        Ok(self
            .read_records()?
            .into_iter()
            .map(|r| r.request_id)
            .collect())
    }

    fn append(&self, record: &ExperimentRecord) -> Result<(), StoreError> {
        let line = serde_json::to_string(record)?;
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| std::io::Error::other("results writer lock poisoned"))?;
        writeln!(writer, "{}", line)?;
        // JSONL is append-only; flush per record so a crash loses at most one
        writer.flush()?;
        Ok(())
    }

    fn load_all(&self) -> Result<Vec<ExperimentRecord>, StoreError> {
        self.read_records()
    }

    fn flush(&self) -> Result<(), StoreError> {
        if let Ok(mut writer) = self.writer.lock() {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for JsonlResultsStore {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}
