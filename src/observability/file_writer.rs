//! Rotating line writer for the trace export file.
//!
//! Keeps disk usage bounded: once the file passes the size threshold it is
//! renamed to a timestamped backup and a fresh file is started. Only the
//! newest backups are retained.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Maximum file size before rotation (10 MB).
const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

/// Number of backup files to retain after rotation.
const MAX_BACKUP_FILES: usize = 3;

/// Thread-safe appending writer with size-based rotation.
///
/// The file is opened lazily on the first write, so construction never fails.
/// Backups are named `<file name>.<YYYYmmddTHHMMSS%3f>` next to the live file.
pub struct FileWriter {
    file_path: PathBuf,
    max_bytes: u64,
    writer: Mutex<Option<File>>,
}

impl FileWriter {
    pub const fn new(file_path: PathBuf) -> Self {
        Self::with_limit(file_path, MAX_FILE_SIZE_BYTES)
    }

    const fn with_limit(file_path: PathBuf, max_bytes: u64) -> Self {
        Self {
            file_path,
            max_bytes,
            writer: Mutex::new(None),
        }
    }

    /// Appends `line` plus a newline and flushes.
    ///
    /// # Errors
    ///
    /// Fails if rotation, opening, writing or flushing fails, or if the lock
    /// was poisoned by a panicking writer.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|e| io::Error::other(format!("Mutex poisoned: {e}")))?;

        self.check_and_rotate(&mut writer)?;

        let file = match writer.as_mut() {
            Some(file) => file,
            None => writer.insert(
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&self.file_path)?,
            ),
        };

        writeln!(file, "{line}")?;
        file.flush()
    }

    fn check_and_rotate(&self, writer: &mut Option<File>) -> io::Result<()> {
        if let Ok(metadata) = fs::metadata(&self.file_path) {
            if metadata.len() > self.max_bytes {
                *writer = None;
                self.rotate()?;
            }
        }
        Ok(())
    }

    fn rotate(&self) -> io::Result<()> {
        let stamp = chrono::Utc::now().format("%Y%m%dT%H%M%S%3f");
        let backup = backup_path(&self.file_path, &stamp.to_string());
        if self.file_path.exists() {
            fs::rename(&self.file_path, backup)?;
        }
        self.cleanup_old_backups()
    }

    /// Deletes all but the newest `MAX_BACKUP_FILES` backups.
    ///
    /// Backup names sort chronologically, so no metadata lookups are needed.
    /// Individual deletion failures are ignored.
    fn cleanup_old_backups(&self) -> io::Result<()> {
        let parent = self
            .file_path
            .parent()
            .ok_or_else(|| io::Error::other("No parent directory"))?;
        let prefix = self
            .file_path
            .file_name()
            .and_then(|s| s.to_str())
            .map(|name| format!("{name}."))
            .ok_or_else(|| io::Error::other("Invalid file name"))?;

        let mut backups: Vec<PathBuf> = fs::read_dir(parent)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with(&prefix))
            })
            .collect();

        backups.sort_unstable_by(|a, b| b.cmp(a));
        for old in backups.iter().skip(MAX_BACKUP_FILES) {
            let _ = fs::remove_file(old);
        }
        Ok(())
    }
}

fn backup_path(file_path: &Path, stamp: &str) -> PathBuf {
    let mut name = file_path.as_os_str().to_owned();
    name.push(".");
    name.push(stamp);
    PathBuf::from(name)
}

impl std::fmt::Debug for FileWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWriter")
            .field("file_path", &self.file_path)
            .field("max_bytes", &self.max_bytes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn appends_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trace.jsonl");
        let writer = FileWriter::new(path.clone());

        writer.write_line("{\"a\":1}").unwrap();
        writer.write_line("{\"b\":2}").unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content, "{\"a\":1}\n{\"b\":2}\n");
    }

    #[test]
    fn rotates_past_the_limit_and_keeps_three_backups() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trace.jsonl");
        for stamp in ["20240101T000000000", "20240102T000000000", "20240103T000000000"] {
            fs::write(backup_path(&path, stamp), "old").unwrap();
        }

        let writer = FileWriter::with_limit(path.clone(), 4);
        writer.write_line("first line").unwrap();
        writer.write_line("second").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "second\n");
        let backups = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().starts_with("trace.jsonl."))
            .count();
        assert_eq!(backups, MAX_BACKUP_FILES);
        assert!(!backup_path(&path, "20240101T000000000").exists());
    }
}
