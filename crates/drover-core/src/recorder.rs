//! Append-only run log persistence.
//!
//! Every invocation produces exactly one [`RunRecord`]; the recorder appends
//! it to a JSON log that accumulates across runs. A corrupted existing log
//! is moved aside to a timestamped backup and a fresh log is started; log
//! damage never fails a run.

use std::fs;
use std::path::{Path, PathBuf};

use jiff::Timestamp;
use log::warn;

use crate::error::{FsResultExt, Result};
use crate::models::RunRecord;

/// Persists run records to an append-only JSON log file.
#[derive(Debug, Clone)]
pub struct RunRecorder {
    path: PathBuf,
}

impl RunRecorder {
    /// Creates a recorder writing to the given log path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path of the underlying log file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one record, creating the log if needed.
    pub fn append(&self, record: &RunRecord) -> Result<()> {
        let mut records = self.load_existing()?;
        records.push(record.clone());
        let raw = serde_json::to_string_pretty(&records)?;
        fs::write(&self.path, raw).fs_context(&self.path)
    }

    /// Reads all records currently in the log.
    pub fn load(&self) -> Result<Vec<RunRecord>> {
        self.load_existing()
    }

    /// Loads the existing log, backing up and discarding a corrupt one.
    fn load_existing(&self) -> Result<Vec<RunRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let raw = fs::read_to_string(&self.path).fs_context(&self.path)?;
        match serde_json::from_str(&raw) {
            Ok(records) => Ok(records),
            Err(err) => {
                let backup = self.backup_path();
                warn!(
                    "run log {} is corrupt ({err}); backing it up to {}",
                    self.path.display(),
                    backup.display()
                );
                fs::rename(&self.path, &backup).fs_context(&self.path)?;
                Ok(Vec::new())
            }
        }
    }

    /// Timestamped sibling path for a corrupt-log backup.
    fn backup_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "run-log.json".to_string());
        name.push_str(&format!(".{}.bak", Timestamp::now().as_second()));
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RunResult;
    use crate::policy::Strength;
    use crate::usage::UsageSummary;
    use tempfile::TempDir;

    fn sample_record() -> RunRecord {
        RunRecord {
            results: vec![RunResult::success(1, "click login")],
            usage: UsageSummary::default(),
            timestamp: Timestamp::now(),
            strength: Strength::Medium,
            cache_enabled: true,
        }
    }

    #[test]
    fn appends_accumulate_across_invocations() {
        let dir = TempDir::new().expect("Failed to create temporary directory");
        let recorder = RunRecorder::new(dir.path().join("run-log.json"));

        recorder.append(&sample_record()).expect("first append");
        recorder.append(&sample_record()).expect("second append");

        let records = recorder.load().expect("load log");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn corrupt_log_is_backed_up_and_restarted() {
        let dir = TempDir::new().expect("Failed to create temporary directory");
        let log_path = dir.path().join("run-log.json");
        fs::write(&log_path, "{not json").expect("write corrupt log");

        let recorder = RunRecorder::new(&log_path);
        recorder.append(&sample_record()).expect("append after corruption");

        let records = recorder.load().expect("load log");
        assert_eq!(records.len(), 1);

        let backups: Vec<_> = fs::read_dir(dir.path())
            .expect("read dir")
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".bak"))
            .collect();
        assert_eq!(backups.len(), 1);
        let backed_up = fs::read_to_string(backups[0].path()).expect("read backup");
        assert_eq!(backed_up, "{not json");
    }

    #[test]
    fn missing_log_reads_as_empty() {
        let dir = TempDir::new().expect("Failed to create temporary directory");
        let recorder = RunRecorder::new(dir.path().join("run-log.json"));
        assert!(recorder.load().expect("load").is_empty());
    }
}
