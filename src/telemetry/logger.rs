//! JSONL telemetry writer with file rotation

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use super::types::TelemetryRecord;
use crate::config::TelemetryConfig;
use crate::decoder::reading::SensorReading;
use crate::error::Result;

const FILE_PREFIX: &str = "readings_";
const FILE_SUFFIX: &str = ".jsonl";

/// Appends decoded readings to rotating JSONL files
///
/// A new file is started after `max_records_per_file` records; only the
/// newest `max_files_to_keep` files are kept in the log directory.
#[derive(Debug)]
pub struct TelemetryLogger {
    dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: Option<BufWriter<File>>,
    current_path: Option<PathBuf>,
    records_in_file: usize,
    files_opened: u32,
}

impl TelemetryLogger {
    /// Create a logger for the configured directory
    ///
    /// # Errors
    ///
    /// Returns error if the log directory cannot be created
    pub fn new(config: &TelemetryConfig) -> Result<Self> {
        Self::with_limits(&config.log_dir, config.max_records_per_file, config.max_files_to_keep)
    }

    /// Create a logger with explicit rotation limits
    ///
    /// Limits below 1 are raised to 1.
    ///
    /// # Errors
    ///
    /// Returns error if the log directory cannot be created
    pub fn with_limits<P: AsRef<Path>>(
        dir: P,
        max_records_per_file: usize,
        max_files_to_keep: usize,
    ) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            max_records_per_file: max_records_per_file.max(1),
            max_files_to_keep: max_files_to_keep.max(1),
            writer: None,
            current_path: None,
            records_in_file: 0,
            files_opened: 0,
        })
    }

    /// Append a reading stamped with the current time
    ///
    /// # Errors
    ///
    /// Returns error if the record cannot be serialized or written
    pub fn log(&mut self, reading: &SensorReading) -> Result<()> {
        self.log_at(Utc::now(), reading)
    }

    /// Append a reading with an explicit timestamp
    ///
    /// # Errors
    ///
    /// Returns error if the record cannot be serialized or written
    pub fn log_at(&mut self, timestamp: DateTime<Utc>, reading: &SensorReading) -> Result<()> {
        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate(timestamp)?;
        }

        let record = TelemetryRecord::new(timestamp, reading);
        if let Some(writer) = self.writer.as_mut() {
            serde_json::to_writer(&mut *writer, &record)?;
            writer.write_all(b"\n")?;
            writer.flush()?;
            self.records_in_file += 1;
        }

        Ok(())
    }

    /// File currently written to, if any record was logged
    pub fn current_file(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    /// Flush and close the current file
    ///
    /// # Errors
    ///
    /// Returns error if buffered data cannot be written
    pub fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        Ok(())
    }

    fn rotate(&mut self, timestamp: DateTime<Utc>) -> Result<()> {
        self.close()?;

        let name = format!(
            "{}{}_{:04}{}",
            FILE_PREFIX,
            timestamp.format("%Y%m%dT%H%M%SZ"),
            self.files_opened,
            FILE_SUFFIX
        );
        let path = self.dir.join(name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        info!("Telemetry log: {}", path.display());

        self.writer = Some(BufWriter::new(file));
        self.current_path = Some(path);
        self.records_in_file = 0;
        self.files_opened += 1;

        self.prune()
    }

    /// Delete the oldest log files beyond the retention limit
    fn prune(&self) -> Result<()> {
        let mut files = log_files(&self.dir)?;
        if files.len() <= self.max_files_to_keep {
            return Ok(());
        }

        // Names start with the UTC stamp, so lexical order is creation order
        files.sort();
        let excess = files.len() - self.max_files_to_keep;
        for path in &files[..excess] {
            match fs::remove_file(path) {
                Ok(()) => debug!("Removed old telemetry log {}", path.display()),
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }

        Ok(())
    }
}

impl Drop for TelemetryLogger {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("Failed to flush telemetry log: {}", e);
        }
    }
}

/// Telemetry log files in `dir`
fn log_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with(FILE_PREFIX) && name.ends_with(FILE_SUFFIX) {
            files.push(entry.path());
        }
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::protocol::SensorFamily;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn reading(id: u32) -> SensorReading {
        let mut reading = SensorReading::new(SensorFamily::Weather6In1, id, 1);
        reading.channel = Some(0);
        reading.data.temp_c = Some(21.5);
        reading
    }

    fn at(second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, second).unwrap()
    }

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = log_files(dir)
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_no_file_before_first_record() {
        let dir = tempdir().unwrap();
        let logger = TelemetryLogger::with_limits(dir.path(), 10, 10).unwrap();

        assert!(logger.current_file().is_none());
        assert!(names(dir.path()).is_empty());
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a/b");

        let mut logger = TelemetryLogger::with_limits(&nested, 10, 10).unwrap();
        logger.log_at(at(0), &reading(1)).unwrap();

        assert_eq!(names(&nested), vec!["readings_20240501T120000Z_0000.jsonl"]);
    }

    #[test]
    fn test_records_are_json_lines() {
        let dir = tempdir().unwrap();
        let mut logger = TelemetryLogger::with_limits(dir.path(), 10, 10).unwrap();

        logger.log_at(at(0), &reading(0x10)).unwrap();
        logger.log_at(at(1), &reading(0x20)).unwrap();

        let contents = fs::read_to_string(logger.current_file().unwrap()).unwrap();
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["timestamp"], "2024-05-01T12:00:00.000Z");
        assert_eq!(lines[0]["sensor_id"], 0x10);
        assert_eq!(lines[0]["family"], "6in1");
        assert_eq!(lines[0]["sensor_type_name"], "Weather Station");
        assert_eq!(lines[1]["timestamp"], "2024-05-01T12:00:01.000Z");
        assert_eq!(lines[1]["temp_c"], 21.5);
    }

    #[test]
    fn test_rotation_after_max_records() {
        let dir = tempdir().unwrap();
        let mut logger = TelemetryLogger::with_limits(dir.path(), 2, 10).unwrap();

        for i in 0..5 {
            logger.log_at(at(i), &reading(i)).unwrap();
        }

        assert_eq!(
            names(dir.path()),
            vec![
                "readings_20240501T120000Z_0000.jsonl",
                "readings_20240501T120002Z_0001.jsonl",
                "readings_20240501T120004Z_0002.jsonl",
            ]
        );

        let last = fs::read_to_string(logger.current_file().unwrap()).unwrap();
        assert_eq!(last.lines().count(), 1);
    }

    #[test]
    fn test_oldest_files_deleted() {
        let dir = tempdir().unwrap();
        let mut logger = TelemetryLogger::with_limits(dir.path(), 1, 2).unwrap();

        for i in 0..4 {
            logger.log_at(at(i), &reading(i)).unwrap();
        }

        assert_eq!(
            names(dir.path()),
            vec![
                "readings_20240501T120002Z_0002.jsonl",
                "readings_20240501T120003Z_0003.jsonl",
            ]
        );
    }

    #[test]
    fn test_unrelated_files_untouched() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "keep").unwrap();
        let mut logger = TelemetryLogger::with_limits(dir.path(), 1, 1).unwrap();

        for i in 0..3 {
            logger.log_at(at(i), &reading(i)).unwrap();
        }

        assert!(dir.path().join("notes.txt").exists());
        assert_eq!(names(dir.path()).len(), 1);
    }

    #[test]
    fn test_new_from_config() {
        let dir = tempdir().unwrap();
        let config = TelemetryConfig {
            log_dir: dir.path().join("logs").to_string_lossy().into_owned(),
            ..TelemetryConfig::default()
        };

        let mut logger = TelemetryLogger::new(&config).unwrap();
        logger.log(&reading(7)).unwrap();
        logger.close().unwrap();

        assert_eq!(names(&dir.path().join("logs")).len(), 1);
    }
}
