//! # Event Log Writer
//!
//! Rotation-capable JSON-lines writer for decoded telemetry events.
//! One event per line in `<base_dir>/telemetry.events`; rotated files are
//! renamed to `telemetry.events.<ms>-<seq>` and optionally gzip-compressed.

use super::EventSink;
use crate::error::TelemetryError;
use crate::types::{now_ms, Event};
use parking_lot::Mutex;
use serde::Deserialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const CURRENT_FILE: &str = "telemetry.events";
const ROTATED_PREFIX: &str = "telemetry.events.";

/// Event log configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EventLogConfig {
    /// Directory for event log files
    pub base_dir: String,

    /// Rotation policy
    pub rotation: RotationPolicy,

    /// Gzip rotated logs
    pub compress_rotated: bool,

    /// Maximum number of rotated files to keep
    pub max_rotated_files: usize,

    /// Buffer size for writes (bytes)
    pub buffer_size: usize,

    /// Flush after every event
    pub immediate_flush: bool,
}

/// File rotation policy
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotationPolicy {
    /// Rotate when file exceeds size (bytes)
    BySize(u64),

    /// Rotate every N seconds
    ByTime(u64),

    /// Rotate daily at midnight UTC
    Daily,

    /// Rotate hourly
    Hourly,

    /// No rotation
    Never,
}

impl Default for EventLogConfig {
    fn default() -> Self {
        EventLogConfig {
            base_dir: "./var/telemetry".to_string(),
            rotation: RotationPolicy::BySize(100 * 1024 * 1024), // 100 MB
            compress_rotated: true,
            max_rotated_files: 10,
            buffer_size: 8192,
            immediate_flush: false,
        }
    }
}

/// Thread-safe event log writer
pub struct EventLogWriter {
    config: EventLogConfig,
    current_file: Mutex<Option<EventLogFile>>,
    base_path: PathBuf,
    rotation_seq: AtomicU64,
}

struct EventLogFile {
    writer: BufWriter<File>,
    path: PathBuf,
    created_at: SystemTime,
    bytes_written: u64,
    events_written: u64,
}

fn epoch_secs(at: SystemTime) -> u64 {
    at.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

impl EventLogWriter {
    /// Create a new writer, creating the base directory when missing.
    pub fn new(config: EventLogConfig) -> Result<Self, TelemetryError> {
        fs::create_dir_all(&config.base_dir)?;

        let base_path = PathBuf::from(&config.base_dir);

        let writer = EventLogWriter {
            config,
            current_file: Mutex::new(None),
            base_path,
            rotation_seq: AtomicU64::new(0),
        };

        writer.rotate_if_needed(true)?;

        Ok(writer)
    }

    /// Append one event as a JSON line.
    pub fn write_event(&self, event: &Event) -> Result<(), TelemetryError> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');
        let bytes = line.as_bytes();

        let mut file_guard = self.current_file.lock();

        if file_guard.is_none() {
            drop(file_guard);
            self.rotate_if_needed(true)?;
            file_guard = self.current_file.lock();
        }

        let mut rotate = false;
        if let Some(ref mut file) = *file_guard {
            file.writer.write_all(bytes)?;

            if self.config.immediate_flush {
                file.writer.flush()?;
            }

            file.bytes_written += bytes.len() as u64;
            file.events_written += 1;
            rotate = self.should_rotate(file);
        }
        drop(file_guard);

        if rotate {
            self.rotate_if_needed(false)?;
        }

        Ok(())
    }

    /// Flush pending writes
    pub fn flush(&self) -> Result<(), TelemetryError> {
        let mut file_guard = self.current_file.lock();

        if let Some(ref mut file) = *file_guard {
            file.writer.flush()?;
        }

        Ok(())
    }

    fn should_rotate(&self, file: &EventLogFile) -> bool {
        let now = SystemTime::now();
        match self.config.rotation {
            RotationPolicy::BySize(max_bytes) => file.bytes_written >= max_bytes,
            RotationPolicy::ByTime(seconds) => {
                let elapsed = now
                    .duration_since(file.created_at)
                    .unwrap_or_default()
                    .as_secs();
                elapsed >= seconds
            }
            RotationPolicy::Daily => epoch_secs(now) / 86400 > epoch_secs(file.created_at) / 86400,
            RotationPolicy::Hourly => epoch_secs(now) / 3600 > epoch_secs(file.created_at) / 3600,
            RotationPolicy::Never => false,
        }
    }

    fn rotate_if_needed(&self, force_create: bool) -> Result<(), TelemetryError> {
        let mut file_guard = self.current_file.lock();

        let should_rotate = match *file_guard {
            Some(ref file) => self.should_rotate(file) || force_create,
            None => force_create,
        };

        if !should_rotate {
            return Ok(());
        }

        if let Some(mut old_file) = file_guard.take() {
            old_file.writer.flush()?;

            let rotated_path = self.generate_rotated_path();
            fs::rename(&old_file.path, &rotated_path)?;

            if self.config.compress_rotated {
                self.compress_file(&rotated_path)?;
            }

            self.cleanup_old_files()?;
        }

        let new_path = self.base_path.join(CURRENT_FILE);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&new_path)?;
        // An existing file from a previous run counts towards the size limit
        let existing_len = file.metadata()?.len();

        *file_guard = Some(EventLogFile {
            writer: BufWriter::with_capacity(self.config.buffer_size, file),
            path: new_path,
            created_at: SystemTime::now(),
            bytes_written: existing_len,
            events_written: 0,
        });

        Ok(())
    }

    /// Unique name for the next rotated file. Several rotations may share a
    /// millisecond, and files left by an earlier run are never overwritten.
    fn generate_rotated_path(&self) -> PathBuf {
        let ms = now_ms();
        loop {
            let seq = self.rotation_seq.fetch_add(1, Ordering::Relaxed);
            let path = self
                .base_path
                .join(format!("{}{:013}-{:06}", ROTATED_PREFIX, ms, seq));

            let mut compressed = path.as_os_str().to_owned();
            compressed.push(".gz");
            if !path.exists() && !Path::new(&compressed).exists() {
                return path;
            }
        }
    }

    /// Gzip a rotated file in place (`<name>.gz`).
    fn compress_file(&self, path: &Path) -> Result<(), TelemetryError> {
        use flate2::write::GzEncoder;
        use flate2::Compression;

        let input = fs::read(path)?;

        let mut output_name = path.as_os_str().to_owned();
        output_name.push(".gz");
        let output_file = File::create(PathBuf::from(output_name))?;

        let mut encoder = GzEncoder::new(output_file, Compression::default());
        encoder.write_all(&input)?;
        encoder.finish()?;

        fs::remove_file(path).ok();

        Ok(())
    }

    /// Keep only the newest `max_rotated_files` rotated files.
    fn cleanup_old_files(&self) -> Result<(), TelemetryError> {
        let mut rotated_files: Vec<PathBuf> = fs::read_dir(&self.base_path)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(|name| name.starts_with(ROTATED_PREFIX))
                    .unwrap_or(false)
            })
            .collect();

        // Names carry the rotation time, newest first
        rotated_files.sort();
        rotated_files.reverse();

        if rotated_files.len() > self.config.max_rotated_files {
            for path in &rotated_files[self.config.max_rotated_files..] {
                fs::remove_file(path).ok();
            }
        }

        Ok(())
    }

    /// Get current file stats
    pub fn stats(&self) -> Option<EventLogStats> {
        let file_guard = self.current_file.lock();
        file_guard.as_ref().map(|file| EventLogStats {
            path: file.path.clone(),
            bytes_written: file.bytes_written,
            events_written: file.events_written,
            created_at: file.created_at,
        })
    }
}

impl EventSink for EventLogWriter {
    fn accept(&self, event: Event) {
        if let Err(e) = self.write_event(&event) {
            log::error!("Failed to write telemetry event to log: {}", e);
        }
    }
}

impl Drop for EventLogWriter {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            log::error!("Failed to flush event log on close: {}", e);
        }
    }
}

/// Statistics for the current event log file
#[derive(Debug, Clone)]
pub struct EventLogStats {
    pub path: PathBuf,
    pub bytes_written: u64,
    pub events_written: u64,
    pub created_at: SystemTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{timestamp_from_millis, TypedValue};

    fn sample_event(octets: u64) -> Event {
        let mut event = Event::new(timestamp_from_millis(1_000), "Cisco-IOS-XR-infra-statsd-oper");
        event.tags.insert("interface_name".into(), "Gi0/0/0/0".into());
        event.fields.insert("bytes_received".into(), TypedValue::Uint64(octets));
        event
    }

    fn config_in(dir: &Path, rotation: RotationPolicy) -> EventLogConfig {
        EventLogConfig {
            base_dir: dir.to_string_lossy().into_owned(),
            rotation,
            immediate_flush: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_writes_json_lines() -> Result<(), TelemetryError> {
        let tmp = tempfile::tempdir()?;
        let writer = EventLogWriter::new(config_in(tmp.path(), RotationPolicy::Never))?;

        writer.write_event(&sample_event(1))?;
        writer.write_event(&sample_event(2))?;

        let content = fs::read_to_string(tmp.path().join(CURRENT_FILE))?;
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: serde_json::Value = serde_json::from_str(lines[1])?;
        assert_eq!(parsed["fields"]["bytes_received"], 2);
        assert_eq!(parsed["tags"]["interface_name"], "Gi0/0/0/0");
        assert_eq!(writer.stats().map(|s| s.events_written), Some(2));

        Ok(())
    }

    #[test]
    fn test_rotates_and_compresses_by_size() -> Result<(), TelemetryError> {
        let tmp = tempfile::tempdir()?;
        let writer = EventLogWriter::new(config_in(tmp.path(), RotationPolicy::BySize(1)))?;

        writer.write_event(&sample_event(1))?;

        let rotated: Vec<String> = fs::read_dir(tmp.path())?
            .filter_map(|e| e.ok())
            .filter_map(|e| e.file_name().to_str().map(String::from))
            .filter(|name| name.starts_with(ROTATED_PREFIX))
            .collect();
        assert_eq!(rotated.len(), 1);
        assert!(rotated[0].ends_with(".gz"));

        // Fresh current file after rotation
        assert_eq!(writer.stats().map(|s| s.events_written), Some(0));

        Ok(())
    }

    fn count_lines(dir: &Path) -> Result<usize, TelemetryError> {
        let mut lines = 0;
        for entry in fs::read_dir(dir)? {
            lines += fs::read_to_string(entry?.path())?.lines().count();
        }
        Ok(lines)
    }

    #[test]
    fn test_rotations_in_same_millisecond_keep_every_event() -> Result<(), TelemetryError> {
        let tmp = tempfile::tempdir()?;
        let writer = EventLogWriter::new(EventLogConfig {
            compress_rotated: false,
            ..config_in(tmp.path(), RotationPolicy::BySize(1))
        })?;

        for octets in 0..5 {
            writer.write_event(&sample_event(octets))?;
        }
        writer.flush()?;

        assert_eq!(count_lines(tmp.path())?, 5);
        Ok(())
    }

    #[test]
    fn test_reopen_counts_existing_bytes() -> Result<(), TelemetryError> {
        let tmp = tempfile::tempdir()?;
        {
            let writer = EventLogWriter::new(config_in(tmp.path(), RotationPolicy::Never))?;
            writer.write_event(&sample_event(1))?;
            writer.write_event(&sample_event(2))?;
        }
        let on_disk = fs::metadata(tmp.path().join(CURRENT_FILE))?.len();
        assert!(on_disk > 0);

        let writer = EventLogWriter::new(config_in(tmp.path(), RotationPolicy::BySize(on_disk + 1)))?;
        assert_eq!(writer.stats().map(|s| s.bytes_written), Some(on_disk));

        // One more event crosses the limit and rotates
        writer.write_event(&sample_event(3))?;
        assert_eq!(writer.stats().map(|s| s.bytes_written), Some(0));
        let rotated = fs::read_dir(tmp.path())?
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(ROTATED_PREFIX))
            .count();
        assert_eq!(rotated, 1);
        Ok(())
    }

    #[test]
    fn test_event_log_config_defaults() {
        let config = EventLogConfig::default();
        assert_eq!(config.rotation, RotationPolicy::BySize(100 * 1024 * 1024));
        assert!(config.compress_rotated);
        assert_eq!(config.max_rotated_files, 10);
    }
}
