//! Logging setup - console output plus a size-rotating log file.
//!
//! Log lines go through `tracing-appender`'s non-blocking worker into a
//! [`RotatingFile`], which moves `name.log` to `name.log.1` (and so on, up to
//! [`LOG_BACKUPS`]) once it would grow past [`MAX_LOG_BYTES`].

use crate::{
    config::BotConfig,
    errors::{Error, Result},
};
use chrono::Utc;
use chrono_tz::Tz;
use std::{
    ffi::OsString,
    fmt,
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{format::Writer, time::FormatTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Size at which the log file is rotated.
pub const MAX_LOG_BYTES: u64 = 5 * 1024 * 1024;
/// Number of rotated files kept next to the live one.
pub const LOG_BACKUPS: usize = 10;
/// Timestamp format of every log line.
pub const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Installs the global tracing subscriber.
///
/// The returned guard flushes the file writer when dropped, so keep it alive
/// for the lifetime of the process.
pub fn init(config: &BotConfig) -> Result<WorkerGuard> {
    let tz = config.timezone.parse::<Tz>().unwrap_or(Tz::UTC);
    let file = RotatingFile::open(config.log_file(), MAX_LOG_BYTES, LOG_BACKUPS)?;
    let (file_writer, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(false)
                .with_timer(ZonedTimer::new(tz)),
        )
        .with(tracing_subscriber::fmt::layer().with_timer(ZonedTimer::new(tz)))
        .try_init()
        .map_err(|e| Error::Config {
            message: format!("Failed to install tracing subscriber: {e}"),
        })?;

    Ok(guard)
}

/// Formats log timestamps in a fixed timezone.
#[derive(Debug, Clone, Copy)]
pub struct ZonedTimer {
    tz: Tz,
}

impl ZonedTimer {
    /// A timer printing local time in `tz`.
    #[must_use]
    pub const fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl FormatTime for ZonedTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        write!(
            w,
            "{}",
            Utc::now().with_timezone(&self.tz).format(LOG_TIME_FORMAT)
        )
    }
}

/// An append-only file that rotates itself by size.
#[derive(Debug)]
pub struct RotatingFile {
    path: PathBuf,
    max_bytes: u64,
    backups: usize,
    file: File,
    written: u64,
}

impl RotatingFile {
    /// Opens (creating if needed) the log file and its parent directories.
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, backups: usize) -> io::Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = open_append(&path)?;
        let written = file.metadata()?.len();
        Ok(Self {
            path,
            max_bytes,
            backups,
            file,
            written,
        })
    }

    /// Path of the `index`-th backup, e.g. `bot.log.3`.
    #[must_use]
    pub fn backup_path(&self, index: usize) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(format!(".{index}"));
        PathBuf::from(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.backups == 0 {
            self.file.set_len(0)?;
        } else {
            let oldest = self.backup_path(self.backups);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for index in (1..self.backups).rev() {
                let from = self.backup_path(index);
                if from.exists() {
                    fs::rename(&from, self.backup_path(index + 1))?;
                }
            }
            fs::rename(&self.path, self.backup_path(1))?;
        }

        self.file = open_append(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_missing_log_file() -> Result<()> {
        let root = TempDir::new()?;
        let path = root.path().join("files").join("logs").join("bot.log");

        RotatingFile::open(&path, 100, 2)?;

        assert!(path.is_file());
        Ok(())
    }

    #[test]
    fn test_rotates_when_threshold_is_crossed() -> Result<()> {
        let root = TempDir::new()?;
        let path = root.path().join("bot.log");
        let mut file = RotatingFile::open(&path, 10, 2)?;

        file.write_all(b"first-line")?;
        file.write_all(b"second")?;
        file.flush()?;

        assert_eq!(fs::read_to_string(&path)?, "second");
        assert_eq!(fs::read_to_string(file.backup_path(1))?, "first-line");
        Ok(())
    }

    #[test]
    fn test_keeps_only_configured_backups() -> Result<()> {
        let root = TempDir::new()?;
        let path = root.path().join("bot.log");
        let mut file = RotatingFile::open(&path, 4, 2)?;

        for chunk in [b"aaaa", b"bbbb", b"cccc", b"dddd"] {
            file.write_all(chunk)?;
        }
        file.flush()?;

        assert_eq!(fs::read_to_string(&path)?, "dddd");
        assert_eq!(fs::read_to_string(file.backup_path(1))?, "cccc");
        assert_eq!(fs::read_to_string(file.backup_path(2))?, "bbbb");
        assert!(!file.backup_path(3).exists());
        Ok(())
    }

    #[test]
    fn test_existing_size_counts_towards_threshold() -> Result<()> {
        let root = TempDir::new()?;
        let path = root.path().join("bot.log");
        fs::write(&path, "12345678")?;

        let mut file = RotatingFile::open(&path, 10, 1)?;
        file.write_all(b"abc")?;
        file.flush()?;

        assert_eq!(fs::read_to_string(&path)?, "abc");
        assert_eq!(fs::read_to_string(file.backup_path(1))?, "12345678");
        Ok(())
    }

    #[test]
    fn test_zero_backups_truncates_in_place() -> Result<()> {
        let root = TempDir::new()?;
        let path = root.path().join("bot.log");
        let mut file = RotatingFile::open(&path, 4, 0)?;

        file.write_all(b"aaaa")?;
        file.write_all(b"bb")?;
        file.flush()?;

        assert_eq!(fs::read_to_string(&path)?, "bb");
        assert!(!file.backup_path(1).exists());
        Ok(())
    }

    #[test]
    fn test_timer_uses_fixed_format() {
        let mut out = String::new();
        ZonedTimer::new(Tz::Europe__Amsterdam)
            .format_time(&mut Writer::new(&mut out))
            .ok();
        // e.g. "2024-05-01 13:37:00"
        assert_eq!(out.len(), 19);
        assert_eq!(&out[4..5], "-");
        assert_eq!(&out[10..11], " ");
    }
}
