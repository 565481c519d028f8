//! Shared logging setup for ContractFlow binaries.

use anyhow::{anyhow, Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub const DEFAULT_LOG_FILTER: &str = "contractflow=info,contractflow_store=info";
const HOME_ENV: &str = "CONTRACTFLOW_HOME";
const MAX_LOG_FILES: usize = 5;
const MAX_LOG_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Logging configuration for one binary.
#[derive(Debug, Clone)]
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    /// Mirror the file filter on stderr instead of warnings only
    pub verbose: bool,
    pub log_to_file: bool,
    /// Filter used when `RUST_LOG` is unset
    pub filter: Option<&'a str>,
}

impl<'a> LogConfig<'a> {
    pub fn new(app_name: &'a str) -> Self {
        Self {
            app_name,
            verbose: false,
            log_to_file: true,
            filter: None,
        }
    }
}

/// Install the global subscriber: stderr always, plus a size-rolled file
/// under [`logs_dir`] when enabled.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let base_filter = config.filter.unwrap_or(DEFAULT_LOG_FILTER);
    let file_filter = || {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(base_filter))
    };
    let console_filter = if config.verbose {
        file_filter()
    } else {
        EnvFilter::new("warn")
    };

    let console = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let file = if config.log_to_file {
        let dir = ensure_logs_dir()?;
        let writer = SharedLogWriter::open(&dir, config.app_name)?;
        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(file_filter()),
        )
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| anyhow!("Failed to install tracing subscriber: {}", e))
}

/// The ContractFlow home directory: `$CONTRACTFLOW_HOME` or `~/.contractflow`.
pub fn contractflow_home() -> Result<PathBuf> {
    if let Some(path) = std::env::var_os(HOME_ENV) {
        return Ok(PathBuf::from(path));
    }
    dirs::home_dir()
        .map(|home| home.join(".contractflow"))
        .context("Could not determine home directory; set CONTRACTFLOW_HOME")
}

/// The logs directory: `<home>/logs`.
pub fn logs_dir() -> Result<PathBuf> {
    Ok(contractflow_home()?.join("logs"))
}

pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir()?;
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}

// ============================================================================
// Size-rolled log file
// ============================================================================

/// Append-only log file that shifts `<name>.log` to `<name>.log.1` (and so
/// on, keeping `keep` files in total) once it would exceed `max_bytes`.
struct RollingLog {
    dir: PathBuf,
    stem: String,
    keep: usize,
    max_bytes: u64,
    file: Option<File>,
    written: u64,
}

impl RollingLog {
    fn open(dir: &Path, name: &str, keep: usize, max_bytes: u64) -> io::Result<Self> {
        fs::create_dir_all(dir)?;
        let mut log = Self {
            dir: dir.to_path_buf(),
            stem: file_stem(name),
            keep: keep.max(1),
            max_bytes,
            file: None,
            written: 0,
        };
        log.reopen()?;
        if log.written > log.max_bytes {
            log.roll()?;
        }
        Ok(log)
    }

    fn path(&self, generation: usize) -> PathBuf {
        match generation {
            0 => self.dir.join(format!("{}.log", self.stem)),
            n => self.dir.join(format!("{}.log.{}", self.stem, n)),
        }
    }

    fn reopen(&mut self) -> io::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path(0))?;
        self.written = file.metadata()?.len();
        self.file = Some(file);
        Ok(())
    }

    fn roll(&mut self) -> io::Result<()> {
        if let Some(mut file) = self.file.take() {
            let _ = file.flush();
        }

        let oldest = self.keep - 1;
        if oldest > 0 {
            let doomed = self.path(oldest);
            if doomed.exists() {
                fs::remove_file(doomed)?;
            }
            for generation in (0..oldest).rev() {
                let from = self.path(generation);
                if from.exists() {
                    fs::rename(from, self.path(generation + 1))?;
                }
            }
        } else {
            fs::remove_file(self.path(0)).or_else(ignore_missing)?;
        }

        self.reopen()
    }
}

fn ignore_missing(err: io::Error) -> io::Result<()> {
    if err.kind() == io::ErrorKind::NotFound {
        Ok(())
    } else {
        Err(err)
    }
}

impl Write for RollingLog {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.roll()?;
        }
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "log file unavailable"))?;
        let n = file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}

/// `MakeWriter` handle shared by every event the file layer formats.
#[derive(Clone)]
struct SharedLogWriter(Arc<Mutex<RollingLog>>);

impl SharedLogWriter {
    fn open(dir: &Path, app_name: &str) -> Result<Self> {
        let log = RollingLog::open(dir, app_name, MAX_LOG_FILES, MAX_LOG_FILE_SIZE)
            .with_context(|| format!("Failed to open log file for {}", app_name))?;
        Ok(Self(Arc::new(Mutex::new(log))))
    }

    fn with_log<T>(&self, f: impl FnOnce(&mut RollingLog) -> io::Result<T>) -> io::Result<T> {
        let mut log = self
            .0
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        f(&mut log)
    }
}

impl Write for SharedLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.with_log(|log| log.write(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.with_log(|log| log.flush())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedLogWriter {
    type Writer = SharedLogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|ch| match ch {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => ch,
            _ => '_',
        })
        .collect();
    if stem.is_empty() {
        "contractflow".to_string()
    } else {
        stem
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem_replaces_separators() {
        assert_eq!(file_stem("contractflow"), "contractflow");
        assert_eq!(file_stem("../evil name"), "___evil_name");
        assert_eq!(file_stem(""), "contractflow");
    }

    #[test]
    fn test_rolls_when_full() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = RollingLog::open(dir.path(), "cli", 3, 16).unwrap();

        log.write_all(b"0123456789\n").unwrap();
        log.write_all(b"abcdefghij\n").unwrap();
        log.write_all(b"ABCDEFGHIJ\n").unwrap();
        log.flush().unwrap();

        let current = fs::read_to_string(dir.path().join("cli.log")).unwrap();
        let previous = fs::read_to_string(dir.path().join("cli.log.1")).unwrap();
        let oldest = fs::read_to_string(dir.path().join("cli.log.2")).unwrap();
        assert_eq!(current, "ABCDEFGHIJ\n");
        assert_eq!(previous, "abcdefghij\n");
        assert_eq!(oldest, "0123456789\n");
    }

    #[test]
    fn test_keeps_at_most_configured_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = RollingLog::open(dir.path(), "cli", 2, 4).unwrap();
        for line in ["aaaa", "bbbb", "cccc", "dddd"] {
            log.write_all(line.as_bytes()).unwrap();
        }
        log.flush().unwrap();

        assert!(dir.path().join("cli.log.1").exists());
        assert!(!dir.path().join("cli.log.2").exists());
        assert_eq!(fs::read_to_string(dir.path().join("cli.log")).unwrap(), "dddd");
    }

    #[test]
    fn test_reopen_appends() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut log = RollingLog::open(dir.path(), "cli", 3, 1024).unwrap();
            log.write_all(b"first\n").unwrap();
        }
        let mut log = RollingLog::open(dir.path(), "cli", 3, 1024).unwrap();
        assert_eq!(log.written, 6);
        log.write_all(b"second\n").unwrap();
        assert_eq!(
            fs::read_to_string(dir.path().join("cli.log")).unwrap(),
            "first\nsecond\n"
        );
    }
}
