//! Rolling file logs for planner processes.
//!
//! # Responsibility
//! - Start one `flexi_logger` file backend per process from `LogSettings`.
//! - Record panics as single-line events before the default hook runs.
//!
//! # Invariants
//! - A second `init_logging` with equal settings is a no-op; different
//!   settings are refused with `LoggingError::AlreadyActive`.
//! - Events are `key=value` metadata; goal and action-item text never
//!   appears in logs.

use flexi_logger::{
    Cleanup, Criterion, FileSpec, FlexiLoggerError, Logger, LoggerHandle, Naming, WriteMode,
};
use log::{error, info, LevelFilter};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

const LOG_FILE_BASENAME: &str = "mandalart";
const PANIC_SUMMARY_CHARS: usize = 120;

static ACTIVE: OnceCell<ActiveLogger> = OnceCell::new();

struct ActiveLogger {
    settings: LogSettings,
    _handle: LoggerHandle,
}

/// Where and how much to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LevelFilter,
    /// Absolute directory; created when missing.
    pub log_dir: PathBuf,
    /// Size at which the active file rotates.
    pub max_file_bytes: u64,
    /// Rotated files kept besides the active one.
    pub keep_files: usize,
}

impl LogSettings {
    /// Settings with 10 MiB rotation keeping 5 files.
    pub fn new(level: LevelFilter, log_dir: impl Into<PathBuf>) -> Self {
        Self {
            level,
            log_dir: log_dir.into(),
            max_file_bytes: 10 * 1024 * 1024,
            keep_files: 5,
        }
    }

    /// Parses a level name such as `info` or `WARN`.
    pub fn parse_level(value: &str) -> Result<LevelFilter, LoggingError> {
        LevelFilter::from_str(value.trim())
            .map_err(|_| LoggingError::InvalidLevel(value.trim().to_string()))
    }
}

/// Logging bootstrap failure.
#[derive(Debug)]
pub enum LoggingError {
    InvalidLevel(String),
    RelativeDir(PathBuf),
    CreateDir {
        dir: PathBuf,
        source: std::io::Error,
    },
    Backend(FlexiLoggerError),
    /// Logging already runs with other settings.
    AlreadyActive { level: LevelFilter, log_dir: PathBuf },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLevel(value) => write!(
                f,
                "unsupported log level `{value}`; expected off|error|warn|info|debug|trace"
            ),
            Self::RelativeDir(dir) => {
                write!(f, "log directory must be absolute, got `{}`", dir.display())
            }
            Self::CreateDir { dir, source } => write!(
                f,
                "failed to create log directory `{}`: {source}",
                dir.display()
            ),
            Self::Backend(err) => write!(f, "failed to start logger: {err}"),
            Self::AlreadyActive { level, log_dir } => write!(
                f,
                "logging already active at level {level} in `{}`",
                log_dir.display()
            ),
        }
    }
}

impl Error for LoggingError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

/// `debug` in debug builds, `info` otherwise.
pub fn default_log_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// `<temp>/mandalart/logs`.
pub fn default_log_dir() -> PathBuf {
    std::env::temp_dir().join("mandalart").join("logs")
}

/// Starts file logging.
///
/// # Errors
/// - `RelativeDir` / `CreateDir` for an unusable directory.
/// - `Backend` when `flexi_logger` cannot start.
/// - `AlreadyActive` when a previous call used different settings.
pub fn init_logging(settings: &LogSettings) -> Result<(), LoggingError> {
    if !settings.log_dir.is_absolute() {
        return Err(LoggingError::RelativeDir(settings.log_dir.clone()));
    }

    let active = ACTIVE.get_or_try_init(|| start_logger(settings))?;
    if active.settings != *settings {
        return Err(LoggingError::AlreadyActive {
            level: active.settings.level,
            log_dir: active.settings.log_dir.clone(),
        });
    }
    Ok(())
}

/// Active `(level, log_dir)`, or `None` before `init_logging` succeeded.
pub fn logging_status() -> Option<(LevelFilter, PathBuf)> {
    ACTIVE
        .get()
        .map(|active| (active.settings.level, active.settings.log_dir.clone()))
}

fn start_logger(settings: &LogSettings) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&settings.log_dir).map_err(|source| LoggingError::CreateDir {
        dir: settings.log_dir.clone(),
        source,
    })?;

    let handle = Logger::with(settings.level)
        .log_to_file(
            FileSpec::default()
                .directory(settings.log_dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(settings.max_file_bytes),
            Naming::Numbers,
            Cleanup::KeepLogFiles(settings.keep_files),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(LoggingError::Backend)?;

    install_panic_hook();
    info!(
        "event=logging_init module=logging status=ok version={} level={} log_dir={}",
        env!("CARGO_PKG_VERSION"),
        settings.level,
        settings.log_dir.display()
    );

    Ok(ActiveLogger {
        settings: settings.clone(),
        _handle: handle,
    })
}

// Runs at most once: only reached from the `ACTIVE` initializer.
fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        error!(
            "event=panic module=logging status=error location={} payload={}",
            location,
            panic_summary(panic_info.payload())
        );
        previous(panic_info);
    }));
}

fn panic_summary(payload: &(dyn std::any::Any + Send)) -> String {
    let text = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload");
    single_line(text, PANIC_SUMMARY_CHARS)
}

fn single_line(text: &str, max_chars: usize) -> String {
    let mut out: String = text
        .chars()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .take(max_chars)
        .collect();
    if text.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_level_is_case_insensitive() {
        assert_eq!(LogSettings::parse_level(" INFO ").unwrap(), LevelFilter::Info);
        assert!(matches!(
            LogSettings::parse_level("loud"),
            Err(LoggingError::InvalidLevel(value)) if value == "loud"
        ));
    }

    #[test]
    fn relative_directory_is_rejected() {
        let settings = LogSettings::new(LevelFilter::Info, "logs/dev");
        assert!(matches!(
            init_logging(&settings),
            Err(LoggingError::RelativeDir(_))
        ));
    }

    #[test]
    fn panic_summary_is_single_line_and_capped() {
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("a\nb\rc"));
        assert_eq!(panic_summary(payload.as_ref()), "a b c");
        assert_eq!(single_line("abcdef", 3), "abc...");
    }

    #[test]
    fn init_is_idempotent_and_refuses_other_settings() {
        let dir = std::env::temp_dir().join(format!("mandalart-logging-{}", std::process::id()));
        let settings = LogSettings::new(LevelFilter::Info, &dir);

        init_logging(&settings).unwrap();
        init_logging(&settings).unwrap();

        let louder = LogSettings {
            level: LevelFilter::Debug,
            ..settings.clone()
        };
        assert!(matches!(
            init_logging(&louder),
            Err(LoggingError::AlreadyActive { level: LevelFilter::Info, .. })
        ));

        let (level, log_dir) = logging_status().unwrap();
        assert_eq!(level, LevelFilter::Info);
        assert_eq!(log_dir, dir);
    }
}
