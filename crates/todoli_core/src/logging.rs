//! Process-wide log sink for the list engine.
//!
//! # Responsibility
//! - Route every `log` record from the core into daily log files under one
//!   directory, with a bounded number of days kept.
//! - Record panics as log events before the default hook runs.
//!
//! # Invariants
//! - The sink is started at most once per process; later calls only succeed
//!   when they ask for the same directory and level.
//! - Starting the sink never panics.
//! - Retention is between 1 and 365 days.

use flexi_logger::{Age, Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "todoli";
const PANIC_SUMMARY_LIMIT: usize = 160;

/// Days of logs kept when the caller does not choose.
pub const DEFAULT_MAX_AGE_DAYS: usize = 7;
/// Accepted range for the retention setting.
pub const MAX_AGE_DAYS_RANGE: std::ops::RangeInclusive<usize> = 1..=365;

static ACTIVE_SINK: OnceCell<ActiveSink> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Validated sink configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LogSettings {
    level: &'static str,
    dir: PathBuf,
    max_age_days: usize,
}

impl LogSettings {
    fn parse(level: &str, dir: &str, max_age_days: usize) -> Result<Self, String> {
        let level = parse_level(level)?;
        let dir = parse_dir(dir)?;
        if !MAX_AGE_DAYS_RANGE.contains(&max_age_days) {
            return Err(format!(
                "max_age_days must be within 1..=365, got {max_age_days}"
            ));
        }
        Ok(Self {
            level,
            dir,
            max_age_days,
        })
    }

    fn start(&self) -> Result<LoggerHandle, String> {
        std::fs::create_dir_all(&self.dir)
            .map_err(|err| format!("cannot create log directory `{}`: {err}", self.dir.display()))?;

        Logger::try_with_str(self.level)
            .map_err(|err| format!("logger rejected level `{}`: {err}", self.level))?
            .log_to_file(
                FileSpec::default()
                    .directory(self.dir.as_path())
                    .basename(LOG_FILE_BASENAME),
            )
            .rotate(
                Criterion::Age(Age::Day),
                Naming::Timestamps,
                Cleanup::KeepLogFiles(self.max_age_days),
            )
            .write_mode(WriteMode::BufferAndFlush)
            .append()
            .format_for_files(flexi_logger::detailed_format)
            .start()
            .map_err(|err| format!("cannot start log sink: {err}"))
    }
}

struct ActiveSink {
    settings: LogSettings,
    _handle: LoggerHandle,
}

impl ActiveSink {
    fn ensure_compatible(&self, requested: &LogSettings) -> Result<(), String> {
        if self.settings.dir != requested.dir {
            return Err(format!(
                "log sink already writes to `{}`; refusing to switch to `{}`",
                self.settings.dir.display(),
                requested.dir.display()
            ));
        }
        if self.settings.level != requested.level {
            return Err(format!(
                "log sink already runs at `{}`; refusing to switch to `{}`",
                self.settings.level, requested.level
            ));
        }
        Ok(())
    }
}

/// Starts the log sink keeping [`DEFAULT_MAX_AGE_DAYS`] days of files.
pub fn init_logging(level: &str, log_dir: &str) -> Result<(), String> {
    init_logging_with_retention(level, log_dir, DEFAULT_MAX_AGE_DAYS)
}

/// Starts the log sink in `log_dir`, keeping `max_age_days` daily files.
///
/// # Errors
/// Returns a readable message when `level` is not one of
/// `trace|debug|info|warn|error`, when `log_dir` is empty or relative, when
/// `max_age_days` is out of range, when the directory cannot be created, or
/// when a sink with a different directory or level is already running.
pub fn init_logging_with_retention(
    level: &str,
    log_dir: &str,
    max_age_days: usize,
) -> Result<(), String> {
    let requested = LogSettings::parse(level, log_dir, max_age_days)?;

    let sink = ACTIVE_SINK.get_or_try_init(|| -> Result<ActiveSink, String> {
        let handle = requested.start()?;
        install_panic_hook();
        info!(
            "event=app_start module=core status=ok platform={} build_mode={} version={}",
            std::env::consts::OS,
            if cfg!(debug_assertions) { "debug" } else { "release" },
            env!("CARGO_PKG_VERSION")
        );
        info!(
            "event=log_init module=core status=ok level={} log_dir={} max_age_days={}",
            requested.level,
            requested.dir.display(),
            requested.max_age_days
        );
        Ok(ActiveSink {
            settings: requested.clone(),
            _handle: handle,
        })
    })?;

    sink.ensure_compatible(&requested)
}

/// Returns `(level, log_dir)` of the running sink, if any.
pub fn logging_status() -> Option<(&'static str, PathBuf)> {
    ACTIVE_SINK
        .get()
        .map(|sink| (sink.settings.level, sink.settings.dir.clone()))
}

/// `debug` for debug builds, `info` otherwise.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn parse_level(level: &str) -> Result<&'static str, String> {
    let level = level.trim().to_ascii_lowercase();
    let parsed = match level.as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => {
            return Err(format!(
                "unknown log level `{level}`; use trace, debug, info, warn or error"
            ))
        }
    };
    Ok(parsed)
}

fn parse_dir(dir: &str) -> Result<PathBuf, String> {
    let dir = dir.trim();
    if dir.is_empty() {
        return Err("log directory is empty".to_string());
    }
    if !Path::new(dir).is_absolute() {
        return Err(format!("log directory must be absolute, got `{dir}`"));
    }
    Ok(PathBuf::from(dir))
}

fn install_panic_hook() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map_or_else(|| "unknown".to_string(), |loc| format!("{}:{}", loc.file(), loc.line()));
        let payload = panic_info
            .payload()
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| panic_info.payload().downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location,
            one_line(&payload, PANIC_SUMMARY_LIMIT)
        );
        previous(panic_info);
    }));
}

// Panic text can carry task titles; keep it to one short line.
fn one_line(text: &str, limit: usize) -> String {
    let flat = text.replace(['\n', '\r'], " ");
    let mut short: String = flat.chars().take(limit).collect();
    if flat.chars().count() > limit {
        short.push_str("...");
    }
    short
}
