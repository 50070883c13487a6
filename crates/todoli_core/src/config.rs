//! Application configuration outside the list engine.
//!
//! # Responsibility
//! - Resolve the per-user store directory.
//! - Persist window geometry and language as a typed key-value document.
//!
//! # Invariants
//! - Config never touches list files; list entities never read config.
//! - Out-of-range values are rejected by setters and replaced by defaults on load.
//! - A missing config file yields defaults, not an error.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const APP_DIR_NAME: &str = "ToDoLi";
const DEBUG_DIR_NAME: &str = "debug";
const LOG_DIR_NAME: &str = "logs";
const CONFIG_FILE_NAME: &str = "config.json";

/// Overrides the store root when set.
pub const HOME_ENV_VAR: &str = "TODOLI_HOME";

pub const MIN_WINDOW_WIDTH: f64 = 500.0;
pub const MIN_WINDOW_HEIGHT: f64 = 300.0;
pub const DEFAULT_WINDOW_WIDTH: f64 = 800.0;
pub const DEFAULT_WINDOW_HEIGHT: f64 = 450.0;
pub const DEFAULT_LANGUAGE: &str = "en-GB";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    NoDataDir,
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoDataDir => write!(
                f,
                "no user data directory available; set {HOME_ENV_VAR}"
            ),
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
            Self::Parse { path, source } => {
                write!(f, "invalid config file {}: {source}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::NoDataDir => None,
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

/// Resolved directories for one application instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreLocation {
    root: PathBuf,
}

impl StoreLocation {
    /// Resolves the default location.
    ///
    /// `$TODOLI_HOME` wins when set; otherwise `<user data dir>/ToDoLi`.
    /// Debug builds use a `debug` subdirectory so they never share lists
    /// with release builds.
    pub fn resolve() -> ConfigResult<Self> {
        let base = match std::env::var_os(HOME_ENV_VAR) {
            Some(home) if !home.is_empty() => PathBuf::from(home),
            _ => dirs::data_dir()
                .ok_or(ConfigError::NoDataDir)?
                .join(APP_DIR_NAME),
        };
        Ok(Self::from_base(base))
    }

    /// Builds a location under an explicit base directory.
    pub fn from_base(base: impl Into<PathBuf>) -> Self {
        let base = base.into();
        let root = if cfg!(debug_assertions) {
            base.join(DEBUG_DIR_NAME)
        } else {
            base
        };
        Self { root }
    }

    /// Directory holding list files.
    pub fn lists_dir(&self) -> &Path {
        &self.root
    }

    pub fn log_dir(&self) -> PathBuf {
        self.root.join(LOG_DIR_NAME)
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join(CONFIG_FILE_NAME)
    }
}

/// Window geometry and UI language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    window_width: f64,
    window_height: f64,
    window_pos_x: f64,
    window_pos_y: f64,
    language: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            window_width: DEFAULT_WINDOW_WIDTH,
            window_height: DEFAULT_WINDOW_HEIGHT,
            window_pos_x: 0.0,
            window_pos_y: 0.0,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl AppConfig {
    /// Loads config from `path`; a missing file yields defaults.
    ///
    /// # Errors
    /// - [`ConfigError::Io`] when the file exists but cannot be read.
    /// - [`ConfigError::Parse`] when the file is not a valid config document.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    "event=config_load module=config status=skip reason=not_found path={}",
                    path.display()
                );
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        let mut config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.sanitize();
        info!(
            "event=config_load module=config status=ok path={}",
            path.display()
        );
        Ok(config)
    }

    /// Writes config to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let text = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, text).map_err(io_error)?;
        info!(
            "event=config_save module=config status=ok path={}",
            path.display()
        );
        Ok(())
    }

    fn sanitize(&mut self) {
        let defaults = Self::default();
        if !self.set_window_width(self.window_width) {
            warn!("event=config_load module=config status=skip reason=window_width_out_of_range");
            self.window_width = defaults.window_width;
        }
        if !self.set_window_height(self.window_height) {
            warn!("event=config_load module=config status=skip reason=window_height_out_of_range");
            self.window_height = defaults.window_height;
        }
        if !self.window_pos_x.is_finite() {
            self.window_pos_x = defaults.window_pos_x;
        }
        if !self.window_pos_y.is_finite() {
            self.window_pos_y = defaults.window_pos_y;
        }
        if self.language.trim().is_empty() {
            self.language = defaults.language;
        }
    }

    pub fn window_width(&self) -> f64 {
        self.window_width
    }

    /// Sets the width; values below 500 are rejected and `false` is returned.
    pub fn set_window_width(&mut self, value: f64) -> bool {
        if value.is_finite() && value >= MIN_WINDOW_WIDTH {
            self.window_width = value;
            true
        } else {
            false
        }
    }

    pub fn window_height(&self) -> f64 {
        self.window_height
    }

    /// Sets the height; values below 300 are rejected and `false` is returned.
    pub fn set_window_height(&mut self, value: f64) -> bool {
        if value.is_finite() && value >= MIN_WINDOW_HEIGHT {
            self.window_height = value;
            true
        } else {
            false
        }
    }

    pub fn window_position(&self) -> (f64, f64) {
        (self.window_pos_x, self.window_pos_y)
    }

    pub fn set_window_position(&mut self, x: f64, y: f64) {
        self.window_pos_x = x;
        self.window_pos_y = y;
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn set_language(&mut self, language: impl Into<String>) {
        self.language = language.into();
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError, StoreLocation, DEFAULT_LANGUAGE, DEFAULT_WINDOW_HEIGHT};

    #[test]
    fn setters_reject_values_below_minimum() {
        let mut config = AppConfig::default();
        assert!(!config.set_window_width(499.0));
        assert_eq!(config.window_width(), 800.0);
        assert!(config.set_window_width(1024.0));
        assert_eq!(config.window_width(), 1024.0);

        assert!(!config.set_window_height(200.0));
        assert!(config.set_window_height(600.0));
        // Height and width are independent.
        assert_eq!(config.window_height(), 600.0);
        assert_eq!(config.window_width(), 1024.0);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn save_then_load_keeps_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.set_window_width(1200.0);
        config.set_window_position(10.0, 20.5);
        config.set_language("de-DE");
        config.save(&path).unwrap();

        assert_eq!(AppConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn partial_and_out_of_range_documents_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"window_height": 10, "language": ""}"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.window_height(), DEFAULT_WINDOW_HEIGHT);
        assert_eq!(config.language(), DEFAULT_LANGUAGE);
    }

    #[test]
    fn unparseable_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            AppConfig::load(&path).unwrap_err(),
            ConfigError::Parse { .. }
        ));
    }

    #[test]
    fn location_derives_subdirectories() {
        let location = StoreLocation::from_base("/data/ToDoLi");
        let root = location.lists_dir().to_path_buf();
        if cfg!(debug_assertions) {
            assert!(root.ends_with("ToDoLi/debug"));
        } else {
            assert!(root.ends_with("ToDoLi"));
        }
        assert_eq!(location.log_dir(), root.join("logs"));
        assert_eq!(location.config_file(), root.join("config.json"));
    }
}
