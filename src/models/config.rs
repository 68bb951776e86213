//! Configuration types for the dashboard.
//!
//! Configuration is layered: built-in defaults, then `/etc/qdash/config.toml`,
//! then the per-user file, then `QDASH_*` environment variables. Command-line
//! flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// System-wide config file location.
const SYSTEM_CONFIG_PATH: &str = "/etc/qdash/config.toml";

/// Default refresh period of the dashboard, in seconds.
pub const DEFAULT_REFRESH_SECS: u64 = 30;

/// Minimum allowed refresh interval in seconds (prevents tight polling loops)
const MIN_REFRESH_INTERVAL: u64 = 1;

/// Configuration could not be loaded (only raised in strict mode).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("could not read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid value '{value}' for {var}: {reason}")]
    Env {
        var: &'static str,
        value: String,
        reason: String,
    },
    #[error("{0}")]
    Invalid(String),
}

/// Dashboard configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub source: SourceConfig,

    pub refresh: RefreshConfig,

    pub display: DisplayConfig,

    pub export: ExportConfig,
}

/// Where snapshots come from
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    /// JSON snapshot document re-read on every refresh.
    /// If not set, the built-in demo data set is used.
    pub snapshot_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Refresh period in seconds
    pub interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_REFRESH_SECS,
        }
    }
}

impl RefreshConfig {
    /// Validate refresh configuration values.
    /// Returns a list of warnings for invalid values that were corrected to defaults.
    /// If `strict` is true, returns Err instead of correcting values.
    pub fn validate(&mut self, strict: bool) -> Result<Vec<String>, ConfigError> {
        let mut warnings = Vec::new();

        if self.interval_secs < MIN_REFRESH_INTERVAL {
            let msg = format!(
                "refresh.interval_secs must be at least {MIN_REFRESH_INTERVAL} second(s), got {}",
                self.interval_secs
            );
            if strict {
                return Err(ConfigError::Invalid(msg));
            }
            warnings.push(format!("{msg} - using default ({DEFAULT_REFRESH_SECS})"));
            self.interval_secs = DEFAULT_REFRESH_SECS;
        }

        Ok(warnings)
    }

    #[must_use]
    pub fn period(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Theme name ("dark" or "light")
    pub theme: String,

    /// Status filter applied on startup ("all", "running", ...)
    pub default_filter: String,

    /// Maximum length for job ids in tables before truncation
    pub id_max_length: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            default_filter: "all".to_string(),
            id_max_length: 24,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory exported files are written to (default: current directory)
    pub directory: Option<PathBuf>,
}

impl ExportConfig {
    #[must_use]
    pub fn directory_or_cwd(&self) -> PathBuf {
        self.directory.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}

impl DashboardConfig {
    /// Get the user config file path, respecting XDG_CONFIG_HOME
    ///
    /// Resolution order:
    /// 1. $XDG_CONFIG_HOME/qdash/config.toml (if XDG_CONFIG_HOME is set)
    /// 2. $HOME/.config/qdash/config.toml (if HOME is set)
    /// 3. dirs::config_dir()/qdash/config.toml
    #[must_use]
    pub fn user_config_path() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME")
            && !xdg_config.is_empty()
        {
            return Some(PathBuf::from(xdg_config).join("qdash/config.toml"));
        }

        if let Some(home) = std::env::var_os("HOME") {
            return Some(PathBuf::from(home).join(".config/qdash/config.toml"));
        }

        dirs::config_dir().map(|dir| dir.join("qdash/config.toml"))
    }

    /// Load configuration from files and environment.
    /// Returns the config and any warnings encountered during loading.
    pub fn load() -> Result<(Self, Vec<String>), ConfigError> {
        let mut config = Self::default();
        let mut warnings = Vec::new();
        let strict = Self::is_strict_mode();

        config.load_config_file(Path::new(SYSTEM_CONFIG_PATH), strict, &mut warnings)?;

        if let Some(user_path) = Self::user_config_path() {
            config.load_config_file(&user_path, strict, &mut warnings)?;
        }

        config.apply_overrides(|var| std::env::var(var).ok(), strict, &mut warnings)?;
        warnings.extend(config.refresh.validate(strict)?);

        Ok((config, warnings))
    }

    /// Check if strict config mode is enabled via QDASH_STRICT_CONFIG
    fn is_strict_mode() -> bool {
        std::env::var("QDASH_STRICT_CONFIG")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    /// Merge a config file into `self`. Missing files are not an error; other
    /// failures become warnings, or errors in strict mode.
    pub fn load_config_file(
        &mut self,
        path: &Path,
        strict: bool,
        warnings: &mut Vec<String>,
    ) -> Result<(), ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<DashboardConfig>(&content) {
                Ok(parsed) => {
                    tracing::debug!("Loaded config from {}", path.display());
                    self.merge(parsed);
                }
                Err(source) => {
                    let err = ConfigError::Parse {
                        path: path.to_path_buf(),
                        source,
                    };
                    if strict {
                        return Err(err);
                    }
                    warnings.push(err.to_string());
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                let err = ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                };
                if strict {
                    return Err(err);
                }
                warnings.push(err.to_string());
            }
        }
        Ok(())
    }

    fn merge(&mut self, other: DashboardConfig) {
        // Paths set by an earlier layer survive a later file that leaves them unset
        self.source.snapshot_path = other
            .source
            .snapshot_path
            .or(self.source.snapshot_path.take());
        self.export.directory = other.export.directory.or(self.export.directory.take());
        self.refresh = other.refresh;
        self.display = other.display;
    }

    /// Apply `QDASH_*` overrides. `lookup` resolves a variable name to its value.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
        strict: bool,
        warnings: &mut Vec<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = lookup("QDASH_SNAPSHOT")
            && !val.is_empty()
        {
            self.source.snapshot_path = Some(PathBuf::from(val));
        }

        if let Some(val) = lookup("QDASH_REFRESH") {
            match val.parse::<u64>() {
                Ok(secs) if secs >= MIN_REFRESH_INTERVAL => self.refresh.interval_secs = secs,
                Ok(_) => report_env_error(
                    strict,
                    warnings,
                    "QDASH_REFRESH",
                    &val,
                    format!("must be at least {MIN_REFRESH_INTERVAL} second(s)"),
                )?,
                Err(_) => report_env_error(
                    strict,
                    warnings,
                    "QDASH_REFRESH",
                    &val,
                    "expected a positive integer (seconds)".to_string(),
                )?,
            }
        }

        if let Some(val) = lookup("QDASH_THEME") {
            self.display.theme = val;
        }

        if let Some(val) = lookup("QDASH_EXPORT_DIR")
            && !val.is_empty()
        {
            self.export.directory = Some(PathBuf::from(val));
        }

        Ok(())
    }
}

fn report_env_error(
    strict: bool,
    warnings: &mut Vec<String>,
    var: &'static str,
    value: &str,
    reason: String,
) -> Result<(), ConfigError> {
    let err = ConfigError::Env {
        var,
        value: value.to_string(),
        reason,
    };
    if strict {
        return Err(err);
    }
    warnings.push(format!("{err} - using default"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn temp_config(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "qdash_config_{}_{}.toml",
            name,
            std::process::id()
        ));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.refresh.interval_secs, 30);
        assert_eq!(config.display.default_filter, "all");
        assert!(config.source.snapshot_path.is_none());
    }

    #[test]
    fn test_refresh_validate_zero_interval_corrected() {
        let mut refresh = RefreshConfig { interval_secs: 0 };
        let warnings = refresh.validate(false).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("interval_secs"));
        assert_eq!(refresh.interval_secs, DEFAULT_REFRESH_SECS);
    }

    #[test]
    fn test_refresh_validate_strict_mode_error() {
        let mut refresh = RefreshConfig { interval_secs: 0 };
        let err = refresh.validate(true).unwrap_err();
        assert!(err.to_string().contains("at least 1"));
    }

    #[test]
    fn test_refresh_validate_valid() {
        let mut refresh = RefreshConfig { interval_secs: 1 };
        assert!(refresh.validate(true).unwrap().is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = DashboardConfig::default();
        let mut warnings = Vec::new();
        config
            .apply_overrides(
                lookup_from(&[
                    ("QDASH_REFRESH", "10"),
                    ("QDASH_THEME", "light"),
                    ("QDASH_SNAPSHOT", "/tmp/snap.json"),
                ]),
                false,
                &mut warnings,
            )
            .unwrap();
        assert!(warnings.is_empty());
        assert_eq!(config.refresh.interval_secs, 10);
        assert_eq!(config.display.theme, "light");
        assert_eq!(
            config.source.snapshot_path,
            Some(PathBuf::from("/tmp/snap.json"))
        );
    }

    #[test]
    fn test_env_override_invalid_refresh_warns() {
        let mut config = DashboardConfig::default();
        let mut warnings = Vec::new();
        config
            .apply_overrides(lookup_from(&[("QDASH_REFRESH", "soon")]), false, &mut warnings)
            .unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("QDASH_REFRESH"));
        assert_eq!(config.refresh.interval_secs, DEFAULT_REFRESH_SECS);
    }

    #[test]
    fn test_env_override_invalid_refresh_strict() {
        let mut config = DashboardConfig::default();
        let mut warnings = Vec::new();
        let result =
            config.apply_overrides(lookup_from(&[("QDASH_REFRESH", "0")]), true, &mut warnings);
        assert!(matches!(result, Err(ConfigError::Env { .. })));
    }

    #[test]
    fn test_load_config_file_merges() {
        let path = temp_config(
            "merge",
            "[refresh]\ninterval_secs = 5\n\n[display]\ntheme = \"light\"\n",
        );
        let mut config = DashboardConfig::default();
        config.export.directory = Some(PathBuf::from("/srv/exports"));
        let mut warnings = Vec::new();
        config.load_config_file(&path, false, &mut warnings).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(warnings.is_empty());
        assert_eq!(config.refresh.interval_secs, 5);
        assert_eq!(config.display.theme, "light");
        // Unset in the file, so the earlier layer wins
        assert_eq!(config.export.directory, Some(PathBuf::from("/srv/exports")));
    }

    #[test]
    fn test_load_config_file_parse_error_is_warning() {
        let path = temp_config("broken", "[refresh\ninterval_secs = ");
        let mut config = DashboardConfig::default();
        let mut warnings = Vec::new();
        config.load_config_file(&path, false, &mut warnings).unwrap();
        let strict = config.load_config_file(&path, true, &mut Vec::new());
        std::fs::remove_file(&path).ok();

        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("failed to parse"));
        assert!(matches!(strict, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_load_config_file_missing_is_silent() {
        let mut config = DashboardConfig::default();
        let mut warnings = Vec::new();
        config
            .load_config_file(Path::new("/nonexistent/qdash.toml"), true, &mut warnings)
            .unwrap();
        assert!(warnings.is_empty());
    }
}
