//! Application configuration.

use super::args::CliArgs;
use crate::domain::errors::ConfigError;
use crate::infrastructure::image::DEFAULT_CAPACITY;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time::Duration;

const APP_NAME: &str = "previewer";
const APP_QUALIFIER: &str = "com";
const APP_ORGANIZATION: &str = "previewer";

const FALLBACK_CACHE_DIR: &str = "./uploads";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        f.write_str(name)
    }
}

/// Listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Interface to bind.
    pub host: String,
    /// TCP port to bind.
    pub port: u16,
}

impl HttpConfig {
    /// Returns the `host:port` bind address.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Upstream fetch settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadingConfig {
    /// Scheme prepended to the scheme-less source URL from the request path.
    pub protocol: String,
    /// Whole-request timeout for one source download.
    pub timeout_secs: u64,
}

impl LoadingConfig {
    /// Returns the fetch timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            protocol: "http".to_string(),
            timeout_secs: crate::infrastructure::image::loader::DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Preview cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of previews kept on disk.
    pub capacity: usize,
    /// Artifact directory. Platform cache dir when unset.
    pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            dir: None,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path. Logs go to stdout when unset.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Listener settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Upstream fetch settings.
    #[serde(default)]
    pub loading: LoadingConfig,

    /// Preview cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: CliArgs) {
        if let Some(config_path) = args.config {
            self.config = Some(config_path);
        }
        if let Some(log_path) = args.log_path {
            self.log_path = Some(log_path);
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(host) = args.host {
            self.http.host = host;
        }
        if let Some(port) = args.port {
            self.http.port = port;
        }
        if let Some(protocol) = args.protocol {
            self.loading.protocol = protocol;
        }
        if let Some(timeout_secs) = args.timeout_secs {
            self.loading.timeout_secs = timeout_secs;
        }
        if let Some(capacity) = args.cache_capacity {
            self.cache.capacity = capacity;
        }
        if let Some(dir) = args.cache_dir {
            self.cache.dir = Some(dir);
        }
    }

    /// Checks every setting the server cannot start without.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.http.port == 0 {
            return Err(invalid("http.port", "must be between 1 and 65535"));
        }
        let protocol = self.loading.protocol.trim();
        if protocol.is_empty() {
            return Err(invalid("loading.protocol", "must not be empty"));
        }
        if !protocol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        {
            return Err(invalid(
                "loading.protocol",
                format!("not a URL scheme: {protocol}"),
            ));
        }
        if self.loading.timeout_secs == 0 {
            return Err(invalid("loading.timeout_secs", "must be positive"));
        }
        if self.cache.capacity == 0 {
            return Err(invalid("cache.capacity", "must be positive"));
        }
        Ok(())
    }

    /// Returns the validated cache capacity.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` when the capacity is zero.
    pub fn cache_capacity(&self) -> Result<NonZeroUsize, ConfigError> {
        NonZeroUsize::new(self.cache.capacity)
            .ok_or_else(|| invalid("cache.capacity", "must be positive"))
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default artifact directory.
    #[must_use]
    pub fn default_cache_dir() -> PathBuf {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME).map_or_else(
            || PathBuf::from(FALLBACK_CACHE_DIR),
            |dirs| dirs.cache_dir().join("previews"),
        )
    }

    /// Returns effective artifact directory.
    #[must_use]
    pub fn effective_cache_dir(&self) -> PathBuf {
        self.cache.dir.clone().unwrap_or_else(Self::default_cache_dir)
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_config_sections() {
        let toml_content = r#"
            log_level = "debug"

            [http]
            host = "0.0.0.0"
            port = 9090

            [loading]
            protocol = "https"

            [cache]
            capacity = 3
            dir = "/var/cache/previews"
        "#;

        let config: AppConfig = toml::from_str(toml_content).expect("Failed to parse config");

        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.http.bind_address(), "0.0.0.0:9090");
        assert_eq!(config.loading.protocol, "https");
        assert_eq!(config.loading.timeout_secs, 5);
        assert_eq!(config.cache.capacity, 3);
        assert_eq!(
            config.effective_cache_dir(),
            PathBuf::from("/var/cache/previews")
        );
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.http.bind_address(), "127.0.0.1:8080");
        assert_eq!(config.loading.protocol, "http");
        assert_eq!(config.loading.timeout(), Duration::from_secs(5));
        assert_eq!(config.cache.capacity, 100);
        assert!(config.log_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config: AppConfig = toml::from_str("[http]\nport = 1234\n").unwrap();

        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.http.port, 1234);
    }

    #[test]
    fn test_cli_args_override_file_values() {
        let mut config = AppConfig::default();
        let args = CliArgs::try_parse_from([
            "previewer",
            "--port",
            "7000",
            "--cache-capacity",
            "5",
            "--protocol",
            "https",
            "--log-level",
            "warn",
        ])
        .unwrap();

        config.merge_with_args(args);

        assert_eq!(config.http.port, 7000);
        assert_eq!(config.http.host, "127.0.0.1");
        assert_eq!(config.cache.capacity, 5);
        assert_eq!(config.loading.protocol, "https");
        assert_eq!(config.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_default_dirs_are_named_after_the_crate() {
        if let Some(dir) = AppConfig::default_config_dir() {
            assert!(dir.to_string_lossy().contains(APP_NAME));
        }
        assert!(AppConfig::default_cache_dir().ends_with("previews"));
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let mut config = AppConfig::default();
        config.cache.capacity = 0;

        assert_eq!(
            config.validate(),
            Err(ConfigError::Invalid {
                field: "cache.capacity",
                reason: "must be positive".to_string(),
            })
        );
        assert!(config.cache_capacity().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_listener_and_loading() {
        let mut config = AppConfig::default();
        config.http.port = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.loading.protocol = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.loading.protocol = "ht tp".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.loading.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
