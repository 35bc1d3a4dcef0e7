use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analytics::{
    DEFAULT_LOW_STOCK_THRESHOLD, DEFAULT_MOVEMENT_LIMIT, DEFAULT_TOP_SELLER_LIMIT,
};
use crate::catalog::{DEFAULT_MAX_SELECTION, MIN_SELECTION};

pub const MAX_COMPARISON_SELECTION: usize = 10;

pub const CONFIG_FILE_CANDIDATES: [&str; 2] = ["partsdesk.toml", "config/partsdesk.toml"];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub remote: RemoteConfig,
    pub analytics: AnalyticsConfig,
    pub comparison: ComparisonConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Directory holding `allProducts.json` and `salesHistory.json`.
    pub data_dir: PathBuf,
}

#[derive(Clone, Debug)]
pub struct RemoteConfig {
    pub enabled: bool,
    pub base_url: String,
    pub api_key: Option<SecretString>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AnalyticsConfig {
    pub low_stock_threshold: u32,
    pub fast_moving_limit: usize,
    pub slow_moving_limit: usize,
    pub top_sellers_limit: usize,
}

#[derive(Clone, Debug)]
pub struct ComparisonConfig {
    pub max_selection: usize,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Compact => "compact",
            Self::Pretty => "pretty",
            Self::Json => "json",
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub data_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub remote_enabled: Option<bool>,
    pub remote_base_url: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig { data_dir: PathBuf::from("./data") },
            remote: RemoteConfig {
                enabled: false,
                base_url: "http://localhost:3000/api".to_string(),
                api_key: None,
                timeout_secs: 10,
            },
            analytics: AnalyticsConfig {
                low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
                fast_moving_limit: DEFAULT_MOVEMENT_LIMIT,
                slow_moving_limit: DEFAULT_MOVEMENT_LIMIT,
                top_sellers_limit: DEFAULT_TOP_SELLER_LIMIT,
            },
            comparison: ComparisonConfig { max_selection: DEFAULT_MAX_SELECTION },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options
                .config_path
                .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_CANDIDATES[0]));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(store) = patch.store {
            if let Some(data_dir) = store.data_dir {
                self.store.data_dir = data_dir;
            }
        }

        if let Some(remote) = patch.remote {
            if let Some(enabled) = remote.enabled {
                self.remote.enabled = enabled;
            }
            if let Some(base_url) = remote.base_url {
                self.remote.base_url = base_url;
            }
            if let Some(api_key) = remote.api_key {
                self.remote.api_key = Some(secret_value(api_key));
            }
            if let Some(timeout_secs) = remote.timeout_secs {
                self.remote.timeout_secs = timeout_secs;
            }
        }

        if let Some(analytics) = patch.analytics {
            if let Some(threshold) = analytics.low_stock_threshold {
                self.analytics.low_stock_threshold = threshold;
            }
            if let Some(limit) = analytics.fast_moving_limit {
                self.analytics.fast_moving_limit = limit;
            }
            if let Some(limit) = analytics.slow_moving_limit {
                self.analytics.slow_moving_limit = limit;
            }
            if let Some(limit) = analytics.top_sellers_limit {
                self.analytics.top_sellers_limit = limit;
            }
        }

        if let Some(comparison) = patch.comparison {
            if let Some(max_selection) = comparison.max_selection {
                self.comparison.max_selection = max_selection;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("PARTSDESK_STORE_DATA_DIR") {
            self.store.data_dir = PathBuf::from(value);
        }

        if let Some(value) = read_env("PARTSDESK_REMOTE_ENABLED") {
            self.remote.enabled = parse_bool("PARTSDESK_REMOTE_ENABLED", &value)?;
        }
        if let Some(value) = read_env("PARTSDESK_REMOTE_BASE_URL") {
            self.remote.base_url = value;
        }
        if let Some(value) = read_env("PARTSDESK_REMOTE_API_KEY") {
            self.remote.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("PARTSDESK_REMOTE_TIMEOUT_SECS") {
            self.remote.timeout_secs = parse_u64("PARTSDESK_REMOTE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("PARTSDESK_ANALYTICS_LOW_STOCK_THRESHOLD") {
            self.analytics.low_stock_threshold =
                parse_u32("PARTSDESK_ANALYTICS_LOW_STOCK_THRESHOLD", &value)?;
        }
        if let Some(value) = read_env("PARTSDESK_ANALYTICS_FAST_MOVING_LIMIT") {
            self.analytics.fast_moving_limit =
                parse_usize("PARTSDESK_ANALYTICS_FAST_MOVING_LIMIT", &value)?;
        }
        if let Some(value) = read_env("PARTSDESK_ANALYTICS_SLOW_MOVING_LIMIT") {
            self.analytics.slow_moving_limit =
                parse_usize("PARTSDESK_ANALYTICS_SLOW_MOVING_LIMIT", &value)?;
        }
        if let Some(value) = read_env("PARTSDESK_ANALYTICS_TOP_SELLERS_LIMIT") {
            self.analytics.top_sellers_limit =
                parse_usize("PARTSDESK_ANALYTICS_TOP_SELLERS_LIMIT", &value)?;
        }

        if let Some(value) = read_env("PARTSDESK_COMPARISON_MAX_SELECTION") {
            self.comparison.max_selection =
                parse_usize("PARTSDESK_COMPARISON_MAX_SELECTION", &value)?;
        }

        let log_level =
            read_env("PARTSDESK_LOGGING_LEVEL").or_else(|| read_env("PARTSDESK_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("PARTSDESK_LOGGING_FORMAT").or_else(|| read_env("PARTSDESK_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(data_dir) = overrides.data_dir {
            self.store.data_dir = data_dir;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(enabled) = overrides.remote_enabled {
            self.remote.enabled = enabled;
        }
        if let Some(base_url) = overrides.remote_base_url {
            self.remote.base_url = base_url;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_store(&self.store)?;
        validate_remote(&self.remote)?;
        validate_analytics(&self.analytics)?;
        validate_comparison(&self.comparison)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

/// First config file that exists: the explicit path, else the standard
/// candidates relative to the working directory.
pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    CONFIG_FILE_CANDIDATES.into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_store(store: &StoreConfig) -> Result<(), ConfigError> {
    if store.data_dir.as_os_str().is_empty() {
        return Err(ConfigError::Validation("store.data_dir must not be empty".to_string()));
    }
    Ok(())
}

fn validate_remote(remote: &RemoteConfig) -> Result<(), ConfigError> {
    let base_url = remote.base_url.trim();
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "remote.base_url must start with http:// or https://".to_string(),
        ));
    }

    if remote.timeout_secs == 0 || remote.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "remote.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    let blank_key =
        remote.api_key.as_ref().is_some_and(|key| key.expose_secret().trim().is_empty());
    if blank_key {
        return Err(ConfigError::Validation(
            "remote.api_key must not be blank when set".to_string(),
        ));
    }

    Ok(())
}

fn validate_analytics(analytics: &AnalyticsConfig) -> Result<(), ConfigError> {
    for (key, limit) in [
        ("analytics.fast_moving_limit", analytics.fast_moving_limit),
        ("analytics.slow_moving_limit", analytics.slow_moving_limit),
        ("analytics.top_sellers_limit", analytics.top_sellers_limit),
    ] {
        if limit == 0 {
            return Err(ConfigError::Validation(format!("{key} must be greater than zero")));
        }
    }
    Ok(())
}

fn validate_comparison(comparison: &ComparisonConfig) -> Result<(), ConfigError> {
    if !(MIN_SELECTION..=MAX_COMPARISON_SELECTION).contains(&comparison.max_selection) {
        return Err(ConfigError::Validation(format!(
            "comparison.max_selection must be in range {MIN_SELECTION}..={MAX_COMPARISON_SELECTION}"
        )));
    }
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn invalid_override(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidEnvOverride { key: key.to_string(), value: value.to_string() }
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.trim().parse::<u32>().map_err(|_| invalid_override(key, value))
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse::<u64>().map_err(|_| invalid_override(key, value))
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value.trim().parse::<usize>().map_err(|_| invalid_override(key, value))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    value.trim().parse::<bool>().map_err(|_| invalid_override(key, value))
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    store: Option<StorePatch>,
    remote: Option<RemotePatch>,
    analytics: Option<AnalyticsPatch>,
    comparison: Option<ComparisonPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct StorePatch {
    data_dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct RemotePatch {
    enabled: Option<bool>,
    base_url: Option<String>,
    api_key: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct AnalyticsPatch {
    low_stock_threshold: Option<u32>,
    fast_moving_limit: Option<usize>,
    slow_moving_limit: Option<usize>,
    top_sellers_limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct ComparisonPatch {
    max_selection: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_are_valid() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::default();
        config.validate().map_err(|err| format!("defaults should validate: {err}"))?;

        ensure(config.store.data_dir == PathBuf::from("./data"), "default data dir")?;
        ensure(!config.remote.enabled, "remote api is off by default")?;
        ensure(config.analytics.low_stock_threshold == 10, "default low stock threshold")?;
        ensure(config.comparison.max_selection == 4, "default comparison limit")?;
        ensure(matches!(config.logging.format, LogFormat::Compact), "default log format")
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_PARTSDESK_API_KEY", "key-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("partsdesk.toml");
            fs::write(
                &path,
                r#"
[remote]
enabled = true
base_url = "https://shop.example.test/api"
api_key = "${TEST_PARTSDESK_API_KEY}"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.remote.enabled, "remote should be enabled from file")?;
            ensure(
                config.remote.api_key.as_ref().map(|key| key.expose_secret().to_string())
                    == Some("key-from-env".to_string()),
                "api key should be interpolated from environment",
            )
        })();

        clear_vars(&["TEST_PARTSDESK_API_KEY"]);
        result
    }

    #[test]
    fn missing_interpolation_variable_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;
        clear_vars(&["TEST_PARTSDESK_UNSET"]);

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let path = dir.path().join("partsdesk.toml");
        fs::write(&path, "[store]\ndata_dir = \"${TEST_PARTSDESK_UNSET}\"\n")
            .map_err(|err| err.to_string())?;

        let error = AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
            .err()
            .ok_or_else(|| "expected interpolation failure".to_string())?;

        ensure(
            matches!(error, ConfigError::MissingEnvInterpolation { ref var } if var == "TEST_PARTSDESK_UNSET"),
            "error should name the missing variable",
        )
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("PARTSDESK_LOG_LEVEL", "warn");
        env::set_var("PARTSDESK_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )
        })();

        clear_vars(&["PARTSDESK_LOG_LEVEL", "PARTSDESK_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("PARTSDESK_STORE_DATA_DIR", "/var/lib/partsdesk-env");
        env::set_var("PARTSDESK_ANALYTICS_LOW_STOCK_THRESHOLD", "3");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("partsdesk.toml");
            fs::write(
                &path,
                r#"
[store]
data_dir = "/var/lib/partsdesk-file"

[analytics]
low_stock_threshold = 7
top_sellers_limit = 3

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    data_dir: Some(PathBuf::from("/tmp/partsdesk-override")),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.store.data_dir == PathBuf::from("/tmp/partsdesk-override"),
                "override data dir should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(
                config.analytics.low_stock_threshold == 3,
                "env threshold should win over file and defaults",
            )?;
            ensure(config.analytics.top_sellers_limit == 3, "file value should beat default")?;
            ensure(config.analytics.fast_moving_limit == 5, "untouched value keeps default")
        })();

        clear_vars(&["PARTSDESK_STORE_DATA_DIR", "PARTSDESK_ANALYTICS_LOW_STOCK_THRESHOLD"]);
        result
    }

    #[test]
    fn invalid_env_numbers_are_rejected() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("PARTSDESK_REMOTE_TIMEOUT_SECS", "soon");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => return Err("expected invalid override error".to_string()),
                Err(error) => error,
            };
            ensure(
                matches!(error, ConfigError::InvalidEnvOverride { ref key, .. } if key == "PARTSDESK_REMOTE_TIMEOUT_SECS"),
                "error should name the offending variable",
            )
        })();

        clear_vars(&["PARTSDESK_REMOTE_TIMEOUT_SECS"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("PARTSDESK_COMPARISON_MAX_SELECTION", "12");

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("comparison.max_selection")
            );
            ensure(has_message, "validation failure should mention comparison.max_selection")
        })();

        clear_vars(&["PARTSDESK_COMPARISON_MAX_SELECTION"]);
        result
    }

    #[test]
    fn remote_url_must_be_http() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let error = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                remote_base_url: Some("ftp://legacy.example.test".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .err()
        .ok_or_else(|| "expected validation failure".to_string())?;

        ensure(
            matches!(error, ConfigError::Validation(ref message) if message.contains("remote.base_url")),
            "validation failure should mention remote.base_url",
        )
    }

    #[test]
    fn required_file_must_exist() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
        let missing = dir.path().join("absent.toml");
        let error = AppConfig::load(LoadOptions {
            config_path: Some(missing.clone()),
            require_file: true,
            ..LoadOptions::default()
        })
        .err()
        .ok_or_else(|| "expected missing file error".to_string())?;

        ensure(
            matches!(error, ConfigError::MissingConfigFile(ref path) if *path == missing),
            "missing file error should carry the requested path",
        )
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("PARTSDESK_REMOTE_API_KEY", "pd-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(!debug.contains("pd-secret-value"), "debug output should not contain api key")?;
            ensure(config.remote.api_key.is_some(), "api key should be loaded from env")
        })();

        clear_vars(&["PARTSDESK_REMOTE_API_KEY"]);
        result
    }
}
