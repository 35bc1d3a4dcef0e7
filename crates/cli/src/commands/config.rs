use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use secrecy::ExposeSecret;
use serde::Serialize;
use toml::Value;

use crate::commands::{load_config, CommandResult};
use partsdesk_core::config::{resolve_config_path, AppConfig, LoadOptions};

#[derive(Debug, Serialize)]
struct ConfigEntry {
    key: &'static str,
    value: String,
    source: String,
}

struct Sources<'a> {
    options: &'a LoadOptions,
    file_doc: Option<Value>,
    file_path: Option<PathBuf>,
}

/// Prints every effective setting with where it came from
/// (cli override > env > file > default). Secrets are redacted.
pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match load_config("config", options) {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let file_path = resolve_config_path(options.config_path.as_deref());
    let file_doc = match load_config_file_doc(file_path.as_deref()) {
        Ok(doc) => doc,
        Err(error) => {
            return CommandResult::failure("config", "config_validation", format!("{error:#}"), 2);
        }
    };
    let sources = Sources { options, file_doc, file_path };

    let entries = effective_entries(&config, &sources);
    let mut lines =
        vec!["effective config (source precedence: cli > env > file > default):".to_string()];
    lines.extend(entries.iter().map(render_line));

    CommandResult::success_with_data("config", lines.join("\n"), &entries)
}

fn effective_entries(config: &AppConfig, sources: &Sources<'_>) -> Vec<ConfigEntry> {
    let overrides = &sources.options.overrides;
    let api_key = match &config.remote.api_key {
        Some(key) => redact_secret(key.expose_secret()),
        None => "<unset>".to_string(),
    };

    vec![
        sources.entry(
            "store.data_dir",
            config.store.data_dir.display().to_string(),
            &["PARTSDESK_STORE_DATA_DIR"],
            overrides.data_dir.is_some(),
        ),
        sources.entry(
            "remote.enabled",
            config.remote.enabled.to_string(),
            &["PARTSDESK_REMOTE_ENABLED"],
            overrides.remote_enabled.is_some(),
        ),
        sources.entry(
            "remote.base_url",
            config.remote.base_url.clone(),
            &["PARTSDESK_REMOTE_BASE_URL"],
            overrides.remote_base_url.is_some(),
        ),
        sources.entry("remote.api_key", api_key, &["PARTSDESK_REMOTE_API_KEY"], false),
        sources.entry(
            "remote.timeout_secs",
            config.remote.timeout_secs.to_string(),
            &["PARTSDESK_REMOTE_TIMEOUT_SECS"],
            false,
        ),
        sources.entry(
            "analytics.low_stock_threshold",
            config.analytics.low_stock_threshold.to_string(),
            &["PARTSDESK_ANALYTICS_LOW_STOCK_THRESHOLD"],
            false,
        ),
        sources.entry(
            "analytics.fast_moving_limit",
            config.analytics.fast_moving_limit.to_string(),
            &["PARTSDESK_ANALYTICS_FAST_MOVING_LIMIT"],
            false,
        ),
        sources.entry(
            "analytics.slow_moving_limit",
            config.analytics.slow_moving_limit.to_string(),
            &["PARTSDESK_ANALYTICS_SLOW_MOVING_LIMIT"],
            false,
        ),
        sources.entry(
            "analytics.top_sellers_limit",
            config.analytics.top_sellers_limit.to_string(),
            &["PARTSDESK_ANALYTICS_TOP_SELLERS_LIMIT"],
            false,
        ),
        sources.entry(
            "comparison.max_selection",
            config.comparison.max_selection.to_string(),
            &["PARTSDESK_COMPARISON_MAX_SELECTION"],
            false,
        ),
        sources.entry(
            "logging.level",
            config.logging.level.clone(),
            &["PARTSDESK_LOGGING_LEVEL", "PARTSDESK_LOG_LEVEL"],
            overrides.log_level.is_some(),
        ),
        sources.entry(
            "logging.format",
            config.logging.format.as_str().to_string(),
            &["PARTSDESK_LOGGING_FORMAT", "PARTSDESK_LOG_FORMAT"],
            false,
        ),
    ]
}

impl Sources<'_> {
    fn entry(
        &self,
        key: &'static str,
        value: String,
        env_keys: &[&str],
        overridden: bool,
    ) -> ConfigEntry {
        ConfigEntry { key, value, source: self.field_source(key, env_keys, overridden) }
    }

    fn field_source(&self, key_path: &str, env_keys: &[&str], overridden: bool) -> String {
        if overridden {
            return "cli".to_string();
        }

        if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
            return format!("env ({env_key})");
        }

        if let Some(doc) = &self.file_doc {
            if contains_path(doc, key_path) {
                let file_path = self
                    .file_path
                    .as_ref()
                    .map(|path| path.display().to_string())
                    .unwrap_or_else(|| "config file".to_string());
                return format!("file ({file_path})");
            }
        }

        "default".to_string()
    }
}

fn load_config_file_doc(path: Option<&Path>) -> anyhow::Result<Option<Value>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("could not read config file `{}`", path.display()))?;
    let doc = raw
        .parse::<Value>()
        .with_context(|| format!("could not parse config file `{}`", path.display()))?;
    Ok(Some(doc))
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(entry: &ConfigEntry) -> String {
    format!("- {} = {} (source: {})", entry.key, entry.value, entry.source)
}

fn redact_secret(secret: &str) -> String {
    let trimmed = secret.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}
