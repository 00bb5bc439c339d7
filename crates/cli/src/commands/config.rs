use std::env;
use std::fs;
use std::path::Path;

use greenswap_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let emission_table_path = config
        .recommend
        .emission_table_path
        .as_ref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<built-in reference table>".to_string());

    let fields: Vec<(&str, String, String)> = vec![
        (
            "database.url",
            config.database.url.clone(),
            source("database.url", &["GREENSWAP_DATABASE_URL", "DB_URL"]),
        ),
        (
            "database.max_connections",
            config.database.max_connections.to_string(),
            source("database.max_connections", &["GREENSWAP_DATABASE_MAX_CONNECTIONS"]),
        ),
        (
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            source("database.timeout_secs", &["GREENSWAP_DATABASE_TIMEOUT_SECS"]),
        ),
        (
            "recommend.default_k",
            config.recommend.default_k.to_string(),
            source("recommend.default_k", &["GREENSWAP_RECOMMEND_DEFAULT_K"]),
        ),
        (
            "recommend.feature_scaling",
            config.recommend.feature_scaling.as_str().to_string(),
            source("recommend.feature_scaling", &["GREENSWAP_RECOMMEND_FEATURE_SCALING"]),
        ),
        (
            "recommend.emission_table_path",
            emission_table_path,
            source("recommend.emission_table_path", &["GREENSWAP_EMISSION_TABLE_PATH"]),
        ),
        (
            "server.bind_address",
            config.server.bind_address.clone(),
            source("server.bind_address", &["GREENSWAP_SERVER_BIND_ADDRESS"]),
        ),
        (
            "server.port",
            config.server.port.to_string(),
            source("server.port", &["GREENSWAP_SERVER_PORT"]),
        ),
        (
            "logging.level",
            config.logging.level.clone(),
            source("logging.level", &["GREENSWAP_LOGGING_LEVEL", "GREENSWAP_LOG_LEVEL"]),
        ),
        (
            "logging.format",
            config.logging.format.as_str().to_string(),
            source("logging.format", &["GREENSWAP_LOGGING_FORMAT", "GREENSWAP_LOG_FORMAT"]),
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(fields.into_iter().map(|(key, value, source)| render_line(key, &value, source)));
    lines.join("\n")
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
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

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
