use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clerky_core::config::{AppConfig, LoadOptions};
use secrecy::{ExposeSecret, SecretString};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "server.bind_address",
        &config.server.bind_address,
        source("server.bind_address", &["CLERKY_SERVER_BIND_ADDRESS"]),
    ));
    lines.push(render_line(
        "server.port",
        &config.server.port.to_string(),
        source("server.port", &["CLERKY_SERVER_PORT"]),
    ));
    lines.push(render_line(
        "server.allowed_origin",
        config.server.allowed_origin.as_deref().unwrap_or("<unset>"),
        source("server.allowed_origin", &["CLERKY_SERVER_ALLOWED_ORIGIN"]),
    ));

    lines.push(render_line(
        "llm.provider",
        config.llm.provider.as_str(),
        source("llm.provider", &["CLERKY_LLM_PROVIDER"]),
    ));
    lines.push(render_line(
        "llm.model",
        config.llm.model.as_deref().unwrap_or("<provider default>"),
        source("llm.model", &["CLERKY_LLM_MODEL"]),
    ));
    lines.push(render_line(
        "llm.api_key",
        &redact_secret(config.llm.api_key.as_ref()),
        source("llm.api_key", &["CLERKY_LLM_API_KEY"]),
    ));
    lines.push(render_line(
        "llm.timeout_secs",
        &config.llm.timeout_secs.to_string(),
        source("llm.timeout_secs", &["CLERKY_LLM_TIMEOUT_SECS"]),
    ));

    lines.push(render_line(
        "catalog.shop_domain",
        config.catalog.shop_domain.as_deref().unwrap_or("<unset>"),
        source("catalog.shop_domain", &["CLERKY_CATALOG_SHOP_DOMAIN"]),
    ));
    lines.push(render_line(
        "catalog.access_token",
        &redact_secret(config.catalog.access_token.as_ref()),
        source("catalog.access_token", &["CLERKY_CATALOG_ACCESS_TOKEN"]),
    ));
    lines.push(render_line(
        "catalog.api_version",
        &config.catalog.api_version,
        source("catalog.api_version", &["CLERKY_CATALOG_API_VERSION"]),
    ));
    lines.push(render_line(
        "catalog.timeout_secs",
        &config.catalog.timeout_secs.to_string(),
        source("catalog.timeout_secs", &["CLERKY_CATALOG_TIMEOUT_SECS"]),
    ));

    lines.push(render_line(
        "content.path",
        &config
            .content
            .path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "<built-in defaults>".to_string()),
        source("content.path", &["CLERKY_CONTENT_PATH"]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["CLERKY_LOGGING_LEVEL", "CLERKY_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        config.logging.format.as_str(),
        source("logging.format", &["CLERKY_LOGGING_FORMAT", "CLERKY_LOG_FORMAT"]),
    ));

    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("clerky.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/clerky.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
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
    for env_key in env_keys {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
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

fn redact_secret(secret: Option<&SecretString>) -> String {
    let Some(secret) = secret else {
        return "<unset>".to_string();
    };

    let trimmed = secret.expose_secret().trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}
