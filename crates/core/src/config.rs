use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub catalog: CatalogConfig,
    pub content: ContentConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    /// Origin allowed to call the API from a browser. `None` disables CORS
    /// headers entirely.
    pub allowed_origin: Option<String>,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: ProviderName,
    pub api_key: Option<SecretString>,
    /// Provider-specific model identifier. `None` uses the provider default.
    pub model: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    /// Bare storefront host, e.g. `willow-wren.myshopify.com`.
    pub shop_domain: Option<String>,
    pub access_token: Option<SecretString>,
    pub api_version: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ContentConfig {
    /// Optional TOML file that patches the built-in shop content.
    pub path: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Providers the invoker knows how to call. `None` disables the LLM tier so
/// every reply comes from the rule-based composer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    OpenAi,
    Anthropic,
    Gemini,
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub llm_provider: Option<ProviderName>,
    pub llm_api_key: Option<String>,
    pub llm_model: Option<String>,
    pub shop_domain: Option<String>,
    pub access_token: Option<String>,
    pub content_path: Option<PathBuf>,
    pub log_level: Option<String>,
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
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8080,
                allowed_origin: None,
            },
            llm: LlmConfig {
                provider: ProviderName::None,
                api_key: None,
                model: None,
                timeout_secs: 8,
            },
            catalog: CatalogConfig {
                shop_domain: None,
                access_token: None,
                api_version: "2023-10".to_string(),
                timeout_secs: 8,
            },
            content: ContentConfig { path: None },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl ProviderName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Gemini => "gemini",
            Self::None => "none",
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::None)
    }
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

impl std::str::FromStr for ProviderName {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "gemini" => Ok(Self::Gemini),
            "none" => Ok(Self::None),
            other => Err(ConfigError::Validation(format!(
                "unsupported llm provider `{other}` (expected openai|anthropic|gemini|none)"
            ))),
        }
    }
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
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("clerky.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(allowed_origin) = server.allowed_origin {
                self.server.allowed_origin = Some(allowed_origin);
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(provider) = llm.provider {
                self.llm.provider = provider;
            }
            if let Some(llm_api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(llm_api_key_value));
            }
            if let Some(model) = llm.model {
                self.llm.model = Some(model);
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
        }

        if let Some(catalog) = patch.catalog {
            if let Some(shop_domain) = catalog.shop_domain {
                self.catalog.shop_domain = Some(shop_domain);
            }
            if let Some(access_token_value) = catalog.access_token {
                self.catalog.access_token = Some(secret_value(access_token_value));
            }
            if let Some(api_version) = catalog.api_version {
                self.catalog.api_version = api_version;
            }
            if let Some(timeout_secs) = catalog.timeout_secs {
                self.catalog.timeout_secs = timeout_secs;
            }
        }

        if let Some(content) = patch.content {
            if let Some(path) = content.path {
                self.content.path = Some(path);
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
        if let Some(value) = read_env("CLERKY_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("CLERKY_SERVER_PORT") {
            self.server.port = parse_u16("CLERKY_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("CLERKY_SERVER_ALLOWED_ORIGIN") {
            self.server.allowed_origin = Some(value);
        }

        if let Some(value) = read_env("CLERKY_LLM_PROVIDER") {
            self.llm.provider = value.parse()?;
        }
        if let Some(value) = read_env("CLERKY_LLM_API_KEY") {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("CLERKY_LLM_MODEL") {
            self.llm.model = Some(value);
        }
        if let Some(value) = read_env("CLERKY_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("CLERKY_LLM_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("CLERKY_CATALOG_SHOP_DOMAIN") {
            self.catalog.shop_domain = Some(value);
        }
        if let Some(value) = read_env("CLERKY_CATALOG_ACCESS_TOKEN") {
            self.catalog.access_token = Some(secret_value(value));
        }
        if let Some(value) = read_env("CLERKY_CATALOG_API_VERSION") {
            self.catalog.api_version = value;
        }
        if let Some(value) = read_env("CLERKY_CATALOG_TIMEOUT_SECS") {
            self.catalog.timeout_secs = parse_u64("CLERKY_CATALOG_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("CLERKY_CONTENT_PATH") {
            self.content.path = Some(PathBuf::from(value));
        }

        let log_level = read_env("CLERKY_LOGGING_LEVEL").or_else(|| read_env("CLERKY_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("CLERKY_LOGGING_FORMAT").or_else(|| read_env("CLERKY_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(llm_provider) = overrides.llm_provider {
            self.llm.provider = llm_provider;
        }
        if let Some(llm_api_key) = overrides.llm_api_key {
            self.llm.api_key = Some(secret_value(llm_api_key));
        }
        if let Some(llm_model) = overrides.llm_model {
            self.llm.model = Some(llm_model);
        }
        if let Some(shop_domain) = overrides.shop_domain {
            self.catalog.shop_domain = Some(shop_domain);
        }
        if let Some(access_token) = overrides.access_token {
            self.catalog.access_token = Some(secret_value(access_token));
        }
        if let Some(content_path) = overrides.content_path {
            self.content.path = Some(content_path);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_server(&self.server)?;
        validate_llm(&self.llm)?;
        validate_catalog(&self.catalog)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("clerky.toml"), PathBuf::from("config/clerky.toml")]
        .into_iter()
        .find(|path| path.exists())
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

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation(
            "server.port must be greater than zero".to_string(),
        ));
    }

    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if let Some(origin) = &server.allowed_origin {
        let well_formed =
            origin == "*" || origin.starts_with("http://") || origin.starts_with("https://");
        if !well_formed {
            return Err(ConfigError::Validation(
                "server.allowed_origin must be `*` or a full origin like `https://shop.example.com`"
                    .to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 60 {
        return Err(ConfigError::Validation("llm.timeout_secs must be in range 1..=60".to_string()));
    }

    if llm.provider.is_enabled() {
        let missing = llm
            .api_key
            .as_ref()
            .map(|value| value.expose_secret().trim().is_empty())
            .unwrap_or(true);
        if missing {
            return Err(ConfigError::Validation(format!(
                "llm.api_key is required when llm.provider is `{}` (set provider to `none` for rule-based replies only)",
                llm.provider.as_str()
            )));
        }
    }

    Ok(())
}

fn validate_catalog(catalog: &CatalogConfig) -> Result<(), ConfigError> {
    if catalog.timeout_secs == 0 || catalog.timeout_secs > 60 {
        return Err(ConfigError::Validation(
            "catalog.timeout_secs must be in range 1..=60".to_string(),
        ));
    }

    match (&catalog.shop_domain, &catalog.access_token) {
        (Some(_), None) => {
            return Err(ConfigError::Validation(
                "catalog.access_token is required when catalog.shop_domain is set".to_string(),
            ));
        }
        (None, Some(_)) => {
            return Err(ConfigError::Validation(
                "catalog.shop_domain is required when catalog.access_token is set".to_string(),
            ));
        }
        _ => {}
    }

    if let Some(domain) = &catalog.shop_domain {
        if domain.contains("://") || domain.contains('/') {
            return Err(ConfigError::Validation(
                "catalog.shop_domain must be a bare host like `willow-wren.myshopify.com`"
                    .to_string(),
            ));
        }
    }

    if catalog.api_version.trim().is_empty() {
        return Err(ConfigError::Validation("catalog.api_version must not be empty".to_string()));
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

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    llm: Option<LlmPatch>,
    catalog: Option<CatalogPatch>,
    content: Option<ContentPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    allowed_origin: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    provider: Option<ProviderName>,
    api_key: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogPatch {
    shop_domain: Option<String>,
    access_token: Option<String>,
    api_version: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentPatch {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
