use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use shared_types::Theme;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ApiConfig {
    pub server: Option<ServerConfig>,
    pub cors: Option<CorsConfig>,
    pub database: Option<DatabaseConfig>,
    pub llm: Option<LlmConfig>,
    pub twilio: Option<TwilioConfig>,
    pub storage: Option<StorageConfig>,
    pub http: Option<HttpConfig>,
    pub preferences: Option<PreferencesConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
    pub pool_size: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct TwilioConfig {
    pub account_sid: Option<String>,
    pub auth_token: Option<String>,
    pub from_number: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct StorageConfig {
    pub root: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct HttpConfig {
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct PreferencesConfig {
    pub sidebar_collapsed: Option<bool>,
    pub theme: Option<Theme>,
}

pub const DEFAULT_POOL_SIZE: u32 = 8;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_LLM_MAX_TOKENS: u32 = 1500;

const DEFAULT_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 8080

[cors]
allowed_origins = ["http://localhost:3000"]

[database]
# path = "/var/lib/fiscaldesk/fiscaldesk.sqlite"
pool_size = 8

[llm]
# api_key = "sk-..."
base_url = "https://api.openai.com/v1"
model = "gpt-4o-mini"
max_tokens = 1500

[twilio]
# account_sid = "AC..."
# auth_token = "..."
# from_number = "+14155238886"

[storage]
# root = "/var/lib/fiscaldesk/files"

[http]
timeout_secs = 30

[preferences]
sidebar_collapsed = false
theme = "light"
"#;

impl ApiConfig {
    /// Load the config file, writing the default one first if it does not exist.
    /// `FISCALDESK_*` environment variables override file values
    /// (`FISCALDESK_LLM__API_KEY` sets `llm.api_key`).
    pub fn load(path: Option<&Path>) -> Result<(Self, PathBuf), ConfigError> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(get_config_path);

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ConfigError::Message(format!("Failed to create config directory: {e}"))
            })?;
        }

        if !config_path.exists() {
            std::fs::write(&config_path, DEFAULT_CONFIG).map_err(|e| {
                ConfigError::Message(format!("Failed to write default config: {e}"))
            })?;
        }

        let builder = Config::builder()
            .add_source(File::from(config_path.clone()))
            .add_source(Environment::with_prefix("FISCALDESK").separator("__"))
            .build()?;

        let config: ApiConfig = builder.try_deserialize()?;

        Ok((config, config_path))
    }

    pub fn host_and_port(&self) -> (String, u16) {
        match &self.server {
            Some(server) => (server.host.clone(), server.port),
            None => ("127.0.0.1".to_string(), 8080),
        }
    }

    pub fn pool_size(&self) -> u32 {
        self.database
            .as_ref()
            .and_then(|d| d.pool_size)
            .unwrap_or(DEFAULT_POOL_SIZE)
    }

    pub fn http_timeout_secs(&self) -> u64 {
        self.http
            .as_ref()
            .and_then(|h| h.timeout_secs)
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS)
    }

    pub fn default_preferences(&self) -> (bool, Theme) {
        let prefs = self.preferences.clone().unwrap_or_default();
        (
            prefs.sidebar_collapsed.unwrap_or(false),
            prefs.theme.unwrap_or_default(),
        )
    }
}

pub fn get_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("fiscaldesk").join("api.toml")
    } else {
        PathBuf::from("api.toml")
    }
}
