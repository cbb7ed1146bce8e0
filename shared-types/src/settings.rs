use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A configured secret, masked for display
#[derive(Debug, Serialize, Deserialize, TS)]
pub struct ApiKeyConfig {
    pub name: String,
    pub key: Option<String>,
    pub is_configured: bool,
}

/// Response for settings endpoint
#[derive(Debug, Serialize, Deserialize, TS)]
pub struct SettingsResponse {
    pub config_file_path: String,
    pub api_keys: Vec<ApiKeyConfig>,
    pub llm_model: Option<String>,
    pub twilio_from_number: Option<String>,
}

/// Request to update integration secrets
#[derive(Debug, Serialize, Deserialize, TS)]
pub struct UpdateApiKeysRequest {
    pub llm_api_key: Option<String>,
    pub twilio_auth_token: Option<String>,
}
