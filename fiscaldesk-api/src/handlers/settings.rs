use crate::config::{ApiConfig, LlmConfig, TwilioConfig};
use actix_web::{web, HttpResponse, Result};
use shared_types::{ApiKeyConfig, SettingsResponse, UpdateApiKeysRequest};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tracing::info;

/// Live configuration; key updates are written back to `config_path`.
/// Clients built at startup keep their credentials until restart.
#[derive(Clone)]
pub struct SettingsAppState {
    pub config: Arc<RwLock<ApiConfig>>,
    pub config_path: PathBuf,
}

fn mask_api_key(key: &Option<String>) -> Option<String> {
    key.as_ref().map(|k| {
        let chars: Vec<char> = k.chars().collect();
        if chars.len() <= 6 {
            k.clone()
        } else {
            let visible: String = chars[..6].iter().collect();
            let hidden = (chars.len() - 6).min(40 - 6);
            if chars.len() > 40 {
                format!("{}{}...", visible, "*".repeat(hidden - 3))
            } else {
                format!("{}{}", visible, "*".repeat(hidden))
            }
        }
    })
}

fn key_entry(name: &str, key: &Option<String>) -> ApiKeyConfig {
    ApiKeyConfig {
        name: name.to_string(),
        key: mask_api_key(key),
        is_configured: key.as_deref().is_some_and(|k| !k.trim().is_empty()),
    }
}

pub async fn get_settings(data: web::Data<SettingsAppState>) -> Result<HttpResponse> {
    let config = data.config.read().map_err(|e| {
        actix_web::error::ErrorInternalServerError(format!(
            "Failed to acquire config read lock: {}",
            e
        ))
    })?;

    let llm = config.llm.clone().unwrap_or_default();
    let twilio = config.twilio.clone().unwrap_or_default();

    let response = SettingsResponse {
        config_file_path: data.config_path.to_string_lossy().to_string(),
        api_keys: vec![
            key_entry("llm", &llm.api_key),
            key_entry("twilio", &twilio.auth_token),
        ],
        llm_model: llm.model,
        twilio_from_number: twilio.from_number,
    };

    Ok(HttpResponse::Ok().json(response))
}

pub async fn update_api_keys(
    data: web::Data<SettingsAppState>,
    request: web::Json<UpdateApiKeysRequest>,
) -> Result<HttpResponse> {
    let req = request.into_inner();

    let mut config = data.config.write().map_err(|e| {
        actix_web::error::ErrorInternalServerError(format!(
            "Failed to acquire config write lock: {}",
            e
        ))
    })?;

    if let Some(api_key) = req.llm_api_key {
        config.llm.get_or_insert_with(LlmConfig::default).api_key = Some(api_key);
    }
    if let Some(auth_token) = req.twilio_auth_token {
        config.twilio.get_or_insert_with(TwilioConfig::default).auth_token = Some(auth_token);
    }

    let toml_string = toml::to_string(&*config).map_err(|e| {
        actix_web::error::ErrorInternalServerError(format!("Failed to serialize config: {}", e))
    })?;

    std::fs::write(&data.config_path, toml_string).map_err(|e| {
        actix_web::error::ErrorInternalServerError(format!("Failed to write config file: {}", e))
    })?;

    info!("Updated API keys in settings");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "path": data.config_path.to_string_lossy()
    })))
}
