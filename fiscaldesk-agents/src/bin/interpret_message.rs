use anyhow::{Context, Result};
use clap::Parser;
use config::{Config, File};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use fiscaldesk_agents::{ChatCompletionsClient, ExpenseInterpreter, LlmClient};

#[derive(Parser, Debug)]
#[command(name = "interpret-message", about = "Interpret a chat message as an expense")]
struct Cli {
    /// Message text, as a user would send it over WhatsApp
    #[arg(long)]
    message: String,

    /// Override the configured model
    #[arg(long)]
    model: Option<String>,

    /// Path to api.toml (defaults to the server's config file)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
struct ApiConfig {
    llm: Option<LlmConfig>,
    http: Option<HttpConfig>,
}

#[derive(Debug, Deserialize, Clone)]
struct LlmConfig {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
struct HttpConfig {
    timeout_secs: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let config = load_api_config(&config_path).context("Failed to load fiscaldesk API config")?;

    let llm = config
        .llm
        .ok_or_else(|| anyhow::anyhow!("Missing [llm] section in config at {:?}", config_path))?;
    let api_key = llm
        .api_key
        .ok_or_else(|| anyhow::anyhow!("Missing llm.api_key in config at {:?}", config_path))?;
    let base_url = llm
        .base_url
        .unwrap_or_else(|| "https://api.openai.com/v1".to_string());
    let model = cli
        .model
        .or(llm.model)
        .unwrap_or_else(|| "gpt-4o-mini".to_string());

    let timeout = config
        .http
        .and_then(|h| h.timeout_secs)
        .unwrap_or(30);
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout))
        .build()?;

    let llm_client: Arc<dyn LlmClient> =
        Arc::new(ChatCompletionsClient::new(http, &base_url, &api_key, &model));
    let interpreter = ExpenseInterpreter::new(llm_client);

    let today = chrono::Local::now().date_naive();
    let expense = interpreter.interpret(&cli.message, today).await?;

    println!("{}", serde_json::to_string_pretty(&expense)?);
    Ok(())
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn default_config_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("fiscaldesk").join("api.toml")
    } else {
        PathBuf::from("api.toml")
    }
}

fn load_api_config(path: &PathBuf) -> Result<ApiConfig> {
    let config = Config::builder()
        .add_source(File::from(path.clone()))
        .add_source(config::Environment::with_prefix("FISCALDESK").separator("__"))
        .build()?;
    Ok(config.try_deserialize()?)
}
