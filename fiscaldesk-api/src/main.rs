use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use clap::Parser;
use fiscal_rules::NcmCatalog;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::prelude::*;

use fiscaldesk_api::config::ApiConfig;
use fiscaldesk_api::database::preferences::{PreferencesStore, SqlitePreferencesStore};
use fiscaldesk_api::handlers::settings::SettingsAppState;
use fiscaldesk_api::helpers::agents::AgentServices;
use fiscaldesk_api::helpers::file_store::{FileStore, LocalFileStore};
use fiscaldesk_api::{helpers, routes};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(long)]
    log_file_path: Option<String>,

    /// Config file to use instead of `<config_dir>/fiscaldesk/api.toml`
    #[arg(long)]
    config: Option<PathBuf>,
}

fn init_tracing(log_file_path: Option<&str>) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if let Some(log_path) = log_file_path {
        let log_path = std::path::Path::new(log_path);
        let file_appender = tracing_appender::rolling::never(
            log_path.parent().unwrap_or(std::path::Path::new(".")),
            log_path
                .file_name()
                .unwrap_or(std::ffi::OsStr::new("fiscaldesk-api.log")),
        );
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        std::mem::forget(guard);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    tracing::error!("{}: {}", context, err);
    std::io::Error::other(format!("{}: {}", context, err))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_file_path.as_deref());

    let (config, config_path) = ApiConfig::load(args.config.as_deref())
        .map_err(|e| startup_error("Failed to load config", e))?;
    tracing::info!("Loaded config from {:?}", config_path);

    let db = helpers::database::initialize_database(&config)
        .map_err(|e| startup_error("Failed to initialize database", e))?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_timeout_secs()))
        .build()
        .map_err(|e| startup_error("Failed to build HTTP client", e))?;
    let agents = Arc::new(AgentServices::from_config(&config, http));

    let storage_root = match config.storage.as_ref().and_then(|s| s.root.clone()) {
        Some(root) => root,
        None => LocalFileStore::default_root()
            .map_err(|e| startup_error("Failed to resolve file store root", e))?,
    };
    tracing::info!("File store at {:?}", storage_root);
    let file_store: Arc<dyn FileStore> = Arc::new(LocalFileStore::new(storage_root));

    let (sidebar_collapsed, theme) = config.default_preferences();
    let preferences: Arc<dyn PreferencesStore> = Arc::new(SqlitePreferencesStore::new(
        db.async_connection.clone(),
        sidebar_collapsed,
        theme,
    ));

    let ncm_catalog = Arc::new(NcmCatalog::default());

    let settings_state = SettingsAppState {
        config: Arc::new(std::sync::RwLock::new(config.clone())),
        config_path,
    };

    let (host, port) = config.host_and_port();
    tracing::info!("Server will listen on {}:{}", host, port);

    let cors_config = config.cors.clone();
    let server = HttpServer::new(move || {
        let cors = if let Some(cors_config) = &cors_config {
            let mut cors_builder = Cors::default();
            for origin in &cors_config.allowed_origins {
                cors_builder = cors_builder.allowed_origin(origin);
            }
            cors_builder
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(vec!["Authorization", "Accept", "Content-Type"])
                .max_age(3600)
        } else {
            Cors::default()
                .allow_any_origin()
                .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
                .allowed_headers(vec!["Authorization", "Accept", "Content-Type"])
                .max_age(3600)
        };

        App::new()
            .wrap(cors)
            .app_data(web::Data::new(db.clone()))
            .app_data(web::Data::new(file_store.clone()))
            .app_data(web::Data::new(agents.clone()))
            .app_data(web::Data::new(preferences.clone()))
            .app_data(web::Data::new(ncm_catalog.clone()))
            .app_data(web::Data::new(settings_state.clone()))
            .configure(routes::configure)
    })
    .bind((host.as_str(), port))?
    .run();

    let handle = server.handle();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }

        tracing::info!("Ctrl+C received, shutting down...");
        handle.stop(true).await;
    });

    server.await
}
