#![allow(dead_code)]

use actix_web::web;
use async_trait::async_trait;
use fiscal_rules::NcmCatalog;
use fiscaldesk_agents::{AgentError, Completion, CompletionRequest, LlmClient, MessagingClient};
use shared_types::Theme;
use std::sync::{Arc, Mutex, RwLock};
use tempfile::TempDir;

use fiscaldesk_api::config::ApiConfig;
use fiscaldesk_api::database::preferences::{PreferencesStore, SqlitePreferencesStore};
use fiscaldesk_api::handlers::settings::SettingsAppState;
use fiscaldesk_api::helpers::agents::AgentServices;
use fiscaldesk_api::helpers::file_store::{FileStore, LocalFileStore};
use fiscaldesk_api::{routes, Database};

/// Answers every completion with the same text
pub struct StubLlm {
    pub reply: String,
}

#[async_trait]
impl LlmClient for StubLlm {
    fn model(&self) -> &str {
        "stub-model"
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<Completion, AgentError> {
        Ok(Completion {
            text: self.reply.clone(),
            model: "stub-model".to_string(),
        })
    }
}

/// Records outbound messages instead of sending them
#[derive(Default)]
pub struct RecordingMessenger {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl MessagingClient for RecordingMessenger {
    async fn send(&self, to: &str, body: &str) -> Result<(), AgentError> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), body.to_string()));
        Ok(())
    }
}

pub struct TestContext {
    pub dir: TempDir,
    pub db: Arc<Database>,
    pub agents: Arc<AgentServices>,
    pub messenger: Arc<RecordingMessenger>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::build(None)
    }

    pub fn with_llm_reply(reply: &str) -> Self {
        Self::build(Some(reply))
    }

    fn build(reply: Option<&str>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(Database::new(&dir.path().join("api.sqlite"), 2).unwrap());

        let messenger = Arc::new(RecordingMessenger::default());
        let llm = reply.map(|r| {
            Arc::new(StubLlm {
                reply: r.to_string(),
            }) as Arc<dyn LlmClient>
        });
        let agents = Arc::new(AgentServices::new(
            llm,
            500,
            Some(messenger.clone() as Arc<dyn MessagingClient>),
        ));

        Self {
            dir,
            db,
            agents,
            messenger,
        }
    }

    /// App data plus every route, for `App::new().configure(..)`
    pub fn configure(&self) -> impl FnOnce(&mut web::ServiceConfig) {
        let db = self.db.clone();
        let agents = self.agents.clone();
        let file_store: Arc<dyn FileStore> = Arc::new(LocalFileStore::new(self.dir.path().join("files")));
        let preferences: Arc<dyn PreferencesStore> = Arc::new(SqlitePreferencesStore::new(
            db.async_connection.clone(),
            false,
            Theme::Light,
        ));
        let settings = SettingsAppState {
            config: Arc::new(RwLock::new(ApiConfig::default())),
            config_path: self.dir.path().join("api.toml"),
        };

        move |cfg: &mut web::ServiceConfig| {
            cfg.app_data(web::Data::new(db))
                .app_data(web::Data::new(agents))
                .app_data(web::Data::new(file_store))
                .app_data(web::Data::new(preferences))
                .app_data(web::Data::new(Arc::new(NcmCatalog::default())))
                .app_data(web::Data::new(settings));
            routes::configure(cfg);
        }
    }
}
