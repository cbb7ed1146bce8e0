use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ApiConfig;
use crate::database::Database;

/// Path of the SQLite file: `database.path` from the config, otherwise
/// `<data_local_dir>/fiscaldesk/fiscaldesk.sqlite`
///
/// - **macOS**: `~/Library/Application Support/fiscaldesk/fiscaldesk.sqlite`
/// - **Linux**: `~/.local/share/fiscaldesk/fiscaldesk.sqlite`
/// - **Windows**: `%LOCALAPPDATA%\fiscaldesk\fiscaldesk.sqlite`
pub fn get_db_path(config: &ApiConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = config.database.as_ref().and_then(|d| d.path.clone()) {
        return Ok(path);
    }

    let data_dir = dirs::data_local_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))?;

    Ok(data_dir.join("fiscaldesk").join("fiscaldesk.sqlite"))
}

/// Open the database, migrating an existing file in place
pub fn initialize_database(config: &ApiConfig) -> anyhow::Result<Arc<Database>> {
    let db_path = get_db_path(config)?;
    let db = Database::new(&db_path, config.pool_size())?;
    tracing::info!("Database initialized at {:?}", db_path);
    Ok(Arc::new(db))
}
