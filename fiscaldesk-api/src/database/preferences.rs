use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use shared_types::{Theme, UserPreferences};

use super::{now, parse_column, AsyncDbConnection, DbResult};

/// Per-user UI preferences, with configured defaults for users that never saved any
#[async_trait]
pub trait PreferencesStore: Send + Sync {
    async fn get(&self, usuario_id: i64) -> DbResult<UserPreferences>;
    async fn put(&self, prefs: &UserPreferences) -> DbResult<UserPreferences>;
}

pub struct SqlitePreferencesStore {
    conn: AsyncDbConnection,
    default_sidebar_collapsed: bool,
    default_theme: Theme,
}

impl SqlitePreferencesStore {
    pub fn new(conn: AsyncDbConnection, default_sidebar_collapsed: bool, default_theme: Theme) -> Self {
        Self {
            conn,
            default_sidebar_collapsed,
            default_theme,
        }
    }
}

#[async_trait]
impl PreferencesStore for SqlitePreferencesStore {
    async fn get(&self, usuario_id: i64) -> DbResult<UserPreferences> {
        let conn = self.conn.lock().await?;

        let stored = conn
            .query_row(
                "SELECT usuario_id, sidebar_collapsed, theme, updated_at
                 FROM user_preferences WHERE usuario_id = ?1",
                [usuario_id],
                |row| {
                    Ok(UserPreferences {
                        usuario_id: row.get(0)?,
                        sidebar_collapsed: row.get(1)?,
                        theme: parse_column(row, 2)?,
                        updated_at: row.get(3)?,
                    })
                },
            )
            .optional()?;

        Ok(stored.unwrap_or_else(|| {
            UserPreferences::defaults_for(usuario_id, self.default_sidebar_collapsed, self.default_theme)
        }))
    }

    async fn put(&self, prefs: &UserPreferences) -> DbResult<UserPreferences> {
        let conn = self.conn.lock().await?;
        let ts = now();

        conn.execute(
            "INSERT INTO user_preferences (usuario_id, sidebar_collapsed, theme, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (usuario_id) DO UPDATE SET
                sidebar_collapsed = excluded.sidebar_collapsed,
                theme = excluded.theme,
                updated_at = excluded.updated_at",
            params![prefs.usuario_id, prefs.sidebar_collapsed, prefs.theme.as_str(), ts],
        )?;

        Ok(UserPreferences {
            updated_at: Some(ts),
            ..prefs.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_support::test_db;
    use shared_types::UpdatePreferencesRequest;

    #[tokio::test]
    async fn test_defaults_until_saved() {
        let (_dir, db) = test_db();
        let store = SqlitePreferencesStore::new(db.async_connection.clone(), true, Theme::Dark);

        let prefs = store.get(7).await.unwrap();
        assert_eq!(prefs, UserPreferences::defaults_for(7, true, Theme::Dark));
    }

    #[tokio::test]
    async fn test_put_then_get_round_trips_partial_update() {
        let (_dir, db) = test_db();
        let store = SqlitePreferencesStore::new(db.async_connection.clone(), false, Theme::Light);

        let mut prefs = store.get(3).await.unwrap();
        UpdatePreferencesRequest {
            theme: Some(Theme::Dark),
            ..Default::default()
        }
        .apply_to(&mut prefs);
        let saved = store.put(&prefs).await.unwrap();

        let loaded = store.get(3).await.unwrap();
        assert_eq!(loaded, saved);
        assert_eq!(loaded.theme, Theme::Dark);
        assert!(!loaded.sidebar_collapsed);
        assert!(loaded.updated_at.is_some());
    }
}
