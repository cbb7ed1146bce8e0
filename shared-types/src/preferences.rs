use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ParseEnumError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Theme::Light
    }
}

impl std::str::FromStr for Theme {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(ParseEnumError::new("Theme", other)),
        }
    }
}

/// Per-user interface preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    pub usuario_id: i64,
    pub sidebar_collapsed: bool,
    pub theme: Theme,
    pub updated_at: Option<i64>,
}

impl UserPreferences {
    pub fn defaults_for(usuario_id: i64, sidebar_collapsed: bool, theme: Theme) -> Self {
        Self {
            usuario_id,
            sidebar_collapsed,
            theme,
            updated_at: None,
        }
    }
}

#[derive(Debug, Default, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencesRequest {
    pub sidebar_collapsed: Option<bool>,
    pub theme: Option<Theme>,
}

impl UpdatePreferencesRequest {
    pub fn apply_to(&self, prefs: &mut UserPreferences) {
        if let Some(collapsed) = self.sidebar_collapsed {
            prefs.sidebar_collapsed = collapsed;
        }
        if let Some(theme) = self.theme {
            prefs.theme = theme;
        }
    }
}
