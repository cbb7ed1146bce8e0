use actix_web::{web, HttpResponse};
use shared_types::UpdatePreferencesRequest;
use std::sync::Arc;

use super::error::ApiError;
use crate::database::preferences::PreferencesStore;

pub async fn get_preferences(
    store: web::Data<Arc<dyn PreferencesStore>>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let prefs = store.get(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(prefs))
}

/// Partial update over the stored (or default) preferences
pub async fn update_preferences(
    store: web::Data<Arc<dyn PreferencesStore>>,
    path: web::Path<i64>,
    request: web::Json<UpdatePreferencesRequest>,
) -> Result<HttpResponse, ApiError> {
    let mut prefs = store.get(path.into_inner()).await?;
    request.apply_to(&mut prefs);
    let saved = store.put(&prefs).await?;

    Ok(HttpResponse::Ok().json(saved))
}
