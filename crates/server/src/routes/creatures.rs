use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use tracing::debug;

use service::catalog::Creature;

use crate::errors::JsonApiError;
use crate::startup::AppState;
use crate::validation;

pub async fn create(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Creature>), JsonApiError> {
    let input = validation::parse_body(&body)
        .and_then(|map| validation::new_creature(&map))
        .map_err(JsonApiError::validation)?;
    let created = state.catalog.create(input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Serves the shared cached page without copying it.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Arc<Vec<Creature>>>, JsonApiError> {
    let pagination = validation::pagination(&query).map_err(JsonApiError::validation)?;
    let page = state.catalog.find_all(pagination).await?;
    debug!(count = page.len(), "listing served");
    Ok(Json(page))
}

pub async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Creature>, JsonApiError> {
    let id = validation::path_id(&id).map_err(JsonApiError::validation)?;
    Ok(Json(state.catalog.find_one(id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<Creature>, JsonApiError> {
    let id = validation::path_id(&id).map_err(JsonApiError::validation)?;
    let patch = validation::parse_body(&body)
        .and_then(|map| validation::creature_patch(&map))
        .map_err(JsonApiError::validation)?;
    Ok(Json(state.catalog.update(id, patch).await?))
}

/// Plain-text confirmation, e.g. `Creature pikachu removed`.
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<String, JsonApiError> {
    let id = validation::path_id(&id).map_err(JsonApiError::validation)?;
    Ok(state.catalog.remove(id).await?)
}
