use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::{AppJson, AppResult},
    items::{dto::ItemPayload, repo_types::Item, services},
    state::AppState,
};

pub fn item_routes() -> Router<AppState> {
    Router::new()
        .route("/items", get(list_items).post(create_item))
        .route(
            "/items/:id",
            get(get_item).put(update_item).delete(delete_item),
        )
}

#[instrument(skip(state))]
pub async fn list_items(State(state): State<AppState>) -> AppResult<Json<Vec<Item>>> {
    Ok(Json(services::list_items(&state).await?))
}

#[instrument(skip(state))]
pub async fn get_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Item>> {
    Ok(Json(services::get_item(&state, id).await?))
}

#[instrument(skip(state, caller, payload))]
pub async fn create_item(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    AppJson(payload): AppJson<ItemPayload>,
) -> AppResult<(StatusCode, Json<Item>)> {
    let item = services::create_item(&state, &caller, payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip(state, caller, payload))]
pub async fn update_item(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<ItemPayload>,
) -> AppResult<Json<Item>> {
    Ok(Json(services::update_item(&state, &caller, id, payload).await?))
}

#[instrument(skip(state, caller))]
pub async fn delete_item(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    services::delete_item(&state, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
