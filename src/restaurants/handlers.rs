use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    auth::extractors::AuthUser,
    error::{AppError, AppJson, AppResult},
    restaurants::{
        dto::{
            BulkCreateMenuItems, BulkUpdateMenuItems, CreateMenuItemRequest,
            CreateRestaurantRequest, UpdateManagersRequest, UpdateMenuItemRequest,
            UpdateRestaurantRequest,
        },
        repo_types::{MenuItem, Restaurant},
        services,
    },
    state::AppState,
};

pub fn restaurant_routes() -> Router<AppState> {
    Router::new()
        .route("/restaurant", get(list_restaurants).post(create_restaurant))
        .route("/restaurant/:id", get(get_restaurant).put(update_restaurant))
        .route("/restaurant/:id/managers", put(update_managers))
        .route("/restaurant/:id/menu", post(create_menu_item))
        .route(
            "/restaurant/:id/menu/bulk",
            post(bulk_create_menu_items).put(bulk_update_menu_items),
        )
        .route("/restaurant/:id/menu/:item_id", put(update_menu_item))
}

fn same_id(what: &str, path: u64, body: u64) -> AppResult<()> {
    if path != body {
        return Err(AppError::BadRequest(format!(
            "{what} ID in path and body must match"
        )));
    }
    Ok(())
}

#[instrument(skip(state, caller, payload))]
pub async fn create_restaurant(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    AppJson(payload): AppJson<CreateRestaurantRequest>,
) -> AppResult<(StatusCode, Json<Restaurant>)> {
    let restaurant = services::create_restaurant(&state, &caller, payload).await?;
    Ok((StatusCode::CREATED, Json(restaurant)))
}

#[instrument(skip(state, _caller))]
pub async fn list_restaurants(
    State(state): State<AppState>,
    _caller: AuthUser,
) -> AppResult<Json<Vec<Restaurant>>> {
    Ok(Json(services::list_restaurants(&state).await?))
}

#[instrument(skip(state, _caller))]
pub async fn get_restaurant(
    State(state): State<AppState>,
    _caller: AuthUser,
    Path(id): Path<u64>,
) -> AppResult<Json<Restaurant>> {
    Ok(Json(services::get_restaurant(&state, id).await?))
}

#[instrument(skip(state, caller, payload))]
pub async fn update_restaurant(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<u64>,
    AppJson(payload): AppJson<UpdateRestaurantRequest>,
) -> AppResult<Json<Restaurant>> {
    same_id("Restaurant", id, payload.id)?;
    let restaurant = services::update_details(&state, &caller, payload).await?;
    info!(restaurant_id = id, by = %caller.id, "restaurant updated");
    Ok(Json(restaurant))
}

#[instrument(skip(state, caller, payload))]
pub async fn update_managers(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<u64>,
    AppJson(payload): AppJson<UpdateManagersRequest>,
) -> AppResult<Json<Restaurant>> {
    same_id("Restaurant", id, payload.id)?;
    Ok(Json(services::update_managers(&state, &caller, payload).await?))
}

#[instrument(skip(state, caller, payload))]
pub async fn create_menu_item(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<u64>,
    AppJson(payload): AppJson<CreateMenuItemRequest>,
) -> AppResult<(StatusCode, Json<MenuItem>)> {
    let item = services::create_menu_item(&state, &caller, id, payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

#[instrument(skip(state, caller, payload))]
pub async fn update_menu_item(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path((id, item_id)): Path<(u64, u64)>,
    AppJson(payload): AppJson<UpdateMenuItemRequest>,
) -> AppResult<Json<MenuItem>> {
    same_id("Menu item", item_id, payload.id)?;
    Ok(Json(services::update_menu_item(&state, &caller, id, payload).await?))
}

#[instrument(skip(state, caller, payload))]
pub async fn bulk_create_menu_items(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<u64>,
    AppJson(payload): AppJson<BulkCreateMenuItems>,
) -> AppResult<(StatusCode, Json<Vec<MenuItem>>)> {
    let items = services::bulk_create_menu_items(&state, &caller, id, payload.items).await?;
    Ok((StatusCode::CREATED, Json(items)))
}

#[instrument(skip(state, caller, payload))]
pub async fn bulk_update_menu_items(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<u64>,
    AppJson(payload): AppJson<BulkUpdateMenuItems>,
) -> AppResult<Json<Vec<MenuItem>>> {
    Ok(Json(
        services::bulk_update_menu_items(&state, &caller, id, payload.items).await?,
    ))
}
