use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::{
        dto::{
            ChangePasswordRequest, Detail, LoginRequest, LoginResponse, RegisterRequest,
            ResetPasswordRequest, ResetRequest, UpdateProfileRequest, UserPublic,
        },
        extractors::AuthUser,
        guard,
        services::{self, is_valid_email},
    },
    error::{AppError, AppJson, AppResult},
    state::AppState,
};

const MIN_PASSWORD_LEN: usize = 8;
const MAX_AGE: u8 = 120;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/user", post(register))
        .route("/user/login", post(login))
        .route("/user/password-reset/request", post(request_reset))
        .route("/user/reset-password", post(reset_password))
        .route("/user/:user_id", get(get_user).put(update_user))
        .route("/user/:user_id/password", put(change_password))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn check_profile(email: &str, name: &str, age: u8) -> AppResult<()> {
    if !is_valid_email(email.trim()) {
        warn!(%email, "invalid email");
        return Err(AppError::Validation("email: invalid email".into()));
    }
    if name.trim().is_empty() {
        return Err(AppError::Validation("name: must not be blank".into()));
    }
    if age > MAX_AGE {
        return Err(AppError::Validation(format!("age: must be at most {MAX_AGE}")));
    }
    Ok(())
}

fn check_password(field: &str, password: &str) -> AppResult<()> {
    if password.trim().len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::Validation(format!(
            "{field}: must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserPublic>)> {
    check_profile(&payload.email, &payload.name, payload.age)?;
    check_password("password", &payload.password)?;

    let user = services::register(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let res = services::authenticate(&state, &payload.email, &payload.password).await?;
    info!(user_id = %res.user_id, "user logged in");
    Ok(Json(res))
}

#[instrument(skip(state, payload))]
pub async fn request_reset(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ResetRequest>,
) -> AppResult<Json<Detail>> {
    let detail = services::request_password_reset(&state, &payload.email).await?;
    Ok(Json(Detail { detail }))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    AppJson(payload): AppJson<ResetPasswordRequest>,
) -> AppResult<Json<Detail>> {
    check_password("new_password", &payload.new_password)?;
    services::complete_password_reset(&state, &payload.new_password, &payload.reset_token).await?;
    Ok(Json(Detail {
        detail: "Password reset successful.",
    }))
}

#[instrument(skip(state, caller))]
pub async fn get_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<UserPublic>> {
    guard::require_owner(&caller, user_id)?;
    Ok(Json(services::get_user(&state, user_id).await?))
}

#[instrument(skip(state, caller, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(user_id): Path<Uuid>,
    AppJson(payload): AppJson<UpdateProfileRequest>,
) -> AppResult<Json<UserPublic>> {
    guard::require_owner(&caller, user_id)?;
    check_profile(&payload.email, &payload.name, payload.age)?;
    let user = services::update_profile(&state, user_id, payload).await?;
    info!(%user_id, by = %caller.id, "profile updated");
    Ok(Json(user))
}

#[instrument(skip(state, caller, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(user_id): Path<Uuid>,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> AppResult<Json<Detail>> {
    guard::require_owner(&caller, user_id)?;
    check_password("new_password", &payload.new_password)?;
    services::update_password(&state, user_id, &payload.old_password, &payload.new_password)
        .await?;
    Ok(Json(Detail {
        detail: "Password updated.",
    }))
}

#[instrument(skip(caller))]
pub async fn get_me(AuthUser(caller): AuthUser) -> Json<UserPublic> {
    Json(UserPublic::from(&caller))
}
