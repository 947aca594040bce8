use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod error;
pub(crate) mod extractors;
pub mod guard;
pub mod handlers;
pub mod notifier;
mod password;
mod repo;
pub mod repo_types;
pub mod services;
mod tokens;

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::me_routes())
}
