use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::auth::{error::AuthError, repo_types::User, services::validate_session};
use crate::error::AppError;
use crate::state::AppState;

/// Resolves the `Authorization` header to the calling user before the
/// handler body runs.
pub struct AuthUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .ok_or(AuthError::MissingHeader)?
            .to_str()
            .map_err(|_| AuthError::MalformedHeader)?;

        let user = validate_session(state, header).await.map_err(|e| {
            tracing::warn!(error = %e, "request rejected");
            e
        })?;
        Ok(AuthUser(user))
    }
}
