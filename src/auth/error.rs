use axum::http::StatusCode;

use crate::storage::StoreError;

/// Failures of the credential manager and the access guard.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Invalid authorization header format")]
    MalformedHeader,

    #[error("Invalid or expired session token")]
    InvalidToken,

    #[error("Session token has expired, please log in again")]
    SessionExpired,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Invalid reset token")]
    InvalidResetToken,

    #[error("Reset token has expired")]
    ResetTokenExpired,

    #[error("Old password is incorrect")]
    IncorrectOldPassword,

    #[error("User '{0}' not found")]
    UserNotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    #[error("ID collision; retry")]
    IdCollision,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::MissingHeader
            | AuthError::MalformedHeader
            | AuthError::InvalidToken
            | AuthError::SessionExpired
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::InvalidResetToken
            | AuthError::ResetTokenExpired
            | AuthError::IncorrectOldPassword => StatusCode::BAD_REQUEST,
            AuthError::UserNotFound(_) => StatusCode::NOT_FOUND,
            AuthError::Forbidden(_) => StatusCode::FORBIDDEN,
            AuthError::Conflict(_) | AuthError::IdCollision => StatusCode::CONFLICT,
            AuthError::Hashing(_) | AuthError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for response bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingHeader => "missing_header",
            AuthError::MalformedHeader => "malformed_header",
            AuthError::InvalidToken => "invalid_token",
            AuthError::SessionExpired => "session_expired",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::InvalidResetToken => "invalid_reset_token",
            AuthError::ResetTokenExpired => "reset_token_expired",
            AuthError::IncorrectOldPassword => "incorrect_old_password",
            AuthError::UserNotFound(_) => "user_not_found",
            AuthError::Forbidden(_) => "forbidden",
            AuthError::Conflict(_) => "conflict",
            AuthError::IdCollision => "id_collision",
            AuthError::Hashing(_) | AuthError::Store(_) => "internal_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authentication_failures_are_401() {
        for err in [
            AuthError::MissingHeader,
            AuthError::MalformedHeader,
            AuthError::InvalidToken,
            AuthError::SessionExpired,
            AuthError::InvalidCredentials,
        ] {
            assert_eq!(err.status(), StatusCode::UNAUTHORIZED, "{err}");
        }
    }

    #[test]
    fn categories_map_to_stable_statuses() {
        assert_eq!(AuthError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(AuthError::UserNotFound("u".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(AuthError::IdCollision.status(), StatusCode::CONFLICT);
        assert_eq!(AuthError::ResetTokenExpired.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AuthError::IncorrectOldPassword.code(), "incorrect_old_password");
    }
}
