use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth::{
    dto::{LoginResponse, RegisterRequest, UpdateProfileRequest, UserPublic},
    error::AuthError,
    password::{hash_password_blocking, verify_dummy, verify_password_blocking},
    repo_types::User,
    tokens,
};
use crate::state::AppState;

/// Returned by every reset request, whether or not the email is known.
pub const RESET_ACK: &str = "If the email exists, a password reset link has been sent.";

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub async fn register(st: &AppState, payload: RegisterRequest) -> Result<UserPublic, AuthError> {
    let email = payload.email.trim().to_string();
    let password_hash = hash_password_blocking(payload.password.trim().to_string()).await?;
    let id = Uuid::new_v4();

    let user = st
        .users
        .update(|users| {
            if User::find_by_id(users, id).is_some() {
                return Err(AuthError::IdCollision);
            }
            if User::email_taken(users, &email, None) {
                return Err(AuthError::Conflict("Email already registered".into()));
            }
            let user = User {
                id,
                email,
                password_hash,
                name: payload.name.trim().to_string(),
                age: payload.age,
                gender: payload.gender,
                role: payload.role,
                session_token: None,
                session_expires_at: None,
                reset_token: None,
                reset_expires_at: None,
            };
            let public = UserPublic::from(&user);
            users.push(user);
            Ok(public)
        })
        .await?;

    info!(user_id = %user.id, role = %user.role, "user registered");
    Ok(user)
}

/// Checks email and password, then issues a fresh session token that
/// replaces whatever the user held before.
///
/// The password is verified against a snapshot, outside the users lock; the
/// write only happens if the stored hash is still the one that was checked.
pub async fn authenticate(
    st: &AppState,
    email: &str,
    password: &str,
) -> Result<LoginResponse, AuthError> {
    let email = email.trim();
    let password = password.trim();
    let ttl = st.config.tokens.session_ttl_secs;

    let mut users = st.users.read().await?;
    let candidate =
        User::find_by_email(&mut users, email).map(|u| (u.id, u.password_hash.clone()));
    drop(users);

    let Some((user_id, checked_hash)) = candidate else {
        verify_dummy(password.to_string()).await;
        warn!(%email, "login unknown email");
        return Err(AuthError::InvalidCredentials);
    };
    if !verify_password_blocking(password.to_string(), checked_hash.clone()).await? {
        warn!(%user_id, "login invalid password");
        return Err(AuthError::InvalidCredentials);
    }

    st.users
        .update(|users| {
            let user = User::find_by_id_mut(users, user_id)
                .filter(|u| u.password_hash == checked_hash)
                .ok_or(AuthError::InvalidCredentials)?;

            let (token, expires_at) = tokens::issue(ttl);
            user.session_token = Some(token.clone());
            user.session_expires_at = Some(expires_at);
            debug!(%user_id, %expires_at, "session token issued");

            Ok(LoginResponse {
                token,
                user_id,
                email: user.email.clone(),
                role: user.role,
                age: user.age,
                gender: user.gender,
                name: user.name.clone(),
            })
        })
        .await
}

/// Resolves a raw `Authorization` header to its user. Never extends the session.
pub async fn validate_session(st: &AppState, header: &str) -> Result<User, AuthError> {
    let token = tokens::parse_bearer(header).ok_or(AuthError::MalformedHeader)?;
    let users = st.users.read().await?;

    let user = User::find_by_session_token(&users, token).ok_or(AuthError::InvalidToken)?;
    if tokens::is_expired(user.session_expires_at, OffsetDateTime::now_utc()) {
        debug!(user_id = %user.id, "session token expired");
        return Err(AuthError::SessionExpired);
    }
    Ok(user.clone())
}

pub async fn request_password_reset(st: &AppState, email: &str) -> Result<&'static str, AuthError> {
    let email = email.trim();
    let ttl = st.config.tokens.reset_ttl_secs;

    // Both branches write the snapshot back; timing must not reveal whether the email exists.
    let issued = st
        .users
        .update(|users| {
            Ok::<_, AuthError>(User::find_by_email(users, email).map(|user| {
                let (token, expires_at) = tokens::issue(ttl);
                user.reset_token = Some(token.clone());
                user.reset_expires_at = Some(expires_at);
                (user.id, token, expires_at)
            }))
        })
        .await?;

    if let Some((user_id, token, expires_at)) = issued {
        debug!(%user_id, %expires_at, "reset token issued");
        if let Err(e) = st.notifier.send_reset_link(email, &token, expires_at).await {
            error!(error = %e, %user_id, "reset link delivery failed");
        }
    }
    Ok(RESET_ACK)
}

/// Consumes a reset token. An expired token is reported but left in place
/// until the next reset request overwrites it.
pub async fn complete_password_reset(
    st: &AppState,
    new_password: &str,
    reset_token: &str,
) -> Result<(), AuthError> {
    let password_hash = hash_password_blocking(new_password.trim().to_string()).await?;

    let user_id = st
        .users
        .update(|users| {
            let user =
                User::find_by_reset_token(users, reset_token).ok_or(AuthError::InvalidResetToken)?;
            if tokens::is_expired(user.reset_expires_at, OffsetDateTime::now_utc()) {
                return Err(AuthError::ResetTokenExpired);
            }
            user.password_hash = password_hash;
            user.reset_token = None;
            user.reset_expires_at = None;
            Ok(user.id)
        })
        .await?;

    info!(%user_id, "password reset completed");
    Ok(())
}

/// Password change for a logged-in user. `old_password` is compared as given.
pub async fn update_password(
    st: &AppState,
    user_id: Uuid,
    old_password: &str,
    new_password: &str,
) -> Result<(), AuthError> {
    let users = st.users.read().await?;
    let checked_hash = User::find_by_id(&users, user_id)
        .map(|u| u.password_hash.clone())
        .ok_or_else(|| AuthError::UserNotFound(user_id.to_string()))?;
    drop(users);

    if !verify_password_blocking(old_password.to_string(), checked_hash.clone()).await? {
        warn!(%user_id, "password change with wrong old password");
        return Err(AuthError::IncorrectOldPassword);
    }
    let password_hash = hash_password_blocking(new_password.trim().to_string()).await?;

    st.users
        .update(|users| {
            let user = User::find_by_id_mut(users, user_id)
                .ok_or_else(|| AuthError::UserNotFound(user_id.to_string()))?;
            // changed underneath us; the old password no longer applies
            if user.password_hash != checked_hash {
                return Err(AuthError::IncorrectOldPassword);
            }
            user.password_hash = password_hash;
            Ok(())
        })
        .await?;

    info!(%user_id, "password updated");
    Ok(())
}

pub async fn get_user(st: &AppState, user_id: Uuid) -> Result<UserPublic, AuthError> {
    let users = st.users.read().await?;
    User::find_by_id(&users, user_id)
        .map(UserPublic::from)
        .ok_or_else(|| AuthError::UserNotFound(user_id.to_string()))
}

pub async fn update_profile(
    st: &AppState,
    user_id: Uuid,
    payload: UpdateProfileRequest,
) -> Result<UserPublic, AuthError> {
    let email = payload.email.trim().to_string();

    st.users
        .update(|users| {
            if User::find_by_id(users, user_id).is_none() {
                return Err(AuthError::UserNotFound(user_id.to_string()));
            }
            if User::email_taken(users, &email, Some(user_id)) {
                return Err(AuthError::Conflict("Email already registered".into()));
            }
            let user = User::find_by_id_mut(users, user_id)
                .ok_or_else(|| AuthError::UserNotFound(user_id.to_string()))?;
            user.email = email;
            user.name = payload.name.trim().to_string();
            user.age = payload.age;
            user.gender = payload.gender;
            Ok(UserPublic::from(&*user))
        })
        .await
}
