use uuid::Uuid;

use crate::auth::{repo_types::User, tokens::constant_time_eq};

impl User {
    /// Find a user by exact email.
    pub fn find_by_email<'a>(users: &'a mut [User], email: &str) -> Option<&'a mut User> {
        users.iter_mut().find(|u| u.email == email)
    }

    pub fn find_by_id(users: &[User], id: Uuid) -> Option<&User> {
        users.iter().find(|u| u.id == id)
    }

    pub fn find_by_id_mut(users: &mut [User], id: Uuid) -> Option<&mut User> {
        users.iter_mut().find(|u| u.id == id)
    }

    /// Find the holder of a session token.
    pub fn find_by_session_token<'a>(users: &'a [User], token: &str) -> Option<&'a User> {
        users.iter().find(|u| {
            u.session_token
                .as_deref()
                .is_some_and(|t| constant_time_eq(t, token))
        })
    }

    /// Find the holder of a reset token.
    pub fn find_by_reset_token<'a>(users: &'a mut [User], token: &str) -> Option<&'a mut User> {
        users.iter_mut().find(|u| {
            u.reset_token
                .as_deref()
                .is_some_and(|t| constant_time_eq(t, token))
        })
    }

    /// True if some user other than `except` already owns `email`.
    pub fn email_taken(users: &[User], email: &str, except: Option<Uuid>) -> bool {
        users
            .iter()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}
