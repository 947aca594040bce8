use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Closed set of user roles. Stored as snake_case strings; anything else
/// fails to deserialize, both on incoming payloads and when reading the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    Manager,
    RestaurantManager,
    Admin,
}

impl Role {
    #[cfg(test)]
    pub const ALL: [Role; 4] = [
        Role::Customer,
        Role::Manager,
        Role::RestaurantManager,
        Role::Admin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Manager => "manager",
            Role::RestaurantManager => "restaurant_manager",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

/// User record as persisted in `users.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String, // argon2 PHC string
    pub name: String,
    pub age: u8,
    pub gender: Gender,
    pub role: Role,
    #[serde(default)]
    pub session_token: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub session_expires_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub reset_token: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub reset_expires_at: Option<OffsetDateTime>,
}
