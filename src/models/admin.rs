// src/models/admin.rs

use serde::Deserialize;
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'admins' table in the database.
#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: i64,

    /// Unique login name.
    pub username: String,

    /// Argon2 password hash. Never leaves the server.
    pub password_hash: String,
}

/// DTO for admin login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 50))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
    /// How the session token is handed back. Browsers get the cookie.
    #[serde(default)]
    pub session: SessionDelivery,
}

/// Where a successful login puts the session token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionDelivery {
    /// `HttpOnly` cookie only; the token never reaches page scripts.
    #[default]
    Cookie,
    /// Token in the JSON body for `Authorization: Bearer` clients; no cookie.
    Bearer,
}
