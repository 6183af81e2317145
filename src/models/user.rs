//! Signed-in users.
//!
//! Users authenticate with a login token. Only the SHA-256 hash of the
//! token is stored, the same way API keys are handled elsewhere.

use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,

    /// SHA-256 hash of the login token (64 hex characters)
    pub login_token_hash: Option<String>,
}
