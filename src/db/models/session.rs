//! Admin session model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One authenticated admin login. Keyed by the SHA-256 hash of the opaque
/// session token; the raw token only ever lives in the admin's cookie.
/// Expired rows are inert and are cleaned up by the session sweep.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AdminSession {
    pub token_hash: String,
    pub email: String,
    pub expires_at: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
}
