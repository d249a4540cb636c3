//! Admin authentication gate.
//!
//! A single configured identity/secret pair, verified in constant time.
//! Successful login mints an opaque token, stores its SHA-256 hash with a
//! 7-day expiry, and hands the raw token back in an HTTP-only cookie.
//! Expired or absent sessions are treated identically to "not
//! authenticated".

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::request::Parts,
    Json,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::Rng;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use subtle::ConstantTimeEq;

use crate::config::AuthConfig;
use crate::db::{AdminSession, DbPool, LoginRequest, LoginResponse};
use crate::workflow::AdminIdentity;
use crate::AppState;
use serde::Serialize;

use super::error::ApiError;

pub const SESSION_COOKIE: &str = "admin_session";

/// Generate a random session token
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    hex::encode(bytes)
}

/// Hash a token for storage
fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-time equality for credential material.
fn secrets_match(configured: &str, provided: &str) -> bool {
    let configured = configured.as_bytes();
    let provided = provided.as_bytes();
    configured.len() == provided.len() && configured.ct_eq(provided).into()
}

/// Check a login attempt against the configured admin pair. An empty
/// configured password never matches anything.
pub fn verify_credentials(config: &AuthConfig, email: &str, password: &str) -> bool {
    if config.admin_password.is_empty() {
        return false;
    }
    let email_ok = secrets_match(&config.admin_email, email);
    let password_ok = secrets_match(&config.admin_password, password);
    email_ok && password_ok
}

/// Mint a session for the given admin and return the raw token.
pub async fn create_session(
    db: &DbPool,
    email: &str,
    ttl_days: i64,
) -> Result<String, sqlx::Error> {
    let token = generate_token();
    let now = chrono::Utc::now();
    let expires_at = now + chrono::Duration::days(ttl_days);

    sqlx::query(
        "INSERT INTO admin_sessions (token_hash, email, expires_at, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(hash_token(&token))
    .bind(email)
    .bind(expires_at.to_rfc3339())
    .bind(now.to_rfc3339())
    .execute(db)
    .await?;

    Ok(token)
}

/// Resolve the current caller to a live admin session, if any.
pub async fn current_admin(db: &DbPool, jar: &CookieJar) -> Option<AdminIdentity> {
    let token = jar.get(SESSION_COOKIE)?.value().to_string();

    let session: Option<AdminSession> =
        sqlx::query_as("SELECT * FROM admin_sessions WHERE token_hash = ? AND expires_at > ?")
            .bind(hash_token(&token))
            .bind(chrono::Utc::now().to_rfc3339())
            .fetch_optional(db)
            .await
            .ok()
            .flatten();

    session.map(|session| AdminIdentity {
        email: session.email,
    })
}

fn session_cookie(token: String, ttl_days: i64) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(ttl_days))
        .build()
}

/// Login endpoint
///
/// POST /api/admin/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    if request.email.is_empty() || request.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    if !verify_credentials(&state.config.auth, &request.email, &request.password) {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    let ttl_days = state.config.auth.session_ttl_days;
    let token = create_session(&state.db, &request.email, ttl_days)
        .await
        .map_err(|error| {
            tracing::error!(error = %error, "Failed to create admin session");
            ApiError::internal("An error occurred during login")
        })?;

    tracing::info!(email = %request.email, "Admin logged in");

    Ok((
        jar.add(session_cookie(token, ttl_days)),
        Json(LoginResponse { success: true }),
    ))
}

/// Logout endpoint. Idempotent: absence of a session is not an error.
///
/// POST /api/admin/logout
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<LoginResponse>) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        let token_hash = hash_token(cookie.value());
        if let Err(error) = sqlx::query("DELETE FROM admin_sessions WHERE token_hash = ?")
            .bind(&token_hash)
            .execute(&state.db)
            .await
        {
            tracing::warn!(error = %error, "Failed to delete admin session");
        }
    }

    (
        jar.remove(Cookie::build(SESSION_COOKIE).path("/")),
        Json(LoginResponse { success: true }),
    )
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub email: String,
}

/// Current session endpoint
///
/// GET /api/admin/session
pub async fn session(Admin(admin): Admin) -> Json<SessionResponse> {
    Json(SessionResponse { email: admin.email })
}

/// Extractor for endpoints that require an authenticated admin.
pub struct Admin(pub AdminIdentity);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Admin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        current_admin(&state.db, &jar)
            .await
            .map(Admin)
            .ok_or_else(|| ApiError::unauthorized("Unauthorized - admin login required"))
    }
}

/// Periodically delete expired session rows. Lazy expiry already keeps
/// them inert; this just stops the table from growing forever.
pub fn spawn_session_sweep(db: DbPool) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(tokio::time::Duration::from_secs(3600));
        loop {
            tick.tick().await;
            match sqlx::query("DELETE FROM admin_sessions WHERE expires_at <= ?")
                .bind(chrono::Utc::now().to_rfc3339())
                .execute(&db)
                .await
            {
                Ok(result) if result.rows_affected() > 0 => {
                    tracing::debug!(removed = result.rows_affected(), "Swept expired sessions");
                }
                Ok(_) => {}
                Err(error) => {
                    tracing::warn!(error = %error, "Session sweep failed");
                }
            }
        }
    });
}
