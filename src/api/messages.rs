//! Guestbook message endpoints: visitor submission, the public feed, and
//! the admin listing/decision surface.

use axum::{
    extract::{Path, Query, State},
    Form, Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::sync::Arc;

use crate::db::{Message, PublicMessage};
use crate::workflow::moderation::{decide, Decision};
use crate::workflow::submission::{submit_message, NewSubmission};
use crate::workflow::SubmitResult;
use crate::AppState;

use super::auth::{self, Admin};
use super::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SubmitForm {
    #[serde(default)]
    pub name: String,
    pub email: Option<String>,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "enhanceType")]
    pub enhance_type: Option<String>,
    #[serde(rename = "targetLanguage")]
    pub target_language: Option<String>,
}

/// Submit a new guestbook message
///
/// POST /api/guestbook
pub async fn submit(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SubmitForm>,
) -> Json<SubmitResult> {
    let submission = NewSubmission {
        name: form.name,
        email: form.email,
        message: form.message,
        enhance_type: form.enhance_type,
        target_language: form.target_language,
    };

    Json(submit_message(&state.db, state.gateway.as_ref(), &state.feed, submission).await)
}

/// Public feed of approved messages, newest approval first.
///
/// GET /api/guestbook
pub async fn list_approved(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PublicMessage>>, ApiError> {
    let messages: Vec<Message> = sqlx::query_as(
        "SELECT * FROM guestbook_messages WHERE status = 'approved' \
         ORDER BY approved_at DESC LIMIT 100",
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(messages.into_iter().map(PublicMessage::from).collect()))
}

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
    pub status: Option<String>,
}

/// Admin listing of messages, optionally filtered by status.
///
/// GET /api/admin/messages
pub async fn list_for_admin(
    State(state): State<Arc<AppState>>,
    _admin: Admin,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Message>>, ApiError> {
    let messages: Vec<Message> = match params.status.as_deref() {
        Some(status @ ("pending" | "approved" | "rejected")) => sqlx::query_as(
            "SELECT * FROM guestbook_messages WHERE status = ? ORDER BY created_at DESC",
        )
        .bind(status)
        .fetch_all(&state.db)
        .await?,
        _ => {
            sqlx::query_as("SELECT * FROM guestbook_messages ORDER BY created_at DESC LIMIT 200")
                .fetch_all(&state.db)
                .await?
        }
    };

    Ok(Json(messages))
}

#[derive(Debug, Deserialize, Default)]
pub struct DecisionRequest {
    pub notes: Option<String>,
}

/// Approve a pending message
///
/// POST /api/admin/messages/:id/approve
pub async fn approve(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<i64>,
    body: Option<Json<DecisionRequest>>,
) -> Json<SubmitResult> {
    decision(state, jar, id, body, Decision::Approve).await
}

/// Reject a pending message
///
/// POST /api/admin/messages/:id/reject
pub async fn reject(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Path(id): Path<i64>,
    body: Option<Json<DecisionRequest>>,
) -> Json<SubmitResult> {
    decision(state, jar, id, body, Decision::Reject).await
}

async fn decision(
    state: Arc<AppState>,
    jar: CookieJar,
    id: i64,
    body: Option<Json<DecisionRequest>>,
    decision: Decision,
) -> Json<SubmitResult> {
    let notes = body.and_then(|Json(request)| request.notes);
    // The workflow owns the unauthorized outcome, so the admin is resolved
    // here rather than through the rejecting extractor.
    let admin = auth::current_admin(&state.db, &jar).await;

    Json(decide(&state.db, &state.feed, admin.as_ref(), id, notes, decision).await)
}
