pub mod auth;
mod error;
mod messages;
pub mod validation;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Visitor-facing routes
    let guestbook_routes = Router::new()
        .route("/guestbook", get(messages::list_approved))
        .route("/guestbook", post(messages::submit));

    // Admin routes. Login/logout are public; the listing endpoints guard
    // themselves via the Admin extractor, and the decision endpoints
    // resolve the session inside the moderation workflow.
    let admin_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::session))
        .route("/messages", get(messages::list_for_admin))
        .route("/messages/:id/approve", post(messages::approve))
        .route("/messages/:id/reject", post(messages::reject));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", guestbook_routes)
        .nest("/api/admin", admin_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
