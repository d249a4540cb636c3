//! Message workflows.
//!
//! Submission: validate -> moderate -> optional enhancement -> persist.
//! Moderation: authorize -> conditional status transition -> persist.
//! Every operation returns a [`SubmitResult`] so callers never see a raw
//! error; operator detail goes to the logs instead.

pub mod moderation;
pub mod submission;

use serde::{Deserialize, Serialize};

/// Invalidation signal for public listings of approved messages.
///
/// The workflows only signal "data changed"; the display layer is a
/// passive subscriber that re-fetches when the generation moves.
pub type FeedSignal = tokio::sync::watch::Sender<u64>;

pub fn invalidate_feed(feed: &FeedSignal) {
    feed.send_modify(|generation| *generation += 1);
}

/// Outcome envelope shared by submission and moderation operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moderation_passed: Option<bool>,
}

impl SubmitResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
            moderation_passed: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
            moderation_passed: None,
        }
    }

    pub fn with_moderation_passed(mut self, passed: bool) -> Self {
        self.moderation_passed = Some(passed);
        self
    }
}

/// The authenticated admin on whose behalf a moderation decision runs.
/// Resolved from a live session by the authentication gate.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminIdentity {
    pub email: String,
}

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use sqlx::sqlite::SqlitePoolOptions;

    use crate::ai::{EmojiConversion, GatewayError, ModelGateway, Moderation, Translation};
    use crate::db::DbPool;

    use super::FeedSignal;

    /// Scripted gateway for workflow tests. A `None` capability simulates
    /// a remote failure.
    #[derive(Debug, Default)]
    pub struct MockGateway {
        pub moderation: Option<Moderation>,
        pub translation: Option<Translation>,
        pub emoji: Option<EmojiConversion>,
    }

    impl MockGateway {
        /// A gateway whose moderator approves everything.
        pub fn approving() -> Self {
            Self {
                moderation: Some(Moderation {
                    is_appropriate: true,
                    reason: None,
                    confidence: 0.99,
                }),
                ..Self::default()
            }
        }

        pub fn flagging(reason: Option<&str>) -> Self {
            Self {
                moderation: Some(Moderation {
                    is_appropriate: false,
                    reason: reason.map(String::from),
                    confidence: 0.97,
                }),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl ModelGateway for MockGateway {
        async fn moderate(&self, _message: &str) -> Result<Moderation, GatewayError> {
            self.moderation.clone().ok_or(GatewayError::Empty)
        }

        async fn translate(
            &self,
            _message: &str,
            _target_language: &str,
        ) -> Result<Translation, GatewayError> {
            self.translation.clone().ok_or(GatewayError::Empty)
        }

        async fn convert_to_emoji(&self, _message: &str) -> Result<EmojiConversion, GatewayError> {
            self.emoji.clone().ok_or(GatewayError::Empty)
        }
    }

    /// Fresh in-memory database with migrations applied. A single
    /// connection keeps every query on the same memory database.
    pub async fn memory_db() -> DbPool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        crate::db::run_migrations(&pool).await.unwrap();
        pool
    }

    pub fn feed() -> FeedSignal {
        tokio::sync::watch::channel(0).0
    }
}
