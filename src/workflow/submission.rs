//! Submission workflow: validate -> moderate -> optional enhancement ->
//! persist as pending.
//!
//! Persistence is the last step, so a failure anywhere in the chain never
//! leaves a partial row behind.

use chrono::Utc;

use crate::ai::ModelGateway;
use crate::api::validation::validate_submission;
use crate::db::DbPool;

use super::{invalidate_feed, FeedSignal, SubmitResult};

/// A visitor-submitted message before it enters the workflow.
#[derive(Debug, Clone, Default)]
pub struct NewSubmission {
    pub name: String,
    pub email: Option<String>,
    pub message: String,
    pub enhance_type: Option<String>,
    pub target_language: Option<String>,
}

/// The enhancement the visitor asked for. Anything unrecognized, and
/// translation without a target language, falls back to the original text.
#[derive(Debug, Clone, PartialEq)]
enum EnhancementPlan {
    Original,
    Emoji,
    Translate(String),
}

impl EnhancementPlan {
    fn from_request(enhance_type: Option<&str>, target_language: Option<&str>) -> Self {
        match enhance_type {
            Some("emoji") => EnhancementPlan::Emoji,
            Some("translate") => match target_language {
                Some(lang) if !lang.is_empty() => EnhancementPlan::Translate(lang.to_string()),
                _ => EnhancementPlan::Original,
            },
            _ => EnhancementPlan::Original,
        }
    }
}

enum Outcome {
    Flagged(Option<String>),
    Created,
}

/// Run the full submission workflow for one visitor message.
pub async fn submit_message(
    db: &DbPool,
    gateway: &dyn ModelGateway,
    feed: &FeedSignal,
    submission: NewSubmission,
) -> SubmitResult {
    // Validation failures are terminal and reported verbatim; no external
    // call has happened yet.
    if let Err(error) = validate_submission(&submission.name, &submission.message) {
        return SubmitResult::failure(error);
    }

    match run_submission(db, gateway, submission).await {
        Ok(Outcome::Flagged(reason)) => SubmitResult::failure(format!(
            "Your message was flagged by our AI moderator: {}",
            reason.as_deref().unwrap_or("Content policy violation")
        ))
        .with_moderation_passed(false),
        Ok(Outcome::Created) => {
            invalidate_feed(feed);
            SubmitResult::ok("Your message has been submitted and is awaiting admin approval!")
                .with_moderation_passed(true)
        }
        Err(error) => {
            tracing::error!(error = %error, "Failed to submit guestbook message");
            SubmitResult::failure("Failed to submit message. Please try again.")
        }
    }
}

async fn run_submission(
    db: &DbPool,
    gateway: &dyn ModelGateway,
    submission: NewSubmission,
) -> anyhow::Result<Outcome> {
    // Moderation always sees the original text, never an enhanced variant.
    let verdict = gateway.moderate(&submission.message).await?;
    if !verdict.is_appropriate {
        tracing::info!(
            confidence = verdict.confidence,
            reason = verdict.reason.as_deref().unwrap_or("unspecified"),
            "Submission flagged by moderator"
        );
        return Ok(Outcome::Flagged(verdict.reason));
    }

    let plan = EnhancementPlan::from_request(
        submission.enhance_type.as_deref(),
        submission.target_language.as_deref(),
    );

    let mut stored_message = submission.message.clone();
    let mut original_message: Option<String> = None;
    let mut enhanced_type = "original";
    let mut language = "en".to_string();

    match plan {
        EnhancementPlan::Emoji => {
            let conversion = gateway.convert_to_emoji(&submission.message).await?;
            original_message = Some(submission.message.clone());
            stored_message = conversion.emoji_message;
            enhanced_type = "emoji";
        }
        EnhancementPlan::Translate(target) => {
            let translation = gateway.translate(&submission.message, &target).await?;
            original_message = Some(submission.message.clone());
            stored_message = translation.translated_text;
            enhanced_type = "translated";
            language = target;
        }
        EnhancementPlan::Original => {}
    }

    // An empty email field is stored as absent.
    let email = submission.email.filter(|email| !email.is_empty());

    let now = Utc::now().to_rfc3339();
    sqlx::query(
        "INSERT INTO guestbook_messages \
         (name, email, message, original_message, enhanced_type, language, status, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, 'pending', ?, ?)",
    )
    .bind(&submission.name)
    .bind(&email)
    .bind(&stored_message)
    .bind(&original_message)
    .bind(enhanced_type)
    .bind(&language)
    .bind(&now)
    .bind(&now)
    .execute(db)
    .await?;

    Ok(Outcome::Created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{EmojiConversion, Translation};
    use crate::db::Message;
    use crate::workflow::testing::{feed, memory_db, MockGateway};

    fn submission(message: &str) -> NewSubmission {
        NewSubmission {
            name: "Ada".to_string(),
            message: message.to_string(),
            ..NewSubmission::default()
        }
    }

    async fn stored_messages(db: &crate::db::DbPool) -> Vec<Message> {
        sqlx::query_as("SELECT * FROM guestbook_messages ORDER BY id")
            .fetch_all(db)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_name_or_message_is_rejected() {
        let db = memory_db().await;
        let gateway = MockGateway::approving();
        let feed = feed();

        for submission in [
            NewSubmission {
                message: "hello".to_string(),
                ..NewSubmission::default()
            },
            NewSubmission {
                name: "Ada".to_string(),
                ..NewSubmission::default()
            },
        ] {
            let result = submit_message(&db, &gateway, &feed, submission).await;
            assert!(!result.success);
            assert_eq!(
                result.error.as_deref(),
                Some("Name and message are required")
            );
            assert!(result.moderation_passed.is_none());
        }

        assert!(stored_messages(&db).await.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_name_is_rejected() {
        let db = memory_db().await;
        let result = submit_message(
            &db,
            &MockGateway::approving(),
            &feed(),
            NewSubmission {
                name: "x".repeat(101),
                message: "hello".to_string(),
                ..NewSubmission::default()
            },
        )
        .await;

        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Name must be 100 characters or less")
        );
        assert!(stored_messages(&db).await.is_empty());
    }

    #[tokio::test]
    async fn test_oversized_message_is_rejected() {
        let db = memory_db().await;
        let result = submit_message(
            &db,
            &MockGateway::approving(),
            &feed(),
            submission(&"y".repeat(1001)),
        )
        .await;

        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Message must be 1000 characters or less")
        );
        assert!(stored_messages(&db).await.is_empty());
    }

    #[tokio::test]
    async fn test_flagged_message_is_not_stored() {
        let db = memory_db().await;
        let result = submit_message(
            &db,
            &MockGateway::flagging(Some("Spam content")),
            &feed(),
            submission("BUY NOW!!!"),
        )
        .await;

        assert!(!result.success);
        assert_eq!(result.moderation_passed, Some(false));
        assert!(result.error.unwrap().contains("Spam content"));
        assert!(stored_messages(&db).await.is_empty());
    }

    #[tokio::test]
    async fn test_flagged_without_reason_uses_default() {
        let db = memory_db().await;
        let result = submit_message(
            &db,
            &MockGateway::flagging(None),
            &feed(),
            submission("borderline"),
        )
        .await;

        assert_eq!(
            result.error.as_deref(),
            Some("Your message was flagged by our AI moderator: Content policy violation")
        );
    }

    #[tokio::test]
    async fn test_plain_submission_is_stored_pending() {
        let db = memory_db().await;
        let feed = feed();
        let mut generation = feed.subscribe();

        let result = submit_message(
            &db,
            &MockGateway::approving(),
            &feed,
            NewSubmission {
                name: "Ada".to_string(),
                email: Some("".to_string()),
                message: "hello there".to_string(),
                ..NewSubmission::default()
            },
        )
        .await;

        assert!(result.success);
        assert_eq!(result.moderation_passed, Some(true));
        assert_eq!(
            result.message.as_deref(),
            Some("Your message has been submitted and is awaiting admin approval!")
        );

        let rows = stored_messages(&db).await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, "pending");
        assert_eq!(rows[0].message, "hello there");
        assert_eq!(rows[0].enhanced_type, "original");
        assert_eq!(rows[0].language, "en");
        assert!(rows[0].original_message.is_none());
        // Empty email is stored as absent.
        assert!(rows[0].email.is_none());
        assert!(rows[0].approved_at.is_none());

        // The feed signal moved once.
        assert!(generation.has_changed().unwrap());
        assert_eq!(*generation.borrow_and_update(), 1);
    }

    #[tokio::test]
    async fn test_emoji_enhancement_keeps_original_text() {
        let db = memory_db().await;
        let gateway = MockGateway {
            emoji: Some(EmojiConversion {
                emoji_message: "🎉✨🙌".to_string(),
            }),
            ..MockGateway::approving()
        };

        let result = submit_message(
            &db,
            &gateway,
            &feed(),
            NewSubmission {
                name: "Ada".to_string(),
                message: "what a great party".to_string(),
                enhance_type: Some("emoji".to_string()),
                ..NewSubmission::default()
            },
        )
        .await;

        assert!(result.success);
        let rows = stored_messages(&db).await;
        assert_eq!(rows[0].message, "🎉✨🙌");
        assert_eq!(
            rows[0].original_message.as_deref(),
            Some("what a great party")
        );
        assert_eq!(rows[0].enhanced_type, "emoji");
        assert_eq!(rows[0].language, "en");
    }

    #[tokio::test]
    async fn test_translation_enhancement_sets_language() {
        let db = memory_db().await;
        let gateway = MockGateway {
            translation: Some(Translation {
                translated_text: "Hola mundo".to_string(),
                detected_language: Some("en".to_string()),
            }),
            ..MockGateway::approving()
        };

        let result = submit_message(
            &db,
            &gateway,
            &feed(),
            NewSubmission {
                name: "Ada".to_string(),
                message: "Hello world".to_string(),
                enhance_type: Some("translate".to_string()),
                target_language: Some("es".to_string()),
                ..NewSubmission::default()
            },
        )
        .await;

        assert!(result.success);
        let rows = stored_messages(&db).await;
        assert_eq!(rows[0].message, "Hola mundo");
        assert_eq!(rows[0].original_message.as_deref(), Some("Hello world"));
        assert_eq!(rows[0].enhanced_type, "translated");
        assert_eq!(rows[0].language, "es");
    }

    #[tokio::test]
    async fn test_translate_without_target_language_stores_original() {
        let db = memory_db().await;
        let result = submit_message(
            &db,
            &MockGateway::approving(),
            &feed(),
            NewSubmission {
                name: "Ada".to_string(),
                message: "Hello world".to_string(),
                enhance_type: Some("translate".to_string()),
                ..NewSubmission::default()
            },
        )
        .await;

        assert!(result.success);
        let rows = stored_messages(&db).await;
        assert_eq!(rows[0].message, "Hello world");
        assert_eq!(rows[0].enhanced_type, "original");
        assert!(rows[0].original_message.is_none());
    }

    #[tokio::test]
    async fn test_gateway_failure_is_generic_and_writes_nothing() {
        let db = memory_db().await;
        // No scripted moderation result: the remote call fails.
        let result = submit_message(
            &db,
            &MockGateway::default(),
            &feed(),
            submission("hello"),
        )
        .await;

        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Failed to submit message. Please try again.")
        );
        assert!(result.moderation_passed.is_none());
        assert!(stored_messages(&db).await.is_empty());
    }

    #[tokio::test]
    async fn test_enhancement_failure_after_moderation_writes_nothing() {
        let db = memory_db().await;
        // Moderation passes but the emoji call fails.
        let result = submit_message(
            &db,
            &MockGateway::approving(),
            &feed(),
            NewSubmission {
                name: "Ada".to_string(),
                message: "hello".to_string(),
                enhance_type: Some("emoji".to_string()),
                ..NewSubmission::default()
            },
        )
        .await;

        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("Failed to submit message. Please try again.")
        );
        assert!(stored_messages(&db).await.is_empty());
    }
}
