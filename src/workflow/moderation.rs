//! Moderation workflow: an admin decision moves a pending message to
//! `approved` or `rejected`. Decisions are final; there is no
//! re-moderation path.

use chrono::Utc;

use crate::db::DbPool;

use super::{invalidate_feed, AdminIdentity, FeedSignal, SubmitResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    fn status(self) -> &'static str {
        match self {
            Decision::Approve => "approved",
            Decision::Reject => "rejected",
        }
    }

    fn success_message(self) -> &'static str {
        match self {
            Decision::Approve => "Message approved successfully",
            Decision::Reject => "Message rejected",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Decision::Approve => "Failed to approve message",
            Decision::Reject => "Failed to reject message",
        }
    }
}

/// Apply an admin decision to a message.
///
/// Callers pass the admin resolved from the current session, or `None`
/// when there is no live session; the unauthorized path never touches the
/// store.
pub async fn decide(
    db: &DbPool,
    feed: &FeedSignal,
    admin: Option<&AdminIdentity>,
    id: i64,
    notes: Option<String>,
    decision: Decision,
) -> SubmitResult {
    let Some(admin) = admin else {
        return SubmitResult::failure("Unauthorized - admin login required");
    };

    match apply_decision(db, admin, id, notes, decision).await {
        Ok(()) => {
            invalidate_feed(feed);
            SubmitResult::ok(decision.success_message())
        }
        Err(error) => {
            tracing::error!(
                message_id = id,
                decision = decision.status(),
                error = %error,
                "Moderation decision failed"
            );
            SubmitResult::failure(decision.failure_message())
        }
    }
}

async fn apply_decision(
    db: &DbPool,
    admin: &AdminIdentity,
    id: i64,
    notes: Option<String>,
    decision: Decision,
) -> anyhow::Result<()> {
    let now = Utc::now().to_rfc3339();
    let approved_at = match decision {
        Decision::Approve => Some(now.clone()),
        Decision::Reject => None,
    };

    // The transition is conditional on the message still being pending, so
    // of two concurrent decisions on one id only the first wins.
    let result = sqlx::query(
        "UPDATE guestbook_messages \
         SET status = ?, moderated_by = ?, moderation_notes = ?, updated_at = ?, approved_at = ? \
         WHERE id = ? AND status = 'pending'",
    )
    .bind(decision.status())
    .bind(&admin.email)
    .bind(&notes)
    .bind(&now)
    .bind(&approved_at)
    .bind(id)
    .execute(db)
    .await?;

    if result.rows_affected() == 0 {
        anyhow::bail!("message {} does not exist or is no longer pending", id);
    }

    Ok(())
}
