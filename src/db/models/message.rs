//! Guestbook message model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One guestbook entry. `message` holds the text currently displayed;
/// when an AI enhancement was applied, `original_message` keeps the
/// pre-enhancement text.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: i64,
    pub name: String,
    pub email: Option<String>,
    pub message: String,
    pub original_message: Option<String>,
    pub enhanced_type: String,
    pub language: String,
    pub status: String,
    pub moderation_notes: Option<String>,
    pub moderated_by: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub approved_at: Option<String>,
}

/// Public-feed view of a message. Email and moderation fields are not
/// exposed to visitors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicMessage {
    pub id: i64,
    pub name: String,
    pub message: String,
    pub original_message: Option<String>,
    pub enhanced_type: String,
    pub language: String,
    pub created_at: String,
    pub approved_at: Option<String>,
}

impl From<Message> for PublicMessage {
    fn from(m: Message) -> Self {
        Self {
            id: m.id,
            name: m.name,
            message: m.message,
            original_message: m.original_message,
            enhanced_type: m.enhanced_type,
            language: m.language,
            created_at: m.created_at,
            approved_at: m.approved_at,
        }
    }
}
