//! AI enhancement gateway.
//!
//! Three independent capabilities — moderate, translate, convert-to-emoji —
//! each a single request/response call to a remote text-generation model.
//! Responses are decoded into fixed typed shapes before anything trusts
//! them; a response that does not match the shape is a hard failure.

mod openai;

pub use openai::OpenAiGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Moderation verdict for a submitted message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Moderation {
    pub is_appropriate: bool,
    pub reason: Option<String>,
    pub confidence: f64,
}

/// Result of translating a message to a target language.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Translation {
    pub translated_text: String,
    pub detected_language: Option<String>,
}

/// Result of converting a message to an emoji-only rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EmojiConversion {
    pub emoji_message: String,
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("model request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("model API error: {status} - {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("model returned an empty response")]
    Empty,

    #[error("model response did not match the expected schema: {0}")]
    Schema(#[from] serde_json::Error),
}

/// Remote text-generation capabilities used by the submission workflow.
///
/// All three calls are stateless and side-effect-free beyond the remote
/// request. No retries: a transient failure propagates to the caller.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    /// Screen a message for policy violations. Always receives the
    /// original text, never an enhanced variant.
    async fn moderate(&self, message: &str) -> Result<Moderation, GatewayError>;

    /// Translate a message, preserving tone and meaning. `target_language`
    /// is passed through to the model unvalidated.
    async fn translate(
        &self,
        message: &str,
        target_language: &str,
    ) -> Result<Translation, GatewayError>;

    /// Re-express a message using only emoji characters.
    async fn convert_to_emoji(&self, message: &str) -> Result<EmojiConversion, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moderation_decodes_camel_case() {
        let verdict: Moderation = serde_json::from_str(
            r#"{"isAppropriate": false, "reason": "Spam content", "confidence": 0.97}"#,
        )
        .unwrap();
        assert!(!verdict.is_appropriate);
        assert_eq!(verdict.reason.as_deref(), Some("Spam content"));
    }

    #[test]
    fn test_moderation_rejects_unknown_fields() {
        let result: Result<Moderation, _> = serde_json::from_str(
            r#"{"isAppropriate": true, "reason": null, "confidence": 1.0, "extra": 1}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_moderation_rejects_missing_fields() {
        let result: Result<Moderation, _> = serde_json::from_str(r#"{"isAppropriate": true}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_translation_allows_null_detected_language() {
        let translation: Translation = serde_json::from_str(
            r#"{"translatedText": "Hola mundo", "detectedLanguage": null}"#,
        )
        .unwrap();
        assert_eq!(translation.translated_text, "Hola mundo");
        assert!(translation.detected_language.is_none());
    }
}
