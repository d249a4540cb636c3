//! OpenAI-compatible chat completions client.
//!
//! Each capability issues one POST to `{base_url}/chat/completions` with a
//! fixed system instruction and a `json_schema` response format, then
//! decodes the message content into the capability's typed result.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::AiConfig;

use super::{EmojiConversion, GatewayError, ModelGateway, Moderation, Translation};

const MODERATION_INSTRUCTION: &str = "You are a content moderator for a public guestbook.
Analyze the message for:
- Inappropriate language (profanity, slurs, hate speech)
- Spam or promotional content
- Personal information exposure (emails, phone numbers, addresses)
- Harmful or threatening content
- Adult or explicit content

Be lenient with casual language but strict with harmful content.";

const TRANSLATION_INSTRUCTION: &str = "You are a professional translator. Translate the given message accurately while preserving the original tone and meaning.";

const EMOJI_INSTRUCTION: &str = "You are a creative emoji artist. Convert text messages into expressive emoji sequences that capture the meaning and emotion. Use only emojis, no text. Keep it fun and readable.";

/// Client for an OpenAI-compatible text-generation API.
pub struct OpenAiGateway {
    config: AiConfig,
    client: reqwest::Client,
}

impl OpenAiGateway {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Issue one schema-constrained completion and decode the content.
    async fn complete<T: for<'de> Deserialize<'de>>(
        &self,
        system: &str,
        prompt: String,
        schema_name: &str,
        schema: Value,
    ) -> Result<T, GatewayError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            response_format: json!({
                "type": "json_schema",
                "json_schema": {
                    "name": schema_name,
                    "strict": true,
                    "schema": schema,
                },
            }),
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api { status, body });
        }

        let completion: ChatResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or(GatewayError::Empty)?;

        Ok(serde_json::from_str(&content)?)
    }
}

#[async_trait::async_trait]
impl ModelGateway for OpenAiGateway {
    async fn moderate(&self, message: &str) -> Result<Moderation, GatewayError> {
        self.complete(
            MODERATION_INSTRUCTION,
            format!("Moderate this guestbook message: \"{}\"", message),
            "moderation",
            json!({
                "type": "object",
                "properties": {
                    "isAppropriate": { "type": "boolean" },
                    "reason": { "type": ["string", "null"] },
                    "confidence": { "type": "number" },
                },
                "required": ["isAppropriate", "reason", "confidence"],
                "additionalProperties": false,
            }),
        )
        .await
    }

    async fn translate(
        &self,
        message: &str,
        target_language: &str,
    ) -> Result<Translation, GatewayError> {
        self.complete(
            TRANSLATION_INSTRUCTION,
            format!(
                "Translate this message to {}: \"{}\"",
                target_language, message
            ),
            "translation",
            json!({
                "type": "object",
                "properties": {
                    "translatedText": { "type": "string" },
                    "detectedLanguage": { "type": ["string", "null"] },
                },
                "required": ["translatedText", "detectedLanguage"],
                "additionalProperties": false,
            }),
        )
        .await
    }

    async fn convert_to_emoji(&self, message: &str) -> Result<EmojiConversion, GatewayError> {
        self.complete(
            EMOJI_INSTRUCTION,
            format!("Convert this message to emojis only: \"{}\"", message),
            "emoji_conversion",
            json!({
                "type": "object",
                "properties": {
                    "emojiMessage": { "type": "string" },
                },
                "required": ["emojiMessage"],
                "additionalProperties": false,
            }),
        )
        .await
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    response_format: Value,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}
