//! Input validation for guestbook submissions.
//!
//! Validation runs before any external call and the messages are shown to
//! visitors verbatim, so the exact wording matters.

const NAME_MAX_CHARS: usize = 100;
const MESSAGE_MAX_CHARS: usize = 1000;

/// Validate a visitor name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.chars().count() > NAME_MAX_CHARS {
        return Err("Name must be 100 characters or less".to_string());
    }
    Ok(())
}

/// Validate a message body
pub fn validate_message(message: &str) -> Result<(), String> {
    if message.chars().count() > MESSAGE_MAX_CHARS {
        return Err("Message must be 1000 characters or less".to_string());
    }
    Ok(())
}

/// Validate a full submission, returning the first failure.
pub fn validate_submission(name: &str, message: &str) -> Result<(), String> {
    if name.is_empty() || message.is_empty() {
        return Err("Name and message are required".to_string());
    }
    validate_name(name)?;
    validate_message(message)?;
    Ok(())
}
