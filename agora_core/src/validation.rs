//! Input sanitation and acceptance rules for user-authored text.
//!
//! Every user turn and every debate topic passes through an
//! [`InputValidator`] before it may enter a session.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::error::ValidationError;

pub trait InputValidator: Send + Sync {
    /// Validate a chat message, returning the sanitized text to record.
    fn validate_message(&self, text: &str) -> Result<String, ValidationError>;

    /// Validate a debate topic, returning the sanitized topic.
    fn validate_topic(&self, topic: &str) -> Result<String, ValidationError>;
}

/// Length limits applied by [`DefaultValidator`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationLimits {
    #[serde(default = "ValidationLimits::default_max_message_chars")]
    pub max_message_chars: usize,
    #[serde(default = "ValidationLimits::default_min_topic_chars")]
    pub min_topic_chars: usize,
    #[serde(default = "ValidationLimits::default_max_topic_chars")]
    pub max_topic_chars: usize,
}

impl Default for ValidationLimits {
    fn default() -> Self {
        Self {
            max_message_chars: Self::default_max_message_chars(),
            min_topic_chars: Self::default_min_topic_chars(),
            max_topic_chars: Self::default_max_topic_chars(),
        }
    }
}

impl ValidationLimits {
    const fn default_max_message_chars() -> usize {
        2000
    }

    const fn default_min_topic_chars() -> usize {
        3
    }

    const fn default_max_topic_chars() -> usize {
        200
    }
}

static CONTROL_CHARS: OnceLock<Regex> = OnceLock::new();
static LONG_WHITESPACE: OnceLock<Regex> = OnceLock::new();
static PUNCTUATION_RUN: OnceLock<Regex> = OnceLock::new();
static INAPPROPRIATE_TOPIC: OnceLock<Regex> = OnceLock::new();

#[expect(
    clippy::expect_used,
    reason = "Static regex patterns are guaranteed to be valid"
)]
fn compiled(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(pattern).expect("Static regex pattern is guaranteed to be valid"))
}

/// Strip control characters (keeping newlines and tabs), cap whitespace runs
/// at ten spaces and collapse long `!?` runs.
#[must_use]
pub fn sanitize_input(text: &str) -> String {
    let text = compiled(&CONTROL_CHARS, r"[\x00-\x08\x0b\x0c\x0e-\x1f\x7f]").replace_all(text, "");
    let text = compiled(&LONG_WHITESPACE, r"\s{10,}").replace_all(&text, " ".repeat(10));
    let text = compiled(&PUNCTUATION_RUN, r"[!?]{5,}").replace_all(&text, "!?!?");
    text.trim().to_string()
}

/// Rules used by the CLI: non-empty, bounded length, no obvious spam, and a
/// short blocklist for debate topics.
#[derive(Debug, Clone, Default)]
pub struct DefaultValidator {
    limits: ValidationLimits,
}

impl DefaultValidator {
    #[must_use]
    pub const fn new(limits: ValidationLimits) -> Self {
        Self { limits }
    }

    #[must_use]
    pub const fn limits(&self) -> &ValidationLimits {
        &self.limits
    }

    fn non_empty(text: &str, field: &str) -> Result<String, ValidationError> {
        let cleaned = sanitize_input(text);
        if cleaned.is_empty() {
            return Err(ValidationError::new(format!("{field} cannot be empty")));
        }
        Ok(cleaned)
    }

    fn check_length(
        text: &str,
        min: usize,
        max: usize,
        field: &str,
    ) -> Result<(), ValidationError> {
        let len = text.chars().count();
        if len < min {
            return Err(ValidationError::new(format!(
                "{field} must be at least {min} characters long"
            )));
        }
        if len > max {
            return Err(ValidationError::new(format!(
                "{field} must be no more than {max} characters long"
            )));
        }
        Ok(())
    }
}

impl InputValidator for DefaultValidator {
    fn validate_message(&self, text: &str) -> Result<String, ValidationError> {
        let message = Self::non_empty(text, "Message")?;
        Self::check_length(&message, 1, self.limits.max_message_chars, "Message")?;

        let distinct: HashSet<char> = message.to_lowercase().chars().collect();
        if distinct.len() < 3 {
            return Err(ValidationError::new(
                "Message appears to be spam or too repetitive",
            ));
        }

        Ok(message)
    }

    fn validate_topic(&self, topic: &str) -> Result<String, ValidationError> {
        let topic = Self::non_empty(topic, "Topic")?;
        Self::check_length(
            &topic,
            self.limits.min_topic_chars,
            self.limits.max_topic_chars,
            "Topic",
        )?;

        let blocklist = compiled(
            &INAPPROPRIATE_TOPIC,
            r"\b(hate|violence|harm|illegal|criminal|explicit|nsfw)\b",
        );
        if blocklist.is_match(&topic.to_lowercase()) {
            return Err(ValidationError::new("Topic contains inappropriate content"));
        }

        Ok(topic)
    }
}
