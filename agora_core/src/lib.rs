#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod error;
pub mod persona;
pub mod validation;

pub use error::{EngineError, GenerationError, Result, ValidationError};
pub use persona::{BuiltinCatalog, Persona, PersonaCatalog, PersonaProfile};
pub use validation::{DefaultValidator, InputValidator, ValidationLimits, sanitize_input};

/// Speaker id used for turns the engine authors itself.
pub const SYSTEM_SPEAKER: &str = "system";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Persona,
    /// Session framing, e.g. the pinned debate topic statement.
    System,
}

/// One utterance in a session's total order.
///
/// Fields are private so a record cannot change after construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurnRecord {
    session_id: Uuid,
    speaker_id: String,
    role: Role,
    text: String,
    sequence_number: u64,
    created_at: DateTime<Utc>,
}

impl TurnRecord {
    #[must_use]
    pub fn new(
        session_id: Uuid,
        speaker_id: impl Into<String>,
        role: Role,
        text: impl Into<String>,
        sequence_number: u64,
    ) -> Self {
        Self {
            session_id,
            speaker_id: speaker_id.into(),
            role,
            text: text.into(),
            sequence_number,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub const fn session_id(&self) -> Uuid {
        self.session_id
    }

    #[must_use]
    pub fn speaker_id(&self) -> &str {
        &self.speaker_id
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// A single `{role, text}` entry of the history handed to the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranscriptEntry {
    pub role: Role,
    pub text: String,
}

impl From<&TurnRecord> for TranscriptEntry {
    fn from(turn: &TurnRecord) -> Self {
        Self {
            role: turn.role(),
            text: turn.text().to_string(),
        }
    }
}

/// Everything the backend needs to produce the next utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub transcript: Vec<TranscriptEntry>,
    /// Overrides the backend's configured temperature when set.
    pub temperature: Option<f32>,
}

impl GenerationRequest {
    #[must_use]
    pub const fn new(system_prompt: String, transcript: Vec<TranscriptEntry>) -> Self {
        Self {
            system_prompt,
            transcript,
            temperature: None,
        }
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<String, GenerationError>;
}
