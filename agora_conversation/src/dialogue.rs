//! One user talking with one persona.

use agora_core::{
    EngineError, GenerationError, GenerationRequest, Persona, Result, Role, TurnRecord,
};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::Collaborators;
use crate::state::{SessionState, idle_for_longer_than};
use crate::window::{ContextWindow, WindowConfig};

/// A dialogue session.
///
/// The unit of work is [`DialogueSession::submit_user_turn`]: the user turn is
/// recorded, the backend is asked for a reply, and the reply is recorded only
/// if the backend succeeds.
pub struct DialogueSession {
    id: Uuid,
    user_id: String,
    persona: Persona,
    window: ContextWindow,
    state: SessionState,
    created_at: DateTime<Utc>,
    last_active_at: DateTime<Utc>,
    collaborators: Collaborators,
}

impl DialogueSession {
    /// Create a dialogue, pinning the persona's greeting if it has one.
    pub fn new(
        id: Uuid,
        user_id: impl Into<String>,
        persona: Persona,
        window_config: WindowConfig,
        collaborators: Collaborators,
    ) -> Result<Self> {
        let mut window = ContextWindow::new(window_config);
        if let Some(greeting) = &persona.greeting {
            window.pin(TurnRecord::new(
                id,
                persona.id.clone(),
                Role::Persona,
                greeting.clone(),
                window.next_sequence()?,
            ))?;
        }

        let now = Utc::now();
        let user_id = user_id.into();
        info!(
            "Created dialogue session {id} between {user_id} and {}",
            persona.display_name
        );

        Ok(Self {
            id,
            user_id,
            persona,
            window,
            state: SessionState::Created,
            created_at: now,
            last_active_at: now,
            collaborators,
        })
    }

    /// Submit a user turn and wait for the persona's reply.
    ///
    /// On a backend failure the user turn stays in the window, no persona turn
    /// is added, and the session remains usable for a retry.
    pub async fn submit_user_turn(&mut self, text: &str) -> Result<TurnRecord> {
        self.ensure_live()?;

        let text = self.collaborators.validator.validate_message(text)?;
        let user_turn = TurnRecord::new(
            self.id,
            self.user_id.clone(),
            Role::User,
            text,
            self.window.next_sequence()?,
        );
        self.window.append(user_turn)?;

        let request =
            GenerationRequest::new(self.persona.system_prompt.clone(), self.window.transcript());
        debug!(
            "Dialogue {} sending {} transcript entries",
            self.id,
            request.transcript.len()
        );

        let reply = match self.collaborators.backend.generate(&request).await {
            Ok(reply) if reply.trim().is_empty() => {
                return Err(self.generation_failed(GenerationError::Unknown(
                    "empty response".to_string(),
                )));
            }
            Ok(reply) => reply,
            Err(e) => return Err(self.generation_failed(e)),
        };

        let persona_turn = TurnRecord::new(
            self.id,
            self.persona.id.clone(),
            Role::Persona,
            reply.trim(),
            self.window.next_sequence()?,
        );
        self.window.append(persona_turn.clone())?;
        self.state = SessionState::Active;
        self.last_active_at = Utc::now();

        info!(
            "Dialogue {} recorded turn {} from {}",
            self.id,
            persona_turn.sequence_number(),
            self.persona.display_name
        );
        Ok(persona_turn)
    }

    fn generation_failed(&self, error: GenerationError) -> EngineError {
        warn!("Dialogue {} generation failed: {error}", self.id);
        EngineError::Generation(error)
    }

    fn ensure_live(&self) -> Result<()> {
        if self.state.is_live() {
            Ok(())
        } else {
            Err(EngineError::SessionNotFound(self.id))
        }
    }

    /// Close the session. Calling it again has no effect.
    pub fn close(&mut self) {
        if self.state != SessionState::Closed {
            self.state = SessionState::Closed;
            info!("Closed dialogue session {}", self.id);
        }
    }

    /// Mark the session expired by an idle sweep.
    pub fn expire(&mut self) {
        if self.state.is_live() {
            self.state = SessionState::IdleExpired;
            info!("Dialogue session {} expired", self.id);
        }
    }

    #[must_use]
    pub fn is_idle(&self, now: DateTime<Utc>, idle_timeout: Duration) -> bool {
        self.state.is_live() && idle_for_longer_than(self.last_active_at, now, idle_timeout)
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[must_use]
    pub const fn persona(&self) -> &Persona {
        &self.persona
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn last_active_at(&self) -> DateTime<Utc> {
        self.last_active_at
    }

    #[must_use]
    pub const fn window(&self) -> &ContextWindow {
        &self.window
    }

    /// Copy of the current context window.
    #[must_use]
    pub fn snapshot(&self) -> Vec<TurnRecord> {
        self.window.snapshot()
    }
}

impl std::fmt::Debug for DialogueSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogueSession")
            .field("id", &self.id)
            .field("user_id", &self.user_id)
            .field("persona", &self.persona.id)
            .field("state", &self.state)
            .field("turns", &self.window.len())
            .finish_non_exhaustive()
    }
}
