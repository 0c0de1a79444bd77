//! Round-robin debate between several personas.

use std::collections::HashSet;

use agora_core::{
    EngineError, GenerationError, GenerationRequest, Persona, Result, Role, SYSTEM_SPEAKER,
    TranscriptEntry, TurnRecord,
};
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::Collaborators;
use crate::state::{SessionState, idle_for_longer_than};
use crate::window::{ContextWindow, WindowConfig};

pub const MIN_PARTICIPANTS: usize = 2;
pub const MAX_PARTICIPANTS: usize = 5;

/// Speaker id for between-round interjections.
const AUDIENCE_SPEAKER: &str = "audience";
const SUMMARY_WINDOW: usize = 10;
const SUMMARY_TEMPERATURE: f32 = 0.7;
/// Temperature for each participant's first contribution.
pub const OPENING_TEMPERATURE: f32 = 0.9;
const MODERATOR_PROMPT: &str = "You are a neutral moderator summarizing a philosophical debate.";

#[derive(Debug, Clone)]
pub struct Participant {
    pub persona: Persona,
    /// Stance the participant argues for, if assigned
    pub position: Option<String>,
    pub turn_count: u32,
    pub last_spoke_at: Option<DateTime<Utc>>,
}

impl Participant {
    #[must_use]
    pub const fn new(persona: Persona) -> Self {
        Self {
            persona,
            position: None,
            turn_count: 0,
            last_spoke_at: None,
        }
    }

    #[must_use]
    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }
}

impl From<Persona> for Participant {
    fn from(persona: Persona) -> Self {
        Self::new(persona)
    }
}

/// A debate session.
///
/// Every participant sees one shared transcript: the pinned topic statement
/// followed by all turns so far, oldest first. [`DebateSession::advance_turn`]
/// produces exactly one turn; pacing and stopping are up to the caller.
pub struct DebateSession {
    id: Uuid,
    topic: String,
    description: Option<String>,
    participants: Vec<Participant>,
    window: ContextWindow,
    current_round: u32,
    turn_cursor: usize,
    state: SessionState,
    created_at: DateTime<Utc>,
    last_active_at: DateTime<Utc>,
    temperature: Option<f32>,
    collaborators: Collaborators,
}

impl DebateSession {
    /// Create a debate. The topic and any positions go through the validator;
    /// the participant list must hold 2 to 5 distinct personas.
    pub fn new(
        id: Uuid,
        topic: &str,
        mut participants: Vec<Participant>,
        window_config: WindowConfig,
        collaborators: Collaborators,
    ) -> Result<Self> {
        let topic = collaborators.validator.validate_topic(topic)?;
        for participant in &mut participants {
            participant.position = participant
                .position
                .take()
                .map(|position| collaborators.validator.validate_message(&position))
                .transpose()?;
        }

        if !(MIN_PARTICIPANTS..=MAX_PARTICIPANTS).contains(&participants.len()) {
            return Err(EngineError::validation(format!(
                "A debate needs between {MIN_PARTICIPANTS} and {MAX_PARTICIPANTS} participants, got {}",
                participants.len()
            )));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = participants
            .iter()
            .find(|p| !seen.insert(p.persona.id.clone()))
        {
            return Err(EngineError::validation(format!(
                "Duplicate participant: {}",
                dup.persona.id
            )));
        }

        let names = participants
            .iter()
            .map(|p| p.persona.display_name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let opening = format!(
            "Debate on '{topic}' has begun with {} participants: {names}",
            participants.len()
        );

        let mut window = ContextWindow::new(window_config);
        window.pin(TurnRecord::new(
            id,
            SYSTEM_SPEAKER,
            Role::System,
            opening,
            window.next_sequence()?,
        ))?;

        let now = Utc::now();
        info!("Created debate session {id} on '{topic}' with {names}");

        Ok(Self {
            id,
            topic,
            description: None,
            participants: participants
                .into_iter()
                .map(|p| Participant {
                    turn_count: 0,
                    last_spoke_at: None,
                    ..p
                })
                .collect(),
            window,
            current_round: 0,
            turn_cursor: 0,
            state: SessionState::Created,
            created_at: now,
            last_active_at: now,
            temperature: None,
            collaborators,
        })
    }

    /// Attach a longer framing of the topic, shown to every participant.
    pub fn with_description(mut self, description: &str) -> Result<Self> {
        self.description = Some(self.collaborators.validator.validate_message(description)?);
        Ok(self)
    }

    /// Sampling temperature passed with every turn after a participant's
    /// opening statement.
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Generate the next speaker's turn.
    ///
    /// On failure the cursor stays put, so the same persona is asked again on
    /// the next call, and nothing is recorded.
    pub async fn advance_turn(&mut self) -> Result<TurnRecord> {
        self.ensure_live()?;

        let speaker = &self.participants[self.turn_cursor];
        let mut request = GenerationRequest::new(
            format!(
                "{}\n\n{}",
                speaker.persona.system_prompt,
                self.debate_instructions(speaker)
            ),
            self.tagged_transcript(Some(&speaker.persona.id)),
        );
        if speaker.turn_count == 0 {
            request = request.with_temperature(OPENING_TEMPERATURE);
        } else if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        let speaker_id = speaker.persona.id.clone();
        let speaker_name = speaker.persona.display_name.clone();

        debug!(
            "Debate {} asking {speaker_name} (round {}, cursor {})",
            self.id, self.current_round, self.turn_cursor
        );

        let reply = match self.collaborators.backend.generate(&request).await {
            Ok(reply) if reply.trim().is_empty() => {
                return Err(self.generation_failed(
                    &speaker_name,
                    GenerationError::Unknown("empty response".to_string()),
                ));
            }
            Ok(reply) => reply,
            Err(e) => return Err(self.generation_failed(&speaker_name, e)),
        };

        let turn = TurnRecord::new(
            self.id,
            speaker_id,
            Role::Persona,
            reply.trim(),
            self.window.next_sequence()?,
        );
        self.window.append(turn.clone())?;

        let now = Utc::now();
        let participant = &mut self.participants[self.turn_cursor];
        participant.turn_count += 1;
        participant.last_spoke_at = Some(now);

        self.turn_cursor = (self.turn_cursor + 1) % self.participants.len();
        if self.turn_cursor == 0 {
            self.current_round += 1;
            info!("Debate {} completed round {}", self.id, self.current_round);
        }
        self.state = SessionState::Active;
        self.last_active_at = now;

        Ok(turn)
    }

    fn generation_failed(&self, speaker: &str, error: GenerationError) -> EngineError {
        warn!("Debate {} generation failed for {speaker}: {error}", self.id);
        EngineError::Generation(error)
    }

    fn debate_instructions(&self, speaker: &Participant) -> String {
        let others = self
            .participants
            .iter()
            .filter(|p| p.persona.id != speaker.persona.id)
            .map(|p| p.persona.display_name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let context = self
            .description
            .as_ref()
            .map(|d| format!("Context: {d}\n"))
            .unwrap_or_default();
        let position = speaker
            .position
            .as_deref()
            .unwrap_or("To be determined through dialogue");
        let mut framing = format!(
            "You are participating in a philosophical debate on the topic: \"{}\"\n\
             {context}\
             Your position (if any): {position}\n\
             Other participants: {others}\n",
            self.topic
        );

        if speaker.turn_count == 0 {
            framing.push_str(
                "Please provide a brief opening statement (2-3 sentences) introducing your \
                 perspective on this topic. Stay true to your philosophical approach and \
                 historical context.",
            );
        } else {
            framing += &format!(
                "This is your contribution number {}.\n\
                 Respond to the arguments made so far and present your own perspective. \
                 Engage directly with what the others have said, stay true to your approach, \
                 and keep it to 2-4 sentences.",
                speaker.turn_count + 1
            );
        }
        framing
    }

    fn display_name_of(&self, speaker_id: &str) -> Option<&str> {
        self.participants
            .iter()
            .find(|p| p.persona.id == speaker_id)
            .map(|p| p.persona.display_name.as_str())
    }

    /// Shared transcript with persona turns tagged by speaker name.
    ///
    /// Only `speaker`'s own turns keep the persona role; everyone else's
    /// contributions reach the backend as user input.
    fn tagged_transcript(&self, speaker: Option<&str>) -> Vec<TranscriptEntry> {
        self.window
            .snapshot()
            .iter()
            .map(|turn| {
                let text = match (turn.role(), self.display_name_of(turn.speaker_id())) {
                    (Role::Persona, Some(name)) => format!("[{name}]: {}", turn.text()),
                    (Role::User, _) => format!("[Audience]: {}", turn.text()),
                    _ => turn.text().to_string(),
                };
                let role = match turn.role() {
                    Role::Persona if speaker != Some(turn.speaker_id()) => Role::User,
                    role => role,
                };
                TranscriptEntry { role, text }
            })
            .collect()
    }

    /// Add a validated user note to the transcript. Only accepted between
    /// rounds, so a round is never split by user input.
    pub fn interject(&mut self, text: &str) -> Result<TurnRecord> {
        self.ensure_live()?;
        if self.turn_cursor != 0 {
            return Err(EngineError::validation(
                "Interjections are only accepted between rounds",
            ));
        }

        let text = self.collaborators.validator.validate_message(text)?;
        let turn = TurnRecord::new(
            self.id,
            AUDIENCE_SPEAKER,
            Role::User,
            text,
            self.window.next_sequence()?,
        );
        self.window.append(turn.clone())?;
        self.last_active_at = Utc::now();

        info!("Debate {} received an interjection", self.id);
        Ok(turn)
    }

    /// Ask the backend for a neutral summary of the latest exchanges.
    /// Nothing is recorded in the transcript.
    pub async fn summarize(&self) -> Result<String> {
        let names = self
            .participants
            .iter()
            .map(|p| p.persona.display_name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        let mut transcript: Vec<_> = self
            .tagged_transcript(None)
            .into_iter()
            .filter(|e| e.role != Role::System)
            .collect();
        let start = transcript.len().saturating_sub(SUMMARY_WINDOW);
        let mut transcript = transcript.split_off(start);
        transcript.push(TranscriptEntry {
            role: Role::User,
            text: format!(
                "The debate on \"{}\" has concluded with {} participants: {names}. \
                 Give a brief, neutral summary of the main positions, \
                 highlighting points of agreement and disagreement, in 3-4 sentences.",
                self.topic,
                self.participants.len()
            ),
        });

        let request = GenerationRequest::new(MODERATOR_PROMPT.to_string(), transcript)
            .with_temperature(SUMMARY_TEMPERATURE);

        let summary = self
            .collaborators
            .backend
            .generate(&request)
            .await
            .map_err(|e| self.generation_failed("moderator", e))?;

        let summary = summary.trim();
        if summary.is_empty() {
            return Err(self.generation_failed(
                "moderator",
                GenerationError::Unknown("empty response".to_string()),
            ));
        }
        Ok(summary.to_string())
    }

    fn ensure_live(&self) -> Result<()> {
        if self.state.is_live() {
            Ok(())
        } else {
            Err(EngineError::SessionNotFound(self.id))
        }
    }

    /// Close the debate. Calling it again has no effect.
    pub fn close(&mut self) {
        if self.state != SessionState::Closed {
            self.state = SessionState::Closed;
            info!(
                "Closed debate session {} after {} round(s)",
                self.id, self.current_round
            );
        }
    }

    /// Mark the debate expired by an idle sweep.
    pub fn expire(&mut self) {
        if self.state.is_live() {
            self.state = SessionState::IdleExpired;
            info!("Debate session {} expired", self.id);
        }
    }

    #[must_use]
    pub fn is_idle(&self, now: DateTime<Utc>, idle_timeout: Duration) -> bool {
        self.state.is_live() && idle_for_longer_than(self.last_active_at, now, idle_timeout)
    }

    /// Persona that speaks on the next [`DebateSession::advance_turn`].
    #[must_use]
    pub fn next_speaker(&self) -> &Persona {
        &self.participants[self.turn_cursor].persona
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    #[must_use]
    pub fn participant_ids(&self) -> Vec<&str> {
        self.participants
            .iter()
            .map(|p| p.persona.id.as_str())
            .collect()
    }

    #[must_use]
    pub const fn current_round(&self) -> u32 {
        self.current_round
    }

    #[must_use]
    pub const fn turn_cursor(&self) -> usize {
        self.turn_cursor
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

    #[must_use]
    pub fn snapshot(&self) -> Vec<TurnRecord> {
        self.window.snapshot()
    }
}

impl std::fmt::Debug for DebateSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebateSession")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .field("participants", &self.participant_ids())
            .field("current_round", &self.current_round)
            .field("turn_cursor", &self.turn_cursor)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
