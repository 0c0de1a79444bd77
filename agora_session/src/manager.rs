use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use agora_conversation::{
    Collaborators, DebateSession, DialogueSession, Participant, WindowConfig,
};
use agora_core::{EngineError, Persona, PersonaCatalog, Result};
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

pub type SharedDialogue = Arc<Mutex<DialogueSession>>;
pub type SharedDebate = Arc<Mutex<DebateSession>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Dialogue,
    Debate,
}

/// A registered session. Cloning shares the same session.
///
/// Each session sits behind its own lock, so one session's backend call
/// never blocks the registry or other sessions.
#[derive(Clone)]
pub enum SessionHandle {
    Dialogue(SharedDialogue),
    Debate(SharedDebate),
}

impl SessionHandle {
    #[must_use]
    pub const fn kind(&self) -> SessionKind {
        match self {
            Self::Dialogue(_) => SessionKind::Dialogue,
            Self::Debate(_) => SessionKind::Debate,
        }
    }

    /// `Some(live)` when the session is not busy, `None` while a turn holds it.
    fn try_is_live(&self) -> Option<bool> {
        match self {
            Self::Dialogue(s) => s.try_lock().ok().map(|s| s.state().is_live()),
            Self::Debate(s) => s.try_lock().ok().map(|s| s.state().is_live()),
        }
    }

    /// Expire the session if it is idle and not busy. Returns whether it was.
    fn try_expire(&self, now: DateTime<Utc>, idle_timeout: Duration) -> bool {
        match self {
            Self::Dialogue(s) => s.try_lock().is_ok_and(|mut s| {
                let idle = s.is_idle(now, idle_timeout);
                if idle {
                    s.expire();
                }
                idle
            }),
            Self::Debate(s) => s.try_lock().is_ok_and(|mut s| {
                let idle = s.is_idle(now, idle_timeout);
                if idle {
                    s.expire();
                }
                idle
            }),
        }
    }

    async fn close(&self) {
        match self {
            Self::Dialogue(s) => s.lock().await.close(),
            Self::Debate(s) => s.lock().await.close(),
        }
    }

    /// Persona ids taking part, or `None` while a turn holds the session.
    fn try_persona_ids(&self) -> Option<Vec<String>> {
        match self {
            Self::Dialogue(s) => s.try_lock().ok().map(|s| vec![s.persona().id.clone()]),
            Self::Debate(s) => s.try_lock().ok().map(|s| {
                s.participants()
                    .iter()
                    .map(|p| p.persona.id.clone())
                    .collect()
            }),
        }
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SessionHandle").field(&self.kind()).finish()
    }
}

/// Settings applied to every session the manager creates.
#[derive(Debug, Clone, Default)]
pub struct ManagerConfig {
    pub window: WindowConfig,
    pub debate_temperature: Option<f32>,
}

/// Snapshot of the registry contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub dialogues: usize,
    pub debates: usize,
    /// Sessions mid-turn when the snapshot was taken; their personas are not counted
    pub busy: usize,
    /// Number of live sessions each persona takes part in
    pub personas_in_use: BTreeMap<String, usize>,
}

/// One seat at a debate: a catalog persona and the stance it argues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    pub persona_id: String,
    pub position: Option<String>,
}

impl Seat {
    #[must_use]
    pub fn new(persona_id: impl Into<String>) -> Self {
        Self {
            persona_id: persona_id.into(),
            position: None,
        }
    }

    #[must_use]
    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        self.position = Some(position.into());
        self
    }
}

/// Everything needed to open a debate, seats in speaking order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebatePlan {
    pub topic: String,
    pub description: Option<String>,
    pub seats: Vec<Seat>,
}

impl DebatePlan {
    #[must_use]
    pub fn new(topic: impl Into<String>, persona_ids: &[&str]) -> Self {
        Self {
            topic: topic.into(),
            description: None,
            seats: persona_ids.iter().map(|id| Seat::new(*id)).collect(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Assign `position` to the seat held by `persona_id`, if any.
    #[must_use]
    pub fn with_position(mut self, persona_id: &str, position: impl Into<String>) -> Self {
        let position = position.into();
        if let Some(seat) = self.seats.iter_mut().find(|s| s.persona_id == persona_id) {
            seat.position = Some(position);
        }
        self
    }
}

/// Registry of live sessions.
///
/// The registry map is guarded by a single lock that is only held for
/// insert, remove and lookup. Generation calls happen on the session handle
/// after the lookup has returned.
pub struct SessionManager {
    registry: Mutex<HashMap<Uuid, SessionHandle>>,
    catalog: Arc<dyn PersonaCatalog>,
    collaborators: Collaborators,
    config: ManagerConfig,
}

impl SessionManager {
    #[must_use]
    pub fn new(
        catalog: Arc<dyn PersonaCatalog>,
        collaborators: Collaborators,
        config: ManagerConfig,
    ) -> Self {
        info!("SessionManager initialized");
        Self {
            registry: Mutex::new(HashMap::new()),
            catalog,
            collaborators,
            config,
        }
    }

    fn lookup_persona(&self, persona_id: &str) -> Result<Persona> {
        self.catalog
            .lookup(persona_id)
            .ok_or_else(|| EngineError::validation(format!("Unknown persona: {persona_id}")))
    }

    fn fresh_id(registry: &HashMap<Uuid, SessionHandle>) -> Uuid {
        loop {
            let id = Uuid::now_v7();
            if !registry.contains_key(&id) {
                return id;
            }
        }
    }

    pub async fn create_dialogue(&self, user_id: &str, persona_id: &str) -> Result<SharedDialogue> {
        if user_id.trim().is_empty() {
            return Err(EngineError::validation("User id cannot be empty"));
        }
        let persona = self.lookup_persona(persona_id)?;

        let mut registry = self.registry.lock().await;
        let id = Self::fresh_id(&registry);
        let session = DialogueSession::new(
            id,
            user_id.trim(),
            persona,
            self.config.window.clone(),
            self.collaborators.clone(),
        )?;
        let shared = Arc::new(Mutex::new(session));
        registry.insert(id, SessionHandle::Dialogue(shared.clone()));

        info!("Registered dialogue session {id} ({} live)", registry.len());
        Ok(shared)
    }

    pub async fn create_debate(&self, topic: &str, persona_ids: &[&str]) -> Result<SharedDebate> {
        self.create_debate_with(&DebatePlan::new(topic, persona_ids))
            .await
    }

    /// Create a debate with per-seat positions and an optional description.
    pub async fn create_debate_with(&self, plan: &DebatePlan) -> Result<SharedDebate> {
        let participants = plan
            .seats
            .iter()
            .map(|seat| -> Result<Participant> {
                let participant = Participant::new(self.lookup_persona(&seat.persona_id)?);
                Ok(match &seat.position {
                    Some(position) => participant.with_position(position.as_str()),
                    None => participant,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut registry = self.registry.lock().await;
        let id = Self::fresh_id(&registry);
        let mut session = DebateSession::new(
            id,
            &plan.topic,
            participants,
            self.config.window.clone(),
            self.collaborators.clone(),
        )?;
        if let Some(description) = &plan.description {
            session = session.with_description(description)?;
        }
        if let Some(temperature) = self.config.debate_temperature {
            session = session.with_temperature(temperature);
        }
        let shared = Arc::new(Mutex::new(session));
        registry.insert(id, SessionHandle::Debate(shared.clone()));

        info!("Registered debate session {id} ({} live)", registry.len());
        Ok(shared)
    }

    /// Fetch a session. Fails if it is unknown or has been closed.
    pub async fn get(&self, session_id: Uuid) -> Result<SessionHandle> {
        let handle = self
            .registry
            .lock()
            .await
            .get(&session_id)
            .cloned()
            .ok_or(EngineError::SessionNotFound(session_id))?;

        // A busy session is mid-turn and therefore still live.
        if handle.try_is_live() == Some(false) {
            debug!("Session {session_id} is registered but no longer live");
            return Err(EngineError::SessionNotFound(session_id));
        }
        Ok(handle)
    }

    pub async fn get_dialogue(&self, session_id: Uuid) -> Result<SharedDialogue> {
        match self.get(session_id).await? {
            SessionHandle::Dialogue(s) => Ok(s),
            SessionHandle::Debate(_) => Err(EngineError::SessionNotFound(session_id)),
        }
    }

    pub async fn get_debate(&self, session_id: Uuid) -> Result<SharedDebate> {
        match self.get(session_id).await? {
            SessionHandle::Debate(s) => Ok(s),
            SessionHandle::Dialogue(_) => Err(EngineError::SessionNotFound(session_id)),
        }
    }

    /// Remove and close a session. Returns whether it was registered.
    pub async fn close(&self, session_id: Uuid) -> bool {
        let removed = self.registry.lock().await.remove(&session_id);

        match removed {
            Some(handle) => {
                handle.close().await;
                info!("Closed session {session_id}");
                true
            }
            None => false,
        }
    }

    /// Expire and drop every session idle for longer than `idle_timeout`.
    ///
    /// Sessions closed directly on their handle are dropped as well. Sessions
    /// in the middle of a turn are skipped. Returns the ids of expired sessions.
    pub async fn sweep_idle(&self, now: DateTime<Utc>, idle_timeout: Duration) -> Vec<Uuid> {
        let mut registry = self.registry.lock().await;
        let mut expired = Vec::new();

        registry.retain(|id, handle| {
            if handle.try_expire(now, idle_timeout) {
                expired.push(*id);
                return false;
            }
            handle.try_is_live() != Some(false)
        });

        if !expired.is_empty() {
            info!(
                "Swept {} idle session(s), {} live",
                expired.len(),
                registry.len()
            );
        }
        expired
    }

    /// Close every session and empty the registry.
    pub async fn close_all(&self) {
        let drained: Vec<SessionHandle> =
            self.registry.lock().await.drain().map(|(_, h)| h).collect();

        for handle in &drained {
            handle.close().await;
        }
        info!("Closed {} session(s) on shutdown", drained.len());
    }

    pub async fn session_ids(&self) -> Vec<Uuid> {
        self.registry.lock().await.keys().copied().collect()
    }

    pub async fn len(&self) -> usize {
        self.registry.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.registry.lock().await.is_empty()
    }

    /// Count registered sessions by kind and persona. Sessions in the middle
    /// of a turn are counted as busy rather than waited on.
    pub async fn stats(&self) -> SessionStats {
        let registry = self.registry.lock().await;

        let mut stats = SessionStats::default();
        for handle in registry.values() {
            match handle.kind() {
                SessionKind::Dialogue => stats.dialogues += 1,
                SessionKind::Debate => stats.debates += 1,
            }
            match handle.try_persona_ids() {
                Some(persona_ids) => {
                    for persona_id in persona_ids {
                        *stats.personas_in_use.entry(persona_id).or_default() += 1;
                    }
                }
                None => stats.busy += 1,
            }
        }
        stats
    }

    #[must_use]
    pub fn catalog(&self) -> &dyn PersonaCatalog {
        self.catalog.as_ref()
    }
}
