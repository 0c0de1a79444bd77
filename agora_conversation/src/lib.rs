#![warn(
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

//! Turn orchestration for persona conversations.
//!
//! Both session kinds keep their history in a bounded [`ContextWindow`] and
//! only record a persona turn after the backend has answered, so a failed or
//! abandoned generation call leaves no partial turn behind.
//!
//! # Key Features
//! - One-on-one dialogue with a pinned persona greeting
//! - Round-robin debates between 2 to 5 personas over a shared transcript
//! - Turn-count and character budgets on the context sent to the backend

use std::sync::Arc;

use agora_core::{GenerationBackend, InputValidator};

mod debate;
mod dialogue;
mod state;
mod window;

pub use debate::{
    DebateSession, MAX_PARTICIPANTS, MIN_PARTICIPANTS, OPENING_TEMPERATURE, Participant,
};
pub use dialogue::DialogueSession;
pub use state::{SessionState, idle_for_longer_than};
pub use window::{ContextWindow, HistoryStats, MIN_WINDOW_TURNS, WindowConfig};

/// External services a session talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub backend: Arc<dyn GenerationBackend>,
    pub validator: Arc<dyn InputValidator>,
}

impl Collaborators {
    #[must_use]
    pub fn new(backend: Arc<dyn GenerationBackend>, validator: Arc<dyn InputValidator>) -> Self {
        Self { backend, validator }
    }
}
