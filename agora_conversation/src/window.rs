//! Bounded context window over a session's turns.
//!
//! The window is what gets sent to the generation backend: an oldest-first
//! run of turns, capped by turn count and optionally by characters, with an
//! optional pinned intro turn that is never evicted.

use std::collections::VecDeque;

use agora_core::{EngineError, Result, Role, TranscriptEntry, TurnRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Smallest usable window: the pinned intro plus the newest turn.
pub const MIN_WINDOW_TURNS: usize = 2;

/// Configuration for a context window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WindowConfig {
    /// Maximum number of turns retained, pinned turn included
    pub max_turns: usize,
    /// Approximate payload budget in characters
    pub max_chars: Option<usize>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            max_turns: 20,
            max_chars: Some(8000),
        }
    }
}

impl WindowConfig {
    #[must_use]
    pub const fn with_max_turns(mut self, max: usize) -> Self {
        self.max_turns = max;
        self
    }

    #[must_use]
    pub const fn with_max_chars(mut self, max: Option<usize>) -> Self {
        self.max_chars = max;
        self
    }
}

#[derive(Debug, Clone)]
pub struct ContextWindow {
    config: WindowConfig,
    pinned: Option<TurnRecord>,
    turns: VecDeque<TurnRecord>,
    last_sequence: Option<u64>,
}

impl ContextWindow {
    /// Create an empty window. `max_turns` below [`MIN_WINDOW_TURNS`] is raised
    /// to it.
    #[must_use]
    pub fn new(config: WindowConfig) -> Self {
        let config = WindowConfig {
            max_turns: config.max_turns.max(MIN_WINDOW_TURNS),
            ..config
        };
        Self {
            config,
            pinned: None,
            turns: VecDeque::new(),
            last_sequence: None,
        }
    }

    /// Sequence number the next turn must carry. Fails once the sequence
    /// space is exhausted.
    pub fn next_sequence(&self) -> Result<u64> {
        match self.last_sequence {
            None => Ok(0),
            Some(last) => last.checked_add(1).ok_or_else(|| {
                EngineError::InvalidTurn(format!("no sequence number follows {last}"))
            }),
        }
    }

    fn check_sequence(&self, turn: &TurnRecord) -> Result<()> {
        match self.last_sequence {
            Some(last) if turn.sequence_number() <= last => Err(EngineError::InvalidTurn(format!(
                "sequence {} does not follow {last}",
                turn.sequence_number()
            ))),
            _ => Ok(()),
        }
    }

    /// Pin the intro turn. Allowed once, before any other turn.
    pub fn pin(&mut self, turn: TurnRecord) -> Result<()> {
        if self.pinned.is_some() {
            return Err(EngineError::InvalidTurn(
                "window already has a pinned turn".to_string(),
            ));
        }
        if !self.turns.is_empty() {
            return Err(EngineError::InvalidTurn(
                "pinned turn must precede all other turns".to_string(),
            ));
        }
        self.check_sequence(&turn)?;

        self.last_sequence = Some(turn.sequence_number());
        self.pinned = Some(turn);
        Ok(())
    }

    /// Append `turn` as the newest entry, evicting the oldest unpinned turns
    /// while over budget. The appended turn itself is never evicted.
    pub fn append(&mut self, turn: TurnRecord) -> Result<()> {
        self.check_sequence(&turn)?;

        self.last_sequence = Some(turn.sequence_number());
        self.turns.push_back(turn);

        let mut evicted = 0_usize;
        while self.turns.len() > 1 && self.over_budget() {
            self.turns.pop_front();
            evicted += 1;
        }
        if evicted > 0 {
            debug!("Evicted {evicted} turn(s) from context window");
        }

        Ok(())
    }

    fn over_budget(&self) -> bool {
        self.len() > self.config.max_turns
            || self
                .config
                .max_chars
                .is_some_and(|max| self.total_chars() > max)
    }

    fn total_chars(&self) -> usize {
        self.iter().map(|t| t.text().chars().count()).sum()
    }

    fn iter(&self) -> impl Iterator<Item = &TurnRecord> {
        self.pinned.iter().chain(self.turns.iter())
    }

    /// Copy of the retained turns, pinned turn first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<TurnRecord> {
        self.iter().cloned().collect()
    }

    /// Retained turns as backend transcript entries.
    #[must_use]
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.iter().map(TranscriptEntry::from).collect()
    }

    #[must_use]
    pub const fn pinned(&self) -> Option<&TurnRecord> {
        self.pinned.as_ref()
    }

    #[must_use]
    pub fn last(&self) -> Option<&TurnRecord> {
        self.turns.back().or(self.pinned.as_ref())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len() + usize::from(self.pinned.is_some())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub const fn config(&self) -> &WindowConfig {
        &self.config
    }

    #[must_use]
    pub fn stats(&self) -> HistoryStats {
        let count = |role: Role| self.iter().filter(|t| t.role() == role).count();
        let total_characters = self.total_chars();

        HistoryStats {
            total_turns: self.len(),
            user_turns: count(Role::User),
            persona_turns: count(Role::Persona),
            total_characters,
            estimated_tokens: total_characters / 4, // Rough estimate: 4 chars per token
        }
    }
}

impl Default for ContextWindow {
    fn default() -> Self {
        Self::new(WindowConfig::default())
    }
}

/// Statistics about the retained window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryStats {
    pub total_turns: usize,
    pub user_turns: usize,
    pub persona_turns: usize,
    pub total_characters: usize,
    pub estimated_tokens: usize,
}
