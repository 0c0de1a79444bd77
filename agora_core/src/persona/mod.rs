//! Persona descriptors and the catalog they are looked up in.
//!
//! A persona is plain data: one [`Persona`] record per identity, selected by
//! id when a session is created.

use serde::{Deserialize, Serialize};

mod builtin;

pub use builtin::BuiltinCatalog;

/// Biographical and stylistic data a system prompt is rendered from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonaProfile {
    pub era: String,
    pub nationality: String,
    pub school: String,
    pub description: String,
    pub style: String,
    pub key_concepts: Vec<String>,
    pub famous_works: Vec<String>,
    pub core_beliefs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Persona {
    pub id: String,
    pub display_name: String,
    pub system_prompt: String,
    /// Opening line pinned at the head of a dialogue.
    pub greeting: Option<String>,
    pub profile: Option<PersonaProfile>,
}

impl Persona {
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            system_prompt: system_prompt.into(),
            greeting: None,
            profile: None,
        }
    }

    /// Build a persona whose system prompt is rendered from `profile`.
    #[must_use]
    pub fn from_profile(
        id: impl Into<String>,
        display_name: impl Into<String>,
        profile: PersonaProfile,
    ) -> Self {
        let display_name = display_name.into();
        let system_prompt = render_system_prompt(&display_name, &profile);
        Self {
            id: id.into(),
            display_name,
            system_prompt,
            greeting: None,
            profile: Some(profile),
        }
    }

    #[must_use]
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        self.greeting = Some(greeting.into());
        self
    }
}

fn render_system_prompt(name: &str, profile: &PersonaProfile) -> String {
    let beliefs = profile
        .core_beliefs
        .iter()
        .map(|belief| format!("- {belief}"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are {name}, the {era} {nationality} philosopher.\n\n\
         PERSONALITY & STYLE:\n{style}\n\n\
         CORE BELIEFS:\n{beliefs}\n\n\
         KEY CONCEPTS: {concepts}\n\
         FAMOUS WORKS: {works}\n\
         PHILOSOPHICAL SCHOOL: {school}\n\n\
         INSTRUCTIONS:\n\
         - Respond as {name} would, within your own philosophical framework\n\
         - Draw on your historical context, works and contemporaries when relevant\n\
         - Approach modern topics through your own lens\n\
         - Stay in character while remaining engaging and educational",
        era = profile.era,
        nationality = profile.nationality,
        style = profile.style,
        concepts = profile.key_concepts.join(", "),
        works = profile.famous_works.join(", "),
        school = profile.school,
    )
}

/// Read-only lookup of personas by id.
pub trait PersonaCatalog: Send + Sync {
    fn lookup(&self, persona_id: &str) -> Option<Persona>;

    /// All personas, in presentation order.
    fn list(&self) -> Vec<Persona>;
}
