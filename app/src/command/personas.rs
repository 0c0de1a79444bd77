use agora_core::{BuiltinCatalog, PersonaCatalog};

/// Strategy for listing the personas available for dialogues and debates.
#[derive(Debug, Clone, Copy)]
pub struct PersonasStrategy;

impl super::CommandStrategy for PersonasStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let catalog = BuiltinCatalog::new();

        println!("=== Available Personas ===\n");
        for persona in catalog.list() {
            match &persona.profile {
                Some(profile) => println!(
                    "  {:<16} {} ({}, {})",
                    persona.id, persona.display_name, profile.era, profile.school
                ),
                None => println!("  {:<16} {}", persona.id, persona.display_name),
            }
        }
        println!();
        println!("Start a dialogue with: agora chat --persona <id>");
        Ok(())
    }
}
