//! Multi-persona debate driven round by round from the CLI.

use agora_session::DebatePlan;
use tracing::{info, warn};

use super::{init_runtime, prompt_line, stdin_lines};

/// Input parameters for the Debate command strategy.
#[derive(Debug, Clone)]
pub struct DebateInput {
    pub topic: String,
    pub description: Option<String>,
    /// Persona ids, in speaking order
    pub personas: Vec<String>,
    /// `persona=stance` assignments
    pub positions: Vec<String>,
    pub rounds: u32,
    /// Ask the audience for a note between rounds
    pub interject: bool,
    /// Print a moderator summary at the end
    pub summary: bool,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct DebateStrategy;

impl super::CommandStrategy for DebateStrategy {
    type Input = DebateInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let runtime = init_runtime(input.model.clone())?;
        let ids: Vec<&str> = input.personas.iter().map(String::as_str).collect();
        let plan = build_plan(&input, &ids)?;
        let session = runtime.manager.create_debate_with(&plan).await?;

        {
            let debate = session.lock().await;
            info!("Started debate {}", debate.id());
            if let Some(opening) = debate.window().pinned() {
                println!("=== {} ===\n", opening.text());
            }
        }

        let mut lines = stdin_lines();
        let speakers = ids.len();
        'rounds: for round in 1..=input.rounds {
            println!("--- Round {round} ---\n");

            for _ in 0..speakers {
                let mut debate = session.lock().await;
                let name = debate.next_speaker().display_name.clone();
                match debate.advance_turn().await {
                    Ok(turn) => println!("{name}: {}\n", turn.text()),
                    Err(e) => {
                        warn!("Debate stopped in round {round}: {e}");
                        eprintln!("Error: {name} could not respond: {e}");
                        break 'rounds;
                    }
                }
            }

            if input.interject && round < input.rounds {
                let note = prompt_line(&mut lines, "Audience (enter to skip)> ").await?;
                if let Some(note) = note.filter(|n| !n.is_empty()) {
                    if let Err(e) = session.lock().await.interject(&note) {
                        eprintln!("Note rejected: {e}");
                    }
                }
                println!();
            }
        }

        if input.summary {
            match session.lock().await.summarize().await {
                Ok(summary) => println!("=== Summary ===\n{summary}\n"),
                Err(e) => eprintln!("Error: summary unavailable: {e}"),
            }
        }

        runtime.shutdown().await;
        Ok(())
    }
}

fn build_plan(input: &DebateInput, ids: &[&str]) -> anyhow::Result<DebatePlan> {
    let mut plan = DebatePlan::new(input.topic.as_str(), ids);
    if let Some(description) = &input.description {
        plan = plan.with_description(description.as_str());
    }
    for assignment in &input.positions {
        let Some((persona, stance)) = assignment.split_once('=') else {
            anyhow::bail!("Position must look like persona=stance, got '{assignment}'");
        };
        let persona = persona.trim();
        if !ids.contains(&persona) {
            anyhow::bail!("Position given for '{persona}', who is not in this debate");
        }
        plan = plan.with_position(persona, stance.trim());
    }
    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(positions: &[&str]) -> DebateInput {
        DebateInput {
            topic: "Is virtue teachable?".to_string(),
            description: Some("Meno's question".to_string()),
            personas: vec!["socrates".to_string(), "aristotle".to_string()],
            positions: positions.iter().map(ToString::to_string).collect(),
            rounds: 1,
            interject: false,
            summary: false,
            model: None,
        }
    }

    #[test]
    fn test_positions_are_assigned_to_seats() {
        let input = input(&["aristotle = Virtue comes from habit"]);
        let plan = build_plan(&input, &["socrates", "aristotle"]).unwrap();

        assert_eq!(plan.description.as_deref(), Some("Meno's question"));
        assert_eq!(plan.seats[0].position, None);
        assert_eq!(
            plan.seats[1].position.as_deref(),
            Some("Virtue comes from habit")
        );
    }

    #[test]
    fn test_malformed_or_unknown_positions_rejected() {
        let ids = ["socrates", "aristotle"];
        assert!(build_plan(&input(&["aristotle"]), &ids).is_err());
        assert!(build_plan(&input(&["kant=Duty"]), &ids).is_err());
    }
}
