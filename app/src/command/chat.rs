//! One-on-one dialogue with a persona.
//!
//! With `--message` a single exchange is printed; otherwise an interactive
//! loop runs until `exit`, end of input, or idle expiry.

use agora_core::Role;
use tracing::info;

use super::{init_runtime, prompt_line, stdin_lines};

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Persona id from the catalog
    pub persona: String,
    /// Caller identity recorded on the session
    pub user: String,
    /// Optional single message to send (non-interactive mode)
    pub message: Option<String>,
    /// Optional model override
    pub model: Option<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let runtime = init_runtime(input.model)?;
        let session = runtime
            .manager
            .create_dialogue(&input.user, &input.persona)
            .await?;

        let (session_id, name, greeting) = {
            let session = session.lock().await;
            let greeting = session
                .snapshot()
                .first()
                .filter(|t| t.role() == Role::Persona)
                .map(|t| t.text().to_string());
            (
                session.id(),
                session.persona().display_name.clone(),
                greeting,
            )
        };
        info!("Started dialogue {session_id} with {name}");

        if let Some(message) = input.message {
            let reply = session.lock().await.submit_user_turn(&message).await?;
            println!("{}", reply.text());
            runtime.shutdown().await;
            return Ok(());
        }

        println!("=== Dialogue with {name} ===");
        println!("Type 'exit', 'quit', or Ctrl+C to end. '/stats' shows history usage.\n");
        if let Some(greeting) = greeting {
            println!("{name}: {greeting}\n");
        }

        let mut lines = stdin_lines();
        while let Some(line) = prompt_line(&mut lines, "> ").await? {
            if matches!(line.as_str(), "exit" | "quit" | "q") {
                break;
            }
            if line.is_empty() {
                continue;
            }

            // The sweeper may have expired the session while we waited.
            if runtime.manager.get_dialogue(session_id).await.is_err() {
                println!(
                    "\nThe session expired after {}s of inactivity.",
                    runtime.config.sessions.idle_timeout_secs
                );
                break;
            }

            if line == "/stats" {
                let stats = session.lock().await.window().stats();
                println!(
                    "\n{} turns ({} yours, {} {name}), ~{} tokens\n",
                    stats.total_turns, stats.user_turns, stats.persona_turns, stats.estimated_tokens
                );
                continue;
            }

            match session.lock().await.submit_user_turn(&line).await {
                Ok(reply) => println!("\n{name}: {}\n", reply.text()),
                Err(e) => eprintln!("Error: {e}"),
            }
        }

        let turns = session.lock().await.window().stats().total_turns;
        println!("\nDialogue ended. {turns} turns in context.");
        runtime.shutdown().await;
        Ok(())
    }
}
