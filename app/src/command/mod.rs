//! Static strategy pattern for CLI commands.
//!
//! Each command is a separate strategy with its own input type, dispatched
//! statically from `main`.

use std::sync::Arc;

use agora_config::Config;
use agora_conversation::Collaborators;
use agora_core::{BuiltinCatalog, DefaultValidator};
use agora_providers::GeminiProvider;
use agora_session::{ManagerConfig, SessionManager};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::task::JoinHandle;
use tracing::{debug, info};

mod chat;
mod debate;
mod info;
mod init;
mod personas;
mod version;

pub use chat::{ChatInput, ChatStrategy};
pub use debate::{DebateInput, DebateStrategy};
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use personas::PersonasStrategy;
pub use version::VersionStrategy;

/// Core trait defining the contract for all command strategies.
///
/// # Example
/// ```rust,ignore
/// struct MyStrategy;
///
/// impl CommandStrategy for MyStrategy {
///     type Input = MyInput;
///
///     async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
///         // Command logic here
///         Ok(())
///     }
/// }
/// ```
pub trait CommandStrategy: Send + Sync + 'static {
    /// The input type this strategy accepts.
    type Input;

    /// Execute the command with the given input.
    ///
    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Components shared by the commands that talk to the model.
struct Runtime {
    config: Config,
    manager: Arc<SessionManager>,
    sweeper: JoinHandle<()>,
}

impl Runtime {
    async fn shutdown(self) {
        self.sweeper.abort();
        self.manager.close_all().await;
    }
}

/// Load config, build the Gemini backend and start the session registry with
/// its idle sweeper.
fn init_runtime(model: Option<String>) -> anyhow::Result<Runtime> {
    let config = Config::load()?;
    info!("Loaded config from ~/agora/config.json");

    if !config.has_api_key() {
        anyhow::bail!(
            "No Gemini API key configured. Set {} or edit ~/agora/config.json.",
            agora_config::API_KEY_ENV
        );
    }

    let defaults = &config.agents.defaults;
    let mut provider = GeminiProvider::new(
        config.providers.gemini.api_key.clone(),
        config.request_timeout(),
    )?
    .with_model(model.unwrap_or_else(|| defaults.model.clone()))
    .with_max_tokens(defaults.max_tokens)
    .with_temperature(defaults.temperature);
    if let Some(base_url) = &config.providers.gemini.base_url {
        provider = provider.with_base_url(base_url.clone());
    }
    info!("Using model {}", provider.model());

    let collaborators = Collaborators::new(
        Arc::new(provider),
        Arc::new(DefaultValidator::new(config.validation.clone())),
    );
    let manager = Arc::new(SessionManager::new(
        Arc::new(BuiltinCatalog::new()),
        collaborators,
        ManagerConfig {
            window: config.window_config(),
            debate_temperature: Some(config.sessions.debate_temperature),
        },
    ));

    let idle_timeout = chrono::Duration::from_std(config.idle_timeout())?;
    let sweeper = spawn_sweeper(manager.clone(), config.sweep_interval(), idle_timeout);

    Ok(Runtime {
        config,
        manager,
        sweeper,
    })
}

/// Periodically expire sessions that have been idle for too long.
fn spawn_sweeper(
    manager: Arc<SessionManager>,
    every: std::time::Duration,
    idle_timeout: chrono::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let expired = manager.sweep_idle(chrono::Utc::now(), idle_timeout).await;
            debug!("Idle sweep expired {} session(s)", expired.len());
        }
    })
}

type InputLines = Lines<BufReader<Stdin>>;

fn stdin_lines() -> InputLines {
    BufReader::new(tokio::io::stdin()).lines()
}

/// Print `prompt` and read one trimmed line. `None` on end of input.
async fn prompt_line(lines: &mut InputLines, prompt: &str) -> anyhow::Result<Option<String>> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(prompt.as_bytes()).await?;
    stdout.flush().await?;
    Ok(lines.next_line().await?.map(|l| l.trim().to_string()))
}
