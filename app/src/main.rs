#![deny(
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

mod command;

use clap::{Parser, Subcommand};
use command::{
    ChatInput, ChatStrategy, CommandStrategy, DebateInput, DebateStrategy, InfoStrategy,
    InitStrategy, PersonasStrategy, VersionStrategy,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "agora")]
#[command(about = "Converse and debate with AI philosopher personas", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Talk one-on-one with a persona
    Chat {
        /// Persona id (see `agora personas`)
        #[arg(short = 'p', long, default_value = "socrates")]
        persona: String,

        /// User id recorded on the session
        #[arg(short = 'u', long, default_value = "cli")]
        user: String,

        /// Single message to send
        #[arg(short = 'm', long)]
        message: Option<String>,

        /// Model to use
        #[arg(short = 'M', long)]
        model: Option<String>,
    },
    /// Run a debate between 2 to 5 personas
    Debate {
        /// Debate topic
        #[arg(short = 't', long)]
        topic: String,

        /// Longer framing of the topic shown to every participant
        #[arg(short = 'd', long)]
        description: Option<String>,

        /// Comma-separated persona ids, in speaking order
        #[arg(short = 'p', long, value_delimiter = ',', required = true)]
        personas: Vec<String>,

        /// Stance for a participant as persona=stance (repeatable)
        #[arg(long = "position")]
        positions: Vec<String>,

        /// Number of full rounds
        #[arg(short = 'r', long, default_value_t = 3)]
        rounds: u32,

        /// Prompt for an audience note between rounds
        #[arg(short = 'i', long)]
        interject: bool,

        /// Print a moderator summary at the end
        #[arg(short = 's', long)]
        summary: bool,

        /// Model to use
        #[arg(short = 'M', long)]
        model: Option<String>,
    },
    /// List available personas
    Personas,
    /// Initialize configuration
    Init,
    /// Show configuration
    Info,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            persona,
            user,
            message,
            model,
        } => {
            ChatStrategy
                .execute(ChatInput {
                    persona,
                    user,
                    message,
                    model,
                })
                .await
        }
        Commands::Debate {
            topic,
            description,
            personas,
            positions,
            rounds,
            interject,
            summary,
            model,
        } => {
            DebateStrategy
                .execute(DebateInput {
                    topic,
                    description,
                    personas,
                    positions,
                    rounds,
                    interject,
                    summary,
                    model,
                })
                .await
        }
        Commands::Personas => PersonasStrategy.execute(()).await,
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Info => InfoStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
