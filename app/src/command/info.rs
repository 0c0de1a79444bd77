use agora_config::Config;

/// Strategy for displaying configuration information.
///
/// Outputs the API key (masked), agent defaults, session and validation
/// settings.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = ();

    async fn execute(&self, _input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;

        println!("=== agora Configuration ===\n");

        println!("Gemini:");
        if config.has_api_key() {
            println!("  API Key: {}", mask_key(&config.providers.gemini.api_key));
        } else {
            println!("  API Key: (not set)");
        }
        if let Some(base_url) = &config.providers.gemini.base_url {
            println!("  Base URL: {base_url}");
        }
        println!("  Timeout: {}s", config.providers.gemini.timeout_secs);
        println!();

        println!("Agent Defaults:");
        println!("  Model: {}", config.agents.defaults.model);
        println!("  Max Tokens: {}", config.agents.defaults.max_tokens);
        println!("  Temperature: {}", config.agents.defaults.temperature);
        println!();

        let sessions = &config.sessions;
        println!("Sessions:");
        println!("  Max History Length: {}", sessions.max_history_length);
        match sessions.max_context_chars {
            Some(chars) => println!("  Max Context Chars: {chars}"),
            None => println!("  Max Context Chars: (unbounded)"),
        }
        println!("  Idle Timeout: {}s", sessions.idle_timeout_secs);
        println!("  Sweep Interval: {}s", sessions.sweep_interval_secs);
        println!("  Debate Temperature: {}", sessions.debate_temperature);
        println!();

        println!("Validation:");
        println!("  Max Message Chars: {}", config.validation.max_message_chars);
        println!(
            "  Topic Chars: {}..={}",
            config.validation.min_topic_chars, config.validation.max_topic_chars
        );

        Ok(())
    }
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}
