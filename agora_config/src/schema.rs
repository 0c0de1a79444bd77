use agora_conversation::{MIN_WINDOW_TURNS, WindowConfig};
use agora_core::ValidationLimits;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable that overrides `providers.gemini.api_key`.
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

const API_KEY_PLACEHOLDER: &str = "your-gemini-api-key-here";

const CONFIG_TEMPLATE: &str = r#"{
  "agents": {
    "defaults": {
      "model": "gemini-1.5-flash",
      "max_tokens": 500,
      "temperature": 0.8
    }
  },
  "providers": {
    "gemini": {
      "api_key": "your-gemini-api-key-here",
      "base_url": "https://generativelanguage.googleapis.com/v1beta",
      "timeout_secs": 30
    }
  },
  "sessions": {
    "max_history_length": 20,
    "max_context_chars": 8000,
    "idle_timeout_secs": 3600,
    "sweep_interval_secs": 60,
    "debate_temperature": 0.8
  },
  "validation": {
    "max_message_chars": 2000,
    "min_topic_chars": 3,
    "max_topic_chars": 200
  }
}"#;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub agents: AgentsConfig,
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub sessions: SessionsConfig,
    #[serde(default)]
    pub validation: ValidationLimits,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentsConfig {
    pub defaults: AgentDefaults,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AgentDefaults {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub gemini: ProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default = "ProviderConfig::default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    const fn default_timeout_secs() -> u64 {
        30
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionsConfig {
    #[serde(default = "SessionsConfig::default_max_history_length")]
    pub max_history_length: usize,
    #[serde(default = "SessionsConfig::default_max_context_chars")]
    pub max_context_chars: Option<usize>,
    #[serde(default = "SessionsConfig::default_idle_timeout_secs")]
    pub idle_timeout_secs: u64,
    #[serde(default = "SessionsConfig::default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    #[serde(default = "SessionsConfig::default_debate_temperature")]
    pub debate_temperature: f32,
}

impl Default for SessionsConfig {
    fn default() -> Self {
        Self {
            max_history_length: Self::default_max_history_length(),
            max_context_chars: Self::default_max_context_chars(),
            idle_timeout_secs: Self::default_idle_timeout_secs(),
            sweep_interval_secs: Self::default_sweep_interval_secs(),
            debate_temperature: Self::default_debate_temperature(),
        }
    }
}

impl SessionsConfig {
    const fn default_max_history_length() -> usize {
        20
    }

    #[expect(clippy::unnecessary_wraps, reason = "serde default for an optional field")]
    const fn default_max_context_chars() -> Option<usize> {
        Some(8000)
    }

    const fn default_idle_timeout_secs() -> u64 {
        3600
    }

    const fn default_sweep_interval_secs() -> u64 {
        60
    }

    const fn default_debate_temperature() -> f32 {
        0.8
    }
}

impl Config {
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join("agora"))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load `~/agora/config.json`, applying the `GEMINI_API_KEY` override.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'agora init' to create config.",
                config_path.display()
            );
        }

        let config = Self::load_from(&config_path)?
            .with_api_key_override(std::env::var(API_KEY_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        debug!("Reading config from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> anyhow::Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        Ok(config)
    }

    /// Replace the file's API key with `key` when it is set and non-empty.
    #[must_use]
    pub fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            info!("Using API key from {API_KEY_ENV}");
            self.providers.gemini.api_key = key;
        }
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.sessions.max_history_length < MIN_WINDOW_TURNS {
            anyhow::bail!(
                "sessions.max_history_length must be at least {MIN_WINDOW_TURNS}, got {}",
                self.sessions.max_history_length
            );
        }
        if self.agents.defaults.model.trim().is_empty() {
            anyhow::bail!("agents.defaults.model cannot be empty");
        }
        if self.agents.defaults.max_tokens == 0 {
            anyhow::bail!("agents.defaults.max_tokens must be positive");
        }
        if !(0.0..=2.0).contains(&self.agents.defaults.temperature)
            || !(0.0..=2.0).contains(&self.sessions.debate_temperature)
        {
            anyhow::bail!("temperatures must be within 0.0..=2.0");
        }
        if self.providers.gemini.timeout_secs == 0 {
            anyhow::bail!("providers.gemini.timeout_secs must be positive");
        }
        if self.sessions.sweep_interval_secs == 0 {
            anyhow::bail!("sessions.sweep_interval_secs must be positive");
        }
        if self.validation.min_topic_chars > self.validation.max_topic_chars {
            anyhow::bail!("validation.min_topic_chars exceeds validation.max_topic_chars");
        }
        Ok(())
    }

    /// Whether a real API key is configured, rather than none or the template value.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        let key = self.providers.gemini.api_key.trim();
        !key.is_empty() && key != API_KEY_PLACEHOLDER
    }

    #[must_use]
    pub fn window_config(&self) -> WindowConfig {
        WindowConfig::default()
            .with_max_turns(self.sessions.max_history_length)
            .with_max_chars(self.sessions.max_context_chars)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.providers.gemini.timeout_secs)
    }

    #[must_use]
    pub const fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.sessions.idle_timeout_secs)
    }

    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sessions.sweep_interval_secs)
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn create_config() -> anyhow::Result<()> {
        let config_dir = Self::ensure_config_dir()?;
        let config_path = Self::write_template(&config_dir)?;

        println!("✅ Created config file at: {}", config_path.display());
        println!();
        println!("📝 Next steps:");
        println!("   1. Edit the config file and add your Gemini API key");
        println!("      (or export {API_KEY_ENV})");
        println!("   2. Run 'agora personas' to see who you can talk to");
        println!("   3. Run 'agora chat --persona socrates' to start a dialogue");
        println!();
        println!("🔧 Configuration options:");
        println!("   - model: Gemini model to use (gemini-1.5-flash, gemini-1.5-pro, etc.)");
        println!("   - max_history_length: Number of turns kept in context");
        println!("   - idle_timeout_secs: Idle time before a session expires");
        println!();
        Ok(())
    }

    /// Write the template into `dir`, refusing to overwrite an existing file.
    fn write_template(dir: &Path) -> anyhow::Result<PathBuf> {
        let config_path = dir.join("config.json");

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        std::fs::write(&config_path, CONFIG_TEMPLATE)?;
        Ok(config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
        "agents": { "defaults": { "model": "gemini-1.5-flash", "max_tokens": 500, "temperature": 0.8 } },
        "providers": { "gemini": { "api_key": "abc" } }
    }"#;

    #[test]
    fn template_parses_and_validates() {
        let config = Config::from_json_str(CONFIG_TEMPLATE).unwrap();
        config.validate().unwrap();
        assert_eq!(config.agents.defaults.model, "gemini-1.5-flash");
        assert_eq!(config.sessions.max_history_length, 20);
        assert!(!config.has_api_key());
    }

    #[test]
    fn missing_sections_take_defaults() {
        let config = Config::from_json_str(MINIMAL).unwrap();

        assert_eq!(config.providers.gemini.timeout_secs, 30);
        assert_eq!(config.providers.gemini.base_url, None);
        assert_eq!(config.sessions.idle_timeout_secs, 3600);
        assert_eq!(config.sessions.max_context_chars, Some(8000));
        assert_eq!(config.validation, ValidationLimits::default());
        assert_eq!(config.idle_timeout(), Duration::from_secs(3600));

        let window = config.window_config();
        assert_eq!(window.max_turns, 20);
        assert_eq!(window.max_chars, Some(8000));
    }

    #[test]
    fn short_history_is_rejected() {
        let mut config = Config::from_json_str(MINIMAL).unwrap();
        config.sessions.max_history_length = 1;
        assert!(config.validate().is_err());

        config.sessions.max_history_length = 2;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn env_key_overrides_file_key() {
        let config = Config::from_json_str(MINIMAL).unwrap();

        let kept = config.clone().with_api_key_override(Some("  ".to_string()));
        assert_eq!(kept.providers.gemini.api_key, "abc");

        let replaced = config.with_api_key_override(Some("from-env".to_string()));
        assert_eq!(replaced.providers.gemini.api_key, "from-env");
        assert!(replaced.has_api_key());
    }

    #[test]
    fn template_is_written_once() {
        let dir = tempfile::tempdir().unwrap();

        let path = Config::write_template(dir.path()).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.sessions.sweep_interval_secs, 60);

        assert!(Config::write_template(dir.path()).is_err());
    }
}
