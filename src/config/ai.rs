// src/config/ai.rs
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path};

pub const ENV_AI_CONFIG_PATH: &str = "AI_CONFIG_PATH";
pub const DEFAULT_AI_CONFIG_PATH: &str = "config/ai.json";

pub const DEFAULT_TOGETHER_MODEL: &str = "meta-llama/Llama-3.3-70B-Instruct-Turbo-Free";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

fn default_provider() -> String {
    "together".to_string()
}
fn default_api_key() -> String {
    "ENV".to_string()
}
fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AiConfig {
    pub enabled: bool,
    /// "together" | "openai" (case-insensitive)
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model id; provider default when absent.
    #[serde(default)]
    pub model: Option<String>,
    /// "ENV" means: read from TOGETHER_API_KEY / OPENAI_API_KEY (by provider)
    #[serde(default = "default_api_key")]
    pub api_key: String,
    /// Upper bound for one completion call, end to end.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            model: None,
            api_key: default_api_key(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AiConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        let cfg: AiConfig = serde_json::from_str(&data)?;
        cfg.resolve()
    }

    /// `$AI_CONFIG_PATH`, else `config/ai.json`, else a disabled default.
    pub fn load_default() -> anyhow::Result<Self> {
        let path = env::var(ENV_AI_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_AI_CONFIG_PATH.into());
        if Path::new(&path).exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Normalize provider, resolve an "ENV" key, sanitize the timeout.
    pub fn resolve(mut self) -> anyhow::Result<Self> {
        self.provider = self.provider.trim().to_lowercase();

        if self.enabled && self.api_key.trim().eq_ignore_ascii_case("env") {
            self.api_key = match self.provider.as_str() {
                "together" => env::var("TOGETHER_API_KEY")
                    .map_err(|_| anyhow::anyhow!("Missing TOGETHER_API_KEY env var"))?,
                "openai" => env::var("OPENAI_API_KEY")
                    .map_err(|_| anyhow::anyhow!("Missing OPENAI_API_KEY env var"))?,
                other => anyhow::bail!("Unsupported provider in config: {other}"),
            };
        }

        if self.timeout_secs == 0 {
            self.timeout_secs = default_timeout_secs();
        }
        Ok(self)
    }

    pub fn model_or_default(&self) -> &str {
        match (&self.model, self.provider.as_str()) {
            (Some(m), _) if !m.trim().is_empty() => m.as_str(),
            (_, "openai") => DEFAULT_OPENAI_MODEL,
            _ => DEFAULT_TOGETHER_MODEL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[serial_test::serial]
    #[test]
    fn env_key_is_resolved_per_provider() {
        env::set_var("TOGETHER_API_KEY", "tg-key");
        let cfg: AiConfig =
            serde_json::from_str(r#"{"enabled": true, "provider": " Together "}"#).unwrap();
        let cfg = cfg.resolve().unwrap();
        assert_eq!(cfg.provider, "together");
        assert_eq!(cfg.api_key, "tg-key");
        assert_eq!(cfg.model_or_default(), DEFAULT_TOGETHER_MODEL);
        assert_eq!(cfg.timeout_secs, 60);
        env::remove_var("TOGETHER_API_KEY");
    }

    #[serial_test::serial]
    #[test]
    fn missing_env_key_is_an_error_only_when_enabled() {
        env::remove_var("OPENAI_API_KEY");
        let on: AiConfig =
            serde_json::from_str(r#"{"enabled": true, "provider": "openai"}"#).unwrap();
        assert!(on.resolve().is_err());

        let off: AiConfig =
            serde_json::from_str(r#"{"enabled": false, "provider": "openai"}"#).unwrap();
        let off = off.resolve().unwrap();
        assert_eq!(off.model_or_default(), DEFAULT_OPENAI_MODEL);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let cfg = AiConfig {
            enabled: true,
            provider: "claude".into(),
            ..AiConfig::default()
        };
        assert!(cfg.resolve().is_err());
    }

    #[test]
    fn literal_key_and_model_override_are_kept() {
        let cfg = AiConfig {
            enabled: true,
            provider: "openai".into(),
            model: Some("gpt-4.1-mini".into()),
            api_key: "sk-literal".into(),
            timeout_secs: 0,
        }
        .resolve()
        .unwrap();
        assert_eq!(cfg.api_key, "sk-literal");
        assert_eq!(cfg.model_or_default(), "gpt-4.1-mini");
        assert_eq!(cfg.timeout_secs, 60);
    }
}
