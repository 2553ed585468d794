// src/classify/llm.rs
//! Text-generation providers behind one object-safe trait.
//!
//! Real providers speak the OpenAI-compatible chat-completions protocol
//! (Together AI, OpenAI). `DisabledGenerator` and `MockGenerator` cover
//! switched-off and offline runs.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::ai::AiConfig;

pub const TOGETHER_CHAT_URL: &str = "https://api.together.xyz/v1/chat/completions";
pub const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Single prompt in, completion text out.
pub trait TextGenerator: Send + Sync {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

    /// Provider name for logs and cache keys.
    fn name(&self) -> &'static str;
}

pub type DynGenerator = Arc<dyn TextGenerator>;

/// Build a generator from config.
///
/// * `AI_TEST_MODE=mock` returns a deterministic mock.
/// * `enabled == false` returns a generator that always fails.
/// * Otherwise the configured chat-completions provider.
pub fn build_generator(config: &AiConfig) -> Result<DynGenerator> {
    if std::env::var("AI_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        return Ok(Arc::new(MockGenerator::new(
            "Medium Opportunity\nReason: Workforce Expansion & Hiring - mock analysis.\nSummary: Deterministic mock output.",
        )));
    }

    if !config.enabled {
        return Ok(Arc::new(DisabledGenerator));
    }

    let timeout = Duration::from_secs(config.timeout_secs);
    let provider = match config.provider.as_str() {
        "together" => ChatCompletionsProvider::together(
            config.api_key.clone(),
            config.model_or_default(),
            timeout,
        )?,
        "openai" => ChatCompletionsProvider::openai(
            config.api_key.clone(),
            config.model_or_default(),
            timeout,
        )?,
        other => bail!("unsupported text-generation provider: {other}"),
    };
    Ok(Arc::new(provider))
}

/// OpenAI-compatible chat-completions client.
pub struct ChatCompletionsProvider {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    name: &'static str,
}

impl ChatCompletionsProvider {
    pub fn together(api_key: String, model: &str, timeout: Duration) -> Result<Self> {
        Self::with_endpoint("together", TOGETHER_CHAT_URL, api_key, model, timeout)
    }

    pub fn openai(api_key: String, model: &str, timeout: Duration) -> Result<Self> {
        Self::with_endpoint("openai", OPENAI_CHAT_URL, api_key, model, timeout)
    }

    pub fn with_endpoint(
        name: &'static str,
        endpoint: impl Into<String>,
        api_key: String,
        model: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent("upsell-analyzer/0.1")
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .context("building chat-completions http client")?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key,
            model: model.to_string(),
            name,
        })
    }

    async fn complete_impl(&self, prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
        }
        #[derive(Deserialize)]
        struct Resp {
            #[serde(default)]
            choices: Vec<Choice>,
        }
        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMsg,
        }
        #[derive(Deserialize)]
        struct ChoiceMsg {
            #[serde(default)]
            content: Option<String>,
        }

        if self.api_key.trim().is_empty() {
            bail!("{} api key is empty", self.name);
        }

        let req = Req {
            model: &self.model,
            messages: vec![Msg {
                role: "user",
                content: prompt,
            }],
        };

        let body: Resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .with_context(|| format!("{} chat-completions request", self.name))?
            .error_for_status()
            .with_context(|| format!("{} chat-completions non-2xx", self.name))?
            .json()
            .await
            .with_context(|| format!("{} chat-completions body", self.name))?;

        // No choice or null content is an empty completion, not a transport failure.
        Ok(body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}

impl TextGenerator for ChatCompletionsProvider {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(self.complete_impl(prompt))
    }
    fn name(&self) -> &'static str {
        self.name
    }
}

/// Always fails; used when text generation is switched off.
pub struct DisabledGenerator;

impl TextGenerator for DisabledGenerator {
    fn complete<'a>(
        &'a self,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        Box::pin(async { bail!("text generation is disabled") })
    }
    fn name(&self) -> &'static str {
        "disabled"
    }
}

/// Returns the same completion for every prompt.
#[derive(Clone)]
pub struct MockGenerator {
    pub fixed: String,
}

impl MockGenerator {
    pub fn new(fixed: impl Into<String>) -> Self {
        Self {
            fixed: fixed.into(),
        }
    }
}

impl TextGenerator for MockGenerator {
    fn complete<'a>(
        &'a self,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>> {
        let out = self.fixed.clone();
        Box::pin(async move { Ok(out) })
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}
