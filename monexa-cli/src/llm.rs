use anyhow::{Context, Result, bail};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::config::LlmSection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAI,
}

impl Provider {
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "openai" | "openai-compatible" => Ok(Provider::OpenAI),
            "anthropic" => Ok(Provider::Anthropic),
            other => bail!("unknown llm provider '{other}' (expected openai or anthropic)"),
        }
    }

    fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Anthropic => "https://api.anthropic.com",
            Provider::OpenAI => "https://api.openai.com",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Anything that can answer a system prompt + conversation
pub trait ChatModel {
    fn complete(&self, system: &str, turns: &[ChatTurn]) -> impl Future<Output = Result<String>>;
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: Provider,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
}

impl LlmConfig {
    pub fn from_section(section: &LlmSection) -> Result<Self> {
        let provider = Provider::parse(&section.provider)?;
        let base_url = section
            .base_url
            .clone()
            .unwrap_or_else(|| provider.default_base_url().to_string());
        Ok(Self {
            provider,
            model: section.model.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
            temperature: section.temperature,
        })
    }
}

/// HTTP client for the configured provider; built once and passed around
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: LlmConfig,
    api_key: String,
    http: reqwest::Client,
}

impl LlmClient {
    pub fn new(config: LlmConfig, api_key: impl Into<String>) -> Self {
        Self {
            config,
            api_key: api_key.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Build from config, reading the key from `api_key_env`.
    /// `Ok(None)` when the variable is unset or empty.
    pub fn from_section(section: &LlmSection) -> Result<Option<Self>> {
        let config = LlmConfig::from_section(section)?;
        match std::env::var(&section.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(Some(Self::new(config, key.trim()))),
            _ => {
                tracing::debug!(var = %section.api_key_env, "no llm api key in environment");
                Ok(None)
            }
        }
    }

    pub fn config(&self) -> &LlmConfig {
        &self.config
    }

    async fn anthropic_complete(&self, system: &str, turns: &[ChatTurn]) -> Result<String> {
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            max_tokens: i32,
            system: &'a str,
            temperature: f32,
            messages: &'a [ChatTurn],
        }

        let body = Req {
            model: &self.config.model,
            max_tokens: 450,
            system,
            temperature: self.config.temperature,
            messages: turns,
        };

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);
        headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let resp = self
            .http
            .post(format!("{}/v1/messages", self.config.base_url))
            .headers(headers)
            .json(&body)
            .send()
            .await
            .context("anthropic request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("anthropic error: {status} {txt}");
        }

        let out: AnthropicResp = resp.json().await.context("parse anthropic response")?;
        Ok(out.text())
    }

    async fn openai_complete(&self, system: &str, turns: &[ChatTurn]) -> Result<String> {
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<&'a ChatTurn>,
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: MsgOut,
        }

        #[derive(Deserialize)]
        struct MsgOut {
            content: Option<String>,
        }

        let system_turn = ChatTurn {
            role: "system".to_string(),
            content: system.to_string(),
        };
        let mut messages = vec![&system_turn];
        messages.extend(turns);

        let body = Req {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
        };

        let resp = self
            .http
            .post(format!("{}/v1/chat/completions", self.config.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("openai request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("openai error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse openai response")?;
        let content = out
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok(content.trim().to_string())
    }
}

impl ChatModel for LlmClient {
    async fn complete(&self, system: &str, turns: &[ChatTurn]) -> Result<String> {
        tracing::debug!(
            provider = ?self.config.provider,
            model = %self.config.model,
            turns = turns.len(),
            "llm request"
        );
        match self.config.provider {
            Provider::Anthropic => self.anthropic_complete(system, turns).await,
            Provider::OpenAI => self.openai_complete(system, turns).await,
        }
    }
}

#[derive(Deserialize)]
struct AnthropicResp {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    t: String,
    text: Option<String>,
}

impl AnthropicResp {
    /// Text blocks joined in order; tool-use and other blocks are skipped
    fn text(self) -> String {
        let text: String = self
            .content
            .into_iter()
            .filter(|b| b.t == "text")
            .filter_map(|b| b.text)
            .collect();
        text.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_parse() {
        assert_eq!(Provider::parse("OpenAI").unwrap(), Provider::OpenAI);
        assert_eq!(Provider::parse("anthropic").unwrap(), Provider::Anthropic);
        assert!(Provider::parse("llama").is_err());
    }

    #[test]
    fn test_config_default_base_url_per_provider() {
        let mut section = LlmSection::default();
        assert_eq!(
            LlmConfig::from_section(&section).unwrap().base_url,
            "https://api.openai.com"
        );

        section.provider = "anthropic".to_string();
        assert_eq!(
            LlmConfig::from_section(&section).unwrap().base_url,
            "https://api.anthropic.com"
        );

        section.base_url = Some("http://localhost:8080/".to_string());
        assert_eq!(
            LlmConfig::from_section(&section).unwrap().base_url,
            "http://localhost:8080"
        );
    }

    #[test]
    fn test_client_absent_without_key() {
        let section = LlmSection {
            api_key_env: "MONEXA_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..LlmSection::default()
        };
        assert!(LlmClient::from_section(&section).unwrap().is_none());
    }

    #[test]
    fn test_anthropic_text_joins_text_blocks_only() {
        let out: AnthropicResp = serde_json::from_str(
            r#"{"content":[
                {"type":"text","text":" Spend less "},
                {"type":"tool_use","id":"t1","name":"x","input":{}},
                {"type":"text"},
                {"type":"text","text":"on coffee. "}
            ]}"#,
        )
        .unwrap();
        assert_eq!(out.text(), "Spend less on coffee.");
    }
}
