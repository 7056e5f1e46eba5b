use anyhow::{Context, Result};
use monexa_core::KeywordSet;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub profile: ProfileSection,
    pub llm: LlmSection,
    pub chat: ChatSection,
    /// Overrides for the command interpreter's keyword lists
    pub keywords: KeywordSet,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProfileSection {
    pub full_name: String,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LlmSection {
    /// "openai" (any OpenAI-compatible endpoint) or "anthropic"
    pub provider: String,
    pub model: String,
    /// Defaults to the provider's public endpoint
    pub base_url: Option<String>,
    pub temperature: f32,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChatSection {
    /// Append one model-written supportive sentence to command confirmations
    pub encouragement: bool,
    pub max_turns_context: usize,
}

impl Default for ProfileSection {
    fn default() -> Self {
        Self {
            full_name: "Monexa user".to_string(),
            currency: "USD".to_string(),
        }
    }
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            temperature: 0.4,
            api_key_env: "MONEXA_LLM_KEY".to_string(),
        }
    }
}

impl Default for ChatSection {
    fn default() -> Self {
        Self {
            encouragement: true,
            max_turns_context: 12,
        }
    }
}

pub fn config_path(home: &Path) -> PathBuf {
    home.join("config.toml")
}

pub fn load_config(home: &Path) -> Result<Config> {
    let p = config_path(home);
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    toml::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_config(home: &Path, cfg: &Config) -> Result<()> {
    let p = config_path(home);
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config(home: &Path) -> Result<()> {
    let p = config_path(home);
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(home, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(dir.path()).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.llm.api_key_env, "MONEXA_LLM_KEY");
        assert!(cfg.chat.encouragement);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            config_path(dir.path()),
            r#"
[profile]
full_name = "Ada"

[llm]
provider = "anthropic"

[keywords]
expense_categories = ["coffee", "pets"]
"#,
        )
        .unwrap();

        let cfg = load_config(dir.path()).unwrap();
        assert_eq!(cfg.profile.full_name, "Ada");
        assert_eq!(cfg.profile.currency, "USD");
        assert_eq!(cfg.llm.provider, "anthropic");
        assert_eq!(cfg.llm.model, "gpt-4o-mini");
        assert_eq!(cfg.keywords.expense_categories, vec!["coffee", "pets"]);
        assert_eq!(cfg.keywords.action_verbs, KeywordSet::default().action_verbs);
        assert_eq!(cfg.chat.max_turns_context, 12);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.chat.encouragement = false;
        cfg.llm.base_url = Some("http://localhost:11434".to_string());
        save_config(dir.path(), &cfg).unwrap();
        assert_eq!(load_config(dir.path()).unwrap(), cfg);
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(config_path(dir.path()), "[llm\nprovider = ").unwrap();
        assert!(load_config(dir.path()).is_err());
    }
}
