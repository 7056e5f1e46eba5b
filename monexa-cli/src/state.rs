//! Local state under ~/.monexa: the ledger and the chat history.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use monexa_core::Ledger;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::llm::ChatTurn;

/// `$MONEXA_HOME`, else `$HOME/.monexa`
pub fn monexa_home() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("MONEXA_HOME") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".monexa"))
}

#[derive(Debug, Clone)]
pub struct Store {
    home: PathBuf,
}

impl Store {
    pub fn open(home: impl Into<PathBuf>) -> Result<Self> {
        let home = home.into();
        fs::create_dir_all(&home).with_context(|| format!("create {}", home.display()))?;
        Ok(Self { home })
    }

    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn ledger_path(&self) -> PathBuf {
        self.home.join("ledger.json")
    }

    /// Load the ledger, or a freshly seeded one if none was saved yet
    pub fn load_ledger(&self) -> Result<Ledger> {
        let p = self.ledger_path();
        if !p.exists() {
            return Ok(Ledger::with_default_categories());
        }
        let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
        serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))
    }

    pub fn save_ledger(&self, ledger: &Ledger) -> Result<()> {
        let p = self.ledger_path();
        let json = serde_json::to_string_pretty(ledger)?;
        fs::write(&p, json).with_context(|| format!("write {}", p.display()))?;
        Ok(())
    }

    pub fn chat_log(&self) -> ChatLog {
        ChatLog {
            path: self.home.join("chat_history.jsonl"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEntry {
    pub role: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Append-only chat history, one JSON object per line
#[derive(Debug, Clone)]
pub struct ChatLog {
    path: PathBuf,
}

impl ChatLog {
    pub fn append_user(&self, text: &str) -> Result<()> {
        self.append("user", text)
    }

    pub fn append_assistant(&self, text: &str) -> Result<()> {
        self.append("assistant", text)
    }

    fn append(&self, role: &str, text: &str) -> Result<()> {
        let entry = ChatEntry {
            role: role.to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
        };
        let mut f = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("open {}", self.path.display()))?;
        writeln!(f, "{}", serde_json::to_string(&entry)?)?;
        Ok(())
    }

    /// All entries, oldest first
    pub fn entries(&self) -> Result<Vec<ChatEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let s = fs::read_to_string(&self.path)
            .with_context(|| format!("read {}", self.path.display()))?;
        s.lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).context("parse chat history line"))
            .collect()
    }

    /// Up to the last `n` entries as model turns, kept as whole
    /// user/assistant exchanges. A user entry with no reply after it (the
    /// turn failed) is dropped, so the window always starts with a user turn.
    pub fn recent_turns(&self, n: usize) -> Result<Vec<ChatTurn>> {
        let mut pairs = Vec::new();
        let mut it = self.entries()?.into_iter().peekable();
        while let Some(e) = it.next() {
            if e.role != "user" {
                continue;
            }
            if let Some(reply) = it.next_if(|next| next.role == "assistant") {
                pairs.push((e, reply));
            }
        }
        let skip = pairs.len().saturating_sub(n / 2);
        Ok(pairs
            .into_iter()
            .skip(skip)
            .flat_map(|(q, a)| [q, a])
            .map(|e| ChatTurn {
                role: e.role,
                content: e.text,
            })
            .collect())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("remove {}", self.path.display()))?;
        }
        Ok(())
    }
}
