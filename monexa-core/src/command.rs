//! Command types produced by the chat interpreter

use serde::{Deserialize, Serialize};
use std::fmt;

/// The financial action a chat message asks for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Intent {
    #[serde(rename = "add-expense")]
    AddExpense,
    #[serde(rename = "add-income")]
    AddIncome,
    #[serde(rename = "set-budget")]
    SetBudget,
    #[serde(rename = "create-category")]
    CreateCategory,
    /// No command recognized; the message goes to the assistant model
    #[serde(rename = "none")]
    None,
}

impl Intent {
    pub fn is_command(&self) -> bool {
        !matches!(self, Intent::None)
    }
}

/// Informational message attached to an unrecognized command
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Notice {
    #[serde(rename = "category-exists")]
    CategoryExists(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::CategoryExists(name) => write!(f, "Category '{name}' already exists."),
        }
    }
}

/// Outcome of classifying one utterance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractedCommand {
    pub intent: Intent,
    /// Amount in the ledger currency, never negative
    pub amount: Option<f64>,
    /// Expense category, income source, or new category name
    pub category_or_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<Notice>,
}

impl ExtractedCommand {
    /// No command recognized
    pub fn none() -> Self {
        Self {
            intent: Intent::None,
            amount: None,
            category_or_source: None,
            notice: None,
        }
    }

    pub fn none_with_notice(notice: Notice) -> Self {
        Self {
            notice: Some(notice),
            ..Self::none()
        }
    }

    pub fn add_expense(amount: f64, category: impl Into<String>) -> Self {
        Self {
            intent: Intent::AddExpense,
            amount: Some(amount),
            category_or_source: Some(category.into()),
            notice: None,
        }
    }

    pub fn add_income(amount: f64, source: impl Into<String>) -> Self {
        Self {
            intent: Intent::AddIncome,
            amount: Some(amount),
            category_or_source: Some(source.into()),
            notice: None,
        }
    }

    pub fn set_budget(amount: f64) -> Self {
        Self {
            intent: Intent::SetBudget,
            amount: Some(amount),
            category_or_source: None,
            notice: None,
        }
    }

    pub fn create_category(name: impl Into<String>) -> Self {
        Self {
            intent: Intent::CreateCategory,
            amount: None,
            category_or_source: Some(name.into()),
            notice: None,
        }
    }
}
