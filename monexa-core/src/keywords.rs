//! Keyword lists driving the chat command interpreter.
//!
//! Order matters for the two fallback lists (`expense_categories`,
//! `income_sources`): when no preposition names a category, the first
//! keyword in list order that appears in the message wins.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KeywordSet {
    /// Verbs that mark an expense command
    pub action_verbs: Vec<String>,
    /// Built-in expense categories, also used as expense triggers
    pub expense_categories: Vec<String>,
    /// Words that mark an income command
    pub income_triggers: Vec<String>,
    /// Fallback income sources
    pub income_sources: Vec<String>,
    pub budget_triggers: Vec<String>,
    pub category_triggers: Vec<String>,
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self {
            action_verbs: words(&["add", "spent", "bought", "paid"]),
            expense_categories: words(&[
                "food",
                "groceries",
                "transport",
                "rent",
                "bills",
                "shopping",
                "entertainment",
                "health",
                "education",
                "travel",
                "utilities",
                "fuel",
            ]),
            income_triggers: words(&[
                "earned",
                "received",
                "got paid",
                "income",
                "salary",
                "freelance",
                "bonus",
                "investment",
                "dividend",
                "refund",
                "gift",
            ]),
            income_sources: words(&[
                "salary",
                "freelance",
                "bonus",
                "investment",
                "dividend",
                "refund",
                "gift",
            ]),
            budget_triggers: words(&["budget", "limit"]),
            category_triggers: words(&["add category", "new category", "create category"]),
        }
    }
}

impl KeywordSet {
    /// Lower-case every keyword so matching against a lower-cased message works
    pub fn normalized(mut self) -> Self {
        for list in [
            &mut self.action_verbs,
            &mut self.expense_categories,
            &mut self.income_triggers,
            &mut self.income_sources,
            &mut self.budget_triggers,
            &mut self.category_triggers,
        ] {
            for w in list.iter_mut() {
                *w = w.trim().to_lowercase();
            }
            list.retain(|w| !w.is_empty());
        }
        self
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lists() {
        let k = KeywordSet::default();
        assert_eq!(k.action_verbs, vec!["add", "spent", "bought", "paid"]);
        assert_eq!(k.expense_categories[0], "food");
        assert!(k.income_triggers.contains(&"got paid".to_string()));
        assert_eq!(k.income_sources.len(), 7);
    }

    #[test]
    fn test_normalized_lowercases_and_drops_blanks() {
        let k = KeywordSet {
            expense_categories: vec!["Coffee".into(), "  ".into(), " PETS ".into()],
            ..KeywordSet::default()
        }
        .normalized();
        assert_eq!(k.expense_categories, vec!["coffee", "pets"]);
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let k: KeywordSet = serde_json::from_str(r#"{"budget_triggers": ["cap"]}"#).unwrap();
        assert_eq!(k.budget_triggers, vec!["cap"]);
        assert_eq!(k.action_verbs, KeywordSet::default().action_verbs);
    }
}
