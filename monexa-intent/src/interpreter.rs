//! Deterministic chat command interpreter.
//!
//! Rules are tried in priority order. The first rule whose trigger matches
//! owns the message: if its extraction fails the result is `Intent::None`
//! and later rules are not consulted. No LLM involved.

use anyhow::Result;
use monexa_core::{ExtractedCommand, Intent, KeywordSet, Notice};

use crate::extract::{Extractor, capitalize_first, contains_any, first_keyword_in};

const EXPENSE_WORD: &str = "expense";
const DEFAULT_INCOME_SOURCE: &str = "Other";

/// One utterance prepared for matching
struct Message<'a> {
    raw: &'a str,
    lower: String,
    known_categories: Vec<&'a str>,
}

type Trigger = fn(&Interpreter, &Message<'_>) -> bool;
type Extract = fn(&Interpreter, &Message<'_>) -> ExtractedCommand;

struct Rule {
    intent: Intent,
    trigger: Trigger,
    extract: Extract,
}

/// Priority order: first matching trigger wins
const RULES: [Rule; 4] = [
    Rule {
        intent: Intent::AddExpense,
        trigger: expense_trigger,
        extract: extract_expense,
    },
    Rule {
        intent: Intent::AddIncome,
        trigger: income_trigger,
        extract: extract_income,
    },
    Rule {
        intent: Intent::SetBudget,
        trigger: budget_trigger,
        extract: extract_budget,
    },
    Rule {
        intent: Intent::CreateCategory,
        trigger: category_trigger,
        extract: extract_category,
    },
];

#[derive(Debug, Clone)]
pub struct Interpreter {
    keywords: KeywordSet,
    extractor: Extractor,
}

impl Interpreter {
    /// Interpreter with the built-in keyword lists
    pub fn new() -> Result<Self> {
        Self::with_keywords(KeywordSet::default())
    }

    pub fn with_keywords(keywords: KeywordSet) -> Result<Self> {
        Ok(Self {
            keywords: keywords.normalized(),
            extractor: Extractor::new()?,
        })
    }

    /// Classify one utterance against the user's category names.
    ///
    /// Pure: same input, same output. `Intent::None` means "forward to the
    /// assistant model", possibly with a notice for the user.
    pub fn classify<S: AsRef<str>>(
        &self,
        utterance: &str,
        known_categories: &[S],
    ) -> ExtractedCommand {
        let msg = Message {
            raw: utterance,
            lower: utterance.to_lowercase(),
            known_categories: known_categories.iter().map(|c| c.as_ref()).collect(),
        };

        match RULES.iter().find(|rule| (rule.trigger)(self, &msg)) {
            Some(rule) => {
                let cmd = (rule.extract)(self, &msg);
                tracing::debug!(
                    rule = ?rule.intent,
                    result = ?cmd.intent,
                    "command rule matched"
                );
                cmd
            }
            None => {
                tracing::debug!("no command rule matched");
                ExtractedCommand::none()
            }
        }
    }
}

#[cfg(test)]
impl Interpreter {
    /// Rule order, highest priority first
    fn rule_order() -> [Intent; 4] {
        RULES.map(|r| r.intent)
    }

    /// Intent of the rule whose trigger fires, whether or not extraction would succeed
    fn matching_rule(&self, utterance: &str) -> Option<Intent> {
        let msg = Message {
            raw: utterance,
            lower: utterance.to_lowercase(),
            known_categories: Vec::new(),
        };
        RULES
            .iter()
            .find(|rule| (rule.trigger)(self, &msg))
            .map(|rule| rule.intent)
    }
}

// --- triggers ---

fn expense_trigger(it: &Interpreter, m: &Message<'_>) -> bool {
    contains_any(&m.lower, &it.keywords.action_verbs)
        && (m.lower.contains(EXPENSE_WORD) || contains_any(&m.lower, &it.keywords.expense_categories))
}

fn income_trigger(it: &Interpreter, m: &Message<'_>) -> bool {
    contains_any(&m.lower, &it.keywords.income_triggers) && !m.lower.contains(EXPENSE_WORD)
}

fn budget_trigger(it: &Interpreter, m: &Message<'_>) -> bool {
    contains_any(&m.lower, &it.keywords.budget_triggers)
}

fn category_trigger(it: &Interpreter, m: &Message<'_>) -> bool {
    contains_any(&m.lower, &it.keywords.category_triggers)
}

// --- extractors ---

fn extract_expense(it: &Interpreter, m: &Message<'_>) -> ExtractedCommand {
    let Some(amount) = it.extractor.amount(m.raw) else {
        return ExtractedCommand::none();
    };
    let category = it.extractor.expense_category(m.raw).or_else(|| {
        first_keyword_in(&m.lower, &it.keywords.expense_categories).map(capitalize_first)
    });
    match category {
        Some(c) => ExtractedCommand::add_expense(amount, c),
        None => ExtractedCommand::none(),
    }
}

fn extract_income(it: &Interpreter, m: &Message<'_>) -> ExtractedCommand {
    let Some(amount) = it.extractor.amount(m.raw) else {
        return ExtractedCommand::none();
    };
    let source = it
        .extractor
        .income_source(m.raw)
        .or_else(|| first_keyword_in(&m.lower, &it.keywords.income_sources).map(capitalize_first))
        .unwrap_or_else(|| DEFAULT_INCOME_SOURCE.to_string());
    ExtractedCommand::add_income(amount, source)
}

fn extract_budget(it: &Interpreter, m: &Message<'_>) -> ExtractedCommand {
    match it.extractor.amount(m.raw) {
        Some(amount) => ExtractedCommand::set_budget(amount),
        None => ExtractedCommand::none(),
    }
}

fn extract_category(it: &Interpreter, m: &Message<'_>) -> ExtractedCommand {
    let Some(name) = it.extractor.category_name(m.raw) else {
        return ExtractedCommand::none();
    };
    if m.known_categories
        .iter()
        .any(|known| known.trim().eq_ignore_ascii_case(&name))
    {
        return ExtractedCommand::none_with_notice(Notice::CategoryExists(name));
    }
    ExtractedCommand::create_category(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interp() -> Interpreter {
        Interpreter::new().unwrap()
    }

    fn defaults() -> Vec<String> {
        ["Food", "Transport", "Shopping", "Bills", "Salary", "Entertainment"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    #[test]
    fn test_rule_order() {
        assert_eq!(
            Interpreter::rule_order(),
            [
                Intent::AddExpense,
                Intent::AddIncome,
                Intent::SetBudget,
                Intent::CreateCategory
            ]
        );
    }

    #[test]
    fn test_add_expense_with_preposition() {
        let cmd = interp().classify("add $50 expense for food", &defaults());
        assert_eq!(cmd, ExtractedCommand::add_expense(50.0, "Food"));
    }

    #[test]
    fn test_expense_falls_back_to_keyword_list_order() {
        // no preposition; "travel" appears first in the message but "groceries" first in the list
        let cmd = interp().classify("bought travel snacks and groceries 23.50", &defaults());
        assert_eq!(cmd, ExtractedCommand::add_expense(23.5, "Groceries"));
    }

    #[test]
    fn test_expense_with_excluded_preposition_word_uses_keyword() {
        let cmd = interp().classify("paid 40 for expense rent", &defaults());
        assert_eq!(cmd, ExtractedCommand::add_expense(40.0, "Rent"));
    }

    #[test]
    fn test_expense_category_from_later_preposition() {
        let none: &[&str] = &[];
        assert_eq!(
            interp().classify("add expense for 20 on coffee", none),
            ExtractedCommand::add_expense(20.0, "Coffee")
        );
    }

    #[test]
    fn test_non_ascii_digits_do_not_hide_amount() {
        let none: &[&str] = &[];
        assert_eq!(
            interp().classify("add ٥٠ expense for food then 20", none),
            ExtractedCommand::add_expense(20.0, "Food")
        );
    }

    #[test]
    fn test_priority_expense_over_income() {
        let it = interp();
        assert_eq!(
            it.matching_rule("paid $200 expense for salary advance"),
            Some(Intent::AddExpense)
        );
        assert_eq!(it.matching_rule("I got paid 3200 salary"), Some(Intent::AddIncome));
        assert_eq!(it.matching_rule("hello there"), None);
    }

    #[test]
    fn test_expense_without_amount_is_none() {
        let cmd = interp().classify("add expense for food", &defaults());
        assert_eq!(cmd.intent, Intent::None);
    }

    #[test]
    fn test_expense_trigger_owns_message_even_when_extraction_fails() {
        // "add" + "food" selects the expense rule; no amount, so no command,
        // and the category rule is never reached
        let it = interp();
        assert_eq!(it.matching_rule("add category Food"), Some(Intent::AddExpense));
        assert_eq!(it.classify("add category Food", &defaults()).intent, Intent::None);
    }

    #[test]
    fn test_add_income() {
        let cmd = interp().classify("earned $1000 from freelance", &defaults());
        assert_eq!(cmd, ExtractedCommand::add_income(1000.0, "Freelance"));
    }

    #[test]
    fn test_income_source_keyword_then_default() {
        let it = interp();
        assert_eq!(
            it.classify("got a 250 bonus today", &defaults()),
            ExtractedCommand::add_income(250.0, "Bonus")
        );
        assert_eq!(
            it.classify("received 75", &defaults()),
            ExtractedCommand::add_income(75.0, "Other")
        );
    }

    #[test]
    fn test_income_without_amount_is_none() {
        assert_eq!(interp().classify("I got paid today", &defaults()).intent, Intent::None);
    }

    #[test]
    fn test_set_budget() {
        let it = interp();
        assert_eq!(
            it.classify("set budget to $2000", &defaults()),
            ExtractedCommand::set_budget(2000.0)
        );
        assert_eq!(
            it.classify("my monthly limit is 1500.00", &defaults()),
            ExtractedCommand::set_budget(1500.0)
        );
        assert_eq!(it.classify("what is my budget?", &defaults()).intent, Intent::None);
    }

    #[test]
    fn test_create_category() {
        let cmd = interp().classify("new category pets", &defaults());
        assert_eq!(cmd, ExtractedCommand::create_category("Pets"));
    }

    #[test]
    fn test_create_existing_category_gives_notice() {
        let cmd = interp().classify("create category transport", &defaults());
        assert_eq!(cmd.intent, Intent::None);
        assert_eq!(cmd.notice, Some(Notice::CategoryExists("Transport".into())));
    }

    #[test]
    fn test_plain_question_is_none() {
        let cmd = interp().classify("How am I doing this month?", &defaults());
        assert_eq!(cmd, ExtractedCommand::none());
    }

    #[test]
    fn test_custom_keywords() {
        let keywords = KeywordSet {
            expense_categories: vec!["Coffee".into()],
            ..KeywordSet::default()
        };
        let it = Interpreter::with_keywords(keywords).unwrap();
        assert_eq!(
            it.classify("bought coffee 4.50", &defaults()),
            ExtractedCommand::add_expense(4.5, "Coffee")
        );
        assert_eq!(it.classify("bought food 4.50", &defaults()).intent, Intent::None);
    }
}
