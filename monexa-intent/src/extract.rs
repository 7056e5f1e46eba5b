//! Pure extraction helpers: amounts, category/source tokens, new category names.
//!
//! Every helper looks at the first regex match only. Nothing here knows about
//! rule priority; that lives in the interpreter.

use anyhow::Result;
use regex::Regex;

/// Token that never counts as an expense category
const EXPENSE_WORD: &str = "expense";

/// Compiled patterns shared by all rules
#[derive(Debug, Clone)]
pub struct Extractor {
    amount: Regex,
    expense_preposition: Regex,
    income_preposition: Regex,
    category_name: Regex,
}

impl Extractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            // optional $, ASCII digits, optional exactly-two-digit fraction
            amount: Regex::new(r"\$?(?P<amount>[0-9]+(?:\.[0-9]{2})?)")?,
            expense_preposition: Regex::new(r"(?i)\b(?:for|in|on)\s+(?P<word>\w+)")?,
            income_preposition: Regex::new(r"(?i)\b(?:from|in|as)\s+(?P<word>\w+)")?,
            category_name: Regex::new(r"(?i)category\s+(?P<word>\w+)")?,
        })
    }

    /// First amount in the text. "$1,200" yields 1.0: separators are not understood.
    pub fn amount(&self, text: &str) -> Option<f64> {
        let caps = self.amount.captures(text)?;
        caps["amount"].parse().ok()
    }

    /// First word after "for|in|on" that is neither "expense" nor all
    /// ASCII digits, capitalized
    pub fn expense_category(&self, text: &str) -> Option<String> {
        self.expense_preposition
            .captures_iter(text)
            .filter_map(|caps| caps.name("word"))
            .map(|m| m.as_str())
            .find(|word| {
                !word.eq_ignore_ascii_case(EXPENSE_WORD) && !word.bytes().all(|b| b.is_ascii_digit())
            })
            .map(capitalize_first)
    }

    /// Word after the first "from|in|as", capitalized
    pub fn income_source(&self, text: &str) -> Option<String> {
        let caps = self.income_preposition.captures(text)?;
        Some(capitalize_first(&caps["word"]))
    }

    /// Word after "category", capitalized
    pub fn category_name(&self, text: &str) -> Option<String> {
        let caps = self.category_name.captures(text)?;
        Some(capitalize_first(&caps["word"]))
    }
}

/// Uppercase the first character, keep the rest as written
pub fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// True if any keyword occurs in the (already lower-cased) text
pub fn contains_any(lower: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| lower.contains(k.as_str()))
}

/// First keyword, in list order, that occurs in the lower-cased text
pub fn first_keyword_in<'k>(lower: &str, keywords: &'k [String]) -> Option<&'k str> {
    keywords
        .iter()
        .map(String::as_str)
        .find(|k| lower.contains(k))
}
