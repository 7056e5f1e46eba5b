//! Short model-written insights about the ledger, with fixed fallbacks.

use monexa_core::Ledger;

use crate::llm::{ChatModel, ChatTurn};

const MAX_INSIGHTS: usize = 3;

const INSIGHTS_SYSTEM: &str =
    "You are a helpful financial assistant. Provide brief, supportive insights.";

const STARTER_TIPS: [&str; 3] = [
    "Start tracking your income and expenses to get personalized insights!",
    "Add your first transaction to see spending patterns.",
    "Monexa will analyze your data and provide helpful tips.",
];

const FALLBACK_TIPS: [&str; 3] = [
    "Keep tracking your spending to build better habits!",
    "Review your expenses regularly to stay on budget.",
    "Consider setting a monthly budget goal.",
];

pub async fn generate_insights<M: ChatModel>(model: Option<&M>, ledger: &Ledger) -> Vec<String> {
    if ledger.transactions.is_empty() {
        return tips(&STARTER_TIPS);
    }
    let Some(model) = model else {
        tracing::warn!("no assistant model configured; using fallback insights");
        return tips(&FALLBACK_TIPS);
    };

    let s = ledger.summary();
    let prompt = format!(
        "Based on this financial data, provide 3 brief, actionable insights (each 10-15 words):

Total Income: {:.2}
Total Expenses: {:.2}
Top Spending Category: {}
Number of Transactions: {}

Format as a simple list, no numbering.",
        s.total_income,
        s.total_expense,
        s.top_category().unwrap_or("None"),
        s.transaction_count,
    );

    match model.complete(INSIGHTS_SYSTEM, &[ChatTurn::user(prompt)]).await {
        Ok(text) => {
            let lines = parse_insights(&text);
            if lines.is_empty() {
                tips(&FALLBACK_TIPS)
            } else {
                lines
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "insights generation failed; using fallback insights");
            tips(&FALLBACK_TIPS)
        }
    }
}

/// First three non-empty lines, bullet markers stripped
fn parse_insights(text: &str) -> Vec<String> {
    text.lines()
        .map(|l| l.trim().trim_start_matches(['-', '*', '•']).trim())
        .filter(|l| !l.is_empty())
        .take(MAX_INSIGHTS)
        .map(str::to_string)
        .collect()
}

fn tips(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}
