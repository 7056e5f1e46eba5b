//! Chat turn handling: run the command interpreter, apply recognized commands
//! to the ledger, and fall back to the assistant model for everything else.

use anyhow::{Context, Result, bail};
use chrono::Utc;
use monexa_core::{ExtractedCommand, Intent, Ledger, TransactionKind};
use monexa_intent::Interpreter;

use crate::config::ProfileSection;
use crate::llm::{ChatModel, ChatTurn};

const NEW_CATEGORY_ICON: &str = "pricetag";

const ENCOURAGE_PROMPT: &str = "You are Monexa, a calm and supportive personal finance assistant. \
The user just recorded the action below. Reply with exactly one short, supportive sentence. \
Do not repeat the numbers and do not give investment, legal or tax advice.";

/// What the assistant answered, and which command (if any) produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub command: ExtractedCommand,
}

pub struct ChatHandler<'a, M> {
    interpreter: &'a Interpreter,
    model: Option<&'a M>,
    profile: &'a ProfileSection,
    encouragement: bool,
}

impl<'a, M: ChatModel> ChatHandler<'a, M> {
    pub fn new(
        interpreter: &'a Interpreter,
        model: Option<&'a M>,
        profile: &'a ProfileSection,
        encouragement: bool,
    ) -> Self {
        Self {
            interpreter,
            model,
            profile,
            encouragement,
        }
    }

    /// Answer one message. `history` is prior conversation, oldest first,
    /// and is only sent when the message goes to the model.
    pub async fn respond(
        &self,
        ledger: &mut Ledger,
        history: &[ChatTurn],
        message: &str,
    ) -> Result<Reply> {
        let command = self.interpreter.classify(message, &ledger.category_names());

        if command.intent.is_command() {
            let confirmation = apply_command(ledger, &command, message)?;
            let text = self.with_encouragement(confirmation).await;
            return Ok(Reply { text, command });
        }

        if let Some(notice) = &command.notice {
            return Ok(Reply {
                text: notice.to_string(),
                command,
            });
        }

        let Some(model) = self.model else {
            bail!("no assistant model configured; set the API key variable named in [llm] api_key_env");
        };
        let system = financial_context(self.profile, ledger);
        let mut turns = history.to_vec();
        turns.push(ChatTurn::user(message));
        let text = model
            .complete(&system, &turns)
            .await
            .context("failed to process chat request")?;
        Ok(Reply { text, command })
    }

    async fn with_encouragement(&self, confirmation: String) -> String {
        let Some(model) = self.model.filter(|_| self.encouragement) else {
            return confirmation;
        };
        match model
            .complete(ENCOURAGE_PROMPT, &[ChatTurn::user(confirmation.clone())])
            .await
        {
            Ok(extra) if !extra.trim().is_empty() => format!("{confirmation} {}", extra.trim()),
            Ok(_) => confirmation,
            Err(e) => {
                tracing::warn!(error = %e, "encouragement request failed; sending bare confirmation");
                confirmation
            }
        }
    }
}

/// Apply a recognized command and return its confirmation line
pub fn apply_command(ledger: &mut Ledger, command: &ExtractedCommand, message: &str) -> Result<String> {
    let today = Utc::now().date_naive();
    let amount = command.amount.unwrap_or_default();
    let name = command.category_or_source.clone().unwrap_or_default();

    match command.intent {
        Intent::AddExpense => {
            ledger.add_transaction(
                TransactionKind::Expense,
                amount,
                name.as_str(),
                Some(message.to_string()),
                today,
            )?;
            Ok(format!("✅ Added ${amount:.2} expense for {name}."))
        }
        Intent::AddIncome => {
            ledger.add_transaction(
                TransactionKind::Income,
                amount,
                name.as_str(),
                Some(message.to_string()),
                today,
            )?;
            Ok(format!("✅ Added ${amount:.2} income from {name}."))
        }
        Intent::SetBudget => {
            ledger.set_monthly_budget(amount)?;
            Ok(format!("✅ Monthly budget set to ${amount:.2}."))
        }
        Intent::CreateCategory => {
            ledger.add_category(&name, NEW_CATEGORY_ICON)?;
            Ok(format!("✅ Created category {name}."))
        }
        Intent::None => bail!("no command to apply"),
    }
}

/// System prompt carrying the user's actual numbers
pub fn financial_context(profile: &ProfileSection, ledger: &Ledger) -> String {
    let s = ledger.summary();
    let budget = ledger
        .monthly_budget
        .map(|b| format!("{b:.2}"))
        .unwrap_or_else(|| "not set".to_string());
    let top = if s.top_spending_categories.is_empty() {
        "none yet".to_string()
    } else {
        s.top_spending_categories
            .iter()
            .map(|c| format!("{} ({:.2})", c.name, c.amount))
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "You are Monexa, an AI personal finance assistant. You help users understand their spending patterns and make better money decisions.

User Profile:
- Name: {name}
- Currency: {currency}
- Current Balance: {balance:.2}
- Total Income: {income:.2}
- Total Expenses: {expense:.2}
- Monthly Budget: {budget}
- Top Spending Categories: {top}
- Number of Transactions: {count}

Important Guidelines:
1. Be calm, supportive, and helpful
2. Use ONLY the user's actual data - never make up numbers
3. If you don't have enough data, ask clarifying questions
4. Do not provide investment advice, legal advice, or tax advice
5. Focus on spending patterns, budgeting tips, and financial awareness
6. Keep responses concise and actionable

Answer the user's question based on their actual financial data.",
        name = profile.full_name,
        currency = profile.currency,
        balance = s.balance,
        income = s.total_income,
        expense = s.total_expense,
        count = s.transaction_count,
    )
}
