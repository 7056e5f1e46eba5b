//! monexa-core: Core types for the Monexa finance assistant

pub mod command;
pub mod keywords;
pub mod ledger;

pub use command::{ExtractedCommand, Intent, Notice};
pub use keywords::KeywordSet;
pub use ledger::{
    CategoryEntry, CategoryTotal, FinancialSummary, Ledger, Transaction, TransactionKind,
    TransactionUpdate,
};
