//! monexa-intent: chat command interpreter (keyword triggers + regex extraction)

pub mod extract;
pub mod interpreter;

pub use extract::{Extractor, capitalize_first, contains_any, first_keyword_in};
pub use interpreter::Interpreter;
