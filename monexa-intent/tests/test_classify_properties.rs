use monexa_core::{ExtractedCommand, Intent, Ledger, Notice};
use monexa_intent::Interpreter;

fn known() -> Vec<String> {
    Ledger::with_default_categories().category_names()
}

/// Commands embedded in longer chatter still classify the same way.
#[test]
fn test_commands_inside_longer_messages() {
    let it = Interpreter::new().unwrap();
    let k = known();

    assert_eq!(
        it.classify("hey, please add $50 expense for food from lunch", &k),
        ExtractedCommand::add_expense(50.0, "Food")
    );
    assert_eq!(
        it.classify("great news: I earned $1000 from freelance work", &k),
        ExtractedCommand::add_income(1000.0, "Freelance")
    );
    assert_eq!(
        it.classify("Could you set budget to $2000 please", &k),
        ExtractedCommand::set_budget(2000.0)
    );
}

#[test]
fn test_create_category_new_and_existing() {
    let it = Interpreter::new().unwrap();
    let mut k = known();

    let cmd = it.classify("add category Coffee", &k);
    assert_eq!(cmd, ExtractedCommand::create_category("Coffee"));

    k.push("Coffee".to_string());
    let cmd = it.classify("add category Coffee", &k);
    assert_eq!(cmd.intent, Intent::None);
    assert_eq!(cmd.notice, Some(Notice::CategoryExists("Coffee".to_string())));
}

/// "paid" and "salary" trigger both rules; the literal "expense" keeps it an expense.
#[test]
fn test_expense_wins_over_income() {
    let it = Interpreter::new().unwrap();
    let msg = "paid $200 expense for salary advance";

    assert_eq!(
        it.classify(msg, &known()),
        ExtractedCommand::add_expense(200.0, "Salary")
    );
}

/// Once the expense rule owns a message, a failed extraction never falls through to income.
#[test]
fn test_expense_rule_failure_does_not_fall_through() {
    let it = Interpreter::new().unwrap();
    let cmd = it.classify("paid $100 salary expense", &known());
    assert_eq!(cmd, ExtractedCommand::none());
}

#[test]
fn test_income_keyword_without_expense_word_is_income() {
    let it = Interpreter::new().unwrap();
    // "paid" alone has no expense category, so the income rule gets it
    assert_eq!(
        it.classify("I got paid 3200 salary", &known()),
        ExtractedCommand::add_income(3200.0, "Salary")
    );
}

#[test]
fn test_classify_is_idempotent() {
    let it = Interpreter::new().unwrap();
    let k = known();
    for msg in [
        "add $50 expense for food",
        "earned $1000 from freelance",
        "set budget to $2000",
        "add category Coffee",
        "what did I spend on rent?",
        "I bought something",
    ] {
        assert_eq!(it.classify(msg, &k), it.classify(msg, &k), "not idempotent: {msg}");
    }
}

#[test]
fn test_unresolvable_expense_is_none() {
    let it = Interpreter::new().unwrap();
    assert_eq!(it.classify("I bought something", &known()), ExtractedCommand::none());
    assert_eq!(it.classify("I bought something for 30", &known()), ExtractedCommand::none());
}

/// Excluded preposition words are skipped, not fatal.
#[test]
fn test_expense_category_after_excluded_word() {
    let it = Interpreter::new().unwrap();
    assert_eq!(
        it.classify("add expense for 20 on coffee", &known()),
        ExtractedCommand::add_expense(20.0, "Coffee")
    );
}

#[test]
fn test_non_ascii_digits_then_ascii_amount() {
    let it = Interpreter::new().unwrap();
    assert_eq!(
        it.classify("add ٥٠ expense for food then 20", &known()),
        ExtractedCommand::add_expense(20.0, "Food")
    );
}

#[test]
fn test_empty_known_categories() {
    let it = Interpreter::new().unwrap();
    let none: &[&str] = &[];
    assert_eq!(
        it.classify("create category Food", none),
        ExtractedCommand::create_category("Food")
    );
}
