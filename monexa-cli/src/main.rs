use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use chrono::NaiveDate;
use monexa_core::{Ledger, TransactionKind, TransactionUpdate};
use monexa_intent::Interpreter;
use std::io::{self, BufRead, Write};

mod chat;
mod config;
mod insights;
mod llm;
mod state;

use chat::ChatHandler;
use config::Config;
use llm::LlmClient;
use state::Store;

#[derive(Parser, Debug)]
#[command(
    name = "monexa",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("MONEXA_BUILD_SHA"), ")"),
    about = "Monexa personal finance assistant"
)]
struct Cli {
    /// Log at info level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show how a message would be interpreted (no model call, no changes)
    Classify { message: String },

    /// Interactive chat; commands like "add $12 expense for food" update the ledger
    Chat,

    /// Send a single chat message
    Ask { message: String },

    /// Show or clear the chat history
    History {
        #[arg(long)]
        clear: bool,
    },

    /// Transactions
    Tx {
        #[command(subcommand)]
        command: TxCommand,
    },

    /// Categories
    Category {
        #[command(subcommand)]
        command: CategoryCommand,
    },

    /// Monthly budget
    Budget {
        #[command(subcommand)]
        command: BudgetCommand,
    },

    /// Balance, totals and top spending categories
    Summary,

    /// Three short insights from the assistant model
    Insights,

    /// Configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum TxCommand {
    Add {
        #[arg(long)]
        kind: TransactionKind,
        #[arg(long)]
        amount: f64,
        #[arg(long)]
        category: String,
        #[arg(long)]
        note: Option<String>,
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Newest first
    List,
    Update {
        id: String,
        #[arg(long)]
        kind: Option<TransactionKind>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        note: Option<String>,
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    Rm { id: String },
}

#[derive(Subcommand, Debug)]
enum CategoryCommand {
    List,
    Add {
        name: String,
        #[arg(long, default_value = "pricetag")]
        icon: String,
    },
    /// Rename a category (its transactions follow) or change its icon
    Update {
        name: String,
        #[arg(long = "name")]
        new_name: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    Rm { name: String },
}

#[derive(Subcommand, Debug)]
enum BudgetCommand {
    Set { amount: f64 },
    Show,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config.toml if none exists
    Init,
    /// Print the effective configuration
    Show,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let store = Store::open(state::monexa_home()?)?;
    let cfg = config::load_config(store.home())?;
    let interpreter = Interpreter::with_keywords(cfg.keywords.clone())?;

    match cli.command {
        Command::Classify { message } => {
            let ledger = store.load_ledger()?;
            let cmd = interpreter.classify(&message, &ledger.category_names());
            println!("{}", serde_json::to_string_pretty(&cmd)?);
        }

        Command::Chat => {
            let model = LlmClient::from_section(&cfg.llm)?;
            run_chat(&store, &cfg, &interpreter, model.as_ref()).await?;
        }

        Command::Ask { message } => {
            let model = LlmClient::from_section(&cfg.llm)?;
            let handler = ChatHandler::new(&interpreter, model.as_ref(), &cfg.profile, cfg.chat.encouragement);
            let reply = chat_turn(&store, &cfg, &handler, &message).await?;
            println!("{reply}");
        }

        Command::History { clear } => {
            let log = store.chat_log();
            if clear {
                log.clear()?;
                println!("Chat history cleared");
            } else {
                for e in log.entries()? {
                    println!("[{}] {}: {}", e.created_at.format("%Y-%m-%d %H:%M"), e.role, e.text);
                }
            }
        }

        Command::Tx { command } => {
            let mut ledger = store.load_ledger()?;
            match command {
                TxCommand::Add {
                    kind,
                    amount,
                    category,
                    note,
                    date,
                } => {
                    let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
                    let t = ledger.add_transaction(kind, amount, category, note, date)?;
                    println!("Added {}", t.id);
                }
                TxCommand::List => {
                    for t in ledger.transactions_by_date_desc() {
                        println!(
                            "{} | {} | {:?} | {:>10.2} | {}{}",
                            t.id,
                            t.date,
                            t.kind,
                            t.amount,
                            t.category_name,
                            t.note.as_deref().map(|n| format!(" | {n}")).unwrap_or_default()
                        );
                    }
                }
                TxCommand::Update {
                    id,
                    kind,
                    amount,
                    category,
                    note,
                    date,
                } => {
                    let update = TransactionUpdate {
                        kind,
                        amount,
                        category_name: category,
                        note,
                        date,
                    };
                    ledger.update_transaction(&id, update)?;
                    println!("Updated {id}");
                }
                TxCommand::Rm { id } => {
                    ledger.remove_transaction(&id)?;
                    println!("Removed {id}");
                }
            }
            store.save_ledger(&ledger)?;
        }

        Command::Category { command } => {
            let mut ledger = store.load_ledger()?;
            match command {
                CategoryCommand::List => {
                    for c in &ledger.categories {
                        println!("{} ({})", c.name, c.icon);
                    }
                }
                CategoryCommand::Add { name, icon } => {
                    ledger.add_category(&name, &icon)?;
                    println!("Added category {name}");
                }
                CategoryCommand::Update {
                    name,
                    new_name,
                    icon,
                } => {
                    let c = ledger.update_category(&name, new_name.as_deref(), icon.as_deref())?;
                    println!("Updated category {} ({})", c.name, c.icon);
                }
                CategoryCommand::Rm { name } => {
                    ledger.remove_category(&name)?;
                    println!("Removed category {name}");
                }
            }
            store.save_ledger(&ledger)?;
        }

        Command::Budget { command } => {
            let mut ledger = store.load_ledger()?;
            match command {
                BudgetCommand::Set { amount } => {
                    ledger.set_monthly_budget(amount)?;
                    store.save_ledger(&ledger)?;
                    println!("Monthly budget set to {amount:.2} {}", cfg.profile.currency);
                }
                BudgetCommand::Show => match ledger.monthly_budget {
                    Some(b) => println!("Monthly budget: {b:.2} {}", cfg.profile.currency),
                    None => println!("No monthly budget set"),
                },
            }
        }

        Command::Summary => {
            let ledger = store.load_ledger()?;
            print_summary(&ledger, &cfg);
        }

        Command::Insights => {
            let ledger = store.load_ledger()?;
            let model = LlmClient::from_section(&cfg.llm)?;
            for line in insights::generate_insights(model.as_ref(), &ledger).await {
                println!("- {line}");
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(store.home())?,
            ConfigCommand::Show => {
                println!("# {}", config::config_path(store.home()).display());
                println!("{}", toml::to_string_pretty(&cfg).context("serialize config")?);
                match LlmClient::from_section(&cfg.llm)? {
                    Some(c) => println!(
                        "# llm: {:?} {} at {}",
                        c.config().provider,
                        c.config().model,
                        c.config().base_url
                    ),
                    None => println!("# llm: no key in ${}", cfg.llm.api_key_env),
                }
            }
        },
    }

    Ok(())
}

fn init_tracing(verbose: bool) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt};

    let level = if verbose { "monexa=info" } else { "monexa=warn" };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::new("warn").add_directive(level.parse()?),
    };
    fmt().with_env_filter(filter).with_writer(io::stderr).init();
    Ok(())
}

/// One message through the handler, with history and ledger persisted around it
async fn chat_turn(
    store: &Store,
    cfg: &Config,
    handler: &ChatHandler<'_, LlmClient>,
    message: &str,
) -> Result<String> {
    let log = store.chat_log();
    let history = log.recent_turns(cfg.chat.max_turns_context)?;
    log.append_user(message)?;

    let mut ledger = store.load_ledger()?;
    let reply = handler.respond(&mut ledger, &history, message).await?;
    if reply.command.intent.is_command() {
        store.save_ledger(&ledger)?;
    }

    log.append_assistant(&reply.text)?;
    Ok(reply.text)
}

async fn run_chat(
    store: &Store,
    cfg: &Config,
    interpreter: &Interpreter,
    model: Option<&LlmClient>,
) -> Result<()> {
    let handler = ChatHandler::new(interpreter, model, &cfg.profile, cfg.chat.encouragement);
    if model.is_none() {
        println!(
            "(no model key in ${}; commands still work, questions will fail)",
            cfg.llm.api_key_env
        );
    }
    println!("Hi {}, I'm Monexa. Type a question or a command, or 'quit'.", cfg.profile.full_name);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("you> ");
        io::stdout().flush().ok();

        let Some(line) = lines.next() else {
            break;
        };
        let line = line.context("read stdin")?;
        let msg = line.trim();
        if msg.is_empty() {
            continue;
        }
        if matches!(msg, "quit" | "exit" | "q") {
            break;
        }

        match chat_turn(store, cfg, &handler, msg).await {
            Ok(reply) => println!("monexa> {reply}"),
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "chat turn failed");
                println!("monexa> Sorry, I couldn't process that right now ({e:#}).");
            }
        }
    }
    Ok(())
}

fn print_summary(ledger: &Ledger, cfg: &Config) {
    let s = ledger.summary();
    let cur = &cfg.profile.currency;
    println!("Balance:       {:>12.2} {cur}", s.balance);
    println!("Total income:  {:>12.2} {cur}", s.total_income);
    println!("Total expense: {:>12.2} {cur}", s.total_expense);
    if let Some(b) = ledger.monthly_budget {
        println!("Budget:        {b:>12.2} {cur} ({:.0}% used)", pct(s.total_expense, b));
    }
    println!("Transactions:  {}", s.transaction_count);
    if !s.top_spending_categories.is_empty() {
        println!("\nTop spending categories:");
        for c in &s.top_spending_categories {
            println!("- {:<16} {:>10.2}", c.name, c.amount);
        }
    }
}

fn pct(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        return 0.0;
    }
    part / whole * 100.0
}
