//! These structs provide the CLI interface for the finsync CLI.

use crate::model::{
    BudgetDraft, BudgetPatch, EntityId, TransactionDraft, TransactionPatch, TransactionType,
};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

/// finsync: A command-line client for a personal finance backend.
///
/// finsync keeps a local, confirmed-only copy of your transactions and budgets in sync with a
/// REST finance store. Every change is sent to the store first and the local copy only reflects
/// what the store confirms.
///
/// Run `finsync init --base-url <URL>` once to point the tool at your backend.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and the configuration file.
    ///
    /// This is the first command you should run. Decide what directory you want to store the
    /// configuration in and pass it as --finsync-home. By default it will be $HOME/finsync.
    Init(InitArgs),
    /// Load a collection from the remote store and print it.
    List(ListArgs),
    /// Create a transaction or a budget.
    #[command(subcommand)]
    Add(AddSubcommand),
    /// Change fields of an existing transaction or budget.
    #[command(subcommand)]
    Update(UpdateSubcommand),
    /// Delete a transaction or a budget.
    #[command(subcommand)]
    Delete(DeleteSubcommand),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where finsync configuration is held. Defaults to ~/finsync
    #[arg(long, env = "FINSYNC_HOME", default_value_t = default_finsync_home())]
    finsync_home: DisplayPath,
}

impl Common {
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn finsync_home(&self) -> &DisplayPath {
        &self.finsync_home
    }
}

/// (Not shown): Args for the `finsync init` command.
#[derive(Debug, Parser, Clone)]
pub struct InitArgs {
    /// The root URL of the finance backend, e.g. http://localhost:5000
    #[arg(long)]
    base_url: String,

    /// The per-request timeout in seconds. Defaults to 30.
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl InitArgs {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout_secs(&self) -> Option<u64> {
        self.timeout_secs
    }
}

/// Which collection a command operates on.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq, clap::ValueEnum)]
pub enum EntityKind {
    #[default]
    Transactions,
    Budgets,
}

/// (Not shown): Args for the `finsync list` command.
#[derive(Debug, Parser, Clone)]
pub struct ListArgs {
    /// The collection to print: "transactions" or "budgets"
    entity: EntityKind,
}

impl ListArgs {
    pub fn entity(&self) -> EntityKind {
        self.entity
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum AddSubcommand {
    /// Record a new income or expense.
    Transaction(AddTransactionArgs),
    /// Set a spending limit for a category and month.
    Budget(AddBudgetArgs),
}

/// (Not shown): Args for `finsync add transaction`.
#[derive(Debug, Parser, Clone)]
pub struct AddTransactionArgs {
    /// The magnitude of the transaction, e.g. 12.50
    #[arg(long)]
    amount: Decimal,

    /// The date of the transaction, e.g. 2025-01-05
    #[arg(long)]
    date: String,

    #[arg(long)]
    description: String,

    /// The category name, e.g. "Food & Dining"
    #[arg(long)]
    category: String,

    /// Whether money came in or went out
    #[arg(long = "type", value_enum, default_value_t = TransactionType::Expense)]
    kind: TransactionType,
}

impl AddTransactionArgs {
    pub fn draft(&self) -> TransactionDraft {
        TransactionDraft {
            amount: self.amount,
            date: self.date.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            kind: self.kind,
        }
    }
}

/// (Not shown): Args for `finsync add budget`.
#[derive(Debug, Parser, Clone)]
pub struct AddBudgetArgs {
    #[arg(long)]
    category: String,

    /// The spending limit, e.g. 400
    #[arg(long)]
    amount: Decimal,

    /// The month the budget applies to, e.g. 2025-01
    #[arg(long)]
    month: String,
}

impl AddBudgetArgs {
    pub fn draft(&self) -> BudgetDraft {
        BudgetDraft {
            category: self.category.clone(),
            amount: self.amount,
            month: self.month.clone(),
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum UpdateSubcommand {
    /// Change fields of a transaction. Only the fields you pass are sent.
    Transaction(UpdateTransactionArgs),
    /// Change fields of a budget. Only the fields you pass are sent.
    Budget(UpdateBudgetArgs),
}

/// (Not shown): Args for `finsync update transaction`.
#[derive(Debug, Parser, Clone)]
pub struct UpdateTransactionArgs {
    /// The id of the transaction to update
    id: EntityId,

    #[arg(long)]
    amount: Option<Decimal>,

    #[arg(long)]
    date: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    category: Option<String>,

    #[arg(long = "type", value_enum)]
    kind: Option<TransactionType>,
}

impl UpdateTransactionArgs {
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn patch(&self) -> TransactionPatch {
        TransactionPatch {
            amount: self.amount,
            date: self.date.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            kind: self.kind,
        }
    }
}

/// (Not shown): Args for `finsync update budget`.
#[derive(Debug, Parser, Clone)]
pub struct UpdateBudgetArgs {
    /// The id of the budget to update
    id: EntityId,

    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    amount: Option<Decimal>,

    #[arg(long)]
    month: Option<String>,
}

impl UpdateBudgetArgs {
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn patch(&self) -> BudgetPatch {
        BudgetPatch {
            category: self.category.clone(),
            amount: self.amount,
            month: self.month.clone(),
        }
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum DeleteSubcommand {
    /// Delete one transaction by id.
    Transaction(DeleteArgs),
    /// Delete one budget by id.
    Budget(DeleteArgs),
}

/// (Not shown): Args for `finsync delete transaction|budget`.
#[derive(Debug, Parser, Clone)]
pub struct DeleteArgs {
    /// The id of the entity to delete
    id: EntityId,
}

impl DeleteArgs {
    pub fn id(&self) -> &EntityId {
        &self.id
    }
}

fn default_finsync_home() -> DisplayPath {
    DisplayPath(match dirs::home_dir() {
        Some(home) => home.join("finsync"),
        None => {
            error!(
                "There was an error when trying to get your home directory. You can get around \
                this by providing --finsync-home or FINSYNC_HOME instead of relying on the \
                default finsync home directory.",
            );
            PathBuf::from("finsync")
        }
    })
}

#[derive(Debug, Default, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct DisplayPath(PathBuf);

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_string_lossy())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(PathBuf::from(s)))
    }
}

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}
