use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use engine::{DateRange, Kind, Money};

use crate::error::{AppError, Result};

#[derive(Parser, Debug)]
#[command(name = "tally")]
#[command(about = "Personal finance ledger: accounts, income, expenses and reports")]
pub struct Cli {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Account to act on (id or name). Defaults to the remembered one.
    #[arg(long, global = true)]
    pub account: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage accounts.
    Account(AccountArgs),
    /// Manage categories.
    Category(CategoryArgs),
    /// Record, edit and list operations of the current account.
    Op(OpArgs),
    /// Totals of the current account.
    Report(ReportArgs),
    /// Write the operations of the current account to a file.
    Export(ExportArgs),
    /// Read operations from a file into the current account.
    Import(ImportArgs),
}

impl Command {
    /// Name used in timing logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Account(args) => match args.command {
                AccountCommand::Create { .. } => "account create",
                AccountCommand::List => "account list",
                AccountCommand::Rename { .. } => "account rename",
                AccountCommand::Use { .. } => "account use",
                AccountCommand::Delete { .. } => "account delete",
                AccountCommand::Reconcile => "account reconcile",
            },
            Self::Category(args) => match args.command {
                CategoryCommand::Create { .. } => "category create",
                CategoryCommand::List => "category list",
                CategoryCommand::Rename { .. } => "category rename",
                CategoryCommand::SetKind { .. } => "category set-kind",
                CategoryCommand::Delete { .. } => "category delete",
            },
            Self::Op(args) => match args.command {
                OpCommand::Income(_) => "op income",
                OpCommand::Expense(_) => "op expense",
                OpCommand::Edit(_) => "op edit",
                OpCommand::Delete { .. } => "op delete",
                OpCommand::List(_) => "op list",
            },
            Self::Report(args) => match args.command {
                ReportCommand::Summary(_) => "report summary",
                ReportCommand::Categories(_) => "report categories",
            },
            Self::Export(_) => "export",
            Self::Import(_) => "import",
        }
    }
}

#[derive(Args, Debug)]
pub struct AccountArgs {
    #[command(subcommand)]
    pub command: AccountCommand,
}

#[derive(Subcommand, Debug)]
pub enum AccountCommand {
    Create {
        name: String,
    },
    List,
    /// Rename the current account.
    Rename {
        name: String,
    },
    /// Remember an account (id or name) for the next commands.
    Use {
        #[arg(value_name = "ACCOUNT")]
        target: String,
    },
    /// Delete an account (id or name) without operations.
    Delete {
        #[arg(value_name = "ACCOUNT")]
        target: String,
    },
    /// Recompute the current account balance from its operations.
    Reconcile,
}

#[derive(Args, Debug)]
pub struct CategoryArgs {
    #[command(subcommand)]
    pub command: CategoryCommand,
}

#[derive(Subcommand, Debug)]
pub enum CategoryCommand {
    Create {
        name: String,
        /// `income` or `expense`.
        #[arg(long)]
        kind: Kind,
    },
    List,
    Rename {
        /// Id or name.
        category: String,
        name: String,
    },
    SetKind {
        /// Id or name.
        category: String,
        kind: Kind,
    },
    Delete {
        /// Id or name.
        category: String,
    },
}

#[derive(Args, Debug)]
pub struct OpArgs {
    #[command(subcommand)]
    pub command: OpCommand,
}

#[derive(Subcommand, Debug)]
pub enum OpCommand {
    Income(NewOpArgs),
    Expense(NewOpArgs),
    Edit(EditOpArgs),
    Delete { id: String },
    List(PeriodArgs),
}

#[derive(Args, Debug)]
pub struct NewOpArgs {
    pub amount: Money,
    /// Category name; created when missing.
    #[arg(long)]
    pub category: String,
    /// Defaults to today.
    #[arg(long)]
    pub date: Option<NaiveDate>,
    #[arg(long, default_value = "")]
    pub description: String,
}

#[derive(Args, Debug)]
pub struct EditOpArgs {
    pub id: String,
    #[arg(long)]
    pub kind: Option<Kind>,
    #[arg(long)]
    pub amount: Option<Money>,
    #[arg(long)]
    pub date: Option<NaiveDate>,
    /// Category name; created when missing.
    #[arg(long)]
    pub category: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    #[command(subcommand)]
    pub command: ReportCommand,
}

#[derive(Subcommand, Debug)]
pub enum ReportCommand {
    Summary(PeriodArgs),
    Categories(PeriodArgs),
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Target file; the format follows the extension (csv, json, yaml).
    pub path: PathBuf,
    #[command(flatten)]
    pub period: PeriodArgs,
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Source file; the format follows the extension (csv, json, yaml).
    pub path: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct PeriodArgs {
    #[arg(long)]
    pub from: Option<NaiveDate>,
    #[arg(long)]
    pub to: Option<NaiveDate>,
    /// Days back from `--to` (or today) when `--from` is not given.
    #[arg(long, default_value_t = 30)]
    pub days: u32,
}

impl PeriodArgs {
    pub fn range(&self, today: NaiveDate) -> Result<DateRange> {
        let to = self.to.unwrap_or(today);
        let range = match self.from {
            Some(from) => DateRange::new(from, to)?,
            None => DateRange::last_days(self.days, to)?,
        };
        Ok(range)
    }
}

pub fn usage(message: impl Into<String>) -> AppError {
    AppError::Usage(message.into())
}
