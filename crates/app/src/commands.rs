//! Executes parsed commands against the engine.

use std::{collections::HashMap, future::Future, path::Path, time::Instant};

use chrono::{Local, NaiveDate};
use engine::{
    Account, ApplyOperationCmd, Category, Engine, EngineError, Format, Kind, OperationPatch,
    read_rows, write_rows,
};

use crate::{
    cli::{
        AccountCommand, CategoryCommand, Command, EditOpArgs, NewOpArgs, OpCommand, ReportCommand,
        usage,
    },
    error::Result,
    settings::Settings,
    state::LocalState,
};

/// Name of the account created when the database has none.
const DEFAULT_ACCOUNT_NAME: &str = "Main";

/// Logs how long `fut` took and whether it succeeded.
pub async fn timed<T, F>(name: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let started = Instant::now();
    let result = fut.await;
    let elapsed_ms = started.elapsed().as_millis();
    match &result {
        Ok(_) => tracing::info!(command = name, elapsed_ms, "command finished"),
        Err(err) => tracing::warn!(command = name, elapsed_ms, error = %err, "command failed"),
    }
    result
}

pub struct Runner<'a> {
    engine: &'a Engine,
    settings: &'a Settings,
    account: Option<String>,
    today: NaiveDate,
}

impl<'a> Runner<'a> {
    pub fn new(engine: &'a Engine, settings: &'a Settings, account: Option<String>) -> Self {
        Self {
            engine,
            settings,
            account,
            today: Local::now().date_naive(),
        }
    }

    pub async fn run(&self, command: Command) -> Result<()> {
        let name = command.name();
        timed(name, self.execute(command)).await
    }

    async fn execute(&self, command: Command) -> Result<()> {
        match command {
            Command::Account(args) => self.account_command(args.command).await,
            Command::Category(args) => self.category_command(args.command).await,
            Command::Op(args) => self.op_command(args.command).await,
            Command::Report(args) => {
                let account = self.current_account().await?;
                match args.command {
                    ReportCommand::Summary(period) => {
                        let range = period.range(self.today)?;
                        let summary = self.engine.summary_by_period(&account.id, range).await?;
                        println!(
                            "{} {}..{}",
                            account.name,
                            range.from(),
                            range.to()
                        );
                        println!("  income  {:>12}", summary.income);
                        println!("  expense {:>12}", summary.expense);
                        println!("  net     {:>12}", summary.net);
                    }
                    ReportCommand::Categories(period) => {
                        let range = period.range(self.today)?;
                        let rows = self
                            .engine
                            .breakdown_by_category(&account.id, range)
                            .await?;
                        if rows.is_empty() {
                            println!("no operations between {} and {}", range.from(), range.to());
                        }
                        for row in rows {
                            let kind = row.kind.map_or("?", Kind::as_str);
                            println!(
                                "{:<24} {:<8} +{:>10} -{:>10} = {:>10}",
                                row.name, kind, row.income, row.expense, row.net
                            );
                        }
                    }
                }
                Ok(())
            }
            Command::Export(args) => {
                let format = format_for(&args.path)?;
                let account = self.current_account().await?;
                let range = args.period.range(self.today)?;
                let rows = self.engine.export_rows(&account.id, range).await?;
                write_rows(&args.path, format, &rows)?;
                println!("exported {} operations to {}", rows.len(), args.path.display());
                Ok(())
            }
            Command::Import(args) => {
                let format = format_for(&args.path)?;
                let account = self.current_account().await?;
                let rows = read_rows(&args.path, format)?;
                if rows.is_empty() {
                    println!("nothing to import");
                    return Ok(());
                }
                let imported = self
                    .engine
                    .import_rows(&account.id, &rows)
                    .await?
                    .into_result()?;
                let account = self.engine.account(&account.id).await?;
                println!(
                    "imported {imported} operations, balance {}",
                    account.balance
                );
                Ok(())
            }
        }
    }

    async fn account_command(&self, command: AccountCommand) -> Result<()> {
        match command {
            AccountCommand::Create { name } => {
                let account = self.engine.create_account(&name).await?;
                println!("created account {} ({})", account.name, account.id);
            }
            AccountCommand::List => {
                let state = LocalState::load(&self.settings.app.state_path)?;
                for account in self.engine.list_accounts().await? {
                    let marker = if state.current_account_id.as_deref() == Some(account.id.as_str())
                    {
                        '*'
                    } else {
                        ' '
                    };
                    println!(
                        "{marker} {:<24} {:>12}  {}",
                        account.name, account.balance, account.id
                    );
                }
            }
            AccountCommand::Rename { name } => {
                let account = self.current_account().await?;
                let renamed = self.engine.rename_account(&account.id, &name).await?;
                println!("renamed {} to {}", account.name, renamed.name);
            }
            AccountCommand::Use { target } => {
                let account = find_account(self.engine, &target).await?;
                let mut state = LocalState::load(&self.settings.app.state_path)?;
                state.current_account_id = Some(account.id.clone());
                state.save(&self.settings.app.state_path)?;
                println!("using {} (balance {})", account.name, account.balance);
            }
            AccountCommand::Delete { target } => {
                let account = find_account(self.engine, &target).await?;
                self.engine.delete_account(&account.id).await?;
                let mut state = LocalState::load(&self.settings.app.state_path)?;
                if state.current_account_id.as_deref() == Some(account.id.as_str()) {
                    state.current_account_id = None;
                    state.save(&self.settings.app.state_path)?;
                }
                println!("deleted account {}", account.name);
            }
            AccountCommand::Reconcile => {
                let account = self.current_account().await?;
                let (old, new) = self.engine.reconcile_account(&account.id).await?;
                if old == new {
                    println!("{}: balance {new} matches its operations", account.name);
                } else {
                    println!("{}: balance corrected from {old} to {new}", account.name);
                }
            }
        }
        Ok(())
    }

    async fn category_command(&self, command: CategoryCommand) -> Result<()> {
        match command {
            CategoryCommand::Create { name, kind } => {
                let category = self.engine.create_category(&name, kind).await?;
                println!("created {} category {}", category.kind, category.name);
            }
            CategoryCommand::List => {
                for category in self.engine.list_categories().await? {
                    println!(
                        "{:<8} {:<24} {}",
                        category.kind, category.name, category.id
                    );
                }
            }
            CategoryCommand::Rename { category, name } => {
                let category = find_category(self.engine, &category).await?;
                let renamed = self.engine.rename_category(&category.id, &name).await?;
                println!("renamed {} to {}", category.name, renamed.name);
            }
            CategoryCommand::SetKind { category, kind } => {
                let category = find_category(self.engine, &category).await?;
                let changed = self.engine.change_category_kind(&category.id, kind).await?;
                println!("{} is now {}", changed.name, changed.kind);
            }
            CategoryCommand::Delete { category } => {
                let category = find_category(self.engine, &category).await?;
                self.engine.delete_category(&category.id).await?;
                println!("deleted category {}", category.name);
            }
        }
        Ok(())
    }

    async fn op_command(&self, command: OpCommand) -> Result<()> {
        match command {
            OpCommand::Income(args) => self.record(Kind::Income, args).await,
            OpCommand::Expense(args) => self.record(Kind::Expense, args).await,
            OpCommand::Edit(args) => {
                let id = args.id.clone();
                let operation = self.engine.edit_operation(&id, patch_from(args)).await?;
                let account = self.engine.account(&operation.account_id).await?;
                println!(
                    "updated {} {} {} on {}, balance {}",
                    operation.id, operation.kind, operation.amount, operation.date, account.balance
                );
                Ok(())
            }
            OpCommand::Delete { id } => {
                let operation = self.engine.reverse_operation(&id).await?;
                let account = self.engine.account(&operation.account_id).await?;
                println!(
                    "deleted {} {} {}, balance {}",
                    operation.kind, operation.amount, operation.date, account.balance
                );
                Ok(())
            }
            OpCommand::List(period) => {
                let account = self.current_account().await?;
                let range = period.range(self.today)?;
                let names: HashMap<String, String> = self
                    .engine
                    .list_categories()
                    .await?
                    .into_iter()
                    .map(|category| (category.id, category.name))
                    .collect();
                for operation in self.engine.list_operations(&account.id, range).await? {
                    let category = names
                        .get(&operation.category_id)
                        .map_or(engine::UNKNOWN_CATEGORY, String::as_str);
                    println!(
                        "{} {:>12} {:<20} {:<30} {}",
                        operation.date,
                        operation.signed_amount(),
                        category,
                        operation.description,
                        operation.id
                    );
                }
                println!("balance {}", account.balance);
                Ok(())
            }
        }
    }

    async fn record(&self, kind: Kind, args: NewOpArgs) -> Result<()> {
        let account = self.current_account().await?;
        let category = self.engine.ensure_category(&args.category, kind).await?;
        let cmd = ApplyOperationCmd::new(
            kind,
            account.id.clone(),
            args.amount,
            args.date.unwrap_or(self.today),
            category.id,
        )
        .description(args.description);
        let operation = self.engine.apply_operation(cmd).await?;
        let account = self.engine.account(&account.id).await?;
        println!(
            "recorded {} {} ({}), balance {}",
            operation.kind, operation.amount, operation.id, account.balance
        );
        Ok(())
    }

    /// `--account`, else the remembered account, else the first one, else a
    /// fresh "Main" account. The choice is remembered.
    async fn current_account(&self) -> Result<Account> {
        if let Some(key) = self.account.as_deref() {
            return find_account(self.engine, key).await;
        }

        let path = &self.settings.app.state_path;
        let mut state = LocalState::load(path)?;
        if let Some(id) = state.current_account_id.as_deref() {
            match self.engine.account(id).await {
                Ok(account) => return Ok(account),
                Err(EngineError::NotFound(_)) => {
                    tracing::warn!(account_id = id, "remembered account no longer exists");
                }
                Err(err) => return Err(err.into()),
            }
        }

        let account = match self.engine.list_accounts().await?.into_iter().next() {
            Some(account) => account,
            None => {
                let account = self.engine.create_account(DEFAULT_ACCOUNT_NAME).await?;
                tracing::info!(account_id = %account.id, "created default account");
                account
            }
        };
        state.current_account_id = Some(account.id.clone());
        state.save(path)?;
        Ok(account)
    }
}

fn format_for(path: &Path) -> Result<Format> {
    Format::from_path(path).ok_or_else(|| {
        usage(format!(
            "cannot tell the format of {}: use a .csv, .json or .yaml file",
            path.display()
        ))
    })
}

fn patch_from(args: EditOpArgs) -> OperationPatch {
    let mut patch = OperationPatch::new();
    patch.kind = args.kind;
    patch.amount = args.amount;
    patch.date = args.date;
    patch.description = args.description;
    if let Some(name) = args.category {
        patch = patch.category_name(name);
    }
    patch
}

/// Looks an account up by id, then by name ignoring case.
async fn find_account(engine: &Engine, key: &str) -> Result<Account> {
    match engine.account(key).await {
        Ok(account) => return Ok(account),
        Err(EngineError::NotFound(_)) => {}
        Err(err) => return Err(err.into()),
    }
    let wanted = key.trim().to_lowercase();
    let mut matches: Vec<Account> = engine
        .list_accounts()
        .await?
        .into_iter()
        .filter(|account| account.name.to_lowercase() == wanted)
        .collect();
    match matches.len() {
        0 => Err(EngineError::NotFound(format!("account {key}")).into()),
        1 => Ok(matches.remove(0)),
        _ => Err(usage(format!("several accounts are called '{key}', use the id"))),
    }
}

/// Looks a category up by id, then by name ignoring case.
async fn find_category(engine: &Engine, key: &str) -> Result<Category> {
    match engine.category(key).await {
        Ok(category) => return Ok(category),
        Err(EngineError::NotFound(_)) => {}
        Err(err) => return Err(err.into()),
    }
    let wanted = key.trim().to_lowercase();
    let mut matches: Vec<Category> = engine
        .list_categories()
        .await?
        .into_iter()
        .filter(|category| category.name.to_lowercase() == wanted)
        .collect();
    match matches.len() {
        0 => Err(EngineError::NotFound(format!("category {key}")).into()),
        1 => Ok(matches.remove(0)),
        _ => Err(usage(format!(
            "several categories are called '{key}', use the id"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn timed_passes_the_result_through() {
        assert_eq!(timed("ok", async { Ok(3) }).await.unwrap(), 3);
        let err = timed::<(), _>("fail", async { Err(usage("boom")) })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn edit_args_become_a_patch() {
        let args = EditOpArgs {
            id: "op".to_string(),
            kind: Some(Kind::Income),
            amount: None,
            date: None,
            category: Some("Gifts".to_string()),
            description: Some("birthday".to_string()),
        };
        let patch = patch_from(args);
        assert_eq!(
            patch,
            OperationPatch::new()
                .kind(Kind::Income)
                .category_name("Gifts")
                .description("birthday")
        );
    }
}
