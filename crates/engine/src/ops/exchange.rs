use std::collections::HashMap;

use crate::{ApplyOperationCmd, DateRange, EngineError, ResultEngine, Row};

use super::{Engine, UNKNOWN_CATEGORY};

/// Outcome of [`Engine::import_rows`].
#[derive(Debug, PartialEq)]
pub struct ImportReport {
    /// Rows applied before the import stopped.
    pub imported: usize,
    /// Zero-based index of the row that stopped the import, with its error.
    pub failed: Option<(usize, EngineError)>,
}

impl ImportReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_none()
    }

    /// Number of imported rows, or the stopping error annotated with the
    /// row and the count already imported.
    pub fn into_result(self) -> ResultEngine<usize> {
        match self.failed {
            None => Ok(self.imported),
            Some((index, err)) => Err(EngineError::Import(format!(
                "row {}: {err} ({} rows imported before it)",
                index + 1,
                self.imported
            ))),
        }
    }
}

impl Engine {
    /// One row per operation of the account inside `range`, ordered by date
    /// then id. Category names come from the category repository.
    pub async fn export_rows(&self, account_id: &str, range: DateRange) -> ResultEngine<Vec<Row>> {
        let operations = self.list_operations(account_id, range).await?;
        let names: HashMap<String, String> = self
            .categories
            .list()
            .await?
            .into_iter()
            .map(|category| (category.id, category.name))
            .collect();

        Ok(operations
            .iter()
            .map(|operation| {
                let name = names
                    .get(&operation.category_id)
                    .map_or(UNKNOWN_CATEGORY, String::as_str);
                Row::from_operation(operation, name)
            })
            .collect())
    }

    /// Applies `rows` to the account in order.
    ///
    /// Categories are matched by name and kind, and created when missing.
    /// Each row is its own unit of work: rows applied before a failure stay,
    /// and the first failure stops the import.
    pub async fn import_rows(&self, account_id: &str, rows: &[Row]) -> ResultEngine<ImportReport> {
        self.account(account_id).await?;

        let mut imported = 0;
        for (index, row) in rows.iter().enumerate() {
            if let Err(err) = self.import_row(account_id, row).await {
                tracing::warn!(row = index + 1, error = %err, imported, "import stopped");
                return Ok(ImportReport {
                    imported,
                    failed: Some((index, err)),
                });
            }
            imported += 1;
        }
        tracing::debug!(account_id, imported, "import finished");
        Ok(ImportReport {
            imported,
            failed: None,
        })
    }

    async fn import_row(&self, account_id: &str, row: &Row) -> ResultEngine<()> {
        let kind = row.kind()?;
        let category = self.ensure_category(&row.category, kind).await?;
        let cmd = ApplyOperationCmd::new(kind, account_id, row.amount, row.date, category.id)
            .description(row.description.clone());
        self.apply_operation(cmd).await?;
        Ok(())
    }
}
