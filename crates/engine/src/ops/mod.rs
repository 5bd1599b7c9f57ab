use std::{fmt, future::Future, sync::Arc, time::Duration};

use sea_orm::DatabaseConnection;

use crate::{
    CachedCategoryRepo, CategoryRepo, DbCategoryRepo, EngineError, ResultEngine,
};

mod accounts;
mod categories;
mod exchange;
mod ledger;
mod locks;
mod reports;

pub use exchange::ImportReport;
pub use reports::{CategorySummary, Summary, UNKNOWN_CATEGORY};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// The whole unit of work, `BEGIN` and `COMMIT` included, runs under the
/// engine transaction timeout, so waiting for a pooled connection counts
/// too. When the timeout fires the transaction is dropped, which rolls it
/// back. Evaluates to the block result and never returns early.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        $self
            .bounded(async {
                let $tx = $self.database.begin().await?;
                let result: $crate::ResultEngine<_> = async { $body }.await;
                match result {
                    Ok(value) => {
                        $tx.commit().await?;
                        Ok(value)
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "unit of work rolled back");
                        if let Err(rollback_err) = $tx.rollback().await {
                            tracing::warn!(error = %rollback_err, "rollback failed");
                        }
                        Err(err)
                    }
                }
            })
            .await
    }};
}

pub(crate) use with_tx;

/// Entry point of the ledger: accounts, categories, operations and reports.
pub struct Engine {
    database: DatabaseConnection,
    categories: Arc<dyn CategoryRepo>,
    tx_timeout: Option<Duration>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// The category repository the engine reads names and kinds from.
    #[must_use]
    pub fn category_repo(&self) -> &Arc<dyn CategoryRepo> {
        &self.categories
    }

    async fn bounded<T, F>(&self, fut: F) -> ResultEngine<T>
    where
        F: Future<Output = ResultEngine<T>>,
    {
        match self.tx_timeout {
            Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
                EngineError::Timeout(format!("unit of work exceeded {}ms", limit.as_millis()))
            })?,
            None => fut.await,
        }
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("database", &self.database)
            .field("tx_timeout", &self.tx_timeout)
            .finish_non_exhaustive()
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    categories: Option<Arc<dyn CategoryRepo>>,
    cache_categories: bool,
    tx_timeout: Option<Duration>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            categories: None,
            cache_categories: true,
            tx_timeout: None,
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Use a custom category repository instead of the default one.
    pub fn categories(mut self, repo: Arc<dyn CategoryRepo>) -> EngineBuilder {
        self.categories = Some(repo);
        self
    }

    /// Put the read-through cache in front of the default category
    /// repository (on by default). Ignored when a custom repository is set.
    pub fn cache_categories(mut self, enabled: bool) -> EngineBuilder {
        self.cache_categories = enabled;
        self
    }

    /// Upper bound for a single unit of work.
    pub fn tx_timeout(mut self, limit: Duration) -> EngineBuilder {
        self.tx_timeout = Some(limit);
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let categories = match self.categories {
            Some(repo) => repo,
            None => {
                let direct: Arc<dyn CategoryRepo> =
                    Arc::new(DbCategoryRepo::new(self.database.clone()));
                if self.cache_categories {
                    Arc::new(CachedCategoryRepo::new(direct))
                } else {
                    direct
                }
            }
        };
        Ok(Engine {
            database: self.database,
            categories,
            tx_timeout: self.tx_timeout,
        })
    }
}
