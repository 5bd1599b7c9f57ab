use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{Category, Kind, ResultEngine};

use super::CategoryRepo;

#[derive(Debug, Default)]
struct CacheState {
    fresh: bool,
    /// Bumped by every invalidation; a load started under an older
    /// generation is not stored.
    generation: u64,
    list: Vec<Category>,
    by_id: HashMap<String, Category>,
}

/// Read-through cache in front of another [`CategoryRepo`].
///
/// `list` and `get` load the full table once and then answer from memory.
/// Every write goes to the inner repository and then drops the whole
/// snapshot. Concurrent readers that miss at the same time all load from
/// storage: there is no single-flight.
///
/// Writes made to the table without going through this repository are not
/// seen until [`invalidate`](CachedCategoryRepo::invalidate) is called.
pub struct CachedCategoryRepo {
    inner: Arc<dyn CategoryRepo>,
    state: RwLock<CacheState>,
}

impl CachedCategoryRepo {
    #[must_use]
    pub fn new(inner: Arc<dyn CategoryRepo>) -> Self {
        Self {
            inner,
            state: RwLock::new(CacheState::default()),
        }
    }

    /// Drops the snapshot; the next read reloads it.
    pub async fn invalidate(&self) {
        let mut state = self.state.write().await;
        state.fresh = false;
        state.generation = state.generation.wrapping_add(1);
        state.list.clear();
        state.by_id.clear();
    }

    /// Whether the next read will be served from memory.
    pub async fn is_fresh(&self) -> bool {
        self.state.read().await.fresh
    }

    async fn snapshot(&self) -> ResultEngine<Vec<Category>> {
        let generation = {
            let state = self.state.read().await;
            if state.fresh {
                return Ok(state.list.clone());
            }
            state.generation
        };

        let list = self.inner.list().await?;
        tracing::debug!(categories = list.len(), "category cache loaded");

        let mut state = self.state.write().await;
        if state.generation == generation {
            state.by_id = list
                .iter()
                .map(|category| (category.id.clone(), category.clone()))
                .collect();
            state.list = list.clone();
            state.fresh = true;
        }
        Ok(list)
    }
}

#[async_trait]
impl CategoryRepo for CachedCategoryRepo {
    async fn list(&self) -> ResultEngine<Vec<Category>> {
        self.snapshot().await
    }

    async fn get(&self, id: &str) -> ResultEngine<Option<Category>> {
        {
            let state = self.state.read().await;
            if state.fresh {
                return Ok(state.by_id.get(id).cloned());
            }
        }
        let list = self.snapshot().await?;
        Ok(list.into_iter().find(|category| category.id == id))
    }

    async fn create(&self, category: &Category) -> ResultEngine<()> {
        let result = self.inner.create(category).await;
        self.invalidate().await;
        result
    }

    async fn update_name(&self, id: &str, name: &str) -> ResultEngine<()> {
        let result = self.inner.update_name(id, name).await;
        self.invalidate().await;
        result
    }

    async fn update_kind(&self, id: &str, kind: Kind) -> ResultEngine<()> {
        let result = self.inner.update_kind(id, kind).await;
        self.invalidate().await;
        result
    }

    async fn delete(&self, id: &str) -> ResultEngine<()> {
        let result = self.inner.delete(id).await;
        self.invalidate().await;
        result
    }

    async fn has_operations(&self, id: &str) -> ResultEngine<bool> {
        self.inner.has_operations(id).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::sync::Mutex;

    use super::*;

    /// In-memory repository counting the loads it serves.
    #[derive(Default)]
    struct CountingRepo {
        loads: AtomicUsize,
        rows: Mutex<Vec<Category>>,
    }

    #[async_trait]
    impl CategoryRepo for CountingRepo {
        async fn list(&self) -> ResultEngine<Vec<Category>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(self.rows.lock().await.clone())
        }

        async fn get(&self, id: &str) -> ResultEngine<Option<Category>> {
            Ok(self.rows.lock().await.iter().find(|c| c.id == id).cloned())
        }

        async fn create(&self, category: &Category) -> ResultEngine<()> {
            self.rows.lock().await.push(category.clone());
            Ok(())
        }

        async fn update_name(&self, id: &str, name: &str) -> ResultEngine<()> {
            for category in self.rows.lock().await.iter_mut() {
                if category.id == id {
                    category.name = name.to_string();
                }
            }
            Ok(())
        }

        async fn update_kind(&self, id: &str, kind: Kind) -> ResultEngine<()> {
            for category in self.rows.lock().await.iter_mut() {
                if category.id == id {
                    category.kind = kind;
                }
            }
            Ok(())
        }

        async fn delete(&self, id: &str) -> ResultEngine<()> {
            self.rows.lock().await.retain(|c| c.id != id);
            Ok(())
        }

        async fn has_operations(&self, _id: &str) -> ResultEngine<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn reads_hit_storage_once_until_a_write() {
        let inner = Arc::new(CountingRepo::default());
        let cache = CachedCategoryRepo::new(inner.clone());
        let food = Category::new("Food", Kind::Expense).unwrap();
        cache.create(&food).await.unwrap();

        assert_eq!(cache.list().await.unwrap(), vec![food.clone()]);
        assert_eq!(cache.get(&food.id).await.unwrap(), Some(food.clone()));
        assert_eq!(cache.get("missing").await.unwrap(), None);
        assert_eq!(inner.loads.load(Ordering::SeqCst), 1);

        cache.update_name(&food.id, "Groceries").await.unwrap();
        assert!(!cache.is_fresh().await);
        let renamed = cache.get(&food.id).await.unwrap().unwrap();
        assert_eq!(renamed.name, "Groceries");
        assert_eq!(inner.loads.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn behind_the_back_writes_stay_hidden_until_invalidated() {
        let inner = Arc::new(CountingRepo::default());
        let cache = CachedCategoryRepo::new(inner.clone());
        assert!(cache.list().await.unwrap().is_empty());

        let salary = Category::new("Salary", Kind::Income).unwrap();
        inner.create(&salary).await.unwrap();
        assert!(cache.list().await.unwrap().is_empty());

        cache.invalidate().await;
        assert_eq!(cache.list().await.unwrap(), vec![salary]);
    }
}
