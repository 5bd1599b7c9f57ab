//! Category storage behind a capability trait.
//!
//! The engine only sees [`CategoryRepo`]. Two variants exist:
//! [`DbCategoryRepo`] talks to the database on every call and
//! [`CachedCategoryRepo`] keeps a read-through snapshot in front of any other
//! repository.

use async_trait::async_trait;

use crate::{Category, Kind, ResultEngine};

mod cached;
mod direct;

pub use cached::CachedCategoryRepo;
pub use direct::DbCategoryRepo;

#[async_trait]
pub trait CategoryRepo: Send + Sync {
    /// All categories ordered by kind, name, id.
    async fn list(&self) -> ResultEngine<Vec<Category>>;

    async fn get(&self, id: &str) -> ResultEngine<Option<Category>>;

    async fn create(&self, category: &Category) -> ResultEngine<()>;

    async fn update_name(&self, id: &str, name: &str) -> ResultEngine<()>;

    async fn update_kind(&self, id: &str, kind: Kind) -> ResultEngine<()>;

    async fn delete(&self, id: &str) -> ResultEngine<()>;

    /// Whether any operation still references the category. Never cached.
    async fn has_operations(&self, id: &str) -> ResultEngine<bool>;
}
