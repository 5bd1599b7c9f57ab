use async_trait::async_trait;
use sea_orm::{
    ActiveValue, DatabaseConnection, PaginatorTrait, QueryFilter, QueryOrder, prelude::*,
};

use crate::{Category, EngineError, Kind, ResultEngine, categories, operations};

use super::CategoryRepo;

/// Reads and writes the `categories` table directly.
#[derive(Clone, Debug)]
pub struct DbCategoryRepo {
    database: DatabaseConnection,
}

impl DbCategoryRepo {
    #[must_use]
    pub fn new(database: DatabaseConnection) -> Self {
        Self { database }
    }

    async fn require(&self, id: &str) -> ResultEngine<categories::Model> {
        categories::Entity::find_by_id(id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("category {id}")))
    }
}

#[async_trait]
impl CategoryRepo for DbCategoryRepo {
    async fn list(&self) -> ResultEngine<Vec<Category>> {
        categories::Entity::find()
            .order_by_asc(categories::Column::Kind)
            .order_by_asc(categories::Column::Name)
            .order_by_asc(categories::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Category::try_from)
            .collect()
    }

    async fn get(&self, id: &str) -> ResultEngine<Option<Category>> {
        categories::Entity::find_by_id(id.to_string())
            .one(&self.database)
            .await?
            .map(Category::try_from)
            .transpose()
    }

    async fn create(&self, category: &Category) -> ResultEngine<()> {
        category.validate()?;
        categories::ActiveModel::from(category)
            .insert(&self.database)
            .await?;
        Ok(())
    }

    async fn update_name(&self, id: &str, name: &str) -> ResultEngine<()> {
        let model = self.require(id).await?;
        let mut active: categories::ActiveModel = model.into();
        active.name = ActiveValue::Set(name.to_string());
        active.update(&self.database).await?;
        Ok(())
    }

    async fn update_kind(&self, id: &str, kind: Kind) -> ResultEngine<()> {
        let model = self.require(id).await?;
        let mut active: categories::ActiveModel = model.into();
        active.kind = ActiveValue::Set(kind.into());
        active.update(&self.database).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> ResultEngine<()> {
        let result = categories::Entity::delete_by_id(id.to_string())
            .exec(&self.database)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::NotFound(format!("category {id}")));
        }
        Ok(())
    }

    async fn has_operations(&self, id: &str) -> ResultEngine<bool> {
        let used = operations::Entity::find()
            .filter(operations::Column::CategoryId.eq(id))
            .count(&self.database)
            .await?;
        Ok(used > 0)
    }
}
