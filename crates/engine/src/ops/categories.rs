use crate::{
    Category, EngineError, Kind, ResultEngine,
    util::{name_key, normalize_required_name},
};

use super::Engine;

impl Engine {
    /// Creates a category. Names are unique across all categories,
    /// compared case-insensitively.
    pub async fn create_category(&self, name: &str, kind: Kind) -> ResultEngine<Category> {
        let category = Category::new(name, kind)?;
        self.require_unique_name(&category.name, None).await?;
        self.categories.create(&category).await?;
        tracing::debug!(category_id = %category.id, name = %category.name, %kind, "category created");
        Ok(category)
    }

    /// Returns the category called `name` with the given kind, creating it
    /// when there is none.
    ///
    /// Used when operations reference categories by name, so an existing
    /// category of the other kind with the same name does not block the
    /// creation.
    pub async fn ensure_category(&self, name: &str, kind: Kind) -> ResultEngine<Category> {
        Ok(self.resolve_category(name, kind).await?.0)
    }

    /// [`ensure_category`](Engine::ensure_category), also telling whether the
    /// category was created by this call.
    pub(super) async fn resolve_category(
        &self,
        name: &str,
        kind: Kind,
    ) -> ResultEngine<(Category, bool)> {
        let display = normalize_required_name(name, "category")?;
        let key = name_key(&display);
        if let Some(found) = self
            .categories
            .list()
            .await?
            .into_iter()
            .find(|category| category.kind == kind && name_key(&category.name) == key)
        {
            return Ok((found, false));
        }
        let category = Category::new(&display, kind)?;
        self.categories.create(&category).await?;
        tracing::debug!(category_id = %category.id, name = %category.name, %kind, "category created on demand");
        Ok((category, true))
    }

    pub async fn category(&self, id: &str) -> ResultEngine<Category> {
        self.categories
            .get(id)
            .await?
            .ok_or_else(|| EngineError::NotFound(format!("category {id}")))
    }

    /// All categories ordered by kind, name, id.
    pub async fn list_categories(&self) -> ResultEngine<Vec<Category>> {
        self.categories.list().await
    }

    pub async fn rename_category(&self, id: &str, name: &str) -> ResultEngine<Category> {
        let mut category = self.category(id).await?;
        category.rename(name)?;
        self.require_unique_name(&category.name, Some(id)).await?;
        self.categories.update_name(id, &category.name).await?;
        Ok(category)
    }

    /// Changes the kind of a category. Operations already filed under it keep
    /// their own kind and their effect on balances.
    pub async fn change_category_kind(&self, id: &str, kind: Kind) -> ResultEngine<Category> {
        let mut category = self.category(id).await?;
        if category.kind == kind {
            return Ok(category);
        }
        category.set_kind(kind);
        self.categories.update_kind(id, kind).await?;
        Ok(category)
    }

    /// Deletes a category that no operation references.
    pub async fn delete_category(&self, id: &str) -> ResultEngine<()> {
        let category = self.category(id).await?;
        if self.categories.has_operations(id).await? {
            return Err(EngineError::InUse(format!(
                "category '{}' is referenced by operations",
                category.name
            )));
        }
        self.categories.delete(id).await
    }

    async fn require_unique_name(&self, name: &str, except: Option<&str>) -> ResultEngine<()> {
        let key = name_key(name);
        let clash = self
            .categories
            .list()
            .await?
            .into_iter()
            .any(|category| name_key(&category.name) == key && Some(category.id.as_str()) != except);
        if clash {
            return Err(EngineError::ExistingKey(format!("category '{name}'")));
        }
        Ok(())
    }
}
