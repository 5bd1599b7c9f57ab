//! The module contains `Category` struct and its implementation.

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    EngineError, Kind, ResultEngine,
    util::{new_id, normalize_required_name, require_id},
};

/// A label for operations, either income or expense.
///
/// The kind is fixed at creation. [`set_kind`](Category::set_kind) exists for
/// the explicit "change kind" command and never touches operations already
/// referencing the category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub kind: Kind,
    pub name: String,
}

impl Category {
    pub fn new(name: &str, kind: Kind) -> ResultEngine<Self> {
        Ok(Self {
            id: new_id(),
            kind,
            name: normalize_required_name(name, "category")?,
        })
    }

    pub fn validate(&self) -> ResultEngine<()> {
        require_id(&self.id, "category")?;
        normalize_required_name(&self.name, "category")?;
        Ok(())
    }

    pub fn rename(&mut self, name: &str) -> ResultEngine<()> {
        self.name = normalize_required_name(name, "category")?;
        Ok(())
    }

    pub fn set_kind(&mut self, kind: Kind) {
        self.kind = kind;
    }

    /// Fails with `CategoryTypeMismatch` when `kind` disagrees with the
    /// category.
    pub fn require_kind(&self, kind: Kind) -> ResultEngine<()> {
        if self.kind != kind {
            return Err(EngineError::CategoryTypeMismatch(format!(
                "category '{}' is {}, operation is {kind}",
                self.name, self.kind
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: i32,
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::operations::Entity")]
    Operations,
}

impl Related<super::operations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Operations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Category> for ActiveModel {
    fn from(value: &Category) -> Self {
        Self {
            id: ActiveValue::Set(value.id.clone()),
            kind: ActiveValue::Set(value.kind.into()),
            name: ActiveValue::Set(value.name.clone()),
        }
    }
}

impl TryFrom<Model> for Category {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            kind: Kind::try_from(model.kind)?,
            name: model.name,
        })
    }
}
