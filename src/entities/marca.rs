use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models;

/// Marca row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "marca")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub marca: String,
}

/// Marca does not know which modelos reference it.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for models::Marca {
    fn from(row: Model) -> Self {
        models::Marca {
            id: Some(row.id),
            marca: Some(row.marca),
        }
    }
}
