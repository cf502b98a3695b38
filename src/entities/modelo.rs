use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::models;

/// Modelo row; the brand is referenced by `marca_id`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "modelo")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub modelo: String,

    pub color: Option<String>,

    pub potencia: Option<i32>,

    pub plazas: Option<i32>,

    #[sea_orm(column_type = "Double", nullable)]
    pub precio: Option<f64>,

    pub numero_serie: Option<String>,

    pub marca_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::marca::Entity",
        from = "Column::MarcaId",
        to = "super::marca::Column::Id"
    )]
    Marca,
}

impl Related<super::marca::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Marca.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Builds the wire shape, embedding the referenced brand row if loaded.
    pub fn into_dto(self, marca: Option<super::marca::Model>) -> models::Modelo {
        models::Modelo {
            id: Some(self.id),
            modelo: Some(self.modelo),
            color: self.color,
            potencia: self.potencia,
            plazas: self.plazas,
            precio: self.precio,
            marca: marca.map(Into::into),
            numero_serie: self.numero_serie,
        }
    }
}
