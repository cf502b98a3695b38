use super::{add_to_collection_if_missing, Identifiable};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// A vehicle brand.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct Marca {
    /// Database identifier, unset until persisted
    #[serde(default)]
    #[schema(example = 3)]
    pub id: Option<i64>,

    /// Display name
    #[serde(default)]
    #[validate(
        required,
        length(min = 1, max = 20, message = "marca must be between 1 and 20 characters")
    )]
    #[schema(example = "Honda")]
    pub marca: Option<String>,
}

impl Marca {
    pub fn new(id: Option<i64>, marca: impl Into<String>) -> Self {
        Self {
            id,
            marca: Some(marca.into()),
        }
    }

    /// Persisted-entity identity: both ids set and equal.
    pub fn same_entity(&self, other: &Marca) -> bool {
        matches!((self.id, other.id), (Some(a), Some(b)) if a == b)
    }
}

impl Identifiable for Marca {
    fn identifier(&self) -> Option<i64> {
        self.id
    }
}

pub fn get_marca_identifier(marca: &Marca) -> Option<i64> {
    marca.id
}

/// Keeps a selected brand visible in a picklist that may not contain it.
pub fn add_marca_to_collection_if_missing(
    collection: Vec<Marca>,
    candidate: Option<&Marca>,
) -> Vec<Marca> {
    add_to_collection_if_missing(collection, candidate)
}
