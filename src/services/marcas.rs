use super::Page;
use crate::{
    db::DbPool,
    entities::{marca, modelo},
    errors::ServiceError,
    handlers::common::validate_input,
    models::Marca,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DbErr, EntityTrait, NotSet, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, SqlErr,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub const ENTITY_NAME: &str = "marca";

/// Service for managing brands
#[derive(Clone)]
pub struct MarcaService {
    db_pool: Arc<DbPool>,
}

impl MarcaService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    fn not_found_alert() -> ServiceError {
        ServiceError::bad_request_alert("Entity not found", ENTITY_NAME, "idnotfound")
    }

    fn in_use_alert() -> ServiceError {
        ServiceError::bad_request_alert(
            "Marca is still referenced by modelos",
            ENTITY_NAME,
            "marcainuse",
        )
    }

    /// Persists a new brand; any id on the input is ignored.
    #[instrument(skip(self))]
    pub async fn create(&self, input: Marca) -> Result<Marca, ServiceError> {
        validate_input(&input)?;
        let db = &*self.db_pool;

        let row = marca::ActiveModel {
            id: NotSet,
            marca: Set(input.marca.unwrap_or_default()),
        }
        .insert(db)
        .await?;

        info!(marca_id = row.id, "marca created");
        Ok(row.into())
    }

    /// Replaces every field of an existing brand.
    #[instrument(skip(self))]
    pub async fn update(&self, id: i64, input: Marca) -> Result<Marca, ServiceError> {
        validate_input(&input)?;
        let db = &*self.db_pool;

        if !self.exists(id).await? {
            return Err(Self::not_found_alert());
        }

        let row = marca::ActiveModel {
            id: Set(id),
            marca: Set(input.marca.unwrap_or_default()),
        }
        .update(db)
        .await?;

        info!(marca_id = id, "marca updated");
        Ok(row.into())
    }

    /// Overwrites only the fields present in `patch`.
    ///
    /// Returns `Ok(None)` when the row disappears between the existence check
    /// and the read.
    #[instrument(skip(self))]
    pub async fn partial_update(
        &self,
        id: i64,
        patch: Marca,
    ) -> Result<Option<Marca>, ServiceError> {
        let db = &*self.db_pool;

        if !self.exists(id).await? {
            return Err(Self::not_found_alert());
        }

        let Some(existing) = marca::Entity::find_by_id(id).one(db).await? else {
            return Ok(None);
        };

        let mut merged: Marca = existing.clone().into();
        if let Some(name) = patch.marca {
            merged.marca = Some(name);
        }
        validate_input(&merged)?;

        let mut active: marca::ActiveModel = existing.into();
        if let Some(name) = merged.marca {
            active.marca = Set(name);
        }
        let row = active.update(db).await?;

        info!(marca_id = id, "marca partially updated");
        Ok(Some(row.into()))
    }

    /// Gets a brand by id
    #[instrument(skip(self))]
    pub async fn find(&self, id: i64) -> Result<Option<Marca>, ServiceError> {
        let db = &*self.db_pool;
        let row = marca::Entity::find_by_id(id).one(db).await?;
        Ok(row.map(Into::into))
    }

    #[instrument(skip(self))]
    pub async fn exists(&self, id: i64) -> Result<bool, ServiceError> {
        let db = &*self.db_pool;
        let count = marca::Entity::find_by_id(id).count(db).await?;
        Ok(count > 0)
    }

    /// Every brand, ordered by id
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Marca>, ServiceError> {
        let db = &*self.db_pool;
        let rows = marca::Entity::find()
            .order_by_asc(marca::Column::Id)
            .all(db)
            .await?;
        debug!(count = rows.len(), "listed all marcas");
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// One page of brands, ordered by id
    #[instrument(skip(self))]
    pub async fn list(&self, page: u64, size: u64) -> Result<Page<Marca>, ServiceError> {
        let db = &*self.db_pool;
        let total = marca::Entity::find().count(db).await?;
        let rows = marca::Entity::find()
            .order_by_asc(marca::Column::Id)
            .limit(size)
            .offset(super::row_offset(page, size))
            .all(db)
            .await?;

        Ok(Page {
            items: rows.into_iter().map(Into::into).collect(),
            total,
        })
    }

    /// Deletes a brand; deleting a missing id is not an error.
    ///
    /// A brand that any modelo still points at is kept and reported as
    /// `marcainuse`.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let references = modelo::Entity::find()
            .filter(modelo::Column::MarcaId.eq(id))
            .count(db)
            .await?;
        if references > 0 {
            debug!(marca_id = id, references, "marca still referenced");
            return Err(Self::in_use_alert());
        }

        let result = marca::Entity::delete_by_id(id)
            .exec(db)
            .await
            .map_err(|e: DbErr| match e.sql_err() {
                // a modelo was linked between the check and the delete
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => Self::in_use_alert(),
                _ => e.into(),
            })?;
        info!(marca_id = id, rows = result.rows_affected, "marca deleted");
        Ok(())
    }
}
