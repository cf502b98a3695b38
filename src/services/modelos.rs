use super::Page;
use crate::{
    db::DbPool,
    entities::{marca, modelo},
    errors::ServiceError,
    handlers::common::validate_input,
    models::{Marca, Modelo},
};
use sea_orm::{
    ActiveModelTrait, EntityTrait, NotSet, PaginatorTrait, QueryOrder, QuerySelect, Set,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub const ENTITY_NAME: &str = "modelo";

/// Service for managing vehicle models and their brand reference
#[derive(Clone)]
pub struct ModeloService {
    db_pool: Arc<DbPool>,
}

impl ModeloService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    fn not_found_alert() -> ServiceError {
        ServiceError::bad_request_alert("Entity not found", ENTITY_NAME, "idnotfound")
    }

    /// Loads the brand row a modelo points at, rejecting dangling references.
    async fn resolve_marca(
        &self,
        reference: Option<&Marca>,
    ) -> Result<Option<marca::Model>, ServiceError> {
        let Some(reference) = reference else {
            return Ok(None);
        };
        let Some(marca_id) = reference.id else {
            return Err(ServiceError::ValidationError(
                "marca must reference a persisted brand".to_string(),
            ));
        };

        let db = &*self.db_pool;
        match marca::Entity::find_by_id(marca_id).one(db).await? {
            Some(row) => Ok(Some(row)),
            None => {
                warn!(marca_id, "modelo references unknown marca");
                Err(ServiceError::ValidationError(format!(
                    "marca {} does not exist",
                    marca_id
                )))
            }
        }
    }

    async fn load_marca(
        &self,
        marca_id: Option<i64>,
    ) -> Result<Option<marca::Model>, ServiceError> {
        let Some(marca_id) = marca_id else {
            return Ok(None);
        };
        let db = &*self.db_pool;
        Ok(marca::Entity::find_by_id(marca_id).one(db).await?)
    }

    /// Persists a new modelo; any id on the input is ignored.
    #[instrument(skip(self))]
    pub async fn create(&self, input: Modelo) -> Result<Modelo, ServiceError> {
        validate_input(&input)?;
        let marca = self.resolve_marca(input.marca.as_ref()).await?;
        let db = &*self.db_pool;

        let row = modelo::ActiveModel {
            id: NotSet,
            modelo: Set(input.modelo.unwrap_or_default()),
            color: Set(input.color),
            potencia: Set(input.potencia),
            plazas: Set(input.plazas),
            precio: Set(input.precio),
            numero_serie: Set(input.numero_serie),
            marca_id: Set(marca.as_ref().map(|m| m.id)),
        }
        .insert(db)
        .await?;

        info!(modelo_id = row.id, "modelo created");
        Ok(row.into_dto(marca))
    }

    /// Replaces every field of an existing modelo, including its brand.
    #[instrument(skip(self))]
    pub async fn update(&self, id: i64, input: Modelo) -> Result<Modelo, ServiceError> {
        validate_input(&input)?;
        if !self.exists(id).await? {
            return Err(Self::not_found_alert());
        }
        let marca = self.resolve_marca(input.marca.as_ref()).await?;
        let db = &*self.db_pool;

        let row = modelo::ActiveModel {
            id: Set(id),
            modelo: Set(input.modelo.unwrap_or_default()),
            color: Set(input.color),
            potencia: Set(input.potencia),
            plazas: Set(input.plazas),
            precio: Set(input.precio),
            numero_serie: Set(input.numero_serie),
            marca_id: Set(marca.as_ref().map(|m| m.id)),
        }
        .update(db)
        .await?;

        info!(modelo_id = id, "modelo updated");
        Ok(row.into_dto(marca))
    }

    /// Overwrites only the scalar fields present in `patch`; the brand
    /// reference is left as stored.
    ///
    /// Returns `Ok(None)` when the row disappears between the existence check
    /// and the read.
    #[instrument(skip(self))]
    pub async fn partial_update(
        &self,
        id: i64,
        patch: Modelo,
    ) -> Result<Option<Modelo>, ServiceError> {
        if !self.exists(id).await? {
            return Err(Self::not_found_alert());
        }
        let db = &*self.db_pool;

        let Some(existing) = modelo::Entity::find_by_id(id).one(db).await? else {
            return Ok(None);
        };

        let existing_row = existing.clone();
        let mut active: modelo::ActiveModel = existing.clone().into();
        let mut merged = existing.into_dto(None);
        if let Some(name) = patch.modelo {
            merged.modelo = Some(name.clone());
            active.modelo = Set(name);
        }
        if patch.color.is_some() {
            merged.color = patch.color.clone();
            active.color = Set(patch.color);
        }
        if patch.potencia.is_some() {
            merged.potencia = patch.potencia;
            active.potencia = Set(patch.potencia);
        }
        if patch.plazas.is_some() {
            merged.plazas = patch.plazas;
            active.plazas = Set(patch.plazas);
        }
        if patch.precio.is_some() {
            merged.precio = patch.precio;
            active.precio = Set(patch.precio);
        }
        if patch.numero_serie.is_some() {
            merged.numero_serie = patch.numero_serie.clone();
            active.numero_serie = Set(patch.numero_serie);
        }
        validate_input(&merged)?;

        let row = if active.is_changed() {
            active.update(db).await?
        } else {
            existing_row
        };
        let marca = self.load_marca(row.marca_id).await?;

        info!(modelo_id = id, "modelo partially updated");
        Ok(Some(row.into_dto(marca)))
    }

    /// Gets a modelo by id with its brand embedded
    #[instrument(skip(self))]
    pub async fn find(&self, id: i64) -> Result<Option<Modelo>, ServiceError> {
        let db = &*self.db_pool;
        let row = modelo::Entity::find_by_id(id)
            .find_also_related(marca::Entity)
            .one(db)
            .await?;
        Ok(row.map(|(modelo, marca)| modelo.into_dto(marca)))
    }

    #[instrument(skip(self))]
    pub async fn exists(&self, id: i64) -> Result<bool, ServiceError> {
        let db = &*self.db_pool;
        let count = modelo::Entity::find_by_id(id).count(db).await?;
        Ok(count > 0)
    }

    /// One page of modelos ordered by id, each with its brand embedded
    #[instrument(skip(self))]
    pub async fn list(&self, page: u64, size: u64) -> Result<Page<Modelo>, ServiceError> {
        let db = &*self.db_pool;
        let total = modelo::Entity::find().count(db).await?;
        let rows = modelo::Entity::find()
            .find_also_related(marca::Entity)
            .order_by_asc(modelo::Column::Id)
            .limit(size)
            .offset(super::row_offset(page, size))
            .all(db)
            .await?;
        debug!(count = rows.len(), total, "listed modelos");

        Ok(Page {
            items: rows
                .into_iter()
                .map(|(modelo, marca)| modelo.into_dto(marca))
                .collect(),
            total,
        })
    }

    /// Deletes a modelo; deleting a missing id is not an error.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        let db = &*self.db_pool;
        let result = modelo::Entity::delete_by_id(id).exec(db).await?;
        info!(modelo_id = id, rows = result.rows_affected, "modelo deleted");
        Ok(())
    }
}
