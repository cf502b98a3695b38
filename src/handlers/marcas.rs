use super::common::{
    check_path_id, created_response, deleted_response, paginated_response, unpaged_response,
    updated_response, validate_input, PageInfo, PaginationParams,
};
use crate::{errors::ServiceError, models::Marca, services::marcas::ENTITY_NAME, AppState};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use tracing::debug;

const BASE_PATH: &str = "/api/marcas";

/// Creates the router for brand endpoints
pub fn marcas_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_marcas).post(create_marca))
        .route(
            "/:id",
            get(get_marca)
                .put(update_marca)
                .patch(partial_update_marca)
                .delete(delete_marca),
        )
}

/// Create a new brand
#[utoipa::path(
    post,
    path = "/api/marcas",
    request_body = Marca,
    responses(
        (status = 201, description = "Marca created", body = Marca),
        (status = 400, description = "Invalid payload or id already set", body = crate::errors::ErrorResponse)
    ),
    tag = "Marcas"
)]
pub async fn create_marca(
    State(state): State<AppState>,
    Json(marca): Json<Marca>,
) -> Result<impl IntoResponse, ServiceError> {
    debug!("REST request to save Marca : {:?}", marca);
    if marca.id.is_some() {
        return Err(ServiceError::bad_request_alert(
            "A new marca cannot already have an ID",
            ENTITY_NAME,
            "idexists",
        ));
    }
    validate_input(&marca)?;

    let created = state.services.marcas.create(marca).await?;
    let id = created.id.unwrap_or_default();
    Ok(created_response(
        &format!("{}/{}", BASE_PATH, id),
        ENTITY_NAME,
        id,
        created,
    ))
}

/// Replace an existing brand
#[utoipa::path(
    put,
    path = "/api/marcas/:id",
    params(("id" = i64, Path, description = "Marca ID")),
    request_body = Marca,
    responses(
        (status = 200, description = "Marca updated", body = Marca),
        (status = 400, description = "Invalid id or payload", body = crate::errors::ErrorResponse)
    ),
    tag = "Marcas"
)]
pub async fn update_marca(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(marca): Json<Marca>,
) -> Result<impl IntoResponse, ServiceError> {
    debug!("REST request to update Marca : {}, {:?}", id, marca);
    check_path_id(id, marca.id, ENTITY_NAME)?;
    validate_input(&marca)?;

    let updated = state.services.marcas.update(id, marca).await?;
    Ok(updated_response(ENTITY_NAME, id, updated))
}

/// Update the non-null fields of an existing brand
#[utoipa::path(
    patch,
    path = "/api/marcas/:id",
    params(("id" = i64, Path, description = "Marca ID")),
    request_body(content = Marca, content_type = "application/merge-patch+json"),
    responses(
        (status = 200, description = "Marca updated", body = Marca),
        (status = 400, description = "Invalid id or payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Marca not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Marcas"
)]
pub async fn partial_update_marca(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(marca): Json<Marca>,
) -> Result<impl IntoResponse, ServiceError> {
    debug!("REST request to partial update Marca : {}, {:?}", id, marca);
    check_path_id(id, marca.id, ENTITY_NAME)?;

    let updated = state
        .services
        .marcas
        .partial_update(id, marca)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Marca {} not found", id)))?;
    Ok(updated_response(ENTITY_NAME, id, updated))
}

/// List brands; the whole collection unless `page` or `size` is given
#[utoipa::path(
    get,
    path = "/api/marcas",
    params(PaginationParams),
    responses(
        (status = 200, description = "Marcas ordered by id", body = [Marca])
    ),
    tag = "Marcas"
)]
pub async fn list_marcas(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    debug!("REST request to get Marcas : {:?}", params);
    if params.is_unpaged() {
        let marcas = state.services.marcas.list_all().await?;
        return Ok(unpaged_response(marcas));
    }

    let size = params.page_size(
        state.config.api_default_page_size,
        state.config.api_max_page_size,
    );
    let page = params.page_index(size);
    let result = state.services.marcas.list(page, size).await?;
    let info = PageInfo {
        page,
        size,
        total: result.total,
    };
    Ok(paginated_response(BASE_PATH, info, result.items))
}

/// Get a brand by id
#[utoipa::path(
    get,
    path = "/api/marcas/:id",
    params(("id" = i64, Path, description = "Marca ID")),
    responses(
        (status = 200, description = "Marca found", body = Marca),
        (status = 404, description = "Marca not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Marcas"
)]
pub async fn get_marca(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    debug!("REST request to get Marca : {}", id);
    let marca = state
        .services
        .marcas
        .find(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Marca {} not found", id)))?;
    Ok(Json(marca))
}

/// Delete a brand
#[utoipa::path(
    delete,
    path = "/api/marcas/:id",
    params(("id" = i64, Path, description = "Marca ID")),
    responses(
        (status = 204, description = "Marca deleted"),
        (status = 400, description = "Marca still referenced by a modelo", body = crate::errors::ErrorResponse)
    ),
    tag = "Marcas"
)]
pub async fn delete_marca(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    debug!("REST request to delete Marca : {}", id);
    state.services.marcas.delete(id).await?;
    Ok(deleted_response(ENTITY_NAME, id))
}
