use super::common::{
    check_path_id, created_response, deleted_response, paginated_response, updated_response,
    validate_input, PageInfo, PaginationParams,
};
use crate::{errors::ServiceError, models::Modelo, services::modelos::ENTITY_NAME, AppState};
use axum::{
    extract::{Json, Path, Query, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use tracing::debug;

const BASE_PATH: &str = "/api/modelos";

/// Creates the router for vehicle model endpoints
pub fn modelos_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_modelos).post(create_modelo))
        .route(
            "/:id",
            get(get_modelo)
                .put(update_modelo)
                .patch(partial_update_modelo)
                .delete(delete_modelo),
        )
}

/// Create a new modelo
#[utoipa::path(
    post,
    path = "/api/modelos",
    request_body = Modelo,
    responses(
        (status = 201, description = "Modelo created", body = Modelo),
        (status = 400, description = "Invalid payload, id already set or unknown marca", body = crate::errors::ErrorResponse)
    ),
    tag = "Modelos"
)]
pub async fn create_modelo(
    State(state): State<AppState>,
    Json(modelo): Json<Modelo>,
) -> Result<impl IntoResponse, ServiceError> {
    debug!("REST request to save Modelo : {:?}", modelo);
    if modelo.id.is_some() {
        return Err(ServiceError::bad_request_alert(
            "A new modelo cannot already have an ID",
            ENTITY_NAME,
            "idexists",
        ));
    }
    validate_input(&modelo)?;

    let created = state.services.modelos.create(modelo).await?;
    let id = created.id.unwrap_or_default();
    Ok(created_response(
        &format!("{}/{}", BASE_PATH, id),
        ENTITY_NAME,
        id,
        created,
    ))
}

/// Replace an existing modelo
#[utoipa::path(
    put,
    path = "/api/modelos/:id",
    params(("id" = i64, Path, description = "Modelo ID")),
    request_body = Modelo,
    responses(
        (status = 200, description = "Modelo updated", body = Modelo),
        (status = 400, description = "Invalid id or payload", body = crate::errors::ErrorResponse)
    ),
    tag = "Modelos"
)]
pub async fn update_modelo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(modelo): Json<Modelo>,
) -> Result<impl IntoResponse, ServiceError> {
    debug!("REST request to update Modelo : {}, {:?}", id, modelo);
    check_path_id(id, modelo.id, ENTITY_NAME)?;
    validate_input(&modelo)?;

    let updated = state.services.modelos.update(id, modelo).await?;
    Ok(updated_response(ENTITY_NAME, id, updated))
}

/// Update the non-null fields of an existing modelo
#[utoipa::path(
    patch,
    path = "/api/modelos/:id",
    params(("id" = i64, Path, description = "Modelo ID")),
    request_body(content = Modelo, content_type = "application/merge-patch+json"),
    responses(
        (status = 200, description = "Modelo updated", body = Modelo),
        (status = 400, description = "Invalid id or payload", body = crate::errors::ErrorResponse),
        (status = 404, description = "Modelo not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Modelos"
)]
pub async fn partial_update_modelo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(modelo): Json<Modelo>,
) -> Result<impl IntoResponse, ServiceError> {
    debug!("REST request to partial update Modelo : {}, {:?}", id, modelo);
    check_path_id(id, modelo.id, ENTITY_NAME)?;

    let updated = state
        .services
        .modelos
        .partial_update(id, modelo)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Modelo {} not found", id)))?;
    Ok(updated_response(ENTITY_NAME, id, updated))
}

/// Get a page of modelos
#[utoipa::path(
    get,
    path = "/api/modelos",
    params(PaginationParams),
    responses(
        (status = 200, description = "Modelos ordered by id, with X-Total-Count and Link headers", body = [Modelo])
    ),
    tag = "Modelos"
)]
pub async fn list_modelos(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> Result<impl IntoResponse, ServiceError> {
    debug!("REST request to get a page of Modelos : {:?}", params);
    let size = params.page_size(
        state.config.api_default_page_size,
        state.config.api_max_page_size,
    );
    let page = params.page_index(size);

    let result = state.services.modelos.list(page, size).await?;
    let info = PageInfo {
        page,
        size,
        total: result.total,
    };
    Ok(paginated_response(BASE_PATH, info, result.items))
}

/// Get a modelo by id
#[utoipa::path(
    get,
    path = "/api/modelos/:id",
    params(("id" = i64, Path, description = "Modelo ID")),
    responses(
        (status = 200, description = "Modelo found", body = Modelo),
        (status = 404, description = "Modelo not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Modelos"
)]
pub async fn get_modelo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    debug!("REST request to get Modelo : {}", id);
    let modelo = state
        .services
        .modelos
        .find(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Modelo {} not found", id)))?;
    Ok(Json(modelo))
}

/// Delete a modelo
#[utoipa::path(
    delete,
    path = "/api/modelos/:id",
    params(("id" = i64, Path, description = "Modelo ID")),
    responses(
        (status = 204, description = "Modelo deleted")
    ),
    tag = "Modelos"
)]
pub async fn delete_modelo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ServiceError> {
    debug!("REST request to delete Modelo : {}", id);
    state.services.modelos.delete(id).await?;
    Ok(deleted_response(ENTITY_NAME, id))
}
