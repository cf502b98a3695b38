use crate::AppState;
use axum::{response::Json, routing::get, Router};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Concesionario API",
        version = "1.0.0",
        description = r#"
# Concesionario API

Manages vehicle brands (marcas) and vehicle models (modelos).

## Alerts

Successful mutations carry `X-concesionarioApp-alert` and `X-concesionarioApp-params`
headers. Rejected requests tied to an entity carry `X-concesionarioApp-error` instead.

## Pagination

List endpoints take a zero-based `page` and a `size`, and answer with
`X-Total-Count` and RFC 5988 `Link` headers.
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Marcas", description = "Vehicle brand endpoints"),
        (name = "Modelos", description = "Vehicle model endpoints")
    ),
    paths(
        // Marcas
        crate::handlers::marcas::create_marca,
        crate::handlers::marcas::update_marca,
        crate::handlers::marcas::partial_update_marca,
        crate::handlers::marcas::list_marcas,
        crate::handlers::marcas::get_marca,
        crate::handlers::marcas::delete_marca,
        // Modelos
        crate::handlers::modelos::create_modelo,
        crate::handlers::modelos::update_modelo,
        crate::handlers::modelos::partial_update_modelo,
        crate::handlers::modelos::list_modelos,
        crate::handlers::modelos::get_modelo,
        crate::handlers::modelos::delete_modelo,
    ),
    components(
        schemas(
            crate::models::Marca,
            crate::models::Modelo,
            crate::errors::ErrorResponse,
            crate::errors::FieldErrorBody
        )
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Serves the generated document at `/api-docs/openapi.json`.
pub fn openapi_routes() -> Router<AppState> {
    Router::new().route("/api-docs/openapi.json", get(openapi_json))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_lists_both_resources() {
        let openapi = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Concesionario API"));
        assert!(json.contains("/api/marcas"));
        assert!(json.contains("/api/modelos"));
        assert!(json.contains("ErrorResponse"));
    }
}
