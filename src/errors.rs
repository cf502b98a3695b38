use crate::handlers::common::append_failure_alert;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::ValidationErrors;

/// One rejected field of a request body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldErrorBody {
    #[schema(example = "modelo")]
    pub field: String,
    /// Constraint that failed (`required`, `length`, ...)
    #[schema(example = "length")]
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Error body returned by every failing endpoint
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "error": "Bad Request",
    "message": "A new modelo cannot already have an ID",
    "details": "error.idexists",
    "request_id": "9f1c2a0d4e8b4f7a9c3d2e1f0a9b8c7d",
    "timestamp": "2024-12-09T10:30:00.000Z"
}))]
pub struct ErrorResponse {
    /// Reason phrase of the status code
    #[schema(example = "Bad Request")]
    pub error: String,
    pub message: String,
    /// `error.<key>` for rejections that also raise an alert header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Per-field failures of a body that did not validate
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldErrorBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// RFC 3339
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::error::DbErr),

    #[error("{0}")]
    NotFound(String),

    /// Request refers to something that cannot be used, e.g. an unknown marca.
    #[error("{0}")]
    ValidationError(String),

    /// Request body failed its field constraints.
    #[error("Validation failed: {0}")]
    InvalidFields(ValidationErrors),

    /// Rejection tied to an entity, surfaced with alert headers.
    #[error("{message}")]
    BadRequestAlert {
        message: String,
        entity_name: &'static str,
        error_key: &'static str,
    },
}

impl From<ValidationErrors> for ServiceError {
    fn from(err: ValidationErrors) -> Self {
        ServiceError::InvalidFields(err)
    }
}

impl ServiceError {
    pub fn bad_request_alert(
        message: impl Into<String>,
        entity_name: &'static str,
        error_key: &'static str,
    ) -> Self {
        ServiceError::BadRequestAlert {
            message: message.into(),
            entity_name,
            error_key,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) | Self::InvalidFields(_) | Self::BadRequestAlert { .. } => {
                StatusCode::BAD_REQUEST
            }
        }
    }

    /// Message for the response body; server-side failures stay generic.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    fn field_errors(&self) -> Vec<FieldErrorBody> {
        let Self::InvalidFields(errors) = self else {
            return Vec::new();
        };
        let mut fields: Vec<FieldErrorBody> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |err| FieldErrorBody {
                    field: field.to_string(),
                    code: err.code.to_string(),
                    message: err.message.as_ref().map(|m| m.to_string()),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        fields
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, %status, "request rejected");
        }

        let details = match &self {
            Self::BadRequestAlert { error_key, .. } => Some(format!("error.{}", error_key)),
            _ => None,
        };
        let body = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            details,
            field_errors: self.field_errors(),
            request_id: crate::tracing::current_request_id().map(|id| id.to_string()),
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let mut response = (status, Json(body)).into_response();
        if let Self::BadRequestAlert {
            entity_name,
            error_key,
            ..
        } = &self
        {
            append_failure_alert(response.headers_mut(), entity_name, error_key);
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Modelo;
    use axum::body::to_bytes;
    use validator::Validate;

    async fn body_of(response: Response) -> ErrorResponse {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn error_body_echoes_request_id() {
        let response = crate::tracing::scope_request_id(
            crate::tracing::RequestId::new("req-123"),
            async { ServiceError::NotFound("Modelo 4 not found".into()).into_response() },
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let payload = body_of(response).await;
        assert_eq!(payload.request_id.as_deref(), Some("req-123"));
        assert_eq!(payload.message, "Modelo 4 not found");
    }

    #[tokio::test]
    async fn bad_request_alert_sets_error_headers() {
        let response =
            ServiceError::bad_request_alert("Invalid id", "modelo", "idnull").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let headers = response.headers();
        assert_eq!(
            headers.get("x-concesionarioapp-error").unwrap(),
            "error.idnull"
        );
        assert_eq!(headers.get("x-concesionarioapp-params").unwrap(), "modelo");

        let payload = body_of(response).await;
        assert_eq!(payload.message, "Invalid id");
        assert_eq!(payload.details.as_deref(), Some("error.idnull"));
    }

    #[tokio::test]
    async fn invalid_fields_are_listed_in_the_body() {
        let errors = Modelo::default().validate().unwrap_err();
        let response = ServiceError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let payload = body_of(response).await;
        assert_eq!(payload.field_errors.len(), 1);
        assert_eq!(payload.field_errors[0].field, "modelo");
        assert_eq!(payload.field_errors[0].code, "required");
    }

    #[test]
    fn internal_failures_hide_their_cause() {
        let err = ServiceError::from(sea_orm::DbErr::Custom("relation missing".into()));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.response_message(), "Internal server error");
    }
}
