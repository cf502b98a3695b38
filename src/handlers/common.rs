use crate::errors::ServiceError;
use crate::services::MAX_ROW_OFFSET;
use crate::APPLICATION_NAME;
use axum::{
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::IntoParams;
use validator::Validate;

/// Header carrying the total element count of a paginated list
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// Builds the `X-<application>-<suffix>` header name.
pub fn app_header(suffix: &str) -> HeaderName {
    let name = format!("x-{}-{}", APPLICATION_NAME, suffix).to_ascii_lowercase();
    // APPLICATION_NAME and every suffix used here are plain ASCII tokens
    HeaderName::from_bytes(name.as_bytes()).expect("application header name is a valid token")
}

fn insert_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => tracing::warn!(header = %name, "dropping header with non-visible characters"),
    }
}

/// Which lifecycle event an alert reports
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityAction {
    Created,
    Updated,
    Deleted,
}

impl EntityAction {
    fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
        }
    }
}

/// Adds `X-<app>-alert: <app>.<entity>.<action>` and `X-<app>-params: <id>`.
pub fn append_entity_alert(
    headers: &mut HeaderMap,
    entity_name: &str,
    action: EntityAction,
    id: impl ToString,
) {
    let alert = format!("{}.{}.{}", APPLICATION_NAME, entity_name, action.as_str());
    insert_header(headers, app_header("alert"), &alert);
    insert_header(headers, app_header("params"), &id.to_string());
}

/// Adds `X-<app>-error: error.<key>` and `X-<app>-params: <entity>`.
pub fn append_failure_alert(headers: &mut HeaderMap, entity_name: &str, error_key: &str) {
    insert_header(headers, app_header("error"), &format!("error.{}", error_key));
    insert_header(headers, app_header("params"), entity_name);
}

/// Standard success response
pub fn success_response<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(data)).into_response()
}

/// 201 with a `Location` header and a creation alert
pub fn created_response<T: Serialize>(
    location: &str,
    entity_name: &str,
    id: i64,
    data: T,
) -> Response {
    let mut response = (StatusCode::CREATED, Json(data)).into_response();
    let headers = response.headers_mut();
    insert_header(headers, header::LOCATION, location);
    append_entity_alert(headers, entity_name, EntityAction::Created, id);
    response
}

/// 200 with an update alert
pub fn updated_response<T: Serialize>(entity_name: &str, id: i64, data: T) -> Response {
    let mut response = success_response(data);
    append_entity_alert(
        response.headers_mut(),
        entity_name,
        EntityAction::Updated,
        id,
    );
    response
}

/// 204 with a deletion alert
pub fn deleted_response(entity_name: &str, id: i64) -> Response {
    let mut response = StatusCode::NO_CONTENT.into_response();
    append_entity_alert(
        response.headers_mut(),
        entity_name,
        EntityAction::Deleted,
        id,
    );
    response
}

/// Runs the body's field constraints.
pub fn validate_input<T: Validate>(input: &T) -> Result<(), ServiceError> {
    input.validate().map_err(ServiceError::InvalidFields)
}

/// Rejects a body whose id does not match the path id, or has none.
pub fn check_path_id(
    path_id: i64,
    body_id: Option<i64>,
    entity_name: &'static str,
) -> Result<(), ServiceError> {
    match body_id {
        None => Err(ServiceError::bad_request_alert(
            "Invalid id",
            entity_name,
            "idnull",
        )),
        Some(id) if id != path_id => Err(ServiceError::bad_request_alert(
            "Invalid ID",
            entity_name,
            "idinvalid",
        )),
        Some(_) => Ok(()),
    }
}

/// Zero-based pagination parameters for list operations
#[derive(Debug, Default, Deserialize, Serialize, IntoParams)]
pub struct PaginationParams {
    /// Page index, starting at 0
    pub page: Option<u64>,
    /// Page size; falls back to the configured default
    pub size: Option<u64>,
}

impl PaginationParams {
    /// True when the caller asked for neither a page nor a size.
    pub fn is_unpaged(&self) -> bool {
        self.page.is_none() && self.size.is_none()
    }

    /// Requested page, lowered so its first row offset still fits the database.
    pub fn page_index(&self, size: u64) -> u64 {
        self.page
            .unwrap_or(0)
            .min(MAX_ROW_OFFSET / size.max(1))
    }

    /// Resolved page size, never zero and never above `max_size`.
    pub fn page_size(&self, default_size: u64, max_size: u64) -> u64 {
        self.size.unwrap_or(default_size).clamp(1, max_size.max(1))
    }
}

/// One page of a list query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub page: u64,
    pub size: u64,
    pub total: u64,
}

impl PageInfo {
    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            0
        } else {
            self.total.div_ceil(self.size)
        }
    }

    /// RFC 5988 `Link` value with next, prev, last and first relations.
    pub fn link_header(&self, base_path: &str) -> String {
        let link = |page: u64, rel: &str| {
            format!(
                "<{}?page={}&size={}>; rel=\"{}\"",
                base_path, page, self.size, rel
            )
        };

        let total_pages = self.total_pages();
        let mut links = Vec::with_capacity(4);
        if let Some(next) = self.page.checked_add(1).filter(|next| *next < total_pages) {
            links.push(link(next, "next"));
        }
        if self.page > 0 {
            links.push(link(self.page - 1, "prev"));
        }
        links.push(link(total_pages.saturating_sub(1), "last"));
        links.push(link(0, "first"));
        links.join(",")
    }
}

/// 200 with a JSON page body plus `X-Total-Count` and `Link` headers
pub fn paginated_response<T: Serialize>(base_path: &str, info: PageInfo, data: Vec<T>) -> Response {
    let mut response = success_response(data);
    let headers = response.headers_mut();
    insert_header(
        headers,
        HeaderName::from_static(TOTAL_COUNT_HEADER),
        &info.total.to_string(),
    );
    insert_header(headers, header::LINK, &info.link_header(base_path));
    response
}

/// 200 with the whole collection and its `X-Total-Count`
pub fn unpaged_response<T: Serialize>(data: Vec<T>) -> Response {
    let total = data.len();
    let mut response = success_response(data);
    insert_header(
        response.headers_mut(),
        HeaderName::from_static(TOTAL_COUNT_HEADER),
        &total.to_string(),
    );
    response
}
