//! Typed HTTP client for the `/api/marcas` and `/api/modelos` resources.
//!
//! [`MarcaApi`] and [`ModeloApi`] are the seams the update workflow depends
//! on; [`RestClient`] implements both over `reqwest`.

use crate::config::AppConfig;
use crate::errors::ErrorResponse;
use crate::handlers::common::{app_header, PaginationParams};
use crate::models::{Marca, Modelo};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

const MARCAS_PATH: &str = "api/marcas";
const MODELOS_PATH: &str = "api/modelos";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request failed with status {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("{0} has no id")]
    MissingId(&'static str),
}

impl ClientError {
    /// HTTP status of a rejected request, if the server answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Http(err) => err.status(),
            _ => None,
        }
    }
}

/// Brand operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MarcaApi: Send + Sync {
    /// Every brand, ordered by id
    async fn query(&self) -> Result<Vec<Marca>, ClientError>;
    async fn find(&self, id: i64) -> Result<Marca, ClientError>;
    async fn create(&self, marca: Marca) -> Result<Marca, ClientError>;
    /// Replaces the brand identified by `marca.id`
    async fn update(&self, marca: Marca) -> Result<Marca, ClientError>;
    async fn delete(&self, id: i64) -> Result<(), ClientError>;
}

/// Vehicle model operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModeloApi: Send + Sync {
    async fn query(&self, params: PaginationParams) -> Result<Vec<Modelo>, ClientError>;
    async fn find(&self, id: i64) -> Result<Modelo, ClientError>;
    async fn create(&self, modelo: Modelo) -> Result<Modelo, ClientError>;
    /// Replaces the modelo identified by `modelo.id`
    async fn update(&self, modelo: Modelo) -> Result<Modelo, ClientError>;
    /// Overwrites only the non-null fields of `modelo`
    async fn partial_update(&self, modelo: Modelo) -> Result<Modelo, ClientError>;
    async fn delete(&self, id: i64) -> Result<(), ClientError>;
}

/// `reqwest`-backed implementation of both entity APIs.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RestClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let mut base_url = Url::parse(base_url)?;
        // Url::join replaces the last segment unless the path ends with '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("concesionario/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn from_config(cfg: &AppConfig) -> Result<Self, ClientError> {
        Self::new(&cfg.api_base_url, cfg.client_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    /// Turns non-2xx responses into [`ClientError::Status`].
    async fn check(response: Response) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let alert_key = response
            .headers()
            .get(app_header("error"))
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.unwrap_or_default();
        let message = serde_json::from_slice::<ErrorResponse>(&body)
            .map(|err| err.message)
            .ok()
            .or(alert_key)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());

        warn!(status = %status, message = %message, "API request rejected");
        Err(ClientError::Status { status, message })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ClientError> {
        debug!(%url, "GET");
        let response = self.http.get(url).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn send_json<B, T>(
        &self,
        method: reqwest::Method,
        url: Url,
        body: &B,
    ) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(%url, %method, "sending JSON body");
        let response = self.http.request(method, url).json(body).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn delete_at(&self, url: Url) -> Result<(), ClientError> {
        debug!(%url, "DELETE");
        let response = self.http.delete(url).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl MarcaApi for RestClient {
    #[instrument(skip(self))]
    async fn query(&self) -> Result<Vec<Marca>, ClientError> {
        self.get_json(self.endpoint(MARCAS_PATH)?).await
    }

    #[instrument(skip(self))]
    async fn find(&self, id: i64) -> Result<Marca, ClientError> {
        self.get_json(self.endpoint(&format!("{}/{}", MARCAS_PATH, id))?)
            .await
    }

    #[instrument(skip(self))]
    async fn create(&self, marca: Marca) -> Result<Marca, ClientError> {
        let url = self.endpoint(MARCAS_PATH)?;
        self.send_json(reqwest::Method::POST, url, &marca).await
    }

    #[instrument(skip(self))]
    async fn update(&self, marca: Marca) -> Result<Marca, ClientError> {
        let id = marca.id.ok_or(ClientError::MissingId("marca"))?;
        let url = self.endpoint(&format!("{}/{}", MARCAS_PATH, id))?;
        self.send_json(reqwest::Method::PUT, url, &marca).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<(), ClientError> {
        self.delete_at(self.endpoint(&format!("{}/{}", MARCAS_PATH, id))?)
            .await
    }
}

#[async_trait]
impl ModeloApi for RestClient {
    #[instrument(skip(self))]
    async fn query(&self, params: PaginationParams) -> Result<Vec<Modelo>, ClientError> {
        let mut url = self.endpoint(MODELOS_PATH)?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(page) = params.page {
                pairs.append_pair("page", &page.to_string());
            }
            if let Some(size) = params.size {
                pairs.append_pair("size", &size.to_string());
            }
        }
        if url.query() == Some("") {
            url.set_query(None);
        }
        self.get_json(url).await
    }

    #[instrument(skip(self))]
    async fn find(&self, id: i64) -> Result<Modelo, ClientError> {
        self.get_json(self.endpoint(&format!("{}/{}", MODELOS_PATH, id))?)
            .await
    }

    #[instrument(skip(self))]
    async fn create(&self, modelo: Modelo) -> Result<Modelo, ClientError> {
        let url = self.endpoint(MODELOS_PATH)?;
        self.send_json(reqwest::Method::POST, url, &modelo).await
    }

    #[instrument(skip(self))]
    async fn update(&self, modelo: Modelo) -> Result<Modelo, ClientError> {
        let id = modelo.id.ok_or(ClientError::MissingId("modelo"))?;
        let url = self.endpoint(&format!("{}/{}", MODELOS_PATH, id))?;
        self.send_json(reqwest::Method::PUT, url, &modelo).await
    }

    #[instrument(skip(self))]
    async fn partial_update(&self, modelo: Modelo) -> Result<Modelo, ClientError> {
        let id = modelo.id.ok_or(ClientError::MissingId("modelo"))?;
        let url = self.endpoint(&format!("{}/{}", MODELOS_PATH, id))?;
        debug!(%url, "PATCH");
        let response = self
            .http
            .patch(url)
            .header(reqwest::header::CONTENT_TYPE, "application/merge-patch+json")
            .body(serde_json::to_vec(&modelo)?)
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: i64) -> Result<(), ClientError> {
        self.delete_at(self.endpoint(&format!("{}/{}", MODELOS_PATH, id))?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> RestClient {
        RestClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn base_url_gains_trailing_slash() {
        let client =
            RestClient::new("http://localhost:8080/backend", Duration::from_secs(1)).unwrap();
        assert_eq!(
            client.endpoint(MARCAS_PATH).unwrap().as_str(),
            "http://localhost:8080/backend/api/marcas"
        );
    }

    #[tokio::test]
    async fn marca_query_returns_collection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/marcas"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "marca": "Seat"},
                {"id": 3, "marca": "Honda"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let marcas = MarcaApi::query(&client(&server)).await.unwrap();
        assert_eq!(
            marcas,
            vec![Marca::new(Some(1), "Seat"), Marca::new(Some(3), "Honda")]
        );
    }

    #[tokio::test]
    async fn modelo_create_posts_without_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/modelos"))
            .and(body_json(json!({
                "id": null,
                "modelo": "Civic Type R",
                "color": null,
                "potencia": null,
                "plazas": null,
                "precio": null,
                "marca": {"id": 3, "marca": "Honda"},
                "numero_serie": null
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": 11,
                "modelo": "Civic Type R",
                "marca": {"id": 3, "marca": "Honda"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let draft = Modelo {
            modelo: Some("Civic Type R".into()),
            marca: Some(Marca::new(Some(3), "Honda")),
            ..Default::default()
        };
        let created = ModeloApi::create(&client(&server), draft).await.unwrap();
        assert_eq!(created.id, Some(11));
    }

    #[tokio::test]
    async fn modelo_update_puts_to_record_id() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/api/modelos/7"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 7,
                "modelo": "Leon FR"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let record = Modelo {
            id: Some(7),
            modelo: Some("Leon FR".into()),
            ..Default::default()
        };
        let updated = ModeloApi::update(&client(&server), record).await.unwrap();
        assert_eq!(updated.modelo.as_deref(), Some("Leon FR"));
    }

    #[tokio::test]
    async fn update_without_id_never_hits_the_network() {
        let server = MockServer::start().await;
        let result = ModeloApi::update(&client(&server), Modelo::default()).await;
        assert_matches!(result, Err(ClientError::MissingId("modelo")));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn partial_update_uses_merge_patch_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/modelos/7"))
            .and(header("content-type", "application/merge-patch+json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 7,
                "modelo": "Leon FR",
                "color": "Rojo"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let patch = Modelo {
            id: Some(7),
            color: Some("Rojo".into()),
            ..Default::default()
        };
        let updated = client(&server).partial_update(patch).await.unwrap();
        assert_eq!(updated.color.as_deref(), Some("Rojo"));
    }

    #[tokio::test]
    async fn modelo_query_sends_page_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/modelos"))
            .and(query_param("page", "1"))
            .and(query_param("size", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let params = PaginationParams {
            page: Some(1),
            size: Some(5),
        };
        let modelos = ModeloApi::query(&client(&server), params).await.unwrap();
        assert!(modelos.is_empty());
    }

    #[tokio::test]
    async fn error_body_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/modelos"))
            .respond_with(
                ResponseTemplate::new(400)
                    .insert_header("x-concesionarioapp-error", "error.idexists")
                    .set_body_json(json!({
                        "error": "Bad Request",
                        "message": "A new modelo cannot already have an ID",
                        "details": "error.idexists",
                        "timestamp": "2024-12-09T10:30:00Z"
                    })),
            )
            .mount(&server)
            .await;

        let err = ModeloApi::create(
            &client(&server),
            Modelo {
                id: Some(1),
                modelo: Some("Ibiza".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
        assert_matches!(
            err,
            ClientError::Status { message, .. }
                if message == "A new modelo cannot already have an ID"
        );
    }

    #[tokio::test]
    async fn alert_header_is_used_when_body_is_not_json() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/marcas/4"))
            .respond_with(
                ResponseTemplate::new(400)
                    .insert_header("x-concesionarioapp-error", "error.idnotfound")
                    .set_body_string("nope"),
            )
            .mount(&server)
            .await;

        let err = MarcaApi::delete(&client(&server), 4).await.unwrap_err();
        assert_matches!(
            err,
            ClientError::Status { status, message }
                if status == StatusCode::BAD_REQUEST && message == "error.idnotfound"
        );
    }
}
