use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use sync_logging::sync_error;
use url::Url;

use crate::config::{ClientSettings, ServerConfig};
use crate::error::{map_transport_error, ClientError};
use crate::wire::{CategoryEntry, ExtractResult, IndexEntry, SearchQuery, SearchResult};

/// The remote operations consumed by the sync layer.
///
/// A trait so the store can be exercised against a scripted client in tests;
/// production code uses [`RemoteArchiveClient`].
#[async_trait]
pub trait ArchiveClient: Send + Sync {
    async fn fetch_index(&self) -> Result<Vec<IndexEntry>, ClientError>;
    async fn fetch_metadata(&self, id: &str) -> Result<IndexEntry, ClientError>;
    async fn fetch_thumbnail(&self, id: &str) -> Result<Bytes, ClientError>;
    async fn extract(&self, id: &str) -> Result<ExtractResult, ClientError>;
    async fn fetch_page(&self, page_ref: &str) -> Result<Bytes, ClientError>;
    async fn fetch_categories(&self) -> Result<Vec<CategoryEntry>, ClientError>;
    async fn search(&self, query: &SearchQuery) -> Result<SearchResult, ClientError>;
}

/// Stateless-per-call HTTP client for the archive server.
///
/// Every request carries `Authorization: Bearer base64(api_key)`. The key is
/// not validated locally; only the server's response decides whether it was
/// acceptable.
#[derive(Debug, Clone)]
pub struct RemoteArchiveClient {
    http: reqwest::Client,
    base_url: String,
    auth: String,
}

impl RemoteArchiveClient {
    pub fn new(config: ServerConfig) -> Result<Self, ClientError> {
        Self::with_settings(config, ClientSettings::default())
    }

    pub fn with_settings(
        config: ServerConfig,
        settings: ClientSettings,
    ) -> Result<Self, ClientError> {
        Url::parse(&config.base_url).map_err(|err| ClientError::InvalidUrl(err.to_string()))?;
        let base_url = config.base_url.trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ClientError::Network(err.to_string()))?;
        let auth = format!("Bearer {}", BASE64.encode(config.api_key.as_bytes()));
        Ok(Self {
            http,
            base_url,
            auth,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(
        &self,
        op: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, ClientError> {
        let response = request
            .header(AUTHORIZATION, self.auth.as_str())
            .send()
            .await
            .map_err(|err| fail(op, map_transport_error(err)))?;
        let status = response.status();
        if !status.is_success() {
            return Err(fail(op, ClientError::HttpStatus(status.as_u16())));
        }
        Ok(response)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        op: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = self.send(op, request).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| fail(op, ClientError::Decode(err.to_string())))
    }

    async fn get_image(
        &self,
        op: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<Bytes, ClientError> {
        let response = self.send(op, request).await?;
        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
        {
            if !is_image_content_type(content_type) {
                return Err(fail(
                    op,
                    ClientError::UnsupportedContentType(content_type.to_string()),
                ));
            }
        }
        response
            .bytes()
            .await
            .map_err(|err| fail(op, map_transport_error(err)))
    }
}

#[async_trait]
impl ArchiveClient for RemoteArchiveClient {
    async fn fetch_index(&self) -> Result<Vec<IndexEntry>, ClientError> {
        let request = self.http.get(self.api_url("/api/archives"));
        self.get_json("fetch index", request).await
    }

    async fn fetch_metadata(&self, id: &str) -> Result<IndexEntry, ClientError> {
        let request = self
            .http
            .get(self.api_url(&format!("/api/archives/{id}/metadata")));
        self.get_json("fetch metadata", request).await
    }

    async fn fetch_thumbnail(&self, id: &str) -> Result<Bytes, ClientError> {
        let request = self
            .http
            .get(self.api_url(&format!("/api/archives/{id}/thumbnail")));
        self.get_image("fetch thumbnail", request).await
    }

    async fn extract(&self, id: &str) -> Result<ExtractResult, ClientError> {
        let request = self
            .http
            .post(self.api_url(&format!("/api/archives/{id}/extract")));
        self.get_json("extract archive", request).await
    }

    async fn fetch_page(&self, page_ref: &str) -> Result<Bytes, ClientError> {
        let path = page_ref.trim_start_matches('/');
        let request = self.http.get(format!("{}/{}", self.base_url, path));
        self.get_image("fetch page", request).await
    }

    async fn fetch_categories(&self) -> Result<Vec<CategoryEntry>, ClientError> {
        let request = self.http.get(self.api_url("/api/categories"));
        self.get_json("fetch categories", request).await
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchResult, ClientError> {
        let request = self
            .http
            .get(self.api_url("/api/search"))
            .query(&query.to_params());
        self.get_json("search archives", request).await
    }
}

/// Leaves the diagnostic record for a failed call; the error itself goes back
/// to the caller untouched.
fn fail(op: &str, err: ClientError) -> ClientError {
    sync_error!("{op} failed: {err}");
    err
}

// The server labels image downloads `application/x-download`.
fn is_image_content_type(content_type: &str) -> bool {
    let ct = content_type
        .split(';')
        .next()
        .unwrap_or(content_type)
        .trim();
    ct.eq_ignore_ascii_case("application/x-download")
        || ct
            .get(..6)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
}
