//! HTTP client for the FortiSOAR API

use fsr_core::errors::{FsrError, FsrResult};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, error};

/// Reasons a client session cannot be constructed
#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid server URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("token is not a valid HTTP header value")]
    InvalidToken,

    #[error("failed to create HTTP client: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Parse the configured server into a base URL.
///
/// A bare host such as `soar.example.com` is treated as `https://`.
pub fn parse_server(server: &str) -> Result<Url, ClientBuildError> {
    let server = server.trim();
    let candidate = if server.contains("://") {
        server.to_string()
    } else {
        format!("https://{}", server)
    };

    let url = Url::parse(&candidate).map_err(|e| ClientBuildError::InvalidUrl {
        url: server.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(ClientBuildError::InvalidUrl {
            url: server.to_string(),
            reason: "expected an http or https address".to_string(),
        }),
    }
}

/// Join an API path onto the base URL
pub fn endpoint_url(base_url: &Url, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    let base = base_url.as_str().trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// Authenticated session against one FortiSOAR server
pub struct FortiSoarClient {
    client: Client,
    base_url: Url,
    token: String,
}

impl FortiSoarClient {
    /// Create a new API client authenticating with a bearer token
    pub fn new(base_url: Url, token: &str, verify_ssl: bool) -> Result<Self, ClientBuildError> {
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ClientBuildError::InvalidToken)?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let client = Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(!verify_ssl)
            .build()?;

        Ok(Self {
            client,
            base_url,
            token: token.to_string(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The bearer token this session sends
    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn url(&self, path: &str) -> String {
        endpoint_url(&self.base_url, path)
    }

    /// Make a GET request with query parameters
    pub async fn get(&self, path: &str, query: &[(String, String)]) -> FsrResult<Response> {
        let url = self.url(path);
        debug!("GET {}", url);

        self.client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| FsrError::Api(format!("HTTP GET failed: {}", e)))
    }

    /// Make a POST request with JSON body
    pub async fn post<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> FsrResult<Response> {
        let url = self.url(path);
        debug!("POST {}", url);

        self.client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| FsrError::Api(format!("HTTP POST failed: {}", e)))
    }

    /// Make a PUT request with JSON body
    pub async fn put<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> FsrResult<Response> {
        let url = self.url(path);
        debug!("PUT {}", url);

        self.client
            .put(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| FsrError::Api(format!("HTTP PUT failed: {}", e)))
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> FsrResult<Response> {
        let url = self.url(path);
        debug!("DELETE {}", url);

        self.client
            .delete(&url)
            .send()
            .await
            .map_err(|e| FsrError::Api(format!("HTTP DELETE failed: {}", e)))
    }

    /// Upload a local file as multipart form field `file`
    pub async fn upload(&self, path: &str, file: &Path) -> FsrResult<Response> {
        let bytes = tokio::fs::read(file).await?;
        let file_name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));

        let url = self.url(path);
        debug!("POST {} (multipart)", url);

        self.client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| FsrError::Api(format!("HTTP upload failed: {}", e)))
    }

    /// Fetch raw bytes, e.g. file content behind a file IRI
    pub async fn download(&self, path: &str) -> FsrResult<Vec<u8>> {
        let response = self.get(path, &[]).await?;
        let response = check_status(response).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FsrError::Api(format!("Failed to read response body: {}", e)))?;
        Ok(bytes.to_vec())
    }

    /// Handle API response, checking status and parsing JSON.
    ///
    /// An empty body decodes as JSON `null`.
    pub async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> FsrResult<T> {
        let response = check_status(response).await?;

        let body = response
            .bytes()
            .await
            .map_err(|e| FsrError::Api(format!("Failed to read response body: {}", e)))?;

        let body: &[u8] = if body.is_empty() { b"null" } else { &body };
        serde_json::from_slice(body)
            .map_err(|e| FsrError::Api(format!("Failed to parse JSON response: {}", e)))
    }
}

/// Turn non-2xx statuses into API errors
async fn check_status(response: Response) -> FsrResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    error!("API error {}: {}", status, error_text);

    match status.as_u16() {
        400 => Err(FsrError::Api(format!("Bad request: {}", error_text))),
        401 => Err(FsrError::Api("Authentication failed".to_string())),
        403 => Err(FsrError::Api("Access denied".to_string())),
        404 => Err(FsrError::Api("Resource not found".to_string())),
        500..=599 => Err(FsrError::Api(format!("Server error: {}", error_text))),
        _ => Err(FsrError::Api(format!("HTTP error {}: {}", status, error_text))),
    }
}
