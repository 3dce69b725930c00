use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use http::StatusCode;
use tracing::trace;

use crate::error::{PortalError, PortalResult};

/// HTTP method enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    GET,
    POST,
    PUT,
}

/// A response with the body fully read
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code
    status: StatusCode,
    /// Raw response body
    body: Bytes,
    /// Response headers, names lowercased
    headers: HashMap<String, String>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            body: body.into(),
            headers: HashMap::new(),
        }
    }

    /// Add a header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(key.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Get a reference to the raw body
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Consume the response, keeping the raw body
    pub fn into_body(self) -> Bytes {
        self.body
    }

    /// Body decoded as UTF-8, lossily
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Parse body as JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> PortalResult<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Check if successful (2xx status)
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

/// A file attached to a multipart request
#[derive(Debug, Clone)]
pub struct FilePart {
    pub field: String,
    pub filename: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// A `multipart/form-data` body
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    pub fields: Vec<(String, String)>,
    pub files: Vec<FilePart>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn file(mut self, part: FilePart) -> Self {
        self.files.push(part);
        self
    }
}

/// Trait for HTTP client operations, allowing for mocking
#[async_trait::async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, url: &str, headers: HashMap<String, String>) -> PortalResult<HttpResponse>;

    async fn post(
        &self,
        url: &str,
        headers: HashMap<String, String>,
        body: Bytes,
    ) -> PortalResult<HttpResponse>;

    async fn put(
        &self,
        url: &str,
        headers: HashMap<String, String>,
        body: Bytes,
    ) -> PortalResult<HttpResponse>;

    async fn post_multipart(
        &self,
        url: &str,
        headers: HashMap<String, String>,
        form: MultipartForm,
    ) -> PortalResult<HttpResponse>;
}

/// Implementation of HttpClient using reqwest
pub struct ReqwestHttpClient {
    client: reqwest::Client,
    /// Request limit the client was built with, when known
    timeout: Option<Duration>,
}

impl ReqwestHttpClient {
    /// Create a client whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> PortalResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortalError::Network {
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self {
            client,
            timeout: Some(timeout),
        })
    }

    /// Create a new client with custom configuration
    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    async fn send(
        &self,
        mut request: reqwest::RequestBuilder,
        headers: HashMap<String, String>,
    ) -> PortalResult<HttpResponse> {
        for (key, value) in headers {
            request = request.header(key, value);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;

        let status = response.status().as_u16();
        let mut result = HttpResponse::new(status, Bytes::new());
        for (name, value) in response.headers() {
            if let Ok(value) = value.to_str() {
                result = result.with_header(name.as_str(), value);
            }
        }
        result.body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        trace!(status = status, bytes = result.body.len(), "HTTP response received");
        Ok(result)
    }

    fn transport_error(&self, err: reqwest::Error) -> PortalError {
        match PortalError::from(err) {
            PortalError::Timeout { operation, .. } => PortalError::Timeout {
                operation,
                after: self.timeout,
            },
            other => other,
        }
    }
}

#[async_trait::async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn get(&self, url: &str, headers: HashMap<String, String>) -> PortalResult<HttpResponse> {
        self.send(self.client.get(url), headers).await
    }

    async fn post(
        &self,
        url: &str,
        headers: HashMap<String, String>,
        body: Bytes,
    ) -> PortalResult<HttpResponse> {
        self.send(self.client.post(url).body(body), headers).await
    }

    async fn put(
        &self,
        url: &str,
        headers: HashMap<String, String>,
        body: Bytes,
    ) -> PortalResult<HttpResponse> {
        self.send(self.client.put(url).body(body), headers).await
    }

    async fn post_multipart(
        &self,
        url: &str,
        headers: HashMap<String, String>,
        form: MultipartForm,
    ) -> PortalResult<HttpResponse> {
        let mut multipart = reqwest::multipart::Form::new();
        for (name, value) in form.fields {
            multipart = multipart.text(name, value);
        }
        for file in form.files {
            let part = reqwest::multipart::Part::bytes(file.bytes.to_vec())
                .file_name(file.filename)
                .mime_str(&file.content_type)
                .map_err(|e| PortalError::Validation {
                    field: file.field.clone(),
                    reason: format!("invalid content type: {}", e),
                })?;
            multipart = multipart.part(file.field, part);
        }

        self.send(self.client.post(url).multipart(multipart), headers)
            .await
    }
}
