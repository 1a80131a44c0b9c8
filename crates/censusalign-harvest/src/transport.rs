//! Byte transport abstraction.
//!
//! Loaders only need "bytes for a URL", so the HTTP client sits behind a
//! trait. Tests and offline tooling swap in [`StaticTransport`].

use async_trait::async_trait;
use censusalign_core::{Error, Result};

/// ZIP local-file-header magic.
const ZIP_MAGIC: &[u8; 4] = b"PK\x03\x04";

/// A fetched payload: raw bytes plus the reported content type.
#[derive(Clone, Debug)]
pub struct Payload {
    /// Response body.
    pub bytes: Vec<u8>,
    /// `Content-Type` header value, when the transport knows one.
    pub content_type: Option<String>,
}

impl Payload {
    /// Creates a payload with no content type.
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            content_type: None,
        }
    }

    /// Creates a payload with a content type.
    pub fn with_content_type(bytes: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            bytes,
            content_type: Some(content_type.into()),
        }
    }

    /// Whether the payload looks like a ZIP archive.
    ///
    /// Checks the declared content type and the local-file-header magic;
    /// some servers label archives `application/octet-stream`, so the magic
    /// check matters.
    pub fn is_zip(&self) -> bool {
        if let Some(ct) = &self.content_type {
            if ct.to_ascii_lowercase().contains("zip") {
                return true;
            }
        }
        self.bytes.starts_with(ZIP_MAGIC)
    }
}

/// Fetches bytes for a URL.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetches the payload at `url`.
    async fn fetch(&self, url: &str) -> Result<Payload>;
}

/// HTTP transport backed by a reqwest client.
#[derive(Clone, Debug, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Creates a transport with a default client.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<Payload> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::http_with_source(format!("GET {url} failed"), e))?;

        let response = response
            .error_for_status()
            .map_err(|e| Error::http_with_source(format!("GET {url} returned an error status"), e))?;

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::http_with_source(format!("GET {url}: body read failed"), e))?
            .to_vec();

        Ok(Payload {
            bytes,
            content_type,
        })
    }
}

/// In-memory transport serving canned responses, for tests and offline use.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Clone, Debug, Default)]
pub struct StaticTransport {
    responses: std::collections::HashMap<String, Payload>,
}

#[cfg(any(test, feature = "test-utils"))]
impl StaticTransport {
    /// Creates an empty transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a payload for a URL.
    pub fn insert(&mut self, url: impl Into<String>, payload: Payload) {
        self.responses.insert(url.into(), payload);
    }

    /// Builder-style registration.
    pub fn with(mut self, url: impl Into<String>, payload: Payload) -> Self {
        self.insert(url, payload);
        self
    }
}

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl Transport for StaticTransport {
    async fn fetch(&self, url: &str) -> Result<Payload> {
        self.responses
            .get(url)
            .cloned()
            .ok_or_else(|| Error::http(format!("no canned response for {url}")))
    }
}
