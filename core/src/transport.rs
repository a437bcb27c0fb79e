//! The seam between the client and the network.
//!
//! # Design
//! [`Transport`] has exactly one method: execute a request, hand back the
//! response. Timeouts, TLS, proxies and redirects are the implementation's
//! business, never the client's. [`ReqwestTransport`] is the default; tests
//! plug in doubles that return canned responses.

use async_trait::async_trait;
use tracing::trace;

use crate::error::BoxError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one HTTP round-trip.
///
/// Implementations must be shareable across tasks; a single transport backs
/// every call made through a [`Client`](crate::Client) and its clones.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, BoxError>;
}

/// [`Transport`] backed by a [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Use a caller-configured client (timeouts, proxy, TLS, redirect policy).
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, BoxError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
        };
        let mut builder = self.client.request(method, request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await?.to_vec();
        trace!(status, len = body.len(), "read response body");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
