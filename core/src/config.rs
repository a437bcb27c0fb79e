//! Client configuration.
//!
//! Every field is an optional override; [`Client::new`](crate::Client::new)
//! falls back to [`DEFAULT_BASE_URL`] and a fresh [`ReqwestTransport`] for
//! whatever is left unset.

use std::fmt;
use std::sync::Arc;

use crate::transport::{ReqwestTransport, Transport};

pub const DEFAULT_BASE_URL: &str = "https://api.avgle.com/v1";

/// Environment variable read by [`ClientOptions::from_env`].
pub const BASE_URL_ENV: &str = "AVGLE_BASE_URL";

#[derive(Clone, Default)]
pub struct ClientOptions {
    /// API root. `None` or an empty string means [`DEFAULT_BASE_URL`].
    pub base_url: Option<String>,
    pub transport: Option<Arc<dyn Transport>>,
}

impl ClientOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with the base URL taken from `AVGLE_BASE_URL`, if set.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var(BASE_URL_ENV).ok().filter(|v| !v.is_empty()),
            transport: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_transport(self, transport: impl Transport + 'static) -> Self {
        self.with_shared_transport(Arc::new(transport))
    }

    /// Share one transport between several clients.
    pub fn with_shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub(crate) fn resolved_base_url(&self) -> &str {
        match self.base_url.as_deref() {
            Some(url) if !url.is_empty() => url,
            _ => DEFAULT_BASE_URL,
        }
    }

    pub(crate) fn resolved_transport(self) -> Arc<dyn Transport> {
        self.transport
            .unwrap_or_else(|| Arc::new(ReqwestTransport::default()))
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("base_url", &self.base_url)
            .field("transport", &self.transport.as_ref().map(|_| "<custom>"))
            .finish()
    }
}
