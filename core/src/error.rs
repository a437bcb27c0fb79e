//! Error types for the Avgle API client.
//!
//! # Design
//! Variants follow where a call can fail: building the client, validating
//! arguments, the transport round-trip, the caller's context, decoding, and
//! the one domain check (single-video lookup). Transport and decode failures
//! keep the underlying error as their `source` instead of flattening it into
//! a string.

use thiserror::Error;

/// Boxed error produced by a [`Transport`](crate::Transport) implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The configured base URL is not a URL at all.
    #[error("failed to parse URL {url:?}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// The base URL parsed but cannot carry a path (e.g. `mailto:`).
    #[error("base URL {0:?} cannot be used as an API root")]
    UnsupportedBaseUrl(String),

    /// A required argument was empty. Raised before any I/O.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The upstream answered `success: false` for a single-video lookup.
    #[error("video of VID {vid} not found")]
    NotFound { vid: String },

    /// The transport failed to complete the round-trip.
    #[error("request failed: {0}")]
    Transport(#[source] BoxError),

    /// The caller's context was cancelled.
    #[error("request cancelled")]
    Cancelled,

    /// The caller's context deadline passed.
    #[error("request deadline exceeded")]
    DeadlineExceeded,

    /// The response body is not the expected JSON.
    #[error("failed to decode response (HTTP {status}): {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}
