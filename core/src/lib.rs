//! Async client for the Avgle video-catalog API.
//!
//! # Overview
//! Six read-only operations (categories, collections, videos, keyword search,
//! JAV search, single-video lookup) that each issue one GET and decode the
//! JSON envelope into typed records.
//!
//! ```no_run
//! use avgle_core::{Client, ClientOptions, Context};
//!
//! # async fn example() -> Result<(), avgle_core::ApiError> {
//! let client = Client::new(ClientOptions::from_env())?;
//! let page = client.get_videos(&Context::background(), "").await?;
//! if page.success {
//!     for video in &page.response.videos {
//!         println!("{} {}", video.vid, video.title);
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Design
//! - `Client` holds only the base URL and an `Arc<dyn Transport>`; every call
//!   builds a fresh request, so one client can be shared across tasks.
//! - Each operation is split into `build_*` (produces an `HttpRequest`) and
//!   `parse_*` (consumes an `HttpResponse`), so the I/O boundary is explicit
//!   and callers can bring their own HTTP stack.
//! - Only the single-video lookup checks the envelope's `success` flag. The
//!   list endpoints return it untouched, as the upstream's reference client
//!   does; callers must inspect it themselves.
//! - No retries, caching or pagination helpers.

pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod transport;
pub mod types;

pub use client::Client;
pub use config::{ClientOptions, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use context::{CancelHandle, Context};
pub use error::{ApiError, BoxError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    Category, CategoryList, Collection, CollectionPage, Envelope, GetCategoriesResp,
    GetCollectionsResp, GetVideoByVIDResp, GetVideosResp, SearchJAVsResp, SearchVideosResp, Video,
    VideoDetail, VideoPage,
};
