//! Request builder, response parser and the six catalog operations.
//!
//! # Design
//! `Client` holds only the parsed base URL and a shared [`Transport`]; it
//! carries no per-call state, so clones can be used from many tasks at once.
//! Each operation is split into a `build_*` method that produces an
//! [`HttpRequest`] and a `parse_*` method that consumes an [`HttpResponse`].
//! The async methods glue the two together around one transport round-trip.
//! Callers that run their own I/O can use the halves directly.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::ClientOptions;
use crate::context::Context;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{
    GetCategoriesResp, GetCollectionsResp, GetVideoByVIDResp, GetVideosResp, SearchJAVsResp,
    SearchVideosResp,
};

const DEFAULT_PAGE: &str = "0";
const DEFAULT_LIMIT: &str = "50";

/// Client for the Avgle catalog API.
#[derive(Clone)]
pub struct Client {
    base_url: Url,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Build a client. Only parses the base URL; nothing touches the network.
    pub fn new(options: ClientOptions) -> Result<Self, ApiError> {
        let raw = options.resolved_base_url();
        let base_url = Url::parse(raw).map_err(|source| ApiError::InvalidBaseUrl {
            url: raw.to_string(),
            source,
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::UnsupportedBaseUrl(raw.to_string()));
        }

        Ok(Self {
            base_url,
            transport: options.resolved_transport(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append `segments` to the base path, keeping any prefix the base has.
    /// Empty segments are skipped, so an empty vid yields `.../video`.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // `new` rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(segments.iter().filter(|segment| !segment.is_empty()));
        }
        url
    }

    // -- build ---------------------------------------------------------------

    pub fn build_get_categories(&self) -> HttpRequest {
        HttpRequest::get(self.endpoint(&["categories"]))
    }

    pub fn build_get_collections(&self, page: &str, limit: &str) -> Result<HttpRequest, ApiError> {
        let page = segment(or_default(page, DEFAULT_PAGE))?;
        let limit = or_default(limit, DEFAULT_LIMIT);
        let mut url = self.endpoint(&["collections", page]);
        url.query_pairs_mut().append_pair("limit", limit);
        Ok(HttpRequest::get(url))
    }

    pub fn build_get_videos(&self, page: &str) -> Result<HttpRequest, ApiError> {
        let page = segment(or_default(page, DEFAULT_PAGE))?;
        Ok(HttpRequest::get(self.endpoint(&["videos", page])))
    }

    pub fn build_search_videos(&self, query: &str, page: &str) -> Result<HttpRequest, ApiError> {
        let query = segment(required_query(query)?)?;
        let page = segment(or_default(page, DEFAULT_PAGE))?;
        Ok(HttpRequest::get(self.endpoint(&["search", query, page])))
    }

    pub fn build_search_javs(&self, query: &str, page: &str) -> Result<HttpRequest, ApiError> {
        let query = segment(required_query(query)?)?;
        let page = segment(or_default(page, DEFAULT_PAGE))?;
        Ok(HttpRequest::get(self.endpoint(&["jav", query, page])))
    }

    pub fn build_get_video_by_vid(&self, vid: &str) -> Result<HttpRequest, ApiError> {
        let vid = segment(vid)?;
        Ok(HttpRequest::get(self.endpoint(&["video", vid])))
    }

    // -- parse ---------------------------------------------------------------

    pub fn parse_get_categories(&self, response: HttpResponse) -> Result<GetCategoriesResp, ApiError> {
        decode(response)
    }

    pub fn parse_get_collections(&self, response: HttpResponse) -> Result<GetCollectionsResp, ApiError> {
        decode(response)
    }

    pub fn parse_get_videos(&self, response: HttpResponse) -> Result<GetVideosResp, ApiError> {
        decode(response)
    }

    pub fn parse_search_videos(&self, response: HttpResponse) -> Result<SearchVideosResp, ApiError> {
        decode(response)
    }

    pub fn parse_search_javs(&self, response: HttpResponse) -> Result<SearchJAVsResp, ApiError> {
        decode(response)
    }

    /// Decode a single-video response, turning `success: false` into
    /// [`ApiError::NotFound`].
    pub fn parse_get_video_by_vid(
        &self,
        vid: &str,
        response: HttpResponse,
    ) -> Result<GetVideoByVIDResp, ApiError> {
        let ret: GetVideoByVIDResp = decode(response)?;
        if !ret.success {
            return Err(ApiError::NotFound {
                vid: vid.to_string(),
            });
        }
        Ok(ret)
    }

    // -- operations ----------------------------------------------------------

    /// Fetch every video category.
    ///
    /// The envelope's `success` flag is returned as-is and is not checked.
    #[tracing::instrument(level = "debug", skip(self, ctx))]
    pub async fn get_categories(&self, ctx: &Context) -> Result<GetCategoriesResp, ApiError> {
        let response = self.send(ctx, self.build_get_categories()).await?;
        self.parse_get_categories(response)
    }

    /// Fetch one page of collections. Empty `page`/`limit` mean `"0"`/`"50"`.
    ///
    /// The envelope's `success` flag is returned as-is and is not checked.
    #[tracing::instrument(level = "debug", skip(self, ctx))]
    pub async fn get_collections(
        &self,
        ctx: &Context,
        page: &str,
        limit: &str,
    ) -> Result<GetCollectionsResp, ApiError> {
        let request = self.build_get_collections(page, limit)?;
        let response = self.send(ctx, request).await?;
        self.parse_get_collections(response)
    }

    /// Fetch one page of videos. An empty `page` means `"0"`.
    ///
    /// The envelope's `success` flag is returned as-is and is not checked.
    #[tracing::instrument(level = "debug", skip(self, ctx))]
    pub async fn get_videos(&self, ctx: &Context, page: &str) -> Result<GetVideosResp, ApiError> {
        let request = self.build_get_videos(page)?;
        let response = self.send(ctx, request).await?;
        self.parse_get_videos(response)
    }

    /// Search videos by keyword. Fails without any I/O if `query` is empty.
    ///
    /// The envelope's `success` flag is returned as-is and is not checked.
    #[tracing::instrument(level = "debug", skip(self, ctx))]
    pub async fn search_videos(
        &self,
        ctx: &Context,
        query: &str,
        page: &str,
    ) -> Result<SearchVideosResp, ApiError> {
        let request = self.build_search_videos(query, page)?;
        let response = self.send(ctx, request).await?;
        self.parse_search_videos(response)
    }

    /// Like [`search_videos`](Self::search_videos), limited to JAV channels
    /// (CHID 12 and below).
    #[tracing::instrument(level = "debug", skip(self, ctx))]
    pub async fn search_javs(
        &self,
        ctx: &Context,
        query: &str,
        page: &str,
    ) -> Result<SearchJAVsResp, ApiError> {
        let request = self.build_search_javs(query, page)?;
        let response = self.send(ctx, request).await?;
        self.parse_search_javs(response)
    }

    /// Fetch a single video. `success: false` becomes [`ApiError::NotFound`].
    #[tracing::instrument(level = "debug", skip(self, ctx))]
    pub async fn get_video_by_vid(&self, ctx: &Context, vid: &str) -> Result<GetVideoByVIDResp, ApiError> {
        let request = self.build_get_video_by_vid(vid)?;
        let response = self.send(ctx, request).await?;
        self.parse_get_video_by_vid(vid, response)
    }

    /// Run one round-trip, racing it against the caller's context.
    async fn send(&self, ctx: &Context, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        if let Some(err) = ctx.err() {
            return Err(err);
        }
        debug!(method = request.method.as_str(), url = %request.url, "sending request");

        let response = tokio::select! {
            biased;
            err = ctx.done() => return Err(err),
            result = self.transport.execute(request) => result.map_err(ApiError::Transport)?,
        };
        debug!(status = response.status, "received response");
        Ok(response)
    }
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() {
        default
    } else {
        value
    }
}

fn required_query(query: &str) -> Result<&str, ApiError> {
    if query.is_empty() {
        return Err(ApiError::InvalidArgument("query is empty"));
    }
    Ok(query)
}

/// URL paths cannot carry a literal `.` or `..` segment (even `%2E%2E` is
/// normalized away), so such values would silently hit a different route.
fn segment(value: &str) -> Result<&str, ApiError> {
    if value == "." || value == ".." {
        return Err(ApiError::InvalidArgument("path segment cannot be \".\" or \"..\""));
    }
    Ok(value)
}

/// Decode the body whatever the status; the upstream signals failure in the
/// envelope, not the status line.
fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    serde_json::from_slice(&response.body).map_err(|source| ApiError::Decode {
        status: response.status,
        source,
    })
}
