//! Response records for the Avgle catalog API.
//!
//! # Design
//! Field names follow the upstream JSON byte for byte (note the uppercase
//! `CHID` on `Category`). Every record is `#[serde(default)]` and every field
//! goes through `null_as_default`: a missing field or an explicit `null`
//! decodes to its zero value and unknown fields are ignored, so sparse bodies
//! such as `{"success":false,"response":{"video":{}}}` or
//! `{"success":true,"response":{"videos":null}}` still decode.
//!
//! Each endpoint answers with an [`Envelope`] wrapping a `success` flag and a
//! payload. The per-endpoint response names are aliases over it.

use serde::{Deserialize, Deserializer, Serialize};

/// Decode `null` as the field's zero value, the same as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A video category (channel).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Category {
    #[serde(rename = "CHID", deserialize_with = "null_as_default")]
    pub chid: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(deserialize_with = "null_as_default")]
    pub total_videos: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub category_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cover_url: String,
}

/// A curated collection of videos.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Collection {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub keyword: String,
    #[serde(deserialize_with = "null_as_default")]
    pub cover_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub total_views: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub video_count: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub collection_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Video {
    #[serde(deserialize_with = "null_as_default")]
    pub vid: String,
    #[serde(deserialize_with = "null_as_default")]
    pub uid: String,
    #[serde(deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(deserialize_with = "null_as_default")]
    pub keyword: String,
    #[serde(deserialize_with = "null_as_default")]
    pub channel: String,
    /// Length in seconds.
    #[serde(deserialize_with = "null_as_default")]
    pub duration: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub framerate: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub hd: bool,
    /// Unix timestamp of upload.
    #[serde(deserialize_with = "null_as_default")]
    pub addtime: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub viewnumber: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub likes: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub dislikes: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub video_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub embedded_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub preview_url: String,
}

/// The outer object of every response.
///
/// `success` reports the upstream outcome. Only [`Client::get_video_by_vid`]
/// turns `false` into an error; the list endpoints hand it back untouched.
///
/// [`Client::get_video_by_vid`]: crate::Client::get_video_by_vid
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct Envelope<T> {
    #[serde(deserialize_with = "null_as_default")]
    pub success: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub response: T,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryList {
    #[serde(deserialize_with = "null_as_default")]
    pub categories: Vec<Category>,
}

/// One page of collections with its pagination metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectionPage {
    #[serde(deserialize_with = "null_as_default")]
    pub has_more: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub total_collections: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub current_offset: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub limit: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub collections: Vec<Collection>,
}

/// One page of videos with its pagination metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoPage {
    #[serde(deserialize_with = "null_as_default")]
    pub has_more: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub total_videos: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub current_offset: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub limit: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub videos: Vec<Video>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoDetail {
    #[serde(deserialize_with = "null_as_default")]
    pub video: Video,
}

pub type GetCategoriesResp = Envelope<CategoryList>;
pub type GetCollectionsResp = Envelope<CollectionPage>;
pub type GetVideosResp = Envelope<VideoPage>;
pub type SearchVideosResp = GetVideosResp;
pub type SearchJAVsResp = GetVideosResp;
pub type GetVideoByVIDResp = Envelope<VideoDetail>;
