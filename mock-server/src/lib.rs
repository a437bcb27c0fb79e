//! In-memory stub of the Avgle catalog API.
//!
//! # Design
//! The DTOs here are defined independently of `avgle-core`; the core's
//! integration tests run against this server, so schema drift between the two
//! shows up as a test failure. The catalog is read-only and shared behind an
//! `Arc`, so no locking is needed.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::debug;

/// Page size used when `?limit=` is absent, and for video listings.
pub const DEFAULT_LIMIT: usize = 50;

/// Channels with a numeric CHID up to this value are JAV channels.
pub const MAX_JAV_CHID: u32 = 12;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "CHID")]
    pub chid: String,
    pub name: String,
    pub slug: String,
    pub total_videos: i64,
    pub category_url: String,
    pub cover_url: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub title: String,
    pub keyword: String,
    pub cover_url: String,
    pub total_views: i64,
    pub video_count: i64,
    pub collection_url: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Video {
    pub vid: String,
    pub uid: String,
    pub title: String,
    pub keyword: String,
    pub channel: String,
    pub duration: f64,
    pub framerate: f64,
    pub hd: bool,
    pub addtime: i64,
    pub viewnumber: i64,
    pub likes: i64,
    pub dislikes: i64,
    pub video_url: String,
    pub embedded_url: String,
    pub preview_url: String,
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub categories: Vec<Category>,
    pub collections: Vec<Collection>,
    pub videos: Vec<Video>,
}

impl Catalog {
    /// A small fixed catalog: three categories, two collections, four videos.
    pub fn sample() -> Self {
        let category = |chid: &str, name: &str, total_videos| Category {
            chid: chid.to_string(),
            name: name.to_string(),
            slug: name.to_lowercase(),
            total_videos,
            category_url: format!("https://avgle.com/videos?c={chid}"),
            cover_url: format!("https://static.avgle.com/c/{chid}.jpg"),
        };
        let video = |vid: &str, title: &str, keyword: &str, channel: &str| Video {
            vid: vid.to_string(),
            uid: "1".to_string(),
            title: title.to_string(),
            keyword: keyword.to_string(),
            channel: channel.to_string(),
            duration: 3600.0,
            framerate: 29.97,
            hd: true,
            addtime: 1_580_000_000,
            viewnumber: 100,
            likes: 10,
            dislikes: 1,
            video_url: format!("https://avgle.com/video/{vid}"),
            embedded_url: format!("https://avgle.com/embed/{vid}"),
            preview_url: format!("https://static.avgle.com/preview/{vid}.jpg"),
        };

        Self {
            categories: vec![
                category("1", "Censored", 2),
                category("2", "Uncensored", 1),
                category("20", "Amateur", 1),
            ],
            collections: vec![
                Collection {
                    id: "1".to_string(),
                    title: "Best of 2019".to_string(),
                    keyword: "2019".to_string(),
                    cover_url: "https://static.avgle.com/col/1.jpg".to_string(),
                    total_views: 5000,
                    video_count: 2,
                    collection_url: "https://avgle.com/search/videos?search_query=2019".to_string(),
                },
                Collection {
                    id: "2".to_string(),
                    title: "Staff picks".to_string(),
                    keyword: "picks".to_string(),
                    cover_url: "https://static.avgle.com/col/2.jpg".to_string(),
                    total_views: 1200,
                    video_count: 1,
                    collection_url: "https://avgle.com/search/videos?search_query=picks".to_string(),
                },
            ],
            videos: vec![
                video("374462", "SSNI-388 first release", "SSNI-388 2019", "1"),
                video("374463", "SSNI-389 second release", "SSNI-389 2019", "1"),
                video("374464", "Uncensored sample", "sample", "2"),
                video("374465", "Amateur SSNI-388 reaction", "reaction", "20"),
            ],
        }
    }
}

#[derive(Serialize)]
struct Envelope<T> {
    success: bool,
    response: T,
}

#[derive(Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

type Db = Arc<Catalog>;

/// Routes over `catalog`, mounted at the root.
pub fn router(catalog: Catalog) -> Router {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/collections/{page}", get(list_collections))
        .route("/videos/{page}", get(list_videos))
        .route("/search/{query}/{page}", get(search_videos))
        .route("/jav/{query}/{page}", get(search_javs))
        .route("/video/{vid}", get(get_video))
        .with_state(Arc::new(catalog))
}

/// Routes over the sample catalog.
pub fn app() -> Router {
    router(Catalog::sample())
}

/// Routes over `catalog`, mounted under `prefix` (e.g. `/v1`).
pub fn nested(prefix: &str, catalog: Catalog) -> Router {
    Router::new().nest(prefix, router(catalog))
}

pub async fn serve(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, app()).await
}

/// Slice `items` for `page`, returning the page, its offset, and whether more follow.
fn paginate<T: Clone>(items: &[T], page: usize, limit: usize) -> (Vec<T>, usize, bool) {
    let offset = page.saturating_mul(limit);
    let slice: Vec<T> = items.iter().skip(offset).take(limit).cloned().collect();
    let has_more = offset.saturating_add(slice.len()) < items.len();
    (slice, offset, has_more)
}

fn video_page(all: &[Video], page: usize) -> Json<serde_json::Value> {
    let (videos, offset, has_more) = paginate(all, page, DEFAULT_LIMIT);
    Json(json!({
        "success": true,
        "response": {
            "has_more": has_more,
            "total_videos": all.len(),
            "current_offset": offset,
            "limit": DEFAULT_LIMIT,
            "videos": videos,
        }
    }))
}

fn matches_query(video: &Video, query: &str) -> bool {
    let query = query.to_lowercase();
    video.title.to_lowercase().contains(&query) || video.keyword.to_lowercase().contains(&query)
}

fn is_jav_channel(channel: &str) -> bool {
    channel.parse::<u32>().is_ok_and(|chid| chid <= MAX_JAV_CHID)
}

async fn list_categories(State(db): State<Db>) -> Json<Envelope<serde_json::Value>> {
    Json(Envelope {
        success: true,
        response: json!({ "categories": db.categories }),
    })
}

async fn list_collections(
    State(db): State<Db>,
    Path(page): Path<usize>,
    Query(params): Query<LimitParams>,
) -> Json<serde_json::Value> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let (collections, offset, has_more) = paginate(&db.collections, page, limit);
    Json(json!({
        "success": true,
        "response": {
            "has_more": has_more,
            "total_collections": db.collections.len(),
            "current_offset": offset,
            "limit": limit,
            "collections": collections,
        }
    }))
}

async fn list_videos(State(db): State<Db>, Path(page): Path<usize>) -> Json<serde_json::Value> {
    video_page(&db.videos, page)
}

async fn search_videos(
    State(db): State<Db>,
    Path((query, page)): Path<(String, usize)>,
) -> Json<serde_json::Value> {
    debug!(%query, page, "search");
    let hits: Vec<Video> = db
        .videos
        .iter()
        .filter(|v| matches_query(v, &query))
        .cloned()
        .collect();
    video_page(&hits, page)
}

async fn search_javs(
    State(db): State<Db>,
    Path((query, page)): Path<(String, usize)>,
) -> Json<serde_json::Value> {
    debug!(%query, page, "jav search");
    let hits: Vec<Video> = db
        .videos
        .iter()
        .filter(|v| is_jav_channel(&v.channel) && matches_query(v, &query))
        .cloned()
        .collect();
    video_page(&hits, page)
}

async fn get_video(State(db): State<Db>, Path(vid): Path<String>) -> Response {
    match db.videos.iter().find(|v| v.vid == vid) {
        Some(video) => Json(Envelope {
            success: true,
            response: json!({ "video": video }),
        })
        .into_response(),
        None => Json(json!({ "success": false, "response": { "video": {} } })).into_response(),
    }
}
