//! End-to-end tests against a live mock server.
//!
//! # Design
//! Each test binds the mock server (or a purpose-built axum router) to a
//! random port and talks to it over real HTTP, once through the default
//! reqwest transport and once through a blocking ureq transport plugged in
//! behind the same `Transport` trait.

use std::net::SocketAddr;
use std::time::Duration;

use async_trait::async_trait;
use avgle_core::{
    ApiError, BoxError, Client, ClientOptions, Context, HttpMethod, HttpRequest, HttpResponse,
    Transport,
};
use axum::{http::header, routing::get, Router};
use mock_server::Catalog;
use tokio::net::TcpListener;

/// Serve `router` on a random local port and return its address.
async fn spawn(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::serve(listener, router));
    addr
}

fn client(base_url: String) -> Client {
    Client::new(ClientOptions::new().with_base_url(base_url)).unwrap()
}

fn json_route(body: &'static str) -> axum::routing::MethodRouter {
    get(move || async move { ([(header::CONTENT_TYPE, "application/json")], body) })
}

/// Execute an `HttpRequest` with ureq on the blocking pool.
///
/// Disables ureq's status-code-as-error behavior so every response comes
/// back as data and the client decides what it means.
struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(&self, req: HttpRequest) -> Result<HttpResponse, BoxError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || -> Result<HttpResponse, BoxError> {
            let mut request = match req.method {
                HttpMethod::Get => agent.get(req.url.as_str()),
            };
            for (name, value) in &req.headers {
                request = request.header(name.as_str(), value.as_str());
            }
            let mut response = request.call()?;
            let status = response.status().as_u16();
            let body = response.body_mut().read_to_vec()?;
            Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body,
            })
        })
        .await?
    }
}

async fn exercise_all_operations(client: &Client) {
    let ctx = Context::background();

    let categories = client.get_categories(&ctx).await.unwrap();
    assert!(categories.success);
    assert_eq!(categories.response.categories.len(), 3);
    assert_eq!(categories.response.categories[1].chid, "2");

    let collections = client.get_collections(&ctx, "", "").await.unwrap();
    assert_eq!(collections.response.limit, 50);
    assert_eq!(collections.response.collections.len(), 2);

    let collections = client.get_collections(&ctx, "1", "1").await.unwrap();
    assert_eq!(collections.response.current_offset, 1);
    assert_eq!(collections.response.collections[0].title, "Staff picks");

    let videos = client.get_videos(&ctx, "").await.unwrap();
    assert_eq!(videos.response.total_videos, 4);
    assert!(!videos.response.has_more);

    let hits = client.search_videos(&ctx, "SSNI-388", "").await.unwrap();
    assert_eq!(hits.response.videos.len(), 2);

    let javs = client.search_javs(&ctx, "SSNI-388", "0").await.unwrap();
    assert_eq!(javs.response.videos.len(), 1);
    assert_eq!(javs.response.videos[0].vid, "374462");

    let video = client.get_video_by_vid(&ctx, "374462").await.unwrap();
    assert!(video.success);
    assert_eq!(video.response.video.title, "SSNI-388 first release");
    assert!(video.response.video.hd);

    let err = client.get_video_by_vid(&ctx, "0").await.unwrap_err();
    assert!(matches!(err, ApiError::NotFound { .. }));
}

#[tokio::test]
async fn all_operations_with_default_transport() {
    let addr = spawn(mock_server::app()).await;
    exercise_all_operations(&client(format!("http://{addr}"))).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn all_operations_with_ureq_transport() {
    let addr = spawn(mock_server::app()).await;
    let client = Client::new(
        ClientOptions::new()
            .with_base_url(format!("http://{addr}"))
            .with_transport(UreqTransport::new()),
    )
    .unwrap();
    exercise_all_operations(&client).await;
}

#[tokio::test]
async fn base_path_prefix_reaches_nested_routes() {
    let addr = spawn(mock_server::nested("/v1", Catalog::sample())).await;
    let client = client(format!("http://{addr}/v1"));

    let resp = client.get_categories(&Context::background()).await.unwrap();
    assert_eq!(resp.response.categories.len(), 3);
}

#[tokio::test]
async fn categories_stub_decodes_exactly() {
    let router = Router::new().route(
        "/categories",
        json_route(
            r#"{"success":true,"response":{"categories":[{"CHID":"1","name":"X","slug":"x","total_videos":5,"category_url":"u","cover_url":"c"}]}}"#,
        ),
    );
    let addr = spawn(router).await;

    let resp = client(format!("http://{addr}"))
        .get_categories(&Context::background())
        .await
        .unwrap();

    assert!(resp.success);
    assert_eq!(
        resp.response.categories,
        vec![avgle_core::Category {
            chid: "1".to_string(),
            name: "X".to_string(),
            slug: "x".to_string(),
            total_videos: 5,
            category_url: "u".to_string(),
            cover_url: "c".to_string(),
        }]
    );
}

#[tokio::test]
async fn video_stub_with_success_false_is_an_error() {
    let router = Router::new().route(
        "/video/0",
        json_route(r#"{"success":false,"response":{"video":{}}}"#),
    );
    let addr = spawn(router).await;

    let result = client(format!("http://{addr}"))
        .get_video_by_vid(&Context::background(), "0")
        .await;

    assert!(matches!(result, Err(ApiError::NotFound { .. })));
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let addr = spawn(mock_server::app()).await;

    let err = client(format!("http://{addr}"))
        .get_collections(&Context::background(), "first", "")
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Decode { status: 400, .. }));
}

#[tokio::test]
async fn connection_refused_is_a_transport_error() {
    // Bind then drop to get a port nothing listens on.
    let addr = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap()
    };

    let err = client(format!("http://{addr}"))
        .get_categories(&Context::background())
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Transport(_)));
}

fn slow_router() -> Router {
    Router::new().route(
        "/categories",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            "{}"
        }),
    )
}

#[tokio::test]
async fn cancelling_aborts_in_flight_request() {
    let addr = spawn(slow_router()).await;
    let client = client(format!("http://{addr}"));
    let (ctx, handle) = Context::background().with_cancel();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.cancel();
    });

    let started = std::time::Instant::now();
    let err = client.get_categories(&ctx).await.unwrap_err();
    assert!(matches!(err, ApiError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(10));
}

#[tokio::test]
async fn deadline_aborts_in_flight_request() {
    let addr = spawn(slow_router()).await;
    let ctx = Context::background().with_timeout(Duration::from_millis(50));

    let err = client(format!("http://{addr}"))
        .get_categories(&ctx)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::DeadlineExceeded));
}

#[tokio::test]
async fn one_client_serves_concurrent_tasks() {
    let addr = spawn(mock_server::app()).await;
    let client = client(format!("http://{addr}"));

    let tasks: Vec<_> = ["374462", "374463", "374464", "374465"]
        .into_iter()
        .map(|vid| {
            let client = client.clone();
            tokio::spawn(async move {
                client
                    .get_video_by_vid(&Context::background(), vid)
                    .await
                    .map(|resp| resp.response.video.vid)
            })
        })
        .collect();

    for (task, vid) in tasks.into_iter().zip(["374462", "374463", "374464", "374465"]) {
        assert_eq!(task.await.unwrap().unwrap(), vid);
    }
}
