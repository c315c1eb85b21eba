//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with mock catalogs injected, so the HTTP surface can be tested without
//! network access.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use reelog_core::config::{DatabaseConfig, ImagesConfig, ServerConfig};
use reelog_core::testing::{MockGameCatalog, MockMetadataCatalog};
use reelog_core::{
    ActivityStore, Config, ContentCache, ContentStore, Database, GameCatalog, IgdbConfig,
    SqliteActivityStore, SqliteContentStore, SqliteWatchedStore, TmdbConfig, WatchedService,
    WatchedStore,
};

/// Re-export fixtures for test convenience
pub use reelog_core::testing::fixtures;

/// Test fixture for E2E testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_add() {
///     let fixture = TestFixture::new().await;
///     fixture.catalog.add_metadata(CatalogMetadata::Movie(fixtures::fight_club())).await;
///
///     let response = fixture.post("/api/v1/users/alice/watched", json!({
///         "external_id": 550, "kind": "movie"
///     })).await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock movie/show catalog - configure TMDB responses
    pub catalog: Arc<MockMetadataCatalog>,
    /// Mock game catalog - configure IGDB search results
    pub games: Arc<MockGameCatalog>,
    /// Temporary directory holding the test database
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    /// Create a new test fixture with empty mock catalogs.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.db");

        let catalog = Arc::new(MockMetadataCatalog::new());
        let games = Arc::new(MockGameCatalog::new());

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
            },
            database: DatabaseConfig {
                path: db_path.clone(),
            },
            images: ImagesConfig {
                enabled: false,
                dir: temp_dir.path().join("img"),
            },
            tmdb: TmdbConfig {
                api_key: "test-key".to_string(),
                base_url: None,
                image_base_url: None,
            },
            igdb: IgdbConfig::default(),
        };

        let db = Database::open(&db_path).expect("Failed to open database");
        let content_store: Arc<dyn ContentStore> = Arc::new(SqliteContentStore::new(db.clone()));
        let watched_store: Arc<dyn WatchedStore> = Arc::new(SqliteWatchedStore::new(db.clone()));
        let activity_store: Arc<dyn ActivityStore> = Arc::new(SqliteActivityStore::new(db));

        let cache = ContentCache::new(Arc::clone(&content_store), catalog.clone());
        let watched = Arc::new(WatchedService::new(
            watched_store,
            Arc::clone(&activity_store),
            Arc::new(cache),
        ));

        let state = Arc::new(reelog_server::state::AppState::new(
            config,
            watched,
            content_store,
            activity_store,
            Arc::clone(&games) as Arc<dyn GameCatalog>,
        ));

        let router = reelog_server::api::create_router(state);

        Self {
            router,
            catalog,
            games,
            temp_dir,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a PATCH request with JSON body.
    pub async fn patch(&self, path: &str, body: Value) -> TestResponse {
        self.request("PATCH", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Fetch `/metrics` as text.
    pub async fn metrics_text(&self) -> (StatusCode, String) {
        let request = Request::builder()
            .uri("/api/v1/metrics")
            .body(Body::empty())
            .unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
