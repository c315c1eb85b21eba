use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reelog_core::{
    load_config, validate_config, ActivityStore, ContentCache, ContentStore, CredentialHolder,
    Database, GameCatalog, HttpImageFetcher, IgdbClient, MetadataCatalog, PosterDownloader,
    SqliteActivityStore, SqliteContentStore, SqliteWatchedStore, TmdbClient, WatchedService,
    WatchedStore,
};
use reelog_server::api::create_router;
use reelog_server::state::AppState;

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("REELOG_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        "reelog {} starting (config {})",
        VERSION,
        &config_hash[..16]
    );
    info!("Database path: {:?}", config.database.path);

    // Storage
    let db = Database::open(&config.database.path).with_context(|| {
        format!("Failed to open database at {:?}", config.database.path)
    })?;
    let content_store: Arc<dyn ContentStore> = Arc::new(SqliteContentStore::new(db.clone()));
    let watched_store: Arc<dyn WatchedStore> = Arc::new(SqliteWatchedStore::new(db.clone()));
    let activity_store: Arc<dyn ActivityStore> = Arc::new(SqliteActivityStore::new(db));
    info!("Database initialized");

    // Catalogs
    let tmdb: Arc<dyn MetadataCatalog> = Arc::new(
        TmdbClient::new(config.tmdb.clone()).context("Failed to create TMDB client")?,
    );
    info!("TMDB client initialized");

    let igdb: Arc<dyn GameCatalog> = Arc::new(
        IgdbClient::new(config.igdb.clone(), Arc::new(CredentialHolder::new()))
            .context("Failed to create IGDB client")?,
    );
    if !config.igdb.has_credentials() {
        warn!("IGDB credentials not configured, game search will be unavailable");
    }

    // Content cache, with poster downloads if enabled
    let mut cache = ContentCache::new(Arc::clone(&content_store), tmdb);
    if config.images.enabled {
        let fetcher =
            Arc::new(HttpImageFetcher::new().context("Failed to create image fetcher")?);
        info!("Poster downloads enabled, saving to {:?}", config.images.dir);
        cache = cache.with_posters(PosterDownloader::new(
            fetcher,
            config.tmdb.image_base_url(),
            config.images.dir.clone(),
        ));
    } else {
        info!("Poster downloads disabled");
    }

    let watched = Arc::new(WatchedService::new(
        watched_store,
        Arc::clone(&activity_store),
        Arc::new(cache),
    ));

    let state = Arc::new(AppState::new(
        config.clone(),
        watched,
        content_store,
        activity_store,
        igdb,
    ));

    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
