pub mod activity;
pub mod config;
pub mod content;
pub mod db;
pub mod external_catalog;
pub mod images;
pub mod metrics;
pub mod testing;
pub mod watched;

pub use activity::{
    ActivityEntry, ActivityError, ActivityFilter, ActivityKind, ActivityStore, NewActivity,
    SqliteActivityStore,
};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use content::{
    ContentCache, ContentRecord, ContentStore, ContentStoreError, InsertOutcome, NewContent,
    ResolveError, SqliteContentStore,
};
pub use db::{Database, DatabaseError};
pub use external_catalog::{
    CatalogMetadata, CredentialHolder, ExternalCatalogError, GameCatalog, GameSearchResult,
    IgdbClient, IgdbConfig, MediaKind, MetadataCatalog, TmdbClient, TmdbConfig,
};
pub use images::{HttpImageFetcher, ImageError, ImageFetcher, PosterDownloader};
pub use watched::{
    AddWatchedRequest, SqliteWatchedStore, UpdateWatchedRequest, WatchedError, WatchedRecord,
    WatchedService, WatchedStatus, WatchedStore,
};
