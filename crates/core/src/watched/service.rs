//! Watched list operations with their activity side effects.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::types::check_rating;
use super::{
    AddWatchedRequest, NewWatched, UpdateWatchedRequest, WatchedError, WatchedRecord,
    WatchedStore,
};
use crate::activity::{derive_update_activity, ActivityStore, NewActivity};
use crate::content::ContentCache;
use crate::metrics;

/// Watched list service.
///
/// The watched mutation and its activity entries are separate statements.
/// Once the mutation is committed the call succeeds: failures to append or
/// read back activity are logged and leave `activity` short.
pub struct WatchedService {
    watched: Arc<dyn WatchedStore>,
    activity: Arc<dyn ActivityStore>,
    content: Arc<ContentCache>,
}

impl WatchedService {
    pub fn new(
        watched: Arc<dyn WatchedStore>,
        activity: Arc<dyn ActivityStore>,
        content: Arc<ContentCache>,
    ) -> Self {
        Self {
            watched,
            activity,
            content,
        }
    }

    /// All entries of a user with their content and activity.
    pub fn list(&self, user_id: &str) -> Result<Vec<WatchedRecord>, WatchedError> {
        let mut records = self.watched.list(user_id)?;
        for record in &mut records {
            self.attach_activity(record)?;
        }
        Ok(records)
    }

    /// One entry of a user.
    pub fn get(&self, user_id: &str, watched_id: i64) -> Result<WatchedRecord, WatchedError> {
        let mut record = self
            .watched
            .get(user_id, watched_id)?
            .ok_or(WatchedError::NotFound)?;
        self.attach_activity(&mut record)?;
        Ok(record)
    }

    /// Add a title to a user's list, caching it first if needed.
    pub async fn add(
        &self,
        user_id: &str,
        request: AddWatchedRequest,
    ) -> Result<WatchedRecord, WatchedError> {
        let result = self.add_inner(user_id, request).await;
        record_mutation("add", &result);
        result
    }

    async fn add_inner(
        &self,
        user_id: &str,
        request: AddWatchedRequest,
    ) -> Result<WatchedRecord, WatchedError> {
        check_user(user_id)?;
        let rating = request.rating.unwrap_or(0);
        check_rating(rating)?;

        let content = self
            .content
            .resolve_or_create(request.kind, request.external_id)
            .await
            .map_err(WatchedError::ContentUnavailable)?;

        let mut record = self.watched.insert(&NewWatched {
            user_id: user_id.to_string(),
            content_id: content.id,
            status: request.status.unwrap_or_default(),
            rating,
        })?;

        info!(
            "User {} added {} '{}' as watched {}",
            user_id, content.kind, content.title, record.id
        );

        self.append_activity(NewActivity::added(user_id, record.id));
        self.attach_activity_or_warn(&mut record);
        Ok(record)
    }

    /// Change status and/or rating of one of the user's entries.
    pub fn update(
        &self,
        user_id: &str,
        watched_id: i64,
        request: UpdateWatchedRequest,
    ) -> Result<WatchedRecord, WatchedError> {
        let result = self.update_inner(user_id, watched_id, request);
        record_mutation("update", &result);
        result
    }

    fn update_inner(
        &self,
        user_id: &str,
        watched_id: i64,
        request: UpdateWatchedRequest,
    ) -> Result<WatchedRecord, WatchedError> {
        let changes = request.into_changes()?;
        let mut record = self
            .watched
            .get(user_id, watched_id)?
            .ok_or(WatchedError::NotFound)?;

        let updated_at = Utc::now();
        if !self.watched.update(user_id, watched_id, &changes, updated_at)? {
            return Err(WatchedError::NotFound);
        }
        if let Some(status) = changes.status {
            record.status = status;
        }
        if let Some(rating) = changes.rating {
            record.rating = rating;
        }
        record.updated_at = updated_at;

        info!("User {} updated watched {}: {:?}", user_id, watched_id, changes);

        for entry in derive_update_activity(user_id, watched_id, &changes) {
            self.append_activity(entry);
        }

        self.attach_activity_or_warn(&mut record);
        Ok(record)
    }

    /// Delete one of the user's entries together with its activity.
    pub fn remove(&self, user_id: &str, watched_id: i64) -> Result<(), WatchedError> {
        let result = match self.watched.remove(user_id, watched_id) {
            Ok(true) => {
                info!("User {} removed watched {}", user_id, watched_id);
                Ok(())
            }
            Ok(false) => Err(WatchedError::NotFound),
            Err(e) => Err(e.into()),
        };
        record_mutation("remove", &result);
        result
    }

    fn attach_activity(&self, record: &mut WatchedRecord) -> Result<(), WatchedError> {
        record.activity = self
            .activity
            .list_for_watched(record.id)
            .map_err(WatchedError::persist)?;
        Ok(())
    }

    fn attach_activity_or_warn(&self, record: &mut WatchedRecord) {
        if let Err(e) = self.attach_activity(record) {
            warn!("Failed to load activity for watched {}: {}", record.id, e);
        }
    }

    fn append_activity(&self, entry: NewActivity) {
        if let Err(e) = self.activity.append(&entry) {
            warn!(
                "Failed to record {} for watched {}: {}",
                entry.kind, entry.watched_id, e
            );
        }
    }
}

fn check_user(user_id: &str) -> Result<(), WatchedError> {
    if user_id.trim().is_empty() {
        return Err(WatchedError::Invalid("user id is required".to_string()));
    }
    Ok(())
}

fn record_mutation<T>(op: &str, result: &Result<T, WatchedError>) {
    let label = match result {
        Ok(_) => "ok",
        Err(e) => e.label(),
    };
    metrics::WATCHED_MUTATIONS
        .with_label_values(&[op, label])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{ActivityError, ActivityFilter, ActivityKind, SqliteActivityStore};
    use crate::content::{ResolveError, SqliteContentStore};
    use crate::db::Database;
    use crate::external_catalog::{CatalogMetadata, ExternalCatalogError, MediaKind};
    use crate::testing::{fixtures, MockMetadataCatalog};
    use crate::watched::{SqliteWatchedStore, WatchedStatus};

    struct Harness {
        service: WatchedService,
        catalog: Arc<MockMetadataCatalog>,
        activity: Arc<SqliteActivityStore>,
    }

    async fn harness() -> Harness {
        let db = Database::in_memory().unwrap();
        let catalog = Arc::new(MockMetadataCatalog::new());
        catalog
            .add_metadata(CatalogMetadata::Movie(fixtures::fight_club()))
            .await;
        let activity = Arc::new(SqliteActivityStore::new(db.clone()));
        let cache = Arc::new(ContentCache::new(
            Arc::new(SqliteContentStore::new(db.clone())),
            Arc::clone(&catalog) as _,
        ));
        let service = WatchedService::new(
            Arc::new(SqliteWatchedStore::new(db)),
            Arc::clone(&activity) as _,
            cache,
        );
        Harness {
            service,
            catalog,
            activity,
        }
    }

    fn add_fight_club() -> AddWatchedRequest {
        AddWatchedRequest {
            external_id: 550,
            kind: MediaKind::Movie,
            status: None,
            rating: None,
        }
    }

    #[tokio::test]
    async fn test_add_defaults_and_activity() {
        let h = harness().await;

        let record = h.service.add("alice", add_fight_club()).await.unwrap();

        assert_eq!(record.status, WatchedStatus::Watching);
        assert_eq!(record.rating, 0);
        assert_eq!(record.content.external_id, 550);
        assert_eq!(record.activity.len(), 1);
        assert_eq!(record.activity[0].kind, ActivityKind::AddedWatched);
    }

    #[tokio::test]
    async fn test_add_rejects_rating_out_of_range() {
        let h = harness().await;
        let mut request = add_fight_club();
        request.rating = Some(11);

        let result = h.service.add("alice", request).await;

        assert!(matches!(result, Err(WatchedError::Invalid(_))));
        assert_eq!(h.catalog.fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_add_rejects_empty_user() {
        let h = harness().await;
        let result = h.service.add("  ", add_fight_club()).await;
        assert!(matches!(result, Err(WatchedError::Invalid(_))));
    }

    #[tokio::test]
    async fn test_add_unknown_title() {
        let h = harness().await;
        let mut request = add_fight_club();
        request.external_id = 1;

        let result = h.service.add("alice", request).await;

        assert!(matches!(
            result,
            Err(WatchedError::ContentUnavailable(ResolveError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_add_catalog_down() {
        let h = harness().await;
        h.catalog
            .set_next_error(ExternalCatalogError::Upstream {
                status: 500,
                body: "boom".to_string(),
            })
            .await;

        let result = h.service.add("alice", add_fight_club()).await;

        assert!(matches!(
            result,
            Err(WatchedError::ContentUnavailable(
                ResolveError::UpstreamUnavailable(_)
            ))
        ));
    }

    #[tokio::test]
    async fn test_duplicate_add() {
        let h = harness().await;
        h.service.add("alice", add_fight_club()).await.unwrap();

        let result = h.service.add("alice", add_fight_club()).await;

        assert!(matches!(result, Err(WatchedError::AlreadyExists)));
        assert_eq!(h.service.list("alice").unwrap().len(), 1);
        assert_eq!(
            h.activity
                .count(&ActivityFilter::new().with_kind(ActivityKind::AddedWatched))
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_update_rating_and_status() {
        let h = harness().await;
        let record = h.service.add("alice", add_fight_club()).await.unwrap();

        let updated = h
            .service
            .update(
                "alice",
                record.id,
                UpdateWatchedRequest {
                    status: Some(WatchedStatus::Finished),
                    rating: Some(7),
                },
            )
            .unwrap();

        assert_eq!(updated.rating, 7);
        assert_eq!(updated.status, WatchedStatus::Finished);
        let kinds: Vec<_> = updated.activity.iter().map(|a| a.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ActivityKind::AddedWatched,
                ActivityKind::RatingChanged,
                ActivityKind::StatusChanged
            ]
        );
        assert_eq!(updated.activity[1].data.as_deref(), Some("7"));
        assert_eq!(updated.activity[2].data.as_deref(), Some("FINISHED"));
    }

    #[tokio::test]
    async fn test_update_with_zero_rating_changes_status_only() {
        let h = harness().await;
        let record = h.service.add("alice", add_fight_club()).await.unwrap();
        h.service
            .update(
                "alice",
                record.id,
                UpdateWatchedRequest {
                    status: None,
                    rating: Some(6),
                },
            )
            .unwrap();

        let updated = h
            .service
            .update(
                "alice",
                record.id,
                UpdateWatchedRequest {
                    status: Some(WatchedStatus::Dropped),
                    rating: Some(0),
                },
            )
            .unwrap();

        assert_eq!(updated.rating, 6);
        assert_eq!(updated.status, WatchedStatus::Dropped);
        assert_eq!(updated.activity.len(), 3);
        assert_eq!(updated.activity[2].kind, ActivityKind::StatusChanged);
    }

    #[tokio::test]
    async fn test_update_not_owned() {
        let h = harness().await;
        let record = h.service.add("alice", add_fight_club()).await.unwrap();

        let result = h.service.update(
            "mallory",
            record.id,
            UpdateWatchedRequest {
                status: Some(WatchedStatus::Dropped),
                rating: None,
            },
        );

        assert!(matches!(result, Err(WatchedError::NotFound)));
        let unchanged = h.service.get("alice", record.id).unwrap();
        assert_eq!(unchanged.status, WatchedStatus::Watching);
        assert_eq!(unchanged.activity.len(), 1);
    }

    #[tokio::test]
    async fn test_remove_cascades_activity() {
        let h = harness().await;
        let record = h.service.add("alice", add_fight_club()).await.unwrap();

        assert!(matches!(
            h.service.remove("mallory", record.id),
            Err(WatchedError::NotFound)
        ));
        h.service.remove("alice", record.id).unwrap();

        assert!(h.service.list("alice").unwrap().is_empty());
        assert!(matches!(
            h.service.get("alice", record.id),
            Err(WatchedError::NotFound)
        ));
        assert_eq!(h.activity.count(&ActivityFilter::new()).unwrap(), 0);
        assert!(matches!(
            h.service.remove("alice", record.id),
            Err(WatchedError::NotFound)
        ));
    }

    /// Wraps a real store and fails the selected operations.
    struct FailingActivityStore {
        inner: SqliteActivityStore,
        fail_append: bool,
        fail_reads: bool,
    }

    impl ActivityStore for FailingActivityStore {
        fn append(
            &self,
            entry: &NewActivity,
        ) -> Result<crate::activity::ActivityEntry, ActivityError> {
            if self.fail_append {
                return Err(ActivityError::Database("disk full".to_string()));
            }
            self.inner.append(entry)
        }

        fn list_for_watched(
            &self,
            watched_id: i64,
        ) -> Result<Vec<crate::activity::ActivityEntry>, ActivityError> {
            if self.fail_reads {
                return Err(ActivityError::Database("busy".to_string()));
            }
            self.inner.list_for_watched(watched_id)
        }

        fn query(
            &self,
            filter: &ActivityFilter,
        ) -> Result<Vec<crate::activity::ActivityEntry>, ActivityError> {
            self.inner.query(filter)
        }

        fn count(&self, filter: &ActivityFilter) -> Result<i64, ActivityError> {
            self.inner.count(filter)
        }
    }

    async fn service_with_activity(
        fail_append: bool,
        fail_reads: bool,
    ) -> (WatchedService, Arc<FailingActivityStore>) {
        let db = Database::in_memory().unwrap();
        let catalog = Arc::new(MockMetadataCatalog::new());
        catalog
            .add_metadata(CatalogMetadata::Movie(fixtures::fight_club()))
            .await;
        let cache = Arc::new(ContentCache::new(
            Arc::new(SqliteContentStore::new(db.clone())),
            catalog,
        ));
        let activity = Arc::new(FailingActivityStore {
            inner: SqliteActivityStore::new(db.clone()),
            fail_append,
            fail_reads,
        });
        let service = WatchedService::new(
            Arc::new(SqliteWatchedStore::new(db)),
            Arc::clone(&activity) as _,
            cache,
        );
        (service, activity)
    }

    #[tokio::test]
    async fn test_activity_failure_does_not_fail_add() {
        let (service, _) = service_with_activity(true, false).await;

        let record = service.add("alice", add_fight_club()).await.unwrap();

        assert!(record.activity.is_empty());
        assert_eq!(service.list("alice").unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_succeeds_when_activity_cannot_be_read() {
        let (service, activity) = service_with_activity(false, true).await;

        let record = service.add("alice", add_fight_club()).await.unwrap();

        assert_eq!(record.content.external_id, 550);
        assert!(record.activity.is_empty());
        assert_eq!(activity.inner.count(&ActivityFilter::new()).unwrap(), 1);

        let retry = service.add("alice", add_fight_club()).await;
        assert!(matches!(retry, Err(WatchedError::AlreadyExists)));
    }

    #[tokio::test]
    async fn test_update_succeeds_when_activity_cannot_be_read() {
        let (service, activity) = service_with_activity(false, true).await;
        let record = service.add("alice", add_fight_club()).await.unwrap();

        let updated = service
            .update(
                "alice",
                record.id,
                UpdateWatchedRequest {
                    status: Some(WatchedStatus::Finished),
                    rating: Some(9),
                },
            )
            .unwrap();

        assert_eq!(updated.status, WatchedStatus::Finished);
        assert_eq!(updated.rating, 9);
        assert!(updated.updated_at >= record.updated_at);
        assert!(updated.activity.is_empty());
        assert_eq!(activity.inner.count(&ActivityFilter::new()).unwrap(), 3);
    }
}
