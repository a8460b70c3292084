use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use opsched_core::{Schedule, generate_id, now_utc};
use opsched_storage::{ScheduleStore, ScheduleUpdate, StoreError, StoredSchedule};

/// In-memory schedule store backed by a sharded concurrent map.
///
/// Each commit runs while holding the record's exclusive entry guard, which
/// makes the whole update (version check, field sets, history append,
/// remarks append, `updatedAt` bump) a single atomic step per record.
#[derive(Debug)]
pub struct InMemoryScheduleStore {
    data: DashMap<String, StoredSchedule>,
    version_counter: AtomicU64,
}

impl Default for InMemoryScheduleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryScheduleStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
            version_counter: AtomicU64::new(1),
        }
    }

    fn next_version(&self) -> u64 {
        self.version_counter.fetch_add(1, Ordering::SeqCst)
    }

    /// Number of records currently stored.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn sorted_newest_first(mut results: Vec<StoredSchedule>) -> Vec<StoredSchedule> {
        results.sort_by(|a, b| b.schedule.created_at.cmp(&a.schedule.created_at));
        results
    }
}

/// Applies every operation of `update` to `schedule` in place.
fn apply_update(schedule: &mut Schedule, update: &ScheduleUpdate) -> Result<(), StoreError> {
    if !update.set_fields.is_empty() {
        let mut doc = serde_json::to_value(&*schedule)
            .map_err(|e| StoreError::internal(format!("serialize record: {e}")))?;
        let obj = doc
            .as_object_mut()
            .ok_or_else(|| StoreError::internal("record is not a JSON object"))?;
        for (field, value) in &update.set_fields {
            obj.insert(field.clone(), value.clone());
        }
        *schedule = serde_json::from_value(doc)
            .map_err(|e| StoreError::invalid_update(format!("field update rejected: {e}")))?;
    }

    if let Some(status) = update.status {
        schedule.status = status;
    }

    // Append-to-list: prior entries are never replaced or reordered.
    schedule
        .status_history
        .extend(update.push_history.iter().cloned());

    if let Some(text) = &update.append_remarks {
        if schedule.doctor_remarks.is_empty() {
            schedule.doctor_remarks = text.clone();
        } else {
            schedule.doctor_remarks = format!("{}\n{}", schedule.doctor_remarks, text);
        }
    }

    Ok(())
}

#[async_trait]
impl ScheduleStore for InMemoryScheduleStore {
    async fn create(&self, mut schedule: Schedule) -> Result<StoredSchedule, StoreError> {
        if schedule.id.is_empty() {
            schedule.id = generate_id();
        }
        let stored = StoredSchedule::new(self.next_version(), schedule);

        match self.data.entry(stored.schedule.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::already_exists(&stored.schedule.id)),
            Entry::Vacant(slot) => {
                slot.insert(stored.clone());
                Ok(stored)
            }
        }
    }

    async fn fetch(&self, id: &str) -> Result<Option<StoredSchedule>, StoreError> {
        Ok(self.data.get(id).map(|entry| entry.value().clone()))
    }

    async fn commit(
        &self,
        id: &str,
        update: ScheduleUpdate,
        expected_version: Option<u64>,
    ) -> Result<StoredSchedule, StoreError> {
        update.validate()?;

        let mut entry = self
            .data
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(id))?;

        if let Some(expected) = expected_version
            && entry.version != expected
        {
            return Err(StoreError::version_conflict(expected, entry.version));
        }

        // Apply against a copy so a rejected field update leaves the record
        // untouched.
        let mut schedule = entry.schedule.clone();
        apply_update(&mut schedule, &update)?;
        schedule.updated_at = Some(now_utc());

        entry.schedule = schedule;
        entry.version = self.next_version();
        Ok(entry.value().clone())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        // Idempotent: deleting an absent record is a success.
        self.data.remove(id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<StoredSchedule>, StoreError> {
        let results: Vec<StoredSchedule> =
            self.data.iter().map(|entry| entry.value().clone()).collect();
        Ok(Self::sorted_newest_first(results))
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<StoredSchedule>, StoreError> {
        let results: Vec<StoredSchedule> = self
            .data
            .iter()
            .filter(|entry| entry.schedule.user_id.as_deref() == Some(user_id))
            .map(|entry| entry.value().clone())
            .collect();
        Ok(Self::sorted_newest_first(results))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsched_core::{ScheduleDraft, ScheduleStatus, TransitionEntry, UtcDateTime};
    use serde_json::json;
    use std::str::FromStr;

    fn test_schedule(patient: &str) -> Schedule {
        ScheduleDraft {
            patient_name: patient.into(),
            operation_type: "Appendectomy".into(),
            operation_date: "2026-08-12T09:00".into(),
            doctor_name: "Dr. Patel".into(),
            ..ScheduleDraft::default()
        }
        .build(now_utc())
        .unwrap()
    }

    fn entry(from: ScheduleStatus, to: ScheduleStatus) -> TransitionEntry {
        TransitionEntry::new(from, to, "tester", "")
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_version() {
        let store = InMemoryScheduleStore::new();
        let stored = store.create(test_schedule("Jane")).await.unwrap();

        assert!(!stored.schedule.id.is_empty());
        assert!(stored.version > 0);
        assert_eq!(store.len(), 1);

        let fetched = store.fetch(&stored.schedule.id).await.unwrap().unwrap();
        assert_eq!(fetched.schedule, stored.schedule);
        assert_eq!(fetched.version, stored.version);
    }

    #[tokio::test]
    async fn test_create_conflict_on_duplicate_id() {
        let store = InMemoryScheduleStore::new();
        let mut schedule = test_schedule("Jane");
        schedule.id = "fixed-id".into();
        store.create(schedule.clone()).await.unwrap();

        let result = store.create(schedule).await;
        assert!(matches!(result, Err(StoreError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn test_fetch_missing_returns_none() {
        let store = InMemoryScheduleStore::new();
        assert!(store.fetch("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_commit_applies_all_operations_atomically() {
        let store = InMemoryScheduleStore::new();
        let stored = store.create(test_schedule("Jane")).await.unwrap();

        let update = ScheduleUpdate::new()
            .with_status(ScheduleStatus::Emergency)
            .push_history(entry(ScheduleStatus::Scheduled, ScheduleStatus::Emergency))
            .append_remarks("[EMERGENCY]: patient unstable");

        let committed = store
            .commit(&stored.schedule.id, update, Some(stored.version))
            .await
            .unwrap();

        assert_eq!(committed.schedule.status, ScheduleStatus::Emergency);
        assert_eq!(committed.schedule.status_history.len(), 1);
        assert_eq!(
            committed.schedule.doctor_remarks,
            "[EMERGENCY]: patient unstable"
        );
        assert!(committed.schedule.updated_at.is_some());
        assert!(committed.version > stored.version);
    }

    #[tokio::test]
    async fn test_commit_stale_version_is_rejected() {
        let store = InMemoryScheduleStore::new();
        let stored = store.create(test_schedule("Jane")).await.unwrap();

        // A first commit moves the version forward.
        store
            .commit(
                &stored.schedule.id,
                ScheduleUpdate::new().with_status(ScheduleStatus::Postponed),
                Some(stored.version),
            )
            .await
            .unwrap();

        // Committing with the old version must fail and change nothing.
        let result = store
            .commit(
                &stored.schedule.id,
                ScheduleUpdate::new().with_status(ScheduleStatus::Cancelled),
                Some(stored.version),
            )
            .await;
        assert!(matches!(result, Err(StoreError::VersionConflict { .. })));

        let current = store.fetch(&stored.schedule.id).await.unwrap().unwrap();
        assert_eq!(current.schedule.status, ScheduleStatus::Postponed);
    }

    #[tokio::test]
    async fn test_commit_without_expected_version_always_applies() {
        let store = InMemoryScheduleStore::new();
        let stored = store.create(test_schedule("Jane")).await.unwrap();

        let committed = store
            .commit(
                &stored.schedule.id,
                ScheduleUpdate::new()
                    .set_field("operatingTheater", json!("OT-1"))
                    .unwrap(),
                None,
            )
            .await
            .unwrap();
        assert_eq!(
            committed.schedule.operating_theater.as_deref(),
            Some("OT-1")
        );
    }

    #[tokio::test]
    async fn test_commit_missing_record() {
        let store = InMemoryScheduleStore::new();
        let result = store
            .commit("ghost", ScheduleUpdate::new(), None)
            .await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_commit_rejects_unknown_merge_field() {
        let store = InMemoryScheduleStore::new();
        let stored = store.create(test_schedule("Jane")).await.unwrap();

        let update = ScheduleUpdate::new()
            .set_field("notARealField", json!("x"))
            .unwrap();
        let result = store.commit(&stored.schedule.id, update, None).await;
        assert!(matches!(result, Err(StoreError::InvalidUpdate { .. })));

        // The record is untouched by the rejected update.
        let current = store.fetch(&stored.schedule.id).await.unwrap().unwrap();
        assert_eq!(current.version, stored.version);
    }

    #[tokio::test]
    async fn test_commit_rejects_reserved_field_in_hand_built_update() {
        let store = InMemoryScheduleStore::new();
        let stored = store.create(test_schedule("Jane")).await.unwrap();

        let mut update = ScheduleUpdate::new();
        update
            .set_fields
            .insert("statusHistory".to_string(), json!([]));
        let result = store.commit(&stored.schedule.id, update, None).await;
        assert!(matches!(result, Err(StoreError::InvalidUpdate { .. })));
    }

    #[tokio::test]
    async fn test_history_append_preserves_existing_entries() {
        let store = InMemoryScheduleStore::new();
        let stored = store.create(test_schedule("Jane")).await.unwrap();
        let id = stored.schedule.id.clone();

        let first = entry(ScheduleStatus::Scheduled, ScheduleStatus::Postponed);
        store
            .commit(
                &id,
                ScheduleUpdate::new()
                    .with_status(ScheduleStatus::Postponed)
                    .push_history(first.clone()),
                None,
            )
            .await
            .unwrap();

        let second = entry(ScheduleStatus::Postponed, ScheduleStatus::Scheduled);
        let committed = store
            .commit(
                &id,
                ScheduleUpdate::new()
                    .with_status(ScheduleStatus::Scheduled)
                    .push_history(second.clone()),
                None,
            )
            .await
            .unwrap();

        assert_eq!(committed.schedule.status_history.len(), 2);
        assert_eq!(committed.schedule.status_history[0], first);
        assert_eq!(committed.schedule.status_history[1], second);
    }

    #[tokio::test]
    async fn test_remarks_append_below_existing_text() {
        let store = InMemoryScheduleStore::new();
        let mut schedule = test_schedule("Jane");
        schedule.doctor_remarks = "rescheduled per family request".into();
        let stored = store.create(schedule).await.unwrap();

        let committed = store
            .commit(
                &stored.schedule.id,
                ScheduleUpdate::new().append_remarks("[EMERGENCY]: sudden deterioration"),
                None,
            )
            .await
            .unwrap();
        assert_eq!(
            committed.schedule.doctor_remarks,
            "rescheduled per family request\n[EMERGENCY]: sudden deterioration"
        );
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = InMemoryScheduleStore::new();
        let stored = store.create(test_schedule("Jane")).await.unwrap();

        store.delete(&stored.schedule.id).await.unwrap();
        assert!(store.fetch(&stored.schedule.id).await.unwrap().is_none());

        // Second delete still succeeds.
        store.delete(&stored.schedule.id).await.unwrap();
        store.delete("never-existed").await.unwrap();
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let store = InMemoryScheduleStore::new();

        let mut older = test_schedule("Older");
        older.created_at = UtcDateTime::from_str("2026-01-01T08:00:00Z").unwrap();
        let mut newer = test_schedule("Newer");
        newer.created_at = UtcDateTime::from_str("2026-06-01T08:00:00Z").unwrap();

        store.create(older).await.unwrap();
        store.create(newer).await.unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].schedule.patient_name, "Newer");
        assert_eq!(all[1].schedule.patient_name, "Older");
    }

    #[tokio::test]
    async fn test_list_by_user_filters() {
        let store = InMemoryScheduleStore::new();

        let mut mine = test_schedule("Mine");
        mine.user_id = Some("user-1".into());
        let mut theirs = test_schedule("Theirs");
        theirs.user_id = Some("user-2".into());
        let unowned = test_schedule("Unowned");

        store.create(mine).await.unwrap();
        store.create(theirs).await.unwrap();
        store.create(unowned).await.unwrap();

        let result = store.list_by_user("user-1").await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].schedule.patient_name, "Mine");
    }

    #[tokio::test]
    async fn test_concurrent_creates_with_unique_ids() {
        use std::sync::Arc;
        use tokio::task::JoinSet;

        let store = Arc::new(InMemoryScheduleStore::new());
        let mut join_set = JoinSet::new();

        for i in 0..20 {
            let store = Arc::clone(&store);
            join_set.spawn(async move { store.create(test_schedule(&format!("p-{i}"))).await });
        }

        let mut success_count = 0;
        while let Some(result) = join_set.join_next().await {
            if result.unwrap().is_ok() {
                success_count += 1;
            }
        }

        assert_eq!(success_count, 20);
        assert_eq!(store.len(), 20);
    }

    #[tokio::test]
    async fn test_concurrent_commits_same_expected_version() {
        use std::sync::Arc;
        use tokio::task::JoinSet;

        let store = Arc::new(InMemoryScheduleStore::new());
        let stored = store.create(test_schedule("Jane")).await.unwrap();
        let id = stored.schedule.id.clone();

        let mut join_set = JoinSet::new();
        for _ in 0..10 {
            let store = Arc::clone(&store);
            let id = id.clone();
            let version = stored.version;
            join_set.spawn(async move {
                store
                    .commit(
                        &id,
                        ScheduleUpdate::new()
                            .with_status(ScheduleStatus::Postponed)
                            .push_history(entry(
                                ScheduleStatus::Scheduled,
                                ScheduleStatus::Postponed,
                            )),
                        Some(version),
                    )
                    .await
            });
        }

        let mut success_count = 0;
        let mut conflict_count = 0;
        while let Some(result) = join_set.join_next().await {
            match result.unwrap() {
                Ok(_) => success_count += 1,
                Err(StoreError::VersionConflict { .. }) => conflict_count += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        // Exactly one writer wins against a shared version token.
        assert_eq!(success_count, 1);
        assert_eq!(conflict_count, 9);

        let current = store.fetch(&id).await.unwrap().unwrap();
        assert_eq!(current.schedule.status_history.len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_unversioned_appends_never_lose_entries() {
        use std::sync::Arc;
        use tokio::task::JoinSet;

        let store = Arc::new(InMemoryScheduleStore::new());
        let stored = store.create(test_schedule("Jane")).await.unwrap();
        let id = stored.schedule.id.clone();

        let mut join_set = JoinSet::new();
        for _ in 0..50 {
            let store = Arc::clone(&store);
            let id = id.clone();
            join_set.spawn(async move {
                store
                    .commit(
                        &id,
                        ScheduleUpdate::new().push_history(entry(
                            ScheduleStatus::Scheduled,
                            ScheduleStatus::Postponed,
                        )),
                        None,
                    )
                    .await
            });
        }

        while let Some(result) = join_set.join_next().await {
            result.unwrap().unwrap();
        }

        let current = store.fetch(&id).await.unwrap().unwrap();
        assert_eq!(current.schedule.status_history.len(), 50);
    }
}
