use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use opsched_core::{Doctor, generate_id, now_utc};
use opsched_storage::{DoctorStore, DoctorUpdate, StoreError};

/// In-memory doctor roster store.
#[derive(Debug, Default)]
pub struct InMemoryDoctorStore {
    data: DashMap<String, Doctor>,
}

impl InMemoryDoctorStore {
    pub fn new() -> Self {
        Self {
            data: DashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[async_trait]
impl DoctorStore for InMemoryDoctorStore {
    async fn create(&self, mut doctor: Doctor) -> Result<Doctor, StoreError> {
        if doctor.id.is_empty() {
            doctor.id = generate_id();
        }
        match self.data.entry(doctor.id.clone()) {
            Entry::Occupied(_) => Err(StoreError::already_exists(&doctor.id)),
            Entry::Vacant(slot) => {
                slot.insert(doctor.clone());
                Ok(doctor)
            }
        }
    }

    async fn fetch(&self, id: &str) -> Result<Option<Doctor>, StoreError> {
        Ok(self.data.get(id).map(|entry| entry.value().clone()))
    }

    async fn update(&self, id: &str, update: DoctorUpdate) -> Result<Doctor, StoreError> {
        let mut entry = self
            .data
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(id))?;

        if let Some(name) = update.name {
            entry.name = name;
        }
        if let Some(specialization) = update.specialization {
            entry.specialization = specialization;
        }
        if let Some(phone) = update.phone {
            entry.phone = phone;
        }
        entry.updated_at = Some(now_utc());

        Ok(entry.value().clone())
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        // Idempotent, as for schedules.
        self.data.remove(id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Doctor>, StoreError> {
        let mut results: Vec<Doctor> =
            self.data.iter().map(|entry| entry.value().clone()).collect();
        results.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsched_core::DoctorDraft;

    fn test_doctor(name: &str) -> Doctor {
        DoctorDraft {
            name: name.into(),
            specialization: "General Surgery".into(),
            phone: "555-0101".into(),
        }
        .build(now_utc())
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let store = InMemoryDoctorStore::new();
        let doctor = store.create(test_doctor("Dr. Osei")).await.unwrap();

        assert!(!doctor.id.is_empty());
        let fetched = store.fetch(&doctor.id).await.unwrap().unwrap();
        assert_eq!(fetched, doctor);
    }

    #[tokio::test]
    async fn test_update_partial_fields() {
        let store = InMemoryDoctorStore::new();
        let doctor = store.create(test_doctor("Dr. Osei")).await.unwrap();

        let updated = store
            .update(
                &doctor.id,
                DoctorUpdate {
                    phone: Some("555-0202".into()),
                    ..DoctorUpdate::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.phone, "555-0202");
        assert_eq!(updated.name, "Dr. Osei");
        assert!(updated.updated_at.is_some());
    }

    #[tokio::test]
    async fn test_update_missing_entry() {
        let store = InMemoryDoctorStore::new();
        let result = store.update("ghost", DoctorUpdate::default()).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = InMemoryDoctorStore::new();
        let doctor = store.create(test_doctor("Dr. Osei")).await.unwrap();

        store.delete(&doctor.id).await.unwrap();
        store.delete(&doctor.id).await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_list_all() {
        let store = InMemoryDoctorStore::new();
        store.create(test_doctor("Dr. Osei")).await.unwrap();
        store.create(test_doctor("Dr. Chen")).await.unwrap();

        let roster = store.list().await.unwrap();
        assert_eq!(roster.len(), 2);
    }
}
