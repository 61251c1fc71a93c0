use std::sync::Arc;
use tracing::info;

use super::error::{ServiceError, ServiceResult};
use crate::database::models::{TaxonomyEntry, TaxonomyKind};
use crate::database::{StoreError, TaxonomyStore};

#[derive(Clone)]
pub struct TaxonomyService {
    store: Arc<dyn TaxonomyStore>,
}

impl TaxonomyService {
    pub fn new(store: Arc<dyn TaxonomyStore>) -> Self {
        Self { store }
    }

    pub async fn create(&self, kind: TaxonomyKind, name: &str) -> ServiceResult<TaxonomyEntry> {
        let name = name.trim();
        let entry = self.store.create(kind, name).await.map_err(|e| match e {
            StoreError::Duplicate(_) => ServiceError::Conflict(format!("{} '{}' already exists", kind.label(), name)),
            other => other.into(),
        })?;
        info!("Created {} {} ({})", kind.label(), entry.id, entry.name);
        Ok(entry)
    }

    pub async fn list(&self, kind: TaxonomyKind) -> ServiceResult<Vec<TaxonomyEntry>> {
        Ok(self.store.list(kind).await?)
    }

    pub async fn delete(&self, kind: TaxonomyKind, id: i64) -> ServiceResult<()> {
        let deleted = self.store.delete(kind, id).await.map_err(|e| match e {
            StoreError::InUse(_) => ServiceError::Conflict(format!(
                "{} {} is still used by job postings",
                kind.label(),
                id
            )),
            other => other.into(),
        })?;
        if !deleted {
            return Err(ServiceError::NotFound(format!("{} {} not found", kind.label(), id)));
        }
        info!("Deleted {} {}", kind.label(), id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Stores;

    #[tokio::test]
    async fn names_are_unique_per_kind() {
        let service = TaxonomyService::new(Stores::in_memory().taxonomy);
        service.create(TaxonomyKind::Location, "Busan").await.unwrap();

        let again = service.create(TaxonomyKind::Location, " Busan ").await;
        assert!(matches!(again, Err(ServiceError::Conflict(_))));
        assert!(service.create(TaxonomyKind::EmploymentType, "Busan").await.is_ok());
    }

    #[tokio::test]
    async fn list_is_ordered_by_name() {
        let service = TaxonomyService::new(Stores::in_memory().taxonomy);
        for name in ["Seoul", "Busan", "Incheon"] {
            service.create(TaxonomyKind::Location, name).await.unwrap();
        }
        let names: Vec<_> = service
            .list(TaxonomyKind::Location)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Busan", "Incheon", "Seoul"]);
    }

    #[tokio::test]
    async fn delete_missing_entry_is_not_found() {
        let service = TaxonomyService::new(Stores::in_memory().taxonomy);
        assert!(matches!(
            service.delete(TaxonomyKind::EmploymentType, 7).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
