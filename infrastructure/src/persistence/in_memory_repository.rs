use crate::persistence::snapshot;
use crate::search::query_evaluator;
use application::{ApplicationError, BusinessRepository, StoreQuery};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use domain::{Business, BusinessDraft, BusinessId, BusinessPatch};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Business collection held in a concurrent map, optionally backed by a JSONL snapshot
/// that is loaded on `open` and written on `close`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBusinessRepository {
    // Business ID -> Business
    businesses: Arc<DashMap<BusinessId, Arc<Business>>>,
    snapshot_path: Option<PathBuf>,
}

impl InMemoryBusinessRepository {
    /// A purely in-memory store; nothing survives the process.
    pub fn new() -> Self {
        Self {
            businesses: Arc::new(DashMap::new()),
            snapshot_path: None,
        }
    }

    /// Opens the store, loading records from `snapshot_path` when one is configured.
    #[instrument]
    pub async fn open(snapshot_path: Option<PathBuf>) -> Result<Self, ApplicationError> {
        let businesses = DashMap::new();
        if let Some(path) = &snapshot_path {
            let records = snapshot::load(path).await.map_err(|e| {
                error!(file = ?path, "Failed to load snapshot: {}", e);
                ApplicationError::StoreUnavailable(format!("Failed to load snapshot: {}", e))
            })?;
            for record in records {
                businesses.insert(record.id, Arc::new(record));
            }
        }
        info!(
            count = businesses.len(),
            persistent = snapshot_path.is_some(),
            "Business store opened"
        );
        Ok(Self {
            businesses: Arc::new(businesses),
            snapshot_path,
        })
    }

    /// Cheap clones of every record currently stored.
    fn records(&self) -> Vec<Arc<Business>> {
        self.businesses
            .iter()
            .map(|entry| entry.value().clone())
            .collect()
    }
}

#[async_trait]
impl BusinessRepository for InMemoryBusinessRepository {
    #[instrument(skip(self, draft))]
    async fn insert(&self, draft: BusinessDraft) -> Result<Business, ApplicationError> {
        let business = draft.into_business(BusinessId::new(), Utc::now());
        debug!(business_id = %business.id, "Inserting business into in-memory store");
        self.businesses
            .insert(business.id, Arc::new(business.clone()));
        Ok(business)
    }

    #[instrument(skip(self))]
    async fn get(&self, id: &BusinessId) -> Result<Option<Business>, ApplicationError> {
        debug!(business_id = %id, "Getting business from in-memory store");
        Ok(self.businesses.get(id).map(|entry| (**entry).clone()))
    }

    #[instrument(skip(self, patch))]
    async fn update(
        &self,
        id: &BusinessId,
        patch: &BusinessPatch,
    ) -> Result<Option<Business>, ApplicationError> {
        debug!(business_id = %id, "Updating business in in-memory store");
        // The entry guard serializes concurrent writers to the same record (last write wins)
        let Some(mut entry) = self.businesses.get_mut(id) else {
            return Ok(None);
        };
        let mut updated = (**entry).clone();
        patch.apply_to(&mut updated);
        *entry = Arc::new(updated.clone());
        Ok(Some(updated))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &BusinessId) -> Result<bool, ApplicationError> {
        debug!(business_id = %id, "Deleting business from in-memory store");
        Ok(self.businesses.remove(id).is_some())
    }

    #[instrument(skip(self, query))]
    async fn find(&self, query: &StoreQuery) -> Result<Vec<Business>, ApplicationError> {
        let results = query_evaluator::evaluate(self.records(), query);
        debug!(returned = results.len(), "In-memory query finished");
        Ok(results)
    }

    #[instrument(skip(self))]
    async fn distinct_categories(&self) -> Result<Vec<String>, ApplicationError> {
        let categories: HashSet<String> = self
            .businesses
            .iter()
            .map(|entry| entry.value().category.clone())
            .collect();
        Ok(categories.into_iter().collect())
    }

    async fn count(&self) -> Result<usize, ApplicationError> {
        Ok(self.businesses.len())
    }

    #[instrument(skip(self))]
    async fn close(&self) -> Result<(), ApplicationError> {
        let Some(path) = &self.snapshot_path else {
            debug!("No snapshot configured, nothing to flush");
            return Ok(());
        };
        let mut records: Vec<Business> = self
            .records()
            .into_iter()
            .map(|business| (*business).clone())
            .collect();
        records.sort_by(|a, b| a.date_added.cmp(&b.date_added).then_with(|| a.id.cmp(&b.id)));
        snapshot::write(path, &records).await.map_err(|e| {
            error!(file = ?path, "Failed to write snapshot: {}", e);
            ApplicationError::StoreUnavailable(format!("Failed to write snapshot: {}", e))
        })
    }
}
