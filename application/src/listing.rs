use crate::{ApplicationError, BusinessRepository, ListingFilters, StoreQuery};
use domain::{Business, BusinessId, BusinessPatch, GeoPoint, NewBusiness};
use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// What `create` does when the caller supplies no coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationPolicy {
    /// Leave `location` empty.
    None,
    /// Place the business uniformly within `spread` degrees (total width) around `center`.
    RandomNear { center: GeoPoint, spread: f64 },
}

impl LocationPolicy {
    /// Midtown Manhattan, 0.1 degree box.
    pub fn demo_default() -> Self {
        LocationPolicy::RandomNear {
            center: GeoPoint {
                lat: 40.7128,
                lng: -74.006,
            },
            spread: 0.1,
        }
    }

    pub fn assign<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<GeoPoint> {
        match *self {
            LocationPolicy::None => None,
            LocationPolicy::RandomNear { center, spread } => Some(GeoPoint {
                lat: center.lat + (rng.r#gen::<f64>() - 0.5) * spread,
                lng: center.lng + (rng.r#gen::<f64>() - 0.5) * spread,
            }),
        }
    }
}

#[derive(Serialize, Debug, PartialEq)]
pub struct DeleteResponse {
    pub message: String,
}

/// Service exposing the CRUD surface over the business store.
pub struct ListingService {
    repo: Arc<dyn BusinessRepository>,
    location_policy: LocationPolicy,
}

impl ListingService {
    pub fn new(repo: Arc<dyn BusinessRepository>, location_policy: LocationPolicy) -> Self {
        Self {
            repo,
            location_policy,
        }
    }

    #[instrument(
        skip(self, filters),
        fields(search = ?filters.search, category = ?filters.category)
    )]
    pub async fn list(&self, filters: &ListingFilters) -> Result<Vec<Business>, ApplicationError> {
        let query = StoreQuery::from_filters(filters)?;
        debug!(?query, "Listing businesses");
        let businesses = self.repo.find(&query).await.map_err(|e| {
            error!("Failed to list businesses: {}", e);
            e
        })?;
        info!(count = businesses.len(), "Listed businesses");
        Ok(businesses)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, raw_id: &str) -> Result<Business, ApplicationError> {
        let id = BusinessId::parse(raw_id)?;
        self.repo.get(&id).await?.ok_or_else(|| {
            warn!(business_id = %id, "Business not found");
            ApplicationError::NotFound(id.to_string())
        })
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: NewBusiness) -> Result<Business, ApplicationError> {
        let mut draft = input.validate()?;
        if draft.location.is_none() {
            draft.location = self.location_policy.assign(&mut rand::thread_rng());
        }

        let business = self.repo.insert(draft).await?;
        info!(business_id = %business.id, category = %business.category, "Business created");
        Ok(business)
    }

    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        raw_id: &str,
        patch: BusinessPatch,
    ) -> Result<Business, ApplicationError> {
        let id = BusinessId::parse(raw_id)?;
        if patch.is_empty() {
            return Err(ApplicationError::InvalidInput(
                "Update must contain at least one field".to_string(),
            ));
        }
        patch.validate()?;

        match self.repo.update(&id, &patch).await? {
            Some(business) => {
                info!(business_id = %id, "Business updated");
                Ok(business)
            }
            None => {
                warn!(business_id = %id, "Update failed: business not found");
                Err(ApplicationError::NotFound(id.to_string()))
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, raw_id: &str) -> Result<DeleteResponse, ApplicationError> {
        let id = BusinessId::parse(raw_id)?;
        if !self.repo.delete(&id).await? {
            warn!(business_id = %id, "Deletion failed: business not found");
            return Err(ApplicationError::NotFound(id.to_string()));
        }
        info!(business_id = %id, "Business deleted");
        Ok(DeleteResponse {
            message: "Business deleted successfully".to_string(),
        })
    }
}
