use async_trait::async_trait;
use domain::{Business, BusinessDraft, BusinessId, BusinessPatch, DomainError};
use thiserror::Error;

pub mod categories;
pub mod contact;
pub mod health;
pub mod listing;
pub mod query;
pub mod seo;

pub use categories::CategoryService;
pub use contact::{ContactReceipt, ContactService};
pub use health::{HealthReport, HealthService};
pub use listing::{DeleteResponse, ListingService, LocationPolicy};
pub use query::{
    ALL_CATEGORIES, Clause, DEFAULT_LIST_LIMIT, ListingFilters, MAX_LIST_LIMIT, SortBy, SortKey,
    SortOrder, SortSpec, StoreQuery,
};
pub use seo::{SeoService, SiteInfo, SitemapEntry, render_sitemap_xml};

// --- Application Errors ---
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Business not found: {0}")]
    NotFound(String),
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Domain validation error: {0}")]
    DomainError(#[from] DomainError), // Propagate domain errors cleanly
}

// --- Infrastructure Interfaces (Traits) ---

/// Interface for the document collection holding business records.
/// Implementations own identifier and timestamp assignment.
#[async_trait]
pub trait BusinessRepository: Send + Sync {
    /// Stores a validated draft, assigning a fresh identifier and creation timestamp.
    async fn insert(&self, draft: BusinessDraft) -> Result<Business, ApplicationError>;
    /// Retrieves a business by its ID.
    async fn get(&self, id: &BusinessId) -> Result<Option<Business>, ApplicationError>;
    /// Applies a partial update. Returns the updated record, or None if the ID is unknown.
    async fn update(
        &self,
        id: &BusinessId,
        patch: &BusinessPatch,
    ) -> Result<Option<Business>, ApplicationError>;
    /// Deletes a business by its ID. Returns true if deleted.
    async fn delete(&self, id: &BusinessId) -> Result<bool, ApplicationError>;
    /// Runs a store query: filter, sort, then cut off at the query limit.
    async fn find(&self, query: &StoreQuery) -> Result<Vec<Business>, ApplicationError>;
    /// Deduplicated category values across all records, in no particular order.
    async fn distinct_categories(&self) -> Result<Vec<String>, ApplicationError>;
    /// Number of stored records.
    async fn count(&self) -> Result<usize, ApplicationError>;
    /// Releases the store on shutdown (flushes anything pending).
    async fn close(&self) -> Result<(), ApplicationError> {
        Ok(())
    }
}
