use crate::{ApplicationError, BusinessRepository};
use domain::{CategoryCard, category_card};
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Service exposing the distinct categories derived from stored records.
pub struct CategoryService {
    repo: Arc<dyn BusinessRepository>,
    locality: Option<String>,
}

impl CategoryService {
    pub fn new(repo: Arc<dyn BusinessRepository>) -> Self {
        Self {
            repo,
            locality: None,
        }
    }

    /// Place named in the card blurbs.
    pub fn with_locality(mut self, locality: impl Into<String>) -> Self {
        self.locality = Some(locality.into());
        self
    }

    #[instrument(skip(self))]
    pub async fn categories(&self) -> Result<Vec<String>, ApplicationError> {
        let categories = self.repo.distinct_categories().await.map_err(|e| {
            error!("Failed to fetch categories: {}", e);
            e
        })?;
        info!(count = categories.len(), "Fetched distinct categories");
        Ok(categories)
    }

    /// Categories with their browsing-page presentation, alphabetical.
    #[instrument(skip(self))]
    pub async fn category_cards(&self) -> Result<Vec<CategoryCard>, ApplicationError> {
        let mut categories = self.categories().await?;
        categories.sort();
        let locality = self.locality.as_deref();
        Ok(categories
            .iter()
            .map(|c| category_card(c, locality))
            .collect())
    }
}
