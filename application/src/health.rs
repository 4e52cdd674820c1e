use crate::{ApplicationError, BusinessRepository};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, instrument};

#[derive(Serialize, Debug, PartialEq)]
pub struct HealthReport {
    pub status: &'static str,
    pub message: String,
    pub businesses: usize,
}

pub struct HealthService {
    repo: Arc<dyn BusinessRepository>,
}

impl HealthService {
    pub fn new(repo: Arc<dyn BusinessRepository>) -> Self {
        Self { repo }
    }

    /// Round-trips to the store; any failure means unhealthy.
    #[instrument(skip(self))]
    pub async fn check(&self) -> Result<HealthReport, ApplicationError> {
        let businesses = self.repo.count().await.map_err(|e| {
            error!("Health check failed: {}", e);
            e
        })?;
        Ok(HealthReport {
            status: "ok",
            message: "Connected to store".to_string(),
            businesses,
        })
    }
}
