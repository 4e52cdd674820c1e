use crate::{ApplicationError, BusinessRepository};
use domain::{BusinessId, ContactMessage};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Serialize, Debug, PartialEq)]
pub struct ContactReceipt {
    pub message: String,
}

/// Accepts contact-form messages addressed to a business.
/// There is no outbound delivery; accepted messages are recorded in the log.
pub struct ContactService {
    repo: Arc<dyn BusinessRepository>,
}

impl ContactService {
    pub fn new(repo: Arc<dyn BusinessRepository>) -> Self {
        Self { repo }
    }

    #[instrument(skip(self, message))]
    pub async fn send(
        &self,
        raw_id: &str,
        message: ContactMessage,
    ) -> Result<ContactReceipt, ApplicationError> {
        let id = BusinessId::parse(raw_id)?;
        message.validate()?;

        let Some(business) = self.repo.get(&id).await? else {
            warn!(business_id = %id, "Contact failed: business not found");
            return Err(ApplicationError::NotFound(id.to_string()));
        };

        info!(
            business_id = %id,
            business = %business.name,
            sender = %message.name.trim(),
            subject = %message.subject.trim(),
            "Contact message accepted"
        );
        Ok(ContactReceipt {
            message: "Message sent".to_string(),
        })
    }
}
