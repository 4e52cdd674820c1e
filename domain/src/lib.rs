use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize}; // Wire and snapshot shape of a business record
use std::fmt;
use thiserror::Error; // For domain-specific errors
use uuid::Uuid;

pub mod category;
pub mod contact;

pub use category::{CategoryCard, category_card};
pub use contact::ContactMessage;

// --- Domain Errors ---
#[derive(Error, Debug, PartialEq)]
pub enum DomainError {
    #[error("Invalid business id: '{0}'")]
    InvalidIdentifier(String),
    #[error("Invalid field value for field '{field}': {reason}")]
    InvalidFieldValue { field: String, reason: String },
    #[error("Missing required field '{0}'")]
    MissingField(String),
    #[error("Invalid contact message: {}", .0.join("; "))]
    InvalidContact(Vec<String>),
}

// --- Business ID ---

/// Opaque identifier assigned by the store when a business is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusinessId(Uuid);

impl BusinessId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an identifier received from a caller (path segment, snapshot line).
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        Uuid::parse_str(raw.trim())
            .map(Self)
            .map_err(|_| DomainError::InvalidIdentifier(raw.to_string()))
    }
}

impl Default for BusinessId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BusinessId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// --- Business Record ---

/// Geographic coordinates of a business.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A single business directory entry as stored and served.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    #[serde(rename = "_id")] // Keeps the document-store shape the front end reads
    pub id: BusinessId,
    pub name: String,
    pub category: String,
    pub address: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    pub date_added: DateTime<Utc>,
}

/// Text fields a store query may filter, search or sort on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusinessField {
    Name,
    Category,
    Address,
    Description,
}

impl BusinessField {
    pub fn value_of<'a>(&self, business: &'a Business) -> &'a str {
        match self {
            BusinessField::Name => &business.name,
            BusinessField::Category => &business.category,
            BusinessField::Address => &business.address,
            BusinessField::Description => &business.description,
        }
    }
}

// --- Create Input ---

/// Fields accepted when creating a business. Identifier and timestamp are never accepted.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewBusiness {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub hours: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

/// A create request that passed boundary validation, waiting for the store to
/// assign an identifier and timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessDraft {
    pub name: String,
    pub category: String,
    pub address: String,
    pub description: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub hours: Option<String>,
    pub features: Vec<String>,
    pub location: Option<GeoPoint>,
}

impl NewBusiness {
    /// Checks the required fields. Accepted values are kept exactly as supplied.
    pub fn validate(self) -> Result<BusinessDraft, DomainError> {
        let name = required("name", self.name)?;
        let category = required("category", self.category)?;
        let address = required("address", self.address)?;
        let description = required("description", self.description)?;
        if let Some(location) = &self.location {
            check_location(location)?;
        }

        Ok(BusinessDraft {
            name,
            category,
            address,
            description,
            phone: self.phone,
            website: self.website,
            hours: self.hours,
            features: self.features,
            location: self.location,
        })
    }
}

impl BusinessDraft {
    pub fn into_business(self, id: BusinessId, date_added: DateTime<Utc>) -> Business {
        Business {
            id,
            name: self.name,
            category: self.category,
            address: self.address,
            description: self.description,
            phone: self.phone,
            website: self.website,
            hours: self.hours,
            features: self.features,
            location: self.location,
            date_added,
        }
    }
}

// --- Partial Update ---

/// Allow-list of fields a caller may replace on an existing business.
/// Anything else in the payload (including `_id` and `dateAdded`) is rejected.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BusinessPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub hours: Option<String>,
    pub features: Option<Vec<String>>,
    pub location: Option<GeoPoint>,
}

impl BusinessPatch {
    pub fn is_empty(&self) -> bool {
        *self == BusinessPatch::default()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        for (field, value) in [
            ("name", &self.name),
            ("category", &self.category),
            ("address", &self.address),
            ("description", &self.description),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(DomainError::InvalidFieldValue {
                    field: field.to_string(),
                    reason: "must not be blank".to_string(),
                });
            }
        }
        if let Some(location) = &self.location {
            check_location(location)?;
        }
        Ok(())
    }

    /// Replaces the supplied fields on `business`, leaving everything else untouched.
    pub fn apply_to(&self, business: &mut Business) {
        if let Some(name) = &self.name {
            business.name = name.clone();
        }
        if let Some(category) = &self.category {
            business.category = category.clone();
        }
        if let Some(address) = &self.address {
            business.address = address.clone();
        }
        if let Some(description) = &self.description {
            business.description = description.clone();
        }
        if let Some(phone) = &self.phone {
            business.phone = Some(phone.clone());
        }
        if let Some(website) = &self.website {
            business.website = Some(website.clone());
        }
        if let Some(hours) = &self.hours {
            business.hours = Some(hours.clone());
        }
        if let Some(features) = &self.features {
            business.features = features.clone();
        }
        if let Some(location) = self.location {
            business.location = Some(location);
        }
    }
}

// --- Field helpers ---

/// Whitespace-only counts as missing; a present value is returned untouched.
fn required(field: &str, value: Option<String>) -> Result<String, DomainError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(DomainError::MissingField(field.to_string())),
    }
}

fn check_location(location: &GeoPoint) -> Result<(), DomainError> {
    if !(-90.0..=90.0).contains(&location.lat) {
        return Err(DomainError::InvalidFieldValue {
            field: "location.lat".to_string(),
            reason: format!("latitude {} is outside [-90, 90]", location.lat),
        });
    }
    if !(-180.0..=180.0).contains(&location.lng) {
        return Err(DomainError::InvalidFieldValue {
            field: "location.lng".to_string(),
            reason: format!("longitude {} is outside [-180, 180]", location.lng),
        });
    }
    Ok(())
}
