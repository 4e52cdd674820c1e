// Translation of listing filters (query-string parameters) into a store query.
use crate::ApplicationError;
use domain::BusinessField;
use serde::Deserialize;

/// Category value meaning "do not filter on category".
pub const ALL_CATEGORIES: &str = "all_categories";
pub const DEFAULT_LIST_LIMIT: usize = 100;
// Sensible maximum limit to prevent abuse
pub const MAX_LIST_LIMIT: usize = 1000;

/// Raw listing parameters as they arrive on `GET /businesses`.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ListingFilters {
    pub search: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    /// Kept as text so a malformed value can be reported instead of rejected by the extractor.
    pub limit: Option<String>,
}

/// The closed set of listing orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    Newest,
    Oldest,
    NameAsc,
    NameDesc,
}

impl SortBy {
    /// Unrecognized or absent values mean newest first.
    pub fn from_param(param: Option<&str>) -> Self {
        match param.map(str::trim) {
            Some("oldest") => SortBy::Oldest,
            Some("name_asc") => SortBy::NameAsc,
            Some("name_desc") => SortBy::NameDesc,
            _ => SortBy::Newest,
        }
    }

    pub fn spec(self) -> SortSpec {
        match self {
            SortBy::Newest => SortSpec {
                key: SortKey::DateAdded,
                order: SortOrder::Desc,
            },
            SortBy::Oldest => SortSpec {
                key: SortKey::DateAdded,
                order: SortOrder::Asc,
            },
            SortBy::NameAsc => SortSpec {
                key: SortKey::Name,
                order: SortOrder::Asc,
            },
            SortBy::NameDesc => SortSpec {
                key: SortKey::Name,
                order: SortOrder::Desc,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    DateAdded,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub key: SortKey,
    pub order: SortOrder,
}

/// One condition on a text field. Values are matched literally, never as patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Clause {
    /// Case-insensitive substring match.
    Contains { field: BusinessField, needle: String },
    /// Case-insensitive whole-value match.
    EqualsIgnoreCase { field: BusinessField, value: String },
    /// Exact, case-sensitive match.
    Equals { field: BusinessField, value: String },
}

/// Store-level query: a record matches when any `any_of` clause matches (or the list is
/// empty) and every `all_of` clause matches. Results are sorted then cut at `limit`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreQuery {
    pub any_of: Vec<Clause>,
    pub all_of: Vec<Clause>,
    pub sort: SortSpec,
    pub limit: usize,
}

impl StoreQuery {
    /// Every record, newest first, no cutoff.
    pub fn all() -> Self {
        Self {
            any_of: Vec::new(),
            all_of: Vec::new(),
            sort: SortBy::Newest.spec(),
            limit: usize::MAX,
        }
    }

    /// Builds the store query for a listing request.
    pub fn from_filters(filters: &ListingFilters) -> Result<Self, ApplicationError> {
        let limit = parse_limit(filters.limit.as_deref())?;
        let sort = SortBy::from_param(filters.sort_by.as_deref()).spec();

        let mut any_of = Vec::new();
        if let Some(search) = non_blank(filters.search.as_deref()) {
            for field in [
                BusinessField::Name,
                BusinessField::Description,
                BusinessField::Category,
                BusinessField::Address,
            ] {
                any_of.push(Clause::Contains {
                    field,
                    needle: search.to_string(),
                });
            }
            // Whole-category match, kept alongside the substring clauses
            any_of.push(Clause::EqualsIgnoreCase {
                field: BusinessField::Category,
                value: search.to_string(),
            });
        }

        let mut all_of = Vec::new();
        if let Some(category) = non_blank(filters.category.as_deref()) {
            if category.trim() != ALL_CATEGORIES {
                all_of.push(Clause::Equals {
                    field: BusinessField::Category,
                    value: category.to_string(),
                });
            }
        }

        Ok(Self {
            any_of,
            all_of,
            sort,
            limit,
        })
    }
}

/// Whitespace-only parameters count as absent; anything else is passed on verbatim.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_limit(raw: Option<&str>) -> Result<usize, ApplicationError> {
    let Some(raw) = non_blank(raw).map(str::trim) else {
        return Ok(DEFAULT_LIST_LIMIT);
    };
    match raw.parse::<usize>() {
        Ok(0) | Err(_) => Err(ApplicationError::InvalidInput(format!(
            "limit must be a positive integer, got '{}'",
            raw
        ))),
        Ok(limit) => Ok(limit.min(MAX_LIST_LIMIT)),
    }
}
