use application::{Clause, SortKey, SortOrder, SortSpec, StoreQuery};
use domain::Business;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::trace;

/// Runs a store query over a snapshot of records: filter, sort, then cut at the limit.
pub fn evaluate(records: Vec<Arc<Business>>, query: &StoreQuery) -> Vec<Business> {
    // --- Step 1: Filtering ---
    let mut matched: Vec<Arc<Business>> = records
        .into_iter()
        .filter(|business| matches_query(business, query))
        .collect();
    trace!(count = matched.len(), "Records after filtering");

    // --- Step 2: Sorting ---
    matched.sort_unstable_by(|a, b| compare(a, b, query.sort));

    // --- Step 3: Hard cutoff (no pagination cursor) ---
    matched
        .into_iter()
        .take(query.limit)
        .map(|business| (*business).clone())
        .collect()
}

/// (any `any_of` clause, or no `any_of` clauses at all) AND every `all_of` clause.
pub fn matches_query(business: &Business, query: &StoreQuery) -> bool {
    let any = query.any_of.is_empty() || query.any_of.iter().any(|c| matches_clause(business, c));
    any && query.all_of.iter().all(|c| matches_clause(business, c))
}

fn matches_clause(business: &Business, clause: &Clause) -> bool {
    match clause {
        Clause::Contains { field, needle } => field
            .value_of(business)
            .to_lowercase()
            .contains(&needle.to_lowercase()),
        Clause::EqualsIgnoreCase { field, value } => {
            field.value_of(business).to_lowercase() == value.to_lowercase()
        }
        Clause::Equals { field, value } => field.value_of(business) == value,
    }
}

/// Orders by the sort key; ties fall back to the identifier so results are stable
/// across calls on an unordered map.
fn compare(a: &Business, b: &Business, sort: SortSpec) -> Ordering {
    let by_key = match sort.key {
        SortKey::DateAdded => a.date_added.cmp(&b.date_added),
        SortKey::Name => a.name.cmp(&b.name),
    };
    let ordered = match sort.order {
        SortOrder::Asc => by_key,
        SortOrder::Desc => by_key.reverse(),
    };
    ordered.then_with(|| a.id.cmp(&b.id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use application::{ListingFilters, SortBy};
    use chrono::{Duration, Utc};
    use domain::{BusinessField, BusinessId, NewBusiness};

    fn business(name: &str, category: &str, address: &str, age_days: i64) -> Arc<Business> {
        let draft = NewBusiness {
            name: Some(name.to_string()),
            category: Some(category.to_string()),
            address: Some(address.to_string()),
            description: Some(format!("{} in {}", name, address)),
            ..Default::default()
        }
        .validate()
        .expect("valid test business");
        Arc::new(draft.into_business(BusinessId::new(), Utc::now() - Duration::days(age_days)))
    }

    fn sample() -> Vec<Arc<Business>> {
        vec![
            business("Joe's Pizza", "Restaurant", "7 Carmine St", 3),
            business("Ann's Salon", "Beauty", "12 Orchard St", 1),
            business("Brooklyn Bikes", "Retail", "88 Pizza Ave", 2),
        ]
    }

    fn names(results: &[Business]) -> Vec<&str> {
        results.iter().map(|b| b.name.as_str()).collect()
    }

    fn query(search: Option<&str>, category: Option<&str>, sort: Option<&str>) -> StoreQuery {
        StoreQuery::from_filters(&ListingFilters {
            search: search.map(String::from),
            category: category.map(String::from),
            sort_by: sort.map(String::from),
            limit: None,
        })
        .unwrap()
    }

    #[test]
    fn search_matches_any_text_field_case_insensitively() {
        let results = evaluate(sample(), &query(Some("PIZZA"), None, Some("name_asc")));
        // name match and address match
        assert_eq!(names(&results), vec!["Brooklyn Bikes", "Joe's Pizza"]);
    }

    #[test]
    fn search_for_category_name() {
        let results = evaluate(sample(), &query(Some("beauty"), None, None));
        assert_eq!(names(&results), vec!["Ann's Salon"]);
    }

    #[test]
    fn search_is_literal_not_a_pattern() {
        let results = evaluate(sample(), &query(Some(".*"), None, None));
        assert!(results.is_empty());
    }

    #[test]
    fn category_filter_is_case_sensitive_exact() {
        let results = evaluate(sample(), &query(None, Some("Beauty"), None));
        assert_eq!(names(&results), vec!["Ann's Salon"]);
        assert!(evaluate(sample(), &query(None, Some("beauty"), None)).is_empty());
        assert!(evaluate(sample(), &query(None, Some("Beaut"), None)).is_empty());
    }

    #[test]
    fn search_and_category_combine() {
        let results = evaluate(sample(), &query(Some("pizza"), Some("Retail"), None));
        assert_eq!(names(&results), vec!["Brooklyn Bikes"]);
    }

    #[test]
    fn sorts_by_date_and_name() {
        let newest = evaluate(sample(), &query(None, None, None));
        assert_eq!(names(&newest), vec!["Ann's Salon", "Brooklyn Bikes", "Joe's Pizza"]);

        let oldest = evaluate(sample(), &query(None, None, Some("oldest")));
        assert_eq!(names(&oldest), vec!["Joe's Pizza", "Brooklyn Bikes", "Ann's Salon"]);

        let desc = evaluate(sample(), &query(None, None, Some("name_desc")));
        assert_eq!(names(&desc), vec!["Joe's Pizza", "Brooklyn Bikes", "Ann's Salon"]);
    }

    #[test]
    fn limit_is_a_hard_cutoff() {
        let query = StoreQuery {
            limit: 2,
            ..query(None, None, Some("name_asc"))
        };
        assert_eq!(names(&evaluate(sample(), &query)), vec!["Ann's Salon", "Brooklyn Bikes"]);
    }

    #[test]
    fn equals_ignore_case_clause_alone() {
        let query = StoreQuery {
            any_of: vec![Clause::EqualsIgnoreCase {
                field: BusinessField::Category,
                value: "RESTAURANT".to_string(),
            }],
            all_of: Vec::new(),
            sort: SortBy::Newest.spec(),
            limit: 10,
        };
        assert_eq!(names(&evaluate(sample(), &query)), vec!["Joe's Pizza"]);
    }
}
