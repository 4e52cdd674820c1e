use crate::config::Config;
use crate::error::{map_application_error_to_response, message_response};
use application::{
    ApplicationError, BusinessRepository, CategoryService, ContactService, HealthService,
    ListingFilters, ListingService, SeoService, render_sitemap_xml,
};
use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Json as JsonResponse, Response},
    routing::{get, post},
};
use domain::{Business, BusinessPatch, ContactMessage, NewBusiness};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    listing_service: Arc<ListingService>,
    category_service: Arc<CategoryService>,
    seo_service: Arc<SeoService>,
    contact_service: Arc<ContactService>,
    health_service: Arc<HealthService>,
    lenient_reads: bool,
}

impl AppState {
    /// Wires every service to the same store handle.
    pub fn new(repo: Arc<dyn BusinessRepository>, config: &Config) -> Self {
        Self {
            listing_service: Arc::new(ListingService::new(repo.clone(), config.location_policy)),
            category_service: Arc::new(
                CategoryService::new(repo.clone()).with_locality(config.site.locality.clone()),
            ),
            seo_service: Arc::new(SeoService::new(repo.clone(), config.site.clone())),
            contact_service: Arc::new(ContactService::new(repo.clone())),
            health_service: Arc::new(HealthService::new(repo)),
            lenient_reads: config.lenient_reads,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/sitemap.xml", get(sitemap_handler))
        // Business Endpoints
        .route(
            "/businesses",
            get(list_businesses_handler).post(create_business_handler),
        )
        .route(
            "/businesses/:id",
            get(get_business_handler)
                .put(update_business_handler)
                .delete(delete_business_handler),
        )
        .route(
            "/businesses/:id/structured-data",
            get(structured_data_handler),
        )
        .route("/businesses/:id/contact", post(contact_handler))
        // Category Endpoints
        .route("/categories", get(list_categories_handler))
        .route("/categories/cards", get(category_cards_handler))
        .layer(TraceLayer::new_for_http())
        // Provide the application state to the handlers
        .with_state(state)
}

// --- API Handlers ---

async fn health_check(State(state): State<AppState>) -> Response {
    info!("Health check endpoint called");
    match state.health_service.check().await {
        Ok(report) => (StatusCode::OK, JsonResponse(report)).into_response(),
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                JsonResponse(json!({ "status": "error", "message": "Failed to connect to store" })),
            )
                .into_response()
        }
    }
}

// --- Business Handlers ---

/// Handler for listing businesses (GET /businesses?search=&category=&sortBy=&limit=).
async fn list_businesses_handler(
    State(state): State<AppState>,
    filters: Result<Query<ListingFilters>, QueryRejection>,
) -> Response {
    let Query(filters) = match filters {
        Ok(filters) => filters,
        Err(rejection) => {
            warn!("Rejected listing query: {}", rejection.body_text());
            return message_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };
    info!(?filters, "Received request to list businesses");
    match state.listing_service.list(&filters).await {
        Ok(businesses) => (StatusCode::OK, JsonResponse(businesses)).into_response(),
        Err(ApplicationError::StoreUnavailable(msg)) if state.lenient_reads => {
            warn!("Store unavailable, answering with an empty list: {}", msg);
            (StatusCode::OK, JsonResponse(Vec::<Business>::new())).into_response()
        }
        Err(e) => map_application_error_to_response(e),
    }
}

/// Handler for creating a business (POST /businesses).
async fn create_business_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewBusiness>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return reject_body(rejection),
    };
    info!("Received request to create business");
    match state.listing_service.create(payload).await {
        Ok(business) => (StatusCode::CREATED, JsonResponse(business)).into_response(),
        Err(e) => map_application_error_to_response(e),
    }
}

/// Handler for getting a business (GET /businesses/:id).
async fn get_business_handler(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    info!(business_id = %id, "Received request to get business");
    match state.listing_service.get(&id).await {
        Ok(business) => (StatusCode::OK, JsonResponse(business)).into_response(),
        Err(e) => map_application_error_to_response(e),
    }
}

/// Handler for a partial update (PUT /businesses/:id).
async fn update_business_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<BusinessPatch>, JsonRejection>,
) -> Response {
    let Json(patch) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return reject_body(rejection),
    };
    info!(business_id = %id, "Received request to update business");
    match state.listing_service.update(&id, patch).await {
        Ok(business) => (StatusCode::OK, JsonResponse(business)).into_response(),
        Err(e) => map_application_error_to_response(e),
    }
}

/// Handler for deleting a business (DELETE /businesses/:id).
async fn delete_business_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    info!(business_id = %id, "Received request to delete business");
    match state.listing_service.delete(&id).await {
        Ok(ack) => (StatusCode::OK, JsonResponse(ack)).into_response(),
        Err(e) => map_application_error_to_response(e),
    }
}

async fn structured_data_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match state.seo_service.structured_data(&id).await {
        Ok(documents) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/ld+json")],
            documents.to_string(),
        )
            .into_response(),
        Err(e) => map_application_error_to_response(e),
    }
}

/// Handler for the contact form (POST /businesses/:id/contact).
async fn contact_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ContactMessage>, JsonRejection>,
) -> Response {
    let Json(message) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return reject_body(rejection),
    };
    info!(business_id = %id, "Received contact message");
    match state.contact_service.send(&id, message).await {
        Ok(receipt) => (StatusCode::ACCEPTED, JsonResponse(receipt)).into_response(),
        Err(e) => map_application_error_to_response(e),
    }
}

// --- Category Handlers ---

async fn list_categories_handler(State(state): State<AppState>) -> Response {
    info!("Received request to list categories");
    match state.category_service.categories().await {
        Ok(categories) => (StatusCode::OK, JsonResponse(categories)).into_response(),
        Err(ApplicationError::StoreUnavailable(msg)) if state.lenient_reads => {
            warn!("Store unavailable, answering with no categories: {}", msg);
            (StatusCode::OK, JsonResponse(Vec::<String>::new())).into_response()
        }
        Err(e) => map_application_error_to_response(e),
    }
}

async fn category_cards_handler(State(state): State<AppState>) -> Response {
    match state.category_service.category_cards().await {
        Ok(cards) => (StatusCode::OK, JsonResponse(cards)).into_response(),
        Err(e) => map_application_error_to_response(e),
    }
}

// --- SEO Handlers ---

async fn sitemap_handler(State(state): State<AppState>) -> Response {
    let entries = state.seo_service.sitemap().await;
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/xml")],
        render_sitemap_xml(&entries),
    )
        .into_response()
}

/// Malformed or disallowed request bodies are input errors (400), not 422.
fn reject_body(rejection: JsonRejection) -> Response {
    warn!("Rejected request body: {}", rejection.body_text());
    message_response(StatusCode::BAD_REQUEST, rejection.body_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use domain::{BusinessDraft, BusinessId};
    use infrastructure::InMemoryBusinessRepository;
    use serde_json::Value;
    use tower::ServiceExt;

    fn test_config(lenient_reads: bool) -> Config {
        let mut config = Config::from_lookup(|_| None);
        config.site.base_url = "https://directory.test".to_string();
        config.lenient_reads = lenient_reads;
        config
    }

    fn app() -> Router {
        let repo = Arc::new(InMemoryBusinessRepository::new());
        router(AppState::new(repo, &test_config(false)))
    }

    /// A store whose every call fails, to exercise the 500 paths and fallbacks.
    struct UnavailableRepository;

    #[async_trait]
    impl BusinessRepository for UnavailableRepository {
        async fn insert(&self, _: BusinessDraft) -> Result<Business, ApplicationError> {
            Err(down())
        }
        async fn get(&self, _: &BusinessId) -> Result<Option<Business>, ApplicationError> {
            Err(down())
        }
        async fn update(
            &self,
            _: &BusinessId,
            _: &BusinessPatch,
        ) -> Result<Option<Business>, ApplicationError> {
            Err(down())
        }
        async fn delete(&self, _: &BusinessId) -> Result<bool, ApplicationError> {
            Err(down())
        }
        async fn find(
            &self,
            _: &application::StoreQuery,
        ) -> Result<Vec<Business>, ApplicationError> {
            Err(down())
        }
        async fn distinct_categories(&self) -> Result<Vec<String>, ApplicationError> {
            Err(down())
        }
        async fn count(&self) -> Result<usize, ApplicationError> {
            Err(down())
        }
    }

    fn down() -> ApplicationError {
        ApplicationError::StoreUnavailable("connection refused".to_string())
    }

    fn unavailable_app(lenient_reads: bool) -> Router {
        router(AppState::new(
            Arc::new(UnavailableRepository),
            &test_config(lenient_reads),
        ))
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Vec<u8>) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let (status, bytes) = send(app, method, uri, body).await;
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create(app: &Router, name: &str, category: &str) -> Value {
        let (status, body) = send_json(
            app,
            "POST",
            "/businesses",
            Some(json!({
                "name": name,
                "category": category,
                "address": "1 Main St",
                "description": format!("{} description", name),
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }

    #[tokio::test]
    async fn create_then_get_round_trip() {
        let app = app();
        let created = create(&app, " Joe's Pizza ", "Restaurant").await;
        let id = created["_id"].as_str().unwrap();
        assert_eq!(created["name"], " Joe's Pizza ");
        assert!(created["dateAdded"].is_string());
        assert!(created["location"]["lat"].is_number());

        let (status, fetched) = send_json(&app, "GET", &format!("/businesses/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn create_validation_errors_are_bad_requests() {
        let app = app();
        let (status, body) = send_json(
            &app,
            "POST",
            "/businesses",
            Some(json!({ "name": "No Category", "address": "x", "description": "y" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("category"));

        let (status, _) = send_json(
            &app,
            "POST",
            "/businesses",
            Some(json!({
                "name": "a",
                "category": "b",
                "address": "c",
                "description": "d",
                "rating": 5,
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_and_unknown_ids() {
        let app = app();
        let (status, _) = send_json(&app, "GET", "/businesses/not-an-id", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let missing = format!("/businesses/{}", BusinessId::new());
        let (status, body) = send_json(&app, "GET", &missing, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["message"].as_str().unwrap().contains("not found"));

        let (status, _) = send_json(&app, "PUT", &missing, Some(json!({ "name": "X" }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send_json(&app, "DELETE", &missing, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send_json(&app, "DELETE", "/businesses/123", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_replaces_only_supplied_fields() {
        let app = app();
        let created = create(&app, "Ann's Salon", "Beauty").await;
        let uri = format!("/businesses/{}", created["_id"].as_str().unwrap());

        let (status, updated) =
            send_json(&app, "PUT", &uri, Some(json!({ "hours": "9-5" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["hours"], "9-5");
        assert_eq!(updated["name"], created["name"]);
        assert_eq!(updated["dateAdded"], created["dateAdded"]);

        let timestamp = json!({ "dateAdded": "2020-01-01T00:00:00Z" });
        let (status, _) = send_json(&app, "PUT", &uri, Some(timestamp)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send_json(&app, "PUT", &uri, Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let app = app();
        let created = create(&app, "Ann's Salon", "Beauty").await;
        let uri = format!("/businesses/{}", created["_id"].as_str().unwrap());

        let (status, body) = send_json(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Business deleted successfully");

        let (status, _) = send_json(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_search_category_and_categories() {
        let app = app();
        create(&app, "Joe's Pizza", "Restaurant").await;
        create(&app, "Ann's Salon", "Beauty").await;

        let (status, body) = send_json(&app, "GET", "/businesses?search=pizza", None).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Joe's Pizza"]);

        let (_, body) = send_json(&app, "GET", "/businesses?category=Beauty", None).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["name"], "Ann's Salon");

        let uri = "/businesses?category=all_categories&sortBy=name_asc";
        let (_, body) = send_json(&app, "GET", uri, None).await;
        assert_eq!(body[0]["name"], "Ann's Salon");
        assert_eq!(body[1]["name"], "Joe's Pizza");

        let (status, _) = send_json(&app, "GET", "/businesses?limit=abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = send_json(&app, "GET", "/businesses?category=%20Beauty%20", None).await;
        assert_eq!(body, json!([]));

        let (status, body) = send_json(&app, "GET", "/categories", None).await;
        assert_eq!(status, StatusCode::OK);
        let mut categories: Vec<String> = serde_json::from_value(body).unwrap();
        categories.sort();
        assert_eq!(categories, vec!["Beauty".to_string(), "Restaurant".to_string()]);

        let (_, cards) = send_json(&app, "GET", "/categories/cards", None).await;
        assert_eq!(cards[1]["name"], "Restaurant");
        assert_eq!(cards[1]["icon"], "utensils");
        assert_eq!(cards[1]["blurb"], "Explore restaurant businesses in New York");
    }

    #[tokio::test]
    async fn malformed_listing_query_is_json_bad_request() {
        let app = app();
        let (status, bytes) = send(&app, "GET", "/businesses?search=a&search=b", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn empty_store_lists_are_empty_arrays() {
        let app = app();
        let (status, body) = send_json(&app, "GET", "/businesses", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
        let (_, body) = send_json(&app, "GET", "/categories", None).await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn contact_form() {
        let app = app();
        let created = create(&app, "Joe's Pizza", "Restaurant").await;
        let uri = format!("/businesses/{}/contact", created["_id"].as_str().unwrap());

        let (status, body) = send_json(
            &app,
            "POST",
            &uri,
            Some(json!({
                "name": "Ann",
                "email": "ann@example.com",
                "subject": "Inquiry about Joe's Pizza",
                "message": "Do you cater on weekends?",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::ACCEPTED);
        assert_eq!(body["message"], "Message sent");

        let (status, body) = send_json(
            &app,
            "POST",
            &uri,
            Some(json!({ "name": "A", "email": "nope", "subject": "Hi", "message": "short" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("email"));
    }

    #[tokio::test]
    async fn structured_data_and_sitemap() {
        let app = app();
        let created = create(&app, "Joe's Pizza", "Real Estate").await;
        let id = created["_id"].as_str().unwrap();

        let (status, docs) =
            send_json(&app, "GET", &format!("/businesses/{}/structured-data", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(docs[0]["@type"], "LocalBusiness");
        assert_eq!(docs[0]["address"]["addressLocality"], "New York");
        assert_eq!(docs[0]["priceRange"], "$$");
        let image = docs[0]["image"].as_str().unwrap();
        assert!(image.starts_with("https://directory.test/placeholder.svg?"));
        assert!(image.contains("text=business"));
        assert_eq!(
            docs[1]["itemListElement"][2]["item"],
            format!("https://directory.test/business/{}", id)
        );

        let (status, bytes) = send(&app, "GET", "/sitemap.xml", None).await;
        assert_eq!(status, StatusCode::OK);
        let xml = String::from_utf8(bytes).unwrap();
        assert!(xml.contains("<loc>https://directory.test/add-business</loc>"));
        assert!(xml.contains(&format!("<loc>https://directory.test/business/{}</loc>", id)));
        let category_page = "<loc>https://directory.test/businesses?category=Real%20Estate</loc>";
        assert!(xml.contains(category_page));
    }

    #[tokio::test]
    async fn store_failures() {
        let strict = unavailable_app(false);
        let (status, body) = send_json(&strict, "GET", "/businesses", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Server error"); // no internal detail
        let (status, _) = send_json(&strict, "GET", "/categories", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let (status, body) = send_json(&strict, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["status"], "error");

        // The sitemap degrades to static pages instead of failing
        let (status, bytes) = send(&strict, "GET", "/sitemap.xml", None).await;
        assert_eq!(status, StatusCode::OK);
        let xml = String::from_utf8(bytes).unwrap();
        assert_eq!(xml.matches("<url>").count(), 5);

        let lenient = unavailable_app(true);
        let (status, body) = send_json(&lenient, "GET", "/businesses", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
        let (status, body) = send_json(&lenient, "GET", "/categories", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn health_reports_count() {
        let app = app();
        create(&app, "Joe's Pizza", "Restaurant").await;
        let (status, body) = send_json(&app, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["businesses"], 1);
    }
}
