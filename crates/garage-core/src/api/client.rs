//! API client for the cars/owners REST backend.
//!
//! One method per backend operation. Each returns the parsed body or the
//! `ApiError` exactly as it happened; callers decide what to do with it.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::models::{
    Car, CarCreate, CarQuery, CarStatistics, CarUpdate, CarWithOwner, MessageResponse, Owner,
    OwnerCreate, OwnerQuery, OwnerStatistics, OwnerUpdate, StatusResponse,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Backend address used when neither config nor environment set one.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Default page size for list endpoints.
pub const DEFAULT_PAGE_LIMIT: u32 = 100;

/// API client for the backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a new API client for the given base URL
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidBaseUrl(base_url.to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build an endpoint URL. Each segment is percent-encoded on its own,
    /// so search terms with spaces or slashes stay a single path segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.client.request(method, self.url(segments))
    }

    /// Send a request, log its lifecycle, and decode the JSON body.
    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let request = request.build()?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, %url, "API request");

        let response = match self.client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(%method, %url, error = %e, timeout = e.is_timeout(), "API request failed");
                return Err(e.into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ApiError::from_status(status, &body);
            warn!(%method, %url, status = status.as_u16(), error = %err, "API error response");
            return Err(err);
        }

        debug!(%method, %url, status = status.as_u16(), "API response");

        let text = response.text().await.map_err(|e| {
            warn!(%method, %url, error = %e, "Failed to read response body");
            ApiError::from(e)
        })?;
        serde_json::from_str(&text).map_err(|e| {
            warn!(%method, %url, error = %e, "Failed to parse response body");
            ApiError::InvalidResponse(format!("{}: {}", e, ApiError::truncate_body(&text)))
        })
    }

    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        self.execute(self.request(Method::GET, segments)).await
    }

    async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        query: &Q,
    ) -> Result<T, ApiError> {
        self.execute(self.request(Method::GET, segments).query(query))
            .await
    }

    async fn send_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ApiError> {
        self.execute(self.request(method, segments).json(body)).await
    }

    async fn delete<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        self.execute(self.request(Method::DELETE, segments)).await
    }

    // ===== Service =====

    pub async fn hello(&self) -> Result<String, ApiError> {
        self.get(&["hello"]).await
    }

    pub async fn status(&self) -> Result<StatusResponse, ApiError> {
        self.get(&["api", "status"]).await
    }

    // ===== Cars =====

    pub async fn list_cars(&self, skip: u32, limit: u32) -> Result<Vec<CarWithOwner>, ApiError> {
        self.get_with_query(&["cars"], &[("skip", skip), ("limit", limit)])
            .await
    }

    pub async fn get_car(&self, id: i64) -> Result<CarWithOwner, ApiError> {
        self.get(&["cars", &id.to_string()]).await
    }

    pub async fn create_car(&self, car: &CarCreate) -> Result<Car, ApiError> {
        self.send_json(Method::POST, &["cars"], car).await
    }

    pub async fn update_car(&self, id: i64, car: &CarUpdate) -> Result<Car, ApiError> {
        self.send_json(Method::PUT, &["cars", &id.to_string()], car)
            .await
    }

    pub async fn delete_car(&self, id: i64) -> Result<MessageResponse, ApiError> {
        self.delete(&["cars", &id.to_string()]).await
    }

    pub async fn car_statistics(&self) -> Result<CarStatistics, ApiError> {
        self.get(&["cars", "statistics"]).await
    }

    // ===== Car Search =====

    pub async fn search_cars_by_brand(&self, brand: &str) -> Result<Vec<CarWithOwner>, ApiError> {
        self.get(&["cars", "search", "brand", brand]).await
    }

    pub async fn search_cars_by_color(&self, color: &str) -> Result<Vec<CarWithOwner>, ApiError> {
        self.get(&["cars", "search", "color", color]).await
    }

    pub async fn search_cars_by_year(&self, year: i32) -> Result<Vec<CarWithOwner>, ApiError> {
        self.get(&["cars", "search", "year", &year.to_string()])
            .await
    }

    pub async fn search_cars_by_price_range(
        &self,
        min_price: i64,
        max_price: i64,
    ) -> Result<Vec<CarWithOwner>, ApiError> {
        self.get_with_query(
            &["cars", "search", "price-range"],
            &[("min_price", min_price), ("max_price", max_price)],
        )
        .await
    }

    pub async fn search_cars_by_owner(&self, owner_id: i64) -> Result<Vec<CarWithOwner>, ApiError> {
        self.get(&["cars", "search", "owner", &owner_id.to_string()])
            .await
    }

    pub async fn search_cars(&self, query: &CarQuery) -> Result<Vec<CarWithOwner>, ApiError> {
        self.send_json(Method::POST, &["cars", "search"], query)
            .await
    }

    // ===== Owners =====

    pub async fn list_owners(&self, skip: u32, limit: u32) -> Result<Vec<Owner>, ApiError> {
        self.get_with_query(&["owners"], &[("skip", skip), ("limit", limit)])
            .await
    }

    pub async fn get_owner(&self, id: i64) -> Result<Owner, ApiError> {
        self.get(&["owners", &id.to_string()]).await
    }

    pub async fn create_owner(&self, owner: &OwnerCreate) -> Result<Owner, ApiError> {
        self.send_json(Method::POST, &["owners"], owner).await
    }

    pub async fn update_owner(&self, id: i64, owner: &OwnerUpdate) -> Result<Owner, ApiError> {
        self.send_json(Method::PUT, &["owners", &id.to_string()], owner)
            .await
    }

    /// Deletes the owner; the backend removes its cars as well.
    pub async fn delete_owner(&self, id: i64) -> Result<MessageResponse, ApiError> {
        self.delete(&["owners", &id.to_string()]).await
    }

    pub async fn owner_statistics(&self) -> Result<Vec<OwnerStatistics>, ApiError> {
        self.get(&["owners", "statistics"]).await
    }

    // ===== Owner Search =====

    pub async fn search_owners_by_term(&self, term: &str) -> Result<Vec<Owner>, ApiError> {
        self.get(&["owners", "search", term]).await
    }

    pub async fn search_owners(&self, query: &OwnerQuery) -> Result<Vec<Owner>, ApiError> {
        self.send_json(Method::POST, &["owners", "search"], query)
            .await
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, Query, State};
    use axum::http::{StatusCode, Uri};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;

    type Hits = Arc<Mutex<Vec<String>>>;

    fn car_json(id: i64, brand: &str) -> Value {
        json!({
            "id": id, "brand": brand, "model": "Model", "color": "Белый",
            "registrationNumber": format!("{}AAA01", id), "modelYear": 2020,
            "price": 1000, "owner_id": 1, "owner": "Иван Петров"
        })
    }

    async fn spawn_backend(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn cars_router(hits: Hits) -> Router {
        async fn list(
            State(hits): State<Hits>,
            uri: Uri,
            Query(params): Query<HashMap<String, String>>,
        ) -> Json<Value> {
            hits.lock().unwrap().push(uri.to_string());
            let limit: i64 = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(0);
            Json(json!([car_json(1, "Toyota"), car_json(limit, "BMW")]))
        }

        async fn by_brand(
            State(hits): State<Hits>,
            uri: Uri,
            Path(brand): Path<String>,
        ) -> Json<Value> {
            hits.lock().unwrap().push(uri.to_string());
            Json(json!([car_json(1, &brand)]))
        }

        async fn create(Json(body): Json<Value>) -> Json<Value> {
            let mut car = body.clone();
            car["id"] = json!(42);
            Json(car)
        }

        async fn missing(Path(id): Path<i64>) -> (StatusCode, Json<Value>) {
            (
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": format!("Автомобиль {} не найден", id) })),
            )
        }

        Router::new()
            .route("/cars", get(list).post(create))
            .route("/cars/search/brand/{brand}", get(by_brand))
            .route("/cars/{id}", get(missing))
            .route("/owners/statistics", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .route(
                "/owners/search",
                post(|Json(q): Json<Value>| async move {
                    Json(json!([{ "ownerid": 1, "firstname": q["search"], "lastname": "X" }]))
                }),
            )
            .route("/hello", get(|| async { Json(json!("Hello from FastAPI!")) }))
            .route("/api/status", get(|| async { Json(json!("not ready")) }))
            .with_state(hits)
    }

    #[test]
    fn test_new_rejects_invalid_base_url() {
        assert!(matches!(ApiClient::new("not a url"), Err(ApiError::InvalidBaseUrl(_))));
        assert!(matches!(ApiClient::new("mailto:a@b.c"), Err(ApiError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_url_encodes_segments() {
        let api = ApiClient::new("http://localhost:8000/").unwrap();
        let url = api.url(&["cars", "search", "brand", "Land Rover/Range"]);
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/cars/search/brand/Land%20Rover%2FRange"
        );
    }

    #[test]
    fn test_url_keeps_base_path_prefix() {
        let api = ApiClient::new("http://localhost:8000/backend").unwrap();
        assert_eq!(api.url(&["owners"]).as_str(), "http://localhost:8000/backend/owners");
    }

    #[tokio::test]
    async fn test_list_cars_sends_pagination() {
        let hits: Hits = Arc::default();
        let base = spawn_backend(cars_router(hits.clone())).await;
        let api = ApiClient::new(&base).unwrap();

        let cars = api.list_cars(0, 100).await.unwrap();

        assert_eq!(cars.len(), 2);
        assert_eq!(cars[1].id, 100);
        assert_eq!(cars[0].owner_name().as_deref(), Some("Иван Петров"));
        assert_eq!(hits.lock().unwrap().as_slice(), ["/cars?skip=0&limit=100"]);
    }

    #[tokio::test]
    async fn test_search_by_brand_hits_brand_endpoint() {
        let hits: Hits = Arc::default();
        let base = spawn_backend(cars_router(hits.clone())).await;
        let api = ApiClient::new(&base).unwrap();

        let cars = api.search_cars_by_brand("Toyota").await.unwrap();

        assert_eq!(cars.len(), 1);
        assert_eq!(cars[0].brand, "Toyota");
        assert_eq!(hits.lock().unwrap().as_slice(), ["/cars/search/brand/Toyota"]);
    }

    #[tokio::test]
    async fn test_create_car_posts_backend_field_names() {
        let base = spawn_backend(cars_router(Arc::default())).await;
        let api = ApiClient::new(&base).unwrap();
        let body = CarCreate {
            brand: "Kia".to_string(),
            model: "Rio".to_string(),
            color: "Красный".to_string(),
            registration_number: "555KKK02".to_string(),
            model_year: 2021,
            price: 7_500_000,
            owner_id: 3,
        };

        let car = api.create_car(&body).await.unwrap();

        assert_eq!(car.id, 42);
        assert_eq!(car.registration_number, "555KKK02");
        assert_eq!(car.model_year, 2021);
    }

    #[tokio::test]
    async fn test_http_errors_are_surfaced_unchanged() {
        let base = spawn_backend(cars_router(Arc::default())).await;
        let api = ApiClient::new(&base).unwrap();

        let err = api.get_car(9).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(ref body) if body.contains("Автомобиль 9")));

        let err = api.owner_statistics().await.unwrap_err();
        assert!(matches!(err, ApiError::ServerError(_)));
    }

    #[tokio::test]
    async fn test_undecodable_body_is_invalid_response() {
        let base = spawn_backend(cars_router(Arc::default())).await;
        let api = ApiClient::new(&base).unwrap();

        let err = api.status().await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(ref msg) if msg.contains("not ready")));

        assert_eq!(api.hello().await.unwrap(), "Hello from FastAPI!");
    }

    #[tokio::test]
    async fn test_structured_owner_search() {
        let base = spawn_backend(cars_router(Arc::default())).await;
        let api = ApiClient::new(&base).unwrap();
        let query = OwnerQuery {
            search: Some("Анна".to_string()),
            ..Default::default()
        };

        let owners = api.search_owners(&query).await.unwrap();

        assert_eq!(owners[0].firstname, "Анна");
        assert!(owners[0].cars.is_empty());
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let api = ApiClient::new(&format!("http://{}", addr)).unwrap();
        let err = api.list_owners(0, 10).await.unwrap_err();

        assert!(err.is_transport());
        assert!(!err.is_timeout());
    }
}
