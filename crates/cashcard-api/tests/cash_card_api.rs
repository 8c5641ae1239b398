//! API Integration Tests
//!
//! Drives the full router in-process against the in-memory store and a
//! low-cost user registry, covering the owner-scoped CRUD contract.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;

use cashcard_api::{create_router, create_test_router, ApiConfig, AppState, CardListScope};
use cashcard_auth::{encode_basic, AuthConfig, PasswordConfig, Role, UserRegistry, UserSeed};
use cashcard_db::{
    CashCardStore, DbCashCard, DbError, DbResult, MemoryCashCardStore, PageRequest, SaveCashCard,
};

const SARAH: (&str, &str) = ("sarah1", "abc123");
const KUMAR: (&str, &str) = ("kumar2", "xyz789");
const HANK: (&str, &str) = ("hank-owns-no-cards", "qrs456");

// =============================================================================
// Fixtures
// =============================================================================

fn seed_cards() -> Vec<DbCashCard> {
    vec![
        DbCashCard { id: 99, amount: dec!(123.45), owner: "sarah1".to_string() },
        DbCashCard { id: 100, amount: dec!(1.00), owner: "sarah1".to_string() },
        DbCashCard { id: 101, amount: dec!(150.00), owner: "sarah1".to_string() },
        DbCashCard { id: 102, amount: dec!(200.00), owner: "kumar2".to_string() },
    ]
}

fn test_registry() -> UserRegistry {
    let config = AuthConfig {
        realm: "cashcard".to_string(),
        password: PasswordConfig::insecure_fast(),
        users: vec![
            UserSeed::with_password(SARAH.0, SARAH.1, [Role::CardOwner]),
            UserSeed::with_password(KUMAR.0, KUMAR.1, [Role::CardOwner]),
            UserSeed::with_password(HANK.0, HANK.1, [Role::NonOwner]),
        ],
    };
    UserRegistry::from_config(&config).unwrap()
}

fn state_with(store: Arc<dyn CashCardStore>) -> AppState {
    AppState::new(store, test_registry().into_authenticator())
}

fn router_with(store: Arc<dyn CashCardStore>) -> Router {
    create_router(Arc::new(state_with(store)), ApiConfig::default())
}

fn seeded() -> (Router, Arc<MemoryCashCardStore>) {
    let store = Arc::new(MemoryCashCardStore::with_cards(seed_cards()));
    (router_with(store.clone()), store)
}

struct TestResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl TestResponse {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(json!(null))
    }
}

/// Test helper to make a request with optional Basic credentials
async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    credentials: Option<(&str, &str)>,
    body: Option<Value>,
) -> TestResponse {
    let mut request = Request::builder().method(method).uri(uri);

    if let Some((username, password)) = credentials {
        request = request.header(header::AUTHORIZATION, encode_basic(username, password));
    }

    let body = match body {
        Some(json_body) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        }
        None => Body::empty(),
    };

    let response = router
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec();

    TestResponse { status, headers, body }
}

/// Store whose every operation fails
struct FailingStore {
    error: fn() -> DbError,
}

impl FailingStore {
    fn unavailable() -> Self {
        Self { error: || DbError::Unavailable("store offline".to_string()) }
    }

    fn query_error() -> Self {
        Self { error: || DbError::Query(sqlx::Error::PoolTimedOut) }
    }
}

#[async_trait]
impl CashCardStore for FailingStore {
    async fn find_by_id_and_owner(&self, _id: i64, _owner: &str) -> DbResult<Option<DbCashCard>> {
        Err((self.error)())
    }

    async fn exists_by_id_and_owner(&self, _id: i64, _owner: &str) -> DbResult<bool> {
        Err((self.error)())
    }

    async fn find_by_owner(&self, _owner: &str, _page: PageRequest) -> DbResult<Vec<DbCashCard>> {
        Err((self.error)())
    }

    async fn find_all(&self, _page: PageRequest) -> DbResult<Vec<DbCashCard>> {
        Err((self.error)())
    }

    async fn save(&self, _card: SaveCashCard) -> DbResult<DbCashCard> {
        Err((self.error)())
    }

    async fn delete_by_id(&self, _id: i64) -> DbResult<()> {
        Err((self.error)())
    }

    async fn health_check(&self) -> DbResult<bool> {
        Err((self.error)())
    }

    fn backend(&self) -> &'static str {
        "failing"
    }
}

/// Store wrapper counting every call that reaches it
struct CountingStore {
    inner: MemoryCashCardStore,
    calls: AtomicUsize,
}

impl CountingStore {
    fn new(inner: MemoryCashCardStore) -> Self {
        Self { inner, calls: AtomicUsize::new(0) }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CashCardStore for CountingStore {
    async fn find_by_id_and_owner(&self, id: i64, owner: &str) -> DbResult<Option<DbCashCard>> {
        self.hit();
        self.inner.find_by_id_and_owner(id, owner).await
    }

    async fn exists_by_id_and_owner(&self, id: i64, owner: &str) -> DbResult<bool> {
        self.hit();
        self.inner.exists_by_id_and_owner(id, owner).await
    }

    async fn find_by_owner(&self, owner: &str, page: PageRequest) -> DbResult<Vec<DbCashCard>> {
        self.hit();
        self.inner.find_by_owner(owner, page).await
    }

    async fn find_all(&self, page: PageRequest) -> DbResult<Vec<DbCashCard>> {
        self.hit();
        self.inner.find_all(page).await
    }

    async fn save(&self, card: SaveCashCard) -> DbResult<DbCashCard> {
        self.hit();
        self.inner.save(card).await
    }

    async fn delete_by_id(&self, id: i64) -> DbResult<()> {
        self.hit();
        self.inner.delete_by_id(id).await
    }

    async fn health_check(&self) -> DbResult<bool> {
        self.inner.health_check().await
    }

    fn backend(&self) -> &'static str {
        self.inner.backend()
    }
}

// =============================================================================
// Read
// =============================================================================

mod read {
    use super::*;

    #[tokio::test]
    async fn test_get_owned_card() {
        let (router, _) = seeded();
        let res = send(&router, "GET", "/cards/99", Some(SARAH), None).await;

        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.json(), json!({"id": 99, "amount": 123.45, "owner": "sarah1"}));
    }

    #[tokio::test]
    async fn test_foreign_and_missing_cards_look_the_same() {
        let (router, _) = seeded();

        let foreign = send(&router, "GET", "/cards/102", Some(SARAH), None).await;
        let missing = send(&router, "GET", "/cards/1000", Some(SARAH), None).await;

        assert_eq!(foreign.status, StatusCode::NOT_FOUND);
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        assert_eq!(foreign.json(), missing.json());
        assert_eq!(foreign.json()["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_bad_request() {
        let (router, _) = seeded();
        let res = send(&router, "GET", "/cards/abc", Some(SARAH), None).await;

        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(res.json()["code"], "INVALID_PARAMETER");
    }

    #[tokio::test]
    async fn test_store_failure_on_read_is_server_error() {
        let router = router_with(Arc::new(FailingStore::query_error()));
        let res = send(&router, "GET", "/cards/99", Some(SARAH), None).await;

        assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.json()["code"], "INTERNAL_ERROR");
        assert!(!res.json()["msg"].as_str().unwrap().contains("pool"));
    }

    #[tokio::test]
    async fn test_unavailable_store_on_read() {
        let router = router_with(Arc::new(FailingStore::unavailable()));
        let res = send(&router, "GET", "/cards/99", Some(SARAH), None).await;

        assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
    }
}

// =============================================================================
// List
// =============================================================================

mod list {
    use super::*;

    fn ids(value: &Value) -> Vec<i64> {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|card| card["id"].as_i64().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_lists_only_callers_cards_sorted_by_amount() {
        let (router, _) = seeded();
        let res = send(&router, "GET", "/cards", Some(SARAH), None).await;

        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(ids(&res.json()), vec![100, 99, 101]);
        assert!(res
            .json()
            .as_array()
            .unwrap()
            .iter()
            .all(|card| card["owner"] == "sarah1"));
    }

    #[tokio::test]
    async fn test_empty_list_is_ok() {
        let router = router_with(Arc::new(MemoryCashCardStore::new()));
        let res = send(&router, "GET", "/cards", Some(KUMAR), None).await;

        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.json(), json!([]));
    }

    #[tokio::test]
    async fn test_pagination() {
        let (router, _) = seeded();

        let first = send(&router, "GET", "/cards?page=1&limit=2", Some(SARAH), None).await;
        assert_eq!(first.status, StatusCode::OK);
        assert_eq!(ids(&first.json()), vec![100, 99]);

        let second = send(&router, "GET", "/cards?page=2&limit=2", Some(SARAH), None).await;
        assert_eq!(ids(&second.json()), vec![101]);

        let beyond = send(&router, "GET", "/cards?page=5&limit=2", Some(SARAH), None).await;
        assert_eq!(beyond.json(), json!([]));
    }

    #[tokio::test]
    async fn test_invalid_pagination_is_bad_request() {
        let (router, _) = seeded();

        for uri in ["/cards?page=0", "/cards?limit=0", "/cards?limit=1001", "/cards?page=abc"] {
            let res = send(&router, "GET", uri, Some(SARAH), None).await;
            assert_eq!(res.status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(res.json()["code"], "INVALID_PARAMETER", "{}", uri);
        }
    }

    #[tokio::test]
    async fn test_all_scope_lists_every_card() {
        let store = Arc::new(MemoryCashCardStore::with_cards(seed_cards()));
        let state = state_with(store).with_list_scope(CardListScope::All);
        let router = create_router(Arc::new(state), ApiConfig::default());

        let res = send(&router, "GET", "/cards", Some(SARAH), None).await;

        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(ids(&res.json()), vec![100, 99, 101, 102]);

        let second = send(&router, "GET", "/cards?page=2&limit=1", Some(SARAH), None).await;
        assert_eq!(second.status, StatusCode::OK);
        assert_eq!(ids(&second.json()), vec![99]);

        let last = send(&router, "GET", "/cards?page=2&limit=3", Some(SARAH), None).await;
        assert_eq!(ids(&last.json()), vec![102]);
    }
}

// =============================================================================
// Create
// =============================================================================

mod create {
    use super::*;

    fn location_id(res: &TestResponse) -> i64 {
        res.headers
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .strip_prefix("/cards/")
            .unwrap()
            .parse()
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_then_read_back() {
        let router = router_with(Arc::new(MemoryCashCardStore::new()));

        let created =
            send(&router, "POST", "/cards", Some(SARAH), Some(json!({"amount": 250.0}))).await;
        assert_eq!(created.status, StatusCode::CREATED);
        assert!(created.body.is_empty());

        let location = created.headers.get(header::LOCATION).unwrap().to_str().unwrap();
        let fetched = send(&router, "GET", location, Some(SARAH), None).await;

        assert_eq!(fetched.status, StatusCode::OK);
        assert_eq!(fetched.json()["amount"], json!(250.0));
        assert_eq!(fetched.json()["owner"], "sarah1");
        assert_eq!(fetched.json()["id"], json!(location_id(&created)));
    }

    #[tokio::test]
    async fn test_create_ignores_client_id_and_owner() {
        let (router, store) = seeded();

        let created = send(
            &router,
            "POST",
            "/cards",
            Some(SARAH),
            Some(json!({"id": 44, "amount": 250.0, "owner": "kumar2"})),
        )
        .await;
        assert_eq!(created.status, StatusCode::CREATED);

        let id = location_id(&created);
        assert_ne!(id, 44);

        let persisted = store.snapshot().into_iter().find(|c| c.id == id).unwrap();
        assert_eq!(persisted.owner, "sarah1");
        assert_eq!(persisted.amount, dec!(250));
        assert!(store.snapshot().iter().all(|c| c.id != 44));
    }

    #[tokio::test]
    async fn test_created_ids_are_not_reused() {
        let router = router_with(Arc::new(MemoryCashCardStore::new()));

        let first = send(&router, "POST", "/cards", Some(SARAH), Some(json!({"amount": 1.0}))).await;
        let first_id = location_id(&first);

        let deleted = send(&router, "DELETE", &format!("/cards/{}", first_id), Some(SARAH), None).await;
        assert_eq!(deleted.status, StatusCode::NO_CONTENT);

        let second = send(&router, "POST", "/cards", Some(SARAH), Some(json!({"amount": 2.0}))).await;
        assert_ne!(location_id(&second), first_id);
    }

    #[tokio::test]
    async fn test_invalid_bodies_are_bad_request() {
        let (router, store) = seeded();

        let empty = send(&router, "POST", "/cards", Some(SARAH), None).await;
        assert_eq!(empty.status, StatusCode::BAD_REQUEST);

        let missing_amount =
            send(&router, "POST", "/cards", Some(SARAH), Some(json!({"owner": "sarah1"}))).await;
        assert_eq!(missing_amount.status, StatusCode::BAD_REQUEST);
        assert_eq!(missing_amount.json()["code"], "INVALID_REQUEST_BODY");

        let wrong_type =
            send(&router, "POST", "/cards", Some(SARAH), Some(json!({"amount": "lots"}))).await;
        assert_eq!(wrong_type.status, StatusCode::BAD_REQUEST);

        assert_eq!(store.len(), seed_cards().len());
    }

    #[tokio::test]
    async fn test_store_failure_on_create_is_bad_request() {
        for store in [FailingStore::unavailable(), FailingStore::query_error()] {
            let router = router_with(Arc::new(store));
            let res =
                send(&router, "POST", "/cards", Some(SARAH), Some(json!({"amount": 10.0}))).await;

            assert_eq!(res.status, StatusCode::BAD_REQUEST);
            assert!(res.headers.get(header::LOCATION).is_none());
        }
    }
}

// =============================================================================
// Update
// =============================================================================

mod update {
    use super::*;

    #[tokio::test]
    async fn test_update_owned_card() {
        let store = Arc::new(MemoryCashCardStore::with_cards([DbCashCard {
            id: 1,
            amount: dec!(100.0),
            owner: "sarah1".to_string(),
        }]));
        let router = router_with(store.clone());

        let res = send(
            &router,
            "PUT",
            "/cards/1",
            Some(SARAH),
            Some(json!({"id": 7, "amount": 150.0, "owner": "kumar2"})),
        )
        .await;

        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.json(), json!({"id": 1, "amount": 150.0, "owner": "sarah1"}));

        let fetched = send(&router, "GET", "/cards/1", Some(SARAH), None).await;
        assert_eq!(fetched.json(), json!({"id": 1, "amount": 150.0, "owner": "sarah1"}));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_update_foreign_card_is_not_found() {
        let (router, store) = seeded();
        let before = store.snapshot();

        let res =
            send(&router, "PUT", "/cards/102", Some(SARAH), Some(json!({"amount": 0.01}))).await;

        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn test_update_missing_card_does_not_create() {
        let (router, store) = seeded();
        let before = store.snapshot();

        let res =
            send(&router, "PUT", "/cards/99999", Some(SARAH), Some(json!({"amount": 5.0}))).await;

        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(store.snapshot(), before);
    }

    #[tokio::test]
    async fn test_update_with_invalid_body() {
        let (router, store) = seeded();
        let before = store.snapshot();

        let res = send(&router, "PUT", "/cards/99", Some(SARAH), Some(json!({}))).await;

        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert_eq!(store.snapshot(), before);
    }
}

// =============================================================================
// Delete
// =============================================================================

mod delete {
    use super::*;

    #[tokio::test]
    async fn test_delete_owned_card() {
        let (router, store) = seeded();

        let res = send(&router, "DELETE", "/cards/99", Some(SARAH), None).await;
        assert_eq!(res.status, StatusCode::NO_CONTENT);
        assert!(res.body.is_empty());

        let ids: Vec<i64> = store.snapshot().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![100, 101, 102]);

        let fetched = send(&router, "GET", "/cards/99", Some(SARAH), None).await;
        assert_eq!(fetched.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_foreign_or_missing_card() {
        let (router, store) = seeded();
        let before = store.snapshot();

        let foreign = send(&router, "DELETE", "/cards/102", Some(SARAH), None).await;
        assert_eq!(foreign.status, StatusCode::NOT_FOUND);

        let missing = send(&router, "DELETE", "/cards/99999", Some(SARAH), None).await;
        assert_eq!(missing.status, StatusCode::NOT_FOUND);

        assert_eq!(store.snapshot(), before);
    }
}

// =============================================================================
// Authentication & Authorization
// =============================================================================

mod auth {
    use super::*;

    #[tokio::test]
    async fn test_missing_credentials_get_challenge() {
        let (router, _) = seeded();
        let res = send(&router, "GET", "/cards/99", None, None).await;

        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            res.headers.get(header::WWW_AUTHENTICATE).unwrap(),
            "Basic realm=\"cashcard\""
        );
    }

    #[tokio::test]
    async fn test_bad_credentials_are_unauthorized() {
        let (router, _) = seeded();

        let wrong_password =
            send(&router, "GET", "/cards/99", Some(("sarah1", "wrong")), None).await;
        assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);

        let unknown_user = send(&router, "GET", "/cards/99", Some(("nobody", "abc123")), None).await;
        assert_eq!(unknown_user.status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password.json(), unknown_user.json());
    }

    #[tokio::test]
    async fn test_malformed_authorization_header() {
        let (router, _) = seeded();
        let request = Request::builder()
            .uri("/cards")
            .header(header::AUTHORIZATION, "Basic not-base64!")
            .body(Body::empty())
            .unwrap();

        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_non_owner_is_forbidden() {
        let (router, _) = seeded();
        let res = send(&router, "GET", "/cards", Some(HANK), None).await;

        assert_eq!(res.status, StatusCode::FORBIDDEN);
        assert_eq!(res.json()["code"], "INSUFFICIENT_PERMISSIONS");
    }

    #[tokio::test]
    async fn test_rejected_requests_never_reach_the_store() {
        let store = Arc::new(CountingStore::new(MemoryCashCardStore::with_cards(seed_cards())));
        let router = router_with(store.clone());

        send(&router, "GET", "/cards/99", None, None).await;
        send(&router, "GET", "/cards/99", Some(("sarah1", "wrong")), None).await;
        send(&router, "DELETE", "/cards/99", Some(HANK), None).await;
        send(&router, "POST", "/cards", Some(HANK), Some(json!({"amount": 1.0}))).await;
        assert_eq!(store.calls(), 0);

        send(&router, "GET", "/cards/99", Some(SARAH), None).await;
        assert_eq!(store.calls(), 1);
    }

    #[tokio::test]
    async fn test_owners_are_isolated() {
        let (router, _) = seeded();

        let kumar_cards = send(&router, "GET", "/cards", Some(KUMAR), None).await;
        assert_eq!(kumar_cards.json(), json!([{"id": 102, "amount": 200.0, "owner": "kumar2"}]));

        let sarahs_card = send(&router, "GET", "/cards/99", Some(KUMAR), None).await;
        assert_eq!(sarahs_card.status, StatusCode::NOT_FOUND);
    }
}

// =============================================================================
// Operational Endpoints
// =============================================================================

mod operational {
    use super::*;

    #[tokio::test]
    async fn test_health_needs_no_credentials() {
        let (router, _) = seeded();
        let res = send(&router, "GET", "/health", None, None).await;

        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.json()["status"], "healthy");
    }

    #[tokio::test]
    async fn test_readiness_reports_store() {
        let (router, _) = seeded();
        let res = send(&router, "GET", "/ready", None, None).await;

        assert_eq!(res.status, StatusCode::OK);
        assert_eq!(res.json()["store"], "memory");

        let router = router_with(Arc::new(FailingStore::unavailable()));
        let res = send(&router, "GET", "/ready", None, None).await;

        assert_eq!(res.status, StatusCode::SERVICE_UNAVAILABLE);
        let body = res.json();
        assert_eq!(body["status"], "not_ready");
        assert_eq!(body["error"], "store unreachable");
        assert!(!body.to_string().contains("offline"));
    }

    #[tokio::test]
    async fn test_openapi_document_is_public() {
        let (router, _) = seeded();
        let res = send(&router, "GET", "/api-docs/openapi.json", None, None).await;

        assert_eq!(res.status, StatusCode::OK);
        assert!(res.json()["paths"].get("/cards/{id}").is_some());
    }

    #[tokio::test]
    async fn test_request_id_is_set() {
        let (router, _) = seeded();
        let res = send(&router, "GET", "/health", None, None).await;

        assert!(res.headers.get("x-request-id").is_some());
    }

    #[tokio::test]
    async fn test_minimal_router_enforces_auth() {
        let store = Arc::new(MemoryCashCardStore::with_cards(seed_cards()));
        let router = create_test_router(Arc::new(state_with(store)));

        let anonymous = send(&router, "GET", "/cards", None, None).await;
        assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

        let owner = send(&router, "GET", "/cards", Some(SARAH), None).await;
        assert_eq!(owner.status, StatusCode::OK);
    }
}
