//! HTTP Pipeline Tests
//!
//! Full requests through the axum router: authentication, CORS, callback
//! wrapping, CRUD status codes and routing failures.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use aerorest::auth::{CompositeAuth, Identity, StaticTokenValidator};
use aerorest::config::AeroRestConfig;
use aerorest::controller::{ActionSpec, ActiveController, OwnerAccess};
use aerorest::http_server::HttpServer;
use aerorest::pipeline::ActionResult;
use aerorest::routing::UrlRuleConfig;
use aerorest::store::InMemoryStore;
use aerorest::Application;

const TOKEN: &str = "Bearer secret-token";
const ORIGIN: &str = "https://app.example";

fn router() -> Router {
    let config = AeroRestConfig::from_json(
        &json!({
            "tokens": [{"token": "secret-token", "identity": "alice"}],
            "resources": [{
                "url": "users",
                "controller": "user",
                "attributes": ["id", "name", "city"],
                "records": [
                    {"id": "1", "name": "Annie", "city": "Albany"},
                    {"id": "2", "name": "Bob", "city": "Reno"}
                ]
            }]
        })
        .to_string(),
    )
    .unwrap();
    let app = Application::from_config(&config).unwrap();
    HttpServer::build_router(Arc::new(app))
}

/// Entries with an unrestricted `purge` action and an owner-checked
/// `archive` action; `hits` counts purge executions.
fn entries_router(hits: Arc<AtomicUsize>) -> Router {
    let store = Arc::new(
        InMemoryStore::new("entries", &["id", "owner"], &["id"])
            .with_records(vec![json!({"id": "1", "owner": "bob"})])
            .unwrap(),
    );
    let controller = ActiveController::new("entry", store)
        .action(ActionSpec::new("purge"), move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
            Ok(ActionResult::ok(json!("purged")))
        })
        .action(ActionSpec::new("archive").with_record_param("id"), |_| {
            Ok(ActionResult::ok(json!("archived")))
        })
        .with_record_access(OwnerAccess::new("owner"));

    let tokens = StaticTokenValidator::new().with_token("secret-token", Identity::new("alice"));
    let app = Application::builder(UrlRuleConfig::new("api").resource("entries", "entry"))
        .controller(Arc::new(controller))
        .auth(Arc::new(CompositeAuth::token(Arc::new(tokens), "access-token")))
        .build();
    HttpServer::build_router(Arc::new(app))
}

fn memberships_router() -> Router {
    let config = AeroRestConfig::from_json(
        &json!({
            "tokens": [{"token": "secret-token", "identity": "alice"}],
            "resources": [{
                "url": "memberships",
                "controller": "membership",
                "attributes": ["tenant", "id", "role"],
                "primary_key": ["tenant", "id"],
                "records": [{"tenant": 42, "id": 7, "role": "owner"}]
            }]
        })
        .to_string(),
    )
    .unwrap();
    HttpServer::build_router(Arc::new(Application::from_config(&config).unwrap()))
}

fn options(uri: &str) -> Request<Body> {
    Request::builder()
        .method("OPTIONS")
        .uri(uri)
        .header("Origin", ORIGIN)
        .body(Body::empty())
        .unwrap()
}

async fn send(router: &Router, request: Request<Body>) -> Response {
    router.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn header<'a>(response: &'a Response, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("Authorization", TOKEN)
        .body(Body::empty())
        .unwrap()
}

fn with_json(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Authorization", TOKEN)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// =============================================================================
// PREFLIGHT AND CORS
// =============================================================================

#[tokio::test]
async fn test_options_without_credentials() {
    let router = router();
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/users")
        .header("Origin", ORIGIN)
        .body(Body::empty())
        .unwrap();
    let response = send(&router, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "Allow"), Some("GET, POST, HEAD, OPTIONS"));
    assert_eq!(header(&response, "Access-Control-Allow-Credentials"), Some("true"));
    assert_eq!(header(&response, "Access-Control-Allow-Origin"), Some(ORIGIN));
    assert_eq!(header(&response, "Access-Control-Allow-Headers"), Some("Authorization"));
    assert_eq!(header(&response, "Access-Control-Expose-Headers"), Some("Allow"));
}

#[tokio::test]
async fn test_options_on_resource() {
    let router = router();
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/users/1")
        .body(Body::empty())
        .unwrap();
    let response = send(&router, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "Allow"), Some("GET, PUT, PATCH, DELETE, HEAD, OPTIONS"));
    assert!(header(&response, "Access-Control-Allow-Origin").is_none());
}

#[tokio::test]
async fn test_options_on_custom_action_does_not_run_it() {
    let hits = Arc::new(AtomicUsize::new(0));
    let router = entries_router(Arc::clone(&hits));

    let anonymous = Request::builder().uri("/api/entries/purge").body(Body::empty()).unwrap();
    assert_eq!(send(&router, anonymous).await.status(), StatusCode::UNAUTHORIZED);

    let response = send(&router, options("/api/entries/purge")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "Allow"), Some("GET, POST, HEAD, OPTIONS"));
    assert_eq!(header(&response, "Access-Control-Allow-Credentials"), Some("true"));
    assert_eq!(header(&response, "Access-Control-Allow-Origin"), Some(ORIGIN));
    assert_eq!(header(&response, "Access-Control-Allow-Headers"), Some("Authorization"));
    assert_eq!(header(&response, "Access-Control-Expose-Headers"), Some("Allow"));
    assert_eq!(hits.load(Ordering::SeqCst), 0);

    let response = send(&router, get("/api/entries/purge")).await;
    assert_eq!(body_json(response).await, json!("purged"));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_options_on_record_bound_action() {
    let router = entries_router(Arc::new(AtomicUsize::new(0)));

    let response = send(&router, options("/api/entries/archive/1")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "Allow"), Some("GET, PUT, PATCH, DELETE, HEAD, OPTIONS"));
    assert_eq!(header(&response, "Access-Control-Allow-Origin"), Some(ORIGIN));

    // alice does not own entry 1
    let response = send(&router, get("/api/entries/archive/1")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_expose_headers_follow_insertion_order() {
    let router = router();
    let request = Request::builder()
        .uri("/api/users")
        .header("Authorization", TOKEN)
        .header("Origin", ORIGIN)
        .body(Body::empty())
        .unwrap();
    let response = send(&router, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header(&response, "Access-Control-Expose-Headers"),
        Some(
            "X-Pagination-Total-Count,X-Pagination-Page-Count,X-Pagination-Current-Page,\
             X-Pagination-Per-Page,Content-Type"
        )
    );
    assert_eq!(header(&response, "X-Pagination-Total-Count"), Some("2"));
}

// =============================================================================
// RESPONSE FORMAT
// =============================================================================

#[tokio::test]
async fn test_callback_wrapping() {
    let router = router();
    let response = send(&router, get("/api/users/1?callback=foo")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["callback"], "foo");
    assert_eq!(body["data"]["name"], "Annie");
}

#[tokio::test]
async fn test_no_wrapping_without_callback() {
    let router = router();
    let response = send(&router, get("/api/users/2")).await;

    assert_eq!(
        header(&response, "Content-Type"),
        Some("application/json; charset=UTF-8")
    );
    let body = body_json(response).await;
    assert_eq!(body["name"], "Bob");
    assert!(body.get("callback").is_none());
}

#[tokio::test]
async fn test_list_search() {
    let router = router();
    let response = send(&router, get("/api/users?search=ny")).await;

    assert_eq!(header(&response, "X-Pagination-Total-Count"), Some("1"));
    let body = body_json(response).await;
    assert_eq!(body, json!([{"id": "1", "name": "Annie", "city": "Albany"}]));
}

#[tokio::test]
async fn test_encoded_composite_key() {
    let router = memberships_router();

    let response = send(&router, get("/api/memberships/42,7")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&router, get("/api/memberships/42%2C7")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["role"], "owner");

    let response = send(&router, get("/api/memberships/42%2C8")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_undecodable_path_parameter() {
    let router = memberships_router();
    let response = send(&router, get("/api/memberships/%FF")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// AUTHENTICATION
// =============================================================================

#[tokio::test]
async fn test_missing_credentials() {
    let router = router();
    let request = Request::builder().uri("/api/users").body(Body::empty()).unwrap();
    let response = send(&router, request).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(header(&response, "WWW-Authenticate"), Some("Bearer realm=\"api\""));
    assert_eq!(body_json(response).await["status"], 401);
}

#[tokio::test]
async fn test_query_param_token() {
    let router = router();
    let request = Request::builder()
        .uri("/api/users?access-token=secret-token")
        .body(Body::empty())
        .unwrap();
    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_wrong_token() {
    let router = router();
    let request = Request::builder()
        .uri("/api/users")
        .header("Authorization", "Bearer nope")
        .body(Body::empty())
        .unwrap();
    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// =============================================================================
// CRUD
// =============================================================================

#[tokio::test]
async fn test_crud_flow() {
    let router = router();

    let response = send(
        &router,
        with_json("POST", "/api/users", json!({"id": "3", "name": "Cleo", "city": "Lima"})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["name"], "Cleo");

    let response = send(&router, with_json("PATCH", "/api/users/3", json!({"city": "Quito"}))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["city"], "Quito");

    let response = send(&router, with_json("PUT", "/api/users/3", json!({"name": "Cleo B"}))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/users/3")
        .header("Authorization", TOKEN)
        .body(Body::empty())
        .unwrap();
    let response = send(&router, request).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(&router, get("/api/users/3")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_requires_object() {
    let router = router();
    let response = send(&router, with_json("POST", "/api/users", json!([1, 2]))).await;
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_invalid_json_body() {
    let router = router();
    let request = Request::builder()
        .method("POST")
        .uri("/api/users")
        .header("Authorization", TOKEN)
        .header("Origin", ORIGIN)
        .body(Body::from("{not json"))
        .unwrap();
    let response = send(&router, request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(&response, "Access-Control-Allow-Origin"), Some(ORIGIN));
}

// =============================================================================
// ROUTING FAILURES
// =============================================================================

#[tokio::test]
async fn test_unknown_path() {
    let router = router();
    let request = Request::builder()
        .uri("/nowhere")
        .header("Origin", ORIGIN)
        .body(Body::empty())
        .unwrap();
    let response = send(&router, request).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(header(&response, "Access-Control-Allow-Credentials"), Some("true"));
}

#[tokio::test]
async fn test_unsupported_method_on_resource() {
    let router = router();
    let request = Request::builder()
        .method("POST")
        .uri("/api/users/1")
        .header("Authorization", TOKEN)
        .body(Body::empty())
        .unwrap();
    let response = send(&router, request).await;

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(header(&response, "Allow"), Some("GET, PUT, PATCH, DELETE, HEAD, OPTIONS"));
}
