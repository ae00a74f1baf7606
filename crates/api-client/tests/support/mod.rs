//! In-process mock of the marketplace backend.
//!
//! Binds to a random local port and serves a handful of routes under `/api`
//! that reproduce the response shapes the client has to classify.

#![allow(dead_code)]

use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    routing::{any, get, post},
    Json, Router,
};
use serde_json::{json, Map, Value};
use tradepost_api_client::{ApiClient, ClientConfig};
use tradepost_core::storage::MemoryStore;

/// Token the mock accepts on authenticated routes
pub const VALID_TOKEN: &str = "tok";

/// How long `/slow` stalls before answering
pub const SLOW_DELAY: Duration = Duration::from_secs(5);

pub fn app() -> Router {
    let api = Router::new()
        .route("/echo", any(echo))
        .route("/listings", get(list_listings).post(create_listing))
        .route(
            "/listings/{id}",
            get(show_listing).put(update_listing).delete(delete_listing),
        )
        .route("/user", get(current_user))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/unauthorized", get(unauthorized))
        .route("/broken", get(broken))
        .route("/html", get(html_error))
        .route("/slow", get(slow))
        .route("/cookie", get(set_cookie));

    Router::new().nest("/api", api)
}

/// Start the mock server and return its API base URL
pub async fn spawn() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app()).await.unwrap();
    });
    format!("http://{addr}/api")
}

/// One-shot HTTP/1.1 server that answers with a verbatim status line, for
/// reason phrases axum would never emit. Returns the API base URL.
pub fn spawn_raw(status_line: &'static str, body: &'static str) -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        while !request.windows(4).any(|window| window == b"\r\n\r\n") {
            let read = stream.read(&mut chunk).unwrap();
            if read == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..read]);
        }
        let response = format!(
            "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).unwrap();
    });
    format!("http://{addr}/api")
}

/// Client against `base_url` with an in-memory session
pub fn client(base_url: &str) -> ApiClient {
    client_with_timeout(base_url, Duration::from_secs(5))
}

pub fn client_with_timeout(base_url: &str, timeout: Duration) -> ApiClient {
    let config = ClientConfig::development()
        .with_base_url(base_url)
        .with_timeout(timeout);
    ApiClient::with_store(config, Arc::new(MemoryStore::new())).unwrap()
}

// --- handlers ---

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: String) -> Json<Value> {
    let headers: Map<String, Value> = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                Value::String(value.to_str().unwrap_or_default().to_string()),
            )
        })
        .collect();

    Json(json!({
        "method": method.as_str(),
        "query": uri.query(),
        "headers": headers,
        "body": if body.is_empty() { Value::Null } else { Value::String(body) },
    }))
}

fn listing(id: u64) -> Value {
    json!({
        "id": id,
        "title": "Immortal rank account",
        "game": "Valorant",
        "platform": "pc",
        "price": "120.00",
        "status": "active",
        "seller": { "id": 9, "name": "ace_seller", "rating": 4.8 }
    })
}

async fn list_listings() -> Json<Value> {
    Json(json!({ "data": [] }))
}

async fn create_listing(Json(input): Json<Value>) -> (StatusCode, Json<Value>) {
    let mut created = listing(42);
    created["title"] = input["title"].clone();
    created["price"] = input["price"].clone();
    (StatusCode::CREATED, Json(json!({ "data": created })))
}

async fn show_listing(Path(id): Path<u64>) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if id == 404 {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Listing not found." })),
        ));
    }
    Ok(Json(json!({ "data": listing(id) })))
}

async fn update_listing(Path(id): Path<u64>, Json(changes): Json<Value>) -> Json<Value> {
    let mut updated = listing(id);
    if let Some(price) = changes.get("price") {
        updated["price"] = price.clone();
    }
    Json(json!({ "data": updated }))
}

async fn delete_listing(Path(_id): Path<u64>) -> StatusCode {
    StatusCode::NO_CONTENT
}

fn is_authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value == format!("Bearer {VALID_TOKEN}"))
}

async fn current_user(headers: HeaderMap) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if !is_authorized(&headers) {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Unauthenticated." })),
        ));
    }
    Ok(Json(json!({ "id": 1, "name": "Sam", "email": "sam@example.com" })))
}

async fn register() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "message": "Validation failed",
            "errors": {
                "email": ["required"],
                "password": ["required", "too short"]
            }
        })),
    )
}

async fn login(Json(input): Json<Value>) -> (StatusCode, Json<Value>) {
    if input["email"] == "sam@example.com" && input["password"] == "hunter22" {
        return (
            StatusCode::OK,
            Json(json!({
                "token": VALID_TOKEN,
                "user": { "id": 1, "name": "Sam", "email": "sam@example.com" }
            })),
        );
    }
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({
            "message": "These credentials do not match our records.",
            "errors": { "email": "These credentials do not match our records." }
        })),
    )
}

async fn logout(headers: HeaderMap) -> StatusCode {
    if is_authorized(&headers) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::UNAUTHORIZED
    }
}

async fn unauthorized() -> (StatusCode, Json<Value>) {
    (StatusCode::UNAUTHORIZED, Json(json!({})))
}

async fn broken() -> (StatusCode, Json<Value>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "bad thing" })),
    )
}

async fn html_error() -> (StatusCode, &'static str) {
    (StatusCode::BAD_GATEWAY, "<html>upstream down</html>")
}

async fn slow() -> Json<Value> {
    tokio::time::sleep(SLOW_DELAY).await;
    Json(json!({ "data": "late" }))
}

async fn set_cookie() -> ([(header::HeaderName, &'static str); 1], Json<Value>) {
    (
        [(header::SET_COOKIE, "marketplace_session=abc123; Path=/")],
        Json(json!({ "ok": true })),
    )
}
