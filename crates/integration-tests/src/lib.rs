//! Integration test support for Orderdesk.
//!
//! Starts an in-process fake of the remote cart API so the HTTP client and
//! full sign-in/sync flows can be exercised without external services.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p orderdesk-integration-tests
//! ```
//!
//! # Routes
//!
//! - `GET /users/{id}/cart` - stored snapshot, `404` if none
//! - `PUT /users/{id}/cart` - replace the snapshot with the JSON body

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::Value;
use tokio::net::TcpListener;
use url::Url;

/// Shared state of the fake remote.
#[derive(Debug, Default)]
pub struct FakeRemoteState {
    carts: Mutex<HashMap<i64, Value>>,
    puts: Mutex<Vec<(i64, Value)>>,
    authorization: Mutex<Vec<Option<String>>>,
    failing: AtomicBool,
}

impl FakeRemoteState {
    /// Seed a user's cart.
    pub fn insert(&self, user_id: i64, cart: Value) {
        self.carts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(user_id, cart);
    }

    /// Stored cart for a user.
    pub fn cart(&self, user_id: i64) -> Option<Value> {
        self.carts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&user_id)
            .cloned()
    }

    /// Every `PUT` body received, in order.
    pub fn puts(&self) -> Vec<(i64, Value)> {
        self.puts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// `Authorization` header of every request received, in order.
    pub fn authorization_headers(&self) -> Vec<Option<String>> {
        self.authorization
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Make every request answer `500` until reset.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn record(&self, headers: &HeaderMap) -> bool {
        let value = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        self.authorization
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(value);
        self.failing.load(Ordering::SeqCst)
    }
}

/// A running fake remote.
#[derive(Debug)]
pub struct FakeRemote {
    /// Base URL to configure the client with
    pub base_url: Url,
    /// Server state
    pub state: Arc<FakeRemoteState>,
    server: tokio::task::JoinHandle<()>,
}

impl Drop for FakeRemote {
    fn drop(&mut self) {
        self.server.abort();
    }
}

/// Start a fake remote on an ephemeral local port.
///
/// # Panics
///
/// Panics if the listener cannot be bound.
#[allow(clippy::expect_used)]
pub async fn start_fake_remote() -> FakeRemote {
    let state = Arc::new(FakeRemoteState::default());
    let app = Router::new()
        .route("/api/users/{id}/cart", get(fetch_cart).put(persist_cart))
        .with_state(Arc::clone(&state));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake remote");
    let addr = listener.local_addr().expect("fake remote address");
    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let base_url = Url::parse(&format!("http://{addr}/api/")).expect("fake remote url");
    FakeRemote {
        base_url,
        state,
        server,
    }
}

async fn fetch_cart(
    State(state): State<Arc<FakeRemoteState>>,
    Path(user_id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    if state.record(&headers) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "remote unavailable").into_response();
    }
    match state.cart(user_id) {
        Some(cart) => Json(cart).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn persist_cart(
    State(state): State<Arc<FakeRemoteState>>,
    Path(user_id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if state.record(&headers) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "remote unavailable").into_response();
    }
    if !body.is_array() {
        return (StatusCode::UNPROCESSABLE_ENTITY, "expected an array").into_response();
    }
    state
        .puts
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push((user_id, body.clone()));
    state.insert(user_id, body);
    StatusCode::NO_CONTENT.into_response()
}
