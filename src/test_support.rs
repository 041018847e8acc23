//! Fake clinic backend for HTTP-level tests, plus a recording chart renderer.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::dashboard::charts::{ChartConfig, ChartHandle, ChartId, ChartRenderer};

/// Canned backend data plus knobs for auth and failures.
#[derive(Debug, Clone)]
pub(crate) struct BackendFixture {
    pub appointments: Vec<Value>,
    pub staffs: Vec<Value>,
    pub patients: Vec<Value>,
    pub devices: Vec<Value>,
    pub medicines: Vec<Value>,
    pub schedule: Vec<Value>,
    pub username: String,
    pub required_token: Option<String>,
    pub failing: HashSet<String>,
}

impl BackendFixture {
    pub const EMAIL: &'static str = "admin@bkclinic.vn";
    pub const PASSWORD: &'static str = "hunter2";
    pub const TOKEN: &'static str = "tok-login";

    pub fn require_token(mut self, token: &str) -> Self {
        self.required_token = Some(token.to_string());
        self
    }

    /// Make `GET <collection>/` answer 500.
    pub fn failing(mut self, collection: &str) -> Self {
        self.failing.insert(collection.to_string());
        self
    }

    pub fn router(self) -> Router {
        Router::new()
            .route("/api/login/", post(login))
            .route("/api/users/", get(users))
            .route("/api/:collection/", get(collection))
            .with_state(Arc::new(self))
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        match &self.required_token {
            None => true,
            Some(token) => headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v == format!("Token {token}")),
        }
    }
}

impl Default for BackendFixture {
    fn default() -> Self {
        let records = |n: usize| (0..n).map(|i| json!({ "id": i + 1 })).collect::<Vec<_>>();
        Self {
            appointments: vec![
                json!({"id": 1, "date": "2025-03-10", "rate": "E", "completed": true, "feestatus": true}),
                json!({"id": 2, "date": "2025-03-11", "rate": "E", "completed": true, "feestatus": false}),
                json!({"id": 3, "date": "2025-03-12", "rate": "G", "completed": false, "feestatus": true}),
                json!({"id": 4, "date": "2025-03-14", "rate": "P", "completed": false, "feestatus": false}),
            ],
            staffs: records(3),
            patients: records(5),
            devices: records(2),
            medicines: records(4),
            schedule: records(1),
            username: "jcathrine".to_string(),
            required_token: None,
            failing: HashSet::new(),
        }
    }
}

async fn login(Json(body): Json<Value>) -> Response {
    let email = body.get("email").and_then(Value::as_str);
    let password = body.get("password").and_then(Value::as_str);
    if email == Some(BackendFixture::EMAIL) && password == Some(BackendFixture::PASSWORD) {
        Json(json!({ "token": BackendFixture::TOKEN })).into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Invalid credentials" })),
        )
            .into_response()
    }
}

async fn users(State(fixture): State<Arc<BackendFixture>>, headers: HeaderMap) -> Response {
    if !fixture.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({ "username": fixture.username, "email": BackendFixture::EMAIL })).into_response()
}

async fn collection(
    State(fixture): State<Arc<BackendFixture>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !fixture.authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if fixture.failing.contains(&name) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "backend exploded").into_response();
    }
    let records = match name.as_str() {
        "appointments" => &fixture.appointments,
        "staffs" => &fixture.staffs,
        "patients" => &fixture.patients,
        "device" => &fixture.devices,
        "medicines" => &fixture.medicines,
        "schedule" => &fixture.schedule,
        _ => return StatusCode::NOT_FOUND.into_response(),
    };
    Json(records.clone()).into_response()
}

#[derive(Debug, Default)]
struct RenderStats {
    created: usize,
    destroyed: usize,
    live: HashMap<Uuid, ChartId>,
    max_live_per_surface: usize,
    draws: HashMap<ChartId, usize>,
    last: HashMap<ChartId, ChartConfig>,
}

/// Chart renderer that records create/destroy calls. Clones share stats, so
/// a clone kept by the test can observe a renderer moved into a board.
#[derive(Debug, Default, Clone)]
pub(crate) struct RecordingRenderer {
    stats: Arc<Mutex<RenderStats>>,
}

impl RecordingRenderer {
    pub fn probe(&self) -> Self {
        self.clone()
    }

    fn stats(&self) -> std::sync::MutexGuard<'_, RenderStats> {
        self.stats.lock().expect("render stats lock")
    }

    pub fn created(&self) -> usize {
        self.stats().created
    }

    pub fn destroyed(&self) -> usize {
        self.stats().destroyed
    }

    pub fn live(&self) -> usize {
        self.stats().live.len()
    }

    pub fn max_live_per_surface(&self) -> usize {
        self.stats().max_live_per_surface
    }

    pub fn draws(&self, surface: ChartId) -> usize {
        self.stats().draws.get(&surface).copied().unwrap_or(0)
    }

    pub fn last_config(&self, surface: ChartId) -> Option<ChartConfig> {
        self.stats().last.get(&surface).cloned()
    }
}

impl ChartRenderer for RecordingRenderer {
    fn create(&mut self, surface: ChartId, config: &ChartConfig) -> ChartHandle {
        let handle = ChartHandle::new(surface);
        let mut stats = self.stats();
        stats.created += 1;
        stats.live.insert(handle.id(), surface);
        let on_surface = stats.live.values().filter(|s| **s == surface).count();
        stats.max_live_per_surface = stats.max_live_per_surface.max(on_surface);
        *stats.draws.entry(surface).or_default() += 1;
        stats.last.insert(surface, config.clone());
        handle
    }

    fn destroy(&mut self, handle: ChartHandle) {
        let mut stats = self.stats();
        stats.destroyed += 1;
        stats.live.remove(&handle.id());
    }
}

/// Serve the fixture on an ephemeral localhost port; returns the API base URL.
pub(crate) async fn spawn_backend(fixture: BackendFixture) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake backend");
    let addr = listener.local_addr().expect("fake backend address");
    let app = fixture.router();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Fake backend error: {e}");
        }
    });

    format!("http://{addr}/api/")
}
