//! Stub Mosques API for integration testing.
//!
//! An axum server on an ephemeral port that keeps its entities in memory and
//! records every request, so tests can assert on what actually went over the
//! wire (how many fetches, whether a retry happened, request order).

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use mosques_client::{ClientConfig, LoginRequest, MosquesClient};
use mosques_core::workflow::Role;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// One request as the stub saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
}

#[derive(Default)]
struct StubData {
    suggestions: Vec<Value>,
    reviews: Vec<Value>,
    edits: Vec<Value>,
    mosques: Vec<Value>,

    /// token -> (user id, role)
    tokens: HashMap<String, (i64, Role)>,
    /// (user id, collection, entity id)
    confirmations: HashSet<(i64, String, i64)>,
    requests: Vec<RecordedRequest>,

    list_delay: Duration,
    action_failure: Option<StatusCode>,
    omit_login_user_id: bool,
    me_failure: Option<StatusCode>,
}

/// Handle to the stub's state, shared with the router.
#[derive(Clone, Default)]
pub struct StubState {
    data: Arc<Mutex<StubData>>,
}

impl StubState {
    fn lock(&self) -> MutexGuard<'_, StubData> {
        self.data.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Running stub server. The server task is aborted on drop.
pub struct StubApi {
    pub base_url: String,
    state: StubState,
    handle: JoinHandle<()>,
}

impl Drop for StubApi {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl StubApi {
    /// Start the stub on an ephemeral port.
    pub async fn start() -> Result<Self> {
        // Run tests with: RUST_LOG=mosques_client=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let state = StubState::default();
        let app = router(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("Failed to bind stub API listener")?;
        let addr = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            base_url: format!("http://{}", addr),
            state,
            handle,
        })
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(&self.base_url)
    }

    /// A fresh client, signed in with `role`.
    pub async fn client_as(&self, role: Role) -> Result<MosquesClient> {
        self.client_with(self.config(), role).await
    }

    pub async fn client_with(&self, config: ClientConfig, role: Role) -> Result<MosquesClient> {
        let client = MosquesClient::new(config)?;
        client
            .login(LoginRequest::as_role(role))
            .await
            .context("Stub login failed")?;
        Ok(client)
    }

    // -------------------------------------------------------------------------
    // Seeding and knobs
    // -------------------------------------------------------------------------

    pub fn seed_suggestions(&self, items: Vec<Value>) {
        self.state.lock().suggestions = items;
    }

    pub fn seed_reviews(&self, items: Vec<Value>) {
        self.state.lock().reviews = items;
    }

    pub fn seed_edits(&self, items: Vec<Value>) {
        self.state.lock().edits = items;
    }

    pub fn seed_mosques(&self, items: Vec<Value>) {
        self.state.lock().mosques = items;
    }

    /// Delay every moderation list response.
    pub fn set_list_delay(&self, delay: Duration) {
        self.state.lock().list_delay = delay;
    }

    /// Make approve/reject/delete answer with `status`.
    pub fn fail_actions_with(&self, status: StatusCode) {
        self.state.lock().action_failure = Some(status);
    }

    /// Login responses leave out `user_id`, forcing a `/auth/me` lookup.
    pub fn omit_login_user_id(&self) {
        self.state.lock().omit_login_user_id = true;
    }

    /// Make `/auth/me` answer with `status`.
    pub fn fail_me_with(&self, status: StatusCode) {
        self.state.lock().me_failure = Some(status);
    }

    /// Forget every issued token; the next authenticated call gets a 401.
    pub fn expire_tokens(&self) {
        self.state.lock().tokens.clear();
    }

    /// Record a confirmation as if made from another device.
    pub fn preconfirm(&self, user_id: i64, collection: &str, id: i64) {
        self.state
            .lock()
            .confirmations
            .insert((user_id, collection.to_string(), id));
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().requests.clone()
    }

    /// Requests with this method whose path starts with `prefix`.
    pub fn count(&self, method: Method, prefix: &str) -> usize {
        self.state
            .lock()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path.starts_with(prefix))
            .count()
    }

    pub fn total_requests(&self) -> usize {
        self.state.lock().requests.len()
    }

    /// Current server-side copy of an entity.
    pub fn entity(&self, collection: &str, id: i64) -> Option<Value> {
        let data = self.state.lock();
        collection_of(&data, collection)?
            .iter()
            .find(|item| item["id"] == id)
            .cloned()
    }
}

// =============================================================================
// Router
// =============================================================================

fn router(state: StubState) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/mosques", get(list_mosques))
        .route("/mosques/nearby", get(list_mosques))
        .route("/mosques/:id", get(get_mosque))
        .route("/mosques/:id/reviews", get(list_mosque_reviews).post(create_review))
        .route("/meta/facilities", get(facilities))
        .route("/suggestions/mosques", get(list_public_suggestions).post(create_suggestion))
        .route("/suggestions/mosques/:id/edits", post(create_edit))
        .route("/suggestions/:id/confirmations", post(confirm_suggestion))
        .route("/suggestions/edits/:id/confirmations", post(confirm_edit))
        .route("/moderation/:collection", get(list_moderation))
        .route(
            "/moderation/:collection/:id",
            axum::routing::delete(delete_entity),
        )
        .route("/moderation/:collection/:id/:action", post(moderate))
        .layer(middleware::from_fn_with_state(state.clone(), record))
        .with_state(state)
}

async fn record(State(state): State<StubState>, request: Request, next: Next) -> Response {
    state.lock().requests.push(RecordedRequest {
        method: request.method().clone(),
        path: request.uri().path().to_string(),
        query: request.uri().query().map(str::to_string),
    });
    next.run(request).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn caller(state: &StubState, headers: &HeaderMap) -> Result<(i64, Role), Response> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Missing Authorization Header"))?;
    state
        .lock()
        .tokens
        .get(token)
        .copied()
        .ok_or_else(|| error(StatusCode::UNAUTHORIZED, "Token has expired"))
}

fn collection_of<'a>(data: &'a StubData, collection: &str) -> Option<&'a Vec<Value>> {
    match collection {
        "suggestions" => Some(&data.suggestions),
        "reviews" => Some(&data.reviews),
        "edits" => Some(&data.edits),
        _ => None,
    }
}

fn collection_of_mut<'a>(data: &'a mut StubData, collection: &str) -> Option<&'a mut Vec<Value>> {
    match collection {
        "suggestions" => Some(&mut data.suggestions),
        "reviews" => Some(&mut data.reviews),
        "edits" => Some(&mut data.edits),
        _ => None,
    }
}

// =============================================================================
// Handlers
// =============================================================================

async fn login(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    let role = match body["role"].as_str().unwrap_or("authenticated") {
        "admin" => Role::Admin,
        "moderator" => Role::Moderator,
        _ => Role::Authenticated,
    };
    let mut data = state.lock();
    let user_id = data.tokens.len() as i64 + 1;
    let token = format!("token-{}", user_id);
    data.tokens.insert(token.clone(), (user_id, role));

    let mut response = json!({ "access_token": token, "role": role.to_string() });
    if !data.omit_login_user_id {
        response["user_id"] = json!(user_id);
    }
    Json(response).into_response()
}

async fn me(State(state): State<StubState>, headers: HeaderMap) -> Response {
    if let Some(status) = state.lock().me_failure {
        return error(status, "Profile lookup failed");
    }
    match caller(&state, &headers) {
        Ok((user_id, _)) => Json(json!({ "user_id": user_id })).into_response(),
        Err(response) => response,
    }
}

async fn list_mosques(State(state): State<StubState>) -> Response {
    Json(Value::Array(state.lock().mosques.clone())).into_response()
}

async fn get_mosque(State(state): State<StubState>, Path(id): Path<i64>) -> Response {
    match state.lock().mosques.iter().find(|m| m["id"] == id) {
        Some(mosque) => Json(mosque.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "Mosque not found"),
    }
}

async fn list_mosque_reviews(State(state): State<StubState>, Path(id): Path<i64>) -> Response {
    let reviews: Vec<Value> = state
        .lock()
        .reviews
        .iter()
        .filter(|r| r["mosque_id"] == id && r["status"] == "approved")
        .cloned()
        .collect();
    Json(reviews).into_response()
}

async fn create_review(
    State(state): State<StubState>,
    Path(mosque_id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut data = state.lock();
    let id = 1000 + data.reviews.len() as i64;
    let review = json!({
        "id": id,
        "mosque_id": mosque_id,
        "rating": body["rating"],
        "comment": body["comment"],
        "criteria": body.get("criteria").cloned().unwrap_or_else(|| json!({})),
        "status": "pending"
    });
    data.reviews.push(review.clone());
    (StatusCode::CREATED, Json(review)).into_response()
}

async fn facilities() -> Response {
    Json(json!({
        "facilities": [
            { "key": "women_section", "label": "Women section" },
            { "key": "wudu", "label": "Wudu area" }
        ]
    }))
    .into_response()
}

async fn list_public_suggestions(State(state): State<StubState>) -> Response {
    Json(Value::Array(state.lock().suggestions.clone())).into_response()
}

async fn create_suggestion(State(state): State<StubState>, Json(mut body): Json<Value>) -> Response {
    let mut data = state.lock();
    body["id"] = json!(500 + data.suggestions.len() as i64);
    body["status"] = json!("pending_approval");
    body["confirmations_count"] = json!(0);
    data.suggestions.push(body.clone());
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn create_edit(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(mosque_id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(response) = caller(&state, &headers) {
        return response;
    }
    let mut data = state.lock();
    let edit = json!({
        "id": 700 + data.edits.len() as i64,
        "mosque_id": mosque_id,
        "patch": body["patch"],
        "confirmations_count": 0,
        "status": "pending_approval"
    });
    data.edits.push(edit.clone());
    (StatusCode::CREATED, Json(edit)).into_response()
}

/// Mirrors the backend: duplicate suggestion confirmations are a 400.
async fn confirm_suggestion(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> Response {
    confirm(&state, &headers, "suggestions", id, StatusCode::BAD_REQUEST)
}

async fn confirm_edit(State(state): State<StubState>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    confirm(&state, &headers, "edits", id, StatusCode::CONFLICT)
}

fn confirm(
    state: &StubState,
    headers: &HeaderMap,
    collection: &str,
    id: i64,
    duplicate_status: StatusCode,
) -> Response {
    let (user_id, _) = match caller(state, headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    let mut data = state.lock();
    if !data
        .confirmations
        .insert((user_id, collection.to_string(), id))
    {
        return error(duplicate_status, "Duplicate confirmation for this user");
    }
    let Some(items) = collection_of_mut(&mut data, collection) else {
        return error(StatusCode::NOT_FOUND, "Unknown collection");
    };
    let Some(item) = items.iter_mut().find(|item| item["id"] == id) else {
        return error(StatusCode::NOT_FOUND, "Not found");
    };
    if item["status"] != "pending_approval" && item["status"] != "pending" {
        return error(StatusCode::BAD_REQUEST, "Only pending suggestions can be confirmed");
    }
    let count = item["confirmations_count"].as_u64().unwrap_or(0) + 1;
    item["confirmations_count"] = json!(count);
    Json(item.clone()).into_response()
}

async fn list_moderation(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(collection): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if let Err(response) = caller(&state, &headers) {
        return response;
    }
    let delay = state.lock().list_delay;
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let status = params.get("status").map(String::as_str).unwrap_or("pending");
    let data = state.lock();
    let Some(items) = collection_of(&data, &collection) else {
        return error(StatusCode::NOT_FOUND, "Unknown collection");
    };
    let items: Vec<Value> = items
        .iter()
        .filter(|item| {
            status == "all"
                || item["status"] == status
                || (status == "pending" && item["status"] == "pending_approval")
        })
        .cloned()
        .collect();
    Json(items).into_response()
}

async fn moderate(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path((collection, id, action)): Path<(String, i64, String)>,
) -> Response {
    let (_, role) = match caller(&state, &headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    if role < Role::Moderator {
        return error(StatusCode::FORBIDDEN, "Moderator role required");
    }
    let mut data = state.lock();
    if let Some(status) = data.action_failure {
        return error(status, "Moderation backend unavailable");
    }
    let new_status = match action.as_str() {
        "approve" => "approved",
        "reject" => "rejected",
        _ => return error(StatusCode::NOT_FOUND, "Unknown action"),
    };
    let Some(items) = collection_of_mut(&mut data, &collection) else {
        return error(StatusCode::NOT_FOUND, "Unknown collection");
    };
    match items.iter_mut().find(|item| item["id"] == id) {
        Some(item) => {
            item["status"] = json!(new_status);
            Json(item.clone()).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Not found"),
    }
}

async fn delete_entity(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path((collection, id)): Path<(String, i64)>,
) -> Response {
    let (_, role) = match caller(&state, &headers) {
        Ok(caller) => caller,
        Err(response) => return response,
    };
    if role < Role::Admin {
        return error(StatusCode::FORBIDDEN, "Admin role required");
    }
    let mut data = state.lock();
    if let Some(status) = data.action_failure {
        return error(status, "Moderation backend unavailable");
    }
    let Some(items) = collection_of_mut(&mut data, &collection) else {
        return error(StatusCode::NOT_FOUND, "Unknown collection");
    };
    let before = items.len();
    items.retain(|item| item["id"] != id);
    if items.len() == before {
        return error(StatusCode::NOT_FOUND, "Not found");
    }
    Json(json!({ "message": "deleted" })).into_response()
}
