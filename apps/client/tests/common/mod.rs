//! In-process mock of the résumé backend, served on an ephemeral port.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use resume_client::session::MemoryStorage;
use resume_client::{AppContext, Config};

pub const USERNAME: &str = "ada@example.com";
pub const PASSWORD: &str = "correct horse";
pub const TOKEN: &str = "test-token";
const CREATED_AT: &str = "2024-05-01T10:00:00Z";

#[derive(Default)]
pub struct BackendState {
    /// resource name -> records in insertion order
    pub records: Mutex<BTreeMap<String, Vec<Value>>>,
    pub next_id: AtomicUsize,
    /// Requests that reached the backend, any path.
    pub hits: AtomicUsize,
    /// When set, every authenticated call answers 401.
    pub revoked: Mutex<bool>,
    /// When set, DELETE answers 500.
    pub fail_deletes: Mutex<bool>,
    /// Delay applied to PUT and POST on record collections.
    pub mutation_delay: Mutex<Option<Duration>>,
    /// Record returned verbatim by the next list call, instead of the stored list.
    pub list_override: Mutex<Option<Value>>,
    /// Fields changed through `PUT /users/me`.
    pub profile: Mutex<Map<String, Value>>,
}

pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: Arc<BackendState>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(BackendState::default());
        state.next_id.store(1, Ordering::SeqCst);

        let app = Router::new()
            .route("/health", get(health))
            .route("/api/v1/auth/login", post(login))
            .route("/api/v1/auth/register", post(register))
            .route("/api/v1/users/me", get(me).put(update_me))
            .route("/api/v1/employers", get(list_employers))
            .route("/api/v1/employers/:id", get(get_employer))
            .route("/api/v1/documents/generate", post(generate))
            .route("/api/v1/employers/scrape", post(scrape))
            .route("/api/v1/documents", get(list_documents).post(create_document))
            .route(
                "/api/v1/documents/:id",
                get(get_document).put(update_document).delete(delete_document),
            )
            .route(
                "/api/v1/profile/:resource",
                get(list_records).post(create_record),
            )
            .route(
                "/api/v1/profile/:resource/:id",
                get(get_record).put(update_record).delete(delete_record),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });

        Self { addr, state }
    }

    pub fn config(&self) -> Config {
        Config::with_base_url(format!("http://{}", self.addr))
    }

    pub async fn context(&self) -> AppContext {
        AppContext::init(self.config(), Arc::new(MemoryStorage::new()))
            .await
            .expect("init context")
    }

    pub async fn logged_in_context(&self) -> AppContext {
        let ctx = self.context().await;
        ctx.login(&credentials()).await.expect("login");
        ctx
    }

    pub fn hits(&self) -> usize {
        self.state.hits.load(Ordering::SeqCst)
    }

    pub fn revoke_token(&self) {
        *self.state.revoked.lock().unwrap() = true;
    }

    pub fn fail_deletes(&self) {
        *self.state.fail_deletes.lock().unwrap() = true;
    }

    pub fn delay_mutations(&self, delay: Duration) {
        *self.state.mutation_delay.lock().unwrap() = Some(delay);
    }

    pub fn override_next_list(&self, body: Value) {
        *self.state.list_override.lock().unwrap() = Some(body);
    }

    /// Inserts a record directly, bypassing the client.
    pub fn seed(&self, resource: &str, mut fields: Value) -> String {
        let id = self.state.next_id.fetch_add(1, Ordering::SeqCst);
        fields["id"] = json!(id);
        fields["created_at"] = json!(CREATED_AT);
        self.state
            .records
            .lock()
            .unwrap()
            .entry(resource.to_string())
            .or_default()
            .push(fields);
        id.to_string()
    }

    pub fn stored(&self, resource: &str) -> Vec<Value> {
        self.state
            .records
            .lock()
            .unwrap()
            .get(resource)
            .cloned()
            .unwrap_or_default()
    }
}

pub fn credentials() -> resume_client::models::Credentials {
    resume_client::models::Credentials {
        username: USERNAME.to_string(),
        password: PASSWORD.to_string(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

type Shared = State<Arc<BackendState>>;

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

/// Counts the hit and checks the bearer token.
fn authorize(state: &BackendState, headers: &HeaderMap) -> Result<(), Response> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let expected = format!("Bearer {TOKEN}");
    let presented = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if *state.revoked.lock().unwrap() || presented != expected {
        return Err(detail(StatusCode::UNAUTHORIZED, "Could not validate credentials"));
    }
    Ok(())
}

async fn maybe_delay(state: &BackendState) {
    let delay = *state.mutation_delay.lock().unwrap();
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
}

async fn health(State(state): Shared) -> Json<Value> {
    state.hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "status": "ok", "version": "test" }))
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn login(State(state): Shared, Form(form): Form<LoginForm>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    if form.username == USERNAME && form.password == PASSWORD {
        Json(json!({ "access_token": TOKEN, "token_type": "bearer" })).into_response()
    } else {
        detail(StatusCode::UNAUTHORIZED, "Incorrect username or password")
    }
}

async fn register(State(state): Shared, Json(body): Json<Value>) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let email = body["email"].as_str().unwrap_or_default().to_string();
    if email == "taken@example.com" {
        return detail(StatusCode::BAD_REQUEST, "Email already registered");
    }
    let mut user = json!({ "id": 99, "email": email, "username": body.get("username") });
    if email.starts_with("auto") {
        user["access_token"] = json!(TOKEN);
    }
    (StatusCode::CREATED, Json(user)).into_response()
}

async fn me(State(state): Shared, headers: HeaderMap) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    Json(current_user(&state)).into_response()
}

fn current_user(state: &BackendState) -> Value {
    let mut user = json!({ "id": 1, "email": USERNAME, "full_name": "Ada Lovelace" });
    if let Some(fields) = user.as_object_mut() {
        for (k, v) in state.profile.lock().unwrap().iter() {
            fields.insert(k.clone(), v.clone());
        }
    }
    user
}

async fn update_me(State(state): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    if let Some(fields) = body.as_object() {
        let mut profile = state.profile.lock().unwrap();
        for (k, v) in fields {
            profile.insert(k.clone(), v.clone());
        }
    }
    Json(current_user(&state)).into_response()
}

async fn list_employers(State(state): Shared, headers: HeaderMap) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    list_in(&state, "employers").await
}

async fn get_employer(State(state): Shared, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    match find_in(&state, "employers", &id) {
        Some(record) => Json(record).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Employer not found"),
    }
}

async fn scrape(State(state): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    let url = body["employer_url"].as_str().unwrap_or_default();
    if !url.starts_with("http") {
        return detail(StatusCode::UNPROCESSABLE_ENTITY, "employer_url must be a URL");
    }
    Json(json!({ "name": "Acme Corp", "values": ["Ownership", "Curiosity"] })).into_response()
}

async fn generate(State(state): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    let employer = body["employer_name"].as_str().unwrap_or_default().to_string();
    if employer == "Fail Corp" {
        return detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Job description is required for generation",
        );
    }
    if employer == "Silent Corp" {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    let fields = json!({
        "title": body["title"],
        "document_type": body["document_type"],
        "employer_name": employer,
        "job_title": body["job_title"],
        "content": format!("Dear {employer} hiring team, ..."),
        "use_all_experiences": body["use_all_experiences"],
    });
    Json(insert(&state, "documents", fields)).into_response()
}

fn insert(state: &BackendState, resource: &str, body: Value) -> Value {
    let id = state.next_id.fetch_add(1, Ordering::SeqCst);
    let mut record: Map<String, Value> = body.as_object().cloned().unwrap_or_default();
    record.insert("id".to_string(), json!(id));
    record.insert("created_at".to_string(), json!(CREATED_AT));
    let record = Value::Object(record);
    state
        .records
        .lock()
        .unwrap()
        .entry(resource.to_string())
        .or_default()
        .push(record.clone());
    record
}

async fn list_in(state: &BackendState, resource: &str) -> Response {
    if let Some(body) = state.list_override.lock().unwrap().take() {
        return Json(body).into_response();
    }
    let records = state
        .records
        .lock()
        .unwrap()
        .get(resource)
        .cloned()
        .unwrap_or_default();
    Json(Value::Array(records)).into_response()
}

async fn create_in(state: &BackendState, resource: &str, body: Value) -> Response {
    maybe_delay(state).await;
    (StatusCode::CREATED, Json(insert(state, resource, body))).into_response()
}

fn find_in(state: &BackendState, resource: &str, id: &str) -> Option<Value> {
    state
        .records
        .lock()
        .unwrap()
        .get(resource)?
        .iter()
        .find(|r| r["id"].to_string() == id)
        .cloned()
}

async fn update_in(state: &BackendState, resource: &str, id: &str, patch: Value) -> Response {
    maybe_delay(state).await;
    let mut records = state.records.lock().unwrap();
    let Some(record) = records
        .get_mut(resource)
        .and_then(|list| list.iter_mut().find(|r| r["id"].to_string() == id))
    else {
        return detail(StatusCode::NOT_FOUND, &format!("{resource} {id} not found"));
    };
    if let (Some(target), Some(fields)) = (record.as_object_mut(), patch.as_object()) {
        for (k, v) in fields {
            target.insert(k.clone(), v.clone());
        }
    }
    Json(record.clone()).into_response()
}

fn delete_in(state: &BackendState, resource: &str, id: &str) -> Response {
    if *state.fail_deletes.lock().unwrap() {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "Database unavailable");
    }
    let mut records = state.records.lock().unwrap();
    let list = records.entry(resource.to_string()).or_default();
    let before = list.len();
    list.retain(|r| r["id"].to_string() != id);
    if list.len() == before {
        return detail(StatusCode::NOT_FOUND, &format!("{resource} {id} not found"));
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn list_documents(State(state): Shared, headers: HeaderMap) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    list_in(&state, "documents").await
}

async fn create_document(State(state): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    create_in(&state, "documents", body).await
}

async fn get_document(State(state): Shared, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    match find_in(&state, "documents", &id) {
        Some(record) => Json(record).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Document not found"),
    }
}

async fn update_document(
    State(state): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    update_in(&state, "documents", &id, body).await
}

async fn delete_document(State(state): Shared, headers: HeaderMap, Path(id): Path<String>) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    delete_in(&state, "documents", &id)
}

async fn list_records(State(state): Shared, headers: HeaderMap, Path(resource): Path<String>) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    list_in(&state, &resource).await
}

async fn create_record(
    State(state): Shared,
    headers: HeaderMap,
    Path(resource): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    create_in(&state, &resource, body).await
}

async fn get_record(
    State(state): Shared,
    headers: HeaderMap,
    Path((resource, id)): Path<(String, String)>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    match find_in(&state, &resource, &id) {
        Some(record) => Json(record).into_response(),
        None => detail(StatusCode::NOT_FOUND, "Record not found"),
    }
}

async fn update_record(
    State(state): Shared,
    headers: HeaderMap,
    Path((resource, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    update_in(&state, &resource, &id, body).await
}

async fn delete_record(
    State(state): Shared,
    headers: HeaderMap,
    Path((resource, id)): Path<(String, String)>,
) -> Response {
    if let Err(r) = authorize(&state, &headers) {
        return r;
    }
    delete_in(&state, &resource, &id)
}
