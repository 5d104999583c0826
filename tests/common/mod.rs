// SPDX-License-Identifier: MIT
// Copyright 2026 The Serena Care Authors

//! In-process fake of the Serena backend.
//!
//! Serves the REST endpoints the client uses from in-memory maps, issues
//! HS256 JWTs on sign-up/sign-in and answers 401 for missing, invalid or
//! revoked tokens.

use axum::extract::{Form, Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use dashmap::DashMap;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use serena_care::config::Config;
use serena_care::storage::MemoryStore;
use serena_care::AppState;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

const SIGNING_KEY: &[u8] = b"fake_backend_signing_key_32bytes";
const COMPARTMENTS_PER_DEVICE: u64 = 14;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: usize,
    iat: usize,
}

#[derive(Clone)]
struct StoredUser {
    profile: Value,
    password: String,
}

/// Backend state. Records are kept as JSON so tests can seed odd shapes.
#[derive(Default)]
pub struct BackendState {
    next_id: AtomicU64,
    users: DashMap<String, StoredUser>,
    seniors: DashMap<String, Value>,
    links: DashMap<String, Vec<String>>,
    prescriptions: DashMap<String, Value>,
    symptoms: DashMap<String, Value>,
    medications: DashMap<String, Value>,
    compartments: DashMap<String, Value>,
    compartment_updates: DashMap<String, Value>,
    requests: AtomicUsize,
    revoked: AtomicBool,
    leak_foreign: AtomicBool,
    catalogue_down: AtomicBool,
}

impl BackendState {
    fn id(&self) -> String {
        (self.next_id.fetch_add(1, Ordering::SeqCst) + 1).to_string()
    }
}

type Shared = Arc<BackendState>;

/// Running fake backend.
pub struct FakeBackend {
    pub base_url: String,
    pub state: Shared,
}

#[allow(dead_code)]
impl FakeBackend {
    /// Start the fake backend on an ephemeral port.
    pub async fn spawn() -> Self {
        let state: Shared = Arc::new(BackendState::default());
        for name in ["Paracetamol", "Losartana", "Metformina"] {
            let id = state.id();
            state
                .medications
                .insert(id.clone(), json!({"id": id.parse::<u64>().unwrap(), "name": name}));
        }

        let app = router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    /// Client wired to this backend with in-memory storage.
    pub fn client(&self) -> (AppState, MemoryStore) {
        let store = MemoryStore::new();
        let app = self.client_with_store(Arc::new(store.clone()));
        (app, store)
    }

    pub fn client_with_store(
        &self,
        store: Arc<dyn serena_care::storage::KeyValueStore>,
    ) -> AppState {
        let mut config = Config::test_default();
        config.api_base_url = self.base_url.clone();
        AppState::with_store(config, store).expect("Failed to build client")
    }

    pub fn seed_user(&self, name: &str, email: &str, password: &str, role: &str) -> String {
        let id = self.state.id();
        let profile = json!({"id": id, "name": name, "email": email, "role": role});
        self.state.users.insert(
            email.to_string(),
            StoredUser {
                profile,
                password: password.to_string(),
            },
        );
        id
    }

    /// Create a senior with a 14-compartment dispenser.
    pub fn seed_senior(&self, name: &str, birth_date: &str) -> String {
        let id = self.state.id();
        insert_senior(&self.state, &id, name, birth_date, &format!("dev-{}", id));
        id
    }

    pub fn link(&self, user_id: &str, senior_id: &str) {
        self.state
            .links
            .entry(user_id.to_string())
            .or_default()
            .push(senior_id.to_string());
    }

    pub fn seed_prescription(&self, senior_id: &str, medication_id: &str, frequency: Value) -> String {
        let id = self.state.id();
        self.state.prescriptions.insert(
            id.clone(),
            json!({
                "id": id,
                "senior_id": senior_id,
                "medication_id": medication_id,
                "dosage": "1 comprimido",
                "frequency": frequency,
                "start_date": "2025-01-10T09:00:00",
                "end_date": null,
            }),
        );
        id
    }

    pub fn seed_symptom(&self, senior_id: &str, description: &str, pain: u8, created_at: &str) -> String {
        let id = self.state.id();
        self.state.symptoms.insert(
            id.clone(),
            json!({
                "id": id,
                "seniorId": senior_id,
                "description": description,
                "painLevel": pain,
                "createdAt": created_at,
            }),
        );
        id
    }

    pub fn medication_id(&self, name: &str) -> String {
        self.state
            .medications
            .iter()
            .find(|m| m.value()["name"] == name)
            .map(|m| m.key().clone())
            .expect("unknown medication")
    }

    /// Compartment ID at a 1-based position of a senior's dispenser.
    pub fn compartment_id(senior_id: &str, position: u64) -> String {
        (senior_id.parse::<u64>().unwrap() * 100 + position).to_string()
    }

    pub fn last_compartment_update(&self, compartment_id: &str) -> Option<Value> {
        self.state
            .compartment_updates
            .get(compartment_id)
            .map(|v| v.value().clone())
    }

    pub fn prescription_count(&self) -> usize {
        self.state.prescriptions.len()
    }

    pub fn requests(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// Reject every token from now on.
    pub fn revoke_tokens(&self) {
        self.state.revoked.store(true, Ordering::SeqCst);
    }

    pub fn restore_tokens(&self) {
        self.state.revoked.store(false, Ordering::SeqCst);
    }

    /// Store a symptom with no description or timestamp.
    pub fn seed_malformed_symptom(&self, senior_id: &str) -> String {
        let id = self.state.id();
        self.state
            .symptoms
            .insert(id.clone(), json!({"id": id, "senior_id": senior_id}));
        id
    }

    /// Fail every medication catalogue request with a 500.
    pub fn break_catalogue(&self) {
        self.state.catalogue_down.store(true, Ordering::SeqCst);
    }

    /// Return records of every senior from the by-senior endpoints.
    pub fn leak_foreign_records(&self) {
        self.state.leak_foreign.store(true, Ordering::SeqCst);
    }
}

fn insert_senior(state: &BackendState, id: &str, name: &str, birth_date: &str, device_id: &str) {
    state.seniors.insert(
        id.to_string(),
        json!({"id": id.parse::<u64>().unwrap(), "name": name, "birth_date": birth_date, "device_id": device_id}),
    );
    let base = id.parse::<u64>().unwrap() * 100;
    for position in 1..=COMPARTMENTS_PER_DEVICE {
        let compartment_id = (base + position).to_string();
        state.compartments.insert(
            compartment_id.clone(),
            json!({
                "compartment_id": compartment_id,
                "senior_id": id,
                "position": position,
                "medication_id": null,
                "quantity": 0,
            }),
        );
    }
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/senior/", post(create_senior))
        .route("/senior/by_user/{user_id}", get(seniors_by_user))
        .route("/senior/relate_user_senior/", post(relate_user_senior))
        .route("/prescriptions/", post(create_prescription))
        .route(
            "/prescriptions/{id}",
            put(update_prescription).delete(delete_prescription),
        )
        .route("/prescriptions/by_senior/{senior_id}", get(prescriptions_by_senior))
        .route("/symptoms/by_senior/{senior_id}", get(symptoms_by_senior))
        .route("/medications/", get(medications))
        .route("/device/by_senior/{senior_id}", get(device_by_senior))
        .route("/compartment/{id}", put(update_compartment))
        .route("/reports/report/{senior_id}", get(report))
        .with_state(state)
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"detail": message}))).into_response()
}

fn issue_token(user_id: &str) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as usize;
    let claims = Claims {
        sub: user_id.to_string(),
        exp: now + 3600,
        iat: now,
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(SIGNING_KEY),
    )
    .unwrap()
}

/// Count the request and return the caller's user ID.
fn authenticate(state: &BackendState, headers: &HeaderMap) -> Result<String, Response> {
    state.requests.fetch_add(1, Ordering::SeqCst);
    let unauthorized = || detail(StatusCode::UNAUTHORIZED, "Could not validate credentials");

    if state.revoked.load(Ordering::SeqCst) {
        return Err(unauthorized());
    }
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(unauthorized)?;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(SIGNING_KEY),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims.sub)
    .map_err(|_| unauthorized())
}

fn owned_by(state: &BackendState, record: &Value, senior_id: &str) -> bool {
    let owner = record
        .get("senior_id")
        .or_else(|| record.get("seniorId"))
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .unwrap_or_default();
    state.leak_foreign.load(Ordering::SeqCst) || owner == senior_id
}

#[derive(Deserialize)]
struct RegisterBody {
    name: String,
    email: String,
    password: String,
    role: String,
}

async fn register(State(state): State<Shared>, Json(body): Json<RegisterBody>) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    if state.users.contains_key(&body.email) {
        return detail(StatusCode::BAD_REQUEST, "Email already registered");
    }

    let id = state.id();
    let profile = json!({"id": id, "name": body.name, "email": body.email, "role": body.role});
    state.users.insert(
        body.email.clone(),
        StoredUser {
            profile: profile.clone(),
            password: body.password,
        },
    );
    (
        StatusCode::CREATED,
        Json(json!({"token": issue_token(&id), "user": profile})),
    )
        .into_response()
}

#[derive(Deserialize)]
struct LoginForm {
    username: String,
    password: String,
}

async fn login(State(state): State<Shared>, Form(form): Form<LoginForm>) -> Response {
    state.requests.fetch_add(1, Ordering::SeqCst);
    match state.users.get(&form.username) {
        Some(user) if user.password == form.password => {
            let id = user.profile["id"].as_str().unwrap_or_default().to_string();
            Json(json!({
                "access_token": issue_token(&id),
                "token_type": "bearer",
                "user": user.profile,
            }))
            .into_response()
        }
        _ => detail(StatusCode::UNAUTHORIZED, "Incorrect email or password"),
    }
}

async fn seniors_by_user(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, Response> {
    authenticate(&state, &headers)?;
    let ids = state
        .links
        .get(&user_id)
        .map(|l| l.value().clone())
        .unwrap_or_default();
    let seniors: Vec<Value> = ids
        .iter()
        .filter_map(|id| state.seniors.get(id).map(|s| s.value().clone()))
        .collect();
    Ok(Json(Value::Array(seniors)))
}

#[derive(Deserialize)]
struct NewSeniorBody {
    name: String,
    birth_date: String,
    device_id: String,
}

async fn create_senior(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<NewSeniorBody>,
) -> Result<Response, Response> {
    let user_id = authenticate(&state, &headers)?;
    let id = state.id();
    insert_senior(&state, &id, &body.name, &body.birth_date, &body.device_id);
    state.links.entry(user_id).or_default().push(id.clone());
    Ok((StatusCode::CREATED, Json(state.seniors.get(&id).unwrap().value().clone())).into_response())
}

#[derive(Deserialize)]
struct RelateQuery {
    user_id: String,
    senior_id: String,
}

async fn relate_user_senior(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<RelateQuery>,
) -> Result<Json<Value>, Response> {
    authenticate(&state, &headers)?;
    if !state.seniors.contains_key(&query.senior_id) {
        return Err(detail(StatusCode::NOT_FOUND, "Senior not found"));
    }
    let mut links = state.links.entry(query.user_id).or_default();
    if links.contains(&query.senior_id) {
        return Err(detail(StatusCode::BAD_REQUEST, "Senior already related to user"));
    }
    links.push(query.senior_id);
    Ok(Json(json!({"message": "Senior related"})))
}

async fn prescriptions_by_senior(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(senior_id): Path<String>,
) -> Result<Json<Value>, Response> {
    authenticate(&state, &headers)?;
    let list: Vec<Value> = state
        .prescriptions
        .iter()
        .filter(|p| owned_by(&state, p.value(), &senior_id))
        .map(|p| p.value().clone())
        .collect();
    Ok(Json(Value::Array(list)))
}

async fn create_prescription(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Result<Response, Response> {
    authenticate(&state, &headers)?;
    let id = state.id();
    body["id"] = json!(id);
    state.prescriptions.insert(id, body.clone());
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

async fn update_prescription(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(mut body): Json<Value>,
) -> Result<Json<Value>, Response> {
    authenticate(&state, &headers)?;
    let mut existing = state
        .prescriptions
        .get_mut(&id)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Prescription not found"))?;
    body["id"] = json!(id);
    *existing = body.clone();
    Ok(Json(body))
}

async fn delete_prescription(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, Response> {
    authenticate(&state, &headers)?;
    state
        .prescriptions
        .remove(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Prescription not found"))
}

async fn symptoms_by_senior(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(senior_id): Path<String>,
) -> Result<Json<Value>, Response> {
    authenticate(&state, &headers)?;
    let list: Vec<Value> = state
        .symptoms
        .iter()
        .filter(|s| owned_by(&state, s.value(), &senior_id))
        .map(|s| s.value().clone())
        .collect();
    Ok(Json(Value::Array(list)))
}

async fn medications(
    State(state): State<Shared>,
    headers: HeaderMap,
) -> Result<Json<Value>, Response> {
    authenticate(&state, &headers)?;
    if state.catalogue_down.load(Ordering::SeqCst) {
        return Err(detail(StatusCode::INTERNAL_SERVER_ERROR, "Catalogue unavailable"));
    }
    let list: Vec<Value> = state.medications.iter().map(|m| m.value().clone()).collect();
    Ok(Json(Value::Array(list)))
}

async fn device_by_senior(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(senior_id): Path<String>,
) -> Result<Json<Value>, Response> {
    authenticate(&state, &headers)?;
    let device_id = state
        .seniors
        .get(&senior_id)
        .map(|s| s.value()["device_id"].clone())
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Device not found"))?;

    let mut compartments: Vec<Value> = state
        .compartments
        .iter()
        .filter(|c| c.value()["senior_id"] == senior_id.as_str())
        .map(|c| {
            let mut c = c.value().clone();
            let name = c["medication_id"]
                .as_str()
                .and_then(|id| state.medications.get(id))
                .map(|m| m.value()["name"].clone())
                .unwrap_or(Value::Null);
            c["medication_name"] = name;
            c
        })
        .collect();
    compartments.sort_by_key(|c| c["position"].as_u64().unwrap_or_default());

    Ok(Json(json!({
        "id": device_id,
        "dispenser": {"compartments": compartments},
    })))
}

async fn update_compartment(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, Response> {
    authenticate(&state, &headers)?;
    let mut compartment = state
        .compartments
        .get_mut(&id)
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Compartment not found"))?;

    let medication_id = body["medication_id"].as_str().unwrap_or_default();
    compartment["medication_id"] = if medication_id.is_empty() {
        Value::Null
    } else {
        json!(medication_id)
    };
    compartment["quantity"] = body["quantity"].clone();
    state.compartment_updates.insert(id, body);
    Ok(Json(compartment.value().clone()))
}

async fn report(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(senior_id): Path<String>,
) -> Result<Json<Value>, Response> {
    authenticate(&state, &headers)?;
    let name = state
        .seniors
        .get(&senior_id)
        .map(|s| s.value()["name"].clone())
        .ok_or_else(|| detail(StatusCode::NOT_FOUND, "Senior not found"))?;

    let prescriptions: Vec<Value> = state
        .prescriptions
        .iter()
        .filter(|p| owned_by(&state, p.value(), &senior_id))
        .map(|p| p.value().clone())
        .collect();
    let symptoms: Vec<Value> = state
        .symptoms
        .iter()
        .filter(|s| owned_by(&state, s.value(), &senior_id))
        .map(|s| s.value().clone())
        .collect();

    Ok(Json(json!({
        "senior_id": senior_id,
        "senior_name": name,
        "prescriptions": prescriptions,
        "symptoms": symptoms,
        "summary": "Generated by the fake backend",
    })))
}
