//! In-process stand-in for the logistics backend, bound to an ephemeral port.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

pub const OPERATOR_TOKEN: &str = "op-token";
pub const CLIENT_TOKEN: &str = "abc";
pub const TEMP_TOKEN: &str = "123456";

#[derive(Default)]
pub struct Recorded {
    pub calls: Vec<String>,
    pub bodies: Vec<Value>,
    /// Decoded path parameters, in arrival order.
    pub params: Vec<String>,
    pub logout_fails: bool,
}

pub type Shared = Arc<Mutex<Recorded>>;

pub struct Backend {
    pub url: String,
    pub state: Shared,
}

impl Backend {
    pub async fn start() -> Self {
        let state: Shared = Arc::default();
        let app = router(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind stub backend");
        let addr = listener.local_addr().expect("local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("stub backend");
        });

        Self {
            url: format!("http://{addr}"),
            state,
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn params(&self) -> Vec<String> {
        self.state.lock().unwrap().params.clone()
    }

    pub fn last_body(&self) -> Value {
        self.state
            .lock()
            .unwrap()
            .bodies
            .last()
            .cloned()
            .unwrap_or(Value::Null)
    }

    pub fn fail_logout(&self) {
        self.state.lock().unwrap().logout_fails = true;
    }
}

fn record(state: &Shared, call: &str, body: Option<&Value>) {
    let mut recorded = state.lock().unwrap();
    recorded.calls.push(call.to_string());
    if let Some(body) = body {
        recorded.bodies.push(body.clone());
    }
}

fn record_param(state: &Shared, param: &str) {
    state.lock().unwrap().params.push(param.to_string());
}

fn error(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
}

fn user(id: i64, first_name: &str, role: &str, email: &str) -> Value {
    json!({
        "id": id,
        "first_name": first_name,
        "last_name": "Pérez",
        "role": role,
        "email": email,
        "is_email_verified": true,
    })
}

fn packages() -> Value {
    json!([
        {"id": 1, "tracking_code": "LSU-0001", "sender_name": "Ana", "recipient_name": "Luis",
         "delivery_address": "Turbo", "weight": "2.50", "status": "registered"},
        {"id": 2, "tracking_code": "LSU-0002", "sender_name": "Ana", "recipient_name": "Marta",
         "delivery_address": "Apartadó", "weight": 1.2, "status": "in_transit",
         "messenger_id": 3, "messenger_name": "Pedro"},
        {"id": 3, "tracking_code": "LSU-0003", "sender_name": "Carlos", "recipient_name": "Luis",
         "delivery_address": "Carepa", "weight": null, "status": "delivered",
         "messenger_id": 3, "messenger_name": "Pedro"}
    ])
}

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/verify-token", post(verify_token))
        .route("/api/send-token", post(send_token))
        .route("/api/verify-email/:token", get(verify_email))
        .route("/api/resend-verification", post(resend_verification))
        .route("/api/packages", get(list_packages))
        .route("/api/packages/tracking/:code", get(track))
        .route("/api/packages/register", post(register_package))
        .route("/api/packages/:id/status", put(update_status))
        .route("/api/packages/:id/assign-automatic", put(assign_automatic))
        .route("/api/users", get(list_users))
        .route("/api/users/:id", delete(delete_user))
        .with_state(state)
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    record(&state, "login", Some(&body));
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    if password != "password" {
        return error(
            StatusCode::UNAUTHORIZED,
            json!({"error": "Credenciales inválidas"}),
        );
    }

    match email {
        "juan@example.com" => Json(json!({
            "token": CLIENT_TOKEN,
            "user": user(1, "Juan", "client", email),
        }))
        .into_response(),
        "laura.operaria@logistica.com" => Json(json!({
            "token": OPERATOR_TOKEN,
            "user": user(2, "Laura", "operator", email),
        }))
        .into_response(),
        "maria@example.com" => {
            if body["session_id"].as_str() == Some("42") {
                Json(json!({
                    "token": "maria-token",
                    "user": {"id": 5, "first_name": "María", "last_name": "Gil", "role": "user"},
                }))
                .into_response()
            } else {
                error(
                    StatusCode::FORBIDDEN,
                    json!({"error": "Cuenta no verificada", "requires_token": true}),
                )
            }
        }
        _ => error(
            StatusCode::UNAUTHORIZED,
            json!({"error": "Credenciales inválidas"}),
        ),
    }
}

async fn logout(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    record(&state, "logout", Some(&body));
    if state.lock().unwrap().logout_fails {
        return error(StatusCode::INTERNAL_SERVER_ERROR, json!({"error": "boom"}));
    }
    Json(json!({"message": "Sesión cerrada"})).into_response()
}

async fn verify_token(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    record(&state, "verify_token", Some(&body));
    if body["token"].as_str() == Some(TEMP_TOKEN) {
        Json(json!({"session_id": 42})).into_response()
    } else {
        error(StatusCode::BAD_REQUEST, json!({"error": "Token inválido"}))
    }
}

async fn send_token(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    record(&state, "send_token", Some(&body));
    Json(json!({"message": "Token generado", "token": TEMP_TOKEN})).into_response()
}

async fn verify_email(State(state): State<Shared>, Path(token): Path<String>) -> Response {
    record(&state, "verify_email", None);
    record_param(&state, &token);
    if token == "good-link" {
        Json(json!({
            "success": true,
            "token": "fresh-token",
            "user": user(9, "Sofía", "client", "sofia@example.com"),
        }))
        .into_response()
    } else {
        error(
            StatusCode::BAD_REQUEST,
            json!({"success": false, "error": "Token expirado"}),
        )
    }
}

async fn resend_verification(State(state): State<Shared>, Json(body): Json<Value>) -> StatusCode {
    record(&state, "resend_verification", Some(&body));
    StatusCode::OK
}

async fn list_packages(State(state): State<Shared>, headers: HeaderMap) -> Response {
    record(&state, "list_packages", None);
    if bearer(&headers) != Some(OPERATOR_TOKEN) {
        return error(StatusCode::FORBIDDEN, json!({"error": "Acceso denegado"}));
    }
    Json(packages()).into_response()
}

async fn track(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(code): Path<String>,
) -> Response {
    let call = if bearer(&headers).is_some() {
        "track_with_bearer"
    } else {
        "track"
    };
    record(&state, call, None);
    record_param(&state, &code);

    packages()
        .as_array()
        .and_then(|all| {
            all.iter()
                .find(|package| package["tracking_code"].as_str() == Some(code.as_str()))
                .cloned()
        })
        .map_or_else(
            || error(StatusCode::NOT_FOUND, json!({"error": "Paquete no encontrado"})),
            |package| Json(package).into_response(),
        )
}

async fn register_package(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&state, "register_package", Some(&body));
    if bearer(&headers).is_none() {
        return error(StatusCode::UNAUTHORIZED, json!({"error": "Token requerido"}));
    }
    Json(json!({"message": "Paquete registrado", "tracking_code": "LSU-0100"})).into_response()
}

async fn update_status(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    record(&state, &format!("update_status:{id}"), Some(&body));
    Json(json!({"message": "Estado actualizado"})).into_response()
}

async fn assign_automatic(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    record(&state, &format!("assign_automatic:{id}"), None);
    Json(json!({"message": "Mensajero asignado"})).into_response()
}

async fn list_users(State(state): State<Shared>) -> Response {
    record(&state, "list_users", None);
    Json(json!([
        user(1, "Juan", "client", "juan@example.com"),
        user(2, "Laura", "operator", "laura.operaria@logistica.com"),
        user(7, "Root", "admin", "admin@logistica.com"),
    ]))
    .into_response()
}

async fn delete_user(State(state): State<Shared>, Path(id): Path<String>) -> StatusCode {
    record(&state, &format!("delete_user:{id}"), None);
    StatusCode::NO_CONTENT
}
