mod acl;
pub mod auth;
mod config;
mod dashboard;
mod employees;
mod extract;
mod schedule;
mod tasks;

use crate::server::auth::AuthCtx;
use crate::server::extract::ApiJson;
use crate::storage::{EmployeeDraft, StorageError, Store};
use axum::http::{HeaderName, HeaderValue};
use axum::middleware;
use axum::response::Response as AxumResponse;
use axum::{
    Json, Router,
    extract::State,
    http::{Method, StatusCode, header},
    routing::{get, post, put},
};
pub use config::{AppConfig, ConfigError, StorageConfig};
use staffplan_shared::api;
use staffplan_shared::auth::Role;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{Span, info_span};
use uuid::Uuid;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub store: Store,
}

impl AppState {
    pub fn new(config: AppConfig, store: Store) -> Self {
        Self { config, store }
    }
}

#[derive(Clone, Debug)]
struct ReqId(pub String);

pub fn router(state: AppState) -> Router {
    let private = Router::new()
        .route(
            "/api/employees",
            get(employees::list).post(employees::create),
        )
        .route(
            "/api/employees/{id}",
            get(employees::get_one)
                .put(employees::update)
                .delete(employees::remove),
        )
        .route("/api/tasks", get(tasks::list_mine).post(tasks::create))
        .route("/api/tasks/all", get(tasks::list_all))
        .route("/api/tasks/employee/{id}", get(tasks::list_for_employee))
        .route("/api/tasks/{id}", put(tasks::update).delete(tasks::remove))
        .route("/api/schedule", get(schedule::list).post(schedule::create))
        .route(
            "/api/schedule/{id}",
            put(schedule::update).delete(schedule::remove),
        )
        .route("/api/dashboard/stats", get(dashboard::stats))
        .with_state(state.clone())
        // Outermost layer runs first: bearer, then span fields, then ACL.
        .layer(middleware::from_fn(acl::enforce_acl))
        .layer(middleware::from_fn(set_auth_span_fields))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer,
        ));

    // Trace with request context (method, path, request_id)
    let trace = TraceLayer::new_for_http().make_span_with(|req: &axum::http::Request<_>| {
        let request_id = req
            .extensions()
            .get::<ReqId>()
            .map(|r| r.0.clone())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        info_span!(
            "request",
            method = %req.method(),
            path = %req.uri().path(),
            request_id = %request_id,
            employee_id = tracing::field::Empty,
            role = tracing::field::Empty
        )
    });

    let mut app = Router::new()
        .route("/healthz", get(health))
        .route("/api/auth/login", post(api_auth_login))
        .route("/api/auth/register", post(api_auth_register))
        .merge(private);

    if let Some(dir) = &state.config.static_dir {
        let spa = ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")));
        app = app.fallback_service(spa);
    }

    let app = app
        .with_state(state.clone())
        .layer(trace)
        .layer(middleware::from_fn(add_security_headers))
        .layer(middleware::from_fn(add_request_id));

    // Optionally add CORS for dev if configured
    if let Some(origin) = &state.config.dev_cors_origin {
        let hv = header::HeaderValue::from_str(origin)
            .unwrap_or(header::HeaderValue::from_static("http://localhost:5173"));
        let cors = CorsLayer::new()
            .allow_origin(hv)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);
        app.layer(cors)
    } else {
        app
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn add_request_id(
    mut req: axum::http::Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> Result<AxumResponse, AppError> {
    let hdr = HeaderName::from_static("x-request-id");
    // Use provided x-request-id if present, else generate
    let rid = req
        .headers()
        .get(&hdr)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    req.extensions_mut().insert(ReqId(rid.clone()));
    let mut resp = next.run(req).await;
    if let Ok(hv) = HeaderValue::from_str(&rid) {
        resp.headers_mut().insert(hdr, hv);
    }
    Ok(resp)
}

async fn add_security_headers(
    req: axum::http::Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> Result<AxumResponse, AppError> {
    let is_api = {
        let path = req.uri().path();
        path == "/healthz" || path == "/api" || path.starts_with("/api/")
    };
    let mut resp = next.run(req).await;

    let headers = resp.headers_mut();
    for (name, value) in [
        ("x-content-type-options", "nosniff"),
        ("x-frame-options", "SAMEORIGIN"),
        ("referrer-policy", "no-referrer"),
        ("cross-origin-opener-policy", "same-origin"),
        ("cross-origin-resource-policy", "same-origin"),
    ] {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }

    if is_api {
        headers.insert(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate, private"),
        );
        headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
        headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    }

    Ok(resp)
}

async fn set_auth_span_fields(
    req: axum::http::Request<axum::body::Body>,
    next: axum::middleware::Next,
) -> Result<AxumResponse, AppError> {
    if let Some(auth) = req.extensions().get::<AuthCtx>() {
        let span = Span::current();
        span.record("employee_id", auth.employee_id);
        span.record("role", tracing::field::display(&auth.role));
    }
    Ok(next.run(req).await)
}

fn user_dto(employee: &crate::storage::models::Employee) -> Result<api::UserDto, AppError> {
    Ok(api::UserDto {
        id: employee.id,
        name: employee.name.clone(),
        email: employee.email.clone(),
        role: employee.role.parse().map_err(AppError::internal)?,
    })
}

/// Trimmed value, or `None` when absent or blank.
fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn api_auth_register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<api::RegisterReq>,
) -> Result<(StatusCode, Json<api::AuthResp>), AppError> {
    let (Some(name), Some(email), Some(password)) = (
        required(body.name),
        required(body.email),
        body.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::bad_request("Name, email and password are required"));
    };

    let password_hash = auth::hash_password(password, state.config.password_cost).await?;
    let draft = EmployeeDraft {
        name,
        email,
        password_hash,
        role: Role::Employee,
        phone: None,
        department: None,
        gender: None,
        job_title: None,
        hours: None,
    };
    let record = match state.store.create_employee(draft).await {
        Ok(r) => r,
        Err(StorageError::Conflict(_)) => {
            return Err(AppError::bad_request("User already exists"));
        }
        Err(e) => return Err(e.into()),
    };
    let token = auth::issue_token(&state, &record.employee)?;
    tracing::info!(employee_id = record.employee.id, "register: account created");
    Ok((
        StatusCode::CREATED,
        Json(api::AuthResp {
            user: user_dto(&record.employee)?,
            token,
        }),
    ))
}

async fn api_auth_login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<api::LoginReq>,
) -> Result<Json<api::AuthResp>, AppError> {
    let invalid = || AppError::bad_request("Invalid credentials");
    let employee = state
        .store
        .find_employee_by_email(body.email.trim())
        .await?
        .ok_or_else(|| {
            tracing::warn!(email=%body.email, "login: unknown email");
            invalid()
        })?;
    if !auth::verify_password(body.password, employee.password_hash.clone()).await? {
        tracing::warn!(employee_id = employee.id, "login: invalid password");
        return Err(invalid());
    }
    let token = auth::issue_token(&state, &employee)?;
    Ok(Json(api::AuthResp {
        user: user_dto(&employee)?,
        token,
    }))
}

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized,
    Forbidden,
    NotFound(String),
    Internal(String),
}

impl AppError {
    fn bad_request<T: Into<String>>(msg: T) -> Self {
        Self::BadRequest(msg.into())
    }
    fn unauthorized() -> Self {
        Self::Unauthorized
    }
    fn forbidden() -> Self {
        Self::Forbidden
    }
    fn not_found<T: Into<String>>(msg: T) -> Self {
        Self::NotFound(msg.into())
    }
    fn internal<E: std::fmt::Display>(e: E) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::InvalidInput(m) | StorageError::Conflict(m) => AppError::BadRequest(m),
            StorageError::NotFound(m) => AppError::NotFound(m),
            other => AppError::internal(other),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, msg, kind, detail) = match self {
            AppError::BadRequest(m) => (StatusCode::BAD_REQUEST, m, "bad_request", None),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized".into(),
                "unauthorized",
                None,
            ),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "forbidden".into(), "forbidden", None),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, m, "not_found", None),
            // Do not leak internal error details to clients, but log them
            AppError::Internal(m) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".into(),
                "internal",
                Some(m),
            ),
        };
        if let Some(detail) = detail {
            tracing::error!(status = %status, kind = kind, message = %msg, detail = %detail, "request failed");
        } else if status.is_client_error() {
            tracing::warn!(status = %status, kind = kind, message = %msg, "request rejected");
        }
        let body = Json(api::ErrorBody {
            error: kind.to_string(),
            message: msg,
        });
        (status, body).into_response()
    }
}
