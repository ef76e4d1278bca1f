use axum::http::{Request, header};
use axum::middleware::Next;
use axum::response::Response;
use chrono::{Duration, Utc};
use staffplan_shared::auth::Role;
use staffplan_shared::jwt::{self, JwtClaims};
use tracing::{error, warn};

use super::{AppError, AppState};
use crate::storage::models::Employee;

/// Identity of the caller as currently stored, not as remembered by the token.
#[derive(Clone, Debug)]
pub struct AuthCtx {
    pub employee_id: i32,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl AuthCtx {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

pub async fn require_bearer(
    axum::extract::State(state): axum::extract::State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let unauthorized = || Err(AppError::unauthorized());
    let header_val = match req.headers().get(header::AUTHORIZATION) {
        Some(v) => v,
        None => return unauthorized(),
    };
    let header_str = header_val.to_str().map_err(|_| AppError::unauthorized())?;
    let Some(token) = header_str.strip_prefix("Bearer ") else {
        return unauthorized();
    };

    let claims = match jwt::decode_and_verify(token.trim(), state.config.jwt_secret.as_bytes()) {
        Ok(c) => c,
        Err(e) => {
            warn!(error=%e, "auth: jwt decode failed");
            return unauthorized();
        }
    };

    let employee = match state.store.get_employee(claims.sub).await {
        Ok(Some(e)) => e,
        Ok(None) => {
            warn!(employee_id = claims.sub, "auth: token for unknown employee");
            return unauthorized();
        }
        Err(e) => {
            error!(employee_id = claims.sub, error=%e, "auth: employee lookup failed");
            return Err(AppError::internal(e));
        }
    };
    let role: Role = employee.role.parse().map_err(|e| {
        error!(employee_id = employee.id, error=%e, "auth: stored role is invalid");
        AppError::internal(e)
    })?;
    if role != claims.role {
        warn!(
            employee_id = employee.id,
            token_role = %claims.role,
            stored_role = %role,
            "auth: role changed since token was issued"
        );
    }

    req.extensions_mut().insert(AuthCtx {
        employee_id: employee.id,
        name: employee.name,
        email: employee.email,
        role,
    });
    Ok(next.run(req).await)
}

pub fn issue_token(state: &AppState, employee: &Employee) -> Result<String, AppError> {
    let role: Role = employee.role.parse().map_err(AppError::internal)?;
    let now = Utc::now();
    let claims = JwtClaims {
        sub: employee.id,
        email: employee.email.clone(),
        role,
        iat: now.timestamp(),
        exp: (now + Duration::hours(state.config.token_ttl_hours)).timestamp(),
    };
    jwt::encode(&claims, state.config.jwt_secret.as_bytes()).map_err(|e| {
        error!(employee_id = employee.id, error=%e, "login/register: jwt encode failed");
        AppError::internal(e)
    })
}

/// Runs on the blocking pool.
pub async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(AppError::internal)?
        .map_err(AppError::internal)
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, AppError> {
    let res = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await
        .map_err(AppError::internal)?;
    match res {
        Ok(ok) => Ok(ok),
        Err(e) => {
            // A malformed stored hash cannot match anything.
            warn!(error=%e, "auth: bcrypt verify failed");
            Ok(false)
        }
    }
}
