//! Minimal REST client helpers for consumers (clients).

use super::endpoints as ep;
use super::*;
use once_cell::sync::Lazy;
use std::time::Duration;

pub use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum RestError {
    #[error("http: {0}")]
    Http(String),
    #[error("status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("serde: {0}")]
    Serde(String),
}

static HTTP_CLIENT: Lazy<Result<reqwest::Client, String>> = Lazy::new(|| {
    reqwest::Client::builder()
        .tcp_keepalive(Some(Duration::from_secs(180)))
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(180))
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| e.to_string())
});

fn mk_client() -> Result<reqwest::Client, RestError> {
    HTTP_CLIENT.clone().map_err(RestError::Http)
}

async fn handle_json<T: for<'de> serde::Deserialize<'de>>(
    res: reqwest::Response,
) -> Result<T, RestError> {
    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(RestError::Status {
            status: status.as_u16(),
            body,
        });
    }
    res.json::<T>()
        .await
        .map_err(|e| RestError::Serde(e.to_string()))
}

async fn get_json<T: for<'de> serde::Deserialize<'de>>(
    url: String,
    bearer: &str,
) -> Result<T, RestError> {
    let client = mk_client()?;
    let res = client
        .get(url)
        .bearer_auth(bearer)
        .send()
        .await
        .map_err(|e| RestError::Http(e.to_string()))?;
    handle_json(res).await
}

pub async fn login(base: &str, req: &LoginReq) -> Result<AuthResp, RestError> {
    let client = mk_client()?;
    let url = ep::auth_login(base);
    let res = client
        .post(url)
        .json(req)
        .send()
        .await
        .map_err(|e| RestError::Http(e.to_string()))?;
    handle_json(res).await
}

pub async fn list_schedule(
    base: &str,
    employee_id: Option<i32>,
    bearer: &str,
) -> Result<Vec<ScheduledTaskDto>, RestError> {
    get_json(ep::schedule(base, employee_id), bearer).await
}

pub async fn list_my_tasks(base: &str, bearer: &str) -> Result<Vec<TaskDto>, RestError> {
    get_json(ep::my_tasks(base), bearer).await
}
