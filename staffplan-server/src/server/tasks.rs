use axum::{
    Json,
    extract::{Extension, State},
    http::StatusCode,
};
use chrono::{NaiveDateTime, Utc};
use staffplan_shared::api;
use staffplan_shared::domain::{parse_due_date, to_utc};
use staffplan_shared::status::{TaskStatus, task_status};

use super::extract::{ApiJson, ApiPath};
use super::{AppError, AppState, auth::AuthCtx, required};
use crate::storage::models::{Task, TaskChanges};

const NOT_FOUND: &str = "Task not found";

fn task_dto(task: Task, employee_name: Option<String>, now: NaiveDateTime) -> api::TaskDto {
    let status = TaskStatus::from_db(&task.status);
    api::TaskDto {
        display_status: task_status(now, None, task.due_date, status),
        status,
        id: task.id,
        title: task.title,
        description: task.description,
        employee_id: task.employee_id,
        employee_name,
        due_date: task.due_date.map(to_utc),
        created_at: to_utc(task.created_at),
        updated_at: to_utc(task.updated_at),
    }
}

fn due_date(raw: Option<String>) -> Result<Option<NaiveDateTime>, AppError> {
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| parse_due_date(&s).map_err(|e| AppError::bad_request(e.to_string())))
        .transpose()
}

async fn list(state: &AppState, employee: Option<i32>) -> Result<Json<Vec<api::TaskDto>>, AppError> {
    let now = Utc::now().naive_utc();
    let rows = state.store.list_tasks(employee).await?;
    Ok(Json(
        rows.into_iter()
            .map(|(task, name)| task_dto(task, name, now))
            .collect(),
    ))
}

pub(super) async fn list_mine(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
) -> Result<Json<Vec<api::TaskDto>>, AppError> {
    list(&state, Some(auth.employee_id)).await
}

pub(super) async fn list_all(
    State(state): State<AppState>,
) -> Result<Json<Vec<api::TaskDto>>, AppError> {
    list(&state, None).await
}

pub(super) async fn list_for_employee(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<Vec<api::TaskDto>>, AppError> {
    list(&state, Some(id)).await
}

pub(super) async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<api::CreateTaskReq>,
) -> Result<(StatusCode, Json<api::TaskDto>), AppError> {
    let title = required(body.title).ok_or_else(|| AppError::bad_request("Title is required"))?;
    let due = due_date(body.due_date)?;
    let (task, name) = state
        .store
        .create_task(&title, body.description.as_deref(), body.employee_id, due)
        .await?;
    tracing::info!(task_id = task.id, employee_id = ?task.employee_id, "task created");
    Ok((
        StatusCode::CREATED,
        Json(task_dto(task, name, Utc::now().naive_utc())),
    ))
}

pub(super) async fn update(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<api::UpdateTaskReq>,
) -> Result<Json<api::TaskDto>, AppError> {
    let task = state
        .store
        .get_task(id)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
    if !auth.is_admin() && task.employee_id != Some(auth.employee_id) {
        tracing::warn!(
            task_id = id,
            employee_id = auth.employee_id,
            owner = ?task.employee_id,
            "task update by non-owner denied"
        );
        return Err(AppError::forbidden());
    }

    let title = match body.title {
        Some(t) => Some(required(Some(t)).ok_or_else(|| AppError::bad_request("Title is required"))?),
        None => None,
    };
    let changes = TaskChanges {
        title,
        description: body.description,
        status: body.status.map(|s| s.as_str().to_string()),
        due_date: due_date(body.due_date)?,
    };
    let (task, name) = state
        .store
        .update_task(id, changes)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
    Ok(Json(task_dto(task, name, Utc::now().naive_utc())))
}

pub(super) async fn remove(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<api::MessageResp>, AppError> {
    if !state.store.delete_task(id).await? {
        return Err(AppError::not_found(NOT_FOUND));
    }
    Ok(Json(api::MessageResp {
        message: "Task deleted successfully".into(),
    }))
}
