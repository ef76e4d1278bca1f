use axum::{
    Json,
    extract::{Extension, State},
    http::StatusCode,
};
use chrono::{NaiveDateTime, Utc};
use staffplan_shared::api;
use staffplan_shared::domain::{Interval, parse_timestamp, to_utc};
use staffplan_shared::status::{progress_percent, schedule_status};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::{AppError, AppState, auth::AuthCtx, required};
use crate::storage::models::{ScheduledTaskFields, ScheduledTaskRecord};

const NOT_FOUND: &str = "Task not found";

fn scheduled_dto(record: ScheduledTaskRecord, now: NaiveDateTime) -> api::ScheduledTaskDto {
    let t = record.task;
    api::ScheduledTaskDto {
        status: schedule_status(now, t.start_time, t.end_time),
        progress: progress_percent(now, t.start_time, t.end_time),
        id: t.id,
        title: t.title,
        description: t.description,
        location: t.location,
        employee_id: t.employee_id,
        employee_name: record.employee_name,
        employee_department: record.employee_department,
        start_time: to_utc(t.start_time),
        end_time: to_utc(t.end_time),
        created_at: to_utc(t.created_at),
    }
}

/// Validates a create/replace body into insertable fields.
fn fields_from(body: api::ScheduledTaskReq) -> Result<ScheduledTaskFields, AppError> {
    let (Some(title), Some(location), Some(employee_id), Some(start), Some(end)) = (
        required(body.title),
        required(body.location),
        body.employee_id,
        body.start_time,
        body.end_time,
    ) else {
        return Err(AppError::bad_request(
            "Title, location, employee, start time and end time are required",
        ));
    };
    let parse = |s: &str| parse_timestamp(s).map_err(|e| AppError::bad_request(e.to_string()));
    let interval = Interval::new(parse(&start)?, parse(&end)?)
        .map_err(|_| AppError::bad_request("Start time must be before end time"))?;
    Ok(ScheduledTaskFields {
        title,
        description: body.description.filter(|d| !d.trim().is_empty()),
        location,
        employee_id: Some(employee_id),
        start_time: interval.start,
        end_time: interval.end,
    })
}

pub(super) async fn list(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthCtx>,
    ApiQuery(query): ApiQuery<api::ScheduleQuery>,
) -> Result<Json<Vec<api::ScheduledTaskDto>>, AppError> {
    let employee = if auth.is_admin() {
        query.employee_id
    } else {
        match query.employee_id {
            Some(other) if other != auth.employee_id => return Err(AppError::forbidden()),
            _ => Some(auth.employee_id),
        }
    };
    let now = Utc::now().naive_utc();
    let mut items: Vec<api::ScheduledTaskDto> = state
        .store
        .list_scheduled_tasks(employee)
        .await?
        .into_iter()
        .map(|r| scheduled_dto(r, now))
        .collect();
    // Rows arrive by start time; a stable sort keeps that within each status.
    items.sort_by_key(|t| t.status.sort_rank());
    Ok(Json(items))
}

pub(super) async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<api::ScheduledTaskReq>,
) -> Result<(StatusCode, Json<api::ScheduledTaskDto>), AppError> {
    let fields = fields_from(body)?;
    let record = state.store.create_scheduled_task(fields).await?;
    tracing::info!(
        scheduled_task_id = record.task.id,
        employee_id = ?record.task.employee_id,
        "scheduled task created"
    );
    Ok((
        StatusCode::CREATED,
        Json(scheduled_dto(record, Utc::now().naive_utc())),
    ))
}

pub(super) async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<api::ScheduledTaskReq>,
) -> Result<Json<api::ScheduledTaskDto>, AppError> {
    let fields = fields_from(body)?;
    let record = state
        .store
        .update_scheduled_task(id, fields)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
    Ok(Json(scheduled_dto(record, Utc::now().naive_utc())))
}

pub(super) async fn remove(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<api::MessageResp>, AppError> {
    if !state.store.delete_scheduled_task(id).await? {
        return Err(AppError::not_found(NOT_FOUND));
    }
    Ok(Json(api::MessageResp {
        message: "Task deleted successfully".into(),
    }))
}
