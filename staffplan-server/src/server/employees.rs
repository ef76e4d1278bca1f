use axum::{
    Json,
    extract::State,
    http::StatusCode,
};
use staffplan_shared::api;
use staffplan_shared::auth::Role;
use staffplan_shared::domain::{ParseError, WorkHours, to_utc};

use super::extract::{ApiJson, ApiPath, ApiQuery};
use super::{AppError, AppState, auth, required};
use crate::storage::EmployeeDraft;
use crate::storage::models::{EmployeeChanges, EmployeeRecord};

const NOT_FOUND: &str = "Employee not found";

pub(super) fn employee_dto(record: EmployeeRecord) -> Result<api::EmployeeDto, AppError> {
    let e = record.employee;
    Ok(api::EmployeeDto {
        role: e.role.parse().map_err(AppError::internal)?,
        id: e.id,
        name: e.name,
        email: e.email,
        phone: e.phone,
        department: e.department,
        gender: e.gender,
        job_title: e.job_title,
        created_at: to_utc(e.created_at),
        start_time: record.start_time,
        end_time: record.end_time,
    })
}

fn hours_error(e: ParseError) -> AppError {
    match e {
        ParseError::EmptyRange => AppError::bad_request("Start time must be before end time"),
        other => AppError::bad_request(other.to_string()),
    }
}

/// Both bounds or neither.
fn parse_hours(start: Option<&str>, end: Option<&str>) -> Result<Option<WorkHours>, AppError> {
    match (start, end) {
        (None, None) => Ok(None),
        (Some(s), Some(e)) => WorkHours::parse(s, e).map(Some).map_err(hours_error),
        _ => Err(AppError::bad_request(
            "Start time and end time must be provided together",
        )),
    }
}

fn non_blank(value: Option<String>, field: &str) -> Result<Option<String>, AppError> {
    match value {
        None => Ok(None),
        Some(v) => required(Some(v))
            .map(Some)
            .ok_or_else(|| AppError::bad_request(format!("{field} cannot be empty"))),
    }
}

pub(super) async fn list(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<api::EmployeeQuery>,
) -> Result<Json<Vec<api::EmployeeListItemDto>>, AppError> {
    let rows = state.store.list_employees(query).await?;
    let items = rows
        .into_iter()
        .map(|(record, task_count)| {
            Ok(api::EmployeeListItemDto {
                employee: employee_dto(record)?,
                task_count,
            })
        })
        .collect::<Result<Vec<_>, AppError>>()?;
    Ok(Json(items))
}

pub(super) async fn get_one(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<api::EmployeeDto>, AppError> {
    let record = state
        .store
        .get_employee_record(id)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
    Ok(Json(employee_dto(record)?))
}

pub(super) async fn create(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<api::CreateEmployeeReq>,
) -> Result<(StatusCode, Json<api::EmployeeDto>), AppError> {
    let (Some(name), Some(email), Some(password)) = (
        required(body.name),
        required(body.email),
        body.password.filter(|p| !p.is_empty()),
    ) else {
        return Err(AppError::bad_request("Name, email and password are required"));
    };
    let hours = parse_hours(body.start_time.as_deref(), body.end_time.as_deref())?;
    let password_hash = auth::hash_password(password, state.config.password_cost).await?;

    let record = state
        .store
        .create_employee(EmployeeDraft {
            name,
            email,
            password_hash,
            role: Role::Employee,
            phone: body.phone,
            department: body.department,
            gender: body.gender,
            job_title: body.job_title,
            hours,
        })
        .await?;
    tracing::info!(employee_id = record.employee.id, "employee created");
    Ok((StatusCode::CREATED, Json(employee_dto(record)?)))
}

pub(super) async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(body): ApiJson<api::UpdateEmployeeReq>,
) -> Result<Json<api::EmployeeDto>, AppError> {
    let current = state
        .store
        .get_employee_record(id)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;

    // A single bound is merged with the stored one.
    let hours = match (body.start_time, body.end_time) {
        (None, None) => None,
        (start, end) => parse_hours(
            start.as_deref().or(current.start_time.as_deref()),
            end.as_deref().or(current.end_time.as_deref()),
        )?,
    };
    let changes = EmployeeChanges {
        name: non_blank(body.name, "name")?,
        email: non_blank(body.email, "email")?,
        phone: body.phone,
        department: body.department,
        gender: body.gender,
        job_title: body.job_title,
    };

    let record = state
        .store
        .update_employee(id, changes, hours)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
    Ok(Json(employee_dto(record)?))
}

pub(super) async fn remove(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<Json<api::MessageResp>, AppError> {
    if !state.store.delete_employee(id).await? {
        return Err(AppError::not_found(NOT_FOUND));
    }
    tracing::info!(employee_id = id, "employee deleted");
    Ok(Json(api::MessageResp {
        message: "Employee deleted successfully".into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hours_need_both_bounds() {
        assert!(parse_hours(None, None).unwrap().is_none());
        assert!(parse_hours(Some("09:00"), None).is_err());
        let h = parse_hours(Some("09:00"), Some("09:30")).unwrap().unwrap();
        assert_eq!(h.to_string(), "09:00-09:30");
    }

    #[test]
    fn inverted_hours_use_the_client_message() {
        match parse_hours(Some("17:00"), Some("09:00")) {
            Err(AppError::BadRequest(m)) => assert_eq!(m, "Start time must be before end time"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
