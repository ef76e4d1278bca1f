use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::Role;
use crate::status::{ScheduleStatus, TaskDisplayStatus, TaskStatus};

pub mod endpoints;
#[cfg(feature = "rest-client")]
pub mod rest;

pub const API_PREFIX: &str = "/api";

// Auth
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterReq {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginReq {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResp {
    pub user: UserDto,
    pub token: String,
}

// Employees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeDto {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub department: Option<String>,
    pub gender: Option<String>,
    pub job_title: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Daily work hours, `HH:MM`.
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeListItemDto {
    #[serde(flatten)]
    pub employee: EmployeeDto,
    /// Number of scheduled tasks assigned to the employee.
    pub task_count: i64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateEmployeeReq {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

/// Absent fields keep their stored value.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateEmployeeReq {
    pub name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeSort {
    CreatedDate,
    TaskCount,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployeeQuery {
    pub search: Option<String>,
    pub department: Option<String>,
    pub gender: Option<String>,
    pub sort_by: Option<EmployeeSort>,
    pub sort_order: Option<SortOrder>,
}

// Generic tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDto {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub display_status: TaskDisplayStatus,
    pub employee_id: Option<i32>,
    pub employee_name: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateTaskReq {
    pub title: Option<String>,
    pub description: Option<String>,
    pub employee_id: Option<i32>,
    pub due_date: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateTaskReq {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<String>,
}

// Scheduled tasks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledTaskDto {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub employee_id: Option<i32>,
    pub employee_name: Option<String>,
    pub employee_department: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ScheduleStatus,
    pub progress: u8,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ScheduledTaskReq {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub employee_id: Option<i32>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ScheduleQuery {
    pub employee_id: Option<i32>,
}

// Dashboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatsDto {
    pub total_employees: i64,
    pub completed_tasks: i64,
    pub pending_tasks: i64,
    pub overdue_tasks: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResp {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}
