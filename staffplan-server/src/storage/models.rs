use crate::storage::schema::{employees, scheduled_tasks, schedules, tasks};
use chrono::NaiveDateTime;
use diesel::prelude::*;

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = employees)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Employee {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub role: String,
    pub department: Option<String>,
    pub gender: Option<String>,
    pub job_title: Option<String>,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = employees)]
pub struct NewEmployee<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub phone: Option<&'a str>,
    pub role: &'a str,
    pub department: Option<&'a str>,
    pub gender: Option<&'a str>,
    pub job_title: Option<&'a str>,
}

/// Field changes for an employee; `None` leaves the column untouched.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = employees)]
pub struct EmployeeChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub gender: Option<String>,
    pub job_title: Option<String>,
}

/// An employee joined with their work hours, if any.
#[derive(Debug, Clone)]
pub struct EmployeeRecord {
    pub employee: Employee,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl From<(Employee, Option<String>, Option<String>)> for EmployeeRecord {
    fn from((employee, start_time, end_time): (Employee, Option<String>, Option<String>)) -> Self {
        Self {
            employee,
            start_time,
            end_time,
        }
    }
}

#[derive(Insertable)]
#[diesel(table_name = schedules)]
pub struct NewWorkSchedule<'a> {
    pub employee_id: i32,
    pub start_time: &'a str,
    pub end_time: &'a str,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(belongs_to(Employee, foreign_key = employee_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Task {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub employee_id: Option<i32>,
    pub due_date: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTask<'a> {
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub status: &'a str,
    pub employee_id: Option<i32>,
    pub due_date: Option<NaiveDateTime>,
}

#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = tasks)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations, Selectable)]
#[diesel(table_name = scheduled_tasks)]
#[diesel(belongs_to(Employee, foreign_key = employee_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ScheduledTask {
    pub id: i32,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub employee_id: Option<i32>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub status: String,
    pub created_at: NaiveDateTime,
}

/// Insert and full-replace payload for a scheduled task.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = scheduled_tasks)]
#[diesel(treat_none_as_null = true)]
pub struct ScheduledTaskFields {
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub employee_id: Option<i32>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct ScheduledTaskRecord {
    pub task: ScheduledTask,
    pub employee_name: Option<String>,
    pub employee_department: Option<String>,
}

#[cfg(test)]
#[derive(Insertable)]
#[diesel(table_name = crate::storage::schema::time_logs)]
pub struct NewTimeLog {
    pub employee_id: i32,
    pub clock_in: Option<NaiveDateTime>,
    pub clock_out: Option<NaiveDateTime>,
    pub total_hours: Option<f64>,
}
