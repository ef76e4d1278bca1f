//! One-shot listings. Status, progress and countdown are recomputed from the
//! local clock so the output matches what `watch` would show at the same time.

use chrono::{NaiveDateTime, Utc};
use staffplan_shared::api::{self, ScheduledTaskDto, TaskDto};
use staffplan_shared::status::{
    ScheduleStatus, TaskDisplayStatus, countdown, progress_percent, schedule_status, task_status,
};

use crate::{AppError, ClientConfig, rest_error};

/// Live view of one scheduled task at `now`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgendaLine {
    pub id: i32,
    pub status: ScheduleStatus,
    pub text: String,
}

pub fn agenda_line(task: &ScheduledTaskDto, now: NaiveDateTime) -> AgendaLine {
    let start = task.start_time.naive_utc();
    let end = task.end_time.naive_utc();
    let status = schedule_status(now, start, end);
    let who = task.employee_name.as_deref().unwrap_or("unassigned");
    let text = format!(
        "[{:<9}] {:>3}%  {}  {} - {}  {} @ {} ({})",
        status,
        progress_percent(now, start, end),
        countdown(now, start, end),
        task.start_time.format("%Y-%m-%d %H:%M"),
        task.end_time.format("%H:%M"),
        task.title,
        task.location,
        who,
    );
    AgendaLine {
        id: task.id,
        status,
        text,
    }
}

/// Agenda order: ongoing, upcoming, completed; by start time within each.
pub fn sorted_lines(tasks: &[ScheduledTaskDto], now: NaiveDateTime) -> Vec<AgendaLine> {
    let mut ordered: Vec<&ScheduledTaskDto> = tasks.iter().collect();
    ordered.sort_by_key(|t| t.start_time);
    let mut lines: Vec<AgendaLine> = ordered.into_iter().map(|t| agenda_line(t, now)).collect();
    lines.sort_by_key(|l| l.status.sort_rank());
    lines
}

pub fn task_line(task: &TaskDto, now: NaiveDateTime) -> (TaskDisplayStatus, String) {
    let due = task.due_date.map(|d| d.naive_utc());
    let status = task_status(now, None, due, task.status);
    let due_text = task
        .due_date
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "no due date".into());
    (status, format!("[{:<9}] {}  (due {})", status, task.title, due_text))
}

pub async fn print_agenda(cfg: &ClientConfig, employee_id: Option<i32>) -> Result<(), AppError> {
    let tasks = api::rest::list_schedule(&cfg.base_url(), employee_id, cfg.token()?)
        .await
        .map_err(rest_error)?;
    if tasks.is_empty() {
        println!("No scheduled tasks.");
        return Ok(());
    }
    for line in sorted_lines(&tasks, Utc::now().naive_utc()) {
        println!("{}", line.text);
    }
    Ok(())
}

pub async fn print_tasks(cfg: &ClientConfig) -> Result<(), AppError> {
    let tasks = api::rest::list_my_tasks(&cfg.base_url(), cfg.token()?)
        .await
        .map_err(rest_error)?;
    if tasks.is_empty() {
        println!("No tasks assigned.");
        return Ok(());
    }
    let now = Utc::now().naive_utc();
    for task in &tasks {
        println!("{}", task_line(task, now).1);
    }
    Ok(())
}
