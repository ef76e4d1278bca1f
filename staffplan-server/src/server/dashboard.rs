use axum::{Json, extract::State};
use chrono::{NaiveDateTime, Utc};
use staffplan_shared::api::DashboardStatsDto;
use staffplan_shared::auth::Role;
use staffplan_shared::status::{TaskDisplayStatus, TaskStatus, task_status};

use super::{AppError, AppState};

fn aggregate(
    total_employees: i64,
    tasks: &[(String, Option<NaiveDateTime>)],
    now: NaiveDateTime,
) -> DashboardStatsDto {
    let mut stats = DashboardStatsDto {
        total_employees,
        completed_tasks: 0,
        pending_tasks: 0,
        overdue_tasks: 0,
    };
    for (stored, due) in tasks {
        let stored = TaskStatus::from_db(stored);
        match stored {
            TaskStatus::Completed => stats.completed_tasks += 1,
            TaskStatus::Pending => {
                stats.pending_tasks += 1;
                if task_status(now, None, *due, stored) == TaskDisplayStatus::Overdue {
                    stats.overdue_tasks += 1;
                }
            }
        }
    }
    stats
}

pub(super) async fn stats(State(state): State<AppState>) -> Result<Json<DashboardStatsDto>, AppError> {
    let employees = state.store.count_employees_with_role(Role::Employee).await?;
    let rows = state.store.task_status_rows().await?;
    Ok(Json(aggregate(employees, &rows, Utc::now().naive_utc())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn overdue_is_a_subset_of_pending() {
        let day = |d| {
            NaiveDate::from_ymd_opt(2030, 3, d)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap()
        };
        let now = day(10);
        let rows = vec![
            ("completed".to_string(), Some(day(1))),
            ("completed".to_string(), None),
            ("pending".to_string(), Some(day(9))),
            ("pending".to_string(), Some(day(11))),
            ("pending".to_string(), None),
        ];
        assert_eq!(
            aggregate(4, &rows, now),
            DashboardStatsDto {
                total_employees: 4,
                completed_tasks: 2,
                pending_tasks: 3,
                overdue_tasks: 1,
            }
        );
    }
}
