//! Status values derived from the wall clock.
//!
//! Nothing here is persisted. The server uses these functions when it lists
//! scheduled tasks or aggregates dashboard counts, and the client uses the very
//! same functions when it re-renders between polls, so both always agree.
//! All timestamps are naive UTC.

use std::fmt;

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// Status of a calendar-bound assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleStatus {
    Upcoming,
    Ongoing,
    Completed,
}

impl ScheduleStatus {
    /// Listing order: ongoing first, then upcoming, then completed.
    pub fn sort_rank(&self) -> u8 {
        match self {
            ScheduleStatus::Ongoing => 1,
            ScheduleStatus::Upcoming => 2,
            ScheduleStatus::Completed => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Upcoming => "upcoming",
            ScheduleStatus::Ongoing => "ongoing",
            ScheduleStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored status of a generic task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
        }
    }

    /// Parses the stored column. Unknown values are treated as pending.
    pub fn from_db(s: &str) -> Self {
        if s == "completed" {
            TaskStatus::Completed
        } else {
            TaskStatus::Pending
        }
    }
}

/// Display status of a generic task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskDisplayStatus {
    Upcoming,
    Ongoing,
    Overdue,
    Completed,
}

impl TaskDisplayStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskDisplayStatus::Upcoming => "upcoming",
            TaskDisplayStatus::Ongoing => "ongoing",
            TaskDisplayStatus::Overdue => "overdue",
            TaskDisplayStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskDisplayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Both boundaries count as ongoing.
pub fn schedule_status(
    now: NaiveDateTime,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> ScheduleStatus {
    if now > end {
        ScheduleStatus::Completed
    } else if now >= start {
        ScheduleStatus::Ongoing
    } else {
        ScheduleStatus::Upcoming
    }
}

/// A completed task stays completed whatever the clock says. A missing start
/// counts as already started and a missing due date never becomes overdue.
pub fn task_status(
    now: NaiveDateTime,
    start: Option<NaiveDateTime>,
    due: Option<NaiveDateTime>,
    stored: TaskStatus,
) -> TaskDisplayStatus {
    if stored == TaskStatus::Completed {
        return TaskDisplayStatus::Completed;
    }
    if let Some(start) = start
        && now < start
    {
        return TaskDisplayStatus::Upcoming;
    }
    if let Some(due) = due
        && now > due
    {
        return TaskDisplayStatus::Overdue;
    }
    TaskDisplayStatus::Ongoing
}

/// Elapsed share of `[start, end]` in whole percent, clamped to 0..=100.
pub fn progress_percent(now: NaiveDateTime, start: NaiveDateTime, end: NaiveDateTime) -> u8 {
    if now < start {
        return 0;
    }
    if now > end {
        return 100;
    }
    let total = (end - start).num_milliseconds();
    if total <= 0 {
        return 100;
    }
    let elapsed = (now - start).num_milliseconds();
    ((elapsed as f64 / total as f64) * 100.0).round().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    StartsIn(TimeDelta),
    EndsIn(TimeDelta),
    Ended,
}

pub fn countdown(now: NaiveDateTime, start: NaiveDateTime, end: NaiveDateTime) -> Countdown {
    if now < start {
        Countdown::StartsIn(start - now)
    } else if now > end {
        Countdown::Ended
    } else {
        Countdown::EndsIn(end - now)
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Countdown::StartsIn(d) => write!(f, "starts in {}", format_duration(*d)),
            Countdown::EndsIn(d) => write!(f, "ends in {}", format_duration(*d)),
            Countdown::Ended => f.write_str("ended"),
        }
    }
}

/// Two most significant units: `2d 3h`, `4h 5m`, `6m 7s`, `8s`.
pub fn format_duration(d: TimeDelta) -> String {
    let seconds = d.num_seconds().max(0);
    let minutes = seconds / 60;
    let hours = minutes / 60;
    let days = hours / 24;
    if days > 0 {
        format!("{}d {}h", days, hours % 24)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes % 60)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds % 60)
    } else {
        format!("{}s", seconds)
    }
}
