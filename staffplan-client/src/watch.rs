//! Polls the schedule and re-derives status locally every second, logging each
//! transition as the clock crosses a start or end time.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{NaiveDateTime, Utc};
use staffplan_shared::api::rest::RestError;
use staffplan_shared::api::{self, ScheduledTaskDto};
use staffplan_shared::status::{ScheduleStatus, schedule_status};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::agenda::sorted_lines;
use crate::{AppError, ClientConfig, rest_error};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub id: i32,
    pub title: String,
    pub from: ScheduleStatus,
    pub to: ScheduleStatus,
}

#[derive(Debug, Default)]
pub struct Watcher {
    tasks: Vec<ScheduledTaskDto>,
    last: HashMap<i32, ScheduleStatus>,
}

impl Watcher {
    /// Swaps in a fresh listing. Known tasks keep their last seen status so a
    /// change that happened between polls is still reported on the next tick.
    pub fn replace(&mut self, tasks: Vec<ScheduledTaskDto>, now: NaiveDateTime) {
        let mut last = HashMap::with_capacity(tasks.len());
        for t in &tasks {
            let status = self
                .last
                .get(&t.id)
                .copied()
                .unwrap_or_else(|| schedule_status(now, t.start_time.naive_utc(), t.end_time.naive_utc()));
            last.insert(t.id, status);
        }
        self.tasks = tasks;
        self.last = last;
    }

    pub fn tick(&mut self, now: NaiveDateTime) -> Vec<Transition> {
        let mut out = Vec::new();
        for t in &self.tasks {
            let current = schedule_status(now, t.start_time.naive_utc(), t.end_time.naive_utc());
            let previous = self.last.insert(t.id, current);
            if let Some(from) = previous
                && from != current
            {
                out.push(Transition {
                    id: t.id,
                    title: t.title.clone(),
                    from,
                    to: current,
                });
            }
        }
        out
    }

    pub fn tasks(&self) -> &[ScheduledTaskDto] {
        &self.tasks
    }
}

pub async fn watch_loop(
    cancel: CancellationToken,
    cfg: ClientConfig,
    employee_id: Option<i32>,
) -> Result<(), AppError> {
    let base = cfg.base_url();
    let token = cfg.token()?.to_string();
    let mut poll = tokio::time::interval(Duration::from_secs(cfg.poll_interval_secs.max(1)));
    let mut tick = tokio::time::interval(Duration::from_secs(1));
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut watcher = Watcher::default();
    let mut failures: u32 = 0;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = poll.tick() => {
                match api::rest::list_schedule(&base, employee_id, &token).await {
                    Ok(tasks) => {
                        failures = 0;
                        let now = Utc::now().naive_utc();
                        let fresh = watcher.tasks().is_empty();
                        watcher.replace(tasks, now);
                        info!(count = watcher.tasks().len(), "schedule refreshed");
                        if fresh {
                            for line in sorted_lines(watcher.tasks(), now) {
                                info!("{}", line.text);
                            }
                        }
                    }
                    Err(e @ RestError::Status { status: 401, .. }) => return Err(rest_error(e)),
                    Err(e) => {
                        failures = failures.saturating_add(1);
                        error!(error=%e, failures, "schedule refresh failed");
                    }
                }
            }
            _ = tick.tick() => {
                let now = Utc::now().naive_utc();
                for t in watcher.tick(now) {
                    info!(id = t.id, from = %t.from, to = %t.to, "{}", t.title);
                }
                debug!("tick");
            }
        }
    }
    Ok(())
}
