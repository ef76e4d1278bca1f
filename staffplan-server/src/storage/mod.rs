pub mod models;
pub mod schema;
mod seed;

use std::collections::HashMap;

use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::DatabaseErrorKind;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use models::{
    Employee, EmployeeChanges, EmployeeRecord, NewEmployee, NewTask, NewWorkSchedule,
    ScheduledTask, ScheduledTaskFields, ScheduledTaskRecord, Task, TaskChanges,
};
use staffplan_shared::api::{EmployeeQuery, EmployeeSort, SortOrder};
use staffplan_shared::auth::Role;
use staffplan_shared::domain::WorkHours;
use tracing::{debug, info, trace};

/// Storage location that keeps the whole database in memory.
pub const MEMORY_LOCATION: &str = ":memory:";

pub const OVERLAP_MESSAGE: &str = "Employee already has a task scheduled during this time period";
pub const EMAIL_TAKEN_MESSAGE: &str = "Email already exists";

/// Structured error type for all storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// A Diesel ORM error (query failure, constraint violation, etc.)
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    /// Failed to acquire or build a connection from the pool.
    #[error("pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),

    /// A `spawn_blocking` task panicked or was cancelled.
    #[error("task error: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// A database migration failed to apply.
    #[error("migration error: {0}")]
    Migration(String),

    /// The caller supplied invalid input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The write would break a uniqueness or scheduling invariant.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A referenced row does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Everything needed to create an employee row plus optional work hours.
#[derive(Debug, Clone)]
pub struct EmployeeDraft {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub gender: Option<String>,
    pub job_title: Option<String>,
    pub hours: Option<WorkHours>,
}

#[derive(Clone)]
pub struct Store {
    pool: Pool<ConnectionManager<SqliteConnection>>,
}

impl Store {
    /// Opens (and migrates) the database at `path`. [`MEMORY_LOCATION`] keeps a
    /// single connection alive for the lifetime of the store, since every
    /// in-memory connection is its own database.
    pub async fn connect_sqlite(path: &str) -> Result<Self, StorageError> {
        let url = path.to_string();
        let manager = ConnectionManager::<SqliteConnection>::new(url);
        let pool = if path == MEMORY_LOCATION {
            Pool::builder()
                .max_size(1)
                .min_idle(Some(1))
                .max_lifetime(None)
                .idle_timeout(None)
                .build(manager)?
        } else {
            Pool::builder().max_size(8).build(manager)?
        };

        // Run pending Diesel migrations on startup (auto-init empty DBs)
        {
            let pool_clone = pool.clone();
            tokio::task::spawn_blocking(move || -> Result<(), StorageError> {
                const MIGRATIONS: EmbeddedMigrations = embed_migrations!();
                let mut conn = pool_clone.get()?;
                configure_sqlite_conn(&mut conn)?;
                conn.run_pending_migrations(MIGRATIONS)
                    .map_err(|e| StorageError::Migration(e.to_string()))?;
                Ok(())
            })
            .await??;
        }

        info!(path, "storage ready");
        Ok(Store { pool })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StorageError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T, StorageError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> Result<T, StorageError> {
            let mut conn = pool.get()?;
            configure_sqlite_conn(&mut conn)?;
            f(&mut conn)
        })
        .await?
    }

    // Employees

    pub async fn get_employee(&self, employee: i32) -> Result<Option<Employee>, StorageError> {
        use schema::employees::dsl::*;
        self.with_conn(move |conn| {
            Ok(employees
                .filter(id.eq(employee))
                .select(Employee::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    pub async fn find_employee_by_email(
        &self,
        address: &str,
    ) -> Result<Option<Employee>, StorageError> {
        use schema::employees::dsl::*;
        let address = address.to_string();
        self.with_conn(move |conn| {
            Ok(employees
                .filter(email.eq(&address))
                .select(Employee::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    pub async fn get_employee_record(
        &self,
        employee: i32,
    ) -> Result<Option<EmployeeRecord>, StorageError> {
        self.with_conn(move |conn| employee_record(conn, employee))
            .await
    }

    /// Filtered employee listing. Each record carries its scheduled-task count;
    /// employees without scheduled tasks report 0.
    pub async fn list_employees(
        &self,
        query: EmployeeQuery,
    ) -> Result<Vec<(EmployeeRecord, i64)>, StorageError> {
        self.with_conn(move |conn| {
            use diesel::dsl::count_star;
            use schema::{employees as e, scheduled_tasks as st, schedules as s};

            let sort = query.sort_by.unwrap_or(EmployeeSort::CreatedDate);
            let order = match (query.sort_by, query.sort_order) {
                (Some(_), Some(o)) => o,
                _ => SortOrder::Desc,
            };

            let mut q = e::table
                .left_join(s::table)
                .select((
                    Employee::as_select(),
                    s::start_time.nullable(),
                    s::end_time.nullable(),
                ))
                .into_boxed();

            if let Some(term) = non_empty(query.search) {
                let pattern = like_pattern(&term);
                q = q.filter(
                    e::name
                        .like(pattern.clone())
                        .escape('\\')
                        .or(e::email.like(pattern.clone()).escape('\\'))
                        .or(e::phone.like(pattern.clone()).escape('\\'))
                        .or(e::department.like(pattern).escape('\\')),
                );
            }
            if let Some(dept) = non_empty(query.department) {
                q = q.filter(e::department.eq(dept));
            }
            if let Some(g) = non_empty(query.gender) {
                q = q.filter(e::gender.eq(g));
            }
            q = match (sort, order) {
                (EmployeeSort::CreatedDate, SortOrder::Asc) => {
                    q.order((e::created_at.asc(), e::id.asc()))
                }
                _ => q.order((e::created_at.desc(), e::id.desc())),
            };

            let rows = q.load::<(Employee, Option<String>, Option<String>)>(conn)?;

            let counts: HashMap<i32, i64> = st::table
                .filter(st::employee_id.is_not_null())
                .group_by(st::employee_id)
                .select((st::employee_id, count_star()))
                .load::<(Option<i32>, i64)>(conn)?
                .into_iter()
                .filter_map(|(emp, n)| emp.map(|emp| (emp, n)))
                .collect();

            let mut out: Vec<(EmployeeRecord, i64)> = rows
                .into_iter()
                .map(|row| {
                    let n = counts.get(&row.0.id).copied().unwrap_or(0);
                    (EmployeeRecord::from(row), n)
                })
                .collect();

            if sort == EmployeeSort::TaskCount {
                // Rows arrive newest first, so a stable sort keeps the
                // created_at DESC tie-break.
                out.sort_by(|(_, a), (_, b)| match order {
                    SortOrder::Asc => a.cmp(b),
                    SortOrder::Desc => b.cmp(a),
                });
            }
            trace!(rows = out.len(), "list_employees");
            Ok(out)
        })
        .await
    }

    /// Inserts an employee and their work hours in one transaction. A taken
    /// email yields [`StorageError::Conflict`].
    pub async fn create_employee(
        &self,
        draft: EmployeeDraft,
    ) -> Result<EmployeeRecord, StorageError> {
        self.with_conn(move |conn| {
            conn.immediate_transaction(|conn| -> Result<EmployeeRecord, StorageError> {
                use schema::employees::dsl as e;
                let taken: i64 = e::employees
                    .filter(e::email.eq(&draft.email))
                    .count()
                    .get_result(conn)?;
                if taken > 0 {
                    return Err(StorageError::Conflict(EMAIL_TAKEN_MESSAGE.into()));
                }
                let new = NewEmployee {
                    name: &draft.name,
                    email: &draft.email,
                    password_hash: &draft.password_hash,
                    phone: draft.phone.as_deref(),
                    role: draft.role.as_str(),
                    department: draft.department.as_deref(),
                    gender: draft.gender.as_deref(),
                    job_title: draft.job_title.as_deref(),
                };
                let created = diesel::insert_into(e::employees)
                    .values(&new)
                    .returning(Employee::as_returning())
                    .get_result(conn)
                    .map_err(|err| unique_to_conflict(err, EMAIL_TAKEN_MESSAGE))?;
                if let Some(hours) = draft.hours {
                    upsert_work_hours(conn, created.id, &hours)?;
                }
                debug!(employee_id = created.id, role = %draft.role, "employee created");
                employee_record(conn, created.id)?.ok_or_else(|| {
                    StorageError::NotFound(format!("employee {} vanished", created.id))
                })
            })
        })
        .await
    }

    /// Applies `changes` and upserts work hours. Returns `None` for an unknown id.
    pub async fn update_employee(
        &self,
        employee: i32,
        changes: EmployeeChanges,
        hours: Option<WorkHours>,
    ) -> Result<Option<EmployeeRecord>, StorageError> {
        self.with_conn(move |conn| {
            conn.immediate_transaction(|conn| -> Result<Option<EmployeeRecord>, StorageError> {
                use schema::employees::dsl as e;
                let exists: i64 = e::employees
                    .filter(e::id.eq(employee))
                    .count()
                    .get_result(conn)?;
                if exists == 0 {
                    return Ok(None);
                }
                if let Some(address) = &changes.email {
                    let taken: i64 = e::employees
                        .filter(e::email.eq(address))
                        .filter(e::id.ne(employee))
                        .count()
                        .get_result(conn)?;
                    if taken > 0 {
                        return Err(StorageError::Conflict(EMAIL_TAKEN_MESSAGE.into()));
                    }
                }
                if !changes.is_empty() {
                    diesel::update(e::employees.filter(e::id.eq(employee)))
                        .set(&changes)
                        .execute(conn)
                        .map_err(|err| unique_to_conflict(err, EMAIL_TAKEN_MESSAGE))?;
                }
                if let Some(hours) = hours {
                    upsert_work_hours(conn, employee, &hours)?;
                }
                employee_record(conn, employee)
            })
        })
        .await
    }

    /// Removes the employee with their tasks, work hours and time logs.
    /// Scheduled tasks are kept as history with the employee reference cleared.
    /// All or nothing; returns `false` for an unknown id.
    pub async fn delete_employee(&self, employee: i32) -> Result<bool, StorageError> {
        self.with_conn(move |conn| {
            conn.immediate_transaction(|conn| -> Result<bool, StorageError> {
                use schema::{
                    employees as e, scheduled_tasks as st, schedules as s, tasks as t,
                    time_logs as tl,
                };
                let exists: i64 = e::table
                    .filter(e::id.eq(employee))
                    .count()
                    .get_result(conn)?;
                if exists == 0 {
                    return Ok(false);
                }
                let tasks = diesel::delete(t::table.filter(t::employee_id.eq(employee)))
                    .execute(conn)?;
                diesel::delete(s::table.filter(s::employee_id.eq(employee))).execute(conn)?;
                let logs = diesel::delete(tl::table.filter(tl::employee_id.eq(employee)))
                    .execute(conn)?;
                let detached = diesel::update(st::table.filter(st::employee_id.eq(employee)))
                    .set(st::employee_id.eq(None::<i32>))
                    .execute(conn)?;
                diesel::delete(e::table.filter(e::id.eq(employee))).execute(conn)?;
                debug!(
                    employee_id = employee,
                    tasks, logs, detached, "employee deleted"
                );
                Ok(true)
            })
        })
        .await
    }

    pub async fn count_employees_with_role(&self, role: Role) -> Result<i64, StorageError> {
        use schema::employees::dsl as e;
        self.with_conn(move |conn| {
            Ok(e::employees
                .filter(e::role.eq(role.as_str()))
                .count()
                .get_result(conn)?)
        })
        .await
    }

    /// Inserts an admin unless the email is already registered. Returns whether
    /// a row was created.
    pub async fn ensure_admin(
        &self,
        name: &str,
        address: &str,
        hash: &str,
    ) -> Result<bool, StorageError> {
        let draft = EmployeeDraft {
            name: name.to_string(),
            email: address.to_string(),
            password_hash: hash.to_string(),
            role: Role::Admin,
            phone: None,
            department: None,
            gender: None,
            job_title: None,
            hours: None,
        };
        match self.create_employee(draft).await {
            Ok(_) => Ok(true),
            Err(StorageError::Conflict(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    // Generic tasks

    /// Tasks with the assignee's name, earliest due date first, undated last.
    pub async fn list_tasks(
        &self,
        employee: Option<i32>,
    ) -> Result<Vec<(Task, Option<String>)>, StorageError> {
        self.with_conn(move |conn| {
            use schema::{employees as e, tasks as t};
            let mut q = t::table
                .left_join(e::table)
                .select((Task::as_select(), e::name.nullable()))
                .into_boxed();
            if let Some(emp) = employee {
                q = q.filter(t::employee_id.eq(emp));
            }
            Ok(q
                .order((t::due_date.is_null().asc(), t::due_date.asc(), t::id.asc()))
                .load::<(Task, Option<String>)>(conn)?)
        })
        .await
    }

    pub async fn get_task(&self, task: i32) -> Result<Option<Task>, StorageError> {
        use schema::tasks::dsl::*;
        self.with_conn(move |conn| {
            Ok(tasks
                .filter(id.eq(task))
                .select(Task::as_select())
                .first(conn)
                .optional()?)
        })
        .await
    }

    pub async fn create_task(
        &self,
        title: &str,
        description: Option<&str>,
        employee: Option<i32>,
        due: Option<NaiveDateTime>,
    ) -> Result<(Task, Option<String>), StorageError> {
        let title = title.to_string();
        let description = description.map(|s| s.to_string());
        self.with_conn(move |conn| {
            conn.immediate_transaction(|conn| -> Result<(Task, Option<String>), StorageError> {
                if let Some(emp) = employee {
                    ensure_employee_exists(conn, emp)?;
                }
                let new = NewTask {
                    title: &title,
                    description: description.as_deref(),
                    status: "pending",
                    employee_id: employee,
                    due_date: due,
                };
                let created = diesel::insert_into(schema::tasks::table)
                    .values(&new)
                    .returning(Task::as_returning())
                    .get_result(conn)?;
                task_with_name(conn, created.id)?
                    .ok_or_else(|| StorageError::NotFound(format!("task {} vanished", created.id)))
            })
        })
        .await
    }

    /// Returns `None` for an unknown id.
    pub async fn update_task(
        &self,
        task: i32,
        changes: TaskChanges,
    ) -> Result<Option<(Task, Option<String>)>, StorageError> {
        self.with_conn(move |conn| {
            use schema::tasks::dsl as t;
            let now = Utc::now().naive_utc();
            let updated = diesel::update(t::tasks.filter(t::id.eq(task)))
                .set((&changes, t::updated_at.eq(now)))
                .execute(conn)?;
            if updated == 0 {
                return Ok(None);
            }
            task_with_name(conn, task)
        })
        .await
    }

    pub async fn delete_task(&self, task: i32) -> Result<bool, StorageError> {
        use schema::tasks::dsl::*;
        self.with_conn(move |conn| {
            let deleted = diesel::delete(tasks.filter(id.eq(task))).execute(conn)?;
            Ok(deleted > 0)
        })
        .await
    }

    /// `(stored status, due date)` of every task, for dashboard aggregation.
    pub async fn task_status_rows(
        &self,
    ) -> Result<Vec<(String, Option<NaiveDateTime>)>, StorageError> {
        use schema::tasks::dsl::*;
        self.with_conn(move |conn| {
            Ok(tasks
                .select((status, due_date))
                .load::<(String, Option<NaiveDateTime>)>(conn)?)
        })
        .await
    }

    // Scheduled tasks

    /// Scheduled tasks joined with the assignee, ordered by start time.
    pub async fn list_scheduled_tasks(
        &self,
        employee: Option<i32>,
    ) -> Result<Vec<ScheduledTaskRecord>, StorageError> {
        self.with_conn(move |conn| {
            use schema::{employees as e, scheduled_tasks as st};
            let mut q = st::table
                .left_join(e::table)
                .select((
                    ScheduledTask::as_select(),
                    e::name.nullable(),
                    e::department.nullable(),
                ))
                .into_boxed();
            if let Some(emp) = employee {
                q = q.filter(st::employee_id.eq(emp));
            }
            let rows = q
                .order((st::start_time.asc(), st::id.asc()))
                .load::<(ScheduledTask, Option<String>, Option<String>)>(conn)?;
            Ok(rows.into_iter().map(scheduled_record).collect())
        })
        .await
    }

    /// Validates the assignee and the no-overlap invariant, then inserts, all
    /// inside one immediate transaction so concurrent creates cannot both pass
    /// the check.
    pub async fn create_scheduled_task(
        &self,
        fields: ScheduledTaskFields,
    ) -> Result<ScheduledTaskRecord, StorageError> {
        self.with_conn(move |conn| {
            conn.immediate_transaction(|conn| -> Result<ScheduledTaskRecord, StorageError> {
                check_assignment(conn, &fields, None)?;
                let created = diesel::insert_into(schema::scheduled_tasks::table)
                    .values(&fields)
                    .returning(ScheduledTask::as_returning())
                    .get_result(conn)?;
                scheduled_task_record(conn, created.id)?.ok_or_else(|| {
                    StorageError::NotFound(format!("scheduled task {} vanished", created.id))
                })
            })
        })
        .await
    }

    /// Like [`Store::create_scheduled_task`], but the row being replaced is not
    /// compared against itself. Returns `None` for an unknown id.
    pub async fn update_scheduled_task(
        &self,
        task: i32,
        fields: ScheduledTaskFields,
    ) -> Result<Option<ScheduledTaskRecord>, StorageError> {
        self.with_conn(move |conn| {
            conn.immediate_transaction(
                |conn| -> Result<Option<ScheduledTaskRecord>, StorageError> {
                    use schema::scheduled_tasks::dsl as st;
                    let exists: i64 = st::scheduled_tasks
                        .filter(st::id.eq(task))
                        .count()
                        .get_result(conn)?;
                    if exists == 0 {
                        return Ok(None);
                    }
                    check_assignment(conn, &fields, Some(task))?;
                    diesel::update(st::scheduled_tasks.filter(st::id.eq(task)))
                        .set(&fields)
                        .execute(conn)?;
                    scheduled_task_record(conn, task)
                },
            )
        })
        .await
    }

    pub async fn delete_scheduled_task(&self, task: i32) -> Result<bool, StorageError> {
        use schema::scheduled_tasks::dsl::*;
        self.with_conn(move |conn| {
            let deleted = diesel::delete(scheduled_tasks.filter(id.eq(task))).execute(conn)?;
            Ok(deleted > 0)
        })
        .await
    }

    // Seeding

    /// Inserts the demo data set when there are no employees yet. Returns
    /// whether anything was written.
    pub async fn seed_if_empty(
        &self,
        admin_hash: String,
        employee_hash: String,
    ) -> Result<bool, StorageError> {
        self.with_conn(move |conn| {
            conn.immediate_transaction(|conn| -> Result<bool, StorageError> {
                let existing: i64 = schema::employees::table.count().get_result(conn)?;
                if existing > 0 {
                    debug!(existing, "seed skipped: employees present");
                    return Ok(false);
                }
                let today = Utc::now().date_naive();
                seed::insert_demo_data(conn, &admin_hash, &employee_hash, today)?;
                Ok(true)
            })
        })
        .await
    }
}

impl EmployeeChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.department.is_none()
            && self.gender.is_none()
            && self.job_title.is_none()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn unique_to_conflict(err: diesel::result::Error, message: &str) -> StorageError {
    match err {
        diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            StorageError::Conflict(message.to_string())
        }
        other => StorageError::Database(other),
    }
}

fn ensure_employee_exists(conn: &mut SqliteConnection, employee: i32) -> Result<(), StorageError> {
    use schema::employees::dsl::*;
    let found: i64 = employees
        .filter(id.eq(employee))
        .count()
        .get_result(conn)?;
    if found == 0 {
        return Err(StorageError::InvalidInput("Employee not found".into()));
    }
    Ok(())
}

/// `%term%` where `%`, `_` and `\` inside `term` match literally under
/// `ESCAPE '\'`.
fn like_pattern(term: &str) -> String {
    let mut out = String::with_capacity(term.len() + 2);
    out.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('%');
    out
}

/// Assignee must exist and the new interval must not intersect, as half-open
/// intervals, any other interval already assigned to that employee. This is
/// `Interval::overlaps` expressed as a query.
fn check_assignment(
    conn: &mut SqliteConnection,
    fields: &ScheduledTaskFields,
    exclude: Option<i32>,
) -> Result<(), StorageError> {
    use schema::scheduled_tasks::dsl as st;
    if fields.start_time >= fields.end_time {
        return Err(StorageError::InvalidInput(
            "Start time must be before end time".into(),
        ));
    }
    let Some(employee) = fields.employee_id else {
        return Ok(());
    };
    ensure_employee_exists(conn, employee)?;

    let mut q = st::scheduled_tasks
        .filter(st::employee_id.eq(employee))
        .filter(st::start_time.lt(fields.end_time))
        .filter(st::end_time.gt(fields.start_time))
        .select(st::id)
        .into_boxed();
    if let Some(own) = exclude {
        q = q.filter(st::id.ne(own));
    }
    if let Some(clash) = q.first::<i32>(conn).optional()? {
        debug!(
            employee_id = employee,
            conflicting_task = clash,
            "scheduled task overlaps existing assignment"
        );
        return Err(StorageError::Conflict(OVERLAP_MESSAGE.into()));
    }
    Ok(())
}

fn upsert_work_hours(
    conn: &mut SqliteConnection,
    employee: i32,
    hours: &WorkHours,
) -> Result<(), StorageError> {
    use schema::schedules::dsl as s;
    let start = hours.start_text();
    let end = hours.end_text();
    let row = NewWorkSchedule {
        employee_id: employee,
        start_time: &start,
        end_time: &end,
    };
    diesel::insert_into(s::schedules)
        .values(&row)
        .on_conflict(s::employee_id)
        .do_update()
        .set((s::start_time.eq(&start), s::end_time.eq(&end)))
        .execute(conn)?;
    Ok(())
}

fn employee_record(
    conn: &mut SqliteConnection,
    employee: i32,
) -> Result<Option<EmployeeRecord>, StorageError> {
    use schema::{employees as e, schedules as s};
    Ok(e::table
        .left_join(s::table)
        .filter(e::id.eq(employee))
        .select((
            Employee::as_select(),
            s::start_time.nullable(),
            s::end_time.nullable(),
        ))
        .first::<(Employee, Option<String>, Option<String>)>(conn)
        .optional()?
        .map(EmployeeRecord::from))
}

fn task_with_name(
    conn: &mut SqliteConnection,
    task: i32,
) -> Result<Option<(Task, Option<String>)>, StorageError> {
    use schema::{employees as e, tasks as t};
    Ok(t::table
        .left_join(e::table)
        .filter(t::id.eq(task))
        .select((Task::as_select(), e::name.nullable()))
        .first::<(Task, Option<String>)>(conn)
        .optional()?)
}

fn scheduled_task_record(
    conn: &mut SqliteConnection,
    task: i32,
) -> Result<Option<ScheduledTaskRecord>, StorageError> {
    use schema::{employees as e, scheduled_tasks as st};
    Ok(st::table
        .left_join(e::table)
        .filter(st::id.eq(task))
        .select((
            ScheduledTask::as_select(),
            e::name.nullable(),
            e::department.nullable(),
        ))
        .first::<(ScheduledTask, Option<String>, Option<String>)>(conn)
        .optional()?
        .map(scheduled_record))
}

fn scheduled_record(
    (task, employee_name, employee_department): (ScheduledTask, Option<String>, Option<String>),
) -> ScheduledTaskRecord {
    ScheduledTaskRecord {
        task,
        employee_name,
        employee_department,
    }
}

fn configure_sqlite_conn(conn: &mut SqliteConnection) -> Result<(), diesel::result::Error> {
    // Enable WAL for better read/write concurrency and set a busy timeout
    // Ignore the result rows; Diesel's execute is fine for PRAGMAs
    diesel::sql_query("PRAGMA journal_mode=WAL;").execute(conn)?;
    diesel::sql_query("PRAGMA synchronous=NORMAL;").execute(conn)?;
    diesel::sql_query("PRAGMA busy_timeout=5000;").execute(conn)?;
    diesel::sql_query("PRAGMA foreign_keys=ON;").execute(conn)?;
    Ok(())
}
