//! Demo data for a fresh database.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use staffplan_shared::auth::Role;
use tracing::info;

use super::StorageError;
use super::models::{NewEmployee, NewWorkSchedule, ScheduledTaskFields};
use super::schema;

struct DemoEmployee {
    name: &'static str,
    email: &'static str,
    department: &'static str,
    gender: &'static str,
    job_title: &'static str,
}

const ADMIN: DemoEmployee = DemoEmployee {
    name: "Admin User",
    email: "admin@example.com",
    department: "Management",
    gender: "Male",
    job_title: "Administrator",
};

const EMPLOYEES: [DemoEmployee; 4] = [
    DemoEmployee {
        name: "John Doe",
        email: "john@example.com",
        department: "IT",
        gender: "Male",
        job_title: "Software Engineer",
    },
    DemoEmployee {
        name: "Jane Smith",
        email: "jane@example.com",
        department: "HR",
        gender: "Female",
        job_title: "HR Specialist",
    },
    DemoEmployee {
        name: "Mike Johnson",
        email: "mike@example.com",
        department: "Sales",
        gender: "Male",
        job_title: "Account Manager",
    },
    DemoEmployee {
        name: "Sarah Wilson",
        email: "sarah@example.com",
        department: "Marketing",
        gender: "Female",
        job_title: "Marketing Lead",
    },
];

/// (title, description, location, day offset, start h:m, end h:m)
type DemoSlot = (&'static str, &'static str, &'static str, u64, (u32, u32), (u32, u32));

const SLOTS: [DemoSlot; 4] = [
    (
        "Weekly Meeting",
        "Team sync on weekly progress",
        "Conference Room A",
        0,
        (10, 0),
        (11, 0),
    ),
    (
        "Project Review",
        "Quarterly project review",
        "Meeting Room B",
        1,
        (14, 0),
        (15, 30),
    ),
    (
        "Training Session",
        "Onboarding for new tools",
        "Training Room",
        2,
        (9, 0),
        (12, 0),
    ),
    (
        "Client Meeting",
        "Contract discussion",
        "Board Room",
        3,
        (11, 0),
        (12, 0),
    ),
];

fn insert_one(
    conn: &mut SqliteConnection,
    who: &DemoEmployee,
    hash: &str,
    role: Role,
) -> Result<i32, StorageError> {
    use schema::employees::dsl as e;
    let id = diesel::insert_into(e::employees)
        .values(&NewEmployee {
            name: who.name,
            email: who.email,
            password_hash: hash,
            phone: None,
            role: role.as_str(),
            department: Some(who.department),
            gender: Some(who.gender),
            job_title: Some(who.job_title),
        })
        .returning(e::id)
        .get_result::<i32>(conn)?;
    diesel::insert_into(schema::schedules::table)
        .values(&NewWorkSchedule {
            employee_id: id,
            start_time: "09:00",
            end_time: "17:00",
        })
        .execute(conn)?;
    Ok(id)
}

fn at(day: NaiveDate, (h, m): (u32, u32)) -> Result<NaiveDateTime, StorageError> {
    day.and_hms_opt(h, m, 0)
        .ok_or_else(|| StorageError::InvalidInput(format!("bad demo time {h}:{m}")))
}

/// One admin, four employees with 09:00-17:00 hours, and one scheduled task
/// per employee over the days starting at `first_day`.
pub(super) fn insert_demo_data(
    conn: &mut SqliteConnection,
    admin_hash: &str,
    employee_hash: &str,
    first_day: NaiveDate,
) -> Result<(), StorageError> {
    insert_one(conn, &ADMIN, admin_hash, Role::Admin)?;
    let mut ids = Vec::with_capacity(EMPLOYEES.len());
    for who in &EMPLOYEES {
        ids.push(insert_one(conn, who, employee_hash, Role::Employee)?);
    }

    for (employee, (title, description, location, offset, start, end)) in
        ids.iter().zip(SLOTS.iter())
    {
        let day = first_day + chrono::Days::new(*offset);
        diesel::insert_into(schema::scheduled_tasks::table)
            .values(&ScheduledTaskFields {
                title: (*title).to_string(),
                description: Some((*description).to_string()),
                location: (*location).to_string(),
                employee_id: Some(*employee),
                start_time: at(day, *start)?,
                end_time: at(day, *end)?,
            })
            .execute(conn)?;
    }
    info!(
        employees = ids.len(),
        scheduled = SLOTS.len(),
        "seeded demo data"
    );
    Ok(())
}
