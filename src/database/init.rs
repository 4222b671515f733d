//! Schema creation and first-run seeding.

use anyhow::Context;
use diesel::{connection::SimpleConnection, prelude::*, SqliteConnection};

use crate::{
    models::{
        days::{DayData, DEFAULT_DAYS},
        machines::{MachineData, DEFAULT_MACHINE_COUNT, MACHINE_STATUS_ACTIVE},
    },
    time_slot::DEFAULT_TIME_SLOTS,
    DbPool,
};

const CREATE_USERS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        surname TEXT NOT NULL,
        room TEXT NOT NULL,
        UNIQUE (surname, room)
    )";

const CREATE_DAYS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS days (
        name TEXT PRIMARY KEY NOT NULL,
        order_num INTEGER NOT NULL UNIQUE
    )";

const CREATE_MACHINES_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS machines (
        number INTEGER PRIMARY KEY NOT NULL,
        status TEXT NOT NULL DEFAULT 'active'
    )";

const CREATE_SLOTS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS slots (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        day_name TEXT NOT NULL REFERENCES days (name) ON UPDATE CASCADE,
        time_slot TEXT NOT NULL,
        machine_number INTEGER NOT NULL REFERENCES machines (number),
        user_id INTEGER REFERENCES users (id),
        UNIQUE (day_name, time_slot, machine_number)
    )";

const CREATE_SLOTS_USER_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_slots_user_id ON slots (user_id)";

const CREATE_USER_LOGINS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS user_logins (
        token TEXT PRIMARY KEY NOT NULL,
        user_id INTEGER NOT NULL REFERENCES users (id),
        login_time TIMESTAMP NOT NULL
    )";

const CREATE_ADMIN_LOGINS_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS admin_logins (
        token TEXT PRIMARY KEY NOT NULL,
        username TEXT NOT NULL,
        login_time TIMESTAMP NOT NULL
    )";

const CREATE_STATEMENTS: [&str; 7] = [
    CREATE_USERS_TABLE,
    CREATE_DAYS_TABLE,
    CREATE_MACHINES_TABLE,
    CREATE_SLOTS_TABLE,
    CREATE_SLOTS_USER_INDEX,
    CREATE_USER_LOGINS_TABLE,
    CREATE_ADMIN_LOGINS_TABLE,
];

/// Creates the schema if missing and seeds empty tables.
pub fn init_database(pool: &DbPool) -> anyhow::Result<()> {
    let mut conn = pool.get().context("DB connection")?;

    conn.batch_execute("PRAGMA journal_mode = WAL;")
        .context("Failed to enable WAL journaling")?;
    for statement in CREATE_STATEMENTS.iter() {
        conn.batch_execute(statement)
            .context("Failed to create schema")?;
    }

    seed(&mut conn)
}

/// Fills days, machines and slots with defaults, each only when empty.
pub fn seed(conn: &mut SqliteConnection) -> anyhow::Result<()> {
    use crate::schema::{days, machines, slots};

    conn.transaction::<_, anyhow::Error, _>(|conn| {
        let day_count = days::table.count().get_result::<i64>(conn)?;
        if day_count == 0 {
            let data = DEFAULT_DAYS
                .iter()
                .zip(1..)
                .map(|(name, order_num)| DayData {
                    name: name.to_string(),
                    order_num,
                })
                .collect::<Vec<_>>();
            diesel::insert_into(days::table).values(&data).execute(conn)?;
            tracing::info!(count = data.len(), "seeded default days");
        }

        let machine_count = machines::table.count().get_result::<i64>(conn)?;
        if machine_count == 0 {
            let data = (1..=DEFAULT_MACHINE_COUNT)
                .map(|number| MachineData {
                    number,
                    status: MACHINE_STATUS_ACTIVE.to_string(),
                })
                .collect::<Vec<_>>();
            diesel::insert_into(machines::table)
                .values(&data)
                .execute(conn)?;
            tracing::info!(count = data.len(), "seeded default machines");
        }

        let slot_count = slots::table.count().get_result::<i64>(conn)?;
        if slot_count == 0 {
            let day_names = days::table
                .select(days::name)
                .order(days::order_num.asc())
                .load::<String>(conn)?;
            let numbers = machines::table
                .select(machines::number)
                .order(machines::number.asc())
                .load::<i32>(conn)?;
            let inserted =
                super::insert_slot_grid(conn, &day_names[..], &DEFAULT_TIME_SLOTS[..], &numbers)?;
            tracing::info!(count = inserted, "seeded default slots");
        }

        Ok(())
    })
}
