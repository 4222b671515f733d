pub mod assert;
pub mod init;
pub mod users;

#[cfg(test)]
pub mod test_util;

use crate::{models::slots::NewSlot, DbPool};
use actix_web::web;
use anyhow::Context;
use diesel::{connection::SimpleConnection, prelude::*, r2d2::ConnectionManager, SqliteConnection};
use r2d2::{CustomizeConnection, PooledConnection};

pub type DbConn = PooledConnection<ConnectionManager<SqliteConnection>>;

const BUSY_TIMEOUT_MS: u32 = 5000;
const SLOT_INSERT_CHUNK: usize = 256;

#[derive(Debug)]
struct ConnectionOptions;

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!("PRAGMA busy_timeout = {};", BUSY_TIMEOUT_MS))
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

pub fn build_pool(database_url: &str, max_size: u32) -> anyhow::Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    r2d2::Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(ConnectionOptions))
        .build(manager)
        .context("Failed to create pool")
}

pub fn get_db_conn(pool: &web::Data<DbPool>) -> anyhow::Result<DbConn> {
    pool.get().context("DB connection")
}

/// Inserts one unbooked slot for every day × time slot × machine.
pub fn insert_slot_grid<D, T>(
    conn: &mut SqliteConnection,
    days: &[D],
    time_slots: &[T],
    machines: &[i32],
) -> QueryResult<usize>
where
    D: AsRef<str>,
    T: AsRef<str>,
{
    use crate::schema::slots;

    let new_slots = days
        .iter()
        .flat_map(|day| {
            time_slots.iter().flat_map(move |time_slot| {
                machines.iter().map(move |&machine_number| NewSlot {
                    day_name: day.as_ref(),
                    time_slot: time_slot.as_ref(),
                    machine_number,
                })
            })
        })
        .collect::<Vec<_>>();

    let mut inserted = 0;
    for chunk in new_slots.chunks(SLOT_INSERT_CHUNK) {
        inserted += diesel::insert_into(slots::table)
            .values(chunk)
            .execute(conn)?;
    }
    Ok(inserted)
}

/// Distinct time slot labels currently present in the grid.
pub fn time_slot_labels(conn: &mut SqliteConnection) -> QueryResult<Vec<String>> {
    use crate::schema::slots;

    slots::table
        .select(slots::time_slot)
        .distinct()
        .load::<String>(conn)
}
