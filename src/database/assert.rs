use anyhow::{bail, Context};
use diesel::{prelude::*, SqliteConnection};

use crate::{error::Rejection, models::machines::MachineData};

pub fn day_exists(conn: &mut SqliteConnection, name: &str) -> anyhow::Result<bool> {
    use crate::schema::days;

    let res = days::table
        .filter(days::name.eq(name))
        .count()
        .get_result::<i64>(conn)
        .context("DB error")?;
    Ok(res > 0)
}

pub fn time_slot_exists(conn: &mut SqliteConnection, label: &str) -> anyhow::Result<bool> {
    use crate::schema::slots;

    let res = slots::table
        .filter(slots::time_slot.eq(label))
        .count()
        .get_result::<i64>(conn)
        .context("DB error")?;
    Ok(res > 0)
}

pub fn assert_day(conn: &mut SqliteConnection, name: &str) -> anyhow::Result<()> {
    if !day_exists(conn, name)? {
        bail!(Rejection::NoSuchDay);
    }
    Ok(())
}

pub fn assert_time_slot(conn: &mut SqliteConnection, label: &str) -> anyhow::Result<()> {
    if !time_slot_exists(conn, label)? {
        bail!(Rejection::NoSuchTimeSlot);
    }
    Ok(())
}

pub fn assert_machine(conn: &mut SqliteConnection, number: i32) -> anyhow::Result<MachineData> {
    use crate::schema::machines;

    let machine = machines::table
        .filter(machines::number.eq(number))
        .first::<MachineData>(conn)
        .optional()
        .context("DB error")?;
    match machine {
        Some(machine) => Ok(machine),
        None => bail!(Rejection::NoSuchMachine),
    }
}

/// Rejects blank names, returns the trimmed one otherwise.
pub fn assert_name(name: &str) -> anyhow::Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        bail!(Rejection::EmptyName);
    }
    Ok(name)
}
