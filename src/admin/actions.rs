//! Structural mutations of the grid. Each action runs in one transaction
//! and returns the confirmation shown to the administrator.

use anyhow::{bail, Context};
use diesel::{dsl::max, prelude::*, SqliteConnection};

use super::requests::AdminAction;
use crate::{
    database::{
        assert::{
            assert_day, assert_machine, assert_name, assert_time_slot, day_exists,
            time_slot_exists,
        },
        insert_slot_grid, time_slot_labels,
        users::find_or_create_user,
    },
    error::Rejection,
    models::{
        days::DayData,
        machines::{MachineData, MACHINE_STATUS_ACTIVE, MACHINE_STATUS_DISABLED},
    },
    schema::{days, machines, slots},
    time_slot::DEFAULT_TIME_SLOTS,
    utils::parse_occupant,
};

pub fn apply(conn: &mut SqliteConnection, action: AdminAction) -> anyhow::Result<String> {
    tracing::info!(?action, "applying admin action");

    conn.immediate_transaction::<_, anyhow::Error, _>(|conn| match action {
        AdminAction::View | AdminAction::ExportWord => Ok("".to_string()),
        AdminAction::Reset => reset(conn),
        AdminAction::FactoryReset => factory_reset(conn),
        AdminAction::AddTime { new_time } => add_time(conn, &new_time),
        AdminAction::RemoveTime { time_slot } => remove_time(conn, &time_slot),
        AdminAction::EditTime {
            time_slot,
            new_time,
        } => edit_time(conn, &time_slot, &new_time),
        AdminAction::AddDay { new_day } => add_day(conn, &new_day),
        AdminAction::RemoveDay { day } => remove_day(conn, &day),
        AdminAction::EditDay { day, new_day } => edit_day(conn, &day, &new_day),
        AdminAction::AddMachine => add_machine(conn),
        AdminAction::RemoveMachine { machine } => remove_machine(conn, machine),
        AdminAction::ToggleMachine { machine } => toggle_machine(conn, machine),
        AdminAction::Edit {
            day,
            time_slot,
            machine,
            new_value,
        } => edit_slot(conn, &day, &time_slot, machine, &new_value),
    })
}

fn ordered_day_names(conn: &mut SqliteConnection) -> anyhow::Result<Vec<String>> {
    days::table
        .select(days::name)
        .order(days::order_num.asc())
        .load::<String>(conn)
        .context("DB error")
}

fn machine_numbers(conn: &mut SqliteConnection) -> anyhow::Result<Vec<i32>> {
    machines::table
        .select(machines::number)
        .order(machines::number.asc())
        .load::<i32>(conn)
        .context("DB error")
}

fn reset(conn: &mut SqliteConnection) -> anyhow::Result<String> {
    let cleared = diesel::update(slots::table.filter(slots::user_id.is_not_null()))
        .set(slots::user_id.eq(None::<i32>))
        .execute(conn)
        .context("DB error")?;
    tracing::info!(cleared, "bookings reset");

    Ok("Schedule has been reset.".to_string())
}

fn factory_reset(conn: &mut SqliteConnection) -> anyhow::Result<String> {
    diesel::delete(slots::table)
        .execute(conn)
        .context("DB error")?;

    let day_names = ordered_day_names(conn)?;
    let numbers = machine_numbers(conn)?;
    let inserted = insert_slot_grid(conn, &day_names[..], &DEFAULT_TIME_SLOTS[..], &numbers)
        .context("DB error")?;
    tracing::info!(inserted, "slots regenerated");

    Ok("Schedule has been restored to factory settings.".to_string())
}

fn add_time(conn: &mut SqliteConnection, new_time: &str) -> anyhow::Result<String> {
    let new_time = assert_name(new_time)?;
    if time_slot_exists(conn, new_time)? {
        bail!(Rejection::DuplicateTimeSlot);
    }

    let day_names = ordered_day_names(conn)?;
    let numbers = machine_numbers(conn)?;
    insert_slot_grid(conn, &day_names[..], &[new_time], &numbers).context("DB error")?;

    Ok("New time slot added.".to_string())
}

fn remove_time(conn: &mut SqliteConnection, time_slot: &str) -> anyhow::Result<String> {
    assert_time_slot(conn, time_slot)?;

    diesel::delete(slots::table.filter(slots::time_slot.eq(time_slot)))
        .execute(conn)
        .context("DB error")?;

    Ok("Time slot removed.".to_string())
}

fn edit_time(
    conn: &mut SqliteConnection,
    time_slot: &str,
    new_time: &str,
) -> anyhow::Result<String> {
    assert_time_slot(conn, time_slot)?;
    let new_time = assert_name(new_time)?;
    if new_time != time_slot && time_slot_exists(conn, new_time)? {
        bail!(Rejection::DuplicateTimeSlot);
    }

    diesel::update(slots::table.filter(slots::time_slot.eq(time_slot)))
        .set(slots::time_slot.eq(new_time))
        .execute(conn)
        .context("DB error")?;

    Ok("Time slot renamed.".to_string())
}

fn add_day(conn: &mut SqliteConnection, new_day: &str) -> anyhow::Result<String> {
    let new_day = assert_name(new_day)?;
    if day_exists(conn, new_day)? {
        bail!(Rejection::DuplicateDay);
    }

    let last = days::table
        .select(max(days::order_num))
        .first::<Option<i32>>(conn)
        .context("DB error")?;
    diesel::insert_into(days::table)
        .values(DayData {
            name: new_day.to_string(),
            order_num: last.unwrap_or(0) + 1,
        })
        .execute(conn)
        .context("DB error")?;

    let labels = time_slot_labels(conn).context("DB error")?;
    let numbers = machine_numbers(conn)?;
    insert_slot_grid(conn, &[new_day], &labels[..], &numbers).context("DB error")?;

    Ok("Day added.".to_string())
}

fn remove_day(conn: &mut SqliteConnection, day: &str) -> anyhow::Result<String> {
    assert_day(conn, day)?;

    diesel::delete(slots::table.filter(slots::day_name.eq(day)))
        .execute(conn)
        .context("DB error")?;
    diesel::delete(days::table.filter(days::name.eq(day)))
        .execute(conn)
        .context("DB error")?;

    Ok("Day removed.".to_string())
}

fn edit_day(conn: &mut SqliteConnection, day: &str, new_day: &str) -> anyhow::Result<String> {
    assert_day(conn, day)?;
    let new_day = assert_name(new_day)?;
    if new_day != day && day_exists(conn, new_day)? {
        bail!(Rejection::DuplicateDay);
    }

    // Slot rows follow through ON UPDATE CASCADE.
    diesel::update(days::table.filter(days::name.eq(day)))
        .set(days::name.eq(new_day))
        .execute(conn)
        .context("DB error")?;

    Ok("Day renamed.".to_string())
}

fn add_machine(conn: &mut SqliteConnection) -> anyhow::Result<String> {
    let last = machines::table
        .select(max(machines::number))
        .first::<Option<i32>>(conn)
        .context("DB error")?;
    let number = last.unwrap_or(0) + 1;
    diesel::insert_into(machines::table)
        .values(MachineData {
            number,
            status: MACHINE_STATUS_ACTIVE.to_string(),
        })
        .execute(conn)
        .context("DB error")?;

    let day_names = ordered_day_names(conn)?;
    let labels = time_slot_labels(conn).context("DB error")?;
    insert_slot_grid(conn, &day_names[..], &labels[..], &[number]).context("DB error")?;

    Ok(format!("Machine {} added.", number))
}

fn remove_machine(conn: &mut SqliteConnection, machine: i32) -> anyhow::Result<String> {
    assert_machine(conn, machine)?;

    diesel::delete(slots::table.filter(slots::machine_number.eq(machine)))
        .execute(conn)
        .context("DB error")?;
    diesel::delete(machines::table.filter(machines::number.eq(machine)))
        .execute(conn)
        .context("DB error")?;

    Ok(format!("Machine {} removed.", machine))
}

fn toggle_machine(conn: &mut SqliteConnection, machine: i32) -> anyhow::Result<String> {
    let data = assert_machine(conn, machine)?;

    if data.is_active() {
        diesel::update(machines::table.filter(machines::number.eq(machine)))
            .set(machines::status.eq(MACHINE_STATUS_DISABLED))
            .execute(conn)
            .context("DB error")?;
        let cleared = diesel::update(slots::table.filter(slots::machine_number.eq(machine)))
            .set(slots::user_id.eq(None::<i32>))
            .execute(conn)
            .context("DB error")?;
        tracing::info!(machine, cleared, "machine disabled");
        Ok(format!("Machine {} disabled.", machine))
    } else {
        diesel::update(machines::table.filter(machines::number.eq(machine)))
            .set(machines::status.eq(MACHINE_STATUS_ACTIVE))
            .execute(conn)
            .context("DB error")?;
        tracing::info!(machine, "machine enabled");
        Ok(format!("Machine {} enabled.", machine))
    }
}

fn edit_slot(
    conn: &mut SqliteConnection,
    day: &str,
    time_slot: &str,
    machine: i32,
    new_value: &str,
) -> anyhow::Result<String> {
    let occupant = parse_occupant(new_value)?;
    if !assert_machine(conn, machine)?.is_active() {
        bail!(Rejection::MachineDisabled);
    }

    let slot_id = slots::table
        .filter(slots::day_name.eq(day))
        .filter(slots::time_slot.eq(time_slot))
        .filter(slots::machine_number.eq(machine))
        .select(slots::id)
        .first::<i32>(conn)
        .optional()
        .context("DB error")?
        .ok_or(Rejection::NoSuchSlot)?;

    match occupant {
        None => {
            diesel::update(slots::table.filter(slots::id.eq(slot_id)))
                .set(slots::user_id.eq(None::<i32>))
                .execute(conn)
                .context("DB error")?;
            Ok("Booking removed.".to_string())
        }
        Some((surname, room)) => {
            let user = find_or_create_user(conn, surname, room).context("DB error")?;
            diesel::update(slots::table.filter(slots::id.eq(slot_id)))
                .set(slots::user_id.eq(user.id))
                .execute(conn)
                .context("DB error")?;
            Ok("Slot updated.".to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        database::test_util::create_test_pool,
        grid::{load_grid, Cell, View},
        models::{days::DEFAULT_DAYS, machines::DEFAULT_MACHINE_COUNT},
        schema::users,
    };

    #[derive(Queryable)]
    struct StoredSlot {
        day_name: String,
        time_slot: String,
        machine_number: i32,
        user_id: Option<i32>,
    }

    fn all_slots(conn: &mut SqliteConnection) -> Vec<StoredSlot> {
        slots::table
            .select((
                slots::day_name,
                slots::time_slot,
                slots::machine_number,
                slots::user_id,
            ))
            .load::<StoredSlot>(conn)
            .unwrap()
    }

    fn run(conn: &mut SqliteConnection, action: AdminAction) -> anyhow::Result<String> {
        apply(conn, action)
    }

    fn rejection_of(err: anyhow::Error) -> Rejection {
        err.downcast::<Rejection>().unwrap()
    }

    fn edit(day: &str, time_slot: &str, machine: i32, new_value: &str) -> AdminAction {
        AdminAction::Edit {
            day: day.to_string(),
            time_slot: time_slot.to_string(),
            machine,
            new_value: new_value.to_string(),
        }
    }

    fn occupant(conn: &mut SqliteConnection, day: &str, ts: &str, machine: i32) -> Option<i32> {
        slots::table
            .filter(slots::day_name.eq(day))
            .filter(slots::time_slot.eq(ts))
            .filter(slots::machine_number.eq(machine))
            .select(slots::user_id)
            .first::<Option<i32>>(conn)
            .unwrap()
    }

    #[test]
    fn manual_edit_creates_assigns_and_clears() {
        let pool = create_test_pool();
        let mut pooled = pool.get().unwrap();
        let conn: &mut SqliteConnection = &mut pooled;

        run(conn, edit("Monday", "7:00-9:00", 1, "Smith 204")).unwrap();
        let user_id = users::table
            .filter(users::surname.eq("Smith"))
            .filter(users::room.eq("204"))
            .select(users::id)
            .first::<i32>(conn)
            .unwrap();
        assert_eq!(occupant(conn, "Monday", "7:00-9:00", 1), Some(user_id));

        // Same user on a second slot: the existing identity is reused.
        run(conn, edit("Tuesday", "7:00-9:00", 1, "Smith 204")).unwrap();
        assert_eq!(occupant(conn, "Tuesday", "7:00-9:00", 1), Some(user_id));
        assert_eq!(users::table.count().get_result::<i64>(conn).unwrap(), 1);

        run(conn, edit("Monday", "7:00-9:00", 1, "")).unwrap();
        assert_eq!(occupant(conn, "Monday", "7:00-9:00", 1), None);
    }

    #[test]
    fn malformed_manual_edit_has_no_side_effects() {
        let pool = create_test_pool();
        let mut pooled = pool.get().unwrap();
        let conn: &mut SqliteConnection = &mut pooled;

        let err = run(conn, edit("Monday", "7:00-9:00", 1, "Smith")).err().unwrap();
        assert_eq!(rejection_of(err), Rejection::BadOccupant);
        assert_eq!(users::table.count().get_result::<i64>(conn).unwrap(), 0);
        assert_eq!(occupant(conn, "Monday", "7:00-9:00", 1), None);
    }

    #[test]
    fn manual_edit_on_disabled_machine_is_rejected() {
        let pool = create_test_pool();
        let mut pooled = pool.get().unwrap();
        let conn: &mut SqliteConnection = &mut pooled;

        run(conn, AdminAction::ToggleMachine { machine: 2 }).unwrap();
        let err = run(conn, edit("Monday", "7:00-9:00", 2, "Smith 204"))
            .err()
            .unwrap();
        assert_eq!(rejection_of(err), Rejection::MachineDisabled);
        assert_eq!(users::table.count().get_result::<i64>(conn).unwrap(), 0);
    }

    #[test]
    fn manual_edit_of_missing_slot_rolls_back() {
        let pool = create_test_pool();
        let mut pooled = pool.get().unwrap();
        let conn: &mut SqliteConnection = &mut pooled;

        let err = run(conn, edit("Holiday", "7:00-9:00", 1, "Smith 204"))
            .err()
            .unwrap();
        assert_eq!(rejection_of(err), Rejection::NoSuchSlot);
        assert_eq!(users::table.count().get_result::<i64>(conn).unwrap(), 0);
    }

    #[test]
    fn reset_clears_bookings_only() {
        let pool = create_test_pool();
        let mut pooled = pool.get().unwrap();
        let conn: &mut SqliteConnection = &mut pooled;

        run(conn, edit("Monday", "7:00-9:00", 1, "Smith 204")).unwrap();
        run(conn, edit("Friday", "22:00-24:00", 5, "Lee 12")).unwrap();
        let before = all_slots(conn).len();

        run(conn, AdminAction::Reset).unwrap();
        let after = all_slots(conn);
        assert_eq!(after.len(), before);
        assert!(after.iter().all(|slot| slot.user_id.is_none()));
        assert_eq!(users::table.count().get_result::<i64>(conn).unwrap(), 2);
    }

    #[test]
    fn factory_reset_regenerates_the_default_grid() {
        let pool = create_test_pool();
        let mut pooled = pool.get().unwrap();
        let conn: &mut SqliteConnection = &mut pooled;

        run(conn, edit("Monday", "7:00-9:00", 1, "Smith 204")).unwrap();
        run(conn, AdminAction::AddTime { new_time: "5:00-6:00".to_string() }).unwrap();
        run(conn, AdminAction::RemoveTime { time_slot: "13:00-15:00".to_string() }).unwrap();
        run(conn, AdminAction::AddMachine).unwrap();

        run(conn, AdminAction::FactoryReset).unwrap();

        let machine_count = DEFAULT_MACHINE_COUNT as usize + 1;
        let slots = all_slots(conn);
        assert_eq!(
            slots.len(),
            DEFAULT_DAYS.len() * DEFAULT_TIME_SLOTS.len() * machine_count
        );
        assert!(slots.iter().all(|slot| slot.user_id.is_none()));

        let grid = load_grid(conn, View::Admin).unwrap();
        assert_eq!(
            grid.time_slots.iter().map(|ts| ts.label()).collect::<Vec<_>>(),
            DEFAULT_TIME_SLOTS.to_vec()
        );
        for day in DEFAULT_DAYS.iter() {
            for ts in DEFAULT_TIME_SLOTS.iter() {
                for machine in 1..=machine_count as i32 {
                    let matching = slots
                        .iter()
                        .filter(|slot| {
                            slot.day_name == *day
                                && slot.time_slot == *ts
                                && slot.machine_number == machine
                        })
                        .count();
                    assert_eq!(matching, 1);
                    assert_eq!(grid.cell(day, ts, machine), Some(&Cell::Free));
                }
            }
        }
    }

    #[test]
    fn time_slot_lifecycle() {
        let pool = create_test_pool();
        let mut pooled = pool.get().unwrap();
        let conn: &mut SqliteConnection = &mut pooled;
        let per_label = DEFAULT_DAYS.len() * DEFAULT_MACHINE_COUNT as usize;

        run(conn, AdminAction::AddTime { new_time: "5:00-6:00".to_string() }).unwrap();
        let count = |conn: &mut SqliteConnection, label: &str| {
            slots::table
                .filter(slots::time_slot.eq(label.to_string()))
                .count()
                .get_result::<i64>(conn)
                .unwrap() as usize
        };
        assert_eq!(count(conn, "5:00-6:00"), per_label);

        let err = run(conn, AdminAction::AddTime { new_time: "5:00-6:00".to_string() })
            .err()
            .unwrap();
        assert_eq!(rejection_of(err), Rejection::DuplicateTimeSlot);

        run(
            conn,
            AdminAction::EditTime {
                time_slot: "5:00-6:00".to_string(),
                new_time: "5:30-6:30".to_string(),
            },
        )
        .unwrap();
        assert_eq!(count(conn, "5:00-6:00"), 0);
        assert_eq!(count(conn, "5:30-6:30"), per_label);

        let err = run(
            conn,
            AdminAction::EditTime {
                time_slot: "5:30-6:30".to_string(),
                new_time: "7:00-9:00".to_string(),
            },
        )
        .err()
        .unwrap();
        assert_eq!(rejection_of(err), Rejection::DuplicateTimeSlot);

        run(conn, AdminAction::RemoveTime { time_slot: "5:30-6:30".to_string() }).unwrap();
        assert_eq!(count(conn, "5:30-6:30"), 0);

        let err = run(conn, AdminAction::RemoveTime { time_slot: "5:30-6:30".to_string() })
            .err()
            .unwrap();
        assert_eq!(rejection_of(err), Rejection::NoSuchTimeSlot);
    }

    #[test]
    fn day_lifecycle() {
        let pool = create_test_pool();
        let mut pooled = pool.get().unwrap();
        let conn: &mut SqliteConnection = &mut pooled;
        let per_day = DEFAULT_TIME_SLOTS.len() * DEFAULT_MACHINE_COUNT as usize;

        run(conn, AdminAction::AddDay { new_day: "Holiday".to_string() }).unwrap();
        let order = days::table
            .filter(days::name.eq("Holiday"))
            .select(days::order_num)
            .first::<i32>(conn)
            .unwrap();
        assert_eq!(order, DEFAULT_DAYS.len() as i32 + 1);
        let count = |conn: &mut SqliteConnection, day: &str| {
            slots::table
                .filter(slots::day_name.eq(day.to_string()))
                .count()
                .get_result::<i64>(conn)
                .unwrap() as usize
        };
        assert_eq!(count(conn, "Holiday"), per_day);

        let err = run(conn, AdminAction::AddDay { new_day: "Monday".to_string() })
            .err()
            .unwrap();
        assert_eq!(rejection_of(err), Rejection::DuplicateDay);
        let err = run(conn, AdminAction::AddDay { new_day: " ".to_string() })
            .err()
            .unwrap();
        assert_eq!(rejection_of(err), Rejection::EmptyName);

        run(conn, edit("Holiday", "7:00-9:00", 1, "Smith 204")).unwrap();
        run(
            conn,
            AdminAction::EditDay {
                day: "Holiday".to_string(),
                new_day: "Feast".to_string(),
            },
        )
        .unwrap();
        assert_eq!(count(conn, "Holiday"), 0);
        assert_eq!(count(conn, "Feast"), per_day);
        assert!(occupant(conn, "Feast", "7:00-9:00", 1).is_some());
        let grid = load_grid(conn, View::Admin).unwrap();
        assert_eq!(grid.days.last().map(String::as_str), Some("Feast"));

        run(conn, AdminAction::RemoveDay { day: "Feast".to_string() }).unwrap();
        assert_eq!(count(conn, "Feast"), 0);
        assert!(!day_exists(conn, "Feast").unwrap());

        let err = run(conn, AdminAction::RemoveDay { day: "Feast".to_string() })
            .err()
            .unwrap();
        assert_eq!(rejection_of(err), Rejection::NoSuchDay);
    }

    #[test]
    fn renaming_a_seeded_day_keeps_its_position_and_bookings() {
        let pool = create_test_pool();
        let mut pooled = pool.get().unwrap();
        let conn: &mut SqliteConnection = &mut pooled;

        run(conn, edit("Monday", "10:00-12:00", 2, "Smith 204")).unwrap();
        let message = run(
            conn,
            AdminAction::EditDay {
                day: "Monday".to_string(),
                new_day: " Mon ".to_string(),
            },
        )
        .unwrap();
        assert_eq!(message, "Day renamed.");

        let grid = load_grid(conn, View::Admin).unwrap();
        assert_eq!(grid.days[0], "Mon");
        assert_eq!(
            grid.cell("Mon", "10:00-12:00", 2),
            Some(&Cell::Booked("Smith 204".to_string()))
        );
        assert_eq!(grid.cell("Monday", "10:00-12:00", 2), None);
        assert!(all_slots(conn).iter().all(|slot| slot.day_name != "Monday"));

        let err = run(
            conn,
            AdminAction::EditDay {
                day: "Mon".to_string(),
                new_day: "Tuesday".to_string(),
            },
        )
        .err()
        .unwrap();
        assert_eq!(rejection_of(err), Rejection::DuplicateDay);
    }

    #[test]
    fn machine_lifecycle() {
        let pool = create_test_pool();
        let mut pooled = pool.get().unwrap();
        let conn: &mut SqliteConnection = &mut pooled;
        let per_machine = DEFAULT_DAYS.len() * DEFAULT_TIME_SLOTS.len();

        let message = run(conn, AdminAction::AddMachine).unwrap();
        let number = DEFAULT_MACHINE_COUNT + 1;
        assert_eq!(message, format!("Machine {} added.", number));
        let count = |conn: &mut SqliteConnection, machine: i32| {
            slots::table
                .filter(slots::machine_number.eq(machine))
                .count()
                .get_result::<i64>(conn)
                .unwrap() as usize
        };
        assert_eq!(count(conn, number), per_machine);

        run(conn, AdminAction::RemoveMachine { machine: number }).unwrap();
        assert_eq!(count(conn, number), 0);
        let err = run(conn, AdminAction::RemoveMachine { machine: number })
            .err()
            .unwrap();
        assert_eq!(rejection_of(err), Rejection::NoSuchMachine);
    }

    #[test]
    fn disabling_a_machine_clears_its_bookings() {
        let pool = create_test_pool();
        let mut pooled = pool.get().unwrap();
        let conn: &mut SqliteConnection = &mut pooled;

        run(conn, edit("Monday", "7:00-9:00", 3, "Smith 204")).unwrap();
        run(conn, edit("Monday", "7:00-9:00", 4, "Lee 12")).unwrap();

        let message = run(conn, AdminAction::ToggleMachine { machine: 3 }).unwrap();
        assert_eq!(message, "Machine 3 disabled.");
        assert_eq!(occupant(conn, "Monday", "7:00-9:00", 3), None);
        assert!(occupant(conn, "Monday", "7:00-9:00", 4).is_some());

        let grid = load_grid(conn, View::Admin).unwrap();
        assert_eq!(grid.cell("Monday", "7:00-9:00", 3), Some(&Cell::Disabled));

        let message = run(conn, AdminAction::ToggleMachine { machine: 3 }).unwrap();
        assert_eq!(message, "Machine 3 enabled.");
        let grid = load_grid(conn, View::Resident).unwrap();
        assert_eq!(grid.cell("Monday", "7:00-9:00", 3), Some(&Cell::Free));
    }
}
