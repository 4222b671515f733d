use std::collections::HashMap;

use diesel::prelude::*;
use diesel::SqliteConnection;

use crate::{
    models::machines::MachineData,
    time_slot::{sorted_time_slots, TimeSlot},
};

/// Shown in admin cells whose machine is disabled.
pub const DISABLED_MARKER: &str = "Disabled";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    /// Active machines only.
    Resident,
    /// Every machine, disabled ones marked.
    Admin,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cell {
    Free,
    Booked(String),
    Disabled,
}

impl Cell {
    pub fn text(&self) -> Option<&str> {
        match self {
            Cell::Free => None,
            Cell::Booked(name) => Some(name),
            Cell::Disabled => Some(DISABLED_MARKER),
        }
    }
}

/// One slot row joined to its machine status and occupant.
#[derive(Clone, Debug)]
pub struct SlotRow {
    pub day_name: String,
    pub time_slot: String,
    pub machine_number: i32,
    pub machine_status: String,
    pub occupant: Option<String>,
}

/// Dense day × time slot × machine grid.
#[derive(Debug)]
pub struct Grid {
    pub days: Vec<String>,
    pub time_slots: Vec<TimeSlot>,
    pub machines: Vec<i32>,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn build(
        view: View,
        days: Vec<String>,
        mut machines: Vec<MachineData>,
        rows: Vec<SlotRow>,
    ) -> Self {
        machines.sort_by_key(|m| m.number);
        let machines = machines
            .into_iter()
            .filter(|m| view == View::Admin || m.is_active())
            .collect::<Vec<_>>();
        let active = |status: &str| status == crate::models::machines::MACHINE_STATUS_ACTIVE;
        let rows = rows
            .into_iter()
            .filter(|row| view == View::Admin || active(&row.machine_status))
            .collect::<Vec<_>>();

        let time_slots = sorted_time_slots(rows.iter().map(|row| row.time_slot.clone()));

        let day_index = index_of(days.iter().cloned());
        let slot_index = index_of(time_slots.iter().map(|ts| ts.label().to_string()));
        let machine_index = machines
            .iter()
            .enumerate()
            .map(|(i, m)| (m.number, i))
            .collect::<HashMap<_, _>>();

        let mut grid = Grid {
            cells: vec![Cell::Free; days.len() * time_slots.len() * machines.len()],
            days,
            time_slots,
            machines: machines.iter().map(|m| m.number).collect(),
        };

        for row in rows {
            let (d, t, m) = match (
                day_index.get(&row.day_name),
                slot_index.get(&row.time_slot),
                machine_index.get(&row.machine_number),
            ) {
                (Some(&d), Some(&t), Some(&m)) => (d, t, m),
                _ => continue,
            };
            let cell = if view == View::Admin && !active(&row.machine_status) {
                Cell::Disabled
            } else {
                match row.occupant {
                    Some(name) => Cell::Booked(name),
                    None => Cell::Free,
                }
            };
            let offset = grid.offset(d, t, m);
            grid.cells[offset] = cell;
        }

        grid
    }

    fn offset(&self, day: usize, time_slot: usize, machine: usize) -> usize {
        (day * self.time_slots.len() + time_slot) * self.machines.len() + machine
    }

    /// Cells of one time slot row, in machine order.
    pub fn row(&self, day: usize, time_slot: usize) -> &[Cell] {
        let start = self.offset(day, time_slot, 0);
        &self.cells[start..start + self.machines.len()]
    }
}

#[cfg(test)]
impl Grid {
    /// Looks a cell up by its keys rather than its indices.
    pub fn cell(&self, day: &str, time_slot: &str, machine: i32) -> Option<&Cell> {
        let d = self.days.iter().position(|name| name == day)?;
        let t = self.time_slots.iter().position(|ts| ts.label() == time_slot)?;
        let m = self.machines.iter().position(|&number| number == machine)?;
        Some(&self.cells[self.offset(d, t, m)])
    }
}

fn index_of<I: Iterator<Item = String>>(keys: I) -> HashMap<String, usize> {
    keys.enumerate().map(|(i, key)| (key, i)).collect()
}

/// Reads days, machines and slots and builds the grid for `view`.
pub fn load_grid(conn: &mut SqliteConnection, view: View) -> QueryResult<Grid> {
    use crate::schema::{days, machines, slots, users};

    let day_names = days::table
        .select(days::name)
        .order(days::order_num.asc())
        .load::<String>(conn)?;
    let machine_list = machines::table
        .order(machines::number.asc())
        .load::<MachineData>(conn)?;
    let rows = slots::table
        .inner_join(machines::table)
        .left_join(users::table)
        .select((
            slots::day_name,
            slots::time_slot,
            slots::machine_number,
            machines::status,
            users::surname.nullable(),
            users::room.nullable(),
        ))
        .load::<(String, String, i32, String, Option<String>, Option<String>)>(conn)?;

    let rows = rows
        .into_iter()
        .map(
            |(day_name, time_slot, machine_number, machine_status, surname, room)| SlotRow {
                day_name,
                time_slot,
                machine_number,
                machine_status,
                occupant: match (surname, room) {
                    (Some(surname), Some(room)) => Some(format!("{} {}", surname, room)),
                    _ => None,
                },
            },
        )
        .collect();

    Ok(Grid::build(view, day_names, machine_list, rows))
}
