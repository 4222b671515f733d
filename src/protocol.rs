use serde::Serialize;

use crate::grid::Grid;

#[derive(Default, Serialize)]
pub struct SimpleResponse {
    pub success: bool,
    pub err: String,
}

impl SimpleResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            err: "".to_string(),
        }
    }
}

#[derive(Default, Serialize)]
pub struct ScheduleRowItem {
    pub time_slot: String,
    pub cells: Vec<Option<String>>,
}

#[derive(Default, Serialize)]
pub struct ScheduleDayItem {
    pub day: String,
    pub rows: Vec<ScheduleRowItem>,
}

/// The grid as sent over the wire, flattened into responses.
#[derive(Default, Serialize)]
pub struct ScheduleData {
    pub days: Vec<String>,
    pub time_slots: Vec<String>,
    pub machines: Vec<i32>,
    pub schedule: Vec<ScheduleDayItem>,
}

impl From<&Grid> for ScheduleData {
    fn from(grid: &Grid) -> Self {
        let schedule = grid
            .days
            .iter()
            .enumerate()
            .map(|(d, day)| ScheduleDayItem {
                day: day.clone(),
                rows: grid
                    .time_slots
                    .iter()
                    .enumerate()
                    .map(|(t, time_slot)| ScheduleRowItem {
                        time_slot: time_slot.label().to_string(),
                        cells: grid
                            .row(d, t)
                            .iter()
                            .map(|cell| cell.text().map(str::to_string))
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        Self {
            days: grid.days.clone(),
            time_slots: grid
                .time_slots
                .iter()
                .map(|ts| ts.label().to_string())
                .collect(),
            machines: grid.machines.clone(),
            schedule,
        }
    }
}

#[macro_export]
macro_rules! impl_err_response {
    ( $( $type:ty),+ $(,)? ) => {
        $(
            impl $type {
                pub fn err<S: ToString>(err: S) -> Self {
                    Self {
                        success: false,
                        err: err.to_string(),
                        ..Default::default()
                    }
                }
            }
        )+
    };
}

impl_err_response! {
    SimpleResponse,
}
