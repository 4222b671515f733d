use crate::schema::days;

#[derive(Queryable, Insertable)]
#[diesel(table_name = days)]
pub struct DayData {
    pub name: String,
    pub order_num: i32,
}

pub const DEFAULT_DAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];
