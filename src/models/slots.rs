use crate::schema::slots;

/// Where a slot sits in the grid.
#[derive(Queryable, Debug)]
pub struct SlotData {
    pub day_name: String,
    pub time_slot: String,
    pub machine_number: i32,
}

/// New slots are always inserted unbooked.
#[derive(Insertable)]
#[diesel(table_name = slots)]
pub struct NewSlot<'a> {
    pub day_name: &'a str,
    pub time_slot: &'a str,
    pub machine_number: i32,
}
