use crate::schema::machines;

#[derive(Queryable, Insertable, Clone, Debug, PartialEq)]
#[diesel(table_name = machines)]
pub struct MachineData {
    pub number: i32,
    pub status: String,
}

impl MachineData {
    pub fn is_active(&self) -> bool {
        self.status == MACHINE_STATUS_ACTIVE
    }
}

pub const MACHINE_STATUS_ACTIVE: &str = "active";
pub const MACHINE_STATUS_DISABLED: &str = "disabled";

pub const DEFAULT_MACHINE_COUNT: i32 = 5;
