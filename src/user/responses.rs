use serde::Serialize;

use crate::protocol::ScheduleData;

#[derive(Default, Serialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub err: String,
    pub login_token: String,
    pub surname: String,
    pub room: String,
}

#[derive(Default, Serialize)]
pub struct BookingItem {
    pub day: String,
    pub time_slot: String,
    pub machine: i32,
}

#[derive(Default, Serialize)]
pub struct ScheduleResponse {
    pub success: bool,
    pub err: String,
    pub message: String,
    pub booking: Option<BookingItem>,
    #[serde(flatten)]
    pub schedule: ScheduleData,
}

crate::impl_err_response! {
    RegisterResponse,
    ScheduleResponse,
}
