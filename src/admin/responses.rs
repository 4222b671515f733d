use serde::Serialize;

use crate::protocol::ScheduleData;

#[derive(Default, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub err: String,
    pub login_token: String,
}

#[derive(Default, Serialize)]
pub struct AdminResponse {
    pub success: bool,
    pub err: String,
    pub message: String,
    #[serde(flatten)]
    pub schedule: ScheduleData,
}

crate::impl_err_response! {
    LoginResponse,
    AdminResponse,
}
