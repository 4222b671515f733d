use serde::Deserialize;

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub surname: String,
    pub room: String,
}

#[derive(Deserialize)]
pub struct LogoutRequest {
    pub login_token: String,
}

#[derive(Deserialize)]
pub struct ScheduleRequest {
    pub login_token: String,
}

#[derive(Deserialize)]
pub struct BookRequest {
    pub login_token: String,
    pub day: String,
    pub time_slot: String,
    pub machine: i32,
}
