pub mod days;
pub mod machines;
pub mod slots;
pub mod users;

pub mod admin_logins;
pub mod user_logins;
