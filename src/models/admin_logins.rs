use crate::schema::admin_logins;
use chrono::NaiveDateTime;

#[derive(Queryable, Insertable)]
#[diesel(table_name = admin_logins)]
pub struct AdminLoginData {
    pub token: String,
    pub username: String,
    pub login_time: NaiveDateTime,
}
