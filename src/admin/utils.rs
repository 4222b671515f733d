use actix_web::web;
use anyhow::{bail, Context};
use diesel::prelude::*;

use crate::{
    database::get_db_conn, error::Rejection, models::admin_logins::AdminLoginData,
    utils::login_expired, DbPool,
};

pub async fn get_admin_from_token(
    token: String,
    pool: &web::Data<DbPool>,
) -> anyhow::Result<String> {
    use crate::schema::admin_logins;

    let mut conn = get_db_conn(pool)?;
    let data = web::block(move || {
        admin_logins::table
            .filter(admin_logins::token.eq(token))
            .first::<AdminLoginData>(&mut conn)
            .optional()
    })
    .await
    .context("DB error")??;

    if let Some(data) = data {
        if !login_expired(&data.login_time) {
            return Ok(data.username);
        } else {
            bail!(Rejection::LoginExpired);
        }
    } else {
        bail!(Rejection::NotLoggedIn);
    }
}
