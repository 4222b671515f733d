use actix_web::web;
use anyhow::{bail, Context};
use diesel::prelude::*;

use crate::{
    database::get_db_conn,
    error::Rejection,
    models::{user_logins::UserLoginData, users::UserData},
    utils::login_expired,
    DbPool,
};

pub async fn get_user_from_token(
    token: String,
    pool: &web::Data<DbPool>,
) -> anyhow::Result<UserData> {
    use crate::schema::{user_logins, users};

    let mut conn = get_db_conn(pool)?;
    let data = web::block(move || {
        user_logins::table
            .inner_join(users::table)
            .filter(user_logins::token.eq(token))
            .first::<(UserLoginData, UserData)>(&mut conn)
            .optional()
    })
    .await
    .context("DB error")??;

    match data {
        Some((login, user)) if !login_expired(&login.login_time) => Ok(user),
        Some(_) => bail!(Rejection::LoginExpired),
        None => bail!(Rejection::NotLoggedIn),
    }
}
