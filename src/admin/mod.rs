mod actions;
mod requests;
mod responses;
mod utils;

use crate::{
    config::AppConfig,
    database::get_db_conn,
    error::Rejection,
    export::{render_docx, DOCX_CONTENT_TYPE, DOCX_FILENAME},
    grid::{load_grid, View},
    models::admin_logins::AdminLoginData,
    protocol::{ScheduleData, SimpleResponse},
    DbPool,
};
use actix_web::{http::header::ContentDisposition, post, web, HttpResponse, Responder};
use anyhow::{bail, Context};
use chrono::Utc;
use diesel::prelude::*;

use self::{requests::*, responses::*, utils::get_admin_from_token};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(login).service(logout).service(dispatch);
}

crate::post_funcs! {
    (logout, "/admin_logout", LogoutRequest, SimpleResponse),
}

enum AdminReply {
    Schedule(AdminResponse),
    Document(Vec<u8>),
}

#[post("/admin_login")]
async fn login(
    pool: web::Data<DbPool>,
    config: web::Data<AppConfig>,
    info: web::Json<LoginRequest>,
) -> impl Responder {
    match login_impl(pool, config, info).await {
        Ok(response) => HttpResponse::Ok().json(response),
        Err(err) => crate::utils::error_response("login", err, LoginResponse::err::<String>),
    }
}

#[post("/admin")]
async fn dispatch(pool: web::Data<DbPool>, info: web::Json<AdminRequest>) -> impl Responder {
    match dispatch_impl(pool, info).await {
        Ok(AdminReply::Schedule(response)) => HttpResponse::Ok().json(response),
        Ok(AdminReply::Document(bytes)) => HttpResponse::Ok()
            .content_type(DOCX_CONTENT_TYPE)
            .insert_header(ContentDisposition::attachment(DOCX_FILENAME))
            .body(bytes),
        Err(err) => crate::utils::error_response("dispatch", err, AdminResponse::err::<String>),
    }
}

async fn login_impl(
    pool: web::Data<DbPool>,
    config: web::Data<AppConfig>,
    info: web::Json<LoginRequest>,
) -> anyhow::Result<LoginResponse> {
    use crate::schema::admin_logins;

    let info = info.into_inner();
    if !config.admin.matches(&info.username, &info.password) {
        tracing::warn!(username = %info.username, "admin login refused");
        bail!(Rejection::BadCredentials);
    }

    let mut conn = get_db_conn(&pool)?;
    let login_token = web::block(move || {
        let login_token = crate::utils::generate_login_token(&info.username, "admin");
        let token_data = AdminLoginData {
            token: login_token.clone(),
            username: info.username,
            login_time: Utc::now().naive_utc(),
        };
        diesel::insert_into(admin_logins::table)
            .values(token_data)
            .execute(&mut conn)
            .map(|_| login_token)
    })
    .await
    .context("DB error")??;

    Ok(LoginResponse {
        success: true,
        err: "".to_string(),
        login_token,
    })
}

async fn logout_impl(
    pool: web::Data<DbPool>,
    info: web::Json<LogoutRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::admin_logins;

    let info = info.into_inner();
    let mut conn = get_db_conn(&pool)?;
    web::block(move || {
        diesel::delete(admin_logins::table.filter(admin_logins::token.eq(info.login_token)))
            .execute(&mut conn)
    })
    .await
    .context("DB error")??;

    Ok(SimpleResponse::ok())
}

async fn dispatch_impl(
    pool: web::Data<DbPool>,
    info: web::Json<AdminRequest>,
) -> anyhow::Result<AdminReply> {
    let info = info.into_inner();
    let username = get_admin_from_token(info.login_token, &pool).await?;
    tracing::debug!(%username, action = ?info.action, "admin request");

    let mut conn = get_db_conn(&pool)?;
    web::block(move || -> anyhow::Result<AdminReply> {
        let message = match info.action {
            AdminAction::View => "".to_string(),
            AdminAction::ExportWord => {
                let grid = load_grid(&mut conn, View::Admin).context("DB error")?;
                return Ok(AdminReply::Document(render_docx(&grid)?));
            }
            action => actions::apply(&mut conn, action)?,
        };

        let grid = load_grid(&mut conn, View::Admin).context("DB error")?;
        Ok(AdminReply::Schedule(AdminResponse {
            success: true,
            err: "".to_string(),
            message,
            schedule: ScheduleData::from(&grid),
        }))
    })
    .await
    .context("DB error")?
}
