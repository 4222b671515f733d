mod requests;
mod responses;
mod utils;

use crate::{
    database::{get_db_conn, users::find_or_create_user},
    error::Rejection,
    grid::{load_grid, View},
    models::{machines::MACHINE_STATUS_ACTIVE, slots::SlotData, user_logins::UserLoginData},
    protocol::{ScheduleData, SimpleResponse},
    DbPool,
};
use actix_web::{post, web, HttpResponse, Responder};
use anyhow::{bail, Context};
use chrono::Utc;
use diesel::{prelude::*, SqliteConnection};

use self::{requests::*, responses::*, utils::get_user_from_token};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(logout)
        .service(schedule)
        .service(book);
}

crate::post_funcs! {
    (register, "/", RegisterRequest, RegisterResponse),
    (logout, "/logout", LogoutRequest, SimpleResponse),
    (schedule, "/schedule", ScheduleRequest, ScheduleResponse),
    (book, "/book", BookRequest, SimpleResponse),
}

async fn register_impl(
    pool: web::Data<DbPool>,
    info: web::Json<RegisterRequest>,
) -> anyhow::Result<RegisterResponse> {
    use crate::schema::user_logins;

    let info = info.into_inner();
    let surname = info.surname.trim().to_string();
    let room = info.room.trim().to_string();
    if surname.is_empty() || room.is_empty() {
        bail!(Rejection::MissingIdentity);
    }

    let mut conn = get_db_conn(&pool)?;
    let (user, login_token) = web::block(move || {
        conn.transaction::<_, anyhow::Error, _>(|conn| {
            let user = find_or_create_user(conn, &surname, &room).context("DB error")?;

            let login_token = crate::utils::generate_login_token(&user.id.to_string(), "user");
            let token_data = UserLoginData {
                token: login_token.clone(),
                user_id: user.id,
                login_time: Utc::now().naive_utc(),
            };
            diesel::insert_into(user_logins::table)
                .values(token_data)
                .execute(conn)
                .context("DB error")?;

            Ok((user, login_token))
        })
    })
    .await
    .context("DB error")??;

    Ok(RegisterResponse {
        success: true,
        err: "".to_string(),
        login_token,
        surname: user.surname,
        room: user.room,
    })
}

async fn logout_impl(
    pool: web::Data<DbPool>,
    info: web::Json<LogoutRequest>,
) -> anyhow::Result<SimpleResponse> {
    use crate::schema::user_logins;

    let info = info.into_inner();
    let mut conn = get_db_conn(&pool)?;
    web::block(move || {
        diesel::delete(user_logins::table.filter(user_logins::token.eq(info.login_token)))
            .execute(&mut conn)
    })
    .await
    .context("DB error")??;

    Ok(SimpleResponse::ok())
}

async fn schedule_impl(
    pool: web::Data<DbPool>,
    info: web::Json<ScheduleRequest>,
) -> anyhow::Result<ScheduleResponse> {
    use crate::schema::slots;

    let info = info.into_inner();
    let user = get_user_from_token(info.login_token, &pool).await?;

    let mut conn = get_db_conn(&pool)?;
    let user_id = user.id;
    let (grid, booking) = web::block(move || -> QueryResult<_> {
        let grid = load_grid(&mut conn, View::Resident)?;
        let booking = slots::table
            .filter(slots::user_id.eq(user_id))
            .select((slots::day_name, slots::time_slot, slots::machine_number))
            .first::<SlotData>(&mut conn)
            .optional()?;
        Ok((grid, booking))
    })
    .await
    .context("DB error")??;

    let message = match booking {
        Some(_) => Rejection::AlreadyBooked.to_string(),
        None => "".to_string(),
    };

    Ok(ScheduleResponse {
        success: true,
        err: "".to_string(),
        message,
        booking: booking.map(|slot| BookingItem {
            day: slot.day_name,
            time_slot: slot.time_slot,
            machine: slot.machine_number,
        }),
        schedule: ScheduleData::from(&grid),
    })
}

async fn book_impl(
    pool: web::Data<DbPool>,
    info: web::Json<BookRequest>,
) -> anyhow::Result<SimpleResponse> {
    let info = info.into_inner();
    let user = get_user_from_token(info.login_token.clone(), &pool).await?;

    let mut conn = get_db_conn(&pool)?;
    web::block(move || {
        conn.immediate_transaction::<_, anyhow::Error, _>(|conn| {
            book_slot(conn, user.id, &info.day, &info.time_slot, info.machine)
        })
    })
    .await
    .context("DB error")??;

    Ok(SimpleResponse::ok())
}

/// Assigns a free slot on an active machine to a user holding no booking.
/// Runs inside the caller's immediate transaction, and the write itself
/// only touches a still-unbooked row.
fn book_slot(
    conn: &mut SqliteConnection,
    user_id: i32,
    day: &str,
    time_slot: &str,
    machine: i32,
) -> anyhow::Result<()> {
    use crate::schema::{machines, slots};

    let booked = slots::table
        .filter(slots::user_id.eq(user_id))
        .count()
        .get_result::<i64>(conn)
        .context("DB error")?;
    if booked > 0 {
        bail!(Rejection::AlreadyBooked);
    }

    let slot = slots::table
        .inner_join(machines::table)
        .filter(slots::day_name.eq(day))
        .filter(slots::time_slot.eq(time_slot))
        .filter(slots::machine_number.eq(machine))
        .select((slots::id, slots::user_id, machines::status))
        .first::<(i32, Option<i32>, String)>(conn)
        .optional()
        .context("DB error")?;
    let slot_id = match slot {
        Some((id, None, status)) if status == MACHINE_STATUS_ACTIVE => id,
        _ => bail!(Rejection::SlotUnavailable),
    };

    let updated = diesel::update(
        slots::table
            .filter(slots::id.eq(slot_id))
            .filter(slots::user_id.is_null()),
    )
    .set(slots::user_id.eq(user_id))
    .execute(conn)
    .context("DB error")?;
    if updated != 1 {
        bail!(Rejection::SlotUnavailable);
    }

    tracing::info!(user_id, day, time_slot, machine, "slot booked");
    Ok(())
}
