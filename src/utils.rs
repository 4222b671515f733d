use actix_web::HttpResponse;
use blake2::{Blake2b512, Digest};
use chrono::{NaiveDateTime, Utc};
use serde::Serialize;

use crate::error::Rejection;

pub const MAX_LOGIN_TIME_SECS: i64 = 3600;

const INTERNAL_ERROR: &str = "Internal server error";

#[macro_export]
macro_rules! post_funcs {
    ( $( ( $func_name:ident, $url:expr, $request:ty, $response:ty ) ),+ $(,)? ) => {
        $(
            paste::paste! {
                #[post($url)]
                async fn $func_name(
                    pool: web::Data<DbPool>,
                    info: web::Json<$request>
                ) -> impl Responder {
                    match [<$func_name _impl>](pool, info).await {
                        Ok(response) => HttpResponse::Ok().json(response),
                        Err(err) => $crate::utils::error_response(
                            stringify!($func_name),
                            err,
                            <$response>::err::<String>,
                        ),
                    }
                }
            }
        )+
    };
}

/// Rejections answer 200 with their message, everything else is logged and
/// answers 500.
pub fn error_response<R, F>(handler: &str, err: anyhow::Error, make: F) -> HttpResponse
where
    R: Serialize,
    F: FnOnce(String) -> R,
{
    match err.downcast_ref::<Rejection>() {
        Some(rejection) => {
            tracing::info!(handler, %rejection, "request rejected");
            HttpResponse::Ok().json(make(rejection.to_string()))
        }
        None => {
            tracing::error!(handler, error = ?err, "request failed");
            HttpResponse::InternalServerError().json(make(INTERNAL_ERROR.to_string()))
        }
    }
}

pub fn generate_login_token(id: &str, role: &str) -> String {
    let seed = format!(
        "{}:{}:{}:{:x}",
        role,
        id,
        Utc::now().naive_utc(),
        rand::random::<u64>()
    );
    format!("{:x}", Blake2b512::digest(seed.as_bytes()))
}

pub fn login_expired(login_time: &NaiveDateTime) -> bool {
    let time_diff = Utc::now().naive_utc().signed_duration_since(*login_time);
    time_diff.num_seconds() > MAX_LOGIN_TIME_SECS
}

/// Splits a manual edit value. An empty value means "clear the slot";
/// otherwise exactly two tokens separated by one space are required.
pub fn parse_occupant(value: &str) -> Result<Option<(&str, &str)>, Rejection> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    match value.split(' ').collect::<Vec<_>>().as_slice() {
        [surname, room] => Ok(Some((*surname, *room))),
        _ => Err(Rejection::BadOccupant),
    }
}
