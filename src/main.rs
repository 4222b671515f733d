#[macro_use]
extern crate diesel;

mod admin;
mod config;
mod database;
mod error;
mod export;
mod grid;
mod models;
mod protocol;
mod schema;
mod time_slot;
mod user;
mod utils;

use actix_web::{middleware, web, App, HttpServer};
use anyhow::Context;
use diesel::{r2d2::ConnectionManager, SqliteConnection};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::AppConfig;

type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;

fn init_logger() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());

    let subscriber = tracing_subscriber::fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_target(false);

    tracing_subscriber::registry()
        .with(subscriber)
        .with(env_filter)
        .try_init()?;

    Ok(())
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logger()?;

    let config = AppConfig::new()?;
    let pool = database::build_pool(&config.database_url, config.pool_size)?;
    database::init::init_database(&pool)?;

    let bind = config.bind.clone();
    tracing::info!(%bind, database = %config.database_url, "starting server");

    let pool = web::Data::new(pool);
    let config = web::Data::new(config);
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(pool.clone())
            .app_data(config.clone())
            .configure(user::config)
            .configure(admin::config)
    })
    .bind(&bind)
    .with_context(|| format!("Failed to bind {}", bind))?
    .run()
    .await
    .context("Server error")
}
