use std::env;

use anyhow::Context;

pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl AdminCredentials {
    /// Plaintext comparison of a submitted username/password pair.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        self.username == username && self.password == password
    }
}

pub struct AppConfig {
    pub database_url: String,
    pub bind: String,
    pub pool_size: u32,
    pub admin: AdminCredentials,
}

impl AppConfig {
    pub fn new() -> anyhow::Result<Self> {
        let pool_size = match env::var("DB_POOL_SIZE") {
            Ok(size) => size.parse::<u32>().context("DB_POOL_SIZE must be a number")?,
            Err(_) => 8,
        };

        Ok(Self {
            database_url: var_or("DATABASE_URL", "laundry.db"),
            bind: var_or("BIND_ADDR", "127.0.0.1:8080"),
            pool_size,
            admin: AdminCredentials {
                username: var_or("ADMIN_USERNAME", "admin"),
                password: var_or("ADMIN_PASSWORD", "admin123"),
            },
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

#[cfg(test)]
impl AppConfig {
    pub fn for_test(database_url: String) -> Self {
        Self {
            database_url,
            bind: "127.0.0.1:0".to_string(),
            pool_size: 4,
            admin: AdminCredentials {
                username: "admin".to_string(),
                password: "admin123".to_string(),
            },
        }
    }
}
