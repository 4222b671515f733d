//! Shared helpers for store-backed tests.

use tempfile::tempdir;

use super::{build_pool, init::init_database};
use crate::DbPool;

/// Opens a fresh, schema-initialized and seeded database in a temporary
/// directory.
pub fn create_test_pool() -> DbPool {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.db");
    let pool = build_pool(path.to_str().unwrap(), 4).unwrap();
    init_database(&pool).unwrap();

    // Keep the directory alive for the rest of the test run
    std::mem::forget(dir);

    pool
}
