//! Pooled SQLite connection

use di::inject;
use di::injectable;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use std::env;
use std::ops::{Deref, DerefMut};
use std::sync::Mutex;

/// When set, every `DatabaseConnection` resolved from the provider wraps
/// this pool instead of opening one from `DATABASE_URL`. Integration
/// tests use it to point the whole service at a throwaway database.
static TEST_POOL: Mutex<Option<SqlitePool>> = Mutex::new(None);

pub struct DatabaseConnection {
    connection: SqlitePool,
}

#[injectable]
impl DatabaseConnection {
    #[inject]
    pub fn create() -> DatabaseConnection {
        if let Ok(guard) = TEST_POOL.lock() {
            if let Some(pool) = guard.clone() {
                return DatabaseConnection { connection: pool };
            }
        }

        dotenvy::dotenv().ok();
        let connection_string = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_lazy(&connection_string)
            .expect("Cannot connect to database");

        DatabaseConnection { connection: pool }
    }

    pub fn set_test_pool(pool: SqlitePool) {
        if let Ok(mut guard) = TEST_POOL.lock() {
            *guard = Some(pool);
        }
    }

    pub fn clear_test_pool() {
        if let Ok(mut guard) = TEST_POOL.lock() {
            guard.take();
        }
    }
}

impl Deref for DatabaseConnection {
    type Target = SqlitePool;

    fn deref(&self) -> &Self::Target {
        &self.connection
    }
}

impl DerefMut for DatabaseConnection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.connection
    }
}
