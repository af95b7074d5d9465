pub mod contacts;
pub mod courses;
pub mod faqs;
pub mod labs;
pub mod modules;
pub mod topics;

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::error::{AppError, FieldErrors};

/// Opens the pool with foreign keys enforced. An in-memory database is pinned to a
/// single long-lived connection, since every new connection would see an empty schema.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let in_memory = database_url.contains(":memory:");
    let mut pool = SqlitePoolOptions::new().max_connections(if in_memory { 1 } else { max_connections });
    if in_memory {
        pool = pool.idle_timeout(None).max_lifetime(None);
    }
    pool.connect_with(options).await
}

pub async fn migrate(db: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(db).await
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

/// Rejection for a parent reference that points nowhere.
pub(crate) fn missing_parent(field: &str, id: i64) -> AppError {
    AppError::Validation(FieldErrors::single(
        field,
        format!("Invalid pk \"{}\" - object does not exist.", id),
    ))
}

/// Escapes `%`, `_` and `\` for a `LIKE ... ESCAPE '\'` pattern.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[cfg(test)]
pub(crate) async fn setup_test_db() -> SqlitePool {
    let pool = connect("sqlite::memory:", 1)
        .await
        .expect("Failed to create test db");

    migrate(&pool).await.expect("Failed to run migrations");

    pool
}
