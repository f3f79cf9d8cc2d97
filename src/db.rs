use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

pub async fn init_db(database_url: &str) -> SqlitePool {
    let options = SqliteConnectOptions::from_str(database_url)
        .expect("Invalid DATABASE_URL")
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .connect_with(options)
        .await
        .expect("Failed to connect to database")
}

/// The (student_id, date) unique constraint is what makes the duplicate
/// check-then-insert race safe: a lost race surfaces as a constraint
/// violation, never a second row.
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS students (
        student_id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        class_name TEXT NOT NULL,
        section TEXT NOT NULL DEFAULT 'A',
        guardian_email TEXT,
        photo_path TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS attendance (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        student_id TEXT NOT NULL REFERENCES students (student_id),
        date TEXT NOT NULL,
        timestamp TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'Present',
        source TEXT NOT NULL DEFAULT 'QRScan',
        location TEXT,
        device_id TEXT,
        UNIQUE (student_id, date)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS classes (
        class_id TEXT PRIMARY KEY,
        class_name TEXT NOT NULL,
        teacher_id TEXT,
        schedule TEXT
    )
    "#,
];

pub async fn init_schema(pool: &SqlitePool) -> anyhow::Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}

/// Single-connection in-memory pool; more than one connection would each see
/// their own empty database.
#[cfg(test)]
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");
    init_schema(&pool).await.expect("Failed to create schema");
    pool
}
