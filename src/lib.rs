use sqlx::{Pool, Postgres};

pub mod auth;
pub mod config;
pub mod handler;
pub mod middleware;
pub mod model;
pub mod route;
pub mod schema;

pub use config::Config;
pub use route::create_router;

// Struct representing the application state
pub struct AppState {
    pub db: Pool<Postgres>,
    pub config: Config,
}

// Creates the two tables if they don't exist. There is no migration
// versioning; the schema is fixed.
pub async fn init_schema(pool: &Pool<Postgres>) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS users (
        id SERIAL PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        hashed_password TEXT NOT NULL
    );"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS todos (
        id SERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        created_at TIMESTAMPTZ NOT NULL,
        due_date TIMESTAMPTZ,
        completed BOOLEAN NOT NULL DEFAULT FALSE,
        owner_id INTEGER NOT NULL REFERENCES users(id)
    );"#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
