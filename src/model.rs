use chrono::{DateTime, Utc};

// Data model representing a registered user
#[derive(Debug, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
pub struct User {
    pub(crate) id: i32,
    pub(crate) username: String,
    // Never serialized into responses
    #[serde(skip_serializing)]
    pub(crate) hashed_password: String,
}

// Data model representing a Todo item
#[derive(Debug, sqlx::FromRow, serde::Serialize, serde::Deserialize)]
pub struct Todo {
    pub(crate) id: i32,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) due_date: Option<DateTime<Utc>>,
    pub(crate) completed: bool,
    pub(crate) owner_id: i32,
}

// Authenticated identity resolved by the auth middleware
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub(crate) id: i32,
    pub(crate) username: String,
}
