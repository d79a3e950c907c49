use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,                     // unique user ID
    pub full_name: String,            // display name
    pub username: String,             // login handle, stored lowercase
    pub email: String,                // user email, stored lowercase
    #[serde(skip_serializing)]
    pub password_hash: String,        // Argon2 hash, not exposed in JSON
    pub recent_score: Option<String>, // latest quiz score, e.g. "80%"
    pub created_at: OffsetDateTime,   // creation timestamp
    pub updated_at: OffsetDateTime,   // last modification timestamp
}

/// Fields required to insert a user. The hash is produced by the caller.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}
