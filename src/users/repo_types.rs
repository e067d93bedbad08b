use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::Date;
use uuid::Uuid;

/// Online/offline presence of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(type_name = "user_status", rename_all = "UPPERCASE")]
pub enum UserStatus {
    Online,
    Offline,
}

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,                     // store-assigned, immutable
    pub username: String,            // unique across all users
    pub password: String,            // stored verbatim, never serialized
    pub token: Uuid,                 // assigned once at creation, never reissued
    pub status: UserStatus,
    pub creation_date: Date,         // set once at creation
    pub birthday: Option<Date>,
}

/// Fields of a user before the store has assigned an id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub token: Uuid,
    pub status: UserStatus,
    pub creation_date: Date,
    pub birthday: Option<Date>,
}
