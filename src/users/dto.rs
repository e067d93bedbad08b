use serde::{Deserialize, Serialize};
use time::Date;

use crate::users::repo_types::{User, UserStatus};

// Calendar dates travel as "YYYY-MM-DD" on the wire.
time::serde::format_description!(date_format, Date, "[year]-[month]-[day]");

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(default, with = "date_format::option")]
    pub birthday: Option<Date>,
}

/// Request body for login.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Request body for profile edits. Absent fields are left untouched.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    #[serde(default, with = "date_format::option")]
    pub birthday: Option<Date>,
}

/// Public projection of a user; password and token never leave the server.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    #[serde(with = "date_format")]
    pub creation_date: Date,
    pub status: UserStatus,
    #[serde(with = "date_format::option")]
    pub birthday: Option<Date>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            creation_date: user.creation_date,
            status: user.status,
            birthday: user.birthday,
        }
    }
}
