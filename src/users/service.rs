use std::sync::Arc;

use time::{Date, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::error::AppError;
use crate::users::repo::UserStore;
use crate::users::repo_types::{NewUser, User, UserStatus};

const LOGIN_REJECTED: &str =
    "Sorry, your username or password was incorrect. Please double-check your credentials";

/// Owns the user lifecycle: registration, login, profile edits and
/// presence. All validation happens here; handlers only translate between
/// HTTP and these methods.
#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        self.store.find_all().await
    }

    pub async fn get_profile(&self, id: i64) -> Result<User, AppError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user with id {} was not found", id)))
    }

    /// Register a new user. Token, status and creation date are assigned
    /// here, never by the caller; the generated id comes back from the
    /// store.
    pub async fn create(
        &self,
        username: String,
        password: String,
        birthday: Option<Date>,
    ) -> Result<User, AppError> {
        if self.store.find_by_username(&username).await?.is_some() {
            return Err(AppError::Conflict(
                "add User failed because username already exists".into(),
            ));
        }

        let created = self
            .store
            .insert(NewUser {
                username,
                password,
                token: Uuid::new_v4(),
                status: UserStatus::Online,
                creation_date: OffsetDateTime::now_utc().date(),
                birthday,
            })
            .await?;

        debug!(user_id = created.id, username = %created.username, "created user");
        Ok(created)
    }

    /// Authenticate by exact username/password match. A failed lookup and a
    /// wrong password are deliberately indistinguishable to the caller.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, AppError> {
        let user = match self.store.find_by_username(username).await? {
            Some(user) if user.password == password => user,
            _ => return Err(AppError::BadRequest(LOGIN_REJECTED.into())),
        };

        let user = User {
            status: UserStatus::Online,
            ..user
        };
        let user = self.store.update(&user).await?;

        debug!(user_id = user.id, username = %user.username, "user logged in");
        Ok(user)
    }

    /// Apply profile changes. Only provided fields are touched; a username
    /// equal to the current one is a no-op rather than a uniqueness
    /// violation against the user itself.
    pub async fn edit_profile(
        &self,
        id: i64,
        username: Option<String>,
        birthday: Option<Date>,
    ) -> Result<User, AppError> {
        let mut user = self
            .store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user with id {} was not found", id)))?;

        if let Some(new_username) = username {
            if new_username != user.username {
                if self.store.find_by_username(&new_username).await?.is_some() {
                    return Err(AppError::BadRequest(
                        "The username provided is not unique. Therefore, the username could not be changed!".into(),
                    ));
                }
                user.username = new_username;
            }
        }

        if let Some(new_birthday) = birthday {
            user.birthday = Some(new_birthday);
        }

        let user = self.store.update(&user).await?;
        debug!(user_id = user.id, "user profile updated");
        Ok(user)
    }

    /// Mark the user offline. Unknown ids are a silent no-op.
    pub async fn logout(&self, id: i64) -> Result<(), AppError> {
        if let Some(user) = self.store.find_by_id(id).await? {
            let user = User {
                status: UserStatus::Offline,
                ..user
            };
            self.store.update(&user).await?;
            debug!(user_id = id, "user logged out");
        }
        Ok(())
    }
}
