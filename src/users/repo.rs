use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::users::repo_types::{NewUser, User};

/// Persistence boundary for user records. Implementations must make every
/// mutation durable before returning.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// All users in store order (ascending id).
    async fn find_all(&self) -> Result<Vec<User>, AppError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Insert a new user and return it with the store-assigned id.
    async fn insert(&self, user: NewUser) -> Result<User, AppError>;

    /// Overwrite the record with the same id and return the stored state.
    async fn update(&self, user: &User) -> Result<User, AppError>;
}

pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, token, status, creation_date, birthday
            FROM users
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(users)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, token, status, creation_date, birthday
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, token, status, creation_date, birthday
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;
        Ok(user)
    }

    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        // The unique index on username backstops the service-level pre-check
        // when two creations race.
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password, token, status, creation_date, birthday)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, password, token, status, creation_date, birthday
            "#,
        )
        .bind(&user.username)
        .bind(&user.password)
        .bind(user.token)
        .bind(user.status)
        .bind(user.creation_date)
        .bind(user.birthday)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("add User failed because username already exists".into())
            } else {
                AppError::Database(e)
            }
        })?;
        Ok(user)
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = $2, password = $3, token = $4, status = $5,
                creation_date = $6, birthday = $7
            WHERE id = $1
            RETURNING id, username, password, token, status, creation_date, birthday
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password)
        .bind(user.token)
        .bind(user.status)
        .bind(user.creation_date)
        .bind(user.birthday)
        .fetch_optional(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::BadRequest(
                    "The username provided is not unique. Therefore, the username could not be changed!".into(),
                )
            } else {
                AppError::Database(e)
            }
        })?;

        updated.ok_or_else(|| AppError::NotFound(format!("user with id {} was not found", user.id)))
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .map(|db| db.is_unique_violation())
        .unwrap_or(false)
}

/// In-memory substitute for the Postgres store. Ids are assigned
/// sequentially from 1, matching BIGSERIAL.
#[derive(Default)]
pub struct InMemoryUserStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    next_id: i64,
    users: BTreeMap<i64, User>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_all(&self) -> Result<Vec<User>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, AppError> {
        let mut inner = self.inner.lock().await;
        if inner.users.values().any(|u| u.username == user.username) {
            return Err(AppError::Conflict(
                "add User failed because username already exists".into(),
            ));
        }

        inner.next_id += 1;
        let stored = User {
            id: inner.next_id,
            username: user.username,
            password: user.password,
            token: user.token,
            status: user.status,
            creation_date: user.creation_date,
            birthday: user.birthday,
        };
        inner.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update(&self, user: &User) -> Result<User, AppError> {
        let mut inner = self.inner.lock().await;
        if !inner.users.contains_key(&user.id) {
            return Err(AppError::NotFound(format!(
                "user with id {} was not found",
                user.id
            )));
        }
        if inner
            .users
            .values()
            .any(|u| u.id != user.id && u.username == user.username)
        {
            return Err(AppError::BadRequest(
                "The username provided is not unique. Therefore, the username could not be changed!".into(),
            ));
        }
        inner.users.insert(user.id, user.clone());
        Ok(user.clone())
    }
}
