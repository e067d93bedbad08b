use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};

use crate::error::AppError;
use crate::state::AppState;
use crate::users::dto::{CreateUserRequest, LoginRequest, UpdateUserRequest, UserResponse};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/:id", get(get_user).put(update_user))
}

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/user-logins", post(login_user))
        .route("/user-logouts/:id", put(logout_user))
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserResponse>>, AppError> {
    let users = state.users.list().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, AppError> {
    let user = state.users.get_profile(id).await?;
    Ok(Json(user.into()))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = state
        .users
        .create(payload.username, payload.password, payload.birthday)
        .await?;

    info!(user_id = user.id, username = %user.username, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn login_user(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<(StatusCode, Json<UserResponse>), AppError> {
    let user = state
        .users
        .login(&payload.username, &payload.password)
        .await?;

    info!(user_id = user.id, username = %user.username, "user logged in");
    Ok((StatusCode::CREATED, Json(user.into())))
}

// Reports success with 205 and no body; the updated record stays server-side.
#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<StatusCode, AppError> {
    state
        .users
        .edit_profile(id, payload.username, payload.birthday)
        .await?;
    Ok(StatusCode::RESET_CONTENT)
}

#[instrument(skip(state))]
pub async fn logout_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.users.logout(id).await?;
    Ok(StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::repo_types::UserStatus;

    fn create_request(username: &str, password: &str) -> Json<CreateUserRequest> {
        Json(CreateUserRequest {
            username: username.into(),
            password: password.into(),
            birthday: None,
        })
    }

    #[tokio::test]
    async fn lifecycle_over_handlers() {
        let state = AppState::in_memory();

        // register
        let (status, Json(created)) =
            create_user(State(state.clone()), create_request("alice", "p1"))
                .await
                .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.id, 1);
        assert_eq!(created.status, UserStatus::Online);

        // duplicate registration is a conflict
        let err = create_user(State(state.clone()), create_request("alice", "p2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // login
        let (status, Json(user)) = login_user(
            State(state.clone()),
            Json(LoginRequest {
                username: "alice".into(),
                password: "p1".into(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(user.id, created.id);

        // rename
        let status = update_user(
            State(state.clone()),
            Path(created.id),
            Json(UpdateUserRequest {
                username: Some("alice2".into()),
                birthday: None,
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::RESET_CONTENT);

        let Json(profile) = get_user(State(state.clone()), Path(created.id)).await.unwrap();
        assert_eq!(profile.username, "alice2");

        // logout, then logout of a missing id still succeeds
        let status = logout_user(State(state.clone()), Path(created.id))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::OK);
        let status = logout_user(State(state.clone()), Path(999)).await.unwrap();
        assert_eq!(status, StatusCode::OK);

        let Json(profile) = get_user(State(state.clone()), Path(created.id)).await.unwrap();
        assert_eq!(profile.status, UserStatus::Offline);

        let Json(all) = list_users(State(state)).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn get_user_of_unknown_id_is_not_found() {
        let state = AppState::in_memory();
        let err = get_user(State(state), Path(42)).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn login_with_bad_credentials_is_rejected() {
        let state = AppState::in_memory();
        create_user(State(state.clone()), create_request("alice", "p1"))
            .await
            .unwrap();

        let err = login_user(
            State(state),
            Json(LoginRequest {
                username: "alice".into(),
                password: "wrong".into(),
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
