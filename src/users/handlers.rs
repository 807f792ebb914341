use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use crate::{
    error::{required, ApiError, ApiResult},
    extract::ApiJson,
    state::AppState,
    users::{
        dto::{CreateUserRequest, CreatedUserResponse, MessageResponse},
        repo_types::{Preferences, User},
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/:name", get(get_user))
        .route(
            "/users/:name/preferences",
            get(get_preferences).put(update_preferences),
        )
}

fn not_found(name: &str) -> ApiError {
    ApiError::NotFound(format!("user {name} not found"))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<CreatedUserResponse>)> {
    let name = required(payload.name, "name")?;

    let user = state.store.create_user(&name).await?;

    info!(name = %user.name, "user created");
    Ok((
        StatusCode::CREATED,
        Json(CreatedUserResponse { name: user.name }),
    ))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<User>> {
    let user = state
        .store
        .find_user(&name)
        .await?
        .ok_or_else(|| not_found(&name))?;
    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn get_preferences(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<Preferences>> {
    let user = state
        .store
        .find_user(&name)
        .await?
        .ok_or_else(|| not_found(&name))?;
    Ok(Json(user.preferences))
}

/// Replaces the whole document; concurrent writers race with last-write-wins.
#[instrument(skip(state, preferences))]
pub async fn update_preferences(
    State(state): State<AppState>,
    Path(name): Path<String>,
    ApiJson(preferences): ApiJson<Preferences>,
) -> ApiResult<Json<MessageResponse>> {
    if !state.store.replace_preferences(&name, &preferences).await? {
        return Err(not_found(&name));
    }
    info!(%name, "preferences updated");
    Ok(Json(MessageResponse {
        message: "preferences updated".into(),
    }))
}
