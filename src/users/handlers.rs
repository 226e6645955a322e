use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::instrument;

use super::dto::{
    LoginRequest, RegisterUserRequest, UpdateUserRequest, UserAuthResponse, UserProfile,
};
use super::service;
use crate::auth::{AuthUser, JwtKeys};
use crate::error::ApiError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register))
        .route("/users/login", post(login))
        .route("/users/me", get(get_profile).patch(update_profile))
}

#[instrument(skip(state, keys, payload))]
async fn register(
    State(state): State<AppState>,
    State(keys): State<JwtKeys>,
    Json(payload): Json<RegisterUserRequest>,
) -> Result<(StatusCode, Json<UserAuthResponse>), ApiError> {
    let auth = service::register(state.users.as_ref(), &keys, payload).await?;
    Ok((StatusCode::CREATED, Json(auth)))
}

#[instrument(skip(state, keys, payload))]
async fn login(
    State(state): State<AppState>,
    State(keys): State<JwtKeys>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<UserAuthResponse>, ApiError> {
    let auth = service::login(state.users.as_ref(), &keys, payload).await?;
    Ok(Json(auth))
}

#[instrument(skip(state))]
async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = service::get_profile(state.users.as_ref(), user_id).await?;
    Ok(Json(profile))
}

#[instrument(skip(state, payload))]
async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = service::update_profile(state.users.as_ref(), user_id, payload).await?;
    Ok(Json(profile))
}
