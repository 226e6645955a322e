use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{
    BusinessMetrics, DashboardResponse, LoginRequest, OwnerAuthResponse, OwnerProfile,
    RegisterOwnerRequest, UpdateOwnerRequest,
};
use super::service;
use crate::auth::{AuthOwner, JwtKeys};
use crate::error::ApiError;
use crate::listings::dto::{ListingPage, ListingStatus, OwnerListingParams, UpdateStatusRequest};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/owners/register", post(register))
        .route("/owners/login", post(login))
        .route("/owners/me", get(get_profile).patch(update_profile))
        .route("/owners/me/pg-listings", get(list_own))
        .route(
            "/owners/me/pg-listings/:id/status",
            patch(update_listing_status),
        )
        .route("/owners/me/dashboard", get(dashboard))
        .route("/owners/me/metrics", get(metrics))
}

#[instrument(skip(state, keys, payload))]
async fn register(
    State(state): State<AppState>,
    State(keys): State<JwtKeys>,
    Json(payload): Json<RegisterOwnerRequest>,
) -> Result<(StatusCode, Json<OwnerAuthResponse>), ApiError> {
    let auth = service::register(state.owners.as_ref(), &keys, payload).await?;
    Ok((StatusCode::CREATED, Json(auth)))
}

#[instrument(skip(state, keys, payload))]
async fn login(
    State(state): State<AppState>,
    State(keys): State<JwtKeys>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<OwnerAuthResponse>, ApiError> {
    let auth = service::login(state.owners.as_ref(), &keys, payload).await?;
    Ok(Json(auth))
}

#[instrument(skip(state))]
async fn get_profile(
    State(state): State<AppState>,
    AuthOwner(owner_id): AuthOwner,
) -> Result<Json<OwnerProfile>, ApiError> {
    let profile = service::get_profile(state.owners.as_ref(), owner_id).await?;
    Ok(Json(profile))
}

#[instrument(skip(state, payload))]
async fn update_profile(
    State(state): State<AppState>,
    AuthOwner(owner_id): AuthOwner,
    Json(payload): Json<UpdateOwnerRequest>,
) -> Result<Json<OwnerProfile>, ApiError> {
    let profile = service::update_profile(state.owners.as_ref(), owner_id, payload).await?;
    Ok(Json(profile))
}

#[instrument(skip(state))]
async fn list_own(
    State(state): State<AppState>,
    AuthOwner(owner_id): AuthOwner,
    Query(params): Query<OwnerListingParams>,
) -> Result<Json<ListingPage>, ApiError> {
    let page =
        crate::listings::service::search_owned(state.listings.as_ref(), owner_id, &params).await?;
    Ok(Json(page))
}

#[instrument(skip(state, payload))]
async fn update_listing_status(
    State(state): State<AppState>,
    AuthOwner(owner_id): AuthOwner,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<ListingStatus>, ApiError> {
    let status = service::update_listing_status(
        state.listings.as_ref(),
        owner_id,
        id,
        payload.is_active,
    )
    .await?;
    Ok(Json(status))
}

#[instrument(skip(state))]
async fn dashboard(
    State(state): State<AppState>,
    AuthOwner(owner_id): AuthOwner,
) -> Result<Json<DashboardResponse>, ApiError> {
    let dash =
        service::dashboard(state.owners.as_ref(), state.listings.as_ref(), owner_id).await?;
    Ok(Json(dash))
}

#[instrument(skip(state))]
async fn metrics(
    State(state): State<AppState>,
    AuthOwner(owner_id): AuthOwner,
) -> Result<Json<BusinessMetrics>, ApiError> {
    let m = service::metrics(state.owners.as_ref(), state.listings.as_ref(), owner_id).await?;
    Ok(Json(m))
}
