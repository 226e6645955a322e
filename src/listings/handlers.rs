use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use super::dto::{
    CreateListingRequest, ListingPage, ListingResponse, SearchParams, UpdateListingRequest,
};
use super::service;
use crate::{auth::AuthOwner, error::ApiError, images, state::AppState};

pub fn read_router() -> Router<AppState> {
    Router::new()
        .route("/pg-listings", get(search_listings))
        .route("/pg-listings/:id", get(get_listing))
        .route("/pg-listings/name/:name", get(get_listing_by_name))
}

pub fn write_router() -> Router<AppState> {
    Router::new()
        .route("/pg-listings", post(create_listing))
        .route("/pg-listings/:id", patch(update_listing))
        .route("/pg-listings/:id/images", post(attach_images))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024))
}

#[instrument(skip(state))]
pub async fn search_listings(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ListingPage>, ApiError> {
    let page = service::search_public(state.listings.as_ref(), &params).await?;
    Ok(Json(page))
}

#[instrument(skip(state))]
pub async fn get_listing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ListingResponse>, ApiError> {
    let listing = service::get_by_id(state.listings.as_ref(), id).await?;
    Ok(Json(listing))
}

#[instrument(skip(state))]
pub async fn get_listing_by_name(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ListingResponse>, ApiError> {
    let listing = service::get_by_name(state.listings.as_ref(), &name).await?;
    Ok(Json(listing))
}

#[instrument(skip(state, payload))]
pub async fn create_listing(
    State(state): State<AppState>,
    AuthOwner(owner_id): AuthOwner,
    Json(payload): Json<CreateListingRequest>,
) -> Result<(StatusCode, Json<ListingResponse>), ApiError> {
    let listing = service::add_listing(
        state.listings.as_ref(),
        state.owners.as_ref(),
        owner_id,
        payload,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(listing)))
}

#[instrument(skip(state, payload))]
pub async fn update_listing(
    State(state): State<AppState>,
    AuthOwner(owner_id): AuthOwner,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateListingRequest>,
) -> Result<Json<ListingResponse>, ApiError> {
    let listing = service::update_listing(state.listings.as_ref(), owner_id, id, payload).await?;
    Ok(Json(listing))
}

/// POST /pg-listings/:id/images (multipart field `pg_images`).
/// Uploads the files and appends their URLs to the listing.
#[instrument(skip(state, multipart))]
pub async fn attach_images(
    State(state): State<AppState>,
    AuthOwner(owner_id): AuthOwner,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<Json<ListingResponse>, ApiError> {
    let mut files = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().map(|s| s.to_string());
        if name.as_deref() == Some("pg_images") || name.as_deref() == Some("pg_images[]") {
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".into());
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(vec![format!("invalid upload: {e}")]))?;
            files.push(images::service::UploadItem {
                body: data,
                content_type,
            });
        }
    }
    if files.is_empty() {
        return Err(ApiError::Validation(vec![
            "pg_images[] is required".to_string(),
        ]));
    }

    let listing =
        images::service::attach_listing_images(&state, owner_id, id, files).await?;
    Ok(Json(listing))
}
