use axum::{
    extract::{FromRef, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    auth::jwt::{JwtKeys, Principal},
    error::ApiError,
    state::AppState,
    store::{OwnerStore, UserStore},
};

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Exchange a refresh token for a new access/refresh pair. Works for
/// both owner and user tokens; the principal type carries over.
#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys
        .verify_refresh(&payload.refresh_token)
        .map_err(|_| ApiError::Unauthorized("Invalid or expired token".into()))?;

    // Re-check the account still exists and is active before re-issuing.
    match claims.principal {
        Principal::Owner => {
            state
                .owners
                .find_by_id(claims.sub)
                .await?
                .filter(|o| o.is_active)
                .ok_or_else(|| ApiError::Unauthorized("Account not available".into()))?;
        }
        Principal::User => {
            state
                .users
                .find_by_id(claims.sub)
                .await?
                .filter(|u| u.is_active)
                .ok_or_else(|| ApiError::Unauthorized("Account not available".into()))?;
        }
    }

    Ok(Json(TokenPair {
        access_token: keys.sign_access(claims.sub, claims.principal)?,
        refresh_token: keys.sign_refresh(claims.sub, claims.principal)?,
    }))
}
