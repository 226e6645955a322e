pub mod handlers;
pub mod jwt;
pub mod password;

use crate::state::AppState;
use axum::{routing::post, Router};

pub use jwt::{AuthOwner, AuthUser, JwtKeys, Principal};

pub fn router() -> Router<AppState> {
    Router::new().route("/auth/refresh", post(handlers::refresh))
}
