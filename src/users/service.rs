use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{
    LoginRequest, RegisterUserRequest, UpdateUserRequest, UserAuthResponse, UserProfile,
};
use super::model::{NewUser, User};
use crate::auth::jwt::is_valid_email;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::{JwtKeys, Principal};
use crate::error::ApiError;
use crate::store::UserStore;

pub fn validate_user_registration(req: &RegisterUserRequest) -> Vec<String> {
    let mut errors = Vec::new();
    if req.name.trim().len() < 2 {
        errors.push("Name must be at least 2 characters long".to_string());
    }
    if !is_valid_email(req.email.trim()) {
        errors.push("Please provide a valid email address".to_string());
    }
    if req.password.len() < 6 {
        errors.push("Password must be at least 6 characters long".to_string());
    }
    errors
}

pub fn validate_user_update(req: &UpdateUserRequest) -> Vec<String> {
    let mut errors = Vec::new();
    if let Some(name) = &req.name {
        if name.trim().len() < 2 {
            errors.push("Name must be at least 2 characters long".to_string());
        }
    }
    if let Some(phone) = &req.phone {
        if phone.len() < 10 {
            errors.push("Phone number must be at least 10 digits".to_string());
        }
    }
    if let Some(gender) = &req.gender {
        if !matches!(gender.to_lowercase().as_str(), "male" | "female" | "other") {
            errors.push("Gender must be male, female or other".to_string());
        }
    }
    errors
}

fn token_pair(keys: &JwtKeys, user: User) -> Result<UserAuthResponse, ApiError> {
    Ok(UserAuthResponse {
        access_token: keys.sign_access(user.id, Principal::User)?,
        refresh_token: keys.sign_refresh(user.id, Principal::User)?,
        user: user.into(),
    })
}

pub async fn register(
    store: &dyn UserStore,
    keys: &JwtKeys,
    mut req: RegisterUserRequest,
) -> Result<UserAuthResponse, ApiError> {
    req.email = req.email.trim().to_lowercase();
    let errors = validate_user_registration(&req);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    if store.find_by_email(&req.email).await?.is_some() {
        warn!(email = %req.email, "user email already registered");
        return Err(ApiError::Conflict(
            "User with this email already exists".to_string(),
        ));
    }

    let user = store
        .insert(NewUser {
            name: req.name,
            email: req.email,
            password_hash: hash_password(&req.password)?,
        })
        .await?;
    info!(user_id = %user.id, "user registered");
    token_pair(keys, user)
}

pub async fn login(
    store: &dyn UserStore,
    keys: &JwtKeys,
    req: LoginRequest,
) -> Result<UserAuthResponse, ApiError> {
    let email = req.email.trim().to_lowercase();
    let user = store.find_by_email(&email).await?.ok_or_else(|| {
        ApiError::Unauthorized("Invalid email or password".to_string())
    })?;

    if !verify_password(&req.password, &user.password_hash)? {
        warn!(user_id = %user.id, "user login failed: bad password");
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }
    if !user.is_active {
        return Err(ApiError::Unauthorized(
            "Account is deactivated. Please contact support.".to_string(),
        ));
    }

    info!(user_id = %user.id, "user logged in");
    token_pair(keys, user)
}

pub async fn get_profile(store: &dyn UserStore, user_id: Uuid) -> Result<UserProfile, ApiError> {
    let user = store.find_by_id(user_id).await?.ok_or(ApiError::NotFound)?;
    Ok(user.into())
}

pub async fn update_profile(
    store: &dyn UserStore,
    user_id: Uuid,
    req: UpdateUserRequest,
) -> Result<UserProfile, ApiError> {
    let errors = validate_user_update(&req);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let mut user = store.find_by_id(user_id).await?.ok_or(ApiError::NotFound)?;

    if let Some(name) = req.name {
        user.name = name;
    }
    if let Some(phone) = req.phone {
        user.phone = Some(phone);
    }
    if let Some(gender) = req.gender {
        user.gender = Some(gender.to_lowercase());
    }
    if let Some(occupation) = req.occupation {
        user.occupation = Some(occupation);
    }
    if let Some(profile_image) = req.profile_image {
        user.profile_image = Some(profile_image);
    }

    let saved = store.update(&user).await?;
    info!(user_id = %saved.id, "user profile updated");
    Ok(saved.into())
}
