use time::OffsetDateTime;
use tracing::{info, warn};
use uuid::Uuid;

use super::analytics::{business_metrics, dashboard_analytics};
use super::dto::{
    BusinessMetrics, DashboardResponse, LoginRequest, OwnerAuthResponse, OwnerProfile,
    RegisterOwnerRequest, UpdateOwnerRequest,
};
use super::model::{NewOwner, Owner};
use crate::auth::jwt::is_valid_email;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::{JwtKeys, Principal};
use crate::error::ApiError;
use crate::listings::dto::ListingStatus;
use crate::store::{Field, ListingStore, OwnerStore, Predicate, SortKey, SortOrder, Value};

pub fn validate_owner_registration(req: &RegisterOwnerRequest) -> Vec<String> {
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

pub fn validate_owner_update(req: &UpdateOwnerRequest) -> Vec<String> {
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
    if let Some(business_name) = &req.business_name {
        if business_name.trim().len() < 2 {
            errors.push("Business name must be at least 2 characters long".to_string());
        }
    }
    if let Some(business_address) = &req.business_address {
        if business_address.len() > 1000 {
            errors.push("Business address must not exceed 1000 characters".to_string());
        }
    }
    errors
}

fn token_pair(keys: &JwtKeys, owner: Owner) -> Result<OwnerAuthResponse, ApiError> {
    Ok(OwnerAuthResponse {
        access_token: keys.sign_access(owner.id, Principal::Owner)?,
        refresh_token: keys.sign_refresh(owner.id, Principal::Owner)?,
        owner: owner.into(),
    })
}

/// Register a new owner account. Email is normalized to lowercase and
/// must be unused. A fresh token pair comes back with the profile.
pub async fn register(
    store: &dyn OwnerStore,
    keys: &JwtKeys,
    mut req: RegisterOwnerRequest,
) -> Result<OwnerAuthResponse, ApiError> {
    req.email = req.email.trim().to_lowercase();
    let errors = validate_owner_registration(&req);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    if store.find_by_email(&req.email).await?.is_some() {
        warn!(email = %req.email, "owner email already registered");
        return Err(ApiError::Conflict(
            "Owner with this email already exists".to_string(),
        ));
    }

    let owner = store
        .insert(NewOwner {
            name: req.name,
            email: req.email,
            password_hash: hash_password(&req.password)?,
        })
        .await?;
    info!(owner_id = %owner.id, "owner registered");
    token_pair(keys, owner)
}

/// Authenticate an owner. Unknown email and wrong password are the
/// same outcome, so a caller cannot probe which emails exist.
pub async fn login(
    store: &dyn OwnerStore,
    keys: &JwtKeys,
    req: LoginRequest,
) -> Result<OwnerAuthResponse, ApiError> {
    let email = req.email.trim().to_lowercase();
    let owner = store.find_by_email(&email).await?.ok_or_else(|| {
        ApiError::Unauthorized("Invalid email or password".to_string())
    })?;

    if !verify_password(&req.password, &owner.password_hash)? {
        warn!(owner_id = %owner.id, "owner login failed: bad password");
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }
    if !owner.is_active {
        return Err(ApiError::Unauthorized(
            "Account is deactivated. Please contact support.".to_string(),
        ));
    }

    info!(owner_id = %owner.id, "owner logged in");
    token_pair(keys, owner)
}

pub async fn get_profile(store: &dyn OwnerStore, owner_id: Uuid) -> Result<OwnerProfile, ApiError> {
    let owner = store
        .find_by_id(owner_id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(owner.into())
}

/// Update the owner profile through the allow-list DTO. Unknown or
/// sensitive fields never reach this function.
pub async fn update_profile(
    store: &dyn OwnerStore,
    owner_id: Uuid,
    req: UpdateOwnerRequest,
) -> Result<OwnerProfile, ApiError> {
    let errors = validate_owner_update(&req);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let mut owner = store
        .find_by_id(owner_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    if let Some(name) = req.name {
        owner.name = name;
    }
    if let Some(phone) = req.phone {
        owner.phone = Some(phone);
    }
    if let Some(business_name) = req.business_name {
        owner.business_name = Some(business_name);
    }
    if let Some(business_address) = req.business_address {
        owner.business_address = Some(business_address);
    }
    if let Some(profile_image) = req.profile_image {
        owner.profile_image = Some(profile_image);
    }

    let saved = store.update(&owner).await?;
    info!(owner_id = %saved.id, "owner profile updated");
    Ok(saved.into())
}

/// Toggle a listing's visibility. Only the true owner can flip the
/// flag; a compound-key miss never reveals whether the listing
/// exists. Setting the current value again is a no-op, not an error.
pub async fn update_listing_status(
    listings: &dyn ListingStore,
    owner_id: Uuid,
    listing_id: Uuid,
    is_active: bool,
) -> Result<ListingStatus, ApiError> {
    let mut listing = listings
        .find_one(&[
            Predicate::Eq(Field::Id, Value::Id(listing_id)),
            Predicate::Eq(Field::OwnerId, Value::Id(owner_id)),
        ])
        .await?
        .ok_or(ApiError::NotFound)?;

    listing.is_active = is_active;
    let saved = listings.update(&listing).await?;
    info!(listing_id = %saved.id, owner_id = %owner_id, is_active, "listing status updated");
    Ok(ListingStatus {
        id: saved.id,
        name: saved.name,
        is_active: saved.is_active,
    })
}

/// Owner dashboard: one read of the owner's full listing set, one
/// fold over it. Failure anywhere aborts the whole snapshot; partial
/// metrics are never returned.
pub async fn dashboard(
    owners: &dyn OwnerStore,
    listings: &dyn ListingStore,
    owner_id: Uuid,
) -> Result<DashboardResponse, ApiError> {
    let owner = owners
        .find_by_id(owner_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let rows = listings
        .find_all(
            &[Predicate::Eq(Field::OwnerId, Value::Id(owner_id))],
            SortKey::CreatedAt,
            SortOrder::Desc,
        )
        .await?;

    let (analytics, recent_listings) = dashboard_analytics(&rows, OffsetDateTime::now_utc());
    Ok(DashboardResponse {
        owner: owner.into(),
        analytics,
        recent_listings,
    })
}

/// Business performance view over the same raw listing set.
pub async fn metrics(
    owners: &dyn OwnerStore,
    listings: &dyn ListingStore,
    owner_id: Uuid,
) -> Result<BusinessMetrics, ApiError> {
    let owner = owners
        .find_by_id(owner_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    let rows = listings
        .find_all(
            &[Predicate::Eq(Field::OwnerId, Value::Id(owner_id))],
            SortKey::CreatedAt,
            SortOrder::Desc,
        )
        .await?;

    Ok(business_metrics(&rows, owner.verification_status))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listings::service::test_support::ListingFixture;
    use crate::store::memory::MemStore;
    use jsonwebtoken::{DecodingKey, EncodingKey};
    use time::Duration;

    fn test_keys() -> JwtKeys {
        JwtKeys {
            encoding: EncodingKey::from_secret(b"dev-secret"),
            decoding: DecodingKey::from_secret(b"dev-secret"),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            access_ttl: std::time::Duration::from_secs(300),
            refresh_ttl: std::time::Duration::from_secs(3600),
        }
    }

    async fn registered_owner(store: &MemStore) -> Owner {
        let auth = register(
            store,
            &test_keys(),
            RegisterOwnerRequest {
                name: "Asha".into(),
                email: "Asha@Example.com".into(),
                password: "secret-pass".into(),
            },
        )
        .await
        .unwrap();
        OwnerStore::find_by_id(store, auth.owner.id)
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn register_normalizes_email_and_rejects_duplicates() {
        let store = MemStore::new();
        let owner = registered_owner(&store).await;
        assert_eq!(owner.email, "asha@example.com");

        let err = register(
            &store,
            &test_keys(),
            RegisterOwnerRequest {
                name: "Other".into(),
                email: "ASHA@example.com".into(),
                password: "another-pass".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[tokio::test]
    async fn registration_validation_collects_all_errors() {
        let store = MemStore::new();
        let err = register(
            &store,
            &test_keys(),
            RegisterOwnerRequest {
                name: "A".into(),
                email: "bad-email".into(),
                password: "short".into(),
            },
        )
        .await
        .unwrap_err();
        match err {
            ApiError::Validation(errors) => assert_eq!(errors.len(), 3),
            other => panic!("expected validation error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn login_issues_tokens_for_valid_credentials() {
        let store = MemStore::new();
        let keys = test_keys();
        let owner = registered_owner(&store).await;

        let auth = login(
            &store,
            &keys,
            LoginRequest {
                email: "asha@example.com".into(),
                password: "secret-pass".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(auth.owner.id, owner.id);
        let claims = keys.verify(&auth.access_token).unwrap();
        assert_eq!(claims.sub, owner.id);
        assert_eq!(claims.principal, Principal::Owner);
        keys.verify_refresh(&auth.refresh_token).unwrap();
    }

    #[tokio::test]
    async fn login_rejects_bad_password_and_unknown_email_alike() {
        let store = MemStore::new();
        let keys = test_keys();
        registered_owner(&store).await;

        for (email, password) in [
            ("asha@example.com", "wrong-pass"),
            ("nobody@example.com", "secret-pass"),
        ] {
            let err = login(
                &store,
                &keys,
                LoginRequest {
                    email: email.into(),
                    password: password.into(),
                },
            )
            .await
            .unwrap_err();
            match err {
                ApiError::Unauthorized(msg) => {
                    assert_eq!(msg, "Invalid email or password")
                }
                other => panic!("expected unauthorized: {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn login_rejects_deactivated_account() {
        let store = MemStore::new();
        let keys = test_keys();
        let mut owner = registered_owner(&store).await;
        owner.is_active = false;
        OwnerStore::update(&store, &owner).await.unwrap();

        let err = login(
            &store,
            &keys,
            LoginRequest {
                email: "asha@example.com".into(),
                password: "secret-pass".into(),
            },
        )
        .await
        .unwrap_err();
        match err {
            ApiError::Unauthorized(msg) => {
                assert_eq!(msg, "Account is deactivated. Please contact support.")
            }
            other => panic!("expected unauthorized: {other:?}"),
        }
    }

    #[tokio::test]
    async fn status_toggle_is_owner_guarded_and_idempotent() {
        let store = MemStore::new();
        let owner = registered_owner(&store).await;
        let listing = ListingFixture::default().build(owner.id, "Sunrise");
        let listing_id = listing.id;
        store.seed_listing(listing);

        let err = update_listing_status(&store, Uuid::new_v4(), listing_id, false)
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound));

        let off = update_listing_status(&store, owner.id, listing_id, false)
            .await
            .unwrap();
        assert!(!off.is_active);
        assert_eq!(off.name, "Sunrise");

        // same value again: same observable state, no error
        let again = update_listing_status(&store, owner.id, listing_id, false)
            .await
            .unwrap();
        assert!(!again.is_active);

        let on = update_listing_status(&store, owner.id, listing_id, true)
            .await
            .unwrap();
        assert!(on.is_active);
    }

    #[tokio::test]
    async fn dashboard_covers_full_listing_set() {
        let store = MemStore::new();
        let owner = registered_owner(&store).await;
        let other = register(
            &store,
            &test_keys(),
            RegisterOwnerRequest {
                name: "Birju".into(),
                email: "birju@example.com".into(),
                password: "secret-pass".into(),
            },
        )
        .await
        .unwrap();

        let base = OffsetDateTime::now_utc();
        store.seed_listing(
            ListingFixture {
                city: "Pune",
                total_rooms: 10,
                available_rooms: 4,
                created_at: base,
                ..Default::default()
            }
            .build(owner.id, "Pune A"),
        );
        store.seed_listing(
            ListingFixture {
                city: "Pune",
                total_rooms: 6,
                available_rooms: 6,
                is_active: false,
                created_at: base - Duration::days(1),
                ..Default::default()
            }
            .build(owner.id, "Pune B"),
        );
        store.seed_listing(
            ListingFixture {
                city: "Delhi",
                total_rooms: 5,
                available_rooms: 0,
                created_at: base - Duration::days(2),
                ..Default::default()
            }
            .build(owner.id, "Delhi A"),
        );
        // another owner's listing must not leak in
        store.seed_listing(ListingFixture::default().build(other.owner.id, "Elsewhere"));

        let dash = dashboard(&store, &store, owner.id).await.unwrap();
        assert_eq!(dash.analytics.listings.total, 3);
        assert_eq!(dash.analytics.listings.active, 2);
        assert_eq!(dash.analytics.listings.inactive, 1);
        assert_eq!(dash.analytics.rooms.total, 21);
        assert_eq!(dash.analytics.rooms.occupied, 11);
        assert_eq!(dash.analytics.rooms.occupancy_rate, "52%");
        assert_eq!(dash.recent_listings[0].name, "Pune A");
        assert_eq!(dash.owner.id, owner.id);
    }

    #[tokio::test]
    async fn dashboard_for_unknown_owner_is_not_found() {
        let store = MemStore::new();
        let err = dashboard(&store, &store, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[tokio::test]
    async fn metrics_include_verification_status() {
        let store = MemStore::new();
        let owner = registered_owner(&store).await;
        store.seed_listing(
            ListingFixture {
                total_rooms: 4,
                available_rooms: 1,
                price: 2000,
                ..Default::default()
            }
            .build(owner.id, "Sunrise"),
        );

        let m = metrics(&store, &store, owner.id).await.unwrap();
        assert_eq!(m.monthly_revenue, 6000);
        assert_eq!(m.total_properties, 1);
        assert_eq!(
            m.verification_status,
            crate::owners::model::VerificationStatus::Pending
        );
    }

    #[tokio::test]
    async fn profile_update_applies_only_supplied_fields() {
        let store = MemStore::new();
        let owner = registered_owner(&store).await;
        let updated = update_profile(
            &store,
            owner.id,
            UpdateOwnerRequest {
                business_name: Some("Asha Stays".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.business_name.as_deref(), Some("Asha Stays"));
        assert_eq!(updated.name, "Asha");

        let err = update_profile(
            &store,
            owner.id,
            UpdateOwnerRequest {
                phone: Some("123".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
