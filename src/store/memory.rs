use std::cmp::Ordering;
use std::sync::Mutex;

use anyhow::Context;
use axum::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{ListingQuery, ListingStore, OwnerStore, Predicate, SortKey, SortOrder, UserStore};
use crate::listings::model::{Listing, NewListing};
use crate::owners::model::{NewOwner, Owner, VerificationStatus};
use crate::users::model::{NewUser, User};

/// In-memory store applying the same predicate semantics the
/// Postgres adapter compiles to SQL. Sorting is stable, so rows with
/// equal keys keep insertion order.
#[derive(Default)]
pub struct MemStore {
    listings: Mutex<Vec<Listing>>,
    owners: Mutex<Vec<Owner>>,
    users: Mutex<Vec<User>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully-specified listing row, bypassing defaults.
    /// Lets tests control timestamps and flags.
    pub fn seed_listing(&self, listing: Listing) {
        self.listings.lock().unwrap().push(listing);
    }

    pub fn seed_owner(&self, owner: Owner) {
        self.owners.lock().unwrap().push(owner);
    }
}

fn sort_listings(rows: &mut [Listing], sort_key: SortKey, sort_order: SortOrder) {
    rows.sort_by(|a, b| {
        let ord = match sort_key {
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::Price => a.price.cmp(&b.price),
            SortKey::Name => a.name.cmp(&b.name),
        };
        match sort_order {
            SortOrder::Asc => ord,
            SortOrder::Desc => ord.reverse(),
        }
    });
}

fn matches_all(listing: &Listing, predicates: &[Predicate]) -> bool {
    predicates.iter().all(|p| p.matches(listing))
}

#[async_trait]
impl ListingStore for MemStore {
    async fn find_page(&self, query: &ListingQuery) -> anyhow::Result<(Vec<Listing>, i64)> {
        let rows = self.listings.lock().unwrap();
        let mut matched: Vec<Listing> = rows
            .iter()
            .filter(|l| matches_all(l, &query.predicates))
            .cloned()
            .collect();
        let total = matched.len() as i64;
        sort_listings(&mut matched, query.sort_key, query.sort_order);

        let start = (query.offset.max(0) as usize).min(matched.len());
        let end = (start + query.limit.max(0) as usize).min(matched.len());
        Ok((matched[start..end].to_vec(), total))
    }

    async fn find_all(
        &self,
        predicates: &[Predicate],
        sort_key: SortKey,
        sort_order: SortOrder,
    ) -> anyhow::Result<Vec<Listing>> {
        let rows = self.listings.lock().unwrap();
        let mut matched: Vec<Listing> = rows
            .iter()
            .filter(|l| matches_all(l, predicates))
            .cloned()
            .collect();
        sort_listings(&mut matched, sort_key, sort_order);
        Ok(matched)
    }

    async fn find_one(&self, predicates: &[Predicate]) -> anyhow::Result<Option<Listing>> {
        let rows = self.listings.lock().unwrap();
        Ok(rows.iter().find(|l| matches_all(l, predicates)).cloned())
    }

    async fn insert(&self, new: NewListing) -> anyhow::Result<Listing> {
        let now = OffsetDateTime::now_utc();
        let listing = Listing {
            id: Uuid::new_v4(),
            owner_id: new.owner_id,
            name: new.name,
            location: new.location,
            address: new.address,
            city: new.city,
            state: new.state,
            pincode: new.pincode,
            price: new.price,
            security_deposit: new.security_deposit,
            amenities: new.amenities,
            gender: new.gender,
            room_type: new.room_type,
            available_rooms: new.available_rooms,
            total_rooms: new.total_rooms,
            images: new.images,
            description: new.description,
            rules: new.rules,
            contact_phone: new.contact_phone,
            contact_email: new.contact_email,
            wifi: new.wifi,
            parking: new.parking,
            laundry: new.laundry,
            food_included: new.food_included,
            ac: new.ac,
            is_active: true,
            latitude: new.latitude,
            longitude: new.longitude,
            created_at: now,
            updated_at: now,
        };
        self.listings.lock().unwrap().push(listing.clone());
        Ok(listing)
    }

    async fn update(&self, listing: &Listing) -> anyhow::Result<Listing> {
        let mut rows = self.listings.lock().unwrap();
        let slot = rows
            .iter_mut()
            .find(|l| l.id == listing.id)
            .context("listing row vanished during update")?;
        let mut updated = listing.clone();
        updated.updated_at = OffsetDateTime::now_utc();
        *slot = updated.clone();
        Ok(updated)
    }
}

#[async_trait]
impl OwnerStore for MemStore {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Owner>> {
        let rows = self.owners.lock().unwrap();
        Ok(rows.iter().find(|o| o.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Owner>> {
        let rows = self.owners.lock().unwrap();
        Ok(rows
            .iter()
            .find(|o| o.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert(&self, new: NewOwner) -> anyhow::Result<Owner> {
        let now = OffsetDateTime::now_utc();
        let owner = Owner {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            phone: None,
            business_name: None,
            business_address: None,
            verification_status: VerificationStatus::Pending,
            profile_image: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.owners.lock().unwrap().push(owner.clone());
        Ok(owner)
    }

    async fn update(&self, owner: &Owner) -> anyhow::Result<Owner> {
        let mut rows = self.owners.lock().unwrap();
        let slot = rows
            .iter_mut()
            .find(|o| o.id == owner.id)
            .context("owner row vanished during update")?;
        let mut updated = owner.clone();
        updated.updated_at = OffsetDateTime::now_utc();
        *slot = updated.clone();
        Ok(updated)
    }
}

#[async_trait]
impl UserStore for MemStore {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let rows = self.users.lock().unwrap();
        Ok(rows.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let rows = self.users.lock().unwrap();
        Ok(rows
            .iter()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert(&self, new: NewUser) -> anyhow::Result<User> {
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: Uuid::new_v4(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            phone: None,
            gender: None,
            occupation: None,
            profile_image: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.users.lock().unwrap().push(user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User) -> anyhow::Result<User> {
        let mut rows = self.users.lock().unwrap();
        let slot = rows
            .iter_mut()
            .find(|u| u.id == user.id)
            .context("user row vanished during update")?;
        let mut updated = user.clone();
        updated.updated_at = OffsetDateTime::now_utc();
        *slot = updated.clone();
        Ok(updated)
    }
}
