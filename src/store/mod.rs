pub mod memory;
pub mod pg;
pub mod predicate;

use axum::async_trait;
use uuid::Uuid;

use crate::listings::model::{Listing, NewListing};
use crate::owners::model::{NewOwner, Owner};
use crate::users::model::{NewUser, User};

pub use predicate::{Field, ListingQuery, Predicate, SortKey, SortOrder, Value};

/// Repository over the pg_listings table. Every component receives
/// its handle at construction; tests swap in `memory::MemStore`.
#[async_trait]
pub trait ListingStore: Send + Sync {
    /// One page plus the total matching count (findAndCount).
    async fn find_page(&self, query: &ListingQuery) -> anyhow::Result<(Vec<Listing>, i64)>;

    /// All rows matching the predicates, sorted, unpaginated. Used by
    /// the analytics fold, which needs the owner's full listing set.
    async fn find_all(
        &self,
        predicates: &[Predicate],
        sort_key: SortKey,
        sort_order: SortOrder,
    ) -> anyhow::Result<Vec<Listing>>;

    async fn find_one(&self, predicates: &[Predicate]) -> anyhow::Result<Option<Listing>>;

    async fn insert(&self, new: NewListing) -> anyhow::Result<Listing>;

    /// Persist every mutable column of the given row and bump
    /// updated_at. Returns the stored row.
    async fn update(&self, listing: &Listing) -> anyhow::Result<Listing>;
}

#[async_trait]
pub trait OwnerStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Owner>>;
    /// Case-insensitive email lookup.
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Owner>>;
    async fn insert(&self, new: NewOwner) -> anyhow::Result<Owner>;
    async fn update(&self, owner: &Owner) -> anyhow::Result<Owner>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn insert(&self, new: NewUser) -> anyhow::Result<User>;
    async fn update(&self, user: &User) -> anyhow::Result<User>;
}
