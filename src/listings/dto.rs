use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::model::{Gender, Listing, RoomType};

pub(crate) fn decimal_to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

/// Public search query string. Typed deserialization rejects
/// malformed numeric filters before they reach the query engine.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub city: Option<String>,
    pub gender: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub room_type: Option<String>,
    /// Comma-separated amenity tags.
    pub amenities: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Owner-scoped listing query string.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerListingParams {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// all | active | inactive
    pub status: Option<String>,
    pub city: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateListingRequest {
    pub name: String,
    pub location: String,
    pub address: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub price: f64,
    pub security_deposit: Option<f64>,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub gender: String,
    pub room_type: Option<String>,
    pub available_rooms: Option<i32>,
    pub total_rooms: Option<i32>,
    #[serde(default)]
    pub images: Vec<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub rules: Vec<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    #[serde(default)]
    pub wifi: bool,
    #[serde(default)]
    pub parking: bool,
    #[serde(default)]
    pub laundry: bool,
    #[serde(default)]
    pub food_included: bool,
    #[serde(default)]
    pub ac: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Partial update. The field set is the allow-list: anything not
/// named here (owner_id, is_active, timestamps) cannot be set
/// through this path.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct UpdateListingRequest {
    pub name: Option<String>,
    pub location: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub price: Option<f64>,
    pub security_deposit: Option<f64>,
    pub amenities: Option<Vec<String>>,
    pub gender: Option<String>,
    pub room_type: Option<String>,
    pub available_rooms: Option<i32>,
    pub total_rooms: Option<i32>,
    pub images: Option<Vec<String>>,
    pub description: Option<String>,
    pub rules: Option<Vec<String>>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub wifi: Option<bool>,
    pub parking: Option<bool>,
    pub laundry: Option<bool>,
    pub food_included: Option<bool>,
    pub ac: Option<bool>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Outbound listing shape. Decimals are coerced to plain numbers and
/// the array fields always serialize, empty when unset.
#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub location: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub price: f64,
    pub security_deposit: Option<f64>,
    pub amenities: Vec<String>,
    pub gender: Gender,
    pub room_type: RoomType,
    pub available_rooms: i32,
    pub total_rooms: i32,
    pub images: Vec<String>,
    pub description: String,
    pub rules: Vec<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub wifi: bool,
    pub parking: bool,
    pub laundry: bool,
    pub food_included: bool,
    pub ac: bool,
    pub is_active: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Listing> for ListingResponse {
    fn from(l: Listing) -> Self {
        Self {
            id: l.id,
            owner_id: l.owner_id,
            name: l.name,
            location: l.location,
            address: l.address,
            city: l.city,
            state: l.state,
            pincode: l.pincode,
            price: decimal_to_f64(l.price),
            security_deposit: l.security_deposit.map(decimal_to_f64),
            amenities: l.amenities,
            gender: l.gender,
            room_type: l.room_type,
            available_rooms: l.available_rooms,
            total_rooms: l.total_rooms,
            images: l.images,
            description: l.description,
            rules: l.rules,
            contact_phone: l.contact_phone,
            contact_email: l.contact_email,
            wifi: l.wifi,
            parking: l.parking,
            laundry: l.laundry,
            food_included: l.food_included,
            ac: l.ac,
            is_active: l.is_active,
            latitude: l.latitude.map(decimal_to_f64),
            longitude: l.longitude.map(decimal_to_f64),
            created_at: l.created_at,
            updated_at: l.updated_at,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        let total_pages = if limit > 0 {
            (total + limit - 1) / limit
        } else {
            0
        };
        Self {
            total,
            page,
            limit,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListingPage {
    #[serde(rename = "pgListings")]
    pub pg_listings: Vec<ListingResponse>,
    pub pagination: Pagination,
}

/// Minimal projection returned by the status toggle.
#[derive(Debug, Serialize)]
pub struct ListingStatus {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub is_active: bool,
}
