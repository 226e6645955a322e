use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::model::{Owner, VerificationStatus};

#[derive(Debug, Deserialize)]
pub struct RegisterOwnerRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile update allow-list. Email, password and verification status
/// are deliberately absent; they move through dedicated paths only.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateOwnerRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub business_name: Option<String>,
    pub business_address: Option<String>,
    pub profile_image: Option<String>,
}

/// Outbound owner shape. Built from the record, so the password hash
/// physically cannot appear here.
#[derive(Debug, Serialize)]
pub struct OwnerProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub business_name: Option<String>,
    pub business_address: Option<String>,
    pub verification_status: VerificationStatus,
    pub profile_image: Option<String>,
    pub is_active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Owner> for OwnerProfile {
    fn from(o: Owner) -> Self {
        Self {
            id: o.id,
            name: o.name,
            email: o.email,
            phone: o.phone,
            business_name: o.business_name,
            business_address: o.business_address,
            verification_status: o.verification_status,
            profile_image: o.profile_image,
            is_active: o.is_active,
            created_at: o.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct OwnerAuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub owner: OwnerProfile,
}

// --- dashboard shapes ---

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingCounts {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    pub recently_added: i64,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomStats {
    pub total: i64,
    pub available: i64,
    pub occupied: i64,
    /// Rendered as e.g. "52%".
    pub occupancy_rate: String,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PriceStats {
    pub average: i64,
    pub minimum: f64,
    pub maximum: f64,
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CityRooms {
    pub city: String,
    pub listings: i64,
    pub total_rooms: i64,
    pub available_rooms: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analytics {
    pub listings: ListingCounts,
    pub rooms: RoomStats,
    pub pricing: PriceStats,
    pub locations: Vec<CityRooms>,
    pub gender_distribution: BTreeMap<String, i64>,
}

#[derive(Debug, Serialize)]
pub struct RecentListing {
    pub id: Uuid,
    pub name: String,
    pub city: String,
    pub price: f64,
    pub available_rooms: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub owner: OwnerProfile,
    pub analytics: Analytics,
    #[serde(rename = "recentListings")]
    pub recent_listings: Vec<RecentListing>,
}

// --- business metrics shapes ---

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CityPerformance {
    pub city: String,
    pub listings: i64,
    pub total_rooms: i64,
    pub occupied_rooms: i64,
    pub revenue: f64,
    pub occupancy_rate: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessMetrics {
    pub monthly_revenue: i64,
    pub total_properties: i64,
    pub verification_status: VerificationStatus,
    pub city_performance: Vec<CityPerformance>,
}
