use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Who a listing accepts. `Both` doubles as "no preference" on the
/// search side: a listing marked `both` matches any requested gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Both,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Both => "both",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "both" => Some(Gender::Both),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Single,
    Double,
    Triple,
    Dormitory,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Single => "single",
            RoomType::Double => "double",
            RoomType::Triple => "triple",
            RoomType::Dormitory => "dormitory",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "single" => Some(RoomType::Single),
            "double" => Some(RoomType::Double),
            "triple" => Some(RoomType::Triple),
            "dormitory" => Some(RoomType::Dormitory),
            _ => None,
        }
    }
}

/// One rentable PG property as stored. Invariants enforced at
/// validation time and by schema checks: price > 0 and
/// 0 <= available_rooms <= total_rooms.
#[derive(Debug, Clone)]
pub struct Listing {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub location: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub price: Decimal,
    pub security_deposit: Option<Decimal>,
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
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Listing {
    pub fn occupied_rooms(&self) -> i32 {
        self.total_rooms - self.available_rooms
    }
}

/// Field set accepted by `ListingStore::insert`. The store fills in
/// id and timestamps.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub owner_id: Uuid,
    pub name: String,
    pub location: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub price: Decimal,
    pub security_deposit: Option<Decimal>,
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
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
}
