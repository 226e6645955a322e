use rust_decimal::prelude::ToPrimitive;
use uuid::Uuid;

use crate::listings::model::Listing;

/// Columns a predicate may touch. Closed set so caller input can
/// never name a column directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    OwnerId,
    IsActive,
    Name,
    Location,
    City,
    Gender,
    RoomType,
    Price,
    Amenities,
}

impl Field {
    pub fn column(&self) -> &'static str {
        match self {
            Field::Id => "id",
            Field::OwnerId => "owner_id",
            Field::IsActive => "is_active",
            Field::Name => "name",
            Field::Location => "location",
            Field::City => "city",
            Field::Gender => "gender",
            Field::RoomType => "room_type",
            Field::Price => "price",
            Field::Amenities => "amenities",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    Bool(bool),
    Id(Uuid),
}

/// One filter condition. A query is a list of these, combined with
/// AND; OR only ever appears inside an `AnyOf` group.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// field = value
    Eq(Field, Value),
    /// lower(field) = lower(value)
    EqFold(Field, String),
    /// field >= bound
    Gte(Field, f64),
    /// field <= bound
    Lte(Field, f64),
    /// lower(field) contains lower(needle)
    ContainsFold(Field, String),
    /// array field shares at least one element with the given set
    Overlaps(Field, Vec<String>),
    /// OR group
    AnyOf(Vec<Predicate>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    CreatedAt,
    Price,
    Name,
}

impl SortKey {
    pub fn column(&self) -> &'static str {
        match self {
            SortKey::CreatedAt => "created_at",
            SortKey::Price => "price",
            SortKey::Name => "name",
        }
    }

    /// Unknown keys fall back to the default rather than erroring,
    /// matching the lenient query-string contract.
    pub fn parse(s: &str) -> Self {
        match s {
            "price" => SortKey::Price,
            "name" => SortKey::Name,
            _ => SortKey::CreatedAt,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    pub fn parse(s: &str) -> Self {
        if s.eq_ignore_ascii_case("asc") {
            SortOrder::Asc
        } else {
            SortOrder::Desc
        }
    }
}

/// Complete listing query: conjunctive predicates, sort, page slice.
#[derive(Debug, Clone)]
pub struct ListingQuery {
    pub predicates: Vec<Predicate>,
    pub sort_key: SortKey,
    pub sort_order: SortOrder,
    pub limit: i64,
    pub offset: i64,
}

fn text_field<'a>(listing: &'a Listing, field: Field) -> Option<&'a str> {
    match field {
        Field::Name => Some(&listing.name),
        Field::Location => Some(&listing.location),
        Field::City => Some(&listing.city),
        Field::Gender => Some(listing.gender.as_str()),
        Field::RoomType => Some(listing.room_type.as_str()),
        _ => None,
    }
}

impl Predicate {
    /// In-memory evaluation, semantically identical to the SQL the
    /// Postgres store compiles. Used by `MemStore` and unit tests.
    pub fn matches(&self, listing: &Listing) -> bool {
        match self {
            Predicate::Eq(field, value) => match (field, value) {
                (Field::Id, Value::Id(id)) => listing.id == *id,
                (Field::OwnerId, Value::Id(id)) => listing.owner_id == *id,
                (Field::IsActive, Value::Bool(b)) => listing.is_active == *b,
                (field, Value::Text(t)) => text_field(listing, *field) == Some(t.as_str()),
                _ => false,
            },
            Predicate::EqFold(field, value) => text_field(listing, *field)
                .map(|v| v.eq_ignore_ascii_case(value))
                .unwrap_or(false),
            Predicate::Gte(Field::Price, bound) => {
                listing.price.to_f64().map(|p| p >= *bound).unwrap_or(false)
            }
            Predicate::Lte(Field::Price, bound) => {
                listing.price.to_f64().map(|p| p <= *bound).unwrap_or(false)
            }
            Predicate::Gte(_, _) | Predicate::Lte(_, _) => false,
            Predicate::ContainsFold(field, needle) => text_field(listing, *field)
                .map(|v| v.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false),
            Predicate::Overlaps(Field::Amenities, wanted) => wanted
                .iter()
                .any(|w| listing.amenities.iter().any(|a| a == w)),
            Predicate::Overlaps(_, _) => false,
            Predicate::AnyOf(preds) => preds.iter().any(|p| p.matches(listing)),
        }
    }
}
