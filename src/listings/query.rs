use uuid::Uuid;

use super::dto::{OwnerListingParams, SearchParams};
use super::model::{Gender, RoomType};
use crate::error::ApiError;
use crate::store::{Field, ListingQuery, Predicate, SortKey, SortOrder, Value};

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Page slice after clamping: page >= 1, limit in 1..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlice {
    pub page: i64,
    pub limit: i64,
}

impl PageSlice {
    pub fn clamp(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

fn parse_amenities(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect()
}

/// Gender narrowing: a non-"both" request matches listings of that
/// gender or of "both"; requesting "both" applies no narrowing at all.
fn gender_predicate(gender: Gender) -> Option<Predicate> {
    match gender {
        Gender::Both => None,
        g => Some(Predicate::AnyOf(vec![
            Predicate::Eq(Field::Gender, Value::Text(g.as_str().to_string())),
            Predicate::Eq(Field::Gender, Value::Text(Gender::Both.as_str().to_string())),
        ])),
    }
}

/// Translate the public search criteria into a predicate set over
/// active listings. Every supplied dimension ANDs; OR exists only
/// inside the search group and the amenity overlap.
pub fn build_public_query(params: &SearchParams) -> Result<(ListingQuery, PageSlice), ApiError> {
    let slice = PageSlice::clamp(params.page, params.limit);
    let mut errors = Vec::new();
    let mut predicates = vec![Predicate::Eq(Field::IsActive, Value::Bool(true))];

    if let Some(city) = params.city.as_deref().filter(|c| !c.is_empty()) {
        predicates.push(Predicate::ContainsFold(Field::City, city.to_string()));
    }

    if let Some(raw) = params.gender.as_deref().filter(|g| !g.is_empty()) {
        match Gender::parse(raw) {
            Some(g) => {
                if let Some(p) = gender_predicate(g) {
                    predicates.push(p);
                }
            }
            None => errors.push("Gender filter must be one of: male, female, both".to_string()),
        }
    }

    if let Some(min) = params.min_price {
        predicates.push(Predicate::Gte(Field::Price, min));
    }
    if let Some(max) = params.max_price {
        predicates.push(Predicate::Lte(Field::Price, max));
    }

    if let Some(raw) = params.room_type.as_deref().filter(|r| !r.is_empty()) {
        match RoomType::parse(raw) {
            Some(rt) => predicates.push(Predicate::Eq(
                Field::RoomType,
                Value::Text(rt.as_str().to_string()),
            )),
            None => errors.push(
                "Room type filter must be one of: single, double, triple, dormitory".to_string(),
            ),
        }
    }

    if let Some(raw) = params.amenities.as_deref() {
        let tags = parse_amenities(raw);
        if !tags.is_empty() {
            predicates.push(Predicate::Overlaps(Field::Amenities, tags));
        }
    }

    if let Some(needle) = params.search.as_deref().filter(|s| !s.is_empty()) {
        predicates.push(Predicate::AnyOf(vec![
            Predicate::ContainsFold(Field::Name, needle.to_string()),
            Predicate::ContainsFold(Field::Location, needle.to_string()),
            Predicate::ContainsFold(Field::City, needle.to_string()),
        ]));
    }

    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    Ok((
        ListingQuery {
            predicates,
            sort_key: params.sort_by.as_deref().map(SortKey::parse).unwrap_or_default(),
            sort_order: params
                .sort_order
                .as_deref()
                .map(SortOrder::parse)
                .unwrap_or_default(),
            limit: slice.limit,
            offset: slice.offset(),
        },
        slice,
    ))
}

/// Owner-scoped variant: pinned to one owner, status filter instead
/// of the global active-only constraint.
pub fn build_owner_query(
    owner_id: Uuid,
    params: &OwnerListingParams,
) -> Result<(ListingQuery, PageSlice), ApiError> {
    let slice = PageSlice::clamp(params.page, params.limit);
    let mut predicates = vec![Predicate::Eq(Field::OwnerId, Value::Id(owner_id))];

    match params.status.as_deref().unwrap_or("all") {
        "all" => {}
        "active" => predicates.push(Predicate::Eq(Field::IsActive, Value::Bool(true))),
        "inactive" => predicates.push(Predicate::Eq(Field::IsActive, Value::Bool(false))),
        _ => {
            return Err(ApiError::Validation(vec![
                "Status filter must be one of: all, active, inactive".to_string(),
            ]))
        }
    }

    if let Some(city) = params.city.as_deref().filter(|c| !c.is_empty()) {
        predicates.push(Predicate::ContainsFold(Field::City, city.to_string()));
    }

    Ok((
        ListingQuery {
            predicates,
            sort_key: params.sort_by.as_deref().map(SortKey::parse).unwrap_or_default(),
            sort_order: params
                .sort_order
                .as_deref()
                .map(SortOrder::parse)
                .unwrap_or_default(),
            limit: slice.limit,
            offset: slice.offset(),
        },
        slice,
    ))
}
