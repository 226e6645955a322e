use super::dto::{CreateListingRequest, UpdateListingRequest};
use super::model::{Gender, RoomType};

pub const MSG_NAME: &str = "PG name must be at least 3 characters long";
pub const MSG_LOCATION: &str = "Location must be at least 5 characters long";
pub const MSG_PRICE: &str = "Price must be a valid positive number";
pub const MSG_GENDER: &str = "Gender must be one of: male, female, both";
pub const MSG_CITY: &str = "City is required and must be at least 2 characters";
pub const MSG_ROOM_TYPE: &str = "Room type must be one of: single, double, triple, dormitory";
pub const MSG_ROOMS: &str = "Available rooms cannot exceed total rooms";

/// Create-path validation. All violations are collected so the
/// caller can render every one, in a stable order.
pub fn validate_new_listing(req: &CreateListingRequest) -> Vec<String> {
    let mut errors = Vec::new();

    if req.name.trim().len() < 3 {
        errors.push(MSG_NAME.to_string());
    }
    if req.location.trim().len() < 5 {
        errors.push(MSG_LOCATION.to_string());
    }
    if !req.price.is_finite() || req.price <= 0.0 {
        errors.push(MSG_PRICE.to_string());
    }
    if Gender::parse(&req.gender).is_none() {
        errors.push(MSG_GENDER.to_string());
    }
    if req.city.trim().len() < 2 {
        errors.push(MSG_CITY.to_string());
    }
    if let Some(rt) = &req.room_type {
        if RoomType::parse(rt).is_none() {
            errors.push(MSG_ROOM_TYPE.to_string());
        }
    }
    let total = req.total_rooms.unwrap_or(1);
    let available = req.available_rooms.unwrap_or(1);
    if available < 0 || total < 1 || available > total {
        errors.push(MSG_ROOMS.to_string());
    }

    errors
}

/// Update-path validation: only supplied fields are checked.
pub fn validate_listing_update(req: &UpdateListingRequest) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(name) = &req.name {
        if name.trim().len() < 3 {
            errors.push(MSG_NAME.to_string());
        }
    }
    if let Some(location) = &req.location {
        if location.trim().len() < 5 {
            errors.push(MSG_LOCATION.to_string());
        }
    }
    if let Some(price) = req.price {
        if !price.is_finite() || price <= 0.0 {
            errors.push(MSG_PRICE.to_string());
        }
    }
    if let Some(gender) = &req.gender {
        if Gender::parse(gender).is_none() {
            errors.push(MSG_GENDER.to_string());
        }
    }
    if let Some(city) = &req.city {
        if city.trim().len() < 2 {
            errors.push(MSG_CITY.to_string());
        }
    }
    if let Some(rt) = &req.room_type {
        if RoomType::parse(rt).is_none() {
            errors.push(MSG_ROOM_TYPE.to_string());
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateListingRequest {
        CreateListingRequest {
            name: "Sunrise Residency".into(),
            location: "Near FC Road, Shivajinagar".into(),
            address: None,
            city: "Pune".into(),
            state: None,
            pincode: None,
            price: 5000.0,
            security_deposit: None,
            amenities: vec![],
            gender: "both".into(),
            room_type: None,
            available_rooms: None,
            total_rooms: None,
            images: vec![],
            description: None,
            rules: vec![],
            contact_phone: None,
            contact_email: None,
            wifi: false,
            parking: false,
            laundry: false,
            food_included: false,
            ac: false,
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn valid_listing_has_no_errors() {
        assert!(validate_new_listing(&valid_request()).is_empty());
    }

    #[test]
    fn all_violations_reported_in_stable_order() {
        let req = CreateListingRequest {
            name: "ab".into(),
            location: "shrt".into(),
            price: -1.0,
            gender: "x".into(),
            city: "A".into(),
            ..valid_request()
        };
        let errors = validate_new_listing(&req);
        assert_eq!(
            errors,
            vec![
                MSG_NAME.to_string(),
                MSG_LOCATION.to_string(),
                MSG_PRICE.to_string(),
                MSG_GENDER.to_string(),
                MSG_CITY.to_string(),
            ]
        );
    }

    #[test]
    fn nan_price_is_rejected() {
        let req = CreateListingRequest {
            price: f64::NAN,
            ..valid_request()
        };
        assert_eq!(validate_new_listing(&req), vec![MSG_PRICE.to_string()]);
    }

    #[test]
    fn available_rooms_cannot_exceed_total() {
        let req = CreateListingRequest {
            available_rooms: Some(7),
            total_rooms: Some(6),
            ..valid_request()
        };
        assert_eq!(validate_new_listing(&req), vec![MSG_ROOMS.to_string()]);
    }

    #[test]
    fn update_checks_only_supplied_fields() {
        let req = UpdateListingRequest {
            price: Some(4500.0),
            ..Default::default()
        };
        assert!(validate_listing_update(&req).is_empty());

        let bad = UpdateListingRequest {
            name: Some("ab".into()),
            gender: Some("unknown".into()),
            ..Default::default()
        };
        assert_eq!(
            validate_listing_update(&bad),
            vec![MSG_NAME.to_string(), MSG_GENDER.to_string()]
        );
    }
}
