use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use super::dto::{
    CreateListingRequest, ListingPage, ListingResponse, OwnerListingParams, Pagination,
    SearchParams, UpdateListingRequest,
};
use super::model::{Gender, NewListing, RoomType};
use super::query::{build_owner_query, build_public_query};
use super::validate::{validate_listing_update, validate_new_listing, MSG_ROOMS};
use crate::error::ApiError;
use crate::store::{Field, ListingStore, OwnerStore, Predicate, Value};

fn price_decimal(value: f64) -> Decimal {
    Decimal::from_f64_retain(value).unwrap_or_default()
}

/// Public search: active listings only, filtered, sorted, paginated.
pub async fn search_public(
    store: &dyn ListingStore,
    params: &SearchParams,
) -> Result<ListingPage, ApiError> {
    let (query, slice) = build_public_query(params)?;
    let (listings, total) = store.find_page(&query).await?;
    Ok(ListingPage {
        pg_listings: listings.into_iter().map(ListingResponse::from).collect(),
        pagination: Pagination::new(total, slice.page, slice.limit),
    })
}

/// Owner's own listings: includes inactive, supports status filter.
pub async fn search_owned(
    store: &dyn ListingStore,
    owner_id: Uuid,
    params: &OwnerListingParams,
) -> Result<ListingPage, ApiError> {
    let (query, slice) = build_owner_query(owner_id, params)?;
    let (listings, total) = store.find_page(&query).await?;
    Ok(ListingPage {
        pg_listings: listings.into_iter().map(ListingResponse::from).collect(),
        pagination: Pagination::new(total, slice.page, slice.limit),
    })
}

pub async fn get_by_id(store: &dyn ListingStore, id: Uuid) -> Result<ListingResponse, ApiError> {
    let listing = store
        .find_one(&[
            Predicate::Eq(Field::Id, Value::Id(id)),
            Predicate::Eq(Field::IsActive, Value::Bool(true)),
        ])
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(listing.into())
}

pub async fn get_by_name(
    store: &dyn ListingStore,
    name: &str,
) -> Result<ListingResponse, ApiError> {
    let listing = store
        .find_one(&[
            Predicate::EqFold(Field::Name, name.to_string()),
            Predicate::Eq(Field::IsActive, Value::Bool(true)),
        ])
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(listing.into())
}

/// Create a listing for an authenticated owner. Validation runs
/// before any write; a missing owner account aborts the create.
pub async fn add_listing(
    listings: &dyn ListingStore,
    owners: &dyn OwnerStore,
    owner_id: Uuid,
    req: CreateListingRequest,
) -> Result<ListingResponse, ApiError> {
    let errors = validate_new_listing(&req);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    owners
        .find_by_id(owner_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    // Validation guarantees these parses succeed.
    let gender = Gender::parse(&req.gender)
        .ok_or_else(|| ApiError::internal(anyhow::anyhow!("gender slipped past validation")))?;
    let room_type = req
        .room_type
        .as_deref()
        .and_then(RoomType::parse)
        .unwrap_or(RoomType::Single);

    let new = NewListing {
        owner_id,
        address: req.address.unwrap_or_else(|| req.location.clone()),
        name: req.name,
        location: req.location,
        city: req.city,
        state: req.state.unwrap_or_else(|| "Unknown".to_string()),
        pincode: req.pincode.unwrap_or_else(|| "000000".to_string()),
        price: price_decimal(req.price),
        security_deposit: req.security_deposit.map(price_decimal),
        amenities: req.amenities,
        gender,
        room_type,
        available_rooms: req.available_rooms.unwrap_or(1),
        total_rooms: req.total_rooms.unwrap_or(1),
        images: req.images,
        description: req.description.unwrap_or_default(),
        rules: req.rules,
        contact_phone: req.contact_phone,
        contact_email: req.contact_email,
        wifi: req.wifi,
        parking: req.parking,
        laundry: req.laundry,
        food_included: req.food_included,
        ac: req.ac,
        latitude: req.latitude.map(price_decimal),
        longitude: req.longitude.map(price_decimal),
    };

    let saved = listings.insert(new).await?;
    info!(listing_id = %saved.id, owner_id = %owner_id, "listing created");
    Ok(saved.into())
}

/// Owner-scoped partial update. The compound (id, owner_id) lookup is
/// the ownership guard: a miss reads the same whether the listing is
/// absent or owned by someone else.
pub async fn update_listing(
    store: &dyn ListingStore,
    owner_id: Uuid,
    listing_id: Uuid,
    req: UpdateListingRequest,
) -> Result<ListingResponse, ApiError> {
    let errors = validate_listing_update(&req);
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let mut listing = store
        .find_one(&[
            Predicate::Eq(Field::Id, Value::Id(listing_id)),
            Predicate::Eq(Field::OwnerId, Value::Id(owner_id)),
        ])
        .await?
        .ok_or(ApiError::NotFound)?;

    if let Some(name) = req.name {
        listing.name = name;
    }
    if let Some(location) = req.location {
        listing.location = location;
    }
    if let Some(address) = req.address {
        listing.address = address;
    }
    if let Some(city) = req.city {
        listing.city = city;
    }
    if let Some(state) = req.state {
        listing.state = state;
    }
    if let Some(pincode) = req.pincode {
        listing.pincode = pincode;
    }
    if let Some(price) = req.price {
        listing.price = price_decimal(price);
    }
    if let Some(deposit) = req.security_deposit {
        listing.security_deposit = Some(price_decimal(deposit));
    }
    if let Some(amenities) = req.amenities {
        listing.amenities = amenities;
    }
    if let Some(gender) = req.gender.as_deref().and_then(Gender::parse) {
        listing.gender = gender;
    }
    if let Some(room_type) = req.room_type.as_deref().and_then(RoomType::parse) {
        listing.room_type = room_type;
    }
    if let Some(available) = req.available_rooms {
        listing.available_rooms = available;
    }
    if let Some(total) = req.total_rooms {
        listing.total_rooms = total;
    }
    if let Some(images) = req.images {
        listing.images = images;
    }
    if let Some(description) = req.description {
        listing.description = description;
    }
    if let Some(rules) = req.rules {
        listing.rules = rules;
    }
    if let Some(phone) = req.contact_phone {
        listing.contact_phone = Some(phone);
    }
    if let Some(email) = req.contact_email {
        listing.contact_email = Some(email);
    }
    if let Some(wifi) = req.wifi {
        listing.wifi = wifi;
    }
    if let Some(parking) = req.parking {
        listing.parking = parking;
    }
    if let Some(laundry) = req.laundry {
        listing.laundry = laundry;
    }
    if let Some(food_included) = req.food_included {
        listing.food_included = food_included;
    }
    if let Some(ac) = req.ac {
        listing.ac = ac;
    }
    if let Some(latitude) = req.latitude {
        listing.latitude = Some(price_decimal(latitude));
    }
    if let Some(longitude) = req.longitude {
        listing.longitude = Some(price_decimal(longitude));
    }

    // Occupancy invariant must still hold after the merge.
    if listing.available_rooms < 0
        || listing.total_rooms < 1
        || listing.available_rooms > listing.total_rooms
    {
        return Err(ApiError::Validation(vec![MSG_ROOMS.to_string()]));
    }

    let saved = store.update(&listing).await?;
    info!(listing_id = %saved.id, owner_id = %owner_id, "listing updated");
    Ok(saved.into())
}


#[cfg(test)]
mod tests {
    use super::test_support::ListingFixture;
    use super::*;
    use crate::owners::model::{NewOwner, Owner};
    use crate::store::memory::MemStore;

    async fn owner(store: &MemStore) -> Owner {
        OwnerStore::insert(
            store,
            NewOwner {
                name: "Asha".into(),
                email: "asha@example.com".into(),
                password_hash: "hash".into(),
            },
        )
        .await
        .unwrap()
    }

    fn create_request(name: &str) -> CreateListingRequest {
        CreateListingRequest {
            name: name.into(),
            location: "Near FC Road, Shivajinagar".into(),
            address: None,
            city: "Pune".into(),
            state: None,
            pincode: None,
            price: 5000.0,
            security_deposit: None,
            amenities: vec!["wifi".into(), "ac".into()],
            gender: "both".into(),
            room_type: None,
            available_rooms: Some(2),
            total_rooms: Some(4),
            images: vec![],
            description: None,
            rules: vec![],
            contact_phone: None,
            contact_email: None,
            wifi: true,
            parking: false,
            laundry: false,
            food_included: false,
            ac: true,
            latitude: None,
            longitude: None,
        }
    }

    #[tokio::test]
    async fn add_listing_requires_existing_owner() {
        let store = MemStore::new();
        let err = add_listing(&store, &store, Uuid::new_v4(), create_request("Sunrise"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[tokio::test]
    async fn created_listing_round_trips_amenities_in_order() {
        let store = MemStore::new();
        let owner = owner(&store).await;
        let created = add_listing(&store, &store, owner.id, create_request("Sunrise"))
            .await
            .unwrap();
        assert_eq!(created.amenities, vec!["wifi", "ac"]);
        assert_eq!(created.state, "Unknown");
        assert_eq!(created.address, "Near FC Road, Shivajinagar");

        let fetched = get_by_id(&store, created.id).await.unwrap();
        assert_eq!(fetched.amenities, vec!["wifi", "ac"]);
        assert_eq!(fetched.price, 5000.0);
    }

    #[tokio::test]
    async fn invalid_create_makes_no_write() {
        let store = MemStore::new();
        let owner = owner(&store).await;
        let mut req = create_request("ab");
        req.price = -1.0;
        let err = add_listing(&store, &store, owner.id, req).await.unwrap_err();
        match err {
            ApiError::Validation(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error: {other:?}"),
        }
        let (page, _) = ListingStore::find_page(
            &store,
            &crate::store::ListingQuery {
                predicates: vec![],
                sort_key: Default::default(),
                sort_order: Default::default(),
                limit: 10,
                offset: 0,
            },
        )
        .await
        .unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn public_search_filters_price_gender_and_activity() {
        let store = MemStore::new();
        let owner = owner(&store).await;
        store.seed_listing(
            ListingFixture {
                gender: Gender::Male,
                price: 5000,
                ..Default::default()
            }
            .build(owner.id, "Male PG"),
        );
        store.seed_listing(
            ListingFixture {
                gender: Gender::Both,
                price: 5000,
                ..Default::default()
            }
            .build(owner.id, "Both PG"),
        );
        store.seed_listing(
            ListingFixture {
                gender: Gender::Female,
                price: 5000,
                is_active: false,
                ..Default::default()
            }
            .build(owner.id, "Inactive Female PG"),
        );
        store.seed_listing(
            ListingFixture {
                gender: Gender::Female,
                price: 9000,
                ..Default::default()
            }
            .build(owner.id, "Pricey Female PG"),
        );

        let params = SearchParams {
            min_price: Some(3000.0),
            max_price: Some(8000.0),
            gender: Some("female".into()),
            ..Default::default()
        };
        let page = search_public(&store, &params).await.unwrap();
        let names: Vec<_> = page.pg_listings.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Both PG"]);
        assert_eq!(page.pagination.total, 1);
    }

    #[tokio::test]
    async fn empty_match_returns_empty_page_not_error() {
        let store = MemStore::new();
        let params = SearchParams {
            city: Some("Nowhere".into()),
            ..Default::default()
        };
        let page = search_public(&store, &params).await.unwrap();
        assert!(page.pg_listings.is_empty());
        assert_eq!(page.pagination.total, 0);
        assert_eq!(page.pagination.total_pages, 0);
    }

    #[tokio::test]
    async fn search_paginates_and_sorts_by_price() {
        let store = MemStore::new();
        let owner = owner(&store).await;
        for (i, price) in [4000, 2000, 6000, 1000, 5000].iter().enumerate() {
            store.seed_listing(
                ListingFixture {
                    price: *price,
                    ..Default::default()
                }
                .build(owner.id, &format!("PG {i}")),
            );
        }

        let params = SearchParams {
            sort_by: Some("price".into()),
            sort_order: Some("ASC".into()),
            limit: Some(2),
            page: Some(2),
            ..Default::default()
        };
        let page = search_public(&store, &params).await.unwrap();
        let prices: Vec<f64> = page.pg_listings.iter().map(|l| l.price).collect();
        assert_eq!(prices, vec![4000.0, 5000.0]);
        assert_eq!(page.pagination.total, 5);
        assert_eq!(page.pagination.total_pages, 3);
        assert!(page.pagination.has_next);
        assert!(page.pagination.has_prev);
    }

    #[tokio::test]
    async fn owner_search_sees_inactive_and_filters_status() {
        let store = MemStore::new();
        let owner = owner(&store).await;
        store.seed_listing(
            ListingFixture {
                ..Default::default()
            }
            .build(owner.id, "Active PG"),
        );
        store.seed_listing(
            ListingFixture {
                is_active: false,
                ..Default::default()
            }
            .build(owner.id, "Hidden PG"),
        );

        let all = search_owned(&store, owner.id, &OwnerListingParams::default())
            .await
            .unwrap();
        assert_eq!(all.pagination.total, 2);

        let inactive = search_owned(
            &store,
            owner.id,
            &OwnerListingParams {
                status: Some("inactive".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(inactive.pagination.total, 1);
        assert_eq!(inactive.pg_listings[0].name, "Hidden PG");
    }

    #[tokio::test]
    async fn update_is_owner_guarded_and_partial() {
        let store = MemStore::new();
        let owner = owner(&store).await;
        let listing = ListingFixture::default().build(owner.id, "Sunrise");
        let listing_id = listing.id;
        store.seed_listing(listing);

        // wrong owner: indistinguishable from missing listing
        let err = update_listing(
            &store,
            Uuid::new_v4(),
            listing_id,
            UpdateListingRequest {
                price: Some(100.0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound));

        let updated = update_listing(
            &store,
            owner.id,
            listing_id,
            UpdateListingRequest {
                price: Some(5500.0),
                wifi: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.price, 5500.0);
        assert!(updated.wifi);
        assert_eq!(updated.name, "Sunrise");
    }

    #[tokio::test]
    async fn update_rejects_rooms_invariant_breach() {
        let store = MemStore::new();
        let owner = owner(&store).await;
        let listing = ListingFixture {
            total_rooms: 4,
            available_rooms: 2,
            ..Default::default()
        }
        .build(owner.id, "Sunrise");
        let listing_id = listing.id;
        store.seed_listing(listing);

        let err = update_listing(
            &store,
            owner.id,
            listing_id,
            UpdateListingRequest {
                available_rooms: Some(9),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn get_by_name_is_case_insensitive_and_active_only() {
        let store = MemStore::new();
        let owner = owner(&store).await;
        store.seed_listing(ListingFixture::default().build(owner.id, "Sunrise Residency"));
        store.seed_listing(
            ListingFixture {
                is_active: false,
                ..Default::default()
            }
            .build(owner.id, "Moonlight Residency"),
        );

        let found = get_by_name(&store, "sunrise residency").await.unwrap();
        assert_eq!(found.name, "Sunrise Residency");

        let err = get_by_name(&store, "Moonlight Residency").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }
}
