use anyhow::Context;
use axum::async_trait;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{
    Field, ListingQuery, ListingStore, OwnerStore, Predicate, SortKey, SortOrder, UserStore, Value,
};
use crate::listings::model::{Gender, Listing, NewListing, RoomType};
use crate::owners::model::{NewOwner, Owner, VerificationStatus};
use crate::users::model::{NewUser, User};

const LISTING_COLUMNS: &str = "id, owner_id, name, location, address, city, state, pincode, \
     price, security_deposit, amenities, gender, room_type, available_rooms, total_rooms, \
     images, description, rules, contact_phone, contact_email, wifi, parking, laundry, \
     food_included, ac, is_active, latitude, longitude, created_at, updated_at";

const OWNER_COLUMNS: &str = "id, name, email, password_hash, phone, business_name, \
     business_address, verification_status, profile_image, is_active, created_at, updated_at";

const USER_COLUMNS: &str = "id, name, email, password_hash, phone, gender, occupation, \
     profile_image, is_active, created_at, updated_at";

/// Raw pg_listings row. Enum columns come back as text and are parsed
/// into domain enums in the `TryFrom` below.
#[derive(Debug, FromRow)]
struct ListingRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    location: String,
    address: String,
    city: String,
    state: String,
    pincode: String,
    price: Decimal,
    security_deposit: Option<Decimal>,
    amenities: Vec<String>,
    gender: String,
    room_type: String,
    available_rooms: i32,
    total_rooms: i32,
    images: Vec<String>,
    description: String,
    rules: Vec<String>,
    contact_phone: Option<String>,
    contact_email: Option<String>,
    wifi: bool,
    parking: bool,
    laundry: bool,
    food_included: bool,
    ac: bool,
    is_active: bool,
    latitude: Option<Decimal>,
    longitude: Option<Decimal>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<ListingRow> for Listing {
    type Error = anyhow::Error;

    fn try_from(r: ListingRow) -> Result<Self, Self::Error> {
        let gender = Gender::parse(&r.gender)
            .with_context(|| format!("unexpected gender value in row: {}", r.gender))?;
        let room_type = RoomType::parse(&r.room_type)
            .with_context(|| format!("unexpected room_type value in row: {}", r.room_type))?;
        Ok(Listing {
            id: r.id,
            owner_id: r.owner_id,
            name: r.name,
            location: r.location,
            address: r.address,
            city: r.city,
            state: r.state,
            pincode: r.pincode,
            price: r.price,
            security_deposit: r.security_deposit,
            amenities: r.amenities,
            gender,
            room_type,
            available_rooms: r.available_rooms,
            total_rooms: r.total_rooms,
            images: r.images,
            description: r.description,
            rules: r.rules,
            contact_phone: r.contact_phone,
            contact_email: r.contact_email,
            wifi: r.wifi,
            parking: r.parking,
            laundry: r.laundry,
            food_included: r.food_included,
            ac: r.ac,
            is_active: r.is_active,
            latitude: r.latitude,
            longitude: r.longitude,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct OwnerRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    phone: Option<String>,
    business_name: Option<String>,
    business_address: Option<String>,
    verification_status: String,
    profile_image: Option<String>,
    is_active: bool,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl TryFrom<OwnerRow> for Owner {
    type Error = anyhow::Error;

    fn try_from(r: OwnerRow) -> Result<Self, Self::Error> {
        let verification_status = VerificationStatus::parse(&r.verification_status)
            .with_context(|| {
                format!(
                    "unexpected verification_status in row: {}",
                    r.verification_status
                )
            })?;
        Ok(Owner {
            id: r.id,
            name: r.name,
            email: r.email,
            password_hash: r.password_hash,
            phone: r.phone,
            business_name: r.business_name,
            business_address: r.business_address,
            verification_status,
            profile_image: r.profile_image,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    phone: Option<String>,
    gender: Option<String>,
    occupation: Option<String>,
    profile_image: Option<String>,
    is_active: bool,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            id: r.id,
            name: r.name,
            email: r.email,
            password_hash: r.password_hash,
            phone: r.phone,
            gender: r.gender,
            occupation: r.occupation,
            profile_image: r.profile_image,
            is_active: r.is_active,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

fn push_predicate(qb: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate) {
    match predicate {
        Predicate::Eq(field, value) => {
            qb.push(field.column()).push(" = ");
            match value {
                Value::Text(t) => qb.push_bind(t.clone()),
                Value::Bool(b) => qb.push_bind(*b),
                Value::Id(id) => qb.push_bind(*id),
            };
        }
        Predicate::EqFold(field, value) => {
            qb.push("LOWER(")
                .push(field.column())
                .push(") = LOWER(")
                .push_bind(value.clone())
                .push(")");
        }
        Predicate::Gte(field, bound) => {
            qb.push(field.column())
                .push(" >= ")
                .push_bind(Decimal::from_f64_retain(*bound).unwrap_or_default());
        }
        Predicate::Lte(field, bound) => {
            qb.push(field.column())
                .push(" <= ")
                .push_bind(Decimal::from_f64_retain(*bound).unwrap_or_default());
        }
        Predicate::ContainsFold(field, needle) => {
            qb.push(field.column())
                .push(" ILIKE ")
                .push_bind(format!("%{}%", needle));
        }
        Predicate::Overlaps(field, values) => {
            qb.push(field.column())
                .push(" && ")
                .push_bind(values.clone());
        }
        Predicate::AnyOf(preds) => {
            qb.push("(");
            for (i, p) in preds.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                push_predicate(qb, p);
            }
            qb.push(")");
        }
    }
}

fn push_where(qb: &mut QueryBuilder<'_, Postgres>, predicates: &[Predicate]) {
    for (i, p) in predicates.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        push_predicate(qb, p);
    }
}

fn push_order(qb: &mut QueryBuilder<'_, Postgres>, sort_key: SortKey, sort_order: SortOrder) {
    // created_at, id appended so equal keys page deterministically
    qb.push(" ORDER BY ")
        .push(sort_key.column())
        .push(" ")
        .push(sort_order.sql());
    if sort_key != SortKey::CreatedAt {
        qb.push(", created_at DESC");
    }
    qb.push(", id ASC");
}

/// sqlx-backed store. Compiles the predicate list to SQL; the column
/// names come from the closed `Field` set, values are always bound.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingStore for PgStore {
    async fn find_page(&self, query: &ListingQuery) -> anyhow::Result<(Vec<Listing>, i64)> {
        let mut count_qb =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM pg_listings");
        push_where(&mut count_qb, &query.predicates);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .context("count pg_listings")?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM pg_listings",
            LISTING_COLUMNS
        ));
        push_where(&mut qb, &query.predicates);
        push_order(&mut qb, query.sort_key, query.sort_order);
        qb.push(" LIMIT ")
            .push_bind(query.limit)
            .push(" OFFSET ")
            .push_bind(query.offset);

        let rows: Vec<ListingRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .context("select pg_listings page")?;
        let listings = rows
            .into_iter()
            .map(Listing::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((listings, total))
    }

    async fn find_all(
        &self,
        predicates: &[Predicate],
        sort_key: SortKey,
        sort_order: SortOrder,
    ) -> anyhow::Result<Vec<Listing>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM pg_listings",
            LISTING_COLUMNS
        ));
        push_where(&mut qb, predicates);
        push_order(&mut qb, sort_key, sort_order);

        let rows: Vec<ListingRow> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .context("select pg_listings")?;
        rows.into_iter().map(Listing::try_from).collect()
    }

    async fn find_one(&self, predicates: &[Predicate]) -> anyhow::Result<Option<Listing>> {
        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM pg_listings",
            LISTING_COLUMNS
        ));
        push_where(&mut qb, predicates);
        qb.push(" LIMIT 1");

        let row: Option<ListingRow> = qb
            .build_query_as()
            .fetch_optional(&self.pool)
            .await
            .context("select one pg_listing")?;
        row.map(Listing::try_from).transpose()
    }

    async fn insert(&self, new: NewListing) -> anyhow::Result<Listing> {
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            r#"
            INSERT INTO pg_listings
                (owner_id, name, location, address, city, state, pincode, price,
                 security_deposit, amenities, gender, room_type, available_rooms,
                 total_rooms, images, description, rules, contact_phone, contact_email,
                 wifi, parking, laundry, food_included, ac, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13,
                    $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26)
            RETURNING {}
            "#,
            LISTING_COLUMNS
        ))
        .bind(new.owner_id)
        .bind(new.name)
        .bind(new.location)
        .bind(new.address)
        .bind(new.city)
        .bind(new.state)
        .bind(new.pincode)
        .bind(new.price)
        .bind(new.security_deposit)
        .bind(new.amenities)
        .bind(new.gender.as_str())
        .bind(new.room_type.as_str())
        .bind(new.available_rooms)
        .bind(new.total_rooms)
        .bind(new.images)
        .bind(new.description)
        .bind(new.rules)
        .bind(new.contact_phone)
        .bind(new.contact_email)
        .bind(new.wifi)
        .bind(new.parking)
        .bind(new.laundry)
        .bind(new.food_included)
        .bind(new.ac)
        .bind(new.latitude)
        .bind(new.longitude)
        .fetch_one(&self.pool)
        .await
        .context("insert pg_listing")?;
        Listing::try_from(row)
    }

    async fn update(&self, listing: &Listing) -> anyhow::Result<Listing> {
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            r#"
            UPDATE pg_listings SET
                name = $1, location = $2, address = $3, city = $4, state = $5,
                pincode = $6, price = $7, security_deposit = $8, amenities = $9,
                gender = $10, room_type = $11, available_rooms = $12, total_rooms = $13,
                images = $14, description = $15, rules = $16, contact_phone = $17,
                contact_email = $18, wifi = $19, parking = $20, laundry = $21,
                food_included = $22, ac = $23, is_active = $24, latitude = $25,
                longitude = $26, updated_at = now()
            WHERE id = $27
            RETURNING {}
            "#,
            LISTING_COLUMNS
        ))
        .bind(&listing.name)
        .bind(&listing.location)
        .bind(&listing.address)
        .bind(&listing.city)
        .bind(&listing.state)
        .bind(&listing.pincode)
        .bind(listing.price)
        .bind(listing.security_deposit)
        .bind(&listing.amenities)
        .bind(listing.gender.as_str())
        .bind(listing.room_type.as_str())
        .bind(listing.available_rooms)
        .bind(listing.total_rooms)
        .bind(&listing.images)
        .bind(&listing.description)
        .bind(&listing.rules)
        .bind(&listing.contact_phone)
        .bind(&listing.contact_email)
        .bind(listing.wifi)
        .bind(listing.parking)
        .bind(listing.laundry)
        .bind(listing.food_included)
        .bind(listing.ac)
        .bind(listing.is_active)
        .bind(listing.latitude)
        .bind(listing.longitude)
        .bind(listing.id)
        .fetch_one(&self.pool)
        .await
        .context("update pg_listing")?;
        Listing::try_from(row)
    }
}

#[async_trait]
impl OwnerStore for PgStore {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Owner>> {
        let row = sqlx::query_as::<_, OwnerRow>(&format!(
            "SELECT {} FROM owners WHERE id = $1",
            OWNER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("select owner by id")?;
        row.map(Owner::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Owner>> {
        let row = sqlx::query_as::<_, OwnerRow>(&format!(
            "SELECT {} FROM owners WHERE LOWER(email) = LOWER($1)",
            OWNER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("select owner by email")?;
        row.map(Owner::try_from).transpose()
    }

    async fn insert(&self, new: NewOwner) -> anyhow::Result<Owner> {
        let row = sqlx::query_as::<_, OwnerRow>(&format!(
            r#"
            INSERT INTO owners (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            OWNER_COLUMNS
        ))
        .bind(new.name)
        .bind(new.email)
        .bind(new.password_hash)
        .fetch_one(&self.pool)
        .await
        .context("insert owner")?;
        Owner::try_from(row)
    }

    async fn update(&self, owner: &Owner) -> anyhow::Result<Owner> {
        let row = sqlx::query_as::<_, OwnerRow>(&format!(
            r#"
            UPDATE owners SET
                name = $1, phone = $2, business_name = $3, business_address = $4,
                verification_status = $5, profile_image = $6, is_active = $7,
                updated_at = now()
            WHERE id = $8
            RETURNING {}
            "#,
            OWNER_COLUMNS
        ))
        .bind(&owner.name)
        .bind(&owner.phone)
        .bind(&owner.business_name)
        .bind(&owner.business_address)
        .bind(owner.verification_status.as_str())
        .bind(&owner.profile_image)
        .bind(owner.is_active)
        .bind(owner.id)
        .fetch_one(&self.pool)
        .await
        .context("update owner")?;
        Owner::try_from(row)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("select user by id")?;
        Ok(row.map(User::from))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("select user by email")?;
        Ok(row.map(User::from))
    }

    async fn insert(&self, new: NewUser) -> anyhow::Result<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(new.name)
        .bind(new.email)
        .bind(new.password_hash)
        .fetch_one(&self.pool)
        .await
        .context("insert user")?;
        Ok(User::from(row))
    }

    async fn update(&self, user: &User) -> anyhow::Result<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users SET
                name = $1, phone = $2, gender = $3, occupation = $4,
                profile_image = $5, is_active = $6, updated_at = now()
            WHERE id = $7
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(&user.name)
        .bind(&user.phone)
        .bind(&user.gender)
        .bind(&user.occupation)
        .bind(&user.profile_image)
        .bind(user.is_active)
        .bind(user.id)
        .fetch_one(&self.pool)
        .await
        .context("update user")?;
        Ok(User::from(row))
    }
}
