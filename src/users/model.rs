use time::OffsetDateTime;
use uuid::Uuid;

/// Tenant account. Same shape as an owner minus the business fields;
/// users never own listings.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub gender: Option<String>,
    pub occupation: Option<String>,
    pub profile_image: Option<String>,
    pub is_active: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}
