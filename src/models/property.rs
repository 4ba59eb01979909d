use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Address {
    pub street: String,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

/// Address as accepted from clients: either a single line or the full structure.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum AddressInput {
    Line(String),
    Full(Address),
}

impl From<AddressInput> for Address {
    fn from(input: AddressInput) -> Self {
        match input {
            AddressInput::Line(street) => Address {
                street,
                ..Default::default()
            },
            AddressInput::Full(address) => address,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Property {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub address: Address,
    pub rent: Decimal,
    pub bedrooms: i32,
    pub bathrooms: Decimal,
    pub area: Decimal,
    pub description: Option<String>,
    pub features: Vec<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which properties a listing should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyFilter {
    Available,
    OwnedBy(Uuid),
}

impl PropertyFilter {
    pub fn matches(&self, property: &Property) -> bool {
        match self {
            PropertyFilter::Available => property.is_available,
            PropertyFilter::OwnedBy(owner_id) => property.owner_id == *owner_id,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePropertyRequest {
    #[validate(length(min = 1, max = 255, message = "Property name must be 1-255 characters"))]
    pub name: String,
    pub address: AddressInput,
    pub rent: Decimal,
    #[validate(range(min = 0, message = "Bedrooms cannot be negative"))]
    pub bedrooms: i32,
    pub bathrooms: Decimal,
    pub area: Decimal,
    pub description: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
}

/// Fields an owner may change on an existing property. Availability and
/// ownership are not part of this set.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePropertyRequest {
    #[validate(length(min = 1, max = 255, message = "Property name must be 1-255 characters"))]
    pub name: Option<String>,
    pub address: Option<AddressInput>,
    pub rent: Option<Decimal>,
    #[validate(range(min = 0, message = "Bedrooms cannot be negative"))]
    pub bedrooms: Option<i32>,
    pub bathrooms: Option<Decimal>,
    pub area: Option<Decimal>,
    pub description: Option<String>,
    pub features: Option<Vec<String>>,
}
