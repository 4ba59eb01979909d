//! Response views that carry the related records a client needs to render a row,
//! so listings do not come back as bare foreign keys.
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Address, Maintenance, Payment, Property, Tenant, User};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PropertySummary {
    pub id: Uuid,
    pub name: String,
    pub address: Address,
}

impl From<&Property> for PropertySummary {
    fn from(property: &Property) -> Self {
        Self {
            id: property.id,
            name: property.name.clone(),
            address: property.address.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PropertyView {
    #[serde(flatten)]
    pub property: Property,
    pub owner: Option<UserSummary>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TenantView {
    #[serde(flatten)]
    pub tenant: Tenant,
    pub user: Option<UserSummary>,
    pub property: Option<PropertySummary>,
}

/// `property` is `None` once the property has been deleted; payments outlive it.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaymentView {
    #[serde(flatten)]
    pub payment: Payment,
    pub property: Option<PropertySummary>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct MaintenanceView {
    #[serde(flatten)]
    pub maintenance: Maintenance,
    pub property: Option<PropertySummary>,
}
