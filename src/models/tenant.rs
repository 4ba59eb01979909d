use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "tenant_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TenantStatus {
    Active,
    Inactive,
    Pending,
}

impl Default for TenantStatus {
    fn default() -> Self {
        Self::Active
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct EmergencyContact {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub relationship: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Tenant {
    pub id: Uuid,
    pub user_id: Uuid,
    pub property_id: Uuid,
    pub unit: String,
    pub lease_start: NaiveDate,
    pub lease_end: NaiveDate,
    pub rent: Decimal,
    pub security_deposit: Decimal,
    pub status: TenantStatus,
    pub emergency_contact: Option<EmergencyContact>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    pub fn is_active(&self) -> bool {
        self.status == TenantStatus::Active
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTenantRequest {
    pub user_id: Uuid,
    pub property_id: Uuid,
    #[validate(length(min = 1, max = 64, message = "Unit must be 1-64 characters"))]
    pub unit: String,
    pub lease_start: NaiveDate,
    pub lease_end: NaiveDate,
    pub rent: Decimal,
    pub security_deposit: Option<Decimal>,
    pub emergency_contact: Option<EmergencyContact>,
}

/// Lease fields an owner may change. The user and property of a lease are fixed.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTenantRequest {
    #[validate(length(min = 1, max = 64, message = "Unit must be 1-64 characters"))]
    pub unit: Option<String>,
    pub lease_start: Option<NaiveDate>,
    pub lease_end: Option<NaiveDate>,
    pub rent: Option<Decimal>,
    pub security_deposit: Option<Decimal>,
    pub status: Option<TenantStatus>,
    pub emergency_contact: Option<EmergencyContact>,
}
