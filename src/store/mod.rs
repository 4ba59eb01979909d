//! Record store seam.
//!
//! Every service reaches persistence through [`RentalStore`]. Operations that touch a
//! tenant record also maintain the availability flag of the referenced property in the
//! same unit of work, so callers never perform the two writes separately.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{
    Maintenance, MaintenanceStatus, MethodTotal, Payment, Property, PropertyFilter, Tenant, User,
};

pub mod memory;
pub mod postgres;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unexpected(err.into())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Unexpected(err.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait RentalStore: Send + Sync {
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn insert_user(&self, user: User) -> StoreResult<User>;
    async fn users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>>;

    async fn list_properties(&self, filter: PropertyFilter) -> StoreResult<Vec<Property>>;
    async fn find_property(&self, id: Uuid) -> StoreResult<Option<Property>>;
    async fn properties_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Property>>;
    async fn insert_property(&self, property: Property) -> StoreResult<Property>;
    async fn update_property(&self, property: Property) -> StoreResult<Property>;
    async fn delete_property(&self, id: Uuid) -> StoreResult<()>;

    async fn list_tenants(&self) -> StoreResult<Vec<Tenant>>;
    async fn find_tenant(&self, id: Uuid) -> StoreResult<Option<Tenant>>;
    /// The lease of a tenant user, preferring an active one, newest first.
    async fn find_tenant_by_user(&self, user_id: Uuid) -> StoreResult<Option<Tenant>>;
    async fn tenant_exists_for(&self, user_id: Uuid, property_id: Uuid) -> StoreResult<bool>;
    async fn count_tenants_for_property(&self, property_id: Uuid) -> StoreResult<i64>;
    /// Inserts the tenant and recomputes its property's availability atomically.
    async fn create_tenancy(&self, tenant: Tenant) -> StoreResult<Tenant>;
    /// Writes the tenant and recomputes its property's availability atomically.
    async fn update_tenancy(&self, tenant: Tenant) -> StoreResult<Tenant>;
    /// Deletes the tenant and recomputes its property's availability atomically.
    async fn remove_tenancy(&self, id: Uuid) -> StoreResult<()>;
    /// Recomputes `is_available` from tenant state and returns how many properties
    /// changed. Limited to one owner's properties when `owner_id` is given.
    async fn reconcile_availability(&self, owner_id: Option<Uuid>) -> StoreResult<u64>;

    async fn list_payments(&self, tenant_id: Option<Uuid>) -> StoreResult<Vec<Payment>>;
    async fn insert_payment(&self, payment: Payment) -> StoreResult<Payment>;
    /// Sum of paid amounts with `from <= payment_date < until`.
    async fn paid_total(&self, from: DateTime<Utc>, until: DateTime<Utc>)
        -> StoreResult<Decimal>;
    async fn paid_by_method(&self) -> StoreResult<Vec<MethodTotal>>;

    async fn list_maintenance(&self, tenant_id: Option<Uuid>) -> StoreResult<Vec<Maintenance>>;
    async fn find_maintenance(&self, id: Uuid) -> StoreResult<Option<Maintenance>>;
    async fn insert_maintenance(&self, request: Maintenance) -> StoreResult<Maintenance>;
    /// Writes the request only while its stored status still equals `expected`;
    /// otherwise returns [`StoreError::Conflict`] and leaves the row untouched.
    async fn update_maintenance(
        &self,
        request: Maintenance,
        expected: MaintenanceStatus,
    ) -> StoreResult<Maintenance>;
    async fn delete_maintenance(&self, id: Uuid) -> StoreResult<()>;

    async fn health_check(&self) -> StoreResult<()>;
    fn backend_name(&self) -> &'static str;
}
