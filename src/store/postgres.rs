//! Postgres implementation of [`RentalStore`].
//!
//! Tenant writes run in a transaction that first locks the property row, then writes
//! the tenant, then recomputes `properties.is_available` from the remaining active
//! tenants. Concurrent tenant writes against one property therefore serialize, and a
//! crash between the two statements rolls both back.
//!
//! Migrations are executed by [`PostgresStore::connect`] via `sqlx::migrate!`.
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::{FromRow, Postgres, Transaction};
use uuid::Uuid;

use super::{RentalStore, StoreError, StoreResult};
use crate::models::{
    Address, Assignee, EmergencyContact, Maintenance, MaintenancePriority, MaintenanceStatus,
    MethodTotal, Payment, PaymentMethod, Property, PropertyFilter, Tenant, TenantStatus, User,
    UserRole,
};

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct PropertyRow {
    id: Uuid,
    owner_id: Uuid,
    name: String,
    address: Json<Address>,
    rent: Decimal,
    bedrooms: i32,
    bathrooms: Decimal,
    area: Decimal,
    description: Option<String>,
    features: Vec<String>,
    is_available: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PropertyRow> for Property {
    fn from(row: PropertyRow) -> Self {
        Property {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            address: row.address.0,
            rent: row.rent,
            bedrooms: row.bedrooms,
            bathrooms: row.bathrooms,
            area: row.area,
            description: row.description,
            features: row.features,
            is_available: row.is_available,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct TenantRow {
    id: Uuid,
    user_id: Uuid,
    property_id: Uuid,
    unit: String,
    lease_start: NaiveDate,
    lease_end: NaiveDate,
    rent: Decimal,
    security_deposit: Decimal,
    status: TenantStatus,
    emergency_contact: Option<Json<EmergencyContact>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TenantRow> for Tenant {
    fn from(row: TenantRow) -> Self {
        Tenant {
            id: row.id,
            user_id: row.user_id,
            property_id: row.property_id,
            unit: row.unit,
            lease_start: row.lease_start,
            lease_end: row.lease_end,
            rent: row.rent,
            security_deposit: row.security_deposit,
            status: row.status,
            emergency_contact: row.emergency_contact.map(|c| c.0),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct MaintenanceRow {
    id: Uuid,
    property_id: Uuid,
    tenant_id: Option<Uuid>,
    issue: String,
    description: String,
    priority: MaintenancePriority,
    status: MaintenanceStatus,
    reported_by: UserRole,
    assigned_to: Option<Json<Assignee>>,
    estimated_cost: Option<Decimal>,
    actual_cost: Option<Decimal>,
    completion_date: Option<DateTime<Utc>>,
    images: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<MaintenanceRow> for Maintenance {
    fn from(row: MaintenanceRow) -> Self {
        Maintenance {
            id: row.id,
            property_id: row.property_id,
            tenant_id: row.tenant_id,
            issue: row.issue,
            description: row.description,
            priority: row.priority,
            status: row.status,
            reported_by: row.reported_by,
            assigned_to: row.assigned_to.map(|a| a.0),
            estimated_cost: row.estimated_cost,
            actual_cost: row.actual_cost,
            completion_date: row.completion_date,
            images: row.images,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct PaymentRow {
    id: Uuid,
    tenant_id: Uuid,
    property_id: Uuid,
    amount: Decimal,
    payment_date: DateTime<Utc>,
    due_date: DateTime<Utc>,
    status: crate::models::PaymentStatus,
    method: PaymentMethod,
    month: String,
    reference: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Payment {
            id: row.id,
            tenant_id: row.tenant_id,
            property_id: row.property_id,
            amount: row.amount,
            payment_date: row.payment_date,
            due_date: row.due_date,
            status: row.status,
            method: row.method,
            month: row.month,
            reference: row.reference,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23503"))
}

const AVAILABILITY_REFRESH: &str = r#"
    UPDATE properties p
    SET is_available = NOT EXISTS (
            SELECT 1 FROM tenants t WHERE t.property_id = p.id AND t.status = 'active'
        ),
        updated_at = NOW()
    WHERE p.id = $1
      AND p.is_available = EXISTS (
            SELECT 1 FROM tenants t WHERE t.property_id = p.id AND t.status = 'active'
        )
"#;

impl PostgresStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        tracing::info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Migrations completed");

        Ok(Self { pool })
    }

    async fn lock_property(tx: &mut Transaction<'_, Postgres>, property_id: Uuid) -> StoreResult<()> {
        let locked: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM properties WHERE id = $1 FOR UPDATE")
                .bind(property_id)
                .fetch_optional(&mut **tx)
                .await?;
        locked
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound("Property not found".into()))
    }

    async fn refresh_availability(
        tx: &mut Transaction<'_, Postgres>,
        property_id: Uuid,
    ) -> StoreResult<u64> {
        let result = sqlx::query(AVAILABILITY_REFRESH)
            .bind(property_id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl RentalStore for PostgresStore {
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert_user(&self, user: User) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, name, email, phone, role, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(user.role)
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                StoreError::Conflict("User with this email already exists".into())
            } else {
                err.into()
            }
        })
    }

    async fn users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn list_properties(&self, filter: PropertyFilter) -> StoreResult<Vec<Property>> {
        let rows = match filter {
            PropertyFilter::Available => {
                sqlx::query_as::<_, PropertyRow>(
                    "SELECT * FROM properties WHERE is_available = true ORDER BY created_at DESC",
                )
                .fetch_all(&self.pool)
                .await?
            }
            PropertyFilter::OwnedBy(owner_id) => {
                sqlx::query_as::<_, PropertyRow>(
                    "SELECT * FROM properties WHERE owner_id = $1 ORDER BY created_at DESC",
                )
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(rows.into_iter().map(Property::from).collect())
    }

    async fn find_property(&self, id: Uuid) -> StoreResult<Option<Property>> {
        let row = sqlx::query_as::<_, PropertyRow>("SELECT * FROM properties WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Property::from))
    }

    async fn properties_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Property>> {
        let rows = sqlx::query_as::<_, PropertyRow>("SELECT * FROM properties WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Property::from).collect())
    }

    async fn insert_property(&self, property: Property) -> StoreResult<Property> {
        let row = sqlx::query_as::<_, PropertyRow>(
            r#"
            INSERT INTO properties (
                id, owner_id, name, address, rent, bedrooms, bathrooms, area,
                description, features, is_available, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(property.id)
        .bind(property.owner_id)
        .bind(&property.name)
        .bind(Json(&property.address))
        .bind(property.rent)
        .bind(property.bedrooms)
        .bind(property.bathrooms)
        .bind(property.area)
        .bind(&property.description)
        .bind(&property.features)
        .bind(property.is_available)
        .bind(property.created_at)
        .bind(property.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn update_property(&self, property: Property) -> StoreResult<Property> {
        // is_available is only written by tenant operations and reconciliation.
        let row = sqlx::query_as::<_, PropertyRow>(
            r#"
            UPDATE properties SET
                name = $2,
                address = $3,
                rent = $4,
                bedrooms = $5,
                bathrooms = $6,
                area = $7,
                description = $8,
                features = $9,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(property.id)
        .bind(&property.name)
        .bind(Json(&property.address))
        .bind(property.rent)
        .bind(property.bedrooms)
        .bind(property.bathrooms)
        .bind(property.area)
        .bind(&property.description)
        .bind(&property.features)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound("Property not found".into()))?;
        Ok(row.into())
    }

    async fn delete_property(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|err| {
                if is_foreign_key_violation(&err) {
                    StoreError::Conflict("Property still has tenants".into())
                } else {
                    err.into()
                }
            })?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Property not found".into()));
        }
        Ok(())
    }

    async fn list_tenants(&self) -> StoreResult<Vec<Tenant>> {
        let rows =
            sqlx::query_as::<_, TenantRow>("SELECT * FROM tenants ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(Tenant::from).collect())
    }

    async fn find_tenant(&self, id: Uuid) -> StoreResult<Option<Tenant>> {
        let row = sqlx::query_as::<_, TenantRow>("SELECT * FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Tenant::from))
    }

    async fn find_tenant_by_user(&self, user_id: Uuid) -> StoreResult<Option<Tenant>> {
        let row = sqlx::query_as::<_, TenantRow>(
            r#"
            SELECT * FROM tenants
            WHERE user_id = $1
            ORDER BY (status = 'active') DESC, created_at DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Tenant::from))
    }

    async fn tenant_exists_for(&self, user_id: Uuid, property_id: Uuid) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM tenants WHERE user_id = $1 AND property_id = $2)",
        )
        .bind(user_id)
        .bind(property_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn count_tenants_for_property(&self, property_id: Uuid) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tenants WHERE property_id = $1")
            .bind(property_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    async fn create_tenancy(&self, tenant: Tenant) -> StoreResult<Tenant> {
        let mut tx = self.pool.begin().await?;
        Self::lock_property(&mut tx, tenant.property_id).await?;

        let row = sqlx::query_as::<_, TenantRow>(
            r#"
            INSERT INTO tenants (
                id, user_id, property_id, unit, lease_start, lease_end, rent,
                security_deposit, status, emergency_contact, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(tenant.id)
        .bind(tenant.user_id)
        .bind(tenant.property_id)
        .bind(&tenant.unit)
        .bind(tenant.lease_start)
        .bind(tenant.lease_end)
        .bind(tenant.rent)
        .bind(tenant.security_deposit)
        .bind(tenant.status)
        .bind(tenant.emergency_contact.as_ref().map(Json))
        .bind(tenant.created_at)
        .bind(tenant.updated_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                StoreError::Conflict("Tenant already exists for this property".into())
            } else {
                err.into()
            }
        })?;

        Self::refresh_availability(&mut tx, tenant.property_id).await?;
        tx.commit().await?;
        Ok(row.into())
    }

    async fn update_tenancy(&self, tenant: Tenant) -> StoreResult<Tenant> {
        let mut tx = self.pool.begin().await?;
        Self::lock_property(&mut tx, tenant.property_id).await?;

        let row = sqlx::query_as::<_, TenantRow>(
            r#"
            UPDATE tenants SET
                unit = $2,
                lease_start = $3,
                lease_end = $4,
                rent = $5,
                security_deposit = $6,
                status = $7,
                emergency_contact = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(tenant.id)
        .bind(&tenant.unit)
        .bind(tenant.lease_start)
        .bind(tenant.lease_end)
        .bind(tenant.rent)
        .bind(tenant.security_deposit)
        .bind(tenant.status)
        .bind(tenant.emergency_contact.as_ref().map(Json))
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| StoreError::NotFound("Tenant not found".into()))?;

        Self::refresh_availability(&mut tx, tenant.property_id).await?;
        tx.commit().await?;
        Ok(row.into())
    }

    async fn remove_tenancy(&self, id: Uuid) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let property_id: Uuid = sqlx::query_scalar("SELECT property_id FROM tenants WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::NotFound("Tenant not found".into()))?;
        Self::lock_property(&mut tx, property_id).await?;

        sqlx::query("DELETE FROM tenants WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        Self::refresh_availability(&mut tx, property_id).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn reconcile_availability(&self, owner_id: Option<Uuid>) -> StoreResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE properties p
            SET is_available = NOT EXISTS (
                    SELECT 1 FROM tenants t WHERE t.property_id = p.id AND t.status = 'active'
                ),
                updated_at = NOW()
            WHERE ($1::uuid IS NULL OR p.owner_id = $1)
              AND p.is_available = EXISTS (
                    SELECT 1 FROM tenants t WHERE t.property_id = p.id AND t.status = 'active'
                )
            "#,
        )
        .bind(owner_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn list_payments(&self, tenant_id: Option<Uuid>) -> StoreResult<Vec<Payment>> {
        let rows = sqlx::query_as::<_, PaymentRow>(
            r#"
            SELECT * FROM payments
            WHERE ($1::uuid IS NULL OR tenant_id = $1)
            ORDER BY payment_date DESC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Payment::from).collect())
    }

    async fn insert_payment(&self, payment: Payment) -> StoreResult<Payment> {
        let row = sqlx::query_as::<_, PaymentRow>(
            r#"
            INSERT INTO payments (
                id, tenant_id, property_id, amount, payment_date, due_date, status,
                method, month, reference, notes, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(payment.id)
        .bind(payment.tenant_id)
        .bind(payment.property_id)
        .bind(payment.amount)
        .bind(payment.payment_date)
        .bind(payment.due_date)
        .bind(payment.status)
        .bind(payment.method)
        .bind(&payment.month)
        .bind(&payment.reference)
        .bind(&payment.notes)
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn paid_total(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> StoreResult<Decimal> {
        let total: Decimal = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(amount), 0) FROM payments
            WHERE status = 'paid' AND payment_date >= $1 AND payment_date < $2
            "#,
        )
        .bind(from)
        .bind(until)
        .fetch_one(&self.pool)
        .await?;
        Ok(total)
    }

    async fn paid_by_method(&self) -> StoreResult<Vec<MethodTotal>> {
        let rows: Vec<(PaymentMethod, i64, Decimal)> = sqlx::query_as(
            r#"
            SELECT method, COUNT(*), COALESCE(SUM(amount), 0)
            FROM payments
            WHERE status = 'paid'
            GROUP BY method
            ORDER BY method
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(method, count, total)| MethodTotal {
                method,
                count,
                total,
            })
            .collect())
    }

    async fn list_maintenance(&self, tenant_id: Option<Uuid>) -> StoreResult<Vec<Maintenance>> {
        let rows = sqlx::query_as::<_, MaintenanceRow>(
            r#"
            SELECT * FROM maintenance_requests
            WHERE ($1::uuid IS NULL OR tenant_id = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Maintenance::from).collect())
    }

    async fn find_maintenance(&self, id: Uuid) -> StoreResult<Option<Maintenance>> {
        let row = sqlx::query_as::<_, MaintenanceRow>(
            "SELECT * FROM maintenance_requests WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Maintenance::from))
    }

    async fn insert_maintenance(&self, request: Maintenance) -> StoreResult<Maintenance> {
        let row = sqlx::query_as::<_, MaintenanceRow>(
            r#"
            INSERT INTO maintenance_requests (
                id, property_id, tenant_id, issue, description, priority, status,
                reported_by, assigned_to, estimated_cost, actual_cost, completion_date,
                images, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(request.property_id)
        .bind(request.tenant_id)
        .bind(&request.issue)
        .bind(&request.description)
        .bind(request.priority)
        .bind(request.status)
        .bind(request.reported_by)
        .bind(request.assigned_to.as_ref().map(Json))
        .bind(request.estimated_cost)
        .bind(request.actual_cost)
        .bind(request.completion_date)
        .bind(&request.images)
        .bind(request.created_at)
        .bind(request.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                StoreError::NotFound("Property not found".into())
            } else {
                err.into()
            }
        })?;
        Ok(row.into())
    }

    async fn update_maintenance(
        &self,
        request: Maintenance,
        expected: MaintenanceStatus,
    ) -> StoreResult<Maintenance> {
        let row = sqlx::query_as::<_, MaintenanceRow>(
            r#"
            UPDATE maintenance_requests SET
                issue = $2,
                description = $3,
                priority = $4,
                status = $5,
                assigned_to = $6,
                estimated_cost = $7,
                actual_cost = $8,
                completion_date = $9,
                images = $10,
                updated_at = NOW()
            WHERE id = $1 AND status = $11
            RETURNING *
            "#,
        )
        .bind(request.id)
        .bind(&request.issue)
        .bind(&request.description)
        .bind(request.priority)
        .bind(request.status)
        .bind(request.assigned_to.as_ref().map(Json))
        .bind(request.estimated_cost)
        .bind(request.actual_cost)
        .bind(request.completion_date)
        .bind(&request.images)
        .bind(expected)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(row.into()),
            None if self.find_maintenance(request.id).await?.is_some() => Err(
                StoreError::Conflict("Maintenance request was modified by another update".into()),
            ),
            None => Err(StoreError::NotFound("Maintenance request not found".into())),
        }
    }

    async fn delete_maintenance(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM maintenance_requests WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("Maintenance request not found".into()));
        }
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
