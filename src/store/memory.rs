//! In-memory implementation of [`RentalStore`].
//!
//! All collections live behind a single `tokio::sync::RwLock`, so a tenant write and
//! the availability update of its property happen under the same write guard. State
//! is lost on restart; this backend serves local development and tests.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RentalStore, StoreError, StoreResult};
use crate::models::{
    Maintenance, MaintenanceStatus, MethodTotal, Payment, PaymentMethod, PaymentStatus, Property, PropertyFilter,
    Tenant, User,
};

#[derive(Debug, Default)]
struct Collections {
    users: HashMap<Uuid, User>,
    properties: HashMap<Uuid, Property>,
    tenants: HashMap<Uuid, Tenant>,
    payments: HashMap<Uuid, Payment>,
    maintenance: HashMap<Uuid, Maintenance>,
}

impl Collections {
    fn has_active_tenant(&self, property_id: Uuid) -> bool {
        self.tenants
            .values()
            .any(|t| t.property_id == property_id && t.is_active())
    }

    /// Returns true when the stored flag had to change.
    fn refresh_availability(&mut self, property_id: Uuid) -> bool {
        let available = !self.has_active_tenant(property_id);
        match self.properties.get_mut(&property_id) {
            Some(property) if property.is_available != available => {
                property.is_available = available;
                property.updated_at = Utc::now();
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Collections>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrites a stored availability flag without touching tenants, producing
    /// the drift older non-transactional writers left behind.
    ///
    /// Not part of [`RentalStore`] and never reached from request handling: only
    /// tests and seeding tools that exercise `reconcile_availability` call it.
    /// `PostgresStore` has no equivalent; drift there is produced with plain SQL.
    pub async fn force_availability(&self, property_id: Uuid, available: bool) {
        let mut inner = self.inner.write().await;
        if let Some(property) = inner.properties.get_mut(&property_id) {
            property.is_available = available;
        }
    }
}

fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> DateTime<Utc>) {
    items.sort_by_key(|item| std::cmp::Reverse(key(item)));
}

#[async_trait]
impl RentalStore for InMemoryStore {
    async fn find_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn insert_user(&self, user: User) -> StoreResult<User> {
        let mut inner = self.inner.write().await;
        if inner.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("User with this email already exists".into()));
        }
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn users_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<User>> {
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.users.get(id).cloned())
            .collect())
    }

    async fn list_properties(&self, filter: PropertyFilter) -> StoreResult<Vec<Property>> {
        let inner = self.inner.read().await;
        let mut properties: Vec<Property> = inner
            .properties
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        newest_first(&mut properties, |p| p.created_at);
        Ok(properties)
    }

    async fn find_property(&self, id: Uuid) -> StoreResult<Option<Property>> {
        Ok(self.inner.read().await.properties.get(&id).cloned())
    }

    async fn properties_by_ids(&self, ids: &[Uuid]) -> StoreResult<Vec<Property>> {
        let inner = self.inner.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| inner.properties.get(id).cloned())
            .collect())
    }

    async fn insert_property(&self, property: Property) -> StoreResult<Property> {
        let mut inner = self.inner.write().await;
        inner.properties.insert(property.id, property.clone());
        Ok(property)
    }

    async fn update_property(&self, mut property: Property) -> StoreResult<Property> {
        let mut inner = self.inner.write().await;
        let available = !inner.has_active_tenant(property.id);
        let stored = inner
            .properties
            .get_mut(&property.id)
            .ok_or_else(|| StoreError::NotFound("Property not found".into()))?;
        property.is_available = available;
        property.updated_at = Utc::now();
        *stored = property.clone();
        Ok(property)
    }

    async fn delete_property(&self, id: Uuid) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if inner.tenants.values().any(|t| t.property_id == id) {
            return Err(StoreError::Conflict("Property still has tenants".into()));
        }
        inner
            .properties
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound("Property not found".into()))?;
        inner.maintenance.retain(|_, m| m.property_id != id);
        Ok(())
    }

    async fn list_tenants(&self) -> StoreResult<Vec<Tenant>> {
        let mut tenants: Vec<Tenant> = self.inner.read().await.tenants.values().cloned().collect();
        newest_first(&mut tenants, |t| t.created_at);
        Ok(tenants)
    }

    async fn find_tenant(&self, id: Uuid) -> StoreResult<Option<Tenant>> {
        Ok(self.inner.read().await.tenants.get(&id).cloned())
    }

    async fn find_tenant_by_user(&self, user_id: Uuid) -> StoreResult<Option<Tenant>> {
        let inner = self.inner.read().await;
        Ok(inner
            .tenants
            .values()
            .filter(|t| t.user_id == user_id)
            .max_by_key(|t| (t.is_active(), t.created_at))
            .cloned())
    }

    async fn tenant_exists_for(&self, user_id: Uuid, property_id: Uuid) -> StoreResult<bool> {
        let inner = self.inner.read().await;
        Ok(inner
            .tenants
            .values()
            .any(|t| t.user_id == user_id && t.property_id == property_id))
    }

    async fn count_tenants_for_property(&self, property_id: Uuid) -> StoreResult<i64> {
        let inner = self.inner.read().await;
        Ok(inner
            .tenants
            .values()
            .filter(|t| t.property_id == property_id)
            .count() as i64)
    }

    async fn create_tenancy(&self, tenant: Tenant) -> StoreResult<Tenant> {
        let mut inner = self.inner.write().await;
        if !inner.properties.contains_key(&tenant.property_id) {
            return Err(StoreError::NotFound("Property not found".into()));
        }
        if inner
            .tenants
            .values()
            .any(|t| t.user_id == tenant.user_id && t.property_id == tenant.property_id)
        {
            return Err(StoreError::Conflict(
                "Tenant already exists for this property".into(),
            ));
        }
        inner.tenants.insert(tenant.id, tenant.clone());
        inner.refresh_availability(tenant.property_id);
        Ok(tenant)
    }

    async fn update_tenancy(&self, mut tenant: Tenant) -> StoreResult<Tenant> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .tenants
            .get_mut(&tenant.id)
            .ok_or_else(|| StoreError::NotFound("Tenant not found".into()))?;
        tenant.updated_at = Utc::now();
        *stored = tenant.clone();
        inner.refresh_availability(tenant.property_id);
        Ok(tenant)
    }

    async fn remove_tenancy(&self, id: Uuid) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let removed = inner
            .tenants
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound("Tenant not found".into()))?;
        for request in inner.maintenance.values_mut() {
            if request.tenant_id == Some(id) {
                request.tenant_id = None;
            }
        }
        inner.refresh_availability(removed.property_id);
        Ok(())
    }

    async fn reconcile_availability(&self, owner_id: Option<Uuid>) -> StoreResult<u64> {
        let mut inner = self.inner.write().await;
        let ids: Vec<Uuid> = inner
            .properties
            .values()
            .filter(|p| owner_id.map_or(true, |owner| p.owner_id == owner))
            .map(|p| p.id)
            .collect();
        let mut changed = 0;
        for id in ids {
            if inner.refresh_availability(id) {
                changed += 1;
            }
        }
        Ok(changed)
    }

    async fn list_payments(&self, tenant_id: Option<Uuid>) -> StoreResult<Vec<Payment>> {
        let inner = self.inner.read().await;
        let mut payments: Vec<Payment> = inner
            .payments
            .values()
            .filter(|p| tenant_id.map_or(true, |id| p.tenant_id == id))
            .cloned()
            .collect();
        newest_first(&mut payments, |p| p.payment_date);
        Ok(payments)
    }

    async fn insert_payment(&self, payment: Payment) -> StoreResult<Payment> {
        let mut inner = self.inner.write().await;
        inner.payments.insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn paid_total(
        &self,
        from: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> StoreResult<Decimal> {
        let inner = self.inner.read().await;
        Ok(inner
            .payments
            .values()
            .filter(|p| p.status == PaymentStatus::Paid)
            .filter(|p| p.payment_date >= from && p.payment_date < until)
            .map(|p| p.amount)
            .sum())
    }

    async fn paid_by_method(&self) -> StoreResult<Vec<MethodTotal>> {
        let inner = self.inner.read().await;
        let mut groups: BTreeMap<PaymentMethod, (i64, Decimal)> = BTreeMap::new();
        for payment in inner
            .payments
            .values()
            .filter(|p| p.status == PaymentStatus::Paid)
        {
            let entry = groups.entry(payment.method).or_insert((0, Decimal::ZERO));
            entry.0 += 1;
            entry.1 += payment.amount;
        }
        Ok(groups
            .into_iter()
            .map(|(method, (count, total))| MethodTotal {
                method,
                count,
                total,
            })
            .collect())
    }

    async fn list_maintenance(&self, tenant_id: Option<Uuid>) -> StoreResult<Vec<Maintenance>> {
        let inner = self.inner.read().await;
        let mut requests: Vec<Maintenance> = inner
            .maintenance
            .values()
            .filter(|m| tenant_id.map_or(true, |id| m.tenant_id == Some(id)))
            .cloned()
            .collect();
        newest_first(&mut requests, |m| m.created_at);
        Ok(requests)
    }

    async fn find_maintenance(&self, id: Uuid) -> StoreResult<Option<Maintenance>> {
        Ok(self.inner.read().await.maintenance.get(&id).cloned())
    }

    async fn insert_maintenance(&self, request: Maintenance) -> StoreResult<Maintenance> {
        let mut inner = self.inner.write().await;
        if !inner.properties.contains_key(&request.property_id) {
            return Err(StoreError::NotFound("Property not found".into()));
        }
        inner.maintenance.insert(request.id, request.clone());
        Ok(request)
    }

    async fn update_maintenance(
        &self,
        mut request: Maintenance,
        expected: MaintenanceStatus,
    ) -> StoreResult<Maintenance> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .maintenance
            .get_mut(&request.id)
            .ok_or_else(|| StoreError::NotFound("Maintenance request not found".into()))?;
        if stored.status != expected {
            return Err(StoreError::Conflict(
                "Maintenance request was modified by another update".into(),
            ));
        }
        request.updated_at = Utc::now();
        *stored = request.clone();
        Ok(request)
    }

    async fn delete_maintenance(&self, id: Uuid) -> StoreResult<()> {
        self.inner
            .write()
            .await
            .maintenance
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound("Maintenance request not found".into()))
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Address, MaintenancePriority, TenantStatus, UserRole};
    use chrono::{Duration, NaiveDate};

    fn property(owner_id: Uuid) -> Property {
        let now = Utc::now();
        Property {
            id: Uuid::new_v4(),
            owner_id,
            name: "Loft".into(),
            address: Address {
                street: "1 Main St".into(),
                ..Default::default()
            },
            rent: Decimal::from(1000),
            bedrooms: 1,
            bathrooms: Decimal::ONE,
            area: Decimal::from(50),
            description: None,
            features: vec![],
            is_available: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn tenant(user_id: Uuid, property_id: Uuid) -> Tenant {
        let now = Utc::now();
        Tenant {
            id: Uuid::new_v4(),
            user_id,
            property_id,
            unit: "1A".into(),
            lease_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            lease_end: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            rent: Decimal::from(1000),
            security_deposit: Decimal::ZERO,
            status: TenantStatus::Active,
            emergency_contact: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn availability_follows_active_tenants() {
        let store = InMemoryStore::new();
        let p = store.insert_property(property(Uuid::new_v4())).await.unwrap();

        let first = store.create_tenancy(tenant(Uuid::new_v4(), p.id)).await.unwrap();
        let second = store.create_tenancy(tenant(Uuid::new_v4(), p.id)).await.unwrap();
        assert!(!store.find_property(p.id).await.unwrap().unwrap().is_available);

        store.remove_tenancy(first.id).await.unwrap();
        assert!(!store.find_property(p.id).await.unwrap().unwrap().is_available);

        let mut inactive = second.clone();
        inactive.status = TenantStatus::Inactive;
        store.update_tenancy(inactive).await.unwrap();
        assert!(store.find_property(p.id).await.unwrap().unwrap().is_available);
    }

    #[tokio::test]
    async fn duplicate_pair_is_a_conflict_and_keeps_flag() {
        let store = InMemoryStore::new();
        let p = store.insert_property(property(Uuid::new_v4())).await.unwrap();
        let user = Uuid::new_v4();
        let lease = store.create_tenancy(tenant(user, p.id)).await.unwrap();
        store.remove_tenancy(lease.id).await.unwrap();
        store.create_tenancy(tenant(user, p.id)).await.unwrap();

        let err = store.create_tenancy(tenant(user, p.id)).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert!(!store.find_property(p.id).await.unwrap().unwrap().is_available);
    }

    #[tokio::test]
    async fn reconcile_repairs_drift_for_one_owner() {
        let store = InMemoryStore::new();
        let owner = Uuid::new_v4();
        let occupied = store.insert_property(property(owner)).await.unwrap();
        let vacant = store.insert_property(property(owner)).await.unwrap();
        let foreign = store.insert_property(property(Uuid::new_v4())).await.unwrap();
        store
            .create_tenancy(tenant(Uuid::new_v4(), occupied.id))
            .await
            .unwrap();

        store.force_availability(occupied.id, true).await;
        store.force_availability(vacant.id, false).await;
        store.force_availability(foreign.id, false).await;

        assert_eq!(store.reconcile_availability(Some(owner)).await.unwrap(), 2);
        assert!(!store.find_property(foreign.id).await.unwrap().unwrap().is_available);
        assert_eq!(store.reconcile_availability(None).await.unwrap(), 1);
    }

    fn maintenance(property_id: Uuid, status: MaintenanceStatus) -> Maintenance {
        let now = Utc::now();
        Maintenance {
            id: Uuid::new_v4(),
            property_id,
            tenant_id: None,
            issue: "Broken heater".into(),
            description: "No heat in bedroom".into(),
            priority: MaintenancePriority::High,
            status,
            reported_by: UserRole::Owner,
            assigned_to: None,
            estimated_cost: None,
            actual_cost: None,
            completion_date: None,
            images: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn stale_maintenance_write_is_a_conflict() {
        let store = InMemoryStore::new();
        let p = store.insert_property(property(Uuid::new_v4())).await.unwrap();
        let open = store
            .insert_maintenance(maintenance(p.id, MaintenanceStatus::InProgress))
            .await
            .unwrap();

        let mut completed = open.clone();
        completed.status = MaintenanceStatus::Completed;
        completed.completion_date = Some(Utc::now());
        store
            .update_maintenance(completed.clone(), MaintenanceStatus::InProgress)
            .await
            .unwrap();

        let mut cancelled = open.clone();
        cancelled.status = MaintenanceStatus::Cancelled;
        let err = store
            .update_maintenance(cancelled, MaintenanceStatus::InProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let stored = store.find_maintenance(open.id).await.unwrap().unwrap();
        assert_eq!(stored.status, MaintenanceStatus::Completed);
        assert_eq!(stored.completion_date, completed.completion_date);
    }

    #[tokio::test]
    async fn paid_total_respects_window_and_status() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        for (amount, status, offset) in [
            (100, PaymentStatus::Paid, 0),
            (50, PaymentStatus::Pending, 0),
            (70, PaymentStatus::Paid, -40),
        ] {
            let date = now + Duration::days(offset);
            store
                .insert_payment(Payment {
                    id: Uuid::new_v4(),
                    tenant_id: Uuid::new_v4(),
                    property_id: Uuid::new_v4(),
                    amount: Decimal::from(amount),
                    payment_date: date,
                    due_date: date,
                    status,
                    method: PaymentMethod::Cash,
                    month: "2024-05".into(),
                    reference: None,
                    notes: None,
                    created_at: date,
                    updated_at: date,
                })
                .await
                .unwrap();
        }

        let total = store
            .paid_total(now - Duration::days(1), now + Duration::days(1))
            .await
            .unwrap();
        assert_eq!(total, Decimal::from(100));

        let methods = store.paid_by_method().await.unwrap();
        assert_eq!(
            methods,
            vec![MethodTotal {
                method: PaymentMethod::Cash,
                count: 2,
                total: Decimal::from(170),
            }]
        );
    }
}
