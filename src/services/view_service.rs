use std::collections::HashMap;

use uuid::Uuid;

use crate::error::AppResult;
use crate::models::{
    Maintenance, MaintenanceView, Payment, PaymentView, Property, PropertySummary, PropertyView,
    Tenant, TenantView, User, UserSummary,
};
use crate::store::RentalStore;

/// Attaches owner, user and property summaries to records. One batch lookup per
/// related collection, whatever the number of records.
pub struct ViewService;

impl ViewService {
    pub async fn properties(
        store: &dyn RentalStore,
        properties: Vec<Property>,
    ) -> AppResult<Vec<PropertyView>> {
        let owners = Self::users(store, properties.iter().map(|p| p.owner_id)).await?;
        Ok(properties
            .into_iter()
            .map(|property| {
                let owner = owners.get(&property.owner_id).map(UserSummary::from);
                PropertyView { property, owner }
            })
            .collect())
    }

    pub async fn property(store: &dyn RentalStore, property: Property) -> AppResult<PropertyView> {
        let owner = store.find_user(property.owner_id).await?;
        Ok(PropertyView {
            owner: owner.as_ref().map(UserSummary::from),
            property,
        })
    }

    pub async fn tenants(store: &dyn RentalStore, tenants: Vec<Tenant>) -> AppResult<Vec<TenantView>> {
        let users = Self::users(store, tenants.iter().map(|t| t.user_id)).await?;
        let properties = Self::properties_by_id(store, tenants.iter().map(|t| t.property_id)).await?;
        Ok(tenants
            .into_iter()
            .map(|tenant| {
                let user = users.get(&tenant.user_id).map(UserSummary::from);
                let property = properties
                    .get(&tenant.property_id)
                    .map(PropertySummary::from);
                TenantView {
                    tenant,
                    user,
                    property,
                }
            })
            .collect())
    }

    pub async fn tenant(store: &dyn RentalStore, tenant: Tenant) -> AppResult<TenantView> {
        let user = store.find_user(tenant.user_id).await?;
        let property = store.find_property(tenant.property_id).await?;
        Ok(TenantView {
            user: user.as_ref().map(UserSummary::from),
            property: property.as_ref().map(PropertySummary::from),
            tenant,
        })
    }

    pub async fn payments(
        store: &dyn RentalStore,
        payments: Vec<Payment>,
    ) -> AppResult<Vec<PaymentView>> {
        let properties =
            Self::properties_by_id(store, payments.iter().map(|p| p.property_id)).await?;
        Ok(payments
            .into_iter()
            .map(|payment| {
                let property = properties
                    .get(&payment.property_id)
                    .map(PropertySummary::from);
                PaymentView { payment, property }
            })
            .collect())
    }

    pub async fn payment(store: &dyn RentalStore, payment: Payment) -> AppResult<PaymentView> {
        let property = store.find_property(payment.property_id).await?;
        Ok(PaymentView {
            property: property.as_ref().map(PropertySummary::from),
            payment,
        })
    }

    pub async fn maintenance_list(
        store: &dyn RentalStore,
        requests: Vec<Maintenance>,
    ) -> AppResult<Vec<MaintenanceView>> {
        let properties =
            Self::properties_by_id(store, requests.iter().map(|m| m.property_id)).await?;
        Ok(requests
            .into_iter()
            .map(|maintenance| {
                let property = properties
                    .get(&maintenance.property_id)
                    .map(PropertySummary::from);
                MaintenanceView {
                    maintenance,
                    property,
                }
            })
            .collect())
    }

    pub async fn maintenance(
        store: &dyn RentalStore,
        maintenance: Maintenance,
    ) -> AppResult<MaintenanceView> {
        let property = store.find_property(maintenance.property_id).await?;
        Ok(MaintenanceView {
            property: property.as_ref().map(PropertySummary::from),
            maintenance,
        })
    }

    async fn users(
        store: &dyn RentalStore,
        ids: impl Iterator<Item = Uuid>,
    ) -> AppResult<HashMap<Uuid, User>> {
        let ids = distinct(ids);
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(store
            .users_by_ids(&ids)
            .await?
            .into_iter()
            .map(|user| (user.id, user))
            .collect())
    }

    async fn properties_by_id(
        store: &dyn RentalStore,
        ids: impl Iterator<Item = Uuid>,
    ) -> AppResult<HashMap<Uuid, Property>> {
        let ids = distinct(ids);
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        Ok(store
            .properties_by_ids(&ids)
            .await?
            .into_iter()
            .map(|property| (property.id, property))
            .collect())
    }
}

fn distinct(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = ids.collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}
