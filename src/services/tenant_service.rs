use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{CreateTenantRequest, Tenant, TenantStatus, UpdateTenantRequest, UserRole};
use crate::policy::{
    authorize, read_scope, require_role, workflow, Action, Actor, OwnershipChain, ReadScope,
};
use crate::services::PropertyService;
use crate::store::{RentalStore, StoreError};
use crate::utils::validators::{
    ensure_contact_phone, ensure_lease_order, ensure_money, ensure_non_negative,
    ensure_not_blank, ensure_positive, sanitize_string,
};

const DUPLICATE_TENANT: &str = "Tenant already exists for this property";

pub struct TenantService;

impl TenantService {
    pub async fn list_for(store: &dyn RentalStore, actor: &Actor) -> AppResult<Vec<Tenant>> {
        match read_scope(actor) {
            ReadScope::Everything => Ok(store.list_tenants().await?),
            ReadScope::OwnRecords => Ok(store
                .find_tenant_by_user(actor.user_id)
                .await?
                .into_iter()
                .collect()),
        }
    }

    pub async fn create(
        store: &dyn RentalStore,
        actor: &Actor,
        payload: CreateTenantRequest,
    ) -> AppResult<Tenant> {
        require_role(actor, Action::CreateTenant)?;
        payload.validate()?;
        ensure_not_blank("Unit", &payload.unit)?;
        ensure_lease_order(payload.lease_start, payload.lease_end)?;
        ensure_positive("Rent", payload.rent)?;
        ensure_money("Rent", payload.rent)?;
        let security_deposit = payload.security_deposit.unwrap_or(Decimal::ZERO);
        ensure_non_negative("Security deposit", security_deposit)?;
        ensure_money("Security deposit", security_deposit)?;
        if let Some(contact) = &payload.emergency_contact {
            ensure_contact_phone(contact.phone.as_deref())?;
        }

        match store.find_user(payload.user_id).await? {
            Some(user) if user.role == UserRole::Tenant => {}
            _ => {
                return Err(AppError::Validation(
                    "User not found or is not a tenant".to_string(),
                ))
            }
        }

        let property = PropertyService::load(store, payload.property_id).await?;
        authorize(actor, Action::CreateTenant, OwnershipChain::from(&property))?;

        if store
            .tenant_exists_for(payload.user_id, payload.property_id)
            .await?
        {
            return Err(AppError::Validation(DUPLICATE_TENANT.to_string()));
        }

        let now = Utc::now();
        let tenant = Tenant {
            id: Uuid::new_v4(),
            user_id: payload.user_id,
            property_id: payload.property_id,
            unit: sanitize_string(&payload.unit),
            lease_start: payload.lease_start,
            lease_end: payload.lease_end,
            rent: payload.rent,
            security_deposit,
            status: TenantStatus::Active,
            emergency_contact: payload.emergency_contact,
            created_at: now,
            updated_at: now,
        };

        let tenant = store.create_tenancy(tenant).await.map_err(|err| match err {
            // Lost a race with a concurrent insert of the same pair.
            StoreError::Conflict(_) => AppError::Validation(DUPLICATE_TENANT.to_string()),
            other => other.into(),
        })?;
        tracing::info!(
            tenant_id = %tenant.id,
            property_id = %tenant.property_id,
            "Tenant added, property marked occupied"
        );
        Ok(tenant)
    }

    pub async fn update(
        store: &dyn RentalStore,
        actor: &Actor,
        tenant_id: Uuid,
        payload: UpdateTenantRequest,
    ) -> AppResult<Tenant> {
        require_role(actor, Action::UpdateTenant)?;
        payload.validate()?;

        let tenant = Self::load_owned(store, actor, tenant_id, Action::UpdateTenant).await?;
        let tenant = workflow::apply_tenant_update(tenant, payload)?;
        let tenant = store.update_tenancy(tenant).await?;
        tracing::info!(tenant_id = %tenant.id, status = ?tenant.status, "Tenant updated");
        Ok(tenant)
    }

    pub async fn delete(store: &dyn RentalStore, actor: &Actor, tenant_id: Uuid) -> AppResult<()> {
        require_role(actor, Action::DeleteTenant)?;

        let tenant = Self::load_owned(store, actor, tenant_id, Action::DeleteTenant).await?;
        store.remove_tenancy(tenant.id).await?;
        tracing::info!(
            tenant_id = %tenant.id,
            property_id = %tenant.property_id,
            "Tenant removed, property availability restored"
        );
        Ok(())
    }

    /// Resolves the tenant and walks Tenant -> Property -> owner.
    async fn load_owned(
        store: &dyn RentalStore,
        actor: &Actor,
        tenant_id: Uuid,
        action: Action,
    ) -> AppResult<Tenant> {
        let tenant = Self::load(store, tenant_id).await?;
        let property = PropertyService::load(store, tenant.property_id).await?;
        authorize(actor, action, OwnershipChain::from(&property))?;
        Ok(tenant)
    }

    pub(crate) async fn load(store: &dyn RentalStore, tenant_id: Uuid) -> AppResult<Tenant> {
        store
            .find_tenant(tenant_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))
    }

    /// The lease of a tenant caller; 404 when they have none.
    pub(crate) async fn own_lease(store: &dyn RentalStore, actor: &Actor) -> AppResult<Tenant> {
        store
            .find_tenant_by_user(actor.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Tenant not found".to_string()))
    }
}
