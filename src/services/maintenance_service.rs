use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{
    CreateMaintenanceRequest, Maintenance, MaintenanceStatus, UpdateMaintenanceRequest,
};
use crate::policy::{read_scope, require_role, workflow, Action, Actor, ReadScope};
use crate::services::{PropertyService, TenantService};
use crate::store::RentalStore;
use crate::utils::validators::{ensure_not_blank, sanitize_string};

pub struct MaintenanceService;

impl MaintenanceService {
    pub async fn list_for(store: &dyn RentalStore, actor: &Actor) -> AppResult<Vec<Maintenance>> {
        match read_scope(actor) {
            ReadScope::Everything => Ok(store.list_maintenance(None).await?),
            ReadScope::OwnRecords => match store.find_tenant_by_user(actor.user_id).await? {
                Some(tenant) => Ok(store.list_maintenance(Some(tenant.id)).await?),
                None => Ok(Vec::new()),
            },
        }
    }

    pub async fn create(
        store: &dyn RentalStore,
        actor: &Actor,
        payload: CreateMaintenanceRequest,
    ) -> AppResult<Maintenance> {
        require_role(actor, Action::CreateMaintenance)?;
        payload.validate()?;
        ensure_not_blank("Issue", &payload.issue)?;
        ensure_not_blank("Description", &payload.description)?;

        let (property_id, tenant_id) = if actor.is_owner() {
            let property_id = payload.property_id.ok_or_else(|| {
                AppError::Validation("Property ID is required".to_string())
            })?;
            (PropertyService::load(store, property_id).await?.id, None)
        } else {
            let tenant = TenantService::own_lease(store, actor).await?;
            (tenant.property_id, Some(tenant.id))
        };

        let now = Utc::now();
        let request = Maintenance {
            id: Uuid::new_v4(),
            property_id,
            tenant_id,
            issue: sanitize_string(&payload.issue),
            description: payload.description,
            priority: payload.priority.unwrap_or_default(),
            status: MaintenanceStatus::Pending,
            reported_by: actor.role,
            assigned_to: None,
            estimated_cost: None,
            actual_cost: None,
            completion_date: None,
            images: payload.images,
            created_at: now,
            updated_at: now,
        };

        let request = store.insert_maintenance(request).await?;
        tracing::info!(
            request_id = %request.id,
            property_id = %request.property_id,
            reported_by = request.reported_by.as_str(),
            "Maintenance request submitted"
        );
        Ok(request)
    }

    pub async fn update(
        store: &dyn RentalStore,
        actor: &Actor,
        request_id: Uuid,
        payload: UpdateMaintenanceRequest,
    ) -> AppResult<Maintenance> {
        require_role(actor, Action::UpdateMaintenance)?;
        payload.validate()?;

        let request = Self::load(store, request_id).await?;
        let previous = request.status;
        let request = workflow::apply_maintenance_update(request, payload, Utc::now())?;
        let request = store.update_maintenance(request, previous).await?;

        if previous != request.status {
            tracing::info!(
                request_id = %request.id,
                from = ?previous,
                to = ?request.status,
                "Maintenance status changed"
            );
        }
        Ok(request)
    }

    pub async fn delete(store: &dyn RentalStore, actor: &Actor, request_id: Uuid) -> AppResult<()> {
        require_role(actor, Action::DeleteMaintenance)?;

        Self::load(store, request_id).await?;
        store.delete_maintenance(request_id).await?;
        tracing::info!(request_id = %request_id, "Maintenance request deleted");
        Ok(())
    }

    async fn load(store: &dyn RentalStore, request_id: Uuid) -> AppResult<Maintenance> {
        store
            .find_maintenance(request_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Maintenance request not found".to_string()))
    }
}
