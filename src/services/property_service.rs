use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{CreatePropertyRequest, Property, PropertyFilter, UpdatePropertyRequest};
use crate::policy::{authorize, require_role, workflow, Action, Actor, OwnershipChain};
use crate::store::RentalStore;
use crate::utils::validators::{
    ensure_money, ensure_non_negative, ensure_not_blank, ensure_positive, ensure_precision,
    sanitize_string,
};

pub struct PropertyService;

impl PropertyService {
    pub async fn list_available(store: &dyn RentalStore) -> AppResult<Vec<Property>> {
        Ok(store.list_properties(PropertyFilter::Available).await?)
    }

    /// Owners see their own listings; tenants see what is still available.
    pub async fn list_for(store: &dyn RentalStore, actor: &Actor) -> AppResult<Vec<Property>> {
        let filter = if actor.is_owner() {
            PropertyFilter::OwnedBy(actor.user_id)
        } else {
            PropertyFilter::Available
        };
        Ok(store.list_properties(filter).await?)
    }

    pub async fn create(
        store: &dyn RentalStore,
        actor: &Actor,
        payload: CreatePropertyRequest,
    ) -> AppResult<Property> {
        require_role(actor, Action::CreateProperty)?;
        payload.validate()?;
        ensure_not_blank("Property name", &payload.name)?;
        ensure_positive("Rent", payload.rent)?;
        ensure_money("Rent", payload.rent)?;
        ensure_non_negative("Bathrooms", payload.bathrooms)?;
        ensure_precision("Bathrooms", payload.bathrooms, 4, 1)?;
        ensure_positive("Area", payload.area)?;
        ensure_precision("Area", payload.area, 10, 2)?;

        let now = Utc::now();
        let property = Property {
            id: Uuid::new_v4(),
            owner_id: actor.user_id,
            name: sanitize_string(&payload.name),
            address: payload.address.into(),
            rent: payload.rent,
            bedrooms: payload.bedrooms,
            bathrooms: payload.bathrooms,
            area: payload.area,
            description: payload.description,
            features: payload.features,
            is_available: true,
            created_at: now,
            updated_at: now,
        };

        let property = store.insert_property(property).await?;
        tracing::info!(property_id = %property.id, owner_id = %actor.user_id, "Property created");
        Ok(property)
    }

    pub async fn update(
        store: &dyn RentalStore,
        actor: &Actor,
        property_id: Uuid,
        payload: UpdatePropertyRequest,
    ) -> AppResult<Property> {
        require_role(actor, Action::UpdateProperty)?;
        payload.validate()?;

        let property = Self::load(store, property_id).await?;
        authorize(actor, Action::UpdateProperty, OwnershipChain::from(&property))?;

        let property = workflow::apply_property_update(property, payload)?;
        let property = store.update_property(property).await?;
        tracing::info!(property_id = %property.id, "Property updated");
        Ok(property)
    }

    pub async fn delete(store: &dyn RentalStore, actor: &Actor, property_id: Uuid) -> AppResult<()> {
        require_role(actor, Action::DeleteProperty)?;

        let property = Self::load(store, property_id).await?;
        authorize(actor, Action::DeleteProperty, OwnershipChain::from(&property))?;

        if store.count_tenants_for_property(property_id).await? > 0 {
            return Err(AppError::Validation(
                "Remove the property's tenants before deleting it".to_string(),
            ));
        }

        store.delete_property(property_id).await?;
        tracing::info!(property_id = %property_id, "Property deleted");
        Ok(())
    }

    /// Recomputes availability of the caller's properties from their tenants.
    pub async fn reconcile(store: &dyn RentalStore, actor: &Actor) -> AppResult<u64> {
        require_role(actor, Action::ReconcileAvailability)?;
        let corrected = store.reconcile_availability(Some(actor.user_id)).await?;
        if corrected > 0 {
            tracing::warn!(owner_id = %actor.user_id, corrected, "Availability drift repaired");
        }
        Ok(corrected)
    }

    pub(crate) async fn load(store: &dyn RentalStore, property_id: Uuid) -> AppResult<Property> {
        store
            .find_property(property_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Property not found".to_string()))
    }
}
