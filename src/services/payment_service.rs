use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::models::{Payment, PaymentStatus, RecordPaymentRequest};
use crate::policy::{read_scope, require_role, Action, Actor, ReadScope};
use crate::services::{PropertyService, TenantService};
use crate::store::RentalStore;
use crate::utils::validators::{
    ensure_money, ensure_non_negative, ensure_not_blank, sanitize_string,
};

pub struct PaymentService;

impl PaymentService {
    pub async fn list_for(store: &dyn RentalStore, actor: &Actor) -> AppResult<Vec<Payment>> {
        match read_scope(actor) {
            ReadScope::Everything => Ok(store.list_payments(None).await?),
            ReadScope::OwnRecords => match store.find_tenant_by_user(actor.user_id).await? {
                Some(tenant) => Ok(store.list_payments(Some(tenant.id)).await?),
                None => Ok(Vec::new()),
            },
        }
    }

    /// Records a payment as an already-settled fact dated now.
    pub async fn record(
        store: &dyn RentalStore,
        actor: &Actor,
        payload: RecordPaymentRequest,
    ) -> AppResult<Payment> {
        require_role(actor, Action::RecordPayment)?;
        payload.validate()?;
        ensure_not_blank("Month", &payload.month)?;
        ensure_non_negative("Amount", payload.amount)?;
        ensure_money("Amount", payload.amount)?;

        let (tenant, property_id) = if actor.is_owner() {
            let tenant_id = payload.tenant_id.ok_or_else(|| {
                AppError::Validation("Tenant ID is required for owner payments".to_string())
            })?;
            let tenant = TenantService::load(store, tenant_id).await?;
            let property_id = match payload.property_id {
                Some(id) => PropertyService::load(store, id).await?.id,
                None => tenant.property_id,
            };
            (tenant, property_id)
        } else {
            let tenant = TenantService::own_lease(store, actor).await?;
            let property_id = tenant.property_id;
            (tenant, property_id)
        };

        let now = Utc::now();
        let payment = Payment {
            id: Uuid::new_v4(),
            tenant_id: tenant.id,
            property_id,
            amount: payload.amount,
            payment_date: now,
            due_date: now,
            status: PaymentStatus::Paid,
            method: payload.method.unwrap_or_default(),
            month: sanitize_string(&payload.month),
            reference: payload.reference,
            notes: payload.notes,
            created_at: now,
            updated_at: now,
        };

        let payment = store.insert_payment(payment).await?;
        tracing::info!(
            payment_id = %payment.id,
            tenant_id = %payment.tenant_id,
            amount = %payment.amount,
            "Payment recorded"
        );
        Ok(payment)
    }
}
