//! Explicit update functions.
//!
//! Each entity accepts only its declared field set; everything else on the stored
//! record is carried over untouched. Results are re-validated before they are handed
//! back to the store.
use chrono::{DateTime, Utc};

use crate::error::{AppError, AppResult};
use crate::models::{
    Maintenance, MaintenanceStatus, Property, Tenant, UpdateMaintenanceRequest,
    UpdatePropertyRequest, UpdateTenantRequest,
};
use crate::utils::validators::{
    ensure_contact_phone, ensure_lease_order, ensure_money, ensure_non_negative,
    ensure_not_blank, ensure_positive, ensure_precision, sanitize_string,
};

pub fn apply_property_update(
    mut property: Property,
    update: UpdatePropertyRequest,
) -> AppResult<Property> {
    if let Some(name) = update.name {
        ensure_not_blank("Property name", &name)?;
        property.name = sanitize_string(&name);
    }
    if let Some(address) = update.address {
        property.address = address.into();
    }
    if let Some(rent) = update.rent {
        ensure_positive("Rent", rent)?;
        ensure_money("Rent", rent)?;
        property.rent = rent;
    }
    if let Some(bedrooms) = update.bedrooms {
        property.bedrooms = bedrooms;
    }
    if let Some(bathrooms) = update.bathrooms {
        ensure_non_negative("Bathrooms", bathrooms)?;
        ensure_precision("Bathrooms", bathrooms, 4, 1)?;
        property.bathrooms = bathrooms;
    }
    if let Some(area) = update.area {
        ensure_positive("Area", area)?;
        ensure_precision("Area", area, 10, 2)?;
        property.area = area;
    }
    if update.description.is_some() {
        property.description = update.description;
    }
    if let Some(features) = update.features {
        property.features = features;
    }
    Ok(property)
}

pub fn apply_tenant_update(mut tenant: Tenant, update: UpdateTenantRequest) -> AppResult<Tenant> {
    if let Some(unit) = update.unit {
        ensure_not_blank("Unit", &unit)?;
        tenant.unit = sanitize_string(&unit);
    }
    if let Some(start) = update.lease_start {
        tenant.lease_start = start;
    }
    if let Some(end) = update.lease_end {
        tenant.lease_end = end;
    }
    ensure_lease_order(tenant.lease_start, tenant.lease_end)?;

    if let Some(rent) = update.rent {
        ensure_positive("Rent", rent)?;
        ensure_money("Rent", rent)?;
        tenant.rent = rent;
    }
    if let Some(deposit) = update.security_deposit {
        ensure_non_negative("Security deposit", deposit)?;
        ensure_money("Security deposit", deposit)?;
        tenant.security_deposit = deposit;
    }
    if let Some(status) = update.status {
        tenant.status = status;
    }
    if let Some(contact) = update.emergency_contact {
        ensure_contact_phone(contact.phone.as_deref())?;
        tenant.emergency_contact = Some(contact);
    }
    Ok(tenant)
}

/// Moves a request to `next`, stamping the completion date on entry to `completed`.
pub fn transition(
    request: &mut Maintenance,
    next: MaintenanceStatus,
    now: DateTime<Utc>,
) -> AppResult<()> {
    if request.status == next {
        return Ok(());
    }
    if !request.status.can_transition_to(next) {
        return Err(AppError::Validation(format!(
            "Cannot move maintenance request from {} to {}",
            status_label(request.status),
            status_label(next)
        )));
    }
    request.status = next;
    if next == MaintenanceStatus::Completed {
        request.completion_date = Some(now);
    }
    Ok(())
}

pub fn apply_maintenance_update(
    mut request: Maintenance,
    update: UpdateMaintenanceRequest,
    now: DateTime<Utc>,
) -> AppResult<Maintenance> {
    if let Some(status) = update.status {
        transition(&mut request, status, now)?;
    }
    if let Some(issue) = update.issue {
        ensure_not_blank("Issue", &issue)?;
        request.issue = sanitize_string(&issue);
    }
    if let Some(description) = update.description {
        ensure_not_blank("Description", &description)?;
        request.description = description;
    }
    if let Some(priority) = update.priority {
        request.priority = priority;
    }
    if let Some(assignee) = update.assigned_to {
        ensure_contact_phone(assignee.phone.as_deref())?;
        request.assigned_to = Some(assignee);
    }
    if let Some(cost) = update.estimated_cost {
        ensure_non_negative("Estimated cost", cost)?;
        ensure_money("Estimated cost", cost)?;
        request.estimated_cost = Some(cost);
    }
    if let Some(cost) = update.actual_cost {
        ensure_non_negative("Actual cost", cost)?;
        ensure_money("Actual cost", cost)?;
        request.actual_cost = Some(cost);
    }
    if let Some(images) = update.images {
        request.images = images;
    }
    Ok(request)
}

fn status_label(status: MaintenanceStatus) -> &'static str {
    match status {
        MaintenanceStatus::Pending => "pending",
        MaintenanceStatus::Assigned => "assigned",
        MaintenanceStatus::InProgress => "in-progress",
        MaintenanceStatus::Completed => "completed",
        MaintenanceStatus::Cancelled => "cancelled",
    }
}
