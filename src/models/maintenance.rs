use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::UserRole;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "maintenance_status")]
pub enum MaintenanceStatus {
    #[sqlx(rename = "pending")]
    #[serde(rename = "pending")]
    Pending,
    #[sqlx(rename = "assigned")]
    #[serde(rename = "assigned")]
    Assigned,
    #[sqlx(rename = "in-progress")]
    #[serde(rename = "in-progress")]
    InProgress,
    #[sqlx(rename = "completed")]
    #[serde(rename = "completed")]
    Completed,
    #[sqlx(rename = "cancelled")]
    #[serde(rename = "cancelled")]
    Cancelled,
}

impl Default for MaintenanceStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl MaintenanceStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Forward steps only; cancellation is allowed from any open state.
    pub fn can_transition_to(&self, next: MaintenanceStatus) -> bool {
        use MaintenanceStatus::*;
        match (self, next) {
            (Pending, Assigned) | (Assigned, InProgress) | (InProgress, Completed) => true,
            (current, Cancelled) => !current.is_terminal(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "maintenance_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MaintenancePriority {
    Low,
    Medium,
    High,
    Emergency,
}

impl Default for MaintenancePriority {
    fn default() -> Self {
        Self::Medium
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub struct Assignee {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Maintenance {
    pub id: Uuid,
    pub property_id: Uuid,
    pub tenant_id: Option<Uuid>,
    pub issue: String,
    pub description: String,
    pub priority: MaintenancePriority,
    pub status: MaintenanceStatus,
    pub reported_by: UserRole,
    pub assigned_to: Option<Assignee>,
    pub estimated_cost: Option<Decimal>,
    pub actual_cost: Option<Decimal>,
    pub completion_date: Option<DateTime<Utc>>,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateMaintenanceRequest {
    #[validate(length(min = 1, max = 255, message = "Issue must be 1-255 characters"))]
    pub issue: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    pub priority: Option<MaintenancePriority>,
    /// Required for owners; tenants report against their own lease.
    pub property_id: Option<Uuid>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateMaintenanceRequest {
    #[validate(length(min = 1, max = 255, message = "Issue must be 1-255 characters"))]
    pub issue: Option<String>,
    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: Option<String>,
    pub priority: Option<MaintenancePriority>,
    pub status: Option<MaintenanceStatus>,
    pub assigned_to: Option<Assignee>,
    pub estimated_cost: Option<Decimal>,
    pub actual_cost: Option<Decimal>,
    pub images: Option<Vec<String>>,
}
