use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Overdue,
    Partial,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, PartialOrd, Ord, ToSchema,
)]
#[sqlx(type_name = "payment_method")]
pub enum PaymentMethod {
    #[sqlx(rename = "cash")]
    #[serde(rename = "cash")]
    Cash,
    #[sqlx(rename = "check")]
    #[serde(rename = "check")]
    Check,
    #[sqlx(rename = "bank transfer")]
    #[serde(rename = "bank transfer")]
    BankTransfer,
    #[sqlx(rename = "credit card")]
    #[serde(rename = "credit card")]
    CreditCard,
    #[sqlx(rename = "online")]
    #[serde(rename = "online")]
    Online,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        Self::Online
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub property_id: Uuid,
    pub amount: Decimal,
    pub payment_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub status: PaymentStatus,
    pub method: PaymentMethod,
    pub month: String,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordPaymentRequest {
    pub amount: Decimal,
    pub method: Option<PaymentMethod>,
    #[validate(length(min = 1, max = 64, message = "Month must be 1-64 characters"))]
    pub month: String,
    /// Only honoured for owners; tenants always pay against their own lease.
    pub property_id: Option<Uuid>,
    /// Required when an owner records a payment on a tenant's behalf.
    pub tenant_id: Option<Uuid>,
    #[validate(length(max = 255, message = "Reference must be at most 255 characters"))]
    pub reference: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct MethodTotal {
    pub method: PaymentMethod,
    pub count: i64,
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PaymentStats {
    pub monthly_revenue: Decimal,
    pub yearly_revenue: Decimal,
    pub payment_methods: Vec<MethodTotal>,
}
