use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use axum_extra::extract::WithRejection;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::{AppState, AuthUser};
use crate::models::{PaymentStats, PaymentView, RecordPaymentRequest};
use crate::services::{PaymentService, ReportService, ViewService};

#[derive(Serialize, utoipa::ToSchema)]
pub struct PaymentsResponse {
    pub success: bool,
    pub payments: Vec<PaymentView>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PaymentResponse {
    pub success: bool,
    pub message: String,
    pub payment: PaymentView,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PaymentStatsResponse {
    pub success: bool,
    pub stats: PaymentStats,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_payments).post(record_payment))
        .route("/stats", get(payment_stats))
}

/// List payments visible to the caller
#[utoipa::path(
    get,
    path = "/api/v1/payments",
    tag = "payments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Owner: all payments; tenant: own", body = PaymentsResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_payments(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<PaymentsResponse>> {
    let store = state.store.as_ref();
    let payments = PaymentService::list_for(store, &auth_user.actor()).await?;
    let payments = ViewService::payments(store, payments).await?;
    Ok(Json(PaymentsResponse {
        success: true,
        payments,
    }))
}

/// Record a settled payment
#[utoipa::path(
    post,
    path = "/api/v1/payments",
    tag = "payments",
    security(("bearer_auth" = [])),
    request_body = RecordPaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = PaymentResponse),
        (status = 400, description = "Invalid amount or missing tenant ID"),
        (status = 404, description = "Tenant or property not found")
    )
)]
pub async fn record_payment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    WithRejection(Json(payload), _): WithRejection<Json<RecordPaymentRequest>, AppError>,
) -> AppResult<(StatusCode, Json<PaymentResponse>)> {
    let store = state.store.as_ref();
    let payment = PaymentService::record(store, &auth_user.actor(), payload).await?;
    let payment = ViewService::payment(store, payment).await?;
    Ok((
        StatusCode::CREATED,
        Json(PaymentResponse {
            success: true,
            message: "Payment recorded successfully".to_string(),
            payment,
        }),
    ))
}

/// Revenue report
#[utoipa::path(
    get,
    path = "/api/v1/payments/stats",
    tag = "payments",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Monthly, yearly and per-method revenue", body = PaymentStatsResponse),
        (status = 403, description = "Only owners can view payment statistics")
    )
)]
pub async fn payment_stats(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<PaymentStatsResponse>> {
    let stats = ReportService::payment_stats(state.store.as_ref(), &auth_user.actor()).await?;
    Ok(Json(PaymentStatsResponse {
        success: true,
        stats,
    }))
}
