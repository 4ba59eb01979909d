use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use uuid::Uuid;

use super::MessageResponse;
use crate::error::{AppError, AppResult};
use crate::middleware::{AppState, AuthUser};
use crate::models::{CreateMaintenanceRequest, MaintenanceView, UpdateMaintenanceRequest};
use crate::services::{MaintenanceService, ViewService};

#[derive(Serialize, utoipa::ToSchema)]
pub struct MaintenanceListResponse {
    pub success: bool,
    pub maintenance: Vec<MaintenanceView>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MaintenanceResponse {
    pub success: bool,
    pub message: String,
    pub maintenance: MaintenanceView,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_requests).post(create_request))
        .route("/:id", put(update_request).delete(delete_request))
}

/// List maintenance requests visible to the caller
#[utoipa::path(
    get,
    path = "/api/v1/maintenance",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Owner: all requests; tenant: own", body = MaintenanceListResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_requests(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<MaintenanceListResponse>> {
    let store = state.store.as_ref();
    let maintenance = MaintenanceService::list_for(store, &auth_user.actor()).await?;
    let maintenance = ViewService::maintenance_list(store, maintenance).await?;
    Ok(Json(MaintenanceListResponse {
        success: true,
        maintenance,
    }))
}

/// Submit a maintenance request
#[utoipa::path(
    post,
    path = "/api/v1/maintenance",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    request_body = CreateMaintenanceRequest,
    responses(
        (status = 201, description = "Request submitted", body = MaintenanceResponse),
        (status = 400, description = "Missing issue, description or property"),
        (status = 404, description = "Tenant lease or property not found")
    )
)]
pub async fn create_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    WithRejection(Json(payload), _): WithRejection<Json<CreateMaintenanceRequest>, AppError>,
) -> AppResult<(StatusCode, Json<MaintenanceResponse>)> {
    let store = state.store.as_ref();
    let maintenance = MaintenanceService::create(store, &auth_user.actor(), payload).await?;
    let maintenance = ViewService::maintenance(store, maintenance).await?;
    Ok((
        StatusCode::CREATED,
        Json(MaintenanceResponse {
            success: true,
            message: "Maintenance request submitted successfully".to_string(),
            maintenance,
        }),
    ))
}

/// Update a maintenance request
#[utoipa::path(
    put,
    path = "/api/v1/maintenance/{id}",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Maintenance request ID")
    ),
    request_body = UpdateMaintenanceRequest,
    responses(
        (status = 200, description = "Request updated", body = MaintenanceResponse),
        (status = 400, description = "Illegal status transition or invalid cost"),
        (status = 403, description = "Only owners can update maintenance requests"),
        (status = 404, description = "Maintenance request not found")
    )
)]
pub async fn update_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateMaintenanceRequest>, AppError>,
) -> AppResult<Json<MaintenanceResponse>> {
    let store = state.store.as_ref();
    let maintenance = MaintenanceService::update(store, &auth_user.actor(), id, payload).await?;
    let maintenance = ViewService::maintenance(store, maintenance).await?;
    Ok(Json(MaintenanceResponse {
        success: true,
        message: "Maintenance request updated successfully".to_string(),
        maintenance,
    }))
}

/// Delete a maintenance request
#[utoipa::path(
    delete,
    path = "/api/v1/maintenance/{id}",
    tag = "maintenance",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Maintenance request ID")
    ),
    responses(
        (status = 200, description = "Request deleted", body = MessageResponse),
        (status = 403, description = "Only owners can delete maintenance requests"),
        (status = 404, description = "Maintenance request not found")
    )
)]
pub async fn delete_request(
    State(state): State<AppState>,
    auth_user: AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> AppResult<Json<MessageResponse>> {
    MaintenanceService::delete(state.store.as_ref(), &auth_user.actor(), id).await?;
    Ok(Json(MessageResponse::ok(
        "Maintenance request deleted successfully",
    )))
}
