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
use crate::models::{CreateTenantRequest, TenantView, UpdateTenantRequest};
use crate::services::{TenantService, ViewService};

#[derive(Serialize, utoipa::ToSchema)]
pub struct TenantsResponse {
    pub success: bool,
    pub tenants: Vec<TenantView>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct TenantResponse {
    pub success: bool,
    pub message: String,
    pub tenant: TenantView,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_tenants).post(create_tenant))
        .route("/:id", put(update_tenant).delete(delete_tenant))
}

/// List leases visible to the caller
#[utoipa::path(
    get,
    path = "/api/v1/tenants",
    tag = "tenants",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Owner: all leases; tenant: own lease", body = TenantsResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_tenants(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<TenantsResponse>> {
    let store = state.store.as_ref();
    let tenants = TenantService::list_for(store, &auth_user.actor()).await?;
    let tenants = ViewService::tenants(store, tenants).await?;
    Ok(Json(TenantsResponse {
        success: true,
        tenants,
    }))
}

/// Add a tenant to a property
#[utoipa::path(
    post,
    path = "/api/v1/tenants",
    tag = "tenants",
    security(("bearer_auth" = [])),
    request_body = CreateTenantRequest,
    responses(
        (status = 201, description = "Tenant added, property marked occupied", body = TenantResponse),
        (status = 400, description = "Invalid lease, unknown tenant user, or duplicate lease"),
        (status = 403, description = "Caller does not own the property"),
        (status = 404, description = "Property not found")
    )
)]
pub async fn create_tenant(
    State(state): State<AppState>,
    auth_user: AuthUser,
    WithRejection(Json(payload), _): WithRejection<Json<CreateTenantRequest>, AppError>,
) -> AppResult<(StatusCode, Json<TenantResponse>)> {
    let store = state.store.as_ref();
    let tenant = TenantService::create(store, &auth_user.actor(), payload).await?;
    let tenant = ViewService::tenant(store, tenant).await?;
    Ok((
        StatusCode::CREATED,
        Json(TenantResponse {
            success: true,
            message: "Tenant added successfully".to_string(),
            tenant,
        }),
    ))
}

/// Update a lease
#[utoipa::path(
    put,
    path = "/api/v1/tenants/{id}",
    tag = "tenants",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Tenant ID")
    ),
    request_body = UpdateTenantRequest,
    responses(
        (status = 200, description = "Tenant updated", body = TenantResponse),
        (status = 403, description = "Caller does not own the property"),
        (status = 404, description = "Tenant not found")
    )
)]
pub async fn update_tenant(
    State(state): State<AppState>,
    auth_user: AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateTenantRequest>, AppError>,
) -> AppResult<Json<TenantResponse>> {
    let store = state.store.as_ref();
    let tenant = TenantService::update(store, &auth_user.actor(), id, payload).await?;
    let tenant = ViewService::tenant(store, tenant).await?;
    Ok(Json(TenantResponse {
        success: true,
        message: "Tenant updated successfully".to_string(),
        tenant,
    }))
}

/// Remove a tenant and free the property
#[utoipa::path(
    delete,
    path = "/api/v1/tenants/{id}",
    tag = "tenants",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Tenant ID")
    ),
    responses(
        (status = 200, description = "Tenant removed", body = MessageResponse),
        (status = 403, description = "Caller does not own the property"),
        (status = 404, description = "Tenant not found")
    )
)]
pub async fn delete_tenant(
    State(state): State<AppState>,
    auth_user: AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> AppResult<Json<MessageResponse>> {
    TenantService::delete(state.store.as_ref(), &auth_user.actor(), id).await?;
    Ok(Json(MessageResponse::ok("Tenant removed successfully")))
}
