use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Serialize;
use uuid::Uuid;

use super::MessageResponse;
use crate::error::{AppError, AppResult};
use crate::middleware::{AppState, AuthUser};
use crate::models::{CreatePropertyRequest, PropertyView, UpdatePropertyRequest};
use crate::services::{PropertyService, ViewService};

#[derive(Serialize, utoipa::ToSchema)]
pub struct PropertiesResponse {
    pub success: bool,
    pub properties: Vec<PropertyView>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PropertyResponse {
    pub success: bool,
    pub message: String,
    pub property: PropertyView,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ReconcileResponse {
    pub success: bool,
    pub corrected: u64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_properties).post(create_property))
        .route("/my-properties", get(my_properties))
        .route("/reconcile", post(reconcile_availability))
        .route("/:id", put(update_property).delete(delete_property))
}

/// Public listing of available properties
#[utoipa::path(
    get,
    path = "/api/v1/properties",
    tag = "properties",
    responses(
        (status = 200, description = "Available properties", body = PropertiesResponse)
    )
)]
pub async fn list_properties(State(state): State<AppState>) -> AppResult<Json<PropertiesResponse>> {
    let store = state.store.as_ref();
    let properties = PropertyService::list_available(store).await?;
    let properties = ViewService::properties(store, properties).await?;
    Ok(Json(PropertiesResponse {
        success: true,
        properties,
    }))
}

/// Properties for the signed-in user
#[utoipa::path(
    get,
    path = "/api/v1/properties/my-properties",
    tag = "properties",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Owner: own properties; tenant: available ones", body = PropertiesResponse),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn my_properties(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<PropertiesResponse>> {
    let store = state.store.as_ref();
    let properties = PropertyService::list_for(store, &auth_user.actor()).await?;
    let properties = ViewService::properties(store, properties).await?;
    Ok(Json(PropertiesResponse {
        success: true,
        properties,
    }))
}

/// Add a property
#[utoipa::path(
    post,
    path = "/api/v1/properties",
    tag = "properties",
    security(("bearer_auth" = [])),
    request_body = CreatePropertyRequest,
    responses(
        (status = 201, description = "Property added", body = PropertyResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 403, description = "Only owners can add properties")
    )
)]
pub async fn create_property(
    State(state): State<AppState>,
    auth_user: AuthUser,
    WithRejection(Json(payload), _): WithRejection<Json<CreatePropertyRequest>, AppError>,
) -> AppResult<(StatusCode, Json<PropertyResponse>)> {
    let store = state.store.as_ref();
    let property = PropertyService::create(store, &auth_user.actor(), payload).await?;
    let property = ViewService::property(store, property).await?;
    Ok((
        StatusCode::CREATED,
        Json(PropertyResponse {
            success: true,
            message: "Property added successfully".to_string(),
            property,
        }),
    ))
}

/// Update a property
#[utoipa::path(
    put,
    path = "/api/v1/properties/{id}",
    tag = "properties",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Property ID")
    ),
    request_body = UpdatePropertyRequest,
    responses(
        (status = 200, description = "Property updated", body = PropertyResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Property not found")
    )
)]
pub async fn update_property(
    State(state): State<AppState>,
    auth_user: AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdatePropertyRequest>, AppError>,
) -> AppResult<Json<PropertyResponse>> {
    let store = state.store.as_ref();
    let property = PropertyService::update(store, &auth_user.actor(), id, payload).await?;
    let property = ViewService::property(store, property).await?;
    Ok(Json(PropertyResponse {
        success: true,
        message: "Property updated successfully".to_string(),
        property,
    }))
}

/// Delete a property
#[utoipa::path(
    delete,
    path = "/api/v1/properties/{id}",
    tag = "properties",
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Property ID")
    ),
    responses(
        (status = 200, description = "Property deleted", body = MessageResponse),
        (status = 400, description = "Property still has tenants"),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Property not found")
    )
)]
pub async fn delete_property(
    State(state): State<AppState>,
    auth_user: AuthUser,
    WithRejection(Path(id), _): WithRejection<Path<Uuid>, AppError>,
) -> AppResult<Json<MessageResponse>> {
    PropertyService::delete(state.store.as_ref(), &auth_user.actor(), id).await?;
    Ok(Json(MessageResponse::ok("Property deleted successfully")))
}

/// Recompute availability flags of the caller's properties
#[utoipa::path(
    post,
    path = "/api/v1/properties/reconcile",
    tag = "properties",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Number of corrected properties", body = ReconcileResponse),
        (status = 403, description = "Only owners can reconcile")
    )
)]
pub async fn reconcile_availability(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<ReconcileResponse>> {
    let corrected = PropertyService::reconcile(state.store.as_ref(), &auth_user.actor()).await?;
    Ok(Json(ReconcileResponse {
        success: true,
        corrected,
    }))
}
