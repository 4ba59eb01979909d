use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SmartRent API",
        version = "1.0.0",
        description = "Backend API for SmartRent - property rental management for owners and tenants"
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    tags(
        (name = "system", description = "Service metadata and health"),
        (name = "properties", description = "Rental properties and availability"),
        (name = "tenants", description = "Leases binding tenants to properties"),
        (name = "payments", description = "Rent payments and revenue reports"),
        (name = "maintenance", description = "Maintenance requests and their lifecycle")
    ),
    paths(
        crate::app::root,
        crate::app::health_check,
        // Properties
        crate::api::properties::list_properties,
        crate::api::properties::my_properties,
        crate::api::properties::create_property,
        crate::api::properties::update_property,
        crate::api::properties::delete_property,
        crate::api::properties::reconcile_availability,
        // Tenants
        crate::api::tenants::list_tenants,
        crate::api::tenants::create_tenant,
        crate::api::tenants::update_tenant,
        crate::api::tenants::delete_tenant,
        // Payments
        crate::api::payments::list_payments,
        crate::api::payments::record_payment,
        crate::api::payments::payment_stats,
        // Maintenance
        crate::api::maintenance::list_requests,
        crate::api::maintenance::create_request,
        crate::api::maintenance::update_request,
        crate::api::maintenance::delete_request,
    ),
    components(
        schemas(
            crate::api::MessageResponse,
            crate::app::ServiceInfo,
            crate::app::HealthResponse,
            crate::models::UserRole,
            crate::models::UserSummary,
            crate::models::PropertySummary,
            // Properties
            crate::models::Address,
            crate::models::AddressInput,
            crate::models::Property,
            crate::models::PropertyView,
            crate::models::CreatePropertyRequest,
            crate::models::UpdatePropertyRequest,
            crate::api::properties::PropertiesResponse,
            crate::api::properties::PropertyResponse,
            crate::api::properties::ReconcileResponse,
            // Tenants
            crate::models::TenantStatus,
            crate::models::EmergencyContact,
            crate::models::Tenant,
            crate::models::TenantView,
            crate::models::CreateTenantRequest,
            crate::models::UpdateTenantRequest,
            crate::api::tenants::TenantsResponse,
            crate::api::tenants::TenantResponse,
            // Payments
            crate::models::PaymentStatus,
            crate::models::PaymentMethod,
            crate::models::Payment,
            crate::models::PaymentView,
            crate::models::RecordPaymentRequest,
            crate::models::MethodTotal,
            crate::models::PaymentStats,
            crate::api::payments::PaymentsResponse,
            crate::api::payments::PaymentResponse,
            crate::api::payments::PaymentStatsResponse,
            // Maintenance
            crate::models::MaintenanceStatus,
            crate::models::MaintenancePriority,
            crate::models::Assignee,
            crate::models::Maintenance,
            crate::models::MaintenanceView,
            crate::models::CreateMaintenanceRequest,
            crate::models::UpdateMaintenanceRequest,
            crate::api::maintenance::MaintenanceListResponse,
            crate::api::maintenance::MaintenanceResponse,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::Http::new(
                        utoipa::openapi::security::HttpAuthScheme::Bearer,
                    ),
                ),
            );
        }
    }
}
