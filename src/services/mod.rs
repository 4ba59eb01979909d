pub mod auth_service;
pub mod maintenance_service;
pub mod payment_service;
pub mod property_service;
pub mod report_service;
pub mod tenant_service;
pub mod view_service;

pub use auth_service::AuthService;
pub use maintenance_service::MaintenanceService;
pub use payment_service::PaymentService;
pub use property_service::PropertyService;
pub use report_service::ReportService;
pub use tenant_service::TenantService;
pub use view_service::ViewService;
