pub mod maintenance;
pub mod payments;
pub mod properties;
pub mod tenants;

use crate::middleware::AppState;
use axum::Router;

/// Envelope for operations that return no record.
#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/properties", properties::routes())
        .nest("/tenants", tenants::routes())
        .nest("/payments", payments::routes())
        .nest("/maintenance", maintenance::routes())
}
