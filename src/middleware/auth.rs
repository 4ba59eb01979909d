use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;
use crate::error::AppError;
use crate::models::UserRole;
use crate::policy::Actor;
use crate::services::AuthService;
use crate::store::RentalStore;

#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl AuthUser {
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.user_id,
            role: self.role,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RentalStore>,
    pub config: Config,
}

/// Makes `AppState` reachable from extractors that only see request parts.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(state);
    next.run(request).await
}

/// Bearer-token extractor. Rejects with 401 before any handler logic runs.
#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let app_state = parts.extensions.get::<AppState>().cloned().ok_or_else(|| {
            AppError::Internal("AppState missing from request extensions".to_string())
                .into_response()
        })?;

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized.into_response())?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized.into_response())?;

        let actor = AuthService::new(app_state.config)
            .authenticate(token)
            .map_err(|err| {
                tracing::debug!("Rejected bearer token: {}", err);
                AppError::Unauthorized.into_response()
            })?;

        Ok(AuthUser {
            user_id: actor.user_id,
            role: actor.role,
        })
    }
}
