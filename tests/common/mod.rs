#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::routing::RouterIntoService;
use serde_json::{json, Value};
use tower::ServiceExt;

use smartrent_backend::config::Config;
use smartrent_backend::models::{User, UserRole};
use smartrent_backend::services::AuthService;
use smartrent_backend::store::{memory::InMemoryStore, RentalStore};
use smartrent_backend::{build_router, AppState};
use uuid::Uuid;

pub const SECRET: &str = "integration-test-secret";

pub struct TestApp {
    pub app: RouterIntoService<Body, ()>,
    pub store: Arc<InMemoryStore>,
    auth: AuthService,
}

impl TestApp {
    pub fn new() -> Self {
        let config = Config::for_tests(SECRET);
        let store = Arc::new(InMemoryStore::new());
        let state = AppState {
            store: store.clone(),
            config: config.clone(),
        };
        Self {
            app: build_router(state).into_service(),
            store,
            auth: AuthService::new(config),
        }
    }

    /// Registers a user directly in the store and returns it with a bearer token.
    pub async fn user(&self, name: &str, role: UserRole) -> (User, String) {
        let user = self
            .store
            .insert_user(User::new(name, format!("{}@example.com", name), role))
            .await
            .expect("insert user");
        let token = self
            .auth
            .generate_access_token(user.id, user.role)
            .expect("token");
        (user, token)
    }

    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        (status, read_json(response).await)
    }
}

pub async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).expect("json")
}

pub fn property_body(name: &str) -> Value {
    serde_json::json!({
        "name": name,
        "address": "12 Harbour Road",
        "rent": 1200,
        "bedrooms": 2,
        "bathrooms": 1.5,
        "area": 85,
        "features": ["balcony"]
    })
}

pub fn tenant_body(user_id: &str, property_id: &str) -> Value {
    serde_json::json!({
        "user_id": user_id,
        "property_id": property_id,
        "unit": "4B",
        "lease_start": "2024-01-01",
        "lease_end": "2024-12-31",
        "rent": 1200
    })
}

pub fn listed_ids(body: &Value, key: &str) -> Vec<String> {
    body[key]
        .as_array()
        .expect("array")
        .iter()
        .map(|item| item["id"].as_str().expect("id").to_string())
        .collect()
}

pub async fn create_property(app: &TestApp, token: &str, name: &str) -> String {
    let (status, body) = app
        .send("POST", "/api/v1/properties", Some(token), Some(property_body(name)))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["property"]["is_available"], json!(true));
    body["property"]["id"].as_str().expect("id").to_string()
}

pub async fn add_tenant(app: &TestApp, token: &str, user_id: Uuid, property_id: &str) -> String {
    let (status, body) = app
        .send(
            "POST",
            "/api/v1/tenants",
            Some(token),
            Some(tenant_body(&user_id.to_string(), property_id)),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    body["tenant"]["id"].as_str().expect("id").to_string()
}

pub async fn public_listing(app: &TestApp) -> Vec<String> {
    let (status, body) = app.send("GET", "/api/v1/properties", None, None).await;
    assert_eq!(status, StatusCode::OK);
    listed_ids(&body, "properties")
}
