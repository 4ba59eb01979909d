mod common;

use axum::http::StatusCode;
use common::{
    add_tenant, create_property, listed_ids, property_body, public_listing, tenant_body, TestApp,
};
use serde_json::{json, Value};
use smartrent_backend::models::UserRole;

async fn submit_request(app: &TestApp, token: &str) -> String {
    let (status, body) = app
        .send(
            "POST",
            "/api/v1/maintenance",
            Some(token),
            Some(json!({ "issue": "Blocked drain", "description": "Shower drains slowly" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    format!(
        "/api/v1/maintenance/{}",
        body["maintenance"]["id"].as_str().expect("id")
    )
}

fn assert_rejected(status: StatusCode, body: &Value) {
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["code"], json!("VALIDATION_ERROR"));
}

#[tokio::test]
async fn other_owners_cannot_touch_a_lease() {
    let app = TestApp::new();
    let (_, owner) = app.user("olivia", UserRole::Owner).await;
    let (_, rival) = app.user("rafael", UserRole::Owner).await;
    let (renter, _) = app.user("tomas", UserRole::Tenant).await;
    let property_id = create_property(&app, &owner, "Harbour Flat").await;
    let lease = add_tenant(&app, &owner, renter.id, &property_id).await;
    let uri = format!("/api/v1/tenants/{}", lease);

    let (status, body) = app
        .send("PUT", &uri, Some(&rival), Some(json!({ "unit": "9C" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{}", body);

    let (status, _) = app.send("DELETE", &uri, Some(&rival), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = app.send("GET", "/api/v1/tenants", Some(&owner), None).await;
    assert_eq!(listed_ids(&body, "tenants"), vec![lease]);
    assert_eq!(body["tenants"][0]["unit"], json!("4B"));
    assert!(!public_listing(&app).await.contains(&property_id));
}

#[tokio::test]
async fn lease_on_another_owners_property_is_forbidden() {
    let app = TestApp::new();
    let (_, owner) = app.user("olivia", UserRole::Owner).await;
    let (_, rival) = app.user("rafael", UserRole::Owner).await;
    let (renter, _) = app.user("tomas", UserRole::Tenant).await;
    let property_id = create_property(&app, &owner, "Harbour Flat").await;

    let (status, _) = app
        .send(
            "POST",
            "/api/v1/tenants",
            Some(&rival),
            Some(tenant_body(&renter.id.to_string(), &property_id)),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(public_listing(&app).await.contains(&property_id));
}

#[tokio::test]
async fn lease_requires_a_tenant_account() {
    let app = TestApp::new();
    let (landlord, owner) = app.user("olivia", UserRole::Owner).await;
    let property_id = create_property(&app, &owner, "Harbour Flat").await;

    let (status, body) = app
        .send(
            "POST",
            "/api/v1/tenants",
            Some(&owner),
            Some(tenant_body(&landlord.id.to_string(), &property_id)),
        )
        .await;
    assert_rejected(status, &body);
    assert_eq!(body["message"], json!("User not found or is not a tenant"));
    assert!(public_listing(&app).await.contains(&property_id));
}

#[tokio::test]
async fn tenants_cannot_update_or_delete_maintenance() {
    let app = TestApp::new();
    let (_, owner) = app.user("olivia", UserRole::Owner).await;
    let (renter, renter_token) = app.user("tomas", UserRole::Tenant).await;
    let property_id = create_property(&app, &owner, "Harbour Flat").await;
    add_tenant(&app, &owner, renter.id, &property_id).await;
    let uri = submit_request(&app, &renter_token).await;

    let (status, body) = app
        .send(
            "PUT",
            &uri,
            Some(&renter_token),
            Some(json!({ "status": "completed" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        body["message"],
        json!("Only owners can update maintenance requests")
    );

    let (status, _) = app.send("DELETE", &uri, Some(&renter_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = app
        .send("GET", "/api/v1/maintenance", Some(&renter_token), None)
        .await;
    assert_eq!(body["maintenance"][0]["status"], json!("pending"));
}

#[tokio::test]
async fn owner_deletes_maintenance_request() {
    let app = TestApp::new();
    let (_, owner) = app.user("olivia", UserRole::Owner).await;
    let (renter, renter_token) = app.user("tomas", UserRole::Tenant).await;
    let property_id = create_property(&app, &owner, "Harbour Flat").await;
    add_tenant(&app, &owner, renter.id, &property_id).await;
    let uri = submit_request(&app, &renter_token).await;

    let (status, body) = app.send("DELETE", &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["message"],
        json!("Maintenance request deleted successfully")
    );

    let (_, body) = app
        .send("GET", "/api/v1/maintenance", Some(&owner), None)
        .await;
    assert_eq!(body["maintenance"], json!([]));

    let (status, _) = app.send("DELETE", &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn my_properties_depends_on_role() {
    let app = TestApp::new();
    let (_, owner) = app.user("olivia", UserRole::Owner).await;
    let (_, rival) = app.user("rafael", UserRole::Owner).await;
    let (renter, renter_token) = app.user("tomas", UserRole::Tenant).await;
    let occupied = create_property(&app, &owner, "Harbour Flat").await;
    let vacant = create_property(&app, &owner, "Hill Cottage").await;
    let rivals = create_property(&app, &rival, "Mill House").await;
    add_tenant(&app, &owner, renter.id, &occupied).await;

    let uri = "/api/v1/properties/my-properties";
    let (status, body) = app.send("GET", uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
    let mut mine = listed_ids(&body, "properties");
    mine.sort();
    let mut expected = vec![occupied.clone(), vacant.clone()];
    expected.sort();
    assert_eq!(mine, expected);

    let (status, body) = app.send("GET", uri, Some(&renter_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed_ids(&body, "properties");
    assert!(listed.contains(&vacant));
    assert!(listed.contains(&rivals));
    assert!(!listed.contains(&occupied));

    let (status, _) = app.send("GET", uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn property_with_tenants_cannot_be_deleted() {
    let app = TestApp::new();
    let (_, owner) = app.user("olivia", UserRole::Owner).await;
    let (renter, _) = app.user("tomas", UserRole::Tenant).await;
    let property_id = create_property(&app, &owner, "Harbour Flat").await;
    let lease = add_tenant(&app, &owner, renter.id, &property_id).await;
    let uri = format!("/api/v1/properties/{}", property_id);

    let (status, body) = app.send("DELETE", &uri, Some(&owner), None).await;
    assert_rejected(status, &body);

    let (_, body) = app
        .send("GET", "/api/v1/properties/my-properties", Some(&owner), None)
        .await;
    assert_eq!(listed_ids(&body, "properties"), vec![property_id.clone()]);

    app.send(
        "DELETE",
        &format!("/api/v1/tenants/{}", lease),
        Some(&owner),
        None,
    )
    .await;
    let (status, _) = app.send("DELETE", &uri, Some(&owner), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn lease_status_change_updates_availability() {
    let app = TestApp::new();
    let (_, owner) = app.user("olivia", UserRole::Owner).await;
    let (renter, _) = app.user("tomas", UserRole::Tenant).await;
    let property_id = create_property(&app, &owner, "Harbour Flat").await;
    let lease = add_tenant(&app, &owner, renter.id, &property_id).await;
    let uri = format!("/api/v1/tenants/{}", lease);
    assert!(!public_listing(&app).await.contains(&property_id));

    let (status, body) = app
        .send("PUT", &uri, Some(&owner), Some(json!({ "status": "inactive" })))
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["tenant"]["status"], json!("inactive"));
    assert!(public_listing(&app).await.contains(&property_id));

    let (status, _) = app
        .send("PUT", &uri, Some(&owner), Some(json!({ "status": "active" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(!public_listing(&app).await.contains(&property_id));
}

#[tokio::test]
async fn blank_text_is_rejected() {
    let app = TestApp::new();
    let (_, owner) = app.user("olivia", UserRole::Owner).await;
    let (renter, renter_token) = app.user("tomas", UserRole::Tenant).await;
    let property_id = create_property(&app, &owner, "Harbour Flat").await;

    let (status, response) = app
        .send(
            "POST",
            "/api/v1/properties",
            Some(&owner),
            Some(property_body("   ")),
        )
        .await;
    assert_rejected(status, &response);

    let mut body = tenant_body(&renter.id.to_string(), &property_id);
    body["unit"] = json!("   ");
    let (status, response) = app
        .send("POST", "/api/v1/tenants", Some(&owner), Some(body))
        .await;
    assert_rejected(status, &response);
    assert!(public_listing(&app).await.contains(&property_id));

    add_tenant(&app, &owner, renter.id, &property_id).await;
    let (status, response) = app
        .send(
            "POST",
            "/api/v1/payments",
            Some(&renter_token),
            Some(json!({ "amount": 100, "month": "   " })),
        )
        .await;
    assert_rejected(status, &response);

    let (status, response) = app
        .send(
            "POST",
            "/api/v1/maintenance",
            Some(&renter_token),
            Some(json!({ "issue": "\t", "description": "Door sticks" })),
        )
        .await;
    assert_rejected(status, &response);
}

#[tokio::test]
async fn values_beyond_column_bounds_are_rejected() {
    let app = TestApp::new();
    let (_, owner) = app.user("olivia", UserRole::Owner).await;
    let (renter, _) = app.user("tomas", UserRole::Tenant).await;
    let property_id = create_property(&app, &owner, "Harbour Flat").await;

    let mut body = tenant_body(&renter.id.to_string(), &property_id);
    body["unit"] = json!("U".repeat(65));
    let (status, response) = app
        .send("POST", "/api/v1/tenants", Some(&owner), Some(body))
        .await;
    assert_rejected(status, &response);

    let mut body = property_body("Wide House");
    body["bathrooms"] = json!(1000);
    let (status, response) = app
        .send("POST", "/api/v1/properties", Some(&owner), Some(body))
        .await;
    assert_rejected(status, &response);

    let mut body = property_body("Odd Rent");
    body["rent"] = json!(1200.125);
    let (status, response) = app
        .send("POST", "/api/v1/properties", Some(&owner), Some(body))
        .await;
    assert_rejected(status, &response);

    let mut body = property_body("N".repeat(256).as_str());
    body["rent"] = json!(900);
    let (status, response) = app
        .send("POST", "/api/v1/properties", Some(&owner), Some(body))
        .await;
    assert_rejected(status, &response);

    let (status, response) = app
        .send(
            "PUT",
            &format!("/api/v1/properties/{}", property_id),
            Some(&owner),
            Some(json!({ "bathrooms": 2.25 })),
        )
        .await;
    assert_rejected(status, &response);

    let (_, body) = app
        .send("GET", "/api/v1/properties/my-properties", Some(&owner), None)
        .await;
    assert_eq!(listed_ids(&body, "properties"), vec![property_id]);
}
