use rocket::http::{Cookie, Status};
use rocket::local::asynchronous::Client;
use rocket::tokio;
use serde_json::json;

use hybridspace_api::orm::testing::test_rocket;

/// Helper to login and get session cookie
async fn login(client: &Client, email: &str) -> Cookie<'static> {
    let response = client
        .post("/api/1/Login")
        .json(&json!({ "email": email, "password": "admin" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    response
        .cookies()
        .get("session")
        .expect("Session cookie should be set")
        .clone()
        .into_owned()
}

#[tokio::test]
async fn test_register_creates_company_and_admin() {
    let client = Client::untracked(test_rocket()).await.unwrap();

    let response = client
        .post("/api/1/Register")
        .json(&json!({
            "company_name": "Fresh Startup",
            "name": "Founder",
            "email": "founder@fresh.test",
            "password": "hunter2",
            "plan": "starter"
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    assert!(response.cookies().get("session").is_some());
    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["email"], "founder@fresh.test");
    assert_eq!(body["role"], "admin");
    assert_eq!(body["company_name"], "Fresh Startup");
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_bad_plans() {
    let client = Client::untracked(test_rocket()).await.unwrap();

    let response = client
        .post("/api/1/Register")
        .json(&json!({
            "company_name": "Test Company 1",
            "name": "Squatter",
            "email": "squatter@fresh.test",
            "password": "hunter2"
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Conflict);

    let response = client
        .post("/api/1/Register")
        .json(&json!({
            "company_name": "Another Startup",
            "name": "Founder",
            "email": "another@fresh.test",
            "password": "hunter2",
            "plan": "platinum"
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::UnprocessableEntity);

    let response = client
        .post("/api/1/Register")
        .json(&json!({
            "company_name": "Another Startup",
            "name": "Founder",
            "email": "employee@company1.test",
            "password": "hunter2"
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Conflict);
}

#[tokio::test]
async fn test_company_roster_is_superadmin_only() {
    let client = Client::untracked(test_rocket()).await.unwrap();

    let admin = login(&client, "admin@company1.test").await;
    let response = client
        .get("/api/1/Companies")
        .cookie(admin.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);

    let superadmin = login(&client, "superadmin@hybridspace.io").await;
    let response = client
        .get("/api/1/Companies")
        .cookie(superadmin.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let companies: serde_json::Value = response.into_json().await.unwrap();
    let list = companies.as_array().unwrap();

    let company1 = list.iter().find(|c| c["name"] == "Test Company 1").unwrap();
    assert_eq!(company1["active_users"], 3);
    assert_eq!(company1["plan"], "pro");
}

#[tokio::test]
async fn test_patch_company_plan_and_deactivation() {
    let client = Client::untracked(test_rocket()).await.unwrap();
    let superadmin = login(&client, "superadmin@hybridspace.io").await;

    let response = client
        .get("/api/1/Companies")
        .cookie(superadmin.clone())
        .dispatch()
        .await;
    let companies: serde_json::Value = response.into_json().await.unwrap();
    let company2 = companies
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "Test Company 2")
        .unwrap();
    let id = company2["id"].as_i64().unwrap();
    let seats_before = company2["max_users"].as_i64().unwrap();

    // A plan change alone does not touch the seat count.
    let response = client
        .patch(format!("/api/1/Companies/{}", id))
        .cookie(superadmin.clone())
        .json(&json!({ "plan": "enterprise" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let updated: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(updated["plan"], "enterprise");
    assert_eq!(updated["max_users"].as_i64().unwrap(), seats_before);

    let response = client
        .patch(format!("/api/1/Companies/{}", id))
        .cookie(superadmin.clone())
        .json(&json!({ "plan": "platinum" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::UnprocessableEntity);

    // Deactivation instead of deletion; the row stays addressable.
    let response = client
        .patch(format!("/api/1/Companies/{}", id))
        .cookie(superadmin.clone())
        .json(&json!({ "active": false }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let updated: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(updated["active"], false);
}

#[tokio::test]
async fn test_platform_stats() {
    let client = Client::untracked(test_rocket()).await.unwrap();
    let superadmin = login(&client, "superadmin@hybridspace.io").await;

    let response = client
        .get("/api/1/PlatformStats")
        .cookie(superadmin.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let stats: serde_json::Value = response.into_json().await.unwrap();

    // The two fixture companies plus the platform company.
    assert_eq!(stats["total_companies"].as_i64().unwrap(), 3);
    // Five fixture profiles plus the superadmin.
    assert_eq!(stats["total_users"].as_i64().unwrap(), 6);
    assert_eq!(stats["monthly_bookings"].as_i64().unwrap(), 0);
}

#[tokio::test]
async fn test_my_company_is_tenant_visible() {
    let client = Client::untracked(test_rocket()).await.unwrap();
    let employee = login(&client, "employee@company2.test").await;

    let response = client
        .get("/api/1/Company")
        .cookie(employee.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let company: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(company["name"], "Test Company 2");
}
