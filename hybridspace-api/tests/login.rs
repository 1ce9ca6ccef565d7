use rocket::http::Status;
use rocket::tokio;
use serde_json::json;

use hybridspace_api::orm::testing::test_rocket;

#[tokio::test]
async fn test_login_success() {
    let client = rocket::local::asynchronous::Client::untracked(test_rocket())
        .await
        .unwrap();

    let response = client
        .post("/api/1/Login")
        .json(&json!({
            "email": "admin@company1.test",
            "password": "admin"
        }))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    assert!(response.cookies().get("session").is_some());

    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["email"], "admin@company1.test");
    assert_eq!(body["role"], "admin");
    assert_eq!(body["company_name"], "Test Company 1");
    assert!(body["user_id"].is_number());
    // Avatar initials are derived from the display name.
    assert_eq!(body["avatar"], "AO");
}

#[tokio::test]
async fn test_wrong_email() {
    let client = rocket::local::asynchronous::Client::untracked(test_rocket())
        .await
        .unwrap();

    let response = client
        .post("/api/1/Login")
        .json(&json!({
            "email": "nonexistent@company1.test",
            "password": "admin"
        }))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Unauthorized);
    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_wrong_password() {
    let client = rocket::local::asynchronous::Client::untracked(test_rocket())
        .await
        .unwrap();

    let response = client
        .post("/api/1/Login")
        .json(&json!({
            "email": "admin@company1.test",
            "password": "wrong_password"
        }))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Unauthorized);
    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn test_empty_credentials() {
    let client = rocket::local::asynchronous::Client::untracked(test_rocket())
        .await
        .unwrap();

    let response = client
        .post("/api/1/Login")
        .json(&json!({
            "email": "",
            "password": "admin"
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);

    let response = client
        .post("/api/1/Login")
        .json(&json!({
            "email": "admin@company1.test",
            "password": ""
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
}

#[tokio::test]
async fn test_session_check_round_trip() {
    let client = rocket::local::asynchronous::Client::untracked(test_rocket())
        .await
        .unwrap();

    // No cookie yet
    let response = client.get("/api/1/Session").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);

    let response = client
        .post("/api/1/Login")
        .json(&json!({
            "email": "employee@company1.test",
            "password": "admin"
        }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let session = response.cookies().get("session").unwrap().clone().into_owned();

    let response = client
        .get("/api/1/Session")
        .cookie(session)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["email"], "employee@company1.test");
    assert_eq!(body["role"], "employee");
}

#[tokio::test]
async fn test_logout_revokes_session() {
    let client = rocket::local::asynchronous::Client::untracked(test_rocket())
        .await
        .unwrap();

    let response = client
        .post("/api/1/Login")
        .json(&json!({
            "email": "employee@company1.test",
            "password": "admin"
        }))
        .dispatch()
        .await;
    let session = response.cookies().get("session").unwrap().clone().into_owned();

    let response = client
        .post("/api/1/Logout")
        .cookie(session.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    // The revoked session no longer authenticates even if the cookie is
    // replayed.
    let response = client
        .get("/api/1/Session")
        .cookie(session)
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
}

#[tokio::test]
async fn test_superadmin_seeded_on_ignite() {
    let client = rocket::local::asynchronous::Client::untracked(test_rocket())
        .await
        .unwrap();

    let response = client
        .post("/api/1/Login")
        .json(&json!({
            "email": "superadmin@hybridspace.io",
            "password": "admin"
        }))
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);
    let body: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(body["role"], "superadmin");
}
