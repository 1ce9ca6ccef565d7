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

async fn office_id(client: &Client, session: &Cookie<'static>) -> i64 {
    let response = client
        .get("/api/1/Offices")
        .cookie(session.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let offices: serde_json::Value = response.into_json().await.unwrap();
    offices[0]["id"].as_i64().expect("seeded office")
}

async fn create_desk(client: &Client, admin: &Cookie<'static>, office: i64, x: i32, y: i32) -> serde_json::Value {
    let response = client
        .post(format!("/api/1/Offices/{}/Assets", office))
        .cookie(admin.clone())
        .json(&json!({ "kind": "desk", "coord_x": x, "coord_y": y }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    response.into_json().await.unwrap()
}

#[tokio::test]
async fn test_desks_numbered_max_plus_one() {
    let client = Client::untracked(test_rocket()).await.unwrap();
    let admin = login(&client, "admin@company1.test").await;
    let office = office_id(&client, &admin).await;

    let d1 = create_desk(&client, &admin, office, 40, 40).await;
    let d2 = create_desk(&client, &admin, office, 100, 40).await;
    assert_eq!(d1["name"], "D-01");
    assert_eq!(d2["name"], "D-02");
    assert_eq!(d1["capacity"], 1);

    // Deleting D-01 does not free its number; names stay unambiguous in
    // history.
    let response = client
        .delete(format!("/api/1/Assets/{}", d1["id"]))
        .cookie(admin.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NoContent);

    let d3 = create_desk(&client, &admin, office, 160, 40).await;
    assert_eq!(d3["name"], "D-03");
}

#[tokio::test]
async fn test_room_requires_name() {
    let client = Client::untracked(test_rocket()).await.unwrap();
    let admin = login(&client, "admin@company1.test").await;
    let office = office_id(&client, &admin).await;

    let response = client
        .post(format!("/api/1/Offices/{}/Assets", office))
        .cookie(admin.clone())
        .json(&json!({ "kind": "room", "coord_x": 300, "coord_y": 200 }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::UnprocessableEntity);

    let response = client
        .post(format!("/api/1/Offices/{}/Assets", office))
        .cookie(admin.clone())
        .json(&json!({ "kind": "room", "name": "War Room", "coord_x": 300, "coord_y": 200, "capacity": 8 }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let room: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(room["name"], "War Room");
    assert_eq!(room["capacity"], 8);
}

#[tokio::test]
async fn test_placement_snaps_and_infers_zone() {
    let client = Client::untracked(test_rocket()).await.unwrap();
    let admin = login(&client, "admin@company1.test").await;
    let office = office_id(&client, &admin).await;

    // Zone A covers x 0..200, y 0..160.
    let response = client
        .post(format!("/api/1/Offices/{}/Zones", office))
        .cookie(admin.clone())
        .json(&json!({ "name": "Eng", "coord_x": 0, "coord_y": 0, "coord_w": 200, "coord_h": 160 }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);
    let zone: serde_json::Value = response.into_json().await.unwrap();

    // 195 snaps to 200, which is still on the zone's inclusive edge.
    let desk = create_desk(&client, &admin, office, 195, 80).await;
    assert_eq!(desk["coord_x"], 200);
    assert_eq!(desk["zone_id"], zone["id"]);

    // Moving the desk out of the zone clears the membership.
    let response = client
        .patch(format!("/api/1/Assets/{}", desk["id"]))
        .cookie(admin.clone())
        .json(&json!({ "coord_x": 400, "coord_y": 300 }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let moved: serde_json::Value = response.into_json().await.unwrap();
    assert!(moved["zone_id"].is_null());

    // A plain rename leaves position and zone alone.
    let response = client
        .patch(format!("/api/1/Assets/{}", desk["id"]))
        .cookie(admin.clone())
        .json(&json!({ "name": "Window Desk" }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let renamed: serde_json::Value = response.into_json().await.unwrap();
    assert_eq!(renamed["name"], "Window Desk");
    assert_eq!(renamed["coord_x"], 400);
}

#[tokio::test]
async fn test_asset_list_carries_zone_join() {
    let client = Client::untracked(test_rocket()).await.unwrap();
    let admin = login(&client, "admin@company1.test").await;
    let office = office_id(&client, &admin).await;

    let response = client
        .post(format!("/api/1/Offices/{}/Zones", office))
        .cookie(admin.clone())
        .json(&json!({ "name": "Eng", "coord_x": 0, "coord_y": 0, "coord_w": 200, "coord_h": 160 }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Created);

    create_desk(&client, &admin, office, 100, 80).await;
    create_desk(&client, &admin, office, 400, 300).await;

    let response = client
        .get(format!("/api/1/Offices/{}/Assets", office))
        .cookie(admin.clone())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let assets: serde_json::Value = response.into_json().await.unwrap();
    let list = assets.as_array().unwrap();
    assert_eq!(list.len(), 2);
    let inside = list.iter().find(|a| a["name"] == "D-01").unwrap();
    assert_eq!(inside["zone"]["label"], "A");
    let outside = list.iter().find(|a| a["name"] == "D-02").unwrap();
    assert!(outside["zone"].is_null());
}

#[tokio::test]
async fn test_asset_writes_require_admin() {
    let client = Client::untracked(test_rocket()).await.unwrap();
    let employee = login(&client, "employee@company1.test").await;
    let office = office_id(&client, &employee).await;

    let response = client
        .post(format!("/api/1/Offices/{}/Assets", office))
        .cookie(employee.clone())
        .json(&json!({ "kind": "desk", "coord_x": 40, "coord_y": 40 }))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);
}
