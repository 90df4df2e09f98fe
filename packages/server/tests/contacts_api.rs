//! Integration tests for the contact endpoints.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::*;

#[tokio::test]
async fn test_contact_routes_require_authentication() {
    let app = test_app();

    for response in [
        get(&app, "/api/contacts").await,
        get(&app, "/api/contacts/logs").await,
        post_json(&app, "/api/contacts", json!({ "name": "Bob" })).await,
    ] {
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["message"], "Not authorized");
    }
}

#[tokio::test]
async fn test_create_applies_defaults() {
    let app = test_app();
    let (access, _) = sign_up(&app, "alice@test.com", "secret1", "Alice").await;

    let response = post_json_auth(
        &app,
        "/api/contacts",
        &access,
        json!({ "name": "  Bob  ", "email": " Bob@X.com " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    let contact = &body["data"]["contact"];
    assert_eq!(contact["name"], "Bob");
    assert_eq!(contact["email"], "bob@x.com");
    assert_eq!(contact["status"], "Lead");
    assert!(contact["phone"].is_null());
    assert!(contact["id"].as_str().is_some());
}

#[tokio::test]
async fn test_create_reports_all_validation_problems() {
    let app = test_app();
    let (access, _) = sign_up(&app, "alice@test.com", "secret1", "Alice").await;

    let response = post_json_auth(
        &app,
        "/api/contacts",
        &access,
        json!({
            "email": "nope",
            "notes": "x".repeat(1001),
            "status": "Friend",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(
        body["message"],
        "Name required, Valid email required, Notes too long, \
         Status must be one of: Lead, Prospect, Customer"
    );
}

#[tokio::test]
async fn test_list_paginates_with_stable_totals() {
    let app = test_app();
    let (access, _) = sign_up(&app, "alice@test.com", "secret1", "Alice").await;
    for i in 0..25 {
        create_contact(&app, &access, &format!("C{i:02}"), &format!("c{i}@x.com")).await;
    }

    let response = get_auth(&app, "/api/contacts?page=3", &access).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["contacts"].as_array().unwrap().len(), 5);
    assert_eq!(body["data"]["pagination"]["page"], 3);
    assert_eq!(body["data"]["pagination"]["limit"], 10);
    assert_eq!(body["data"]["pagination"]["total"], 25);
    assert_eq!(body["data"]["pagination"]["pages"], 3);

    let response = get_auth(&app, "/api/contacts?page=99", &access).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["contacts"].as_array().unwrap().len(), 0);
    assert_eq!(body["data"]["pagination"]["total"], 25);
    assert_eq!(body["data"]["pagination"]["pages"], 3);

    // Garbage page numbers fall back to the first page.
    let response = get_auth(&app, "/api/contacts?page=abc", &access).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["pagination"]["page"], 1);
    assert_eq!(body["data"]["contacts"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_list_search_and_status_filters() {
    let app = test_app();
    let (access, _) = sign_up(&app, "u@test.com", "secret1", "U").await;
    create_contact(&app, &access, "Alice Johnson", "aj@x.com").await;
    create_contact(&app, &access, "Bob", "bob@alice-corp.com").await;
    create_contact(&app, &access, "Carol", "carol@x.com").await;

    let response = get_auth(&app, "/api/contacts?search=Alice", &access).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["pagination"]["total"], 2);

    // Exact status match only.
    let response = get_auth(&app, "/api/contacts?status=Customer", &access).await;
    let body = body_json(response).await;
    assert_eq!(body["data"]["pagination"]["total"], 0);

    // A status outside the enum matches nothing rather than erroring.
    let response = get_auth(&app, "/api/contacts?status=Friend", &access).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["pagination"]["total"], 0);
    assert_eq!(body["data"]["pagination"]["pages"], 0);
}

#[tokio::test]
async fn test_contacts_are_invisible_across_users() {
    let app = test_app();
    let (owner, _) = sign_up(&app, "owner@test.com", "secret1", "Owner").await;
    let (stranger, _) = sign_up(&app, "stranger@test.com", "secret1", "Stranger").await;
    let id = create_contact(&app, &owner, "Bob", "bob@x.com").await;

    let uri = format!("/api/contacts/{id}");

    let get_resp = get_auth(&app, &uri, &stranger).await;
    assert_eq!(get_resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(get_resp).await["message"], "Contact not found");

    let put_resp = put_json_auth(&app, &uri, &stranger, json!({ "name": "Hijacked" })).await;
    assert_eq!(put_resp.status(), StatusCode::NOT_FOUND);

    let delete_resp = delete_auth(&app, &uri, &stranger).await;
    assert_eq!(delete_resp.status(), StatusCode::NOT_FOUND);

    // The stranger's list stays empty and the owner still sees the contact.
    let list = body_json(get_auth(&app, "/api/contacts", &stranger).await).await;
    assert_eq!(list["data"]["pagination"]["total"], 0);
    let owner_get = get_auth(&app, &uri, &owner).await;
    assert_eq!(owner_get.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_malformed_contact_id_is_rejected() {
    let app = test_app();
    let (access, _) = sign_up(&app, "alice@test.com", "secret1", "Alice").await;

    let response = get_auth(&app, "/api/contacts/not-a-uuid", &access).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["message"], "Invalid contact id");
}

#[tokio::test]
async fn test_activity_log_records_lifecycle_in_order() {
    let app = test_app();
    let (access, _) = sign_up(&app, "alice@test.com", "secret1", "Alice").await;
    let id = create_contact(&app, &access, "Bob", "bob@x.com").await;

    let uri = format!("/api/contacts/{id}");
    let updated = put_json_auth(&app, &uri, &access, json!({ "name": "Bobby" })).await;
    assert_eq!(updated.status(), StatusCode::OK);
    let deleted = delete_auth(&app, &uri, &access).await;
    assert_eq!(deleted.status(), StatusCode::OK);

    let response = get_auth(&app, "/api/contacts/logs", &access).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;

    let logs = body["data"]["logs"].as_array().unwrap();
    assert_eq!(logs.len(), 3);
    assert_eq!(body["data"]["pagination"]["limit"], 20);

    // Newest first.
    assert_eq!(logs[0]["action"], "delete");
    assert_eq!(logs[0]["details"], "Deleted contact: Bobby");
    assert_eq!(logs[1]["action"], "edit");
    assert_eq!(logs[1]["details"], "Updated contact: Bobby");
    assert_eq!(logs[2]["action"], "add");
    assert_eq!(logs[2]["details"], "Added contact: Bob");
    for log in logs {
        assert_eq!(log["entityType"], "contact");
        assert_eq!(log["entityId"], id.as_str());
    }
}

#[tokio::test]
async fn test_full_contact_lifecycle() {
    let app = test_app();
    let (access, _) = sign_up(&app, "u1@test.com", "secret1", "Alice").await;

    let id = create_contact(&app, &access, "Bob", "bob@x.com").await;
    let uri = format!("/api/contacts/{id}");

    let list = body_json(get_auth(&app, "/api/contacts", &access).await).await;
    assert_eq!(list["data"]["contacts"].as_array().unwrap().len(), 1);
    assert_eq!(list["data"]["contacts"][0]["name"], "Bob");

    let updated = put_json_auth(&app, &uri, &access, json!({ "status": "Customer" })).await;
    assert_eq!(updated.status(), StatusCode::OK);
    let updated_body = body_json(updated).await;
    assert_eq!(updated_body["data"]["contact"]["status"], "Customer");
    assert_eq!(updated_body["data"]["contact"]["name"], "Bob");

    let deleted = delete_auth(&app, &uri, &access).await;
    assert_eq!(deleted.status(), StatusCode::OK);
    let deleted_body = body_json(deleted).await;
    assert_eq!(deleted_body["success"], true);
    assert_eq!(deleted_body["data"], json!({}));

    let gone = get_auth(&app, &uri, &access).await;
    assert_eq!(gone.status(), StatusCode::NOT_FOUND);
}
