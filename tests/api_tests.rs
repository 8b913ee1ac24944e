//! API integration tests
//!
//! These run against a live server with a seeded admin librarian
//! (admin@libris.local / admin-password). Run with: cargo test -- --ignored

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api";

/// Helper to get an admin bearer token
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/librarians/login", BASE_URL))
        .json(&json!({
            "email": "admin@libris.local",
            "password": "admin-password"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_login_wrong_password_and_unknown_email_are_indistinguishable() {
    let client = Client::new();

    let wrong_password = client
        .post(format!("{}/librarians/login", BASE_URL))
        .json(&json!({"email": "admin@libris.local", "password": "nope"}))
        .send()
        .await
        .expect("Failed to send request");
    let unknown_email = client
        .post(format!("{}/librarians/login", BASE_URL))
        .json(&json!({"email": "ghost@libris.local", "password": "nope"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(wrong_password.status(), 401);
    assert_eq!(unknown_email.status(), 401);

    let a: Value = wrong_password.json().await.unwrap();
    let b: Value = unknown_email.json().await.unwrap();
    assert_eq!(a["error"], b["error"]);
}

#[tokio::test]
#[ignore]
async fn test_requests_without_token_are_rejected() {
    let client = Client::new();

    let response = client
        .get(format!("{}/users", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_login_does_not_leak_password_hash() {
    let client = Client::new();

    let response = client
        .post(format!("{}/librarians/login", BASE_URL))
        .json(&json!({
            "email": "admin@libris.local",
            "password": "admin-password"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert!(body["token"].is_string());
    assert!(body["librarian"].get("password").is_none());
}

#[tokio::test]
#[ignore]
async fn test_book_creation_forces_available_copies() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": "The Name of the Rose",
            "author": "Umberto Eco",
            "isbn": format!("isbn-{}", std::process::id()),
            "category": "Fiction",
            "publicationYear": 1980,
            "publisher": "Bompiani",
            "totalCopies": 3,
            "availableCopies": 99,
            "shelfLocation": "B-7"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["availableCopies"], 3);
    assert_eq!(body["status"], "available");
}

#[tokio::test]
#[ignore]
async fn test_book_creation_rejects_unknown_category() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": "X",
            "author": "Y",
            "isbn": "isbn-bad-category",
            "category": "Poetry",
            "publicationYear": 2000,
            "publisher": "Z",
            "totalCopies": 1,
            "shelfLocation": "A-1"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_patron_patch_with_unknown_field_is_rejected() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let created: Value = client
        .post(format!("{}/users", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Paula Reader",
            "email": format!("paula-{}@example.org", std::process::id()),
            "userId": format!("M-{}", std::process::id()),
            "phone": "555-0101",
            "address": "1 Library Way"
        }))
        .send()
        .await
        .expect("Failed to create patron")
        .json()
        .await
        .unwrap();
    let patron_id = created["id"].as_i64().unwrap();

    // fines is not in the whitelist: nothing may be applied
    let response = client
        .patch(format!("{}/users/{}", BASE_URL, patron_id))
        .bearer_auth(&token)
        .json(&json!({"name": "Paula R.", "fines": 0}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);

    let after: Value = client
        .get(format!("{}/users/{}", BASE_URL, patron_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(after["name"], "Paula Reader");
}

#[tokio::test]
#[ignore]
async fn test_borrow_and_return_flow() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let pid = std::process::id();

    let book: Value = client
        .post(format!("{}/books", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "title": "Invisible Cities",
            "author": "Italo Calvino",
            "isbn": format!("isbn-flow-{}", pid),
            "category": "Fiction",
            "publicationYear": 1972,
            "publisher": "Einaudi",
            "totalCopies": 1,
            "shelfLocation": "C-3"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let book_id = book["id"].as_i64().unwrap();

    let patron: Value = client
        .post(format!("{}/users", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Flow Tester",
            "email": format!("flow-{}@example.org", pid),
            "userId": format!("F-{}", pid),
            "phone": "555-0102",
            "address": "2 Library Way"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let patron_id = patron["id"].as_i64().unwrap();

    // Borrow the only copy
    let borrow: Value = client
        .post(format!("{}/users/{}/borrow/{}", BASE_URL, patron_id, book_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(borrow["book"]["availableCopies"], 0);
    assert_eq!(borrow["book"]["status"], "borrowed");
    assert_eq!(borrow["user"]["borrowedBooks"][0]["returned"], false);

    // Second borrow must conflict
    let conflict = client
        .post(format!("{}/users/{}/borrow/{}", BASE_URL, patron_id, book_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(conflict.status(), 400);

    // Return it: on time, no fine
    let ret: Value = client
        .post(format!("{}/users/{}/return/{}", BASE_URL, patron_id, book_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ret["book"]["availableCopies"], 1);
    assert_eq!(ret["book"]["status"], "available");
    assert_eq!(ret["user"]["fines"], 0);
    assert_eq!(ret["user"]["borrowedBooks"][0]["returned"], true);

    // Returning again must conflict
    let again = client
        .post(format!("{}/users/{}/return/{}", BASE_URL, patron_id, book_id))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(again.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_register_requires_admin_role() {
    let client = Client::new();
    let token = get_auth_token(&client).await;
    let pid = std::process::id();

    // Create a plain librarian, then try to register with their token
    let created: Value = client
        .post(format!("{}/librarians/register", BASE_URL))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Staff Member",
            "email": format!("staff-{}@libris.local", pid),
            "password": "staff-password",
            "employeeId": format!("EMP-{}", pid),
            "phone": "555-0103"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let staff_token = created["token"].as_str().unwrap();

    let response = client
        .post(format!("{}/librarians/register", BASE_URL))
        .bearer_auth(staff_token)
        .json(&json!({
            "name": "Intruder",
            "email": format!("intruder-{}@libris.local", pid),
            "password": "some-password",
            "employeeId": format!("INT-{}", pid),
            "phone": "555-0104"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 403);
}
