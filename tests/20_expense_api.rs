mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use common::TestApp;
use serde_json::json;

const ALICE: i64 = 1;
const BOB: i64 = 2;

#[tokio::test]
async fn list_is_empty_for_user_without_expenses() {
    let app = TestApp::new();
    app.create(ALICE, "Coffee", 3.5).await;

    let token = app.token(BOB);
    let res = app.send(Method::GET, "/expense/", Some(&token), None).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json(), json!([]));
}

#[tokio::test]
async fn list_returns_only_callers_expenses() {
    let app = TestApp::new();
    app.create(ALICE, "Coffee", 3.5).await;
    app.create(BOB, "Rent", 900.0).await;
    app.create(ALICE, "Books", 42.0).await;

    let token = app.token(ALICE);
    let res = app.send(Method::GET, "/expense/", Some(&token), None).await;
    assert_eq!(res.status, StatusCode::OK);

    let body = res.json();
    let titles: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, ["Coffee", "Books"]);

    // collection is reachable without the trailing slash too
    let res = app.send(Method::GET, "/expense", Some(&token), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json().as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn full_expense_flow() {
    let app = TestApp::new();
    let token = app.token(ALICE);

    let res = app
        .send(
            Method::POST,
            "/expense/",
            Some(&token),
            Some(json!({"title": "Expense", "amount": 100})),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let created = res.json();
    assert_eq!(created["title"], "Expense");
    assert_eq!(created["amount"].as_f64(), Some(100.0));
    assert!(created.get("owner_id").is_none());
    let id = created["id"].as_i64().unwrap();
    let uri = format!("/expense/{}", id);

    let res = app.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["title"], "Expense");

    let res = app
        .send(
            Method::PATCH,
            &uri,
            Some(&token),
            Some(json!({"title": "Updated Expense"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["title"], "Updated Expense");
    assert_eq!(res.json()["amount"].as_f64(), Some(100.0));
    assert_eq!(res.json()["id"].as_i64(), Some(id));

    let res = app.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert!(res.body.is_empty());

    let res = app.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json()["error"], "Expense not found");
}

#[tokio::test]
async fn create_then_get_round_trips_values() {
    let app = TestApp::new();
    let token = app.token(ALICE);

    for (title, amount) in [("Integer", json!(250)), ("Fraction", json!(19.99)), ("Zero", json!(0))] {
        let res = app
            .send(
                Method::POST,
                "/expense/",
                Some(&token),
                Some(json!({"title": title, "amount": amount})),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED);
        let id = res.json()["id"].as_i64().unwrap();

        let res = app.send(Method::GET, &format!("/expense/{}", id), Some(&token), None).await;
        let body = res.json();
        assert_eq!(body["title"], title);
        assert_eq!(body["amount"].as_f64(), amount.as_f64());
    }
}

#[tokio::test]
async fn create_assigns_fresh_ids() {
    let app = TestApp::new();
    let first = app.create(ALICE, "One", 1.0).await;
    let second = app.create(ALICE, "Two", 2.0).await;
    assert_ne!(first, second);
}

#[tokio::test]
async fn create_rejects_invalid_payload_with_field_map() {
    let app = TestApp::new();
    let token = app.token(ALICE);

    let res = app
        .send(Method::POST, "/expense/", Some(&token), Some(json!({"amount": "lots"})))
        .await;

    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        res.json(),
        json!({
            "title": ["Missing data for required field."],
            "amount": ["Not a valid number."]
        })
    );
    assert!(app.store.is_empty().await);
}

#[tokio::test]
async fn create_rejects_attempt_to_set_owner() {
    let app = TestApp::new();
    let token = app.token(ALICE);

    let res = app
        .send(
            Method::POST,
            "/expense/",
            Some(&token),
            Some(json!({"title": "Sneaky", "amount": 1, "owner_id": BOB})),
        )
        .await;

    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.json()["owner_id"], json!(["Unknown field."]));
}

#[tokio::test]
async fn create_rejects_non_object_body() {
    let app = TestApp::new();
    let token = app.token(ALICE);

    let res = app.send(Method::POST, "/expense/", Some(&token), Some(json!([1, 2]))).await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.json(), json!({"_schema": ["Invalid input type."]}));
}

#[tokio::test]
async fn malformed_json_and_wrong_content_type() {
    let app = TestApp::new();
    let token = app.token(ALICE);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/expense/")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();
    let res = app.send_request(request).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.json()["error"].is_string());

    let request = Request::builder()
        .method(Method::POST)
        .uri("/expense/")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from("title=x&amount=1"))
        .unwrap();
    let res = app.send_request(request).await;
    assert_eq!(res.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let app = TestApp::new();
    let token = app.token(ALICE);
    let title = "x".repeat(8 * 1024);

    let res = app
        .send(
            Method::POST,
            "/expense/",
            Some(&token),
            Some(json!({"title": title, "amount": 1})),
        )
        .await;
    assert_eq!(res.status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn other_users_expense_is_not_revealed() {
    let app = TestApp::new();
    let id = app.create(ALICE, "Private", 77.0).await;
    let uri = format!("/expense/{}", id);
    let token = app.token(BOB);

    let responses = [
        app.send(Method::GET, &uri, Some(&token), None).await,
        app.send(Method::PATCH, &uri, Some(&token), Some(json!({"title": "Mine now"}))).await,
        app.send(Method::DELETE, &uri, Some(&token), None).await,
    ];

    for res in responses {
        assert_eq!(res.status, StatusCode::UNAUTHORIZED);
        let body = res.json();
        assert_eq!(body, json!({"error": "You do not have access to this expense"}));
        assert!(!res.text().contains("Private"));
    }

    // untouched for the owner
    let owner = app.token(ALICE);
    let res = app.send(Method::GET, &uri, Some(&owner), None).await;
    assert_eq!(res.json()["title"], "Private");
}

#[tokio::test]
async fn ownership_is_checked_before_payload_validation() {
    let app = TestApp::new();
    let id = app.create(ALICE, "Private", 77.0).await;
    let token = app.token(BOB);

    let res = app
        .send(
            Method::PATCH,
            &format!("/expense/{}", id),
            Some(&token),
            Some(json!({"amount": "bad"})),
        )
        .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_ids_are_not_found() {
    let app = TestApp::new();
    let token = app.token(ALICE);

    let responses = [
        app.send(Method::GET, "/expense/999", Some(&token), None).await,
        app.send(Method::PATCH, "/expense/999", Some(&token), Some(json!({"title": "x"}))).await,
        app.send(Method::DELETE, "/expense/999", Some(&token), None).await,
    ];

    for res in responses {
        assert_eq!(res.status, StatusCode::NOT_FOUND);
        assert_eq!(res.json()["error"], "Expense not found");
    }
}

#[tokio::test]
async fn non_integer_id_is_not_found() {
    let app = TestApp::new();
    let token = app.token(ALICE);

    let res = app.send(Method::GET, "/expense/abc", Some(&token), None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn partial_update_leaves_omitted_fields() {
    let app = TestApp::new();
    let token = app.token(ALICE);
    let id = app.create(ALICE, "Groceries", 55.0).await;
    let uri = format!("/expense/{}", id);

    let res = app.send(Method::PATCH, &uri, Some(&token), Some(json!({"amount": 60}))).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["title"], "Groceries");
    assert_eq!(res.json()["amount"].as_f64(), Some(60.0));

    let res = app.send(Method::PATCH, &uri, Some(&token), Some(json!({"title": "Food"}))).await;
    assert_eq!(res.json()["title"], "Food");
    assert_eq!(res.json()["amount"].as_f64(), Some(60.0));

    let res = app.send(Method::PATCH, &uri, Some(&token), Some(json!({}))).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.json()["title"], "Food");
    assert_eq!(res.json()["amount"].as_f64(), Some(60.0));
}

#[tokio::test]
async fn invalid_update_changes_nothing() {
    let app = TestApp::new();
    let token = app.token(ALICE);
    let id = app.create(ALICE, "Groceries", 55.0).await;
    let uri = format!("/expense/{}", id);

    let res = app
        .send(Method::PATCH, &uri, Some(&token), Some(json!({"title": "Ok", "amount": -3})))
        .await;
    assert_eq!(res.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(res.json(), json!({"amount": ["Must be greater than or equal to 0."]}));

    let res = app.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(res.json()["title"], "Groceries");
    assert_eq!(res.json()["amount"].as_f64(), Some(55.0));
}

#[tokio::test]
async fn repeated_delete_is_not_found() {
    let app = TestApp::new();
    let token = app.token(ALICE);
    let id = app.create(ALICE, "Once", 1.0).await;
    let uri = format!("/expense/{}", id);

    assert_eq!(app.send(Method::DELETE, &uri, Some(&token), None).await.status, StatusCode::NO_CONTENT);
    assert_eq!(app.send(Method::DELETE, &uri, Some(&token), None).await.status, StatusCode::NOT_FOUND);
}
