//! Server API tests

use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use fintrack_core::db::Database;
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

fn setup_test_app() -> Router {
    let db = Database::in_memory().unwrap();
    let config = ServerConfig {
        secret_key: Some("test-secret".to_string()),
        ..Default::default()
    };
    create_router(db, None, config)
}

async fn get_body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body();
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn get_body_text(response: axum::response::Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap()
}

/// Register `username` and return the session token
async fn register(app: &Router, username: &str) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "password123"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    json["token"].as_str().unwrap().to_string()
}

async fn add_expense(
    app: &Router,
    token: &str,
    title: &str,
    amount: f64,
    category: &str,
    date: &str,
) -> i64 {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/expenses",
            Some(token),
            json!({ "title": title, "amount": amount, "category": category, "date": date }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    get_body_json(response).await["id"].as_i64().unwrap()
}

// ========== Auth API Tests ==========

#[tokio::test]
async fn test_health_is_public() {
    let app = setup_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_protected_routes_require_auth() {
    let app = setup_test_app();

    for uri in ["/api/me", "/api/dashboard", "/api/expenses", "/api/audit"] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }

    let response = app
        .oneshot(get_request("/api/me", "not-a-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Authentication required");
}

#[tokio::test]
async fn test_register_sets_cookie_and_logs_in() {
    let app = setup_test_app();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({ "username": "alice", "email": "alice@example.com", "password": "password123" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("fintrack_session="));
    assert!(cookie.contains("HttpOnly"));

    let json = get_body_json(response).await;
    assert_eq!(json["user"]["username"], "alice");
    assert!(json["user"].get("password_hash").is_none());

    // The cookie alone authenticates
    let session = cookie.split(';').next().unwrap().to_string();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/me")
                .header("cookie", session)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["email"], "alice@example.com");
}

#[tokio::test]
async fn test_register_duplicate_and_invalid() {
    let app = setup_test_app();
    register(&app, "alice").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({ "username": "alice", "email": "a2@example.com", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/register",
            None,
            json!({ "username": "bob", "email": "not-an-email", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login() {
    let app = setup_test_app();
    register(&app, "alice").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "username": "alice", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let token = json["token"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(get_request("/api/me", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/auth/login",
            None,
            json!({ "username": "alice", "password": "wrong-password" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = get_body_json(response).await;
    assert_eq!(json["error"], "Invalid username or password");
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let app = setup_test_app();

    let response = app
        .oneshot(json_request("POST", "/api/auth/logout", None, json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response.headers().get("set-cookie").unwrap().to_str().unwrap();
    assert!(cookie.contains("Max-Age=0"));
    let json = get_body_json(response).await;
    assert_eq!(json["success"], true);
}

// ========== Expense API Tests ==========

#[tokio::test]
async fn test_expense_crud() {
    let app = setup_test_app();
    let token = register(&app, "alice").await;
    let id = add_expense(&app, &token, "Groceries", 42.5, "Food", "2024-03-10").await;

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/expenses/{}", id), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["title"], "Groceries");
    assert_eq!(json["date"], "2024-03-10");

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/expenses/{}", id),
            Some(&token),
            json!({ "title": "Big shop", "amount": 80.0, "category": "Food", "date": "2024-03-11" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    assert_eq!(json["title"], "Big shop");
    assert_eq!(json["amount"], 80.0);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/expenses/{}", id))
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_request(&format!("/api/expenses/{}", id), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_expense_invalid_input() {
    let app = setup_test_app();
    let token = register(&app, "alice").await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/expenses",
            Some(&token),
            json!({ "title": "Lunch", "amount": 9.0, "category": "Food", "date": "03/10/2024" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/expenses",
            Some(&token),
            json!({ "title": "", "amount": 9.0, "category": "Food", "date": "2024-03-10" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_other_users_expense_forbidden() {
    let app = setup_test_app();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    let id = add_expense(&app, &alice, "Rent", 900.0, "Housing", "2024-01-01").await;

    let response = app
        .clone()
        .oneshot(get_request(&format!("/api/expenses/{}", id), &bob))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/expenses/{}", id),
            Some(&bob),
            json!({ "title": "Mine", "amount": 1.0, "category": "Housing", "date": "2024-01-01" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Bob's list does not include it
    let response = app
        .oneshot(get_request("/api/expenses", &bob))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert!(json.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_expenses_filtered() {
    let app = setup_test_app();
    let token = register(&app, "alice").await;
    add_expense(&app, &token, "Coffee", 4.0, "Drinks", "2024-01-02").await;
    add_expense(&app, &token, "Train", 30.0, "Transport", "2024-02-02").await;
    add_expense(&app, &token, "Espresso beans", 15.0, "Coffee", "2024-03-02").await;

    let response = app
        .clone()
        .oneshot(get_request("/api/expenses?search=COFFEE", &token))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    let titles: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Espresso beans", "Coffee"]);

    let response = app
        .clone()
        .oneshot(get_request(
            "/api/expenses?start_date=2024-02-01&end_date=2024-02-02",
            &token,
        ))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);

    let response = app
        .oneshot(get_request("/api/expenses?start_date=yesterday", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_export_csv() {
    let app = setup_test_app();
    let token = register(&app, "alice").await;
    add_expense(&app, &token, "Pizza, large", 12.5, "Food", "2024-05-04").await;

    let response = app
        .oneshot(get_request("/api/expenses/export", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/csv; charset=utf-8"
    );

    let body = get_body_text(response).await;
    let mut lines = body.lines();
    assert_eq!(lines.next(), Some("id,date,title,category,amount"));
    assert!(lines.next().unwrap().ends_with(",2024-05-04,\"Pizza, large\",Food,12.50"));
}

#[tokio::test]
async fn test_export_audit_counts_expenses_not_lines() {
    let app = setup_test_app();
    let token = register(&app, "alice").await;
    add_expense(&app, &token, "Dinner\nwith friends", 30.0, "Food", "2024-05-04").await;

    let response = app
        .clone()
        .oneshot(get_request("/api/expenses/export", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get_request("/api/audit?limit=1", &token))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json[0]["action"], "export");
    assert_eq!(json[0]["details"], "rows=1");
}

// ========== Dashboard API Tests ==========

#[tokio::test]
async fn test_dashboard_empty() {
    let app = setup_test_app();
    let token = register(&app, "alice").await;

    let response = app
        .oneshot(get_request("/api/dashboard", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["total_expense"], 0.0);
    assert_eq!(json["top_category"], "N/A");
    assert_eq!(json["total_transactions"], 0);
    assert!(json["predicted_expense"].is_null());
}

#[tokio::test]
async fn test_dashboard_with_prediction() {
    let app = setup_test_app();
    let token = register(&app, "alice").await;
    add_expense(&app, &token, "Groceries", 60.0, "Food", "2024-01-05").await;
    add_expense(&app, &token, "Bus", 40.0, "Transport", "2024-01-06").await;
    add_expense(&app, &token, "Dinner", 200.0, "Food", "2024-02-07").await;

    let response = app
        .clone()
        .oneshot(get_request("/api/dashboard", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = get_body_json(response).await;
    assert_eq!(json["total_expense"], 300.0);
    assert_eq!(json["top_category"], "Food");
    assert_eq!(json["total_transactions"], 3);
    assert_eq!(json["category_totals"]["Food"], 260.0);
    assert_eq!(json["predicted_expense"], 300.0);
    assert_eq!(
        json["category_labels"].as_array().unwrap().len(),
        json["category_values"].as_array().unwrap().len()
    );

    // Narrowed to one month
    let response = app
        .clone()
        .oneshot(get_request(
            "/api/dashboard?start_date=2024-02-01&end_date=2024-02-29",
            &token,
        ))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(
        json["predicted_expense"],
        "Not enough data to predict. We need at least 2 months of data."
    );

    let response = app
        .oneshot(get_request("/api/dashboard?end_date=2024-13-01", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ========== Audit API Tests ==========

#[tokio::test]
async fn test_audit_log_scoped_to_caller() {
    let app = setup_test_app();
    let alice = register(&app, "alice").await;
    let bob = register(&app, "bob").await;
    add_expense(&app, &alice, "Lunch", 9.0, "Food", "2024-01-01").await;

    let response = app
        .clone()
        .oneshot(get_request("/api/audit?limit=10", &alice))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = get_body_json(response).await;
    let actions: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions, vec!["create", "register"]);

    let response = app
        .oneshot(get_request("/api/audit", &bob))
        .await
        .unwrap();
    let json = get_body_json(response).await;
    assert_eq!(json.as_array().unwrap().len(), 1);
}

// ========== Error Mapping Tests ==========

#[test]
fn test_core_errors_map_to_status() {
    use fintrack_core::Error;

    let cases = [
        (Error::InvalidData("x".into()), StatusCode::BAD_REQUEST),
        (Error::NotFound("x".into()), StatusCode::NOT_FOUND),
        (Error::Conflict("x".into()), StatusCode::CONFLICT),
        (Error::Forbidden("x".into()), StatusCode::FORBIDDEN),
        (Error::Authentication("x".into()), StatusCode::UNAUTHORIZED),
        (Error::Config("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
    ];
    for (err, status) in cases {
        assert_eq!(AppError::from(err).status(), status);
    }
}
