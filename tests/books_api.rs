//! Request/response tests for the `/api/books` contract, run against the
//! full router over the in-memory store.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use bookstore_app::modules;
use bookstore_kernel::{settings::Settings, Database, ModuleRegistry};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &Database::Memory);
    bookstore_http::build_router(&registry, &Settings::default())
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn dune_lifecycle() {
    let app = app();

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/books",
        Some(json!({"title": "Dune", "author": "Herbert", "price": 9.99})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["success"], true);
    let book = &created["data"];
    let id = book["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());
    assert_eq!(book["stock"], 0);
    assert!(book["createdAt"].is_string());

    let uri = format!("/api/books/{id}");
    let (status, fetched) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"], *book);

    let (status, deleted) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["data"], *book);

    let (status, missing) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(missing, json!({"success": false, "error": "Book not found"}));
}

#[tokio::test]
async fn list_reports_count_newest_first() {
    let app = app();

    let (status, empty) = send(&app, Method::GET, "/api/books", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(empty, json!({"success": true, "count": 0, "data": []}));

    for title in ["Dune", "Dune Messiah", "Children of Dune"] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/books",
            Some(json!({"title": title, "author": "Frank Herbert", "price": 9.99})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, listed) = send(&app, Method::GET, "/api/books", None).await;
    assert_eq!(listed["count"], 3);
    assert_eq!(listed["data"][0]["title"], "Children of Dune");
    assert_eq!(listed["data"][2]["title"], "Dune");
}

#[tokio::test]
async fn create_rejects_constraint_violations() {
    let app = app();

    let cases = [
        (json!({"author": "Herbert", "price": 1}), "Book title is required"),
        (
            json!({"title": "D", "author": "Herbert", "price": 1}),
            "Title must be at least 2 characters",
        ),
        (
            json!({"title": "Dune", "author": "H", "price": 1}),
            "Author name must be at least 2 characters",
        ),
        (
            json!({"title": "Dune", "author": "Herbert", "price": -1}),
            "Price must be greater than or equal to 0",
        ),
        (
            json!({"title": "Dune", "author": "Herbert", "price": 1, "stock": -2}),
            "Stock cannot be negative",
        ),
    ];

    for (body, message) in cases {
        let (status, response) = send(&app, Method::POST, "/api/books", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(response, json!({"success": false, "error": message}));
    }

    let (_, listed) = send(&app, Method::GET, "/api/books", None).await;
    assert_eq!(listed["count"], 0);
}

#[tokio::test]
async fn malformed_json_is_a_bad_request_envelope() {
    let app = app();

    let request = Request::post("/api/books")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"title\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn duplicate_isbn_is_rejected() {
    let app = app();
    let dune = json!({"title": "Dune", "author": "Herbert", "price": 9.99, "isbn": "978-0441013593"});

    let (status, _) = send(&app, Method::POST, "/api/books", Some(dune.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, response) = send(&app, Method::POST, "/api/books", Some(dune)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response["error"],
        "A book with ISBN 978-0441013593 already exists"
    );

    let (_, listed) = send(&app, Method::GET, "/api/books", None).await;
    assert_eq!(listed["count"], 1);
}

#[tokio::test]
async fn put_with_taken_isbn_is_rejected() {
    let app = app();
    let (_, first) = send(
        &app,
        Method::POST,
        "/api/books",
        Some(json!({"title": "Dune", "author": "Herbert", "price": 9.99, "isbn": "X"})),
    )
    .await;
    let (_, second) = send(
        &app,
        Method::POST,
        "/api/books",
        Some(json!({"title": "Dune Messiah", "author": "Herbert", "price": 8.99})),
    )
    .await;
    let first_uri = format!("/api/books/{}", first["data"]["id"].as_str().unwrap());
    let second_uri = format!("/api/books/{}", second["data"]["id"].as_str().unwrap());

    let (status, response) =
        send(&app, Method::PUT, &second_uri, Some(json!({"isbn": "X"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response,
        json!({"success": false, "error": "A book with ISBN X already exists"})
    );

    let (_, unchanged) = send(&app, Method::GET, &second_uri, None).await;
    assert_eq!(unchanged["data"], second["data"]);

    let (status, kept) = send(&app, Method::PUT, &first_uri, Some(json!({"isbn": "X"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(kept["data"]["isbn"], "X");
}

#[tokio::test]
async fn put_merges_partial_fields() {
    let app = app();
    let (_, created) = send(
        &app,
        Method::POST,
        "/api/books",
        Some(json!({"title": "Dune", "author": "Herbert", "price": 9.99, "genre": "SF"})),
    )
    .await;
    let before = created["data"].clone();
    let uri = format!("/api/books/{}", before["id"].as_str().unwrap());

    let (status, updated) = send(&app, Method::PUT, &uri, Some(json!({"stock": 5}))).await;
    assert_eq!(status, StatusCode::OK);

    let mut after = updated["data"].clone();
    assert_eq!(after["stock"], 5);
    after["stock"] = before["stock"].clone();
    after["updatedAt"] = before["updatedAt"].clone();
    assert_eq!(after, before);

    let (status, rejected) = send(&app, Method::PUT, &uri, Some(json!({"price": -3}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(rejected["error"], "Price must be greater than or equal to 0");
}

#[tokio::test]
async fn unknown_and_malformed_ids_are_not_found() {
    let app = app();

    for uri in [
        "/api/books/not-an-id",
        "/api/books/64b7f0c2e4b0a1a2b3c4d5e6",
        "/api/books/0190b0e4-8f3a-7cc2-9a4e-3f1d2c3b4a59",
    ] {
        for method in [Method::GET, Method::DELETE] {
            let (status, body) = send(&app, method, uri, None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["error"], "Book not found");
        }

        let (status, _) = send(&app, Method::PUT, uri, Some(json!({"stock": 1}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn books_health_and_openapi_paths() {
    let app = app();

    let response = app
        .clone()
        .oneshot(Request::get("/api/books/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, spec) = send(&app, Method::GET, "/docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(spec["paths"]["/api/books"]["post"].is_object());
    assert!(spec["paths"]["/api/books/{id}"]["delete"].is_object());
}
