mod common;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use common::{token, TestServer, ALL, CREATE, DELETE, EDIT, VIEW};
use product_api::authz::{Authorizer, Capability};
use product_api::database::{DatabaseError, ProductStore};
use product_api::middleware::Caller;
use reqwest::StatusCode;
use serde_json::{json, Value};

#[tokio::test]
async fn create_returns_created_product() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server
        .client
        .post(server.url("/api/products"))
        .bearer_auth(token(1, &[CREATE]))
        .json(&json!({ "name": "Widget", "price": 9.99, "stock": 10 }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Product created successfully");
    assert_eq!(body["data"]["name"], "Widget");
    assert_eq!(body["data"]["price"], json!(9.99));
    assert_eq!(body["data"]["stock"], json!(10));
    assert_eq!(body["data"]["description"], Value::Null);
    assert!(body["data"]["id"].is_i64());
    assert!(body["data"]["created_at"].is_string());

    assert_eq!(server.store.len().await, 1);
    Ok(())
}

#[tokio::test]
async fn create_rejects_negative_price_or_stock() -> Result<()> {
    let server = TestServer::spawn().await?;

    for payload in [
        json!({ "name": "Widget", "price": -0.5, "stock": 10 }),
        json!({ "name": "Widget", "price": 1, "stock": -1 }),
    ] {
        let res = server
            .client
            .post(server.url("/api/products"))
            .bearer_auth(token(1, &[CREATE]))
            .json(&payload)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = res.json::<Value>().await?;
        assert!(body["errors"].is_object(), "missing field errors: {}", body);
        assert!(body.get("data").is_none());
    }

    assert!(server.store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn create_reports_missing_fields() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server
        .client
        .post(server.url("/api/products"))
        .bearer_auth(token(1, &[CREATE]))
        .json(&json!({ "description": "no name" }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "The name field is required. (and 2 more errors)");
    assert_eq!(body["errors"]["price"], json!(["The price field is required."]));
    assert_eq!(body["errors"]["stock"], json!(["The stock field is required."]));
    Ok(())
}

#[tokio::test]
async fn create_checks_permission_before_validating() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server
        .client
        .post(server.url("/api/products"))
        .bearer_auth(token(1, &[VIEW]))
        .json(&json!({ "price": -1 }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body = res.json::<Value>().await?;
    assert_eq!(body, json!({ "message": "Insufficient permissions" }));
    Ok(())
}

#[tokio::test]
async fn malformed_json_is_a_bad_request() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server
        .client
        .post(server.url("/api/products"))
        .bearer_auth(token(1, &[CREATE]))
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body("{\"name\": ")
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(server.store.is_empty().await);
    Ok(())
}

#[tokio::test]
async fn list_returns_every_product_regardless_of_creator() -> Result<()> {
    let server = TestServer::spawn().await?;

    for (user, name) in [(1, "Alpha"), (2, "Beta")] {
        let res = server
            .client
            .post(server.url("/api/products"))
            .bearer_auth(token(user, &[CREATE]))
            .json(&json!({ "name": name, "price": 1, "stock": 1 }))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = server
        .client
        .get(server.url("/api/products"))
        .bearer_auth(token(3, &[VIEW]))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Products retrieved successfully");
    let names: Vec<&str> = body["data"]
        .as_array()
        .expect("data should be an array")
        .iter()
        .filter_map(|p| p["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Alpha", "Beta"]);
    Ok(())
}

#[tokio::test]
async fn list_of_empty_store_is_an_empty_array() -> Result<()> {
    let server = TestServer::spawn().await?;

    let res = server
        .client
        .get(server.url("/api/products"))
        .bearer_auth(token(1, &[VIEW]))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["data"], json!([]));
    Ok(())
}

#[tokio::test]
async fn show_returns_the_product() -> Result<()> {
    let server = TestServer::spawn().await?;
    let product = server.seed("Widget", 9.99, 10).await?;

    let res = server
        .client
        .get(server.url(&format!("/api/products/{}", product["id"])))
        .bearer_auth(token(1, &[VIEW]))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["message"], "Product retrieved successfully");
    assert_eq!(body["data"], product);
    Ok(())
}

#[tokio::test]
async fn partial_update_leaves_other_fields_unchanged() -> Result<()> {
    let server = TestServer::spawn().await?;
    let product = server.seed("Widget", 9.99, 10).await?;
    let item = server.url(&format!("/api/products/{}", product["id"]));

    let res = server
        .client
        .patch(&item)
        .bearer_auth(token(1, &[EDIT]))
        .json(&json!({ "stock": 3 }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body, json!({ "message": "Product updated successfully" }));

    let res = server.client.get(&item).bearer_auth(token(1, &[VIEW])).send().await?;
    let body = res.json::<Value>().await?;
    assert_eq!(body["data"]["stock"], json!(3));
    assert_eq!(body["data"]["name"], "Widget");
    assert_eq!(body["data"]["price"], json!(9.99));
    assert_eq!(body["data"]["description"], Value::Null);
    Ok(())
}

#[tokio::test]
async fn put_validates_supplied_fields() -> Result<()> {
    let server = TestServer::spawn().await?;
    let product = server.seed("Widget", 9.99, 10).await?;
    let item = server.url(&format!("/api/products/{}", product["id"]));

    let res = server
        .client
        .put(&item)
        .bearer_auth(token(1, &[EDIT]))
        .json(&json!({ "name": "x".repeat(256), "price": -3 }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = res.json::<Value>().await?;
    assert!(body["errors"]["name"].is_array());
    assert!(body["errors"]["price"].is_array());

    let res = server.client.get(&item).bearer_auth(token(1, &[VIEW])).send().await?;
    let body = res.json::<Value>().await?;
    assert_eq!(body["data"], product);
    Ok(())
}

#[tokio::test]
async fn delete_then_show_is_not_found() -> Result<()> {
    let server = TestServer::spawn().await?;
    let product = server.seed("Widget", 9.99, 10).await?;
    let item = server.url(&format!("/api/products/{}", product["id"]));

    let res = server.client.delete(&item).bearer_auth(token(1, &[DELETE])).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body, json!({ "message": "Product deleted successfully" }));

    let res = server.client.get(&item).bearer_auth(token(1, &[VIEW])).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server.client.delete(&item).bearer_auth(token(1, &[DELETE])).send().await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn callers_without_capability_cannot_mutate() -> Result<()> {
    let server = TestServer::spawn().await?;
    let product = server.seed("Widget", 9.99, 10).await?;
    let item = server.url(&format!("/api/products/{}", product["id"]));

    // Holds every capability except the one each request needs
    let without = |missing: &str| {
        let granted: Vec<&str> = ALL.iter().copied().filter(|c| *c != missing).collect();
        token(5, &granted)
    };

    let requests = vec![
        server.client.get(server.url("/api/products")).bearer_auth(without(VIEW)),
        server
            .client
            .post(server.url("/api/products"))
            .bearer_auth(without(CREATE))
            .json(&json!({ "name": "Other", "price": 1, "stock": 1 })),
        server.client.get(&item).bearer_auth(without(VIEW)),
        server.client.put(&item).bearer_auth(without(EDIT)).json(&json!({ "stock": 0 })),
        server.client.patch(&item).bearer_auth(without(EDIT)).json(&json!({ "name": "Renamed" })),
        server.client.delete(&item).bearer_auth(without(DELETE)),
    ];

    for request in requests {
        let res = request.send().await?;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let body = res.json::<Value>().await?;
        assert_eq!(body, json!({ "message": "Insufficient permissions" }));
    }

    let stored = server.store.all().await?;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Widget");
    assert_eq!(stored[0].stock, 10);
    Ok(())
}

struct BrokenAuthorizer;

#[async_trait]
impl Authorizer for BrokenAuthorizer {
    async fn can(&self, _caller: &Caller, _capability: Capability) -> Result<bool, DatabaseError> {
        Err(DatabaseError::ConnectionError("connection refused".into()))
    }
}

#[tokio::test]
async fn authorizer_failures_are_not_treated_as_grants() -> Result<()> {
    let server = TestServer::spawn_with(Arc::new(BrokenAuthorizer)).await?;

    let res = server
        .client
        .post(server.url("/api/products"))
        .bearer_auth(token(1, &ALL))
        .json(&json!({ "name": "Widget", "price": 1, "stock": 1 }))
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = res.json::<Value>().await?;
    assert!(!body["message"].as_str().unwrap_or_default().contains("refused"));
    assert!(server.store.is_empty().await);
    Ok(())
}
