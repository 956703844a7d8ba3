//! Live server tests over real TCP.

use std::time::Duration;

use serde_json::{json, Value};

mod common;

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_live_server_dispatch() {
    let router = common::build_router(vec![common::items_collection(), common::api_with_error_handler()]);
    let (addr, shutdown) = common::start_server(router).await;
    let client = client();

    let res = client
        .get(format!("http://{}/docs/items/count", addr))
        .send()
        .await
        .expect("server unreachable");
    assert_eq!(res.status(), 200);
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.text().await.unwrap(), "\"items/count\"");

    let res = client
        .put(format!("http://{}/item/5", addr))
        .json(&json!({ "name": "TestItem", "value": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["item"]["name"], "TestItem");

    let res = client.get(format!("http://{}/nowhere", addr)).send().await.unwrap();
    assert_eq!(res.status(), 404);

    shutdown.trigger();
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let (addr, shutdown) = common::start_server(common::build_router(vec![common::async_api()])).await;

    let res = client()
        .get(format!("http://{}/items/abc", addr))
        .header("x-request-id", "req-42")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "req-42");
    assert_eq!(res.text().await.unwrap(), "\"abc\"");

    shutdown.trigger();
}

#[tokio::test]
async fn test_graceful_shutdown_stops_accepting() {
    let (addr, shutdown) = common::start_server(common::build_router(vec![common::async_api()])).await;

    let res = client().get(format!("http://{}/health", addr)).send().await.unwrap();
    assert_eq!(res.status(), 200);

    shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(client().get(format!("http://{}/health", addr)).send().await.is_err());
}
