//! Shared sample APIs and helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tower::ServiceExt;

use priority_router::config::RouterConfig;
use priority_router::dispatch::{Endpoint, Reply, RouteGroup, Router, RouterBuilder};
use priority_router::lifecycle::Shutdown;
use priority_router::{HttpServer, Parameter};

/// Generic collection endpoints that echo their own template.
pub fn generic_collections() -> RouteGroup<()> {
    RouteGroup::stateless()
        .prefix("docs")
        .endpoint(
            Endpoint::new("GetGenericCount", "{collection}/count")
                .param(Parameter::new::<String>("collection"))
                .static_handler(|mut args| {
                    let collection: String = args.take("collection")?;
                    Reply::value(json!({ "route": "{collection}/count", "collection": collection }))
                }),
        )
        .endpoint(
            Endpoint::new("GetGenericItem", "{collection}/{id}").static_handler(|_| Reply::value("{collection}/{id}")),
        )
}

/// Specific endpoints that compete with [`generic_collections`].
pub fn items_collection() -> RouteGroup<()> {
    RouteGroup::stateless()
        .prefix("docs")
        .endpoint(Endpoint::new("GetSpecificCount", "items/count").static_handler(|_| Reply::value("items/count")))
        .endpoint(Endpoint::new("GetSpecificItem", "items/{id}").static_handler(|_| Reply::value("items/{id}")))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub name: String,
    pub value: Option<i32>,
}

/// Endpoints whose binding failures go through a custom error callback.
pub fn api_with_error_handler() -> RouteGroup<()> {
    RouteGroup::stateless()
        .on_error(|_, error| Some(json!({ "customError": error.kind(), "parameter": error.parameter() })))
        .endpoint(
            Endpoint::new("GetItem", "item/{number}")
                .param(Parameter::new::<i32>("number"))
                .static_handler(|mut args| {
                    let number: i32 = args.take("number")?;
                    Reply::value(number)
                }),
        )
        .endpoint(
            Endpoint::new("UpdateItem", "item/{number}")
                .param(Parameter::new::<i32>("number"))
                .param(Parameter::body::<Item>("item"))
                .static_handler(|mut args| {
                    let number: i32 = args.take("number")?;
                    let item: Item = args.take("item")?;
                    Reply::value(json!({ "number": number, "item": item }))
                }),
        )
}

/// Endpoints that complete asynchronously.
pub fn async_api() -> RouteGroup<()> {
    RouteGroup::stateless()
        .endpoint(
            Endpoint::new("GetItem", "items/{key}")
                .param(Parameter::new::<String>("key"))
                .static_handler(|mut args| {
                    let key: String = args.take("key")?;
                    Ok(Reply::eventual(async move {
                        tokio::time::sleep(Duration::from_millis(1)).await;
                        Ok(key)
                    }))
                }),
        )
        .endpoint(Endpoint::new("Touch", "touch").verb(Method::POST).static_handler(|_| {
            Ok(Reply::eventual_empty(async {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok(())
            }))
        }))
}

pub fn build_router(groups: Vec<RouteGroup<()>>) -> Router {
    let mut builder = Router::builder();
    for group in groups {
        builder.mount(group).unwrap();
    }
    builder.build()
}

pub fn build_router_typed<T: Send + 'static>(group: RouteGroup<T>) -> Router {
    let mut builder = RouterBuilder::default();
    builder.mount(group).unwrap();
    builder.build()
}

pub fn build_app(router: Router) -> axum::Router {
    HttpServer::build_router(&RouterConfig::default(), router)
}

/// Send one request through the app and return status plus body text.
pub async fn send(app: &axum::Router, method: Method, uri: &str, body: &str) -> (StatusCode, String) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Start a live server on an ephemeral port.
pub async fn start_server(router: Router) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(RouterConfig::default(), router);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}
