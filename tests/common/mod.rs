//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;

use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use response_negotiation::config::ServiceConfig;
use response_negotiation::lifecycle::Shutdown;
use response_negotiation::{demo, HttpServer};
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;

/// Config used by the in-process tests: forwarded proto is trusted so a
/// test can pick the connection's security per request.
pub fn test_config() -> ServiceConfig {
    let mut config = ServiceConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.response.trust_forwarded_proto = true;
    config
}

pub fn demo_server(config: ServiceConfig) -> HttpServer {
    let service = demo::service(&config);
    HttpServer::new(config, service)
}

/// Drive a single request through the fully layered demo router.
pub async fn send(request: Request<Body>) -> Response<Body> {
    demo_server(test_config()).router().oneshot(request).await.unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub fn header<'a>(response: &'a Response<Body>, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

/// Start the demo service on an ephemeral port.
pub async fn spawn_server(config: ServiceConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = demo_server(config);
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });
    (addr, shutdown)
}
