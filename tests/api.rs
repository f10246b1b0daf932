mod common;

use axum::body::Body;
use axum::http::{self, Request, StatusCode};
use common::{FixtureProxy, ACK};
use http_body_util::BodyExt;
use onion_http_tunnel::infra::ExternalDaemon;
use onion_http_tunnel::routes::{router, AppState};
use onion_http_tunnel::tunnel::types::ProxyAddress;
use onion_http_tunnel::{TunnelClient, TunnelOptions};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

fn state(proxy_port: u16, hidden_service_dir: Option<PathBuf>) -> AppState {
    let proxy = ProxyAddress::loopback(proxy_port);
    AppState {
        client: TunnelClient::tcp(
            TunnelOptions::new(proxy.clone()).with_connect_timeout(Duration::from_secs(5)),
        )
        .arc(),
        daemon: Arc::new(ExternalDaemon::new(
            proxy,
            hidden_service_dir,
            Duration::from_secs(1),
        )),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_reports_daemon_state() {
    let app = router(state(1, None));
    let resp = app
        .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["daemonReady"], false);
}

#[tokio::test]
async fn proxy_route_tunnels_request() {
    let proxy = FixtureProxy::spawn(ACK, &[b"HTTP/1.1 200 OK\r\nServer: x\r\n\r\n{\"ok\":1}"]).await;
    let app = router(state(proxy.port, None));

    let resp = app
        .oneshot(json_request(
            "/api/proxy",
            r#"{"method":"post","url":"http://a.onion/echo","headers":{"X-Test":"1"},"body":"{}"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["status"], 200);
    assert_eq!(json["data"]["body"], "{\"ok\":1}");
    assert_eq!(json["data"]["headerBlock"], "HTTP/1.1 200 OK\r\nServer: x");
    assert_eq!(json["data"]["url"], "http://a.onion/echo");

    let seen = proxy.connections(1).await;
    let request = seen[0].request_text();
    assert!(request.starts_with("POST /echo HTTP/1.1\r\n"));
    assert!(request.contains("X-Test: 1\r\n"));
    assert!(request.ends_with("\r\n\r\n{}"));
}

#[tokio::test]
async fn proxy_route_reports_handshake_failure() {
    let proxy =
        FixtureProxy::spawn(b"HTTP/1.1 403 Forbidden\r\n\r\n", &[]).await;
    let app = router(state(proxy.port, None));

    let resp = app
        .oneshot(json_request(
            "/api/proxy",
            r#"{"method":"GET","url":"http://a.onion/"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(resp).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["error"]["code"], "PROXY_HANDSHAKE_FAILED");
}

#[tokio::test]
async fn proxy_route_rejects_bad_input() {
    let app = router(state(1, None));
    let resp = app
        .clone()
        .oneshot(json_request(
            "/api/proxy",
            r#"{"method":"BREW","url":"http://a.onion/"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"]["code"], "INVALID_METHOD");

    let resp = app
        .oneshot(json_request(
            "/api/proxy",
            r#"{"method":"GET","url":"https://a.onion/"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"]["code"], "INVALID_URL");
}

#[tokio::test]
async fn proxy_route_zero_timeout_means_no_bound() {
    let proxy = FixtureProxy::spawn(
        ACK,
        &[b"HTTP/1.1 200 OK\r\n\r\n", b"slow", b" reply"],
    )
    .await;
    let app = router(state(proxy.port, None));

    let resp = app
        .oneshot(json_request(
            "/api/proxy",
            r#"{"method":"GET","url":"http://a.onion/","timeout":0}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["data"]["body"], "slow reply");
}

#[tokio::test]
async fn hostname_route_missing_is_404() {
    let app = router(state(1, None));
    let resp = app
        .oneshot(Request::builder().uri("/api/hostname").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let json = body_json(resp).await;
    assert_eq!(json["error"]["code"], "HOSTNAME_UNAVAILABLE");
}

#[tokio::test]
async fn hostname_route_reads_service_dir() {
    let dir = std::env::temp_dir().join(format!("onion-http-tunnel-api-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("hostname"), "servicexyz.onion\n").unwrap();

    let app = router(state(1, Some(dir.clone())));
    let resp = app
        .oneshot(Request::builder().uri("/api/hostname").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["hostname"], "servicexyz.onion");

    std::fs::remove_dir_all(dir).ok();
}
