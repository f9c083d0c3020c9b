use fretlink_server::ServerConfig;
use serde_json::Value;

use crate::integration::init_tracing;
use crate::utils::start_server;

#[tokio::test]
async fn test_status_endpoints() {
    init_tracing();

    let (addr, _state) = start_server(ServerConfig::default()).await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("http://{addr}/")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let headers = resp.headers().clone();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["x-xss-protection"], "1; mode=block");
    assert!(headers.get("strict-transport-security").is_none());
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");

    let body: Value = client
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].as_u64().unwrap() > 0);

    // Plain GET on the socket endpoint asks for an upgrade
    let resp = client.get(format!("http://{addr}/ws")).send().await.unwrap();
    assert!(resp.status().is_client_error());
}

#[tokio::test]
async fn test_production_adds_hsts() {
    init_tracing();

    let config = ServerConfig::default().with_environment("production");
    let (addr, _state) = start_server(config).await;

    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert_eq!(
        resp.headers()["strict-transport-security"],
        "max-age=31536000; includeSubDomains"
    );
}
