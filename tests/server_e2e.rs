//! Shell host over a real listener.

use std::time::Duration;

use call_shell::config::Variant;
use call_shell::http::X_SHELL_ROUTE;
use call_shell::lifecycle::Shutdown;
use serde_json::Value;

mod common;

#[tokio::test]
async fn test_serve_and_shutdown() {
    let server = common::server(common::shell_config(Variant::PathCallId));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    let res = client
        .get(format!("http://{}/call/call/abc123", addr))
        .send()
        .await
        .expect("shell host unreachable");
    assert_eq!(res.status(), 200);
    assert_eq!(res.headers()[X_SHELL_ROUTE], "Home");
    assert!(res.text().await.unwrap().contains("id=\"app\""));

    let body: Value = client
        .get(format!("http://{}/_shell/resolve", addr))
        .query(&[("href", "/call/call/xyz?agent=7")])
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["state"]["params"]["callId"], "xyz");
    assert_eq!(body["state"]["query"]["agent"], "7");

    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server should stop after shutdown")
        .unwrap();
    assert!(result.is_ok());
}
