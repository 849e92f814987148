//! End-to-end tests against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives `AjaxClient` over
//! real HTTP with the default `reqwest` transport. The echo endpoint reports
//! what actually arrived on the wire.

use ajax_core::{AjaxClient, AjaxError, Blob, ClientConfig, Payload, StatusError};
use mock_server::{Echo, Item};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

async fn start_server() -> AjaxClient {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    AjaxClient::new(ClientConfig::with_base_url(&format!("http://{addr}")))
}

/// Serve a single hand-written response on a random port; returns the base URL.
async fn raw_reply(status_line: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut chunk = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&chunk[..n]);
        }
        let response = format!(
            "{status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
    });
    format!("http://{addr}")
}

#[tokio::test(flavor = "multi_thread")]
async fn get_sends_payload_as_query() {
    let client = start_server().await;
    let payload = Payload::new().with("q", "a b").with("page", 2).with("all", true);

    let echo: Echo = client
        .send_json_as("get", "/api/echo", &payload)
        .await
        .unwrap();
    assert_eq!(echo.method, "GET");
    assert_eq!(
        echo.query,
        vec![
            ("q".to_string(), "a b".to_string()),
            ("page".to_string(), "2".to_string()),
            ("all".to_string(), "true".to_string()),
        ]
    );
    assert!(echo.fields.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn non_get_sends_payload_as_multipart() {
    let client = start_server().await;
    let payload = Payload::new()
        .with("name", "x y&z")
        .with("ratio", 0.5)
        .with(
            "upload",
            Blob::new(b"hello".to_vec())
                .with_file_name("hello.txt")
                .with_content_type("text/plain"),
        );

    for method in ["post", "PUT", "Patch"] {
        let echo: Echo = client
            .send_json_as(method, "/api/echo", &payload)
            .await
            .unwrap();
        assert_eq!(echo.method, method.to_ascii_uppercase());
        assert!(echo.query.is_empty());
        assert_eq!(
            echo.fields,
            vec![
                ("name".to_string(), "x y&z".to_string()),
                ("ratio".to_string(), "0.5".to_string()),
            ]
        );
        assert_eq!(echo.files.len(), 1);
        assert_eq!(echo.files[0].name, "upload");
        assert_eq!(echo.files[0].file_name, "hello.txt");
        assert_eq!(echo.files[0].content_type.as_deref(), Some("text/plain"));
        assert_eq!(echo.files[0].size, 5);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn forbidden_resolves_with_raw_body() {
    let client = start_server().await;
    let body = client
        .send("get", "/api/status/403", &Payload::new())
        .await
        .unwrap();
    assert_eq!(body, "forbidden");

    let err = client
        .send_json("get", "/api/status/403", &Payload::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AjaxError::Json(_)));
}

#[tokio::test(flavor = "multi_thread")]
async fn server_error_rejects_with_status() {
    let client = start_server().await;
    let err = client
        .send("POST", "/api/status/500", &Payload::new().with("name", "x"))
        .await
        .unwrap_err();
    assert_eq!(
        err.failure(),
        Some(StatusError {
            status: 500,
            status_text: "Internal Server Error".to_string(),
        })
    );

    let err = client
        .send("get", "/api/status/404", &Payload::new())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test(flavor = "multi_thread")]
async fn item_lifecycle() {
    let client = start_server().await;

    let items: Vec<Item> = client
        .send_json_as("get", "/api/items", &Payload::new())
        .await
        .unwrap();
    assert!(items.is_empty());

    let created: Item = client
        .send_json_as("POST", "/api/items", &Payload::new().with("name", "x"))
        .await
        .unwrap();
    assert_eq!(created.name, "x");

    let items: Vec<Item> = client
        .send_json_as("get", "/api/items", &Payload::new().with("q", "x"))
        .await
        .unwrap();
    assert_eq!(items, vec![created.clone()]);

    let body = client
        .send("delete", &format!("/api/items/{}", created.id), &Payload::new())
        .await
        .unwrap();
    assert!(body.is_empty());

    let err = client
        .send("delete", &format!("/api/items/{}", created.id), &Payload::new())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_calls_settle_independently() {
    let client = start_server().await;
    let empty = Payload::new();

    let (ok, forbidden, failed) = tokio::join!(
        client.send("get", "/api/status/200", &empty),
        client.send("get", "/api/status/403", &empty),
        client.send("get", "/api/status/503", &empty),
    );
    assert_eq!(ok.unwrap(), "ok");
    assert_eq!(forbidden.unwrap(), "forbidden");
    assert_eq!(failed.unwrap_err().status(), Some(503));
}

#[tokio::test(flavor = "multi_thread")]
async fn connection_refused_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = AjaxClient::new(ClientConfig::default());
    let err = client
        .send("get", &format!("http://{addr}/api/items"), &Payload::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AjaxError::Transport(_)));
    assert_eq!(err.status(), Some(0));
    assert_eq!(err.status_text(), Some(""));
}

#[tokio::test(flavor = "multi_thread")]
async fn status_text_is_the_reason_phrase_sent() {
    let cases = [
        ("HTTP/1.1 500 Database Down", 500, "Database Down"),
        ("HTTP/1.1 599 Custom Thing", 599, "Custom Thing"),
        ("HTTP/1.1 404 Not Found", 404, "Not Found"),
    ];
    for (status_line, status, status_text) in cases {
        let base = raw_reply(status_line, "oops").await;
        let client = AjaxClient::new(ClientConfig::with_base_url(&base));
        let err = client.send("get", "/x", &Payload::new()).await.unwrap_err();
        assert_eq!(
            err.failure(),
            Some(StatusError {
                status,
                status_text: status_text.to_string(),
            }),
            "{status_line}"
        );
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn forbidden_with_custom_reason_still_resolves() {
    let base = raw_reply("HTTP/1.1 403 Login Required", "please log in").await;
    let client = AjaxClient::new(ClientConfig::with_base_url(&base));
    let body = client.send("get", "/x", &Payload::new()).await.unwrap();
    assert_eq!(body, "please log in");
}

#[tokio::test(flavor = "multi_thread")]
async fn body_over_configured_cap_is_a_transport_error() {
    let base = raw_reply("HTTP/1.1 200 OK", "oops").await;
    let config = ClientConfig {
        max_body_bytes: Some(3),
        ..ClientConfig::with_base_url(&base)
    };
    let err = AjaxClient::new(config)
        .send("get", "/x", &Payload::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AjaxError::Transport(_)));

    let base = raw_reply("HTTP/1.1 200 OK", "oops").await;
    let body = AjaxClient::new(ClientConfig::with_base_url(&base))
        .send("get", "/x", &Payload::new())
        .await
        .unwrap();
    assert_eq!(body, "oops");
}
