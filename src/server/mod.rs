// src/server/mod.rs

//! HTTP API and WebSocket push channel over the shared [`Scanner`].

pub mod error;
pub mod routes;
pub mod ws;

use axum::http::header::{self, HeaderValue};
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use color_eyre::eyre::{Result, WrapErr};
use serde::Deserialize;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::core::scanner::Scanner;

/// Body of `POST /scan` and payload of a `scanRequest` event.
#[derive(Debug, Default, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    pub url: Option<String>,
}

impl ScanRequest {
    /// The URL, unless it is missing or empty.
    pub fn required_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|url| !url.is_empty())
    }
}

/// Builds the application router.
pub fn router(scanner: Scanner, config: &ServerConfig) -> Result<Router> {
    let origin = HeaderValue::from_str(&config.cors_origin)
        .wrap_err_with(|| format!("invalid CORS origin: {}", config.cors_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::exact(origin))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let router = Router::new()
        .route("/scan", post(routes::scan))
        .route("/results", get(routes::list_results))
        .route("/results/{*url}", get(routes::get_result))
        .route("/test", get(routes::health))
        .route("/ws", get(ws::upgrade))
        .with_state(scanner)
        .layer(cors)
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::REFERRER_POLICY,
            HeaderValue::from_static("no-referrer"),
        ))
        .layer(TraceLayer::new_for_http());

    Ok(router)
}

/// Binds the configured address and serves until the process ends.
pub async fn serve(scanner: Scanner, config: &ServerConfig) -> Result<()> {
    let app = router(scanner, config)?;
    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("failed to bind {}", addr))?;

    info!(%addr, "Server running.");
    axum::serve(listener, app).await.wrap_err("server error")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScannerConfig;
    use crate::core::scanner::test_target;
    use crate::core::store::ResultStore;
    use futures_util::{SinkExt, StreamExt};
    use reqwest::StatusCode;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::net::TcpStream;
    use tokio_tungstenite::tungstenite::Message;
    use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
    use url::Url;

    type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

    async fn spawn_api() -> Url {
        let config = ScannerConfig { timeout_secs: 5, ..ScannerConfig::default() };
        let scanner = Scanner::new(&config, Arc::new(ResultStore::new())).unwrap();
        let app = router(scanner, &ServerConfig::default()).unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        Url::parse(&format!("http://{}", addr)).unwrap()
    }

    async fn connect_ws(api: &Url) -> Socket {
        let ws_url = format!("ws://{}:{}/ws", api.host_str().unwrap(), api.port().unwrap());
        let (socket, _) = tokio_tungstenite::connect_async(ws_url).await.unwrap();
        socket
    }

    async fn send_json(socket: &mut Socket, frame: Value) {
        socket.send(Message::text(frame.to_string())).await.unwrap();
    }

    /// Next text frame from the server, parsed as JSON.
    async fn next_event(socket: &mut Socket) -> Value {
        loop {
            let message = tokio::time::timeout(Duration::from_secs(10), socket.next())
                .await
                .expect("no event within 10s")
                .expect("socket closed")
                .unwrap();
            if message.is_text() {
                return serde_json::from_str(message.to_text().unwrap()).unwrap();
            }
        }
    }

    async fn fetch_results(api: &Url) -> Vec<Value> {
        let response = reqwest::get(api.join("/results").unwrap()).await.unwrap();
        response.json().await.unwrap()
    }

    /// Percent-encodes every byte outside the unreserved set.
    fn encode_component(raw: &str) -> String {
        raw.bytes()
            .map(|b| match b {
                b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                    (b as char).to_string()
                }
                _ => format!("%{:02X}", b),
            })
            .collect()
    }

    #[tokio::test]
    async fn scan_without_url_is_a_bad_request() {
        let api = spawn_api().await;
        let client = reqwest::Client::new();

        for body in [json!({}), json!({ "url": "" })] {
            let response =
                client.post(api.join("/scan").unwrap()).json(&body).send().await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body: Value = response.json().await.unwrap();
            assert_eq!(body, json!({ "error": "URL is required" }));
        }
    }

    #[tokio::test]
    async fn failed_scan_is_still_a_successful_response() {
        let api = spawn_api().await;
        let response = reqwest::Client::new()
            .post(api.join("/scan").unwrap())
            .json(&json!({ "url": "not a url" }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["status"], "failed");
        assert_eq!(body["error"], "Invalid URL format");

        let stored = fetch_results(&api).await;
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn completed_scan_is_listed_and_retrievable() {
        let target = test_target::spawn().await;
        let api = spawn_api().await;
        let url = target.join("/html").unwrap().to_string();

        let scanned: Value = reqwest::Client::new()
            .post(api.join("/scan").unwrap())
            .json(&json!({ "url": url }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(scanned["status"], "completed");
        assert_eq!(scanned["hsts"]["details"]["maxAgeSeconds"], 31_536_000);
        assert_eq!(scanned["csp"], json!({ "present": false, "details": {} }));

        let listed = fetch_results(&api).await;
        assert_eq!(listed, vec![scanned.clone()]);

        let lookup = format!("{}results/{}", api, encode_component(&url));
        let response = reqwest::get(&lookup).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let fetched: Value = response.json().await.unwrap();
        assert_eq!(fetched, scanned);
    }

    #[tokio::test]
    async fn unknown_result_is_not_found() {
        let api = spawn_api().await;
        let lookup =
            format!("{}results/{}", api, encode_component("https://never-scanned.example"));

        let response = reqwest::get(&lookup).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "error": "Scan result not found" }));
    }

    #[tokio::test]
    async fn responses_carry_hardening_headers() {
        let api = spawn_api().await;
        let response = reqwest::get(api.join("/test").unwrap()).await.unwrap();

        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
        assert_eq!(response.headers()["x-frame-options"], "DENY");
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "status": "API is running" }));
    }

    #[tokio::test]
    async fn websocket_answers_bad_frames_with_errors() {
        let api = spawn_api().await;
        let mut socket = connect_ws(&api).await;

        socket.send(Message::text("hello".to_string())).await.unwrap();
        let event = next_event(&mut socket).await;
        assert_eq!(event["event"], "error");
        assert!(event["data"]["message"].as_str().unwrap().starts_with("Invalid message: "));

        send_json(&mut socket, json!({ "event": "scanRequest", "data": { "url": "" } })).await;
        let event = next_event(&mut socket).await;
        assert_eq!(event, json!({ "event": "error", "data": { "message": "URL is required" } }));
    }

    #[tokio::test]
    async fn websocket_pushes_one_status_and_one_result_per_request() {
        let target = test_target::spawn().await;
        let api = spawn_api().await;
        let mut socket = connect_ws(&api).await;
        let html = target.join("/html").unwrap().to_string();
        let json_url = target.join("/json").unwrap().to_string();

        for url in [&html, &json_url] {
            send_json(&mut socket, json!({ "event": "scanRequest", "data": { "url": url } })).await;
        }

        let mut events = Vec::new();
        for _ in 0..4 {
            events.push(next_event(&mut socket).await);
        }

        for url in [&html, &json_url] {
            let positions: Vec<_> = events
                .iter()
                .enumerate()
                .filter(|(_, e)| e["data"]["url"] == url.as_str())
                .map(|(i, e)| (i, e["event"].as_str().unwrap().to_string()))
                .collect();
            assert_eq!(positions.len(), 2, "{url}: {events:?}");
            assert_eq!(positions[0].1, "scanStatus");
            assert_eq!(positions[1].1, "scanResult");
            assert!(positions[0].0 < positions[1].0);
        }

        let status = events.iter().find(|e| e["event"] == "scanStatus").unwrap();
        assert_eq!(status["data"]["status"], "scanning");
        for result in events.iter().filter(|e| e["event"] == "scanResult") {
            assert_eq!(result["data"]["status"], "completed");
        }

        let stored = fetch_results(&api).await;
        assert_eq!(stored.len(), 2);
    }

    #[test]
    fn invalid_cors_origin_is_rejected() {
        let store = Arc::new(ResultStore::new());
        let scanner = Scanner::new(&ScannerConfig::default(), store).unwrap();
        let config = ServerConfig { cors_origin: "bad\norigin".into(), ..ServerConfig::default() };
        assert!(router(scanner, &config).is_err());
    }
}
