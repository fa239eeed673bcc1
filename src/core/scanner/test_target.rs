// src/core/scanner/test_target.rs

//! Local HTTP target used by the fetcher, scanner and API tests.

use std::time::Duration;

use axum::extract::Path;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use url::Url;

pub const HTML_PAGE: &str = r#"<!DOCTYPE html>
<html>
  <body onload="init()">
    <form>
      <input type="text" id="search">
      <input type="password" id="pw">
      <input type="email" sanitized>
    </form>
    <div id="menu" onclick="open()" onmouseover="hover()">Menu</div>
  </body>
</html>"#;

pub const HSTS: &str = "max-age=31536000; includeSubDomains; preload";

async fn html() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::STRICT_TRANSPORT_SECURITY, HSTS),
        ],
        HTML_PAGE,
    )
}

async fn json() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/json"),
            (header::CONTENT_SECURITY_POLICY, "default-src 'self'; img-src *;"),
        ],
        r#"{"ok":true}"#,
    )
}

async fn echo_user_agent(headers: HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn hop(Path(n): Path<u32>) -> Redirect {
    if n == 0 {
        Redirect::temporary("/html")
    } else {
        Redirect::temporary(&format!("/hop/{}", n - 1))
    }
}

async fn slow() -> &'static str {
    tokio::time::sleep(Duration::from_secs(3)).await;
    "too late"
}

pub fn router() -> Router {
    Router::new()
        .route("/html", get(html))
        .route("/json", get(json))
        .route("/echo-ua", get(echo_user_agent))
        .route("/missing", get(|| async { (StatusCode::NOT_FOUND, "nothing here") }))
        .route("/broken", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route("/to-missing", get(|| async { Redirect::temporary("/missing") }))
        .route("/loop", get(|| async { Redirect::temporary("/loop") }))
        .route("/hop/{n}", get(hop))
        .route("/slow", get(slow))
}

/// Serves [`router`] on an ephemeral localhost port and returns its base URL.
pub async fn spawn() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind test target");
    let addr = listener.local_addr().expect("test target address");
    tokio::spawn(async move {
        axum::serve(listener, router()).await.expect("serve test target");
    });
    Url::parse(&format!("http://{}", addr)).expect("test target URL")
}
