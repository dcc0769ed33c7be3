//
// Copyright (c) 2026 TGStream Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: tgstream — stream files out of a chat backend over HTTP.
//

//! End-to-end coverage of the download surface: builds a real `AppState`
//! and `Router` over an in-memory [`MockUpstream`], then drives HTTP
//! requests through it with `tower::ServiceExt::oneshot`. Exercises the
//! boundary scenarios from spec.md §8 (S1-S5; S6/S7's connection-pool
//! behavior is covered by `tgstream-core`'s own concurrency tests).

use std::net::SocketAddr;
use std::sync::{Arc, Mutex, OnceLock};

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use tgstream_core::mock::MockUpstream;
use tgstream_core::{TransferEngine, UpstreamClient};
use tgstream_platform::http::{create_router, AppState, Config};
use tgstream_types::prelude::pack;

const CHUNK_SIZE: u64 = 512 * 1024;
const PEER_ADDR: &str = "127.0.0.1:12345";

fn test_config() -> Config {
    Config {
        api_id: 1,
        api_hash: "hash".to_string(),
        session_name: "test".to_string(),
        host: "localhost".to_string(),
        port: 8080,
        public_url: None,
        trust_forward_headers: false,
        debug: false,
        log_config: None,
        request_limit: 5,
        connection_limit: 4,
        start_message: "start".to_string(),
        group_channel_message: "shared".to_string(),
    }
}

async fn router_over(content: Vec<u8>) -> axum::Router {
    let upstream: Arc<dyn UpstreamClient> = Arc::new(MockUpstream::new(1, content));
    let transfer = Arc::new(TransferEngine::new(upstream.clone(), 4));
    transfer.post_init().await;
    let state = AppState::new(upstream, transfer, &test_config());
    create_router(state)
}

fn request(method: &str, path: &str, range: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(range) = range {
        builder = builder.header("range", range);
    }
    builder.body(Body::empty()).unwrap()
}

// Axum's `ConnectInfo` extractor reads from the request's extensions, so
// tests can stand in for a real peer address without standing up a TCP
// listener and `into_make_service_with_connect_info`.
async fn send(router: axum::Router, mut req: Request<Body>) -> axum::http::Response<Body> {
    let peer: SocketAddr = PEER_ADDR.parse().unwrap();
    req.extensions_mut().insert(axum::extract::ConnectInfo(peer));
    router.oneshot(req).await.unwrap()
}

#[tokio::test]
async fn s1_full_file_download_has_expected_headers_and_body() {
    let content: Vec<u8> = (0u32..(2 * CHUNK_SIZE as u32)).map(|i| (i % 251) as u8).collect();
    let file_size = content.len() as u64;
    let router = router_over(content.clone()).await;

    let id = pack(false, false, 1, 42);
    let path = format!("/{}/{}", id, "file.bin");
    let response = send(router, request("GET", &path, None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-length").unwrap(),
        &file_size.to_string()
    );
    assert_eq!(
        response.headers().get("content-range").unwrap(),
        &format!("bytes 0-{file_size}/{file_size}")
    );

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body.to_vec(), content);
}

#[tokio::test]
async fn s2_open_ended_range_returns_206_with_the_tail_of_the_file() {
    let content: Vec<u8> = (0u32..(2 * CHUNK_SIZE as u32)).map(|i| (i % 251) as u8).collect();
    let router = router_over(content.clone()).await;

    let id = pack(false, false, 1, 42);
    let path = format!("/{}/{}", id, "file.bin");
    let response = send(router, request("GET", &path, Some("bytes=100-"))).await;

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        response.headers().get("content-length").unwrap(),
        &(content.len() as u64 - 100).to_string()
    );

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body.to_vec(), content[100..]);
}

#[tokio::test]
async fn explicit_range_starting_at_zero_still_returns_200() {
    // An explicit `Range: bytes=0-...` parses successfully but must not flip
    // the status to 206 — per spec.md, status depends on `offset > 0`, not
    // on whether a Range header was present at all.
    let content: Vec<u8> = (0u32..(2 * CHUNK_SIZE as u32)).map(|i| (i % 251) as u8).collect();
    let router = router_over(content.clone()).await;

    let id = pack(false, false, 1, 42);
    let path = format!("/{}/{}", id, "file.bin");
    let response = send(router, request("GET", &path, Some("bytes=0-500"))).await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn s3_range_within_a_single_chunk_returns_exactly_that_slice() {
    let content: Vec<u8> = (0u32..(2 * CHUNK_SIZE as u32)).map(|i| (i % 251) as u8).collect();
    let router = router_over(content.clone()).await;

    let id = pack(false, false, 1, 42);
    let path = format!("/{}/{}", id, "file.bin");
    let response = send(
        router,
        request("GET", &path, Some("bytes=524388-524500")),
    )
    .await;

    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body.len(), 112);
    assert_eq!(body.to_vec(), content[524388..524500]);
}

#[tokio::test]
async fn s4_head_returns_headers_with_no_body() {
    let content: Vec<u8> = vec![1u8; (2 * CHUNK_SIZE) as usize];
    let router = router_over(content.clone()).await;

    let id = pack(false, false, 1, 42);
    let path = format!("/{}/{}", id, "file.bin");
    let response = send(router, request("HEAD", &path, None)).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-length").unwrap(),
        &content.len().to_string()
    );
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(body.is_empty());
}

#[tokio::test]
async fn s5_wrong_name_for_a_valid_id_is_404() {
    let content = vec![1u8; 1024];
    let router = router_over(content).await;

    let id = pack(false, false, 1, 42);
    let path = format!("/{id}/WRONG_NAME.bin");
    let response = send(router, request("GET", &path, None)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_id_is_404() {
    let router = router_over(vec![1u8; 64]).await;

    let id = pack(false, false, 999, 999);
    let path = format!("/{id}/whatever.bin");
    let response = send(router, request("GET", &path, None)).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn zero_chat_id_or_message_id_is_404_without_an_upstream_lookup() {
    let router = router_over(vec![1u8; 64]).await;

    // msg_id == 0
    let id = pack(false, false, 1, 0);
    let response = send(router, request("GET", &format!("/{id}/x"), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn healthz_reports_ok() {
    let router = router_over(vec![]).await;
    let response = router
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Config::from_env tests
// ---------------------------------------------------------------------------

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

#[test]
fn config_requires_api_credentials() {
    let _guard = env_lock().lock().unwrap_or_else(|p| p.into_inner());
    std::env::remove_var("TG_API_ID");
    std::env::remove_var("TG_API_HASH");
    assert!(Config::from_env().is_err());
}

#[test]
fn config_applies_documented_defaults() {
    let _guard = env_lock().lock().unwrap_or_else(|p| p.into_inner());
    std::env::set_var("TG_API_ID", "12345");
    std::env::set_var("TG_API_HASH", "deadbeef");
    std::env::remove_var("PORT");
    std::env::remove_var("HOST");
    std::env::remove_var("CONNECTION_LIMIT");
    std::env::remove_var("PUBLIC_URL");

    let config = Config::from_env().unwrap();
    assert_eq!(config.port, 8080);
    assert_eq!(config.host, "localhost");
    assert_eq!(config.connection_limit, 20);
    assert_eq!(config.base_url(), "http://localhost:8080");

    std::env::remove_var("TG_API_ID");
    std::env::remove_var("TG_API_HASH");
}
