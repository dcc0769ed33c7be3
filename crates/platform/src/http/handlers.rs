//
// Copyright (c) 2026 TGStream Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: tgstream — stream files out of a chat backend over HTTP.
//

//! HTTP endpoint handlers.
//!
//! `GET`/`HEAD /{id}/{name}` is the entire download surface. `{name}` never
//! participates in routing — only `{id}` does — but it must byte-match the
//! file's resolved name or the request 404s, so a guessed id can't be used
//! to probe unrelated content under a chosen filename.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{header, HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use futures_util::StreamExt;
use serde::Serialize;
use tgstream_types::prelude::unpack;

use crate::error::GatewayError;

use super::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /healthz` — liveness check.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `GET`/`HEAD /{id}/{name}` — stream (a range of) a file's bytes.
pub async fn download_handler(
    State(state): State<AppState>,
    Path((id, name)): Path<(String, String)>,
    method: Method,
    headers: HeaderMap,
    ConnectInfo(peer_addr): ConnectInfo<SocketAddr>,
) -> Result<Response, GatewayError> {
    let requester_ip = client_ip(&headers, peer_addr, state.trust_forward_headers);

    let resource_id: u128 = id.parse().map_err(|_| GatewayError::NotFound)?;
    let (peer, msg_id) = unpack(resource_id);
    if msg_id == 0 || peer.chat_id() == 0 {
        return Err(GatewayError::NotFound);
    }

    let message = state
        .upstream
        .get_messages(peer, msg_id)
        .await
        .map_err(GatewayError::Admission)?
        .ok_or(GatewayError::NotFound)?;

    let (file, location) = match (message.file, message.location) {
        (Some(file), Some(location)) => (file, location),
        _ => return Err(GatewayError::NotFound),
    };

    let resolved_name = tgstream_types::prelude::resolved_file_name(&file, message.date);
    if resolved_name.as_bytes() != name.as_bytes() {
        return Err(GatewayError::NotFound);
    }

    let (offset, limit) = parse_range(headers.get(header::RANGE), file.size).unwrap_or((0, file.size));
    let status = if offset > 0 {
        StatusCode::PARTIAL_CONTENT
    } else {
        StatusCode::OK
    };

    if method == Method::GET && !state.transfer.can_download(location.dc_id) {
        return Ok(Response::builder()
            .status(StatusCode::SERVICE_UNAVAILABLE)
            .header(header::RETRY_AFTER, "120")
            .body(Body::empty())
            .expect("response builder is valid"));
    }

    tracing::info!(
        %requester_ip,
        dc_id = location.dc_id,
        chat_id = peer.chat_id(),
        msg_id,
        offset,
        limit,
        "serving download"
    );

    let response = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, file.mime_type.clone())
        .header(header::ACCEPT_RANGES, "bytes")
        .header(
            header::CONTENT_RANGE,
            format!("bytes {}-{}/{}", offset, file.size, file.size),
        )
        .header(header::CONTENT_LENGTH, (limit - offset).to_string())
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{resolved_name}\""),
        );

    if method == Method::HEAD {
        return Ok(response.body(Body::empty()).expect("response builder is valid"));
    }

    let stream = state
        .transfer
        .download(location, file.size, offset, limit)
        .await
        .map_err(GatewayError::Admission)?
        .map(Ok::<_, Infallible>);

    Ok(response
        .body(Body::from_stream(stream))
        .expect("response builder is valid"))
}

/// Parse a single-range `Range: bytes=start-end` header into `(offset, limit)`,
/// where `limit` is the exclusive end of the requested slice (matching the
/// upstream's own half-open `file[offset:limit]` framing rather than RFC
/// 7233's closed range). Anything this gateway can't make sense of — a
/// missing header, multiple ranges, a unit other than `bytes` — is treated
/// as "no range requested".
fn parse_range(header: Option<&axum::http::HeaderValue>, file_size: u64) -> Option<(u64, u64)> {
    let value = header?.to_str().ok()?;
    let spec = value.strip_prefix("bytes=")?;
    if spec.contains(',') {
        return None;
    }
    let (start, end) = spec.split_once('-')?;
    let offset: u64 = start.parse().ok()?;
    let limit: u64 = if end.is_empty() {
        file_size
    } else {
        end.parse::<u64>().ok()?.min(file_size)
    };
    if offset >= limit || offset >= file_size {
        return None;
    }
    Some((offset, limit))
}

/// Determine the requester's IP, honoring `X-Forwarded-For` only when the
/// gateway is configured to trust a reverse proxy in front of it.
fn client_ip(headers: &HeaderMap, peer_addr: SocketAddr, trust_forward_headers: bool) -> String {
    if trust_forward_headers {
        if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
            if let Some(first) = forwarded.split(',').next() {
                let candidate = first.trim();
                if !candidate.is_empty() {
                    return candidate.to_string();
                }
            }
        }
    }
    peer_addr.ip().to_string()
}

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
