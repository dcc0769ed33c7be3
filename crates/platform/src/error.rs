//
// Copyright (c) 2026 TGStream Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: tgstream — stream files out of a chat backend over HTTP.
//

//! Maps failures from the connection pool and transfer engine onto the HTTP
//! status codes the gateway's handlers are allowed to return.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tgstream_core::CoreError;

/// Errors the HTTP handlers themselves can raise, plus anything bubbled up
/// from the transfer engine.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// No such resource id, or it decodes to a message with no file.
    #[error("not found")]
    NotFound,

    /// The connection pool has no room to admit this request right now.
    #[error("service unavailable: {0}")]
    Admission(#[from] CoreError),
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::NotFound => StatusCode::NOT_FOUND,
            GatewayError::Admission(CoreError::ConnectionLimitReached) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            GatewayError::Admission(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        tracing::debug!(error = %self, %status, "request failed");
        (status, self.to_string()).into_response()
    }
}
