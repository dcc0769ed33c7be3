//
// Copyright (c) 2026 TGStream Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: tgstream — stream files out of a chat backend over HTTP.
//

//! Axum router composition.
//!
//! Routes:
//!   GET/HEAD  /{id}/{name}   — stream a file, honoring `Range`
//!   GET       /healthz       — health check

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{download_handler, health_handler};
use super::state::AppState;

pub fn build_base_router() -> Router<AppState> {
    Router::new()
        .route("/healthz", get(health_handler))
        .route(
            "/:id/:name",
            get(download_handler).head(download_handler),
        )
}

pub fn create_router(state: AppState) -> Router {
    build_base_router()
        .with_state(state)
        .layer(CorsLayer::new())
        .layer(TraceLayer::new_for_http())
}
