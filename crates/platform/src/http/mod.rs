//
// Copyright (c) 2026 TGStream Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: tgstream — stream files out of a chat backend over HTTP.
//

//! HTTP layer — Axum-based download surface for the gateway.

pub mod config;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::Config;
pub use router::create_router;
pub use state::AppState;
