//
// Copyright (c) 2026 TGStream Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: tgstream — stream files out of a chat backend over HTTP.
//

//! # tgstream-platform
//!
//! The gateway's HTTP surface and chat event handler.
//!
//! - [`http`] — the Axum router: `GET`/`HEAD /{id}/{name}`, range handling,
//!   `AppState`, env-based `Config`.
//! - [`events`] — the C7 bot-reply loop: consumes a
//!   `tgstream_core::ChatEventSource`, mints a download URL for file
//!   messages, replies via `tgstream_core::ChatReplier`.
//! - [`error`] — maps `tgstream_core::CoreError` onto HTTP status codes.

pub mod error;
pub mod events;
pub mod http;

pub use error::GatewayError;
pub use http::{create_router, AppState, Config};
