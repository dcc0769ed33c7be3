//
// Copyright (c) 2026 TGStream Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: tgstream — stream files out of a chat backend over HTTP.
//

//! # tgstream-core
//!
//! DC connection pooling and parallel chunk streaming.
//!
//! This crate has no opinion on HTTP, environment configuration, or the
//! concrete chat backend being streamed from — see [`upstream`] for the
//! trait boundary a real backend implements. What it owns:
//!
//! - [`connection`] — a single pooled RPC connection and its release guard.
//! - [`dc_manager`] — the per-DC pool: lazy growth, shared auth key,
//!   cancellation-shielded bootstrap.
//! - [`transfer`] — chunk-range math and the lazy byte stream the HTTP
//!   layer consumes.
//!
//! Resource-id encoding and the shared wire types live in `tgstream-types`.

pub mod connection;
pub mod dc_manager;
pub mod error;
pub mod transfer;
pub mod upstream;

#[cfg(any(test, feature = "test-util"))]
pub mod mock;

pub use connection::{Connection, ConnectionGuard};
pub use dc_manager::DcManager;
pub use error::CoreError;
pub use transfer::{plan_chunks, ChunkPlan, TransferEngine, CHUNK_SIZE};
pub use upstream::{
    AuthKey, ChatEventSource, ChatReplier, DcEndpoint, ExportedAuth, RpcSender, SessionHandle,
    UpstreamClient,
};
