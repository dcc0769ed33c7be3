//
// Copyright (c) 2026 TGStream Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: tgstream — stream files out of a chat backend over HTTP.
//

//! The trait boundary between this gateway and whatever chat backend it
//! streams files out of. Nothing in this module knows about any concrete
//! wire protocol; a production binary plugs in a real client, tests plug in
//! [`crate::mock`].

use async_trait::async_trait;
use tgstream_types::prelude::{ChatEvent, FileLocation, PeerKind, UpstreamMessage};

use crate::error::CoreError;

/// An opaque authorization key for a single DC. Compared only for equality;
/// never inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthKey(pub Vec<u8>);

/// The network address of a data center, as returned by `UpstreamClient::get_dc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DcEndpoint {
    pub id: u8,
    pub ip: String,
    pub port: u16,
}

/// The payload handed back by an auth-key export, ready to be imported by a
/// sender bound to the target DC.
#[derive(Debug, Clone)]
pub struct ExportedAuth {
    pub id: i64,
    pub bytes: Vec<u8>,
}

/// The gateway's view of the chat backend: DC discovery, auth export, sender
/// construction, and message lookup by `(peer, message-id)`.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Resolve the network address for a DC id.
    async fn get_dc(&self, dc_id: u8) -> Result<DcEndpoint, CoreError>;

    /// Export an auth key valid on `dc_id`, derived from the home session.
    /// Implementations return [`CoreError::ExportDcMismatch`] when `dc_id`
    /// is the caller's own home DC (nothing to export).
    async fn export_auth(&self, dc_id: u8) -> Result<ExportedAuth, CoreError>;

    /// Construct a sender bound to `endpoint`, optionally pre-seeded with an
    /// auth key already known to be valid there.
    async fn new_sender(
        &self,
        endpoint: &DcEndpoint,
        auth_key: Option<AuthKey>,
    ) -> Result<Box<dyn RpcSender>, CoreError>;

    /// Look up a message by `(peer, msg_id)`. `None` if no such message
    /// exists or it carries no file.
    async fn get_messages(
        &self,
        peer: PeerKind,
        msg_id: u32,
    ) -> Result<Option<UpstreamMessage>, CoreError>;

    /// The DC id the client is natively authorized on.
    fn home_dc_id(&self) -> u8;

    /// The auth key already valid on the home DC, if the session is live.
    fn home_auth_key(&self) -> Option<AuthKey>;
}

/// A single RPC channel bound to one DC. Bootstrapping (`connect`,
/// `import_auth`) mutates the sender and is serialized by its owning
/// [`crate::connection::Connection`]; `fetch_file_chunk` only needs a shared
/// reference, so independent chunk fetches are not mutually exclusive at
/// this layer — an implementation that pipelines requests internally is
/// free to do so.
#[async_trait]
pub trait RpcSender: Send + Sync {
    /// Open the underlying transport.
    async fn connect(&mut self) -> Result<(), CoreError>;

    /// Import a previously exported auth key, binding it to this sender.
    async fn import_auth(&mut self, exported: ExportedAuth) -> Result<AuthKey, CoreError>;

    /// Install an auth key directly, bypassing export (used for the
    /// `DC_ID_INVALID` fallback onto the home auth key).
    fn set_auth_key(&mut self, key: AuthKey);

    fn auth_key(&self) -> Option<AuthKey>;

    /// Fetch `limit` bytes of `location`'s content starting at `offset`.
    async fn fetch_file_chunk(
        &self,
        location: &FileLocation,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<u8>, CoreError>;
}

/// A source of inbound chat events (new messages, commands) for the C7
/// bot-reply handler. Polled by the platform-server's event loop.
#[async_trait]
pub trait ChatEventSource: Send + Sync {
    async fn next_event(&mut self) -> Option<ChatEvent>;
}

/// Sends a reply back to the chat an event originated from.
#[async_trait]
pub trait ChatReplier: Send + Sync {
    async fn reply(&self, event: &ChatEvent, text: &str) -> Result<(), CoreError>;
}

/// Persists whatever session state the upstream client needs across
/// restarts (e.g. the home auth key). Optional: a client that re-derives
/// its session from environment secrets on every start has no use for one.
pub trait SessionHandle: Send + Sync {
    fn save(&self) -> Result<(), CoreError>;
}
