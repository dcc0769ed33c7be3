//
// Copyright (c) 2026 TGStream Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: tgstream — stream files out of a chat backend over HTTP.
//

//! Resource-id codec: pack/unpack (chat-kind, chat-id, message-id) into the
//! single opaque integer embedded in download URLs.
//!
//! Layout (bit 0 = LSB):
//!   bit 0       group flag
//!   bit 1       channel flag
//!   bits 2..33  chat-id   (32 bits)
//!   bits 34..65 message-id (32 bits)
//!
//! 66 bits of payload don't fit in a u64, so the packed id is a u128.

const GROUP_BIT: u128 = 0b01;
const CHANNEL_BIT: u128 = 0b10;
const CHAT_ID_SHIFT: u32 = 2;
const MSG_ID_SHIFT: u32 = 32 + CHAT_ID_SHIFT;
const ID_MASK: u128 = (1u128 << 32) - 1;

/// The opaque integer embedded in a download URL's `/{id}/` segment.
pub type ResourceId = u128;

/// Which kind of chat a message lives in. Replaces dynamic dispatch on the
/// upstream's own peer types with a tagged variant that carries the chat-id
/// it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeerKind {
    User { chat_id: u32 },
    Group { chat_id: u32 },
    Channel { chat_id: u32 },
}

impl PeerKind {
    pub fn chat_id(&self) -> u32 {
        match self {
            PeerKind::User { chat_id }
            | PeerKind::Group { chat_id }
            | PeerKind::Channel { chat_id } => *chat_id,
        }
    }
}

/// Pack a (chat-kind, chat-id, message-id) triple into a `ResourceId`.
///
/// `chat_id` and `msg_id` are truncated to 32 bits, matching the upstream's
/// own id width.
pub fn pack(is_group: bool, is_channel: bool, chat_id: u32, msg_id: u32) -> ResourceId {
    let mut id: u128 = 0;
    if is_group {
        id |= GROUP_BIT;
    }
    if is_channel {
        id |= CHANNEL_BIT;
    }
    id |= (chat_id as u128 & ID_MASK) << CHAT_ID_SHIFT;
    id |= (msg_id as u128 & ID_MASK) << MSG_ID_SHIFT;
    id
}

/// Unpack a `ResourceId` into its peer kind and message-id.
///
/// An id whose `chat_id` or `msg_id` decodes to zero is invalid; the caller
/// (the HTTP handler, per spec) is responsible for rejecting it with 404.
pub fn unpack(id: ResourceId) -> (PeerKind, u32) {
    let is_group = id & GROUP_BIT != 0;
    let is_channel = id & CHANNEL_BIT != 0;
    let chat_id = ((id >> CHAT_ID_SHIFT) & ID_MASK) as u32;
    let msg_id = ((id >> MSG_ID_SHIFT) & ID_MASK) as u32;

    let peer = if is_channel {
        PeerKind::Channel { chat_id }
    } else if is_group {
        PeerKind::Group { chat_id }
    } else {
        PeerKind::User { chat_id }
    };
    (peer, msg_id)
}

/// Pack the `(is_group, is_channel, chat_id, msg_id)` tuple for an inbound
/// chat event, mirroring the upstream's `pack_id(evt)` helper.
pub fn pack_event(is_group: bool, is_channel: bool, chat_id: u32, msg_id: u32) -> ResourceId {
    pack(is_group, is_channel, chat_id, msg_id)
}
