//
// Copyright (c) 2026 TGStream Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: tgstream — stream files out of a chat backend over HTTP.
//

//! Types describing messages and inbound chat events as reported by the
//! upstream client (`UpstreamClient::get_messages`, `ChatEventSource`).

use chrono::{DateTime, Utc};

use crate::file::FileLocation;
use crate::file::FileMeta;

/// A single message as returned by `get_messages`. Only the fields the
/// gateway needs are modeled; everything else about a message is the
/// upstream client's concern.
#[derive(Debug, Clone)]
pub struct UpstreamMessage {
    pub id: u32,
    pub chat_id: u32,
    pub date: DateTime<Utc>,
    pub file: Option<FileMeta>,
    pub location: Option<FileLocation>,
}

/// An inbound chat event, as delivered by `ChatEventSource::next_event`.
#[derive(Debug, Clone)]
pub struct ChatEvent {
    pub is_private: bool,
    pub is_group: bool,
    pub is_channel: bool,
    pub chat_id: u32,
    pub message_id: u32,
    pub from_id: Option<u64>,
    pub date: DateTime<Utc>,
    pub file: Option<FileMeta>,
    pub location: Option<FileLocation>,
}
