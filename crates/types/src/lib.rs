//
// Copyright (c) 2026 TGStream Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: tgstream — stream files out of a chat backend over HTTP.
//

//! Shared wire types for the tgstream gateway.
//!
//! This crate provides the canonical type definitions used across
//! `tgstream-core` and `tgstream-platform`: the resource-id codec, file
//! metadata, and the message/event shapes the upstream client contract is
//! expressed in. No I/O lives here.
//!
//! # Quick Start
//!
//! ```rust
//! use tgstream_types::prelude::*;
//!
//! let id = pack(false, false, 12345, 67890);
//! let (peer, msg_id) = unpack(id);
//! assert_eq!(peer, PeerKind::User { chat_id: 12345 });
//! assert_eq!(msg_id, 67890);
//! ```

pub mod file;
pub mod message;
pub mod resource_id;

/// Prelude module for convenient glob imports.
pub mod prelude {
    pub use crate::file::{resolved_file_name, FileLocation, FileMeta};
    pub use crate::message::{ChatEvent, UpstreamMessage};
    pub use crate::resource_id::{pack, pack_event, unpack, PeerKind, ResourceId};
}
