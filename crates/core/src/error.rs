//
// Copyright (c) 2026 TGStream Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: tgstream — stream files out of a chat backend over HTTP.
//

//! Error domain for DC connection pooling and chunk transfer.

use thiserror::Error;

/// Errors raised by the connection pool and transfer engine.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("unknown DC id {0}")]
    UnknownDc(u8),

    /// The upstream rejected an auth-key export for the caller's own home DC.
    #[error("auth export rejected: requested DC is the home DC")]
    ExportDcMismatch,

    #[error("auth key export failed")]
    AuthExportFailed,

    #[error("per-DC connection limit reached")]
    ConnectionLimitReached,

    #[error("connection has not finished bootstrapping")]
    NotBootstrapped,

    #[error("upstream RPC failed: {0}")]
    Rpc(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
