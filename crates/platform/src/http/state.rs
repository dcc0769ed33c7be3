//
// Copyright (c) 2026 TGStream Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: tgstream — stream files out of a chat backend over HTTP.
//

//! `AppState` — everything a request handler needs, cloned cheaply per
//! request via `Arc`.

use std::sync::Arc;

use tgstream_core::{SessionHandle, TransferEngine, UpstreamClient};

use super::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub upstream: Arc<dyn UpstreamClient>,
    pub transfer: Arc<TransferEngine>,
    pub trust_forward_headers: bool,
    /// Session persistence for the concrete upstream client, if it has any
    /// (see `tgstream_core::SessionHandle`). `None` until a real upstream
    /// client is wired in; carried here so handlers and the shutdown path
    /// never need to know which concrete client is behind `upstream`.
    pub session: Option<Arc<dyn SessionHandle>>,
}

impl AppState {
    pub fn new(upstream: Arc<dyn UpstreamClient>, transfer: Arc<TransferEngine>, config: &Config) -> Self {
        Self {
            upstream,
            transfer,
            trust_forward_headers: config.trust_forward_headers,
            session: None,
        }
    }

    pub fn with_session(mut self, session: Arc<dyn SessionHandle>) -> Self {
        self.session = Some(session);
        self
    }
}
