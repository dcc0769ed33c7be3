//
// Copyright (c) 2026 TGStream Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: tgstream — stream files out of a chat backend over HTTP.
//

//! A single pooled RPC connection to one DC, plus the RAII guard that
//! tracks how many in-flight transfers are using it.

use std::sync::atomic::{AtomicI64, Ordering};

use tgstream_types::prelude::FileLocation;
use tokio::sync::{Mutex, MutexGuard, RwLock};

use crate::error::CoreError;
use crate::upstream::RpcSender;

/// One pooled connection. Connections are never torn down once created —
/// they live until process exit or an unrecoverable transport error, which
/// is left to the caller to observe via a failing `fetch_file_chunk`.
pub struct Connection {
    pub label: String,
    /// Serializes bootstrap against the acquisition-time users-count
    /// increment; not held during steady-state chunk fetches.
    lock: Mutex<()>,
    sender: RwLock<Option<Box<dyn RpcSender>>>,
    users: AtomicI64,
}

impl Connection {
    pub fn new(label: String) -> Self {
        Self {
            label,
            lock: Mutex::new(()),
            sender: RwLock::new(None),
            users: AtomicI64::new(0),
        }
    }

    pub(crate) async fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }

    pub(crate) async fn install_sender(&self, sender: Box<dyn RpcSender>) {
        *self.sender.write().await = Some(sender);
    }

    pub(crate) fn users_count(&self) -> i64 {
        self.users.load(Ordering::SeqCst)
    }

    pub(crate) fn users_inc(&self) {
        self.users.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn users_dec(&self) {
        self.users.fetch_sub(1, Ordering::SeqCst);
    }

    async fn fetch_file_chunk(
        &self,
        location: &FileLocation,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<u8>, CoreError> {
        let guard = self.sender.read().await;
        match guard.as_ref() {
            Some(sender) => sender.fetch_file_chunk(location, offset, limit).await,
            None => Err(CoreError::NotBootstrapped),
        }
    }
}

/// RAII handle returned by [`crate::dc_manager::DcManager::get_connection`].
/// Decrements the connection's users-count on drop, so release happens on
/// every exit path — normal completion, an error return, or the stream
/// simply being dropped by a disconnected client.
pub struct ConnectionGuard {
    conn: std::sync::Arc<Connection>,
}

impl ConnectionGuard {
    pub(crate) fn new(conn: std::sync::Arc<Connection>) -> Self {
        Self { conn }
    }

    pub async fn fetch_file_chunk(
        &self,
        location: &FileLocation,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<u8>, CoreError> {
        self.conn.fetch_file_chunk(location, offset, limit).await
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.conn.users_dec();
    }
}
