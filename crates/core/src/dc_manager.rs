//
// Copyright (c) 2026 TGStream Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: tgstream — stream files out of a chat backend over HTTP.
//

//! Per-DC connection pool. Resolves the DC's endpoint once, shares a single
//! auth key across every connection bootstrapped for that DC, and grows the
//! pool lazily up to `connection_limit`.

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::connection::{Connection, ConnectionGuard};
use crate::error::CoreError;
use crate::upstream::{AuthKey, DcEndpoint, ExportedAuth, UpstreamClient};

/// Above this, a single DC's connection pool is likely oversized for what
/// the upstream backend will tolerate; we still honor it, just warn once.
const WARN_CONNECTION_LIMIT: usize = 25;

pub struct DcManager {
    dc_id: u8,
    upstream: Arc<dyn UpstreamClient>,
    endpoint: Mutex<Option<DcEndpoint>>,
    auth_key: RwLock<Option<AuthKey>>,
    connections: Mutex<Vec<Arc<Connection>>>,
    connection_limit: usize,
}

impl DcManager {
    pub fn new(dc_id: u8, upstream: Arc<dyn UpstreamClient>, connection_limit: usize) -> Self {
        if connection_limit > WARN_CONNECTION_LIMIT {
            tracing::warn!(
                dc_id,
                connection_limit,
                "connection limit is unusually high for a single DC"
            );
        }
        Self {
            dc_id,
            upstream,
            endpoint: Mutex::new(None),
            auth_key: RwLock::new(None),
            connections: Mutex::new(Vec::new()),
            connection_limit,
        }
    }

    /// Seed the auth key this DC already holds via the home session, without
    /// ever clobbering a key a bootstrap has already written.
    pub async fn seed_home_auth_key(&self, key: AuthKey) {
        self.auth_key.write().await.get_or_insert(key);
    }

    /// Acquire a pooled connection, creating one if every existing
    /// connection is in use and the pool has room to grow.
    pub async fn get_connection(self: &Arc<Self>) -> Result<ConnectionGuard, CoreError> {
        let mut list = self.connections.lock().await;

        let best = list
            .iter()
            .min_by_key(|c| c.users_count())
            .cloned();
        let need_new = match &best {
            None => true,
            Some(c) => c.users_count() >= 1 && list.len() < self.connection_limit,
        };

        let conn = if need_new {
            if list.len() >= self.connection_limit {
                return Err(CoreError::ConnectionLimitReached);
            }
            let label = format!("dc{}-conn{}", self.dc_id, list.len() + 1);
            let conn = Arc::new(Connection::new(label));
            list.push(conn.clone());

            // Bootstrap on a detached task so a cancelled acquisition never
            // tears down a connection that is partway through connecting;
            // the task keeps running and the pool simply gains an entry
            // that finishes bootstrapping in the background.
            let dcm = Arc::clone(self);
            let bootstrap_conn = conn.clone();
            let handle = tokio::spawn(async move { dcm.bootstrap_connection(&bootstrap_conn).await });
            handle
                .await
                .map_err(|e| CoreError::Rpc(format!("connection bootstrap task failed: {e}")))??;
            conn
        } else {
            best.expect("need_new is false only when a connection already exists")
        };

        {
            let _guard = conn.lock().await;
            conn.users_inc();
        }
        drop(list);

        Ok(ConnectionGuard::new(conn))
    }

    async fn resolve_endpoint(&self) -> Result<DcEndpoint, CoreError> {
        let mut guard = self.endpoint.lock().await;
        if let Some(endpoint) = guard.as_ref() {
            return Ok(endpoint.clone());
        }
        let endpoint = self.upstream.get_dc(self.dc_id).await?;
        *guard = Some(endpoint.clone());
        Ok(endpoint)
    }

    async fn bootstrap_connection(&self, conn: &Connection) -> Result<(), CoreError> {
        let endpoint = self.resolve_endpoint().await?;
        let current_key = self.auth_key.read().await.clone();
        let mut sender = self.upstream.new_sender(&endpoint, current_key.clone()).await?;

        let _guard = conn.lock().await;
        sender.connect().await?;

        if current_key.is_none() {
            match self.upstream.export_auth(self.dc_id).await {
                Ok(exported) => {
                    let key = sender.import_auth(exported).await?;
                    self.auth_key.write().await.get_or_insert(key);
                }
                Err(CoreError::ExportDcMismatch) => {
                    tracing::debug!(
                        dc_id = self.dc_id,
                        "auth export rejected for home DC, falling back to home auth key"
                    );
                    let home_key = self
                        .upstream
                        .home_auth_key()
                        .ok_or(CoreError::AuthExportFailed)?;
                    sender.set_auth_key(home_key.clone());
                    self.auth_key.write().await.get_or_insert(home_key);
                }
                Err(e) => return Err(e),
            }
        }

        conn.install_sender(sender).await;
        Ok(())
    }
}
