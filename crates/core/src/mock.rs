//
// Copyright (c) 2026 TGStream Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: tgstream — stream files out of a chat backend over HTTP.
//

//! An in-memory [`UpstreamClient`] test double. Serves file content from a
//! byte buffer keyed by `(chat_id, msg_id)`, with an optional artificial
//! delay per chunk fetch to exercise the connection pool's concurrency
//! behavior under test.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tgstream_types::prelude::{ChatEvent, FileLocation, FileMeta, PeerKind, UpstreamMessage};
use tokio::sync::Mutex;

use crate::error::CoreError;
use crate::upstream::{AuthKey, DcEndpoint, ExportedAuth, RpcSender, UpstreamClient};

#[derive(Clone)]
struct Entry {
    file: FileMeta,
    data: Arc<Vec<u8>>,
}

/// Counters a test can inspect after the fact: how many chunk RPCs actually
/// went out, useful for asserting the chunk-math scenarios in spec S1-S7.
#[derive(Default)]
pub struct MockStats {
    pub fetch_count: AtomicUsize,
}

pub struct MockUpstream {
    home_dc: u8,
    messages: Mutex<HashMap<(u32, u32), (UpstreamMessage, Entry)>>,
    reject_export_for_home: bool,
    pub stats: Arc<MockStats>,
    pub fetch_delay: Duration,
}

impl MockUpstream {
    pub fn new(home_dc: u8, data: Vec<u8>) -> Self {
        let mut messages = HashMap::new();
        let size = data.len() as u64;
        let entry = Entry {
            file: FileMeta {
                name: Some("file.bin".to_string()),
                ext: Some(".bin".to_string()),
                size,
                mime_type: "application/octet-stream".to_string(),
            },
            data: Arc::new(data),
        };
        let msg = UpstreamMessage {
            id: 42,
            chat_id: 1,
            date: Utc::now(),
            file: Some(entry.file.clone()),
            location: Some(FileLocation {
                dc_id: home_dc,
                opaque: vec![1, 2, 3],
            }),
        };
        messages.insert((1, 42), (msg, entry));
        Self {
            home_dc,
            messages: Mutex::new(messages),
            reject_export_for_home: false,
            stats: Arc::new(MockStats::default()),
            fetch_delay: Duration::from_millis(0),
        }
    }

    pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
        self.fetch_delay = delay;
        self
    }
}

#[async_trait]
impl UpstreamClient for MockUpstream {
    async fn get_dc(&self, dc_id: u8) -> Result<DcEndpoint, CoreError> {
        Ok(DcEndpoint {
            id: dc_id,
            ip: format!("10.0.0.{dc_id}"),
            port: 443,
        })
    }

    async fn export_auth(&self, dc_id: u8) -> Result<ExportedAuth, CoreError> {
        if dc_id == self.home_dc || self.reject_export_for_home {
            return Err(CoreError::ExportDcMismatch);
        }
        Ok(ExportedAuth {
            id: dc_id as i64,
            bytes: vec![0xAA; 16],
        })
    }

    async fn new_sender(
        &self,
        endpoint: &DcEndpoint,
        auth_key: Option<AuthKey>,
    ) -> Result<Box<dyn RpcSender>, CoreError> {
        Ok(Box::new(MockSender {
            dc_id: endpoint.id,
            auth_key,
            messages: Mutex::new(None),
            stats: self.stats.clone(),
            fetch_delay: self.fetch_delay,
            data: self.messages.lock().await.get(&(1, 42)).map(|(_, e)| e.data.clone()),
        }))
    }

    async fn get_messages(
        &self,
        peer: PeerKind,
        msg_id: u32,
    ) -> Result<Option<UpstreamMessage>, CoreError> {
        let messages = self.messages.lock().await;
        Ok(messages.get(&(peer.chat_id(), msg_id)).map(|(m, _)| m.clone()))
    }

    fn home_dc_id(&self) -> u8 {
        self.home_dc
    }

    fn home_auth_key(&self) -> Option<AuthKey> {
        Some(AuthKey(b"home-key".to_vec()))
    }
}

struct MockSender {
    dc_id: u8,
    auth_key: Option<AuthKey>,
    // Present only so `Connect`/debugging can see which DC this sender
    // ended up bound to; unused beyond that.
    messages: Mutex<Option<()>>,
    stats: Arc<MockStats>,
    fetch_delay: Duration,
    data: Option<Arc<Vec<u8>>>,
}

#[async_trait]
impl RpcSender for MockSender {
    async fn connect(&mut self) -> Result<(), CoreError> {
        let _ = self.dc_id;
        *self.messages.lock().await = Some(());
        Ok(())
    }

    async fn import_auth(&mut self, exported: ExportedAuth) -> Result<AuthKey, CoreError> {
        let key = AuthKey(exported.bytes);
        self.auth_key = Some(key.clone());
        Ok(key)
    }

    fn set_auth_key(&mut self, key: AuthKey) {
        self.auth_key = Some(key);
    }

    fn auth_key(&self) -> Option<AuthKey> {
        self.auth_key.clone()
    }

    async fn fetch_file_chunk(
        &self,
        _location: &FileLocation,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<u8>, CoreError> {
        self.stats.fetch_count.fetch_add(1, Ordering::SeqCst);
        if self.fetch_delay > Duration::from_millis(0) {
            tokio::time::sleep(self.fetch_delay).await;
        }
        let data = self
            .data
            .as_ref()
            .ok_or_else(|| CoreError::Rpc("no file bound to this mock sender".to_string()))?;
        let start = (offset as usize).min(data.len());
        let end = (start + limit as usize).min(data.len());
        Ok(data[start..end].to_vec())
    }
}
