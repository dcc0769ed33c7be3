//
// Copyright (c) 2026 TGStream Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: tgstream — stream files out of a chat backend over HTTP.
//

//! The transfer engine: chunk-range math and the pull-based byte stream
//! that drives it.
//!
//! The HTTP handler asks for a half-open byte range `[offset, limit)` of a
//! file and gets back a `Stream<Item = Bytes>` it can hand straight to the
//! response body. Nothing is fetched until the stream is polled, and if the
//! consumer drops the stream early (client disconnect, cancelled request),
//! the in-flight connection guard is released by `Drop` without another
//! chunk RPC going out.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use futures_core::Stream;
use futures_util::stream;
use tgstream_types::prelude::FileLocation;

use crate::connection::ConnectionGuard;
use crate::dc_manager::DcManager;
use crate::error::CoreError;
use crate::upstream::UpstreamClient;

/// Chunk size used for every RPC fetch, matching the upstream's own
/// preferred transfer granularity.
pub const CHUNK_SIZE: u64 = 512 * 1024;

/// The chunk-index arithmetic for a requested byte range `[offset, limit)`
/// of a file of size `file_size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkPlan {
    pub first_part: u64,
    /// Inclusive index of the last part that needs fetching.
    pub last_part: u64,
    /// Bytes to drop from the head of the first fetched part.
    pub first_part_cut: u64,
    /// Bytes to drop from the tail of the last fetched part.
    pub last_part_cut: u64,
    /// Total parts in the whole file, informational only.
    pub part_count: u64,
}

/// Compute the chunk plan for `[offset, limit)` within a file of `file_size`
/// bytes. Uses `last_part = (limit - 1) / P` rather than the naive
/// `ceil(limit / P)`: when `limit` is an exact multiple of `P` the naive
/// form fetches one whole extra chunk only to discard all of it. This form
/// never does, and still recovers the identical trimmed byte range.
pub fn plan_chunks(file_size: u64, offset: u64, limit: u64) -> ChunkPlan {
    debug_assert!(offset < limit && limit <= file_size);
    let first_part = offset / CHUNK_SIZE;
    let last_part = (limit - 1) / CHUNK_SIZE;
    let first_part_cut = offset % CHUNK_SIZE;
    let last_part_cut = CHUNK_SIZE * (last_part + 1) - limit;
    let part_count = (file_size + CHUNK_SIZE - 1) / CHUNK_SIZE;
    ChunkPlan {
        first_part,
        last_part,
        first_part_cut,
        last_part_cut,
        part_count,
    }
}

struct StreamState {
    conn: ConnectionGuard,
    location: FileLocation,
    part: u64,
    first_part: u64,
    last_part: u64,
    first_part_cut: u64,
    last_part_cut: u64,
}

/// Owns one [`DcManager`] per DC and hands out byte streams for file
/// downloads.
pub struct TransferEngine {
    upstream: Arc<dyn UpstreamClient>,
    dc_managers: HashMap<u8, Arc<DcManager>>,
}

impl TransferEngine {
    /// DC ids are small and fixed (1 through 5 in the upstream's own
    /// topology); a manager is created for each up front so lookups never
    /// race against lazy insertion.
    pub fn new(upstream: Arc<dyn UpstreamClient>, connection_limit: usize) -> Self {
        let dc_managers = (1..=5u8)
            .map(|dc_id| {
                (
                    dc_id,
                    Arc::new(DcManager::new(dc_id, upstream.clone(), connection_limit)),
                )
            })
            .collect();
        Self {
            upstream,
            dc_managers,
        }
    }

    /// Seed the home DC's manager with the auth key the session already
    /// holds, so its first connection skips an export round-trip.
    pub async fn post_init(&self) {
        let home_dc = self.upstream.home_dc_id();
        if let Some(key) = self.upstream.home_auth_key() {
            if let Some(dcm) = self.dc_managers.get(&home_dc) {
                dcm.seed_home_auth_key(key).await;
            }
        }
    }

    fn dc_manager(&self, dc_id: u8) -> Result<&Arc<DcManager>, CoreError> {
        self.dc_managers.get(&dc_id).ok_or(CoreError::UnknownDc(dc_id))
    }

    /// Kept for symmetry with the upstream project's admission hook; this
    /// gateway has no separate download-quota concept, so it always admits.
    pub fn can_download(&self, _dc_id: u8) -> bool {
        true
    }

    /// Stream `[offset, limit)` of `location`'s bytes, acquiring a pooled
    /// connection on `location.dc_id` for the duration of the stream.
    pub async fn download(
        &self,
        location: FileLocation,
        file_size: u64,
        offset: u64,
        limit: u64,
    ) -> Result<impl Stream<Item = Bytes> + Send, CoreError> {
        let plan = plan_chunks(file_size, offset, limit);
        tracing::debug!(
            dc_id = location.dc_id,
            first_part = plan.first_part,
            last_part = plan.last_part,
            part_count = plan.part_count,
            "starting download"
        );

        let dcm = self.dc_manager(location.dc_id)?;
        let conn = dcm.get_connection().await?;

        let state = StreamState {
            conn,
            location,
            part: plan.first_part,
            first_part: plan.first_part,
            last_part: plan.last_part,
            first_part_cut: plan.first_part_cut,
            last_part_cut: plan.last_part_cut,
        };

        Ok(stream::unfold(Some(state), move |state| async move {
            let mut state = state?;
            if state.part > state.last_part {
                return None;
            }

            let chunk_offset = state.part * CHUNK_SIZE;
            let bytes = match state
                .conn
                .fetch_file_chunk(&state.location, chunk_offset, CHUNK_SIZE as u32)
                .await
            {
                Ok(bytes) => bytes,
                Err(error) => {
                    tracing::debug!(%error, "chunk fetch failed, ending stream");
                    return None;
                }
            };

            let is_first = state.part == state.first_part;
            let is_last = state.part == state.last_part;
            let trimmed = match (is_first, is_last) {
                (true, true) => {
                    let end = ((CHUNK_SIZE - state.last_part_cut) as usize).min(bytes.len());
                    let start = (state.first_part_cut as usize).min(end);
                    bytes[start..end].to_vec()
                }
                (true, false) => {
                    let start = (state.first_part_cut as usize).min(bytes.len());
                    bytes[start..].to_vec()
                }
                (false, true) => {
                    let end = ((CHUNK_SIZE - state.last_part_cut) as usize).min(bytes.len());
                    bytes[..end].to_vec()
                }
                (false, false) => bytes,
            };

            state.part += 1;
            Some((Bytes::from(trimmed), Some(state)))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plans_a_full_file_spanning_exactly_two_chunks() {
        let file_size = 2 * CHUNK_SIZE;
        let plan = plan_chunks(file_size, 0, file_size);
        assert_eq!(plan.first_part, 0);
        assert_eq!(plan.last_part, 1, "no wasted fetch for an exact chunk multiple");
        assert_eq!(plan.first_part_cut, 0);
        assert_eq!(plan.last_part_cut, 0);
    }

    #[test]
    fn plans_an_offset_range_within_a_two_chunk_file() {
        let file_size = 2 * CHUNK_SIZE;
        let plan = plan_chunks(file_size, 100, file_size);
        assert_eq!(plan.first_part, 0);
        assert_eq!(plan.last_part, 1);
        assert_eq!(plan.first_part_cut, 100);
        assert_eq!(plan.last_part_cut, 0);
    }

    #[test]
    fn plans_a_single_chunk_byte_range() {
        let file_size = 2 * CHUNK_SIZE;
        let offset = CHUNK_SIZE + 100;
        let limit = CHUNK_SIZE + 212;
        let plan = plan_chunks(file_size, offset, limit);
        assert_eq!(plan.first_part, 1);
        assert_eq!(plan.last_part, 1);
        assert_eq!(plan.first_part_cut, 100);
        // single chunk yields bytes[100..212], length 112
        let kept = CHUNK_SIZE - plan.last_part_cut - plan.first_part_cut;
        assert_eq!(kept, 112);
    }

    #[tokio::test]
    async fn download_stream_yields_the_requested_byte_range() {
        use crate::mock::MockUpstream;
        use futures_util::StreamExt;

        let content: Vec<u8> = (0u32..(2 * CHUNK_SIZE as u32)).map(|i| (i % 251) as u8).collect();
        let file_size = content.len() as u64;
        let upstream: Arc<dyn UpstreamClient> = Arc::new(MockUpstream::new(1, content.clone()));
        let engine = TransferEngine::new(upstream, 4);
        engine.post_init().await;

        let location = FileLocation {
            dc_id: 1,
            opaque: vec![],
        };
        let stream = engine
            .download(location, file_size, 100, file_size)
            .await
            .unwrap();
        let chunks: Vec<Bytes> = stream.collect().await;
        let body: Vec<u8> = chunks.into_iter().flat_map(|b| b.to_vec()).collect();
        assert_eq!(body, content[100..]);
    }

    #[tokio::test]
    async fn download_stream_respects_a_single_chunk_range() {
        use crate::mock::MockUpstream;
        use futures_util::StreamExt;

        let content: Vec<u8> = (0u32..(2 * CHUNK_SIZE as u32)).map(|i| (i % 251) as u8).collect();
        let file_size = content.len() as u64;
        let upstream: Arc<dyn UpstreamClient> = Arc::new(MockUpstream::new(1, content.clone()));
        let engine = TransferEngine::new(upstream, 4);
        engine.post_init().await;

        let offset = CHUNK_SIZE + 100;
        let limit = CHUNK_SIZE + 212;
        let location = FileLocation {
            dc_id: 1,
            opaque: vec![],
        };
        let stream = engine.download(location, file_size, offset, limit).await.unwrap();
        let chunks: Vec<Bytes> = stream.collect().await;
        let body: Vec<u8> = chunks.into_iter().flat_map(|b| b.to_vec()).collect();
        assert_eq!(body, content[offset as usize..limit as usize]);
    }

    #[tokio::test]
    async fn concurrent_downloads_on_the_same_dc_use_separate_connections() {
        use crate::mock::MockUpstream;
        use futures_util::StreamExt;
        use std::time::Duration;

        let content = vec![7u8; (2 * CHUNK_SIZE) as usize];
        let file_size = content.len() as u64;
        let upstream = MockUpstream::new(1, content).with_fetch_delay(Duration::from_millis(20));
        let upstream: Arc<dyn UpstreamClient> = Arc::new(upstream);
        let engine = Arc::new(TransferEngine::new(upstream, 4));
        engine.post_init().await;

        let make = |e: Arc<TransferEngine>| {
            tokio::spawn(async move {
                let location = FileLocation {
                    dc_id: 1,
                    opaque: vec![],
                };
                let stream = e.download(location, file_size, 0, file_size).await.unwrap();
                let chunks: Vec<Bytes> = stream.collect().await;
                chunks.len()
            })
        };

        let a = make(engine.clone());
        let b = make(engine.clone());
        let (a, b) = tokio::join!(a, b);
        assert_eq!(a.unwrap(), 2);
        assert_eq!(b.unwrap(), 2);
    }
}
