//
// Copyright (c) 2026 TGStream Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: tgstream — stream files out of a chat backend over HTTP.
//

//! The C7 bot-reply loop: consumes inbound chat events and replies with a
//! download link whenever one carries a file.

use tgstream_core::{ChatEventSource, ChatReplier};
use tgstream_types::prelude::{pack_event, resolved_file_name, ChatEvent};

/// Drives the chat-event loop for as long as the source keeps yielding
/// events. Intended to be spawned as its own task alongside the HTTP
/// listener; a source that returns `None` (upstream disconnected) ends the
/// loop rather than retrying, leaving reconnection to the caller.
pub struct EventHandler<S, R> {
    source: S,
    replier: R,
    base_url: String,
    start_message: String,
    group_channel_message: String,
}

impl<S, R> EventHandler<S, R>
where
    S: ChatEventSource,
    R: ChatReplier,
{
    pub fn new(
        source: S,
        replier: R,
        base_url: impl Into<String>,
        start_message: impl Into<String>,
        group_channel_message: impl Into<String>,
    ) -> Self {
        Self {
            source,
            replier,
            base_url: base_url.into(),
            start_message: start_message.into(),
            group_channel_message: group_channel_message.into(),
        }
    }

    pub async fn run(mut self) {
        while let Some(event) = self.source.next_event().await {
            self.handle(&event).await;
        }
        tracing::info!("chat event source exhausted, event loop stopping");
    }

    async fn handle(&self, event: &ChatEvent) {
        let reply = if !event.is_private {
            self.group_channel_message.clone()
        } else if let (Some(file), Some(_location)) = (&event.file, &event.location) {
            let id = pack_event(event.is_group, event.is_channel, event.chat_id, event.message_id);
            let name = resolved_file_name(file, event.date);
            let url = format!("{}/{}/{}", self.base_url, id, name);
            format!("Link to download file: [{url}]({url})")
        } else {
            self.start_message.clone()
        };

        if let Err(error) = self.replier.reply(event, &reply).await {
            tracing::warn!(%error, chat_id = event.chat_id, "failed to send chat reply");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};
    use tgstream_core::CoreError;
    use tgstream_types::prelude::{FileLocation, FileMeta};

    struct VecSource(std::vec::IntoIter<ChatEvent>);

    #[async_trait]
    impl ChatEventSource for VecSource {
        async fn next_event(&mut self) -> Option<ChatEvent> {
            self.0.next()
        }
    }

    #[derive(Default, Clone)]
    struct RecordingReplier(Arc<Mutex<Vec<String>>>);

    #[async_trait]
    impl ChatReplier for RecordingReplier {
        async fn reply(&self, _event: &ChatEvent, text: &str) -> Result<(), CoreError> {
            self.0.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn file_event(is_private: bool, is_group: bool, is_channel: bool) -> ChatEvent {
        ChatEvent {
            is_private,
            is_group,
            is_channel,
            chat_id: 7,
            message_id: 99,
            from_id: Some(1),
            date: Utc::now(),
            file: Some(FileMeta {
                name: Some("clip.mp4".to_string()),
                ext: Some(".mp4".to_string()),
                size: 1024,
                mime_type: "video/mp4".to_string(),
            }),
            location: Some(FileLocation {
                dc_id: 2,
                opaque: vec![9],
            }),
        }
    }

    fn bare_private_event() -> ChatEvent {
        ChatEvent {
            is_private: true,
            is_group: false,
            is_channel: false,
            chat_id: 7,
            message_id: 1,
            from_id: Some(1),
            date: Utc::now(),
            file: None,
            location: None,
        }
    }

    #[tokio::test]
    async fn replies_with_a_download_link_for_a_file_event() {
        let replier = RecordingReplier::default();
        let handler = EventHandler::new(
            VecSource(vec![file_event(true, false, false)].into_iter()),
            replier.clone(),
            "https://files.example.com",
            "start",
            "shared",
        );
        handler.run().await;

        let sent = replier.0.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].starts_with("Link to download file: "));
        assert!(sent[0].contains("https://files.example.com/"));
        assert!(sent[0].contains("clip.mp4"));
    }

    #[tokio::test]
    async fn group_chat_always_gets_the_configured_group_message() {
        // Per spec, a non-private chat gets the plain group-chat message
        // even when the event carries a file — no link is minted.
        let replier = RecordingReplier::default();
        let handler = EventHandler::new(
            VecSource(vec![file_event(false, true, false)].into_iter()),
            replier.clone(),
            "https://files.example.com",
            "start",
            "Here you go:",
        );
        handler.run().await;

        let sent = replier.0.lock().unwrap();
        assert_eq!(sent[0], "Here you go:");
    }

    #[tokio::test]
    async fn bare_private_message_gets_the_start_message() {
        let replier = RecordingReplier::default();
        let handler = EventHandler::new(
            VecSource(vec![bare_private_event()].into_iter()),
            replier.clone(),
            "https://files.example.com",
            "welcome aboard",
            "shared",
        );
        handler.run().await;

        let sent = replier.0.lock().unwrap();
        assert_eq!(sent[0], "welcome aboard");
    }

    #[tokio::test]
    async fn bare_group_message_gets_the_group_message_too() {
        let replier = RecordingReplier::default();
        let mut event = bare_private_event();
        event.is_private = false;
        event.is_group = true;
        let handler = EventHandler::new(
            VecSource(vec![event].into_iter()),
            replier.clone(),
            "https://files.example.com",
            "welcome aboard",
            "shared",
        );
        handler.run().await;

        assert_eq!(replier.0.lock().unwrap()[0], "shared");
    }
}
