//
// Copyright (c) 2026 TGStream Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: tgstream — stream files out of a chat backend over HTTP.
//

//! Runtime configuration, loaded from the environment (`.env` honored via
//! `dotenvy`). Every field below has a documented default except the three
//! upstream session credentials, which the binary refuses to start without.

use std::env;

use anyhow::{Context, Result};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_HOST: &str = "localhost";
const DEFAULT_CONNECTION_LIMIT: usize = 20;
const DEFAULT_REQUEST_LIMIT: u32 = 5;

#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream API id, required.
    pub api_id: i32,
    /// Upstream API hash, required.
    pub api_hash: String,
    /// Name of the session file/string the upstream client persists to.
    pub session_name: String,

    pub host: String,
    pub port: u16,
    /// Base URL used to mint download links in chat replies, e.g.
    /// `https://files.example.com`. Falls back to `http://{host}:{port}`.
    pub public_url: Option<String>,

    /// Trust `X-Forwarded-For` when determining a requester's IP. Only
    /// meaningful when the gateway sits behind a reverse proxy.
    pub trust_forward_headers: bool,

    pub debug: bool,
    /// Path to a `tracing-subscriber` / logging config file, if any.
    pub log_config: Option<String>,

    /// Reserved for a future per-IP or per-token rate limit; read and
    /// carried but not enforced by this gateway.
    pub request_limit: u32,

    /// Max pooled connections per DC.
    pub connection_limit: usize,

    /// Message sent in reply to `/start`.
    pub start_message: String,
    /// Message sent when a file is shared in a group or channel.
    pub group_channel_message: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_id = env::var("TG_API_ID")
            .context("TG_API_ID is required")?
            .parse()
            .context("TG_API_ID must be an integer")?;
        let api_hash = env::var("TG_API_HASH").context("TG_API_HASH is required")?;
        let session_name =
            env::var("TG_SESSION_NAME").unwrap_or_else(|_| "tgfilestream".to_string());

        let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = match env::var("PORT") {
            Ok(v) => v
                .parse::<u16>()
                .ok()
                .filter(|p| *p >= 1)
                .with_context(|| "PORT must be an integer between 1 and 65535")?,
            Err(_) => DEFAULT_PORT,
        };
        let public_url = env::var("PUBLIC_URL").ok();

        let trust_forward_headers = env_bool("TRUST_FORWARD_HEADERS", false);
        let debug = env_bool("DEBUG", false);
        let log_config = env::var("LOG_CONFIG").ok();

        let request_limit = env::var("REQUEST_LIMIT")
            .ok()
            .map(|v| v.parse::<u32>().context("REQUEST_LIMIT must be an integer"))
            .transpose()?
            .unwrap_or(DEFAULT_REQUEST_LIMIT);
        let connection_limit = env::var("CONNECTION_LIMIT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CONNECTION_LIMIT);

        let start_message = env::var("TG_START_MESG").unwrap_or_else(|_| {
            "Send me a file and I'll give you a download link.".to_string()
        });
        let group_channel_message = env::var("TG_G_C_MESG")
            .unwrap_or_else(|_| "Here's your download link:".to_string());

        Ok(Config {
            api_id,
            api_hash,
            session_name,
            host,
            port,
            public_url,
            trust_forward_headers,
            debug,
            log_config,
            request_limit,
            connection_limit,
            start_message,
            group_channel_message,
        })
    }

    /// The base URL to mint download links against.
    pub fn base_url(&self) -> String {
        self.public_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.host, self.port))
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
        Err(_) => default,
    }
}
