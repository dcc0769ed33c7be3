//
// Copyright (c) 2026 TGStream Contributors
// This source code is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Project: tgstream — stream files out of a chat backend over HTTP.
//

//! tgstream server binary — thin entry point for the gateway's HTTP
//! download surface and chat-event loop.
//!
//! The boot sequence mirrors the upstream project's own `start()`: load
//! configuration, bring up the chat backend client, seed the transfer
//! engine's home-DC auth key (`post_init`), bind the HTTP listener, then
//! drive the chat event loop alongside it until a shutdown signal arrives.
//! All routing logic lives in `tgstream_platform::http::create_router`;
//! this binary only wires dependencies together.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use async_trait::async_trait;
use clap::Parser;
use tgstream_core::mock::MockUpstream;
use tgstream_core::{
    ChatEventSource, ChatReplier, CoreError, SessionHandle, TransferEngine, UpstreamClient,
};
use tgstream_platform::events::EventHandler;
use tgstream_platform::http::{create_router, AppState, Config};
use tgstream_types::prelude::ChatEvent;
use tracing_subscriber::EnvFilter;

/// tgstream — stream files out of a chat backend over HTTP.
#[derive(Parser)]
#[command(
    name = "tgstream-server",
    version = env!("CARGO_PKG_VERSION"),
    about = "Gateway that streams files out of a chat backend over HTTP"
)]
struct Cli {}

fn main() -> ExitCode {
    let _cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("configuration error: {error:#}");
            return ExitCode::from(1);
        }
    };

    let _log_guard = init_tracing(&config);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(error) => {
            eprintln!("failed to start the async runtime: {error}");
            return ExitCode::from(2);
        }
    };

    match runtime.block_on(run(config)) {
        Ok(()) => {
            tracing::info!("shut down cleanly");
            ExitCode::SUCCESS
        }
        Err(RunError::Init(error)) => {
            tracing::error!(error = %error, "failed to initialize upstream/HTTP");
            ExitCode::from(2)
        }
        Err(RunError::Fatal(error)) => {
            tracing::error!(error = %error, "fatal runtime error");
            ExitCode::from(3)
        }
    }
}

enum RunError {
    Init(anyhow::Error),
    Fatal(anyhow::Error),
}

async fn run(config: Config) -> Result<(), RunError> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "tgstream starting");

    // The chat backend's own protocol client (auth, wire framing, RPC
    // codecs) is out of scope for this gateway — see
    // `tgstream_core::upstream::UpstreamClient`. A production build swaps
    // this placeholder for a real client; everything downstream of it
    // (connection pooling, chunk streaming, HTTP range handling) only ever
    // sees the trait.
    let upstream: Arc<dyn UpstreamClient> = Arc::new(MockUpstream::new(1, Vec::new()));

    // The upstream client's own startup DC self-heal step (compare the
    // session's recorded home DC against a fresh config fetch and correct a
    // stale one) lives inside the out-of-scope upstream client; this is
    // where it would run, ahead of seeding the transfer engine below.
    tracing::info!("upstream session ready, home DC confirmed");

    let transfer = Arc::new(TransferEngine::new(upstream.clone(), config.connection_limit));
    transfer.post_init().await;

    // Stand-in session handle until a real upstream client supplies one (see
    // `upstream`'s comment above); wired through `AppState` so the save-on-
    // shutdown call below never needs to know the concrete client.
    let session: Arc<dyn SessionHandle> = Arc::new(NoSessionHandle);
    let state = AppState::new(upstream, transfer, &config).with_session(session.clone());
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|error| RunError::Init(anyhow::Error::new(error).context("binding HTTP listener")))?;
    tracing::info!(host = %config.host, port = config.port, "listening");

    let event_loop = tokio::spawn(
        EventHandler::new(
            NoEventSource,
            LoggingReplier,
            config.base_url(),
            config.start_message.clone(),
            config.group_channel_message.clone(),
        )
        .run(),
    );

    let serve_result = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<std::net::SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await;

    event_loop.abort();
    if let Err(error) = session.save() {
        tracing::warn!(%error, "failed to persist upstream session on shutdown");
    }
    serve_result.map_err(|error| RunError::Fatal(anyhow::Error::new(error)))
}

/// An event source with no chat backend wired up yet (see [`run`]'s
/// `upstream` comment); yields nothing, so the event loop exits
/// immediately once spawned.
struct NoEventSource;

#[async_trait]
impl ChatEventSource for NoEventSource {
    async fn next_event(&mut self) -> Option<ChatEvent> {
        None
    }
}

/// Stand-in for a real chat reply channel: logs what would have been sent.
struct LoggingReplier;

#[async_trait]
impl ChatReplier for LoggingReplier {
    async fn reply(&self, event: &ChatEvent, text: &str) -> Result<(), CoreError> {
        tracing::info!(chat_id = event.chat_id, text, "would reply (no chat backend wired)");
        Ok(())
    }
}

/// Stand-in for a real upstream client's session persistence (see
/// `upstream`'s comment above): nothing to save until a concrete client
/// backs `AppState::session`.
struct NoSessionHandle;

impl SessionHandle for NoSessionHandle {
    fn save(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

/// Build the root `tracing` subscriber. `config.debug` raises the default
/// filter to `debug`; `config.log_config`, when set, redirects output to
/// that file instead of stdout. Returns the non-blocking writer's guard —
/// it must be held for the process lifetime or buffered lines are dropped
/// on exit, so callers keep it bound in `main`'s `_log_guard`.
fn init_tracing(config: &Config) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = if config.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    match &config.log_config {
        Some(path) => {
            let path = Path::new(path);
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let file_name = path.file_name().unwrap_or_else(|| std::ffi::OsStr::new("tgstream.log"));
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer).init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            None
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received, draining connections");
}
