// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! `devflow serve`: run the HTTP/WebSocket control surface, optionally
//! watching a work-item source file for changes.

use super::Context;
use devflow_engine::watch;
use devflow_server::{create_router, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub struct ServeArgs {
    pub watch_source: Option<PathBuf>,
    pub workflow: Option<PathBuf>,
    pub agent_command: String,
}

pub async fn handle(ctx: &Context, args: ServeArgs) -> anyhow::Result<()> {
    let mut state = AppState::new(Arc::clone(&ctx.store), Arc::clone(&ctx.bus), ctx.config.api_key.clone())
        .with_cors_allow_list(ctx.config.cors_allow_list.clone())
        .with_workflow(ctx.load_workflow(args.workflow.as_deref())?)
        .with_agent_command(args.agent_command);
    if let Some(path) = &args.watch_source {
        state = state.with_stories_source(path.clone());
    }
    let router = create_router(state);

    let listener = TcpListener::bind(&ctx.config.listen_addr).await?;
    tracing::info!(addr = %ctx.config.listen_addr, "devflow server listening");

    let cancel = CancellationToken::new();
    let watch_handle = args.watch_source.map(|path| {
        let bus = Arc::clone(&ctx.bus);
        let cancel = cancel.clone();
        let debounce = std::time::Duration::from_millis(ctx.config.debounce_ms);
        tokio::spawn(async move {
            if let Err(e) = watch(&path, debounce, bus, cancel, || {}).await {
                tracing::warn!(error = %e, "file watcher stopped");
            }
        })
    });

    let shutdown = {
        let cancel = cancel.clone();
        async move {
            let _ = tokio::signal::ctrl_c().await;
            cancel.cancel();
        }
    };

    axum::serve(listener, router).with_graceful_shutdown(shutdown).await?;

    if let Some(handle) = watch_handle {
        let _ = handle.await;
    }
    Ok(())
}
