// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! devflow - drive coding-agent workflows over a backlog of work items.

mod cli;
mod color;
mod commands;
mod config;
mod exit_error;
mod output;
mod profile;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "devflow=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = cli::parse();
    if let Err(e) = cli::run(args).await {
        eprintln!("error: {e}");
        std::process::exit(e.code);
    }
}
