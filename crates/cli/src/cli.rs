// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! Top-level argument parsing and command dispatch.

use crate::commands::profile::ProfileCommand;
use crate::commands::queue::QueueCommand;
use crate::commands::run::RunArgs;
use crate::commands::serve::ServeArgs;
use crate::commands::{self, Context};
use crate::config::EngineConfig;
use crate::exit_error::ExitError;
use crate::output::OutputFormat;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use devflow_core::queue::Queue;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "devflow", version, about = "Drive coding-agent workflows over a backlog of work items")]
pub struct Cli {
    /// Override the resolved data directory for this invocation
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Use a named profile instead of the active (or default) one
    #[arg(long, global = true)]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run one story's workflow to completion
    Run {
        story_key: String,
        source: PathBuf,
        #[arg(long)]
        workflow: Option<PathBuf>,
        #[arg(long, default_value = "{Prompt}")]
        agent_command: String,
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Inspect or drive the batch execution queue
    Queue {
        #[command(subcommand)]
        command: QueueCommand,
    },
    /// Run the HTTP/WebSocket control surface
    Serve {
        /// Work-item source file to watch for changes and to serve
        /// `/api/stories` from
        #[arg(long)]
        watch: Option<PathBuf>,
        #[arg(long)]
        workflow: Option<PathBuf>,
        #[arg(long, default_value = "{Prompt}")]
        agent_command: String,
    },
    /// Manage named data-directory profiles
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },
}

/// Resolve the engine config for this invocation: an explicit `--data-dir`
/// wins outright; otherwise a `--profile` name (or the active profile, if
/// any) supplies the data directory; otherwise fall back to the default.
fn resolve_config(data_dir: Option<PathBuf>, profile: Option<String>) -> anyhow::Result<EngineConfig> {
    if let Some(dir) = data_dir {
        return Ok(EngineConfig::load_from_dir(&dir)?);
    }

    let root = crate::config::default_data_dir();
    let name = match profile {
        Some(name) => Some(name),
        None => crate::profile::Profile::active(&root)?,
    };
    match name {
        Some(name) => {
            let profile = crate::profile::Profile::load(&root, &name)?;
            Ok(EngineConfig::load_from_dir(&profile.data_dir)?)
        }
        None => Ok(EngineConfig::load()?),
    }
}

/// Parse argv with the project's color palette applied to clap's own help
/// and error output.
pub fn parse() -> Cli {
    let matches = Cli::command().styles(crate::color::styles()).get_matches();
    match Cli::from_arg_matches(&matches) {
        Ok(cli) => cli,
        Err(e) => e.exit(),
    }
}

pub async fn run(cli: Cli) -> Result<(), ExitError> {
    dispatch(cli).await.map_err(|e| ExitError::new(1, e.to_string()))
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    if let Command::Profile { command } = cli.command {
        return commands::profile::handle(command);
    }

    let config = resolve_config(cli.data_dir, cli.profile)?;
    let ctx = Context::open(config)?;

    match cli.command {
        Command::Run { story_key, source, workflow, agent_command, format } => {
            commands::run::handle(&ctx, RunArgs { story_key, source, workflow, agent_command, format }).await
        }
        Command::Queue { command } => {
            let queue = Arc::new(Mutex::new(Queue::new()));
            commands::queue::handle(&ctx, &queue, command).await
        }
        Command::Serve { watch, workflow, agent_command } => {
            commands::serve::handle(&ctx, ServeArgs { watch_source: watch, workflow, agent_command }).await
        }
        Command::Profile { .. } => unreachable!(),
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
