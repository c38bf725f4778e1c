// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! `devflow queue`: manage and run the batch execution queue.

use super::Context;
use crate::output::{print_json, OutputFormat};
use clap::Subcommand;
use devflow_core::clock::{Clock, SystemClock};
use devflow_core::queue::Queue;
use devflow_core::queue_item::QueueItemId;
use devflow_engine::{run_queue, AgentCommand, Executor};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Subcommand)]
pub enum QueueCommand {
    /// Add a story to the queue
    Add { story_key: String },
    /// List items currently in the queue
    List {
        #[arg(long, default_value = "text")]
        format: OutputFormat,
    },
    /// Remove an item from the queue
    Remove { id: String },
    /// Move an item one position earlier
    MoveUp { id: String },
    /// Move an item one position later
    MoveDown { id: String },
    /// Drop every item from the queue
    Clear,
    /// Run every waiting item in order against the configured workflow
    Start {
        source: PathBuf,
        #[arg(long)]
        workflow: Option<PathBuf>,
        #[arg(long, default_value = "{Prompt}")]
        agent_command: String,
    },
}

pub async fn handle(ctx: &Context, queue: &Arc<Mutex<Queue>>, command: QueueCommand) -> anyhow::Result<()> {
    match command {
        QueueCommand::Add { story_key } => {
            let id = queue.lock().add(&story_key, SystemClock.epoch_ms());
            println!("added {story_key} as {id}");
        }
        QueueCommand::List { format } => {
            let items = queue.lock().items().to_vec();
            match format {
                OutputFormat::Json => print_json(&items),
                OutputFormat::Text => {
                    for item in items {
                        println!("{:>3}  {:<24}  {}  {}", item.position, item.story_key, item.id, crate::color::status(&item.status.to_string()));
                    }
                }
            }
        }
        QueueCommand::Remove { id } => {
            let removed = queue.lock().remove(QueueItemId::from_string(id));
            if removed.is_none() {
                anyhow::bail!("no queue item with that id");
            }
        }
        QueueCommand::MoveUp { id } => queue.lock().move_up(QueueItemId::from_string(id)),
        QueueCommand::MoveDown { id } => queue.lock().move_down(QueueItemId::from_string(id)),
        QueueCommand::Clear => queue.lock().clear(),
        QueueCommand::Start { source, workflow, agent_command } => {
            let stories = devflow_ingest::load_source(&source)?;
            for story in &stories {
                queue.lock().add(&story.key, SystemClock.epoch_ms());
            }
            let workflow = ctx.load_workflow(workflow.as_deref())?;
            let executor = Executor::new(Arc::clone(&ctx.store), Arc::clone(&ctx.bus), SystemClock, AgentCommand { template: agent_command });
            run_queue(&executor, &SystemClock, queue, &ctx.bus, &stories, &workflow, CancellationToken::new()).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
