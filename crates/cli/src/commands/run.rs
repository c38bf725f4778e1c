// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! `devflow run <story-key>`: execute one story's workflow against the
//! configured agent command and print the result.

use super::Context;
use crate::output::{print_execution, OutputFormat};
use anyhow::Context as _;
use devflow_core::clock::SystemClock;
use devflow_engine::{AgentCommand, ExecutionControl, Executor};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub struct RunArgs {
    pub story_key: String,
    pub source: PathBuf,
    pub workflow: Option<PathBuf>,
    pub agent_command: String,
    pub format: OutputFormat,
}

pub async fn handle(ctx: &Context, args: RunArgs) -> anyhow::Result<()> {
    let stories = devflow_ingest::load_source(&args.source)?;
    let story = stories
        .into_iter()
        .find(|s| s.key == args.story_key)
        .with_context(|| format!("no story with key '{}' in {}", args.story_key, args.source.display()))?;

    let workflow = ctx.load_workflow(args.workflow.as_deref())?;
    let executor = Executor::new(
        Arc::clone(&ctx.store),
        Arc::clone(&ctx.bus),
        SystemClock,
        AgentCommand { template: args.agent_command },
    );

    let control = ExecutionControl::new_with_cancel(CancellationToken::new());
    let execution = executor.run_execution(&story, &workflow, &control).await?;
    print_execution(&execution, args.format);

    if execution.status != devflow_core::execution::ExecutionStatus::Succeeded {
        anyhow::bail!("execution ended with status '{}'", execution.status);
    }
    Ok(())
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
