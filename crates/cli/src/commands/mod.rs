// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

//! CLI command implementations.

pub mod profile;
pub mod queue;
pub mod run;
pub mod serve;

use crate::config::EngineConfig;
use devflow_core::EventBus;
use devflow_storage::Store;
use std::sync::Arc;

/// Handles shared by every command that touches persisted state: the
/// store, the event bus, and the resolved config.
pub struct Context {
    pub config: EngineConfig,
    pub store: Arc<Store>,
    pub bus: Arc<EventBus>,
}

impl Context {
    pub fn open(config: EngineConfig) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        let store = Arc::new(Store::open(&config.data_dir.join("devflow.sqlite"))?);
        Ok(Self { config, store, bus: Arc::new(EventBus::new()) })
    }

    pub fn load_workflow(&self, workflow_path: Option<&std::path::Path>) -> anyhow::Result<devflow_core::step::Workflow> {
        match workflow_path {
            Some(path) => Ok(devflow_workflow::load_from_path(path)?),
            None => Ok(devflow_workflow::default_workflow()),
        }
    }
}
