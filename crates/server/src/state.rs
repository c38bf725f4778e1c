// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Contributors

use devflow_core::queue::Queue;
use devflow_core::step::Workflow;
use devflow_core::story::Story;
use devflow_core::EventBus;
use devflow_engine::ExecutionControl;
use devflow_storage::Store;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;

/// Handle onto whichever single execution `/api/execution/*` is currently
/// driving. Cheap to clone; `control` is itself `Arc`-backed.
#[derive(Clone)]
pub struct LiveExecution {
    pub story_key: String,
    pub control: ExecutionControl,
}

/// Non-secret snapshot of the server's own configuration, surfaced at
/// `GET /api/config`. Populated by the CLI at startup from its
/// `EngineConfig`, which `devflow-server` can't depend on directly
/// without creating a dependency cycle.
#[derive(Clone, Default, serde::Serialize)]
pub struct ConfigView {
    pub cors_allow_list: Vec<String>,
    pub agent_command_template: String,
    pub workflow_name: String,
}

/// Shared handles the HTTP and WebSocket layers read from and mutate.
/// Cloned per-request; every field is itself `Arc`-backed so cloning is
/// cheap.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Store>,
    pub bus: Arc<EventBus>,
    pub queue: Arc<Mutex<Queue>>,
    /// Bearer token required on every request when set; `None` disables
    /// auth entirely (local/dev use).
    pub auth_token: Option<Arc<str>>,
    pub cors_allow_list: Arc<Vec<String>>,
    pub stories_source: Arc<Mutex<Option<PathBuf>>>,
    pub stories: Arc<Mutex<Vec<Story>>>,
    pub workflow: Arc<Workflow>,
    pub agent_command_template: Arc<str>,
    pub live: Arc<Mutex<Option<LiveExecution>>>,
}

impl AppState {
    pub fn new(store: Arc<Store>, bus: Arc<EventBus>, auth_token: Option<String>) -> Self {
        Self {
            store,
            bus,
            queue: Arc::new(Mutex::new(Queue::new())),
            auth_token: auth_token.map(Arc::from),
            cors_allow_list: Arc::new(Vec::new()),
            stories_source: Arc::new(Mutex::new(None)),
            stories: Arc::new(Mutex::new(Vec::new())),
            workflow: Arc::new(devflow_workflow::default_workflow()),
            agent_command_template: Arc::from("{Prompt}"),
            live: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with_cors_allow_list(mut self, allow_list: Vec<String>) -> Self {
        self.cors_allow_list = Arc::new(allow_list);
        self
    }

    /// Set the work-item source file and load its stories immediately so
    /// `GET /api/stories` has data before the first refresh.
    pub fn with_stories_source(self, path: PathBuf) -> Self {
        match devflow_ingest::load_source(&path) {
            Ok(stories) => *self.stories.lock() = stories,
            Err(e) => tracing::warn!(error = %e, path = %path.display(), "failed to load initial stories"),
        }
        *self.stories_source.lock() = Some(path);
        self
    }

    pub fn with_workflow(mut self, workflow: Workflow) -> Self {
        self.workflow = Arc::new(workflow);
        self
    }

    pub fn with_agent_command(mut self, template: String) -> Self {
        self.agent_command_template = Arc::from(template);
        self
    }

    pub fn config_view(&self) -> ConfigView {
        ConfigView {
            cors_allow_list: (*self.cors_allow_list).clone(),
            agent_command_template: self.agent_command_template.to_string(),
            workflow_name: self.workflow.name.clone(),
        }
    }
}
